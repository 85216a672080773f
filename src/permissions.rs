use std::fmt;

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct Permissions: u8 {
        const R = 1 << 0;
        const W = 1 << 1;
        const X = 1 << 2;
    }
}

impl Permissions {
    /// Parses the first three characters of a `perm4` token (`[r-][w-][x-]`).
    /// The sharing character is handled separately by `Sharing::parse`.
    fn parse_rwx(data: &[u8; 3]) -> Option<Self> {
        let mut perms = Permissions::empty();
        match data[0] {
            b'r' => perms |= Permissions::R,
            b'-' => {}
            _ => return None,
        }
        match data[1] {
            b'w' => perms |= Permissions::W,
            b'-' => {}
            _ => return None,
        }
        match data[2] {
            b'x' => perms |= Permissions::X,
            b'-' => {}
            _ => return None,
        }
        Some(perms)
    }

    /// Parses the full four-character `perm4` token into permissions and sharing.
    pub fn parse(data: &str) -> Option<(Self, Sharing)> {
        let bytes: [u8; 4] = data.as_bytes().try_into().ok()?;
        let rwx: [u8; 3] = [bytes[0], bytes[1], bytes[2]];
        let permissions = Self::parse_rwx(&rwx)?;
        let sharing = Sharing::parse(bytes[3])?;
        Some((permissions, sharing))
    }

    pub fn to_chars(self, sharing: Sharing) -> [u8; 4] {
        [
            if self.contains(Permissions::R) {
                b'r'
            } else {
                b'-'
            },
            if self.contains(Permissions::W) {
                b'w'
            } else {
                b'-'
            },
            if self.contains(Permissions::X) {
                b'x'
            } else {
                b'-'
            },
            sharing.to_char(),
        ]
    }
}

/// Whether a mapping is private (copy-on-write) or shared with other processes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sharing {
    Private,
    Shared,
}

impl Sharing {
    fn parse(byte: u8) -> Option<Self> {
        match byte {
            b'p' => Some(Sharing::Private),
            b's' => Some(Sharing::Shared),
            _ => None,
        }
    }

    fn to_char(self) -> u8 {
        match self {
            Sharing::Private => b'p',
            Sharing::Shared => b's',
        }
    }
}

/// The backing device of a file-backed mapping, `(0, 0)` for anonymous ones.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Device {
    pub major: u32,
    pub minor: u32,
}

impl Device {
    pub fn parse(data: &str) -> Option<Self> {
        let (major, minor) = data.split_once(':')?;
        Some(Self {
            major: u32::from_str_radix(major, 16).ok()?,
            minor: u32::from_str_radix(minor, 16).ok()?,
        })
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}", self.major, self.minor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rwxp() {
        let (perms, sharing) = Permissions::parse("rwxp").unwrap();
        assert!(perms.contains(Permissions::R));
        assert!(perms.contains(Permissions::W));
        assert!(perms.contains(Permissions::X));
        assert_eq!(sharing, Sharing::Private);
    }

    #[test]
    fn parses_read_only_shared() {
        let (perms, sharing) = Permissions::parse("r--s").unwrap();
        assert_eq!(perms, Permissions::R);
        assert_eq!(sharing, Sharing::Shared);
    }

    #[test]
    fn rejects_bad_length() {
        assert!(Permissions::parse("rwx").is_none());
        assert!(Permissions::parse("rwxpp").is_none());
    }

    #[test]
    fn rejects_unknown_characters() {
        assert!(Permissions::parse("rwzp").is_none());
        assert!(Permissions::parse("rwx?").is_none());
    }

    #[test]
    fn round_trips_through_chars() {
        let (perms, sharing) = Permissions::parse("r-xs").unwrap();
        assert_eq!(&perms.to_chars(sharing), b"r-xs");
    }

    #[test]
    fn device_parses_hex_pair() {
        let device = Device::parse("b3:04").unwrap();
        assert_eq!(device.major, 0xb3);
        assert_eq!(device.minor, 0x04);
        assert_eq!(device.to_string(), "b3:04");
    }
}
