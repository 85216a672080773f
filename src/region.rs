use crate::class::{classify, SegmentClass};
use crate::error::{ParseError, ParseErrorReason};
use crate::pathname::Pathname;
use crate::permissions::{Device, Permissions, Sharing};

/// One contiguous virtual-memory mapping, as read from a single line of
/// `/proc/<pid>/maps`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub start: u64,
    pub end: u64,
    pub permissions: Permissions,
    pub sharing: Sharing,
    pub file_offset: u64,
    pub device: Device,
    pub inode: u64,
    pub pathname: Pathname,
    pub classification: SegmentClass,
}

impl Region {
    /// The sole constructor: computes classification from the raw
    /// fields and rejects an inverted range. A `Region` can never be
    /// built in a self-contradictory state.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        line_number: usize,
        start: u64,
        end: u64,
        permissions: Permissions,
        sharing: Sharing,
        file_offset: u64,
        device: Device,
        inode: u64,
        pathname: Pathname,
    ) -> Result<Self, ParseError> {
        if start >= end {
            return Err(ParseError::new(line_number, ParseErrorReason::InvalidRange));
        }
        let classification = classify(permissions, &pathname);
        Ok(Self {
            start,
            end,
            permissions,
            sharing,
            file_offset,
            device,
            inode,
            pathname,
            classification,
        })
    }

    /// Used only by the `AddressSpace` builder's Bss-refinement pass:
    /// classification is otherwise fixed for the lifetime of a `Region`.
    pub(crate) fn with_classification(mut self, classification: SegmentClass) -> Self {
        self.classification = classification;
        self
    }

    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_readable(&self) -> bool {
        self.permissions.contains(Permissions::R)
    }

    pub fn is_writable(&self) -> bool {
        self.permissions.contains(Permissions::W)
    }

    pub fn is_executable(&self) -> bool {
        self.permissions.contains(Permissions::X)
    }

    pub fn is_private(&self) -> bool {
        self.sharing == Sharing::Private
    }

    pub fn is_shared(&self) -> bool {
        self.sharing == Sharing::Shared
    }

    pub fn is_anonymous(&self) -> bool {
        self.pathname.is_anonymous()
    }

    pub fn is_file_backed(&self) -> bool {
        self.pathname.is_file_backed()
    }

    pub fn is_pseudo(&self) -> bool {
        self.pathname.is_pseudo()
    }

    /// The four-character `[r-][w-][x-][ps]` serialization of this region's permissions.
    pub fn permission_string(&self) -> String {
        let chars = self.permissions.to_chars(self.sharing);
        String::from_utf8(chars.to_vec()).expect("permission chars are ASCII")
    }

    /// Serializes this region back to the kernel maps grammar. The
    /// inverse of the parser's per-line decoding, modulo whitespace
    /// normalization (exactly one space between fields).
    pub fn to_line(&self) -> String {
        let pathname = self.pathname.as_str();
        if pathname.is_empty() {
            format!(
                "{:x}-{:x} {} {:x} {} {}",
                self.start,
                self.end,
                self.permission_string(),
                self.file_offset,
                self.device,
                self.inode,
            )
        } else {
            format!(
                "{:x}-{:x} {} {:x} {} {} {}",
                self.start,
                self.end,
                self.permission_string(),
                self.file_offset,
                self.device,
                self.inode,
                pathname,
            )
        }
    }
}
