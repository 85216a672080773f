use std::io::BufRead;

use tracing::{debug, info};

use crate::error::{MapsError, ParseError, ParseErrorReason};
use crate::pathname::Pathname;
use crate::permissions::{Device, Permissions};
use crate::region::Region;
use crate::space::AddressSpace;

/// Parses an in-memory maps snapshot (already read into a string).
pub fn parse_str(input: &str) -> Result<AddressSpace, ParseError> {
    let (regions, line_numbers) = parse_lines(input.lines().enumerate().map(|(i, l)| (i + 1, l)))?;
    build(regions, &line_numbers)
}

/// Parses a maps snapshot from any buffered reader (a file, a pipe, or
/// a `/proc/<pid>/maps` handle), tolerating I/O errors independently of
/// parse errors.
pub fn read_maps<R: BufRead>(reader: R) -> Result<AddressSpace, MapsError> {
    let mut regions = Vec::new();
    let mut line_numbers = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let raw_line = line?;
        if raw_line.trim().is_empty() {
            continue;
        }
        match parse_line(line_number, &raw_line) {
            Ok(region) => {
                regions.push(region);
                line_numbers.push(line_number);
            }
            Err(err) => {
                debug!(line_number, reason = %err.reason, "rejected maps line");
                return Err(MapsError::Parse(err));
            }
        }
    }
    let space = build(regions, &line_numbers)?;
    info!(region_count = space.len(), "parsed address space");
    Ok(space)
}

/// Convenience wrapper reading a live process's mappings straight from
/// the kernel. `pid` is not stored on the resulting `AddressSpace` —
/// callers that want it on `ProcessMetadata` pass it again explicitly.
pub fn read_proc_pid_maps(pid: u32) -> Result<AddressSpace, MapsError> {
    let path = format!("/proc/{pid}/maps");
    let file = std::fs::File::open(path)?;
    read_maps(std::io::BufReader::new(file))
}

fn parse_lines<'a>(
    lines: impl Iterator<Item = (usize, &'a str)>,
) -> Result<(Vec<Region>, Vec<usize>), ParseError> {
    let mut regions = Vec::new();
    let mut line_numbers = Vec::new();
    for (line_number, raw_line) in lines {
        if raw_line.trim().is_empty() {
            continue;
        }
        let region = match parse_line(line_number, raw_line) {
            Ok(region) => region,
            Err(err) => {
                debug!(line_number, reason = %err.reason, "rejected maps line");
                return Err(err);
            }
        };
        regions.push(region);
        line_numbers.push(line_number);
    }
    Ok((regions, line_numbers))
}

fn build(regions: Vec<Region>, line_numbers: &[usize]) -> Result<AddressSpace, ParseError> {
    let space = AddressSpace::build(regions, line_numbers)?;
    info!(region_count = space.len(), "parsed address space");
    Ok(space)
}

/// Splits off the next whitespace-delimited token, advancing `rest`
/// past it and any whitespace run that follows.
fn take_token<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let trimmed = rest.trim_start();
    if trimmed.is_empty() {
        return None;
    }
    let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let (token, remainder) = trimmed.split_at(end);
    *rest = remainder;
    Some(token)
}

fn parse_line(line_number: usize, line: &str) -> Result<Region, ParseError> {
    let malformed = || ParseError::new(line_number, ParseErrorReason::MalformedLine);

    let mut rest = line;
    let range = take_token(&mut rest).ok_or_else(malformed)?;
    let perm4 = take_token(&mut rest).ok_or_else(malformed)?;
    let offset_token = take_token(&mut rest).ok_or_else(malformed)?;
    let device_token = take_token(&mut rest).ok_or_else(malformed)?;
    let inode_token = take_token(&mut rest).ok_or_else(malformed)?;
    let pathname_raw = rest;

    let (start_str, end_str) = range.split_once('-').ok_or_else(malformed)?;
    let start = parse_hex_u64(start_str).map_err(|reason| ParseError::new(line_number, reason))?;
    let end = parse_hex_u64(end_str).map_err(|reason| ParseError::new(line_number, reason))?;

    let (permissions, sharing) = Permissions::parse(perm4)
        .ok_or_else(|| ParseError::new(line_number, ParseErrorReason::InvalidPermissions))?;

    let file_offset =
        parse_hex_u64(offset_token).map_err(|reason| ParseError::new(line_number, reason))?;
    let device = Device::parse(device_token).ok_or_else(malformed)?;
    let inode: u64 = inode_token.parse().map_err(|_| malformed())?;
    let pathname = Pathname::parse(pathname_raw);

    Region::new(
        line_number,
        start,
        end,
        permissions,
        sharing,
        file_offset,
        device,
        inode,
        pathname,
    )
}

fn parse_hex_u64(data: &str) -> Result<u64, ParseErrorReason> {
    if data.is_empty() || !data.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseErrorReason::MalformedLine);
    }
    u64::from_str_radix(data, 16).map_err(|_| ParseErrorReason::AddressOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::SegmentClass;

    #[test]
    fn parses_basic_line() {
        let space =
            parse_str("0098b000-0098c000 r-xp 00000000 b3:04 6081 /usr/bin/amxrt").unwrap();
        let region = space.get(0).unwrap();
        assert_eq!(region.start, 0x0098b000);
        assert_eq!(region.end, 0x0098c000);
        assert_eq!(region.size(), 4096);
        assert!(region.is_readable());
        assert!(!region.is_writable());
        assert!(region.is_executable());
        assert!(region.is_private());
        assert_eq!(region.file_offset, 0);
        assert_eq!(region.device.major, 0xb3);
        assert_eq!(region.device.minor, 0x04);
        assert_eq!(region.inode, 6081);
        assert_eq!(region.classification, SegmentClass::Code);
    }

    #[test]
    fn anonymous_heap_classifies_correctly() {
        let space = parse_str(
            "0214f000-0218a000 rw-p 00000000 00:00 0                                  [heap]",
        )
        .unwrap();
        assert_eq!(space.get(0).unwrap().classification, SegmentClass::Heap);
    }

    #[test]
    fn skips_blank_lines() {
        let space = parse_str(
            "\n0098b000-0098c000 r-xp 00000000 b3:04 6081 /usr/bin/amxrt\n\n",
        )
        .unwrap();
        assert_eq!(space.len(), 1);
    }

    #[test]
    fn rejects_malformed_line() {
        let err = parse_str("not-a-mapping-line").unwrap_err();
        assert_eq!(err.reason, ParseErrorReason::MalformedLine);
        assert_eq!(err.line_number, 1);
    }

    #[test]
    fn reports_correct_line_number_for_second_offender() {
        let input = "1000-2000 r-xp 00000000 00:00 0\nnot-a-mapping-line";
        let err = parse_str(input).unwrap_err();
        assert_eq!(err.line_number, 2);
    }

    #[test]
    fn rejects_invalid_permission_alphabet() {
        let err = parse_str("1000-2000 rwz- 00000000 00:00 0").unwrap_err();
        assert_eq!(err.reason, ParseErrorReason::InvalidPermissions);
    }

    #[test]
    fn preserves_pathnames_with_embedded_spaces() {
        let space = parse_str("1000-2000 r--p 00000000 00:00 0 /mnt/my drive/bin a").unwrap();
        assert_eq!(space.get(0).unwrap().pathname.as_str(), "/mnt/my drive/bin a");
    }

    #[test]
    fn empty_input_parses_to_empty_space() {
        let space = parse_str("").unwrap();
        assert!(space.is_empty());
    }

    #[test]
    fn rejects_overflowing_address() {
        let err = parse_str("1ffffffffffffffff-2ffffffffffffffff r--p 0 00:00 0").unwrap_err();
        assert_eq!(err.reason, ParseErrorReason::AddressOverflow);
    }
}
