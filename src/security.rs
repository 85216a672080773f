use tracing::warn;

use crate::space::AddressSpace;

/// One region flagged by the fixed writable+executable policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecurityFinding {
    pub region_index: usize,
    pub start: u64,
    pub end: u64,
    pub permission_string: String,
    pub pathname: String,
}

/// Flags every region that is both writable and executable, regardless
/// of sharing or backing. This is the only rule in scope; an empty
/// result is a clean bill, not an error.
pub fn audit(space: &AddressSpace) -> Vec<SecurityFinding> {
    space
        .iter()
        .enumerate()
        .filter(|(_, region)| region.is_writable() && region.is_executable())
        .map(|(region_index, region)| {
            warn!(
                region_index,
                start = region.start,
                end = region.end,
                "writable+executable region"
            );
            SecurityFinding {
                region_index,
                start: region.start,
                end: region.end,
                permission_string: region.permission_string(),
                pathname: region.pathname.as_str().to_owned(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_str;

    #[test]
    fn flags_writable_executable_region() {
        let space = parse_str("1000-2000 rwxp 00000000 b3:04 1 /usr/bin/myapp").unwrap();
        let findings = audit(&space);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].permission_string, "rwxp");
    }

    #[test]
    fn clean_space_has_no_findings() {
        let space = parse_str(
            "1000-2000 r-xp 00000000 b3:04 1 /usr/bin/myapp\n\
             2000-3000 rw-p 00000000 00:00 0                              [heap]",
        )
        .unwrap();
        assert!(audit(&space).is_empty());
    }
}
