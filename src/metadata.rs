use std::path::Path;

use crate::class::SegmentClass;
use crate::pathname::Pathname;
use crate::space::AddressSpace;

/// Facts about the process an `AddressSpace` was captured from, either
/// inferred from the region set or supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessMetadata {
    pub process_name: String,
    pub pid: Option<u32>,
    pub region_count: usize,
    pub total_size: u64,
    pub low_address: Option<u64>,
    pub high_address: Option<u64>,
}

impl ProcessMetadata {
    /// `pid` comes from whichever collaborator invoked the `/proc/<pid>/maps`
    /// read; it is never inferred from the map text itself.
    pub fn extract(space: &AddressSpace, pid: Option<u32>) -> Self {
        let process_name = space
            .iter()
            .find(|region| {
                region.classification == SegmentClass::Code
                    && matches!(&region.pathname, Pathname::FileBacked(path) if !path.starts_with('['))
            })
            .and_then(|region| match &region.pathname {
                Pathname::FileBacked(path) => {
                    Path::new(path).file_name().map(|f| f.to_string_lossy().into_owned())
                }
                _ => None,
            })
            .unwrap_or_else(|| "Unknown".to_owned());

        Self {
            process_name,
            pid,
            region_count: space.len(),
            total_size: space.total_size(),
            low_address: space.low_address(),
            high_address: space.high_address(),
        }
    }
}
