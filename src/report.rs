use crate::crash::{resolve, CrashContext, CrashResolution};
use crate::metadata::ProcessMetadata;
use crate::security::{audit, SecurityFinding};
use crate::space::AddressSpace;
use crate::stats::{BinaryGrouping, SegmentStatistics};

/// Everything a formatter needs, computed once and handed over as one
/// immutable value. There is no mutation phase after assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportData {
    pub address_space: AddressSpace,
    pub metadata: ProcessMetadata,
    pub statistics: SegmentStatistics,
    pub binary_grouping: BinaryGrouping,
    pub security_findings: Vec<SecurityFinding>,
    pub crash_resolutions: Option<Vec<CrashResolution>>,
}

impl ReportData {
    /// Runs every core subsystem over `address_space` and bundles the
    /// results. Crash resolution is skipped (yielding `None`, not an
    /// empty `Vec`) when no register was provided.
    pub fn assemble(
        address_space: AddressSpace,
        pid: Option<u32>,
        crash_context: Option<&CrashContext>,
    ) -> Self {
        let metadata = ProcessMetadata::extract(&address_space, pid);
        let statistics = SegmentStatistics::compute(&address_space);
        let binary_grouping = BinaryGrouping::compute(&address_space);
        let security_findings = audit(&address_space);
        let crash_resolutions = crash_context
            .filter(|context| !context.is_empty())
            .map(|context| resolve(context, &address_space));

        Self {
            address_space,
            metadata,
            statistics,
            binary_grouping,
            security_findings,
            crash_resolutions,
        }
    }
}
