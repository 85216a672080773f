use std::collections::HashMap;

use crate::class::{SegmentClass, ALL_CLASSES};
use crate::pathname::Pathname;
use crate::region::Region;
use crate::space::AddressSpace;

/// Region count and byte total for one `SegmentClass`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ClassTotals {
    pub count: usize,
    pub total_bytes: u64,
}

/// Per-class totals over a whole `AddressSpace`, in the fixed
/// `ALL_CLASSES` order so a renderer can print every class — including
/// ones with zero regions — without consulting the classifier again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentStatistics {
    entries: Vec<(SegmentClass, ClassTotals)>,
    total_size: u64,
}

impl SegmentStatistics {
    pub fn compute(space: &AddressSpace) -> Self {
        let mut totals: HashMap<SegmentClass, ClassTotals> = HashMap::new();
        for region in space.iter() {
            let entry = totals.entry(region.classification).or_default();
            entry.count += 1;
            entry.total_bytes += region.size();
        }
        let entries = ALL_CLASSES
            .iter()
            .map(|&class| (class, totals.get(&class).copied().unwrap_or_default()))
            .collect();
        Self {
            entries,
            total_size: space.total_size(),
        }
    }

    pub fn entries(&self) -> &[(SegmentClass, ClassTotals)] {
        &self.entries
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Percentage of total bytes this class occupies, as a fraction in
    /// `[0, 100]`. Zero when the address space is empty. Display
    /// precision is a renderer decision, not the aggregator's.
    pub fn percentage(&self, class: SegmentClass) -> f64 {
        if self.total_size == 0 {
            return 0.0;
        }
        let totals = self
            .entries
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, t)| *t)
            .unwrap_or_default();
        (totals.total_bytes as f64 / self.total_size as f64) * 100.0
    }
}

/// All regions sharing one pathname (or the anonymous bucket).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryGroup {
    pub pathname: Pathname,
    pub region_indices: Vec<usize>,
    pub total_bytes: u64,
}

/// Regions bucketed by distinct pathname, groups ordered by the
/// `start` of the first region encountered in each group (equivalently,
/// the ascending `start` of any region in the group, since regions are
/// visited in `start` order).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BinaryGrouping {
    groups: Vec<BinaryGroup>,
}

impl BinaryGrouping {
    pub fn compute(space: &AddressSpace) -> Self {
        let mut index_of: HashMap<String, usize> = HashMap::new();
        let mut groups: Vec<BinaryGroup> = Vec::new();
        for (region_index, region) in space.iter().enumerate() {
            let key = group_key(region);
            let group_index = *index_of.entry(key).or_insert_with(|| {
                groups.push(BinaryGroup {
                    pathname: region.pathname.clone(),
                    region_indices: Vec::new(),
                    total_bytes: 0,
                });
                groups.len() - 1
            });
            let group = &mut groups[group_index];
            group.region_indices.push(region_index);
            group.total_bytes += region.size();
        }
        Self { groups }
    }

    pub fn groups(&self) -> &[BinaryGroup] {
        &self.groups
    }
}

fn group_key(region: &Region) -> String {
    match &region.pathname {
        Pathname::FileBacked(path) => path.clone(),
        Pathname::Pseudo(name) => name.clone(),
        Pathname::Anonymous => "[anonymous]".to_owned(),
    }
}
