use crate::{Hash32, TimeslotIndex, WorkPackageHash};
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
};

/// Context of the blockchain at the point of evaluation of the report's corresponding work-package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementContext {
    /// `a`: Anchor block header hash
    pub anchor_header_hash: Hash32,
    /// `s`: Anchor block posterior state root
    pub anchor_state_root: Hash32,
    /// `l`: Lookup anchor block header hash
    pub lookup_anchor_header_hash: Hash32,
    /// `t`: Lookup anchor block timeslot index
    pub lookup_anchor_timeslot: TimeslotIndex,
    /// **`p`**: Set of prerequisite work package hash
    pub prerequisite_work_packages: BTreeSet<WorkPackageHash>,
}

impl Display for RefinementContext {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RefineContext {{ anchor: {}, lookup_anchor: {} @ {}, prerequisites: [",
            self.anchor_header_hash, self.lookup_anchor_header_hash, self.lookup_anchor_timeslot
        )?;
        for (i, wp_hash) in self.prerequisite_work_packages.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{wp_hash}")?;
        }
        write!(f, "] }}")
    }
}
