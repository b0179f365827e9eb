use crate::{
    workloads::common::RefinementContext, CodeHash, CoreIndex, Hash32, Octets, SegmentRoot,
    ServiceId, UnsignedGas, WorkPackageHash,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{Display, Formatter},
    ops::Deref,
};

/// Represents a work report generated from refinement of a work package,
/// to be integrated into the on-chain state via the accumulation process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkReport {
    /// `s`: Work package availability specification
    pub specs: AvailSpecs,
    /// `x`: Refinement context
    pub refinement_context: RefinementContext,
    /// `c`: Core index on which the work is done
    pub core_index: CoreIndex,
    /// `a`: Authorizer hash
    pub authorizer_hash: Hash32,
    /// **`o`**: Authorization trace
    pub auth_trace: Octets,
    /// **`l`**: Segment-root lookup dictionary, up to 8 items
    pub segment_roots_lookup: SegmentRootLookupTable,
    /// **`r`**: Work digests, with at least 1 and no more than 16 items
    pub digests: Vec<WorkDigest>,
    /// `g`: The amount of gas used in `is_authorized` invocation, prior to the refinement.
    pub auth_gas_used: UnsignedGas,
}

impl Display for WorkReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "WorkReport {{")?;
        writeln!(f, "\tspec: {}", self.specs)?;
        writeln!(f, "\trefine_ctx: {}", self.refinement_context)?;
        writeln!(f, "\tcore_idx: {}", self.core_index)?;
        writeln!(f, "\tsegment_roots_lookup: {}", self.segment_roots_lookup)?;
        if self.digests.is_empty() {
            writeln!(f, "\tdigests: []")?;
        } else {
            writeln!(f, "\tdigests: [")?;
            for digest in self.digests.iter() {
                writeln!(f, "\t  {digest}")?;
            }
            writeln!(f, "\t]")?;
        }
        write!(f, "}}")
    }
}

impl WorkReport {
    pub fn refinement_context(&self) -> &RefinementContext {
        &self.refinement_context
    }

    pub fn prerequisites(&self) -> &BTreeSet<WorkPackageHash> {
        &self.refinement_context.prerequisite_work_packages
    }

    pub fn segment_roots_lookup(&self) -> &BTreeMap<WorkPackageHash, SegmentRoot> {
        &self.segment_roots_lookup
    }

    pub fn work_package_hash(&self) -> &WorkPackageHash {
        &self.specs.work_package_hash
    }

    pub fn digests(&self) -> &[WorkDigest] {
        &self.digests
    }

    pub fn core_index(&self) -> CoreIndex {
        self.core_index
    }

    /// Digests of the report destined to the given service, in report order.
    pub fn digests_for(&self, service_id: ServiceId) -> impl Iterator<Item = &WorkDigest> {
        self.digests
            .iter()
            .filter(move |wd| wd.service_id == service_id)
    }

    pub fn total_accumulation_gas_allotted(&self) -> UnsignedGas {
        self.digests
            .iter()
            .fold(0, |acc, wd| acc.saturating_add(wd.accumulate_gas_limit))
    }
}

/// Segment-root lookups of a work report, keyed by the work package hash exporting the segments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentRootLookupTable {
    items: BTreeMap<WorkPackageHash, SegmentRoot>,
}

impl Display for SegmentRootLookupTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "{{}}");
        }
        write!(f, "{{")?;
        for (k, v) in self.items.iter() {
            write!(f, " {k}: {v}")?;
        }
        write!(f, " }}")
    }
}

impl Deref for SegmentRootLookupTable {
    type Target = BTreeMap<WorkPackageHash, SegmentRoot>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl SegmentRootLookupTable {
    pub fn new(items: BTreeMap<WorkPackageHash, SegmentRoot>) -> Self {
        Self { items }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailSpecs {
    /// `h`: Work package hash
    pub work_package_hash: WorkPackageHash,
    /// `l`: Auditable work bundle length
    pub work_bundle_length: u32,
    /// `u`: Erasure root of the work package
    pub erasure_root: Hash32,
    /// `e`: Export segment root of the work package
    pub segment_root: SegmentRoot,
    /// `n`: Number of export segments
    pub segment_count: u16,
}

impl Display for AvailSpecs {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "AvailSpecs {{ wp_hash: {}, segment_root: {}, segment_count: {} }}",
            self.work_package_hash, self.segment_root, self.segment_count,
        )
    }
}

/// Represents a work digest; the refinement output of a single work item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDigest {
    /// `s`: Service id
    pub service_id: ServiceId,
    /// `c`: Code hash of the service at the time of reporting
    pub service_code_hash: CodeHash,
    /// `y`: Hash of the associated work item payload
    pub payload_hash: Hash32,
    /// `g`: Gas limit for executing the accumulate logic of the service
    pub accumulate_gas_limit: UnsignedGas,
    /// **`d`**: Refinement result
    pub refine_result: WorkExecutionResult,
}

impl Default for WorkDigest {
    fn default() -> Self {
        Self {
            service_id: 0,
            service_code_hash: CodeHash::default(),
            payload_hash: Hash32::default(),
            accumulate_gas_limit: 0,
            refine_result: WorkExecutionResult::Output(Octets::default()),
        }
    }
}

impl Display for WorkDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorkDigest {{ service: {}, payload: {}, gas: {}, result: {} }}",
            self.service_id, self.payload_hash, self.accumulate_gas_limit, self.refine_result
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkExecutionResult {
    Output(Octets),
    Error(WorkExecutionError),
}

impl Display for WorkExecutionResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Output(octets) => write!(f, "{octets}"),
            Self::Error(err) => write!(f, "{err:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkExecutionError {
    /// `∞`: Out of gas
    OutOfGas,
    /// `☇`: Panic on execution
    Panic,
    /// `⊚`: The reported number of exports made is invalid
    BadExports,
    /// `BAD`: Service code not available for lookup
    Bad,
    /// `BIG`: Code size exceeds the maximum service code size
    Big,
}
