use acc_common::{ServiceId, UnsignedGas, CORE_COUNT};
use acc_limited_vec::FixedVec;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

pub type AssignServices = FixedVec<ServiceId, CORE_COUNT>;
pub type AlwaysAccumulateServices = BTreeMap<ServiceId, UnsignedGas>;

/// Identifier of services that are allowed to conduct privileged state transitions,
/// along with metadata of the always-accumulate services.
///
/// Represents `χ` of the GP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegedServices {
    /// `M`: A privileged service that can alter privileged services state.
    pub manager_service: ServiceId,
    /// `A`: Privileged services that can alter the auth queue, one for each core.
    pub assign_services: AssignServices,
    /// `V`: A privileged service that can alter the staging validator set (`ι`).
    pub designate_service: ServiceId,
    /// `Z`: A mapping of always-accumulate services and their basic gas usages.
    pub always_accumulate_services: AlwaysAccumulateServices,
}

impl Display for PrivilegedServices {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        writeln!(f, "PrivilegedServices {{")?;
        writeln!(f, "  manager: {}", self.manager_service)?;
        writeln!(f, "  assign: {:?}", self.assign_services.as_slice())?;
        writeln!(f, "  designate: {}", self.designate_service)?;
        writeln!(f, "  always_accumulate: [")?;
        for (s, g) in self.always_accumulate_services.iter() {
            writeln!(f, "    (service={s}, gas={g}),")?;
        }
        writeln!(f, "  ]")?;
        write!(f, "}}")
    }
}

impl PrivilegedServices {
    /// Total gas granted to the always-accumulate services.
    pub fn always_accumulate_gas(&self) -> UnsignedGas {
        self.always_accumulate_services
            .values()
            .fold(0, |acc, gas| acc.saturating_add(*gas))
    }
}
