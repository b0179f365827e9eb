use acc_common::ServiceId;
use acc_state::types::{
    AuthQueue, PrivilegedServices, ServiceAccount, ServiceAccounts, StagingSet,
};
use std::collections::{BTreeMap, BTreeSet};

/// The subset of global state an accumulation may read and alter.
///
/// Represents `U` of the GP.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulatePartialState {
    /// **`d`**: Service accounts
    pub accounts: ServiceAccounts,
    /// **`i`**: Staging validator set
    pub staging_set: StagingSet,
    /// **`q`**: Authorizer queues, one per core
    pub auth_queue: AuthQueue,
    /// **`x`**: Privileged services
    pub privileges: PrivilegedServices,
}

impl AccumulatePartialState {
    pub fn account(&self, service_id: ServiceId) -> Option<&ServiceAccount> {
        self.accounts.get(&service_id)
    }
}

/// Changes made by a single-service accumulation, relative to the snapshot it observed.
///
/// Account changes are scoped to the host itself, the accounts it created and
/// the accounts it ejected. Shared-pool fields are proposals: they take effect only when
/// the host holds the matching privilege in the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialStateFragment {
    /// Post-state of the host account; `None` if unchanged.
    pub host_account: Option<ServiceAccount>,
    /// **`n`**: Accounts created by the host.
    pub new_accounts: BTreeMap<ServiceId, ServiceAccount>,
    /// **`m`**: Accounts ejected by the host.
    pub ejected_accounts: BTreeSet<ServiceId>,
    /// New allocation of `StagingSet`, requested by the designate service.
    pub new_staging_set: Option<StagingSet>,
    /// New allocation of `AuthQueue`, requested by the assign services.
    pub new_auth_queue: Option<AuthQueue>,
    /// New allocation of `PrivilegedServices`, requested by the manager service.
    pub new_privileges: Option<PrivilegedServices>,
}

impl PartialStateFragment {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
