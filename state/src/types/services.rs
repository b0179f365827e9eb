use crate::error::StateError;
use acc_common::{
    Balance, CodeHash, LookupsKey, Octets, PreimagesKey, ServiceId, StorageKey, TimeslotIndex,
    UnsignedGas, MIN_BALANCE_PER_ITEM, MIN_BALANCE_PER_OCTET, MIN_BASIC_BALANCE,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Timeslots at which a preimage was requested or made available, up to 3 items.
pub type AccountLookupsEntry = Vec<TimeslotIndex>;

/// Service accounts keyed by service id.
///
/// Represents `δ` of the GP.
pub type ServiceAccounts = BTreeMap<ServiceId, ServiceAccount>;

/// Service account metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMetadata {
    /// `c`: Service code hash
    pub code_hash: CodeHash,
    /// `b`: Service account token balance
    pub balance: Balance,
    /// `g`: Service-specific gas limit for `accumulate`
    pub gas_limit_accumulate: UnsignedGas,
    /// `m`: Service-specific gas limit for `on_transfer`
    pub gas_limit_on_transfer: UnsignedGas,
    /// `o`: The number of total octets used by account storages
    pub octets_footprint: u64,
    /// `f`: Gratis storage offset
    pub gratis_storage_offset: Balance,
    /// `i`: The number of entries stored in account storages
    pub items_footprint: u32,
    /// `r`: The timeslot at the account creation
    pub created_at: TimeslotIndex,
    /// `a`: The timeslot at the most recent accumulation
    pub last_accumulate_at: TimeslotIndex,
}

impl AccountMetadata {
    pub fn balance(&self) -> Balance {
        self.balance
    }

    /// Adds balance to the account and returns the updated balance.
    /// Returns `None` if the balance overflows.
    pub fn add_balance(&mut self, amount: Balance) -> Option<Balance> {
        let new_balance = self.balance.checked_add(amount)?;
        self.balance = new_balance;
        Some(new_balance)
    }

    /// Get the account threshold balance (t)
    pub fn threshold_balance(&self) -> Balance {
        (MIN_BASIC_BALANCE
            + MIN_BALANCE_PER_ITEM * self.items_footprint as Balance
            + MIN_BALANCE_PER_OCTET * self.octets_footprint)
            .saturating_sub(self.gratis_storage_offset)
    }
}

/// A service account: metadata along with its storage, preimage and lookup dictionaries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub metadata: AccountMetadata,
    /// **`s`**: Storage dictionary
    pub storage: BTreeMap<StorageKey, Octets>,
    /// **`p`**: Preimage dictionary
    pub preimages: BTreeMap<PreimagesKey, Octets>,
    /// **`l`**: Preimage lookup dictionary
    #[serde(with = "lookups_as_entries")]
    pub lookups: BTreeMap<LookupsKey, AccountLookupsEntry>,
}

impl ServiceAccount {
    pub fn new(metadata: AccountMetadata) -> Self {
        Self {
            metadata,
            ..Default::default()
        }
    }

    /// Credits `amount` to the account balance.
    pub fn credit(&mut self, service_id: ServiceId, amount: Balance) -> Result<(), StateError> {
        self.metadata
            .add_balance(amount)
            .map(|_| ())
            .ok_or(StateError::BalanceOverflow(service_id))
    }

    /// Whether the preimage of `preimage_hash` with `length` octets is requested but not yet
    /// available: its lookup entry exists with no timeslots and the blob is not stored.
    pub fn is_preimage_solicited(&self, preimage_hash: &PreimagesKey, length: u32) -> bool {
        !self.preimages.contains_key(preimage_hash)
            && self
                .lookups
                .get(&(preimage_hash.clone(), length))
                .is_some_and(|entry| entry.is_empty())
    }

    /// Integrates a provided preimage blob keyed by its hash.
    ///
    /// The blob is accepted only when its lookup entry is absent or has no timeslots;
    /// the entry then records `timeslot`. Returns whether the blob was integrated.
    pub fn provide_preimage(
        &mut self,
        preimage_hash: PreimagesKey,
        blob: Octets,
        timeslot: TimeslotIndex,
    ) -> bool {
        let lookups_key = (preimage_hash.clone(), blob.len() as u32);
        match self.lookups.get_mut(&lookups_key) {
            Some(entry) if !entry.is_empty() => return false,
            Some(entry) => entry.push(timeslot),
            None => {
                // A fresh lookup entry counts two items and `81 + |blob|` octets.
                self.metadata.items_footprint += 2;
                self.metadata.octets_footprint += 81 + blob.len() as u64;
                self.lookups.insert(lookups_key, vec![timeslot]);
            }
        }
        self.preimages.insert(preimage_hash, blob);
        true
    }
}

/// Lookups keys are tuples, so the map serializes as a sequence of entries.
mod lookups_as_entries {
    use super::{AccountLookupsEntry, LookupsKey};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        lookups: &BTreeMap<LookupsKey, AccountLookupsEntry>,
        ser: S,
    ) -> Result<S::Ok, S::Error> {
        let entries: Vec<(&LookupsKey, &AccountLookupsEntry)> = lookups.iter().collect();
        entries.serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        der: D,
    ) -> Result<BTreeMap<LookupsKey, AccountLookupsEntry>, D::Error> {
        let entries = Vec::<(LookupsKey, AccountLookupsEntry)>::deserialize(der)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_common::Hash32;

    #[test]
    fn test_provide_preimage_fresh_entry() {
        let mut account = ServiceAccount::default();
        let blob = Octets::new(&[1, 2, 3]);
        assert!(account.provide_preimage(Hash32::new([7; 32]), blob.clone(), 5));
        assert_eq!(
            account.lookups.get(&(Hash32::new([7; 32]), 3)),
            Some(&vec![5])
        );
        assert_eq!(account.preimages.get(&Hash32::new([7; 32])), Some(&blob));
        assert_eq!(account.metadata.items_footprint, 2);
        assert_eq!(account.metadata.octets_footprint, 84);
    }

    #[test]
    fn test_provide_preimage_solicited_entry() {
        let mut account = ServiceAccount::default();
        account.lookups.insert((Hash32::new([7; 32]), 2), vec![]);
        assert!(account.provide_preimage(Hash32::new([7; 32]), Octets::new(&[0, 0]), 9));
        assert_eq!(
            account.lookups.get(&(Hash32::new([7; 32]), 2)),
            Some(&vec![9])
        );
        // Solicitation already accounted for the footprint.
        assert_eq!(account.metadata.items_footprint, 0);
    }

    #[test]
    fn test_provide_preimage_already_available() {
        let mut account = ServiceAccount::default();
        account.lookups.insert((Hash32::new([7; 32]), 1), vec![3]);
        assert!(!account.provide_preimage(Hash32::new([7; 32]), Octets::new(&[0]), 9));
        assert!(account.preimages.is_empty());
    }

    #[test]
    fn test_preimage_solicitation() {
        let mut account = ServiceAccount::default();
        let hash = Hash32::new([7; 32]);
        assert!(!account.is_preimage_solicited(&hash, 2));

        account.lookups.insert((hash.clone(), 2), vec![]);
        assert!(account.is_preimage_solicited(&hash, 2));
        assert!(!account.is_preimage_solicited(&hash, 3));

        account.provide_preimage(hash.clone(), Octets::new(&[0, 0]), 4);
        assert!(!account.is_preimage_solicited(&hash, 2));
    }

    #[test]
    fn test_credit_overflow() {
        let mut account = ServiceAccount::default();
        account.metadata.balance = Balance::MAX;
        assert!(matches!(
            account.credit(3, 1),
            Err(StateError::BalanceOverflow(3))
        ));
    }

    #[test]
    fn test_account_serde_round_trip() {
        let mut account = ServiceAccount::default();
        account.provide_preimage(Hash32::new([1; 32]), Octets::new(&[4, 2]), 1);
        account
            .storage
            .insert(Octets::new(b"key"), Octets::new(b"value"));
        let json = serde_json::to_string(&account).unwrap();
        let decoded: ServiceAccount = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, account);
    }

    #[test]
    fn test_threshold_balance() {
        let metadata = AccountMetadata {
            items_footprint: 2,
            octets_footprint: 100,
            ..Default::default()
        };
        assert_eq!(
            metadata.threshold_balance(),
            MIN_BASIC_BALANCE + 2 * MIN_BALANCE_PER_ITEM + 100 * MIN_BALANCE_PER_OCTET
        );
    }
}
