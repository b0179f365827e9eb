use crate::error::TransitionError;
use acc_crypto::{hash, Blake2b256};
use acc_pvm_types::invoke_results::ProvidedPreimage;
use acc_state::types::{ServiceAccounts, Timeslot};

/// State transition function of service accounts by the preimages extrinsic.
///
/// Entries must be strictly ordered by `(service_id, blob)` and each must be solicited by
/// its service in `accounts` (`δ‡`). Every entry is checked before any account is altered.
/// Accepted blobs are stored and their lookup entries set to `[τ′]`.
pub fn transition_preimage_extrinsics(
    accounts: &mut ServiceAccounts,
    preimages: &[ProvidedPreimage],
    curr_timeslot: Timeslot,
) -> Result<(), TransitionError> {
    let is_sorted_unique = preimages
        .windows(2)
        .all(|w| (w[0].service_id, &w[0].blob) < (w[1].service_id, &w[1].blob));
    if !is_sorted_unique {
        return Err(TransitionError::PreimagesNotSortedUnique);
    }

    let mut integrations = Vec::with_capacity(preimages.len());
    for ProvidedPreimage { service_id, blob } in preimages {
        let preimage_hash = hash::<Blake2b256>(blob)?;
        let solicited = accounts
            .get(service_id)
            .is_some_and(|a| a.is_preimage_solicited(&preimage_hash, blob.len() as u32));
        if !solicited {
            return Err(TransitionError::PreimageNotSolicited(*service_id));
        }
        integrations.push((*service_id, preimage_hash, blob.clone()));
    }

    for (service_id, preimage_hash, blob) in integrations {
        if let Some(account) = accounts.get_mut(&service_id) {
            account.provide_preimage(preimage_hash, blob, curr_timeslot.slot());
        }
    }
    tracing::debug!("Integrated {} preimage extrinsics", preimages.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use acc_common::Octets;
    use acc_test_utils::fixtures::service_accounts;

    fn preimage(service_id: u32, blob: &[u8]) -> ProvidedPreimage {
        ProvidedPreimage {
            service_id,
            blob: Octets::new(blob),
        }
    }

    fn solicit(accounts: &mut ServiceAccounts, entry: &ProvidedPreimage) {
        let preimage_hash = hash::<Blake2b256>(&entry.blob).unwrap();
        accounts
            .get_mut(&entry.service_id)
            .unwrap()
            .lookups
            .insert((preimage_hash, entry.blob.len() as u32), vec![]);
    }

    #[test]
    fn test_solicited_preimages_integrated() -> Result<(), TransitionError> {
        let mut accounts = service_accounts(&[(1, 100), (2, 100)]);
        let preimages = vec![preimage(1, &[1, 2]), preimage(1, &[3]), preimage(2, &[0])];
        for entry in &preimages {
            solicit(&mut accounts, entry);
        }

        transition_preimage_extrinsics(&mut accounts, &preimages, Timeslot::new(9))?;

        for ProvidedPreimage { service_id, blob } in &preimages {
            let preimage_hash = hash::<Blake2b256>(blob)?;
            let account = &accounts[service_id];
            assert_eq!(account.preimages.get(&preimage_hash), Some(blob));
            assert_eq!(
                account.lookups.get(&(preimage_hash, blob.len() as u32)),
                Some(&vec![9])
            );
        }
        Ok(())
    }

    #[test]
    fn test_empty_extrinsic() -> Result<(), TransitionError> {
        let mut accounts = service_accounts(&[(1, 100)]);
        let before = accounts.clone();
        transition_preimage_extrinsics(&mut accounts, &[], Timeslot::new(9))?;
        assert_eq!(accounts, before);
        Ok(())
    }

    #[test]
    fn test_unsorted_preimages_rejected() {
        let mut accounts = service_accounts(&[(1, 100), (2, 100)]);
        let by_service = vec![preimage(2, &[0]), preimage(1, &[0])];
        let by_blob = vec![preimage(1, &[2]), preimage(1, &[1])];
        for entry in by_service.iter().chain(&by_blob) {
            solicit(&mut accounts, entry);
        }

        for preimages in [by_service, by_blob] {
            assert!(matches!(
                transition_preimage_extrinsics(&mut accounts, &preimages, Timeslot::new(9)),
                Err(TransitionError::PreimagesNotSortedUnique)
            ));
        }
    }

    #[test]
    fn test_duplicate_preimages_rejected() {
        let mut accounts = service_accounts(&[(1, 100)]);
        let preimages = vec![preimage(1, &[5]), preimage(1, &[5])];
        solicit(&mut accounts, &preimages[0]);

        assert!(matches!(
            transition_preimage_extrinsics(&mut accounts, &preimages, Timeslot::new(9)),
            Err(TransitionError::PreimagesNotSortedUnique)
        ));
    }

    #[test]
    fn test_unsolicited_preimage_rejects_whole_extrinsic() {
        let mut accounts = service_accounts(&[(1, 100), (2, 100)]);
        let preimages = vec![preimage(1, &[1]), preimage(2, &[1]), preimage(3, &[1])];
        solicit(&mut accounts, &preimages[0]);
        let before = accounts.clone();

        assert!(matches!(
            transition_preimage_extrinsics(&mut accounts, &preimages, Timeslot::new(9)),
            Err(TransitionError::PreimageNotSolicited(2))
        ));
        assert_eq!(accounts, before);
    }

    #[test]
    fn test_already_available_preimage_rejected() {
        let mut accounts = service_accounts(&[(1, 100)]);
        let entry = preimage(1, &[4]);
        let preimage_hash = hash::<Blake2b256>(&entry.blob).unwrap();
        accounts
            .get_mut(&1)
            .unwrap()
            .lookups
            .insert((preimage_hash, 1), vec![3]);

        assert!(matches!(
            transition_preimage_extrinsics(&mut accounts, &[entry], Timeslot::new(9)),
            Err(TransitionError::PreimageNotSolicited(1))
        ));
    }
}
