use proptest::prelude::*;

use suncoin_emission::{EmissionPolicy, ReservedAddressTable, DISTRIBUTION_ADDRESSES};
use suncoin_types::{EmissionParams, Output, OutputHash};

fn policy(unlocked: u64) -> EmissionPolicy {
    let params = EmissionParams {
        initial_unlocked_count: unlocked,
        ..EmissionParams::default()
    };
    EmissionPolicy::new(ReservedAddressTable::new(params, &DISTRIBUTION_ADDRESSES).unwrap())
}

proptest! {
    /// A spend is locked exactly when one of its outputs sits at or past
    /// the unlocked prefix of the table.
    #[test]
    fn locked_iff_any_ordinal_past_prefix(
        unlocked in 0u64..=100,
        ordinals in prop::collection::vec(0usize..100, 0..8),
    ) {
        let policy = policy(unlocked);
        let spend: Vec<Output> = ordinals
            .iter()
            .map(|&i| Output::new(OutputHash::ZERO, policy.table().addresses()[i], 1, 0))
            .collect();
        let expected = ordinals.iter().any(|&i| i as u64 >= unlocked);
        prop_assert_eq!(policy.is_transaction_locked(&spend), expected);
    }

    /// Every table entry is in exactly one of the two sets.
    #[test]
    fn entry_lock_state_matches_policy(unlocked in 0u64..=100) {
        let policy = policy(unlocked);
        for entry in policy.table().entries() {
            prop_assert_eq!(entry.locked, policy.is_locked(&entry.address));
        }
    }
}
