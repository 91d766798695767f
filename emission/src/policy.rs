//! Spendability rule for outputs owned by reserved addresses.

use std::collections::HashSet;

use suncoin_types::{Address, Output};

use crate::distribution::ReservedAddressTable;

/// Decides whether spending an output is vetoed by the emission schedule.
///
/// Built once from an immutable [`ReservedAddressTable`]; every query is a
/// pure function of that table.
#[derive(Clone, Debug)]
pub struct EmissionPolicy {
    table: ReservedAddressTable,
    locked: HashSet<Address>,
}

impl EmissionPolicy {
    pub fn new(table: ReservedAddressTable) -> Self {
        let locked = table.addresses()[table.unlocked_len()..]
            .iter()
            .copied()
            .collect();
        Self { table, locked }
    }

    pub fn table(&self) -> &ReservedAddressTable {
        &self.table
    }

    /// Reserved addresses whose outputs may not be spent, in table order.
    pub fn locked_addresses(&self) -> &[Address] {
        &self.table.addresses()[self.table.unlocked_len()..]
    }

    /// Reserved addresses whose outputs are spendable, in table order.
    pub fn unlocked_addresses(&self) -> &[Address] {
        &self.table.addresses()[..self.table.unlocked_len()]
    }

    /// Whether `address` is a locked reserved address.
    pub fn is_locked(&self, address: &Address) -> bool {
        self.locked.contains(address)
    }

    /// Returns true if any of `spent` is owned by a locked reserved address.
    ///
    /// A locked transaction must be rejected as a whole.
    pub fn is_transaction_locked(&self, spent: &[Output]) -> bool {
        spent.iter().any(|out| self.is_locked(&out.address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::DISTRIBUTION_ADDRESSES;
    use suncoin_types::{EmissionParams, OutputHash};

    fn policy_with_unlocked(count: u64) -> EmissionPolicy {
        let params = EmissionParams {
            initial_unlocked_count: count,
            ..EmissionParams::default()
        };
        EmissionPolicy::new(
            ReservedAddressTable::new(params, &DISTRIBUTION_ADDRESSES).expect("valid table"),
        )
    }

    fn output_at(policy: &EmissionPolicy, ordinal: usize) -> Output {
        let address = policy.table().addresses()[ordinal];
        Output::new(OutputHash::new([ordinal as u8; 32]), address, 3_000_000, 0)
    }

    #[test]
    fn locked_and_unlocked_partition_the_table() {
        for count in [0u64, 1, 100] {
            let policy = policy_with_unlocked(count);
            let unlocked = policy.unlocked_addresses();
            let locked = policy.locked_addresses();

            assert_eq!(unlocked.len(), count as usize);
            assert_eq!(unlocked.len() + locked.len(), 100);

            let rejoined: Vec<Address> = unlocked.iter().chain(locked).copied().collect();
            assert_eq!(rejoined, policy.table().addresses());

            let unlocked_set: HashSet<_> = unlocked.iter().collect();
            assert!(locked.iter().all(|a| !unlocked_set.contains(a)));
        }
    }

    #[test]
    fn first_locked_address_locks_the_transaction() {
        let policy = policy_with_unlocked(1);
        assert!(policy.is_transaction_locked(&[output_at(&policy, 1)]));
    }

    #[test]
    fn last_unlocked_address_is_spendable() {
        let policy = policy_with_unlocked(1);
        assert!(!policy.is_transaction_locked(&[output_at(&policy, 0)]));

        let policy = policy_with_unlocked(25);
        assert!(!policy.is_transaction_locked(&[output_at(&policy, 24)]));
        assert!(policy.is_transaction_locked(&[output_at(&policy, 25)]));
    }

    #[test]
    fn one_locked_output_taints_the_whole_spend() {
        let policy = policy_with_unlocked(1);
        let spend = [output_at(&policy, 0), output_at(&policy, 42)];
        assert!(policy.is_transaction_locked(&spend));
    }

    #[test]
    fn unrelated_and_empty_spends_are_not_locked() {
        let policy = policy_with_unlocked(1);
        let stranger = Output::new(OutputHash::ZERO, Address::new(0, [7u8; 20]), 10, 1);
        assert!(!policy.is_transaction_locked(&[stranger]));
        assert!(!policy.is_transaction_locked(&[]));
    }

    #[test]
    fn fully_unlocked_table_locks_nothing() {
        let policy = policy_with_unlocked(100);
        assert!(policy.locked_addresses().is_empty());
        let all: Vec<Output> = (0..100).map(|i| output_at(&policy, i)).collect();
        assert!(!policy.is_transaction_locked(&all));
    }
}
