//! Eligibility filtering
//!
//! A pure decision function over `(Operation, NormalizedStatus, all flag,
//! status column present)`. It never consults network state, so a resumed
//! run recomputes an identical eligible set given the same CSV and flags.
//!
//! The unknown-status policy is deliberately asymmetric: suspending an
//! account whose status cannot be determined is the conservative default for
//! offboarding, while restoring one risks reactivating an account that
//! should stay deactivated.

use crate::types::{NormalizedStatus, Operation};

/// Decide whether a row should be processed under the current operation
///
/// With `--all`, or when the input has no status column, every row is
/// eligible. Otherwise Suspend takes Active and Unknown rows; Restore takes
/// only Inactive rows.
pub fn eligible(
    operation: Operation,
    status: NormalizedStatus,
    all_flag: bool,
    status_column_present: bool,
) -> bool {
    if all_flag || !status_column_present {
        return true;
    }
    match (operation, status) {
        (Operation::Suspend, NormalizedStatus::Inactive) => false,
        (Operation::Suspend, _) => true,
        (Operation::Restore, NormalizedStatus::Inactive) => true,
        (Operation::Restore, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // Full decision table from the eligibility contract
    #[rstest]
    #[case::suspend_all_active(Operation::Suspend, NormalizedStatus::Active, true, true, true)]
    #[case::suspend_all_inactive(Operation::Suspend, NormalizedStatus::Inactive, true, true, true)]
    #[case::suspend_all_unknown(Operation::Suspend, NormalizedStatus::Unknown, true, true, true)]
    #[case::suspend_no_col_active(Operation::Suspend, NormalizedStatus::Active, false, false, true)]
    #[case::suspend_no_col_inactive(Operation::Suspend, NormalizedStatus::Inactive, false, false, true)]
    #[case::suspend_no_col_unknown(Operation::Suspend, NormalizedStatus::Unknown, false, false, true)]
    #[case::suspend_active(Operation::Suspend, NormalizedStatus::Active, false, true, true)]
    #[case::suspend_inactive(Operation::Suspend, NormalizedStatus::Inactive, false, true, false)]
    #[case::suspend_unknown(Operation::Suspend, NormalizedStatus::Unknown, false, true, true)]
    #[case::restore_all_active(Operation::Restore, NormalizedStatus::Active, true, true, true)]
    #[case::restore_all_inactive(Operation::Restore, NormalizedStatus::Inactive, true, true, true)]
    #[case::restore_all_unknown(Operation::Restore, NormalizedStatus::Unknown, true, true, true)]
    #[case::restore_no_col_active(Operation::Restore, NormalizedStatus::Active, false, false, true)]
    #[case::restore_no_col_inactive(Operation::Restore, NormalizedStatus::Inactive, false, false, true)]
    #[case::restore_no_col_unknown(Operation::Restore, NormalizedStatus::Unknown, false, false, true)]
    #[case::restore_active(Operation::Restore, NormalizedStatus::Active, false, true, false)]
    #[case::restore_inactive(Operation::Restore, NormalizedStatus::Inactive, false, true, true)]
    #[case::restore_unknown(Operation::Restore, NormalizedStatus::Unknown, false, true, false)]
    fn test_eligibility_table(
        #[case] operation: Operation,
        #[case] status: NormalizedStatus,
        #[case] all_flag: bool,
        #[case] status_column_present: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(
            eligible(operation, status, all_flag, status_column_present),
            expected
        );
    }

    #[test]
    fn test_asymmetric_unknown_policy() {
        assert!(eligible(
            Operation::Suspend,
            NormalizedStatus::Unknown,
            false,
            true
        ));
        assert!(!eligible(
            Operation::Restore,
            NormalizedStatus::Unknown,
            false,
            true
        ));
    }
}
