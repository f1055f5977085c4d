//! Property-based tests for account validation

use proptest::prelude::*;

use polygone::backend::auth::users::{is_valid_username, validate_password};

proptest! {
    #[test]
    fn test_well_formed_usernames_accepted(name in "[a-zA-Z][a-zA-Z0-9_]{2,29}") {
        prop_assert!(is_valid_username(&name));
    }

    #[test]
    fn test_usernames_starting_with_digit_rejected(name in "[0-9_][a-zA-Z0-9_]{2,29}") {
        prop_assert!(!is_valid_username(&name));
    }

    #[test]
    fn test_long_usernames_rejected(name in "[a-z]{31,60}") {
        prop_assert!(!is_valid_username(&name));
    }

    #[test]
    fn test_short_passwords_rejected(password in "[a-zA-Z0-9]{0,7}") {
        prop_assert!(validate_password(&password).is_err());
    }
}
