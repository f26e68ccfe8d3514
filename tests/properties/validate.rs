//! Property tests for config value validation.

use proptest::prelude::*;

use hoist::config::validate::{validate_domain, validate_remote_root, validate_word};

/// Characters that change the meaning of a shell command line.
const SHELL_META: &[char] = &[
    ';', '&', '|', '`', '$', '(', ')', '<', '>', '\'', '"', '\\', ' ', '\n', '*', '?',
];

fn dns_label() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-z0-9]([a-z0-9-]{0,10}[a-z0-9])?").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Well-formed DNS names are accepted.
    #[test]
    fn property_dns_names_are_valid(labels in proptest::collection::vec(dns_label(), 1..=4)) {
        let domain = labels.join(".");
        prop_assert!(validate_domain("app.domain", &domain).is_ok());
    }

    /// PROPERTY: Any shell metacharacter makes a value invalid, wherever it sits.
    #[test]
    fn property_shell_metacharacters_are_rejected(
        prefix in "[a-z]{1,8}",
        suffix in "[a-z]{0,8}",
        meta in proptest::sample::select(SHELL_META),
    ) {
        let value = format!("{prefix}{meta}{suffix}");
        prop_assert!(validate_domain("app.domain", &value).is_err());
        prop_assert!(validate_word("app.service_name", &value).is_err());
        let root = format!("/srv/{value}");
        prop_assert!(validate_remote_root("app.remote_root", &root).is_err());
    }

    /// PROPERTY: Remote roots that climb out with `..` are rejected.
    #[test]
    fn property_parent_segments_are_rejected(a in "[a-z]{1,8}", b in "[a-z]{1,8}") {
        let root = format!("/{a}/../{b}");
        prop_assert!(validate_remote_root("app.remote_root", &root).is_err());
    }
}
