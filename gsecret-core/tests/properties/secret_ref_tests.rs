//! Property-based tests for `<id>[@<version>]` parsing

use gsecret_core::models::{SecretRef, SecretVersion, split_credential_pair};
use proptest::prelude::*;

proptest! {
    #[test]
    fn id_and_version_split(id in "[a-zA-Z0-9_-]{1,32}", version in 1u32..10_000) {
        let parsed = SecretRef::parse(&format!("{id}@{version}"));
        prop_assert_eq!(parsed.token, id);
        prop_assert_eq!(parsed.version, SecretVersion::Specific(version.to_string()));
    }

    #[test]
    fn bare_id_is_latest(id in "[a-zA-Z0-9_-]{1,32}") {
        let parsed = SecretRef::parse(&id);
        prop_assert_eq!(parsed.token, id);
        prop_assert_eq!(parsed.version, SecretVersion::Latest);
    }

    #[test]
    fn credential_pair_splits_on_first_colon(user in "[a-z]{1,12}", pass in "[a-zA-Z0-9:]{0,24}") {
        let value = format!("{user}:{pass}");
        prop_assert_eq!(split_credential_pair(&value), Some((user.as_str(), pass.as_str())));
    }
}
