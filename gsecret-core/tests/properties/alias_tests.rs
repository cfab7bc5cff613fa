//! Property-based tests for numeric alias resolution

use gsecret_core::cache::LocalIndex;
use proptest::prelude::*;

// Strategy for generating identifier lists, unique and non-empty
fn arb_ids() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[a-z][a-z0-9_-]{0,23}", 1..20)
        .prop_map(|set| set.into_iter().collect())
}

proptest! {
    #[test]
    fn alias_round_trip(ids in arb_ids(), pick in any::<prop::sample::Index>()) {
        let index = LocalIndex::new(ids.clone());
        let k = pick.index(ids.len());
        let token = k.to_string();
        prop_assert_eq!(index.resolve(&token), ids[k].as_str());
    }

    #[test]
    fn out_of_range_index_is_literal(ids in arb_ids(), extra in 0usize..1000) {
        let index = LocalIndex::new(ids.clone());
        let token = (ids.len() + extra).to_string();
        prop_assert_eq!(index.resolve(&token), token.as_str());
    }

    #[test]
    fn non_numeric_token_is_literal(ids in arb_ids(), token in "[a-z@:_-][a-z0-9@:_ -]{0,30}") {
        let index = LocalIndex::new(ids);
        prop_assert_eq!(index.resolve(&token), token.as_str());
    }

    #[test]
    fn replace_then_resolve_matches_listing(old in arb_ids(), new in arb_ids()) {
        let mut index = LocalIndex::new(old);
        index.replace(new.clone());
        prop_assert_eq!(index.ids(), new.as_slice());
        for (k, id) in new.iter().enumerate() {
            let token = k.to_string();
            prop_assert_eq!(index.resolve(&token), id.as_str());
        }
    }
}
