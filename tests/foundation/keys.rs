//! Integration tests for composite keys
//!
//! Tests case-insensitive equality, ordering through identifying parents,
//! and the total order sorting relies on.

use std::cmp::Ordering;
use std::collections::HashSet;

use encore_foundation::{ErrorKind, Key, KeySide};
use proptest::prelude::*;

fn path(segments: &[&str]) -> Key {
    Key::from_segments(segments).unwrap()
}

// =============================================================================
// Equality
// =============================================================================

#[test]
fn equality_ignores_case() {
    assert_eq!(Key::top_level("fred's"), Key::top_level("Fred's"));
    assert_eq!(path(&["FRED'S", "2013/05/01"]), path(&["fred's", "2013/05/01"]));
}

#[test]
fn parent_participates_in_equality() {
    assert_ne!(path(&["Fred's", "2013/05/01"]), path(&["Bijou", "2013/05/01"]));
    assert_ne!(Key::top_level("2013/05/01"), path(&["Fred's", "2013/05/01"]));
}

#[test]
fn equal_keys_hash_alike() {
    let mut seen = HashSet::new();
    seen.insert(path(&["Fred's", "2013/05/01"]));
    assert!(seen.contains(&path(&["FRED'S", "2013/05/01"])));
    assert!(!seen.contains(&path(&["Fred's", "2013/05/02"])));
}

// =============================================================================
// Ordering
// =============================================================================

#[test]
fn top_level_order() {
    assert!(Key::top_level("A") < Key::top_level("B"));
    assert!(Key::top_level("a") < Key::top_level("B"));
    assert!(Key::top_level("A") < Key::top_level("b"));
}

#[test]
fn simple_key_compared_before_parent() {
    let early_at_z = path(&["Zed's", "2013/05/01"]);
    let late_at_a = path(&["Apollo", "2013/06/01"]);
    assert!(early_at_z < late_at_a);
}

#[test]
fn parent_breaks_ties() {
    assert!(path(&["Apollo", "2013/05/01"]) < path(&["Bijou", "2013/05/01"]));
}

#[test]
fn missing_parent_sorts_first() {
    assert!(Key::top_level("01") < path(&["Fred's", "01"]));
}

#[test]
fn try_compare_requires_both_keys() {
    let key = Key::top_level("A");
    assert_eq!(
        Key::try_compare(Some(&key), Some(&Key::top_level("a"))).unwrap(),
        Ordering::Equal
    );
    let err = Key::try_compare(None, Some(&key)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingKeyArgument(KeySide::Left)));
    let err = Key::try_compare(Some(&key), None).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingKeyArgument(KeySide::Right)));
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn displays_root_first() {
    let key = path(&["Fred's", "2013/05/01", "01"]);
    assert_eq!(key.to_string(), "Fred's|2013/05/01|01");
    assert_eq!(key.segments(), vec!["Fred's", "2013/05/01", "01"]);
    assert_eq!(key.depth(), 3);
    assert_eq!(key.parent().unwrap().to_string(), "Fred's|2013/05/01");
}

// =============================================================================
// Total order
// =============================================================================

fn arb_key() -> impl Strategy<Value = Key> {
    prop::collection::vec("[a-cA-C]{1,2}", 1..4)
        .prop_map(|segments| Key::from_segments(&segments[..]).unwrap())
}

fn upper_segments(key: &Key) -> Vec<String> {
    key.segments().iter().map(|s| s.to_uppercase()).collect()
}

proptest! {
    #[test]
    fn order_is_antisymmetric(a in arb_key(), b in arb_key()) {
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        prop_assert_eq!(a == b, a.cmp(&b) == Ordering::Equal);
    }

    #[test]
    fn order_is_transitive(a in arb_key(), b in arb_key(), c in arb_key()) {
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
    }

    #[test]
    fn equality_matches_uppercased_segments(a in arb_key(), b in arb_key()) {
        prop_assert_eq!(a == b, upper_segments(&a) == upper_segments(&b));
    }

    #[test]
    fn sorting_twice_gives_same_order(mut keys in prop::collection::vec(arb_key(), 0..20)) {
        keys.sort();
        let first: Vec<Vec<String>> = keys.iter().map(upper_segments).collect();
        keys.reverse();
        keys.sort();
        let second: Vec<Vec<String>> = keys.iter().map(upper_segments).collect();
        prop_assert_eq!(first, second);
        for pair in keys.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }
}
