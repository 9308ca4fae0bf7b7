//! Integration tests for the integrity engine
//!
//! Walks through duplicate detection, referential guards, reparenting,
//! and blank identity against the venue catalog.

use encore_foundation::{ErrorKind, Key};
use encore_storage::{DuplicateFinder, Lifecycle};

use crate::fixture::{
    EVENT, GENRE, LOCATION, SERIES, SET, child_names, event, graph, set, top_level,
};

// =============================================================================
// Duplicate keys
// =============================================================================

#[test]
fn second_event_on_same_date_rejected() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();
    event(&mut graph, freds, "2013/05/01").unwrap();

    let err = event(&mut graph, freds, "2013/05/01").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateKey { .. }));
    let message = err.to_string();
    assert!(message.contains("2013/05/01"));
    assert!(message.contains("Fred's"));
    assert_eq!(graph.children(freds, EVENT).unwrap().len(), 1);
}

#[test]
fn duplicate_detection_ignores_case() {
    let mut graph = graph();
    top_level(&mut graph, GENRE, "Jazz").unwrap();
    let err = top_level(&mut graph, GENRE, "JAZZ").unwrap_err();
    assert_eq!(err.to_string(), "another Genre with Name 'JAZZ' already exists");
}

#[test]
fn same_date_at_different_locations_allowed() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();
    let bijou = top_level(&mut graph, LOCATION, "Bijou").unwrap();
    let a = event(&mut graph, freds, "2013/05/01").unwrap();
    let b = event(&mut graph, bijou, "2013/05/01").unwrap();
    assert_ne!(graph.key(a).unwrap(), graph.key(b).unwrap());
}

#[test]
fn duplicate_finder_sees_persisted_population() {
    let mut graph = graph();
    let jazz = top_level(&mut graph, GENRE, "Jazz").unwrap();
    let pending = graph.create(GENRE).unwrap();
    graph.set_simple_key(pending, Some("Blues")).unwrap();

    let finder = DuplicateFinder::new(&graph);
    assert_eq!(finder.find(GENRE, "jazz", None, None), Some(jazz));
    assert_eq!(finder.find(GENRE, "jazz", None, Some(jazz)), None);
    assert_eq!(finder.find(GENRE, "blues", None, None), None);
    assert_eq!(finder.find(LOCATION, "jazz", None, None), None);
}

// =============================================================================
// Referential guard
// =============================================================================

#[test]
fn location_with_event_cannot_be_removed() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();
    event(&mut graph, freds, "2013/05/01").unwrap();
    let before = graph.len();

    let err = graph.remove(freds).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ReferentialIntegrity { .. }));
    assert!(err.to_string().contains("1 Event"));
    assert_eq!(graph.len(), before);
    assert_eq!(graph.lifecycle(freds).unwrap(), Lifecycle::Persisted);
}

#[test]
fn guard_counts_non_identifying_children() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();
    let jazz = top_level(&mut graph, GENRE, "Jazz").unwrap();
    let ev = event(&mut graph, freds, "2013/05/01").unwrap();
    set(&mut graph, ev, "01", jazz).unwrap();
    set(&mut graph, ev, "02", jazz).unwrap();

    let err = graph.remove(jazz).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Genre 'Jazz' cannot be removed because it is referenced by 2 Sets"
    );
}

#[test]
fn removed_entity_leaves_parent_collections() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();
    let sundays = top_level(&mut graph, SERIES, "Sundays").unwrap();
    let ev = event(&mut graph, freds, "2013/05/01").unwrap();
    graph.set_non_identifying_parent(ev, SERIES, Some(sundays)).unwrap();

    graph.remove(ev).unwrap();
    assert!(graph.children(freds, EVENT).unwrap().is_empty());
    assert!(graph.children(sundays, EVENT).unwrap().is_empty());
    assert_eq!(graph.lifecycle(ev).unwrap(), Lifecycle::Removed);
    graph.remove(freds).unwrap();
    graph.check_integrity().unwrap();
}

// =============================================================================
// Reparenting
// =============================================================================

#[test]
fn moving_event_updates_both_locations() {
    let mut graph = graph();
    let a = top_level(&mut graph, LOCATION, "Apollo").unwrap();
    let b = top_level(&mut graph, LOCATION, "Bijou").unwrap();
    let ev = event(&mut graph, a, "2013/05/01").unwrap();
    event(&mut graph, b, "2013/06/01").unwrap();

    graph.set_identifying_parent(ev, Some(b)).unwrap();
    assert_eq!(graph.children(a, EVENT).unwrap().len(), 0);
    assert_eq!(graph.children(b, EVENT).unwrap().len(), 2);
    assert_eq!(graph.parent(ev, LOCATION).unwrap(), Some(b));
    assert_eq!(graph.key(ev).unwrap().to_string(), "Bijou|2013/05/01");
}

#[test]
fn moving_onto_taken_date_changes_nothing() {
    let mut graph = graph();
    let a = top_level(&mut graph, LOCATION, "Apollo").unwrap();
    let b = top_level(&mut graph, LOCATION, "Bijou").unwrap();
    let ev = event(&mut graph, a, "2013/05/01").unwrap();
    event(&mut graph, b, "2013/05/01").unwrap();

    let err = graph.set_identifying_parent(ev, Some(b)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateKey { .. }));
    assert_eq!(graph.children(a, EVENT).unwrap().len(), 1);
    assert_eq!(graph.children(b, EVENT).unwrap().len(), 1);
    assert_eq!(graph.parent(ev, LOCATION).unwrap(), Some(a));
}

#[test]
fn move_re_keys_grandchildren() {
    let mut graph = graph();
    let a = top_level(&mut graph, LOCATION, "Apollo").unwrap();
    let b = top_level(&mut graph, LOCATION, "Bijou").unwrap();
    let jazz = top_level(&mut graph, GENRE, "Jazz").unwrap();
    let ev = event(&mut graph, a, "2013/05/01").unwrap();
    let first = set(&mut graph, ev, "01", jazz).unwrap();

    graph.set_identifying_parent(ev, Some(b)).unwrap();
    assert_eq!(graph.key(first).unwrap().to_string(), "Bijou|2013/05/01|01");
    let via_genre: Vec<Key> = graph.children(jazz, SET).unwrap().keys().cloned().collect();
    assert_eq!(via_genre, vec![graph.key(first).unwrap()]);
    graph.check_integrity().unwrap();
}

#[test]
fn wrong_identifying_parent_type_rejected() {
    let mut graph = graph();
    let jazz = top_level(&mut graph, GENRE, "Jazz").unwrap();
    let ev = graph.create(EVENT).unwrap();
    graph.set_simple_key(ev, Some("2013/05/01")).unwrap();
    let err = graph.set_identifying_parent(ev, Some(jazz)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::IdentifyingParentTypeMismatch { .. }));
}

#[test]
fn optional_parent_set_and_cleared() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();
    let sundays = top_level(&mut graph, SERIES, "Sundays").unwrap();
    let ev = event(&mut graph, freds, "2013/05/01").unwrap();

    graph.add_child(sundays, ev).unwrap();
    assert_eq!(graph.parent(ev, SERIES).unwrap(), Some(sundays));
    assert!(graph.children(sundays, EVENT).unwrap().contains(ev));

    graph.remove_child(sundays, ev).unwrap();
    assert_eq!(graph.parent(ev, SERIES).unwrap(), None);
    assert!(graph.children(sundays, EVENT).unwrap().is_empty());
}

#[test]
fn mandatory_parent_cannot_be_cleared() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();
    let jazz = top_level(&mut graph, GENRE, "Jazz").unwrap();
    let ev = event(&mut graph, freds, "2013/05/01").unwrap();
    let first = set(&mut graph, ev, "01", jazz).unwrap();

    let err = graph.set_non_identifying_parent(first, GENRE, None).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingMandatoryParent { .. }));
    let err = graph.set_identifying_parent(ev, None).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingMandatoryParent { .. }));
    assert_eq!(graph.parent(first, GENRE).unwrap(), Some(jazz));
}

#[test]
fn persist_requires_mandatory_parent() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();
    let ev = event(&mut graph, freds, "2013/05/01").unwrap();
    let pending = graph.create(SET).unwrap();
    graph.set_simple_key(pending, Some("01")).unwrap();
    graph.set_identifying_parent(pending, Some(ev)).unwrap();

    let err = graph.persist(pending).unwrap_err();
    assert_eq!(err.to_string(), "Set 'Fred's|2013/05/01|01' requires a Genre");
    assert_eq!(graph.lifecycle(pending).unwrap(), Lifecycle::PersistencePending);
}

// =============================================================================
// Blank identity
// =============================================================================

#[test]
fn blank_name_keeps_previous_value() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();

    let err = graph.set_simple_key(freds, None).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BlankIdentity { .. }));
    assert_eq!(err.to_string(), "Location.Name must be specified");
    assert!(graph.set_simple_key(freds, Some("  ")).is_err());
    assert_eq!(graph.key(freds).unwrap().simple(), "Fred's");
}

#[test]
fn rename_re_sorts_siblings() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();
    let jazz = top_level(&mut graph, GENRE, "Jazz").unwrap();
    let ev = event(&mut graph, freds, "2013/05/01").unwrap();
    let first = set(&mut graph, ev, "01", jazz).unwrap();
    set(&mut graph, ev, "02", jazz).unwrap();

    graph.set_simple_key(first, Some("03")).unwrap();
    assert_eq!(child_names(&graph, ev, SET), vec!["02", "03"]);
    assert_eq!(child_names(&graph, jazz, SET), vec!["02", "03"]);
}

#[test]
fn rename_onto_sibling_rejected() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();
    let a = event(&mut graph, freds, "2013/05/01").unwrap();
    event(&mut graph, freds, "2013/05/02").unwrap();

    let err = graph.set_simple_key(a, Some("2013/05/02")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateKey { .. }));
    assert_eq!(child_names(&graph, freds, EVENT), vec!["2013/05/01", "2013/05/02"]);
}

// =============================================================================
// Lookup
// =============================================================================

#[test]
fn resolve_walks_the_parent_chain() {
    let mut graph = graph();
    let freds = top_level(&mut graph, LOCATION, "Fred's").unwrap();
    let jazz = top_level(&mut graph, GENRE, "Jazz").unwrap();
    let ev = event(&mut graph, freds, "2013/05/01").unwrap();
    let first = set(&mut graph, ev, "01", jazz).unwrap();

    let key = Key::from_segments(&["FRED'S", "2013/05/01", "01"]).unwrap();
    assert_eq!(graph.resolve(SET, &key).unwrap(), Some(first));
    let missing = Key::from_segments(&["Bijou", "2013/05/01", "01"]).unwrap();
    assert_eq!(graph.resolve(SET, &missing).unwrap(), None);
}

#[test]
fn entities_of_sorted_by_key() {
    let mut graph = graph();
    for name in ["Zed's", "apollo", "Bijou"] {
        top_level(&mut graph, LOCATION, name).unwrap();
    }
    let names: Vec<String> = graph
        .entities_of(LOCATION)
        .into_iter()
        .map(|id| graph.key(id).unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["apollo", "Bijou", "Zed's"]);
}
