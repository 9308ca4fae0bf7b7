//! Integration tests for key paths and key formats

use encore_foundation::ErrorKind;
use encore_model::keys::{date_key, normalize, number_key};
use encore_model::path::{path_shape, split_path};
use encore_model::types::{CREDIT, EVENT, GENRE, LOCATION, SET};
use encore_model::{
    Entity, Event, EventType, Genre, Location, Set, new_graph, require_path, resolve_path,
};

#[test]
fn shapes_follow_identity_chain() {
    let graph = new_graph().unwrap();
    assert_eq!(path_shape(&graph, LOCATION).unwrap(), "Name");
    assert_eq!(path_shape(&graph, EVENT).unwrap(), "Location|Date");
    assert_eq!(
        path_shape(&graph, CREDIT).unwrap(),
        "Location|Event|Set|Piece|CreditNo"
    );
}

#[test]
fn paths_resolve_with_loose_input() {
    let mut graph = new_graph().unwrap();
    let freds = Location::insert(&mut graph, "Fred's").unwrap();
    let gig = EventType::insert(&mut graph, "Performance").unwrap();
    let jazz = Genre::insert(&mut graph, "Jazz").unwrap();
    let ev = Event::insert(&mut graph, freds, "2013/05/01", gig).unwrap();
    let first = Set::insert(&mut graph, ev, 1, jazz).unwrap();

    assert_eq!(
        require_path(&graph, SET, "fred's | 2013-5-1 | 1").unwrap(),
        first.id()
    );
    assert_eq!(
        resolve_path(&graph, SET, &split_path("Fred's|2013/05/01|2")).unwrap(),
        None
    );
    assert_eq!(require_path(&graph, GENRE, "jazz").unwrap(), jazz.id());
}

#[test]
fn malformed_segments_rejected() {
    let graph = new_graph().unwrap();
    let err = resolve_path(&graph, EVENT, &["Fred's", "May Day"]).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Command(_)));
    assert!(resolve_path(&graph, SET, &["Fred's", "2013/05/01", "one"]).is_err());
}

#[test]
fn key_formats() {
    assert_eq!(date_key("2013-5-1").unwrap(), "2013/05/01");
    assert!(date_key("2013/02/29").is_err());
    assert_eq!(date_key("2012/02/29").unwrap(), "2012/02/29");
    assert_eq!(number_key(7), "07");
    assert_eq!(normalize(SET, " 3 ").unwrap(), "03");
    assert_eq!(normalize(LOCATION, "  Fred's ").unwrap(), "Fred's");
    assert!(normalize(SET, "0").is_err());
}
