//! Integration tests for the archive entity network
//!
//! Builds a small archive through the typed handles and checks that
//! uniqueness, referential guards and reparenting behave as users expect.

use encore_foundation::ErrorKind;
use encore_model::{
    Act, Artist, Credit, Entity, Event, EventType, Genre, Location, Newsletter, Piece, Role,
    Series, Set, new_graph,
};
use encore_storage::Graph;

struct Archive {
    graph: Graph,
    freds: Location,
    bijou: Location,
    gig: EventType,
    jazz: Genre,
    opening: Event,
}

fn archive() -> Archive {
    let mut graph = new_graph().unwrap();
    let freds = Location::insert(&mut graph, "Fred's").unwrap();
    let bijou = Location::insert(&mut graph, "Bijou").unwrap();
    let gig = EventType::insert(&mut graph, "Performance").unwrap();
    let jazz = Genre::insert(&mut graph, "Jazz").unwrap();
    let opening = Event::insert(&mut graph, freds, "2013/05/01", gig).unwrap();
    Archive {
        graph,
        freds,
        bijou,
        gig,
        jazz,
        opening,
    }
}

#[test]
fn duplicate_event_date_at_location() {
    let mut a = archive();
    let before = a.graph.len();
    let err = Event::insert(&mut a.graph, a.freds, "2013-5-1", a.gig).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateKey { .. }));
    assert_eq!(
        err.to_string(),
        "another Event with Date '2013/05/01' already exists in Location 'Fred's'"
    );
    assert_eq!(a.graph.len(), before);
}

#[test]
fn location_with_events_cannot_be_removed() {
    let mut a = archive();
    let err = a.freds.remove(&mut a.graph).unwrap_err();
    assert!(err.to_string().contains("1 Event"));
    assert_eq!(a.freds.events(&a.graph).unwrap(), vec![a.opening]);
}

#[test]
fn event_moves_between_locations() {
    let mut a = archive();
    a.opening.set_location(&mut a.graph, a.bijou).unwrap();
    assert!(a.freds.events(&a.graph).unwrap().is_empty());
    assert_eq!(a.bijou.events(&a.graph).unwrap(), vec![a.opening]);
    assert_eq!(a.opening.location(&a.graph).unwrap(), Some(a.bijou));
}

#[test]
fn event_move_onto_taken_date_refused() {
    let mut a = archive();
    let other = Event::insert(&mut a.graph, a.bijou, "2013/05/01", a.gig).unwrap();
    let err = other.set_location(&mut a.graph, a.freds).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::DuplicateKey { .. }));
    assert_eq!(a.freds.events(&a.graph).unwrap(), vec![a.opening]);
    assert_eq!(a.bijou.events(&a.graph).unwrap(), vec![other]);
    assert_eq!(other.location(&a.graph).unwrap(), Some(a.bijou));
}

#[test]
fn blank_location_name_refused() {
    let mut a = archive();
    let err = a.freds.rename(&mut a.graph, "").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::BlankIdentity { .. }));
    assert_eq!(a.freds.simple_key(&a.graph).unwrap(), "Fred's");
}

#[test]
fn full_credit_chain() {
    let mut a = archive();
    let first = Set::insert(&mut a.graph, a.opening, 1, a.jazz).unwrap();
    let piece = Piece::insert(&mut a.graph, first, 1).unwrap();
    let ann = Artist::insert(&mut a.graph, "Ann Carter").unwrap();
    let piano = Role::insert(&mut a.graph, "Piano").unwrap();
    let credit = Credit::insert(&mut a.graph, piece, 1, ann, piano).unwrap();

    assert_eq!(
        credit.key(&a.graph).unwrap().to_string(),
        "Fred's|2013/05/01|01|01|01"
    );
    assert_eq!(ann.credits(&a.graph).unwrap(), vec![credit]);
    assert_eq!(piano.credits(&a.graph).unwrap(), vec![credit]);

    a.freds.rename(&mut a.graph, "Fred's Bar").unwrap();
    assert_eq!(
        credit.key(&a.graph).unwrap().to_string(),
        "Fred's Bar|2013/05/01|01|01|01"
    );
    a.graph.check_integrity().unwrap();
}

#[test]
fn sets_order_numerically() {
    let mut a = archive();
    for n in [10, 2, 1] {
        Set::insert(&mut a.graph, a.opening, n, a.jazz).unwrap();
    }
    let numbers: Vec<u32> = a
        .opening
        .sets(&a.graph)
        .unwrap()
        .into_iter()
        .map(|s| s.number(&a.graph).unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 10]);
}

#[test]
fn events_order_chronologically() {
    let mut a = archive();
    Event::insert(&mut a.graph, a.freds, "2012-12-31", a.gig).unwrap();
    Event::insert(&mut a.graph, a.freds, "2013/5/2", a.gig).unwrap();
    let dates: Vec<String> = a
        .freds
        .events(&a.graph)
        .unwrap()
        .into_iter()
        .map(|e| e.date(&a.graph).unwrap())
        .collect();
    assert_eq!(dates, vec!["2012/12/31", "2013/05/01", "2013/05/02"]);
}

#[test]
fn optional_parents_clear() {
    let mut a = archive();
    let sundays = Series::insert(&mut a.graph, "Sundays").unwrap();
    let trio = Act::insert(&mut a.graph, "Trio").unwrap();
    let first = Set::insert(&mut a.graph, a.opening, 1, a.jazz).unwrap();

    a.opening.set_series(&mut a.graph, Some(sundays)).unwrap();
    first.set_act(&mut a.graph, Some(trio)).unwrap();
    assert_eq!(sundays.events(&a.graph).unwrap(), vec![a.opening]);
    assert_eq!(trio.sets(&a.graph).unwrap(), vec![first]);

    a.opening.set_series(&mut a.graph, None).unwrap();
    first.set_act(&mut a.graph, None).unwrap();
    assert_eq!(a.opening.series(&a.graph).unwrap(), None);
    assert!(trio.sets(&a.graph).unwrap().is_empty());
    trio.remove(&mut a.graph).unwrap();
}

#[test]
fn set_numbers_stop_at_two_digits() {
    let mut a = archive();
    for n in [99, 20] {
        Set::insert(&mut a.graph, a.opening, n, a.jazz).unwrap();
    }
    assert!(Set::insert(&mut a.graph, a.opening, 100, a.jazz).is_err());
    let numbers: Vec<u32> = a
        .opening
        .sets(&a.graph)
        .unwrap()
        .into_iter()
        .map(|s| s.number(&a.graph).unwrap())
        .collect();
    assert_eq!(numbers, vec![20, 99]);
}

#[test]
fn newsletter_lookup_normalizes_date() {
    let mut a = archive();
    let issue = Newsletter::insert(&mut a.graph, "2013-5-1").unwrap();
    assert_eq!(Newsletter::find(&a.graph, "2013-5-1").unwrap(), Some(issue));
    a.opening.set_newsletter(&mut a.graph, Some(issue)).unwrap();
    assert_eq!(issue.events(&a.graph).unwrap(), vec![a.opening]);
}

#[test]
fn location_name_cannot_contain_separator() {
    let mut a = archive();
    let err = Location::insert(&mut a.graph, "Fred's|2013/05/01").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Command(_)));
    assert_eq!(Location::all(&a.graph), vec![a.bijou, a.freds]);
}

#[test]
fn handle_type_checked() {
    let a = archive();
    assert_eq!(Location::from_id(&a.graph, a.freds.id()).unwrap(), a.freds);
    assert!(Genre::from_id(&a.graph, a.freds.id()).is_err());
}

#[test]
fn genre_lookup_ignores_case() {
    let a = archive();
    assert_eq!(Genre::find(&a.graph, "JAZZ").unwrap(), Some(a.jazz));
    assert_eq!(
        Event::find(&a.graph, a.freds, "2013-05-01").unwrap(),
        Some(a.opening)
    );
}
