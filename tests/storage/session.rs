//! Integration tests for sessions
//!
//! Tests transaction bracketing, abort restoring the graph, and the
//! population queries sessions expose.

use encore_foundation::ErrorKind;
use encore_storage::{MemorySession, Session, TransactionMode};

use crate::fixture::{EVENT, GENRE, LOCATION, event, graph, top_level};

fn session() -> MemorySession {
    MemorySession::new(graph())
}

#[test]
fn commit_keeps_changes() {
    let mut session = session();
    session.begin_update().unwrap();
    top_level(session.graph_mut().unwrap(), GENRE, "Jazz").unwrap();
    session.commit().unwrap();

    session.begin_read().unwrap();
    assert_eq!(session.all_objects(GENRE).unwrap().len(), 1);
    session.commit().unwrap();
}

#[test]
fn abort_discards_changes() {
    let mut session = session();
    session.begin_update().unwrap();
    let freds = top_level(session.graph_mut().unwrap(), LOCATION, "Fred's").unwrap();
    session.commit().unwrap();

    session.begin_update().unwrap();
    event(session.graph_mut().unwrap(), freds, "2013/05/01").unwrap();
    session.abort().unwrap();

    assert!(session.committed().children(freds, EVENT).unwrap().is_empty());
    session.begin_read().unwrap();
    assert!(session.all_objects(EVENT).unwrap().is_empty());
    session.abort().unwrap();
}

#[test]
fn committed_view_ignores_open_transaction() {
    let mut session = session();
    session.begin_update().unwrap();
    top_level(session.graph_mut().unwrap(), GENRE, "Jazz").unwrap();
    assert!(session.committed().is_empty());
    assert_eq!(session.graph().unwrap().len(), 1);
    session.commit().unwrap();
    assert_eq!(session.committed().len(), 1);
}

#[test]
fn read_transaction_refuses_writes() {
    let mut session = session();
    session.begin_read().unwrap();
    assert_eq!(session.transaction(), Some(TransactionMode::Read));
    let err = session.graph_mut().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Transaction(_)));
}

#[test]
fn transactions_do_not_nest() {
    let mut session = session();
    session.begin_update().unwrap();
    assert!(session.begin_update().is_err());
    assert!(session.begin_read().is_err());
}

#[test]
fn graph_requires_a_transaction() {
    let mut session = session();
    assert!(session.graph().is_err());
    assert!(session.graph_mut().is_err());
    assert!(session.commit().is_err());
    assert!(session.abort().is_err());
}

#[test]
fn unpersist_guarded_by_children() {
    let mut session = session();
    session.begin_update().unwrap();
    let freds = top_level(session.graph_mut().unwrap(), LOCATION, "Fred's").unwrap();
    event(session.graph_mut().unwrap(), freds, "2013/05/01").unwrap();
    let err = session.unpersist(freds).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ReferentialIntegrity { .. }));
    session.abort().unwrap();
}

#[test]
fn persist_through_session() {
    let mut session = session();
    session.begin_update().unwrap();
    let graph = session.graph_mut().unwrap();
    let jazz = graph.create(GENRE).unwrap();
    graph.set_simple_key(jazz, Some("Jazz")).unwrap();
    session.persist(jazz).unwrap();
    session.commit().unwrap();
    assert_eq!(session.committed().entities_of(GENRE), vec![jazz]);
}
