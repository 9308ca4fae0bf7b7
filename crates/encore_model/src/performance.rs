//! The performance hierarchy: events, sets, pieces and credits.
//!
//! Each level is identified by its parent: an event by its location and
//! date, a set by its event and number, and so on down to credits.

use encore_foundation::Result;
use encore_storage::{EntityKind, Graph};

use crate::entity::{Entity, children_of, entity_handle, find_child, insert_with, parent_of};
use crate::keys::{number_key, parse_number};
use crate::reference::{Act, Artist, EventType, Genre, Location, Newsletter, Role, Series};
use crate::types::{
    ACT, ARTIST, CREDIT, EVENT, EVENT_TYPE, GENRE, LOCATION, NEWSLETTER, PIECE, ROLE, SERIES, SET,
};

entity_handle!(
    /// A dated event at a location.
    Event,
    EntityKind::identified_by(EVENT, "Date", LOCATION)
);

impl Event {
    /// Inserts and persists an event.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is malformed or already taken at the
    /// location; the graph is left unchanged.
    pub fn insert(
        graph: &mut Graph,
        location: Location,
        date: &str,
        event_type: EventType,
    ) -> Result<Self> {
        insert_with(graph, date, |graph, id| {
            graph.set_identifying_parent(id, Some(location.id()))?;
            graph.set_non_identifying_parent(id, EVENT_TYPE, Some(event_type.id()))
        })
    }

    /// Finds the event on a date at a location.
    ///
    /// # Errors
    ///
    /// Returns an error if the date is malformed.
    pub fn find(graph: &Graph, location: Location, date: &str) -> Result<Option<Self>> {
        find_child(graph, location.id(), date)
    }

    /// The event's date, `yyyy/mm/dd`.
    ///
    /// # Errors
    ///
    /// Returns an error if the event has been removed.
    pub fn date(self, graph: &Graph) -> Result<String> {
        self.simple_key(graph)
    }

    /// Where the event was held.
    ///
    /// # Errors
    ///
    /// Returns an error if the event has been removed.
    pub fn location(self, graph: &Graph) -> Result<Option<Location>> {
        parent_of(graph, self.id())
    }

    /// Moves the event to another location.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if the location already has an event on the
    /// same date.
    pub fn set_location(self, graph: &mut Graph, location: Location) -> Result<()> {
        graph.set_identifying_parent(self.id(), Some(location.id()))
    }

    /// The kind of event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event has been removed.
    pub fn event_type(self, graph: &Graph) -> Result<Option<EventType>> {
        parent_of(graph, self.id())
    }

    /// Changes the kind of event.
    ///
    /// # Errors
    ///
    /// Returns an error if the event has been removed.
    pub fn set_event_type(self, graph: &mut Graph, event_type: EventType) -> Result<()> {
        graph.set_non_identifying_parent(self.id(), EVENT_TYPE, Some(event_type.id()))
    }

    /// The series the event belongs to, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the event has been removed.
    pub fn series(self, graph: &Graph) -> Result<Option<Series>> {
        parent_of(graph, self.id())
    }

    /// Sets or clears the series.
    ///
    /// # Errors
    ///
    /// Returns an error if the event has been removed.
    pub fn set_series(self, graph: &mut Graph, series: Option<Series>) -> Result<()> {
        graph.set_non_identifying_parent(self.id(), SERIES, series.map(Entity::id))
    }

    /// The newsletter that advertised the event, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the event has been removed.
    pub fn newsletter(self, graph: &Graph) -> Result<Option<Newsletter>> {
        parent_of(graph, self.id())
    }

    /// Sets or clears the newsletter.
    ///
    /// # Errors
    ///
    /// Returns an error if the event has been removed.
    pub fn set_newsletter(self, graph: &mut Graph, newsletter: Option<Newsletter>) -> Result<()> {
        graph.set_non_identifying_parent(self.id(), NEWSLETTER, newsletter.map(Entity::id))
    }

    /// The event's sets, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the event has been removed.
    pub fn sets(self, graph: &Graph) -> Result<Vec<Set>> {
        children_of(graph, self.id())
    }
}

entity_handle!(
    /// A numbered set within an event.
    Set,
    EntityKind::identified_by(SET, "SetNo", EVENT)
);

impl Set {
    /// Inserts and persists a set.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if the event already has a set with the
    /// number; the graph is left unchanged.
    pub fn insert(graph: &mut Graph, event: Event, set_no: u32, genre: Genre) -> Result<Self> {
        insert_with(graph, &number_key(set_no), |graph, id| {
            graph.set_identifying_parent(id, Some(event.id()))?;
            graph.set_non_identifying_parent(id, GENRE, Some(genre.id()))
        })
    }

    /// Finds a set of an event by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the event has been removed.
    pub fn find(graph: &Graph, event: Event, set_no: u32) -> Result<Option<Self>> {
        find_child(graph, event.id(), &number_key(set_no))
    }

    /// The set's number.
    ///
    /// # Errors
    ///
    /// Returns an error if the set has been removed.
    pub fn number(self, graph: &Graph) -> Result<u32> {
        parse_number(&self.simple_key(graph)?)
    }

    /// The event the set was played at.
    ///
    /// # Errors
    ///
    /// Returns an error if the set has been removed.
    pub fn event(self, graph: &Graph) -> Result<Option<Event>> {
        parent_of(graph, self.id())
    }

    /// Moves the set to another event.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if the event already has a set with the
    /// number.
    pub fn set_event(self, graph: &mut Graph, event: Event) -> Result<()> {
        graph.set_identifying_parent(self.id(), Some(event.id()))
    }

    /// The act that played, if recorded.
    ///
    /// # Errors
    ///
    /// Returns an error if the set has been removed.
    pub fn act(self, graph: &Graph) -> Result<Option<Act>> {
        parent_of(graph, self.id())
    }

    /// Sets or clears the act.
    ///
    /// # Errors
    ///
    /// Returns an error if the set has been removed.
    pub fn set_act(self, graph: &mut Graph, act: Option<Act>) -> Result<()> {
        graph.set_non_identifying_parent(self.id(), ACT, act.map(Entity::id))
    }

    /// The set's genre.
    ///
    /// # Errors
    ///
    /// Returns an error if the set has been removed.
    pub fn genre(self, graph: &Graph) -> Result<Option<Genre>> {
        parent_of(graph, self.id())
    }

    /// Changes the genre.
    ///
    /// # Errors
    ///
    /// Returns an error if the set has been removed.
    pub fn set_genre(self, graph: &mut Graph, genre: Genre) -> Result<()> {
        graph.set_non_identifying_parent(self.id(), GENRE, Some(genre.id()))
    }

    /// The pieces played, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the set has been removed.
    pub fn pieces(self, graph: &Graph) -> Result<Vec<Piece>> {
        children_of(graph, self.id())
    }
}

entity_handle!(
    /// A numbered piece within a set.
    Piece,
    EntityKind::identified_by(PIECE, "PieceNo", SET)
);

impl Piece {
    /// Inserts and persists a piece.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if the set already has a piece with the
    /// number; the graph is left unchanged.
    pub fn insert(graph: &mut Graph, set: Set, piece_no: u32) -> Result<Self> {
        insert_with(graph, &number_key(piece_no), |graph, id| {
            graph.set_identifying_parent(id, Some(set.id()))
        })
    }

    /// Finds a piece of a set by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the set has been removed.
    pub fn find(graph: &Graph, set: Set, piece_no: u32) -> Result<Option<Self>> {
        find_child(graph, set.id(), &number_key(piece_no))
    }

    /// The piece's number.
    ///
    /// # Errors
    ///
    /// Returns an error if the piece has been removed.
    pub fn number(self, graph: &Graph) -> Result<u32> {
        parse_number(&self.simple_key(graph)?)
    }

    /// The set the piece was played in.
    ///
    /// # Errors
    ///
    /// Returns an error if the piece has been removed.
    pub fn set(self, graph: &Graph) -> Result<Option<Set>> {
        parent_of(graph, self.id())
    }

    /// Moves the piece to another set.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if the set already has a piece with the
    /// number.
    pub fn set_set(self, graph: &mut Graph, set: Set) -> Result<()> {
        graph.set_identifying_parent(self.id(), Some(set.id()))
    }

    /// The piece's credits, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the piece has been removed.
    pub fn credits(self, graph: &Graph) -> Result<Vec<Credit>> {
        children_of(graph, self.id())
    }
}

entity_handle!(
    /// A numbered credit: one artist in one role on one piece.
    Credit,
    EntityKind::identified_by(CREDIT, "CreditNo", PIECE)
);

impl Credit {
    /// Inserts and persists a credit.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if the piece already has a credit with the
    /// number; the graph is left unchanged.
    pub fn insert(
        graph: &mut Graph,
        piece: Piece,
        credit_no: u32,
        artist: Artist,
        role: Role,
    ) -> Result<Self> {
        insert_with(graph, &number_key(credit_no), |graph, id| {
            graph.set_identifying_parent(id, Some(piece.id()))?;
            graph.set_non_identifying_parent(id, ARTIST, Some(artist.id()))?;
            graph.set_non_identifying_parent(id, ROLE, Some(role.id()))
        })
    }

    /// Finds a credit of a piece by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the piece has been removed.
    pub fn find(graph: &Graph, piece: Piece, credit_no: u32) -> Result<Option<Self>> {
        find_child(graph, piece.id(), &number_key(credit_no))
    }

    /// The piece credited.
    ///
    /// # Errors
    ///
    /// Returns an error if the credit has been removed.
    pub fn piece(self, graph: &Graph) -> Result<Option<Piece>> {
        parent_of(graph, self.id())
    }

    /// The artist credited.
    ///
    /// # Errors
    ///
    /// Returns an error if the credit has been removed.
    pub fn artist(self, graph: &Graph) -> Result<Option<Artist>> {
        parent_of(graph, self.id())
    }

    /// Changes the artist.
    ///
    /// # Errors
    ///
    /// Returns an error if the credit has been removed.
    pub fn set_artist(self, graph: &mut Graph, artist: Artist) -> Result<()> {
        graph.set_non_identifying_parent(self.id(), ARTIST, Some(artist.id()))
    }

    /// The role played.
    ///
    /// # Errors
    ///
    /// Returns an error if the credit has been removed.
    pub fn role(self, graph: &Graph) -> Result<Option<Role>> {
        parent_of(graph, self.id())
    }

    /// Changes the role.
    ///
    /// # Errors
    ///
    /// Returns an error if the credit has been removed.
    pub fn set_role(self, graph: &mut Graph, role: Role) -> Result<()> {
        graph.set_non_identifying_parent(self.id(), ROLE, Some(role.id()))
    }
}
