//! Top-level reference entities: venues, genres, people and the like.
//!
//! Each is unique by its simple key alone.

use encore_foundation::Result;
use encore_storage::{EntityKind, Graph};

use crate::entity::{Entity, children_of, entity_handle, find_top_level, insert_with};
use crate::performance::{Credit, Event, Set};
use crate::types::{ACT, ARTIST, EVENT_TYPE, GENRE, LOCATION, NEWSLETTER, ROLE, SERIES};

macro_rules! top_level {
    ($name:ident, $what:literal) => {
        impl $name {
            #[doc = concat!("Inserts and persists a new ", $what, ".")]
            ///
            /// # Errors
            ///
            /// Returns `BlankIdentity` or `DuplicateKey`, leaving the graph
            /// unchanged.
            pub fn insert(graph: &mut Graph, simple_key: &str) -> Result<Self> {
                insert_with(graph, simple_key, |_, _| Ok(()))
            }

            #[doc = concat!("Finds a ", $what, " by key, ignoring case.")]
            ///
            /// # Errors
            ///
            /// Returns an error if the key is malformed for the type.
            pub fn find(graph: &Graph, simple_key: &str) -> Result<Option<Self>> {
                find_top_level(graph, simple_key)
            }
        }
    };
}

entity_handle!(
    /// A venue.
    Location,
    EntityKind::top_level(LOCATION, "Name")
);
top_level!(Location, "location");

impl Location {
    /// Events held here, by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the location has been removed.
    pub fn events(self, graph: &Graph) -> Result<Vec<Event>> {
        children_of(graph, self.id())
    }
}

entity_handle!(
    /// A kind of event.
    EventType,
    EntityKind::top_level(EVENT_TYPE, "Name")
);
top_level!(EventType, "event type");

impl EventType {
    /// Events of this type, by location then date.
    ///
    /// # Errors
    ///
    /// Returns an error if the event type has been removed.
    pub fn events(self, graph: &Graph) -> Result<Vec<Event>> {
        children_of(graph, self.id())
    }
}

entity_handle!(
    /// A named run of events.
    Series,
    EntityKind::top_level(SERIES, "Name")
);
top_level!(Series, "series");

impl Series {
    /// Events in the series.
    ///
    /// # Errors
    ///
    /// Returns an error if the series has been removed.
    pub fn events(self, graph: &Graph) -> Result<Vec<Event>> {
        children_of(graph, self.id())
    }
}

entity_handle!(
    /// A newsletter issue, keyed by its date.
    Newsletter,
    EntityKind::top_level(NEWSLETTER, "Date")
);
top_level!(Newsletter, "newsletter");

impl Newsletter {
    /// Events the issue advertised.
    ///
    /// # Errors
    ///
    /// Returns an error if the newsletter has been removed.
    pub fn events(self, graph: &Graph) -> Result<Vec<Event>> {
        children_of(graph, self.id())
    }
}

entity_handle!(
    /// A performing act.
    Act,
    EntityKind::top_level(ACT, "Name")
);
top_level!(Act, "act");

impl Act {
    /// Sets the act played.
    ///
    /// # Errors
    ///
    /// Returns an error if the act has been removed.
    pub fn sets(self, graph: &Graph) -> Result<Vec<Set>> {
        children_of(graph, self.id())
    }
}

entity_handle!(
    /// A genre.
    Genre,
    EntityKind::top_level(GENRE, "Name")
);
top_level!(Genre, "genre");

impl Genre {
    /// Sets in this genre.
    ///
    /// # Errors
    ///
    /// Returns an error if the genre has been removed.
    pub fn sets(self, graph: &Graph) -> Result<Vec<Set>> {
        children_of(graph, self.id())
    }
}

entity_handle!(
    /// A credited artist.
    Artist,
    EntityKind::top_level(ARTIST, "Name")
);
top_level!(Artist, "artist");

impl Artist {
    /// Every credit for the artist.
    ///
    /// # Errors
    ///
    /// Returns an error if the artist has been removed.
    pub fn credits(self, graph: &Graph) -> Result<Vec<Credit>> {
        children_of(graph, self.id())
    }
}

entity_handle!(
    /// A role an artist plays in a piece.
    Role,
    EntityKind::top_level(ROLE, "Name")
);
top_level!(Role, "role");

impl Role {
    /// Every credit in this role.
    ///
    /// # Errors
    ///
    /// Returns an error if the role has been removed.
    pub fn credits(self, graph: &Graph) -> Result<Vec<Credit>> {
        children_of(graph, self.id())
    }
}
