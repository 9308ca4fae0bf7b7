//! Entity types of the music archive.

use encore_foundation::EntityType;

/// A venue.
pub const LOCATION: EntityType = EntityType::new("Location", "Locations");
/// A kind of event, e.g. `Performance` or `Workshop`.
pub const EVENT_TYPE: EntityType = EntityType::new("EventType", "EventTypes");
/// A named run of events.
pub const SERIES: EntityType = EntityType::new("Series", "Series");
/// A newsletter issue, keyed by date, that advertised events.
pub const NEWSLETTER: EntityType = EntityType::new("Newsletter", "Newsletters");
/// A performing act.
pub const ACT: EntityType = EntityType::new("Act", "Acts");
/// A musical genre.
pub const GENRE: EntityType = EntityType::new("Genre", "Genres");
/// A credited artist.
pub const ARTIST: EntityType = EntityType::new("Artist", "Artists");
/// An artist's role in a piece, e.g. `Piano`.
pub const ROLE: EntityType = EntityType::new("Role", "Roles");
/// A dated event at a location.
pub const EVENT: EntityType = EntityType::new("Event", "Events");
/// A numbered set within an event.
pub const SET: EntityType = EntityType::new("Set", "Sets");
/// A numbered piece within a set.
pub const PIECE: EntityType = EntityType::new("Piece", "Pieces");
/// A numbered credit within a piece.
pub const CREDIT: EntityType = EntityType::new("Credit", "Credits");

/// Every archive type, top-level types first.
pub const ALL: [EntityType; 12] = [
    LOCATION, EVENT_TYPE, SERIES, NEWSLETTER, ACT, GENRE, ARTIST, ROLE, EVENT, SET, PIECE, CREDIT,
];
