//! A small archive to explore from the REPL.

use encore_foundation::Result;
use encore_model::{
    Act, Artist, Credit, Event, EventType, Genre, Location, Newsletter, Piece, Role, Series, Set,
};
use encore_storage::Graph;
use tracing::info;

/// Populates the graph with two venues' worth of events.
///
/// # Errors
///
/// Returns an error if any entity already exists.
pub fn seed(graph: &mut Graph) -> Result<()> {
    let freds = Location::insert(graph, "Fred's")?;
    let bijou = Location::insert(graph, "Bijou")?;
    let gig = EventType::insert(graph, "Performance")?;
    let jam = EventType::insert(graph, "Jam Session")?;
    let sundays = Series::insert(graph, "Sunday Sessions")?;
    let may = Newsletter::insert(graph, "2013/04/20")?;
    let jazz = Genre::insert(graph, "Jazz")?;
    let blues = Genre::insert(graph, "Blues")?;
    let trio = Act::insert(graph, "The Night Owls Trio")?;
    let ann = Artist::insert(graph, "Ann Carter")?;
    let bob = Artist::insert(graph, "Bob Ellis")?;
    let piano = Role::insert(graph, "Piano")?;
    let voice = Role::insert(graph, "Voice")?;

    let opening = Event::insert(graph, freds, "2013/05/01", gig)?;
    opening.set_newsletter(graph, Some(may))?;
    let first = Set::insert(graph, opening, 1, jazz)?;
    first.set_act(graph, Some(trio))?;
    let second = Set::insert(graph, opening, 2, blues)?;
    for (set, piece_no) in [(first, 1), (first, 2), (second, 1)] {
        let piece = Piece::insert(graph, set, piece_no)?;
        Credit::insert(graph, piece, 1, ann, piano)?;
        Credit::insert(graph, piece, 2, bob, voice)?;
    }

    let session = Event::insert(graph, bijou, "2013/05/05", jam)?;
    session.set_series(graph, Some(sundays))?;
    Set::insert(graph, session, 1, jazz)?;

    info!(entities = graph.len(), "seeded demo archive");
    Ok(())
}
