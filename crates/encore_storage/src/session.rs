//! Transactional access to the graph.
//!
//! The engine never opens or closes transactions itself. Callers bracket
//! their work with [`Session::begin_update`] and [`Session::commit`], and
//! call [`Session::abort`] on any error so that a failed unit of work
//! leaves nothing behind.

use encore_foundation::{EntityId, EntityType, Error, Result};
use tracing::debug;

use crate::duplicate::Population;
use crate::graph::Graph;

/// The kind of transaction currently open.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionMode {
    /// Reads only; `graph_mut` is refused.
    Read,
    /// Reads and writes.
    Update,
}

/// A persistence session owning the graph.
pub trait Session {
    /// Opens a read-only transaction.
    ///
    /// # Errors
    ///
    /// Returns a `Transaction` error if a transaction is already open.
    fn begin_read(&mut self) -> Result<()>;

    /// Opens an update transaction.
    ///
    /// # Errors
    ///
    /// Returns a `Transaction` error if a transaction is already open.
    fn begin_update(&mut self) -> Result<()>;

    /// Closes the open transaction, keeping its changes.
    ///
    /// # Errors
    ///
    /// Returns a `Transaction` error if no transaction is open.
    fn commit(&mut self) -> Result<()>;

    /// Closes the open transaction, discarding its changes.
    ///
    /// # Errors
    ///
    /// Returns a `Transaction` error if no transaction is open.
    fn abort(&mut self) -> Result<()>;

    /// The open transaction, if any.
    fn transaction(&self) -> Option<TransactionMode>;

    /// The graph, readable inside any transaction.
    ///
    /// # Errors
    ///
    /// Returns a `Transaction` error outside a transaction.
    fn graph(&self) -> Result<&Graph>;

    /// The graph, writable inside an update transaction.
    ///
    /// # Errors
    ///
    /// Returns a `Transaction` error outside an update transaction.
    fn graph_mut(&mut self) -> Result<&mut Graph>;

    /// Admits an entity to the persisted population.
    ///
    /// # Errors
    ///
    /// Returns any validation error from [`Graph::persist`].
    fn persist(&mut self, id: EntityId) -> Result<()> {
        self.graph_mut()?.persist(id)
    }

    /// Removes an entity from the population.
    ///
    /// # Errors
    ///
    /// Returns a `ReferentialIntegrity` error if the entity has children.
    fn unpersist(&mut self, id: EntityId) -> Result<()> {
        self.graph_mut()?.remove(id)
    }

    /// Every persisted entity of the given type.
    ///
    /// # Errors
    ///
    /// Returns a `Transaction` error outside a transaction.
    fn all_objects(&self, ty: EntityType) -> Result<Vec<EntityId>> {
        Ok(self.graph()?.all_objects(ty))
    }
}

/// An in-memory session.
///
/// `begin_update` takes an O(1) snapshot of the graph; `abort` restores it
/// and `commit` drops it.
#[derive(Debug)]
pub struct MemorySession {
    graph: Graph,
    snapshot: Option<Graph>,
    mode: Option<TransactionMode>,
}

impl MemorySession {
    /// Creates a session over a graph.
    #[must_use]
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            snapshot: None,
            mode: None,
        }
    }

    /// The graph as of the last commit, regardless of any open transaction.
    #[must_use]
    pub fn committed(&self) -> &Graph {
        self.snapshot.as_ref().unwrap_or(&self.graph)
    }

    fn begin(&mut self, mode: TransactionMode) -> Result<()> {
        if let Some(open) = self.mode {
            return Err(Error::transaction(format!(
                "cannot begin a transaction: a {open:?} transaction is already open"
            )));
        }
        if mode == TransactionMode::Update {
            self.snapshot = Some(self.graph.clone());
        }
        self.mode = Some(mode);
        debug!(?mode, "transaction began");
        Ok(())
    }

    fn end(&mut self, action: &str) -> Result<TransactionMode> {
        self.mode
            .take()
            .ok_or_else(|| Error::transaction(format!("cannot {action}: no transaction is open")))
    }
}

impl Session for MemorySession {
    fn begin_read(&mut self) -> Result<()> {
        self.begin(TransactionMode::Read)
    }

    fn begin_update(&mut self) -> Result<()> {
        self.begin(TransactionMode::Update)
    }

    fn commit(&mut self) -> Result<()> {
        let mode = self.end("commit")?;
        self.snapshot = None;
        debug!(?mode, entities = self.graph.len(), "transaction committed");
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        let mode = self.end("abort")?;
        if let Some(snapshot) = self.snapshot.take() {
            self.graph = snapshot;
        }
        debug!(?mode, entities = self.graph.len(), "transaction aborted");
        Ok(())
    }

    fn transaction(&self) -> Option<TransactionMode> {
        self.mode
    }

    fn graph(&self) -> Result<&Graph> {
        if self.mode.is_none() {
            return Err(Error::transaction("no transaction is open"));
        }
        Ok(&self.graph)
    }

    fn graph_mut(&mut self) -> Result<&mut Graph> {
        match self.mode {
            Some(TransactionMode::Update) => Ok(&mut self.graph),
            Some(TransactionMode::Read) => Err(Error::transaction(
                "cannot modify the archive in a read transaction",
            )),
            None => Err(Error::transaction("no transaction is open")),
        }
    }
}
