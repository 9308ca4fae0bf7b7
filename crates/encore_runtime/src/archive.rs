//! Command execution against an archive session.
//!
//! Each command runs in a transaction. With auto-commit on, a command
//! outside an explicit `begin` gets its own transaction, committed on
//! success. Any error aborts whatever transaction is open, so a failed
//! command never leaves partial changes behind.

use std::fmt::Write as _;
use std::fs;

use encore_foundation::{EntityId, EntityType, Error, ErrorContext, Result};
use encore_model::keys::normalize;
use encore_model::path::{path_key, path_shape, split_path};
use encore_model::{new_session, require_path};
use encore_storage::{Graph, MemorySession, Session};
use tracing::{debug, info, warn};

use crate::command::{Command, HELP};
use crate::demo;

const MAX_SCRIPT_DEPTH: usize = 8;

/// What a command produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Lines to show the user.
    pub lines: Vec<String>,
    /// Whether the command asked to leave.
    pub quit: bool,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            quit: false,
        }
    }

    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }
}

/// A music archive behind a session.
#[derive(Debug)]
pub struct Archive {
    session: MemorySession,
    auto_commit: bool,
    depth: usize,
}

impl Archive {
    /// Creates an empty archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive catalog is invalid.
    pub fn new(auto_commit: bool) -> Result<Self> {
        Ok(Self::with_session(new_session()?, auto_commit))
    }

    /// Wraps an existing session.
    #[must_use]
    pub fn with_session(session: MemorySession, auto_commit: bool) -> Self {
        Self {
            session,
            auto_commit,
            depth: 0,
        }
    }

    /// The underlying session.
    #[must_use]
    pub fn session(&self) -> &MemorySession {
        &self.session
    }

    /// Whether an explicit transaction is open.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.session.transaction().is_some()
    }

    /// Loads the demonstration archive in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a transaction is already open.
    pub fn seed_demo(&mut self) -> Result<()> {
        self.session.begin_update()?;
        match self.session.graph_mut().and_then(demo::seed) {
            Ok(()) => self.session.commit(),
            Err(e) => {
                self.session.abort()?;
                Err(e)
            }
        }
    }

    /// Parses and executes one line.
    ///
    /// # Errors
    ///
    /// Returns the parse or execution error, with the line attached as
    /// context.
    pub fn eval(&mut self, line: &str) -> Result<Reply> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Reply::default()),
            Err(e) => return Err(with_operation(e, line)),
        };
        self.execute(&command).map_err(|e| with_operation(e, line))
    }

    /// Executes a command, aborting the open transaction if it fails.
    ///
    /// # Errors
    ///
    /// Returns any error the command raises.
    pub fn execute(&mut self, command: &Command) -> Result<Reply> {
        debug!(%command, "executing");
        let result = self.dispatch(command);
        if result.is_err() && self.in_transaction() {
            self.session.abort()?;
            warn!(%command, "command failed; transaction aborted");
        }
        result
    }

    /// Runs a script line by line, stopping at the first error or `quit`.
    ///
    /// # Errors
    ///
    /// Returns the first failing line's error with the script name and
    /// line number attached.
    pub fn run_script(&mut self, name: &str, source: &str) -> Result<Reply> {
        if self.depth >= MAX_SCRIPT_DEPTH {
            return Err(Error::command(format!("scripts nested too deeply at {name}")));
        }
        self.depth += 1;
        let result = self.run_lines(name, source);
        self.depth -= 1;
        result
    }

    fn run_lines(&mut self, name: &str, source: &str) -> Result<Reply> {
        let mut reply = Reply::default();
        for (index, line) in source.lines().enumerate() {
            let line_reply = self.eval(line).map_err(|mut e| {
                let context = e.context.take().unwrap_or_default();
                let mut context = context.with_line(index + 1);
                if context.source.is_none() {
                    context = context.with_source(name);
                }
                e.with_context(context)
            })?;
            reply.lines.extend(line_reply.lines);
            if line_reply.quit {
                reply.quit = true;
                break;
            }
        }
        Ok(reply)
    }

    fn load(&mut self, file: &str) -> Result<Reply> {
        let source = fs::read_to_string(file)
            .map_err(|e| Error::command(format!("cannot read {file}: {e}")))?;
        info!(file, "running script");
        self.run_script(file, &source)
    }

    fn dispatch(&mut self, command: &Command) -> Result<Reply> {
        match command {
            Command::Add { ty, path, parents } => {
                self.with_update(|graph| add(graph, *ty, path, parents).map(Reply::line))
            }
            Command::Rename { ty, path, key } => self.with_update(|graph| {
                let id = require_path(graph, *ty, path)?;
                let key = normalize(*ty, key)?;
                graph.set_simple_key(id, Some(&key))?;
                Ok(Reply::line(format!("renamed to {}", graph.describe(id))))
            }),
            Command::Set {
                ty,
                path,
                parent_type,
                parent,
            } => self.with_update(|graph| {
                set_parent(graph, *ty, path, *parent_type, parent.as_deref()).map(Reply::line)
            }),
            Command::Move { ty, path, to } => self.with_update(|graph| {
                let id = require_path(graph, *ty, path)?;
                let parent_type = graph.catalog().kind(*ty)?.identifying_parent.ok_or_else(|| {
                    Error::not_supported(format!("a {ty} has no identifying parent"))
                })?;
                let parent = require_path(graph, parent_type, to)?;
                graph.set_identifying_parent(id, Some(parent))?;
                Ok(Reply::line(format!("moved to {}", graph.describe(id))))
            }),
            Command::Remove { ty, path } => self.with_update(|graph| {
                let id = require_path(graph, *ty, path)?;
                let description = graph.describe(id);
                graph.remove(id)?;
                Ok(Reply::line(format!("removed {description}")))
            }),
            Command::List(ty) => self.with_read(|graph| Ok(list(graph, *ty))),
            Command::Show { ty, path } => self.with_read(|graph| show(graph, *ty, path)),
            Command::Children { ty, path } => self.with_read(|graph| children(graph, *ty, path)),
            Command::Types => self.with_read(types),
            Command::Check => self.with_read(|graph| {
                graph.check_integrity()?;
                Ok(Reply::line(format!("ok: {} entities", graph.len())))
            }),
            Command::Load(file) => self.load(file),
            Command::Begin => {
                self.session.begin_update()?;
                Ok(Reply::line("transaction open"))
            }
            Command::Commit => {
                self.session.commit()?;
                Ok(Reply::line("committed"))
            }
            Command::Abort => {
                self.session.abort()?;
                Ok(Reply::line("aborted"))
            }
            Command::Help => Ok(Reply::lines(HELP.lines().map(String::from).collect())),
            Command::Quit => Ok(Reply {
                lines: Vec::new(),
                quit: true,
            }),
        }
    }

    fn with_update(&mut self, op: impl FnOnce(&mut Graph) -> Result<Reply>) -> Result<Reply> {
        let implicit = !self.in_transaction();
        if implicit {
            if !self.auto_commit {
                return Err(Error::transaction(
                    "no transaction is open; use `begin` first",
                ));
            }
            self.session.begin_update()?;
        }
        let reply = op(self.session.graph_mut()?)?;
        if implicit {
            self.session.commit()?;
        }
        Ok(reply)
    }

    fn with_read(&mut self, op: impl FnOnce(&Graph) -> Result<Reply>) -> Result<Reply> {
        let implicit = !self.in_transaction();
        if implicit {
            self.session.begin_read()?;
        }
        let reply = op(self.session.graph()?)?;
        if implicit {
            self.session.commit()?;
        }
        Ok(reply)
    }
}

fn with_operation(error: Error, line: &str) -> Error {
    if error.context.is_some() {
        return error;
    }
    error.with_context(ErrorContext::new().with_operation(line.trim()))
}

fn add(
    graph: &mut Graph,
    ty: EntityType,
    path: &str,
    parents: &[(EntityType, String)],
) -> Result<String> {
    let key = path_key(graph, ty, &split_path(path))?;
    let id = graph.create(ty)?;
    graph.set_simple_key(id, Some(key.simple()))?;

    let identifying = graph.catalog().kind(ty)?.identifying_parent;
    if let (Some(parent_type), Some(parent_key)) = (identifying, key.parent()) {
        let parent = graph
            .resolve(parent_type, parent_key)?
            .ok_or_else(|| Error::command(format!("no {parent_type} '{parent_key}'")))?;
        graph.set_identifying_parent(id, Some(parent))?;
    }
    for (parent_type, parent_path) in parents {
        let parent = require_path(graph, *parent_type, parent_path)?;
        graph.add_child(parent, id)?;
    }

    graph.persist(id)?;
    Ok(format!("added {}", graph.describe(id)))
}

fn set_parent(
    graph: &mut Graph,
    ty: EntityType,
    path: &str,
    parent_type: EntityType,
    parent: Option<&str>,
) -> Result<String> {
    let id = require_path(graph, ty, path)?;
    match parent {
        Some(parent_path) => {
            let parent = require_path(graph, parent_type, parent_path)?;
            graph.add_child(parent, id)?;
            Ok(format!("{} now has {parent_type} '{}'", graph.describe(id), graph.key(parent)?))
        }
        None if graph.catalog().kind(ty)?.identifying_parent == Some(parent_type) => {
            graph.set_identifying_parent(id, None)?;
            Ok(format!("{} unchanged", graph.describe(id)))
        }
        None => {
            graph.set_non_identifying_parent(id, parent_type, None)?;
            Ok(format!("{} no longer has a {parent_type}", graph.describe(id)))
        }
    }
}

fn list(graph: &Graph, ty: EntityType) -> Reply {
    let lines: Vec<String> = graph
        .entities_of(ty)
        .into_iter()
        .filter_map(|id| graph.key(id).ok())
        .map(|key| key.to_string())
        .collect();
    if lines.is_empty() {
        Reply::line(format!("no {}", ty.plural()))
    } else {
        Reply::lines(lines)
    }
}

fn parent_line(graph: &Graph, id: EntityId, parent_type: EntityType) -> Result<String> {
    let parent = match graph.parent(id, parent_type)? {
        Some(parent) => graph.key(parent)?.to_string(),
        None => "-".to_string(),
    };
    Ok(format!("  {parent_type}: {parent}"))
}

fn show(graph: &Graph, ty: EntityType, path: &str) -> Result<Reply> {
    let id = require_path(graph, ty, path)?;
    let mut lines = vec![format!("{} ({:?})", graph.describe(id), graph.lifecycle(id)?)];
    for relation in graph.catalog().parent_relations(ty) {
        lines.push(parent_line(graph, id, relation.parent)?);
    }
    for relation in graph.catalog().child_relations(ty) {
        let count = graph.children(id, relation.child)?.len();
        lines.push(format!("  {}", relation.child.count_phrase(count)));
    }
    Ok(Reply::lines(lines))
}

fn children(graph: &Graph, ty: EntityType, path: &str) -> Result<Reply> {
    let id = require_path(graph, ty, path)?;
    let mut lines = Vec::new();
    for relation in graph.catalog().child_relations(ty) {
        let collection = graph.children(id, relation.child)?;
        if collection.is_empty() {
            continue;
        }
        lines.push(format!("{}:", relation.child.plural()));
        lines.extend(collection.keys().map(|key| format!("  {key}")));
    }
    if lines.is_empty() {
        lines.push(format!("{} has no children", graph.describe(id)));
    }
    Ok(Reply::lines(lines))
}

fn types(graph: &Graph) -> Result<Reply> {
    let mut lines = Vec::new();
    for kind in graph.catalog().kinds() {
        let mut line = format!("{:<11} {}", kind.ty.name(), path_shape(graph, kind.ty)?);
        let parents: Vec<String> = graph
            .catalog()
            .parent_relations(kind.ty)
            .iter()
            .filter(|relation| !relation.identifying)
            .map(|relation| {
                if relation.mandatory {
                    relation.parent.to_string()
                } else {
                    format!("{}?", relation.parent)
                }
            })
            .collect();
        if !parents.is_empty() {
            let _ = write!(line, "  with {}", parents.join(", "));
        }
        lines.push(line);
    }
    Ok(Reply::lines(lines))
}
