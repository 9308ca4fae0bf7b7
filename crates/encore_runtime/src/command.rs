//! Command parsing.
//!
//! One command per line. Words are separated by whitespace; double quotes
//! group words that contain spaces and may appear anywhere in a word, so
//! `Genre="Modern Jazz"` is one argument. A line starting with `#` is a
//! comment.
//!
//! ```text
//! add Event "Fred's|2013/05/01" EventType=Performance Series=Sundays
//! rename Location "Fred's" "Fred's Bar"
//! set Event "Fred's Bar|2013/05/01" Series=-
//! move Event "Fred's Bar|2013/05/01" Bijou
//! remove Genre Jazz
//! ```

use std::fmt;

use encore_foundation::{EntityType, Error, Result};
use encore_model::type_named;

/// A parsed command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create and persist an entity at a path, with non-identifying parents.
    Add {
        /// Type to create.
        ty: EntityType,
        /// Full key path; all but the last segment name the identifying parent.
        path: String,
        /// Non-identifying parents by type and path.
        parents: Vec<(EntityType, String)>,
    },
    /// Change an entity's simple key.
    Rename {
        /// Type of the entity.
        ty: EntityType,
        /// Current path.
        path: String,
        /// New simple key.
        key: String,
    },
    /// Point an entity at a different parent, or clear an optional one.
    Set {
        /// Type of the entity.
        ty: EntityType,
        /// Path of the entity.
        path: String,
        /// Parent type.
        parent_type: EntityType,
        /// Parent path, or `None` to clear.
        parent: Option<String>,
    },
    /// Move an entity under a different identifying parent.
    Move {
        /// Type of the entity.
        ty: EntityType,
        /// Path of the entity.
        path: String,
        /// Path of the new identifying parent.
        to: String,
    },
    /// Remove an entity that has no children.
    Remove {
        /// Type of the entity.
        ty: EntityType,
        /// Path of the entity.
        path: String,
    },
    /// List every persisted entity of a type.
    List(EntityType),
    /// Show one entity's key, lifecycle, parents and child counts.
    Show {
        /// Type of the entity.
        ty: EntityType,
        /// Path of the entity.
        path: String,
    },
    /// List an entity's children, grouped by type.
    Children {
        /// Type of the entity.
        ty: EntityType,
        /// Path of the entity.
        path: String,
    },
    /// Run the commands in a script file.
    Load(String),
    /// Open an explicit update transaction.
    Begin,
    /// Commit the open transaction.
    Commit,
    /// Abort the open transaction.
    Abort,
    /// Verify every structural invariant.
    Check,
    /// Describe the entity types and their relations.
    Types,
    /// Print command help.
    Help,
    /// Leave the REPL.
    Quit,
}

/// Command words, for completion.
pub const COMMAND_WORDS: [&str; 17] = [
    "add", "rename", "set", "move", "remove", "list", "show", "children", "load", "begin",
    "commit", "abort", "check", "types", "help", "quit", "exit",
];

/// Usage text printed by `help`.
pub const HELP: &str = "\
Paths list key segments root first, separated by '|', e.g. \"Fred's|2013/05/01|1\".

  add <Type> <path> [<Parent>=<path> ...]   create an entity
  rename <Type> <path> <key>                change its simple key
  set <Type> <path> <Parent>=<path|->       change or clear a parent
  move <Type> <path> <parent path>          change its identifying parent
  remove <Type> <path>                      remove an entity with no children
  list <Type>                               list entities in key order
  show <Type> <path>                        show an entity
  children <Type> <path>                    list an entity's children
  load <file>                               run a script
  begin | commit | abort                    explicit transactions
  check                                     verify the archive's structure
  types                                     list entity types
  help | quit";

impl Command {
    /// Parses one line. Returns `None` for a blank line or a comment.
    ///
    /// # Errors
    ///
    /// Returns a `Command` error for an unknown command, an unknown type,
    /// or the wrong number of arguments.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let words = tokenize(line)?;
        let Some((head, args)) = words.split_first() else {
            return Ok(None);
        };
        if head.starts_with('#') {
            return Ok(None);
        }

        let command = match head.to_lowercase().as_str() {
            "add" => {
                let [ty, path, parents @ ..] = args else {
                    return Err(usage("add <Type> <path> [<Parent>=<path> ...]"));
                };
                Self::Add {
                    ty: parse_type(ty)?,
                    path: path.clone(),
                    parents: parents
                        .iter()
                        .map(|arg| {
                            let (parent_type, path) = parse_assignment(arg)?;
                            Ok((parent_type, path.to_string()))
                        })
                        .collect::<Result<_>>()?,
                }
            }
            "rename" => {
                let [ty, path, key] = args else {
                    return Err(usage("rename <Type> <path> <key>"));
                };
                Self::Rename {
                    ty: parse_type(ty)?,
                    path: path.clone(),
                    key: key.clone(),
                }
            }
            "set" => {
                let [ty, path, assignment] = args else {
                    return Err(usage("set <Type> <path> <Parent>=<path|->"));
                };
                let (parent_type, parent) = parse_assignment(assignment)?;
                Self::Set {
                    ty: parse_type(ty)?,
                    path: path.clone(),
                    parent_type,
                    parent: (parent != "-").then(|| parent.to_string()),
                }
            }
            "move" => {
                let [ty, path, to] = args else {
                    return Err(usage("move <Type> <path> <parent path>"));
                };
                Self::Move {
                    ty: parse_type(ty)?,
                    path: path.clone(),
                    to: to.clone(),
                }
            }
            "remove" => {
                let (ty, path) = type_and_path(args, "remove <Type> <path>")?;
                Self::Remove { ty, path }
            }
            "show" => {
                let (ty, path) = type_and_path(args, "show <Type> <path>")?;
                Self::Show { ty, path }
            }
            "children" => {
                let (ty, path) = type_and_path(args, "children <Type> <path>")?;
                Self::Children { ty, path }
            }
            "list" => {
                let [ty] = args else {
                    return Err(usage("list <Type>"));
                };
                Self::List(parse_type(ty)?)
            }
            "load" => {
                let [file] = args else {
                    return Err(usage("load <file>"));
                };
                Self::Load(file.clone())
            }
            word => {
                if !args.is_empty() {
                    return Err(Error::command(format!("`{word}` takes no arguments")));
                }
                match word {
                    "begin" => Self::Begin,
                    "commit" => Self::Commit,
                    "abort" | "rollback" => Self::Abort,
                    "check" => Self::Check,
                    "types" => Self::Types,
                    "help" | "?" => Self::Help,
                    "quit" | "exit" => Self::Quit,
                    _ => {
                        return Err(Error::command(format!(
                            "unknown command `{word}`; try `help`"
                        )));
                    }
                }
            }
        };
        Ok(Some(command))
    }

    /// Whether the command changes the archive.
    #[must_use]
    pub fn is_update(&self) -> bool {
        matches!(
            self,
            Self::Add { .. }
                | Self::Rename { .. }
                | Self::Set { .. }
                | Self::Move { .. }
                | Self::Remove { .. }
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            Self::Add { .. } => "add",
            Self::Rename { .. } => "rename",
            Self::Set { .. } => "set",
            Self::Move { .. } => "move",
            Self::Remove { .. } => "remove",
            Self::List(_) => "list",
            Self::Show { .. } => "show",
            Self::Children { .. } => "children",
            Self::Load(_) => "load",
            Self::Begin => "begin",
            Self::Commit => "commit",
            Self::Abort => "abort",
            Self::Check => "check",
            Self::Types => "types",
            Self::Help => "help",
            Self::Quit => "quit",
        };
        f.write_str(word)
    }
}

/// Splits a line into words, honouring double quotes.
///
/// # Errors
///
/// Returns a `Command` error for an unterminated quote.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for c in line.trim().chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quoted {
        return Err(Error::command("unterminated quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

fn usage(text: &str) -> Error {
    Error::command(format!("usage: {text}"))
}

fn parse_type(name: &str) -> Result<EntityType> {
    type_named(name)
        .ok_or_else(|| Error::command(format!("unknown type '{name}'; try `types`")))
}

fn parse_assignment(arg: &str) -> Result<(EntityType, &str)> {
    let (ty, value) = arg
        .split_once('=')
        .ok_or_else(|| Error::command(format!("expected <Parent>=<path>, found '{arg}'")))?;
    Ok((parse_type(ty.trim())?, value.trim()))
}

fn type_and_path(args: &[String], text: &str) -> Result<(EntityType, String)> {
    let [ty, path] = args else {
        return Err(usage(text));
    };
    Ok((parse_type(ty)?, path.clone()))
}
