//! The interactive REPL.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use encore_foundation::{Error, Result};
use encore_model::catalog::KINDS;
use tracing::warn;

use crate::archive::{Archive, Reply};
use crate::command::COMMAND_WORDS;
use crate::config::RuntimeConfig;
use crate::editor::{LineEditor, ReadResult, RustylineEditor};

/// The interactive REPL.
pub struct Repl<E: LineEditor = RustylineEditor> {
    /// The line editor for input.
    editor: E,

    /// The archive commands run against.
    archive: Archive,

    /// Whether to show the welcome banner.
    show_banner: bool,

    /// Primary prompt.
    prompt: String,
}

impl Repl<RustylineEditor> {
    /// Creates a REPL from configuration, with the rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize or the demo
    /// archive cannot be seeded.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        let editor = RustylineEditor::new(config.history_file.clone())?;
        let mut archive = Archive::new(config.auto_commit)?;
        if config.seed_demo {
            archive.seed_demo()?;
        }
        let mut repl = Self::with_archive(editor, archive).with_prompt(config.prompt.clone());
        if !config.show_banner {
            repl = repl.without_banner();
        }
        Ok(repl)
    }
}

impl<E: LineEditor> Repl<E> {
    /// Creates a REPL over an empty auto-committing archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the archive catalog is invalid.
    pub fn new(editor: E) -> Result<Self> {
        Ok(Self::with_archive(editor, Archive::new(true)?))
    }

    /// Creates a REPL over the given archive.
    pub fn with_archive(mut editor: E, archive: Archive) -> Self {
        let keywords = COMMAND_WORDS
            .iter()
            .map(ToString::to_string)
            .chain(KINDS.iter().map(|kind| kind.ty.to_string()))
            .collect();
        editor.set_keywords(keywords);
        Self {
            editor,
            archive,
            show_banner: true,
            prompt: "encore> ".to_string(),
        }
    }

    /// Disables the welcome banner.
    #[must_use]
    pub const fn without_banner(mut self) -> Self {
        self.show_banner = false;
        self
    }

    /// Sets the primary prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns a reference to the archive.
    #[must_use]
    pub const fn archive(&self) -> &Archive {
        &self.archive
    }

    /// Runs the REPL loop until EOF or `quit`.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input fails.
    pub fn run(&mut self) -> Result<()> {
        if self.show_banner {
            self.print_banner();
        }

        while self.read_eval_print()? {}

        if self.archive.in_transaction() {
            warn!("leaving with an open transaction; its changes are discarded");
        }
        if let Err(e) = self.editor.save_history() {
            warn!(error = %e, "history not saved");
        }
        println!("\nGoodbye!");
        Ok(())
    }

    /// Executes one read-eval-print iteration.
    ///
    /// Returns `Ok(true)` to continue, `Ok(false)` to exit.
    fn read_eval_print(&mut self) -> Result<bool> {
        let prompt = if self.archive.in_transaction() {
            format!("*{}", self.prompt)
        } else {
            self.prompt.clone()
        };

        let input = match self.editor.read_line(&prompt)? {
            ReadResult::Line(line) => line,
            ReadResult::Interrupted => {
                println!();
                return Ok(true);
            }
            ReadResult::Eof => return Ok(false),
        };

        if input.trim().is_empty() {
            return Ok(true);
        }
        self.editor.add_history(&input);

        match self.archive.eval(&input) {
            Ok(reply) => {
                print_reply(&reply);
                Ok(!reply.quit)
            }
            Err(e) => {
                print_error(&e);
                Ok(true)
            }
        }
    }

    /// Evaluates one line.
    ///
    /// # Errors
    ///
    /// Returns any parse or execution error.
    pub fn eval(&mut self, input: &str) -> Result<Reply> {
        self.archive.eval(input)
    }

    /// Runs a script file, printing its output (for CLI batch mode).
    ///
    /// Returns `Ok(false)` if the script asked to quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line fails.
    pub fn eval_file(&mut self, path: &Path) -> Result<bool> {
        let source = fs::read_to_string(path)
            .map_err(|e| Error::command(format!("failed to read {}: {e}", path.display())))?;
        let reply = self
            .archive
            .run_script(&path.display().to_string(), &source)?;
        print_reply(&reply);
        Ok(!reply.quit)
    }

    /// Prints the welcome banner.
    #[allow(clippy::unused_self)]
    fn print_banner(&self) {
        println!("\x1b[1;36mEncore\x1b[0m music archive v{}", env!("CARGO_PKG_VERSION"));
        println!("Type `help` for commands. Use Ctrl+D to exit.\n");
        let _ = io::stdout().flush();
    }
}

fn print_reply(reply: &Reply) {
    for line in &reply.lines {
        println!("{line}");
    }
}

/// Prints an error and its context to stderr.
pub fn print_error(error: &Error) {
    match &error.context {
        Some(context) => eprintln!("\x1b[31mError: {error}\x1b[0m\n  {context}"),
        None => eprintln!("\x1b[31mError: {error}\x1b[0m"),
    }
}
