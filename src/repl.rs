//! The interactive line driver (§6): reads requests and meta-commands from
//! an input source, applies them to a [`Database`], and reports results.
//!
//! Requests (ending in `;`) and meta-commands (beginning with `.`) share one
//! read loop; a line starting with `#` is a comment and skipped.

use std::io::{self, BufRead, Write};
use std::path::Path;

use colored::Colorize;
use log::debug;

use crate::Database;

const PROMPT: &str = "qdb> ";

/// What the driver should do after handling one line.
enum LineOutcome {
    Continue,
    Exit(i32),
}

pub struct Repl<R, W> {
    input: R,
    out: W,
    show_prompt: bool,
    last_line_failed: bool,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(input: R, out: W, show_prompt: bool) -> Self {
        Self { input, out, show_prompt, last_line_failed: false }
    }

    /// Runs until EOF or `.exit`, returning the process exit code.
    pub fn run(&mut self, db: &mut Database) -> io::Result<i32> {
        loop {
            if self.show_prompt {
                write!(self.out, "{PROMPT}")?;
                self.out.flush()?;
            }

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Ok(0);
            }
            let line = line.trim_end_matches(['\n', '\r']).to_owned();

            match self.handle_line(db, &line) {
                LineOutcome::Continue => {}
                LineOutcome::Exit(code) => return Ok(code),
            }
        }
    }

    /// Feeds one line (a request or a meta-command) through the same path
    /// the interactive loop uses. Returns `false` once `.exit` is seen.
    pub fn feed_line(&mut self, db: &mut Database, line: &str) -> bool {
        !matches!(self.handle_line(db, line), LineOutcome::Exit(_))
    }

    /// Whether the most recently fed line failed — used by non-interactive
    /// callers (e.g. `--read` at startup) to pick an exit code (§6).
    pub fn had_failure(&self) -> bool {
        self.last_line_failed
    }

    fn handle_line(&mut self, db: &mut Database, line: &str) -> LineOutcome {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return LineOutcome::Continue;
        }
        self.last_line_failed = false;

        if let Some(meta) = trimmed.strip_prefix('.') {
            return self.handle_meta(db, meta);
        }

        match db.run(trimmed, &mut self.out) {
            Ok(()) => {}
            Err(e) => self.report_error(&e),
        }
        LineOutcome::Continue
    }

    /// Dispatches a meta-command by its exact leading word — a
    /// length-bounded prefix check rather than generic substring search
    /// (§9), so `.saveall` never gets mistaken for `.save`.
    fn handle_meta(&mut self, db: &mut Database, meta: &str) -> LineOutcome {
        let mut parts = meta.splitn(2, char::is_whitespace);
        let command = parts.next().unwrap_or("");
        let argument = parts.next().unwrap_or("").trim();

        match command {
            "exit" => return LineOutcome::Exit(0),
            "tables" => self.print_tables(db),
            "save" => self.with_path(argument, ".save", |path| db.save(path).map_err(|e| e.to_string())),
            "open" => self.with_path(argument, ".open", |path| db.open(path).map_err(|e| e.to_string())),
            "clear" => db.clear(),
            "read" => self.read_file(db, argument),
            "ast" => self.print_ast(argument),
            "help" => self.print_help(),
            other => {
                let _ = writeln!(self.out, "unknown meta-command '.{other}' (try .help)");
            }
        }
        LineOutcome::Continue
    }

    fn with_path(
        &mut self,
        argument: &str,
        usage: &str,
        action: impl FnOnce(&Path) -> Result<(), String>,
    ) {
        if argument.is_empty() {
            let _ = writeln!(self.out, "{usage} requires a path, e.g. {usage} data.qdb");
            return;
        }
        if let Err(e) = action(Path::new(argument)) {
            self.report_error_text(&e);
        }
    }

    fn print_tables(&mut self, db: &Database) {
        for table in db.catalog().tables() {
            let schema = table.schema();
            let columns: Vec<String> = schema
                .columns
                .iter()
                .map(|c| format!("{} {}", c.name, c.ty))
                .collect();
            let _ = writeln!(
                self.out,
                "{} ({}) — {}/{} row(s)",
                schema.table_name,
                columns.join(", "),
                table.nb_rows(),
                table.capacity()
            );
        }
    }

    /// `.ast <request>`: lexes and parses `request` without executing it,
    /// printing the resulting tree — a debugging aid, not a statement kind
    /// of its own.
    fn print_ast(&mut self, request: &str) {
        if request.is_empty() {
            let _ = writeln!(self.out, ".ast requires a request, e.g. .ast SELECT * FROM \"t\";");
            return;
        }
        match crate::lexer::lex(request).map_err(|e| e.to_string()).and_then(|tokens| {
            crate::parser::parse(tokens).map_err(|e| e.to_string())
        }) {
            Ok(ast) => {
                let _ = write!(self.out, "{}", ast.pretty_print());
            }
            Err(e) => self.report_error_text(&e),
        }
    }

    fn print_help(&mut self) {
        let _ = writeln!(
            self.out,
            "requests end in ';'; meta-commands: .exit .tables .save <f> .open <f> .read <f> .clear .ast <req> .help"
        );
    }

    /// `.read <path>` (§4.7): streams the file line by line, feeding each
    /// non-blank line to the executor, halting at the first failure. A
    /// nested `.read` is itself an error.
    fn read_file(&mut self, db: &mut Database, path: &str) {
        if path.is_empty() {
            let _ = writeln!(self.out, ".read requires a path, e.g. .read script.qdb");
            return;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                self.report_error_text(&format!("could not read '{path}': {e}"));
                return;
            }
        };

        for raw_line in contents.lines() {
            let trimmed = raw_line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed == ".read" || trimmed.starts_with(".read ") {
                self.report_error_text("a .read script may not itself invoke .read");
                return;
            }
            debug!("executing line from {path}: {trimmed}");
            if let LineOutcome::Exit(_) = self.handle_line(db, trimmed) {
                return;
            }
            if self.last_line_failed {
                return;
            }
        }
    }

    fn report_error(&mut self, error: &crate::error::QdbError) {
        self.last_line_failed = true;
        let _ = writeln!(self.out, "{}", error.to_string().red());
    }

    fn report_error_text(&mut self, message: &str) {
        self.last_line_failed = true;
        let _ = writeln!(self.out, "{}", message.red());
    }
}
