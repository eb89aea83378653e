use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::info;
use qdb::repl::Repl;
use qdb::Database;

#[derive(ValueEnum, Debug, Clone, Copy)]
enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for log::LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

/// An in-memory SQL-like relational engine with an interactive REPL.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// How chatty internal logging should be.
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevelArg,

    /// Run every line of this file before dropping into the interactive
    /// loop (or, combined with stdin being non-interactive, instead of it).
    #[arg(long)]
    read: Option<PathBuf>,

    /// Never print the `qdb> ` prompt, even on an interactive terminal.
    #[arg(long)]
    no_prompt: bool,
}

fn main() {
    let args = Cli::parse();

    let level_filter = log::LevelFilter::from(args.log_level);
    simple_logger::SimpleLogger::new()
        .with_level(level_filter)
        .init()
        .expect("logger already initialized");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let show_prompt = !args.no_prompt;

    let mut db = Database::new();
    let mut repl = Repl::new(BufReader::new(stdin.lock()), stdout.lock(), show_prompt);

    if let Some(script) = &args.read {
        info!("running startup script {}", script.display());
        if !repl.feed_line(&mut db, &format!(".read {}", script.display())) {
            std::process::exit(0);
        }
        if repl.had_failure() {
            std::process::exit(1);
        }
    }

    match repl.run(&mut db) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("I/O error: {e}");
            std::process::exit(1);
        }
    }
}
