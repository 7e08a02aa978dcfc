//! mlc-drv - the `mlc` command-line driver.
//!
//! Wires the compiler phases together: lexer, parser, semantic analyzer,
//! IR generator, optimizer, and interpreter. Reachable two ways: as a
//! library (`Session::run`, `pipeline::run_source`) for embedding or
//! testing, and as the `mlc` binary built from `src/main.rs`.

mod diagnostics;
mod pipeline;

pub use diagnostics::{ErrorRecord, Stage};
pub use pipeline::run_source;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// MiniLang compiler and interpreter.
#[derive(Parser, Debug, Clone)]
#[command(name = "mlc", version, about = "Compile and run MiniLang programs")]
pub struct Config {
    /// Source file to run (conventionally suffixed `.nc`). Omit with `--repl`.
    pub source: Option<PathBuf>,

    /// Print the generated instruction listing before running it.
    #[arg(short, long)]
    pub verbose: bool,

    /// Skip the optimizer and interpret the generator's raw IR.
    #[arg(long = "no-opt")]
    pub no_opt: bool,

    /// Start an interactive read-eval-print loop instead of running a file.
    #[arg(long)]
    pub repl: bool,
}

/// A single compiler invocation: one parsed `Config`, run to completion.
pub struct Session {
    config: Config,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the configured session. Returns `Ok(true)` if the program (or,
    /// in `--repl` mode, every line entered) completed without error.
    pub fn run(&self) -> anyhow::Result<bool> {
        if self.config.repl {
            self.run_repl()
        } else {
            let path = self
                .config
                .source
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("a source file is required outside --repl mode"))?;
            let source = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
            Ok(self.run_one(&source))
        }
    }

    fn run_repl(&self) -> anyhow::Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        let mut all_ok = true;

        write!(stdout, "mlc> ")?;
        stdout.flush()?;
        for line in stdin.lock().lines() {
            let line = line?;
            if !line.trim().is_empty() {
                all_ok &= self.run_one(&line);
            }
            write!(stdout, "mlc> ")?;
            stdout.flush()?;
        }
        writeln!(stdout)?;
        Ok(all_ok)
    }

    fn run_one(&self, source: &str) -> bool {
        let stdin = io::stdin();
        let stdout = io::stdout();
        match pipeline::run_source(source, !self.config.no_opt, self.config.verbose, stdin.lock(), stdout.lock()) {
            Ok(()) => true,
            Err(records) => {
                for record in &records {
                    eprintln!("{}", record);
                }
                false
            }
        }
    }
}

/// Entry point shared by `main.rs`: parses arguments, runs the session, and
/// maps the outcome onto an exit code per the `0` success / `1` failure
/// convention.
pub fn run_cli() -> anyhow::Result<ExitCode> {
    let config = Config::parse();
    init_tracing(config.verbose);
    let session = Session::new(config);
    Ok(if session.run()? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `--verbose` raises the default filter from `warn` to `debug`; `RUST_LOG`
/// always wins when set, so a user can ask for more without editing a flag.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}
