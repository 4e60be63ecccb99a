use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use gdb_console_query::{interactive, logger, MiSession, SessionConfig};
use tracing::info;

/// Query symbols, source lines and catchpoints of a program through gdb.
#[derive(Parser, Debug)]
#[command(name = "gdb-console-query")]
#[command(version)]
#[command(about = "Query symbols, source lines and catchpoints of a program through gdb", long_about = None)]
struct Cli {
    /// gdb binary to launch
    #[arg(long = "gdb", env = "GDB", default_value = "gdb")]
    gdb_bin: String,
    /// Log MI traffic at debug level
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
    /// Append logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Break at main and run before the prompt
    #[arg(long, default_value_t = false)]
    break_main: bool,
    /// Program to debug
    target: String,
    /// Arguments passed to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = SessionConfig {
        gdb_bin: cli.gdb_bin,
        target: cli.target,
        target_args: cli.args,
        verbose: cli.verbose,
        log_file: cli.log_file,
    };
    logger::init(&config)?;

    if !Path::new(&config.target).exists() {
        bail!("target not found: {}", config.target);
    }
    info!(gdb = %config.gdb_bin, target = %config.target, args = ?config.target_args, "starting gdb");
    let mut session = MiSession::start(&config).context("failed to start gdb")?;

    if cli.break_main {
        let stop = session.run_to_main().context("failed to run to main")?;
        println!(
            "stopped at {}:{}",
            stop.file.as_deref().unwrap_or("?"),
            stop.line.unwrap_or(0)
        );
    }

    let outcome = interactive::repl(&mut session);
    session.shutdown();
    outcome.context("interactive session failed")
}
