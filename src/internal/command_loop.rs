//! Reads `+`/`?`/`-` commands from stdin and answers `OK`/`FAIL` on stdout

use std::io::{self, BufWriter};

use anyhow::Context;
use clap::{ArgAction, Parser};
use probeset::{OpenAddressingSet, command};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command line options
#[derive(Debug, Parser)]
#[command(name = "probeset", about = "Open-addressing set driven by +/?/- commands", version)]
struct Cli {
    /// Log more on stderr (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Installs a stderr subscriber so stdout carries only answers
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut set = OpenAddressingSet::new();
    let stdout = io::stdout();
    let tally = command::run(&mut set, io::stdin().lock(), BufWriter::new(stdout.lock()))
        .context("failed to process commands")?;

    let stats = set.stats();
    info!(
        executed = tally.executed,
        ok = tally.ok,
        failed = tally.failed,
        ignored = tally.ignored,
        capacity = stats.capacity,
        live = stats.live,
        tombstones = stats.tombstones,
        "input exhausted"
    );
    Ok(())
}
