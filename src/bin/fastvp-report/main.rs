#![deny(clippy::all)]
#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]

mod cli;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use fastvp::{Symcli, XmlDir};

use crate::cli::Input;

fn main() -> Result<()> {
    let args = cli::args().with_context(|| "parsing CLI args")?;

    init_logging(args.verbosity);

    let report = match &args.input {
        Input::Saved(dir) => fastvp::run(&XmlDir::new(dir), args.options)?,
        Input::Symcli { sid, symcli_dir } => {
            let symcli = Symcli::new(sid, symcli_dir.as_deref())?;
            fastvp::run(&symcli, args.options)?
        }
    };

    print!("{}", report);

    Ok(())
}

/// Logs to **STDERR** so the report on **STDOUT** stays clean.
///
/// `RUST_LOG` wins over the `-v` count when set.
fn init_logging(verbosity: u64) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
