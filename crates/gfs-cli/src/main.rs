//! `gfs`: grandfather-father-son backup rotation filter.
//!
//! # Usage
//!
//! ```
//! ls /backups | gfs -f 'backup-%Y-%m-%d' daily=14 weekly=4 monthly=3 yearly=2
//! gfs --remove -i backups.txt daily=7 weekly=4
//! gfs --config ~/.config/gfs.toml --json < backups.txt
//! ```

use std::io;

use clap::Parser;
use gfs_cli::{Cli, Options, load_settings, open_input, run};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
  // Logs go to stderr so stdout carries only the selected timestamps.
  tracing_subscriber::fmt()
    .with_writer(io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = load_settings(&cli.config)?;
  let options = Options::resolve(&cli, settings)?;

  let input = open_input(options.input.as_deref())?;
  let mut stdout = io::stdout().lock();
  run(&options, input, &mut stdout)
}
