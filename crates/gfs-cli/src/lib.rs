//! Command-line front end for the GFS rotation filter.
//!
//! Reads one timestamp per line, runs the configured [`Policy`] over them and
//! prints the timestamps to keep (or to remove), most recent first, in the
//! same format they were read in.

use std::{
  fs::File,
  io::{self, BufRead, BufReader, Write},
  path::{Path, PathBuf},
};

use anyhow::{Context as _, bail};
use clap::Parser;
use gfs_core::{
  Polarity, Policy, select_by_cycle,
  timestamp::{
    DEFAULT_FORMAT, Timestamp, format_timestamp, parse_timestamp,
    validate_format,
  },
};
use serde::Deserialize;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "gfs",
  version,
  about = "Grandfather-father-son backup rotation filter",
  after_help = "Example: ls /backups | gfs -f 'backup-%Y-%m-%d' \
                daily=14 weekly=4 monthly=3 yearly=2"
)]
pub struct Cli {
  /// Retention cycles as CYCLE=COUNT. Cycles: daily, weekly, monthly, yearly
  /// (or day, week, month, year).
  #[arg(value_name = "CYCLE=COUNT")]
  pub cycles: Vec<String>,

  /// strftime-style format of the input timestamps.
  #[arg(short, long, value_name = "FMT")]
  pub format: Option<String>,

  /// Read timestamps from FILE instead of stdin (`-` means stdin).
  #[arg(short, long, value_name = "FILE")]
  pub input: Option<PathBuf>,

  /// Print the timestamps to keep (default).
  #[arg(short, long, conflicts_with = "remove")]
  pub keep: bool,

  /// Print the timestamps to remove.
  #[arg(short, long)]
  pub remove: bool,

  /// Path to an optional TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "gfs.toml")]
  pub config: PathBuf,

  /// Print a JSON report with the survivors of every cycle.
  #[arg(long)]
  pub json: bool,
}

// ─── Configuration ────────────────────────────────────────────────────────────

/// Settings read from the config file and `GFS_*` environment variables.
///
/// ```toml
/// format = "%Y-%m-%d"
/// mode   = "remove"
///
/// [policy]
/// daily  = 14
/// weekly = 4
/// ```
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct Settings {
  pub format: Option<String>,
  pub mode:   Option<Polarity>,
  pub policy: Option<Policy>,
}

/// Load settings from the TOML file at `path` (if it exists), then the
/// environment.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
  load_settings_with_env(path, None)
}

/// Like [`load_settings`], reading `GFS_*` variables from `env` instead of the
/// process environment when given.
fn load_settings_with_env(
  path: &Path,
  env: Option<config::Map<String, String>>,
) -> anyhow::Result<Settings> {
  let settings = config::Config::builder()
    .add_source(
      config::File::from(path)
        .format(config::FileFormat::Toml)
        .required(false),
    )
    .add_source(config::Environment::with_prefix("GFS").source(env))
    .build()
    .with_context(|| format!("failed to read config file {}", path.display()))?;

  settings
    .try_deserialize()
    .context("failed to deserialise settings")
}

/// Fully resolved options for one run.
#[derive(Debug, Clone)]
pub struct Options {
  pub format:   String,
  pub policy:   Policy,
  pub polarity: Polarity,
  pub json:     bool,
  pub input:    Option<PathBuf>,
}

impl Options {
  /// Merge CLI flags over `settings`. Cycles given on the command line
  /// replace the configured policy entirely.
  ///
  /// The policy and format are validated here, before any input is read.
  pub fn resolve(cli: &Cli, settings: Settings) -> anyhow::Result<Self> {
    let policy = if cli.cycles.is_empty() {
      settings.policy.unwrap_or_default()
    } else {
      Policy::from_specs(&cli.cycles).context("invalid retention cycle")?
    };
    if policy.is_empty() {
      bail!(
        "no retention cycles given; pass e.g. `daily=7 weekly=4` or set \
         [policy] in the config file"
      );
    }

    let polarity = if cli.remove {
      Polarity::Remove
    } else if cli.keep {
      Polarity::Keep
    } else {
      settings.mode.unwrap_or_default()
    };

    let format = cli
      .format
      .clone()
      .or(settings.format)
      .unwrap_or_else(|| DEFAULT_FORMAT.to_string());
    validate_format(&format)?;

    Ok(Self {
      format,
      policy,
      polarity,
      json: cli.json,
      input: cli.input.clone(),
    })
  }
}

// ─── Input / output ───────────────────────────────────────────────────────────

/// Open the timestamp source: a file, or stdin when `path` is absent or `-`.
pub fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
  match path {
    Some(path) if path != Path::new("-") => {
      let file = File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
      Ok(Box::new(BufReader::new(file)))
    }
    _ => Ok(Box::new(io::stdin().lock())),
  }
}

/// Parse one timestamp per line. Blank lines and `#` comments are skipped.
pub fn read_timestamps<R: BufRead>(
  reader: R,
  format: &str,
) -> anyhow::Result<Vec<Timestamp>> {
  let mut timestamps = Vec::new();
  for (index, line) in reader.lines().enumerate() {
    let line = line.context("failed to read input")?;
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
      continue;
    }
    let ts = parse_timestamp(line, format)
      .with_context(|| format!("line {}", index + 1))?;
    timestamps.push(ts);
  }
  Ok(timestamps)
}

/// Run one selection: read from `input`, write the result to `out`.
pub fn run<R, W>(options: &Options, input: R, out: &mut W) -> anyhow::Result<()>
where
  R: BufRead,
  W: Write,
{
  let timestamps = read_timestamps(input, &options.format)?;
  tracing::info!(count = timestamps.len(), "read timestamps");

  let selection = select_by_cycle(timestamps, &options.policy)?;

  if options.json {
    let report = selection.report(|ts| format_timestamp(ts, &options.format))?;
    serde_json::to_writer_pretty(&mut *out, &report)
      .context("failed to write report")?;
    writeln!(out)?;
  } else {
    let selected = selection.into_sorted(options.polarity);
    tracing::info!(
      polarity = ?options.polarity,
      count = selected.len(),
      "selection complete"
    );
    for ts in &selected {
      writeln!(out, "{}", format_timestamp(ts, &options.format)?)
        .context("failed to write output")?;
    }
  }

  out.flush().context("failed to flush output")?;
  Ok(())
}

#[cfg(test)]
mod tests;
