//! Tests for option resolution and end-to-end runs over in-memory buffers.

use std::{
  io::{BufRead, Cursor},
  num::NonZeroUsize,
  path::Path,
};

use clap::{CommandFactory, Parser};
use gfs_core::{Cycle, Polarity};

use crate::{
  Cli, Options, Settings, load_settings, load_settings_with_env, open_input,
  read_timestamps, run,
};

const BACKUPS: &str = "\
2017-05-21T22:00:00
2017-05-21T21:00:00
2017-05-20T20:00:00
2017-05-14T19:00:00
2017-05-13T18:00:00
2017-05-07T17:00:00
2017-04-30T16:00:00
2017-04-23T15:00:00
2016-12-25T14:00:00
2015-12-30T13:00:00
";

fn cli(args: &[&str]) -> Cli {
  Cli::try_parse_from(std::iter::once("gfs").chain(args.iter().copied()))
    .expect("valid arguments")
}

fn options(args: &[&str]) -> Options {
  Options::resolve(&cli(args), Settings::default()).expect("valid options")
}

/// A stand-in for the process environment.
fn env(vars: &[(&str, &str)]) -> config::Map<String, String> {
  vars
    .iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

fn run_to_string(options: &Options, input: &str) -> anyhow::Result<String> {
  let mut out = Vec::new();
  run(options, Cursor::new(input), &mut out)?;
  Ok(String::from_utf8(out).expect("utf-8 output"))
}

// ─── Argument parsing ────────────────────────────────────────────────────────

#[test]
fn command_definition_is_consistent() { Cli::command().debug_assert(); }

#[test]
fn keep_and_remove_conflict() {
  let result = Cli::try_parse_from(["gfs", "--keep", "--remove", "daily=1"]);
  assert!(result.is_err());
}

#[test]
fn defaults_to_keep_and_default_format() {
  let opts = options(&["daily=2"]);
  assert_eq!(opts.polarity, Polarity::Keep);
  assert_eq!(opts.format, gfs_core::timestamp::DEFAULT_FORMAT);
  assert!(!opts.json);
}

#[test]
fn missing_cycles_is_an_error() {
  let err = Options::resolve(&cli(&[]), Settings::default()).unwrap_err();
  assert!(err.to_string().contains("no retention cycles"));
}

#[test]
fn bad_cycle_is_an_error() {
  for spec in ["hourly=3", "daily=0", "daily", "weekly=x"] {
    assert!(
      Options::resolve(&cli(&[spec]), Settings::default()).is_err(),
      "{spec}"
    );
  }
}

#[test]
fn bad_format_is_rejected_up_front() {
  let err =
    Options::resolve(&cli(&["-f", "%Y-%!", "daily=1"]), Settings::default())
      .unwrap_err();
  assert!(err.to_string().contains("invalid date format"));
}

// ─── Settings precedence ─────────────────────────────────────────────────────

#[test]
fn settings_fill_in_missing_flags() {
  let settings = Settings {
    format: Some("%Y-%m-%d".into()),
    mode:   Some(Polarity::Remove),
    policy: Some(gfs_core::Policy::from_specs(["weekly=3"]).unwrap()),
  };
  let opts = Options::resolve(&cli(&[]), settings).unwrap();

  assert_eq!(opts.format, "%Y-%m-%d");
  assert_eq!(opts.polarity, Polarity::Remove);
  assert_eq!(opts.policy.get(Cycle::Weekly), NonZeroUsize::new(3));
}

#[test]
fn flags_override_settings() {
  let settings = Settings {
    format: Some("%Y-%m-%d".into()),
    mode:   Some(Polarity::Remove),
    policy: Some(gfs_core::Policy::from_specs(["weekly=3"]).unwrap()),
  };
  let opts =
    Options::resolve(&cli(&["--keep", "-f", "%Y/%m/%d", "daily=1"]), settings)
      .unwrap();

  assert_eq!(opts.format, "%Y/%m/%d");
  assert_eq!(opts.polarity, Polarity::Keep);
  assert_eq!(opts.policy.len(), 1);
  assert!(opts.policy.get(Cycle::Weekly).is_none());
}

#[test]
fn loads_settings_from_toml_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("gfs.toml");
  std::fs::write(
    &path,
    "format = \"%Y-%m-%d\"\nmode = \"remove\"\n\n\
     [policy]\nday = 7\nMonthly = 2\n",
  )
  .unwrap();

  let settings = load_settings(&path).unwrap();
  assert_eq!(settings.format.as_deref(), Some("%Y-%m-%d"));
  assert_eq!(settings.mode, Some(Polarity::Remove));
  let policy = settings.policy.unwrap();
  assert_eq!(policy.get(Cycle::Daily), NonZeroUsize::new(7));
  assert_eq!(policy.get(Cycle::Monthly), NonZeroUsize::new(2));
}

#[test]
fn config_file_is_toml_whatever_its_extension() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("gfs.conf");
  std::fs::write(&path, "mode = \"remove\"\n\n[policy]\nweekly = 4\n")
    .unwrap();

  let settings = load_settings(&path).unwrap();
  assert_eq!(settings.mode, Some(Polarity::Remove));
  assert_eq!(
    settings.policy.unwrap().get(Cycle::Weekly),
    NonZeroUsize::new(4)
  );
}

#[test]
fn missing_config_file_is_not_an_error() {
  let dir = tempfile::tempdir().unwrap();
  let settings =
    load_settings_with_env(&dir.path().join("gfs.toml"), Some(env(&[])))
      .unwrap();
  assert!(settings.format.is_none());
  assert!(settings.policy.is_none());
}

#[test]
fn environment_overrides_the_config_file() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("gfs.toml");
  std::fs::write(
    &path,
    "format = \"%Y-%m-%d\"\nmode = \"keep\"\n\n[policy]\ndaily = 7\n",
  )
  .unwrap();

  let settings = load_settings_with_env(
    &path,
    Some(env(&[("GFS_FORMAT", "%d.%m.%Y"), ("GFS_MODE", "remove")])),
  )
  .unwrap();
  assert_eq!(settings.format.as_deref(), Some("%d.%m.%Y"));
  assert_eq!(settings.mode, Some(Polarity::Remove));
  assert_eq!(
    settings.policy.as_ref().unwrap().get(Cycle::Daily),
    NonZeroUsize::new(7)
  );

  // Flags still win over the environment.
  let opts =
    Options::resolve(&cli(&["-k", "-f", "%Y/%m/%d"]), settings).unwrap();
  assert_eq!(opts.format, "%Y/%m/%d");
  assert_eq!(opts.polarity, Polarity::Keep);
}

#[test]
fn invalid_policy_in_file_is_an_error() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("gfs.toml");
  std::fs::write(&path, "[policy]\ndaily = 0\n").unwrap();

  assert!(load_settings(&path).is_err());
}

// ─── Input ───────────────────────────────────────────────────────────────────

#[test]
fn skips_blank_lines_and_comments() {
  let input = "# nightly backups\n2024-01-01\n\n   \n2024-01-02\n";
  let timestamps = read_timestamps(Cursor::new(input), "%Y-%m-%d").unwrap();
  assert_eq!(timestamps.len(), 2);
}

#[test]
fn opens_input_files() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("backups.txt");
  std::fs::write(&path, "2024-01-01\n2024-01-02\n").unwrap();

  let lines: Vec<String> = open_input(Some(path.as_path()))
    .unwrap()
    .lines()
    .collect::<Result<_, _>>()
    .unwrap();
  assert_eq!(lines, ["2024-01-01", "2024-01-02"]);
}

#[test]
fn dash_and_no_path_mean_stdin() {
  assert!(open_input(Some(Path::new("-"))).is_ok());
  assert!(open_input(None).is_ok());
}

#[test]
fn missing_input_file_is_an_error() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("missing.txt");
  let err = open_input(Some(path.as_path())).err().unwrap();
  assert!(err.to_string().contains("failed to open"));
}

#[test]
fn reports_the_offending_line() {
  let input = "2024-01-01\nnot a date\n";
  let err = read_timestamps(Cursor::new(input), "%Y-%m-%d").unwrap_err();
  assert_eq!(err.to_string(), "line 2");
  assert!(format!("{err:#}").contains("not a date"));
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[test]
fn prints_kept_timestamps_most_recent_first() {
  let opts = options(&["yearly=2", "monthly=2", "weekly=2", "daily=2"]);
  let out = run_to_string(&opts, BACKUPS).unwrap();

  assert_eq!(
    out,
    "\
2017-05-21T22:00:00
2017-05-20T20:00:00
2017-05-14T19:00:00
2017-04-30T16:00:00
2016-12-25T14:00:00
"
  );
}

#[test]
fn prints_removed_timestamps() {
  let opts = options(&["-r", "year=2", "month=2", "week=2", "day=2"]);
  let out = run_to_string(&opts, BACKUPS).unwrap();

  assert_eq!(
    out,
    "\
2017-05-21T21:00:00
2017-05-13T18:00:00
2017-05-07T17:00:00
2017-04-23T15:00:00
2015-12-30T13:00:00
"
  );
}

#[test]
fn output_uses_the_input_format() {
  let opts = options(&["-f", "backup-%Y-%m-%d", "daily=2"]);
  let out = run_to_string(
    &opts,
    "backup-2024-01-01\nbackup-2024-01-03\nbackup-2024-01-02\n",
  )
  .unwrap();
  assert_eq!(out, "backup-2024-01-03\nbackup-2024-01-02\n");
}

#[test]
fn hour_only_format_keeps_each_hour() {
  let opts = options(&["-f", "%Y-%m-%d %H", "daily=5"]);
  let out = run_to_string(
    &opts,
    "2024-01-01 10\n2024-01-01 22\n2024-01-02 05\n",
  )
  .unwrap();
  assert_eq!(out, "2024-01-02 05\n2024-01-01 22\n");
}

#[test]
fn offsets_are_kept_and_printed_back() {
  let opts = options(&["-r", "-f", "%Y-%m-%dT%H:%M:%S%z", "daily=1"]);
  let out = run_to_string(
    &opts,
    "2024-01-01T10:00:00+0000\n\
     2024-01-01T10:00:00+0200\n\
     2024-01-02T09:00:00+0100\n",
  )
  .unwrap();
  assert_eq!(
    out,
    "2024-01-01T10:00:00+0000\n2024-01-01T10:00:00+0200\n"
  );
}

#[test]
fn empty_input_prints_nothing() {
  let opts = options(&["daily=2"]);
  assert_eq!(run_to_string(&opts, "").unwrap(), "");
}

#[test]
fn json_report_lists_every_cycle() {
  let opts = options(&["--json", "daily=1", "yearly=2"]);
  let out = run_to_string(&opts, BACKUPS).unwrap();
  let report: serde_json::Value = serde_json::from_str(&out).unwrap();

  assert_eq!(report["cycles"]["daily"][0], "2017-05-21T22:00:00");
  assert_eq!(report["cycles"]["yearly"][1], "2016-12-25T14:00:00");
  assert_eq!(report["kept"].as_array().unwrap().len(), 2);
  assert_eq!(report["removed"].as_array().unwrap().len(), 8);
}
