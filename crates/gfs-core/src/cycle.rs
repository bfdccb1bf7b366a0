//! Rotation cycles and the bucketer that maps a timestamp onto the calendar
//! period it belongs to.
//!
//! Weeks follow ISO 8601: they start on Monday and belong to the ISO
//! week-numbering year, so the days around New Year bucket together whenever
//! they share a week. This holds regardless of the host locale.

use std::{num::NonZeroUsize, str::FromStr};

use chrono::Datelike;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::{Error, Result};

// ─── Cycle ───────────────────────────────────────────────────────────────────

/// One granularity tier of a retention policy.
///
/// Parsing is case-insensitive and accepts the short aliases `day`, `week`,
/// `month` and `year`. The derived ordering (daily first) fixes the order in
/// which a policy's cycles are evaluated and reported.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Display,
  EnumIter,
  EnumString,
  Serialize,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Cycle {
  #[strum(to_string = "daily", serialize = "day")]
  Daily,
  #[strum(to_string = "weekly", serialize = "week")]
  Weekly,
  #[strum(to_string = "monthly", serialize = "month")]
  Monthly,
  #[strum(to_string = "yearly", serialize = "year")]
  Yearly,
}

impl Cycle {
  /// Resolve a user-supplied cycle name, aliases included.
  pub fn parse(name: &str) -> Result<Self> {
    Self::from_str(name.trim())
      .map_err(|_| Error::UnknownCycle(name.trim().to_string()))
  }

  /// The calendar period `timestamp` falls into under this cycle.
  pub fn bucket_key<T: Datelike>(self, timestamp: &T) -> BucketKey {
    match self {
      Self::Daily => BucketKey::Day {
        year:  timestamp.year(),
        month: timestamp.month(),
        day:   timestamp.day(),
      },
      Self::Weekly => {
        let week = timestamp.iso_week();
        BucketKey::Week {
          year: week.year(),
          week: week.week(),
        }
      }
      Self::Monthly => BucketKey::Month {
        year:  timestamp.year(),
        month: timestamp.month(),
      },
      Self::Yearly => BucketKey::Year {
        year: timestamp.year(),
      },
    }
  }
}

// ─── Bucket keys ─────────────────────────────────────────────────────────────

/// Identifies one calendar period. Keys are only meaningful when compared
/// against keys produced by the same [`Cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
  Day { year: i32, month: u32, day: u32 },
  /// ISO week-numbering year and ISO week number (1..=53).
  Week { year: i32, week: u32 },
  Month { year: i32, month: u32 },
  Year { year: i32 },
}

/// Free-function form of [`Cycle::bucket_key`].
pub fn bucket_key<T: Datelike>(cycle: Cycle, timestamp: &T) -> BucketKey {
  cycle.bucket_key(timestamp)
}

// ─── Cycle specs ─────────────────────────────────────────────────────────────

/// A single `cycle=count` entry as written on the command line, e.g.
/// `weekly=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleSpec {
  pub cycle: Cycle,
  pub slots: NonZeroUsize,
}

impl CycleSpec {
  /// Validate a raw slot count for `name`, which is only used in error
  /// messages.
  pub(crate) fn slots_from_int(name: &str, value: i64) -> Result<NonZeroUsize> {
    if value < 1 {
      return Err(Error::NonPositiveSlots {
        cycle: name.to_string(),
        value,
      });
    }
    usize::try_from(value)
      .ok()
      .and_then(NonZeroUsize::new)
      .ok_or_else(|| Error::InvalidSlotCount {
        cycle: name.to_string(),
        value: value.to_string(),
      })
  }
}

impl FromStr for CycleSpec {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let (name, count) = s
      .split_once('=')
      .ok_or_else(|| Error::MalformedCycleSpec(s.to_string()))?;
    let name = name.trim();
    if name.is_empty() {
      return Err(Error::MalformedCycleSpec(s.to_string()));
    }

    let cycle = Cycle::parse(name)?;
    let count = count.trim();
    let value =
      count
        .parse::<i64>()
        .map_err(|_| Error::InvalidSlotCount {
          cycle: name.to_string(),
          value: count.to_string(),
        })?;
    let slots = Self::slots_from_int(name, value)?;

    Ok(Self { cycle, slots })
  }
}

/// Parse a `cycle=count` string into its canonical cycle and slot count.
pub fn parse_cycle_spec(s: &str) -> Result<(Cycle, NonZeroUsize)> {
  let spec: CycleSpec = s.parse()?;
  Ok((spec.cycle, spec.slots))
}
