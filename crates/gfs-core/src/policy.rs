//! Retention policy and output polarity.

use std::{collections::BTreeMap, num::NonZeroUsize};

use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  cycle::{Cycle, CycleSpec},
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// How many periods to retain per cycle.
///
/// Every entry is validated on the way in: names resolve to one of the four
/// canonical cycles and slot counts are positive. A policy may be built up
/// empty, but [`crate::select`] refuses to run with one.
///
/// Deserialises from a table such as `{ daily = 14, week = 4 }`, applying the
/// same validation as [`Policy::from_specs`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, i64>")]
pub struct Policy {
  cycles: BTreeMap<Cycle, NonZeroUsize>,
}

impl Policy {
  pub fn new() -> Self { Self::default() }

  /// Set the slot count for `cycle`, returning the previous one.
  ///
  /// A later entry for the same cycle replaces the earlier one, including
  /// when it was spelled with an alias.
  pub fn insert(
    &mut self,
    cycle: Cycle,
    slots: NonZeroUsize,
  ) -> Option<NonZeroUsize> {
    let previous = self.cycles.insert(cycle, slots);
    if let Some(previous) = previous {
      tracing::warn!(
        %cycle,
        previous = previous.get(),
        slots = slots.get(),
        "cycle specified more than once; keeping the last value"
      );
    }
    previous
  }

  /// Builder-style [`Policy::insert`].
  pub fn with(mut self, cycle: Cycle, slots: NonZeroUsize) -> Self {
    self.insert(cycle, slots);
    self
  }

  /// Build a policy from `cycle=count` strings such as `["daily=14",
  /// "weekly=4"]`.
  pub fn from_specs<I, S>(specs: I) -> Result<Self>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut policy = Self::new();
    for spec in specs {
      let spec: CycleSpec = spec.as_ref().parse()?;
      policy.insert(spec.cycle, spec.slots);
    }
    Ok(policy)
  }

  /// Build a policy from already split `(name, count)` pairs.
  pub fn from_counts<I, S>(counts: I) -> Result<Self>
  where
    I: IntoIterator<Item = (S, i64)>,
    S: AsRef<str>,
  {
    let mut policy = Self::new();
    for (name, value) in counts {
      let name = name.as_ref();
      let cycle = Cycle::parse(name)?;
      policy.insert(cycle, CycleSpec::slots_from_int(name, value)?);
    }
    Ok(policy)
  }

  /// Fail with [`Error::EmptyPolicy`] when no cycle is configured.
  pub fn validate(&self) -> Result<()> {
    if self.cycles.is_empty() {
      return Err(Error::EmptyPolicy);
    }
    Ok(())
  }

  pub fn get(&self, cycle: Cycle) -> Option<NonZeroUsize> {
    self.cycles.get(&cycle).copied()
  }

  pub fn is_empty(&self) -> bool { self.cycles.is_empty() }

  pub fn len(&self) -> usize { self.cycles.len() }

  /// Configured cycles in evaluation order (daily first).
  pub fn iter(&self) -> impl Iterator<Item = (Cycle, NonZeroUsize)> + '_ {
    self.cycles.iter().map(|(c, n)| (*c, *n))
  }
}

impl TryFrom<BTreeMap<String, i64>> for Policy {
  type Error = Error;

  fn try_from(table: BTreeMap<String, i64>) -> Result<Self> {
    Self::from_counts(table)
  }
}

impl FromIterator<(Cycle, NonZeroUsize)> for Policy {
  fn from_iter<I: IntoIterator<Item = (Cycle, NonZeroUsize)>>(iter: I) -> Self {
    let mut policy = Self::new();
    for (cycle, slots) in iter {
      policy.insert(cycle, slots);
    }
    policy
  }
}

// ─── Polarity ────────────────────────────────────────────────────────────────

/// Whether a selection reports the timestamps to keep or the ones to remove.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
  #[default]
  Keep,
  Remove,
}

impl Polarity {
  /// `true` selects [`Polarity::Keep`].
  pub fn from_keep(keep: bool) -> Self {
    if keep { Self::Keep } else { Self::Remove }
  }
}
