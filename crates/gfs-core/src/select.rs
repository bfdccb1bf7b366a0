//! The rotation selector.
//!
//! Each cycle is evaluated independently over the same deduplicated candidate
//! set:
//!
//!   candidates
//!     └─ group by bucket key       → one bucket per calendar period
//!          └─ latest per bucket    → one representative per period
//!               └─ newest N periods → the cycle's survivors
//!
//! A timestamp survives overall when it survives under any cycle.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use serde::Serialize;

use crate::{
  Result,
  cycle::{BucketKey, Cycle},
  policy::{Polarity, Policy},
};

// ─── Selection ───────────────────────────────────────────────────────────────

/// The outcome of running a [`Policy`] over a set of timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<T> {
  candidates: BTreeSet<T>,
  /// Survivors per configured cycle, most recent first.
  by_cycle:   BTreeMap<Cycle, Vec<T>>,
}

impl<T: Ord + Clone> Selection<T> {
  /// Every distinct input timestamp.
  pub fn candidates(&self) -> &BTreeSet<T> { &self.candidates }

  /// The representatives selected under `cycle`, most recent first. Empty
  /// when the cycle is not part of the policy.
  pub fn survivors_for(&self, cycle: Cycle) -> &[T] {
    self.by_cycle.get(&cycle).map(Vec::as_slice).unwrap_or(&[])
  }

  fn survivor_set(&self) -> BTreeSet<&T> {
    self.by_cycle.values().flatten().collect()
  }

  /// Timestamps that survive under at least one cycle, most recent first.
  pub fn kept(&self) -> Vec<T> {
    self.survivor_set().into_iter().rev().cloned().collect()
  }

  /// Timestamps that survive under no cycle, most recent first.
  pub fn removed(&self) -> Vec<T> {
    let survivors = self.survivor_set();
    self
      .candidates
      .iter()
      .rev()
      .filter(|ts| !survivors.contains(ts))
      .cloned()
      .collect()
  }

  /// The kept or removed timestamps, depending on `polarity`.
  pub fn into_sorted(self, polarity: Polarity) -> Vec<T> {
    match polarity {
      Polarity::Keep => self.kept(),
      Polarity::Remove => self.removed(),
    }
  }

  /// Render every list of the selection with `render`, stopping at the first
  /// failure.
  pub fn report<F, E>(&self, mut render: F) -> Result<SelectionReport, E>
  where
    F: FnMut(&T) -> Result<String, E>,
  {
    let mut cycles = BTreeMap::new();
    for (cycle, survivors) in &self.by_cycle {
      let rendered = survivors
        .iter()
        .map(&mut render)
        .collect::<Result<Vec<String>, E>>()?;
      cycles.insert(*cycle, rendered);
    }

    Ok(SelectionReport {
      cycles,
      kept: self.kept().iter().map(&mut render).collect::<Result<_, E>>()?,
      removed: self
        .removed()
        .iter()
        .map(&mut render)
        .collect::<Result<_, E>>()?,
    })
  }
}

/// A rendered [`Selection`]: per-cycle survivors plus the final kept and
/// removed lists, all most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionReport {
  pub cycles:  BTreeMap<Cycle, Vec<String>>,
  pub kept:    Vec<String>,
  pub removed: Vec<String>,
}

// ─── Public API ──────────────────────────────────────────────────────────────

/// Run `policy` over `timestamps` and keep the per-cycle breakdown.
///
/// Duplicate timestamps collapse into one. Fails with
/// [`crate::Error::EmptyPolicy`] before doing any work when the policy has no
/// cycles.
pub fn select_by_cycle<T, I>(
  timestamps: I,
  policy: &Policy,
) -> Result<Selection<T>>
where
  I: IntoIterator<Item = T>,
  T: Datelike + Ord + Clone,
{
  policy.validate()?;

  let candidates: BTreeSet<T> = timestamps.into_iter().collect();
  let mut by_cycle = BTreeMap::new();

  for (cycle, slots) in policy.iter() {
    let survivors = select_cycle(&candidates, cycle, slots.get());
    tracing::debug!(
      %cycle,
      slots = slots.get(),
      selected = survivors.len(),
      "evaluated cycle"
    );
    by_cycle.insert(cycle, survivors);
  }

  Ok(Selection {
    candidates,
    by_cycle,
  })
}

/// Return the timestamps to keep (or to remove) under `policy`, most recent
/// first and without duplicates.
pub fn select<T, I>(
  timestamps: I,
  policy: &Policy,
  polarity: Polarity,
) -> Result<Vec<T>>
where
  I: IntoIterator<Item = T>,
  T: Datelike + Ord + Clone,
{
  Ok(select_by_cycle(timestamps, policy)?.into_sorted(polarity))
}

/// Latest timestamp per bucket, newest `slots` buckets, most recent first.
fn select_cycle<T>(
  candidates: &BTreeSet<T>,
  cycle: Cycle,
  slots: usize,
) -> Vec<T>
where
  T: Datelike + Ord + Clone,
{
  // Candidates iterate in ascending order, so the last write per bucket is
  // its latest member.
  let mut latest: BTreeMap<BucketKey, &T> = BTreeMap::new();
  for ts in candidates {
    latest.insert(cycle.bucket_key(ts), ts);
  }

  let mut representatives: Vec<&T> = latest.into_values().collect();
  representatives.sort_unstable_by(|a, b| b.cmp(a));
  representatives.into_iter().take(slots).cloned().collect()
}
