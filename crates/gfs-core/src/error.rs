//! Error types for `gfs-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("policy has no cycles; specify at least one of daily, weekly, monthly, yearly")]
  EmptyPolicy,

  #[error("policy not available: {0:?}")]
  UnknownCycle(String),

  #[error("malformed cycle spec {0:?}, expected CYCLE=COUNT")]
  MalformedCycleSpec(String),

  #[error("invalid slot count for {cycle}: {value:?}")]
  InvalidSlotCount { cycle: String, value: String },

  /// Slot counts must be at least one.
  #[error("policies only accept a positive number of slots, {value} given for {cycle}")]
  NonPositiveSlots { cycle: String, value: i64 },

  #[error("timestamp {input:?} does not match format {format:?}")]
  Parse { input: String, format: String },

  #[error("invalid date format {0:?}")]
  InvalidFormat(String),
}

impl Error {
  /// Whether this error describes an invalid retention policy, as opposed to
  /// malformed timestamps or date formats.
  pub fn is_configuration(&self) -> bool {
    matches!(
      self,
      Self::EmptyPolicy
        | Self::UnknownCycle(_)
        | Self::MalformedCycleSpec(_)
        | Self::InvalidSlotCount { .. }
        | Self::NonPositiveSlots { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
