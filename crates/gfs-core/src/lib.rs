//! Core types and the selection algorithm for GFS backup rotation.
//!
//! Given a set of backup timestamps and a [`Policy`] such as "keep 14 daily,
//! 4 weekly, 3 monthly, 2 yearly", [`select`] decides which timestamps survive
//! rotation and which are discarded.
//!
//! This crate performs no I/O. Reading timestamps, building the policy from
//! user input and printing the result belong to `gfs-cli`.
//!
//! ```
//! use gfs_core::{Policy, Polarity, select, timestamp::parse_timestamp};
//!
//! let dates = ["2024-01-01", "2024-01-02", "2024-01-03"]
//!   .iter()
//!   .map(|s| parse_timestamp(s, "%Y-%m-%d"))
//!   .collect::<Result<Vec<_>, _>>()
//!   .unwrap();
//! let policy = Policy::from_specs(["daily=2"]).unwrap();
//!
//! let kept = select(dates, &policy, Polarity::Keep).unwrap();
//! assert_eq!(kept.len(), 2);
//! ```

pub mod cycle;
pub mod error;
pub mod policy;
pub mod select;
pub mod timestamp;

pub use cycle::{BucketKey, Cycle, CycleSpec, bucket_key, parse_cycle_spec};
pub use error::{Error, Result};
pub use policy::{Polarity, Policy};
pub use select::{Selection, SelectionReport, select, select_by_cycle};
