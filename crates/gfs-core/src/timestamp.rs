//! Parsing and formatting timestamps with strftime-style format strings.

use std::fmt::Write as _;

use chrono::{
  DateTime, FixedOffset,
  format::{Fixed, Item, Numeric, Parsed, StrftimeItems},
};

use crate::{Error, Result};

/// Format used when none is configured, e.g. `2017-05-21T22:00:00`.
pub const DEFAULT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A parsed backup timestamp.
///
/// Formats without a UTC offset yield offset `+00:00`, so their values order
/// and bucket exactly as the wall-clock time they name. Formats with `%z` keep
/// the offset they were given, order by instant and bucket by their own local
/// calendar date.
pub type Timestamp = DateTime<FixedOffset>;

/// Reject format strings containing unknown or incomplete specifiers.
pub fn validate_format(format: &str) -> Result<()> {
  if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
    return Err(Error::InvalidFormat(format.to_string()));
  }
  Ok(())
}

/// Which time-of-day and offset fields a format string supplies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Fields {
  hour:      bool,
  minute:    bool,
  second:    bool,
  timestamp: bool,
  offset:    bool,
}

impl Fields {
  fn of(format: &str) -> Self {
    let mut fields = Self::default();
    for item in StrftimeItems::new(format) {
      match item {
        Item::Numeric(Numeric::Hour | Numeric::Hour12, _) => fields.hour = true,
        Item::Numeric(Numeric::Minute, _) => fields.minute = true,
        Item::Numeric(Numeric::Second, _) => fields.second = true,
        Item::Numeric(Numeric::Timestamp, _) => fields.timestamp = true,
        Item::Fixed(Fixed::RFC2822 | Fixed::RFC3339) => {
          fields.hour = true;
          fields.minute = true;
          fields.second = true;
          fields.offset = true;
        }
        Item::Fixed(
          Fixed::TimezoneOffset
          | Fixed::TimezoneOffsetColon
          | Fixed::TimezoneOffsetDoubleColon
          | Fixed::TimezoneOffsetTripleColon
          | Fixed::TimezoneOffsetColonZ
          | Fixed::TimezoneOffsetZ,
        ) => fields.offset = true,
        _ => {}
      }
    }
    fields
  }

  fn has_time(self) -> bool { self.hour || self.minute || self.second }
}

/// Parse `input` according to `format`.
///
/// Time fields the format leaves out default to zero: `%Y-%m-%d` yields
/// midnight and `%Y-%m-%d %H` yields the top of the hour. A format that names
/// minutes or seconds without an hour is rejected. Surrounding whitespace is
/// ignored.
pub fn parse_timestamp(input: &str, format: &str) -> Result<Timestamp> {
  let trimmed = input.trim();
  let parse_error = || Error::Parse {
    input:  trimmed.to_string(),
    format: format.to_string(),
  };

  let fields = Fields::of(format);
  let mut parsed = Parsed::new();
  chrono::format::parse(&mut parsed, trimmed, StrftimeItems::new(format))
    .map_err(|_| parse_error())?;

  // `%s` fixes every field by itself.
  if !fields.timestamp {
    if !fields.has_time() {
      parsed.set_hour(0).map_err(|_| parse_error())?;
    }
    if !fields.minute {
      parsed.set_minute(0).map_err(|_| parse_error())?;
    }
    if !fields.second {
      parsed.set_second(0).map_err(|_| parse_error())?;
    }
  }

  let timestamp = if fields.offset {
    parsed.to_datetime()
  } else {
    parsed
      .to_naive_datetime_with_offset(0)
      .map(|naive| naive.and_utc().fixed_offset())
  };
  timestamp.map_err(|_| parse_error())
}

/// Render `timestamp` with `format`.
///
/// Fails with [`Error::InvalidFormat`] instead of panicking when `format`
/// contains an unknown specifier.
pub fn format_timestamp(timestamp: &Timestamp, format: &str) -> Result<String> {
  let mut out = String::new();
  write!(out, "{}", timestamp.format(format))
    .map_err(|_| Error::InvalidFormat(format.to_string()))?;
  Ok(out)
}
