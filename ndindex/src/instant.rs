/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! ISO-8601 instants used as index scalars.
//!
//! An [`Instant`] is a wall-clock date and time with microsecond
//! precision and an optional fixed UTC offset. It is rendered the
//! way it is written in index notation:
//!
//! ```text
//! 2023-01-01T00:00:00
//! 2023-01-01T00:00:00.123456
//! 2023-06-11T00:00:00.000001-03:00
//! ```
//!
//! Instants are normalized on construction: sub-microsecond precision
//! is truncated, and years outside `1..=9999` or offsets that are not
//! whole minutes are rejected, so every instant renders in a form that
//! reads back as itself.
//!
//! Equality is structural: two instants describing the same moment
//! under different offsets are distinct values. Use
//! [`Instant::to_utc`] to compare moments.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::DateTime;
use chrono::Datelike;
use chrono::FixedOffset;
use chrono::NaiveDateTime;
use chrono::SubsecRound;
use chrono::Timelike;
use chrono::Utc;
use regex::Regex;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

/// Timestamp heuristic used to find instants inside notation text.
/// Matches are greedy over the optional fraction and offset.
pub(crate) static ISO8601: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d{1,6})?((\+|-)(\d{2}:\d{2}))?)")
        .expect("valid timestamp pattern")
});

const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%:z";

/// Whether `s` is, in its entirety, a timestamp as recognized by
/// [`ISO8601`].
pub(crate) fn is_timestamp(s: &str) -> bool {
    ISO8601
        .find(s)
        .is_some_and(|m| m.start() == 0 && m.end() == s.len())
}

/// Years an instant can carry.
const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Errors that occur while constructing or parsing an [`Instant`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum InstantError {
    #[error("year {year} is outside 1..=9999")]
    YearOutOfRange { year: i32 },

    #[error("offset {offset} is not a whole number of minutes")]
    SubMinuteOffset { offset: FixedOffset },

    #[error(transparent)]
    Parse(#[from] chrono::ParseError),
}

/// A date and time with an optional UTC offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Instant {
    datetime: NaiveDateTime,
    offset: Option<FixedOffset>,
}

impl Instant {
    fn new(datetime: NaiveDateTime, offset: Option<FixedOffset>) -> Result<Self, InstantError> {
        if !YEARS.contains(&datetime.year()) {
            return Err(InstantError::YearOutOfRange {
                year: datetime.year(),
            });
        }
        if let Some(offset) = offset {
            if offset.local_minus_utc() % 60 != 0 {
                return Err(InstantError::SubMinuteOffset { offset });
            }
        }
        Ok(Self {
            datetime: datetime.trunc_subsecs(6),
            offset,
        })
    }

    /// An instant without offset information, truncated to
    /// microseconds.
    pub fn naive(datetime: NaiveDateTime) -> Result<Self, InstantError> {
        Self::new(datetime, None)
    }

    /// An instant carrying the offset of `datetime`, truncated to
    /// microseconds. The wall clock is preserved as written.
    pub fn with_offset(datetime: DateTime<FixedOffset>) -> Result<Self, InstantError> {
        Self::new(datetime.naive_local(), Some(*datetime.offset()))
    }

    /// The wall-clock date and time, local to [`Instant::offset`].
    pub fn datetime(&self) -> NaiveDateTime {
        self.datetime
    }

    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Normalize to UTC. Instants without an offset are taken to be
    /// in UTC already.
    pub fn to_utc(&self) -> DateTime<Utc> {
        match self.offset {
            None => self.datetime.and_utc(),
            Some(offset) => self
                .datetime
                .and_local_timezone(offset)
                .single()
                .map_or_else(|| self.datetime.and_utc(), |dt| dt.with_timezone(&Utc)),
        }
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datetime.format("%Y-%m-%dT%H:%M:%S"))?;
        let micros = (self.datetime.nanosecond() % 1_000_000_000) / 1_000;
        if micros != 0 {
            write!(f, ".{:06}", micros)?;
        }
        if let Some(offset) = self.offset {
            write!(f, "{}", offset)?;
        }
        Ok(())
    }
}

impl FromStr for Instant {
    type Err = InstantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match DateTime::parse_from_str(s, OFFSET_FORMAT) {
            Ok(datetime) => Self::with_offset(datetime),
            Err(_) => Self::naive(NaiveDateTime::parse_from_str(s, NAIVE_FORMAT)?),
        }
    }
}

impl TryFrom<NaiveDateTime> for Instant {
    type Error = InstantError;

    fn try_from(datetime: NaiveDateTime) -> Result<Self, Self::Error> {
        Self::naive(datetime)
    }
}

impl TryFrom<DateTime<FixedOffset>> for Instant {
    type Error = InstantError;

    fn try_from(datetime: DateTime<FixedOffset>) -> Result<Self, Self::Error> {
        Self::with_offset(datetime)
    }
}

impl TryFrom<DateTime<Utc>> for Instant {
    type Error = InstantError;

    fn try_from(datetime: DateTime<Utc>) -> Result<Self, Self::Error> {
        Self::with_offset(datetime.fixed_offset())
    }
}

impl Serialize for Instant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Instant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors produced by [`utc`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum UtcError {
    #[error("invalid iso-8601 datetime `{input}`")]
    InvalidIso {
        input: String,
        #[source]
        error: InstantError,
    },

    #[error("timestamp {timestamp} out of range")]
    TimestampOutOfRange { timestamp: f64 },
}

/// The accepted inputs of [`utc`].
#[derive(Clone, Debug)]
pub enum UtcSource<'a> {
    Instant(Instant),
    DateTime(DateTime<FixedOffset>),
    /// Seconds since the unix epoch.
    Timestamp(f64),
    Iso(&'a str),
}

impl From<Instant> for UtcSource<'_> {
    fn from(instant: Instant) -> Self {
        UtcSource::Instant(instant)
    }
}

impl From<DateTime<FixedOffset>> for UtcSource<'_> {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        UtcSource::DateTime(datetime)
    }
}

impl From<f64> for UtcSource<'_> {
    fn from(timestamp: f64) -> Self {
        UtcSource::Timestamp(timestamp)
    }
}

impl From<i64> for UtcSource<'_> {
    fn from(timestamp: i64) -> Self {
        UtcSource::Timestamp(timestamp as f64)
    }
}

impl<'a> From<&'a str> for UtcSource<'a> {
    fn from(iso: &'a str) -> Self {
        UtcSource::Iso(iso)
    }
}

/// Convert a timestamp-like input to a UTC datetime. `None` yields
/// the current time.
///
/// ```
/// use ndindex::instant::utc;
///
/// let dt = utc(Some("2023-01-01T03:00:00+03:00".into())).unwrap();
/// assert_eq!(dt.to_rfc3339(), "2023-01-01T00:00:00+00:00");
/// ```
pub fn utc(source: Option<UtcSource<'_>>) -> Result<DateTime<Utc>, UtcError> {
    match source {
        None => Ok(Utc::now()),
        Some(UtcSource::Instant(instant)) => Ok(instant.to_utc()),
        Some(UtcSource::DateTime(datetime)) => Ok(datetime.with_timezone(&Utc)),
        Some(UtcSource::Timestamp(timestamp)) => {
            let mut secs = timestamp.floor();
            let mut nanos = ((timestamp - secs) * 1e9).round();
            if nanos >= 1e9 {
                secs += 1.0;
                nanos -= 1e9;
            }
            if !secs.is_finite() || secs < i64::MIN as f64 || secs >= i64::MAX as f64 {
                return Err(UtcError::TimestampOutOfRange { timestamp });
            }
            DateTime::from_timestamp(secs as i64, nanos as u32)
                .ok_or(UtcError::TimestampOutOfRange { timestamp })
        }
        Some(UtcSource::Iso(input)) => input
            .parse::<Instant>()
            .map(|instant| instant.to_utc())
            .map_err(|error| UtcError::InvalidIso {
                input: input.to_string(),
                error,
            }),
    }
}
