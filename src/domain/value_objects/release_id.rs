//! Release identifier value object
//!
//! A release is named after the UTC second it was created in
//! (`YYYYMMDDHHMMSS`). Two releases created in the same second are told
//! apart by a numeric suffix: `20240101000000`, `20240101000000-1`,
//! `20240101000000-2`, ...

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const STAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const STAMP_LEN: usize = 14;

/// Error returned when a directory name is not a release identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{0}' is not a release identifier")]
pub struct ReleaseIdError(String);

/// Sortable release identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReleaseId {
    stamp: String,
    suffix: u32,
}

impl ReleaseId {
    /// Identifier for the given instant, without a suffix
    pub fn from_datetime(at: DateTime<Utc>) -> Self {
        Self {
            stamp: at.format(STAMP_FORMAT).to_string(),
            suffix: 0,
        }
    }

    /// Same second, different suffix
    pub fn with_suffix(&self, suffix: u32) -> Self {
        Self {
            stamp: self.stamp.clone(),
            suffix,
        }
    }

    /// Smallest identifier that sorts after this one.
    ///
    /// Bumps the suffix, or moves to the next second once the suffix is
    /// exhausted. `None` only past year 9999.
    pub fn successor(&self) -> Option<Self> {
        if let Some(suffix) = self.suffix.checked_add(1) {
            return Some(self.with_suffix(suffix));
        }
        let next = NaiveDateTime::parse_from_str(&self.stamp, STAMP_FORMAT)
            .ok()?
            .checked_add_signed(TimeDelta::seconds(1))?
            .format(STAMP_FORMAT)
            .to_string();
        (next.len() == STAMP_LEN).then(|| Self {
            stamp: next,
            suffix: 0,
        })
    }

    /// The `YYYYMMDDHHMMSS` part
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// Collision counter, 0 when absent
    pub fn suffix(&self) -> u32 {
        self.suffix
    }

    /// Directory name on the server
    pub fn as_dir_name(&self) -> String {
        self.to_string()
    }
}

impl FromStr for ReleaseId {
    type Err = ReleaseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ReleaseIdError(s.to_string());

        let (stamp, suffix) = match s.split_once('-') {
            Some((stamp, suffix)) => {
                if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(err());
                }
                let n: u32 = suffix.parse().map_err(|_| err())?;
                if n == 0 || suffix.starts_with('0') {
                    return Err(err());
                }
                (stamp, n)
            }
            None => (s, 0),
        };

        if stamp.len() != STAMP_LEN || !stamp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        NaiveDateTime::parse_from_str(stamp, STAMP_FORMAT).map_err(|_| err())?;

        Ok(Self {
            stamp: stamp.to_string(),
            suffix,
        })
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.suffix == 0 {
            write!(f, "{}", self.stamp)
        } else {
            write!(f, "{}-{}", self.stamp, self.suffix)
        }
    }
}

impl Ord for ReleaseId {
    fn cmp(&self, other: &Self) -> Ordering {
        // Stamps are fixed-width digits, so string order is time order.
        self.stamp
            .cmp(&other.stamp)
            .then(self.suffix.cmp(&other.suffix))
    }
}

impl PartialOrd for ReleaseId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
