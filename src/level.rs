// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Severity levels and per-sink level ceilings.

use std::fmt;
use std::str::FromStr;

use crate::Error;

const LEVEL_NAMES: [&str; 8] = [
    "EMERGENCY",
    "ALERT",
    "CRITICAL",
    "ERROR",
    "WARNING",
    "NOTICE",
    "INFO",
    "DEBUG",
];

/// A severity level.
///
/// Levels are ordered by rank: `Emergency` has rank 0 and is the most severe, `Debug` has
/// rank 7 and is the least severe. A smaller level is therefore a more severe one.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// System is unusable.
    Emergency = 0,
    /// Action must be taken immediately.
    Alert = 1,
    /// Critical conditions.
    Critical = 2,
    /// Error conditions.
    Error = 3,
    /// Warning conditions.
    Warning = 4,
    /// Normal but significant condition.
    Notice = 5,
    /// Informational messages.
    Info = 6,
    /// Debug-level messages.
    Debug = 7,
}

impl Level {
    /// All levels, from the most severe to the least severe.
    pub const ALL: [Level; 8] = [
        Level::Emergency,
        Level::Alert,
        Level::Critical,
        Level::Error,
        Level::Warning,
        Level::Notice,
        Level::Info,
        Level::Debug,
    ];

    /// Return the level for the given rank.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) if the
    /// rank is not in `0..=7`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sinkforth::Level;
    ///
    /// assert_eq!(Level::from_rank(3).unwrap(), Level::Error);
    /// assert!(Level::from_rank(8).is_err());
    /// ```
    pub fn from_rank(rank: i32) -> Result<Level, Error> {
        usize::try_from(rank)
            .ok()
            .and_then(|idx| Level::ALL.get(idx).copied())
            .ok_or_else(|| {
                Error::invalid_argument("level rank must be between 0 and 7")
                    .with_context("rank", rank)
            })
    }

    /// The numeric rank of this level.
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    /// Return the upper-case name of the `Level`.
    ///
    /// This returns the same string as the `fmt::Display` implementation.
    pub fn as_str(&self) -> &'static str {
        LEVEL_NAMES[*self as usize]
    }
}

/// Look up the name of a raw rank in the level table.
///
/// Returns an empty string for a rank outside `0..=7` rather than failing.
pub fn level_name(rank: i32) -> &'static str {
    usize::try_from(rank)
        .ok()
        .and_then(|idx| LEVEL_NAMES.get(idx).copied())
        .unwrap_or_default()
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl TryFrom<i32> for Level {
    type Error = Error;

    fn try_from(rank: i32) -> Result<Self, Error> {
        Level::from_rank(rank)
    }
}

impl From<Level> for i32 {
    fn from(level: Level) -> Self {
        i32::from(level.rank())
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::Error,
            log::Level::Warn => Level::Warning,
            log::Level::Info => Level::Info,
            log::Level::Debug | log::Level::Trace => Level::Debug,
        }
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Level, Self::Err> {
        let s = s.trim();
        if let Ok(rank) = s.parse::<i32>() {
            return Level::from_rank(rank);
        }

        for (names, level) in [
            (&["emergency", "emerg"][..], Level::Emergency),
            (&["alert"][..], Level::Alert),
            (&["critical", "crit"][..], Level::Critical),
            (&["error", "err"][..], Level::Error),
            (&["warning", "warn"][..], Level::Warning),
            (&["notice"][..], Level::Notice),
            (&["info"][..], Level::Info),
            (&["debug"][..], Level::Debug),
        ] {
            if names.iter().any(|name| s.eq_ignore_ascii_case(name)) {
                return Ok(level);
            }
        }

        Err(Error::invalid_argument(format!("malformed level: {s:?}")))
    }
}

/// An optional level ceiling.
///
/// A record passes the limit when no ceiling is set, or when its level is at least as severe
/// as the ceiling. Every sink embeds one of these.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LevelLimit(Option<Level>);

impl LevelLimit {
    /// Create a limit that accepts every level.
    pub const fn none() -> Self {
        LevelLimit(None)
    }

    /// Create a limit with the given ceiling.
    pub const fn new(level: Level) -> Self {
        LevelLimit(Some(level))
    }

    /// Set the ceiling from a raw rank.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) if the
    /// rank is not in `0..=7`; the current ceiling is left untouched.
    pub fn set(&mut self, rank: i32) -> Result<(), Error> {
        self.0 = Some(Level::from_rank(rank)?);
        Ok(())
    }

    /// Set the ceiling.
    pub fn set_level(&mut self, level: Level) {
        self.0 = Some(level);
    }

    /// Remove the ceiling.
    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// The current ceiling, if any.
    pub fn get(&self) -> Option<Level> {
        self.0
    }

    /// Whether a ceiling is set.
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    /// Check a raw rank against the ceiling.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) if the
    /// rank is not in `0..=7`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sinkforth::Level;
    /// use sinkforth::LevelLimit;
    ///
    /// let limit = LevelLimit::new(Level::Warning);
    /// assert_eq!(limit.is_within(3).unwrap(), true);
    /// assert_eq!(limit.is_within(4).unwrap(), true);
    /// assert_eq!(limit.is_within(5).unwrap(), false);
    /// assert!(limit.is_within(-1).is_err());
    /// ```
    pub fn is_within(&self, rank: i32) -> Result<bool, Error> {
        Ok(self.permits(Level::from_rank(rank)?))
    }

    /// Check a level against the ceiling.
    pub fn permits(&self, level: Level) -> bool {
        match self.0 {
            None => true,
            Some(ceiling) => level <= ceiling,
        }
    }
}

impl From<Level> for LevelLimit {
    fn from(level: Level) -> Self {
        LevelLimit::new(level)
    }
}
