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

use std::fmt;

use jiff::Timestamp;
use jiff::Zoned;
use jiff::tz::TimeZone;

use crate::Context;
use crate::Error;
use crate::ErrorKind;
use crate::Level;
use crate::Record;
use crate::context::NAME_KEY;
use crate::context::TIMESTAMP_KEY;
use crate::sink::Sink;

/// The default timestamp format, e.g. `2024-05-06 07:08:09`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What the [`Logger`] does when a sink fails.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePolicy {
    /// Stop at the first failing sink and return its error; later sinks are not invoked.
    #[default]
    Halt,
    /// Invoke every sink, then return the failures. A single failure is returned as is;
    /// several are wrapped in one [`ErrorKind::Unexpected`] error carrying them as sources.
    Continue,
}

/// The dispatcher: stamps records and fans them out to its sinks in registration order.
///
/// # Examples
///
/// ```
/// use sinkforth::Context;
/// use sinkforth::Level;
/// use sinkforth::Logger;
/// use sinkforth::sink::FileSink;
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut logger = Logger::new();
/// logger.add_sink(FileSink::new(dir.path().join("app.log")).unwrap());
///
/// logger
///     .error("disk full")
///     .unwrap()
///     .log(Level::Info, "retrying", Context::new().with("attempt", 2))
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct Logger {
    sinks: Vec<Box<dyn Sink>>,
    timestamp_format: String,
    timezone: Option<TimeZone>,
    failure_policy: FailurePolicy,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! severity {
    ($(#[$doc:meta] $name:ident, $name_with:ident => $level:ident;)*) => {
        $(
            #[$doc]
            pub fn $name(&self, message: impl fmt::Display) -> Result<&Self, Error> {
                self.log(Level::$level, message, Context::new())
            }

            #[$doc]
            ///
            /// The context fields are rendered alongside the message.
            pub fn $name_with(
                &self,
                message: impl fmt::Display,
                context: Context,
            ) -> Result<&Self, Error> {
                self.log(Level::$level, message, context)
            }
        )*
    };
}

impl Logger {
    /// Create a logger with no sinks and the default timestamp format.
    pub fn new() -> Logger {
        Self {
            sinks: vec![],
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            timezone: None,
            failure_policy: FailurePolicy::default(),
        }
    }

    /// Append a sink. The same sink type may be added any number of times.
    pub fn add_sink(&mut self, sink: impl Into<Box<dyn Sink>>) -> &mut Self {
        self.sinks.push(sink.into());
        self
    }

    /// Append several sinks, keeping their order.
    pub fn add_sinks<I, S>(&mut self, sinks: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Box<dyn Sink>>,
    {
        self.sinks.extend(sinks.into_iter().map(Into::into));
        self
    }

    /// The sinks, in fan-out order.
    pub fn sinks(&self) -> &[Box<dyn Sink>] {
        &self.sinks
    }

    /// Set the strftime-style format of the stamped `timestamp` field.
    pub fn set_timestamp_format(&mut self, format: impl Into<String>) -> &mut Self {
        self.timestamp_format = format.into();
        self
    }

    /// The strftime-style format of the stamped `timestamp` field.
    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    /// Set the time zone of stamped timestamps. Defaults to the system time zone.
    pub fn set_timezone(&mut self, tz: TimeZone) -> &mut Self {
        self.timezone = Some(tz);
        self
    }

    /// The time zone of stamped timestamps, if one was set.
    pub fn timezone(&self) -> Option<&TimeZone> {
        self.timezone.as_ref()
    }

    /// Set what happens when a sink fails.
    pub fn set_failure_policy(&mut self, policy: FailurePolicy) -> &mut Self {
        self.failure_policy = policy;
        self
    }

    /// What happens when a sink fails.
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    /// Look up the name of a raw rank; empty for a rank outside `0..=7`.
    pub fn level_name(&self, rank: i32) -> &'static str {
        crate::level::level_name(rank)
    }

    /// Stamp the context and hand the record to every sink.
    ///
    /// `timestamp` and `name` are only added when the context does not carry them already.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Format`] if the timestamp format is invalid, or with the error of
    /// a failing sink according to the [`FailurePolicy`].
    pub fn log(
        &self,
        level: Level,
        message: impl fmt::Display,
        mut context: Context,
    ) -> Result<&Self, Error> {
        if !context.contains_key(TIMESTAMP_KEY) {
            context.insert(TIMESTAMP_KEY, self.now()?);
        }
        context.insert_if_absent(NAME_KEY, || level.as_str().into());

        let message = message.to_string();
        let record = Record::new(level, &message, &context);

        match self.failure_policy {
            FailurePolicy::Halt => {
                for sink in &self.sinks {
                    sink.write(&record)?;
                }
            }
            FailurePolicy::Continue => {
                let mut failures = self
                    .sinks
                    .iter()
                    .enumerate()
                    .filter_map(|(idx, sink)| {
                        sink.write(&record)
                            .err()
                            .map(|err| err.with_context("sink", idx))
                    })
                    .collect::<Vec<_>>();

                if failures.len() == 1 {
                    return Err(failures.remove(0));
                }
                if !failures.is_empty() {
                    let err = Error::new(ErrorKind::Unexpected, "multiple sinks failed")
                        .with_context("failures", failures.len());
                    return Err(failures
                        .into_iter()
                        .fold(err, |err, failure| err.with_source(failure)));
                }
            }
        }

        Ok(self)
    }

    severity! {
        /// Log an `EMERGENCY` (rank 0) record.
        emergency, emergency_with => Emergency;
        /// Log an `ALERT` (rank 1) record.
        alert, alert_with => Alert;
        /// Log a `CRITICAL` (rank 2) record.
        critical, critical_with => Critical;
        /// Log an `ERROR` (rank 3) record.
        error, error_with => Error;
        /// Log a `WARNING` (rank 4) record.
        warning, warning_with => Warning;
        /// Log a `NOTICE` (rank 5) record.
        notice, notice_with => Notice;
        /// Log an `INFO` (rank 6) record.
        info, info_with => Info;
        /// Log a `DEBUG` (rank 7) record.
        debug, debug_with => Debug;
    }

    fn now(&self) -> Result<String, Error> {
        let now = match self.timezone.clone() {
            Some(tz) => Timestamp::now().to_zoned(tz),
            None => Zoned::now(),
        };

        jiff::fmt::strtime::format(&self.timestamp_format, &now).map_err(|err| {
            Error::new(ErrorKind::Format, "failed to format timestamp")
                .with_context("format", &self.timestamp_format)
                .with_source(err)
        })
    }
}
