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

use jiff::tz::TimeZone;

use crate::FailurePolicy;
use crate::Logger;
use crate::sink::Sink;

/// Create a new empty [`LoggerBuilder`] instance for configuring a logger.
///
/// # Examples
///
/// ```
/// use sinkforth::sink::FileSink;
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = sinkforth::builder()
///     .sink(FileSink::new(dir.path().join("app.csv")).unwrap())
///     .timestamp_format("%Y-%m-%dT%H:%M:%S%:z")
///     .build();
/// logger.info("started").unwrap();
/// ```
pub fn builder() -> LoggerBuilder {
    LoggerBuilder {
        logger: Logger::new(),
    }
}

/// A builder for configuring a [`Logger`] and optionally installing it as the `log` crate's
/// global logger.
#[must_use = "call `apply` to set the global logger or `build` to construct a logger instance"]
#[derive(Debug)]
pub struct LoggerBuilder {
    logger: Logger,
}

impl LoggerBuilder {
    /// Register a sink. Sinks receive records in registration order.
    pub fn sink(mut self, sink: impl Into<Box<dyn Sink>>) -> Self {
        self.logger.add_sink(sink);
        self
    }

    /// Set the strftime-style format of the stamped `timestamp` field.
    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.logger.set_timestamp_format(format);
        self
    }

    /// Set the time zone of stamped timestamps.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.logger.set_timezone(tz);
        self
    }

    /// Set what happens when a sink fails.
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.logger.set_failure_policy(policy);
        self
    }

    /// Build the [`Logger`].
    pub fn build(self) -> Logger {
        self.logger
    }

    /// Set up the `log` crate global logger with the configured sinks.
    ///
    /// This should be called early in the execution of a Rust program. Any log events that occur
    /// before initialization will be ignored.
    ///
    /// # Errors
    ///
    /// Return an error if a global logger has already been set.
    pub fn try_apply(self) -> Result<(), log::SetLoggerError> {
        self.build().try_apply()
    }

    /// Set up the `log` crate global logger with the configured sinks.
    ///
    /// # Panics
    ///
    /// Panic if the global logger has already been set.
    pub fn apply(self) {
        self.try_apply()
            .expect("LoggerBuilder::apply must be called before the global logger initialized");
    }
}
