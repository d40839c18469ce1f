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

//! Output adapters for log records.

use std::fmt;

use crate::Error;
use crate::Level;
use crate::LevelLimit;
use crate::Record;

pub mod database;
pub mod file;
pub mod http;
pub mod mail;

pub use self::database::DatabaseSink;
pub use self::file::FileSink;
pub use self::http::HttpSink;
pub use self::mail::MailSink;

/// A trait representing an output adapter that can process log records.
///
/// Implementors embed a [`LevelLimit`] and must check it in [`Sink::write`]: a record outside
/// the limit is skipped silently, without error and without output.
pub trait Sink: fmt::Debug + Send + Sync + 'static {
    /// Dispatch a log record to the sink target.
    fn write(&self, record: &Record) -> Result<(), Error>;

    /// The embedded level ceiling.
    fn limit(&self) -> &LevelLimit;

    /// The embedded level ceiling, mutably.
    fn limit_mut(&mut self) -> &mut LevelLimit;

    /// Set the level ceiling from a raw rank.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) if the
    /// rank is not in `0..=7`.
    fn set_level_limit(&mut self, rank: i32) -> Result<(), Error> {
        self.limit_mut().set(rank)
    }

    /// The level ceiling, if any.
    fn level_limit(&self) -> Option<Level> {
        self.limit().get()
    }

    /// Whether a level ceiling is set.
    fn has_level_limit(&self) -> bool {
        self.limit().is_set()
    }

    /// Whether a raw rank passes the level ceiling.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) if the
    /// rank is not in `0..=7`.
    fn is_within_level_limit(&self, rank: i32) -> Result<bool, Error> {
        self.limit().is_within(rank)
    }
}

impl<T: Sink> From<T> for Box<dyn Sink> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}
