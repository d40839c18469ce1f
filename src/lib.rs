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

//! Sinkforth is a leveled logging facade that fans every record out to a list of sinks: files,
//! databases, HTTP endpoints and mail.
//!
//! # Overview
//!
//! A [`Logger`] stamps each record with a `timestamp` and a `name`, then hands it to every
//! registered [`Sink`](sink::Sink) in order. Each sink may carry a level ceiling: records less
//! severe than the ceiling are skipped by that sink only. Levels follow the syslog ranks, from
//! `EMERGENCY` (0) to `DEBUG` (7).
//!
//! The file sink picks its on-disk format from the file extension: `.csv`, `.tsv`, `.xml`,
//! `.json`, or a plain tab-separated line for anything else.
//!
//! # Examples
//!
//! ```
//! use sinkforth::Context;
//! use sinkforth::Level;
//! use sinkforth::sink::FileSink;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let logger = sinkforth::builder()
//!     .sink(FileSink::new(dir.path().join("app.log")).unwrap())
//!     .sink(
//!         FileSink::new(dir.path().join("alerts.json"))
//!             .unwrap()
//!             .with_level_limit(Level::Alert),
//!     )
//!     .build();
//!
//! logger
//!     .error_with("disk full", Context::new().with("mount", "/var"))
//!     .unwrap()
//!     .emergency("out of memory")
//!     .unwrap();
//! ```
//!
//! A logger can also serve the `log` crate macros:
//!
//! ```
//! sinkforth::builder().apply();
//!
//! log::info!(user = "alice"; "signed in");
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(missing_docs)]

pub mod layout;
pub mod sink;

mod bridge;
mod context;
mod error;
mod level;
mod logger;
mod record;

pub use context::Context;
pub use context::ContextFormat;
pub use context::NAME_KEY;
pub use context::TIMESTAMP_KEY;
pub use error::Error;
pub use error::ErrorKind;
pub use level::Level;
pub use level::LevelLimit;
pub use level::level_name;
pub use logger::*;
pub use record::Record;
