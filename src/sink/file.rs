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

//! A sink that writes to a single file.

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::Error;
use crate::Level;
use crate::LevelLimit;
use crate::Record;
use crate::layout::JsonLayout;
use crate::layout::TextLayout;
use crate::layout::XmlLayout;
use crate::sink::Sink;

/// The on-disk format of a [`FileSink`], chosen by the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Tab-separated lines with a raw message. Used for `.log`, `.txt` and anything unknown.
    Plain,
    /// Comma-separated lines with a quoted message (`.csv`).
    Csv,
    /// Tab-separated lines with a quoted message (`.tsv`).
    Tsv,
    /// One XML document with a `<log>` root (`.xml`).
    Xml,
    /// One JSON array (`.json`).
    Json,
}

impl FileFormat {
    /// Pick the format for a path.
    pub fn from_path(path: &Path) -> FileFormat {
        let ext = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("csv") => FileFormat::Csv,
            Some("tsv") => FileFormat::Tsv,
            Some("xml") => FileFormat::Xml,
            Some("json") => FileFormat::Json,
            _ => FileFormat::Plain,
        }
    }

    /// Whether each write rewrites the whole file instead of appending a line.
    pub fn is_document(&self) -> bool {
        matches!(self, FileFormat::Xml | FileFormat::Json)
    }
}

/// A sink that writes records to a file.
///
/// Line formats are appended. XML and JSON documents are read, extended and written back on
/// every record. Writes through the same `FileSink` are serialized, but nothing guards the
/// file against other writers: two processes updating the same XML or JSON file can lose
/// entries or corrupt the document.
///
/// # Examples
///
/// ```
/// use sinkforth::Level;
/// use sinkforth::sink::FileSink;
///
/// let dir = tempfile::tempdir().unwrap();
/// let sink = FileSink::new(dir.path().join("app.csv"))
///     .unwrap()
///     .with_level_limit(Level::Warning);
/// ```
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    format: FileFormat,
    limit: LevelLimit,
    lock: Mutex<()>,
}

impl FileSink {
    /// Create a sink for `path`, creating the file and its parent directories if absent.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();

        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| {
                Error::from_io_error(err).with_context("path", dir.display())
            })?;
        }

        if !path.exists() {
            log::debug!("creating log file {}", path.display());
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|err| Error::from_io_error(err).with_context("path", path.display()))?;
        }

        Ok(Self {
            format: FileFormat::from_path(&path),
            path,
            limit: LevelLimit::none(),
            lock: Mutex::new(()),
        })
    }

    /// Set the level ceiling.
    pub fn with_level_limit(mut self, level: Level) -> Self {
        self.limit.set_level(level);
        self
    }

    /// The target path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The format picked from the extension.
    pub fn format(&self) -> FileFormat {
        self.format
    }

    fn append_line(&self, line: &str) -> Result<(), Error> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(Error::from_io_error)?;
        file.write_all(line.as_bytes())
            .map_err(Error::from_io_error)
    }

    fn rewrite_document(&self, record: &Record) -> Result<(), Error> {
        let document = match fs::read_to_string(&self.path) {
            Ok(document) => document,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(err) => return Err(Error::from_io_error(err)),
        };

        let document = match self.format {
            FileFormat::Json => JsonLayout::default().append(&document, record)?,
            _ => XmlLayout::default().append(&document, record)?,
        };

        fs::write(&self.path, document).map_err(Error::from_io_error)
    }
}

impl Sink for FileSink {
    fn write(&self, record: &Record) -> Result<(), Error> {
        if !self.limit.permits(record.level()) {
            return Ok(());
        }

        // the guard protects no data, so a poisoned lock is still usable
        let _guard = self.lock.lock().unwrap_or_else(|err| err.into_inner());

        let result = match self.format {
            FileFormat::Plain => self.append_line(&TextLayout::default().format(record)?),
            FileFormat::Csv => self.append_line(&TextLayout::csv().format(record)?),
            FileFormat::Tsv => self.append_line(&TextLayout::tsv().format(record)?),
            FileFormat::Xml | FileFormat::Json => self.rewrite_document(record),
        };

        result.map_err(|err| err.with_context("path", self.path.display()))
    }

    fn limit(&self) -> &LevelLimit {
        &self.limit
    }

    fn limit_mut(&mut self) -> &mut LevelLimit {
        &mut self.limit
    }
}
