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

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::Error;
use crate::Record;
use crate::layout::format_context;

/// One element of a JSON log document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonEntry {
    /// The stamped timestamp.
    pub timestamp: String,
    /// The level rank.
    pub priority: u8,
    /// The stamped level name.
    pub name: String,
    /// The message.
    pub message: String,
    /// The rendered context, empty when there are no user fields.
    pub context: String,
}

/// A layout that maintains a whole JSON document: an array of [`JsonEntry`] objects.
#[derive(Default, Debug, Clone, Copy)]
pub struct JsonLayout {}

impl JsonLayout {
    /// Build the entry for a record.
    pub fn entry(&self, record: &Record) -> Result<JsonEntry, Error> {
        Ok(JsonEntry {
            timestamp: record.timestamp().into_owned(),
            priority: record.level().rank(),
            name: record.name().into_owned(),
            message: record.message().to_string(),
            context: format_context(record.context())?,
        })
    }

    /// Append the record to an existing document and return the new, pretty-printed document.
    ///
    /// Blank input starts a new array. Existing elements are kept as they are, even when they
    /// carry fields this layout does not know about.
    pub fn append(&self, document: &str, record: &Record) -> Result<String, Error> {
        let mut entries: Vec<Value> = if document.trim().is_empty() {
            vec![]
        } else {
            serde_json::from_str(document).map_err(|err| {
                Error::from_json_error(err).with_context("reason", "existing log is not a json array")
            })?
        };

        let entry = serde_json::to_value(self.entry(record)?).map_err(Error::from_json_error)?;
        entries.push(entry);

        let mut out = serde_json::to_string_pretty(&entries).map_err(Error::from_json_error)?;
        out.push('\n');
        Ok(out)
    }
}
