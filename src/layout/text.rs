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

use crate::Error;
use crate::Record;
use crate::layout::format_context;

/// A delimited single-line layout.
///
/// Output fields, in order: timestamp, level rank, level name, message, rendered context.
/// Each line ends with a newline.
///
/// # Examples
///
/// ```
/// use sinkforth::layout::TextLayout;
///
/// let tsv = TextLayout::default();
/// let csv = TextLayout::csv();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayout {
    delimiter: char,
    quote_message: bool,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            delimiter: '\t',
            quote_message: false,
        }
    }
}

impl TextLayout {
    /// Comma-separated, with a quoted message.
    pub fn csv() -> Self {
        Self {
            delimiter: ',',
            quote_message: true,
        }
    }

    /// Tab-separated, with a quoted message.
    pub fn tsv() -> Self {
        Self {
            delimiter: '\t',
            quote_message: true,
        }
    }

    /// Format the record into a line.
    pub fn format(&self, record: &Record) -> Result<String, Error> {
        let message = if self.quote_message {
            format!("\"{}\"", record.message().replace('"', "\\\""))
        } else {
            record.message().to_string()
        };

        let d = self.delimiter;
        Ok(format!(
            "{timestamp}{d}{level}{d}{name}{d}{message}{d}{context}\n",
            timestamp = record.timestamp(),
            level = record.level().rank(),
            name = record.name(),
            context = format_context(record.context())?,
        ))
    }
}
