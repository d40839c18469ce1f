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

use std::borrow::Cow;

use crate::Context;
use crate::Level;
use crate::context::NAME_KEY;
use crate::context::TIMESTAMP_KEY;
use crate::context::value_to_text;

/// A log entry as seen by sinks.
///
/// Records are built per call and only live for the duration of one dispatch.
#[derive(Clone, Copy, Debug)]
pub struct Record<'a> {
    level: Level,
    message: &'a str,
    context: &'a Context,
}

impl<'a> Record<'a> {
    /// Create a new record.
    pub fn new(level: Level, message: &'a str, context: &'a Context) -> Self {
        Self {
            level,
            message,
            context,
        }
    }

    /// The severity level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The message body.
    pub fn message(&self) -> &'a str {
        self.message
    }

    /// The context, including the stamped `timestamp` and `name` fields.
    pub fn context(&self) -> &'a Context {
        self.context
    }

    /// The stamped timestamp, or an empty string if the record was never stamped.
    pub fn timestamp(&self) -> Cow<'a, str> {
        match self.context.get(TIMESTAMP_KEY) {
            Some(serde_json::Value::String(s)) => Cow::Borrowed(s.as_str()),
            Some(value) => Cow::Owned(value_to_text(value)),
            None => Cow::Borrowed(""),
        }
    }

    /// The stamped level name, falling back to the level table.
    pub fn name(&self) -> Cow<'a, str> {
        match self.context.get(NAME_KEY) {
            Some(serde_json::Value::String(s)) => Cow::Borrowed(s.as_str()),
            Some(value) => Cow::Owned(value_to_text(value)),
            None => Cow::Borrowed(self.level.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unstamped_record_falls_back() {
        let context = Context::new();
        let record = Record::new(Level::Notice, "hello", &context);
        assert_eq!(record.timestamp(), "");
        assert_eq!(record.name(), "NOTICE");
    }

    #[test]
    fn test_stamped_record() {
        let context = Context::new()
            .with(TIMESTAMP_KEY, "2024-01-02 03:04:05")
            .with(NAME_KEY, "CUSTOM");
        let record = Record::new(Level::Notice, "hello", &context);
        assert_eq!(record.timestamp(), "2024-01-02 03:04:05");
        assert_eq!(record.name(), "CUSTOM");
        assert_eq!(record.message(), "hello");
    }
}
