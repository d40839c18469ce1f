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
use crate::ErrorKind;
use crate::Record;
use crate::layout::format_context;

const DECLARATION: &str = "<?xml version";
const EMPTY_DOCUMENT: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<log>\n</log>\n";
const CLOSING_TAG: &str = "</log>";

/// A layout that maintains a whole XML document with a `<log>` root.
///
/// Every record becomes an `<entry>` element whose message is wrapped in CDATA:
///
/// ```text
/// <?xml version="1.0" encoding="utf-8"?>
/// <log>
///     <entry timestamp="..." priority="3" name="ERROR" context="k=v;"><![CDATA[boom]]></entry>
/// </log>
/// ```
#[derive(Default, Debug, Clone, Copy)]
pub struct XmlLayout {}

impl XmlLayout {
    /// Format a single `<entry>` line. The `context` attribute is omitted for an empty context.
    pub fn entry(&self, record: &Record) -> Result<String, Error> {
        let context = format_context(record.context())?;
        let context = if context.is_empty() {
            String::new()
        } else {
            format!(" context=\"{}\"", escape_attribute(&context))
        };

        Ok(format!(
            "    <entry timestamp=\"{timestamp}\" priority=\"{priority}\" name=\"{name}\"{context}>{message}</entry>\n",
            timestamp = escape_attribute(&record.timestamp()),
            priority = record.level().rank(),
            name = escape_attribute(&record.name()),
            message = cdata(record.message()),
        ))
    }

    /// Insert the record before the closing root tag and return the new document.
    ///
    /// Input without an XML declaration is replaced by a fresh, empty document first.
    pub fn append(&self, document: &str, record: &Record) -> Result<String, Error> {
        let document = if document.contains(DECLARATION) {
            document
        } else {
            EMPTY_DOCUMENT
        };

        let Some(pos) = document.rfind(CLOSING_TAG) else {
            return Err(Error::new(
                ErrorKind::Format,
                "existing log has no closing </log> tag",
            ));
        };

        let entry = self.entry(record)?;
        let mut out = String::with_capacity(document.len() + entry.len());
        out.push_str(&document[..pos]);
        out.push_str(&entry);
        out.push_str(&document[pos..]);
        Ok(out)
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    out
}

// `]]>` cannot appear inside a CDATA section; split it across two sections.
fn cdata(value: &str) -> String {
    format!("<![CDATA[{}]]>", value.replace("]]>", "]]]]><![CDATA[>"))
}
