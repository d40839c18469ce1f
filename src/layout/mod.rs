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

//! Shared rendering of records for the different sink media.

use std::fmt::Write;

use crate::Context;
use crate::ContextFormat;
use crate::Error;
use crate::context::value_to_text;

mod json;
mod text;
mod xml;

pub use self::json::JsonEntry;
pub use self::json::JsonLayout;
pub use self::text::TextLayout;
pub use self::xml::XmlLayout;

/// Render the user fields of a context according to its [`ContextFormat`].
///
/// The stamped `timestamp` and `name` fields never appear in the output. When no user fields
/// remain, the result is empty in every format.
///
/// # Examples
///
/// ```
/// use sinkforth::Context;
/// use sinkforth::ContextFormat;
/// use sinkforth::layout::format_context;
///
/// let context = Context::new().with("user", "alice").with("tags", vec!["a", "b"]);
/// assert_eq!(format_context(&context).unwrap(), "user=alice;tags=[Array];");
///
/// let context = context.format(ContextFormat::Json);
/// assert_eq!(format_context(&context).unwrap(), r#"{"user":"alice","tags":["a","b"]}"#);
/// ```
pub fn format_context(context: &Context) -> Result<String, Error> {
    if context.user_fields().next().is_none() {
        return Ok(String::new());
    }

    match context.get_format() {
        ContextFormat::Text => {
            let mut out = String::new();
            for (key, value) in context.user_fields() {
                write!(out, "{key}={};", value_to_text(value)).map_err(Error::from_fmt_error)?;
            }
            Ok(out)
        }
        ContextFormat::Json => {
            serde_json::to_string(&context.user_map()).map_err(Error::from_json_error)
        }
        ContextFormat::Serialized => Ok(format!("{:?}", context.user_map())),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::context::NAME_KEY;
    use crate::context::TIMESTAMP_KEY;

    fn stamped() -> Context {
        Context::new()
            .with(TIMESTAMP_KEY, "2024-05-06 07:08:09")
            .with(NAME_KEY, "ERROR")
    }

    #[test]
    fn test_text_context() {
        let context = stamped()
            .with("user", "alice")
            .with("id", 42)
            .with("ok", false)
            .with("none", json!(null))
            .with("list", json!([1, 2]))
            .with("map", json!({"k": "v"}));
        insta::assert_snapshot!(
            format_context(&context).unwrap(),
            @"user=alice;id=42;ok=false;none=;list=[Array];map=[Object];"
        );
    }

    #[test]
    fn test_json_context() {
        let context = stamped()
            .with("user", "alice")
            .with("list", json!([1, 2]))
            .format(ContextFormat::Json);
        insta::assert_snapshot!(
            format_context(&context).unwrap(),
            @r#"{"user":"alice","list":[1,2]}"#
        );
    }

    #[test]
    fn test_serialized_context() {
        let context = stamped().with("id", 7).format(ContextFormat::Serialized);
        let rendered = format_context(&context).unwrap();
        assert!(rendered.contains("\"id\""));
        assert!(rendered.contains('7'));
        assert!(!rendered.contains(TIMESTAMP_KEY));
    }

    #[test]
    fn test_empty_context() {
        for format in [
            ContextFormat::Text,
            ContextFormat::Json,
            ContextFormat::Serialized,
        ] {
            assert_eq!(format_context(&stamped().format(format)).unwrap(), "");
        }
    }
}
