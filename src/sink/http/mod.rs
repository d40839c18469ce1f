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

//! A sink that sends every record to an HTTP endpoint.

use std::fmt;

use crate::Error;
use crate::Level;
use crate::LevelLimit;
use crate::Record;
use crate::sink::Sink;

#[cfg(feature = "sink-http")]
mod client;

#[cfg(feature = "sink-http")]
pub use self::client::ReqwestClient;

/// An HTTP client bound to a target endpoint and method.
pub trait HttpClient: fmt::Debug + Send + Sync + 'static {
    /// Send one request carrying `fields` as its payload.
    fn send(&self, fields: &[(&str, String)]) -> Result<(), Error>;
}

/// A sink that sends the fields `timestamp, level, name, message, context` per record.
///
/// The context is sent as a JSON object of the user fields. Responses are not inspected; only
/// failures reported by the client surface as errors.
#[derive(Debug)]
pub struct HttpSink<C> {
    client: C,
    limit: LevelLimit,
}

impl<C: HttpClient> HttpSink<C> {
    /// Create a sink sending through `client`.
    pub fn new(client: C) -> Self {
        Self {
            client,
            limit: LevelLimit::none(),
        }
    }

    /// Set the level ceiling.
    pub fn with_level_limit(mut self, level: Level) -> Self {
        self.limit.set_level(level);
        self
    }

    /// The client.
    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: HttpClient> Sink for HttpSink<C> {
    fn write(&self, record: &Record) -> Result<(), Error> {
        if !self.limit.permits(record.level()) {
            return Ok(());
        }

        let context = serde_json::to_string(&record.context().user_map())
            .map_err(Error::from_json_error)?;
        let fields = [
            ("timestamp", record.timestamp().into_owned()),
            ("level", record.level().rank().to_string()),
            ("name", record.name().into_owned()),
            ("message", record.message().to_string()),
            ("context", context),
        ];

        self.client.send(&fields)
    }

    fn limit(&self) -> &LevelLimit {
        &self.limit
    }

    fn limit_mut(&mut self) -> &mut LevelLimit {
        &mut self.limit
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::Context;
    use crate::ErrorKind;

    #[derive(Debug, Default)]
    struct RecordingClient {
        sent: Mutex<Vec<Vec<(String, String)>>>,
        fail: bool,
    }

    impl HttpClient for RecordingClient {
        fn send(&self, fields: &[(&str, String)]) -> Result<(), Error> {
            if self.fail {
                return Err(Error::new(ErrorKind::Http, "connection refused"));
            }
            self.sent.lock().unwrap().push(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect(),
            );
            Ok(())
        }
    }

    #[test]
    fn test_payload_fields() {
        let sink = HttpSink::new(RecordingClient::default());
        let context = Context::new()
            .with("timestamp", "2024-05-06 07:08:09")
            .with("name", "ERROR")
            .with("request_id", 17);
        sink.write(&Record::new(Level::Error, "Something went wrong.", &context))
            .unwrap();

        let sent = sink.client().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let fields = sent[0]
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>();
        assert_eq!(
            fields,
            [
                "timestamp=2024-05-06 07:08:09",
                "level=3",
                "name=ERROR",
                "message=Something went wrong.",
                r#"context={"request_id":17}"#,
            ]
        );
    }

    #[test]
    fn test_limit_and_failure() {
        let sink = HttpSink::new(RecordingClient::default()).with_level_limit(Level::Critical);
        let context = Context::new();
        sink.write(&Record::new(Level::Error, "quiet", &context))
            .unwrap();
        assert!(sink.client().sent.lock().unwrap().is_empty());

        let sink = HttpSink::new(RecordingClient {
            fail: true,
            ..Default::default()
        });
        let err = sink
            .write(&Record::new(Level::Error, "loud", &context))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Http);
    }
}
