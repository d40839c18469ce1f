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

use std::fs;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use sinkforth::Error;
use sinkforth::LevelLimit;
use sinkforth::Record;
use sinkforth::sink::FileSink;
use sinkforth::sink::Sink;
use tempfile::TempDir;

static CHATTY_WRITES: AtomicUsize = AtomicUsize::new(0);

// Logs through the `log` facade while writing, like a client library would.
#[derive(Debug)]
struct ChattySink {
    limit: LevelLimit,
}

impl Sink for ChattySink {
    fn write(&self, record: &Record) -> Result<(), Error> {
        CHATTY_WRITES.fetch_add(1, Ordering::SeqCst);
        log::debug!("delivering {}", record.message());
        Ok(())
    }

    fn limit(&self) -> &LevelLimit {
        &self.limit
    }

    fn limit_mut(&mut self) -> &mut LevelLimit {
        &mut self.limit
    }
}

struct Thing<'a>(&'a str);

impl std::fmt::Display for Thing<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        log::debug!("formatting wrapping ({})", self.0);
        f.write_str(self.0)
    }
}

// one test per binary: the global logger can only be set once
#[test]
fn test_meta_logging_works() {
    let dir = TempDir::new().expect("failed to create a temporary directory");
    let path = dir.path().join("app.log");

    sinkforth::builder()
        .sink(FileSink::new(&path).unwrap())
        .sink(ChattySink {
            limit: LevelLimit::none(),
        })
        .timestamp_format("T")
        .apply();

    log::info!("I'm logging {}!", Thing("aha"));

    let content = fs::read_to_string(&path).unwrap();
    let lines = content.lines().collect::<Vec<_>>();
    assert_eq!(
        lines,
        [
            "T\t7\tDEBUG\tformatting wrapping (aha)\ttarget=recursive_logging;",
            "T\t6\tINFO\tI'm logging aha!\ttarget=recursive_logging;",
        ]
    );
    // the records the sink emits while writing are not dispatched again
    assert_eq!(CHATTY_WRITES.load(Ordering::SeqCst), 2);
}
