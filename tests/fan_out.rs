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

use rand::Rng;
use rand::distr::Alphanumeric;
use sinkforth::Context;
use sinkforth::ContextFormat;
use sinkforth::ErrorKind;
use sinkforth::FailurePolicy;
use sinkforth::Level;
use sinkforth::layout::JsonEntry;
use sinkforth::sink::FileSink;
use tempfile::TempDir;

const STAMP: &str = "2024-05-06 07:08:09";

fn random_message() -> String {
    let mut rng = rand::rng();
    let len = rng.random_range(1..64);
    (&mut rng)
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[test]
fn test_one_record_reaches_every_file() {
    let dir = TempDir::new().expect("failed to create a temporary directory");
    let plain = dir.path().join("logs/app.log");
    let csv = dir.path().join("logs/app.csv");

    let logger = sinkforth::builder()
        .sink(FileSink::new(&plain).unwrap())
        .sink(FileSink::new(&csv).unwrap())
        .timestamp_format(STAMP)
        .build();
    logger.error("boom").unwrap();

    assert_eq!(
        fs::read_to_string(&plain).unwrap(),
        format!("{STAMP}\t3\tERROR\tboom\t\n")
    );
    assert_eq!(
        fs::read_to_string(&csv).unwrap(),
        format!("{STAMP},3,ERROR,\"boom\",\n")
    );
}

#[test]
fn test_alert_ceiling_keeps_the_most_severe() {
    let dir = TempDir::new().expect("failed to create a temporary directory");
    let everything = dir.path().join("all.log");
    let urgent = dir.path().join("urgent.json");

    let logger = sinkforth::builder()
        .sink(FileSink::new(&everything).unwrap())
        .sink(
            FileSink::new(&urgent)
                .unwrap()
                .with_level_limit(Level::Alert),
        )
        .timestamp_format(STAMP)
        .build();

    for level in Level::ALL {
        logger.log(level, level.as_str().to_lowercase(), Context::new()).unwrap();
    }

    assert_eq!(fs::read_to_string(&everything).unwrap().lines().count(), 8);

    let entries: Vec<JsonEntry> =
        serde_json::from_str(&fs::read_to_string(&urgent).unwrap()).unwrap();
    let names = entries.iter().map(|e| e.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, ["EMERGENCY", "ALERT"]);
    assert_eq!(entries[1].priority, 1);
    assert_eq!(entries[1].message, "alert");
}

#[test]
fn test_json_document_keeps_every_entry_in_order() {
    let dir = TempDir::new().expect("failed to create a temporary directory");
    let path = dir.path().join("app.json");
    let logger = sinkforth::builder()
        .sink(FileSink::new(&path).unwrap())
        .build();

    let messages = (0..rand::rng().random_range(2..12))
        .map(|_| random_message())
        .collect::<Vec<_>>();
    for message in &messages {
        logger
            .info_with(message, Context::new().with("len", message.len()))
            .unwrap();
    }

    let document = fs::read_to_string(&path).unwrap();
    assert!(document.ends_with("]\n"));
    let entries: Vec<JsonEntry> = serde_json::from_str(&document).unwrap();
    assert_eq!(entries.len(), messages.len());
    for (entry, message) in entries.iter().zip(&messages) {
        assert_eq!(&entry.message, message);
        assert_eq!(entry.priority, 6);
        assert_eq!(entry.name, "INFO");
        assert_eq!(entry.context, format!("len={};", message.len()));
    }
}

#[test]
fn test_csv_escapes_quotes_in_message() {
    let dir = TempDir::new().expect("failed to create a temporary directory");
    let path = dir.path().join("app.csv");
    let logger = sinkforth::builder()
        .sink(FileSink::new(&path).unwrap())
        .timestamp_format(STAMP)
        .build();

    logger
        .warning_with(
            r#"user said "hi""#,
            Context::new()
                .with("user", "alice")
                .format(ContextFormat::Json),
        )
        .unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        format!("{STAMP},4,WARNING,\"user said \\\"hi\\\"\",{{\"user\":\"alice\"}}\n")
    );
}

#[test]
fn test_xml_document_grows() {
    let dir = TempDir::new().expect("failed to create a temporary directory");
    let path = dir.path().join("app.xml");
    let logger = sinkforth::builder()
        .sink(FileSink::new(&path).unwrap())
        .timestamp_format(STAMP)
        .build();

    logger.notice("first").unwrap().notice("second").unwrap();

    let document = fs::read_to_string(&path).unwrap();
    assert_eq!(document.matches("<entry").count(), 2);
    assert!(document.find("first").unwrap() < document.find("second").unwrap());
    assert!(document.trim_end().ends_with("</log>"));
}

#[test]
fn test_failure_policies() {
    let dir = TempDir::new().expect("failed to create a temporary directory");
    let broken = FileSink::new(dir.path().join("broken.log")).unwrap();
    fs::remove_file(broken.path()).unwrap();
    fs::create_dir(broken.path()).unwrap();
    let after = dir.path().join("after.log");

    let logger = sinkforth::builder()
        .sink(broken)
        .sink(FileSink::new(&after).unwrap())
        .build();
    let err = logger.critical("lost").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(fs::read_to_string(&after).unwrap(), "");

    let broken = FileSink::new(dir.path().join("again.log")).unwrap();
    fs::remove_file(broken.path()).unwrap();
    fs::create_dir(broken.path()).unwrap();

    let logger = sinkforth::builder()
        .sink(broken)
        .sink(FileSink::new(&after).unwrap())
        .failure_policy(FailurePolicy::Continue)
        .build();
    let err = logger.critical("kept").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert_eq!(fs::read_to_string(&after).unwrap().lines().count(), 1);
}
