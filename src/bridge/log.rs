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

use std::cell::Cell;
use std::io::Write;

use serde_json::Value;

use crate::Context;
use crate::Error;
use crate::Level;
use crate::Logger;

const TARGET_KEY: &str = "target";

// Crates the bundled sinks drive. Their records would re-enter the sink that emitted them.
const COLLABORATOR_CRATES: [&str; 11] = [
    "h2",
    "hyper",
    "hyper_util",
    "lettre",
    "mio",
    "reqwest",
    "rusqlite",
    "rustls",
    "tokio",
    "tower",
    "want",
];

thread_local! {
    static DISPATCHING: Cell<bool> = const { Cell::new(false) };
}

// Marks the current thread as dispatching until dropped.
struct DispatchGuard;

impl DispatchGuard {
    fn enter() -> Option<DispatchGuard> {
        if DISPATCHING.replace(true) {
            None
        } else {
            Some(DispatchGuard)
        }
    }
}

impl Drop for DispatchGuard {
    fn drop(&mut self) {
        DISPATCHING.set(false);
    }
}

fn is_collaborator(target: &str) -> bool {
    let root = target.split("::").next().unwrap_or(target);
    COLLABORATOR_CRATES.contains(&root)
}

impl Logger {
    /// Install this logger as the `log` crate global logger.
    ///
    /// The global maximum level is set to `Trace`; per-sink level limits still apply. To override
    /// this, call [`log::set_max_level`] after this function.
    ///
    /// # Errors
    ///
    /// Return an error if the `log` crate global logger has already been set.
    pub fn try_apply(self) -> Result<(), log::SetLoggerError> {
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(())
    }

    /// Install this logger as the `log` crate global logger.
    ///
    /// # Panics
    ///
    /// Panic if the `log` crate global logger has already been set.
    pub fn apply(self) {
        self.try_apply()
            .expect("Logger::apply must be called before the global logger initialized");
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        if is_collaborator(metadata.target()) {
            return false;
        }
        let level = Level::from(metadata.level());
        self.sinks().iter().any(|sink| sink.limit().permits(level))
    }

    fn log(&self, record: &log::Record) {
        if is_collaborator(record.target()) {
            return;
        }

        // formatted outside the guard: `Display` impls may log themselves
        let message = record.args().to_string();

        // records emitted by a sink while it writes are dropped
        let Some(_guard) = DispatchGuard::enter() else {
            return;
        };

        let mut context = Context::new();
        context.insert(TARGET_KEY, record.target());

        let mut visitor = KeyValueVisitor {
            context: &mut context,
        };
        // the visitor never fails
        let _ = record.key_values().visit(&mut visitor);

        if let Err(err) = Logger::log(self, record.level().into(), message, context) {
            handle_log_error(record, err);
        }
    }

    fn flush(&self) {}
}

struct KeyValueVisitor<'a> {
    context: &'a mut Context,
}

impl<'kvs> log::kv::VisitSource<'kvs> for KeyValueVisitor<'_> {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        let value = if let Some(n) = value.to_i64() {
            Value::from(n)
        } else if let Some(n) = value.to_u64() {
            Value::from(n)
        } else if let Some(b) = value.to_bool() {
            Value::from(b)
        } else {
            Value::from(value.to_string())
        };
        self.context.insert(key.as_str(), value);
        Ok(())
    }
}

fn handle_log_error(record: &log::Record, error: Error) {
    let Err(fallback_error) = write!(
        std::io::stderr(),
        r###"
Error perform logging.
    Attempted to log: {args}
    Record: {record:?}
    Error: {error}
"###,
        args = record.args(),
        record = record,
        error = error,
    ) else {
        return;
    };

    panic!(
        r###"
Error performing stderr logging after error occurred during regular logging.
    Attempted to log: {args}
    Record: {record:?}
    Error: {error}
    Fallback error: {fallback_error}
"###,
        args = record.args(),
        record = record,
        error = error,
        fallback_error = fallback_error,
    );
}
