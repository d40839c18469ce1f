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

//! A sink that inserts one row per record into a SQL table.

use std::fmt;

use crate::Error;
use crate::Level;
use crate::LevelLimit;
use crate::Record;
use crate::layout::format_context;
use crate::sink::Sink;

#[cfg(feature = "sink-sqlite")]
mod sqlite;

#[cfg(feature = "sink-sqlite")]
pub use self::sqlite::SqliteDatabase;

/// The table name used by [`DatabaseSink::with_default_table`].
pub const DEFAULT_TABLE: &str = "pop_log";

const COLUMNS: [&str; 5] = ["timestamp", "level", "name", "message", "context"];

/// How an engine spells statement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `:column`
    Named,
    /// `$1`, `$2`, ...
    Numbered,
    /// `?`
    Positional,
}

impl Placeholder {
    /// Render the placeholder for `column`, the `index`-th parameter (1-based).
    pub fn render(&self, column: &str, index: usize) -> String {
        match self {
            Placeholder::Named => format!(":{column}"),
            Placeholder::Numbered => format!("${index}"),
            Placeholder::Positional => "?".to_string(),
        }
    }
}

/// The SQL dialect of a [`Database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// SQLite, with `:column` parameters.
    Sqlite,
    /// MySQL or MariaDB, with `?` parameters.
    Mysql,
    /// PostgreSQL, with `$n` parameters.
    Postgres,
}

impl Dialect {
    /// The parameter style of the dialect.
    pub fn placeholder(&self) -> Placeholder {
        match self {
            Dialect::Sqlite => Placeholder::Named,
            Dialect::Mysql => Placeholder::Positional,
            Dialect::Postgres => Placeholder::Numbered,
        }
    }

    /// The statement creating a log table.
    pub fn create_table(&self, table: &str) -> String {
        let id = match self {
            Dialect::Sqlite => "id INTEGER PRIMARY KEY AUTOINCREMENT",
            Dialect::Mysql => "id INTEGER NOT NULL AUTO_INCREMENT PRIMARY KEY",
            Dialect::Postgres => "id SERIAL PRIMARY KEY",
        };
        let datetime = match self {
            Dialect::Postgres => "TIMESTAMP",
            Dialect::Sqlite | Dialect::Mysql => "DATETIME",
        };
        format!(
            "CREATE TABLE {table} ({id}, timestamp {datetime}, level SMALLINT, \
             name VARCHAR(255), message TEXT, context TEXT)"
        )
    }

    /// The parameterized statement inserting one log row.
    pub fn insert(&self, table: &str) -> String {
        let placeholder = self.placeholder();
        let values = COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| placeholder.render(column, i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {table} ({}) VALUES ({values})",
            COLUMNS.join(", ")
        )
    }
}

/// A statement parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// The `level` column.
    Integer(i64),
    /// Every other column.
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

/// A SQL execution engine.
///
/// Implementations bind `params` by column name or by position, whichever matches the
/// [`Placeholder`] of their [`Dialect`]; the parameters always arrive in placeholder order.
pub trait Database: fmt::Debug + Send + Sync + 'static {
    /// The dialect spoken by the engine.
    fn dialect(&self) -> Dialect;

    /// Whether `table` exists.
    fn has_table(&self, table: &str) -> Result<bool, Error>;

    /// Execute a statement.
    fn execute(&self, sql: &str, params: &[(&str, SqlValue)]) -> Result<(), Error>;
}

/// A sink that inserts records into a table with the columns
/// `id, timestamp, level, name, message, context`.
///
/// The table is created on construction if it does not exist; its schema is never altered
/// afterwards.
#[derive(Debug)]
pub struct DatabaseSink<D> {
    db: D,
    table: String,
    limit: LevelLimit,
}

impl<D: Database> DatabaseSink<D> {
    /// Create a sink writing to `table`, creating the table if needed.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidArgument`](crate::ErrorKind::InvalidArgument) if `table`
    /// is not a plain SQL identifier, or with the engine's error if the table lookup or
    /// creation fails.
    pub fn new(db: D, table: impl Into<String>) -> Result<Self, Error> {
        let table = table.into();
        if !is_identifier(&table) {
            return Err(Error::invalid_argument("table name must be a plain sql identifier")
                .with_context("table", table));
        }

        if !db.has_table(&table)? {
            log::debug!("creating log table {table}");
            db.execute(&db.dialect().create_table(&table), &[])?;
        }

        Ok(Self {
            db,
            table,
            limit: LevelLimit::none(),
        })
    }

    /// Create a sink writing to the [`DEFAULT_TABLE`].
    pub fn with_default_table(db: D) -> Result<Self, Error> {
        Self::new(db, DEFAULT_TABLE)
    }

    /// Set the level ceiling.
    pub fn with_level_limit(mut self, level: Level) -> Self {
        self.limit.set_level(level);
        self
    }

    /// The engine.
    pub fn db(&self) -> &D {
        &self.db
    }

    /// The target table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Insert a free-form row with level `-1` and name `CUSTOM`.
    ///
    /// Custom rows are not subject to the level ceiling.
    pub fn write_custom(&self, content: &str) -> Result<(), Error> {
        let timestamp = jiff::Zoned::now().strftime("%Y-%m-%d %H:%M:%S").to_string();
        self.insert([
            SqlValue::Text(timestamp),
            SqlValue::Integer(-1),
            SqlValue::Text("CUSTOM".to_string()),
            SqlValue::Text(content.to_string()),
            SqlValue::Text(String::new()),
        ])
    }

    fn insert(&self, values: [SqlValue; 5]) -> Result<(), Error> {
        let params = COLUMNS.into_iter().zip(values).collect::<Vec<_>>();
        let sql = self.db.dialect().insert(&self.table);
        self.db
            .execute(&sql, &params)
            .map_err(|err| err.with_context("table", &self.table))
    }
}

impl<D: Database> Sink for DatabaseSink<D> {
    fn write(&self, record: &Record) -> Result<(), Error> {
        if !self.limit.permits(record.level()) {
            return Ok(());
        }

        self.insert([
            SqlValue::Text(record.timestamp().into_owned()),
            SqlValue::Integer(i64::from(record.level().rank())),
            SqlValue::Text(record.name().into_owned()),
            SqlValue::Text(record.message().to_string()),
            SqlValue::Text(format_context(record.context())?),
        ])
    }

    fn limit(&self) -> &LevelLimit {
        &self.limit
    }

    fn limit_mut(&mut self) -> &mut LevelLimit {
        &mut self.limit
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
