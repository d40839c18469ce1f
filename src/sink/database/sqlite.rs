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

use std::path::Path;
use std::sync::Mutex;
use std::sync::MutexGuard;

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;

use crate::Error;
use crate::ErrorKind;
use crate::sink::database::Database;
use crate::sink::database::Dialect;
use crate::sink::database::SqlValue;

/// A [`Database`] backed by a SQLite connection.
#[derive(Debug)]
pub struct SqliteDatabase {
    conn: Mutex<Connection>,
}

impl SqliteDatabase {
    /// Wrap an open connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|err| from_sqlite_error(err).with_context("path", path.display()))?;
        Ok(Self::new(conn))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, Error> {
        Ok(Self::new(Connection::open_in_memory().map_err(from_sqlite_error)?))
    }

    /// Lock the connection, e.g. to query the log table.
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|err| err.into_inner())
    }
}

impl Database for SqliteDatabase {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn has_table(&self, table: &str) -> Result<bool, Error> {
        let conn = self.connection();
        let found = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(from_sqlite_error)?;
        Ok(found.is_some())
    }

    fn execute(&self, sql: &str, params: &[(&str, SqlValue)]) -> Result<(), Error> {
        let conn = self.connection();
        let mut stmt = conn.prepare(sql).map_err(from_sqlite_error)?;

        let names = params
            .iter()
            .map(|(column, _)| format!(":{column}"))
            .collect::<Vec<_>>();
        let named = names
            .iter()
            .zip(params)
            .map(|(name, (_, value))| (name.as_str(), value as &dyn ToSql))
            .collect::<Vec<_>>();

        stmt.execute(named.as_slice())
            .map_err(|err| from_sqlite_error(err).with_context("sql", sql))?;
        Ok(())
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            SqlValue::Integer(v) => v.to_sql(),
            SqlValue::Text(v) => v.to_sql(),
        }
    }
}

fn from_sqlite_error(err: rusqlite::Error) -> Error {
    Error::new(ErrorKind::Database, "failed to execute sqlite statement").with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Context;
    use crate::Level;
    use crate::Record;
    use crate::sink::DatabaseSink;
    use crate::sink::Sink;

    #[test]
    fn test_sqlite_round_trip() {
        let sink = DatabaseSink::new(SqliteDatabase::open_in_memory().unwrap(), "logs").unwrap();
        assert!(sink.db().has_table("logs").unwrap());

        let context = Context::new()
            .with("timestamp", "2024-05-06 07:08:09")
            .with("name", "NOTICE");
        sink.write(&Record::new(Level::Notice, "This is a database test.", &context))
            .unwrap();

        let conn = sink.db().connection();
        let mut stmt = conn
            .prepare("SELECT timestamp, level, name, message, context FROM logs")
            .unwrap();
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(
            rows,
            vec![(
                "2024-05-06 07:08:09".to_string(),
                5,
                "NOTICE".to_string(),
                "This is a database test.".to_string(),
                String::new(),
            )]
        );
    }
}
