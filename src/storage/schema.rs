//! Deep-index relational schema (spec §4.3): one row per file, one row
//! per symbol, and a single schema-info row recording the version the
//! store was built with.

use rusqlite::Connection;

/// Bump when the table shapes change. A store built with a different
/// version is rejected outright — there is no migration path.
pub const SCHEMA_VERSION: u32 = 1;

pub fn current_version(conn: &Connection) -> rusqlite::Result<Option<u32>> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_info')",
        [],
        |row| row.get(0),
    )?;
    if !exists {
        return Ok(None);
    }
    conn.query_row("SELECT version FROM schema_info WHERE id = 1", [], |row| row.get(0))
        .map(Some)
}

pub fn create(conn: &Connection, project_path: &str, built_at: i64) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE schema_info (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            project_path TEXT NOT NULL,
            built_at INTEGER NOT NULL
        );

        CREATE TABLE files (
            path TEXT PRIMARY KEY,
            language TEXT NOT NULL,
            line_count INTEGER NOT NULL,
            package TEXT,
            imports TEXT NOT NULL,
            mtime INTEGER NOT NULL,
            content_hash TEXT NOT NULL
        );

        CREATE TABLE symbols (
            id TEXT PRIMARY KEY,
            file TEXT NOT NULL REFERENCES files(path) ON DELETE CASCADE,
            kind TEXT NOT NULL,
            line INTEGER NOT NULL,
            signature TEXT,
            docstring TEXT,
            called_by TEXT NOT NULL
        );

        CREATE INDEX idx_symbols_file ON symbols(file);
        ",
    )?;

    conn.execute(
        "INSERT INTO schema_info (id, version, project_path, built_at) VALUES (1, ?1, ?2, ?3)",
        rusqlite::params![SCHEMA_VERSION, project_path, built_at],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_connection_has_no_version() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(current_version(&conn).unwrap(), None);
    }

    #[test]
    fn create_stamps_current_version() {
        let conn = Connection::open_in_memory().unwrap();
        create(&conn, "/proj", 0).unwrap();
        assert_eq!(current_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }
}
