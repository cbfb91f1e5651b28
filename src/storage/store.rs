//! The relational deep-index store (spec §4.3): SQLite-backed, one row
//! per file and one row per symbol, with a schema-version guard that
//! fails hard on mismatch rather than attempting a silent migration.

use crate::error::{StoreError, StoreResult};
use crate::indexing::BuiltIndex;
use crate::symbol::{FileInfo, SymbolInfo, SymbolNames, SymbolTable};
use crate::storage::schema;
use crate::types::SymbolKind;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

pub struct DeepIndexStore {
    conn: Connection,
}

impl DeepIndexStore {
    /// Open (creating if absent) the store at `path` for `project_path`.
    /// An existing store built with a different schema version is a hard
    /// error: there is no migration path, the caller must rebuild.
    pub fn open(path: &Path, project_path: &str, built_at: i64) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", true)?;

        match schema::current_version(&conn)? {
            None => schema::create(&conn, project_path, built_at)?,
            Some(found) if found != schema::SCHEMA_VERSION => {
                return Err(StoreError::SchemaMismatch {
                    found,
                    expected: schema::SCHEMA_VERSION,
                })
            }
            Some(_) => {}
        }

        Ok(Self { conn })
    }

    pub fn open_in_memory(project_path: &str, built_at: i64) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::create(&conn, project_path, built_at)?;
        Ok(Self { conn })
    }

    /// Replace the entire contents of the store with `index` in a single
    /// transaction: a full rebuild, not an incremental merge.
    pub fn replace_all(&mut self, index: &BuiltIndex) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM symbols", [])?;
        tx.execute("DELETE FROM files", [])?;

        for (path, info) in &index.files {
            let (mtime, content_hash) = index.file_meta.get(path).cloned().unwrap_or_default();
            insert_file(&tx, path, info, mtime, &content_hash)?;
        }
        for (id, symbol) in &index.symbols {
            insert_symbol(&tx, id, symbol)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Replace a single file's rows (and its symbols), used by incremental
    /// updates (spec §4.2) when a file's mtime/hash has changed.
    pub fn replace_file(
        &mut self,
        path: &str,
        info: &FileInfo,
        symbols: &SymbolTable,
        mtime: i64,
        content_hash: &str,
    ) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM symbols WHERE file = ?1", params![path])?;
        tx.execute("DELETE FROM files WHERE path = ?1", params![path])?;
        insert_file(&tx, path, info, mtime, content_hash)?;
        for (id, symbol) in symbols {
            insert_symbol(&tx, id, symbol)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn remove_file(&mut self, path: &str) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM symbols WHERE file = ?1", params![path])?;
        tx.execute("DELETE FROM files WHERE path = ?1", params![path])?;
        tx.commit()?;
        Ok(())
    }

    pub fn file_count(&self) -> StoreResult<u64> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?)
    }

    pub fn symbol_count(&self) -> StoreResult<u64> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM symbols", [], |row| row.get(0))?)
    }

    /// The stored mtime for a file, used by the incremental builder to
    /// decide whether a re-parse is necessary.
    pub fn file_mtime(&self, path: &str) -> StoreResult<Option<i64>> {
        Ok(self
            .conn
            .query_row("SELECT mtime FROM files WHERE path = ?1", params![path], |row| row.get(0))
            .optional()?)
    }

    pub fn symbol(&self, id: &str) -> StoreResult<Option<SymbolInfo>> {
        let row = self
            .conn
            .query_row(
                "SELECT file, kind, line, signature, docstring, called_by FROM symbols WHERE id = ?1",
                params![id],
                symbol_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub fn symbols_in_file(&self, path: &str) -> StoreResult<Vec<(String, SymbolInfo)>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, file, kind, line, signature, docstring, called_by FROM symbols WHERE file = ?1 ORDER BY line",
        )?;
        let rows = stmt.query_map(params![path], |row| {
            let id: String = row.get(0)?;
            let info = symbol_from_row_offset(row, 1)?;
            Ok((id, info))
        })?;
        rows.collect::<rusqlite::Result<_>>().map_err(StoreError::from)
    }

    /// `(path, mtime, content_hash)` for every stored file, used by the
    /// incremental builder to tell which discovered files changed.
    pub fn all_file_stamps(&self) -> StoreResult<Vec<(String, i64, String)>> {
        let mut stmt = self.conn.prepare("SELECT path, mtime, content_hash FROM files")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?;
        rows.collect::<rusqlite::Result<_>>().map_err(StoreError::from)
    }

    /// Every stored symbol id, used by the incremental builder to build a
    /// name index covering symbols it isn't reparsing this round.
    pub fn all_symbol_ids(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT id FROM symbols")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        rows.collect::<rusqlite::Result<_>>().map_err(StoreError::from)
    }

    /// Append `caller_id` to a symbol's `called_by` in place, used when an
    /// incremental build resolves a pending call into a symbol whose own
    /// file wasn't reparsed this round.
    pub fn add_caller(&mut self, symbol_id: &str, caller_id: &str) -> StoreResult<()> {
        let Some(mut info) = self.symbol(symbol_id)? else {
            return Ok(());
        };
        if info.called_by.iter().any(|c| c == caller_id) {
            return Ok(());
        }
        info.add_caller(caller_id);
        let called_by_json = serde_json::to_string(&info.called_by)?;
        self.conn.execute(
            "UPDATE symbols SET called_by = ?1 WHERE id = ?2",
            params![called_by_json, symbol_id],
        )?;
        Ok(())
    }

    pub fn all_files(&self) -> StoreResult<Vec<(String, FileInfo)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT path, language, line_count, package, imports FROM files ORDER BY path")?;
        let rows = stmt.query_map([], |row| {
            let path: String = row.get(0)?;
            let language: String = row.get(1)?;
            let line_count: u32 = row.get(2)?;
            let package: Option<String> = row.get(3)?;
            let imports_json: String = row.get(4)?;
            let imports: Vec<String> = serde_json::from_str(&imports_json).unwrap_or_default();

            let mut info = FileInfo::new(language, line_count);
            info.package = package;
            info.imports = imports;
            Ok((path, info))
        })?;
        rows.collect::<rusqlite::Result<_>>().map_err(StoreError::from)
    }
}

fn insert_file(
    tx: &rusqlite::Transaction,
    path: &str,
    info: &FileInfo,
    mtime: i64,
    content_hash: &str,
) -> StoreResult<()> {
    let imports_json = serde_json::to_string(&info.imports)?;
    tx.execute(
        "INSERT INTO files (path, language, line_count, package, imports, mtime, content_hash)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![path, info.language, info.line_count, info.package, imports_json, mtime, content_hash],
    )?;
    Ok(())
}

fn insert_symbol(tx: &rusqlite::Transaction, id: &str, symbol: &SymbolInfo) -> StoreResult<()> {
    let called_by_json = serde_json::to_string(&symbol.called_by)?;
    tx.execute(
        "INSERT INTO symbols (id, file, kind, line, signature, docstring, called_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            id,
            symbol.file,
            symbol.kind.as_str(),
            symbol.line,
            symbol.signature,
            symbol.docstring,
            called_by_json,
        ],
    )?;
    Ok(())
}

fn symbol_from_row(row: &rusqlite::Row) -> rusqlite::Result<SymbolInfo> {
    symbol_from_row_offset(row, 0)
}

fn symbol_from_row_offset(row: &rusqlite::Row, offset: usize) -> rusqlite::Result<SymbolInfo> {
    let file: String = row.get(offset)?;
    let kind_str: String = row.get(offset + 1)?;
    let line: u32 = row.get(offset + 2)?;
    let signature: Option<String> = row.get(offset + 3)?;
    let docstring: Option<String> = row.get(offset + 4)?;
    let called_by_json: String = row.get(offset + 5)?;

    let kind = SymbolKind::from_str_opt(&kind_str).unwrap_or(SymbolKind::Function);
    let called_by: Vec<String> = serde_json::from_str(&called_by_json).unwrap_or_default();

    let mut info = SymbolInfo::new(kind, file, line);
    if let Some(sig) = signature {
        info = info.with_signature(sig);
    }
    info = info.with_docstring(docstring);
    info.called_by = called_by;
    Ok(info)
}

/// Rebuild the `SymbolNames` summary for a file from its stored symbols,
/// used when materializing a full `FileInfo` back out of the store.
#[allow(dead_code)]
fn summarize(symbols: &[(String, SymbolInfo)]) -> SymbolNames {
    let mut names = SymbolNames::default();
    for (id, info) in symbols {
        let qualified = id.rsplit_once("::").map(|(_, q)| q).unwrap_or(id.as_str());
        match info.kind {
            SymbolKind::Function => names.functions.push(qualified.to_string()),
            SymbolKind::Class | SymbolKind::Struct | SymbolKind::Interface | SymbolKind::Enum => {
                names.classes.push(qualified.to_string())
            }
            _ => {}
        }
    }
    names
}
