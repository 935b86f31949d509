//! SQLite Document Store
//!
//! Persists documents as JSON text in a single `documents` table keyed by
//! (collection, id). The team code is copied into its own indexed column
//! so team-scoped queries do not scan the whole collection.

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use super::traits::{
    BackendError, BackendResult, ChangeEvent, DocumentStore, FieldFilter, TEAM_CODE_FIELD,
};

const CHANGE_CAPACITY: usize = 256;

/// SQLite implementation of `DocumentStore`
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    changes: broadcast::Sender<ChangeEvent>,
}

impl SqliteStore {
    /// Open (or create) the database file and run migrations
    pub fn open(path: &Path) -> BackendResult<Self> {
        let conn = Connection::open(path).map_err(storage_err)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> BackendResult<Self> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> BackendResult<Self> {
        run_migrations(&conn)?;
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            changes,
        })
    }
}

fn storage_err(e: rusqlite::Error) -> BackendError {
    BackendError::Storage(e.to_string())
}

fn parse_body(body: &str) -> BackendResult<Value> {
    serde_json::from_str(body).map_err(|e| BackendError::Malformed(e.to_string()))
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
    let query = format!("PRAGMA table_info({})", table);
    let Ok(mut stmt) = conn.prepare(&query) else {
        return false;
    };
    let Ok(names) = stmt.query_map([], |row| row.get::<_, String>(1)) else {
        return false;
    };
    let found = names.flatten().any(|name| name == column);
    found
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> BackendResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        )",
        [],
    )
    .map_err(storage_err)?;

    // Columns added after the first schema
    if !column_exists(conn, "documents", "team_code") {
        conn.execute("ALTER TABLE documents ADD COLUMN team_code TEXT", [])
            .map_err(|e| BackendError::Storage(format!("Failed to add team_code: {}", e)))?;
        conn.execute(
            "UPDATE documents SET team_code = json_extract(body, '$.teamCode')",
            [],
        )
        .map_err(storage_err)?;
    }

    if !column_exists(conn, "documents", "updated_at") {
        conn.execute(
            "ALTER TABLE documents ADD COLUMN updated_at INTEGER NOT NULL DEFAULT 0",
            [],
        )
        .map_err(|e| BackendError::Storage(format!("Failed to add updated_at: {}", e)))?;
    }

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_team ON documents(collection, team_code)",
        [],
    )
    .map_err(storage_err)?;

    Ok(())
}

fn read_body(conn: &Connection, collection: &str, id: &str) -> BackendResult<Option<Value>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection, id],
            |row| row.get(0),
        )
        .optional()
        .map_err(storage_err)?;
    body.as_deref().map(parse_body).transpose()
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn get(&self, collection: &str, id: &str) -> BackendResult<Option<Value>> {
        let conn = self.conn.lock().await;
        read_body(&conn, collection, id)
    }

    async fn set(&self, collection: &str, id: &str, doc: Value) -> BackendResult<()> {
        let body = serde_json::to_string(&doc).map_err(|e| BackendError::Malformed(e.to_string()))?;
        let team_code = doc.get(TEAM_CODE_FIELD).and_then(Value::as_str).map(str::to_string);

        let before = {
            let conn = self.conn.lock().await;
            // A corrupt previous body must not block the overwrite
            let before = read_body(&conn, collection, id).ok().flatten();
            conn.execute(
                "INSERT OR REPLACE INTO documents (collection, id, body, team_code, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![collection, id, body, team_code, chrono::Utc::now().timestamp_millis()],
            )
            .map_err(storage_err)?;
            before
        };

        let _ = self
            .changes
            .send(ChangeEvent::new(collection, id, before.as_ref(), Some(&doc)));
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> BackendResult<()> {
        let before = {
            let conn = self.conn.lock().await;
            let before = read_body(&conn, collection, id).ok().flatten();
            conn.execute(
                "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection, id],
            )
            .map_err(storage_err)?;
            before
        };

        if let Some(before) = before {
            let _ = self
                .changes
                .send(ChangeEvent::new(collection, id, Some(&before), None));
        }
        Ok(())
    }

    async fn query(&self, collection: &str, filter: &FieldFilter) -> BackendResult<Vec<Value>> {
        let conn = self.conn.lock().await;

        let bodies: Vec<String> = match (filter.field.as_str(), filter.value.as_str()) {
            (TEAM_CODE_FIELD, Some(code)) => {
                let mut stmt = conn
                    .prepare("SELECT body FROM documents WHERE collection = ?1 AND team_code = ?2 ORDER BY id")
                    .map_err(storage_err)?;
                let rows = stmt
                    .query_map(params![collection, code], |row| row.get(0))
                    .map_err(storage_err)?;
                rows.collect::<Result<_, _>>().map_err(storage_err)?
            }
            _ => {
                let mut stmt = conn
                    .prepare("SELECT body FROM documents WHERE collection = ?1 ORDER BY id")
                    .map_err(storage_err)?;
                let rows = stmt
                    .query_map(params![collection], |row| row.get(0))
                    .map_err(storage_err)?;
                rows.collect::<Result<_, _>>().map_err(storage_err)?
            }
        };

        let mut docs = Vec::with_capacity(bodies.len());
        for body in bodies {
            let doc = parse_body(&body)?;
            if filter.matches(&doc) {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    fn changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }
}
