//! Database handles.
//!
//! Handles are thin references to a named logical database. The provider
//! never caches or owns them; lifecycle and pooling belong to the driver.

use crate::db::codec::{CodecRegistry, to_relaxed_json};
use crate::error::{DataAccessError, DataAccessResult};
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Collection, Database};
use std::sync::Arc;
use tracing::debug;

/// Database names are limited to 63 bytes by the server.
pub const MAX_DATABASE_NAME_LEN: usize = 63;

const FORBIDDEN_NAME_CHARS: &[char] = &['/', '\\', '.', '"', '$', '\0'];

/// Validate a logical database name.
///
/// Names must be non-empty, at most [`MAX_DATABASE_NAME_LEN`] bytes, and free
/// of path separators, quotes, dollar signs, NUL, and whitespace.
pub fn validate_database_name(name: &str) -> DataAccessResult<()> {
    if name.is_empty() {
        return Err(DataAccessError::invalid_argument(
            "database name must not be empty",
        ));
    }
    if name.len() > MAX_DATABASE_NAME_LEN {
        return Err(DataAccessError::invalid_argument(format!(
            "database name exceeds {MAX_DATABASE_NAME_LEN} bytes"
        )));
    }
    if let Some(c) = name
        .chars()
        .find(|c| c.is_whitespace() || FORBIDDEN_NAME_CHARS.contains(c))
    {
        return Err(DataAccessError::invalid_argument(format!(
            "database name contains forbidden character {c:?}"
        )));
    }
    Ok(())
}

/// A handle to a named logical database.
///
/// Cheap to clone; carries the shared codec registry so collection-level code
/// can reach encode/decode strategies without going back to the provider.
#[derive(Debug, Clone)]
pub struct DatabaseHandle {
    database: Database,
    codecs: Arc<CodecRegistry>,
}

impl DatabaseHandle {
    pub(crate) fn new(database: Database, codecs: Arc<CodecRegistry>) -> Self {
        Self { database, codecs }
    }

    /// The logical database name.
    pub fn name(&self) -> &str {
        self.database.name()
    }

    /// The codec registry shared by all handles from the same provider.
    pub fn codec_registry(&self) -> Arc<CodecRegistry> {
        Arc::clone(&self.codecs)
    }

    /// Get a typed collection handle.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }

    /// The underlying driver handle, for operations this layer does not wrap.
    pub fn driver(&self) -> &Database {
        &self.database
    }

    /// Round-trip to the server to confirm the database is reachable.
    pub async fn ping(&self) -> DataAccessResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        debug!(database = %self.name(), "ping ok");
        Ok(())
    }
}

/// A handle compatible with superseded framework APIs.
///
/// Older callers work with untyped documents and JSON-shaped command results.
/// This wrapper keeps that surface available without widening
/// [`DatabaseHandle`] itself.
pub struct LegacyDatabase {
    inner: DatabaseHandle,
}

impl LegacyDatabase {
    pub(crate) fn new(inner: DatabaseHandle) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Untyped collection access.
    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.inner.collection(name)
    }

    /// Run a raw database command.
    pub async fn run_command(&self, command: Document) -> DataAccessResult<Document> {
        let reply = self.inner.driver().run_command(command).await?;
        Ok(reply)
    }

    /// Run a raw database command and return the reply as relaxed JSON.
    pub async fn command_json(&self, command: Document) -> DataAccessResult<serde_json::Value> {
        let reply = self.run_command(command).await?;
        Ok(to_relaxed_json(&Bson::Document(reply)))
    }

    /// List collection names in this database.
    pub async fn collection_names(&self) -> DataAccessResult<Vec<String>> {
        let names = self.inner.driver().list_collection_names().await?;
        Ok(names)
    }
}

impl std::fmt::Debug for LegacyDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyDatabase")
            .field("name", &self.name())
            .finish()
    }
}
