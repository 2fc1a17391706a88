//! Database handle provider.
//!
//! The provider is the single place the rest of the framework goes to obtain
//! database handles. It centralizes error translation and codec registry
//! access; everything else about the connection (pooling, wire protocol,
//! retries) stays inside the driver client.

use crate::config::MongoConfig;
use crate::db::codec::CodecRegistry;
use crate::db::handle::{DatabaseHandle, LegacyDatabase, validate_database_name};
use crate::db::translator::{DriverErrorTranslator, ErrorTranslator};
use crate::error::{DataAccessError, DataAccessResult};
use async_trait::async_trait;
use mongodb::Client;
use mongodb::options::ClientOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Uniform access to logical database handles.
///
/// Implementations must be safe to share across request-handling tasks: every
/// accessor takes `&self` and the contract exposes no mutable state.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    /// Get a handle to the default database.
    async fn database(&self) -> DataAccessResult<DatabaseHandle>;

    /// Get a handle to the database with the given name.
    ///
    /// The name must be non-empty and valid; violations are reported as
    /// [`DataAccessError::InvalidArgument`], never silently mapped to the
    /// default database.
    async fn database_named(&self, name: &str) -> DataAccessResult<DatabaseHandle>;

    /// The shared error translator. Never absent; stable across calls.
    fn error_translator(&self) -> Arc<dyn ErrorTranslator>;

    /// Get a handle compatible with superseded framework APIs.
    async fn legacy_database(&self) -> DataAccessResult<LegacyDatabase>;

    /// The codec registry used for this provider's databases.
    ///
    /// Delegates to [`database`](Self::database) by default; implementations
    /// holding the registry directly may override to skip the implicit handle
    /// acquisition.
    async fn codec_registry(&self) -> DataAccessResult<Arc<CodecRegistry>> {
        Ok(self.database().await?.codec_registry())
    }
}

/// Provider backed by a driver [`Client`].
#[derive(Clone)]
pub struct ClientDatabaseProvider {
    client: Client,
    default_database: Option<String>,
    codecs: Arc<CodecRegistry>,
    translator: Arc<dyn ErrorTranslator>,
    verify_on_acquire: bool,
    verify_timeout: Duration,
}

impl ClientDatabaseProvider {
    /// Wrap an existing driver client.
    ///
    /// `default_database` backs [`DatabaseProvider::database`]; pass `None`
    /// for server-level clients where callers always name the database.
    pub fn new(client: Client, default_database: Option<String>) -> Self {
        Self {
            client,
            default_database,
            codecs: Arc::new(CodecRegistry::with_defaults()),
            translator: Arc::new(DriverErrorTranslator::new()),
            verify_on_acquire: false,
            verify_timeout: Duration::from_secs(crate::config::DEFAULT_VERIFY_TIMEOUT_SECS),
        }
    }

    /// Build a client from configuration and wrap it.
    pub async fn connect(config: &MongoConfig) -> DataAccessResult<Self> {
        let mut options = ClientOptions::parse(&config.connection_string).await?;
        if config.default_database.is_some() {
            options.default_database = config.default_database.clone();
        }
        let default_database = options.default_database.clone();

        let client = Client::with_options(options)?;

        info!(
            uri = %config.masked_connection_string(),
            default_database = ?default_database,
            "Created MongoDB client"
        );

        let mut provider = Self::new(client, default_database);
        provider.verify_on_acquire = config.options.verify_on_acquire_or_default();
        provider.verify_timeout = Duration::from_secs(config.options.verify_timeout_or_default());
        Ok(provider)
    }

    /// Replace the codec registry.
    pub fn with_codec_registry(mut self, codecs: Arc<CodecRegistry>) -> Self {
        self.codecs = codecs;
        self
    }

    /// Enable or disable ping verification of handles on acquisition.
    pub fn with_verification(mut self, enabled: bool, timeout: Duration) -> Self {
        self.verify_on_acquire = enabled;
        self.verify_timeout = timeout;
        self
    }

    /// The default database name, if one is configured.
    pub fn default_database_name(&self) -> Option<&str> {
        self.default_database.as_deref()
    }

    /// The underlying driver client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    fn handle(&self, name: &str) -> DataAccessResult<DatabaseHandle> {
        validate_database_name(name)?;
        Ok(DatabaseHandle::new(
            self.client.database(name),
            Arc::clone(&self.codecs),
        ))
    }

    fn default_handle(&self) -> DataAccessResult<DatabaseHandle> {
        let name = self.default_database.as_deref().ok_or_else(|| {
            DataAccessError::no_default_database(
                "include a database in the URI path or set default_database",
            )
        })?;
        self.handle(name)
    }

    async fn verified(&self, handle: DatabaseHandle) -> DataAccessResult<DatabaseHandle> {
        if self.verify_on_acquire {
            match tokio::time::timeout(self.verify_timeout, handle.ping()).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(DataAccessError::timeout(
                        "database handle verification",
                        self.verify_timeout.as_secs(),
                    ));
                }
            }
            debug!(database = %handle.name(), "verified database handle");
        }
        Ok(handle)
    }
}

#[async_trait]
impl DatabaseProvider for ClientDatabaseProvider {
    async fn database(&self) -> DataAccessResult<DatabaseHandle> {
        let handle = self.default_handle()?;
        self.verified(handle).await
    }

    async fn database_named(&self, name: &str) -> DataAccessResult<DatabaseHandle> {
        let handle = self.handle(name)?;
        self.verified(handle).await
    }

    fn error_translator(&self) -> Arc<dyn ErrorTranslator> {
        Arc::clone(&self.translator)
    }

    async fn legacy_database(&self) -> DataAccessResult<LegacyDatabase> {
        Ok(LegacyDatabase::new(self.database().await?))
    }

    async fn codec_registry(&self) -> DataAccessResult<Arc<CodecRegistry>> {
        // Same failure semantics as database(): the registry is only handed
        // out when a default handle can be produced.
        self.default_handle()?;
        Ok(Arc::clone(&self.codecs))
    }
}

impl std::fmt::Debug for ClientDatabaseProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientDatabaseProvider")
            .field("default_database", &self.default_database)
            .field("verify_on_acquire", &self.verify_on_acquire)
            .field("verify_timeout", &self.verify_timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn offline_provider(default_database: Option<&str>) -> ClientDatabaseProvider {
        // Client construction is lazy: no connection is made until an
        // operation touches the wire.
        let client = Client::with_uri_str("mongodb://127.0.0.1:27017")
            .await
            .unwrap();
        ClientDatabaseProvider::new(client, default_database.map(String::from))
    }

    #[tokio::test]
    async fn test_database_named_round_trip() {
        let provider = offline_provider(Some("app")).await;
        let handle = provider.database_named("analytics").await.unwrap();
        assert_eq!(handle.name(), "analytics");
    }

    #[tokio::test]
    async fn test_default_database() {
        let provider = offline_provider(Some("app")).await;
        let handle = provider.database().await.unwrap();
        assert_eq!(handle.name(), "app");
        assert_eq!(provider.default_database_name(), Some("app"));
    }

    #[tokio::test]
    async fn test_empty_name_is_invalid_argument() {
        let provider = offline_provider(Some("app")).await;
        let result = provider.database_named("").await;
        assert!(matches!(
            result,
            Err(DataAccessError::InvalidArgument { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_default_database() {
        let provider = offline_provider(None).await;
        let result = provider.database().await;
        assert!(matches!(
            result,
            Err(DataAccessError::NoDefaultDatabase { .. })
        ));
    }

    #[tokio::test]
    async fn test_translator_identity_is_stable() {
        let provider = offline_provider(Some("app")).await;
        let a = provider.error_translator();
        let b = provider.error_translator();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_codec_registry_matches_handle_registry() {
        let provider = offline_provider(Some("app")).await;
        let from_provider = provider.codec_registry().await.unwrap();
        let from_handle = provider.database().await.unwrap().codec_registry();
        assert!(Arc::ptr_eq(&from_provider, &from_handle));
    }

    #[tokio::test]
    async fn test_codec_registry_fails_without_default_database() {
        let provider = offline_provider(None).await;
        let result = provider.codec_registry().await;
        assert!(matches!(
            result,
            Err(DataAccessError::NoDefaultDatabase { .. })
        ));
    }

    #[tokio::test]
    async fn test_legacy_database_name() {
        let provider = offline_provider(Some("app")).await;
        let legacy = provider.legacy_database().await.unwrap();
        assert_eq!(legacy.name(), "app");
    }

    #[tokio::test]
    async fn test_custom_codec_registry() {
        let provider = offline_provider(Some("app")).await;
        let custom = Arc::new(CodecRegistry::new());
        let provider = provider.with_codec_registry(Arc::clone(&custom));
        let registry = provider.codec_registry().await.unwrap();
        assert!(Arc::ptr_eq(&registry, &custom));
        assert!(registry.is_empty());
    }
}
