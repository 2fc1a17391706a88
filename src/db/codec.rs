//! Codec registry for converting domain values to and from BSON.
//!
//! The registry maps Rust types to encode/decode strategies. Types without a
//! registered codec fall back to serde-driven BSON conversion, so the registry
//! only needs entries for types whose wire representation differs from their
//! serde output (driver-native binary subtypes, millisecond datetimes, ...).

use crate::error::{DataAccessError, DataAccessResult};
use chrono::{DateTime, Utc};
use mongodb::bson::spec::BinarySubtype;
use mongodb::bson::{self, Binary, Bson};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// An encode/decode strategy for one domain type.
pub trait Codec<T>: Send + Sync {
    fn encode(&self, value: &T) -> DataAccessResult<Bson>;
    fn decode(&self, bson: &Bson) -> DataAccessResult<T>;
}

type ErasedCodec = Box<dyn Any + Send + Sync>;

/// Registry of codecs keyed by domain type.
///
/// Shared via `Arc`; registration takes a short write lock, lookups a read
/// lock. Handles obtained from a provider all reference the same registry.
pub struct CodecRegistry {
    codecs: RwLock<HashMap<TypeId, ErasedCodec>>,
}

impl CodecRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            codecs: RwLock::new(HashMap::new()),
        }
    }

    /// Create a registry with the built-in codecs registered.
    pub fn with_defaults() -> Self {
        let registry = Self::new();
        registry.register::<Uuid, _>(UuidCodec);
        registry.register::<DateTime<Utc>, _>(UtcDateTimeCodec);
        registry
    }

    /// Register a codec for `T`, replacing any previous entry.
    pub fn register<T, C>(&self, codec: C)
    where
        T: 'static,
        C: Codec<T> + 'static,
    {
        let erased: Arc<dyn Codec<T>> = Arc::new(codec);
        self.write().insert(TypeId::of::<T>(), Box::new(erased));
    }

    /// Look up the codec registered for `T`.
    pub fn lookup<T: 'static>(&self) -> Option<Arc<dyn Codec<T>>> {
        self.read()
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.downcast_ref::<Arc<dyn Codec<T>>>())
            .cloned()
    }

    /// Check whether a codec is registered for `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.read().contains_key(&TypeId::of::<T>())
    }

    /// Number of registered codecs.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Encode a value using its registered codec, or serde as fallback.
    pub fn encode<T>(&self, value: &T) -> DataAccessResult<Bson>
    where
        T: Serialize + 'static,
    {
        if let Some(codec) = self.lookup::<T>() {
            return codec.encode(value);
        }
        bson::to_bson(value).map_err(|e| {
            DataAccessError::codec(format!(
                "no codec registered for {} and serde encoding failed: {e}",
                type_name::<T>()
            ))
        })
    }

    /// Decode a value using its registered codec, or serde as fallback.
    pub fn decode<T>(&self, bson: &Bson) -> DataAccessResult<T>
    where
        T: DeserializeOwned + 'static,
    {
        if let Some(codec) = self.lookup::<T>() {
            return codec.decode(bson);
        }
        bson::from_bson(bson.clone()).map_err(|e| {
            DataAccessError::codec(format!(
                "no codec registered for {} and serde decoding failed: {e}",
                type_name::<T>()
            ))
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<TypeId, ErasedCodec>> {
        self.codecs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<TypeId, ErasedCodec>> {
        self.codecs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("codecs", &self.len())
            .finish()
    }
}

/// Convert BSON into relaxed extended JSON for diagnostic surfaces.
pub fn to_relaxed_json(bson: &Bson) -> serde_json::Value {
    bson.clone().into_relaxed_extjson()
}

/// UUIDs as BSON binary subtype 4.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCodec;

impl Codec<Uuid> for UuidCodec {
    fn encode(&self, value: &Uuid) -> DataAccessResult<Bson> {
        Ok(Bson::Binary(Binary {
            subtype: BinarySubtype::Uuid,
            bytes: value.as_bytes().to_vec(),
        }))
    }

    fn decode(&self, bson: &Bson) -> DataAccessResult<Uuid> {
        match bson {
            Bson::Binary(bin) if bin.subtype == BinarySubtype::Uuid => Uuid::from_slice(&bin.bytes)
                .map_err(|e| DataAccessError::codec(format!("invalid UUID bytes: {e}"))),
            // Accept the string form some older writers produced.
            Bson::String(s) => Uuid::parse_str(s)
                .map_err(|e| DataAccessError::codec(format!("invalid UUID string: {e}"))),
            other => Err(DataAccessError::codec(format!(
                "expected UUID binary, got {:?}",
                other.element_type()
            ))),
        }
    }
}

/// UTC timestamps as BSON datetimes (millisecond precision).
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcDateTimeCodec;

impl Codec<DateTime<Utc>> for UtcDateTimeCodec {
    fn encode(&self, value: &DateTime<Utc>) -> DataAccessResult<Bson> {
        Ok(Bson::DateTime(bson::DateTime::from_millis(
            value.timestamp_millis(),
        )))
    }

    fn decode(&self, bson: &Bson) -> DataAccessResult<DateTime<Utc>> {
        match bson {
            Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis())
                .ok_or_else(|| DataAccessError::codec("BSON datetime out of chrono range")),
            other => Err(DataAccessError::codec(format!(
                "expected datetime, got {:?}",
                other.element_type()
            ))),
        }
    }
}
