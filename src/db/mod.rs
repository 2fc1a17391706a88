//! Database access abstraction layer.
//!
//! This module provides the handle provider contract and its collaborators:
//! - Provider contract and the client-backed implementation
//! - Database handles (current and legacy surfaces)
//! - Driver error translation
//! - Codec registry for domain value <-> BSON conversion

pub mod codec;
pub mod handle;
pub mod provider;
pub mod translator;

pub use codec::{Codec, CodecRegistry, UtcDateTimeCodec, UuidCodec};
pub use handle::{DatabaseHandle, LegacyDatabase, MAX_DATABASE_NAME_LEN, validate_database_name};
pub use provider::{ClientDatabaseProvider, DatabaseProvider};
pub use translator::{DriverErrorTranslator, ErrorTranslator};
