//! MongoDB Access Layer
//!
//! This library provides the data-access abstraction for MongoDB: a uniform
//! way to obtain logical database handles from an underlying driver client,
//! a single error-translation boundary converting driver failures into a
//! generic data-access taxonomy, and a codec registry mapping domain values
//! to wire representations.

pub mod config;
pub mod db;
pub mod error;

pub use config::{HandleOptions, MongoConfig};
pub use db::{
    ClientDatabaseProvider, Codec, CodecRegistry, DatabaseHandle, DatabaseProvider,
    DriverErrorTranslator, ErrorTranslator, LegacyDatabase,
};
pub use error::{DataAccessError, DataAccessResult};
