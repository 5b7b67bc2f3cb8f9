//! Startup error type for the gateway.
//!
//! Request-time failures never reach this type: resolvers turn them into
//! GraphQL errors in the response body.

use std::path::PathBuf;

use thiserror::Error;

use crate::driver::DriverError;
use crate::typedefs::TypeDefsError;

/// Errors that abort gateway startup.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The type definition file could not be read.
    #[error("Failed to read type definitions from {path}: {source}")]
    SchemaFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The type definitions are not valid.
    #[error("Invalid type definitions: {0}")]
    TypeDefs(#[from] TypeDefsError),

    /// The derived schema was rejected by the GraphQL engine.
    #[error("Schema derivation failed: {0}")]
    Schema(String),

    /// The graph database driver failed.
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP listener failed.
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Result type alias using GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<envy::Error> for GatewayError {
    fn from(err: envy::Error) -> Self {
        GatewayError::Config(err.to_string())
    }
}

impl From<async_graphql::dynamic::SchemaError> for GatewayError {
    fn from(err: async_graphql::dynamic::SchemaError) -> Self {
        GatewayError::Schema(err.to_string())
    }
}
