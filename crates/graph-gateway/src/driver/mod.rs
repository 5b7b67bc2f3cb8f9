//! Graph database driver handle.
//!
//! The gateway holds exactly one driver for the lifetime of the process. It
//! is created before the listener is bound and shared by `Arc` with the schema
//! and with every request context. Concurrency and pooling belong to the
//! implementation; callers never lock around it.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::cypher::CypherQuery;

mod neo4j;

pub use neo4j::Neo4jDriver;

/// One result row, keyed by column name.
pub type Record = Map<String, Value>;

/// The process-wide driver handle.
pub type SharedDriver = Arc<dyn GraphDriver>;

/// Errors raised by a graph driver.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Failed to connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Failed to decode column `{column}`: {message}")]
    Decode { column: String, message: String },

    #[error("Unsupported parameter `{name}`: {reason}")]
    Parameter { name: String, reason: String },
}

/// Executes Cypher statements against a graph database.
#[async_trait]
pub trait GraphDriver: Send + Sync {
    /// Run one statement and collect the requested columns of every row.
    async fn run(&self, query: CypherQuery) -> Result<Vec<Record>, DriverError>;

    /// Round-trip a trivial statement to prove the database is reachable.
    async fn verify_connectivity(&self) -> Result<(), DriverError> {
        self.run(CypherQuery::new("RETURN 1 AS ok").column("ok"))
            .await
            .map(|_| ())
    }
}
