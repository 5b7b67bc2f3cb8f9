//! Graph Gateway Library
//!
//! A GraphQL server backed by a Neo4j graph database. At startup it reads a
//! GraphQL type definition file, creates one driver handle from the
//! `NEO4J_URL`, `NEO4J_USERNAME` and `NEO4J_PASSWORD` environment variables,
//! derives an executable schema from both and serves it over HTTP. Every
//! request's context carries the incoming request and the shared driver.
//!
//! ## Modules
//!
//! - [`config`]: Gateway configuration and the `NEO4J_*` environment
//! - [`driver`]: The graph driver handle and its `neo4rs` implementation
//! - [`typedefs`]: Parsed and validated type definitions
//! - [`schema`]: Schema derivation and resolvers
//! - [`translate`]: Resolver arguments to parameterised Cypher
//! - [`context`]: The per-request GraphQL context
//! - [`server`]: Router, handlers and graceful shutdown
//! - [`app`]: The startup sequence
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use graph_gateway::{config::{GatewayConfig, Neo4jEnv}, driver::Neo4jDriver, App};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = GatewayConfig::load()?;
//!     let driver = Neo4jDriver::connect(&Neo4jEnv::from_env()?, &config.neo4j).await?;
//!     let app = App::prepare(config, Arc::new(driver)).await?;
//!     let listener = tokio::net::TcpListener::bind(app.config().bind_address()).await?;
//!     app.serve(listener).await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod context;
pub mod cypher;
pub mod driver;
pub mod error;
pub mod record;
pub mod result_ext;
pub mod schema;
pub mod server;
pub mod translate;
pub mod typedefs;

pub use app::{run, App};
pub use context::{RequestContext, RequestInfo};
pub use driver::{GraphDriver, SharedDriver};
pub use error::{GatewayError, GatewayResult};
pub use result_ext::ResultExt;
