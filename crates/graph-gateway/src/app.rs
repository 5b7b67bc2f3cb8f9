//! Startup sequence.
//!
//! 1. load configuration and the `NEO4J_*` environment,
//! 2. create the driver handle,
//! 3. read the type definitions and derive the schema ([`App::prepare`]),
//! 4. bind the listener and serve until Ctrl+C / SIGTERM.
//!
//! Steps 1 to 3 never bind a socket, so any of them failing leaves no
//! listener behind.

use std::future::Future;
use std::sync::Arc;

use async_graphql::dynamic::Schema;
use axum::Router;
use tokio::net::TcpListener;

use crate::config::{GatewayConfig, Neo4jEnv};
use crate::driver::{GraphDriver, Neo4jDriver, SharedDriver};
use crate::error::{GatewayError, GatewayResult};
use crate::result_ext::ResultExt;
use crate::schema::derive_schema;
use crate::server::{build_router, shutdown_signal, AppState, GRAPHQL_PATH};
use crate::typedefs::TypeDefs;

/// A gateway with its schema derived, ready to serve.
pub struct App {
    config: GatewayConfig,
    schema: Schema,
    driver: SharedDriver,
}

impl App {
    /// Read the type definitions named by the configuration and derive the
    /// schema around `driver`.
    pub async fn prepare(config: GatewayConfig, driver: SharedDriver) -> GatewayResult<Self> {
        let path = &config.schema.type_defs_path;
        let sdl = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| GatewayError::SchemaFile {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), bytes = sdl.len(), "Type definitions read");

        let type_defs = TypeDefs::parse(&sdl)?;
        let schema = derive_schema(type_defs, driver.clone(), &config.schema)?;

        Ok(Self {
            config,
            schema,
            driver,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn router(&self) -> Router {
        build_router(
            AppState::new(self.schema.clone(), self.driver.clone()),
            &self.config.server,
            &self.config.cors,
        )
    }

    /// Serve on `listener` until Ctrl+C or SIGTERM.
    pub async fn serve(self, listener: TcpListener) -> GatewayResult<()> {
        self.serve_with_shutdown(listener, shutdown_signal()).await
    }

    /// Serve on `listener` until `signal` completes.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, signal: F) -> GatewayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        axum::serve(listener, router)
            .with_graceful_shutdown(signal)
            .await?;
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Run the gateway with configuration from the environment.
pub async fn run() -> anyhow::Result<()> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting graph gateway");

    let config = GatewayConfig::load().log("Failed to load gateway configuration")?;
    let env = Neo4jEnv::from_env().map_err(GatewayError::from)?;
    tracing::info!(
        port = config.server.port,
        type_defs = %config.schema.type_defs_path.display(),
        neo4j = %env.url,
        "Configuration loaded"
    );

    let driver = Neo4jDriver::connect(&env, &config.neo4j)
        .await
        .log("Failed to create Neo4j driver")?;
    if config.neo4j.verify_connectivity {
        driver
            .verify_connectivity()
            .await
            .log(format!("Neo4j at {} is not reachable", driver.url()))?;
        tracing::info!(url = %driver.url(), "Neo4j connectivity verified");
    }
    let driver: SharedDriver = Arc::new(driver);

    let app = App::prepare(config, driver)
        .await
        .log("Failed to derive GraphQL schema")?;

    let addr = app.config().bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .log(format!("Failed to bind to {addr}"))?;
    tracing::info!(address = %addr, "GraphQL server listening on http://{}{}", addr, GRAPHQL_PATH);

    app.serve(listener).await?;
    Ok(())
}
