//! Gateway configuration module.
//!
//! Supports loading configuration from:
//! 1. Config file (TOML, JSON, or YAML) named by `GATEWAY_CONFIG`
//! 2. Environment variables
//!
//! Environment variables take precedence over config file values. Database
//! credentials are not part of this file; see [`super::Neo4jEnv`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Type definitions and schema limits
    pub schema: SchemaConfig,
    /// Driver pool configuration
    pub neo4j: Neo4jPoolConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server port (default: 4000)
    pub port: u16,
    /// Bind address (default: "0.0.0.0")
    pub bind: String,
    /// Serve the GraphQL playground on `GET /graphql` (default: true)
    pub playground: bool,
}

/// Schema configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaConfig {
    /// Path of the GraphQL type definitions (default: "app/schema.graphql")
    pub type_defs_path: PathBuf,
    /// Maximum query depth, unlimited when unset
    pub depth_limit: Option<usize>,
    /// Allow introspection queries (default: true)
    pub introspection: bool,
}

/// Neo4j driver pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Neo4jPoolConfig {
    /// Maximum pooled connections (default: 16)
    pub max_connections: usize,
    /// Records fetched per round trip (default: 500)
    pub fetch_size: usize,
    /// Run a probe query before serving (default: true)
    pub verify_connectivity: bool,
}

/// CORS configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Allowed origins, any origin when empty
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 4000,
            bind: "0.0.0.0".to_string(),
            playground: true,
        }
    }
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            type_defs_path: PathBuf::from("app/schema.graphql"),
            depth_limit: None,
            introspection: true,
        }
    }
}

impl Default for Neo4jPoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 16,
            fetch_size: 500,
            verify_connectivity: true,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from file and environment variables.
    /// Environment variables override file values.
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(config_path) = std::env::var("GATEWAY_CONFIG") {
            config = Self::from_file(&config_path)?;
            tracing::info!("Loaded configuration from: {}", config_path);
        }

        config.apply_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    /// Load configuration from a file (supports TOML, JSON, YAML)
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let config: GatewayConfig = match extension {
            "toml" => toml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            _ => {
                if content.trim().starts_with('{') {
                    serde_json::from_str(&content)?
                } else if content.contains("---") || content.contains(": ") {
                    serde_yaml::from_str(&content)?
                } else {
                    toml::from_str(&content)?
                }
            }
        };

        Ok(config)
    }

    /// Apply overrides from a variable lookup, normally the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server config
        if let Some(val) = lookup("GATEWAY_PORT").or_else(|| lookup("PORT")) {
            override_with("GATEWAY_PORT", &val, &mut self.server.port);
        }
        if let Some(val) = lookup("GATEWAY_BIND") {
            self.server.bind = val;
        }
        if let Some(val) = lookup("GATEWAY_PLAYGROUND") {
            override_with("GATEWAY_PLAYGROUND", &val, &mut self.server.playground);
        }

        // Schema config
        if let Some(val) = lookup("GATEWAY_SCHEMA_PATH") {
            self.schema.type_defs_path = PathBuf::from(val);
        }
        if let Some(val) = lookup("GATEWAY_DEPTH_LIMIT") {
            let mut depth = self.schema.depth_limit.unwrap_or_default();
            if override_with("GATEWAY_DEPTH_LIMIT", &val, &mut depth) {
                self.schema.depth_limit = Some(depth);
            }
        }
        if let Some(val) = lookup("GATEWAY_INTROSPECTION") {
            override_with("GATEWAY_INTROSPECTION", &val, &mut self.schema.introspection);
        }

        // Neo4j pool config
        if let Some(val) = lookup("NEO4J_MAX_CONNECTIONS") {
            override_with("NEO4J_MAX_CONNECTIONS", &val, &mut self.neo4j.max_connections);
        }
        if let Some(val) = lookup("NEO4J_FETCH_SIZE") {
            override_with("NEO4J_FETCH_SIZE", &val, &mut self.neo4j.fetch_size);
        }
        if let Some(val) = lookup("NEO4J_VERIFY_CONNECTIVITY") {
            override_with(
                "NEO4J_VERIFY_CONNECTIVITY",
                &val,
                &mut self.neo4j.verify_connectivity,
            );
        }

        // CORS config
        if let Some(val) = lookup("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }

    /// Socket address string for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

/// Parse `val` into `target`. An unparsable value is logged and the current
/// setting kept. Returns whether `target` changed.
fn override_with<T: FromStr>(key: &str, val: &str, target: &mut T) -> bool {
    match val.trim().parse() {
        Ok(parsed) => {
            *target = parsed;
            true
        }
        Err(_) => {
            tracing::warn!(key, value = val, "Ignoring invalid configuration override");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.schema.type_defs_path, PathBuf::from("app/schema.graphql"));
        assert!(config.neo4j.verify_connectivity);
        assert!(config.cors.allowed_origins.is_empty());
        assert_eq!(config.bind_address(), "0.0.0.0:4000");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_content = r#"
[server]
port = 8080
bind = "127.0.0.1"

[schema]
type_defs_path = "schema/sports.graphql"
depth_limit = 8
"#;
        let config: GatewayConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.schema.depth_limit, Some(8));
        assert_eq!(config.schema.type_defs_path, PathBuf::from("schema/sports.graphql"));
        // Defaults should still be applied for missing fields
        assert!(config.server.playground);
        assert_eq!(config.neo4j.fetch_size, 500);
    }

    #[test]
    fn test_yaml_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.yaml");
        std::fs::write(&path, "server:\n  port: 5001\nneo4j:\n  max_connections: 4\n").unwrap();

        let config = GatewayConfig::from_file(&path).unwrap();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.neo4j.max_connections, 4);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("PORT", "9000"),
            ("GATEWAY_SCHEMA_PATH", "/etc/gateway/schema.graphql"),
            ("GATEWAY_PLAYGROUND", "false"),
            ("NEO4J_VERIFY_CONNECTIVITY", "false"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, http://studio.local,"),
        ]);
        let mut config = GatewayConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9000);
        assert!(!config.server.playground);
        assert!(!config.neo4j.verify_connectivity);
        assert_eq!(
            config.schema.type_defs_path,
            PathBuf::from("/etc/gateway/schema.graphql")
        );
        assert_eq!(
            config.cors.allowed_origins,
            vec!["http://localhost:3000".to_string(), "http://studio.local".to_string()]
        );
    }

    #[test]
    fn test_invalid_overrides_keep_previous_values() {
        let mut config = GatewayConfig::default();
        config.schema.depth_limit = Some(8);
        config.apply_overrides(|key| match key {
            "GATEWAY_DEPTH_LIMIT" => Some("abc".to_string()),
            "GATEWAY_PLAYGROUND" => Some("0".to_string()),
            "GATEWAY_PORT" => Some("http".to_string()),
            "NEO4J_FETCH_SIZE" => Some("-5".to_string()),
            _ => None,
        });
        assert_eq!(config.schema.depth_limit, Some(8));
        assert!(config.server.playground);
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.neo4j.fetch_size, 500);

        config.apply_overrides(|key| match key {
            "GATEWAY_DEPTH_LIMIT" => Some("12".to_string()),
            "GATEWAY_PLAYGROUND" => Some("false".to_string()),
            _ => None,
        });
        assert_eq!(config.schema.depth_limit, Some(12));
        assert!(!config.server.playground);
    }

    #[test]
    fn test_gateway_port_wins_over_port() {
        let mut config = GatewayConfig::default();
        config.apply_overrides(|key| match key {
            "GATEWAY_PORT" => Some("4100".to_string()),
            "PORT" => Some("9000".to_string()),
            _ => None,
        });
        assert_eq!(config.server.port, 4100);
    }
}
