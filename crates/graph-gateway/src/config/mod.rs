pub use gateway_config::{CorsConfig, GatewayConfig, Neo4jPoolConfig, SchemaConfig, ServerConfig};
pub use neo4j_env::Neo4jEnv;

mod gateway_config;
mod neo4j_env;
