//! `neo4rs` implementation of [`GraphDriver`].

use async_trait::async_trait;
use neo4rs::{
    BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType,
    ConfigBuilder, Graph,
};
use serde_json::Value;

use super::{DriverError, GraphDriver, Record};
use crate::config::{Neo4jEnv, Neo4jPoolConfig};
use crate::cypher::CypherQuery;

/// Pooled Bolt connection to a Neo4j server.
pub struct Neo4jDriver {
    graph: Graph,
    url: String,
}

impl Neo4jDriver {
    /// Build the connection pool.
    ///
    /// Whether this touches the network depends on `neo4rs`; callers that
    /// need a fail-fast startup follow up with `verify_connectivity`.
    pub async fn connect(env: &Neo4jEnv, pool: &Neo4jPoolConfig) -> Result<Self, DriverError> {
        let connect_err = |e: neo4rs::Error| DriverError::Connect {
            url: env.url.clone(),
            message: e.to_string(),
        };

        let mut builder = ConfigBuilder::default()
            .uri(env.url.as_str())
            .user(env.username.as_str())
            .password(env.password.as_str())
            .fetch_size(pool.fetch_size)
            .max_connections(pool.max_connections);
        if let Some(database) = &env.database {
            builder = builder.db(database.as_str());
        }
        let config = builder.build().map_err(connect_err)?;
        let graph = Graph::connect(config).await.map_err(connect_err)?;

        tracing::info!(
            url = %env.url,
            database = env.database.as_deref().unwrap_or("<default>"),
            max_connections = pool.max_connections,
            "Neo4j driver created"
        );

        Ok(Self {
            graph,
            url: env.url.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl GraphDriver for Neo4jDriver {
    async fn run(&self, query: CypherQuery) -> Result<Vec<Record>, DriverError> {
        tracing::debug!(cypher = %query.text, params = query.params.len(), "Running statement");

        let mut statement = neo4rs::query(&query.text);
        for (name, value) in &query.params {
            statement = statement.param(name, to_bolt(name, value)?);
        }

        let mut stream = self
            .graph
            .execute(statement)
            .await
            .map_err(|e| DriverError::Query(e.to_string()))?;

        let mut records = Vec::new();
        while let Some(row) = stream
            .next()
            .await
            .map_err(|e| DriverError::Query(e.to_string()))?
        {
            let mut record = Record::new();
            for column in &query.columns {
                let value: Value = row.get(column).map_err(|e| DriverError::Decode {
                    column: column.clone(),
                    message: e.to_string(),
                })?;
                record.insert(column.clone(), value);
            }
            records.push(record);
        }

        Ok(records)
    }
}

/// Convert a JSON parameter into its Bolt representation.
fn to_bolt(name: &str, value: &Value) -> Result<BoltType, DriverError> {
    let bolt = match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::Boolean(BoltBoolean::new(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => BoltType::Integer(BoltInteger::new(i)),
            None => {
                let f = n.as_f64().ok_or_else(|| DriverError::Parameter {
                    name: name.to_string(),
                    reason: format!("{n} is not representable"),
                })?;
                BoltType::Float(BoltFloat::new(f))
            }
        },
        Value::String(s) => BoltType::String(BoltString::new(s)),
        Value::Array(items) => {
            let mut list = BoltList::new();
            for item in items {
                list.push(to_bolt(name, item)?);
            }
            BoltType::List(list)
        }
        Value::Object(map) => {
            let mut bolt_map = BoltMap::new();
            for (key, item) in map {
                bolt_map.put(BoltString::new(key), to_bolt(name, item)?);
            }
            BoltType::Map(bolt_map)
        }
    };
    Ok(bolt)
}
