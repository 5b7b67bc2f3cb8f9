//! Values handed from resolvers to their child fields.

use serde_json::{Map, Value};

/// Key under which node projections carry `elementId(node)`.
pub const ID_KEY: &str = "__id";

/// A node returned by a translated statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRecord {
    /// Element id, absent when the node came from a projection without one.
    pub id: Option<String>,
    pub properties: Map<String, Value>,
}

impl NodeRecord {
    /// Build from a `this { .*, __id: elementId(this) }` projection. Returns
    /// `None` for anything that is not a map (including null).
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut properties) = value else {
            return None;
        };
        let id = match properties.remove(ID_KEY) {
            Some(Value::String(id)) => Some(id),
            _ => None,
        };
        Some(Self { id, properties })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }
}

/// Parent value of `CreateTsMutationResponse` / `UpdateTsMutationResponse`.
#[derive(Debug, Clone, Default)]
pub struct MutationPayload {
    pub nodes: Vec<NodeRecord>,
}

/// Parent value of `TAggregateSelection`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AggregateSelection {
    pub count: i64,
}

/// Parent value of `DeleteInfo`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteInfo {
    pub nodes_deleted: i64,
}
