//! GraphQL arguments to Cypher.
//!
//! Every function here is pure: it takes the node model plus the JSON form of
//! the resolver arguments and returns a [`CypherQuery`]. Nothing touches the
//! driver, which keeps the generated statements easy to assert on.
//!
//! Conventions shared by all statements:
//! - the node being selected is bound to `this`;
//! - nodes are returned as `this { .*, __id: elementId(this) }`, see
//!   [`crate::record::NodeRecord`];
//! - every user-provided value is a parameter.

use serde_json::Value;
use thiserror::Error;

use crate::cypher::{escape, Params};
use crate::typedefs::NodeType;

mod custom;
mod filter;
mod read;
mod write;

pub use custom::{custom_field, custom_root};
pub use filter::{operators_for, Operator, WhereBuilder};
pub(crate) use filter::{NONE_SUFFIX, SOME_SUFFIX};
pub use read::{aggregate_nodes, read_nodes, read_related};
pub use write::{create_nodes, delete_nodes, update_nodes};

/// Column carrying node projections in read and update statements.
pub const NODE_COLUMN: &str = "this";
/// Column carrying the created nodes list.
pub const DATA_COLUMN: &str = "data";
/// Column carrying `@cypher` results.
pub const RESULT_COLUMN: &str = "result";
/// Column carrying aggregate counts.
pub const COUNT_COLUMN: &str = "count";
/// Column carrying the number of deleted nodes.
pub const DELETED_COLUMN: &str = "nodesDeleted";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("`{key}` is not a filter on `{node}`")]
    UnknownFilter { node: String, key: String },

    #[error("`{field}` is not a sortable field of `{node}`")]
    UnknownSortField { node: String, field: String },

    #[error("`{field}` is not a writable field of `{node}`")]
    UnknownInputField { node: String, field: String },

    #[error("Invalid value for `{key}`: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Unknown node type `{0}`")]
    UnknownNode(String),
}

fn invalid(key: &str, reason: &str) -> TranslateError {
    TranslateError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// `ORDER BY` / `SKIP` / `LIMIT` tail from a `TOptions` input.
pub(crate) fn options_clause(
    node: &NodeType,
    var: &str,
    options: Option<&Value>,
    params: &mut Params,
) -> Result<Vec<String>, TranslateError> {
    let options = match options {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(_) => return Err(invalid("options", "expected an object")),
    };

    let mut lines = Vec::new();

    let sorts: Vec<&Value> = match options.get("sort") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::Object(_)) => vec![single],
        Some(_) => return Err(invalid("sort", "expected a list of objects")),
    };
    let mut order = Vec::new();
    for sort in sorts {
        let Value::Object(sort) = sort else {
            return Err(invalid("sort", "expected a list of objects"));
        };
        // Object keys carry no order once parsed, so precedence comes from
        // the list alone.
        if sort.len() != 1 {
            return Err(invalid("sort", "each sort object must name exactly one field"));
        }
        for (field, direction) in sort {
            let sortable = node
                .field(field)
                .map(|f| f.scalar().is_some() && !f.ty.list)
                .unwrap_or(false);
            if !sortable {
                return Err(TranslateError::UnknownSortField {
                    node: node.name.clone(),
                    field: field.clone(),
                });
            }
            let direction = match direction.as_str() {
                Some("ASC") => "ASC",
                Some("DESC") => "DESC",
                _ => return Err(invalid(field, "sort direction must be ASC or DESC")),
            };
            order.push(format!("{var}.{} {direction}", escape(field)));
        }
    }
    if !order.is_empty() {
        lines.push(format!("ORDER BY {}", order.join(", ")));
    }

    for (key, clause) in [("offset", "SKIP"), ("limit", "LIMIT")] {
        match options.get(key) {
            None | Some(Value::Null) => {}
            Some(value) => match value.as_i64() {
                Some(n) if n >= 0 => {
                    let p = params.add(&format!("{var}_{key}"), Value::from(n));
                    lines.push(format!("{clause} {p}"));
                }
                _ => return Err(invalid(key, "expected a non-negative integer")),
            },
        }
    }

    Ok(lines)
}
