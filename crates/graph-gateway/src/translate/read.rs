use serde_json::Value;

use super::filter::{relationship_pattern, WhereBuilder};
use super::{options_clause, TranslateError, COUNT_COLUMN, NODE_COLUMN};
use crate::cypher::{label_expr, node_projection, CypherQuery, Params};
use crate::typedefs::{FieldKind, NodeField, NodeType, TypeDefs};

/// `ts(where, options)`.
pub fn read_nodes(
    defs: &TypeDefs,
    node: &NodeType,
    filter: Option<&Value>,
    options: Option<&Value>,
) -> Result<CypherQuery, TranslateError> {
    let mut params = Params::new();
    let mut lines = vec![format!("MATCH (this{})", label_expr(&node.labels))];
    lines.extend(WhereBuilder::new(defs, &mut params).clause(node, "this", filter)?);
    lines.push(format!("RETURN {} AS {NODE_COLUMN}", node_projection("this")));
    lines.extend(options_clause(node, "this", options, &mut params)?);

    Ok(CypherQuery::new(lines.join("\n"))
        .with_params(params)
        .column(NODE_COLUMN))
}

/// `tsAggregate(where) { count }`.
pub fn aggregate_nodes(
    defs: &TypeDefs,
    node: &NodeType,
    filter: Option<&Value>,
) -> Result<CypherQuery, TranslateError> {
    let mut params = Params::new();
    let mut lines = vec![format!("MATCH (this{})", label_expr(&node.labels))];
    lines.extend(WhereBuilder::new(defs, &mut params).clause(node, "this", filter)?);
    lines.push(format!("RETURN count(this) AS {COUNT_COLUMN}"));

    Ok(CypherQuery::new(lines.join("\n"))
        .with_params(params)
        .column(COUNT_COLUMN))
}

/// Nodes reached from the parent with element id `parent_id` through a
/// relationship field.
pub fn read_related(
    defs: &TypeDefs,
    field: &NodeField,
    parent_id: &str,
    filter: Option<&Value>,
    options: Option<&Value>,
) -> Result<CypherQuery, TranslateError> {
    let FieldKind::Relationship {
        rel_type,
        direction,
    } = &field.kind
    else {
        return Err(TranslateError::UnknownNode(field.ty.base.clone()));
    };
    let target = defs
        .node(&field.ty.base)
        .ok_or_else(|| TranslateError::UnknownNode(field.ty.base.clone()))?;

    let mut params = Params::new();
    let parent = params.add("parent_id", Value::from(parent_id));
    let mut lines = vec![
        "MATCH (parent)".to_string(),
        format!("WHERE elementId(parent) = {parent}"),
        format!(
            "MATCH {}",
            relationship_pattern("parent", rel_type, *direction, "this", &target.labels, None)
        ),
    ];
    lines.extend(WhereBuilder::new(defs, &mut params).clause(target, "this", filter)?);
    lines.push(format!("RETURN {} AS {NODE_COLUMN}", node_projection("this")));
    lines.extend(options_clause(target, "this", options, &mut params)?);

    Ok(CypherQuery::new(lines.join("\n"))
        .with_params(params)
        .column(NODE_COLUMN))
}
