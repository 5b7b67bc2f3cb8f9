use serde_json::{Map, Value};

use super::filter::{relationship_pattern, WhereBuilder};
use super::{invalid, TranslateError, DATA_COLUMN, DELETED_COLUMN, NODE_COLUMN};
use crate::cypher::{escape, label_expr, node_projection, CypherQuery, Params};
use crate::typedefs::{FieldKind, NodeField, NodeType, TypeDefs};

/// `createTs(input)`. Scalar keys of each input become properties, while
/// relationship keys hold a `TargetWhere` selecting the nodes to connect.
///
/// Returns `None` for an empty input list; there is nothing to run.
pub fn create_nodes(
    defs: &TypeDefs,
    node: &NodeType,
    inputs: &[Value],
) -> Result<Option<CypherQuery>, TranslateError> {
    if inputs.is_empty() {
        return Ok(None);
    }

    let mut params = Params::new();
    let mut lines = Vec::new();
    let mut projections = Vec::new();

    for (i, input) in inputs.iter().enumerate() {
        let Value::Object(input) = input else {
            return Err(invalid("input", "expected an object"));
        };
        let var = format!("this{i}");
        let (props, connects) = split_input(node, input)?;
        let props = params.add(&format!("{var}_create"), Value::Object(props));

        lines.push("CALL {".to_string());
        lines.push(format!("    CREATE ({var}{})", label_expr(&node.labels)));
        lines.push(format!("    SET {var} = {props}"));
        for (field, filter) in connects {
            lines.push(format!("    WITH {var}"));
            let block = connect_block(defs, &var, field, filter, &mut params)?;
            lines.extend(block.into_iter().map(|l| format!("    {l}")));
        }
        lines.push(format!("    RETURN {var}"));
        lines.push("}".to_string());
        projections.push(node_projection(&var));
    }
    lines.push(format!("RETURN [{}] AS {DATA_COLUMN}", projections.join(", ")));

    Ok(Some(
        CypherQuery::new(lines.join("\n"))
            .with_params(params)
            .column(DATA_COLUMN),
    ))
}

/// `updateTs(where, update, connect, disconnect)`.
pub fn update_nodes(
    defs: &TypeDefs,
    node: &NodeType,
    filter: Option<&Value>,
    update: Option<&Value>,
    connect: Option<&Value>,
    disconnect: Option<&Value>,
) -> Result<CypherQuery, TranslateError> {
    let mut params = Params::new();
    let mut lines = vec![format!("MATCH (this{})", label_expr(&node.labels))];
    lines.extend(WhereBuilder::new(defs, &mut params).clause(node, "this", filter)?);

    if let Some(update) = object_arg("update", update)? {
        let (props, rels) = split_input(node, update)?;
        if let Some((field, _)) = rels.first() {
            return Err(TranslateError::UnknownInputField {
                node: node.name.clone(),
                field: field.name.clone(),
            });
        }
        if !props.is_empty() {
            let p = params.add("this_update", Value::Object(props));
            lines.push(format!("SET this += {p}"));
        }
    }

    if let Some(disconnect) = object_arg("disconnect", disconnect)? {
        for (field, filter) in relationship_entries(node, disconnect)? {
            lines.push("WITH this".to_string());
            lines.extend(disconnect_block(defs, "this", field, filter, &mut params)?);
        }
    }

    if let Some(connect) = object_arg("connect", connect)? {
        for (field, filter) in relationship_entries(node, connect)? {
            lines.push("WITH this".to_string());
            lines.extend(connect_block(defs, "this", field, filter, &mut params)?);
        }
    }

    lines.push(format!("RETURN {} AS {NODE_COLUMN}", node_projection("this")));

    Ok(CypherQuery::new(lines.join("\n"))
        .with_params(params)
        .column(NODE_COLUMN))
}

/// `deleteTs(where)`; relationships of deleted nodes go with them.
pub fn delete_nodes(
    defs: &TypeDefs,
    node: &NodeType,
    filter: Option<&Value>,
) -> Result<CypherQuery, TranslateError> {
    let mut params = Params::new();
    let mut lines = vec![format!("MATCH (this{})", label_expr(&node.labels))];
    lines.extend(WhereBuilder::new(defs, &mut params).clause(node, "this", filter)?);
    lines.push("DETACH DELETE this".to_string());
    lines.push(format!("RETURN count(*) AS {DELETED_COLUMN}"));

    Ok(CypherQuery::new(lines.join("\n"))
        .with_params(params)
        .column(DELETED_COLUMN))
}

fn object_arg<'v>(
    key: &str,
    value: Option<&'v Value>,
) -> Result<Option<&'v Map<String, Value>>, TranslateError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(invalid(key, "expected an object")),
    }
}

/// Separate stored properties from relationship connections.
fn split_input<'n, 'v>(
    node: &'n NodeType,
    input: &'v Map<String, Value>,
) -> Result<(Map<String, Value>, Vec<(&'n NodeField, &'v Value)>), TranslateError> {
    let mut props = Map::new();
    let mut rels = Vec::new();
    for (key, value) in input {
        match node.field(key) {
            Some(field) if field.scalar().is_some() => {
                props.insert(key.clone(), value.clone());
            }
            Some(field) if field.is_relationship() => {
                if !value.is_null() {
                    rels.push((field, value));
                }
            }
            _ => {
                return Err(TranslateError::UnknownInputField {
                    node: node.name.clone(),
                    field: key.clone(),
                })
            }
        }
    }
    Ok((props, rels))
}

fn relationship_entries<'n, 'v>(
    node: &'n NodeType,
    input: &'v Map<String, Value>,
) -> Result<Vec<(&'n NodeField, &'v Value)>, TranslateError> {
    let (props, rels) = split_input(node, input)?;
    if let Some(key) = props.keys().next() {
        return Err(TranslateError::UnknownInputField {
            node: node.name.clone(),
            field: key.clone(),
        });
    }
    Ok(rels)
}

fn target<'d>(defs: &'d TypeDefs, field: &NodeField) -> Result<&'d NodeType, TranslateError> {
    defs.node(&field.ty.base)
        .ok_or_else(|| TranslateError::UnknownNode(field.ty.base.clone()))
}

/// Unit subquery merging a relationship from `var` to every node matched by
/// `filter`.
fn connect_block(
    defs: &TypeDefs,
    var: &str,
    field: &NodeField,
    filter: &Value,
    params: &mut Params,
) -> Result<Vec<String>, TranslateError> {
    let FieldKind::Relationship {
        rel_type,
        direction,
    } = &field.kind
    else {
        return Err(TranslateError::UnknownNode(field.ty.base.clone()));
    };
    let target = target(defs, field)?;
    let other = format!("{var}_{}_connect", field.name);

    let mut lines = vec![
        "CALL {".to_string(),
        format!("    WITH {var}"),
        format!("    MATCH ({other}{})", label_expr(&target.labels)),
    ];
    if let Some(clause) = WhereBuilder::new(defs, params).clause(target, &other, Some(filter))? {
        lines.push(format!("    {clause}"));
    }
    lines.push(format!(
        "    MERGE {}",
        relationship_pattern(var, rel_type, *direction, &other, &[], None)
    ));
    lines.push("}".to_string());
    Ok(lines)
}

/// Unit subquery deleting relationships from `var` to nodes matched by
/// `filter`.
fn disconnect_block(
    defs: &TypeDefs,
    var: &str,
    field: &NodeField,
    filter: &Value,
    params: &mut Params,
) -> Result<Vec<String>, TranslateError> {
    let FieldKind::Relationship {
        rel_type,
        direction,
    } = &field.kind
    else {
        return Err(TranslateError::UnknownNode(field.ty.base.clone()));
    };
    let target = target(defs, field)?;
    let other = format!("{var}_{}_disconnect", field.name);
    let rel = escape(&format!("{other}_rel"));

    let mut lines = vec![
        "CALL {".to_string(),
        format!("    WITH {var}"),
        format!(
            "    MATCH {}",
            relationship_pattern(var, rel_type, *direction, &other, &target.labels, Some(&rel))
        ),
    ];
    if let Some(clause) = WhereBuilder::new(defs, params).clause(target, &other, Some(filter))? {
        lines.push(format!("    {clause}"));
    }
    lines.push(format!("    DELETE {rel}"));
    lines.push("}".to_string());
    Ok(lines)
}
