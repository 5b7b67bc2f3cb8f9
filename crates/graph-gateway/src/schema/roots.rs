//! Generated `Query` and `Mutation` fields.
//!
//! Every builder returns the field name alongside the field so the root
//! builder can reject clashes.

use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, TypeRef};
use serde_json::Value;

use super::{
    arg, cypher_value, declared_args, execute, lookup_node, node_records, nodes_value, type_ref,
    DELETE_INFO,
};
use crate::driver::Record;
use crate::record::{AggregateSelection, DeleteInfo, MutationPayload, NodeRecord};
use crate::translate::{
    aggregate_nodes, create_nodes, custom_root, delete_nodes, read_nodes, update_nodes,
    COUNT_COLUMN, DATA_COLUMN, DELETED_COLUMN, NODE_COLUMN,
};
use crate::typedefs::{NodeType, RootField, TypeDefs};

fn where_arg(node: &NodeType) -> InputValue {
    InputValue::new("where", TypeRef::named(super::where_input(node)))
}

/// First integer found in `column`, zero when the statement returned no row.
fn count(rows: Vec<Record>, column: &str) -> i64 {
    rows.into_iter()
        .find_map(|row| row.get(column).and_then(Value::as_i64))
        .unwrap_or(0)
}

/// `ts(where, options): [T!]!`
pub(super) fn read_field(defs: &Arc<TypeDefs>, node: &NodeType) -> (String, Field) {
    let defs = defs.clone();
    let name = node.name.clone();
    let field = Field::new(
        node.plural.as_str(),
        TypeRef::named_nn_list_nn(node.name.as_str()),
        move |ctx| {
            let defs = defs.clone();
            let name = name.clone();
            FieldFuture::new(async move {
                let node = lookup_node(&defs, &name)?;
                let query = read_nodes(
                    &defs,
                    node,
                    arg(&ctx, "where")?.as_ref(),
                    arg(&ctx, "options")?.as_ref(),
                )?;
                let rows = execute(&ctx, query).await?;
                Ok(nodes_value(node_records(rows, NODE_COLUMN), true))
            })
        },
    )
    .argument(where_arg(node))
    .argument(InputValue::new(
        "options",
        TypeRef::named(super::options_input(node)),
    ));
    (node.plural.clone(), field)
}

/// `tsAggregate(where): TAggregateSelection!`
pub(super) fn aggregate_field(defs: &Arc<TypeDefs>, node: &NodeType) -> (String, Field) {
    let defs = defs.clone();
    let name = node.name.clone();
    let field_name = format!("{}Aggregate", node.plural);
    let field = Field::new(
        field_name.as_str(),
        TypeRef::named_nn(super::aggregate_selection(node)),
        move |ctx| {
            let defs = defs.clone();
            let name = name.clone();
            FieldFuture::new(async move {
                let node = lookup_node(&defs, &name)?;
                let query = aggregate_nodes(&defs, node, arg(&ctx, "where")?.as_ref())?;
                let rows = execute(&ctx, query).await?;
                Ok(Some(FieldValue::owned_any(AggregateSelection {
                    count: count(rows, COUNT_COLUMN),
                })))
            })
        },
    )
    .argument(where_arg(node));
    (field_name, field)
}

/// `createTs(input: [TCreateInput!]!): CreateTsMutationResponse!`
pub(super) fn create_field(defs: &Arc<TypeDefs>, node: &NodeType) -> (String, Field) {
    let defs = defs.clone();
    let name = node.name.clone();
    let field_name = format!("create{}", node.pascal_plural());
    let field = Field::new(
        field_name.as_str(),
        TypeRef::named_nn(super::create_response(node)),
        move |ctx| {
            let defs = defs.clone();
            let name = name.clone();
            FieldFuture::new(async move {
                let node = lookup_node(&defs, &name)?;
                let inputs = match arg(&ctx, "input")? {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(items)) => items,
                    Some(single) => vec![single],
                };
                let nodes = match create_nodes(&defs, node, &inputs)? {
                    None => Vec::new(),
                    Some(query) => {
                        let rows = execute(&ctx, query).await?;
                        rows.into_iter()
                            .filter_map(|mut row| row.remove(DATA_COLUMN))
                            .flat_map(|data| match data {
                                Value::Array(items) => items,
                                _ => Vec::new(),
                            })
                            .filter_map(NodeRecord::from_value)
                            .collect()
                    }
                };
                tracing::debug!(node = %name, created = nodes.len(), "Nodes created");
                Ok(Some(FieldValue::owned_any(MutationPayload { nodes })))
            })
        },
    )
    .argument(InputValue::new(
        "input",
        TypeRef::named_nn_list_nn(super::create_input(node)),
    ));
    (field_name, field)
}

/// `updateTs(where, update, connect, disconnect): UpdateTsMutationResponse!`
pub(super) fn update_field(
    defs: &Arc<TypeDefs>,
    node: &NodeType,
    has_update: bool,
) -> (String, Field) {
    let field_name = format!("update{}", node.pascal_plural());
    let mut field = {
        let defs = defs.clone();
        let name = node.name.clone();
        Field::new(
            field_name.as_str(),
            TypeRef::named_nn(super::update_response(node)),
            move |ctx| {
                let defs = defs.clone();
                let name = name.clone();
                FieldFuture::new(async move {
                    let node = lookup_node(&defs, &name)?;
                    let query = update_nodes(
                        &defs,
                        node,
                        arg(&ctx, "where")?.as_ref(),
                        arg(&ctx, "update")?.as_ref(),
                        arg(&ctx, "connect")?.as_ref(),
                        arg(&ctx, "disconnect")?.as_ref(),
                    )?;
                    let rows = execute(&ctx, query).await?;
                    let nodes = node_records(rows, NODE_COLUMN);
                    tracing::debug!(node = %name, updated = nodes.len(), "Nodes updated");
                    Ok(Some(FieldValue::owned_any(MutationPayload { nodes })))
                })
            },
        )
        .argument(where_arg(node))
    };
    if has_update {
        field = field.argument(InputValue::new(
            "update",
            TypeRef::named(super::update_input(node)),
        ));
    }
    if node.has_relationships() {
        field = field
            .argument(InputValue::new(
                "connect",
                TypeRef::named(super::connect_input(node)),
            ))
            .argument(InputValue::new(
                "disconnect",
                TypeRef::named(super::disconnect_input(node)),
            ));
    }
    (field_name, field)
}

/// `deleteTs(where): DeleteInfo!`
pub(super) fn delete_field(defs: &Arc<TypeDefs>, node: &NodeType) -> (String, Field) {
    let defs = defs.clone();
    let name = node.name.clone();
    let field_name = format!("delete{}", node.pascal_plural());
    let field = Field::new(
        field_name.as_str(),
        TypeRef::named_nn(DELETE_INFO),
        move |ctx| {
            let defs = defs.clone();
            let name = name.clone();
            FieldFuture::new(async move {
                let node = lookup_node(&defs, &name)?;
                let query = delete_nodes(&defs, node, arg(&ctx, "where")?.as_ref())?;
                let rows = execute(&ctx, query).await?;
                let nodes_deleted = count(rows, DELETED_COLUMN);
                tracing::debug!(node = %name, nodes_deleted, "Nodes deleted");
                Ok(Some(FieldValue::owned_any(DeleteInfo { nodes_deleted })))
            })
        },
    )
    .argument(where_arg(node));
    (field_name, field)
}

/// A `@cypher` field declared on `Query` or `Mutation`.
pub(super) fn custom_root_field(defs: &Arc<TypeDefs>, root: &RootField) -> (String, Field) {
    let definition = root.clone();
    let shared = defs.clone();
    let mut field = Field::new(root.name.as_str(), type_ref(&root.ty), move |ctx| {
        let defs = shared.clone();
        let root = definition.clone();
        FieldFuture::new(async move {
            let args = declared_args(&ctx, &root.arguments)?;
            let query = custom_root(&defs, &root, &args)?;
            let rows = execute(&ctx, query).await?;
            cypher_value(&defs, &root.ty, rows)
        })
    });
    if let Some(description) = &root.description {
        field = field.description(description.as_str());
    }
    for argument in &root.arguments {
        let mut input = InputValue::new(argument.name.as_str(), type_ref(&argument.ty));
        if let Some(description) = &argument.description {
            input = input.description(description.as_str());
        }
        field = field.argument(input);
    }
    (root.name.clone(), field)
}
