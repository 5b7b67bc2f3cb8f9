//! Node object types and mutation payloads.

use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldFuture, FieldValue, InputValue, Object, TypeRef};
use serde_json::Value;

use super::{
    arg, cypher_value, declared_args, execute, is_enum, lookup_field, node_records, nodes_value,
    output_value, type_ref, DELETE_INFO,
};
use crate::record::{AggregateSelection, DeleteInfo, MutationPayload, NodeRecord};
use crate::translate::{custom_field, read_related, NODE_COLUMN};
use crate::typedefs::{FieldKind, NodeField, NodeType, TypeDefs};

/// Object type `T` of a node. Its resolvers expect a [`NodeRecord`] parent.
pub(super) fn node_object(defs: &Arc<TypeDefs>, node: &NodeType) -> Object {
    let mut object = Object::new(node.name.as_str());
    if let Some(description) = &node.description {
        object = object.description(description.as_str());
    }
    for field in &node.fields {
        let mut generated = match &field.kind {
            FieldKind::Scalar(_) => scalar_field(defs, field),
            FieldKind::Relationship { .. } => relationship_field(defs, node, field),
            FieldKind::Cypher { .. } => cypher_field(defs, node, field),
        };
        if let Some(description) = &field.description {
            generated = generated.description(description.as_str());
        }
        object = object.field(generated);
    }
    object
}

fn scalar_field(defs: &TypeDefs, field: &NodeField) -> Field {
    let name = field.name.clone();
    let as_enum = is_enum(defs, &field.ty.base);
    Field::new(field.name.as_str(), type_ref(&field.ty), move |ctx| {
        let name = name.clone();
        FieldFuture::new(async move {
            let record = ctx.parent_value.try_downcast_ref::<NodeRecord>()?;
            output_value(record.get(&name).cloned().unwrap_or(Value::Null), as_enum)
        })
    })
}

fn relationship_field(defs: &Arc<TypeDefs>, node: &NodeType, field: &NodeField) -> Field {
    let defs = defs.clone();
    let owner = node.name.clone();
    let name = field.name.clone();
    let list = field.ty.list;
    let target = field.ty.base.clone();

    let generated = Field::new(field.name.as_str(), type_ref(&field.ty), move |ctx| {
        let defs = defs.clone();
        let owner = owner.clone();
        let name = name.clone();
        FieldFuture::new(async move {
            let record = ctx.parent_value.try_downcast_ref::<NodeRecord>()?;
            let id = element_id(record)?;
            let field = lookup_field(&defs, &owner, &name)?;
            let query = read_related(
                &defs,
                field,
                &id,
                arg(&ctx, "where")?.as_ref(),
                arg(&ctx, "options")?.as_ref(),
            )?;
            let rows = execute(&ctx, query).await?;
            Ok(nodes_value(node_records(rows, NODE_COLUMN), list))
        })
    });

    if !list {
        return generated;
    }
    generated
        .argument(InputValue::new("where", TypeRef::named(format!("{target}Where"))))
        .argument(InputValue::new("options", TypeRef::named(format!("{target}Options"))))
}

fn cypher_field(defs: &Arc<TypeDefs>, node: &NodeType, field: &NodeField) -> Field {
    let FieldKind::Cypher { arguments, .. } = &field.kind else {
        return scalar_field(defs, field);
    };
    let declared = arguments.clone();
    let defs = defs.clone();
    let owner = node.name.clone();
    let name = field.name.clone();

    let generated = Field::new(field.name.as_str(), type_ref(&field.ty), move |ctx| {
        let defs = defs.clone();
        let owner = owner.clone();
        let name = name.clone();
        let declared = declared.clone();
        FieldFuture::new(async move {
            let record = ctx.parent_value.try_downcast_ref::<NodeRecord>()?;
            let id = element_id(record)?;
            let field = lookup_field(&defs, &owner, &name)?;
            let args = declared_args(&ctx, &declared)?;
            let query = custom_field(&defs, field, &id, &args)?;
            let rows = execute(&ctx, query).await?;
            cypher_value(&defs, &field.ty, rows)
        })
    });

    arguments.iter().fold(generated, |generated, argument| {
        let mut input = InputValue::new(argument.name.as_str(), type_ref(&argument.ty));
        if let Some(description) = &argument.description {
            input = input.description(description.as_str());
        }
        generated.argument(input)
    })
}

fn element_id(record: &NodeRecord) -> async_graphql::Result<String> {
    record
        .id
        .clone()
        .ok_or_else(|| async_graphql::Error::new("Node was returned without an element id"))
}

/// `TAggregateSelection { count: Int! }`.
pub(super) fn aggregate_selection(node: &NodeType) -> Object {
    Object::new(super::aggregate_selection(node)).field(Field::new(
        "count",
        TypeRef::named_nn(TypeRef::INT),
        |ctx| {
            FieldFuture::new(async move {
                let selection = ctx.parent_value.try_downcast_ref::<AggregateSelection>()?;
                Ok(Some(FieldValue::value(selection.count)))
            })
        },
    ))
}

/// `CreateTsMutationResponse` / `UpdateTsMutationResponse { ts: [T!]! }`.
pub(super) fn mutation_response(type_name: String, node: &NodeType) -> Object {
    Object::new(type_name).field(Field::new(
        node.plural.as_str(),
        TypeRef::named_nn_list_nn(node.name.as_str()),
        |ctx| {
            FieldFuture::new(async move {
                let payload = ctx.parent_value.try_downcast_ref::<MutationPayload>()?;
                Ok(Some(FieldValue::list(
                    payload.nodes.iter().cloned().map(FieldValue::owned_any),
                )))
            })
        },
    ))
}

/// `DeleteInfo { nodesDeleted: Int! }`.
pub(super) fn delete_info() -> Object {
    Object::new(DELETE_INFO).field(Field::new(
        "nodesDeleted",
        TypeRef::named_nn(TypeRef::INT),
        |ctx| {
            FieldFuture::new(async move {
                let info = ctx.parent_value.try_downcast_ref::<DeleteInfo>()?;
                Ok(Some(FieldValue::value(info.nodes_deleted)))
            })
        },
    ))
}
