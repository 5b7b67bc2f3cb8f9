//! Generated enums and input objects.

use async_graphql::dynamic::{Enum, EnumItem, InputObject, InputValue, TypeRef};

use super::{type_ref, SORT_DIRECTION};
use crate::translate::{operators_for, Operator, NONE_SUFFIX, SOME_SUFFIX};
use crate::typedefs::{EnumType, FieldType, NodeType};

pub(super) fn sort_direction() -> Enum {
    Enum::new(SORT_DIRECTION)
        .description("Ordering of a sort field")
        .item(EnumItem::new("ASC").description("Ascending"))
        .item(EnumItem::new("DESC").description("Descending"))
}

pub(super) fn user_enum(enum_type: &EnumType) -> Enum {
    let mut e = Enum::new(enum_type.name.as_str())
        .items(enum_type.values.iter().map(|v| EnumItem::new(v.as_str())));
    if let Some(description) = &enum_type.description {
        e = e.description(description.as_str());
    }
    e
}

/// `TWhere`: one field per property operator, `_SOME` / `_NONE` per
/// relationship, plus `AND`, `OR` and `NOT`.
pub(super) fn where_input(node: &NodeType) -> InputObject {
    let name = super::where_input(node);
    let mut input = InputObject::new(name.as_str());

    for field in &node.fields {
        for op in operators_for(field) {
            let ty = match op {
                Operator::In | Operator::NotIn => TypeRef::named_nn_list(field.ty.base.as_str()),
                Operator::Includes | Operator::NotIncludes => TypeRef::named(field.ty.base.as_str()),
                _ if field.ty.list => type_ref(&FieldType {
                    nullable: true,
                    ..field.ty.clone()
                }),
                _ => TypeRef::named(field.ty.base.as_str()),
            };
            input = input.field(InputValue::new(
                format!("{}{}", field.name, op.suffix()),
                ty,
            ));
        }
    }

    for field in node.relationship_fields() {
        let target = format!("{}Where", field.ty.base);
        input = input
            .field(
                InputValue::new(format!("{}{SOME_SUFFIX}", field.name), TypeRef::named(&target))
                    .description("Matches when at least one related node matches"),
            )
            .field(
                InputValue::new(format!("{}{NONE_SUFFIX}", field.name), TypeRef::named(&target))
                    .description("Matches when no related node matches"),
            );
    }

    input
        .field(InputValue::new("AND", TypeRef::named_nn_list(name.as_str())))
        .field(InputValue::new("OR", TypeRef::named_nn_list(name.as_str())))
        .field(InputValue::new("NOT", TypeRef::named(name.as_str())))
}

/// `TSort`, absent when the node has nothing to sort on.
pub(super) fn sort_input(node: &NodeType) -> Option<InputObject> {
    let fields: Vec<_> = node
        .scalar_fields()
        .filter(|(field, _)| !field.ty.list)
        .map(|(field, _)| InputValue::new(field.name.as_str(), TypeRef::named(SORT_DIRECTION)))
        .collect();
    if fields.is_empty() {
        return None;
    }
    Some(
        fields
            .into_iter()
            .fold(InputObject::new(super::sort_input(node)), InputObject::field),
    )
}

pub(super) fn options_input(node: &NodeType) -> InputObject {
    let mut input = InputObject::new(super::options_input(node));
    if node.scalar_fields().any(|(field, _)| !field.ty.list) {
        input = input.field(
            InputValue::new("sort", TypeRef::named_nn_list(super::sort_input(node)))
                .description("One field per entry, applied in list order"),
        );
    }
    input
        .field(InputValue::new("limit", TypeRef::named(TypeRef::INT)))
        .field(InputValue::new("offset", TypeRef::named(TypeRef::INT)))
}

/// `TCreateInput`: properties with their declared types, and relationship
/// fields taking a `TargetWhere` that selects the nodes to connect.
pub(super) fn create_input(node: &NodeType) -> Option<InputObject> {
    let mut fields: Vec<InputValue> = node
        .scalar_fields()
        .map(|(field, _)| InputValue::new(field.name.as_str(), type_ref(&field.ty)))
        .collect();
    fields.extend(node.relationship_fields().map(|field| {
        InputValue::new(
            field.name.as_str(),
            TypeRef::named(format!("{}Where", field.ty.base)),
        )
    }));
    if fields.is_empty() {
        return None;
    }
    Some(
        fields
            .into_iter()
            .fold(InputObject::new(super::create_input(node)), InputObject::field),
    )
}

/// `TUpdateInput`: every property, all optional.
pub(super) fn update_input(node: &NodeType) -> Option<InputObject> {
    let fields: Vec<InputValue> = node
        .scalar_fields()
        .map(|(field, _)| {
            let ty = FieldType {
                nullable: true,
                ..field.ty.clone()
            };
            InputValue::new(field.name.as_str(), type_ref(&ty))
        })
        .collect();
    if fields.is_empty() {
        return None;
    }
    Some(
        fields
            .into_iter()
            .fold(InputObject::new(super::update_input(node)), InputObject::field),
    )
}

/// `TConnectInput` / `TDisconnectInput`, keyed by relationship field.
pub(super) fn relationship_input(node: &NodeType, name: &str) -> InputObject {
    node.relationship_fields()
        .fold(InputObject::new(name), |input, field| {
            input.field(InputValue::new(
                field.name.as_str(),
                TypeRef::named(format!("{}Where", field.ty.base)),
            ))
        })
}
