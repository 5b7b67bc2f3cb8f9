//! `TWhere` inputs to Cypher predicates.

use serde_json::{Map, Value};

use super::{invalid, TranslateError};
use crate::cypher::{escape, label_expr, Params};
use crate::typedefs::{Direction, FieldKind, NodeField, NodeType, ScalarKind, TypeDefs};

/// Comparison applied to a stored property. The GraphQL input field for an
/// operator is the property name followed by [`Operator::suffix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    Not,
    In,
    NotIn,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Lt,
    Lte,
    Gt,
    Gte,
    Includes,
    NotIncludes,
}

impl Operator {
    const ALL: [Operator; 14] = [
        Operator::Equals,
        Operator::Not,
        Operator::In,
        Operator::NotIn,
        Operator::Contains,
        Operator::NotContains,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
        Operator::Includes,
        Operator::NotIncludes,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Operator::Equals => "",
            Operator::Not => "_NOT",
            Operator::In => "_IN",
            Operator::NotIn => "_NOT_IN",
            Operator::Contains => "_CONTAINS",
            Operator::NotContains => "_NOT_CONTAINS",
            Operator::StartsWith => "_STARTS_WITH",
            Operator::EndsWith => "_ENDS_WITH",
            Operator::Lt => "_LT",
            Operator::Lte => "_LTE",
            Operator::Gt => "_GT",
            Operator::Gte => "_GTE",
            Operator::Includes => "_INCLUDES",
            Operator::NotIncludes => "_NOT_INCLUDES",
        }
    }

    /// Whether the input value is a list of the property's item type.
    pub fn takes_list(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    fn applies_to(self, kind: &ScalarKind, list: bool) -> bool {
        if list {
            return matches!(
                self,
                Operator::Equals | Operator::Not | Operator::Includes | Operator::NotIncludes
            );
        }
        match self {
            Operator::Equals | Operator::Not => true,
            Operator::In | Operator::NotIn => *kind != ScalarKind::Boolean,
            Operator::Contains
            | Operator::NotContains
            | Operator::StartsWith
            | Operator::EndsWith => kind.is_textual(),
            Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => kind.is_ordered(),
            Operator::Includes | Operator::NotIncludes => false,
        }
    }

    fn predicate(self, property: &str, param: &str) -> String {
        match self {
            Operator::Equals => format!("{property} = {param}"),
            Operator::Not => format!("NOT {property} = {param}"),
            Operator::In => format!("{property} IN {param}"),
            Operator::NotIn => format!("NOT {property} IN {param}"),
            Operator::Contains => format!("{property} CONTAINS {param}"),
            Operator::NotContains => format!("NOT {property} CONTAINS {param}"),
            Operator::StartsWith => format!("{property} STARTS WITH {param}"),
            Operator::EndsWith => format!("{property} ENDS WITH {param}"),
            Operator::Lt => format!("{property} < {param}"),
            Operator::Lte => format!("{property} <= {param}"),
            Operator::Gt => format!("{property} > {param}"),
            Operator::Gte => format!("{property} >= {param}"),
            Operator::Includes => format!("{param} IN {property}"),
            Operator::NotIncludes => format!("NOT {param} IN {property}"),
        }
    }
}

/// Operators offered for a stored property, in declaration order.
pub fn operators_for(field: &NodeField) -> Vec<Operator> {
    match field.scalar() {
        Some(kind) => Operator::ALL
            .into_iter()
            .filter(|op| op.applies_to(kind, field.ty.list))
            .collect(),
        None => Vec::new(),
    }
}

/// Suffixes of relationship filters.
pub(crate) const SOME_SUFFIX: &str = "_SOME";
pub(crate) const NONE_SUFFIX: &str = "_NONE";

enum FilterKey<'a> {
    Property(&'a NodeField, Operator),
    Relationship(&'a NodeField, bool),
    And,
    Or,
    Not,
}

fn resolve_key<'a>(node: &'a NodeType, key: &str) -> Option<FilterKey<'a>> {
    match key {
        "AND" => return Some(FilterKey::And),
        "OR" => return Some(FilterKey::Or),
        "NOT" => return Some(FilterKey::Not),
        _ => {}
    }
    for field in &node.fields {
        let Some(rest) = key.strip_prefix(field.name.as_str()) else {
            continue;
        };
        if field.is_relationship() {
            match rest {
                SOME_SUFFIX => return Some(FilterKey::Relationship(field, true)),
                NONE_SUFFIX => return Some(FilterKey::Relationship(field, false)),
                _ => continue,
            }
        }
        if let Some(op) = operators_for(field).into_iter().find(|op| op.suffix() == rest) {
            return Some(FilterKey::Property(field, op));
        }
    }
    None
}

/// Builds `WHERE` predicates, allocating parameters and subquery variables.
pub struct WhereBuilder<'a> {
    defs: &'a TypeDefs,
    params: &'a mut Params,
    vars: usize,
}

impl<'a> WhereBuilder<'a> {
    pub fn new(defs: &'a TypeDefs, params: &'a mut Params) -> Self {
        Self {
            defs,
            params,
            vars: 0,
        }
    }

    /// Predicate for `filter` against `var`, or `None` when it selects
    /// everything.
    pub fn build(
        &mut self,
        node: &NodeType,
        var: &str,
        filter: Option<&Value>,
    ) -> Result<Option<String>, TranslateError> {
        match filter {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => self.object(node, var, map),
            Some(_) => Err(invalid("where", "expected an object")),
        }
    }

    /// `build` rendered as a `WHERE` line, if there is anything to filter.
    pub fn clause(
        &mut self,
        node: &NodeType,
        var: &str,
        filter: Option<&Value>,
    ) -> Result<Option<String>, TranslateError> {
        Ok(self
            .build(node, var, filter)?
            .map(|predicate| format!("WHERE {predicate}")))
    }

    fn object(
        &mut self,
        node: &NodeType,
        var: &str,
        map: &Map<String, Value>,
    ) -> Result<Option<String>, TranslateError> {
        let mut predicates = Vec::new();
        for (key, value) in map {
            let resolved = resolve_key(node, key).ok_or_else(|| TranslateError::UnknownFilter {
                node: node.name.clone(),
                key: key.clone(),
            })?;
            let predicate = match resolved {
                FilterKey::Property(field, op) => Some(self.property(var, field, op, value)),
                // Null relationship filters constrain nothing.
                FilterKey::Relationship(..) if value.is_null() => None,
                FilterKey::Relationship(field, some) => {
                    self.relationship(var, field, some, value)?
                }
                FilterKey::And => self.logical(node, var, key, value, " AND ")?,
                FilterKey::Or => self.logical(node, var, key, value, " OR ")?,
                FilterKey::Not => self
                    .build(node, var, Some(value))?
                    .map(|inner| format!("NOT ({inner})")),
            };
            predicates.extend(predicate);
        }
        Ok(join(predicates, " AND "))
    }

    fn property(&mut self, var: &str, field: &NodeField, op: Operator, value: &Value) -> String {
        let property = format!("{var}.{}", escape(&field.name));
        if value.is_null() {
            match op {
                Operator::Equals => return format!("{property} IS NULL"),
                Operator::Not => return format!("{property} IS NOT NULL"),
                _ => {}
            }
        }
        let param = self
            .params
            .add(&format!("{var}_{}", field.name), value.clone());
        op.predicate(&property, &param)
    }

    fn relationship(
        &mut self,
        var: &str,
        field: &NodeField,
        some: bool,
        value: &Value,
    ) -> Result<Option<String>, TranslateError> {
        let FieldKind::Relationship {
            rel_type,
            direction,
        } = &field.kind
        else {
            return Ok(None);
        };
        let defs = self.defs;
        let target = defs
            .node(&field.ty.base)
            .ok_or_else(|| TranslateError::UnknownNode(field.ty.base.clone()))?;

        let other = format!("{var}_{}{}", field.name, self.vars);
        self.vars += 1;

        let pattern = relationship_pattern(var, rel_type, *direction, &other, &target.labels, None);
        let inner = match self.build(target, &other, Some(value))? {
            Some(predicate) => format!("EXISTS {{ MATCH {pattern} WHERE {predicate} }}"),
            None => format!("EXISTS {{ MATCH {pattern} }}"),
        };
        Ok(Some(if some { inner } else { format!("NOT {inner}") }))
    }

    fn logical(
        &mut self,
        node: &NodeType,
        var: &str,
        key: &str,
        value: &Value,
        separator: &str,
    ) -> Result<Option<String>, TranslateError> {
        let items: Vec<&Value> = match value {
            Value::Null => return Ok(None),
            Value::Array(items) => items.iter().collect(),
            Value::Object(_) => vec![value],
            _ => return Err(invalid(key, "expected a list of filters")),
        };
        let mut parts = Vec::new();
        for item in items {
            parts.extend(self.build(node, var, Some(item))?);
        }
        Ok(join(parts, separator))
    }
}

/// `(from)-[rel:TYPE]->(to:Labels)` honouring the declared direction.
pub(crate) fn relationship_pattern(
    from: &str,
    rel_type: &str,
    direction: Direction,
    to: &str,
    to_labels: &[String],
    rel_var: Option<&str>,
) -> String {
    let rel = format!("[{}:{}]", rel_var.unwrap_or(""), escape(rel_type));
    let to = format!("({to}{})", label_expr(to_labels));
    match direction {
        Direction::Out => format!("({from})-{rel}->{to}"),
        Direction::In => format!("({from})<-{rel}-{to}"),
    }
}

fn join(parts: Vec<String>, separator: &str) -> Option<String> {
    match parts.len() {
        0 => None,
        1 => parts.into_iter().next(),
        _ => Some(
            parts
                .iter()
                .map(|p| format!("({p})"))
                .collect::<Vec<_>>()
                .join(separator),
        ),
    }
}
