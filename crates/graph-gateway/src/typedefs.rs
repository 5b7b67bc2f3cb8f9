//! Parsed and validated GraphQL type definitions.
//!
//! Every object type other than `Query` and `Mutation` describes a node in the
//! graph. Fields are either stored properties (scalars and enums),
//! relationships to other node types (`@relationship`) or computed values
//! (`@cypher`). `Query` and `Mutation` may only contain `@cypher` fields.
//!
//! Supported directives:
//!
//! ```graphql
//! type Athlete @node(labels: ["athlete"]) @plural(value: "athletes") {
//!   name: String!
//!   teams: [Team!]! @relationship(type: "compete_for", direction: OUT)
//!   teammates: [Athlete!]! @cypher(
//!     statement: "MATCH (this)-[:compete_for]->(:team)<-[:compete_for]-(m) RETURN m"
//!     columnName: "m"
//!   )
//! }
//! ```

use std::collections::HashSet;

use async_graphql::parser::types::{
    BaseType, ConstDirective, FieldDefinition, InputValueDefinition, Type, TypeDefinition,
    TypeKind, TypeSystemDefinition,
};
use async_graphql::parser::Positioned;
use async_graphql::Value as ConstValue;
use thiserror::Error;

/// Errors raised while reading type definitions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeDefsError {
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Type definitions declare no node types")]
    NoNodeTypes,

    #[error("Type `{0}` is declared more than once")]
    Duplicate(String),

    #[error("Unsupported definition `{name}`: {reason}")]
    Unsupported { name: String, reason: String },

    #[error("Field `{owner}.{field}` references unknown type `{ty}`")]
    UnknownType {
        owner: String,
        field: String,
        ty: String,
    },

    #[error("Field `{owner}.{field}`: {reason}")]
    InvalidField {
        owner: String,
        field: String,
        reason: String,
    },

    #[error("Directive `@{directive}` on `{owner}`: {reason}")]
    InvalidDirective {
        owner: String,
        directive: String,
        reason: String,
    },
}

/// Built-in or user-declared leaf type of a stored property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalarKind {
    Id,
    String,
    Int,
    Float,
    Boolean,
    Enum(String),
}

impl ScalarKind {
    fn builtin(name: &str) -> Option<Self> {
        match name {
            "ID" => Some(ScalarKind::Id),
            "String" => Some(ScalarKind::String),
            "Int" => Some(ScalarKind::Int),
            "Float" => Some(ScalarKind::Float),
            "Boolean" => Some(ScalarKind::Boolean),
            _ => None,
        }
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, ScalarKind::Id | ScalarKind::String)
    }

    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            ScalarKind::Id | ScalarKind::String | ScalarKind::Int | ScalarKind::Float
        )
    }
}

/// Shape of a field or argument type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub base: String,
    pub list: bool,
    pub nullable: bool,
    /// Nullability of list items; meaningless when `list` is false.
    pub item_nullable: bool,
}

impl FieldType {
    fn from_ast(ty: &Type) -> Result<Self, String> {
        match &ty.base {
            BaseType::Named(name) => Ok(Self {
                base: name.to_string(),
                list: false,
                nullable: ty.nullable,
                item_nullable: true,
            }),
            BaseType::List(inner) => match &inner.base {
                BaseType::Named(name) => Ok(Self {
                    base: name.to_string(),
                    list: true,
                    nullable: ty.nullable,
                    item_nullable: inner.nullable,
                }),
                BaseType::List(_) => Err("nested lists are not supported".to_string()),
            },
        }
    }
}

/// Direction of a relationship, seen from the declaring node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

/// A custom Cypher statement and the column that carries its result.
#[derive(Debug, Clone, PartialEq)]
pub struct CypherStatement {
    pub statement: String,
    pub column: String,
}

/// An argument declared on a `@cypher` field.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub description: Option<String>,
    pub ty: FieldType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    Relationship {
        rel_type: String,
        direction: Direction,
    },
    Cypher {
        statement: CypherStatement,
        arguments: Vec<Argument>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeField {
    pub name: String,
    pub description: Option<String>,
    pub ty: FieldType,
    pub kind: FieldKind,
}

impl NodeField {
    pub fn scalar(&self) -> Option<&ScalarKind> {
        match &self.kind {
            FieldKind::Scalar(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self.kind, FieldKind::Relationship { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeType {
    pub name: String,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub plural: String,
    pub fields: Vec<NodeField>,
}

impl NodeType {
    pub fn field(&self, name: &str) -> Option<&NodeField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn scalar_fields(&self) -> impl Iterator<Item = (&NodeField, &ScalarKind)> {
        self.fields.iter().filter_map(|f| f.scalar().map(|k| (f, k)))
    }

    pub fn relationship_fields(&self) -> impl Iterator<Item = &NodeField> {
        self.fields.iter().filter(|f| f.is_relationship())
    }

    pub fn has_relationships(&self) -> bool {
        self.fields.iter().any(NodeField::is_relationship)
    }

    /// Plural with an upper-case first letter, as used in mutation names.
    pub fn pascal_plural(&self) -> String {
        pascal(&self.plural)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<String>,
}

/// A `@cypher` field declared on `Query` or `Mutation`.
#[derive(Debug, Clone, PartialEq)]
pub struct RootField {
    pub name: String,
    pub description: Option<String>,
    pub ty: FieldType,
    pub statement: CypherStatement,
    pub arguments: Vec<Argument>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeDefs {
    pub nodes: Vec<NodeType>,
    pub enums: Vec<EnumType>,
    pub query_fields: Vec<RootField>,
    pub mutation_fields: Vec<RootField>,
}

impl TypeDefs {
    /// Parse SDL text and validate it against the supported subset.
    pub fn parse(sdl: &str) -> Result<Self, TypeDefsError> {
        let document = async_graphql::parser::parse_schema(sdl)
            .map_err(|e| TypeDefsError::Syntax(e.to_string()))?;

        let mut definitions = Vec::new();
        for definition in document.definitions {
            match definition {
                TypeSystemDefinition::Type(ty) => definitions.push(ty.node),
                TypeSystemDefinition::Schema(_) => {
                    return Err(unsupported("schema", "custom root operation types"))
                }
                TypeSystemDefinition::Directive(d) => {
                    return Err(unsupported(
                        d.node.name.node.as_str(),
                        "directive definitions",
                    ))
                }
            }
        }

        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.name.node.to_string()) {
                return Err(TypeDefsError::Duplicate(def.name.node.to_string()));
            }
            if def.extend {
                return Err(unsupported(def.name.node.as_str(), "type extensions"));
            }
        }

        let enums: Vec<EnumType> = definitions
            .iter()
            .filter_map(|def| match &def.kind {
                TypeKind::Enum(e) => Some(EnumType {
                    name: def.name.node.to_string(),
                    description: description(&def.description),
                    values: e.values.iter().map(|v| v.node.value.node.to_string()).collect(),
                }),
                _ => None,
            })
            .collect();

        let node_names: HashSet<String> = definitions
            .iter()
            .filter(|def| matches!(def.kind, TypeKind::Object(_)) && !is_root(def))
            .map(|def| def.name.node.to_string())
            .collect();
        let enum_names: HashSet<String> = enums.iter().map(|e| e.name.clone()).collect();
        let resolver = TypeResolver {
            nodes: &node_names,
            enums: &enum_names,
        };

        let mut type_defs = TypeDefs {
            enums,
            ..Default::default()
        };

        for def in &definitions {
            let name = def.name.node.as_str();
            match &def.kind {
                TypeKind::Enum(_) => {}
                TypeKind::Object(object) => match name {
                    "Query" => {
                        type_defs.query_fields = root_fields(name, &object.fields, &resolver)?
                    }
                    "Mutation" => {
                        type_defs.mutation_fields = root_fields(name, &object.fields, &resolver)?
                    }
                    "Subscription" => return Err(unsupported(name, "subscriptions")),
                    _ => type_defs.nodes.push(node_type(def, &object.fields, &resolver)?),
                },
                TypeKind::Scalar => return Err(unsupported(name, "custom scalars")),
                TypeKind::Interface(_) => return Err(unsupported(name, "interfaces")),
                TypeKind::Union(_) => return Err(unsupported(name, "unions")),
                TypeKind::InputObject(_) => return Err(unsupported(name, "input objects")),
            }
        }

        if type_defs.nodes.is_empty() {
            return Err(TypeDefsError::NoNodeTypes);
        }

        let mut plurals = HashSet::new();
        for node in &type_defs.nodes {
            if !plurals.insert(node.plural.clone()) {
                return Err(TypeDefsError::Duplicate(node.plural.clone()));
            }
        }

        Ok(type_defs)
    }

    pub fn node(&self, name: &str) -> Option<&NodeType> {
        self.nodes.iter().find(|n| n.name == name)
    }

    pub fn is_node(&self, name: &str) -> bool {
        self.node(name).is_some()
    }
}

struct TypeResolver<'a> {
    nodes: &'a HashSet<String>,
    enums: &'a HashSet<String>,
}

impl TypeResolver<'_> {
    fn scalar(&self, name: &str) -> Option<ScalarKind> {
        ScalarKind::builtin(name).or_else(|| {
            self.enums
                .contains(name)
                .then(|| ScalarKind::Enum(name.to_string()))
        })
    }

    fn is_node(&self, name: &str) -> bool {
        self.nodes.contains(name)
    }
}

fn is_root(def: &TypeDefinition) -> bool {
    matches!(
        def.name.node.as_str(),
        "Query" | "Mutation" | "Subscription"
    )
}

fn unsupported(name: &str, reason: &str) -> TypeDefsError {
    TypeDefsError::Unsupported {
        name: name.to_string(),
        reason: format!("{reason} are not supported"),
    }
}

fn description(desc: &Option<Positioned<String>>) -> Option<String> {
    desc.as_ref().map(|d| d.node.clone())
}

fn find_directive<'a>(
    directives: &'a [Positioned<ConstDirective>],
    name: &str,
) -> Option<&'a ConstDirective> {
    directives
        .iter()
        .map(|d| &d.node)
        .find(|d| d.name.node.as_str() == name)
}

fn string_argument(
    directive: &ConstDirective,
    argument: &str,
    owner: &str,
) -> Result<String, TypeDefsError> {
    match directive.get_argument(argument).map(|v| &v.node) {
        Some(ConstValue::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(_) => Err(invalid_directive(
            owner,
            directive,
            &format!("`{argument}` must be a non-empty string"),
        )),
        None => Err(invalid_directive(
            owner,
            directive,
            &format!("missing argument `{argument}`"),
        )),
    }
}

fn invalid_directive(owner: &str, directive: &ConstDirective, reason: &str) -> TypeDefsError {
    TypeDefsError::InvalidDirective {
        owner: owner.to_string(),
        directive: directive.name.node.to_string(),
        reason: reason.to_string(),
    }
}

fn node_type(
    def: &TypeDefinition,
    fields: &[Positioned<FieldDefinition>],
    resolver: &TypeResolver<'_>,
) -> Result<NodeType, TypeDefsError> {
    let name = def.name.node.to_string();

    let labels = match find_directive(&def.directives, "node") {
        Some(directive) => match directive.get_argument("labels").map(|v| &v.node) {
            Some(ConstValue::List(items)) if !items.is_empty() => items
                .iter()
                .map(|item| match item {
                    ConstValue::String(s) if !s.is_empty() => Ok(s.clone()),
                    _ => Err(invalid_directive(
                        &name,
                        directive,
                        "`labels` must contain non-empty strings",
                    )),
                })
                .collect::<Result<Vec<_>, _>>()?,
            Some(ConstValue::String(s)) if !s.is_empty() => vec![s.clone()],
            _ => {
                return Err(invalid_directive(
                    &name,
                    directive,
                    "`labels` must be a non-empty list of strings",
                ))
            }
        },
        None => vec![name.clone()],
    };

    let plural = match find_directive(&def.directives, "plural") {
        Some(directive) => string_argument(directive, "value", &name)?,
        None => plural(&name),
    };

    if fields.is_empty() {
        return Err(unsupported(&name, "node types without fields"));
    }

    let fields = fields
        .iter()
        .map(|f| node_field(&name, &f.node, resolver))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NodeType {
        name,
        description: description(&def.description),
        labels,
        plural,
        fields,
    })
}

fn node_field(
    owner: &str,
    field: &FieldDefinition,
    resolver: &TypeResolver<'_>,
) -> Result<NodeField, TypeDefsError> {
    let name = field.name.node.to_string();
    let invalid = |reason: &str| TypeDefsError::InvalidField {
        owner: owner.to_string(),
        field: name.clone(),
        reason: reason.to_string(),
    };

    let ty = FieldType::from_ast(&field.ty.node).map_err(|e| invalid(&e))?;

    if let Some(directive) = find_directive(&field.directives, "cypher") {
        check_known_type(owner, &name, &ty, resolver)?;
        return Ok(NodeField {
            description: description(&field.description),
            kind: FieldKind::Cypher {
                statement: cypher_statement(owner, directive)?,
                arguments: arguments(owner, &field.arguments, resolver)?,
            },
            name,
            ty,
        });
    }

    if !field.arguments.is_empty() {
        return Err(invalid("arguments are only supported on @cypher fields"));
    }

    if let Some(directive) = find_directive(&field.directives, "relationship") {
        if !resolver.is_node(&ty.base) {
            return Err(invalid("@relationship fields must reference a node type"));
        }
        let rel_type = string_argument(directive, "type", owner)?;
        let direction = match directive.get_argument("direction").map(|v| &v.node) {
            Some(ConstValue::Enum(d)) if d.as_str() == "OUT" => Direction::Out,
            Some(ConstValue::Enum(d)) if d.as_str() == "IN" => Direction::In,
            Some(ConstValue::String(d)) if d == "OUT" => Direction::Out,
            Some(ConstValue::String(d)) if d == "IN" => Direction::In,
            _ => {
                return Err(invalid_directive(
                    owner,
                    directive,
                    "`direction` must be IN or OUT",
                ))
            }
        };
        return Ok(NodeField {
            name,
            description: description(&field.description),
            ty,
            kind: FieldKind::Relationship {
                rel_type,
                direction,
            },
        });
    }

    if resolver.is_node(&ty.base) {
        return Err(invalid(
            "fields of node type need @relationship or @cypher",
        ));
    }
    match resolver.scalar(&ty.base) {
        Some(kind) => Ok(NodeField {
            name,
            description: description(&field.description),
            ty,
            kind: FieldKind::Scalar(kind),
        }),
        None => Err(TypeDefsError::UnknownType {
            owner: owner.to_string(),
            field: name,
            ty: ty.base,
        }),
    }
}

fn check_known_type(
    owner: &str,
    field: &str,
    ty: &FieldType,
    resolver: &TypeResolver<'_>,
) -> Result<(), TypeDefsError> {
    if resolver.scalar(&ty.base).is_some() || resolver.is_node(&ty.base) {
        Ok(())
    } else {
        Err(TypeDefsError::UnknownType {
            owner: owner.to_string(),
            field: field.to_string(),
            ty: ty.base.clone(),
        })
    }
}

fn cypher_statement(
    owner: &str,
    directive: &ConstDirective,
) -> Result<CypherStatement, TypeDefsError> {
    Ok(CypherStatement {
        statement: string_argument(directive, "statement", owner)?,
        column: string_argument(directive, "columnName", owner)?,
    })
}

fn arguments(
    owner: &str,
    args: &[Positioned<InputValueDefinition>],
    resolver: &TypeResolver<'_>,
) -> Result<Vec<Argument>, TypeDefsError> {
    args.iter()
        .map(|arg| {
            let arg = &arg.node;
            let name = arg.name.node.to_string();
            let ty = FieldType::from_ast(&arg.ty.node).map_err(|reason| {
                TypeDefsError::InvalidField {
                    owner: owner.to_string(),
                    field: name.clone(),
                    reason,
                }
            })?;
            if resolver.scalar(&ty.base).is_none() {
                return Err(TypeDefsError::InvalidField {
                    owner: owner.to_string(),
                    field: name,
                    reason: format!("argument type `{}` must be a scalar or enum", ty.base),
                });
            }
            Ok(Argument {
                name,
                description: description(&arg.description),
                ty,
            })
        })
        .collect()
}

fn root_fields(
    owner: &str,
    fields: &[Positioned<FieldDefinition>],
    resolver: &TypeResolver<'_>,
) -> Result<Vec<RootField>, TypeDefsError> {
    fields
        .iter()
        .map(|field| {
            let field = &field.node;
            let name = field.name.node.to_string();
            let directive = find_directive(&field.directives, "cypher").ok_or_else(|| {
                TypeDefsError::InvalidField {
                    owner: owner.to_string(),
                    field: name.clone(),
                    reason: "root fields must declare @cypher".to_string(),
                }
            })?;
            let ty = FieldType::from_ast(&field.ty.node).map_err(|reason| {
                TypeDefsError::InvalidField {
                    owner: owner.to_string(),
                    field: name.clone(),
                    reason,
                }
            })?;
            check_known_type(owner, &name, &ty, resolver)?;
            Ok(RootField {
                description: description(&field.description),
                statement: cypher_statement(owner, directive)?,
                arguments: arguments(owner, &field.arguments, resolver)?,
                name,
                ty,
            })
        })
        .collect()
}

/// Camel-cased English plural of a type name: `Category` -> `categories`.
pub fn plural(name: &str) -> String {
    let word = lower_first(name);
    let lower = word.to_ascii_lowercase();
    if lower.ends_with('y')
        && !matches!(
            lower.chars().rev().nth(1),
            Some('a' | 'e' | 'i' | 'o' | 'u') | None
        )
    {
        format!("{}ies", &word[..word.len() - 1])
    } else if ["s", "x", "z", "ch", "sh"].iter().any(|s| lower.ends_with(s)) {
        format!("{word}es")
    } else {
        format!("{word}s")
    }
}

/// Upper-case the first character.
pub fn pascal(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPORTS: &str = r#"
        "A professional player"
        type Athlete @node(labels: ["athlete"]) {
            name: String!
            name_short: String
            teams: [Team!]! @relationship(type: "compete_for", direction: OUT)
            agents: [Agent!]! @relationship(type: "represent", direction: IN)
        }

        type Team @node(labels: ["team"]) {
            name: String!
            conference: Conference
            roster: [Athlete!]! @relationship(type: "compete_for", direction: IN)
            rosterSize: Int @cypher(
                statement: "MATCH (this)<-[:compete_for]-(a:athlete) RETURN count(a) AS size"
                columnName: "size"
            )
        }

        type Agent @node(labels: ["agent"]) {
            name: String!
        }

        enum Conference { EAST WEST }

        type Query {
            athleteByName(name: String!): Athlete @cypher(
                statement: "MATCH (a:athlete {name: $name}) RETURN a"
                columnName: "a"
            )
        }
    "#;

    #[test]
    fn test_parse_nodes_and_labels() {
        let defs = TypeDefs::parse(SPORTS).unwrap();
        assert_eq!(defs.nodes.len(), 3);

        let athlete = defs.node("Athlete").unwrap();
        assert_eq!(athlete.labels, vec!["athlete".to_string()]);
        assert_eq!(athlete.plural, "athletes");
        assert_eq!(athlete.description.as_deref(), Some("A professional player"));
        assert_eq!(athlete.scalar_fields().count(), 2);
        assert!(athlete.has_relationships());

        let name = athlete.field("name").unwrap();
        assert_eq!(name.scalar(), Some(&ScalarKind::String));
        assert!(!name.ty.nullable);
    }

    #[test]
    fn test_parse_relationships() {
        let defs = TypeDefs::parse(SPORTS).unwrap();
        let athlete = defs.node("Athlete").unwrap();
        let agents = athlete.field("agents").unwrap();
        assert_eq!(
            agents.kind,
            FieldKind::Relationship {
                rel_type: "represent".to_string(),
                direction: Direction::In,
            }
        );
        assert_eq!(agents.ty.base, "Agent");
        assert!(agents.ty.list);
        assert!(!agents.ty.item_nullable);
    }

    #[test]
    fn test_parse_enums_and_cypher_fields() {
        let defs = TypeDefs::parse(SPORTS).unwrap();
        assert_eq!(defs.enums[0].values, vec!["EAST".to_string(), "WEST".to_string()]);

        let team = defs.node("Team").unwrap();
        assert_eq!(
            team.field("conference").unwrap().scalar(),
            Some(&ScalarKind::Enum("Conference".to_string()))
        );
        match &team.field("rosterSize").unwrap().kind {
            FieldKind::Cypher { statement, arguments } => {
                assert_eq!(statement.column, "size");
                assert!(arguments.is_empty());
            }
            other => panic!("expected cypher field, got {other:?}"),
        }

        assert_eq!(defs.query_fields.len(), 1);
        assert_eq!(defs.query_fields[0].arguments[0].name, "name");
    }

    #[test]
    fn test_parse_mutation_cypher_fields() {
        let defs = TypeDefs::parse(
            r#"
            type Counter { value: Int }
            type Mutation {
                bump(by: Int!): Int! @cypher(
                    statement: "MATCH (c:Counter) SET c.value = c.value + $by RETURN c.value AS v"
                    columnName: "v"
                )
            }
            "#,
        )
        .unwrap();
        assert!(defs.query_fields.is_empty());
        assert_eq!(defs.mutation_fields.len(), 1);

        let bump = &defs.mutation_fields[0];
        assert_eq!(bump.name, "bump");
        assert_eq!(bump.statement.column, "v");
        assert_eq!(bump.arguments[0].name, "by");
        assert!(!bump.ty.nullable);
    }

    #[test]
    fn test_default_label_is_type_name() {
        let defs = TypeDefs::parse("type Game { date: String }").unwrap();
        assert_eq!(defs.nodes[0].labels, vec!["Game".to_string()]);
        assert_eq!(defs.nodes[0].plural, "games");
    }

    #[test]
    fn test_plural_override() {
        let defs =
            TypeDefs::parse(r#"type Person @plural(value: "people") { name: String }"#).unwrap();
        assert_eq!(defs.nodes[0].plural, "people");
        assert_eq!(defs.nodes[0].pascal_plural(), "People");
    }

    #[test]
    fn test_syntax_error() {
        let err = TypeDefs::parse("type Athlete {").unwrap_err();
        assert!(matches!(err, TypeDefsError::Syntax(_)));
    }

    #[test]
    fn test_no_node_types() {
        assert_eq!(
            TypeDefs::parse("enum Side { HOME AWAY }").unwrap_err(),
            TypeDefsError::NoNodeTypes
        );
    }

    #[test]
    fn test_unknown_field_type() {
        let err = TypeDefs::parse("type Game { venue: Venue }").unwrap_err();
        assert_eq!(
            err,
            TypeDefsError::UnknownType {
                owner: "Game".to_string(),
                field: "venue".to_string(),
                ty: "Venue".to_string(),
            }
        );
    }

    #[test]
    fn test_node_field_without_relationship() {
        let err = TypeDefs::parse("type Game { home: Team } type Team { name: String }")
            .unwrap_err();
        assert!(matches!(err, TypeDefsError::InvalidField { ref field, .. } if field == "home"));
    }

    #[test]
    fn test_relationship_requires_direction() {
        let err = TypeDefs::parse(
            r#"type Game { teams: [Team!]! @relationship(type: "compete_in") } type Team { name: String }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TypeDefsError::InvalidDirective { ref directive, .. } if directive == "relationship"));
    }

    #[test]
    fn test_root_fields_require_cypher() {
        let err = TypeDefs::parse("type Game { date: String } type Query { games: [Game] }")
            .unwrap_err();
        assert!(matches!(err, TypeDefsError::InvalidField { ref owner, .. } if owner == "Query"));
    }

    #[test]
    fn test_unsupported_definitions() {
        for sdl in [
            "scalar DateTime type Game { date: String }",
            "interface Named { name: String } type Game { date: String }",
            "input GameInput { date: String } type Game { date: String }",
            "type Game { scores: [[Int]] }",
        ] {
            assert!(TypeDefs::parse(sdl).is_err(), "{sdl} should be rejected");
        }
    }

    #[test]
    fn test_duplicate_plural() {
        let err = TypeDefs::parse(
            r#"type Squad @plural(value: "teams") { name: String } type Team { name: String }"#,
        )
        .unwrap_err();
        assert_eq!(err, TypeDefsError::Duplicate("teams".to_string()));
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural("Athlete"), "athletes");
        assert_eq!(plural("Category"), "categories");
        assert_eq!(plural("Day"), "days");
        assert_eq!(plural("Match"), "matches");
        assert_eq!(plural("Box"), "boxes");
        assert_eq!(plural("AthleteStat"), "athleteStats");
    }
}
