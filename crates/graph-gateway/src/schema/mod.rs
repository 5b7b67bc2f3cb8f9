//! Schema derivation.
//!
//! Builds an executable [`Schema`] from [`TypeDefs`] with the dynamic
//! `async-graphql` API. For a node type `Team` (plural `teams`) it generates:
//!
//! ```graphql
//! type Query {
//!   teams(where: TeamWhere, options: TeamOptions): [Team!]!
//!   teamsAggregate(where: TeamWhere): TeamAggregateSelection!
//! }
//! type Mutation {
//!   createTeams(input: [TeamCreateInput!]!): CreateTeamsMutationResponse!
//!   updateTeams(where: TeamWhere, update: TeamUpdateInput,
//!               connect: TeamConnectInput, disconnect: TeamDisconnectInput): UpdateTeamsMutationResponse!
//!   deleteTeams(where: TeamWhere): DeleteInfo!
//! }
//! ```
//!
//! Resolvers translate their arguments with [`crate::translate`] and run the
//! statement on the driver of the current [`RequestContext`], falling back to
//! the driver registered when the schema was built.

use std::collections::HashSet;
use std::sync::Arc;

use async_graphql::dynamic::{Field, FieldValue, Object, ResolverContext, Schema, TypeRef};
use async_graphql::{Name, Value as GqlValue};
use serde_json::{Map, Value};

use crate::config::SchemaConfig;
use crate::context::RequestContext;
use crate::cypher::CypherQuery;
use crate::driver::{Record, SharedDriver};
use crate::error::{GatewayError, GatewayResult};
use crate::record::NodeRecord;
use crate::typedefs::{Argument, FieldType, NodeField, NodeType, TypeDefs};

mod inputs;
mod objects;
mod roots;

pub(crate) const QUERY: &str = "Query";
pub(crate) const MUTATION: &str = "Mutation";

/// Derive the executable schema. `driver` is registered as schema data and
/// serves requests that carry no [`RequestContext`].
pub fn derive_schema(
    type_defs: TypeDefs,
    driver: SharedDriver,
    config: &SchemaConfig,
) -> GatewayResult<Schema> {
    let defs = Arc::new(type_defs);

    let mut builder = Schema::build(QUERY, Some(MUTATION), None)
        .register(inputs::sort_direction())
        .register(objects::delete_info());
    for enum_type in &defs.enums {
        builder = builder.register(inputs::user_enum(enum_type));
    }

    let mut query = RootBuilder::new(QUERY);
    let mut mutation = RootBuilder::new(MUTATION);

    for node in &defs.nodes {
        builder = builder
            .register(objects::node_object(&defs, node))
            .register(objects::aggregate_selection(node))
            .register(inputs::where_input(node))
            .register(inputs::options_input(node));
        if let Some(sort) = inputs::sort_input(node) {
            builder = builder.register(sort);
        }

        query.add(roots::read_field(&defs, node))?;
        query.add(roots::aggregate_field(&defs, node))?;

        if let Some(create) = inputs::create_input(node) {
            builder = builder.register(create).register(objects::mutation_response(
                create_response(node),
                node,
            ));
            mutation.add(roots::create_field(&defs, node))?;
        }

        let update = inputs::update_input(node);
        let has_update = update.is_some();
        if let Some(update) = update {
            builder = builder.register(update);
        }
        if node.has_relationships() {
            builder = builder
                .register(inputs::relationship_input(node, &connect_input(node)))
                .register(inputs::relationship_input(node, &disconnect_input(node)));
        }
        if has_update || node.has_relationships() {
            builder = builder.register(objects::mutation_response(update_response(node), node));
            mutation.add(roots::update_field(&defs, node, has_update))?;
        }

        mutation.add(roots::delete_field(&defs, node))?;
    }

    for field in &defs.query_fields {
        query.add(roots::custom_root_field(&defs, field))?;
    }
    for field in &defs.mutation_fields {
        mutation.add(roots::custom_root_field(&defs, field))?;
    }

    let (query_fields, mutation_fields) = (query.names.len(), mutation.names.len());
    builder = builder
        .register(query.finish())
        .register(mutation.finish())
        .data(driver);
    if let Some(depth) = config.depth_limit {
        builder = builder.limit_depth(depth);
    }
    if !config.introspection {
        builder = builder.disable_introspection();
    }

    let schema = builder.finish()?;
    tracing::info!(
        nodes = defs.nodes.len(),
        enums = defs.enums.len(),
        query_fields,
        mutation_fields,
        "Schema derived"
    );
    Ok(schema)
}

/// Root object that refuses two fields with the same name, which the dynamic
/// builder would otherwise merge silently.
struct RootBuilder {
    name: &'static str,
    fields: Vec<Field>,
    names: HashSet<String>,
}

impl RootBuilder {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            names: HashSet::new(),
        }
    }

    fn add(&mut self, (name, field): (String, Field)) -> GatewayResult<()> {
        if !self.names.insert(name.clone()) {
            return Err(GatewayError::Schema(format!(
                "`{}.{name}` is defined more than once",
                self.name
            )));
        }
        self.fields.push(field);
        Ok(())
    }

    fn finish(self) -> Object {
        self.fields
            .into_iter()
            .fold(Object::new(self.name), Object::field)
    }
}

// Generated type names.

pub(crate) fn where_input(node: &NodeType) -> String {
    format!("{}Where", node.name)
}

pub(crate) fn sort_input(node: &NodeType) -> String {
    format!("{}Sort", node.name)
}

pub(crate) fn options_input(node: &NodeType) -> String {
    format!("{}Options", node.name)
}

pub(crate) fn create_input(node: &NodeType) -> String {
    format!("{}CreateInput", node.name)
}

pub(crate) fn update_input(node: &NodeType) -> String {
    format!("{}UpdateInput", node.name)
}

pub(crate) fn connect_input(node: &NodeType) -> String {
    format!("{}ConnectInput", node.name)
}

pub(crate) fn disconnect_input(node: &NodeType) -> String {
    format!("{}DisconnectInput", node.name)
}

pub(crate) fn aggregate_selection(node: &NodeType) -> String {
    format!("{}AggregateSelection", node.name)
}

pub(crate) fn create_response(node: &NodeType) -> String {
    format!("Create{}MutationResponse", node.pascal_plural())
}

pub(crate) fn update_response(node: &NodeType) -> String {
    format!("Update{}MutationResponse", node.pascal_plural())
}

pub(crate) const SORT_DIRECTION: &str = "SortDirection";
pub(crate) const DELETE_INFO: &str = "DeleteInfo";

/// GraphQL type of a declared field or argument.
pub(crate) fn type_ref(ty: &FieldType) -> TypeRef {
    let base = TypeRef::Named(ty.base.clone().into());
    let inner = if ty.list {
        let item = if ty.item_nullable {
            base
        } else {
            TypeRef::NonNull(Box::new(base))
        };
        TypeRef::List(Box::new(item))
    } else {
        base
    };
    if ty.nullable {
        inner
    } else {
        TypeRef::NonNull(Box::new(inner))
    }
}

// Resolver plumbing.

fn driver(ctx: &ResolverContext<'_>) -> async_graphql::Result<SharedDriver> {
    if let Some(request) = ctx.data_opt::<RequestContext>() {
        return Ok(request.driver.clone());
    }
    ctx.data::<SharedDriver>().cloned()
}

async fn execute(ctx: &ResolverContext<'_>, query: CypherQuery) -> async_graphql::Result<Vec<Record>> {
    let driver = driver(ctx)?;
    driver.run(query).await.map_err(|e| {
        tracing::warn!(error = %e, field = %ctx.field().name(), "Statement failed");
        async_graphql::Error::new(e.to_string())
    })
}

/// JSON form of an argument, `None` when the client omitted it.
fn arg(ctx: &ResolverContext<'_>, name: &str) -> async_graphql::Result<Option<Value>> {
    match ctx.args.get(name) {
        Some(value) => Ok(Some(value.as_value().clone().into_json()?)),
        None => Ok(None),
    }
}

/// Declared `@cypher` arguments as a JSON map.
fn declared_args(
    ctx: &ResolverContext<'_>,
    declared: &[Argument],
) -> async_graphql::Result<Map<String, Value>> {
    let mut args = Map::new();
    for argument in declared {
        if let Some(value) = arg(ctx, &argument.name)? {
            args.insert(argument.name.clone(), value);
        }
    }
    Ok(args)
}

fn lookup_node<'d>(defs: &'d TypeDefs, name: &str) -> async_graphql::Result<&'d NodeType> {
    defs.node(name)
        .ok_or_else(|| async_graphql::Error::new(format!("Unknown node type `{name}`")))
}

fn lookup_field<'d>(
    defs: &'d TypeDefs,
    owner: &str,
    name: &str,
) -> async_graphql::Result<&'d NodeField> {
    lookup_node(defs, owner)?
        .field(name)
        .ok_or_else(|| async_graphql::Error::new(format!("Unknown field `{owner}.{name}`")))
}

fn is_enum(defs: &TypeDefs, name: &str) -> bool {
    defs.enums.iter().any(|e| e.name == name)
}

/// Node projections found in `column` of every row.
fn node_records(rows: Vec<Record>, column: &str) -> Vec<NodeRecord> {
    rows.into_iter()
        .filter_map(|mut row| row.remove(column))
        .filter_map(NodeRecord::from_value)
        .collect()
}

fn nodes_value<'a>(nodes: Vec<NodeRecord>, list: bool) -> Option<FieldValue<'a>> {
    if list {
        Some(FieldValue::list(nodes.into_iter().map(FieldValue::owned_any)))
    } else {
        nodes.into_iter().next().map(FieldValue::owned_any)
    }
}

/// Leaf value for a scalar or enum field. Enum values come back from the
/// database as strings.
fn output_value<'a>(json: Value, as_enum: bool) -> async_graphql::Result<Option<FieldValue<'a>>> {
    if json.is_null() {
        return Ok(None);
    }
    let value = GqlValue::from_json(json)?;
    let value = if as_enum { enum_value(value) } else { value };
    Ok(Some(FieldValue::value(value)))
}

fn enum_value(value: GqlValue) -> GqlValue {
    match value {
        GqlValue::String(s) => GqlValue::Enum(Name::new(s)),
        GqlValue::List(items) => GqlValue::List(items.into_iter().map(enum_value).collect()),
        other => other,
    }
}

/// Result of a `@cypher` field. List fields collect one value per row and
/// flatten rows that already hold a list.
fn cypher_value<'a>(
    defs: &TypeDefs,
    ty: &FieldType,
    rows: Vec<Record>,
) -> async_graphql::Result<Option<FieldValue<'a>>> {
    use crate::translate::RESULT_COLUMN;

    if defs.is_node(&ty.base) {
        return Ok(nodes_value(node_records(rows, RESULT_COLUMN), ty.list));
    }
    let mut values = rows.into_iter().filter_map(|mut row| row.remove(RESULT_COLUMN));
    let json = if ty.list {
        let mut items = Vec::new();
        for value in values {
            match value {
                Value::Array(inner) => items.extend(inner),
                Value::Null => {}
                other => items.push(other),
            }
        }
        Value::Array(items)
    } else {
        values.next().unwrap_or(Value::Null)
    };
    output_value(json, is_enum(defs, &ty.base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::{DriverError, GraphDriver};
    use async_trait::async_trait;
    use axum::http::{HeaderMap, Method};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::context::RequestInfo;

    const SDL: &str = r#"
        enum Position { GUARD FORWARD CENTER }

        type Athlete @node(labels: ["athlete"]) {
            name: String!
            jersey: Int
            position: Position
            teams: [Team!]! @relationship(type: "compete_for", direction: OUT)
            teammateCount: Int @cypher(
                statement: "MATCH (this)-[:compete_for]->(:team)<-[:compete_for]-(m) RETURN count(DISTINCT m) AS n"
                columnName: "n"
            )
        }

        type Team @node(labels: ["team"]) {
            name: String!
            roster: [Athlete!]! @relationship(type: "compete_for", direction: IN)
        }

        type Query {
            athleteCount: Int! @cypher(statement: "MATCH (a:athlete) RETURN count(a) AS n", columnName: "n")
        }
    "#;

    /// Replays canned rows and records every statement it is asked to run.
    #[derive(Default)]
    struct RecordingDriver {
        queries: Mutex<Vec<CypherQuery>>,
        responses: Mutex<VecDeque<Vec<Record>>>,
    }

    impl RecordingDriver {
        fn replying(responses: Vec<Vec<Value>>) -> Arc<Self> {
            let responses = responses
                .into_iter()
                .map(|rows| {
                    rows.into_iter()
                        .map(|row| row.as_object().cloned().unwrap_or_default())
                        .collect()
                })
                .collect();
            Arc::new(Self {
                queries: Mutex::new(Vec::new()),
                responses: Mutex::new(responses),
            })
        }

        fn queries(&self) -> Vec<CypherQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GraphDriver for RecordingDriver {
        async fn run(&self, query: CypherQuery) -> Result<Vec<Record>, DriverError> {
            self.queries.lock().unwrap().push(query);
            Ok(self.responses.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    struct FailingDriver;

    #[async_trait]
    impl GraphDriver for FailingDriver {
        async fn run(&self, _query: CypherQuery) -> Result<Vec<Record>, DriverError> {
            Err(DriverError::Query("connection reset".to_string()))
        }
    }

    fn schema_with(driver: SharedDriver, config: &SchemaConfig) -> Schema {
        derive_schema(TypeDefs::parse(SDL).unwrap(), driver, config).unwrap()
    }

    async fn run(schema: &Schema, query: &str) -> Value {
        let response = schema.execute(query).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        response.data.into_json().unwrap()
    }

    #[tokio::test]
    async fn test_generated_root_fields() {
        let schema = schema_with(RecordingDriver::replying(vec![]), &SchemaConfig::default());
        let data = run(
            &schema,
            "{ __schema { queryType { fields { name } } mutationType { fields { name } } } }",
        )
        .await;
        let names = |root: &str| -> Vec<String> {
            data["__schema"][root]["fields"]
                .as_array()
                .unwrap()
                .iter()
                .map(|f| f["name"].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(
            names("queryType"),
            vec!["athletes", "athletesAggregate", "teams", "teamsAggregate", "athleteCount"]
        );
        assert_eq!(
            names("mutationType"),
            vec![
                "createAthletes",
                "updateAthletes",
                "deleteAthletes",
                "createTeams",
                "updateTeams",
                "deleteTeams"
            ]
        );
    }

    #[tokio::test]
    async fn test_read_with_nested_relationship() {
        let driver = RecordingDriver::replying(vec![
            vec![json!({ "this": { "__id": "4:a:1", "name": "LeBron James", "jersey": 23, "position": "FORWARD" } })],
            vec![json!({ "this": { "__id": "4:t:1", "name": "Lakers" } })],
        ]);
        let schema = schema_with(driver.clone(), &SchemaConfig::default());

        let data = run(
            &schema,
            r#"{ athletes(where: { jersey_GT: 20 }) { name jersey position teams(where: { name: "Lakers" }) { name } } }"#,
        )
        .await;
        assert_eq!(
            data,
            json!({ "athletes": [{
                "name": "LeBron James",
                "jersey": 23,
                "position": "FORWARD",
                "teams": [{ "name": "Lakers" }]
            }] })
        );

        let queries = driver.queries();
        assert_eq!(queries.len(), 2);
        assert!(queries[0].text.starts_with("MATCH (this:athlete)\nWHERE this.jersey > $this_jersey_0"));
        assert_eq!(queries[0].params["this_jersey_0"], json!(20));
        assert!(queries[1].text.contains("MATCH (parent)-[:compete_for]->(this:team)"));
        assert_eq!(queries[1].params["parent_id_0"], json!("4:a:1"));
        assert_eq!(queries[1].params["this_name_1"], json!("Lakers"));
    }

    #[tokio::test]
    async fn test_aggregate_and_custom_fields() {
        // Root query fields may resolve in any order, so both replies carry
        // both columns.
        let row = json!({ "count": 3, "result": 450 });
        let driver = RecordingDriver::replying(vec![vec![row.clone()], vec![row]]);
        let schema = schema_with(driver.clone(), &SchemaConfig::default());

        let data = run(&schema, "{ teamsAggregate { count } athleteCount }").await;
        assert_eq!(data, json!({ "athleteCount": 450, "teamsAggregate": { "count": 3 } }));
        assert_eq!(driver.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_create_with_empty_input_skips_driver() {
        let driver = RecordingDriver::replying(vec![]);
        let schema = schema_with(driver.clone(), &SchemaConfig::default());

        let data = run(&schema, "mutation { createTeams(input: []) { teams { name } } }").await;
        assert_eq!(data, json!({ "createTeams": { "teams": [] } }));
        assert!(driver.queries().is_empty());
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let driver = RecordingDriver::replying(vec![
            vec![json!({ "data": [{ "__id": "4:t:9", "name": "Sonics" }] })],
            vec![json!({ "this": { "__id": "4:t:9", "name": "Thunder" } })],
            vec![json!({ "nodesDeleted": 1 })],
        ]);
        let schema = schema_with(driver.clone(), &SchemaConfig::default());

        let data = run(
            &schema,
            r#"mutation { createTeams(input: [{ name: "Sonics" }]) { teams { name } } }"#,
        )
        .await;
        assert_eq!(data, json!({ "createTeams": { "teams": [{ "name": "Sonics" }] } }));

        let data = run(
            &schema,
            r#"mutation { updateTeams(where: { name: "Sonics" }, update: { name: "Thunder" }) { teams { name } } }"#,
        )
        .await;
        assert_eq!(data, json!({ "updateTeams": { "teams": [{ "name": "Thunder" }] } }));

        let data = run(
            &schema,
            r#"mutation { deleteTeams(where: { name: "Thunder" }) { nodesDeleted } }"#,
        )
        .await;
        assert_eq!(data, json!({ "deleteTeams": { "nodesDeleted": 1 } }));

        let queries = driver.queries();
        assert!(queries[0].text.contains("CREATE (this0:team)"));
        assert!(queries[1].text.contains("SET this += $this_update_1"));
        assert!(queries[2].text.contains("DETACH DELETE this"));
    }

    #[tokio::test]
    async fn test_request_context_driver_is_preferred() {
        let fallback = RecordingDriver::replying(vec![]);
        let per_request = RecordingDriver::replying(vec![vec![]]);
        let schema = schema_with(fallback.clone(), &SchemaConfig::default());

        let context = RequestContext::new(
            RequestInfo {
                method: Method::POST,
                uri: "/graphql".parse().unwrap(),
                headers: HeaderMap::new(),
            },
            per_request.clone(),
        );
        let request = async_graphql::Request::new("{ teams { name } }").data(context);
        let response = schema.execute(request).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        assert!(fallback.queries().is_empty());
        assert_eq!(per_request.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_driver_failure_becomes_graphql_error() {
        let schema = schema_with(Arc::new(FailingDriver), &SchemaConfig::default());
        let response = schema.execute("{ teams { name } }").await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_invalid_filter_becomes_graphql_error() {
        let driver = RecordingDriver::replying(vec![]);
        let schema = schema_with(driver.clone(), &SchemaConfig::default());
        let response = schema
            .execute(r#"{ teams(options: { limit: -1 }) { name } }"#)
            .await;
        assert_eq!(response.errors.len(), 1);
        assert!(driver.queries().is_empty());
    }

    #[tokio::test]
    async fn test_sort_entries_apply_in_list_order() {
        let driver = RecordingDriver::replying(vec![vec![]]);
        let schema = schema_with(driver.clone(), &SchemaConfig::default());

        run(
            &schema,
            "{ athletes(options: { sort: [{ name: DESC }, { jersey: ASC }] }) { name } }",
        )
        .await;
        assert!(driver.queries()[0]
            .text
            .contains("ORDER BY this.name DESC, this.jersey ASC"));

        let response = schema
            .execute("{ athletes(options: { sort: [{ name: DESC, jersey: ASC }] }) { name } }")
            .await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("exactly one field"));
        assert_eq!(driver.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_depth_limit_rejects_deep_queries() {
        let driver = RecordingDriver::replying(vec![vec![]]);
        let config = SchemaConfig {
            depth_limit: Some(3),
            ..SchemaConfig::default()
        };
        let schema = schema_with(driver.clone(), &config);

        let response = schema.execute("{ teams { roster { teams { name } } } }").await;
        assert_eq!(response.errors.len(), 1);
        assert!(response.errors[0].message.contains("nested too deep"));
        assert!(driver.queries().is_empty());

        run(&schema, "{ teams { name } }").await;
        assert_eq!(driver.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_mutation_cypher_field_binds_arguments() {
        let sdl = r#"
            type Counter { value: Int }
            type Mutation {
                bump(by: Int!): Int! @cypher(
                    statement: "MATCH (c:Counter) SET c.value = c.value + $by RETURN c.value AS v"
                    columnName: "v"
                )
            }
        "#;
        let driver = RecordingDriver::replying(vec![vec![json!({ "result": 7 })]]);
        let schema = derive_schema(
            TypeDefs::parse(sdl).unwrap(),
            driver.clone(),
            &SchemaConfig::default(),
        )
        .unwrap();

        let data = run(&schema, "mutation { bump(by: 2) }").await;
        assert_eq!(data, json!({ "bump": 7 }));

        let queries = driver.queries();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].text.contains("SET c.value = c.value + $by"));
        assert!(queries[0].text.ends_with("RETURN v AS result"));
        assert_eq!(queries[0].params, json!({ "by": 2 }).as_object().cloned().unwrap());
    }

    #[tokio::test]
    async fn test_introspection_can_be_disabled() {
        let config = SchemaConfig {
            introspection: false,
            ..SchemaConfig::default()
        };
        let schema = schema_with(RecordingDriver::replying(vec![]), &config);
        let response = schema.execute("{ __schema { queryType { name } } }").await;
        let data = response.data.into_json().unwrap();
        assert!(data["__schema"].is_null());
    }

    #[test]
    fn test_root_field_clash_is_rejected() {
        let sdl = r#"
            type Team { name: String }
            type Query {
                teams: [Team] @cypher(statement: "MATCH (t:Team) RETURN t", columnName: "t")
            }
        "#;
        let err = derive_schema(
            TypeDefs::parse(sdl).unwrap(),
            RecordingDriver::replying(vec![]),
            &SchemaConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GatewayError::Schema(ref m) if m.contains("Query.teams")));
    }

    #[test]
    fn test_type_ref_shapes() {
        let ty = |list, nullable, item_nullable| FieldType {
            base: "Team".to_string(),
            list,
            nullable,
            item_nullable,
        };
        assert_eq!(type_ref(&ty(false, true, true)).to_string(), "Team");
        assert_eq!(type_ref(&ty(false, false, true)).to_string(), "Team!");
        assert_eq!(type_ref(&ty(true, false, false)).to_string(), "[Team!]!");
        assert_eq!(type_ref(&ty(true, true, true)).to_string(), "[Team]");
    }
}
