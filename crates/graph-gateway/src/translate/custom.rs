//! `@cypher` fields.
//!
//! The user statement runs inside a `CALL` subquery. Declared arguments are
//! bound as parameters under their own names so the statement can refer to
//! them as `$name`; arguments the client left out are bound to null.

use serde_json::{Map, Value};

use super::{TranslateError, RESULT_COLUMN};
use crate::cypher::{escape, node_projection, CypherQuery};
use crate::typedefs::{Argument, CypherStatement, FieldKind, NodeField, RootField, TypeDefs};

/// Parameter carrying the element id of the node a field is resolved on.
const THIS_ID: &str = "__this_id";

/// `@cypher` field on a node, evaluated with `this` bound to the parent.
pub fn custom_field(
    defs: &TypeDefs,
    field: &NodeField,
    parent_id: &str,
    args: &Map<String, Value>,
) -> Result<CypherQuery, TranslateError> {
    let FieldKind::Cypher {
        statement,
        arguments,
    } = &field.kind
    else {
        return Err(TranslateError::UnknownNode(field.ty.base.clone()));
    };

    let mut lines = vec![
        "MATCH (this)".to_string(),
        format!("WHERE elementId(this) = ${THIS_ID}"),
        "CALL {".to_string(),
        "WITH this".to_string(),
        body(&statement.statement),
    ];
    lines.push("}".to_string());
    lines.push(result_line(defs, statement, &field.ty.base));

    Ok(bind_arguments(CypherQuery::new(lines.join("\n")), arguments, args)
        .param(THIS_ID, Value::from(parent_id))
        .column(RESULT_COLUMN))
}

/// `@cypher` field on `Query` or `Mutation`.
pub fn custom_root(
    defs: &TypeDefs,
    field: &RootField,
    args: &Map<String, Value>,
) -> Result<CypherQuery, TranslateError> {
    let mut lines = vec!["CALL {".to_string(), body(&field.statement.statement)];
    lines.push("}".to_string());
    lines.push(result_line(defs, &field.statement, &field.ty.base));

    Ok(
        bind_arguments(CypherQuery::new(lines.join("\n")), &field.arguments, args)
            .column(RESULT_COLUMN),
    )
}

/// The statement text as written. Inner lines are left alone so multi-line
/// string literals keep their content.
fn body(statement: &str) -> String {
    statement.trim().to_string()
}

/// Node results are projected like every other node so they resolve through
/// the same object types.
fn result_line(defs: &TypeDefs, statement: &CypherStatement, base: &str) -> String {
    let column = escape(&statement.column);
    if defs.is_node(base) {
        format!("RETURN {} AS {RESULT_COLUMN}", node_projection(&column))
    } else {
        format!("RETURN {column} AS {RESULT_COLUMN}")
    }
}

fn bind_arguments(
    mut query: CypherQuery,
    declared: &[Argument],
    args: &Map<String, Value>,
) -> CypherQuery {
    for argument in declared {
        let value = args.get(&argument.name).cloned().unwrap_or(Value::Null);
        query = query.param(argument.name.clone(), value);
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SDL: &str = r#"
        type Athlete @node(labels: ["athlete"]) {
            name: String!
            teammates: [Athlete!]! @cypher(
                statement: """
                MATCH (this)-[:compete_for]->(:team)<-[:compete_for]-(m:athlete)
                WHERE m <> this
                RETURN m
                """
                columnName: "m"
            )
            gamesPlayed(season: Int): Int @cypher(
                statement: "MATCH (this)-[:compete_in]->(g:game {season: $season}) RETURN count(g) AS n"
                columnName: "n"
            )
        }
        type Query {
            athleteCount: Int! @cypher(statement: "MATCH (a:athlete) RETURN count(a) AS n", columnName: "n")
            topScorers(limit: Int): [Athlete!]! @cypher(
                statement: "MATCH (a:athlete) RETURN a ORDER BY a.points DESC LIMIT $limit"
                columnName: "a"
            )
        }
    "#;

    #[test]
    fn test_node_field_returning_nodes() {
        let defs = TypeDefs::parse(SDL).unwrap();
        let field = defs.node("Athlete").unwrap().field("teammates").unwrap();
        let query = custom_field(&defs, field, "4:abc:1", &Map::new()).unwrap();
        assert_eq!(
            query.text,
            [
                "MATCH (this)",
                "WHERE elementId(this) = $__this_id",
                "CALL {",
                "WITH this",
                "MATCH (this)-[:compete_for]->(:team)<-[:compete_for]-(m:athlete)",
                "WHERE m <> this",
                "RETURN m",
                "}",
                "RETURN m { .*, __id: elementId(m) } AS result",
            ]
            .join("\n")
        );
        assert_eq!(query.params["__this_id"], json!("4:abc:1"));
        assert_eq!(query.columns, vec!["result".to_string()]);
    }

    #[test]
    fn test_node_field_binds_missing_arguments_to_null() {
        let defs = TypeDefs::parse(SDL).unwrap();
        let field = defs.node("Athlete").unwrap().field("gamesPlayed").unwrap();

        let query = custom_field(&defs, field, "4:abc:1", &Map::new()).unwrap();
        assert_eq!(query.params["season"], Value::Null);
        assert!(query.text.ends_with("RETURN n AS result"));

        let mut args = Map::new();
        args.insert("season".to_string(), json!(2023));
        let query = custom_field(&defs, field, "4:abc:1", &args).unwrap();
        assert_eq!(query.params["season"], json!(2023));
    }

    #[test]
    fn test_root_field_scalar() {
        let defs = TypeDefs::parse(SDL).unwrap();
        let field = &defs.query_fields[0];
        let query = custom_root(&defs, field, &Map::new()).unwrap();
        assert_eq!(
            query.text,
            "CALL {\nMATCH (a:athlete) RETURN count(a) AS n\n}\nRETURN n AS result"
        );
        assert!(query.params.is_empty());
    }

    #[test]
    fn test_statement_text_is_kept_verbatim() {
        let sdl = r#"
            type Athlete { name: String }
            type Query {
                motto: String @cypher(
                    statement: "RETURN 'first line\n    indented line' AS m   "
                    columnName: "m"
                )
            }
        "#;
        let defs = TypeDefs::parse(sdl).unwrap();
        let query = custom_root(&defs, &defs.query_fields[0], &Map::new()).unwrap();
        assert_eq!(
            query.text,
            "CALL {\nRETURN 'first line\n    indented line' AS m\n}\nRETURN m AS result"
        );
    }

    #[test]
    fn test_root_field_returning_nodes() {
        let defs = TypeDefs::parse(SDL).unwrap();
        let field = defs
            .query_fields
            .iter()
            .find(|f| f.name == "topScorers")
            .unwrap();
        let mut args = Map::new();
        args.insert("limit".to_string(), json!(3));
        let query = custom_root(&defs, field, &args).unwrap();
        assert!(query
            .text
            .ends_with("RETURN a { .*, __id: elementId(a) } AS result"));
        assert_eq!(query.params["limit"], json!(3));
    }
}
