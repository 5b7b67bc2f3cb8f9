//! Parameterised Cypher statements.

use serde_json::{Map, Value};

/// A Cypher statement ready to hand to a [`crate::driver::GraphDriver`].
#[derive(Debug, Clone, PartialEq)]
pub struct CypherQuery {
    /// Statement text. User values only ever appear as `$param` references.
    pub text: String,
    /// Parameter values keyed by name.
    pub params: Map<String, Value>,
    /// Result columns the caller wants decoded from each row.
    pub columns: Vec<String>,
}

impl CypherQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Map::new(),
            columns: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    pub fn with_params(mut self, params: Params) -> Self {
        self.params.extend(params.into_inner());
        self
    }
}

/// Allocates unique parameter names while a statement is being built.
#[derive(Debug, Default)]
pub struct Params {
    values: Map<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under a fresh name derived from `hint` and return the
    /// `$name` reference to splice into the statement.
    pub fn add(&mut self, hint: &str, value: Value) -> String {
        let base: String = hint
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let name = format!("{}_{}", base, self.values.len());
        self.values.insert(name.clone(), value);
        format!("${name}")
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.values
    }
}

/// Quote a label, relationship type, property or variable name.
///
/// Simple identifiers are left alone; anything else is wrapped in backticks
/// with embedded backticks doubled.
pub fn escape(name: &str) -> String {
    let mut chars = name.chars();
    let simple = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('`', "``"))
    }
}

/// `:A:B` label expression for a node pattern.
pub fn label_expr(labels: &[String]) -> String {
    labels.iter().map(|l| format!(":{}", escape(l))).collect()
}

/// Map projection returning every property plus the element id.
pub fn node_projection(var: &str) -> String {
    format!("{var} {{ .*, __id: elementId({var}) }}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escape_simple_identifiers() {
        assert_eq!(escape("athlete"), "athlete");
        assert_eq!(escape("name_short"), "name_short");
        assert_eq!(escape("_private"), "_private");
    }

    #[test]
    fn test_escape_quotes_everything_else() {
        assert_eq!(escape("compete for"), "`compete for`");
        assert_eq!(escape("1st"), "`1st`");
        assert_eq!(escape("a`b"), "`a``b`");
        assert_eq!(escape(""), "``");
    }

    #[test]
    fn test_label_expr() {
        let labels = vec!["athlete".to_string(), "Person Record".to_string()];
        assert_eq!(label_expr(&labels), ":athlete:`Person Record`");
    }

    #[test]
    fn test_params_are_unique() {
        let mut params = Params::new();
        let a = params.add("this_name", json!("LeBron James"));
        let b = params.add("this_name", json!("Stephen Curry"));
        assert_eq!(a, "$this_name_0");
        assert_eq!(b, "$this_name_1");
        assert_eq!(params.len(), 2);

        let query = CypherQuery::new("RETURN 1").with_params(params);
        assert_eq!(query.params["this_name_1"], json!("Stephen Curry"));
    }

    #[test]
    fn test_params_sanitise_hints() {
        let mut params = Params::new();
        assert_eq!(params.add("team.name-short", json!(1)), "$team_name_short_0");
    }
}
