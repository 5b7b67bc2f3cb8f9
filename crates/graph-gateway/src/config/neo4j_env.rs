use std::fmt;

use serde::Deserialize;

use crate::result_ext::ResultExt;

const PREFIX: &str = "NEO4J_";

/// Connection parameters for the graph database.
///
/// Read from `NEO4J_URL`, `NEO4J_USERNAME` and `NEO4J_PASSWORD`; all three are
/// required. `NEO4J_DATABASE` optionally selects a database other than the
/// server default.
#[derive(Deserialize, Clone)]
pub struct Neo4jEnv {
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub database: Option<String>,
}

impl Neo4jEnv {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed(PREFIX)
            .from_env::<Neo4jEnv>()
            .log("Provide NEO4J_URL, NEO4J_USERNAME and NEO4J_PASSWORD")
    }

    pub fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(PREFIX).from_iter::<_, Neo4jEnv>(vars)
    }
}

impl fmt::Debug for Neo4jEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Neo4jEnv")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}
