use serde::{Deserialize, Serialize};

pub const API_BASE: &str = "api";
pub const API_VERSION: &str = "v2";
pub const DETAIL_ENDPOINT: &str = "repos";

/// Path token the editor uses for "add new entity".
pub const NEW_ENTITY_TOKEN: &str = "+";

/// One row of the catalog listing. The result set is replaced wholesale on
/// every successful collection fetch; there is no partial merge.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EntitySummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "repo")]
    pub repo_url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(rename = "owner", default)]
    pub owners: Vec<String>,
}

/// A rule or schema file pulled from an entity's repository. `content` is
/// structured data handed verbatim to an external renderer.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RepoFile {
    pub path: String,
    pub content: serde_json::Value,
}

/// The lazily fetched repository payload for one entity.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EntityDetail {
    #[serde(rename = "readme")]
    pub readme_text: String,
    #[serde(default)]
    pub rules: Vec<RepoFile>,
    #[serde(default)]
    pub schema: Vec<RepoFile>,
}

/// A trimmed search query. Empty means "no filter", which is distinct from
/// "not yet searched" only at the UI layer; the wire treats both the same.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query(String);

impl Query {
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// URL construction for one catalog. Navigation itself is the embedder's
/// concern; this only builds the paths the service exposes.
#[derive(Debug, Clone)]
pub struct CatalogRoutes {
    /// Server origin, e.g. `http://127.0.0.1:8080`. Empty for site-relative paths.
    pub base_url: String,
    /// Entity kind used in permalinks, e.g. `layer`.
    pub kind: String,
    /// Collection endpoint name, e.g. `layers`.
    pub endpoint: String,
}

impl Default for CatalogRoutes {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            kind: "layer".to_string(),
            endpoint: "layers".to_string(),
        }
    }
}

impl CatalogRoutes {
    pub fn with_base(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    fn origin(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    fn api_root(&self) -> String {
        format!("{}/{API_BASE}/{API_VERSION}", self.origin())
    }

    /// `GET` here lists the collection; `q`/`repotext` go in the query string.
    pub fn collection(&self) -> String {
        format!("{}/{}/", self.api_root(), self.endpoint)
    }

    /// Single-entity resource, also the `DELETE` target.
    pub fn entity(&self, id: &str) -> String {
        format!("{}{id}/", self.collection())
    }

    /// Repository payload (readme, rules, schema) for one entity.
    pub fn detail(&self, id: &str) -> String {
        format!("{}/{DETAIL_ENDPOINT}/{id}/", self.api_root())
    }

    pub fn editor(&self, id: &str) -> String {
        format!("{}/editor/{}/{id}/", self.origin(), self.endpoint)
    }

    pub fn create(&self) -> String {
        self.editor(NEW_ENTITY_TOKEN)
    }

    pub fn permalink(&self, id: &str) -> String {
        format!("{}/{}/{id}/", self.origin(), self.kind)
    }
}
