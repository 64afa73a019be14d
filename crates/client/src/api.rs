use crate::collection::FetchOptions;
use crate::error::Result;
use async_trait::async_trait;
use layerdeck_protocol::{EntityDetail, EntitySummary, Query};

/// Parameters for one collection fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionRequest {
    pub query: Query,
    /// Ask the server to also match repository text content. Only ever sent
    /// alongside a non-empty query.
    pub repo_text: bool,
}

impl CollectionRequest {
    pub fn new(query: Query, options: FetchOptions) -> Self {
        let repo_text = options.search_repo_text && !query.is_empty();
        Self { query, repo_text }
    }
}

/// The catalog service seam. Implemented over HTTP by the cli crate; tests
/// substitute in-memory fakes.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET <collection>?q=...`: a JSON array of summaries. An empty query
    /// means an unfiltered listing.
    async fn fetch_collection(&self, request: &CollectionRequest) -> Result<Vec<EntitySummary>>;

    /// `GET <detail>/<id>/`: the entity's repository payload.
    async fn fetch_detail(&self, id: &str) -> Result<EntityDetail>;

    /// `DELETE <collection>/<id>/`. A non-2xx response surfaces the body
    /// verbatim via [`crate::ApiError::Status`].
    async fn delete_entity(&self, id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_text_is_dropped_for_empty_queries() {
        let options = FetchOptions {
            search_repo_text: true,
        };
        let request = CollectionRequest::new(Query::empty(), options);
        assert!(!request.repo_text);

        let request = CollectionRequest::new(Query::new("logging"), options);
        assert!(request.repo_text);
    }

    #[test]
    fn repo_text_requires_opt_in() {
        let request = CollectionRequest::new(Query::new("logging"), FetchOptions::default());
        assert!(!request.repo_text);
    }
}
