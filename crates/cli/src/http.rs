use async_trait::async_trait;
use layerdeck_client::{ApiError, CatalogApi, CollectionRequest, Result};
use layerdeck_protocol::{CatalogRoutes, EntityDetail, EntitySummary};
use reqwest::Client;

/// reqwest-backed implementation of the catalog seam.
pub struct HttpCatalogApi {
    client: Client,
    routes: CatalogRoutes,
}

impl HttpCatalogApi {
    pub fn new(routes: CatalogRoutes) -> Self {
        Self {
            client: Client::new(),
            routes,
        }
    }

    pub fn routes(&self) -> &CatalogRoutes {
        &self.routes
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

/// Non-2xx responses become `ApiError::Status` carrying the body verbatim.
async fn checked(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        code: status.as_u16(),
        body,
    })
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn fetch_collection(&self, request: &CollectionRequest) -> Result<Vec<EntitySummary>> {
        let mut builder = self.client.get(self.routes.collection());
        if !request.query.is_empty() {
            let mut params = vec![("q", request.query.as_str().to_string())];
            if request.repo_text {
                params.push(("repotext", "true".to_string()));
            }
            builder = builder.query(&params);
        }
        let response = checked(builder.send().await.map_err(transport)?).await?;
        let body = response.bytes().await.map_err(transport)?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_detail(&self, id: &str) -> Result<EntityDetail> {
        let response = self
            .client
            .get(self.routes.detail(id))
            .send()
            .await
            .map_err(transport)?;
        let response = checked(response).await?;
        let body = response.bytes().await.map_err(transport)?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn delete_entity(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(self.routes.entity(id))
            .send()
            .await
            .map_err(transport)?;
        checked(response).await.map(|_| ())
    }
}
