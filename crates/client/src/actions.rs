use crate::api::CatalogApi;
use std::sync::Arc;
use tokio::sync::broadcast;

/// User-visible outcome of a mutation, published on a broadcast channel so
/// any number of surfaces (snackbar, status line, log) can subscribe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Entity removed; the caller refetches before rendering.
    Removed { id: String },
    /// Server refused the delete; `message` is its response text verbatim.
    DeleteFailed { id: String, message: String },
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::Removed { .. } => f.write_str("Removed"),
            Notice::DeleteFailed { message, .. } => f.write_str(message),
        }
    }
}

/// Issues mutating requests. Never touches list state itself: a successful
/// delete is reported so the owner can invalidate and refetch, a failed one
/// leaves everything as it was.
pub struct EntityActions {
    api: Arc<dyn CatalogApi>,
    notices: broadcast::Sender<Notice>,
}

impl EntityActions {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        let (notices, _) = broadcast::channel(16);
        Self { api, notices }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Deletes `id` and reports the outcome. Returns whether the server
    /// confirmed the deletion; there is no optimistic local removal.
    pub async fn delete(&self, id: &str) -> bool {
        match self.api.delete_entity(id).await {
            Ok(()) => {
                let _ = self.notices.send(Notice::Removed { id: id.to_string() });
                true
            }
            Err(err) => {
                log::warn!("delete of {id} rejected: {err}");
                let _ = self.notices.send(Notice::DeleteFailed {
                    id: id.to_string(),
                    message: err.user_message(),
                });
                false
            }
        }
    }
}
