use crate::api::{CatalogApi, CollectionRequest};
use crate::error::Result;
use layerdeck_protocol::{EntitySummary, Query};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Search also matches repository text content (`repotext=true`).
    pub search_repo_text: bool,
}

#[derive(Default)]
struct ListState {
    entities: Vec<EntitySummary>,
    applied_generation: u64,
}

/// Fetches the entity collection for the current query. Every request is
/// tagged with a generation from a monotonically increasing counter; a
/// response lands only if its generation is still the latest issued, so an
/// older in-flight request can never overwrite newer data.
pub struct CollectionFetcher {
    api: Arc<dyn CatalogApi>,
    options: FetchOptions,
    issued: AtomicU64,
    alive: AtomicBool,
    state: Mutex<ListState>,
}

impl CollectionFetcher {
    pub fn new(api: Arc<dyn CatalogApi>, options: FetchOptions) -> Self {
        Self {
            api,
            options,
            issued: AtomicU64::new(0),
            alive: AtomicBool::new(true),
            state: Mutex::new(ListState::default()),
        }
    }

    pub fn options(&self) -> FetchOptions {
        self.options
    }

    /// Last successfully applied result set.
    pub fn entities(&self) -> Vec<EntitySummary> {
        self.state.lock().expect("list state poisoned").entities.clone()
    }

    pub fn applied_generation(&self) -> u64 {
        self.state
            .lock()
            .expect("list state poisoned")
            .applied_generation
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Marks the fetcher as torn down. Responses arriving afterwards are
    /// dropped without touching state; requests are not actually cancelled.
    pub fn detach(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Issues a fetch for `query` and waits for it to settle.
    pub async fn refresh(&self, query: Query) {
        let generation = self.next_generation();
        self.run_fetch(generation, query).await;
    }

    /// Issues a fetch for `query` as a background task. The generation is
    /// claimed before spawning, so call order decides which request wins.
    pub fn spawn_refresh(self: &Arc<Self>, query: Query) -> tokio::task::JoinHandle<()> {
        let generation = self.next_generation();
        let fetcher = Arc::clone(self);
        tokio::spawn(async move { fetcher.run_fetch(generation, query).await })
    }

    fn next_generation(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn run_fetch(&self, generation: u64, query: Query) {
        let request = CollectionRequest::new(query, self.options);
        let result = self.api.fetch_collection(&request).await;
        self.apply(generation, &request.query, result);
    }

    fn apply(&self, generation: u64, query: &Query, result: Result<Vec<EntitySummary>>) {
        if !self.is_alive() {
            log::debug!("collection torn down; dropping response for generation {generation}");
            return;
        }
        if generation != self.issued.load(Ordering::SeqCst) {
            log::debug!("discarding stale collection response (generation {generation})");
            return;
        }
        match result {
            Ok(entities) => {
                let mut state = self.state.lock().expect("list state poisoned");
                state.entities = entities;
                state.applied_generation = generation;
            }
            Err(err) => {
                // keep the last successfully fetched collection on display
                log::warn!("collection fetch for '{query}' failed: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use async_trait::async_trait;
    use layerdeck_protocol::EntityDetail;
    use tokio::sync::{mpsc, oneshot};

    type Responder = oneshot::Sender<Result<Vec<EntitySummary>>>;

    /// Fake whose collection responses are held until the test releases them,
    /// so completion order is fully controlled.
    struct GatedApi {
        pending: mpsc::UnboundedSender<(CollectionRequest, Responder)>,
    }

    fn gated() -> (
        Arc<GatedApi>,
        mpsc::UnboundedReceiver<(CollectionRequest, Responder)>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(GatedApi { pending: tx }), rx)
    }

    #[async_trait]
    impl CatalogApi for GatedApi {
        async fn fetch_collection(
            &self,
            request: &CollectionRequest,
        ) -> Result<Vec<EntitySummary>> {
            let (tx, rx) = oneshot::channel();
            self.pending
                .send((request.clone(), tx))
                .expect("test dropped request receiver");
            rx.await
                .unwrap_or_else(|_| Err(ApiError::Transport("gate dropped".to_string())))
        }

        async fn fetch_detail(&self, _id: &str) -> Result<EntityDetail> {
            Err(ApiError::Transport("not under test".to_string()))
        }

        async fn delete_entity(&self, _id: &str) -> Result<()> {
            Err(ApiError::Transport("not under test".to_string()))
        }
    }

    fn entity(id: &str, name: &str) -> EntitySummary {
        EntitySummary {
            id: id.to_string(),
            name: name.to_string(),
            repo_url: format!("https://github.com/example/{id}"),
            summary: String::new(),
            owners: vec!["alice".to_string()],
        }
    }

    #[tokio::test]
    async fn stale_response_is_discarded_even_when_it_resolves_last() {
        let (api, mut requests) = gated();
        let fetcher = Arc::new(CollectionFetcher::new(api, FetchOptions::default()));

        let first = fetcher.spawn_refresh(Query::empty());
        let second = fetcher.spawn_refresh(Query::new("abc"));

        let (req1, respond1) = requests.recv().await.unwrap();
        let (req2, respond2) = requests.recv().await.unwrap();
        assert!(req1.query.is_empty());
        assert_eq!(req2.query.as_str(), "abc");

        // newest first, then the stale one
        respond2.send(Ok(vec![entity("2", "filtered")])).unwrap();
        second.await.unwrap();
        respond1.send(Ok(vec![entity("1", "unfiltered")])).unwrap();
        first.await.unwrap();

        let entities = fetcher.entities();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].id, "2");
        assert_eq!(fetcher.applied_generation(), 2);
    }

    #[tokio::test]
    async fn transport_failure_keeps_last_known_good_state() {
        let (api, mut requests) = gated();
        let fetcher = Arc::new(CollectionFetcher::new(api, FetchOptions::default()));

        let ok = fetcher.spawn_refresh(Query::empty());
        let (_, respond) = requests.recv().await.unwrap();
        respond.send(Ok(vec![entity("1", "one")])).unwrap();
        ok.await.unwrap();

        let failing = fetcher.spawn_refresh(Query::new("abc"));
        let (_, respond) = requests.recv().await.unwrap();
        respond
            .send(Err(ApiError::Transport("connection reset".to_string())))
            .unwrap();
        failing.await.unwrap();

        assert_eq!(fetcher.entities()[0].id, "1");
        assert_eq!(fetcher.applied_generation(), 1);
    }

    #[tokio::test]
    async fn detached_fetcher_ignores_late_responses() {
        let (api, mut requests) = gated();
        let fetcher = Arc::new(CollectionFetcher::new(api, FetchOptions::default()));

        let pending = fetcher.spawn_refresh(Query::empty());
        let (_, respond) = requests.recv().await.unwrap();
        fetcher.detach();
        respond.send(Ok(vec![entity("1", "one")])).unwrap();
        pending.await.unwrap();

        assert!(fetcher.entities().is_empty());
        assert_eq!(fetcher.applied_generation(), 0);
    }

    #[tokio::test]
    async fn repo_text_flag_rides_along_with_filtered_requests() {
        let (api, mut requests) = gated();
        let fetcher = Arc::new(CollectionFetcher::new(
            api,
            FetchOptions {
                search_repo_text: true,
            },
        ));

        let unfiltered = fetcher.spawn_refresh(Query::empty());
        let (req, respond) = requests.recv().await.unwrap();
        assert!(!req.repo_text);
        respond.send(Ok(Vec::new())).unwrap();
        unfiltered.await.unwrap();

        let filtered = fetcher.spawn_refresh(Query::new("abc"));
        let (req, respond) = requests.recv().await.unwrap();
        assert!(req.repo_text);
        respond.send(Ok(Vec::new())).unwrap();
        filtered.await.unwrap();
    }
}
