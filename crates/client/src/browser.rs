use crate::actions::{EntityActions, Notice};
use crate::api::CatalogApi;
use crate::collection::{CollectionFetcher, FetchOptions};
use crate::detail::DetailCache;
use crate::list::{EntityList, RowView, RowVisibility};
use crate::search::SearchController;
use layerdeck_protocol::Query;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Composition root for one catalog view: wires the search controller into
/// the collection fetcher, shares one detail cache across all rows, and
/// routes mutations back into a confirmed refetch.
pub struct CatalogBrowser {
    search: SearchController,
    fetcher: Arc<CollectionFetcher>,
    cache: Arc<DetailCache>,
    actions: EntityActions,
    list: Mutex<EntityList>,
}

impl CatalogBrowser {
    /// Builds the component tree, issues the initial unfiltered fetch, and
    /// starts reacting to query changes.
    pub fn open(api: Arc<dyn CatalogApi>, options: FetchOptions) -> Arc<Self> {
        let fetcher = Arc::new(CollectionFetcher::new(api.clone(), options));
        let cache = Arc::new(DetailCache::new(api.clone()));
        let browser = Arc::new(Self {
            search: SearchController::new(),
            fetcher: Arc::clone(&fetcher),
            cache,
            actions: EntityActions::new(api),
            list: Mutex::new(EntityList::new()),
        });

        fetcher.spawn_refresh(Query::empty());

        let mut queries = browser.search.subscribe();
        tokio::spawn(async move {
            while queries.changed().await.is_ok() {
                if !fetcher.is_alive() {
                    break;
                }
                let query = queries.borrow_and_update().clone();
                fetcher.spawn_refresh(query);
            }
        });

        browser
    }

    pub fn query(&self) -> Query {
        self.search.query()
    }

    /// Applies a new search input; a changed query triggers a refetch.
    pub fn set_query(&self, raw: &str) -> bool {
        self.search.set_query(raw)
    }

    pub fn clear_query(&self) -> bool {
        self.search.clear()
    }

    /// Refetches the collection with the current query and waits for it.
    pub async fn refresh(&self) {
        self.fetcher.refresh(self.search.query()).await;
    }

    /// Current renderable rows, reconciled against the latest result set.
    pub fn rows(&self) -> Vec<RowView> {
        let entities = self.fetcher.entities();
        let mut list = self.list.lock().expect("row state poisoned");
        list.sync(&entities);
        list.rows(&entities, &self.cache)
    }

    /// Flips one row. The first transition into `Expanded` kicks off the
    /// detail fetch in the background; collapsing never touches the cache.
    pub fn toggle(&self, id: &str) -> RowVisibility {
        let next = self
            .list
            .lock()
            .expect("row state poisoned")
            .toggle(id);
        if next == RowVisibility::Expanded {
            let cache = Arc::clone(&self.cache);
            let id = id.to_string();
            tokio::spawn(async move { cache.ensure_loaded(&id).await });
        }
        next
    }

    /// Waits for the detail fetch of `id` if one is needed. The spawned
    /// variant via [`Self::toggle`] is the normal path; this one exists for
    /// callers that want completion.
    pub async fn ensure_detail(&self, id: &str) {
        self.cache.ensure_loaded(id).await;
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.actions.subscribe()
    }

    /// Deletes `id`. Only a confirmed success mutates the view: the cached
    /// detail is invalidated and the collection refetched, so the row
    /// disappears exactly when the server says it is gone.
    pub async fn delete(&self, id: &str) -> bool {
        if self.actions.delete(id).await {
            self.cache.invalidate(id);
            self.refresh().await;
            true
        } else {
            false
        }
    }

    /// Tears the view down. In-flight requests are not cancelled; their
    /// completions are ignored.
    pub fn close(&self) {
        self.fetcher.detach();
        self.cache.detach();
    }
}
