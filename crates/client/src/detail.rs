use crate::api::CatalogApi;
use layerdeck_protocol::EntityDetail;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Observable lifecycle of one entity's detail payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    Absent,
    Loading,
    Ready(Arc<EntityDetail>),
}

enum DetailSlot {
    Fetching,
    Ready(Arc<EntityDetail>),
}

/// Fetch-once cache of repository payloads, shared by all rows of a
/// collection. Only the cache mutates its entries; rows read snapshots.
pub struct DetailCache {
    api: Arc<dyn CatalogApi>,
    alive: AtomicBool,
    entries: Mutex<HashMap<String, DetailSlot>>,
}

impl DetailCache {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            alive: AtomicBool::new(true),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn detail(&self, id: &str) -> Option<Arc<EntityDetail>> {
        match self.entries.lock().expect("detail cache poisoned").get(id) {
            Some(DetailSlot::Ready(detail)) => Some(Arc::clone(detail)),
            _ => None,
        }
    }

    pub fn state(&self, id: &str) -> DetailState {
        match self.entries.lock().expect("detail cache poisoned").get(id) {
            None => DetailState::Absent,
            Some(DetailSlot::Fetching) => DetailState::Loading,
            Some(DetailSlot::Ready(detail)) => DetailState::Ready(Arc::clone(detail)),
        }
    }

    /// Drops the cached entry for `id`, in flight or not. Used after a
    /// confirmed deletion; a mid-flight response for an invalidated id is
    /// discarded on arrival.
    pub fn invalidate(&self, id: &str) {
        self.entries.lock().expect("detail cache poisoned").remove(id);
    }

    /// Marks the cache as torn down; late fetch completions are dropped.
    pub fn detach(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Fetches the detail payload for `id` unless it is already present or a
    /// fetch is in flight. Success is permanent for the session; failure
    /// clears the in-flight marker so the next call retries.
    pub async fn ensure_loaded(&self, id: &str) {
        {
            let mut entries = self.entries.lock().expect("detail cache poisoned");
            if entries.contains_key(id) {
                return;
            }
            entries.insert(id.to_string(), DetailSlot::Fetching);
        }

        let result = self.api.fetch_detail(id).await;

        let mut entries = self.entries.lock().expect("detail cache poisoned");
        if !matches!(entries.get(id), Some(DetailSlot::Fetching)) {
            // invalidated while in flight
            log::debug!("dropping detail response for invalidated entity {id}");
            return;
        }
        if !self.alive.load(Ordering::SeqCst) {
            entries.remove(id);
            return;
        }
        match result {
            Ok(detail) => {
                entries.insert(id.to_string(), DetailSlot::Ready(Arc::new(detail)));
            }
            Err(err) => {
                entries.remove(id);
                log::warn!("detail fetch for {id} failed: {err}");
            }
        }
    }
}
