use layerdeck_protocol::Query;
use tokio::sync::watch;

/// Owns the current search query and publishes changes on a watch channel.
/// No network calls originate here; downstream fetchers subscribe.
pub struct SearchController {
    tx: watch::Sender<Query>,
}

impl SearchController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Query::empty());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<Query> {
        self.tx.subscribe()
    }

    pub fn query(&self) -> Query {
        self.tx.borrow().clone()
    }

    /// Trims the input and applies it. Emits only when the trimmed value
    /// differs from the current query, so repeated keystrokes that yield the
    /// same string never trigger a redundant downstream fetch. Returns
    /// whether a change was published.
    pub fn set_query(&self, raw: &str) -> bool {
        let next = Query::new(raw);
        self.tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                log::debug!("query changed to '{next}'");
                *current = next;
                true
            }
        })
    }

    /// Resets to the unfiltered state.
    pub fn clear(&self) -> bool {
        self.set_query("")
    }
}

impl Default for SearchController {
    fn default() -> Self {
        Self::new()
    }
}
