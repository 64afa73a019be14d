use crate::detail::{DetailCache, DetailState};
use layerdeck_protocol::EntitySummary;
use std::collections::HashSet;

/// Visibility of one row's detail pane. Collapsed rows still carry their
/// cached detail so a reveal can render immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowVisibility {
    Collapsed,
    Expanded,
}

/// One renderable row: the summary, its visibility, and whatever the shared
/// detail cache currently holds for it.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub summary: EntitySummary,
    pub visibility: RowVisibility,
    pub detail: DetailState,
}

/// Per-row expand/collapse state for the collection view. Rows start
/// collapsed; expansion state is independent of whether detail has been
/// fetched and survives collection refreshes as long as the id survives.
#[derive(Default)]
pub struct EntityList {
    expanded: HashSet<String>,
}

impl EntityList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconciles row state with a fresh result set, dropping expansion
    /// state for ids that are no longer listed.
    pub fn sync(&mut self, entities: &[EntitySummary]) {
        let ids: HashSet<&str> = entities.iter().map(|e| e.id.as_str()).collect();
        self.expanded.retain(|id| ids.contains(id.as_str()));
    }

    pub fn visibility(&self, id: &str) -> RowVisibility {
        if self.expanded.contains(id) {
            RowVisibility::Expanded
        } else {
            RowVisibility::Collapsed
        }
    }

    /// Flips a row's visibility and returns the new state. A transition to
    /// `Expanded` is the caller's cue to ensure the detail load; collapsing
    /// is purely visual and leaves the cache alone.
    pub fn toggle(&mut self, id: &str) -> RowVisibility {
        if self.expanded.remove(id) {
            RowVisibility::Collapsed
        } else {
            self.expanded.insert(id.to_string());
            RowVisibility::Expanded
        }
    }

    /// Builds the renderable rows. Detail state is attached regardless of
    /// visibility, so the first expansion after a background fetch shows
    /// data immediately.
    pub fn rows(&self, entities: &[EntitySummary], cache: &DetailCache) -> Vec<RowView> {
        entities
            .iter()
            .map(|summary| RowView {
                summary: summary.clone(),
                visibility: self.visibility(&summary.id),
                detail: cache.state(&summary.id),
            })
            .collect()
    }
}
