//! Single-record overlays (anime detail, character detail).
//!
//! Nothing is cached: every open goes back to the catalog. When several
//! opens race, only the most recent one is committed.

use kanime_api::{AnimeDetail, CatalogEntry, CatalogError, CatalogService};

use crate::pagination::Generation;

/// Identifies one open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailRequest {
    pub generation: Generation,
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotState<T> {
    Closed,
    Loading { id: u64 },
    Ready(T),
    /// The last open failed; the overlay shows nothing.
    Unavailable { id: u64 },
}

/// Last-requested-wins holder for one overlay.
#[derive(Debug)]
pub struct DetailSlot<T> {
    generation: Generation,
    state: SlotState<T>,
}

impl<T> Default for DetailSlot<T> {
    fn default() -> Self {
        Self {
            generation: Generation::default(),
            state: SlotState::Closed,
        }
    }
}

impl<T> DetailSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, id: u64) -> DetailRequest {
        self.generation = self.generation.next();
        self.state = SlotState::Loading { id };
        DetailRequest {
            generation: self.generation,
            id,
        }
    }

    /// Commit a response if it belongs to the newest open. Returns whether
    /// it was committed.
    pub fn complete(&mut self, request: DetailRequest, result: Result<T, CatalogError>) -> bool {
        if request.generation != self.generation {
            tracing::debug!(id = request.id, "discarding superseded detail");
            return false;
        }
        self.state = match result {
            Ok(record) => SlotState::Ready(record),
            Err(e) => {
                tracing::warn!(id = request.id, error = %e, "detail fetch failed");
                SlotState::Unavailable { id: request.id }
            }
        };
        true
    }

    /// Hide the overlay; a pending reply will be discarded.
    pub fn close(&mut self) {
        self.generation = self.generation.next();
        self.state = SlotState::Closed;
    }

    pub fn state(&self) -> &SlotState<T> {
        &self.state
    }

    pub fn record(&self) -> Option<&T> {
        match &self.state {
            SlotState::Ready(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SlotState::Loading { .. })
    }
}

pub type DetailResolver = DetailSlot<AnimeDetail>;

pub async fn resolve_full<S: CatalogService>(
    service: &S,
    id: u64,
) -> Result<AnimeDetail, CatalogError> {
    service.anime_full(id).await
}

pub async fn resolve_summary<S: CatalogService>(
    service: &S,
    id: u64,
) -> Result<CatalogEntry, CatalogError> {
    service.anime(id).await
}
