use std::collections::BTreeSet;

use futures::future::join_all;
use kanime_api::{CatalogEntry, CatalogService};

use crate::detail::resolve_summary;
use crate::pagination::Generation;

/// Resolve every id independently. Ids that fail are dropped.
pub async fn resolve_favorites<S: CatalogService>(service: &S, ids: &[u64]) -> Vec<CatalogEntry> {
    let lookups = ids.iter().map(|&id| async move { (id, resolve_summary(service, id).await) });
    join_all(lookups)
        .await
        .into_iter()
        .filter_map(|(id, result)| match result {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(id, error = %e, "dropping unresolvable favorite");
                None
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoritesRequest {
    pub generation: Generation,
    pub ids: Vec<u64>,
}

impl FavoritesRequest {
    pub async fn execute<S: CatalogService>(self, service: &S) -> FavoritesResponse {
        let items = resolve_favorites(service, &self.ids).await;
        FavoritesResponse {
            generation: self.generation,
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FavoritesResponse {
    pub generation: Generation,
    pub items: Vec<CatalogEntry>,
}

/// The favorites grid. Re-resolved whenever the set changes while shown.
#[derive(Debug, Default)]
pub struct FavoritesView {
    generation: Generation,
    items: Vec<CatalogEntry>,
    loading: bool,
}

impl FavoritesView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start resolving `ids`. An empty set clears the view without a fetch.
    pub fn begin(&mut self, ids: &BTreeSet<u64>) -> Option<FavoritesRequest> {
        self.generation = self.generation.next();
        if ids.is_empty() {
            self.items.clear();
            self.loading = false;
            return None;
        }
        self.loading = true;
        Some(FavoritesRequest {
            generation: self.generation,
            ids: ids.iter().copied().collect(),
        })
    }

    pub fn complete(&mut self, response: FavoritesResponse) -> bool {
        if response.generation != self.generation {
            return false;
        }
        self.items = response.items;
        self.loading = false;
        true
    }

    /// Hide the view; pending resolves become stale.
    pub fn close(&mut self) {
        self.generation = self.generation.next();
        self.loading = false;
    }

    pub fn items(&self) -> &[CatalogEntry] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{entry, FakeCatalog};

    #[tokio::test]
    async fn test_failed_ids_are_dropped() {
        let mut catalog = FakeCatalog::default();
        catalog.anime.insert(5, entry(5, "Bakemonogatari"));
        catalog.anime.insert(9, entry(9, "Nichijou"));
        catalog.failing.insert(9);

        let items = resolve_favorites(&catalog, &[5, 9]).await;
        assert_eq!(items.iter().map(|e| e.id).collect::<Vec<_>>(), vec![5]);
    }

    #[test]
    fn test_empty_set_issues_no_fetch() {
        let mut view = FavoritesView::new();
        assert!(view.begin(&BTreeSet::new()).is_none());
        assert!(!view.is_loading());
        assert!(view.items().is_empty());
    }

    #[tokio::test]
    async fn test_newer_resolve_wins() {
        let mut catalog = FakeCatalog::default();
        catalog.anime.insert(1, entry(1, "Ping Pong the Animation"));
        catalog.anime.insert(2, entry(2, "Tatami Galaxy"));

        let mut view = FavoritesView::new();
        let old = view.begin(&[1].into_iter().collect()).unwrap();
        let new = view.begin(&[1, 2].into_iter().collect()).unwrap();

        let new_resp = new.execute(&catalog).await;
        let old_resp = old.execute(&catalog).await;
        assert!(view.complete(new_resp));
        assert!(!view.complete(old_resp));
        assert_eq!(view.items().len(), 2);
        assert!(!view.is_loading());
    }
}
