use std::collections::BTreeSet;

use crate::store::{read_json, write_json, BlobStore, FAVORITES_KEY};

/// The durable favorites set. Ids are kept sorted, so the stored array is
/// a pure function of the set.
#[derive(Debug)]
pub struct FavoritesStore<B> {
    store: B,
    ids: BTreeSet<u64>,
}

impl<B: BlobStore> FavoritesStore<B> {
    /// Absent or malformed data loads as an empty set.
    pub fn load(store: B) -> Self {
        let ids = match read_json::<Vec<u64>>(&store, FAVORITES_KEY) {
            Ok(Some(ids)) => ids.into_iter().collect(),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!(error = %e, "favorites unreadable, starting empty");
                BTreeSet::new()
            }
        };
        tracing::debug!(count = ids.len(), "loaded favorites");
        Self { store, ids }
    }

    /// Flip membership and persist. Returns whether `id` is now a favorite.
    pub fn toggle(&mut self, id: u64) -> bool {
        let now_favorite = if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        };
        self.persist();
        now_favorite
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &BTreeSet<u64> {
        &self.ids
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    /// The underlying blob store, for other keys kept alongside favorites.
    pub fn store_mut(&mut self) -> &mut B {
        &mut self.store
    }

    /// Errors are logged but not propagated.
    fn persist(&mut self) {
        let ids: Vec<u64> = self.ids.iter().copied().collect();
        if let Err(e) = write_json(&mut self.store, FAVORITES_KEY, &ids) {
            tracing::warn!(error = %e, "failed to save favorites");
        }
    }
}
