use kanime_api::{CatalogService, GenreFilter, TaxonomyEntry};

use crate::query::FilterChange;

/// Taxonomy for one filter, most-used first. Empty when unavailable.
pub async fn load_taxonomy<S: CatalogService>(
    service: &S,
    filter: Option<GenreFilter>,
) -> Vec<TaxonomyEntry> {
    match service.genres(filter).await {
        Ok(mut entries) => {
            entries.sort_by(|a, b| b.count.cmp(&a.count));
            entries
        }
        Err(e) => {
            tracing::warn!(error = %e, "genre taxonomy unavailable");
            Vec::new()
        }
    }
}

/// Browsing a genre restricts the home listing to it.
pub fn browse_genre(genre_id: u32) -> FilterChange {
    FilterChange::GenreInclude([genre_id].into_iter().collect())
}
