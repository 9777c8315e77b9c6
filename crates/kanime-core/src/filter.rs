//! Filter/sort state for one paginated listing page.
//!
//! Owns the descriptor, the listing source and the paginator, and keeps the
//! three view modes consistent: the query is set exactly while searching, and
//! no listing fetch is issued while favorites are shown.

use kanime_api::{CatalogError, CatalogService, Page};

use crate::pagination::{Outcome, Paginator, Ticket};
use crate::query::{FilterChange, QueryDescriptor};
use crate::source::ListingSource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Listing,
    Search,
    Favorites,
}

/// A page request, detached from the state so it can run as a task.
#[derive(Debug, Clone)]
pub struct FetchRequest<L> {
    pub ticket: Ticket,
    pub source: L,
    pub descriptor: QueryDescriptor,
}

impl<L: ListingSource> FetchRequest<L> {
    pub async fn execute<S: CatalogService>(self, service: &S) -> FetchResponse<L::Item> {
        tracing::debug!(
            endpoint = %self.source.describe(&self.descriptor),
            page = self.ticket.page,
            "fetching listing page"
        );
        let result = self.source.fetch(service, &self.descriptor).await;
        FetchResponse {
            ticket: self.ticket,
            result,
        }
    }
}

#[derive(Debug)]
pub struct FetchResponse<T> {
    pub ticket: Ticket,
    pub result: Result<Page<T>, CatalogError>,
}

/// What the presentation layer draws for a listing.
#[derive(Debug, PartialEq)]
pub struct RenderModel<'a, T> {
    pub items: &'a [T],
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub has_next_page: bool,
    pub mode: ViewMode,
    pub active_filters: Vec<String>,
}

#[derive(Debug)]
pub struct FilterState<L: ListingSource> {
    descriptor: QueryDescriptor,
    source: L,
    mode: ViewMode,
    paginator: Paginator<L::Item>,
}

impl<L: ListingSource> FilterState<L> {
    pub fn new(source: L, descriptor: QueryDescriptor) -> Self {
        Self {
            descriptor,
            source,
            mode: ViewMode::Listing,
            paginator: Paginator::new(),
        }
    }

    /// Initial fetch.
    pub fn start(&mut self) -> Option<FetchRequest<L>> {
        self.set_filters()
    }

    /// Reset the results and fetch page 1 of the current descriptor.
    /// Suspended while favorites are shown.
    pub fn set_filters(&mut self) -> Option<FetchRequest<L>> {
        self.descriptor = self.descriptor.at_page(1);
        if self.mode == ViewMode::Favorites {
            return None;
        }
        let ticket = self.paginator.reset();
        Some(self.request(ticket))
    }

    pub fn update(&mut self, change: FilterChange) -> Option<FetchRequest<L>> {
        if let FilterChange::Query(query) = change {
            return self.submit_search(query.as_deref().unwrap_or_default());
        }
        self.descriptor.apply(change);
        self.set_filters()
    }

    /// Tab, season or day change.
    pub fn set_source(&mut self, source: L) -> Option<FetchRequest<L>> {
        self.source = source;
        self.set_filters()
    }

    pub fn load_more(&mut self) -> Option<FetchRequest<L>> {
        if self.mode == ViewMode::Favorites {
            return None;
        }
        let ticket = self.paginator.load_more()?;
        Some(self.request(ticket))
    }

    /// A non-blank query enters search mode; a blank one leaves search or
    /// favorites for the plain listing.
    pub fn submit_search(&mut self, query: &str) -> Option<FetchRequest<L>> {
        let query = query.trim();
        if query.is_empty() {
            if self.mode == ViewMode::Listing {
                return None;
            }
            self.descriptor.apply(FilterChange::Query(None));
            self.mode = ViewMode::Listing;
        } else {
            self.descriptor
                .apply(FilterChange::Query(Some(query.to_string())));
            self.mode = ViewMode::Search;
        }
        self.set_filters()
    }

    /// Suspend the listing. Replies already in flight become stale.
    pub fn enter_favorites(&mut self) {
        if self.mode == ViewMode::Favorites {
            return;
        }
        self.descriptor.query = None;
        self.mode = ViewMode::Favorites;
        self.paginator.abandon();
    }

    /// Leave search or favorites and re-fetch the plain listing.
    pub fn return_to_listing(&mut self) -> Option<FetchRequest<L>> {
        self.descriptor.query = None;
        self.mode = ViewMode::Listing;
        self.set_filters()
    }

    pub fn complete(&mut self, response: FetchResponse<L::Item>) -> Outcome {
        self.paginator.complete(response.ticket, response.result)
    }

    pub fn render(&self) -> RenderModel<'_, L::Item> {
        RenderModel {
            items: self.paginator.items(),
            is_loading: self.paginator.is_loading(),
            is_loading_more: self.paginator.is_loading_more(),
            has_next_page: self.paginator.has_next_page(),
            mode: self.mode,
            active_filters: self.descriptor.active_filters(),
        }
    }

    pub fn descriptor(&self) -> &QueryDescriptor {
        &self.descriptor
    }

    pub fn source(&self) -> &L {
        &self.source
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn paginator(&self) -> &Paginator<L::Item> {
        &self.paginator
    }

    fn request(&self, ticket: Ticket) -> FetchRequest<L> {
        FetchRequest {
            ticket,
            source: self.source.clone(),
            descriptor: self.descriptor.at_page(ticket.page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::Phase;
    use crate::source::AnimeListing;
    use kanime_api::{CatalogEntry, MediaType, TopFilter};

    fn listing() -> FilterState<AnimeListing> {
        FilterState::new(
            AnimeListing::Ranked {
                filter: Some(TopFilter::Airing),
            },
            QueryDescriptor::new(12),
        )
    }

    fn page(ids: &[u64], has_next: bool) -> Result<Page<CatalogEntry>, CatalogError> {
        Ok(Page::new(
            ids.iter()
                .map(|&id| CatalogEntry {
                    id,
                    title: format!("Anime {id}"),
                    ..Default::default()
                })
                .collect(),
            has_next,
        ))
    }

    fn respond(
        state: &mut FilterState<AnimeListing>,
        req: &FetchRequest<AnimeListing>,
        ids: &[u64],
        has_next: bool,
    ) -> Outcome {
        state.complete(FetchResponse {
            ticket: req.ticket,
            result: page(ids, has_next),
        })
    }

    #[test]
    fn test_filter_change_refetches_from_page_one() {
        let mut state = listing();
        let req = state.start().unwrap();
        respond(&mut state, &req, &[1, 2], true);
        let more = state.load_more().unwrap();
        assert_eq!(more.descriptor.page(), 2);
        respond(&mut state, &more, &[3], true);

        let req = state
            .update(FilterChange::MediaType(Some(MediaType::Movie)))
            .unwrap();
        assert_eq!(req.descriptor.page(), 1);
        assert_eq!(req.descriptor.media_type, Some(MediaType::Movie));
        assert!(state.render().items.is_empty());
        assert!(state.render().is_loading);
    }

    #[test]
    fn test_search_mode_tracks_query() {
        let mut state = listing();
        state.start();

        let req = state.submit_search("  Mushishi ").unwrap();
        assert_eq!(state.mode(), ViewMode::Search);
        assert_eq!(req.descriptor.query.as_deref(), Some("Mushishi"));
        assert_eq!(state.source().describe(&req.descriptor), "anime");

        let req = state.submit_search("").unwrap();
        assert_eq!(state.mode(), ViewMode::Listing);
        assert!(req.descriptor.query.is_none());

        // Blank search outside search mode is a no-op.
        assert!(state.submit_search("   ").is_none());
    }

    #[test]
    fn test_query_change_routes_through_search() {
        let mut state = listing();
        state.update(FilterChange::Query(Some("Berserk".into())));
        assert_eq!(state.mode(), ViewMode::Search);
        state.update(FilterChange::Query(None));
        assert_eq!(state.mode(), ViewMode::Listing);
        assert!(state.descriptor().query.is_none());
    }

    #[test]
    fn test_favorites_suspends_listing() {
        let mut state = listing();
        let pending = state.start().unwrap();
        state.enter_favorites();

        // Setters still edit the descriptor but fetch nothing.
        assert!(state
            .update(FilterChange::MediaType(Some(MediaType::Ova)))
            .is_none());
        assert!(state.load_more().is_none());
        assert_eq!(state.descriptor().media_type, Some(MediaType::Ova));

        // The request issued before entering favorites lands as stale.
        assert_eq!(respond(&mut state, &pending, &[1], false), Outcome::Stale);
        assert!(state.render().items.is_empty());

        let req = state.return_to_listing().unwrap();
        assert_eq!(state.mode(), ViewMode::Listing);
        assert_eq!(req.descriptor.media_type, Some(MediaType::Ova));
        respond(&mut state, &req, &[7, 8], false);
        assert_eq!(state.render().items.len(), 2);
    }

    #[test]
    fn test_blank_search_leaves_favorites() {
        let mut state = listing();
        state.start();
        state.enter_favorites();

        let req = state.submit_search("  ").unwrap();
        assert_eq!(state.mode(), ViewMode::Listing);
        assert!(req.descriptor.query.is_none());
        assert!(state.render().is_loading);
    }

    #[test]
    fn test_entering_favorites_clears_search() {
        let mut state = listing();
        state.submit_search("Monster");
        state.enter_favorites();
        assert_eq!(state.mode(), ViewMode::Favorites);
        assert!(state.descriptor().query.is_none());
    }

    #[test]
    fn test_source_change_drops_pending_append() {
        let mut state = listing();
        let req = state.start().unwrap();
        respond(&mut state, &req, &[1, 2], true);
        let more = state.load_more().unwrap();

        let fresh = state
            .set_source(AnimeListing::Ranked {
                filter: Some(TopFilter::ByPopularity),
            })
            .unwrap();
        assert_eq!(respond(&mut state, &more, &[3], true), Outcome::Stale);
        assert_eq!(respond(&mut state, &fresh, &[9], false), Outcome::Applied);

        let render = state.render();
        assert_eq!(render.items.iter().map(|e| e.id).collect::<Vec<_>>(), vec![9]);
        assert!(!render.has_next_page);
        assert_eq!(state.paginator().phase(), Phase::Ready);
    }
}
