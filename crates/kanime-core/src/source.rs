//! Listing sources: map a descriptor to one catalog request.

use std::future::Future;

use kanime_api::{
    AnimeQuery, AnimeSeason, CatalogEntry, CatalogError, CatalogService, CharacterEntry,
    CharacterQuery, Page, TopFilter, Weekday,
};

use crate::query::QueryDescriptor;
use crate::sanitize::Displayable;

/// Something a paginated listing can be fed from.
pub trait ListingSource: Clone + std::fmt::Debug + Send + Sync + 'static {
    type Item: Displayable + Clone + std::fmt::Debug + Send + 'static;

    /// Fetch the page the descriptor points at.
    fn fetch<S: CatalogService>(
        &self,
        service: &S,
        descriptor: &QueryDescriptor,
    ) -> impl Future<Output = Result<Page<Self::Item>, CatalogError>> + Send;

    /// The concrete catalog query the descriptor resolves to.
    fn describe(&self, descriptor: &QueryDescriptor) -> String;
}

/// Anime listing families.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimeListing {
    /// Top ranking; falls over to search once search-only filters are set.
    Ranked { filter: Option<TopFilter> },
    CurrentSeason,
    UpcomingSeason,
    Season { year: i32, season: AnimeSeason },
    Schedule { day: Option<Weekday> },
}

impl AnimeListing {
    pub fn query(&self, descriptor: &QueryDescriptor) -> AnimeQuery {
        match self {
            Self::Ranked { .. } if descriptor.requires_search() => {
                AnimeQuery::Search(descriptor.to_search_params())
            }
            Self::Ranked { filter } => AnimeQuery::Top(descriptor.to_top_params(*filter)),
            Self::CurrentSeason => AnimeQuery::SeasonNow(descriptor.to_season_params()),
            Self::UpcomingSeason => AnimeQuery::SeasonUpcoming(descriptor.to_season_params()),
            Self::Season { year, season } => AnimeQuery::Season {
                year: *year,
                season: *season,
                params: descriptor.to_season_params(),
            },
            Self::Schedule { day } => AnimeQuery::Schedule(descriptor.to_schedule_params(*day)),
        }
    }
}

impl ListingSource for AnimeListing {
    type Item = CatalogEntry;

    async fn fetch<S: CatalogService>(
        &self,
        service: &S,
        descriptor: &QueryDescriptor,
    ) -> Result<Page<CatalogEntry>, CatalogError> {
        let query = self.query(descriptor);
        service.anime_page(&query).await
    }

    fn describe(&self, descriptor: &QueryDescriptor) -> String {
        self.query(descriptor).endpoint().path()
    }
}

/// Character ranking or search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CharacterListing;

impl CharacterListing {
    pub fn query(&self, descriptor: &QueryDescriptor) -> CharacterQuery {
        if descriptor.query.is_some() || descriptor.letter.is_some() || descriptor.order_by.is_some()
        {
            CharacterQuery::Search(descriptor.to_character_params())
        } else {
            CharacterQuery::Top {
                page: Some(descriptor.page()),
                limit: Some(descriptor.page_size()),
            }
        }
    }
}

impl ListingSource for CharacterListing {
    type Item = CharacterEntry;

    async fn fetch<S: CatalogService>(
        &self,
        service: &S,
        descriptor: &QueryDescriptor,
    ) -> Result<Page<CharacterEntry>, CatalogError> {
        let query = self.query(descriptor);
        service.character_page(&query).await
    }

    fn describe(&self, descriptor: &QueryDescriptor) -> String {
        self.query(descriptor).endpoint().path()
    }
}
