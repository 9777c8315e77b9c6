//! Typed client for the Jikan v4 anime catalog.
//!
//! Raw payloads are normalized into the fixed shapes in [`traits`] before
//! they leave this crate.

pub mod error;
pub mod jikan;
pub mod params;
pub mod traits;

pub use error::CatalogError;
pub use jikan::JikanClient;
pub use params::{
    AiringStatus, AnimeQuery, AnimeSearchParams, CharacterQuery, CharacterSearchParams, Endpoint,
    GenreFilter, MediaType, OrderBy, QueryParams, Rating, ScheduleParams, SeasonParams,
    SortDirection, TopAnimeParams, TopFilter, WatchFeed, Weekday, MAX_PAGE_SIZE,
};
pub use traits::{
    AirDateRange, AnimeDetail, AnimeSeason, ArchiveYear, CatalogEntry, CatalogService,
    CharacterEntry, FeedItem, Genre, Page, RoleAssociation, RoleKind, StreamingLink,
    TaxonomyEntry, VoiceAssociation,
};
