//! Normalized catalog types and the service trait.
//!
//! Every catalog backend maps its raw payloads into these shapes, so the
//! aggregation layer never has to look at wrapped `entry` objects or
//! optional image variants.

use std::future::Future;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::params::{AnimeQuery, CharacterQuery, GenreFilter, WatchFeed};

/// A read-only anime catalog.
pub trait CatalogService: Send + Sync {
    /// One page of anime from any listing endpoint family.
    fn anime_page(
        &self,
        query: &AnimeQuery,
    ) -> impl Future<Output = Result<Page<CatalogEntry>, CatalogError>> + Send;

    /// One page of characters (top ranking or search).
    fn character_page(
        &self,
        query: &CharacterQuery,
    ) -> impl Future<Output = Result<Page<CharacterEntry>, CatalogError>> + Send;

    /// Summary record for a single anime.
    fn anime(&self, id: u64) -> impl Future<Output = Result<CatalogEntry, CatalogError>> + Send;

    /// Full record for a single anime.
    fn anime_full(&self, id: u64)
        -> impl Future<Output = Result<AnimeDetail, CatalogError>> + Send;

    /// Recent/popular episode or promo feed.
    fn watch_feed(
        &self,
        feed: WatchFeed,
    ) -> impl Future<Output = Result<Vec<FeedItem>, CatalogError>> + Send;

    /// Directory of years and the seasons available for each.
    fn season_directory(&self)
        -> impl Future<Output = Result<Vec<ArchiveYear>, CatalogError>> + Send;

    /// Genre, theme or demographic taxonomy.
    fn genres(
        &self,
        filter: Option<GenreFilter>,
    ) -> impl Future<Output = Result<Vec<TaxonomyEntry>, CatalogError>> + Send;

    fn character(&self, id: u64)
        -> impl Future<Output = Result<CharacterEntry, CatalogError>> + Send;

    /// Anime the character appears in, tagged with the role.
    fn character_roles(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Vec<RoleAssociation>, CatalogError>> + Send;

    fn character_voices(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Vec<VoiceAssociation>, CatalogError>> + Send;

    /// Image URLs from the character's picture set.
    fn character_pictures(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Vec<String>, CatalogError>> + Send;
}

/// A page of results plus the pagination metadata that came with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    pub last_visible_page: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, has_next_page: bool) -> Self {
        Self {
            items,
            has_next_page,
            last_visible_page: None,
        }
    }
}

/// One media record from a listing or search surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u64,
    /// Empty when the service sent no title.
    pub title: String,
    pub title_english: Option<String>,
    pub image_url: Option<String>,
    pub score: Option<f32>,
    pub episodes: Option<u32>,
    pub media_type: Option<String>,
    pub status: Option<String>,
    pub rating: Option<String>,
    pub aired: AirDateRange,
    pub genres: Vec<Genre>,
    pub synopsis: Option<String>,
    pub season: Option<AnimeSeason>,
    pub year: Option<i32>,
    pub broadcast: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AirDateRange {
    pub from: Option<String>,
    pub to: Option<String>,
    /// Human-readable range, e.g. "Oct 2023 to Mar 2024".
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Everything the detail overlay shows for a single anime.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimeDetail {
    pub entry: CatalogEntry,
    pub title_japanese: Option<String>,
    pub trailer_url: Option<String>,
    pub duration: Option<String>,
    pub rank: Option<u32>,
    pub popularity: Option<u32>,
    pub members: Option<u32>,
    pub studios: Vec<String>,
    pub background: Option<String>,
    pub streaming: Vec<StreamingLink>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingLink {
    pub name: String,
    pub url: String,
}

/// A watch-feed item with its wrapper removed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub entry: CatalogEntry,
    /// Titles of the episodes attached to the item, newest first.
    pub episode_titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveYear {
    pub year: i32,
    /// In the order the service listed them.
    pub seasons: Vec<AnimeSeason>,
}

/// A genre, theme or demographic with the number of titles tagged with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    pub id: u32,
    pub name: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CharacterEntry {
    pub id: u64,
    pub name: String,
    pub name_kanji: Option<String>,
    pub alternate_names: Vec<String>,
    pub image_url: Option<String>,
    pub favorites_count: u32,
    pub biography: Option<String>,
}

/// How prominent a character is in one anime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleKind {
    Main,
    Supporting,
    Other(String),
}

impl RoleKind {
    /// Exact tag match; anything else is kept verbatim.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Main" => Self::Main,
            "Supporting" => Self::Supporting,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleAssociation {
    pub character_id: u64,
    pub entry_id: u64,
    pub entry_title: String,
    pub entry_image: Option<String>,
    pub role: RoleKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceAssociation {
    pub character_id: u64,
    pub person_id: u64,
    pub person_name: String,
    pub person_image: Option<String>,
    pub language: String,
}

/// Anime season (quarter of the year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimeSeason {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl AnimeSeason {
    pub const ALL: &'static [AnimeSeason] = &[Self::Winter, Self::Spring, Self::Summer, Self::Fall];

    /// Path segment used by the seasons endpoints.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Winter => "winter",
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Fall => "fall",
        }
    }

    /// Determine the current anime season from the current month.
    pub fn current() -> Self {
        let month = chrono::Utc::now().month();
        match month {
            1..=3 => Self::Winter,
            4..=6 => Self::Spring,
            7..=9 => Self::Summer,
            _ => Self::Fall,
        }
    }
}

impl std::str::FromStr for AnimeSeason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "winter" => Ok(Self::Winter),
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "fall" | "autumn" => Ok(Self::Fall),
            other => Err(format!("unknown season: {other}")),
        }
    }
}

impl std::fmt::Display for AnimeSeason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Winter => write!(f, "Winter"),
            Self::Spring => write!(f, "Spring"),
            Self::Summer => write!(f, "Summer"),
            Self::Fall => write!(f, "Fall"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_kind_exact_match() {
        assert_eq!(RoleKind::from_tag("Main"), RoleKind::Main);
        assert_eq!(RoleKind::from_tag("Supporting"), RoleKind::Supporting);
        assert_eq!(
            RoleKind::from_tag("main"),
            RoleKind::Other("main".to_string())
        );
    }

    #[test]
    fn test_season_parse() {
        assert_eq!("Fall".parse::<AnimeSeason>(), Ok(AnimeSeason::Fall));
        assert_eq!("winter".parse::<AnimeSeason>(), Ok(AnimeSeason::Winter));
        assert!("monsoon".parse::<AnimeSeason>().is_err());
    }
}
