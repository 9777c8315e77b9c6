//! Home page carousels and the hero banner.

use kanime_api::{
    AnimeQuery, CatalogEntry, CatalogError, CatalogService, FeedItem, TopAnimeParams, TopFilter,
    WatchFeed,
};

use crate::sanitize::{sanitize, Displayable};

/// Carousel length.
pub const SECTION_LIMIT: usize = 15;
/// The hero is drawn from this many top entries.
pub const HERO_POOL: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeSection {
    RecentEpisodes,
    PopularEpisodes,
    Trending,
    TopAiring,
    LatestTrailers,
    PopularTrailers,
}

impl HomeSection {
    pub const ALL: &'static [HomeSection] = &[
        Self::RecentEpisodes,
        Self::PopularEpisodes,
        Self::Trending,
        Self::TopAiring,
        Self::LatestTrailers,
        Self::PopularTrailers,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::RecentEpisodes => "Recently Released Episodes",
            Self::PopularEpisodes => "Popular Episodes",
            Self::Trending => "Trending Now",
            Self::TopAiring => "Top Airing",
            Self::LatestTrailers => "Latest Trailers",
            Self::PopularTrailers => "Popular Trailers",
        }
    }

    fn source(self) -> SectionSource {
        match self {
            Self::RecentEpisodes => SectionSource::Feed(WatchFeed::RecentEpisodes),
            Self::PopularEpisodes => SectionSource::Feed(WatchFeed::PopularEpisodes),
            Self::Trending => SectionSource::Ranked(TopFilter::ByPopularity),
            Self::TopAiring => SectionSource::Ranked(TopFilter::Airing),
            Self::LatestTrailers => SectionSource::Feed(WatchFeed::RecentPromos),
            Self::PopularTrailers => SectionSource::Feed(WatchFeed::PopularPromos),
        }
    }
}

enum SectionSource {
    Feed(WatchFeed),
    Ranked(TopFilter),
}

/// One carousel card.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionItem {
    pub entry: CatalogEntry,
    pub badge: Option<String>,
}

impl Displayable for SectionItem {
    fn is_displayable(&self) -> bool {
        self.entry.is_displayable()
    }
}

/// `EP <n>` from the second word of the newest episode title, else `NEW`.
pub fn episode_badge(episode_titles: &[String]) -> String {
    episode_titles
        .first()
        .and_then(|title| title.split(' ').nth(1))
        .filter(|n| !n.is_empty())
        .map(|n| format!("EP {n}"))
        .unwrap_or_else(|| "NEW".to_string())
}

fn feed_card(feed: WatchFeed, item: FeedItem) -> SectionItem {
    let badge = if feed.is_episodes() {
        episode_badge(&item.episode_titles)
    } else {
        "PROMO".to_string()
    };
    SectionItem {
        entry: item.entry,
        badge: Some(badge),
    }
}

async fn fetch_section<S: CatalogService>(
    service: &S,
    section: HomeSection,
    limit: usize,
) -> Result<Vec<SectionItem>, CatalogError> {
    let limit = limit.min(SECTION_LIMIT);
    let items = match section.source() {
        SectionSource::Feed(feed) => service
            .watch_feed(feed)
            .await?
            .into_iter()
            .map(|item| feed_card(feed, item))
            .collect(),
        SectionSource::Ranked(filter) => {
            let query = AnimeQuery::Top(TopAnimeParams {
                filter: Some(filter),
                limit: Some(limit as u32),
                ..Default::default()
            });
            service
                .anime_page(&query)
                .await?
                .items
                .into_iter()
                .map(|entry| SectionItem { entry, badge: None })
                .collect()
        }
    };
    let mut items = sanitize(items);
    items.truncate(limit);
    Ok(items)
}

/// Fetch one carousel of at most `limit` (never more than [`SECTION_LIMIT`])
/// items. Failures yield an empty carousel.
pub async fn load_section<S: CatalogService>(
    service: &S,
    section: HomeSection,
    limit: usize,
) -> Vec<SectionItem> {
    match fetch_section(service, section, limit).await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(section = section.title(), error = %e, "home section unavailable");
            Vec::new()
        }
    }
}

/// Choose the hero banner from the first few ranked entries.
pub fn pick_hero(candidates: &[CatalogEntry], seed: u64) -> Option<&CatalogEntry> {
    let pool = &candidates[..candidates.len().min(HERO_POOL)];
    if pool.is_empty() {
        return None;
    }
    pool.get((seed % pool.len() as u64) as usize)
}
