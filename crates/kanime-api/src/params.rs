//! Endpoint paths and sparse query parameters.
//!
//! Optional filters that are `None` are left out of the request entirely.
//! The service treats an explicit empty value differently from an absent
//! one, so nothing is ever sent as a placeholder.

use std::collections::BTreeSet;

use crate::traits::AnimeSeason;

/// Largest `limit` the service accepts.
pub const MAX_PAGE_SIZE: u32 = 25;

/// Declares a string-valued query enum with `as_str`, `FromStr` and `Display`.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(format!("unknown {}: {other}", stringify!($name))),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Anime format.
    MediaType {
        Tv => "tv",
        Movie => "movie",
        Ova => "ova",
        Special => "special",
        Ona => "ona",
        Music => "music",
        Cm => "cm",
        Pv => "pv",
        TvSpecial => "tv_special",
    }
);

wire_enum!(
    /// Ranking flavor for the top-anime endpoint.
    TopFilter {
        Airing => "airing",
        Upcoming => "upcoming",
        ByPopularity => "bypopularity",
        Favorite => "favorite",
    }
);

wire_enum!(
    /// Audience rating.
    Rating {
        G => "g",
        Pg => "pg",
        Pg13 => "pg13",
        R17 => "r17",
        R => "r",
        Rx => "rx",
    }
);

wire_enum!(
    AiringStatus {
        Airing => "airing",
        Complete => "complete",
        Upcoming => "upcoming",
    }
);

wire_enum!(
    /// Sort key. Character search only accepts `mal_id`, `name` and `favorites`.
    OrderBy {
        MalId => "mal_id",
        Title => "title",
        Name => "name",
        StartDate => "start_date",
        EndDate => "end_date",
        Episodes => "episodes",
        Score => "score",
        ScoredBy => "scored_by",
        Rank => "rank",
        Popularity => "popularity",
        Members => "members",
        Favorites => "favorites",
    }
);

wire_enum!(
    SortDirection {
        Asc => "asc",
        Desc => "desc",
    }
);

wire_enum!(
    /// Broadcast day filter for the schedules endpoint.
    Weekday {
        Monday => "monday",
        Tuesday => "tuesday",
        Wednesday => "wednesday",
        Thursday => "thursday",
        Friday => "friday",
        Saturday => "saturday",
        Sunday => "sunday",
        Unknown => "unknown",
        Other => "other",
    }
);

wire_enum!(
    /// Which slice of the genre taxonomy to list.
    GenreFilter {
        Genres => "genres",
        ExplicitGenres => "explicit_genres",
        Themes => "themes",
        Demographics => "demographics",
    }
);

impl Weekday {
    /// The local day of the week.
    pub fn today() -> Self {
        use chrono::Datelike;
        match chrono::Local::now().weekday() {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// Episode and promo feeds. Every item wraps an inner `entry` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchFeed {
    RecentEpisodes,
    PopularEpisodes,
    RecentPromos,
    PopularPromos,
}

impl WatchFeed {
    pub fn is_episodes(self) -> bool {
        matches!(self, Self::RecentEpisodes | Self::PopularEpisodes)
    }
}

// ── Endpoints ───────────────────────────────────────────────────

/// Every catalog path this client knows how to call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    TopAnime,
    AnimeSearch,
    Anime(u64),
    AnimeFull(u64),
    Season { year: i32, season: AnimeSeason },
    SeasonNow,
    SeasonUpcoming,
    SeasonList,
    Schedules,
    Genres,
    Watch(WatchFeed),
    TopCharacters,
    CharacterSearch,
    Character(u64),
    CharacterAnime(u64),
    CharacterVoices(u64),
    CharacterPictures(u64),
}

impl Endpoint {
    /// Path relative to the API base, without a leading slash.
    pub fn path(&self) -> String {
        match self {
            Self::TopAnime => "top/anime".into(),
            Self::AnimeSearch => "anime".into(),
            Self::Anime(id) => format!("anime/{id}"),
            Self::AnimeFull(id) => format!("anime/{id}/full"),
            Self::Season { year, season } => format!("seasons/{year}/{}", season.as_str()),
            Self::SeasonNow => "seasons/now".into(),
            Self::SeasonUpcoming => "seasons/upcoming".into(),
            Self::SeasonList => "seasons".into(),
            Self::Schedules => "schedules".into(),
            Self::Genres => "genres/anime".into(),
            Self::Watch(WatchFeed::RecentEpisodes) => "watch/episodes".into(),
            Self::Watch(WatchFeed::PopularEpisodes) => "watch/episodes/popular".into(),
            Self::Watch(WatchFeed::RecentPromos) => "watch/promos".into(),
            Self::Watch(WatchFeed::PopularPromos) => "watch/promos/popular".into(),
            Self::TopCharacters => "top/characters".into(),
            Self::CharacterSearch => "characters".into(),
            Self::Character(id) => format!("characters/{id}"),
            Self::CharacterAnime(id) => format!("characters/{id}/anime"),
            Self::CharacterVoices(id) => format!("characters/{id}/voices"),
            Self::CharacterPictures(id) => format!("characters/{id}/pictures"),
        }
    }
}

// ── Sparse parameter list ───────────────────────────────────────

/// Ordered list of query pairs containing only the fields that are present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(Vec<(&'static str, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &'static str, value: impl ToString) {
        self.0.push((key, value.to_string()));
    }

    pub fn push_opt<T: ToString>(&mut self, key: &'static str, value: Option<T>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    /// Present flags are always sent as an explicit `true`/`false`.
    pub fn push_flag(&mut self, key: &'static str, value: Option<bool>) {
        if let Some(flag) = value {
            self.push(key, if flag { "true" } else { "false" });
        }
    }

    /// Comma-separated id list; skipped when empty.
    pub fn push_ids<T: ToString>(&mut self, key: &'static str, ids: &BTreeSet<T>) {
        if !ids.is_empty() {
            let joined = ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            self.push(key, joined);
        }
    }

    /// Non-blank text only.
    pub fn push_text(&mut self, key: &'static str, value: Option<&str>) {
        if let Some(text) = value.map(str::trim).filter(|t| !t.is_empty()) {
            self.push(key, text);
        }
    }

    pub fn push_paging(&mut self, page: Option<u32>, limit: Option<u32>) {
        self.push_opt("page", page.filter(|p| *p > 0));
        self.push_opt("limit", limit.map(|l| l.clamp(1, MAX_PAGE_SIZE)));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_pairs(&self) -> &[(&'static str, String)] {
        &self.0
    }
}

// ── Parameter sets per endpoint family ──────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopAnimeParams {
    pub media_type: Option<MediaType>,
    pub filter: Option<TopFilter>,
    pub rating: Option<Rating>,
    pub sfw: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TopAnimeParams {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push_opt("type", self.media_type);
        params.push_opt("filter", self.filter);
        params.push_opt("rating", self.rating);
        params.push_flag("sfw", self.sfw);
        params.push_paging(self.page, self.limit);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimeSearchParams {
    pub query: Option<String>,
    pub unapproved: Option<bool>,
    pub sfw: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub media_type: Option<MediaType>,
    pub status: Option<AiringStatus>,
    pub rating: Option<Rating>,
    pub score: Option<f32>,
    pub min_score: Option<f32>,
    pub max_score: Option<f32>,
    pub genres: BTreeSet<u32>,
    pub genres_exclude: BTreeSet<u32>,
    pub order_by: Option<OrderBy>,
    pub sort: Option<SortDirection>,
    pub letter: Option<char>,
    pub producers: BTreeSet<u32>,
    /// `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl AnimeSearchParams {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push_text("q", self.query.as_deref());
        params.push_flag("unapproved", self.unapproved);
        params.push_flag("sfw", self.sfw);
        params.push_paging(self.page, self.limit);
        params.push_opt("type", self.media_type);
        params.push_opt("status", self.status);
        params.push_opt("rating", self.rating);
        params.push_opt("score", self.score);
        params.push_opt("min_score", self.min_score);
        params.push_opt("max_score", self.max_score);
        params.push_ids("genres", &self.genres);
        params.push_ids("genres_exclude", &self.genres_exclude);
        params.push_opt("order_by", self.order_by);
        params.push_opt("sort", self.sort);
        params.push_opt("letter", self.letter);
        params.push_ids("producers", &self.producers);
        params.push_text("start_date", self.start_date.as_deref());
        params.push_text("end_date", self.end_date.as_deref());
        params
    }
}

/// Parameters shared by the season endpoints (by year, now, upcoming).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonParams {
    /// Entry type filter.
    pub filter: Option<MediaType>,
    pub sfw: Option<bool>,
    pub unapproved: Option<bool>,
    pub continuing: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl SeasonParams {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push_opt("filter", self.filter);
        params.push_flag("sfw", self.sfw);
        params.push_flag("unapproved", self.unapproved);
        params.push_flag("continuing", self.continuing);
        params.push_paging(self.page, self.limit);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleParams {
    pub day: Option<Weekday>,
    pub kids: Option<bool>,
    pub sfw: Option<bool>,
    pub unapproved: Option<bool>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ScheduleParams {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push_opt("filter", self.day);
        params.push_flag("kids", self.kids);
        params.push_flag("sfw", self.sfw);
        params.push_flag("unapproved", self.unapproved);
        params.push_paging(self.page, self.limit);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CharacterSearchParams {
    pub query: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub order_by: Option<OrderBy>,
    pub sort: Option<SortDirection>,
    pub letter: Option<char>,
}

impl CharacterSearchParams {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push_text("q", self.query.as_deref());
        params.push_paging(self.page, self.limit);
        params.push_opt("order_by", self.order_by);
        params.push_opt("sort", self.sort);
        params.push_opt("letter", self.letter);
        params
    }
}

/// A paginated anime listing request.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimeQuery {
    Top(TopAnimeParams),
    Search(AnimeSearchParams),
    Season {
        year: i32,
        season: AnimeSeason,
        params: SeasonParams,
    },
    SeasonNow(SeasonParams),
    SeasonUpcoming(SeasonParams),
    Schedule(ScheduleParams),
}

impl AnimeQuery {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Top(_) => Endpoint::TopAnime,
            Self::Search(_) => Endpoint::AnimeSearch,
            Self::Season { year, season, .. } => Endpoint::Season {
                year: *year,
                season: *season,
            },
            Self::SeasonNow(_) => Endpoint::SeasonNow,
            Self::SeasonUpcoming(_) => Endpoint::SeasonUpcoming,
            Self::Schedule(_) => Endpoint::Schedules,
        }
    }

    pub fn params(&self) -> QueryParams {
        match self {
            Self::Top(p) => p.to_params(),
            Self::Search(p) => p.to_params(),
            Self::Season { params, .. } | Self::SeasonNow(params) | Self::SeasonUpcoming(params) => {
                params.to_params()
            }
            Self::Schedule(p) => p.to_params(),
        }
    }
}

/// A paginated character listing request.
#[derive(Debug, Clone, PartialEq)]
pub enum CharacterQuery {
    Top { page: Option<u32>, limit: Option<u32> },
    Search(CharacterSearchParams),
}

impl CharacterQuery {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Top { .. } => Endpoint::TopCharacters,
            Self::Search(_) => Endpoint::CharacterSearch,
        }
    }

    pub fn params(&self) -> QueryParams {
        match self {
            Self::Top { page, limit } => {
                let mut params = QueryParams::new();
                params.push_paging(*page, *limit);
                params
            }
            Self::Search(p) => p.to_params(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_omitted() {
        let params = TopAnimeParams {
            filter: Some(TopFilter::Airing),
            page: Some(1),
            limit: Some(12),
            ..Default::default()
        }
        .to_params();

        assert_eq!(
            params.as_pairs(),
            &[
                ("filter", "airing".to_string()),
                ("page", "1".to_string()),
                ("limit", "12".to_string()),
            ]
        );
        assert!(params.get("sfw").is_none());
        assert!(params.get("type").is_none());
    }

    #[test]
    fn test_flags_are_explicit_booleans() {
        let params = SeasonParams {
            sfw: Some(true),
            continuing: Some(false),
            ..Default::default()
        }
        .to_params();

        assert_eq!(params.get("sfw"), Some("true"));
        assert_eq!(params.get("continuing"), Some("false"));
        assert!(params.get("unapproved").is_none());
    }

    #[test]
    fn test_limit_is_clamped() {
        let params = CharacterQuery::Top {
            page: Some(2),
            limit: Some(100),
        }
        .params();
        assert_eq!(params.get("limit"), Some("25"));
        assert_eq!(params.get("page"), Some("2"));
    }

    #[test]
    fn test_search_params() {
        let params = AnimeSearchParams {
            query: Some("  frieren ".into()),
            genres: [4, 1].into_iter().collect(),
            genres_exclude: BTreeSet::new(),
            min_score: Some(8.0),
            order_by: Some(OrderBy::Score),
            sort: Some(SortDirection::Desc),
            letter: Some('F'),
            start_date: Some(String::new()),
            ..Default::default()
        }
        .to_params();

        assert_eq!(params.get("q"), Some("frieren"));
        assert_eq!(params.get("genres"), Some("1,4"));
        assert!(params.get("genres_exclude").is_none());
        assert_eq!(params.get("min_score"), Some("8"));
        assert_eq!(params.get("order_by"), Some("score"));
        assert_eq!(params.get("sort"), Some("desc"));
        assert_eq!(params.get("letter"), Some("F"));
        assert!(params.get("start_date").is_none());
    }

    #[test]
    fn test_blank_query_is_omitted() {
        let params = AnimeSearchParams {
            query: Some("   ".into()),
            ..Default::default()
        }
        .to_params();
        assert!(params.is_empty());
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(
            Endpoint::Season {
                year: 2023,
                season: AnimeSeason::Fall
            }
            .path(),
            "seasons/2023/fall"
        );
        assert_eq!(
            Endpoint::Watch(WatchFeed::PopularPromos).path(),
            "watch/promos/popular"
        );
        assert_eq!(Endpoint::CharacterVoices(7).path(), "characters/7/voices");
    }

    #[test]
    fn test_wire_enum_parse() {
        assert_eq!("TV_SPECIAL".parse::<MediaType>(), Ok(MediaType::TvSpecial));
        assert_eq!("bypopularity".parse::<TopFilter>(), Ok(TopFilter::ByPopularity));
        assert!("sometimes".parse::<Weekday>().is_err());
        assert_eq!(GenreFilter::ExplicitGenres.to_string(), "explicit_genres");
    }
}
