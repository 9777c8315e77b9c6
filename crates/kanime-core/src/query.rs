//! The filter/sort descriptor shared by every paginated listing.

use std::collections::BTreeSet;

use kanime_api::{
    AiringStatus, AnimeSearchParams, CharacterSearchParams, MediaType, OrderBy, Rating,
    ScheduleParams, SeasonParams, SortDirection, TopAnimeParams, TopFilter, Weekday,
    MAX_PAGE_SIZE,
};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreRange {
    pub min: Option<f32>,
    pub max: Option<f32>,
}

impl ScoreRange {
    pub fn is_set(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// Air-date bounds as `YYYY[-MM[-DD]]` strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl DateRange {
    pub fn is_set(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }
}

/// Everything that determines which results a listing shows.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub query: Option<String>,
    pub media_type: Option<MediaType>,
    pub status: Option<AiringStatus>,
    pub rating: Option<Rating>,
    pub score_range: ScoreRange,
    pub genre_include: BTreeSet<u32>,
    pub genre_exclude: BTreeSet<u32>,
    pub date_range: DateRange,
    pub order_by: Option<OrderBy>,
    pub sort_direction: Option<SortDirection>,
    pub letter: Option<char>,
    pub sfw: Option<bool>,
    pub continuing: Option<bool>,
    pub kids: Option<bool>,
    page: u32,
    page_size: u32,
}

/// A single edit to a descriptor. Applying any of them restarts at page 1.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterChange {
    Query(Option<String>),
    MediaType(Option<MediaType>),
    Status(Option<AiringStatus>),
    Rating(Option<Rating>),
    ScoreRange(ScoreRange),
    GenreInclude(BTreeSet<u32>),
    GenreExclude(BTreeSet<u32>),
    DateRange(DateRange),
    OrderBy(Option<OrderBy>),
    SortDirection(Option<SortDirection>),
    Letter(Option<char>),
    Sfw(Option<bool>),
    Continuing(Option<bool>),
    Kids(Option<bool>),
    PageSize(u32),
    /// Drop every filter but keep the page size and content flags.
    Clear,
}

impl QueryDescriptor {
    pub fn new(page_size: u32) -> Self {
        Self {
            query: None,
            media_type: None,
            status: None,
            rating: None,
            score_range: ScoreRange::default(),
            genre_include: BTreeSet::new(),
            genre_exclude: BTreeSet::new(),
            date_range: DateRange::default(),
            order_by: None,
            sort_direction: None,
            letter: None,
            sfw: None,
            continuing: None,
            kids: None,
            page: 1,
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Copy of this descriptor pointing at another page.
    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Query(q) => {
                self.query = q.map(|q| q.trim().to_string()).filter(|q| !q.is_empty())
            }
            FilterChange::MediaType(v) => self.media_type = v,
            FilterChange::Status(v) => self.status = v,
            FilterChange::Rating(v) => self.rating = v,
            FilterChange::ScoreRange(v) => self.score_range = v,
            FilterChange::GenreInclude(v) => self.genre_include = v,
            FilterChange::GenreExclude(v) => self.genre_exclude = v,
            FilterChange::DateRange(v) => self.date_range = v,
            FilterChange::OrderBy(v) => self.order_by = v,
            FilterChange::SortDirection(v) => self.sort_direction = v,
            FilterChange::Letter(v) => self.letter = v,
            FilterChange::Sfw(v) => self.sfw = v,
            FilterChange::Continuing(v) => self.continuing = v,
            FilterChange::Kids(v) => self.kids = v,
            FilterChange::PageSize(size) => self.page_size = size.clamp(1, MAX_PAGE_SIZE),
            FilterChange::Clear => {
                let (sfw, continuing, kids) = (self.sfw, self.continuing, self.kids);
                *self = Self {
                    sfw,
                    continuing,
                    kids,
                    ..Self::new(self.page_size)
                };
            }
        }
        self.page = 1;
    }

    /// Whether any field is set that only the search endpoint understands.
    pub fn requires_search(&self) -> bool {
        self.query.is_some()
            || self.status.is_some()
            || self.score_range.is_set()
            || !self.genre_include.is_empty()
            || !self.genre_exclude.is_empty()
            || self.date_range.is_set()
            || self.order_by.is_some()
            || self.sort_direction.is_some()
            || self.letter.is_some()
    }

    /// Human-readable list of the filters currently in effect.
    pub fn active_filters(&self) -> Vec<String> {
        let mut active = Vec::new();
        if let Some(q) = &self.query {
            active.push(format!("query: {q}"));
        }
        if let Some(t) = self.media_type {
            active.push(format!("type: {t}"));
        }
        if let Some(s) = self.status {
            active.push(format!("status: {s}"));
        }
        if let Some(r) = self.rating {
            active.push(format!("rating: {r}"));
        }
        if let Some(min) = self.score_range.min {
            active.push(format!("min score: {min}"));
        }
        if let Some(max) = self.score_range.max {
            active.push(format!("max score: {max}"));
        }
        if !self.genre_include.is_empty() {
            active.push(format!("genres: {}", join_ids(&self.genre_include)));
        }
        if !self.genre_exclude.is_empty() {
            active.push(format!("excluded genres: {}", join_ids(&self.genre_exclude)));
        }
        if let Some(start) = &self.date_range.start {
            active.push(format!("from: {start}"));
        }
        if let Some(end) = &self.date_range.end {
            active.push(format!("to: {end}"));
        }
        if let Some(order) = self.order_by {
            let dir = self.sort_direction.map(|d| d.as_str()).unwrap_or("desc");
            active.push(format!("order: {order} {dir}"));
        }
        if let Some(letter) = self.letter {
            active.push(format!("letter: {letter}"));
        }
        active
    }

    pub fn to_top_params(&self, filter: Option<TopFilter>) -> TopAnimeParams {
        TopAnimeParams {
            media_type: self.media_type,
            filter,
            rating: self.rating,
            sfw: self.sfw,
            page: Some(self.page),
            limit: Some(self.page_size),
        }
    }

    pub fn to_search_params(&self) -> AnimeSearchParams {
        AnimeSearchParams {
            query: self.query.clone(),
            sfw: self.sfw,
            page: Some(self.page),
            limit: Some(self.page_size),
            media_type: self.media_type,
            status: self.status,
            rating: self.rating,
            min_score: self.score_range.min,
            max_score: self.score_range.max,
            genres: self.genre_include.clone(),
            genres_exclude: self.genre_exclude.clone(),
            order_by: self.order_by,
            sort: self.sort_direction,
            letter: self.letter,
            start_date: self.date_range.start.clone(),
            end_date: self.date_range.end.clone(),
            ..Default::default()
        }
    }

    pub fn to_season_params(&self) -> SeasonParams {
        SeasonParams {
            filter: self.media_type,
            sfw: self.sfw,
            unapproved: None,
            continuing: self.continuing,
            page: Some(self.page),
            limit: Some(self.page_size),
        }
    }

    pub fn to_schedule_params(&self, day: Option<Weekday>) -> ScheduleParams {
        ScheduleParams {
            day,
            kids: self.kids,
            sfw: self.sfw,
            unapproved: None,
            page: Some(self.page),
            limit: Some(self.page_size),
        }
    }

    pub fn to_character_params(&self) -> CharacterSearchParams {
        CharacterSearchParams {
            query: self.query.clone(),
            page: Some(self.page),
            limit: Some(self.page_size),
            order_by: self.order_by,
            sort: self.sort_direction,
            letter: self.letter,
        }
    }
}

fn join_ids(ids: &BTreeSet<u32>) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
