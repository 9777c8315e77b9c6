//! Single-owner event loop over every page controller.
//!
//! Intents mutate state synchronously and hand back [`Task`]s. A task owns
//! everything it needs (`'static`), performs its catalog calls, and resolves
//! to a [`Message`] that [`Runtime::update`] applies. Completions may arrive
//! in any order; the controllers discard the stale ones.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Datelike;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};

use kanime_api::{
    AnimeDetail, AnimeSeason, CatalogEntry, CatalogError, CatalogService, CharacterEntry,
    GenreFilter, TaxonomyEntry, TopFilter, Weekday,
};
use kanime_core::detail::resolve_full;
use kanime_core::store::{dismiss_upsell, upsell_dismissed};
use kanime_core::views::{
    browse_genre, load_character, load_directory, load_pictures, load_section, load_taxonomy,
    pick_hero, ArchiveSelection, CharacterProfile, FavoritesRequest, FavoritesResponse,
    FavoritesView, HomeSection, SeasonDirectory, SectionItem,
};
use kanime_core::{
    AnimeListing, AppConfig, BlobStore, CharacterListing, DetailRequest, DetailResolver,
    DetailSlot, FavoritesStore, FetchRequest, FetchResponse, FilterChange, FilterState,
    QueryDescriptor, ViewMode,
};

/// Deferred work that resolves to a message.
pub type Task = BoxFuture<'static, Message>;

/// Top-level pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Home,
    Seasonal,
    Upcoming,
    Archive,
    Schedules,
    Characters,
    Genres,
}

/// Pages backed by a paginated anime listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingPage {
    Home,
    Seasonal,
    Upcoming,
    Archive,
    Schedules,
}

/// Main list tab on the home page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HomeTab {
    #[default]
    Latest,
    Popular,
}

impl HomeTab {
    fn filter(self) -> Option<TopFilter> {
        match self {
            Self::Latest => Some(TopFilter::Airing),
            Self::Popular => Some(TopFilter::ByPopularity),
        }
    }
}

#[derive(Debug)]
pub enum Message {
    Listing(ListingPage, FetchResponse<CatalogEntry>),
    Characters(FetchResponse<CharacterEntry>),
    Section(HomeSection, Vec<SectionItem>),
    Favorites(FavoritesResponse),
    Detail(DetailRequest, Result<AnimeDetail, CatalogError>),
    Character(DetailRequest, Result<CharacterProfile, CatalogError>),
    Directory(SeasonDirectory),
    Taxonomy(Option<GenreFilter>, Vec<TaxonomyEntry>),
}

pub struct Runtime<S, B> {
    service: Arc<S>,
    config: AppConfig,
    favorites: FavoritesStore<B>,
    home: FilterState<AnimeListing>,
    home_tab: HomeTab,
    seasonal: FilterState<AnimeListing>,
    upcoming: FilterState<AnimeListing>,
    archive: FilterState<AnimeListing>,
    archive_selection: ArchiveSelection,
    directory: Option<SeasonDirectory>,
    schedules: FilterState<AnimeListing>,
    characters: FilterState<CharacterListing>,
    sections: HashMap<HomeSection, Vec<SectionItem>>,
    hero: Option<CatalogEntry>,
    hero_seed: u64,
    favorites_view: FavoritesView,
    detail: DetailResolver,
    character: DetailSlot<CharacterProfile>,
    taxonomy_filter: Option<GenreFilter>,
    taxonomy: Vec<TaxonomyEntry>,
}

impl<S, B> Runtime<S, B>
where
    S: CatalogService + 'static,
    B: BlobStore,
{
    pub fn new(service: S, store: B, config: AppConfig) -> Self {
        let sizes = config.listing.clone();
        let sfw = Some(config.catalog.sfw);
        let descriptor = |page_size: u32| {
            let mut d = QueryDescriptor::new(page_size);
            d.sfw = sfw;
            d
        };

        // The current season also lists shows carried over from earlier ones.
        let mut seasonal = descriptor(sizes.page_size);
        seasonal.continuing = Some(true);

        let now = chrono::Local::now();
        let archive_selection = ArchiveSelection::new(now.year(), AnimeSeason::current());

        Self {
            service: Arc::new(service),
            favorites: FavoritesStore::load(store),
            home: FilterState::new(
                AnimeListing::Ranked {
                    filter: HomeTab::default().filter(),
                },
                descriptor(sizes.home_page_size),
            ),
            home_tab: HomeTab::default(),
            seasonal: FilterState::new(AnimeListing::CurrentSeason, seasonal),
            upcoming: FilterState::new(AnimeListing::UpcomingSeason, descriptor(sizes.page_size)),
            archive: FilterState::new(archive_selection.listing(), descriptor(sizes.page_size)),
            archive_selection,
            directory: None,
            schedules: FilterState::new(
                AnimeListing::Schedule {
                    day: Some(Weekday::today()),
                },
                descriptor(sizes.schedule_page_size),
            ),
            characters: FilterState::new(CharacterListing, QueryDescriptor::new(sizes.page_size)),
            sections: HashMap::new(),
            hero: None,
            hero_seed: now.timestamp_subsec_nanos() as u64,
            favorites_view: FavoritesView::new(),
            detail: DetailResolver::new(),
            character: DetailSlot::new(),
            taxonomy_filter: None,
            taxonomy: Vec::new(),
            config,
        }
    }

    /// Fix the hero banner pick, e.g. for reproducible output.
    pub fn with_hero_seed(mut self, seed: u64) -> Self {
        self.hero_seed = seed;
        self
    }

    // ── Intents ─────────────────────────────────────────────────

    pub fn open(&mut self, page: Page) -> Vec<Task> {
        tracing::debug!(?page, "opening page");
        match page {
            Page::Home => {
                let mut tasks: Vec<Task> = HomeSection::ALL
                    .iter()
                    .map(|&section| self.section_task(section))
                    .collect();
                tasks.extend(self.start_listing(ListingPage::Home));
                tasks
            }
            Page::Seasonal => self.start_listing(ListingPage::Seasonal).into_iter().collect(),
            Page::Upcoming => self.start_listing(ListingPage::Upcoming).into_iter().collect(),
            Page::Archive => {
                let mut tasks = Vec::new();
                if self.directory.is_none() {
                    tasks.push(self.directory_task());
                }
                tasks.extend(self.start_listing(ListingPage::Archive));
                tasks
            }
            Page::Schedules => self.start_listing(ListingPage::Schedules).into_iter().collect(),
            Page::Characters => {
                let request = self.characters.start();
                request.map(|r| self.character_listing_task(r)).into_iter().collect()
            }
            Page::Genres => vec![self.set_taxonomy(self.taxonomy_filter)],
        }
    }

    pub fn set_filter(&mut self, page: ListingPage, change: FilterChange) -> Option<Task> {
        let request = self.listing_mut(page).update(change)?;
        Some(self.listing_task(page, request))
    }

    pub fn load_more(&mut self, page: ListingPage) -> Option<Task> {
        let request = self.listing_mut(page).load_more()?;
        Some(self.listing_task(page, request))
    }

    pub fn submit_search(&mut self, page: ListingPage, query: &str) -> Option<Task> {
        // Any submit from the favorites view, blank or not, leaves it.
        if page == ListingPage::Home && self.home.mode() == ViewMode::Favorites {
            self.favorites_view.close();
        }
        let request = self.listing_mut(page).submit_search(query)?;
        Some(self.listing_task(page, request))
    }

    pub fn set_character_filter(&mut self, change: FilterChange) -> Option<Task> {
        let request = self.characters.update(change)?;
        Some(self.character_listing_task(request))
    }

    pub fn load_more_characters(&mut self) -> Option<Task> {
        let request = self.characters.load_more()?;
        Some(self.character_listing_task(request))
    }

    pub fn search_characters(&mut self, query: &str) -> Option<Task> {
        let request = self.characters.submit_search(query)?;
        Some(self.character_listing_task(request))
    }

    pub fn set_home_tab(&mut self, tab: HomeTab) -> Option<Task> {
        self.home_tab = tab;
        self.set_ranking(tab.filter())
    }

    /// Point the home listing at any ranking flavor.
    pub fn set_ranking(&mut self, filter: Option<TopFilter>) -> Option<Task> {
        let request = self.home.set_source(AnimeListing::Ranked { filter })?;
        Some(self.listing_task(ListingPage::Home, request))
    }

    /// Restrict the home listing to one genre.
    pub fn browse_genre(&mut self, genre_id: u32) -> Option<Task> {
        if self.home.mode() == ViewMode::Favorites {
            self.favorites_view.close();
            self.home.return_to_listing();
        }
        self.set_filter(ListingPage::Home, browse_genre(genre_id))
    }

    pub fn show_favorites(&mut self) -> Option<Task> {
        self.home.enter_favorites();
        let request = self.favorites_view.begin(self.favorites.ids())?;
        Some(self.favorites_task(request))
    }

    pub fn hide_favorites(&mut self) -> Option<Task> {
        self.favorites_view.close();
        let request = self.home.return_to_listing()?;
        Some(self.listing_task(ListingPage::Home, request))
    }

    /// Flip one favorite. While the favorites view is shown it re-resolves.
    pub fn toggle_favorite(&mut self, id: u64) -> Option<Task> {
        let now_favorite = self.favorites.toggle(id);
        tracing::info!(id, now_favorite, "toggled favorite");
        if self.home.mode() != ViewMode::Favorites {
            return None;
        }
        let request = self.favorites_view.begin(self.favorites.ids())?;
        Some(self.favorites_task(request))
    }

    pub fn select_item(&mut self, id: u64) -> Task {
        let request = self.detail.open(id);
        let service = Arc::clone(&self.service);
        Box::pin(async move {
            let result = resolve_full(&*service, id).await;
            Message::Detail(request, result)
        })
    }

    pub fn close_detail(&mut self) {
        self.detail.close();
    }

    pub fn select_character(&mut self, id: u64) -> Task {
        let request = self.character.open(id);
        let service = Arc::clone(&self.service);
        Box::pin(async move {
            let result = load_character(&*service, id).await;
            Message::Character(request, result)
        })
    }

    pub fn close_character(&mut self) {
        self.character.close();
    }

    /// Gallery for one character. Fetched on demand, outside the slot.
    pub async fn character_pictures(&self, id: u64) -> Vec<String> {
        load_pictures(&*self.service, id).await
    }

    pub fn select_year(&mut self, year: i32) -> Option<Task> {
        match &self.directory {
            Some(directory) => self.archive_selection.select_year(directory, year),
            None => self.archive_selection.year = year,
        }
        self.refresh_archive()
    }

    pub fn select_season(&mut self, season: AnimeSeason) -> Option<Task> {
        self.archive_selection.select_season(season);
        self.refresh_archive()
    }

    pub fn select_day(&mut self, day: Option<Weekday>) -> Option<Task> {
        let request = self.schedules.set_source(AnimeListing::Schedule { day })?;
        Some(self.listing_task(ListingPage::Schedules, request))
    }

    pub fn set_taxonomy(&mut self, filter: Option<GenreFilter>) -> Task {
        self.taxonomy_filter = filter;
        let service = Arc::clone(&self.service);
        Box::pin(async move {
            let entries = load_taxonomy(&*service, filter).await;
            Message::Taxonomy(filter, entries)
        })
    }

    pub fn upsell_dismissed(&self) -> bool {
        upsell_dismissed(self.favorites.store())
    }

    pub fn dismiss_upsell(&mut self) {
        if let Err(e) = dismiss_upsell(self.favorites.store_mut()) {
            tracing::warn!(error = %e, "failed to save upsell flag");
        }
    }

    // ── Completions ─────────────────────────────────────────────

    /// Apply one completion. May hand back follow-up work.
    pub fn update(&mut self, message: Message) -> Vec<Task> {
        match message {
            Message::Listing(page, response) => {
                let outcome = self.listing_mut(page).complete(response);
                tracing::debug!(?page, ?outcome, "listing completion");
            }
            Message::Characters(response) => {
                self.characters.complete(response);
            }
            Message::Section(section, items) => {
                if section == HomeSection::TopAiring {
                    let entries: Vec<CatalogEntry> =
                        items.iter().map(|item| item.entry.clone()).collect();
                    self.hero = pick_hero(&entries, self.hero_seed).cloned();
                }
                self.sections.insert(section, items);
            }
            Message::Favorites(response) => {
                self.favorites_view.complete(response);
            }
            Message::Detail(request, result) => {
                self.detail.complete(request, result);
            }
            Message::Character(request, result) => {
                self.character.complete(request, result);
            }
            Message::Directory(directory) => {
                let year = self.archive_selection.year;
                let before = self.archive_selection;
                self.archive_selection.select_year(&directory, year);
                self.directory = Some(directory);
                if self.archive_selection != before {
                    return self.refresh_archive().into_iter().collect();
                }
            }
            Message::Taxonomy(filter, entries) => {
                if filter == self.taxonomy_filter {
                    self.taxonomy = entries;
                }
            }
        }
        Vec::new()
    }

    /// Drive tasks to completion, applying each message as it lands.
    pub async fn run(&mut self, tasks: Vec<Task>) {
        let mut pending: FuturesUnordered<Task> = tasks.into_iter().collect();
        while let Some(message) = pending.next().await {
            for follow_up in self.update(message) {
                pending.push(follow_up);
            }
        }
    }

    // ── Read access ─────────────────────────────────────────────

    pub fn listing(&self, page: ListingPage) -> &FilterState<AnimeListing> {
        match page {
            ListingPage::Home => &self.home,
            ListingPage::Seasonal => &self.seasonal,
            ListingPage::Upcoming => &self.upcoming,
            ListingPage::Archive => &self.archive,
            ListingPage::Schedules => &self.schedules,
        }
    }

    pub fn characters(&self) -> &FilterState<CharacterListing> {
        &self.characters
    }

    pub fn section(&self, section: HomeSection) -> Option<&[SectionItem]> {
        self.sections.get(&section).map(Vec::as_slice)
    }

    pub fn hero(&self) -> Option<&CatalogEntry> {
        self.hero.as_ref()
    }

    pub fn home_tab(&self) -> HomeTab {
        self.home_tab
    }

    pub fn favorites(&self) -> &FavoritesStore<B> {
        &self.favorites
    }

    pub fn favorites_view(&self) -> &FavoritesView {
        &self.favorites_view
    }

    pub fn detail(&self) -> &DetailResolver {
        &self.detail
    }

    pub fn character(&self) -> &DetailSlot<CharacterProfile> {
        &self.character
    }

    pub fn directory(&self) -> Option<&SeasonDirectory> {
        self.directory.as_ref()
    }

    pub fn archive_selection(&self) -> ArchiveSelection {
        self.archive_selection
    }

    pub fn taxonomy(&self) -> &[TaxonomyEntry] {
        &self.taxonomy
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // ── Internals ───────────────────────────────────────────────

    fn listing_mut(&mut self, page: ListingPage) -> &mut FilterState<AnimeListing> {
        match page {
            ListingPage::Home => &mut self.home,
            ListingPage::Seasonal => &mut self.seasonal,
            ListingPage::Upcoming => &mut self.upcoming,
            ListingPage::Archive => &mut self.archive,
            ListingPage::Schedules => &mut self.schedules,
        }
    }

    fn start_listing(&mut self, page: ListingPage) -> Option<Task> {
        let request = self.listing_mut(page).start()?;
        Some(self.listing_task(page, request))
    }

    fn refresh_archive(&mut self) -> Option<Task> {
        let request = self.archive.set_source(self.archive_selection.listing())?;
        Some(self.listing_task(ListingPage::Archive, request))
    }

    fn listing_task(&self, page: ListingPage, request: FetchRequest<AnimeListing>) -> Task {
        let service = Arc::clone(&self.service);
        Box::pin(async move { Message::Listing(page, request.execute(&*service).await) })
    }

    fn character_listing_task(&self, request: FetchRequest<CharacterListing>) -> Task {
        let service = Arc::clone(&self.service);
        Box::pin(async move { Message::Characters(request.execute(&*service).await) })
    }

    fn section_task(&self, section: HomeSection) -> Task {
        let service = Arc::clone(&self.service);
        let limit = self.config.listing.section_size;
        Box::pin(async move { Message::Section(section, load_section(&*service, section, limit).await) })
    }

    fn favorites_task(&self, request: FavoritesRequest) -> Task {
        let service = Arc::clone(&self.service);
        Box::pin(async move { Message::Favorites(request.execute(&*service).await) })
    }

    fn directory_task(&self) -> Task {
        let service = Arc::clone(&self.service);
        let current_year = chrono::Local::now().year();
        Box::pin(async move { Message::Directory(load_directory(&*service, current_year).await) })
    }
}
