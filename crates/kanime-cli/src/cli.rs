use clap::{Parser, Subcommand};

use kanime_api::{
    AiringStatus, AnimeSeason, CatalogError, GenreFilter, JikanClient, MediaType, OrderBy, Rating,
    SortDirection, TopFilter, Weekday,
};
use kanime_core::store::FileStore;
use kanime_core::views::HomeSection;
use kanime_core::{AppConfig, DateRange, FilterChange, KanimeError, ScoreRange, SlotState};
use kanime_runtime::{HomeTab, ListingPage, Page, Runtime, Task};

use crate::format;

#[derive(Parser)]
#[command(name = "kanime")]
#[command(about = "Browse the Jikan anime catalog from the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// How many result pages to fetch for paginated listings.
    #[arg(long, default_value_t = 1, global = true)]
    pub pages: u32,

    /// Include adult entries regardless of the configured default.
    #[arg(long, global = true)]
    pub nsfw: bool,

    /// Shortcut for `RUST_LOG=kanime=debug`.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Carousels plus the main list (latest airing or most popular).
    Home {
        #[arg(long)]
        popular: bool,
    },

    /// Top-ranked anime.
    Top {
        #[arg(long)]
        filter: Option<TopFilter>,
        #[arg(long = "type")]
        media_type: Option<MediaType>,
        #[arg(long)]
        rating: Option<Rating>,
    },

    /// Full-text and filtered search.
    Search {
        query: Option<String>,
        #[arg(long = "type")]
        media_type: Option<MediaType>,
        #[arg(long)]
        status: Option<AiringStatus>,
        #[arg(long)]
        rating: Option<Rating>,
        /// Genre id to include (repeatable).
        #[arg(long = "genre")]
        genres: Vec<u32>,
        /// Genre id to exclude (repeatable).
        #[arg(long = "exclude-genre")]
        exclude_genres: Vec<u32>,
        #[arg(long)]
        min_score: Option<f32>,
        #[arg(long)]
        max_score: Option<f32>,
        #[arg(long)]
        order_by: Option<OrderBy>,
        #[arg(long)]
        sort: Option<SortDirection>,
        #[arg(long)]
        letter: Option<char>,
        /// Earliest start date (YYYY, YYYY-MM or YYYY-MM-DD).
        #[arg(long, value_parser = parse_date_bound)]
        from: Option<String>,
        #[arg(long, value_parser = parse_date_bound)]
        to: Option<String>,
    },

    /// The current season, or any past one with --year/--season.
    Season {
        #[arg(long, requires = "season")]
        year: Option<i32>,
        #[arg(long, requires = "year")]
        season: Option<AnimeSeason>,
        #[arg(long = "type")]
        media_type: Option<MediaType>,
        /// Include titles continuing from earlier seasons (always on for
        /// the current season unless --new-only is given).
        #[arg(long, conflicts_with = "new_only")]
        continuing: bool,
        /// Only titles that premiered this season.
        #[arg(long)]
        new_only: bool,
    },

    /// Announced titles that have not aired yet.
    Upcoming {
        #[arg(long = "type")]
        media_type: Option<MediaType>,
    },

    /// Years and seasons available in the archive.
    Archive {
        /// Only list the seasons of this year.
        #[arg(long)]
        year: Option<i32>,
    },

    /// Broadcast schedule for one weekday (default: today).
    Schedule {
        #[arg(long)]
        day: Option<Weekday>,
        #[arg(long)]
        kids: bool,
    },

    /// Genre taxonomy, or browse one genre by id.
    Genres {
        #[arg(long)]
        filter: Option<GenreFilter>,
        #[arg(long)]
        browse: Option<u32>,
    },

    /// Full record for one anime.
    Anime { id: u64 },

    /// Top characters, or character search.
    Characters {
        query: Option<String>,
        #[arg(long)]
        letter: Option<char>,
        #[arg(long)]
        order_by: Option<OrderBy>,
        #[arg(long)]
        sort: Option<SortDirection>,
    },

    /// Character profile with roles and voice actors.
    Character {
        id: u64,
        #[arg(long)]
        pictures: bool,
    },

    /// Manage the local favorites list.
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Show where settings are read from.
    Config {
        /// Write the effective settings to the user config file if none exists.
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand)]
pub enum FavoritesAction {
    /// Print stored ids.
    List,
    /// Add or remove one id.
    Toggle { id: u64 },
    /// Resolve and print every favorite.
    Show,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Storage(#[from] KanimeError),

    #[error("{0}")]
    Unavailable(String),
}

fn parse_date_bound(s: &str) -> Result<String, String> {
    let valid = match s.len() {
        4 => s.parse::<u16>().is_ok(),
        7 => chrono::NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").is_ok(),
        10 => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
        _ => false,
    };
    if valid {
        Ok(s.to_string())
    } else {
        Err(format!("expected YYYY, YYYY-MM or YYYY-MM-DD, got {s:?}"))
    }
}

type CliRuntime = Runtime<JikanClient, FileStore>;

pub async fn run(cli: Cli, mut config: AppConfig) -> Result<(), CliError> {
    if cli.nsfw {
        config.catalog.sfw = false;
    }
    let client = JikanClient::with_options(&config.catalog.base_url, config.catalog.timeout())?;
    let store = FileStore::new(AppConfig::data_dir());
    let mut rt = Runtime::new(client, store, config);
    let pages = cli.pages.max(1);

    match cli.command {
        Commands::Home { popular } => {
            if popular {
                // Only the tab matters here; `open` fetches the listing.
                let _superseded = rt.set_home_tab(HomeTab::Popular);
            }
            let tasks = rt.open(Page::Home);
            rt.run(tasks).await;

            if let Some(hero) = rt.hero() {
                println!("Spotlight: {}", format::entry_line(hero, false));
            }
            for &section in HomeSection::ALL {
                let items = rt.section(section).unwrap_or_default();
                if items.is_empty() {
                    continue;
                }
                println!("\n== {} ==", section.title());
                for item in items {
                    println!("{}", format::section_line(item));
                }
            }
            paginate(&mut rt, ListingPage::Home, pages).await;
            let title = match rt.home_tab() {
                HomeTab::Latest => "Latest",
                HomeTab::Popular => "Popular",
            };
            println!("\n== {title} ==");
            print_listing(&rt, ListingPage::Home);

            if !rt.upsell_dismissed() {
                eprintln!("\nTip: favorites are stored locally; see `kanime favorites --help`.");
                rt.dismiss_upsell();
            }
        }
        Commands::Top {
            filter,
            media_type,
            rating,
        } => {
            let tasks = latest([
                rt.set_ranking(filter),
                rt.set_filter(ListingPage::Home, FilterChange::MediaType(media_type)),
                rt.set_filter(ListingPage::Home, FilterChange::Rating(rating)),
            ]);
            rt.run(tasks).await;
            paginate(&mut rt, ListingPage::Home, pages).await;
            print_listing(&rt, ListingPage::Home);
        }
        Commands::Search {
            query,
            media_type,
            status,
            rating,
            genres,
            exclude_genres,
            min_score,
            max_score,
            order_by,
            sort,
            letter,
            from,
            to,
        } => {
            let changes = [
                FilterChange::MediaType(media_type),
                FilterChange::Status(status),
                FilterChange::Rating(rating),
                FilterChange::GenreInclude(genres.into_iter().collect()),
                FilterChange::GenreExclude(exclude_genres.into_iter().collect()),
                FilterChange::ScoreRange(ScoreRange {
                    min: min_score,
                    max: max_score,
                }),
                FilterChange::OrderBy(order_by),
                FilterChange::SortDirection(sort),
                FilterChange::Letter(letter),
                FilterChange::DateRange(DateRange {
                    start: from,
                    end: to,
                }),
            ];
            let mut tasks: Vec<Option<Task>> = changes
                .into_iter()
                .map(|change| rt.set_filter(ListingPage::Home, change))
                .collect();
            if let Some(q) = query.as_deref() {
                tasks.push(rt.submit_search(ListingPage::Home, q));
            }
            rt.run(latest(tasks)).await;
            paginate(&mut rt, ListingPage::Home, pages).await;
            print_listing(&rt, ListingPage::Home);
        }
        Commands::Season {
            year,
            season,
            media_type,
            continuing,
            new_only,
        } => {
            let mut tasks = Vec::new();
            let page = match (year, season) {
                (Some(year), Some(season)) => {
                    tasks.push(rt.select_season(season));
                    tasks.push(rt.select_year(year));
                    ListingPage::Archive
                }
                _ => ListingPage::Seasonal,
            };
            tasks.push(rt.set_filter(page, FilterChange::MediaType(media_type)));
            if new_only {
                tasks.push(rt.set_filter(page, FilterChange::Continuing(None)));
            } else if continuing {
                tasks.push(rt.set_filter(page, FilterChange::Continuing(Some(true))));
            }
            rt.run(latest(tasks)).await;
            paginate(&mut rt, page, pages).await;

            if page == ListingPage::Archive {
                let selection = rt.archive_selection();
                println!("== {} {} ==", selection.season, selection.year);
            }
            print_listing(&rt, page);
        }
        Commands::Upcoming { media_type } => {
            let tasks = latest([rt.set_filter(
                ListingPage::Upcoming,
                FilterChange::MediaType(media_type),
            )]);
            rt.run(tasks).await;
            paginate(&mut rt, ListingPage::Upcoming, pages).await;
            print_listing(&rt, ListingPage::Upcoming);
        }
        Commands::Archive { year } => {
            let tasks = rt.open(Page::Archive);
            rt.run(tasks).await;
            let Some(directory) = rt.directory() else {
                return Err(CliError::Unavailable("season directory not loaded".into()));
            };
            if directory.is_fallback() {
                eprintln!("(catalog unreachable, showing the last 50 years)");
            }
            for entry in directory.years() {
                if year.is_some_and(|y| y != entry.year) {
                    continue;
                }
                let seasons: Vec<String> = entry.seasons.iter().map(ToString::to_string).collect();
                println!("{}  {}", entry.year, seasons.join(", "));
            }
        }
        Commands::Schedule { day, kids } => {
            let tasks = latest([
                rt.select_day(Some(day.unwrap_or_else(Weekday::today))),
                rt.set_filter(ListingPage::Schedules, FilterChange::Kids(kids.then_some(true))),
            ]);
            rt.run(tasks).await;
            paginate(&mut rt, ListingPage::Schedules, pages).await;
            print_listing(&rt, ListingPage::Schedules);
        }
        Commands::Genres { filter, browse } => {
            if let Some(genre_id) = browse {
                let tasks: Vec<Task> = rt.browse_genre(genre_id).into_iter().collect();
                rt.run(tasks).await;
                paginate(&mut rt, ListingPage::Home, pages).await;
                print_listing(&rt, ListingPage::Home);
            } else {
                let task = rt.set_taxonomy(filter);
                rt.run(vec![task]).await;
                for entry in rt.taxonomy() {
                    println!("{}", format::taxonomy_line(entry));
                }
            }
        }
        Commands::Anime { id } => {
            let task = rt.select_item(id);
            rt.run(vec![task]).await;
            match rt.detail().state() {
                SlotState::Ready(detail) => {
                    for line in format::detail_block(detail) {
                        println!("{line}");
                    }
                    if rt.favorites().is_favorite(id) {
                        println!("\n(in favorites)");
                    }
                }
                _ => return Err(CliError::Unavailable(format!("anime {id} is unavailable"))),
            }
        }
        Commands::Characters {
            query,
            letter,
            order_by,
            sort,
        } => {
            let mut tasks = vec![
                rt.set_character_filter(FilterChange::Letter(letter)),
                rt.set_character_filter(FilterChange::OrderBy(order_by)),
                rt.set_character_filter(FilterChange::SortDirection(sort)),
            ];
            if let Some(q) = query.as_deref() {
                tasks.push(rt.search_characters(q));
            }
            rt.run(latest(tasks)).await;
            for _ in 1..pages {
                let Some(task) = rt.load_more_characters() else {
                    break;
                };
                rt.run(vec![task]).await;
            }
            let render = rt.characters().render();
            for character in render.items {
                println!("{}", format::character_line(character));
            }
            if render.has_next_page {
                println!("(more results: --pages {})", pages + 1);
            }
        }
        Commands::Character { id, pictures } => {
            let task = rt.select_character(id);
            rt.run(vec![task]).await;
            let Some(profile) = rt.character().record() else {
                return Err(CliError::Unavailable(format!("character {id} is unavailable")));
            };
            for line in format::profile_block(profile) {
                println!("{line}");
            }
            if pictures {
                for url in rt.character_pictures(id).await {
                    println!("  {url}");
                }
            }
        }
        Commands::Favorites { action } => match action {
            FavoritesAction::List => {
                for id in rt.favorites().ids() {
                    println!("{id}");
                }
            }
            FavoritesAction::Toggle { id } => {
                rt.toggle_favorite(id);
                let state = if rt.favorites().is_favorite(id) {
                    "added to"
                } else {
                    "removed from"
                };
                println!("{id} {state} favorites");
            }
            FavoritesAction::Show => {
                let tasks: Vec<Task> = rt.show_favorites().into_iter().collect();
                rt.run(tasks).await;
                if rt.favorites_view().items().is_empty() {
                    println!("No favorites yet.");
                }
                for entry in rt.favorites_view().items() {
                    println!("{}", format::entry_line(entry, true));
                }
            }
        },
        Commands::Config { init } => {
            let path = AppConfig::config_path();
            if !init {
                let state = if path.exists() { "" } else { " (not created, using defaults)" };
                println!("config: {}{state}", path.display());
                println!("data:   {}", AppConfig::data_dir().display());
            } else if path.exists() {
                println!("{} already exists", path.display());
            } else {
                let written = rt.config().save()?;
                println!("wrote {}", written.display());
            }
        }
    }
    Ok(())
}

/// Each filter step supersedes the previous request; run only the newest.
fn latest(tasks: impl IntoIterator<Item = Option<Task>>) -> Vec<Task> {
    tasks.into_iter().flatten().last().into_iter().collect()
}

/// Fetch pages 2..=`pages` of a listing.
async fn paginate(rt: &mut CliRuntime, page: ListingPage, pages: u32) {
    for _ in 1..pages {
        let Some(task) = rt.load_more(page) else {
            break;
        };
        rt.run(vec![task]).await;
    }
}

fn print_listing(rt: &CliRuntime, page: ListingPage) {
    let render = rt.listing(page).render();
    if !render.active_filters.is_empty() {
        println!("({})", render.active_filters.join("; "));
    }
    if render.items.is_empty() {
        println!("No results.");
    }
    for entry in render.items {
        println!("{}", format::entry_line(entry, rt.favorites().is_favorite(entry.id)));
    }
    if render.has_next_page {
        println!("(more results available, use --pages)");
    }
}
