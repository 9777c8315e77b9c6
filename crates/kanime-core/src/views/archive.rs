//! Seasonal archive: year/season directory and the current selection.

use kanime_api::{AnimeSeason, ArchiveYear, CatalogService};

use crate::source::AnimeListing;

/// Years shown when the directory cannot be fetched.
pub const FALLBACK_YEARS: i32 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct SeasonDirectory {
    years: Vec<ArchiveYear>,
    is_fallback: bool,
}

impl SeasonDirectory {
    pub fn new(years: Vec<ArchiveYear>) -> Self {
        Self {
            years,
            is_fallback: false,
        }
    }

    /// The last fifty years, each with all four seasons.
    pub fn fallback(current_year: i32) -> Self {
        let years = (0..FALLBACK_YEARS)
            .map(|offset| ArchiveYear {
                year: current_year - offset,
                seasons: AnimeSeason::ALL.to_vec(),
            })
            .collect();
        Self {
            years,
            is_fallback: true,
        }
    }

    pub fn years(&self) -> &[ArchiveYear] {
        &self.years
    }

    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    pub fn seasons_for(&self, year: i32) -> Option<&[AnimeSeason]> {
        self.years
            .iter()
            .find(|y| y.year == year)
            .map(|y| y.seasons.as_slice())
    }
}

/// Fetch the directory once; on failure use the synthetic one.
pub async fn load_directory<S: CatalogService>(service: &S, current_year: i32) -> SeasonDirectory {
    match service.season_directory().await {
        Ok(years) => SeasonDirectory::new(years),
        Err(e) => {
            tracing::warn!(error = %e, "season directory unavailable, using fallback");
            SeasonDirectory::fallback(current_year)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveSelection {
    pub year: i32,
    pub season: AnimeSeason,
}

impl ArchiveSelection {
    pub fn new(year: i32, season: AnimeSeason) -> Self {
        Self { year, season }
    }

    /// Keep the season if the year has it, else take that year's first one.
    pub fn select_year(&mut self, directory: &SeasonDirectory, year: i32) {
        self.year = year;
        if let Some(seasons) = directory.seasons_for(year) {
            if !seasons.contains(&self.season) {
                if let Some(first) = seasons.first() {
                    self.season = *first;
                }
            }
        }
    }

    pub fn select_season(&mut self, season: AnimeSeason) {
        self.season = season;
    }

    pub fn listing(&self) -> AnimeListing {
        AnimeListing::Season {
            year: self.year,
            season: self.season,
        }
    }
}
