//! In-memory catalog for builder tests.

use std::collections::{HashMap, HashSet};

use kanime_api::{
    AnimeDetail, AnimeQuery, ArchiveYear, CatalogEntry, CatalogError, CatalogService,
    CharacterEntry, CharacterQuery, FeedItem, GenreFilter, Page, RoleAssociation, TaxonomyEntry,
    VoiceAssociation, WatchFeed,
};

#[derive(Debug, Default)]
pub struct FakeCatalog {
    pub anime: HashMap<u64, CatalogEntry>,
    pub listing: Vec<CatalogEntry>,
    pub feeds: HashMap<WatchFeed, Vec<FeedItem>>,
    pub directory: Option<Vec<ArchiveYear>>,
    pub taxonomy: Vec<TaxonomyEntry>,
    pub characters: HashMap<u64, CharacterEntry>,
    pub roles: HashMap<u64, Vec<RoleAssociation>>,
    pub voices: HashMap<u64, Vec<VoiceAssociation>>,
    /// Ids whose by-id lookups fail.
    pub failing: HashSet<u64>,
}

pub fn entry(id: u64, title: &str) -> CatalogEntry {
    CatalogEntry {
        id,
        title: title.to_string(),
        image_url: Some(format!("https://cdn.example/{id}.webp")),
        ..Default::default()
    }
}

pub fn server_error() -> CatalogError {
    CatalogError::Status {
        status: 500,
        message: "Internal Server Error".into(),
    }
}

fn not_found() -> CatalogError {
    CatalogError::Status {
        status: 404,
        message: "Not Found".into(),
    }
}

impl FakeCatalog {
    fn check(&self, id: u64) -> Result<(), CatalogError> {
        if self.failing.contains(&id) {
            Err(server_error())
        } else {
            Ok(())
        }
    }
}

impl CatalogService for FakeCatalog {
    async fn anime_page(&self, _query: &AnimeQuery) -> Result<Page<CatalogEntry>, CatalogError> {
        Ok(Page::new(self.listing.clone(), false))
    }

    async fn character_page(
        &self,
        _query: &CharacterQuery,
    ) -> Result<Page<CharacterEntry>, CatalogError> {
        Ok(Page::new(self.characters.values().cloned().collect(), false))
    }

    async fn anime(&self, id: u64) -> Result<CatalogEntry, CatalogError> {
        self.check(id)?;
        self.anime.get(&id).cloned().ok_or_else(not_found)
    }

    async fn anime_full(&self, id: u64) -> Result<AnimeDetail, CatalogError> {
        let entry = self.anime(id).await?;
        Ok(AnimeDetail {
            entry,
            ..Default::default()
        })
    }

    async fn watch_feed(&self, feed: WatchFeed) -> Result<Vec<FeedItem>, CatalogError> {
        self.feeds.get(&feed).cloned().ok_or_else(server_error)
    }

    async fn season_directory(&self) -> Result<Vec<ArchiveYear>, CatalogError> {
        self.directory.clone().ok_or_else(server_error)
    }

    async fn genres(
        &self,
        _filter: Option<GenreFilter>,
    ) -> Result<Vec<TaxonomyEntry>, CatalogError> {
        Ok(self.taxonomy.clone())
    }

    async fn character(&self, id: u64) -> Result<CharacterEntry, CatalogError> {
        self.check(id)?;
        self.characters.get(&id).cloned().ok_or_else(not_found)
    }

    async fn character_roles(&self, id: u64) -> Result<Vec<RoleAssociation>, CatalogError> {
        self.roles.get(&id).cloned().ok_or_else(server_error)
    }

    async fn character_voices(&self, id: u64) -> Result<Vec<VoiceAssociation>, CatalogError> {
        self.voices.get(&id).cloned().ok_or_else(server_error)
    }

    async fn character_pictures(&self, id: u64) -> Result<Vec<String>, CatalogError> {
        self.check(id)?;
        Ok(vec![format!("https://cdn.example/characters/{id}.jpg")])
    }
}
