use serde::Deserialize;

use crate::traits::{
    AirDateRange, AnimeDetail, AnimeSeason, ArchiveYear, CatalogEntry, CharacterEntry, FeedItem,
    Genre, Page, RoleAssociation, RoleKind, StreamingLink, TaxonomyEntry, VoiceAssociation,
};

// ── Envelopes ───────────────────────────────────────────────────

/// `{ "data": [...], "pagination": {...} }`
#[derive(Debug, Deserialize)]
pub struct RawList<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<RawPagination>,
}

impl<T> RawList<T> {
    pub fn has_next_page(&self) -> bool {
        self.pagination.as_ref().is_some_and(|p| p.has_next_page)
    }

    /// Normalize every item and keep the pagination metadata.
    pub fn into_page<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        let has_next_page = self.has_next_page();
        let last_visible_page = self.pagination.and_then(|p| p.last_visible_page);
        Page {
            items: self.data.into_iter().map(f).collect(),
            has_next_page,
            last_visible_page,
        }
    }
}

/// `{ "data": {...} }`
#[derive(Debug, Deserialize)]
pub struct RawItem<T> {
    pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct RawPagination {
    #[serde(default)]
    pub last_visible_page: Option<u32>,
    #[serde(default)]
    pub has_next_page: bool,
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct RawError {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Shared pieces ───────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RawImages {
    #[serde(default)]
    pub jpg: Option<RawImageUrls>,
    #[serde(default)]
    pub webp: Option<RawImageUrls>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawImageUrls {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

impl RawImages {
    /// Largest available cover, preferring webp.
    pub fn best(self) -> Option<String> {
        let (jpg, webp) = (self.jpg.unwrap_or_default(), self.webp.unwrap_or_default());
        webp.large_image_url
            .or(jpg.large_image_url)
            .or(jpg.image_url)
            .or(webp.image_url)
    }
}

#[derive(Debug, Deserialize)]
pub struct RawNamed {
    pub mal_id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RawAired {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub string: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawBroadcast {
    #[serde(default)]
    pub string: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawTrailer {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub youtube_id: Option<String>,
}

// ── Anime ───────────────────────────────────────────────────────

/// Anime record as returned by listing, search and by-id endpoints.
/// Feed wrappers carry a reduced version with only id, title and images.
#[derive(Debug, Deserialize)]
pub struct RawAnime {
    pub mal_id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub title_english: Option<String>,
    #[serde(default)]
    pub title_japanese: Option<String>,
    #[serde(default)]
    pub images: RawImages,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub aired: Option<RawAired>,
    #[serde(default)]
    pub genres: Vec<RawNamed>,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub broadcast: Option<RawBroadcast>,
    // Full record only.
    #[serde(default)]
    pub trailer: Option<RawTrailer>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub members: Option<u32>,
    #[serde(default)]
    pub studios: Vec<RawNamed>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub streaming: Vec<RawStreaming>,
}

#[derive(Debug, Deserialize)]
pub struct RawStreaming {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

impl RawAnime {
    pub fn into_entry(self) -> CatalogEntry {
        let aired = self
            .aired
            .map(|a| AirDateRange {
                from: a.from,
                to: a.to,
                label: a.string,
            })
            .unwrap_or_default();

        CatalogEntry {
            id: self.mal_id,
            title: self.title.unwrap_or_default(),
            title_english: self.title_english,
            image_url: self.images.best(),
            score: self.score,
            episodes: self.episodes,
            media_type: self.media_type,
            status: self.status,
            rating: self.rating,
            aired,
            genres: self
                .genres
                .into_iter()
                .map(|g| Genre {
                    id: g.mal_id as u32,
                    name: g.name,
                })
                .collect(),
            synopsis: self.synopsis,
            season: self.season.and_then(|s| s.parse().ok()),
            year: self.year,
            broadcast: self.broadcast.and_then(|b| b.string),
        }
    }

    pub fn into_detail(mut self) -> AnimeDetail {
        let title_japanese = self.title_japanese.take();
        let trailer_url = self.trailer.take().and_then(|t| {
            t.url.or_else(|| {
                t.youtube_id
                    .map(|id| format!("https://www.youtube.com/watch?v={id}"))
            })
        });
        let duration = self.duration.take();
        let (rank, popularity, members) = (self.rank, self.popularity, self.members);
        let studios = std::mem::take(&mut self.studios)
            .into_iter()
            .map(|s| s.name)
            .collect();
        let background = self.background.take();
        let streaming = std::mem::take(&mut self.streaming)
            .into_iter()
            .map(|s| StreamingLink {
                name: s.name,
                url: s.url,
            })
            .collect();

        AnimeDetail {
            entry: self.into_entry(),
            title_japanese,
            trailer_url,
            duration,
            rank,
            popularity,
            members,
            studios,
            background,
            streaming,
        }
    }
}

// ── Watch feeds ─────────────────────────────────────────────────

/// Item from `watch/episodes*` or `watch/promos*`.
#[derive(Debug, Deserialize)]
pub struct RawWatchItem {
    pub entry: RawAnime,
    #[serde(default)]
    pub episodes: Vec<RawWatchEpisode>,
}

#[derive(Debug, Deserialize)]
pub struct RawWatchEpisode {
    #[serde(default)]
    pub title: String,
}

impl RawWatchItem {
    pub fn into_feed_item(self) -> FeedItem {
        FeedItem {
            entry: self.entry.into_entry(),
            episode_titles: self.episodes.into_iter().map(|e| e.title).collect(),
        }
    }
}

// ── Seasons / taxonomy ──────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawSeasonYear {
    pub year: i32,
    #[serde(default)]
    pub seasons: Vec<String>,
}

impl RawSeasonYear {
    /// Unknown season names are skipped.
    pub fn into_archive_year(self) -> ArchiveYear {
        ArchiveYear {
            year: self.year,
            seasons: self
                .seasons
                .iter()
                .filter_map(|s| s.parse::<AnimeSeason>().ok())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawGenre {
    pub mal_id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

impl RawGenre {
    pub fn into_taxonomy(self) -> TaxonomyEntry {
        TaxonomyEntry {
            id: self.mal_id,
            name: self.name,
            count: self.count,
        }
    }
}

// ── Characters ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RawCharacter {
    pub mal_id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_kanji: Option<String>,
    #[serde(default)]
    pub nicknames: Vec<String>,
    #[serde(default)]
    pub images: RawImages,
    #[serde(default)]
    pub favorites: Option<u32>,
    #[serde(default)]
    pub about: Option<String>,
}

impl RawCharacter {
    pub fn into_character(self) -> CharacterEntry {
        CharacterEntry {
            id: self.mal_id,
            name: self.name.unwrap_or_default(),
            name_kanji: self.name_kanji,
            alternate_names: self.nicknames,
            image_url: self.images.best(),
            favorites_count: self.favorites.unwrap_or(0),
            biography: self.about,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawCharacterAnime {
    #[serde(default)]
    pub role: String,
    pub anime: RawAnime,
}

impl RawCharacterAnime {
    pub fn into_role(self, character_id: u64) -> RoleAssociation {
        let entry = self.anime.into_entry();
        RoleAssociation {
            character_id,
            entry_id: entry.id,
            entry_title: entry.title,
            entry_image: entry.image_url,
            role: RoleKind::from_tag(&self.role),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawVoice {
    #[serde(default)]
    pub language: String,
    pub person: RawPerson,
}

#[derive(Debug, Deserialize)]
pub struct RawPerson {
    pub mal_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: RawImages,
}

impl RawVoice {
    pub fn into_voice(self, character_id: u64) -> VoiceAssociation {
        VoiceAssociation {
            character_id,
            person_id: self.person.mal_id,
            person_name: self.person.name,
            person_image: self.person.images.best(),
            language: self.language,
        }
    }
}

/// Picture set entries come either nested per format or flat.
#[derive(Debug, Deserialize)]
pub struct RawPicture {
    #[serde(flatten)]
    pub images: RawImages,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub large_image_url: Option<String>,
}

impl RawPicture {
    pub fn into_url(self) -> Option<String> {
        self.large_image_url
            .or(self.image_url)
            .or_else(|| self.images.best())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_anime_list() {
        let json = r#"{
            "pagination": {
                "last_visible_page": 40,
                "has_next_page": true,
                "items": {"count": 1, "total": 1000, "per_page": 1}
            },
            "data": [
                {
                    "mal_id": 52991,
                    "title": "Sousou no Frieren",
                    "title_english": "Frieren: Beyond Journey's End",
                    "images": {
                        "jpg": {
                            "image_url": "https://cdn.myanimelist.net/images/anime/1015/138006.jpg",
                            "large_image_url": "https://cdn.myanimelist.net/images/anime/1015/138006l.jpg"
                        },
                        "webp": {
                            "image_url": "https://cdn.myanimelist.net/images/anime/1015/138006.webp",
                            "large_image_url": "https://cdn.myanimelist.net/images/anime/1015/138006l.webp"
                        }
                    },
                    "type": "TV",
                    "episodes": 28,
                    "status": "Finished Airing",
                    "aired": {
                        "from": "2023-09-29T00:00:00+00:00",
                        "to": "2024-03-22T00:00:00+00:00",
                        "string": "Sep 29, 2023 to Mar 22, 2024"
                    },
                    "rating": "PG-13 - Teens 13 or older",
                    "score": 9.31,
                    "synopsis": "During their decade-long quest...",
                    "season": "fall",
                    "year": 2023,
                    "broadcast": {"day": "Fridays", "time": "23:00", "string": "Fridays at 23:00 (JST)"},
                    "genres": [
                        {"mal_id": 2, "type": "anime", "name": "Adventure", "url": "x"},
                        {"mal_id": 8, "type": "anime", "name": "Drama", "url": "x"}
                    ]
                }
            ]
        }"#;

        let list: RawList<RawAnime> = serde_json::from_str(json).unwrap();
        let page = list.into_page(RawAnime::into_entry);
        assert!(page.has_next_page);
        assert_eq!(page.last_visible_page, Some(40));

        let entry = &page.items[0];
        assert_eq!(entry.id, 52991);
        assert_eq!(entry.title, "Sousou no Frieren");
        assert_eq!(
            entry.image_url.as_deref(),
            Some("https://cdn.myanimelist.net/images/anime/1015/138006l.webp")
        );
        assert_eq!(entry.media_type.as_deref(), Some("TV"));
        assert_eq!(entry.episodes, Some(28));
        assert_eq!(entry.season, Some(AnimeSeason::Fall));
        assert_eq!(entry.genres.len(), 2);
        assert_eq!(entry.genres[1].name, "Drama");
        assert_eq!(
            entry.aired.label.as_deref(),
            Some("Sep 29, 2023 to Mar 22, 2024")
        );
        assert_eq!(entry.broadcast.as_deref(), Some("Fridays at 23:00 (JST)"));
    }

    #[test]
    fn test_missing_fields_normalize_to_defaults() {
        let json = r#"{"data": [{"mal_id": 1, "title": null, "score": null, "season": null}]}"#;
        let list: RawList<RawAnime> = serde_json::from_str(json).unwrap();
        assert!(!list.has_next_page());

        let page = list.into_page(RawAnime::into_entry);
        let entry = &page.items[0];
        assert_eq!(entry.title, "");
        assert!(entry.image_url.is_none());
        assert!(entry.score.is_none());
        assert!(entry.genres.is_empty());
        assert_eq!(entry.aired, AirDateRange::default());
    }

    #[test]
    fn test_image_fallback_order() {
        let images = RawImages {
            jpg: Some(RawImageUrls {
                image_url: Some("small.jpg".into()),
                large_image_url: None,
            }),
            webp: Some(RawImageUrls {
                image_url: Some("small.webp".into()),
                large_image_url: None,
            }),
        };
        assert_eq!(images.best().as_deref(), Some("small.jpg"));
        assert_eq!(RawImages::default().best(), None);
    }

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "data": {
                "mal_id": 5114,
                "title": "Fullmetal Alchemist: Brotherhood",
                "title_japanese": "鋼の錬金術師 FULLMETAL ALCHEMIST",
                "images": {"jpg": {"image_url": "https://cdn.example/5114.jpg"}},
                "trailer": {"youtube_id": "--IcmZkvL0Q", "url": null},
                "duration": "24 min per ep",
                "rank": 1,
                "popularity": 3,
                "members": 3400000,
                "studios": [{"mal_id": 4, "type": "anime", "name": "Bones", "url": "x"}],
                "background": null,
                "streaming": [{"name": "Crunchyroll", "url": "http://www.crunchyroll.com/series-271"}]
            }
        }"#;

        let item: RawItem<RawAnime> = serde_json::from_str(json).unwrap();
        let detail = item.data.into_detail();
        assert_eq!(detail.entry.id, 5114);
        assert_eq!(
            detail.trailer_url.as_deref(),
            Some("https://www.youtube.com/watch?v=--IcmZkvL0Q")
        );
        assert_eq!(detail.rank, Some(1));
        assert_eq!(detail.studios, vec!["Bones".to_string()]);
        assert_eq!(detail.streaming[0].name, "Crunchyroll");
        assert!(detail.background.is_none());
    }

    #[test]
    fn test_deserialize_watch_episodes() {
        let json = r#"{
            "data": [
                {
                    "entry": {
                        "mal_id": 58567,
                        "url": "https://myanimelist.net/anime/58567",
                        "images": {"webp": {"large_image_url": "https://cdn.example/58567l.webp"}},
                        "title": "Ore dake Level Up na Ken Season 2"
                    },
                    "episodes": [
                        {"mal_id": 5, "url": "x", "title": "Episode 5", "premium": false},
                        {"mal_id": 4, "url": "x", "title": "Episode 4", "premium": false}
                    ],
                    "region_locked": false
                }
            ],
            "pagination": {"last_visible_page": 1, "has_next_page": false}
        }"#;

        let list: RawList<RawWatchItem> = serde_json::from_str(json).unwrap();
        let items: Vec<FeedItem> = list.data.into_iter().map(RawWatchItem::into_feed_item).collect();
        assert_eq!(items[0].entry.id, 58567);
        assert_eq!(items[0].episode_titles, vec!["Episode 5", "Episode 4"]);
    }

    #[test]
    fn test_deserialize_season_directory() {
        let json = r#"{
            "data": [
                {"year": 2024, "seasons": ["winter", "spring", "summer", "fall"]},
                {"year": 1917, "seasons": ["winter", "bogus"]}
            ]
        }"#;

        let list: RawList<RawSeasonYear> = serde_json::from_str(json).unwrap();
        let years: Vec<ArchiveYear> = list
            .data
            .into_iter()
            .map(RawSeasonYear::into_archive_year)
            .collect();
        assert_eq!(years[0].seasons.len(), 4);
        assert_eq!(years[1].seasons, vec![AnimeSeason::Winter]);
    }

    #[test]
    fn test_deserialize_character_associations() {
        let roles = r#"{
            "data": [
                {"role": "Main", "anime": {"mal_id": 20, "title": "Naruto", "images": {}}},
                {"role": "Supporting", "anime": {"mal_id": 1735, "title": "Naruto: Shippuuden"}}
            ]
        }"#;
        let list: RawList<RawCharacterAnime> = serde_json::from_str(roles).unwrap();
        let roles: Vec<RoleAssociation> = list.data.into_iter().map(|r| r.into_role(17)).collect();
        assert_eq!(roles[0].role, RoleKind::Main);
        assert_eq!(roles[1].entry_title, "Naruto: Shippuuden");
        assert_eq!(roles[1].character_id, 17);

        let voices = r#"{
            "data": [
                {
                    "language": "Japanese",
                    "person": {
                        "mal_id": 16,
                        "name": "Takeuchi, Junko",
                        "images": {"jpg": {"image_url": "https://cdn.example/16.jpg"}}
                    }
                }
            ]
        }"#;
        let list: RawList<RawVoice> = serde_json::from_str(voices).unwrap();
        let voice = list.data.into_iter().next().unwrap().into_voice(17);
        assert_eq!(voice.language, "Japanese");
        assert_eq!(voice.person_image.as_deref(), Some("https://cdn.example/16.jpg"));
    }

    #[test]
    fn test_deserialize_character() {
        let json = r#"{
            "data": {
                "mal_id": 40,
                "name": "Luffy Monkey D.",
                "name_kanji": "モンキー・D・ルフィ",
                "nicknames": ["Straw Hat Luffy"],
                "favorites": 123456,
                "images": {"jpg": {"image_url": "https://cdn.example/40.jpg"}},
                "about": null
            }
        }"#;
        let item: RawItem<RawCharacter> = serde_json::from_str(json).unwrap();
        let character = item.data.into_character();
        assert_eq!(character.name, "Luffy Monkey D.");
        assert_eq!(character.alternate_names, vec!["Straw Hat Luffy"]);
        assert_eq!(character.favorites_count, 123456);
    }

    #[test]
    fn test_picture_shapes() {
        let nested: RawPicture =
            serde_json::from_str(r#"{"jpg": {"image_url": "a.jpg"}}"#).unwrap();
        assert_eq!(nested.into_url().as_deref(), Some("a.jpg"));

        let flat: RawPicture =
            serde_json::from_str(r#"{"image_url": "b.jpg", "large_image_url": "b_l.jpg"}"#)
                .unwrap();
        assert_eq!(flat.into_url().as_deref(), Some("b_l.jpg"));
    }
}
