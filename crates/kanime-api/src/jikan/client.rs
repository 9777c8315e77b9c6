use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{
    RawAnime, RawCharacter, RawCharacterAnime, RawError, RawGenre, RawItem, RawList, RawPicture,
    RawSeasonYear, RawVoice, RawWatchItem,
};
use crate::error::CatalogError;
use crate::params::{AnimeQuery, CharacterQuery, Endpoint, GenreFilter, QueryParams, WatchFeed};
use crate::traits::{
    AnimeDetail, ArchiveYear, CatalogEntry, CatalogService, CharacterEntry, FeedItem, Page,
    RoleAssociation, TaxonomyEntry, VoiceAssociation,
};

pub const DEFAULT_BASE_URL: &str = "https://api.jikan.moe/v4";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = concat!("kanime/", env!("CARGO_PKG_VERSION"));

/// Jikan v4 REST client. Read-only, no authentication, no retries.
pub struct JikanClient {
    base: Url,
    http: Client,
}

impl JikanClient {
    pub fn new() -> Result<Self, CatalogError> {
        Self::with_options(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_options(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        // Url::join drops the last segment unless the base ends in a slash.
        let base = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{base_url}/"))?
        };
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Turn a non-2xx response into `CatalogError::Status`, preferring the
    /// service's own message over the reason phrase.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<RawError>(&body)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").to_string());
        tracing::warn!(status = status.as_u16(), %message, "catalog request failed");
        Err(CatalogError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// GET one endpoint and decode the body as `T`.
    pub async fn query<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        params: &QueryParams,
    ) -> Result<T, CatalogError> {
        let url = self.base.join(&endpoint.path())?;
        tracing::debug!(%url, params = ?params.as_pairs(), "catalog request");

        let resp = self.http.get(url).query(params.as_pairs()).send().await?;
        let resp = Self::check_response(resp).await?;
        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// GET a list endpoint: `{ data: [...], pagination }`.
    pub async fn query_list<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        params: &QueryParams,
    ) -> Result<RawList<T>, CatalogError> {
        self.query(endpoint, params).await
    }

    async fn query_item<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, CatalogError> {
        let item: RawItem<T> = self.query(endpoint, &QueryParams::new()).await?;
        Ok(item.data)
    }
}

impl CatalogService for JikanClient {
    async fn anime_page(&self, query: &AnimeQuery) -> Result<Page<CatalogEntry>, CatalogError> {
        let list: RawList<RawAnime> = self.query_list(&query.endpoint(), &query.params()).await?;
        Ok(list.into_page(RawAnime::into_entry))
    }

    async fn character_page(
        &self,
        query: &CharacterQuery,
    ) -> Result<Page<CharacterEntry>, CatalogError> {
        let list: RawList<RawCharacter> =
            self.query_list(&query.endpoint(), &query.params()).await?;
        Ok(list.into_page(RawCharacter::into_character))
    }

    async fn anime(&self, id: u64) -> Result<CatalogEntry, CatalogError> {
        let raw: RawAnime = self.query_item(&Endpoint::Anime(id)).await?;
        Ok(raw.into_entry())
    }

    async fn anime_full(&self, id: u64) -> Result<AnimeDetail, CatalogError> {
        let raw: RawAnime = self.query_item(&Endpoint::AnimeFull(id)).await?;
        Ok(raw.into_detail())
    }

    async fn watch_feed(&self, feed: WatchFeed) -> Result<Vec<FeedItem>, CatalogError> {
        let list: RawList<RawWatchItem> = self
            .query_list(&Endpoint::Watch(feed), &QueryParams::new())
            .await?;
        Ok(list
            .data
            .into_iter()
            .map(RawWatchItem::into_feed_item)
            .collect())
    }

    async fn season_directory(&self) -> Result<Vec<ArchiveYear>, CatalogError> {
        let list: RawList<RawSeasonYear> = self
            .query_list(&Endpoint::SeasonList, &QueryParams::new())
            .await?;
        Ok(list
            .data
            .into_iter()
            .map(RawSeasonYear::into_archive_year)
            .collect())
    }

    async fn genres(&self, filter: Option<GenreFilter>) -> Result<Vec<TaxonomyEntry>, CatalogError> {
        let mut params = QueryParams::new();
        params.push_opt("filter", filter);
        let list: RawList<RawGenre> = self.query_list(&Endpoint::Genres, &params).await?;
        Ok(list.data.into_iter().map(RawGenre::into_taxonomy).collect())
    }

    async fn character(&self, id: u64) -> Result<CharacterEntry, CatalogError> {
        let raw: RawCharacter = self.query_item(&Endpoint::Character(id)).await?;
        Ok(raw.into_character())
    }

    async fn character_roles(&self, id: u64) -> Result<Vec<RoleAssociation>, CatalogError> {
        let list: RawList<RawCharacterAnime> = self
            .query_list(&Endpoint::CharacterAnime(id), &QueryParams::new())
            .await?;
        Ok(list.data.into_iter().map(|r| r.into_role(id)).collect())
    }

    async fn character_voices(&self, id: u64) -> Result<Vec<VoiceAssociation>, CatalogError> {
        let list: RawList<RawVoice> = self
            .query_list(&Endpoint::CharacterVoices(id), &QueryParams::new())
            .await?;
        Ok(list.data.into_iter().map(|v| v.into_voice(id)).collect())
    }

    async fn character_pictures(&self, id: u64) -> Result<Vec<String>, CatalogError> {
        let list: RawList<RawPicture> = self
            .query_list(&Endpoint::CharacterPictures(id), &QueryParams::new())
            .await?;
        Ok(list
            .data
            .into_iter()
            .filter_map(RawPicture::into_url)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{SeasonParams, TopAnimeParams, TopFilter};
    use crate::traits::{AnimeSeason, RoleKind};
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> JikanClient {
        JikanClient::with_options(&server.url(), Duration::from_secs(5)).unwrap()
    }

    fn anime_json(id: u64, title: &str) -> serde_json::Value {
        json!({
            "mal_id": id,
            "title": title,
            "images": {
                "webp": {"large_image_url": format!("https://cdn.example/{id}l.webp")}
            },
            "type": "TV",
            "score": 8.1
        })
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = JikanClient::with_options("https://api.jikan.moe/v4", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            client.base_url().join("top/anime").unwrap().as_str(),
            "https://api.jikan.moe/v4/top/anime"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = JikanClient::with_options("not a url", DEFAULT_TIMEOUT)
            .err()
            .unwrap();
        assert!(matches!(err, CatalogError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_top_anime_sends_only_present_params() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/top/anime")
            .match_query(Matcher::Exact("filter=airing&page=1&limit=12".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "data": [anime_json(1, "Cowboy Bebop"), anime_json(5, "Trigun")],
                    "pagination": {"last_visible_page": 9, "has_next_page": true}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let query = AnimeQuery::Top(TopAnimeParams {
            filter: Some(TopFilter::Airing),
            page: Some(1),
            limit: Some(12),
            ..Default::default()
        });
        let page = client_for(&server).anime_page(&query).await.unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].title, "Trigun");
        assert!(page.has_next_page);
        assert_eq!(page.last_visible_page, Some(9));
    }

    #[tokio::test]
    async fn test_season_flags() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/seasons/2023/fall")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sfw".into(), "true".into()),
                Matcher::UrlEncoded("continuing".into(), "true".into()),
                Matcher::UrlEncoded("limit".into(), "24".into()),
            ]))
            .with_status(200)
            .with_body(json!({"data": [anime_json(52991, "Sousou no Frieren")]}).to_string())
            .create_async()
            .await;

        let query = AnimeQuery::Season {
            year: 2023,
            season: AnimeSeason::Fall,
            params: SeasonParams {
                sfw: Some(true),
                continuing: Some(true),
                limit: Some(24),
                ..Default::default()
            },
        };
        let page = client_for(&server).anime_page(&query).await.unwrap();
        assert_eq!(page.items[0].id, 52991);
        assert!(!page.has_next_page);
    }

    #[tokio::test]
    async fn test_status_error_uses_service_message() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/anime/999999")
            .with_status(404)
            .with_body(
                json!({
                    "status": 404,
                    "type": "BadResponseException",
                    "message": "Resource does not exist",
                    "error": "404 on https://myanimelist.net/anime/999999/"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let err = client_for(&server).anime(999999).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        match err {
            CatalogError::Status { message, .. } => assert_eq!(message, "Resource does not exist"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_status_error_falls_back_to_reason() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/watch/episodes")
            .with_status(429)
            .create_async()
            .await;

        let err = client_for(&server)
            .watch_feed(WatchFeed::RecentEpisodes)
            .await
            .unwrap_err();
        match err {
            CatalogError::Status { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Too Many Requests");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_parse_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/seasons")
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let err = client_for(&server).season_directory().await.unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_character_roles_are_tagged() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/characters/17/anime")
            .with_status(200)
            .with_body(
                json!({
                    "data": [
                        {"role": "Main", "anime": anime_json(20, "Naruto")},
                        {"role": "Main", "anime": anime_json(1735, "Naruto: Shippuuden")},
                        {"role": "Supporting", "anime": anime_json(442, "Naruto Movie 1")}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let roles = client_for(&server).character_roles(17).await.unwrap();
        assert_eq!(roles.len(), 3);
        assert!(roles.iter().all(|r| r.character_id == 17));
        assert_eq!(roles[2].role, RoleKind::Supporting);
    }

    #[tokio::test]
    async fn test_genre_filter_param() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/genres/anime")
            .match_query(Matcher::UrlEncoded("filter".into(), "themes".into()))
            .with_status(200)
            .with_body(
                json!({
                    "data": [
                        {"mal_id": 50, "name": "Adult Cast", "url": "x", "count": 700},
                        {"mal_id": 51, "name": "Anthropomorphic", "url": "x", "count": 900}
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let genres = client_for(&server)
            .genres(Some(GenreFilter::Themes))
            .await
            .unwrap();
        assert_eq!(genres.len(), 2);
        assert_eq!(genres[1].count, 900);
    }
}
