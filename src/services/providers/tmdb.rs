//! TMDB catalog provider
//!
//! API Flow:
//! 1. Trending: /movie/popular → first page of popular movies
//! 2. Filtered: /discover/movie with optional `with_genres` / `with_original_language`
//! 3. IMDb link: /movie/{id}/external_ids → IMDb id, if TMDB has one
use crate::{
    error::{AppError, AppResult},
    models::{CatalogFilter, Movie, MovieId, TmdbExternalIds, TmdbPage},
    services::providers::CatalogProvider,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

const POPULAR_PATH: &str = "/movie/popular";
const DISCOVER_PATH: &str = "/discover/movie";
const RESPONSE_LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Path and query parameters (minus the API key) for a catalog filter
    fn catalog_request(filter: &CatalogFilter) -> (&'static str, Vec<(&'static str, String)>) {
        let mut params = vec![("language", RESPONSE_LANGUAGE.to_string())];

        if filter.trending {
            params.push(("page", "1".to_string()));
            return (POPULAR_PATH, params);
        }

        if let Some(genre) = filter.genre {
            params.push(("with_genres", genre.tmdb_id().to_string()));
        }
        if let Some(language) = filter.language {
            params.push(("with_original_language", language.code().to_string()));
        }
        (DISCOVER_PATH, params)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "API returned status {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn fetch_catalog(&self, filter: &CatalogFilter) -> AppResult<Vec<Movie>> {
        let (path, params) = Self::catalog_request(filter);
        let page: TmdbPage = self.get_json(path, &params).await?;
        let movies: Vec<Movie> = page.results.into_iter().map(Movie::from).collect();

        tracing::info!(
            trending = filter.trending,
            genre = ?filter.genre,
            language = ?filter.language,
            results = movies.len(),
            provider = "tmdb",
            "Catalog fetched"
        );

        Ok(movies)
    }

    async fn imdb_link(&self, movie_id: MovieId) -> AppResult<Option<String>> {
        let path = format!("/movie/{}/external_ids", movie_id);
        let ids: TmdbExternalIds = self.get_json(&path, &[]).await?;
        Ok(ids.imdb_url())
    }

    fn clone_for_task(&self) -> Box<dyn CatalogProvider> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
