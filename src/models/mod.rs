use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::services::matcher::Candidate;

pub mod catalog;
pub mod preferences;
pub mod session;

pub use catalog::{CatalogFilter, Genre, Language};
pub use preferences::{BoundedRange, ContentRating, Mood, PreferenceForm};
pub use session::{ChatTurn, Phase, Recommendation, SessionState, Speaker};

/// Base URL for TMDB poster images at the width the cards use
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w300";

/// Base URL for IMDb title pages
pub const IMDB_TITLE_BASE_URL: &str = "https://www.imdb.com/title";

/// TMDB movie identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A movie eligible for recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Synopsis; empty when the catalog has none
    pub overview: String,
    pub poster_path: Option<String>,
}

impl Movie {
    /// Full poster image URL, if the movie has a poster
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| format!("{}{}", POSTER_BASE_URL, path))
    }
}

impl Candidate for Movie {
    fn synopsis(&self) -> &str {
        &self.overview
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Paged list response from `/movie/popular` and `/discover/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
}

/// Raw movie entry from TMDB
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl From<TmdbMovie> for Movie {
    fn from(movie: TmdbMovie) -> Self {
        Movie {
            id: MovieId(movie.id),
            title: movie.title,
            overview: movie.overview.unwrap_or_default(),
            poster_path: movie.poster_path,
        }
    }
}

/// Response from `/movie/{id}/external_ids`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
}

impl TmdbExternalIds {
    /// IMDb page for the movie, when TMDB knows its IMDb id
    pub fn imdb_url(&self) -> Option<String> {
        self.imdb_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| format!("{}/{}/", IMDB_TITLE_BASE_URL, id))
    }
}
