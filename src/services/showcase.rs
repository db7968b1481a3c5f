use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{CatalogFilter, Genre},
    services::{
        providers::{resolve_imdb_links, CatalogProvider},
        shell::MovieCard,
    },
};

/// The first few movies of one genre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreShelf {
    pub genre: Genre,
    pub movies: Vec<MovieCard>,
}

/// Top movies for every genre, fetched in parallel and linked to IMDb
///
/// Genres whose fetch fails are left out; see
/// [`CatalogProvider::fetch_catalog_batch`]. A failed link lookup only leaves
/// that card without `imdb_url`.
pub async fn top_movies_by_genre(
    provider: Arc<dyn CatalogProvider>,
    per_genre: usize,
) -> AppResult<Vec<GenreShelf>> {
    let filters = Genre::ALL.iter().copied().map(CatalogFilter::by_genre).collect();
    let catalogs = provider.fetch_catalog_batch(filters).await?;

    let mut shelves: Vec<GenreShelf> = catalogs
        .into_iter()
        .filter_map(|(filter, movies)| {
            let genre = filter.genre?;
            Some(GenreShelf {
                genre,
                movies: movies.iter().take(per_genre).map(MovieCard::from).collect(),
            })
        })
        .collect();

    let movie_ids = shelves
        .iter()
        .flat_map(|shelf| shelf.movies.iter().map(|card| card.id))
        .collect();
    let links = resolve_imdb_links(&provider, movie_ids).await;
    for card in shelves.iter_mut().flat_map(|shelf| shelf.movies.iter_mut()) {
        card.imdb_url = links.get(&card.id).cloned();
    }

    tracing::info!(
        shelves = shelves.len(),
        per_genre,
        provider = provider.name(),
        "Genre showcase built"
    );

    Ok(shelves)
}
