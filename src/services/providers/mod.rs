//! Movie catalog provider abstraction
//!
//! The shell and the genre showcase only ever talk to a `CatalogProvider`, so
//! TMDB can be swapped for a fake in tests or another catalog later.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{CatalogFilter, Movie, MovieId},
};

pub mod tmdb;

/// Trait for movie catalog providers
///
/// An empty result is a legitimate answer, not an error: callers decide how to
/// present "nothing matched".
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch candidate movies matching `filter`
    async fn fetch_catalog(&self, filter: &CatalogFilter) -> AppResult<Vec<Movie>>;

    /// Resolve the IMDb page for a movie, if the catalog knows one
    async fn imdb_link(&self, movie_id: MovieId) -> AppResult<Option<String>>;

    /// Fetch several catalogs in parallel
    ///
    /// Results keep the order of `filters`. Filters whose fetch fails are
    /// logged and skipped; the call only fails when every fetch failed.
    async fn fetch_catalog_batch(
        &self,
        filters: Vec<CatalogFilter>,
    ) -> AppResult<Vec<(CatalogFilter, Vec<Movie>)>> {
        tracing::info!(
            provider = self.name(),
            filters = filters.len(),
            "Fetching catalog batch"
        );

        let mut tasks = Vec::new();

        for filter in filters {
            let provider = self.clone_for_task();
            let task = tokio::spawn(async move {
                let movies = provider.fetch_catalog(&filter).await?;
                Ok::<_, AppError>((filter, movies))
            });
            tasks.push(task);
        }

        let mut results = Vec::new();
        let mut errors = Vec::new();

        for task in tasks {
            match task.await {
                Ok(Ok(catalog)) => results.push(catalog),
                Ok(Err(e)) => {
                    tracing::error!(error = %e, "Catalog fetch failed");
                    errors.push(e);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                    errors.push(AppError::Internal(e.to_string()));
                }
            }
        }

        if !errors.is_empty() {
            tracing::warn!(
                success_count = results.len(),
                error_count = errors.len(),
                "Partial catalog fetch failure"
            );
        }

        if results.is_empty() && !errors.is_empty() {
            return Err(AppError::ExternalApi(
                "Failed to fetch any catalog data".to_string(),
            ));
        }

        Ok(results)
    }

    /// Clone provider for parallel task execution
    fn clone_for_task(&self) -> Box<dyn CatalogProvider>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Resolve IMDb links for `movie_ids` in parallel, one task per distinct movie
///
/// Movies without a link, or whose lookup failed, are absent from the result.
/// Failures are logged and never fail the whole call.
pub async fn resolve_imdb_links(
    provider: &Arc<dyn CatalogProvider>,
    movie_ids: Vec<MovieId>,
) -> HashMap<MovieId, String> {
    let distinct: HashSet<MovieId> = movie_ids.into_iter().collect();
    let mut tasks = Vec::with_capacity(distinct.len());

    for movie_id in distinct {
        let provider = Arc::clone(provider);
        let task = tokio::spawn(async move { (movie_id, provider.imdb_link(movie_id).await) });
        tasks.push(task);
    }

    let mut links = HashMap::new();
    let mut failures = 0usize;

    for task in tasks {
        match task.await {
            Ok((movie_id, Ok(Some(link)))) => {
                links.insert(movie_id, link);
            }
            Ok((_, Ok(None))) => {}
            Ok((movie_id, Err(e))) => {
                tracing::warn!(movie_id = %movie_id, error = %e, "IMDb link lookup failed");
                failures += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "IMDb link task join error");
                failures += 1;
            }
        }
    }

    tracing::debug!(
        provider = provider.name(),
        resolved = links.len(),
        failures,
        "IMDb links resolved"
    );

    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolve_imdb_links_skips_failures_and_dedupes() {
        let mut provider = MockCatalogProvider::new();
        provider
            .expect_imdb_link()
            .times(3)
            .returning(|id| match id.0 {
                1 => Ok(Some("https://www.imdb.com/title/tt1/".to_string())),
                2 => Ok(None),
                _ => Err(AppError::ExternalApi("lookup failed".to_string())),
            });
        provider.expect_name().return_const("mock");
        let provider: Arc<dyn CatalogProvider> = Arc::new(provider);

        let links = resolve_imdb_links(
            &provider,
            vec![MovieId(1), MovieId(2), MovieId(3), MovieId(1)],
        )
        .await;

        assert_eq!(links.len(), 1);
        assert_eq!(links[&MovieId(1)], "https://www.imdb.com/title/tt1/");
    }
}
