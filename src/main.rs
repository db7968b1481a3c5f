use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rand::{rngs::StdRng, SeedableRng};

use cinematch::{
    api::{create_router, AppState},
    config::Config,
    services::{
        chat::openai::OpenAiChat,
        providers::{tmdb::TmdbProvider, CatalogProvider},
        Shell, ShellSettings,
    },
};

const SESSION_SWEEP_PERIOD: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let catalog: Arc<dyn CatalogProvider> = Arc::new(TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
    ));
    let chat = Arc::new(OpenAiChat::new(
        config.openai_api_key.clone(),
        config.openai_api_url.clone(),
        config.openai_model.clone(),
    ));

    let rng = match config.recommender_seed {
        Some(seed) => {
            tracing::info!(seed, "Using fixed recommendation seed");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };

    let shell = Shell::new(catalog.clone(), chat, ShellSettings::from(&config), rng);
    let state = AppState::new(shell, catalog, config.showcase_size, config.session_ttl());
    state.spawn_session_sweeper(SESSION_SWEEP_PERIOD);
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!(address = %address, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
