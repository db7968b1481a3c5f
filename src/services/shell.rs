//! Presentation shell: turns user actions into session state transitions.
//!
//! Each interaction is one explicit [`Event`] applied to a [`SessionState`]
//! by [`Shell::handle`]; the result is shown through the pure [`render`]
//! function. Phases move `Idle → Browsing → Recommending → Viewing`:
//!
//! | Event                | Allowed in | Result                                                 |
//! |----------------------|------------|--------------------------------------------------------|
//! | (any, while `Idle`)  | Idle       | trending is fetched first; `Browsing` on success       |
//! | `trending_next/prev` | any        | carousel moves one step, wrapping                      |
//! | `submit_preferences` | any        | `Viewing` with a pick, or `Recommending` with a notice |
//! | `recommend_another`  | Viewing    | new pick from the same pool                            |
//! | `new_search`         | any        | search cleared, back to `Browsing`                     |
//! | `chat`               | any        | phase unchanged; reply or notice                       |

use std::sync::{Arc, Mutex};

use chrono::Utc;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        CatalogFilter, ChatTurn, Movie, MovieId, Phase, PreferenceForm, Recommendation,
        SessionState, Speaker,
    },
    services::{
        chat::ChatResponder,
        matcher::{self, MatchBasis},
        providers::{resolve_imdb_links, CatalogProvider},
    },
};

pub const NO_MATCHES_NOTICE: &str =
    "No movies found matching your preferences. Try different options.";

/// A user action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TrendingNext,
    TrendingPrev,
    SubmitPreferences { preferences: PreferenceForm },
    RecommendAnother,
    NewSearch,
    Chat { message: String },
}

impl Event {
    fn name(&self) -> &'static str {
        match self {
            Event::TrendingNext => "trending_next",
            Event::TrendingPrev => "trending_prev",
            Event::SubmitPreferences { .. } => "submit_preferences",
            Event::RecommendAnother => "recommend_another",
            Event::NewSearch => "new_search",
            Event::Chat { .. } => "chat",
        }
    }
}

/// Tunables for the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellSettings {
    pub top_k: usize,
    pub chat_history_limit: usize,
    pub trending_window: usize,
}

impl Default for ShellSettings {
    fn default() -> Self {
        Self {
            top_k: matcher::DEFAULT_TOP_K,
            chat_history_limit: 5,
            trending_window: 5,
        }
    }
}

impl From<&Config> for ShellSettings {
    fn from(config: &Config) -> Self {
        Self {
            top_k: config.top_k,
            chat_history_limit: config.chat_history_limit,
            trending_window: config.trending_window,
        }
    }
}

/// Drives sessions against the catalog and chat capabilities
pub struct Shell {
    catalog: Arc<dyn CatalogProvider>,
    chat: Arc<dyn ChatResponder>,
    settings: ShellSettings,
    rng: Mutex<StdRng>,
}

impl Shell {
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        chat: Arc<dyn ChatResponder>,
        settings: ShellSettings,
        rng: StdRng,
    ) -> Self {
        Self {
            catalog,
            chat,
            settings,
            rng: Mutex::new(rng),
        }
    }

    pub fn settings(&self) -> ShellSettings {
        self.settings
    }

    /// Starts a session and tries to load the trending carousel
    pub async fn open_session(&self) -> SessionState {
        let mut state = SessionState::new();
        self.load_trending(&mut state).await;
        tracing::info!(session_id = %state.id, phase = ?state.phase, "Session opened");
        state
    }

    /// Applies one user action to `state`
    ///
    /// The previous notice is cleared up front, and an idle session retries
    /// its trending load, so on error `state` may already differ from its
    /// input. Callers that must keep the old state apply events to a copy.
    pub async fn handle(&self, state: &mut SessionState, event: Event) -> AppResult<()> {
        state.notice = None;
        if state.phase == Phase::Idle {
            self.load_trending(state).await;
        }

        let event_name = event.name();
        match event {
            Event::TrendingNext => state.step_trending(1),
            Event::TrendingPrev => state.step_trending(-1),
            Event::SubmitPreferences { preferences } => {
                self.submit_preferences(state, preferences).await?
            }
            Event::RecommendAnother => self.recommend_another(state)?,
            Event::NewSearch => {
                state.clear_search();
                state.phase = idle_or_browsing(state);
            }
            Event::Chat { message } => self.send_chat(state, message).await,
        }

        state.updated_at = Utc::now();
        tracing::info!(
            session_id = %state.id,
            event = event_name,
            phase = ?state.phase,
            "Session event handled"
        );
        Ok(())
    }

    /// Fills `imdb_url` on every card of `view` from the catalog
    ///
    /// Lookups run in parallel. Failures are logged and leave the link empty.
    pub async fn attach_links(&self, view: &mut View) {
        let movie_ids = view.cards_mut().map(|card| card.id).collect();
        let links = resolve_imdb_links(&self.catalog, movie_ids).await;
        for card in view.cards_mut() {
            card.imdb_url = links.get(&card.id).cloned();
        }
    }

    async fn load_trending(&self, state: &mut SessionState) {
        match self.catalog.fetch_catalog(&CatalogFilter::trending()).await {
            Ok(movies) => {
                state.trending = movies;
                state.trending_index = 0;
                state.phase = Phase::Browsing;
            }
            Err(e) => {
                tracing::warn!(session_id = %state.id, error = %e, "Trending fetch failed");
                state.notice = Some(format!("Could not load trending movies: {}", e));
            }
        }
    }

    async fn submit_preferences(
        &self,
        state: &mut SessionState,
        preferences: PreferenceForm,
    ) -> AppResult<()> {
        preferences.validate()?;

        let candidates = self
            .catalog
            .fetch_catalog(&preferences.catalog_filter())
            .await?;
        let query = preferences.query_text();

        state.recommendation = self.pick(&candidates, &query)?;
        state.preferences = Some(preferences);
        state.candidates = candidates;

        if state.recommendation.is_some() {
            state.phase = Phase::Viewing;
        } else {
            state.phase = Phase::Recommending;
            state.notice = Some(NO_MATCHES_NOTICE.to_string());
        }
        Ok(())
    }

    fn recommend_another(&self, state: &mut SessionState) -> AppResult<()> {
        let query = match (state.phase, &state.preferences) {
            (Phase::Viewing, Some(preferences)) => preferences.query_text(),
            _ => {
                return Err(AppError::InvalidInput(
                    "No recommendation to replace; submit preferences first".to_string(),
                ))
            }
        };

        if let Some(recommendation) = self.pick(&state.candidates, &query)? {
            state.recommendation = Some(recommendation);
        }
        Ok(())
    }

    async fn send_chat(&self, state: &mut SessionState, message: String) {
        let message = message.trim();
        if message.is_empty() {
            return;
        }

        match self.chat.respond(message).await {
            Ok(reply) => {
                let limit = self.settings.chat_history_limit;
                state.push_chat(ChatTurn::new(Speaker::You, message), limit);
                state.push_chat(ChatTurn::new(Speaker::Chatbot, reply), limit);
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %state.id,
                    responder = self.chat.name(),
                    error = %e,
                    "Chat reply failed"
                );
                state.notice = Some(format!("Chatbot unavailable: {}", e));
            }
        }
    }

    fn pick(&self, candidates: &[Movie], query: &str) -> AppResult<Option<Recommendation>> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| AppError::Internal("Random source lock poisoned".to_string()))?;

        Ok(
            matcher::recommend(candidates, query, self.settings.top_k, &mut *rng).map(|found| {
                Recommendation {
                    movie: found.candidate.clone(),
                    basis: found.basis,
                }
            }),
        )
    }
}

/// A session whose trending list never loaded stays idle
fn idle_or_browsing(state: &SessionState) -> Phase {
    if state.phase == Phase::Idle {
        Phase::Idle
    } else {
        Phase::Browsing
    }
}

// ============================================================================
// View model
// ============================================================================

/// A movie as shown on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieCard {
    pub id: MovieId,
    pub title: String,
    pub poster_url: Option<String>,
    pub imdb_url: Option<String>,
}

impl From<&Movie> for MovieCard {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            poster_url: movie.poster_url(),
            imdb_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationView {
    pub card: MovieCard,
    pub overview: String,
    pub basis: MatchBasis,
}

/// Everything a front-end needs to draw one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub session_id: Uuid,
    pub phase: Phase,
    pub trending: Vec<MovieCard>,
    pub trending_index: usize,
    pub preferences: Option<PreferenceForm>,
    pub recommendation: Option<RecommendationView>,
    pub chat_history: Vec<ChatTurn>,
    pub notice: Option<String>,
}

impl View {
    /// Carousel cards followed by the recommendation card, if any
    fn cards_mut(&mut self) -> impl Iterator<Item = &mut MovieCard> {
        self.trending.iter_mut().chain(
            self.recommendation
                .as_mut()
                .map(|recommendation| &mut recommendation.card),
        )
    }
}

/// Builds the view of `state`, showing `trending_window` carousel cards
pub fn render(state: &SessionState, trending_window: usize) -> View {
    View {
        session_id: state.id,
        phase: state.phase,
        trending: state
            .trending_window(trending_window)
            .into_iter()
            .map(MovieCard::from)
            .collect(),
        trending_index: state.trending_index,
        preferences: state.preferences.clone(),
        recommendation: state
            .recommendation
            .as_ref()
            .map(|recommendation| RecommendationView {
                card: MovieCard::from(&recommendation.movie),
                overview: recommendation.movie.overview.clone(),
                basis: recommendation.basis,
            }),
        chat_history: state.chat_history.clone(),
        notice: state.notice.clone(),
    }
}
