use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{
        preferences::{LENGTH_BOUNDS, RELEASE_YEAR_BOUNDS},
        BoundedRange, ContentRating, Genre, Language, Mood, SessionState,
    },
    services::{render, showcase, Event, View},
};

use super::AppState;

// Response types

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub genres: Vec<&'static str>,
    pub languages: Vec<&'static str>,
    pub moods: Vec<&'static str>,
    pub content_ratings: Vec<&'static str>,
    pub length_bounds: BoundedRange,
    pub release_year_bounds: BoundedRange,
}

#[derive(Debug, Serialize)]
pub struct ShowcaseResponse {
    pub shelves: Vec<showcase::GenreShelf>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// Choices for the preferences form
pub async fn get_options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        genres: Genre::ALL.iter().map(|g| g.name()).collect(),
        languages: Language::ALL.iter().map(|l| l.name()).collect(),
        moods: Mood::ALL.iter().map(|m| m.name()).collect(),
        content_ratings: ContentRating::ALL.iter().map(|c| c.name()).collect(),
        length_bounds: LENGTH_BOUNDS,
        release_year_bounds: RELEASE_YEAR_BOUNDS,
    })
}

/// Top movies for every genre
pub async fn get_genre_showcase(
    State(state): State<AppState>,
) -> AppResult<Json<ShowcaseResponse>> {
    let shelves = showcase::top_movies_by_genre(state.catalog.clone(), state.showcase_size).await?;
    Ok(Json(ShowcaseResponse { shelves }))
}

/// Open a new session
pub async fn create_session(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> (StatusCode, Json<View>) {
    let session = state.shell.open_session().await;

    tracing::info!(
        request_id = %request_id,
        session_id = %session.id,
        "Session created"
    );

    let view = build_view(&state, &session).await;
    state.insert_session(session).await;
    (StatusCode::CREATED, Json(view))
}

/// Current view of a session
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<Json<View>> {
    let session = state.session(session_id).await?;
    Ok(Json(build_view(&state, &session).await))
}

/// Apply one user action to a session
pub async fn post_event(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(session_id): Path<Uuid>,
    Json(event): Json<Event>,
) -> AppResult<Json<View>> {
    tracing::info!(
        request_id = %request_id,
        session_id = %session_id,
        event = ?event,
        "Processing session event"
    );

    let session = state.apply_event(session_id, event).await?;
    Ok(Json(build_view(&state, &session).await))
}

/// Close a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.remove_session(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn build_view(state: &AppState, session: &SessionState) -> View {
    let mut view = render(session, state.shell.settings().trending_window);
    state.shell.attach_links(&mut view).await;
    view
}
