use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum_test::TestServer;
use rand::{rngs::StdRng, SeedableRng};
use serde_json::{json, Value};

use cinematch::api::{create_router, AppState};
use cinematch::error::{AppError, AppResult};
use cinematch::models::{CatalogFilter, Genre, Movie, MovieId};
use cinematch::services::chat::ChatResponder;
use cinematch::services::providers::CatalogProvider;
use cinematch::services::{Shell, ShellSettings};

/// Deterministic in-memory catalog
#[derive(Clone)]
struct FakeCatalog {
    trending: Vec<Movie>,
    discover: Vec<Movie>,
    /// Genre whose fetch fails, to exercise partial batch failures
    broken_genre: Option<Genre>,
    /// Latency of non-trending fetches
    discover_delay: Duration,
}

fn movie(id: u64, title: &str, overview: &str) -> Movie {
    Movie {
        id: MovieId(id),
        title: title.to_string(),
        overview: overview.to_string(),
        poster_path: Some(format!("/poster{}.jpg", id)),
    }
}

impl FakeCatalog {
    fn new() -> Self {
        Self {
            trending: (1..=6)
                .map(|id| movie(id, &format!("Trending {}", id), "a popular movie"))
                .collect(),
            discover: vec![
                movie(100, "Night Crawl", "a dark intense thriller about crime"),
                movie(101, "Sunny Days", "a light-hearted family comedy"),
                movie(102, "Blank", ""),
            ],
            broken_genre: None,
            discover_delay: Duration::ZERO,
        }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for FakeCatalog {
    async fn fetch_catalog(&self, filter: &CatalogFilter) -> AppResult<Vec<Movie>> {
        if filter.trending {
            return Ok(self.trending.clone());
        }
        tokio::time::sleep(self.discover_delay).await;
        if filter.genre.is_some() && filter.genre == self.broken_genre {
            return Err(AppError::ExternalApi("genre unavailable".to_string()));
        }
        Ok(self.discover.clone())
    }

    async fn imdb_link(&self, movie_id: MovieId) -> AppResult<Option<String>> {
        Ok(Some(format!("https://www.imdb.com/title/tt{:07}/", movie_id.0)))
    }

    fn clone_for_task(&self) -> Box<dyn CatalogProvider> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

struct EchoChat {
    fail: bool,
}

#[async_trait::async_trait]
impl ChatResponder for EchoChat {
    async fn respond(&self, user_text: &str) -> AppResult<String> {
        if self.fail {
            return Err(AppError::ChatService("upstream unreachable".to_string()));
        }
        Ok(format!("Echo: {}", user_text))
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

fn create_server(catalog: FakeCatalog, chat_fails: bool) -> TestServer {
    let catalog: Arc<dyn CatalogProvider> = Arc::new(catalog);
    let shell = Shell::new(
        catalog.clone(),
        Arc::new(EchoChat { fail: chat_fails }),
        ShellSettings::default(),
        StdRng::seed_from_u64(42),
    );
    let state = AppState::new(shell, catalog, 5, chrono::Duration::minutes(30));
    TestServer::new(create_router(state)).unwrap()
}

fn create_test_server() -> TestServer {
    create_server(FakeCatalog::new(), false)
}

async fn open_session(server: &TestServer) -> String {
    let response = server.post("/sessions").await;
    response.assert_status(StatusCode::CREATED);
    let view: Value = response.json();
    view["session_id"].as_str().unwrap().to_string()
}

async fn send_event(server: &TestServer, session_id: &str, event: Value) -> Value {
    let response = server
        .post(&format!("/sessions/{}/events", session_id))
        .json(&event)
        .await;
    response.assert_status_ok();
    response.json()
}

fn thriller_preferences() -> Value {
    json!({
        "type": "submit_preferences",
        "preferences": {
            "genre": "Thriller",
            "language": "English",
            "mood": "Dark",
            "length": {"min": 90, "max": 120},
            "release_year": {"min": 2000, "max": 2025},
            "content": "Mature"
        }
    })
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_options() {
    let server = create_test_server();
    let response = server.get("/options").await;
    response.assert_status_ok();

    let options: Value = response.json();
    assert_eq!(options["genres"].as_array().unwrap().len(), 18);
    assert_eq!(options["languages"][1], "Español");
    assert_eq!(options["moods"][1], "Light-hearted");
    assert_eq!(options["length_bounds"], json!({"min": 80, "max": 180}));
}

#[tokio::test]
async fn test_create_session_shows_trending() {
    let server = create_test_server();
    let response = server.post("/sessions").await;
    response.assert_status(StatusCode::CREATED);

    let view: Value = response.json();
    assert_eq!(view["phase"], "browsing");
    let trending = view["trending"].as_array().unwrap();
    assert_eq!(trending.len(), 5);
    assert_eq!(trending[0]["title"], "Trending 1");
    assert_eq!(
        trending[0]["poster_url"],
        "https://image.tmdb.org/t/p/w300/poster1.jpg"
    );
    assert_eq!(
        trending[0]["imdb_url"],
        "https://www.imdb.com/title/tt0000001/"
    );
}

#[tokio::test]
async fn test_trending_carousel_wraps() {
    let server = create_test_server();
    let session_id = open_session(&server).await;

    let view = send_event(&server, &session_id, json!({"type": "trending_prev"})).await;
    assert_eq!(view["trending_index"], 5);
    assert_eq!(view["trending"][0]["title"], "Trending 6");
    assert_eq!(view["trending"][1]["title"], "Trending 1");

    let view = send_event(&server, &session_id, json!({"type": "trending_next"})).await;
    assert_eq!(view["trending_index"], 0);
}

#[tokio::test]
async fn test_submit_preferences_recommends_from_pool() {
    let server = create_test_server();
    let session_id = open_session(&server).await;

    let view = send_event(&server, &session_id, thriller_preferences()).await;

    assert_eq!(view["phase"], "viewing");
    let title = view["recommendation"]["card"]["title"].as_str().unwrap();
    assert!(["Night Crawl", "Sunny Days"].contains(&title));
    assert_eq!(view["recommendation"]["basis"]["kind"], "similarity");
    assert_eq!(view["preferences"]["genre"], "Thriller");
}

#[tokio::test]
async fn test_recommend_another_and_new_search() {
    let server = create_test_server();
    let session_id = open_session(&server).await;
    send_event(&server, &session_id, thriller_preferences()).await;

    let view = send_event(&server, &session_id, json!({"type": "recommend_another"})).await;
    assert_eq!(view["phase"], "viewing");
    assert!(view["recommendation"].is_object());

    let view = send_event(&server, &session_id, json!({"type": "new_search"})).await;
    assert_eq!(view["phase"], "browsing");
    assert!(view["recommendation"].is_null());
    assert!(view["preferences"].is_null());
}

#[tokio::test]
async fn test_recommend_another_without_recommendation() {
    let server = create_test_server();
    let session_id = open_session(&server).await;

    let response = server
        .post(&format!("/sessions/{}/events", session_id))
        .json(&json!({"type": "recommend_another"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_catalog_shows_notice() {
    let mut catalog = FakeCatalog::new();
    catalog.discover.clear();
    let server = create_server(catalog, false);
    let session_id = open_session(&server).await;

    let view = send_event(&server, &session_id, thriller_preferences()).await;

    assert_eq!(view["phase"], "recommending");
    assert!(view["recommendation"].is_null());
    assert_eq!(
        view["notice"],
        "No movies found matching your preferences. Try different options."
    );
}

#[tokio::test]
async fn test_catalog_without_synopses_falls_back() {
    let mut catalog = FakeCatalog::new();
    catalog.discover = vec![movie(7, "Quiet One", ""), movie(8, "Quiet Two", "")];
    let server = create_server(catalog, false);
    let session_id = open_session(&server).await;

    let view = send_event(&server, &session_id, thriller_preferences()).await;

    assert_eq!(view["phase"], "viewing");
    assert_eq!(view["recommendation"]["basis"]["kind"], "random_fallback");
}

#[tokio::test]
async fn test_invalid_preferences_rejected() {
    let server = create_test_server();
    let session_id = open_session(&server).await;

    let response = server
        .post(&format!("/sessions/{}/events", session_id))
        .json(&json!({
            "type": "submit_preferences",
            "preferences": {
                "genre": "Thriller",
                "language": "English",
                "length": {"min": 60, "max": 120}
            }
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("length"));
}

#[tokio::test]
async fn test_chat_history_keeps_last_five() {
    let server = create_test_server();
    let session_id = open_session(&server).await;

    let mut view = Value::Null;
    for i in 0..4 {
        view = send_event(
            &server,
            &session_id,
            json!({"type": "chat", "message": format!("question {}", i)}),
        )
        .await;
    }

    let history = view["chat_history"].as_array().unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(history[4]["speaker"], "chatbot");
    assert_eq!(history[4]["message"], "Echo: question 3");
    assert_eq!(history[3]["speaker"], "you");
}

#[tokio::test]
async fn test_chat_failure_is_a_notice() {
    let server = create_server(FakeCatalog::new(), true);
    let session_id = open_session(&server).await;

    let view = send_event(
        &server,
        &session_id,
        json!({"type": "chat", "message": "hello"}),
    )
    .await;

    assert!(view["chat_history"].as_array().unwrap().is_empty());
    assert!(view["notice"]
        .as_str()
        .unwrap()
        .contains("upstream unreachable"));
}

#[tokio::test]
async fn test_get_and_delete_session() {
    let server = create_test_server();
    let session_id = open_session(&server).await;
    let path = format!("/sessions/{}", session_id);

    let response = server.get(&path).await;
    response.assert_status_ok();
    let view: Value = response.json();
    assert_eq!(view["session_id"], session_id.as_str());

    server
        .delete(&path)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_session() {
    let server = create_test_server();
    let response = server
        .post(&format!("/sessions/{}/events", uuid::Uuid::new_v4()))
        .json(&json!({"type": "trending_next"}))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_genre_showcase_skips_failed_genres() {
    let mut catalog = FakeCatalog::new();
    catalog.broken_genre = Some(Genre::Horror);
    let server = create_server(catalog, false);

    let response = server.get("/genres/top").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let shelves = body["shelves"].as_array().unwrap();
    assert_eq!(shelves.len(), 17);
    assert_eq!(shelves[0]["genre"], "Action");
    assert!(shelves.iter().all(|shelf| shelf["genre"] != "Horror"));
    assert_eq!(shelves[0]["movies"].as_array().unwrap().len(), 3);
    assert_eq!(
        shelves[0]["movies"][0]["imdb_url"],
        "https://www.imdb.com/title/tt0000100/"
    );
}

#[tokio::test]
async fn test_session_deleted_during_event_stays_deleted() {
    let mut catalog = FakeCatalog::new();
    catalog.discover_delay = Duration::from_millis(300);
    let server = create_server(catalog, false);
    let session_id = open_session(&server).await;
    let path = format!("/sessions/{}", session_id);
    let events_path = format!("{}/events", path);

    let (event, deleted) = tokio::join!(
        async {
            server
                .post(&events_path)
                .json(&thriller_preferences())
                .await
        },
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            server.delete(&path).await
        }
    );

    deleted.assert_status(StatusCode::NO_CONTENT);
    event.assert_status(StatusCode::NOT_FOUND);
    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_events_on_one_session_are_serialized() {
    let server = create_test_server();
    let session_id = open_session(&server).await;
    let events_path = format!("/sessions/{}/events", session_id);

    let (first, second) = tokio::join!(
        async {
            server
                .post(&events_path)
                .json(&json!({"type": "chat", "message": "first"}))
                .await
        },
        async {
            server
                .post(&events_path)
                .json(&json!({"type": "chat", "message": "second"}))
                .await
        }
    );
    first.assert_status_ok();
    second.assert_status_ok();

    let view: Value = server.get(&format!("/sessions/{}", session_id)).await.json();
    assert_eq!(view["chat_history"].as_array().unwrap().len(), 4);
}
