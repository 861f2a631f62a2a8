//! In-memory data provider.
//!
//! Simulates the REST API a real hero server would expose. The router is
//! never bound to a socket: [`crate::api::HttpClient`] calls it in-process.
//! Swap it for a real server once one exists.
//!
//! Routes:
//! - `GET /api/heroes` -- all heroes, or those matching `?name=`
//! - `GET /api/heroes/{id}` -- one hero, 404 when missing
//! - `PUT /api/heroes` -- replace a hero (adds it when unknown)
//! - `POST /api/heroes` -- add a hero with a generated id
//! - `DELETE /api/heroes/{id}` -- remove a hero
//! - `POST /commands/resetDb` -- restore the seed data

mod db;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

pub use db::InMemoryDb;

/// Collection URL of the hero resource, relative to the API root.
pub const HEROES_URL: &str = "api/heroes";

/// URL that restores the seed data.
pub const RESET_URL: &str = "commands/resetDb";

#[derive(Debug, Clone, Copy, Default)]
pub struct BackendConfig {
    /// Delay added to every response to mimic network time.
    pub latency: Duration,
}

impl BackendConfig {
    pub const fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

/// Build the router serving the hero collection from `db`.
pub fn build_router(db: Arc<InMemoryDb>, config: BackendConfig) -> Router {
    Router::new()
        .route(
            "/api/heroes",
            get(handlers::list_heroes)
                .put(handlers::update_hero)
                .post(handlers::add_hero),
        )
        .route("/api/heroes/", get(handlers::list_heroes))
        .route(
            "/api/heroes/{id}",
            get(handlers::get_hero).delete(handlers::delete_hero),
        )
        .route("/commands/resetDb", post(handlers::reset_db))
        .layer(middleware::from_fn_with_state(config.latency, simulate_latency))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

async fn simulate_latency(State(latency): State<Duration>, request: Request, next: Next) -> Response {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        build_router(Arc::new(InMemoryDb::seeded()), BackendConfig::default())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_list_heroes() {
        let (status, json) = send(&app(), "GET", "/api/heroes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 10);
        assert_eq!(json[0], json!({ "id": 11, "name": "Dr Nice" }));
    }

    #[tokio::test]
    async fn test_filter_by_name() {
        let (status, json) = send(&app(), "GET", "/api/heroes/?name=dr", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!([{ "id": 11, "name": "Dr Nice" }, { "id": 18, "name": "Dr IQ" }])
        );

        let (_, json) = send(&app(), "GET", "/api/heroes?name=nobody", None).await;
        assert_eq!(json, json!([]));
    }

    #[tokio::test]
    async fn test_get_hero() {
        let (status, json) = send(&app(), "GET", "/api/heroes/13", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({ "id": 13, "name": "Bombasto" }));
    }

    #[tokio::test]
    async fn test_get_missing_hero() {
        let (status, json) = send(&app(), "GET", "/api/heroes/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Hero with id=99 not found");
    }

    #[tokio::test]
    async fn test_add_hero_generates_id() {
        let app = app();
        let (status, json) = send(&app, "POST", "/api/heroes", Some(json!({ "name": "Zephyr" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json, json!({ "id": 21, "name": "Zephyr" }));

        let (_, json) = send(&app, "GET", "/api/heroes/21", None).await;
        assert_eq!(json["name"], "Zephyr");
    }

    #[tokio::test]
    async fn test_add_after_largest_id_does_not_overflow() {
        let app = app();
        let max = json!({ "id": u32::MAX, "name": "Max" });
        let (status, _) = send(&app, "PUT", "/api/heroes", Some(max)).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, json) = send(&app, "POST", "/api/heroes", Some(json!({ "name": "Next" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json, json!({ "id": 21, "name": "Next" }));

        let (status, json) = send(&app, "POST", "/api/heroes", Some(json!({ "name": "After" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["id"], 22);
    }

    #[tokio::test]
    async fn test_update_hero() {
        let app = app();
        let body = json!({ "id": 12, "name": "Narcotic" });
        let (status, _) = send(&app, "PUT", "/api/heroes", Some(body)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, json) = send(&app, "GET", "/api/heroes/12", None).await;
        assert_eq!(json["name"], "Narcotic");
    }

    #[tokio::test]
    async fn test_update_unknown_hero_inserts() {
        let body = json!({ "id": 42, "name": "Answer" });
        let (status, json) = send(&app(), "PUT", "/api/heroes", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json, body);
    }

    #[tokio::test]
    async fn test_delete_hero() {
        let app = app();
        let (status, _) = send(&app, "DELETE", "/api/heroes/15", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", "/api/heroes/15", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Deleting again is not an error.
        let (status, _) = send(&app, "DELETE", "/api/heroes/15", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/heroes")
            .header("content-type", "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_reset_db() {
        let app = app();
        send(&app, "DELETE", "/api/heroes/11", None).await;
        let (status, _) = send(&app, "POST", "/commands/resetDb", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "GET", "/api/heroes/11", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_simulated() {
        let app = build_router(
            Arc::new(InMemoryDb::seeded()),
            BackendConfig::with_latency(Duration::from_millis(500)),
        );
        let started = tokio::time::Instant::now();
        let (status, _) = send(&app, "GET", "/api/heroes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(started.elapsed() >= Duration::from_millis(500));
    }
}
