//! Request handlers for the simulated REST API.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::backend::db::{InMemoryDb, Upsert};
use crate::hero::{Hero, HeroId};

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Hero with id={0} not found")]
    NotFound(HeroId),
    #[error("No free hero id left")]
    IdsExhausted,
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::IdsExhausted => StatusCode::CONFLICT,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct NameFilter {
    pub name: Option<String>,
}

/// Create body. An id is optional; when it names an existing hero the
/// hero is replaced instead.
#[derive(Debug, Deserialize)]
pub struct HeroDraft {
    pub id: Option<HeroId>,
    pub name: String,
}

pub async fn list_heroes(
    State(db): State<Arc<InMemoryDb>>,
    Query(filter): Query<NameFilter>,
) -> Json<Vec<Hero>> {
    match filter.name {
        Some(term) => Json(db.search(&term)),
        None => Json(db.all()),
    }
}

pub async fn get_hero(
    State(db): State<Arc<InMemoryDb>>,
    Path(id): Path<HeroId>,
) -> Result<Json<Hero>, BackendError> {
    db.get(id).map(Json).ok_or(BackendError::NotFound(id))
}

pub async fn update_hero(State(db): State<Arc<InMemoryDb>>, Json(hero): Json<Hero>) -> Response {
    let id = hero.id;
    match db.upsert(hero.clone()) {
        Upsert::Replaced => StatusCode::NO_CONTENT.into_response(),
        Upsert::Inserted => {
            debug!(%id, "PUT of unknown hero, inserted");
            (StatusCode::CREATED, Json(hero)).into_response()
        }
    }
}

pub async fn add_hero(State(db): State<Arc<InMemoryDb>>, Json(draft): Json<HeroDraft>) -> Response {
    match draft.id {
        Some(id) => match db.upsert(Hero { id, name: draft.name }) {
            Upsert::Replaced => StatusCode::NO_CONTENT.into_response(),
            Upsert::Inserted => (StatusCode::CREATED, Json(db.get(id))).into_response(),
        },
        None => match db.insert(draft.name) {
            Some(hero) => (StatusCode::CREATED, Json(hero)).into_response(),
            None => BackendError::IdsExhausted.into_response(),
        },
    }
}

pub async fn delete_hero(State(db): State<Arc<InMemoryDb>>, Path(id): Path<HeroId>) -> StatusCode {
    if !db.remove(id) {
        debug!(%id, "DELETE of unknown hero");
    }
    StatusCode::NO_CONTENT
}

pub async fn reset_db(State(db): State<Arc<InMemoryDb>>) -> StatusCode {
    db.reset();
    StatusCode::NO_CONTENT
}
