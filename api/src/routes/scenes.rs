use axum::extract::State;
use axum::{Json, Router, routing::get};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/scenes", get(list_scenes))
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SceneSummary {
    pub id: String,
    pub name: String,
    pub posture_check: bool,
}

/// Scenes the engine knows, in catalog order. The first is the default.
#[utoipa::path(
    get,
    path = "/api/scenes",
    responses(
        (status = 200, description = "Available scenes", body = Vec<SceneSummary>)
    ),
    tag = "scenes"
)]
pub async fn list_scenes(State(state): State<AppState>) -> Json<Vec<SceneSummary>> {
    let scenes = state
        .engine
        .catalog()
        .scenes()
        .iter()
        .map(|scene| SceneSummary {
            id: scene.id.clone(),
            name: scene.name.clone(),
            posture_check: scene.posture_check(),
        })
        .collect();
    Json(scenes)
}
