use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use innkeep_core::{Room, RoomStatus};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::functions::{body, observe};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HousekeepingRequest {
    pub status: RoomStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/rooms/{id}", get(get_room))
        .route("/v1/rooms/{id}/housekeeping", post(update_housekeeping))
}

/// GET /v1/rooms/{id}
async fn get_room(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Room>, AppError> {
    let room = state.front_desk.room(id).await.map_err(AppError::FrontDesk)?;
    Ok(Json(room))
}

/// POST /v1/rooms/{id}/housekeeping
async fn update_housekeeping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<HousekeepingRequest>, JsonRejection>,
) -> Result<Json<Room>, AppError> {
    let req = body(payload)?;
    let room = observe(
        &state,
        "housekeeping",
        state.front_desk.update_housekeeping(id, req.status).await,
    )?;
    Ok(Json(room))
}
