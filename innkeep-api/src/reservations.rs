use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use innkeep_core::{Folio, Reservation};
use innkeep_shared::Masked;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::functions::{body, observe};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<Masked<String>>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/reservations/{id}", get(get_reservation))
        .route("/v1/reservations/{id}/folio", get(get_folio))
        .route("/v1/reservations/{id}/cancel", post(cancel_reservation))
}

/// GET /v1/reservations/{id}
async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    let reservation = state.front_desk.reservation(id).await.map_err(AppError::FrontDesk)?;
    Ok(Json(reservation))
}

/// GET /v1/reservations/{id}/folio
async fn get_folio(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Folio>, AppError> {
    let folio = state.front_desk.folio(id).await.map_err(AppError::FrontDesk)?;
    Ok(Json(folio))
}

/// POST /v1/reservations/{id}/cancel
async fn cancel_reservation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<CancelRequest>, JsonRejection>,
) -> Result<Json<Reservation>, AppError> {
    // the body is optional here
    let req = match payload {
        Err(JsonRejection::MissingJsonContentType(_)) => CancelRequest::default(),
        other => body(other)?,
    };

    let cancelled = observe(&state, "cancel", state.front_desk.cancel(id, req.reason).await)?;
    Ok(Json(cancelled))
}
