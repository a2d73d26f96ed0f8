//! The three front desk actions, served under `/functions/v1` with the
//! camelCase contract the dashboard already speaks.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use innkeep_core::ReservationStatus;
use innkeep_frontdesk::FrontDeskResult;
use innkeep_shared::Masked;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub reservation_id: Option<Uuid>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentResponse {
    pub success: bool,
    pub reservation_id: Uuid,
    pub status: ReservationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    pub reservation_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub notes: Option<Masked<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub success: bool,
    pub reservation_id: Uuid,
    pub room_number: String,
    pub status: ReservationStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutRequest {
    pub reservation_id: Option<Uuid>,
    pub notes: Option<Masked<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutResponse {
    pub success: bool,
    pub reservation_id: Uuid,
    pub status: ReservationStatus,
    pub final_balance: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/functions/v1/confirm-reservation-payment", post(confirm_reservation_payment))
        .route("/functions/v1/check-in", post(check_in))
        .route("/functions/v1/check-out", post(check_out))
}

/// POST /functions/v1/confirm-reservation-payment
async fn confirm_reservation_payment(
    State(state): State<AppState>,
    payload: Result<Json<ConfirmPaymentRequest>, JsonRejection>,
) -> Result<Json<ConfirmPaymentResponse>, AppError> {
    let req = body(payload)?;
    let reservation_id = required(req.reservation_id, "reservationId")?;

    let outcome = observe(
        &state,
        "confirm_payment",
        state.front_desk.confirm_payment(reservation_id, req.payment_method).await,
    )?;

    Ok(Json(ConfirmPaymentResponse {
        success: true,
        reservation_id,
        status: outcome.reservation.status,
        warning: outcome.warning,
    }))
}

/// POST /functions/v1/check-in
async fn check_in(
    State(state): State<AppState>,
    payload: Result<Json<CheckInRequest>, JsonRejection>,
) -> Result<Json<CheckInResponse>, AppError> {
    let req = body(payload)?;
    let reservation_id = required(req.reservation_id, "reservationId")?;
    let room_id = required(req.room_id, "roomId")?;

    let outcome = observe(
        &state,
        "check_in",
        state.front_desk.check_in(reservation_id, room_id, req.notes).await,
    )?;

    Ok(Json(CheckInResponse {
        success: true,
        reservation_id,
        room_number: outcome.room_number,
        status: outcome.reservation.status,
    }))
}

/// POST /functions/v1/check-out
async fn check_out(
    State(state): State<AppState>,
    payload: Result<Json<CheckOutRequest>, JsonRejection>,
) -> Result<Json<CheckOutResponse>, AppError> {
    let req = body(payload)?;
    let reservation_id = required(req.reservation_id, "reservationId")?;

    let outcome = observe(
        &state,
        "check_out",
        state.front_desk.check_out(reservation_id, req.notes).await,
    )?;

    Ok(Json(CheckOutResponse {
        success: true,
        reservation_id,
        status: outcome.reservation.status,
        final_balance: outcome.final_balance,
    }))
}

/// Malformed bodies get the same `{ "error" }` shape as lifecycle failures.
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(req)| req)
        .map_err(|rejection| AppError::ValidationError(rejection.body_text()))
}

fn required(value: Option<Uuid>, field: &str) -> Result<Uuid, AppError> {
    value.ok_or_else(|| AppError::ValidationError(format!("{} is required", field)))
}

/// Counts the outcome and lifts a front desk failure into a 400.
pub(crate) fn observe<T>(state: &AppState, operation: &str, result: FrontDeskResult<T>) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            state.metrics.record(operation, "ok");
            Ok(value)
        }
        Err(err) => {
            state.metrics.record(operation, err.code());
            Err(AppError::FrontDesk(err))
        }
    }
}
