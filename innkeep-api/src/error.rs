use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use innkeep_frontdesk::FrontDeskError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// Any lifecycle rejection. The front desk contract reports all of them as 400.
    FrontDesk(FrontDeskError),
    ValidationError(String),
    RateLimited,
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::FrontDesk(err @ FrontDeskError::Store(_)) => {
                tracing::error!("Store failure: {}", err);
                (StatusCode::BAD_REQUEST, "Storage error".to_string())
            }
            AppError::FrontDesk(err @ FrontDeskError::UpdateReservationError(_)) => {
                tracing::error!("Reservation write failed: {}", err);
                (StatusCode::BAD_REQUEST, "Failed to update reservation".to_string())
            }
            AppError::FrontDesk(err @ FrontDeskError::UpdateRoomError(_)) => {
                tracing::error!("Room write failed: {}", err);
                (StatusCode::BAD_REQUEST, "Failed to update room".to_string())
            }
            AppError::FrontDesk(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded".to_string()),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

// `FrontDeskError` is itself `Into<anyhow::Error>`, so it cannot get its own
// `From` impl next to the blanket one. Handlers wrap it with `AppError::FrontDesk`.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
