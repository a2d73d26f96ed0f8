use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use innkeep_core::Permission;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::functions::body;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RolePermissions {
    pub role: String,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Deserialize)]
pub struct AccessCheckRequest {
    pub role: String,
    pub permission: String,
}

#[derive(Debug, Serialize)]
pub struct AccessCheckResponse {
    pub allowed: bool,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/access/roles/{role}", get(role_permissions))
        .route("/v1/access/check", post(check_access))
}

/// GET /v1/access/roles/{role}
async fn role_permissions(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Result<Json<RolePermissions>, AppError> {
    let permissions = state
        .access
        .permissions_for(&role)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown role: {}", role)))?;

    Ok(Json(RolePermissions { role, permissions }))
}

/// POST /v1/access/check
async fn check_access(
    State(state): State<AppState>,
    payload: Result<Json<AccessCheckRequest>, JsonRejection>,
) -> Result<Json<AccessCheckResponse>, AppError> {
    let req = body(payload)?;
    let permission: Permission = req.permission.parse().map_err(AppError::ValidationError)?;

    Ok(Json(AccessCheckResponse {
        allowed: state.access.is_allowed(&req.role, permission),
    }))
}
