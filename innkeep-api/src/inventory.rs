use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use innkeep_core::InventoryDay;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InventoryQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct InventoryNight {
    #[serde(flatten)]
    pub day: InventoryDay,
    pub available: i32,
}

impl From<InventoryDay> for InventoryNight {
    fn from(day: InventoryDay) -> Self {
        let available = day.available();
        Self { day, available }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/inventory/{hotel_id}/{room_type_id}", get(get_inventory))
}

/// GET /v1/inventory/{hotel_id}/{room_type_id}?from=YYYY-MM-DD&to=YYYY-MM-DD
async fn get_inventory(
    State(state): State<AppState>,
    Path((hotel_id, room_type_id)): Path<(Uuid, Uuid)>,
    Query(range): Query<InventoryQuery>,
) -> Result<Json<Vec<InventoryNight>>, AppError> {
    let nights = state
        .front_desk
        .inventory(hotel_id, room_type_id, range.from, range.to)
        .await
        .map_err(AppError::FrontDesk)?;

    Ok(Json(nights.into_iter().map(InventoryNight::from).collect()))
}
