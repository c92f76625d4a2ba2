//! Dashboard statistics.

use axum::{Json, extract::State};

use crate::error::Result;
use crate::services::StoreStats;
use crate::state::AppState;

/// Cached store statistics, recomputed when stale.
pub async fn show(State(state): State<AppState>) -> Result<Json<StoreStats>> {
    let stats = state.stats().get().await?;
    Ok(Json(StoreStats::clone(&stats)))
}
