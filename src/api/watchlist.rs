//! Per-user watchlist CRUD.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::auth::Principal;
use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_note, validate_symbol};
use crate::db::{CreateWatchlistItemRequest, WatchlistItem, WatchlistItemResponse};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
}

/// List the authenticated user's watchlist
///
/// GET /watchlist
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    principal: Principal,
) -> Result<Json<Vec<WatchlistItemResponse>>, ApiError> {
    let items: Vec<WatchlistItem> =
        sqlx::query_as("SELECT * FROM watchlist_items WHERE user_id = ? ORDER BY created_at DESC")
            .bind(&principal.user.id)
            .fetch_all(&state.db)
            .await?;

    let responses: Vec<WatchlistItemResponse> = items
        .into_iter()
        .map(WatchlistItemResponse::from)
        .collect();
    Ok(Json(responses))
}

/// Add a symbol to the watchlist
///
/// POST /watchlist
pub async fn add_item(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<CreateWatchlistItemRequest>,
) -> Result<Json<WatchlistItemResponse>, ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    if let Err(e) = validate_symbol(&req.symbol) {
        errors.add("symbol", e);
    }
    if let Err(e) = validate_note(&req.note) {
        errors.add("note", e);
    }
    errors.finish()?;

    let id = Uuid::new_v4().to_string();
    let symbol = req.symbol.to_uppercase();
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO watchlist_items (id, user_id, symbol, note, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&principal.user.id)
    .bind(&symbol)
    .bind(&req.note)
    .bind(&now)
    .execute(&state.db)
    .await?;

    Ok(Json(WatchlistItemResponse {
        id,
        symbol,
        note: req.note,
    }))
}

/// Remove a watchlist item. Only the owner can delete an item; anything
/// else reads as not found.
///
/// DELETE /watchlist/:id
pub async fn remove_item(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Path(item_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let result = sqlx::query("DELETE FROM watchlist_items WHERE id = ? AND user_id = ?")
        .bind(&item_id)
        .bind(&principal.user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Item not found"));
    }

    Ok(Json(DeleteResponse { ok: true }))
}
