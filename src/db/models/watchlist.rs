//! Watchlist models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WatchlistItem {
    pub id: String,
    pub user_id: String,
    pub symbol: String,
    pub note: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatchlistItemResponse {
    pub id: String,
    pub symbol: String,
    pub note: Option<String>,
}

impl From<WatchlistItem> for WatchlistItemResponse {
    fn from(item: WatchlistItem) -> Self {
        Self {
            id: item.id,
            symbol: item.symbol,
            note: item.note,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateWatchlistItemRequest {
    pub symbol: String,
    #[serde(default)]
    pub note: Option<String>,
}
