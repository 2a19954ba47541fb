//! Liveness and storage diagnostics endpoints.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub message: &'static str,
}

/// Liveness message
///
/// GET /
pub async fn root() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        message: "Wolf of Wall Street.site Backend Running",
    })
}

/// Storage connectivity report. Best-effort: failures are reported in the
/// body, never as an error status.
#[derive(Debug, Serialize)]
pub struct StorageDiagnostics {
    pub backend: String,
    pub database: String,
    pub connection_status: String,
    pub data_dir: String,
    pub tables: Vec<String>,
}

/// Storage connectivity diagnostic
///
/// GET /test
pub async fn test_database(State(state): State<Arc<AppState>>) -> Json<StorageDiagnostics> {
    let mut diag = StorageDiagnostics {
        backend: "running".to_string(),
        database: "not available".to_string(),
        connection_status: "not connected".to_string(),
        data_dir: state.config.server.data_dir.display().to_string(),
        tables: Vec::new(),
    };

    let probe: Result<Vec<(String,)>, _> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name LIMIT 10",
    )
    .fetch_all(&state.db)
    .await;

    match probe {
        Ok(rows) => {
            diag.database = "connected".to_string();
            diag.connection_status = "connected".to_string();
            diag.tables = rows.into_iter().map(|(name,)| name).collect();
        }
        Err(e) => {
            let msg: String = e.to_string().chars().take(50).collect();
            diag.database = format!("error: {}", msg);
        }
    }

    Json(diag)
}
