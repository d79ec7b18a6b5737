//! Health check endpoint

use axum::Json;
use serde_json::{Value, json};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "success": true,
        "status": "ok",
        "service": "store-server",
    }))
}
