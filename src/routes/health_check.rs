use actix_web::HttpResponse;
use chrono::Utc;
use serde_json::json;

use crate::response;

#[tracing::instrument(
    "Checking if api is online"
)]
pub async fn health_check() -> HttpResponse{
    response::ok(json!({
        "status": "ok",
        "timestamp": Utc::now(),
    }))
}
