pub mod metrics;

pub use metrics::get_metrics;

use actix_web::{web, HttpResponse, Responder};
use std::time::UNIX_EPOCH;

use crate::state::{current_snapshot, AppState};

pub async fn health(data: web::Data<AppState>) -> impl Responder {
    let snapshot = current_snapshot(&data);
    let last_fetch = snapshot
        .last_fetch
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs());

    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "processes": snapshot.processes.len(),
        "last_fetch_epoch_seconds": last_fetch,
    }))
}
