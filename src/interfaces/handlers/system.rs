use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use humantime::format_duration;
use serde::Serialize;
use std::time::Duration;

use crate::{constants::START_TIME, use_cases::contact::ContactHandler, AppState};

#[derive(Serialize)]
struct BackendStatus {
    backend: String,
    configured: bool,
}

#[derive(Serialize)]
struct HealthCheckResponse {
    status: &'static str,
    version: &'static str,
    uptime: String,
    timestamp: String,
    start_at: String,
    email_backends: Vec<BackendStatus>,
    rate_limited_clients: usize,
}

fn backend_status(handler: &ContactHandler) -> BackendStatus {
    BackendStatus {
        backend: handler.provider.backend().to_string(),
        configured: handler.provider.ensure_configured().is_ok(),
    }
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let now_utc = Utc::now();
    let uptime = now_utc.signed_duration_since(*START_TIME);
    let human_uptime = format_duration(Duration::from_secs(uptime.num_seconds().max(0) as u64));

    HttpResponse::Ok().json(HealthCheckResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime: human_uptime.to_string(),
        timestamp: now_utc.to_rfc3339(),
        start_at: START_TIME.to_rfc3339(),
        email_backends: vec![
            backend_status(&state.resend_contact),
            backend_status(&state.ses_contact),
        ],
        rate_limited_clients: state.rate_limiter.tracked_clients(),
    })
}
