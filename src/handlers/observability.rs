use std::fmt::Display;

use actix_web::{http::header::ContentType, web, HttpResponse};
use log::error;

use crate::metrics::Metrics;

/// Liveness only: answers 200 without touching any dependency
pub async fn health_check_handler() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .body("OK")
}

/// Render the registry in the exposition format
pub async fn metrics_handler(metrics: web::Data<Metrics>) -> HttpResponse {
    metrics_response(metrics.render(), metrics.content_type())
}

// Encoding failures are contained here and never reach the error handler.
fn metrics_response<E: Display>(rendered: Result<String, E>, content_type: &str) -> HttpResponse {
    match rendered {
        Ok(body) => HttpResponse::Ok().content_type(content_type).body(body),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            HttpResponse::InternalServerError()
                .content_type(ContentType::plaintext())
                .body("Error collecting metrics")
        }
    }
}
