use actix_web::web;

use crate::handlers::{health_check_handler, metrics_handler};

// Unauthenticated endpoints, independent of the domain routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/metrics", web::get().to(metrics_handler))
        .route("/health-check", web::get().to(health_check_handler));
}
