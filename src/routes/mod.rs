use actix_web::web;

mod observability;
mod user;

// Configure all routes function
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    observability::configure_routes(cfg);
    user::configure_routes(cfg);
}
