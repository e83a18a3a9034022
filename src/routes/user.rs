use actix_web::web;

use crate::handlers::{create_handler, delete_handler, get_by_id_handler, list_handler};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/users")
            .route("", web::get().to(list_handler))
            .route("", web::post().to(create_handler))
            .route("/{id}", web::get().to(get_by_id_handler))
            .route("/{id}", web::delete().to(delete_handler)),
    );
}
