mod observability;
mod user;

pub use observability::{health_check_handler, metrics_handler};
pub use user::{create_handler, delete_handler, get_by_id_handler, list_handler};
