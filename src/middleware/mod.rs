mod catch_panic;
mod error_handler;
mod request_logger;

pub use catch_panic::CatchPanic;
pub use error_handler::handle_server_error;
pub use request_logger::RequestLogger;
