use std::process;

use log::error;

mod app;
mod config;
mod db;
mod errors;
mod handlers;
mod lifecycle;
mod metrics;
mod middleware;
mod models;
mod repositories;
mod routes;
mod server;
mod services;
mod shutdown;
mod telemetry;
mod types;

use telemetry::JsonLogger;

#[actix_web::main]
async fn main() {
    // Installed before configuration so config errors are logged as JSON too;
    // the filter is replaced once configuration is known.
    let logger = match JsonLogger::stdio().install() {
        Ok(logger) => logger,
        Err(e) => {
            eprintln!("Failed to initialize logger: {}", e);
            process::exit(1);
        }
    };

    if let Err(err) = server::run(logger).await {
        error!("Critical error, exiting: {}", err);
        process::exit(1);
    }
}
