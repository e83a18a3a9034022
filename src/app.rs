use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::{ErrorHandlers, Logger},
    web, App,
};

use crate::{
    db::Database,
    metrics::Metrics,
    middleware::{handle_server_error, CatchPanic, RequestLogger},
    routes,
    services::{build_user_service, UserServiceTrait},
    telemetry::ErrorReporter,
};

/// Everything a worker needs to build its `App`. Cloned once per worker.
#[derive(Clone)]
pub struct AppDependencies {
    pub users: Arc<dyn UserServiceTrait>,
    pub metrics: Arc<Metrics>,
    pub reporter: Arc<dyn ErrorReporter>,
    pub enable_debug_logging: bool,
}

impl AppDependencies {
    pub fn new(
        db: &Database,
        metrics: Arc<Metrics>,
        reporter: Arc<dyn ErrorReporter>,
        enable_debug_logging: bool,
    ) -> Self {
        Self {
            users: build_user_service(db),
            metrics,
            reporter,
            enable_debug_logging,
        }
    }
}

/// Build the application: observability and user routes behind the request
/// logger, with one error handler for every unexpected 5xx, including
/// handler panics.
pub fn compose(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        users,
        metrics,
        reporter,
        enable_debug_logging,
    } = deps;

    let log_format = if enable_debug_logging {
        "%a \"%r\" %s %b %T \"%{Referer}i\" \"%{User-Agent}i\" %{X-Request-ID}o"
    } else {
        "%a \"%r\" %s %b %T"
    };

    App::new()
        .app_data(web::Data::from(users))
        .app_data(web::Data::from(metrics.clone()))
        .app_data(web::Data::from(reporter))
        .wrap(CatchPanic)
        .wrap(ErrorHandlers::new().default_handler_server(handle_server_error))
        .wrap(RequestLogger::new(metrics, enable_debug_logging))
        .wrap(Logger::new(log_format))
        .configure(routes::configure_routes)
}
