use actix_web::{
    dev::ServiceResponse,
    http::header::{self, HeaderValue},
    middleware::ErrorHandlerResponse,
    web,
};
use log::error;
use serde_json::json;

use crate::{errors::INTERNAL_SERVER_ERROR, telemetry::ErrorReporter};

/// Last line for unexpected failures.
///
/// Registered as the 5xx default of `ErrorHandlers`. Responses that carry an
/// error are logged with their cause, forwarded to the `ErrorReporter` found in
/// app data and rewritten to the generic body. Handler-built 5xx responses
/// without an attached error pass through untouched.
pub fn handle_server_error<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let cause = match res.response().error() {
        Some(err) => err.to_string(),
        None => return Ok(ErrorHandlerResponse::Response(res.map_into_left_body())),
    };

    let (req, res) = res.into_parts();
    error!("{} {} failed: {}", req.method(), req.path(), cause);

    match req.app_data::<web::Data<dyn ErrorReporter>>() {
        Some(reporter) => reporter.report(&cause),
        None => error!("No error reporter registered, error not forwarded"),
    }

    let mut res = res.set_body(json!({ "error": INTERNAL_SERVER_ERROR }).to_string());
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );

    let res = ServiceResponse::new(req, res)
        .map_into_boxed_body()
        .map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}
