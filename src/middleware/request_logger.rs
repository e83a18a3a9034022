use std::{rc::Rc, sync::Arc};

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderName, HeaderValue},
    Error,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use log::debug;
use uuid::Uuid;

use crate::metrics::Metrics;

const REQUEST_ID_HEADER: &str = "x-request-id";

// Route label for requests that matched no registered pattern
const UNMATCHED_ROUTE: &str = "unmatched";

/// Counts every request by method, matched route and final status, tags the
/// response with a request id and, outside production, logs both ends of the
/// exchange.
pub struct RequestLogger {
    metrics: Arc<Metrics>,
    enable_debug_logging: bool,
}

impl RequestLogger {
    pub fn new(metrics: Arc<Metrics>, enable_debug_logging: bool) -> Self {
        Self {
            metrics,
            enable_debug_logging,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestLoggerMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RequestLoggerMiddleware {
            service: Rc::new(service),
            metrics: self.metrics.clone(),
            enable_debug_logging: self.enable_debug_logging,
        })
    }
}

pub struct RequestLoggerMiddleware<S> {
    service: Rc<S>,
    metrics: Arc<Metrics>,
    enable_debug_logging: bool,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let metrics = self.metrics.clone();
        let enable_debug_logging = self.enable_debug_logging;

        let method = req.method().clone();
        let path = req.path().to_owned();
        let route = req
            .match_pattern()
            .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .cloned()
            .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok());

        if enable_debug_logging {
            debug!("Processing request: {} {}", method, path);
        }

        Box::pin(async move {
            let result = service.call(req).await;

            let status = match &result {
                Ok(res) => res.status(),
                Err(e) => e.as_response_error().status_code(),
            };
            metrics.observe_request(method.as_str(), &route, status.as_u16());

            if enable_debug_logging {
                debug!("Response: {} {} - status: {}", method, path, status);
            }

            let mut res = result?;
            if let Some(request_id) = request_id {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), request_id);
            }
            Ok(res)
        })
    }
}
