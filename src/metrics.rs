//! Prometheus registry owned by the service.
//!
//! One instance is built by the composition root and shared with handlers and
//! middleware; nothing registers into the prometheus default registry.

use prometheus::{IntCounterVec, IntGaugeVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    up: IntGaugeVec,
    http_requests: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let up = IntGaugeVec::new(
            Opts::new("microservice_up", "Whether the service is up"),
            &["version"],
        )?;
        registry.register(Box::new(up.clone()))?;

        let http_requests = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests by route and status"),
            &["method", "route", "status"],
        )?;
        registry.register(Box::new(http_requests.clone()))?;

        Ok(Self {
            registry,
            up,
            http_requests,
        })
    }

    /// Mark the service as up for `version`
    pub fn init(&self, version: &str) {
        self.up.with_label_values(&[version]).set(1);
    }

    pub fn observe_request(&self, method: &str, route: &str, status: u16) {
        let status = status.to_string();
        self.http_requests
            .with_label_values(&[method, route, status.as_str()])
            .inc();
    }

    /// Render every registered family in the text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        TextEncoder::new().encode_to_string(&self.registry.gather())
    }

    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_value(rendered: &str, series: &str) -> Option<f64> {
        rendered
            .lines()
            .filter(|line| !line.starts_with('#'))
            .find_map(|line| line.strip_prefix(series))
            .and_then(|value| value.trim().parse().ok())
    }

    #[test]
    fn test_up_gauge_set_after_init() {
        let metrics = Metrics::new().unwrap();
        metrics.init("1.2.3");

        let rendered = metrics.render().unwrap();

        assert!(rendered.contains("# TYPE microservice_up gauge"));
        assert_eq!(
            sample_value(&rendered, "microservice_up{version=\"1.2.3\"}"),
            Some(1.0)
        );
    }

    #[test]
    fn test_up_gauge_absent_before_init() {
        let metrics = Metrics::new().unwrap();

        let rendered = metrics.render().unwrap();

        assert!(sample_value(&rendered, "microservice_up{version=\"1.2.3\"}").is_none());
    }

    #[test]
    fn test_request_counter_accumulates() {
        let metrics = Metrics::new().unwrap();

        metrics.observe_request("GET", "/health-check", 200);
        metrics.observe_request("GET", "/health-check", 200);

        let rendered = metrics.render().unwrap();
        assert_eq!(
            sample_value(
                &rendered,
                "http_requests_total{method=\"GET\",route=\"/health-check\",status=\"200\"}"
            ),
            Some(2.0)
        );
    }

    #[test]
    fn test_instances_do_not_share_state() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.init("1.0.0");

        assert!(!second.render().unwrap().contains("microservice_up{"));
    }
}
