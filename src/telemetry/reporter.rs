//! Forwarding of unexpected errors to an external tracker.

use std::{sync::Arc, time::Duration};

use log::info;

use crate::{
    config::Config,
    errors::AppError,
};

/// Sink for errors that should reach a human.
///
/// Implementations must be cheap to call from request handlers; `report`
/// never blocks on the network.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str);

    /// Wait at most `timeout` for queued reports to be delivered.
    /// Returns `false` if some reports may have been dropped.
    fn flush(&self, timeout: Duration) -> bool;
}

/// Used when no DSN is configured
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _message: &str) {}

    fn flush(&self, _timeout: Duration) -> bool {
        true
    }
}

pub struct SentryReporter {
    // Dropping the guard shuts the client down.
    _guard: sentry::ClientInitGuard,
}

impl SentryReporter {
    pub fn init(dsn: &str, release: &str, environment: &str) -> Result<Self, AppError> {
        let dsn: sentry::types::Dsn = dsn
            .parse()
            .map_err(|e| AppError::ErrorTracking(format!("Invalid SENTRY_DSN: {}", e)))?;

        let guard = sentry::init(sentry::ClientOptions {
            dsn: Some(dsn),
            release: Some(release.to_string().into()),
            environment: Some(environment.to_string().into()),
            ..Default::default()
        });

        Ok(Self { _guard: guard })
    }
}

impl ErrorReporter for SentryReporter {
    fn report(&self, message: &str) {
        sentry::capture_message(message, sentry::Level::Error);
    }

    fn flush(&self, timeout: Duration) -> bool {
        match sentry::Hub::main().client() {
            Some(client) => client.flush(Some(timeout)),
            None => true,
        }
    }
}

/// Build the reporter for this process from configuration
pub fn init_reporter(config: &Config) -> Result<Arc<dyn ErrorReporter>, AppError> {
    match &config.error_tracking.dsn {
        Some(dsn) => {
            let reporter =
                SentryReporter::init(dsn, &config.app.version, &config.app.environment_name)?;
            info!(
                "Sentry error tracking initialized (DSN policy: {})",
                config.error_tracking.policy
            );
            Ok(Arc::new(reporter))
        }
        None => {
            info!(
                "Error tracking disabled: SENTRY_DSN not set (DSN policy: {})",
                config.error_tracking.policy
            );
            Ok(Arc::new(NoopReporter))
        }
    }
}
