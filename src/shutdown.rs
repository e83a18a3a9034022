use std::{fmt, io};

use actix_web::dev::ServerHandle;
use log::{info, warn};

use crate::lifecycle::Lifecycle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShutdownSignal::Interrupt => f.write_str("SIGINT"),
            ShutdownSignal::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// SIGINT and SIGTERM listeners, installed once before the server starts
pub struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Wait for the next signal; `None` once no more can arrive
    #[cfg(unix)]
    pub async fn next(&mut self) -> Option<ShutdownSignal> {
        tokio::select! {
            Some(()) = self.interrupt.recv() => Some(ShutdownSignal::Interrupt),
            Some(()) = self.terminate.recv() => Some(ShutdownSignal::Terminate),
            else => None,
        }
    }

    #[cfg(not(unix))]
    pub async fn next(&mut self) -> Option<ShutdownSignal> {
        tokio::signal::ctrl_c()
            .await
            .ok()
            .map(|()| ShutdownSignal::Interrupt)
    }
}

/// Start a graceful stop if this is the first signal while serving.
///
/// The server stops accepting connections and waits for in-flight requests,
/// bounded by its shutdown timeout. Returns `false` when the signal was
/// ignored because a drain already started or the server is not serving.
pub fn request_shutdown(
    lifecycle: &Lifecycle,
    handle: &ServerHandle,
    signal: ShutdownSignal,
) -> bool {
    if !lifecycle.begin_drain() {
        warn!("Received {} while {}, ignoring", signal, lifecycle.phase());
        return false;
    }

    info!("Received {}, shutting down gracefully", signal);
    let handle = handle.clone();
    actix_web::rt::spawn(async move {
        handle.stop(true).await;
    });
    true
}

/// Turn process signals into at most one graceful stop
pub async fn watch(mut signals: ShutdownSignals, lifecycle: Lifecycle, handle: ServerHandle) {
    while let Some(signal) = signals.next().await {
        request_shutdown(&lifecycle, &handle, signal);
        if lifecycle.phase().is_terminal() {
            break;
        }
    }
}
