//! Process lifecycle state machine.
//!
//! `Starting -> Migrating -> Serving -> Draining -> Stopped`, with `Failed`
//! reachable from `Starting`, `Migrating` and `Draining`. Every other move is
//! rejected so a late or repeated signal can never restart a drain.

use std::{
    fmt,
    sync::{Arc, Mutex},
};

use log::info;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Starting,
    Migrating,
    Serving,
    Draining,
    Stopped,
    Failed,
}

impl Phase {
    fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;

        matches!(
            (self, next),
            (Starting, Migrating)
                | (Migrating, Serving)
                | (Serving, Draining)
                | (Draining, Stopped)
                | (Starting, Failed)
                | (Migrating, Failed)
                | (Draining, Failed)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Stopped | Phase::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Shared handle on the current phase; clones observe the same state.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    phase: Arc<Mutex<Phase>>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            phase: Arc::new(Mutex::new(Phase::Starting)),
        }
    }

    pub fn phase(&self) -> Phase {
        *self.lock()
    }

    /// Move to `next`, failing if the transition is not allowed from the
    /// current phase
    pub fn advance(&self, next: Phase) -> Result<(), AppError> {
        let mut phase = self.lock();
        if !phase.can_advance_to(next) {
            return Err(AppError::Shutdown(format!(
                "Invalid lifecycle transition {} -> {}",
                *phase, next
            )));
        }

        info!("Lifecycle: {} -> {}", *phase, next);
        *phase = next;
        Ok(())
    }

    /// Enter `Failed` when allowed; returns whether the move happened
    pub fn fail(&self) -> bool {
        self.advance(Phase::Failed).is_ok()
    }

    /// Claim the drain. Only the first caller while `Serving` gets `true`.
    pub fn begin_drain(&self) -> bool {
        self.advance(Phase::Draining).is_ok()
    }

    // A poisoned lock still holds a valid phase.
    fn lock(&self) -> std::sync::MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
