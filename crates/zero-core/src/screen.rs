//! Shared Screen State

use std::time::Duration;

/// Client-side routes
pub mod route {
    pub const LOGIN: &str = "/";
    pub const DASHBOARD: &str = "/dashboard";
}

/// Progress of a screen's current action
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ScreenState {
    #[default]
    Idle,
    Submitting,
    Succeeded(String),
    Failed(String),
}

impl ScreenState {
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn success(&self) -> Option<&str> {
        match self {
            Self::Succeeded(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// A navigation to run once `after` has elapsed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub to: &'static str,
    pub after: Duration,
}

impl Redirect {
    pub const fn now(to: &'static str) -> Self {
        Self {
            to,
            after: Duration::ZERO,
        }
    }

    pub const fn delayed(to: &'static str, after: Duration) -> Self {
        Self { to, after }
    }
}

/// A deferred navigation owned by a screen.
///
/// Once the screen is disposed nothing more can be scheduled, so a
/// submission that finishes after unmount never navigates.
#[derive(Debug)]
pub struct PendingRedirect<H> {
    handle: Option<H>,
    disposed: bool,
}

impl<H> Default for PendingRedirect<H> {
    fn default() -> Self {
        Self {
            handle: None,
            disposed: false,
        }
    }
}

impl<H> PendingRedirect<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Run `start` and keep the timer handle it returns. `start` is not
    /// called once the screen is gone; returns whether it ran.
    pub fn schedule(&mut self, start: impl FnOnce() -> Option<H>) -> bool {
        if self.disposed {
            return false;
        }
        self.handle = start();
        true
    }

    /// Mark the screen gone and hand back the timer to cancel, if any
    pub fn dispose(&mut self) -> Option<H> {
        self.disposed = true;
        self.handle.take()
    }
}
