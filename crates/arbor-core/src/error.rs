use std::fmt;

use crate::MountId;

/// Arena and bookkeeping failures surfaced by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    Missing { id: MountId },
    KindMismatch { id: MountId, expected: &'static str },
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::Missing { id } => write!(f, "mounted node {id} missing"),
            NodeError::KindMismatch { id, expected } => {
                write!(f, "mounted node {id} kind mismatch; expected {expected}")
            }
        }
    }
}

impl std::error::Error for NodeError {}

/// Failure raised by user code: a component render, a lifecycle hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentError {
    message: String,
}

impl ComponentError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ComponentError {}

impl From<String> for ComponentError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ComponentError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Where a captured error originated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// First render of a component while mounting.
    Mount,
    /// Re-render caused by a parent patch.
    Update,
    /// Re-render requested through the scheduler.
    Scheduler,
    /// A lifecycle hook or component lifecycle callback.
    LifecycleHook,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorOrigin::Mount => "mount",
            ErrorOrigin::Update => "update",
            ErrorOrigin::Scheduler => "scheduler flush",
            ErrorOrigin::LifecycleHook => "lifecycle hook",
        };
        f.write_str(label)
    }
}

/// A user-code failure caught by the engine, tagged with its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedError {
    pub origin: ErrorOrigin,
    /// Name of the nearest enclosing component, when there is one.
    pub component: Option<String>,
    pub error: ComponentError,
}

impl fmt::Display for CapturedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.component {
            Some(name) => write!(f, "{} failed in <{}>: {}", self.origin, name, self.error),
            None => write!(f, "{} failed: {}", self.origin, self.error),
        }
    }
}

impl std::error::Error for CapturedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Sink receiving every error captured during reconciliation.
pub trait ErrorHandler {
    fn handle(&mut self, error: CapturedError);
}

impl<F> ErrorHandler for F
where
    F: FnMut(CapturedError),
{
    fn handle(&mut self, error: CapturedError) {
        self(error)
    }
}

/// Default sink: reports through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogErrors;

impl ErrorHandler for LogErrors {
    fn handle(&mut self, error: CapturedError) {
        log::error!("{error}");
    }
}
