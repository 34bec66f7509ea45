use std::fmt;

use crate::dom::SelectorError;

/// Command failure carrying the process exit code
#[derive(Debug)]
pub enum PresenterError {
    /// Target selector matched nothing (exit code 2)
    ElementNotFound(String),
    /// Selector could not be parsed (exit code 3)
    InvalidSelector(String),
    /// Slide store could not be read or written (exit code 4)
    StoreFailed(String),
    /// Daemon unreachable or misbehaving (exit code 5)
    DaemonFailed(String),
    /// Generic error (exit code 1)
    Other(anyhow::Error),
}

impl PresenterError {
    pub fn exit_code(&self) -> i32 {
        match self {
            PresenterError::ElementNotFound(_) => 2,
            PresenterError::InvalidSelector(_) => 3,
            PresenterError::StoreFailed(_) => 4,
            PresenterError::DaemonFailed(_) => 5,
            PresenterError::Other(_) => 1,
        }
    }
}

impl fmt::Display for PresenterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresenterError::ElementNotFound(msg) => write!(f, "{}", msg),
            PresenterError::InvalidSelector(msg) => write!(f, "Invalid selector: {}", msg),
            PresenterError::StoreFailed(msg) => write!(f, "Slide store failed: {}", msg),
            PresenterError::DaemonFailed(msg) => write!(f, "Daemon failed: {}", msg),
            PresenterError::Other(err) => write!(f, "{:#}", err),
        }
    }
}

impl std::error::Error for PresenterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PresenterError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for PresenterError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(selector_err) = err.downcast_ref::<SelectorError>() {
            return PresenterError::InvalidSelector(selector_err.to_string());
        }

        let msg = format!("{:#}", err);
        let lower = msg.to_lowercase();
        if msg.contains("No element matches selector") {
            PresenterError::ElementNotFound(msg)
        } else if lower.contains("slide store") {
            PresenterError::StoreFailed(msg)
        } else if lower.contains("daemon") {
            PresenterError::DaemonFailed(msg)
        } else {
            PresenterError::Other(err)
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
