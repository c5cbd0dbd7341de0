//! Errors raised while registering or closing pipes.

use kubeprobe_report::PipeId;
use thiserror::Error;

/// Errors reported by a [`PipeClient`](crate::PipeClient).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipeError {
    /// The application session is not connected.
    #[error("unknown application session: {app_id}")]
    UnknownSession {
        /// Session the pipe was addressed to.
        app_id: String,
    },
    /// A pipe with the same identifier is already registered.
    #[error("pipe {pipe_id} is already registered for session {app_id}")]
    DuplicatePipe {
        /// Session the pipe was addressed to.
        app_id: String,
        /// Conflicting identifier.
        pipe_id: PipeId,
    },
    /// No pipe with the identifier is registered for the session.
    #[error("pipe {pipe_id} is not registered for session {app_id}")]
    UnknownPipe {
        /// Session the pipe was addressed to.
        app_id: String,
        /// Identifier that was looked up.
        pipe_id: PipeId,
    },
}

impl PipeError {
    /// Creates an unknown session error.
    pub fn unknown_session(app_id: impl Into<String>) -> Self {
        Self::UnknownSession {
            app_id: app_id.into(),
        }
    }

    /// Creates a duplicate pipe error.
    pub fn duplicate_pipe(app_id: impl Into<String>, pipe_id: PipeId) -> Self {
        Self::DuplicatePipe {
            app_id: app_id.into(),
            pipe_id,
        }
    }

    /// Creates an unknown pipe error.
    pub fn unknown_pipe(app_id: impl Into<String>, pipe_id: PipeId) -> Self {
        Self::UnknownPipe {
            app_id: app_id.into(),
            pipe_id,
        }
    }
}
