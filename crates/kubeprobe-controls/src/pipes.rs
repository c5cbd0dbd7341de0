//! Pipe registration, keyed by application session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kubeprobe_report::PipeId;
use tracing::{debug, info};

use crate::PIPES_TARGET;
use crate::error::PipeError;
use crate::pipe::Pipe;

/// Transport side of pipe management.
///
/// Implementations attach registered pipes to the remote application session
/// and report remote closure by calling [`PipeClient::pipe_close`].
pub trait PipeClient: Send + Sync {
    /// Registers `pipe` under `pipe_id` for the session `app_id`.
    ///
    /// # Errors
    ///
    /// Returns a [`PipeError`] when the session cannot accept the pipe.
    fn pipe_connection(
        &self,
        app_id: &str,
        pipe_id: &PipeId,
        pipe: Arc<Pipe>,
    ) -> Result<(), PipeError>;

    /// Removes and closes a pipe on behalf of the remote side.
    ///
    /// # Errors
    ///
    /// Returns [`PipeError::UnknownPipe`] when no such pipe is registered.
    fn pipe_close(&self, app_id: &str, pipe_id: &PipeId) -> Result<(), PipeError>;
}

impl<T> PipeClient for Arc<T>
where
    T: PipeClient + ?Sized,
{
    fn pipe_connection(
        &self,
        app_id: &str,
        pipe_id: &PipeId,
        pipe: Arc<Pipe>,
    ) -> Result<(), PipeError> {
        (**self).pipe_connection(app_id, pipe_id, pipe)
    }

    fn pipe_close(&self, app_id: &str, pipe_id: &PipeId) -> Result<(), PipeError> {
        (**self).pipe_close(app_id, pipe_id)
    }
}

type SessionPipes = HashMap<PipeId, Arc<Pipe>>;

/// In-process pipe registry.
///
/// Sessions must be opened before pipes can be registered for them. Closing a
/// session closes every pipe it still holds.
#[derive(Debug, Default)]
pub struct LocalPipeRegistry {
    sessions: Mutex<HashMap<String, SessionPipes>>,
}

impl LocalPipeRegistry {
    /// Creates a registry with no sessions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session so pipes can be registered for it.
    ///
    /// Opening an already open session keeps its pipes.
    pub fn open_session(&self, app_id: impl Into<String>) {
        let app_id = app_id.into();
        debug!(target: PIPES_TARGET, app = %app_id, "session opened");
        self.lock().entry(app_id).or_default();
    }

    /// Closes a session and every pipe registered for it.
    ///
    /// Returns the number of pipes that were closed.
    pub fn close_session(&self, app_id: &str) -> usize {
        let pipes = self.lock().remove(app_id).unwrap_or_default();
        let closed = pipes.values().filter(|pipe| pipe.close()).count();
        info!(
            target: PIPES_TARGET,
            app = app_id,
            closed,
            "session closed"
        );
        closed
    }

    /// Returns `true` when the session is open.
    #[must_use]
    pub fn has_session(&self, app_id: &str) -> bool {
        self.lock().contains_key(app_id)
    }

    /// Looks up an open pipe.
    ///
    /// Pipes closed by the local side are pruned on lookup.
    #[must_use]
    pub fn pipe(&self, app_id: &str, pipe_id: &PipeId) -> Option<Arc<Pipe>> {
        let mut sessions = self.lock();
        let pipes = sessions.get_mut(app_id)?;
        if pipes.get(pipe_id)?.is_closed() {
            pipes.remove(pipe_id);
            return None;
        }
        pipes.get(pipe_id).cloned()
    }

    /// Returns the number of open pipes registered for the session.
    #[must_use]
    pub fn open_pipes(&self, app_id: &str) -> usize {
        self.lock()
            .get(app_id)
            .map_or(0, |pipes| pipes.values().filter(|pipe| !pipe.is_closed()).count())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionPipes>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PipeClient for LocalPipeRegistry {
    fn pipe_connection(
        &self,
        app_id: &str,
        pipe_id: &PipeId,
        pipe: Arc<Pipe>,
    ) -> Result<(), PipeError> {
        let mut sessions = self.lock();
        let pipes = sessions
            .get_mut(app_id)
            .ok_or_else(|| PipeError::unknown_session(app_id))?;
        if pipes.contains_key(pipe_id) {
            return Err(PipeError::duplicate_pipe(app_id, pipe_id.clone()));
        }
        pipes.insert(pipe_id.clone(), pipe);
        debug!(target: PIPES_TARGET, app = app_id, pipe = %pipe_id, "pipe registered");
        Ok(())
    }

    fn pipe_close(&self, app_id: &str, pipe_id: &PipeId) -> Result<(), PipeError> {
        let pipe = self
            .lock()
            .get_mut(app_id)
            .and_then(|pipes| pipes.remove(pipe_id))
            .ok_or_else(|| PipeError::unknown_pipe(app_id, pipe_id.clone()))?;
        pipe.close();
        Ok(())
    }
}
