//! Pipes exposed to remote application sessions.
//!
//! A [`Pipe`] wraps a local endpoint (anything readable and writable) and
//! tracks its closure. Either party may close a pipe: the remote side through
//! the pipe registry, the local side directly. Close callbacks run exactly
//! once no matter how many closes race.

use std::fmt;
use std::io::{self, Read, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use kubeprobe_report::PipeId;
use tracing::debug;

use crate::PIPES_TARGET;

/// Local endpoint of a pipe.
pub trait PipeEnd: Read + Write + Send {}

impl<T> PipeEnd for T where T: Read + Write + Send {}

type ReleaseFn = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct CloseState {
    closed: bool,
    callbacks: Vec<ReleaseFn>,
}

/// Guard that runs its callbacks the first time it is closed.
///
/// Callbacks registered after closure run immediately, so a late
/// registration cannot leak the resource it was meant to release.
#[derive(Default)]
pub struct CloseOnce {
    state: Mutex<CloseState>,
}

impl CloseOnce {
    /// Creates an open guard with no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback to run on close.
    pub fn on_close(&self, callback: impl FnOnce() + Send + 'static) {
        let mut state = self.lock();
        if state.closed {
            drop(state);
            callback();
        } else {
            state.callbacks.push(Box::new(callback));
        }
    }

    /// Closes the guard.
    ///
    /// Returns `true` for the call that performed the closure and `false` for
    /// every later call. Callbacks run outside the lock.
    pub fn close(&self) -> bool {
        let callbacks = {
            let mut state = self.lock();
            if state.closed {
                return false;
            }
            state.closed = true;
            std::mem::take(&mut state.callbacks)
        };
        for callback in callbacks {
            callback();
        }
        true
    }

    /// Returns `true` once the guard has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, CloseState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CloseOnce {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        formatter
            .debug_struct("CloseOnce")
            .field("closed", &state.closed)
            .field("callbacks", &state.callbacks.len())
            .finish()
    }
}

/// Bidirectional byte channel registered for one application session.
///
/// Reads after closure report end of stream and writes fail with
/// [`io::ErrorKind::BrokenPipe`].
pub struct Pipe {
    id: PipeId,
    app_id: String,
    end: Mutex<Box<dyn PipeEnd>>,
    guard: CloseOnce,
}

impl Pipe {
    /// Creates an open pipe over `end`.
    pub fn new(id: PipeId, app_id: impl Into<String>, end: impl PipeEnd + 'static) -> Self {
        Self {
            id,
            app_id: app_id.into(),
            end: Mutex::new(Box::new(end)),
            guard: CloseOnce::new(),
        }
    }

    /// Returns the pipe identifier.
    #[must_use]
    pub const fn id(&self) -> &PipeId {
        &self.id
    }

    /// Returns the application session the pipe belongs to.
    #[must_use]
    pub fn app_id(&self) -> &str {
        self.app_id.as_str()
    }

    /// Registers a callback to run when the pipe closes.
    pub fn on_close(&self, callback: impl FnOnce() + Send + 'static) {
        self.guard.on_close(callback);
    }

    /// Closes the pipe, running its callbacks if this call performed the
    /// closure.
    pub fn close(&self) -> bool {
        let closed = self.guard.close();
        if closed {
            debug!(
                target: PIPES_TARGET,
                pipe = %self.id,
                app = %self.app_id,
                "pipe closed"
            );
        }
        closed
    }

    /// Returns `true` once the pipe has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.guard.is_closed()
    }

    /// Reads from the local endpoint.
    ///
    /// # Errors
    ///
    /// Propagates errors from the endpoint.
    pub fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_closed() {
            return Ok(0);
        }
        self.end().read(buf)
    }

    /// Writes to the local endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::BrokenPipe`] once the pipe is closed and
    /// propagates errors from the endpoint otherwise.
    pub fn write(&self, buf: &[u8]) -> io::Result<usize> {
        if self.is_closed() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                format!("pipe {} is closed", self.id),
            ));
        }
        self.end().write(buf)
    }

    fn end(&self) -> MutexGuard<'_, Box<dyn PipeEnd>> {
        self.end.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Read for &Pipe {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Pipe::read(*self, buf)
    }
}

impl Write for &Pipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Pipe::write(*self, buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        self.end().flush()
    }
}

impl fmt::Debug for Pipe {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Pipe")
            .field("id", &self.id)
            .field("app_id", &self.app_id)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
