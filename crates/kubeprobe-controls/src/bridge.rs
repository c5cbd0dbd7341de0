//! Bridges one-directional streams into registered pipes.
//!
//! Controls such as log tailing produce a reader, but remote callers attach to
//! bidirectional pipes. [`bridge_stream`] pairs the reader with a discarding
//! write half, registers the result, and ties the reader's release to the
//! pipe's closure. The reader is released exactly once: when the pipe closes
//! from either side, when the stream reaches its end, or straight away if
//! registration fails.

use std::io::{self, Read};
use std::sync::{Arc, Weak};

use kubeprobe_report::PipeId;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::PIPES_TARGET;
use crate::duplex::{Duplex, ReadCloser};
use crate::error::PipeError;
use crate::pipe::Pipe;
use crate::pipes::PipeClient;

/// Allocates a fresh, unguessable pipe identifier.
#[must_use]
pub fn allocate_pipe_id() -> PipeId {
    PipeId::new(format!("pipe-{}", Uuid::new_v4().simple()))
}

/// Registers `stream` as the read half of a new pipe for `app_id`.
///
/// Writes to the pipe are discarded. The stream is closed when the pipe
/// closes, including while a read is blocked on it, and the pipe closes
/// itself once the stream reports end of stream.
///
/// # Errors
///
/// Returns the [`PipeError`] reported by `client`. The stream has already
/// been closed when the error is returned.
pub fn bridge_stream(
    stream: Box<dyn ReadCloser>,
    client: &dyn PipeClient,
    app_id: &str,
) -> Result<PipeId, PipeError> {
    let stream: Arc<dyn ReadCloser> = Arc::from(stream);
    let release = Arc::clone(&stream);
    let pipe_id = allocate_pipe_id();
    let pipe = Arc::new_cyclic(|pipe| {
        let source = BridgedReader {
            stream,
            pipe: Weak::clone(pipe),
        };
        Pipe::new(pipe_id.clone(), app_id, Duplex::new(source, io::sink()))
    });
    pipe.on_close(move || {
        if let Err(error) = release.close() {
            warn!(target: PIPES_TARGET, %error, "failed to close bridged stream");
        }
    });

    if let Err(error) = client.pipe_connection(app_id, &pipe_id, Arc::clone(&pipe)) {
        warn!(
            target: PIPES_TARGET,
            app = app_id,
            pipe = %pipe_id,
            %error,
            "pipe registration failed"
        );
        pipe.close();
        return Err(error);
    }

    debug!(target: PIPES_TARGET, app = app_id, pipe = %pipe_id, "stream bridged");
    Ok(pipe_id)
}

/// Read half of a bridged pipe.
///
/// Holds the pipe weakly: the pipe owns its read half, and the reader only
/// needs it to close the pipe at end of stream.
struct BridgedReader {
    stream: Arc<dyn ReadCloser>,
    pipe: Weak<Pipe>,
}

impl Read for BridgedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.stream.read(buf)?;
        if read == 0
            && !buf.is_empty()
            && let Some(pipe) = self.pipe.upgrade()
        {
            pipe.close();
        }
        Ok(read)
    }
}
