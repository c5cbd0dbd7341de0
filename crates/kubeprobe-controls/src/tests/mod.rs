//! Behaviour tests for bridging streams into pipes.

use std::io::{self, Cursor, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use rstest::{fixture, rstest};

use crate::{LocalPipeRegistry, PipeClient, PipeError, ReadCloser, bridge_stream};

/// Reader that counts how often it is closed.
struct CountingStream {
    inner: Mutex<Cursor<Vec<u8>>>,
    closes: Arc<AtomicUsize>,
}

impl CountingStream {
    fn new(data: &[u8]) -> (Box<dyn ReadCloser>, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let stream = Self {
            inner: Mutex::new(Cursor::new(data.to_vec())),
            closes: Arc::clone(&closes),
        };
        (Box::new(stream), closes)
    }
}

impl ReadCloser for CountingStream {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.lock().expect("cursor mutex poisoned").read(buf)
    }

    fn close(&self) -> io::Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Follow-mode stream: reads block until the stream is closed.
#[derive(Default)]
struct FollowStream {
    closed: Mutex<bool>,
    released: Condvar,
    closes: AtomicUsize,
}

impl ReadCloser for FollowStream {
    fn read(&self, _buf: &mut [u8]) -> io::Result<usize> {
        let closed = self.closed.lock().unwrap_or_else(PoisonError::into_inner);
        let _released = self
            .released
            .wait_while(closed, |closed| !*closed)
            .unwrap_or_else(PoisonError::into_inner);
        Ok(0)
    }

    fn close(&self) -> io::Result<()> {
        *self.closed.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.released.notify_all();
        Ok(())
    }
}

#[fixture]
fn pipes() -> Arc<LocalPipeRegistry> {
    let registry = Arc::new(LocalPipeRegistry::new());
    registry.open_session("app");
    registry
}

#[rstest]
fn pipe_yields_exactly_the_stream_bytes(pipes: Arc<LocalPipeRegistry>) {
    let (stream, _) = CountingStream::new(b"line one\nline two\n");
    let id = bridge_stream(stream, pipes.as_ref(), "app").expect("bridge stream");
    let pipe = pipes.pipe("app", &id).expect("registered pipe");

    let mut received = Vec::new();
    (&*pipe).read_to_end(&mut received).expect("read pipe");
    assert_eq!(received, b"line one\nline two\n");
}

#[rstest]
fn pipe_discards_writes(pipes: Arc<LocalPipeRegistry>) {
    let (stream, _) = CountingStream::new(b"payload");
    let id = bridge_stream(stream, pipes.as_ref(), "app").expect("bridge stream");
    let pipe = pipes.pipe("app", &id).expect("registered pipe");

    (&*pipe)
        .write_all(b"remote keystrokes")
        .expect("writes are accepted");
    let mut received = String::new();
    (&*pipe).read_to_string(&mut received).expect("read pipe");
    assert_eq!(received, "payload");
}

#[rstest]
fn closing_from_both_sides_closes_stream_once(pipes: Arc<LocalPipeRegistry>) {
    let (stream, closes) = CountingStream::new(b"payload");
    let id = bridge_stream(stream, pipes.as_ref(), "app").expect("bridge stream");
    let pipe = pipes.pipe("app", &id).expect("registered pipe");

    pipe.close();
    // The local close pruned nothing yet, so the remote close still finds it.
    pipes.pipe_close("app", &id).expect("pipe still registered");
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[rstest]
fn concurrent_closes_close_stream_once(pipes: Arc<LocalPipeRegistry>) {
    let (stream, closes) = CountingStream::new(b"payload");
    let id = bridge_stream(stream, pipes.as_ref(), "app").expect("bridge stream");
    let pipe = pipes.pipe("app", &id).expect("registered pipe");

    let remote = {
        let pipes = Arc::clone(&pipes);
        let id = id.clone();
        thread::spawn(move || pipes.pipe_close("app", &id))
    };
    let local = thread::spawn(move || pipe.close());
    let remote_outcome = remote.join().expect("remote close panicked");
    local.join().expect("local close panicked");

    // The remote side always finds the pipe: a local close leaves the entry
    // in place until the next lookup.
    assert_eq!(remote_outcome, Ok(()));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[rstest]
fn failed_registration_closes_stream(pipes: Arc<LocalPipeRegistry>) {
    let (stream, closes) = CountingStream::new(b"payload");
    let error = bridge_stream(stream, pipes.as_ref(), "unknown-app").expect_err("no session");

    assert_eq!(error, PipeError::unknown_session("unknown-app"));
    assert_eq!(closes.load(Ordering::SeqCst), 1);
}

#[rstest]
fn session_teardown_releases_bridged_streams(pipes: Arc<LocalPipeRegistry>) {
    let (first, first_closes) = CountingStream::new(b"a");
    let (second, second_closes) = CountingStream::new(b"b");
    bridge_stream(first, pipes.as_ref(), "app").expect("bridge first");
    bridge_stream(second, pipes.as_ref(), "app").expect("bridge second");

    assert_eq!(pipes.close_session("app"), 2);
    assert_eq!(first_closes.load(Ordering::SeqCst), 1);
    assert_eq!(second_closes.load(Ordering::SeqCst), 1);
}

#[rstest]
fn reads_after_close_report_end_of_stream(pipes: Arc<LocalPipeRegistry>) {
    let (stream, _) = CountingStream::new(b"never read");
    let id = bridge_stream(stream, pipes.as_ref(), "app").expect("bridge stream");
    let pipe = pipes.pipe("app", &id).expect("registered pipe");
    pipes.pipe_close("app", &id).expect("remote close");

    let mut buf = [0_u8; 16];
    assert_eq!(pipe.read(&mut buf).expect("read after close"), 0);
}

#[rstest]
fn end_of_stream_closes_the_pipe(pipes: Arc<LocalPipeRegistry>) {
    let (stream, closes) = CountingStream::new(b"short log");
    let id = bridge_stream(stream, pipes.as_ref(), "app").expect("bridge stream");
    let pipe = pipes.pipe("app", &id).expect("registered pipe");

    let mut received = Vec::new();
    (&*pipe).read_to_end(&mut received).expect("read pipe");

    assert_eq!(received, b"short log");
    assert!(pipe.is_closed());
    assert_eq!(closes.load(Ordering::SeqCst), 1);
    assert_eq!(pipes.open_pipes("app"), 0);
    assert!(pipes.pipe("app", &id).is_none());
}

#[rstest]
fn remote_close_releases_a_blocked_read(pipes: Arc<LocalPipeRegistry>) {
    let stream = Arc::new(FollowStream::default());
    let id = bridge_stream(Box::new(Arc::clone(&stream)), pipes.as_ref(), "app")
        .expect("bridge stream");
    let pipe = pipes.pipe("app", &id).expect("registered pipe");

    let reader = thread::spawn(move || {
        let mut received = Vec::new();
        (&*pipe).read_to_end(&mut received).map(|_| received)
    });

    let (done, closed) = mpsc::channel();
    let closer = {
        let pipes = Arc::clone(&pipes);
        let id = id.clone();
        thread::spawn(move || {
            let outcome = pipes.pipe_close("app", &id);
            done.send(()).expect("test still waiting");
            outcome
        })
    };

    closed
        .recv_timeout(Duration::from_secs(5))
        .expect("remote close must not wait for the blocked read");
    assert_eq!(closer.join().expect("close thread panicked"), Ok(()));
    let received = reader.join().expect("reader panicked").expect("read pipe");
    assert!(received.is_empty());
    assert_eq!(stream.closes.load(Ordering::SeqCst), 1);
}

#[rstest]
fn session_teardown_releases_a_blocked_read(pipes: Arc<LocalPipeRegistry>) {
    let stream = Arc::new(FollowStream::default());
    let id = bridge_stream(Box::new(Arc::clone(&stream)), pipes.as_ref(), "app")
        .expect("bridge stream");
    let pipe = pipes.pipe("app", &id).expect("registered pipe");

    let reader = thread::spawn(move || {
        let mut buf = [0_u8; 16];
        pipe.read(&mut buf)
    });

    assert_eq!(pipes.close_session("app"), 1);
    assert_eq!(reader.join().expect("reader panicked").expect("read"), 0);
    assert_eq!(stream.closes.load(Ordering::SeqCst), 1);
}
