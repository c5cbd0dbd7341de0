//! Duplex adapter built from independent read and write halves.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// A readable stream that must be released explicitly.
///
/// Log tails and description dumps hold server-side resources until they are
/// closed, so dropping the reader is not enough. Both operations take `&self`:
/// a follow-mode tail can block in [`ReadCloser::read`] indefinitely, and
/// [`ReadCloser::close`] must be able to release it from another thread while
/// that read is in flight.
pub trait ReadCloser: Send + Sync {
    /// Reads bytes from the stream into `buf`.
    ///
    /// # Errors
    ///
    /// Returns any error reported by the underlying stream.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Releases the stream.
    ///
    /// A read blocked on the stream returns once it has been released.
    ///
    /// # Errors
    ///
    /// Returns any error reported while releasing the underlying resource.
    fn close(&self) -> io::Result<()>;
}

impl<T> ReadCloser for Box<T>
where
    T: ReadCloser + ?Sized,
{
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn close(&self) -> io::Result<()> {
        (**self).close()
    }
}

impl<T> ReadCloser for Arc<T>
where
    T: ReadCloser + ?Sized,
{
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    fn close(&self) -> io::Result<()> {
        (**self).close()
    }
}

/// Adapts a plain reader into a [`ReadCloser`] whose close does nothing.
#[derive(Debug, Default)]
pub struct NopCloser<R>(Mutex<R>);

impl<R> NopCloser<R> {
    /// Wraps `reader`.
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self(Mutex::new(reader))
    }

    /// Returns the wrapped reader.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.0.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: Read + Send> ReadCloser for NopCloser<R> {
    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read(buf)
    }

    fn close(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Pairs a read half and a write half into one bidirectional channel.
///
/// Reads are served by the read half only and writes go to the write half
/// only; neither half observes the other.
///
/// # Example
///
/// ```
/// use std::io::{self, Read, Write};
///
/// use kubeprobe_controls::Duplex;
///
/// let mut duplex = Duplex::new(&b"log line\n"[..], io::sink());
/// duplex.write_all(b"ignored").expect("sink accepts writes");
///
/// let mut text = String::new();
/// duplex.read_to_string(&mut text).expect("read half");
/// assert_eq!(text, "log line\n");
/// ```
#[derive(Debug)]
pub struct Duplex<R, W> {
    reader: R,
    writer: W,
}

impl<R, W> Duplex<R, W> {
    /// Builds a duplex from its halves.
    #[must_use]
    pub const fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Returns the read half.
    #[must_use]
    pub const fn reader(&self) -> &R {
        &self.reader
    }

    /// Returns the write half.
    #[must_use]
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Splits the duplex back into its halves.
    #[must_use]
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: Read, W> Read for Duplex<R, W> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl<R, W: Write> Write for Duplex<R, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
