//! Control dispatch and pipe plumbing for the probe.
//!
//! The crate owns two pieces of probe-side infrastructure that integrations
//! build on:
//!
//! - the [`HandlerRegistry`], which binds control identifiers to handler
//!   functions and dispatches incoming [`ControlRequest`] values to them; its
//!   membership only changes through atomic batch updates, so a concurrent
//!   dispatcher never observes a half-installed handler set;
//! - pipes, which expose a local byte stream to a remote application session
//!   under a fresh [`PipeId`]. [`bridge_stream`] turns a one-directional
//!   reader (a log tail, a description dump) into a pipe whose write half
//!   discards input and whose source is closed exactly once.
//!
//! [`ControlRequest`]: kubeprobe_report::ControlRequest
//! [`PipeId`]: kubeprobe_report::PipeId

mod bridge;
mod duplex;
mod error;
mod pipe;
mod pipes;
mod registry;

#[cfg(test)]
mod tests;

pub use self::bridge::{allocate_pipe_id, bridge_stream};
pub use self::duplex::{Duplex, NopCloser, ReadCloser};
pub use self::error::PipeError;
pub use self::pipe::{CloseOnce, Pipe, PipeEnd};
pub use self::pipes::{LocalPipeRegistry, PipeClient};
pub use self::registry::{ControlHandler, HandlerRegistry};

/// Tracing target for control dispatch.
pub(crate) const CONTROLS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::controls");

/// Tracing target for pipe lifecycle events.
pub(crate) const PIPES_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::pipes");
