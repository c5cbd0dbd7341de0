//! Request and response envelopes for control invocations.
//!
//! A remote caller sends one [`ControlRequest`] per invocation and receives
//! exactly one [`ControlResponse`]. On the wire a response is a JSON object
//! with at most one of `value`, `removedNode`, `pipe` or `error` present; an
//! empty object acknowledges a control that produced nothing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A control invocation addressed at one topology node.
///
/// # Example
///
/// ```
/// use kubeprobe_report::ControlRequest;
///
/// let request = ControlRequest::new("app-1", "abc;<pod>;ns1", "kubernetes_delete_pod");
/// assert_eq!(request.app_id(), "app-1");
/// assert!(request.control_args().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    #[serde(rename = "appID")]
    app_id: String,
    #[serde(rename = "nodeID")]
    node_id: String,
    control: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    control_args: BTreeMap<String, String>,
}

impl ControlRequest {
    /// Creates a request without control arguments.
    #[must_use]
    pub fn new(
        app_id: impl Into<String>,
        node_id: impl Into<String>,
        control: impl Into<String>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            node_id: node_id.into(),
            control: control.into(),
            control_args: BTreeMap::new(),
        }
    }

    /// Returns a copy of the request carrying the given control arguments.
    #[must_use]
    pub fn with_control_args(mut self, control_args: BTreeMap<String, String>) -> Self {
        self.control_args = control_args;
        self
    }

    /// Returns the application session that issued the request.
    #[must_use]
    pub fn app_id(&self) -> &str {
        self.app_id.as_str()
    }

    /// Returns the targeted node identifier.
    #[must_use]
    pub fn node_id(&self) -> &str {
        self.node_id.as_str()
    }

    /// Returns the control identifier being invoked.
    #[must_use]
    pub fn control(&self) -> &str {
        self.control.as_str()
    }

    /// Returns the opaque control arguments.
    #[must_use]
    pub const fn control_args(&self) -> &BTreeMap<String, String> {
        &self.control_args
    }
}

/// Identifier of a registered pipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipeId(String);

impl PipeId {
    /// Wraps an already allocated pipe identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PipeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Outcome of one control invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ResponseFrame", try_from = "ResponseFrame")]
pub enum ControlResponse {
    /// The control completed and has nothing to report.
    Empty,
    /// The control completed with a scalar acknowledgement.
    Value(String),
    /// The control removed the named node from the topology.
    RemovedNode(String),
    /// The control opened a pipe the caller can attach to.
    Pipe(PipeId),
    /// The control failed.
    Error(String),
}

impl ControlResponse {
    /// Builds an error response from any displayable error.
    #[must_use]
    pub fn error(error: impl fmt::Display) -> Self {
        Self::Error(error.to_string())
    }

    /// Returns the error message when the response is an error.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Returns the pipe identifier when the response opened a pipe.
    #[must_use]
    pub const fn pipe_id(&self) -> Option<&PipeId> {
        match self {
            Self::Pipe(id) => Some(id),
            _ => None,
        }
    }

    /// Returns `true` for error responses.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Error raised when a wire frame populates more than one field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("response populates {count} fields; at most one is allowed")]
pub struct ResponseFrameError {
    count: usize,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ResponseFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<String>,
    #[serde(
        rename = "removedNode",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    removed_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pipe: Option<PipeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<ControlResponse> for ResponseFrame {
    fn from(response: ControlResponse) -> Self {
        match response {
            ControlResponse::Empty => Self::default(),
            ControlResponse::Value(value) => Self {
                value: Some(value),
                ..Self::default()
            },
            ControlResponse::RemovedNode(node) => Self {
                removed_node: Some(node),
                ..Self::default()
            },
            ControlResponse::Pipe(pipe) => Self {
                pipe: Some(pipe),
                ..Self::default()
            },
            ControlResponse::Error(error) => Self {
                error: Some(error),
                ..Self::default()
            },
        }
    }
}

impl TryFrom<ResponseFrame> for ControlResponse {
    type Error = ResponseFrameError;

    fn try_from(frame: ResponseFrame) -> Result<Self, ResponseFrameError> {
        match frame {
            ResponseFrame {
                value: None,
                removed_node: None,
                pipe: None,
                error: None,
            } => Ok(Self::Empty),
            ResponseFrame {
                value: Some(value),
                removed_node: None,
                pipe: None,
                error: None,
            } => Ok(Self::Value(value)),
            ResponseFrame {
                value: None,
                removed_node: Some(node),
                pipe: None,
                error: None,
            } => Ok(Self::RemovedNode(node)),
            ResponseFrame {
                value: None,
                removed_node: None,
                pipe: Some(pipe),
                error: None,
            } => Ok(Self::Pipe(pipe)),
            ResponseFrame {
                value: None,
                removed_node: None,
                pipe: None,
                error: Some(error),
            } => Ok(Self::Error(error)),
            frame => Err(ResponseFrameError {
                count: frame.populated(),
            }),
        }
    }
}

impl ResponseFrame {
    fn populated(&self) -> usize {
        [
            self.value.is_some(),
            self.removed_node.is_some(),
            self.pipe.is_some(),
            self.error.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}
