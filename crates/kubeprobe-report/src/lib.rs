//! Shared report vocabulary for the Kubernetes probe.
//!
//! The crate defines the types that cross the boundary between the probe and
//! the remote caller: the resource kinds the probe understands, the textual
//! node identifiers that name a resource inside the topology, the stable
//! control identifiers, and the request and response envelopes exchanged for
//! every control invocation.
//!
//! # Example
//!
//! ```
//! use kubeprobe_report::{NodeId, ResourceKind};
//!
//! let encoded = NodeId::encode(ResourceKind::Pod, Some("ns1"), "abc");
//! let decoded = NodeId::decode_as(ResourceKind::Pod, &encoded).expect("valid pod id");
//! assert_eq!(decoded.uid(), "abc");
//! assert_eq!(decoded.namespace(), Some("ns1"));
//! ```

pub mod controls;
pub mod node_id;
pub mod topology;
pub mod xfer;

pub use self::node_id::{NodeId, NodeIdError};
pub use self::topology::{GroupKind, ResourceKind, ResourceKindParseError};
pub use self::xfer::{ControlRequest, ControlResponse, PipeId, ResponseFrameError};
