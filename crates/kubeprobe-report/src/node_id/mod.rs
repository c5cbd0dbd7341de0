//! Textual node identifiers for Kubernetes resources.
//!
//! A node identifier names one resource inside the topology. It is built from
//! the resource's unique id, the kind tag in angle brackets, and, for
//! namespaced resources, the namespace:
//!
//! ```text
//! <uid>;<tag>
//! <uid>;<tag>;<namespace>
//! ```
//!
//! The uid and namespace are percent-encoded so the delimiters never appear
//! unescaped. Encoding depends only on the three inputs, which keeps an
//! identifier stable across cache refreshes, and `decode` inverts `encode`
//! for every input.

use std::fmt;
use std::str::FromStr;

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use thiserror::Error;

use crate::topology::ResourceKind;

/// Separator between identifier components.
const DELIMITER: char = ';';

/// Characters escaped inside the uid and namespace components.
const COMPONENT: &AsciiSet = &CONTROLS.add(b';').add(b'<').add(b'>').add(b'%');

/// Errors raised while decoding a node identifier.
///
/// Callers receive the same "invalid identifier" outcome for both variants;
/// the split exists so logs can tell a garbled id from one addressed at the
/// wrong kind.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NodeIdError {
    /// The text does not follow the identifier grammar.
    #[error("malformed node id '{id}': {reason}")]
    Malformed {
        /// Identifier as received.
        id: String,
        /// Description of the grammar violation.
        reason: &'static str,
    },
    /// The identifier is well formed but names a different kind.
    #[error("node id '{id}' names a {found} where a {expected} was expected")]
    KindMismatch {
        /// Identifier as received.
        id: String,
        /// Kind the caller asked for.
        expected: ResourceKind,
        /// Kind encoded in the identifier.
        found: ResourceKind,
    },
}

impl NodeIdError {
    fn malformed(id: &str, reason: &'static str) -> Self {
        Self::Malformed {
            id: id.to_owned(),
            reason,
        }
    }
}

/// Decoded form of a node identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    kind: ResourceKind,
    namespace: Option<String>,
    uid: String,
}

impl NodeId {
    /// Builds a decoded identifier from its parts.
    #[must_use]
    pub fn new(kind: ResourceKind, namespace: Option<&str>, uid: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.map(str::to_owned),
            uid: uid.into(),
        }
    }

    /// Encodes the parts into the textual identifier.
    ///
    /// An empty `uid` produces text that [`NodeId::decode`] rejects.
    #[must_use]
    pub fn encode(kind: ResourceKind, namespace: Option<&str>, uid: &str) -> String {
        let mut encoded = format!(
            "{}{DELIMITER}<{}>",
            utf8_percent_encode(uid, COMPONENT),
            kind.tag()
        );
        if let Some(namespace) = namespace {
            encoded.push(DELIMITER);
            encoded.extend(utf8_percent_encode(namespace, COMPONENT));
        }
        encoded
    }

    /// Decodes a textual identifier of any kind.
    ///
    /// # Errors
    ///
    /// Returns [`NodeIdError::Malformed`] when the text does not follow the
    /// identifier grammar or names an unknown kind.
    pub fn decode(id: &str) -> Result<Self, NodeIdError> {
        let mut components = id.split(DELIMITER);
        let raw_uid = components.next().unwrap_or_default();
        let raw_tag = components
            .next()
            .ok_or_else(|| NodeIdError::malformed(id, "missing kind tag"))?;
        let raw_namespace = components.next();
        if components.next().is_some() {
            return Err(NodeIdError::malformed(id, "too many components"));
        }

        let tag = raw_tag
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(|| NodeIdError::malformed(id, "kind tag is not bracketed"))?;
        let kind = ResourceKind::from_tag(tag)
            .ok_or_else(|| NodeIdError::malformed(id, "unknown kind tag"))?;

        let uid = decode_component(id, raw_uid)?;
        if uid.is_empty() {
            return Err(NodeIdError::malformed(id, "empty uid"));
        }
        let namespace = raw_namespace
            .map(|raw| decode_component(id, raw))
            .transpose()?;

        Ok(Self {
            kind,
            namespace,
            uid,
        })
    }

    /// Decodes a textual identifier that must name a resource of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`NodeIdError::Malformed`] for unparsable text and
    /// [`NodeIdError::KindMismatch`] when the identifier names another kind.
    pub fn decode_as(kind: ResourceKind, id: &str) -> Result<Self, NodeIdError> {
        let decoded = Self::decode(id)?;
        if decoded.kind != kind {
            return Err(NodeIdError::KindMismatch {
                id: id.to_owned(),
                expected: kind,
                found: decoded.kind,
            });
        }
        Ok(decoded)
    }

    /// Returns the resource kind.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the namespace, if the identifier carries one.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the resource's unique id.
    #[must_use]
    pub fn uid(&self) -> &str {
        self.uid.as_str()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&Self::encode(self.kind, self.namespace(), &self.uid))
    }
}

impl FromStr for NodeId {
    type Err = NodeIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::decode(value)
    }
}

fn decode_component(id: &str, raw: &str) -> Result<String, NodeIdError> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| NodeIdError::malformed(id, "component is not valid UTF-8"))
}
