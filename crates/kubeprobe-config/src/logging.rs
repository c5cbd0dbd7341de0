//! Output formats for the probe's diagnostic log.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How the probe renders log events on standard error.
///
/// Parsed case-insensitively from the `log_format` setting, so `JSON` and
/// `json` select the same format.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, fields flattened into the top level.
    #[default]
    Json,
    /// Single-line text for operators tailing the probe by hand.
    Compact,
}

impl LogFormat {
    /// Returns `true` when events are meant for a human reader.
    ///
    /// Only human-readable output is ever coloured.
    #[must_use]
    pub const fn is_human_readable(self) -> bool {
        matches!(self, Self::Compact)
    }
}

/// Error returned when `log_format` names no known format.
pub type LogFormatParseError = strum::ParseError;
