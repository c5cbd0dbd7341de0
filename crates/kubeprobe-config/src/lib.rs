//! Shared configuration for the Kubernetes probe.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then an
//! optional TOML file (`--config-path`), then `KUBEPROBE_*` environment
//! variables, then command-line flags. Later layers win.

mod defaults;
mod logging;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_LOG_FILTER, DEFAULT_PROBE_ID, default_log_filter, default_log_filter_string,
    default_log_format, default_probe_id_string,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved probe configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "KUBEPROBE")]
pub struct Config {
    /// Identifier the probe reports in health events and logs.
    #[ortho_config(default = default_probe_id_string())]
    pub probe_id: String,
    /// `tracing` filter directive, e.g. `info` or `kubeprobe=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the log stream.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe_id: default_probe_id_string(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Returns the probe identifier.
    #[must_use]
    pub fn probe_id(&self) -> &str {
        self.probe_id.as_str()
    }

    /// Returns the log filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
