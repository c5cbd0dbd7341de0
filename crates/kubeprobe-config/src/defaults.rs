use crate::logging::LogFormat;

/// Default log filter expression used by the probe.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Identifier reported by a probe that was not given one explicitly.
pub const DEFAULT_PROBE_ID: &str = "kubeprobe";

/// Default log filter expression used by the probe.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Owned probe identifier used where allocation is required.
pub fn default_probe_id_string() -> String {
    DEFAULT_PROBE_ID.to_owned()
}

/// Default logging format for the probe.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
