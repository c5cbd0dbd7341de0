//! Test suites for the probe lifecycle and Kubernetes controls.

pub(crate) mod support;
