//! Test doubles shared by the unit and behavioural suites.

mod cache;
mod config_loader;
mod reporter;
mod world;

pub use cache::InMemoryCache;
pub use client::{ClientCall, RecordingClusterClient};
pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{TestWorld, world};
