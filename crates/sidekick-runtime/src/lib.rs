//! Sidekick Runtime - Capture pipeline
//!
//! Wires the layers together:
//! - [`Pipeline`] owns one UDP receiver and one rig applier
//! - [`PipelineConfig`] is the serde-backed configuration surface
//! - [`telemetry`] installs the tracing subscriber
//!
//! The host calls [`Pipeline::tick`] once per update, never concurrently.

pub mod config;
pub mod pipeline;
pub mod telemetry;

pub use config::*;
pub use pipeline::*;
