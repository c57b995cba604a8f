//! Sidekick Transport Layer - UDP receive and hand-off
//!
//! This crate provides:
//! - A single-slot overwrite cell between the receive task and the tick loop
//! - The UDP receiver that keeps that slot filled with the newest datagram

pub mod slot;
pub mod udp;

pub use slot::*;
pub use udp::*;
