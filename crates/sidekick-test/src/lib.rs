//! Sidekick Test Harness - Packet synthesis and pipeline validation
//!
//! This crate provides:
//! - Device packet synthesis for every layout
//! - Seeded garbage/valid datagram generation
//! - A ready-made avatar rig
//! - End-to-end scenarios over loopback UDP

pub mod chaos;
pub mod fixture;
pub mod integration;
pub mod packet;

pub use chaos::*;
pub use fixture::*;
pub use packet::*;
