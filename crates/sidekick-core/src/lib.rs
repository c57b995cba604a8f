//! Sidekick Core - Fundamental types for the face capture feed
//!
//! This crate defines the types shared by every layer of the pipeline:
//! - Capability sets and packet layouts (which sections a datagram carries)
//! - The channel index table of the decoded value array
//! - Error types

pub mod capability;
pub mod channel;
pub mod error;

pub use capability::*;
pub use error::*;
