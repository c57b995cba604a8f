//! Sidekick Wire Format - Fixed-size capture datagrams
//!
//! A capture datagram is a flat sequence of 2-byte encoded floats with no
//! header, no sequence number and no checksum:
//! - Half-like float codec (bit-exact with the capture device)
//! - Frame decoding into a fixed 62-slot value array
//! - Typed accessors for blendshapes, gaze and head pose

pub mod frame;
pub mod half;

pub use frame::*;
pub use half::*;
