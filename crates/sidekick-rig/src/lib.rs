//! Sidekick Rig - Applying capture frames to an avatar
//!
//! The capture feed drives three things on a rig:
//! - Blendshape weights on every attached face mesh
//! - Eye bones, aimed through per-eye calibration anchors
//! - The head transform, smoothed against the previous pose
//!
//! The rig itself lives outside this crate behind the [`Rig`] trait.
//! [`SceneRig`] is a small in-memory implementation for tools and tests.

pub mod applier;
pub mod calibration;
pub mod math;
pub mod rig;
pub mod scene;

pub use applier::*;
pub use calibration::*;
pub use math::*;
pub use rig::*;
pub use scene::*;
