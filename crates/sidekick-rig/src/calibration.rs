//! Rest-pose calibration of the eye bones
//!
//! Captured once, while the rig is still in its rest pose, and never
//! recaptured. Gaze is then expressed relative to that rest pose.

use crate::{Quat, Rig, RigBindings};

/// Rest-pose data for one eye
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeCalibration<B> {
    /// World rotation of the eye at rest
    pub initial_rotation: Quat,
    /// Local rotation of the eye at rest
    pub initial_local_rotation: Quat,
    /// Node at the eye position with an identity world rotation, parented
    /// like the eye
    pub anchor: B,
}

impl<B: Copy> EyeCalibration<B> {
    /// Read the rest pose of `eye` and create its anchor
    pub fn capture<R: Rig<Bone = B>>(rig: &mut R, eye: B) -> Option<Self> {
        let initial_rotation = rig.world_rotation(eye);
        let initial_local_rotation = rig.local_rotation(eye);
        let anchor = rig.create_anchor(eye)?;

        Some(EyeCalibration {
            initial_rotation,
            initial_local_rotation,
            anchor,
        })
    }
}

/// Calibration of both eyes; an unbound eye has no entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationState<B> {
    pub left: Option<EyeCalibration<B>>,
    pub right: Option<EyeCalibration<B>>,
}

impl<B: Copy> CalibrationState<B> {
    pub fn capture<R: Rig<Bone = B>>(rig: &mut R, bindings: &RigBindings<R>) -> Self {
        let left = bindings
            .left_eye
            .and_then(|eye| EyeCalibration::capture(rig, eye));
        let right = bindings
            .right_eye
            .and_then(|eye| EyeCalibration::capture(rig, eye));

        CalibrationState { left, right }
    }
}
