//! Per-frame application of capture data to a rig
//!
//! State machine: `Uncalibrated -> Calibrated`. Calibration happens once,
//! either explicitly or lazily before the first frame, and is never redone.

use sidekick_core::channel::BLENDSHAPE_COUNT;
use sidekick_wire::{EyeAngles, Frame, HeadPose};

use crate::{CalibrationState, EyeCalibration, Quat, Rig, Vec3};

/// Upper bound for smoothing factors
pub const MAX_SMOOTHING: f32 = 0.99;

fn clamp_factor(value: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

/// Head smoothing factors in [0, 0.99].
///
/// The factor is the share of the previously applied pose kept each frame:
/// 0 applies the new pose as is, values near 1 smooth heavily.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SmoothingConfig {
    rotation: f32,
    position: f32,
}

impl SmoothingConfig {
    pub const NONE: SmoothingConfig = SmoothingConfig {
        rotation: 0.0,
        position: 0.0,
    };

    /// Out-of-range factors are clamped; non-finite factors become 0
    pub fn new(rotation: f32, position: f32) -> Self {
        SmoothingConfig {
            rotation: clamp_factor(rotation, MAX_SMOOTHING),
            position: clamp_factor(position, MAX_SMOOTHING),
        }
    }

    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }
}

/// Sign conventions for the head transform. Fixed for the lifetime of an
/// applier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeadMode {
    /// Rotation `(-pitch, -yaw, roll)`, position `(-z, y, x)`. The device
    /// plugin's mirror-location branch, dormant there.
    #[default]
    Direct,
    /// Rotation `(-pitch, yaw, -roll)`, position `(z, y, x)`. The branch the
    /// device plugin runs by default.
    Mirrored,
}

impl HeadMode {
    /// Target local rotation of the head bone
    pub fn rotation(self, head: &HeadPose) -> Quat {
        match self {
            HeadMode::Direct => Quat::from_euler_degrees(-head.pitch, -head.yaw, head.roll),
            HeadMode::Mirrored => Quat::from_euler_degrees(-head.pitch, head.yaw, -head.roll),
        }
    }

    /// Target local position of the head bone
    pub fn position(self, head: &HeadPose) -> Vec3 {
        let [x, y, z] = head.position;
        match self {
            HeadMode::Direct => Vec3::new(-z, y, x),
            HeadMode::Mirrored => Vec3::new(z, y, x),
        }
    }
}

/// Applier configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApplierConfig {
    /// Apply head position as well as head rotation
    pub head_tracking: bool,
    pub smoothing: SmoothingConfig,
    pub head_mode: HeadMode,
    /// Blend from the rest pose towards the tracked gaze, in [0, 1]
    pub gaze_weight: f32,
}

impl Default for ApplierConfig {
    fn default() -> Self {
        ApplierConfig {
            head_tracking: true,
            smoothing: SmoothingConfig::NONE,
            head_mode: HeadMode::Direct,
            gaze_weight: 1.0,
        }
    }
}

impl ApplierConfig {
    pub fn with_gaze_weight(mut self, weight: f32) -> Self {
        self.gaze_weight = clamp_factor(weight, 1.0);
        self
    }
}

/// Rig handles the applier drives. Any of them may be unset.
pub struct RigBindings<R: Rig> {
    /// Meshes carrying the 52 capture blendshapes
    pub meshes: Vec<R::Mesh>,
    pub left_eye: Option<R::Bone>,
    pub right_eye: Option<R::Bone>,
    /// Head transform; also provides the up axis for gaze
    pub head: Option<R::Bone>,
}

impl<R: Rig> Default for RigBindings<R> {
    fn default() -> Self {
        RigBindings {
            meshes: Vec::new(),
            left_eye: None,
            right_eye: None,
            head: None,
        }
    }
}

impl<R: Rig> Clone for RigBindings<R> {
    fn clone(&self) -> Self {
        RigBindings {
            meshes: self.meshes.clone(),
            left_eye: self.left_eye,
            right_eye: self.right_eye,
            head: self.head,
        }
    }
}

enum ApplierState<B> {
    Uncalibrated,
    Calibrated(CalibrationState<B>),
}

/// Drives a [`Rig`] from decoded frames
pub struct RigApplier<R: Rig> {
    config: ApplierConfig,
    bindings: RigBindings<R>,
    state: ApplierState<R::Bone>,
    frames_applied: u64,
}

impl<R: Rig> RigApplier<R> {
    pub fn new(config: ApplierConfig, bindings: RigBindings<R>) -> Self {
        let config = ApplierConfig {
            smoothing: SmoothingConfig::new(
                config.smoothing.rotation(),
                config.smoothing.position(),
            ),
            ..config.with_gaze_weight(config.gaze_weight)
        };

        RigApplier {
            config,
            bindings,
            state: ApplierState::Uncalibrated,
            frames_applied: 0,
        }
    }

    pub fn config(&self) -> &ApplierConfig {
        &self.config
    }

    pub fn bindings(&self) -> &RigBindings<R> {
        &self.bindings
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self.state, ApplierState::Calibrated(_))
    }

    pub fn calibration(&self) -> Option<&CalibrationState<R::Bone>> {
        match &self.state {
            ApplierState::Calibrated(calibration) => Some(calibration),
            ApplierState::Uncalibrated => None,
        }
    }

    pub fn frames_applied(&self) -> u64 {
        self.frames_applied
    }

    /// Capture the rest pose. The rig must be in its rest pose.
    ///
    /// Returns `false` if calibration had already happened; nothing is
    /// recaptured in that case.
    pub fn calibrate(&mut self, rig: &mut R) -> bool {
        if self.is_calibrated() {
            return false;
        }

        let calibration = CalibrationState::capture(rig, &self.bindings);
        tracing::debug!(
            left_eye = calibration.left.is_some(),
            right_eye = calibration.right.is_some(),
            "captured rest pose"
        );
        self.state = ApplierState::Calibrated(calibration);
        true
    }

    /// Apply one frame, calibrating first if needed
    pub fn apply(&mut self, rig: &mut R, frame: &Frame) {
        self.calibrate(rig);

        let caps = frame.capabilities();
        if caps.has_blendshapes() {
            self.apply_blendshapes(rig, frame.blendshapes());
        }
        if let Some(gaze) = frame.gaze() {
            self.apply_gaze(rig, gaze.left, gaze.right);
        }
        if let Some(head) = frame.head() {
            self.apply_head(rig, &head);
        }

        self.frames_applied += 1;
        tracing::trace!(layout = ?frame.layout(), "applied frame");
    }

    fn apply_blendshapes(&self, rig: &mut R, weights: &[f32]) {
        for (index, weight) in weights.iter().take(BLENDSHAPE_COUNT).enumerate() {
            for mesh in &self.bindings.meshes {
                rig.set_blend_shape_weight(*mesh, index, *weight);
            }
        }
    }

    fn apply_gaze(&self, rig: &mut R, left: EyeAngles, right: EyeAngles) {
        let ApplierState::Calibrated(calibration) = &self.state else {
            return;
        };

        let up = self.bindings.head.map(|h| rig.up(h)).unwrap_or(Vec3::UP);
        let weight = self.config.gaze_weight;

        if let (Some(eye), Some(cal)) = (self.bindings.left_eye, calibration.left.as_ref()) {
            aim_eye(rig, eye, cal, left, up, weight);
        }
        if let (Some(eye), Some(cal)) = (self.bindings.right_eye, calibration.right.as_ref()) {
            aim_eye(rig, eye, cal, right, up, weight);
        }
    }

    fn apply_head(&self, rig: &mut R, head: &HeadPose) {
        let Some(bone) = self.bindings.head else {
            return;
        };
        let mode = self.config.head_mode;
        let smoothing = self.config.smoothing;

        // Non-finite targets (inf/NaN from the device) hold the previous pose
        let target = mode.rotation(head);
        if target.is_finite() {
            let current = rig.local_rotation(bone);
            rig.set_local_rotation(bone, smooth_rotation(target, current, smoothing.rotation()));
        }

        let target = mode.position(head);
        if self.config.head_tracking && target.is_finite() {
            let current = rig.local_position(bone);
            rig.set_local_position(bone, smooth_position(target, current, smoothing.position()));
        }
    }
}

/// Direction an eye looks at, in its anchor's space.
///
/// The device rotation has its x and w components negated to match the
/// rig's handedness.
pub fn gaze_direction(angles: EyeAngles) -> Vec3 {
    let q = Quat::from_euler_degrees(angles.pitch, angles.yaw, 0.0);
    let corrected = Quat::from_xyzw(-q.x, q.y, q.z, -q.w);
    corrected * Vec3::FORWARD
}

/// Blend `target` towards `previous`, keeping `factor` of the previous pose
pub fn smooth_rotation(target: Quat, previous: Quat, factor: f32) -> Quat {
    if factor <= 0.0 {
        return target;
    }
    target.lerp(&previous, factor)
}

/// Position counterpart of [`smooth_rotation`]
pub fn smooth_position(target: Vec3, previous: Vec3, factor: f32) -> Vec3 {
    if factor <= 0.0 {
        return target;
    }
    target.lerp(&previous, factor)
}

fn aim_eye<R: Rig>(
    rig: &mut R,
    eye: R::Bone,
    calibration: &EyeCalibration<R::Bone>,
    angles: EyeAngles,
    up: Vec3,
    weight: f32,
) {
    let target = rig.transform_point(calibration.anchor, gaze_direction(angles));
    rig.look_at(eye, target, up);

    let aimed = rig.local_rotation(eye) * calibration.initial_rotation;
    let rotation = calibration.initial_local_rotation.slerp(&aimed, weight);
    rig.set_local_rotation(eye, rotation);
}
