//! Device packet synthesis

use sidekick_core::channel::{
    BLENDSHAPE_COUNT, HEAD_PITCH, HEAD_POSITION_X, HEAD_POSITION_Y, HEAD_POSITION_Z, HEAD_ROLL,
    HEAD_YAW, LEFT_EYE_PITCH, LEFT_EYE_YAW, MAX_VALUES, RIGHT_EYE_PITCH, RIGHT_EYE_YAW,
};
use sidekick_core::PacketLayout;
use sidekick_wire::encode_pair;

/// Builds datagrams the way the capture app sends them.
///
/// Values go through the binary16 encoder, so anything not representable
/// in 16 bits is rounded. Normal values with a zero mantissa (1.0, 0.5,
/// powers of two) come back slightly larger after decoding.
#[derive(Clone, Debug)]
pub struct PacketBuilder {
    values: [f32; MAX_VALUES],
}

impl Default for PacketBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketBuilder {
    pub fn new() -> Self {
        PacketBuilder {
            values: [0.0; MAX_VALUES],
        }
    }

    /// Set every blendshape to `weight`
    pub fn blendshapes(mut self, weight: f32) -> Self {
        self.values[..BLENDSHAPE_COUNT].fill(weight);
        self
    }

    pub fn blendshape(self, index: usize, weight: f32) -> Self {
        self.value(index.min(BLENDSHAPE_COUNT - 1), weight)
    }

    pub fn left_eye(self, pitch: f32, yaw: f32) -> Self {
        self.value(LEFT_EYE_PITCH, pitch).value(LEFT_EYE_YAW, yaw)
    }

    pub fn right_eye(self, pitch: f32, yaw: f32) -> Self {
        self.value(RIGHT_EYE_PITCH, pitch).value(RIGHT_EYE_YAW, yaw)
    }

    pub fn head_rotation(self, pitch: f32, roll: f32, yaw: f32) -> Self {
        self.value(HEAD_PITCH, pitch)
            .value(HEAD_ROLL, roll)
            .value(HEAD_YAW, yaw)
    }

    pub fn head_position(self, x: f32, y: f32, z: f32) -> Self {
        self.value(HEAD_POSITION_X, x)
            .value(HEAD_POSITION_Y, y)
            .value(HEAD_POSITION_Z, z)
    }

    /// Set a raw slot; out-of-range indices are ignored
    pub fn value(mut self, index: usize, value: f32) -> Self {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
        self
    }

    /// Encode the first `layout.value_count()` values
    pub fn build(&self, layout: PacketLayout) -> Vec<u8> {
        self.values[..layout.value_count()]
            .iter()
            .flat_map(|v| encode_pair(*v))
            .collect()
    }
}
