//! Capture frame decoding
//!
//! A frame is the decoded form of exactly one datagram. It carries the
//! packet layout next to the values so consumers only read the ranges the
//! datagram actually contained.

use sidekick_core::channel::{
    BLENDSHAPE_COUNT, HEAD_PITCH, HEAD_POSITION_X, HEAD_POSITION_Y, HEAD_POSITION_Z, HEAD_ROLL,
    HEAD_YAW, LEFT_EYE_PITCH, LEFT_EYE_YAW, MAX_VALUES, RIGHT_EYE_PITCH, RIGHT_EYE_YAW,
};
use sidekick_core::{Capabilities, PacketLayout, SidekickError, SidekickResult};

use crate::decode_half;

/// Maximum datagram size the device sends
pub const MAX_DATAGRAM_SIZE: usize = MAX_VALUES * 2;

/// Decoded value array, index-addressed.
///
/// Slots past the end of a shorter datagram stay at zero.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedValues([f32; MAX_VALUES]);

impl Default for DecodedValues {
    fn default() -> Self {
        DecodedValues([0.0; MAX_VALUES])
    }
}

impl DecodedValues {
    #[inline]
    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Decode `buf` pair by pair into slot `offset / 2`.
    ///
    /// `buf` must be even and at most [`MAX_DATAGRAM_SIZE`] bytes.
    fn fill(&mut self, buf: &[u8]) {
        for (slot, pair) in self.0.iter_mut().zip(buf.chunks_exact(2)) {
            *slot = decode_half(pair[0], pair[1]);
        }
    }
}

/// Eye rotation angles in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EyeAngles {
    pub pitch: f32,
    pub yaw: f32,
}

/// Gaze section of a frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Gaze {
    pub left: EyeAngles,
    pub right: EyeAngles,
}

/// Head section of a frame, as sent by the device
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeadPose {
    /// Pitch in degrees
    pub pitch: f32,
    /// Roll in degrees
    pub roll: f32,
    /// Yaw in degrees
    pub yaw: f32,
    /// Position (x, y, z) in device-local units
    pub position: [f32; 3],
}

/// One decoded datagram
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    layout: PacketLayout,
    values: DecodedValues,
}

impl Frame {
    #[inline]
    pub fn layout(&self) -> PacketLayout {
        self.layout
    }

    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.layout.capabilities()
    }

    /// Raw value array. Prefer the typed accessors, which respect the
    /// capability set.
    #[inline]
    pub fn values(&self) -> &DecodedValues {
        &self.values
    }

    /// Blendshape weights, indices 0-51
    pub fn blendshapes(&self) -> &[f32] {
        &self.values.0[..BLENDSHAPE_COUNT]
    }

    pub fn gaze(&self) -> Option<Gaze> {
        if !self.capabilities().has_gaze() {
            return None;
        }
        let v = &self.values.0;
        Some(Gaze {
            left: EyeAngles {
                pitch: v[LEFT_EYE_PITCH],
                yaw: v[LEFT_EYE_YAW],
            },
            right: EyeAngles {
                pitch: v[RIGHT_EYE_PITCH],
                yaw: v[RIGHT_EYE_YAW],
            },
        })
    }

    pub fn head(&self) -> Option<HeadPose> {
        if !self.capabilities().has_head() {
            return None;
        }
        let v = &self.values.0;
        Some(HeadPose {
            pitch: v[HEAD_PITCH],
            roll: v[HEAD_ROLL],
            yaw: v[HEAD_YAW],
            position: [v[HEAD_POSITION_X], v[HEAD_POSITION_Y], v[HEAD_POSITION_Z]],
        })
    }
}

/// Datagram to frame decoder
pub struct FrameDecoder;

impl FrameDecoder {
    /// Decode one datagram.
    ///
    /// Odd and unrecognised lengths are rejected before any value is
    /// decoded.
    pub fn decode(buf: &[u8]) -> SidekickResult<Frame> {
        if buf.len() % 2 != 0 {
            return Err(SidekickError::OddLength(buf.len()));
        }

        let layout = PacketLayout::from_len(buf.len())
            .ok_or(SidekickError::UnrecognizedLength(buf.len()))?;

        let mut values = DecodedValues::default();
        values.fill(buf);

        tracing::trace!(?layout, "decoded capture frame");
        Ok(Frame { layout, values })
    }
}
