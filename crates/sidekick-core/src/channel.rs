//! Channel index table of the decoded value array
//!
//! Index `i` means the same thing in every layout; shorter datagrams simply
//! stop early.

/// Number of facial blendshape channels (indices 0-51)
pub const BLENDSHAPE_COUNT: usize = 52;

/// Left eye pitch, degrees
pub const LEFT_EYE_PITCH: usize = 52;
/// Left eye yaw, degrees
pub const LEFT_EYE_YAW: usize = 53;
/// Right eye pitch, degrees
pub const RIGHT_EYE_PITCH: usize = 54;
/// Right eye yaw, degrees
pub const RIGHT_EYE_YAW: usize = 55;

/// Head pitch, degrees
pub const HEAD_PITCH: usize = 56;
/// Head roll, degrees
pub const HEAD_ROLL: usize = 57;
/// Head yaw, degrees
pub const HEAD_YAW: usize = 58;

/// Head position, device-local units
pub const HEAD_POSITION_X: usize = 59;
pub const HEAD_POSITION_Y: usize = 60;
pub const HEAD_POSITION_Z: usize = 61;

/// Size of the largest datagram in values (124 bytes / 2)
pub const MAX_VALUES: usize = 62;
