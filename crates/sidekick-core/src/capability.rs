//! Packet capability sets and layouts
//!
//! The capture device never sends a header: the only thing that tells a
//! receiver which sections a datagram carries is its length.
//! - 104 bytes: blendshapes
//! - 112 bytes: blendshapes + eye gaze
//! - 124 bytes: blendshapes + eye gaze + head pose
//!
//! Every other length is ignored.

/// Set of payload sections present in a datagram (1 byte)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities(pub u8);

impl Capabilities {
    pub const EMPTY: Capabilities = Capabilities(0);

    // Section bits
    pub const BLENDSHAPES: u8 = 0b0000_0001;
    pub const GAZE: u8 = 0b0000_0010;
    pub const HEAD: u8 = 0b0000_0100;

    #[inline]
    pub fn new(bits: u8) -> Self {
        Capabilities(bits)
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn has_blendshapes(self) -> bool {
        self.0 & Self::BLENDSHAPES != 0
    }

    #[inline]
    pub fn has_gaze(self) -> bool {
        self.0 & Self::GAZE != 0
    }

    #[inline]
    pub fn has_head(self) -> bool {
        self.0 & Self::HEAD != 0
    }
}

impl From<u8> for Capabilities {
    fn from(bits: u8) -> Self {
        Capabilities(bits)
    }
}

impl From<Capabilities> for u8 {
    fn from(caps: Capabilities) -> Self {
        caps.0
    }
}

/// Recognised datagram layouts, one per protocol variant
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PacketLayout {
    /// 52 blendshape weights
    Blendshapes,
    /// Blendshapes followed by left/right eye pitch and yaw
    BlendshapesGaze,
    /// Blendshapes, gaze, head rotation and head position
    Full,
}

impl PacketLayout {
    /// All layouts, shortest first
    pub const ALL: [PacketLayout; 3] = [
        PacketLayout::Blendshapes,
        PacketLayout::BlendshapesGaze,
        PacketLayout::Full,
    ];

    /// Classify a datagram by its byte length
    pub fn from_len(len: usize) -> Option<Self> {
        match len {
            104 => Some(PacketLayout::Blendshapes),
            112 => Some(PacketLayout::BlendshapesGaze),
            124 => Some(PacketLayout::Full),
            _ => None,
        }
    }

    /// Datagram length in bytes
    #[inline]
    pub fn byte_len(self) -> usize {
        match self {
            PacketLayout::Blendshapes => 104,
            PacketLayout::BlendshapesGaze => 112,
            PacketLayout::Full => 124,
        }
    }

    /// Number of encoded values carried
    #[inline]
    pub fn value_count(self) -> usize {
        self.byte_len() / 2
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            PacketLayout::Blendshapes => Capabilities(Capabilities::BLENDSHAPES),
            PacketLayout::BlendshapesGaze => {
                Capabilities(Capabilities::BLENDSHAPES | Capabilities::GAZE)
            }
            PacketLayout::Full => Capabilities(
                Capabilities::BLENDSHAPES | Capabilities::GAZE | Capabilities::HEAD,
            ),
        }
    }
}

/// Map a datagram length to the sections it carries.
///
/// Unknown lengths map to [`Capabilities::EMPTY`]; nothing downstream may
/// decode such a datagram.
pub fn classify(len: usize) -> Capabilities {
    PacketLayout::from_len(len)
        .map(PacketLayout::capabilities)
        .unwrap_or(Capabilities::EMPTY)
}
