//! Datagram chaos for the capture pipeline
//!
//! Produces a seeded mix of:
//! - Well-formed packets of every layout with random payload bytes
//! - Garbage of arbitrary length (odd, empty, oversized)

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sidekick_core::PacketLayout;

/// Chaos configuration
#[derive(Clone, Debug)]
pub struct ChaosConfig {
    /// Share of datagrams with a recognized length (0.0 - 1.0)
    pub valid_ratio: f64,
    /// Upper bound for garbage lengths
    pub max_len: usize,
}

impl Default for ChaosConfig {
    fn default() -> Self {
        ChaosConfig {
            valid_ratio: 0.5,
            max_len: 512,
        }
    }
}

impl ChaosConfig {
    /// Nothing but garbage
    pub fn hostile() -> Self {
        ChaosConfig {
            valid_ratio: 0.0,
            max_len: 2048,
        }
    }
}

/// Seeded datagram generator
pub struct DatagramChaos {
    config: ChaosConfig,
    rng: StdRng,
}

impl DatagramChaos {
    pub fn new(seed: u64, config: ChaosConfig) -> Self {
        DatagramChaos {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// True when `len` is one of the recognized packet lengths
    pub fn is_valid_length(len: usize) -> bool {
        PacketLayout::from_len(len).is_some()
    }

    pub fn next_datagram(&mut self) -> Vec<u8> {
        let len = if self.rng.gen_bool(self.config.valid_ratio.clamp(0.0, 1.0)) {
            let index = self.rng.gen_range(0..PacketLayout::ALL.len());
            PacketLayout::ALL[index].byte_len()
        } else {
            self.garbage_len()
        };

        let mut buf = vec![0u8; len];
        self.rng.fill(buf.as_mut_slice());
        buf
    }

    /// Generate `count` datagrams
    pub fn burst(&mut self, count: usize) -> Vec<Vec<u8>> {
        (0..count).map(|_| self.next_datagram()).collect()
    }

    fn garbage_len(&mut self) -> usize {
        let dist = Uniform::new_inclusive(0, self.config.max_len);
        loop {
            let len = dist.sample(&mut self.rng);
            if !Self::is_valid_length(len) {
                return len;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sidekick_wire::FrameDecoder;

    #[test]
    fn test_seed_is_deterministic() {
        let mut a = DatagramChaos::new(7, ChaosConfig::default());
        let mut b = DatagramChaos::new(7, ChaosConfig::default());
        assert_eq!(a.burst(32), b.burst(32));
    }

    #[test]
    fn test_hostile_never_valid() {
        let mut chaos = DatagramChaos::new(1, ChaosConfig::hostile());
        for datagram in chaos.burst(500) {
            assert!(!DatagramChaos::is_valid_length(datagram.len()));
            assert!(datagram.len() <= 2048);
        }
    }

    #[test]
    fn test_all_valid() {
        let config = ChaosConfig {
            valid_ratio: 1.0,
            ..Default::default()
        };
        let mut chaos = DatagramChaos::new(2, config);
        for datagram in chaos.burst(100) {
            assert!(DatagramChaos::is_valid_length(datagram.len()));
        }
    }

    proptest! {
        #[test]
        fn prop_decoder_agrees_with_length(seed in any::<u64>(), ratio in 0.0f64..=1.0) {
            let config = ChaosConfig { valid_ratio: ratio, max_len: 300 };
            let mut chaos = DatagramChaos::new(seed, config);
            for datagram in chaos.burst(16) {
                let decoded = FrameDecoder::decode(&datagram);
                prop_assert_eq!(decoded.is_ok(), DatagramChaos::is_valid_length(datagram.len()));
            }
        }
    }
}
