//! Pipeline configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use sidekick_core::{SidekickError, SidekickResult};
use sidekick_rig::{ApplierConfig, HeadMode, SmoothingConfig};
use sidekick_transport::{ReceiverConfig, DEFAULT_PORT, DEFAULT_RECV_BUFFER_SIZE};

/// Full pipeline configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub receiver: ReceiverSection,
    pub tracking: TrackingSection,
    pub logging: LoggingConfig,
}

/// Network receiver settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverSection {
    /// Interface to bind; all interfaces by default
    pub bind_address: IpAddr,
    pub port: u16,
    pub recv_buffer_size: usize,
}

impl Default for ReceiverSection {
    fn default() -> Self {
        ReceiverSection {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

/// Rig application settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSection {
    /// Apply head position, not only head rotation
    pub head_tracking: bool,
    /// Clamped to [0, 0.99]
    pub head_rotation_smoothing: f32,
    /// Clamped to [0, 0.99]
    pub head_position_smoothing: f32,
    pub mirror_head: bool,
    /// Clamped to [0, 1]
    pub gaze_weight: f32,
}

impl Default for TrackingSection {
    fn default() -> Self {
        TrackingSection {
            head_tracking: true,
            head_rotation_smoothing: 0.0,
            head_position_smoothing: 0.0,
            mirror_head: false,
            gaze_weight: 1.0,
        }
    }
}

/// Logging settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives; `RUST_LOG` takes precedence
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> SidekickResult<Self> {
        let config: PipelineConfig =
            serde_json::from_str(json).map_err(|e| SidekickError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> SidekickResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SidekickError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Reject values that clamping cannot repair
    pub fn validate(&self) -> SidekickResult<()> {
        let tracking = &self.tracking;
        for (name, value) in [
            ("head_rotation_smoothing", tracking.head_rotation_smoothing),
            ("head_position_smoothing", tracking.head_position_smoothing),
            ("gaze_weight", tracking.gaze_weight),
        ] {
            if !value.is_finite() {
                return Err(SidekickError::InvalidConfig(format!(
                    "{} must be finite",
                    name
                )));
            }
        }

        if self.receiver.recv_buffer_size == 0 {
            return Err(SidekickError::InvalidConfig(
                "recv_buffer_size must be non-zero".into(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.receiver.bind_address, self.receiver.port)
    }

    pub fn receiver_config(&self) -> ReceiverConfig {
        ReceiverConfig {
            bind_addr: self.bind_addr(),
            recv_buffer_size: self.receiver.recv_buffer_size,
        }
    }

    pub fn applier_config(&self) -> ApplierConfig {
        let tracking = &self.tracking;
        ApplierConfig {
            head_tracking: tracking.head_tracking,
            smoothing: SmoothingConfig::new(
                tracking.head_rotation_smoothing,
                tracking.head_position_smoothing,
            ),
            head_mode: if tracking.mirror_head {
                HeadMode::Mirrored
            } else {
                HeadMode::Direct
            },
            gaze_weight: 1.0,
        }
        .with_gaze_weight(tracking.gaze_weight)
    }
}
