//! Capture pipeline - receiver, decoder and applier under one owner

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use sidekick_core::PacketLayout;
use sidekick_rig::{Rig, RigApplier, RigBindings};
use sidekick_transport::{NetworkReceiver, ReceiverStatsSnapshot};
use sidekick_wire::FrameDecoder;

use crate::PipelineConfig;

/// Result of one pipeline step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing new since the last tick
    Idle,
    /// A frame of this layout was applied to the rig
    Applied(PacketLayout),
    /// The newest datagram was malformed and dropped
    Dropped,
}

#[derive(Clone, Debug, Default)]
pub struct RuntimeStats {
    pub ticks: u64,
    pub idle_ticks: u64,
    pub frames_applied: u64,
    pub frames_dropped: u64,
    pub last_tick_duration: Duration,
}

/// Capture pipeline
pub struct Pipeline<R: Rig> {
    /// `None` when the transport could not be brought up
    receiver: Option<NetworkReceiver>,
    applier: RigApplier<R>,
    stats: RuntimeStats,
}

impl<R: Rig> Pipeline<R> {
    /// Bind the receiver and build the applier.
    ///
    /// A bind failure is logged and leaves the pipeline offline; it is
    /// never returned to the caller.
    pub async fn start(config: &PipelineConfig, bindings: RigBindings<R>) -> Self {
        let receiver_config = config.receiver_config();
        let receiver = match NetworkReceiver::bind(&receiver_config).await {
            Ok(receiver) => Some(receiver),
            Err(e) => {
                tracing::error!(
                    addr = %receiver_config.bind_addr,
                    error = %e,
                    "motion capture transport offline"
                );
                None
            }
        };

        Pipeline {
            receiver,
            applier: RigApplier::new(config.applier_config(), bindings),
            stats: RuntimeStats::default(),
        }
    }

    /// Pipeline without a network receiver; frames come from
    /// [`Pipeline::process_datagram`] only
    pub fn offline(config: &PipelineConfig, bindings: RigBindings<R>) -> Self {
        Pipeline {
            receiver: None,
            applier: RigApplier::new(config.applier_config(), bindings),
            stats: RuntimeStats::default(),
        }
    }

    pub fn is_online(&self) -> bool {
        self.receiver.as_ref().is_some_and(|r| r.is_running())
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.receiver.as_ref().map(|r| r.local_addr())
    }

    pub fn receiver_stats(&self) -> Option<ReceiverStatsSnapshot> {
        self.receiver.as_ref().map(|r| r.stats())
    }

    pub fn stats(&self) -> &RuntimeStats {
        &self.stats
    }

    pub fn applier(&self) -> &RigApplier<R> {
        &self.applier
    }

    /// Capture the rig's rest pose. Call once at startup while the rig is
    /// at rest; otherwise calibration happens before the first frame.
    pub fn calibrate(&mut self, rig: &mut R) -> bool {
        self.applier.calibrate(rig)
    }

    /// Apply the newest received datagram, if any
    pub fn tick(&mut self, rig: &mut R) -> TickOutcome {
        let start = Instant::now();
        self.stats.ticks += 1;

        let outcome = match self.receiver.as_ref().and_then(|r| r.take_latest()) {
            Some(datagram) => self.process_datagram(rig, &datagram.payload),
            None => {
                self.stats.idle_ticks += 1;
                TickOutcome::Idle
            }
        };

        self.stats.last_tick_duration = start.elapsed();
        outcome
    }

    /// Decode one datagram and apply it. Malformed datagrams are dropped
    /// without touching the rig.
    pub fn process_datagram(&mut self, rig: &mut R, payload: &[u8]) -> TickOutcome {
        match FrameDecoder::decode(payload) {
            Ok(frame) => {
                self.applier.apply(rig, &frame);
                self.stats.frames_applied += 1;
                TickOutcome::Applied(frame.layout())
            }
            Err(e) => {
                self.stats.frames_dropped += 1;
                tracing::debug!(len = payload.len(), error = %e, "dropped datagram");
                TickOutcome::Dropped
            }
        }
    }

    /// Stop receiving. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(receiver) = self.receiver.as_mut() {
            receiver.stop();
        }
    }

    /// Stop and wait for the socket to be released
    pub async fn shutdown(mut self) {
        if let Some(receiver) = self.receiver.take() {
            receiver.shutdown().await;
        }
    }
}
