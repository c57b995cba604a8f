//! UDP capture receiver
//!
//! Binds the device port on all interfaces and keeps one receive pending at
//! all times. Every completed receive overwrites the hand-off slot, so the
//! tick loop only ever sees the newest datagram.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use sidekick_core::{SidekickError, SidekickResult};

use crate::LatestSlot;

/// Port the capture app streams to
pub const DEFAULT_PORT: u16 = 9000;

/// Receive buffer size; anything longer than the largest layout is
/// rejected by the decoder anyway
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 2048;

/// Receiver configuration
#[derive(Clone, Debug)]
pub struct ReceiverConfig {
    /// Local address to bind
    pub bind_addr: SocketAddr,
    /// Size of the receive buffer in bytes
    pub recv_buffer_size: usize,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        ReceiverConfig {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

/// A received datagram
#[derive(Clone, Debug)]
pub struct Datagram {
    pub payload: Bytes,
    pub source: SocketAddr,
}

/// Counters updated by the receive task
#[derive(Debug, Default)]
pub struct ReceiverStats {
    received: AtomicU64,
    superseded: AtomicU64,
    errors: AtomicU64,
}

/// Point-in-time copy of [`ReceiverStats`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReceiverStatsSnapshot {
    pub datagrams_received: u64,
    /// Datagrams overwritten before the consumer took them
    pub datagrams_superseded: u64,
    pub receive_errors: u64,
}

impl ReceiverStats {
    pub fn snapshot(&self) -> ReceiverStatsSnapshot {
        ReceiverStatsSnapshot {
            datagrams_received: self.received.load(Ordering::Relaxed),
            datagrams_superseded: self.superseded.load(Ordering::Relaxed),
            receive_errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// UDP receiver feeding a [`LatestSlot`]
pub struct NetworkReceiver {
    local_addr: SocketAddr,
    slot: Arc<LatestSlot<Datagram>>,
    stats: Arc<ReceiverStats>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl NetworkReceiver {
    /// Bind the socket and start the receive loop.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn bind(config: &ReceiverConfig) -> SidekickResult<Self> {
        if config.recv_buffer_size == 0 {
            return Err(SidekickError::InvalidConfig(
                "receive buffer size must be non-zero".into(),
            ));
        }

        let socket = UdpSocket::bind(config.bind_addr)
            .await
            .map_err(|e| SidekickError::BindFailed {
                addr: config.bind_addr,
                reason: e.to_string(),
            })?;

        let local_addr = socket
            .local_addr()
            .map_err(|e| SidekickError::TransportError(e.to_string()))?;

        let slot = Arc::new(LatestSlot::new());
        let stats = Arc::new(ReceiverStats::default());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(receive_loop(
            socket,
            Arc::clone(&slot),
            Arc::clone(&stats),
            config.recv_buffer_size,
            shutdown_rx,
        ));

        tracing::info!(%local_addr, "capture receiver listening");

        Ok(NetworkReceiver {
            local_addr,
            slot,
            stats,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Get local address
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Take the newest unread datagram, if any
    pub fn take_latest(&self) -> Option<Datagram> {
        self.slot.take()
    }

    /// Get a clone of the hand-off slot
    pub fn slot(&self) -> Arc<LatestSlot<Datagram>> {
        Arc::clone(&self.slot)
    }

    pub fn stats(&self) -> ReceiverStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop receiving and release the socket. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!(local_addr = %self.local_addr, "capture receiver stopped");
        }
    }

    /// Stop and wait until the receive task has released the socket
    pub async fn shutdown(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            // Cancellation is not an error for the caller
            let _ = task.await;
            tracing::info!(local_addr = %self.local_addr, "capture receiver stopped");
        }
    }
}

impl Drop for NetworkReceiver {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Per-datagram errors the socket recovers from. Anything else disables
/// the receiver.
fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

async fn receive_loop(
    socket: UdpSocket,
    slot: Arc<LatestSlot<Datagram>>,
    stats: Arc<ReceiverStats>,
    buffer_size: usize,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut buf = vec![0u8; buffer_size];
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            result = socket.recv_from(&mut buf) => match result {
                Ok((len, source)) => {
                    let datagram = Datagram {
                        payload: Bytes::copy_from_slice(&buf[..len]),
                        source,
                    };
                    if slot.put(datagram).is_some() {
                        stats.superseded.fetch_add(1, Ordering::Relaxed);
                        tracing::trace!(%source, "superseded unread datagram");
                    }
                    // Counted after the slot write so observers see the datagram
                    stats.received.fetch_add(1, Ordering::Relaxed);
                }
                Err(e) => {
                    stats.errors.fetch_add(1, Ordering::Relaxed);
                    if is_transient(&e) {
                        tracing::warn!("UDP receive error: {}", e);
                    } else {
                        tracing::error!(error = %e, "motion capture transport offline");
                        break;
                    }
                }
            }
        }
    }
    tracing::debug!("capture receive loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn loopback() -> ReceiverConfig {
        ReceiverConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..Default::default()
        }
    }

    async fn wait_for_received(receiver: &NetworkReceiver, count: u64) {
        for _ in 0..400 {
            if receiver.stats().datagrams_received >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for {} datagrams", count);
    }

    #[test]
    fn test_receive_error_classification() {
        for kind in [
            io::ErrorKind::ConnectionReset,
            io::ErrorKind::WouldBlock,
            io::ErrorKind::Interrupted,
        ] {
            assert!(is_transient(&io::Error::from(kind)), "{:?}", kind);
        }
        for kind in [
            io::ErrorKind::NotConnected,
            io::ErrorKind::PermissionDenied,
            io::ErrorKind::Other,
        ] {
            assert!(!is_transient(&io::Error::from(kind)), "{:?}", kind);
        }
    }

    #[test]
    fn test_default_config() {
        let config = ReceiverConfig::default();
        assert_eq!(config.bind_addr.port(), 9000);
        assert!(config.bind_addr.ip().is_unspecified());
    }

    #[tokio::test]
    async fn test_bind() {
        let receiver = NetworkReceiver::bind(&loopback()).await.unwrap();
        assert_ne!(receiver.local_addr().port(), 0);
        assert!(receiver.is_running());
        assert!(receiver.take_latest().is_none());
    }

    #[tokio::test]
    async fn test_newest_datagram_wins() {
        let receiver = NetworkReceiver::bind(&loopback()).await.unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        sender.send_to(&[1u8; 104], receiver.local_addr()).await.unwrap();
        wait_for_received(&receiver, 1).await;
        sender.send_to(&[2u8; 112], receiver.local_addr()).await.unwrap();
        wait_for_received(&receiver, 2).await;

        let latest = receiver.take_latest().unwrap();
        assert_eq!(latest.payload.len(), 112);
        assert!(latest.payload.iter().all(|b| *b == 2));
        assert_eq!(latest.source, sender.local_addr().unwrap());
        assert!(receiver.take_latest().is_none());

        let stats = receiver.stats();
        assert_eq!(stats.datagrams_received, 2);
        assert_eq!(stats.datagrams_superseded, 1);
    }

    #[tokio::test]
    async fn test_port_in_use() {
        let first = NetworkReceiver::bind(&loopback()).await.unwrap();
        let config = ReceiverConfig {
            bind_addr: first.local_addr(),
            ..Default::default()
        };

        let err = NetworkReceiver::bind(&config).await.err().unwrap();
        assert!(matches!(err, SidekickError::BindFailed { .. }));
    }

    #[tokio::test]
    async fn test_zero_buffer_rejected() {
        let config = ReceiverConfig {
            recv_buffer_size: 0,
            ..loopback()
        };
        assert!(matches!(
            NetworkReceiver::bind(&config).await,
            Err(SidekickError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_double_stop() {
        let mut receiver = NetworkReceiver::bind(&loopback()).await.unwrap();
        receiver.stop();
        receiver.stop();
        assert!(!receiver.is_running());
    }

    #[tokio::test]
    async fn test_shutdown_releases_port() {
        let receiver = NetworkReceiver::bind(&loopback()).await.unwrap();
        let addr = receiver.local_addr();
        receiver.shutdown().await;

        let config = ReceiverConfig {
            bind_addr: addr,
            ..Default::default()
        };
        let rebound = NetworkReceiver::bind(&config).await.unwrap();
        assert_eq!(rebound.local_addr(), addr);
    }
}
