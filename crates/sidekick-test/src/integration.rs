//! End-to-end capture scenarios
//!
//! Datagrams go through the full path:
//! - Loopback UDP into the single-slot receiver
//! - Length classification and half-float decoding
//! - Calibration and application onto a [`SceneRig`](sidekick_rig::SceneRig)

use std::time::Duration;

use sidekick_runtime::{Pipeline, PipelineConfig};
use sidekick_rig::SceneRig;

/// Config bound to an ephemeral loopback port
pub fn loopback_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.receiver.bind_address = std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST);
    config.receiver.port = 0;
    config
}

/// Poll until the receiver has seen `count` datagrams. Returns `false` on
/// timeout or when the pipeline is offline.
pub async fn wait_for_datagrams(pipeline: &Pipeline<SceneRig>, count: u64) -> bool {
    for _ in 0..400 {
        match pipeline.receiver_stats() {
            Some(stats) if stats.datagrams_received >= count => return true,
            Some(_) => tokio::time::sleep(Duration::from_millis(5)).await,
            None => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chaos::{ChaosConfig, DatagramChaos};
    use crate::fixture::Avatar;
    use crate::packet::PacketBuilder;
    use sidekick_core::PacketLayout;
    use sidekick_rig::{Quat, Rig, Vec3};
    use sidekick_runtime::TickOutcome;
    use tokio::net::UdpSocket;

    fn assert_quat_near(a: Quat, b: Quat) {
        let angle = a.angle_to(&b);
        assert!(angle < 0.1, "{:?} vs {:?}: {} degrees apart", a, b, angle);
    }

    #[test]
    fn test_blendshape_packet_drives_every_mesh() {
        let mut avatar = Avatar::new(3);
        let mut pipeline = Pipeline::offline(&PipelineConfig::default(), avatar.bindings());

        let head_before = avatar.rig.local_rotation(avatar.head);
        let eye_before = avatar.rig.local_rotation(avatar.left_eye);

        let packet = PacketBuilder::new()
            .blendshapes(50.0)
            .build(PacketLayout::Blendshapes);
        assert_eq!(packet.len(), 104);
        assert_eq!(
            pipeline.process_datagram(&mut avatar.rig, &packet),
            TickOutcome::Applied(PacketLayout::Blendshapes)
        );

        for mesh in &avatar.meshes {
            for index in 0..52 {
                assert_eq!(avatar.rig.blend_shape_weight(*mesh, index), Some(50.0));
            }
        }
        assert_eq!(avatar.rig.local_rotation(avatar.head), head_before);
        assert_eq!(avatar.rig.local_rotation(avatar.left_eye), eye_before);
    }

    #[test]
    fn test_head_pitch_direct_mode() {
        let mut avatar = Avatar::default();
        let mut pipeline = Pipeline::offline(&PipelineConfig::default(), avatar.bindings());

        let packet = PacketBuilder::new()
            .head_rotation(10.0, 0.0, 0.0)
            .build(PacketLayout::Full);
        assert_eq!(packet.len(), 124);
        pipeline.process_datagram(&mut avatar.rig, &packet);

        assert_quat_near(
            avatar.rig.local_rotation(avatar.head),
            Quat::from_euler_degrees(-10.0, 0.0, 0.0),
        );
    }

    #[test]
    fn test_head_pitch_smoothed() {
        let mut config = PipelineConfig::default();
        config.tracking.head_rotation_smoothing = 0.5;
        config.tracking.head_position_smoothing = 0.5;

        let mut avatar = Avatar::default();
        let rest_rotation = avatar.rig.local_rotation(avatar.head);
        let rest_position = avatar.rig.local_position(avatar.head);
        let mut pipeline = Pipeline::offline(&config, avatar.bindings());

        let packet = PacketBuilder::new()
            .head_rotation(10.0, 0.0, 0.0)
            .head_position(0.1875, 0.0, 0.0)
            .build(PacketLayout::Full);
        pipeline.process_datagram(&mut avatar.rig, &packet);

        let target = Quat::from_euler_degrees(-10.0, 0.0, 0.0);
        assert_quat_near(
            avatar.rig.local_rotation(avatar.head),
            target.lerp(&rest_rotation, 0.5),
        );

        // Device x lands on rig z
        let expected = Vec3::new(0.0, 0.0, 0.1875).lerp(&rest_position, 0.5);
        assert!(avatar.rig.local_position(avatar.head).distance(&expected) < 1e-5);
    }

    #[test]
    fn test_head_converges_under_smoothing() {
        let mut config = PipelineConfig::default();
        config.tracking.head_rotation_smoothing = 0.8;

        let mut avatar = Avatar::default();
        let mut pipeline = Pipeline::offline(&config, avatar.bindings());
        let packet = PacketBuilder::new()
            .head_rotation(20.0, 5.0, -30.0)
            .build(PacketLayout::Full);

        let target = Quat::from_euler_degrees(-20.0, 30.0, 5.0);
        let mut last = f32::MAX;
        for _ in 0..60 {
            pipeline.process_datagram(&mut avatar.rig, &packet);
            let angle = avatar.rig.local_rotation(avatar.head).angle_to(&target);
            if last > 1.0 {
                assert!(angle < last, "{} after {}", angle, last);
            }
            last = angle;
        }
        assert!(last < 0.5);
    }

    #[test]
    fn test_malformed_datagram_leaves_rig_untouched() {
        let mut avatar = Avatar::default();
        let mut pipeline = Pipeline::offline(&PipelineConfig::default(), avatar.bindings());
        pipeline.calibrate(&mut avatar.rig);
        let mutations = avatar.rig.mutation_count();

        for len in [0usize, 1, 50, 103, 105, 110, 122, 126, 2048] {
            assert_eq!(
                pipeline.process_datagram(&mut avatar.rig, &vec![0x3Cu8; len]),
                TickOutcome::Dropped
            );
        }
        assert_eq!(avatar.rig.mutation_count(), mutations);
        assert_eq!(pipeline.stats().frames_dropped, 9);
    }

    #[test]
    fn test_forward_gaze_keeps_rest_pose() {
        let mut avatar = Avatar::default();
        let rest = avatar.rig.local_rotation(avatar.right_eye);
        let mut pipeline = Pipeline::offline(&PipelineConfig::default(), avatar.bindings());

        let packet = PacketBuilder::new().build(PacketLayout::BlendshapesGaze);
        pipeline.process_datagram(&mut avatar.rig, &packet);

        assert_quat_near(avatar.rig.local_rotation(avatar.right_eye), rest);
    }

    #[test]
    fn test_gaze_turns_eye() {
        let mut avatar = Avatar::default();
        let rest = avatar.rig.world_rotation(avatar.left_eye);
        let mut pipeline = Pipeline::offline(&PipelineConfig::default(), avatar.bindings());

        let packet = PacketBuilder::new()
            .left_eye(0.0, 30.0)
            .build(PacketLayout::BlendshapesGaze);
        pipeline.process_datagram(&mut avatar.rig, &packet);

        let turned = avatar.rig.world_rotation(avatar.left_eye);
        let angle = turned.angle_to(&rest);
        assert!((angle - 30.0).abs() < 0.5, "eye turned {} degrees", angle);
    }

    #[test]
    fn test_calibration_happens_once() {
        let mut avatar = Avatar::default();
        let mut pipeline = Pipeline::offline(&PipelineConfig::default(), avatar.bindings());

        assert!(pipeline.calibrate(&mut avatar.rig));
        let nodes = avatar.rig.node_count();
        assert!(!pipeline.calibrate(&mut avatar.rig));

        let packet = PacketBuilder::new().build(PacketLayout::Full);
        pipeline.process_datagram(&mut avatar.rig, &packet);
        pipeline.process_datagram(&mut avatar.rig, &packet);
        assert_eq!(avatar.rig.node_count(), nodes);
        assert_eq!(pipeline.applier().frames_applied(), 2);
    }

    #[test]
    fn test_chaos_applies_only_valid_lengths() {
        let mut avatar = Avatar::default();
        let mut pipeline = Pipeline::offline(&PipelineConfig::default(), avatar.bindings());
        let mut chaos = DatagramChaos::new(0x5EED, ChaosConfig::default());

        let mut expected_applied = 0u64;
        for datagram in chaos.burst(1000) {
            let valid = DatagramChaos::is_valid_length(datagram.len());
            let outcome = pipeline.process_datagram(&mut avatar.rig, &datagram);
            assert_eq!(matches!(outcome, TickOutcome::Applied(_)), valid);
            expected_applied += valid as u64;
        }

        let stats = pipeline.stats();
        assert_eq!(stats.frames_applied, expected_applied);
        assert_eq!(stats.frames_applied + stats.frames_dropped, 1000);
    }

    #[tokio::test]
    async fn test_only_newest_datagram_applied() {
        let mut avatar = Avatar::default();
        let mut pipeline = Pipeline::start(&loopback_config(), avatar.bindings()).await;
        let addr = pipeline.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let first = PacketBuilder::new()
            .blendshapes(10.0)
            .build(PacketLayout::Blendshapes);
        let second = PacketBuilder::new()
            .blendshapes(20.0)
            .build(PacketLayout::Blendshapes);

        sender.send_to(&first, addr).await.unwrap();
        assert!(wait_for_datagrams(&pipeline, 1).await);
        sender.send_to(&second, addr).await.unwrap();
        assert!(wait_for_datagrams(&pipeline, 2).await);

        assert_eq!(
            pipeline.tick(&mut avatar.rig),
            TickOutcome::Applied(PacketLayout::Blendshapes)
        );
        assert_eq!(avatar.rig.blend_shape_weight(avatar.meshes[0], 0), Some(20.0));
        assert_eq!(pipeline.tick(&mut avatar.rig), TickOutcome::Idle);

        assert_eq!(pipeline.applier().frames_applied(), 1);
        assert_eq!(pipeline.receiver_stats().unwrap().datagrams_superseded, 1);
        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_malformed_over_udp_dropped() {
        let mut avatar = Avatar::default();
        let mut pipeline = Pipeline::start(&loopback_config(), avatar.bindings()).await;
        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        sender
            .send_to(&[0u8; 50], pipeline.local_addr().unwrap())
            .await
            .unwrap();
        assert!(wait_for_datagrams(&pipeline, 1).await);

        assert_eq!(pipeline.tick(&mut avatar.rig), TickOutcome::Dropped);
        assert_eq!(avatar.rig.mutation_count(), 0);
        assert!(pipeline.is_online());
        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_offline_pipeline_never_mutates() {
        let mut avatar = Avatar::default();
        let holder = Pipeline::start(&loopback_config(), avatar.bindings()).await;

        let mut config = loopback_config();
        config.receiver.port = holder.local_addr().unwrap().port();
        let mut pipeline = Pipeline::start(&config, avatar.bindings()).await;

        assert!(!pipeline.is_online());
        for _ in 0..10 {
            assert_eq!(pipeline.tick(&mut avatar.rig), TickOutcome::Idle);
        }
        assert_eq!(avatar.rig.mutation_count(), 0);
        assert!(!wait_for_datagrams(&pipeline, 1).await);
        holder.shutdown().await;
    }
}
