#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sidekick_rig::{
    ApplierConfig, HeadMode, Quat, Rig, RigApplier, RigBindings, SceneRig, SmoothingConfig, Vec3,
};
use sidekick_wire::FrameDecoder;

#[derive(Debug, Arbitrary)]
struct Input {
    head_tracking: bool,
    mirrored: bool,
    rotation_smoothing: f32,
    position_smoothing: f32,
    gaze_weight: f32,
    datagrams: Vec<Vec<u8>>,
}

fuzz_target!(|input: Input| {
    let mut rig = SceneRig::new();
    let head = rig.add_node("Head", None, Vec3::new(0.0, 1.6, 0.0), Quat::IDENTITY);
    let left = rig.add_node("LeftEye", Some(head), Vec3::new(-0.03, 0.07, 0.08), Quat::IDENTITY);
    let right = rig.add_node("RightEye", Some(head), Vec3::new(0.03, 0.07, 0.08), Quat::IDENTITY);
    let mesh = rig.add_mesh(52);

    let config = ApplierConfig {
        head_tracking: input.head_tracking,
        smoothing: SmoothingConfig::new(input.rotation_smoothing, input.position_smoothing),
        head_mode: if input.mirrored {
            HeadMode::Mirrored
        } else {
            HeadMode::Direct
        },
        ..Default::default()
    }
    .with_gaze_weight(input.gaze_weight);

    let bindings = RigBindings {
        meshes: vec![mesh],
        left_eye: Some(left),
        right_eye: Some(right),
        head: Some(head),
    };
    let mut applier = RigApplier::new(config, bindings);

    let mut applied = 0;
    for datagram in &input.datagrams {
        if let Ok(frame) = FrameDecoder::decode(datagram) {
            applier.apply(&mut rig, &frame);
            applied += 1;
            assert!(rig.local_rotation(head).is_finite());
            assert!(rig.local_position(head).is_finite());
        }
    }
    assert_eq!(applier.frames_applied(), applied);
});
