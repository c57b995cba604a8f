#![no_main]

use libfuzzer_sys::fuzz_target;
use sidekick_core::PacketLayout;
use sidekick_wire::FrameDecoder;

fuzz_target!(|data: &[u8]| {
    match FrameDecoder::decode(data) {
        Ok(frame) => {
            assert_eq!(PacketLayout::from_len(data.len()), Some(frame.layout()));
            let unused = &frame.values().as_slice()[frame.layout().value_count()..];
            assert!(unused.iter().all(|v| *v == 0.0));
        }
        Err(e) => {
            assert!(e.is_malformed_payload());
            assert!(PacketLayout::from_len(data.len()).is_none());
        }
    }
});
