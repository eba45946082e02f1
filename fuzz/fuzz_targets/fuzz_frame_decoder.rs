//! Fuzz target: `FrameDecoder::feed`
//!
//! Drives arbitrary byte sequences into the STX/ETX frame decoder and
//! asserts that it never panics, always makes progress, and never yields
//! an empty or oversized frame or one containing a delimiter.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use tcam::config::{FRAME_START, FRAME_STOP, MAX_COMMAND_LEN};
use tcam::rpc::codec::FrameDecoder;

fuzz_target!(|data: &[u8]| {
    let mut decoder = FrameDecoder::new();
    let mut rest = data;

    while !rest.is_empty() {
        let (used, frame) = decoder.feed(rest);
        assert!(used > 0 && used <= rest.len(), "decoder must make progress");

        if let Some(text) = frame {
            assert!(!text.is_empty(), "decoder must not yield empty frames");
            assert!(text.len() <= MAX_COMMAND_LEN, "frame exceeds MAX_COMMAND_LEN");
            assert!(!text.contains(&FRAME_START) && !text.contains(&FRAME_STOP));
        }
        rest = &rest[used..];
    }

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    let _ = decoder.feed(data);
});
