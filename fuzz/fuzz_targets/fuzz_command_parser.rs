//! Fuzz target: request handling end to end
//!
//! Feeds arbitrary request text through `CommandService::handle_request`
//! against in-memory device state and checks that it never panics, that
//! committed state stays in range, and that any reply fits its buffer and
//! is framed.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use tcam::adapters::device_state::DeviceState;
use tcam::app::events::AppEvent;
use tcam::app::ports::{ConfigPort, EventSink};
use tcam::app::service::{CommandService, Outcome};
use tcam::config::{FRAME_START, FRAME_STOP, GAIN_AUTO, ProtocolConfig, RESPONSE_TEXT_CAPACITY};

struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut service = CommandService::new(&ProtocolConfig::default());
    let mut device: DeviceState = DeviceState::default();
    let mut sink = NullSink;

    if let Ok(Outcome::Reply { len, .. }) = service.handle_request(data, &mut device, &mut sink) {
        let reply = service.response();
        assert_eq!(reply.len(), len);
        assert!(len < RESPONSE_TEXT_CAPACITY);
        assert_eq!(reply.first(), Some(&FRAME_START));
        assert_eq!(reply.last(), Some(&FRAME_STOP));
    }

    let config = device.camera_config();
    assert!((1..=100).contains(&config.emissivity));
    assert!(config.gain_mode <= GAIN_AUTO);
});
