//! Integration tests for the request → validate → port → reply pipeline.
//!
//! These run on the host and drive the `CommandService` with framed and
//! unframed request text, checking what reaches the ports, the event sink
//! and the response buffer.

use serde_json::Value;

use crate::mock_device::{MockDevice, MockTransport, RecordingSink};

use tcam::app::events::AppEvent;
use tcam::app::service::{CommandService, Outcome};
use tcam::config::{FRAME_START, FRAME_STOP, ProtocolConfig};
use tcam::error::{AddressError, Error, ParseError, ValidationError};
use tcam::rpc::channels::CommandChannel;
use tcam::rpc::command::Command;

fn make_service() -> (CommandService, MockDevice, RecordingSink) {
    (
        CommandService::new(&ProtocolConfig::default()),
        MockDevice::new(),
        RecordingSink::new(),
    )
}

/// Strip START/STOP from a compact reply and parse it.
fn reply_json(bytes: &[u8]) -> Value {
    assert_eq!(bytes.first(), Some(&FRAME_START), "reply must open with START");
    assert_eq!(bytes.last(), Some(&FRAME_STOP), "reply must close with STOP");
    serde_json::from_slice(&bytes[1..bytes.len() - 1]).expect("reply is JSON")
}

// ── Queries ───────────────────────────────────────────────────

#[test]
fn get_status_reports_metadata() {
    let (mut svc, mut dev, mut sink) = make_service();

    let outcome = svc.handle_request(br#"{"cmd":"get_status"}"#, &mut dev, &mut sink).unwrap();
    let Outcome::Reply { command, len } = outcome else {
        panic!("expected a reply, got {outcome:?}");
    };
    assert_eq!(command, Command::GetStatus);
    assert_eq!(len, svc.response().len());

    let v = reply_json(svc.response());
    assert_eq!(v["status"]["Camera"], "tCam-Mini");
    assert_eq!(v["status"]["Version"], "3.0-test");
    assert_eq!(v["status"]["Time"], "14:30:09.42");
    assert_eq!(v["status"]["Date"], "7/15/24");
}

#[test]
fn get_config_is_numeric() {
    let (mut svc, mut dev, mut sink) = make_service();
    dev.config.agc_enabled = true;

    svc.handle_request(br#"{"cmd":"get_config"}"#, &mut dev, &mut sink).unwrap();
    let v = reply_json(svc.response());
    assert_eq!(v["config"]["agc_enabled"], 1);
    assert_eq!(v["config"]["emissivity"], dev.config.emissivity);
}

#[test]
fn get_wifi_never_reports_passwords() {
    let (mut svc, mut dev, mut sink) = make_service();
    dev.wifi.sta_pw.push_str("hunter22").unwrap();

    svc.handle_request(br#"{"cmd":"get_wifi"}"#, &mut dev, &mut sink).unwrap();
    let v = reply_json(svc.response());
    assert_eq!(v["wifi"]["cur_ip_addr"], "192.168.4.1");
    assert!(v["wifi"].get("sta_pw").is_none());
    assert!(v["wifi"].get("ap_pw").is_none());
}

// ── set_config ────────────────────────────────────────────────

#[test]
fn set_config_empty_object_is_rejected() {
    let (mut svc, mut dev, mut sink) = make_service();

    let err = svc
        .handle_request(br#"{"cmd":"set_config","args":{}}"#, &mut dev, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Validation(ValidationError::NoFields));
    assert_eq!(dev.config_writes, 0);
    assert_eq!(sink.last(), Some(&AppEvent::CommandRejected(err)));
}

#[test]
fn set_config_without_args_is_rejected() {
    let (mut svc, mut dev, mut sink) = make_service();
    let err = svc.handle_request(br#"{"cmd":"set_config"}"#, &mut dev, &mut sink).unwrap_err();
    assert_eq!(err, Error::Validation(ValidationError::MissingArgs));
}

#[test]
fn set_config_clamps_and_commits_once() {
    let (mut svc, mut dev, mut sink) = make_service();
    let before = dev.config;

    let outcome = svc
        .handle_request(br#"{"cmd":"set_config","args":{"emissivity":500}}"#, &mut dev, &mut sink)
        .unwrap();
    assert_eq!(outcome, Outcome::Applied(Command::SetConfig));
    assert_eq!(dev.config.emissivity, 100);
    assert_eq!(dev.config.gain_mode, before.gain_mode, "unspecified fields are kept");
    assert_eq!(dev.config_writes, 1);
    assert_eq!(sink.last(), Some(&AppEvent::ConfigChanged(dev.config)));
}

// ── set_spotmeter ─────────────────────────────────────────────

#[test]
fn spotmeter_partial_is_rejected() {
    let (mut svc, mut dev, mut sink) = make_service();
    let err = svc
        .handle_request(br#"{"cmd":"set_spotmeter","args":{"r1":5}}"#, &mut dev, &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::MissingField(_))));
}

#[test]
fn spotmeter_clamps_to_frame() {
    let (mut svc, mut dev, mut sink) = make_service();
    svc.handle_request(
        br#"{"cmd":"set_spotmeter","args":{"r1":5,"c1":5,"r2":200,"c2":200}}"#,
        &mut dev,
        &mut sink,
    )
    .unwrap();

    let Some(AppEvent::SpotmeterChanged(region)) = sink.last() else {
        panic!("expected SpotmeterChanged, got {:?}", sink.last());
    };
    assert_eq!((region.r1, region.c1, region.r2, region.c2), (5, 5, 119, 159));
}

// ── set_time ──────────────────────────────────────────────────

#[test]
fn set_time_needs_all_seven_fields() {
    let (mut svc, mut dev, mut sink) = make_service();
    let six = br#"{"cmd":"set_time","args":{"sec":1,"min":2,"hour":3,"dow":4,"day":5,"mon":6}}"#;
    assert_eq!(
        svc.handle_request(six, &mut dev, &mut sink).unwrap_err(),
        Error::Validation(ValidationError::MissingField("year"))
    );
    assert_eq!(dev.time_writes, 0);

    let seven =
        br#"{"cmd":"set_time","args":{"sec":1,"min":2,"hour":3,"dow":4,"day":5,"mon":6,"year":55}}"#;
    svc.handle_request(seven, &mut dev, &mut sink).unwrap();
    assert_eq!(dev.time_writes, 1);
    assert_eq!((dev.time.hour, dev.time.year, dev.time.millis), (3, 55, 0));
}

// ── set_wifi ──────────────────────────────────────────────────

#[test]
fn set_wifi_bad_address_changes_nothing() {
    let (mut svc, mut dev, mut sink) = make_service();
    let before = dev.wifi.clone();

    let err = svc
        .handle_request(
            br#"{"cmd":"set_wifi","args":{"sta_ssid":"home","sta_ip_addr":"10.0.0"}}"#,
            &mut dev,
            &mut sink,
        )
        .unwrap_err();
    assert_eq!(
        err,
        Error::Validation(ValidationError::BadAddress("sta_ip_addr", AddressError::TooFewSeparators))
    );
    assert_eq!(dev.wifi, before, "no partial commit");
    assert_eq!(dev.wifi_writes, 0);
}

#[test]
fn set_wifi_merges_then_reads_back() {
    let (mut svc, mut dev, mut sink) = make_service();

    svc.handle_request(
        br#"{"cmd":"set_wifi","args":{"sta_ssid":"home","sta_pw":"secret","flags":145,"sta_ip_addr":"10.0.0.20"}}"#,
        &mut dev,
        &mut sink,
    )
    .unwrap();
    assert_eq!(dev.wifi_writes, 1);
    assert_eq!(dev.wifi.ap_ssid.as_str(), "tCam-Mini", "untouched fields survive");
    assert_eq!(sink.last(), Some(&AppEvent::WifiChanged));

    svc.handle_request(br#"{"cmd":"get_wifi"}"#, &mut dev, &mut sink).unwrap();
    let v = reply_json(svc.response());
    assert_eq!(v["wifi"]["sta_ssid"], "home");
    assert_eq!(v["wifi"]["flags"], 145);
    assert_eq!(v["wifi"]["sta_ip_addr"], "10.0.0.20");
}

// ── Event-only commands ───────────────────────────────────────

#[test]
fn fire_and_forget_commands_emit_events() {
    let (mut svc, mut dev, mut sink) = make_service();
    let cases: [(&[u8], AppEvent); 4] = [
        (br#"{"cmd":"record_on"}"#, AppEvent::RecordStart),
        (br#"{"cmd":"record_off"}"#, AppEvent::RecordStop),
        (br#"{"cmd":"poweroff"}"#, AppEvent::PowerOff),
        (br#"{"cmd":"get_image"}"#, AppEvent::ImageRequested),
    ];
    for (text, event) in cases {
        svc.handle_request(text, &mut dev, &mut sink).unwrap();
        assert_eq!(sink.last(), Some(&event));
    }
    assert!(svc.image_pending());
}

// ── Bad requests ──────────────────────────────────────────────

#[test]
fn unknown_command_is_reported_not_failed() {
    let (mut svc, mut dev, mut sink) = make_service();
    let outcome = svc.handle_request(br#"{"cmd":"launch"}"#, &mut dev, &mut sink).unwrap();
    assert_eq!(outcome, Outcome::Unknown);
    assert_eq!(sink.last(), Some(&AppEvent::UnknownCommand));
}

#[test]
fn malformed_and_cmdless_requests_fail() {
    let (mut svc, mut dev, mut sink) = make_service();
    assert_eq!(
        svc.handle_request(b"{\"cmd\":", &mut dev, &mut sink).unwrap_err(),
        Error::Parse(ParseError::Malformed)
    );
    assert_eq!(
        svc.handle_request(br#"{"args":{}}"#, &mut dev, &mut sink).unwrap_err(),
        Error::Parse(ParseError::MissingCommand)
    );
    assert_eq!(sink.events.len(), 2);
}

#[test]
fn reply_overflow_leaves_nothing_to_send() {
    let config = ProtocolConfig { response_text_capacity: 16, ..ProtocolConfig::default() };
    let mut svc = CommandService::new(&config);
    let (mut dev, mut sink) = (MockDevice::new(), RecordingSink::new());

    let err = svc.handle_request(br#"{"cmd":"get_status"}"#, &mut dev, &mut sink).unwrap_err();
    assert_eq!(err, Error::Overflow { capacity: 16 });
    assert!(svc.response().is_empty());
}

// ── Socket path ───────────────────────────────────────────────

#[test]
fn framed_commands_flow_from_socket_to_replies() {
    let (mut svc, mut dev, mut sink) = make_service();
    let channel = CommandChannel::new();
    let mut socket = MockTransport::new();

    socket.push(b"\x02{\"cmd\":\"get_con");
    socket.push(b"fig\"}\x03\x02{\"cmd\":\"stream_off\"}\x03\x02{\"cmd\":\"get_wifi\"}\x03");

    assert_eq!(svc.poll_transport(&mut socket, &channel), Ok(3));
    assert_eq!(svc.drain_commands(&channel, &mut socket, &mut dev, &mut sink), 3);

    // stream_off has no reply.
    assert_eq!(socket.written.len(), 2);
    assert!(reply_json(&socket.written[0]).get("config").is_some());
    assert!(reply_json(&socket.written[1]).get("wifi").is_some());
    assert_eq!(sink.count(&AppEvent::StreamStopped), 1);
}

#[test]
fn failed_commands_send_nothing() {
    let (mut svc, mut dev, mut sink) = make_service();
    let channel = CommandChannel::new();
    let mut socket = MockTransport::new();

    socket.push_command(r#"{"cmd":"set_config","args":{}}"#);
    socket.push_command("not json");

    svc.poll_transport(&mut socket, &channel).unwrap();
    assert_eq!(svc.drain_commands(&channel, &mut socket, &mut dev, &mut sink), 2);
    assert!(socket.written.is_empty());
}

#[test]
fn large_reads_are_chunked() {
    let (mut svc, mut dev, mut sink) = make_service();
    let channel = CommandChannel::new();
    let mut socket = MockTransport::new();

    // Padding pushes the frame across several socket reads.
    let padded = format!(r#"{{"cmd":"get_status","pad":"{}"}}"#, "x".repeat(400));
    socket.push_command(&padded);

    assert_eq!(svc.poll_transport(&mut socket, &channel), Ok(1));
    svc.drain_commands(&channel, &mut socket, &mut dev, &mut sink);
    assert_eq!(socket.written.len(), 1);
}
