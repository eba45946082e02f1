//! Integration tests for image documents built on capture-ready events.
//!
//! Covers full-size radiometric frames, the zero-length capture edge case
//! and release of scratch allocations on every failure path.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::mock_device::{FailNthEncode, MockDevice, MockTransport, RecordingSink};

use tcam::app::service::CommandService;
use tcam::config::{FRAME_PIXELS, ProtocolConfig, TELEMETRY_WORDS};
use tcam::error::{EncodeError, Error};
use tcam::state::BinaryCapture;

fn full_frame() -> (Vec<u8>, Vec<u8>) {
    let pixels = (0..FRAME_PIXELS * 2).map(|i| (i % 251) as u8).collect();
    let telemetry = (0..TELEMETRY_WORDS * 2).map(|i| (i % 7) as u8).collect();
    (pixels, telemetry)
}

fn request_image(svc: &mut CommandService<impl tcam::rpc::embed::EncodePrimitive>) -> (MockDevice, RecordingSink) {
    let mut dev = MockDevice::new();
    let mut sink = RecordingSink::new();
    svc.handle_request(br#"{"cmd":"get_image"}"#, &mut dev, &mut sink).unwrap();
    (dev, sink)
}

#[test]
fn full_frame_document_decodes_back() {
    let mut svc = CommandService::new(&ProtocolConfig::default());
    let (dev, mut sink) = request_image(&mut svc);
    let (pixels, telemetry) = full_frame();

    let len = svc
        .on_image_ready(&BinaryCapture::new(&pixels, &telemetry), 0, &dev, &mut sink)
        .unwrap()
        .expect("requested image is built");
    assert_eq!(len, svc.image().len());
    assert!(!svc.image_pending());

    let doc: Value = serde_json::from_slice(svc.image()).unwrap();
    assert_eq!(doc["metadata"]["Camera"], "tCam-Mini");
    assert_eq!(doc["metadata"]["Model"], tcam::config::CAMERA_MODEL_NUM);
    let radiometric = STANDARD.decode(doc["radiometric"].as_str().unwrap()).unwrap();
    let telem = STANDARD.decode(doc["telemetry"].as_str().unwrap()).unwrap();
    assert_eq!(radiometric, pixels);
    assert_eq!(telem, telemetry);

    assert_eq!(svc.scratch().live(), 0);
    assert_eq!(svc.scratch().in_use(), 0);
    assert_eq!(svc.scratch().releases(), 2);
}

#[test]
fn document_is_tab_indented() {
    let mut svc = CommandService::new(&ProtocolConfig::default());
    let (dev, mut sink) = request_image(&mut svc);
    svc.on_image_ready(&BinaryCapture::new(&[1, 2], &[3, 4]), 0, &dev, &mut sink)
        .unwrap();
    assert!(svc.image().starts_with(b"{\n\t\"metadata\": {\n\t\t\"Camera\""));
}

#[test]
fn no_request_no_image() {
    let mut svc = CommandService::new(&ProtocolConfig::default());
    let dev = MockDevice::new();
    let mut sink = RecordingSink::new();
    let built = svc
        .on_image_ready(&BinaryCapture::new(&[1, 2], &[]), 100, &dev, &mut sink)
        .unwrap();
    assert_eq!(built, None);
    assert_eq!(svc.scratch().releases(), 0);
}

#[test]
fn zero_length_capture_builds_empty_strings() {
    let mut svc = CommandService::new(&ProtocolConfig::default());
    let (dev, mut sink) = request_image(&mut svc);

    svc.on_image_ready(&BinaryCapture::new(&[], &[]), 0, &dev, &mut sink)
        .unwrap();
    let doc: Value = serde_json::from_slice(svc.image()).unwrap();
    assert_eq!(doc["radiometric"], "");
    assert_eq!(doc["telemetry"], "");
    assert_eq!(svc.scratch().live(), 0);
}

#[test]
fn radiometric_encode_failure_leaves_nothing() {
    let mut svc = CommandService::with_codec(&ProtocolConfig::default(), FailNthEncode::new(1));
    let (dev, mut sink) = request_image(&mut svc);
    let (pixels, telemetry) = full_frame();

    let err = svc
        .on_image_ready(&BinaryCapture::new(&pixels, &telemetry), 0, &dev, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Encode(EncodeError::Failed));
    assert!(svc.image().is_empty());
    assert_eq!(svc.scratch().live(), 0);
    assert_eq!(svc.scratch().releases(), 1);
}

#[test]
fn telemetry_encode_failure_releases_image_encoding() {
    let mut svc = CommandService::with_codec(&ProtocolConfig::default(), FailNthEncode::new(2));
    let (dev, mut sink) = request_image(&mut svc);
    let (pixels, telemetry) = full_frame();

    let err = svc
        .on_image_ready(&BinaryCapture::new(&pixels, &telemetry), 0, &dev, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Encode(EncodeError::Failed));
    assert!(svc.image().is_empty());
    assert_eq!(svc.scratch().live(), 0, "image encoding released");
    assert_eq!(svc.scratch().releases(), 2);
}

#[test]
fn scratch_exhaustion_is_an_allocation_error() {
    let config = ProtocolConfig { scratch_region_bytes: 1024, ..ProtocolConfig::default() };
    let mut svc = CommandService::new(&config);
    let (dev, mut sink) = request_image(&mut svc);
    let (pixels, telemetry) = full_frame();

    let err = svc
        .on_image_ready(&BinaryCapture::new(&pixels, &telemetry), 0, &dev, &mut sink)
        .unwrap_err();
    assert!(matches!(err, Error::Allocation { .. }));
    assert_eq!(svc.scratch().releases(), 0);
}

#[test]
fn image_buffer_overflow_releases_both() {
    let config = ProtocolConfig { image_text_capacity: 4096, ..ProtocolConfig::default() };
    let mut svc = CommandService::new(&config);
    let (dev, mut sink) = request_image(&mut svc);
    let (pixels, telemetry) = full_frame();

    let err = svc
        .on_image_ready(&BinaryCapture::new(&pixels, &telemetry), 0, &dev, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Overflow { capacity: 4096 });
    assert!(svc.image().is_empty());
    assert_eq!(svc.scratch().live(), 0);
    assert_eq!(svc.scratch().releases(), 2);
}

// ── Delivery ──────────────────────────────────────────────────

#[test]
fn requested_image_reaches_transport() {
    let mut svc = CommandService::new(&ProtocolConfig::default());
    let (dev, mut sink) = request_image(&mut svc);
    let mut transport = MockTransport::new();

    let sent = svc
        .serve_image(&BinaryCapture::new(&[1, 2, 3, 4], &[5, 6]), 0, &mut transport, &dev, &mut sink)
        .unwrap();
    assert!(sent);
    assert_eq!(transport.written.len(), 1);
    assert_eq!(transport.written[0], svc.image());

    let doc: Value = serde_json::from_slice(&transport.written[0]).unwrap();
    assert_eq!(doc["radiometric"], STANDARD.encode([1u8, 2, 3, 4]));
}

#[test]
fn unrequested_capture_writes_nothing() {
    let mut svc = CommandService::new(&ProtocolConfig::default());
    let dev = MockDevice::new();
    let mut sink = RecordingSink::new();
    let mut transport = MockTransport::new();

    let sent = svc
        .serve_image(&BinaryCapture::new(&[1, 2], &[]), 50, &mut transport, &dev, &mut sink)
        .unwrap();
    assert!(!sent);
    assert!(transport.written.is_empty());
}

#[test]
fn failed_write_counts_as_dropped_stream_image() {
    let mut svc = CommandService::new(&ProtocolConfig::default());
    let mut dev = MockDevice::new();
    let mut sink = RecordingSink::new();
    svc.handle_request(br#"{"cmd":"stream_on"}"#, &mut dev, &mut sink).unwrap();
    let mut transport = MockTransport::new();
    transport.fail_writes = true;

    let sent = svc
        .serve_image(&BinaryCapture::new(&[1, 2], &[3, 4]), 0, &mut transport, &dev, &mut sink)
        .unwrap();
    assert!(!sent);
    assert_eq!(svc.stream().dropped_count(), 1);
    assert!(svc.stream().is_active(), "a lost image does not end the stream");
}
