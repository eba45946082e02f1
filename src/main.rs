//! tCam-Mini firmware: command server entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  DeviceState        LogEventSink   Esp32Clock   IoTransport    │
//! │  (Config+Wifi+Info) (EventSink)    (ClockPort)  (TCP socket)   │
//! │  FrameStore                                                    │
//! │  (CapturePort)                                                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            CommandService (pure logic)                 │    │
//! │  │  decode · parse · validate · respond                   │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::net::{Ipv4Addr, TcpListener};
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{info, warn};

use tcam::adapters::device_state::DeviceState;
use tcam::adapters::frame_store::FrameStore;
use tcam::adapters::log_sink::LogEventSink;
use tcam::app::ports::CapturePort;
use tcam::app::service::CommandService;
use tcam::config::{CMD_PORT, ProtocolConfig};
use tcam::rpc::channels::CMD_CHANNEL;
use tcam::rpc::transport::IoTransport;

/// Idle time between socket polls.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  tCam-Mini v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Device state and command service ───────────────────
    let mut device: DeviceState = DeviceState::default();
    let mut sink = LogEventSink::new();
    let mut service = CommandService::new(&ProtocolConfig::default());
    // TODO: publish frames from the Lepton VoSPI capture task into `frames`.
    let mut frames = FrameStore::new();

    // ── 3. Command socket ─────────────────────────────────────
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, CMD_PORT))?;
    info!("Listening for commands on port {}", CMD_PORT);

    // ── 4. One host at a time ─────────────────────────────────
    loop {
        let (stream, peer) = match listener.accept() {
            Ok(conn) => conn,
            Err(e) => {
                warn!("accept failed: {}", e);
                continue;
            }
        };
        if let Err(e) = stream.set_nonblocking(true) {
            warn!("Host {} dropped: cannot set non-blocking: {}", peer, e);
            continue;
        }
        info!("Host {} connected", peer);
        let mut transport = IoTransport::new(stream);
        let mut last_capture = Instant::now();

        loop {
            if let Err(e) = service.poll_transport(&mut transport, &CMD_CHANNEL) {
                info!("Host {} disconnected ({:?})", peer, e);
                break;
            }
            service.drain_commands(&CMD_CHANNEL, &mut transport, &mut device, &mut sink);

            if let Some(capture) = frames.take_capture() {
                let elapsed_ms = u32::try_from(last_capture.elapsed().as_millis()).unwrap_or(u32::MAX);
                last_capture = Instant::now();
                if let Err(e) = service.serve_image(&capture, elapsed_ms, &mut transport, &device, &mut sink) {
                    warn!("image: {}", e);
                }
            }

            std::thread::sleep(POLL_INTERVAL);
        }

        service.reset_connection();
    }
}
