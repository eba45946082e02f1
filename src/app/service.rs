//! Command service: the hexagonal core of the protocol layer.
//!
//! [`CommandService`] owns the two response buffers, the base64 scratch
//! region, the inbound frame decoder and the stream state. All device
//! state flows through port traits injected at call sites, so the whole
//! request/response path is testable with in-memory adapters.
//!
//! ```text
//!  Transport ──▶ FrameDecoder ──▶ CMD_CHANNEL ──▶ ┌────────────────┐ ──▶ EventSink
//!                                                 │ CommandService │
//!  ConfigPort · WifiPort · ClockPort ◀──────────▶ │ parse·validate │ ──▶ Transport
//!                                                 └────────────────┘
//! ```

use log::{debug, info, warn};

use crate::config::ProtocolConfig;
use crate::error::{Error, Result};
use crate::rpc::args;
use crate::rpc::buffer::ResponseBuffer;
use crate::rpc::channels::{CommandChannel, enqueue_frames};
use crate::rpc::codec::FrameDecoder;
use crate::rpc::command::{self, Command, ParsedCommand};
use crate::rpc::embed::{EncodePrimitive, ScratchRegion, StandardBase64};
use crate::rpc::response::{self, Metadata};
use crate::rpc::stream::StreamManager;
use crate::rpc::transport::Transport;
use crate::state::BinaryCapture;

use super::events::AppEvent;
use super::ports::{ClockPort, ConfigPort, EventSink, SystemInfoPort, WifiPort};

/// Socket read chunk.
const READ_CHUNK: usize = 256;

/// What a successfully handled request produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Executed; nothing to send back.
    Applied(Command),
    /// A framed reply of `len` bytes is in the response buffer.
    Reply { command: Command, len: usize },
    /// The command name is not in the table.
    Unknown,
}

// ───────────────────────────────────────────────────────────────
// CommandService
// ───────────────────────────────────────────────────────────────

pub struct CommandService<E: EncodePrimitive = StandardBase64> {
    image_buf: ResponseBuffer,
    response_buf: ResponseBuffer,
    scratch: ScratchRegion,
    codec: E,
    decoder: FrameDecoder,
    stream: StreamManager,
    /// Set by `get_image`, cleared when the next image is built.
    image_pending: bool,
}

impl CommandService<StandardBase64> {
    pub fn new(config: &ProtocolConfig) -> Self {
        Self::with_codec(config, StandardBase64)
    }
}

impl<E: EncodePrimitive> CommandService<E> {
    pub fn with_codec(config: &ProtocolConfig, codec: E) -> Self {
        info!(
            "CommandService: image buf {} B, response buf {} B, scratch {} B",
            config.image_text_capacity, config.response_text_capacity, config.scratch_region_bytes
        );
        Self {
            image_buf: ResponseBuffer::with_capacity(config.image_text_capacity),
            response_buf: ResponseBuffer::with_capacity(config.response_text_capacity),
            scratch: ScratchRegion::new(config.scratch_region_bytes),
            codec,
            decoder: FrameDecoder::new(),
            stream: StreamManager::new(),
            image_pending: false,
        }
    }

    // ── Request handling ──────────────────────────────────────

    /// Parse, validate and execute one request.
    ///
    /// Mutating commands commit through the ports only after their
    /// arguments validated in full. Failures are logged and reported to
    /// `sink`; nothing is partially applied.
    pub fn handle_request(
        &mut self,
        text: &[u8],
        dev: &mut (impl ConfigPort + WifiPort + ClockPort + SystemInfoPort),
        sink: &mut impl EventSink,
    ) -> Result<Outcome> {
        let result = command::parse_request(text)
            .map_err(Error::from)
            .and_then(|request| {
                let parsed = command::parse(&request)?;
                self.execute(parsed, dev, sink)
            });

        if let Err(e) = result {
            warn!("cmd: rejected: {}", e);
            sink.emit(&AppEvent::CommandRejected(e));
        }
        result
    }

    fn execute(
        &mut self,
        parsed: ParsedCommand<'_>,
        dev: &mut (impl ConfigPort + WifiPort + ClockPort + SystemInfoPort),
        sink: &mut impl EventSink,
    ) -> Result<Outcome> {
        let command = parsed.command;
        debug!("cmd: {}", command.name());

        match command {
            Command::GetStatus => {
                let meta = metadata(dev);
                let len = response::build_status(&mut self.response_buf, &meta)?;
                return Ok(Outcome::Reply { command, len });
            }
            Command::GetImage => {
                self.image_pending = true;
                sink.emit(&AppEvent::ImageRequested);
            }
            Command::GetConfig => {
                let len = response::build_config(&mut self.response_buf, &dev.camera_config())?;
                return Ok(Outcome::Reply { command, len });
            }
            Command::SetConfig => {
                let config = args::validate_set_config(&dev.camera_config(), parsed.args)?;
                dev.set_camera_config(config);
                info!(
                    "cmd: config agc={} emissivity={} gain={}",
                    config.agc_enabled, config.emissivity, config.gain_mode
                );
                sink.emit(&AppEvent::ConfigChanged(config));
            }
            Command::SetTime => {
                let time = args::validate_set_time(parsed.args)?;
                dev.set_time(time);
                sink.emit(&AppEvent::TimeSet(time));
            }
            Command::GetWifi => {
                let len = response::build_wifi(&mut self.response_buf, dev.wifi_info())?;
                return Ok(Outcome::Reply { command, len });
            }
            Command::SetWifi => {
                let settings = args::validate_set_wifi(dev.wifi_info(), parsed.args)?;
                dev.set_wifi_info(settings);
                sink.emit(&AppEvent::WifiChanged);
            }
            Command::SetSpotmeter => {
                let region = args::validate_set_spotmeter(parsed.args)?;
                sink.emit(&AppEvent::SpotmeterChanged(region));
            }
            Command::StreamOn => {
                let req = args::validate_stream_on(parsed.args);
                self.stream.start(req);
                info!("cmd: stream on, delay={}ms frames={}", req.delay_ms, req.num_frames);
                sink.emit(&AppEvent::StreamStarted(req));
            }
            Command::StreamOff => {
                self.stream.stop();
                sink.emit(&AppEvent::StreamStopped);
            }
            Command::RecordOn => sink.emit(&AppEvent::RecordStart),
            Command::RecordOff => sink.emit(&AppEvent::RecordStop),
            Command::PowerOff => sink.emit(&AppEvent::PowerOff),
            Command::Unknown => {
                warn!("cmd: unknown command");
                sink.emit(&AppEvent::UnknownCommand);
                return Ok(Outcome::Unknown);
            }
        }

        Ok(Outcome::Applied(command))
    }

    // ── Images ────────────────────────────────────────────────

    /// A new capture is ready. Builds the image document if one was
    /// requested or the stream is due, advancing stream time by
    /// `elapsed_ms`.
    ///
    /// Returns the document length when an image was built.
    pub fn on_image_ready(
        &mut self,
        capture: &BinaryCapture<'_>,
        elapsed_ms: u32,
        dev: &(impl WifiPort + ClockPort + SystemInfoPort),
        sink: &mut impl EventSink,
    ) -> Result<Option<usize>> {
        let stream_due = self.stream.tick(elapsed_ms);
        if !self.image_pending && !stream_due {
            return Ok(None);
        }
        self.image_pending = false;

        let meta = metadata(dev);
        let built = response::build_image(
            &mut self.image_buf,
            capture,
            &meta,
            &self.scratch,
            &self.codec,
        );

        match built {
            Ok(len) => {
                if stream_due && self.stream.record_sent() {
                    info!("stream: frame count reached");
                    sink.emit(&AppEvent::StreamStopped);
                }
                Ok(Some(len))
            }
            Err(e) => {
                warn!("image: build failed: {}", e);
                if stream_due {
                    self.stream.record_drop();
                }
                Err(e)
            }
        }
    }

    /// Offer a capture and write any resulting image document to
    /// `transport`. Returns `true` when a document went out.
    ///
    /// A write failure counts as a dropped stream image; the transport
    /// error itself is left for the next `poll_transport` to surface.
    pub fn serve_image<T: Transport>(
        &mut self,
        capture: &BinaryCapture<'_>,
        elapsed_ms: u32,
        transport: &mut T,
        dev: &(impl WifiPort + ClockPort + SystemInfoPort),
        sink: &mut impl EventSink,
    ) -> Result<bool> {
        if self.on_image_ready(capture, elapsed_ms, dev, sink)?.is_none() {
            return Ok(false);
        }
        match transport.write(self.image_buf.as_bytes()).and_then(|_| transport.flush()) {
            Ok(()) => Ok(true),
            Err(e) => {
                self.stream.record_drop();
                warn!(
                    "image: not sent ({:?}), {} dropped so far",
                    e,
                    self.stream.dropped_count()
                );
                Ok(false)
            }
        }
    }

    // ── Transport plumbing ────────────────────────────────────

    /// Read whatever the transport has and queue any complete commands.
    ///
    /// Returns the number of commands queued.
    pub fn poll_transport<T: Transport>(
        &mut self,
        transport: &mut T,
        channel: &CommandChannel,
    ) -> core::result::Result<usize, T::Error> {
        let mut chunk = [0u8; READ_CHUNK];
        let mut queued = 0;
        loop {
            let n = transport.read(&mut chunk)?;
            if n == 0 {
                return Ok(queued);
            }
            queued += enqueue_frames(&mut self.decoder, &chunk[..n], channel);
        }
    }

    /// Execute every queued command in order, writing replies to
    /// `transport`. Returns the number of commands taken off the queue.
    pub fn drain_commands<T: Transport>(
        &mut self,
        channel: &CommandChannel,
        transport: &mut T,
        dev: &mut (impl ConfigPort + WifiPort + ClockPort + SystemInfoPort),
        sink: &mut impl EventSink,
    ) -> usize {
        let mut handled = 0;
        while let Ok(frame) = channel.try_receive() {
            handled += 1;
            if let Ok(Outcome::Reply { command, .. }) = self.handle_request(&frame.text, dev, sink) {
                if let Err(e) = transport.write(self.response_buf.as_bytes()) {
                    warn!("cmd: {} reply not sent: {:?}", command.name(), e);
                }
            }
        }
        handled
    }

    /// Forget per-connection state when the host disconnects.
    pub fn reset_connection(&mut self) {
        self.decoder.reset();
        self.stream.stop();
        self.image_pending = false;
        info!("CommandService: connection state reset");
    }

    // ── Queries ───────────────────────────────────────────────

    /// The last framed status/config/wifi reply.
    pub fn response(&self) -> &[u8] {
        self.response_buf.as_bytes()
    }

    /// The last image document.
    pub fn image(&self) -> &[u8] {
        self.image_buf.as_bytes()
    }

    pub fn image_pending(&self) -> bool {
        self.image_pending
    }

    pub fn stream(&self) -> &StreamManager {
        &self.stream
    }

    pub fn scratch(&self) -> &ScratchRegion {
        &self.scratch
    }
}

fn metadata(dev: &(impl WifiPort + ClockPort + SystemInfoPort)) -> Metadata {
    Metadata::new(&dev.wifi_info().ap_ssid, dev.version(), &dev.now())
}
