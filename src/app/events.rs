//! Outbound application events.
//!
//! The [`CommandService`](super::service::CommandService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on
//! the other side decide what to do with them: log to serial, notify the
//! Lepton task, cut power.

use crate::error::Error;
use crate::rpc::stream::StreamRequest;
use crate::state::{CameraConfig, SpotmeterRegion, Timestamp};

/// Structured events emitted by the command layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// `get_image`: the next captured frame should be sent.
    ImageRequested,

    /// A validated camera configuration was committed.
    ConfigChanged(CameraConfig),

    /// New spotmeter region for the Lepton.
    SpotmeterChanged(SpotmeterRegion),

    /// The wall clock was set.
    TimeSet(Timestamp),

    /// Wifi settings were committed. Takes effect on restart.
    WifiChanged,

    StreamStarted(StreamRequest),

    /// Stream ended by `stream_off` or by its frame count running out.
    StreamStopped,

    RecordStart,

    RecordStop,

    PowerOff,

    /// A request named a command not in the table.
    UnknownCommand,

    /// A request failed to parse or validate.
    CommandRejected(Error),
}
