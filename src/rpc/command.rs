//! Command table and request parser.
//!
//! Requests arrive as `{"cmd": "<name>", "args": {...}}`. The name maps to
//! a [`Command`] through a fixed table; names not in the table resolve to
//! [`Command::Unknown`], which is a reportable outcome rather than a parse
//! failure.

use serde_json::Value;

use crate::error::ParseError;

/// Protocol operations, with their wire codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    GetStatus = 0,
    GetImage = 1,
    GetConfig = 2,
    SetConfig = 3,
    SetTime = 4,
    GetWifi = 5,
    SetWifi = 6,
    SetSpotmeter = 7,
    StreamOn = 8,
    StreamOff = 9,
    RecordOn = 10,
    RecordOff = 11,
    PowerOff = 12,
    /// Sentinel for names missing from the table.
    Unknown = 13,
}

/// Name returned for codes outside the table.
pub const UNKNOWN_NAME: &str = "Unknown";

/// Name/code table. Codes are dense and match the table order.
pub const COMMAND_TABLE: [(&str, Command); 13] = [
    ("get_status", Command::GetStatus),
    ("get_image", Command::GetImage),
    ("get_config", Command::GetConfig),
    ("set_config", Command::SetConfig),
    ("set_time", Command::SetTime),
    ("get_wifi", Command::GetWifi),
    ("set_wifi", Command::SetWifi),
    ("set_spotmeter", Command::SetSpotmeter),
    ("stream_on", Command::StreamOn),
    ("stream_off", Command::StreamOff),
    ("record_on", Command::RecordOn),
    ("record_off", Command::RecordOff),
    ("poweroff", Command::PowerOff),
];

impl Command {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Resolve a wire code; codes outside the table are `Unknown`.
    pub fn from_code(code: u8) -> Self {
        COMMAND_TABLE
            .iter()
            .find(|(_, cmd)| cmd.code() == code)
            .map_or(Self::Unknown, |(_, cmd)| *cmd)
    }

    pub fn name(self) -> &'static str {
        lookup_name(self.code())
    }
}

/// Look up a command by name.
pub fn lookup_code(name: &str) -> Command {
    COMMAND_TABLE
        .iter()
        .find(|(n, _)| *n == name)
        .map_or(Command::Unknown, |(_, cmd)| *cmd)
}

/// Look up a command name by code.
pub fn lookup_name(code: u8) -> &'static str {
    COMMAND_TABLE
        .iter()
        .find(|(_, cmd)| cmd.code() == code)
        .map_or(UNKNOWN_NAME, |(name, _)| *name)
}

/// A request resolved to a command, borrowing its arguments from the
/// parsed request tree.
#[derive(Debug, Clone, Copy)]
pub struct ParsedCommand<'a> {
    pub command: Command,
    /// The `"args"` node, any shape. `None` when absent.
    pub args: Option<&'a Value>,
}

/// Parse raw request text into a JSON tree.
pub fn parse_request(text: &[u8]) -> Result<Value, ParseError> {
    serde_json::from_slice(text).map_err(|_| ParseError::Malformed)
}

/// Extract the command and its arguments from a request tree.
pub fn parse(request: &Value) -> Result<ParsedCommand<'_>, ParseError> {
    let name = request
        .get("cmd")
        .and_then(Value::as_str)
        .ok_or(ParseError::MissingCommand)?;

    Ok(ParsedCommand {
        command: lookup_code(name),
        args: request.get("args"),
    })
}
