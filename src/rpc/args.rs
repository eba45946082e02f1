//! Argument validation for state-changing commands.
//!
//! Every command describes its `args` object with a static [`CommandSchema`]:
//! a list of [`FieldSpec`]s plus a [`Presence`] policy. A single extractor,
//! [`extract_fields`], walks the schema, type-checks and clamps each field,
//! and applies the policy. The per-command validators then fold the
//! extracted fields into a fresh value, so nothing reaches device state
//! unless the whole command validated.
//!
//! | Command         | Policy        | Unspecified fields         |
//! |-----------------|---------------|----------------------------|
//! | `set_config`    | at least one  | copied from the snapshot   |
//! | `set_spotmeter` | all required  | -                          |
//! | `set_time`      | all required  | -                          |
//! | `set_wifi`      | at least one  | copied from the snapshot   |
//! | `stream_on`     | optional      | default to 0               |

use log::warn;
use serde_json::Value;

use crate::config::{FRAME_HEIGHT, FRAME_WIDTH, GAIN_AUTO, PW_MAX_LEN, SSID_MAX_LEN};
use crate::error::ValidationError;
use crate::state::{CameraConfig, SpotmeterRegion, Timestamp, WifiSettings};

use super::ip::parse_ip;
use super::stream::StreamRequest;

/// Widest schema (`set_wifi`).
const MAX_FIELDS: usize = 8;

// ───────────────────────────────────────────────────────────────
// Schema description
// ───────────────────────────────────────────────────────────────

/// How a field is read from the JSON node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// JSON bool, or a number where anything above zero is `true`.
    Flag,
    /// Integer, clamped into `min..=max`. Fractions truncate toward zero.
    Int { min: i64, max: i64 },
    /// String no longer than `max_len` bytes.
    Text { max_len: usize },
    /// Dotted-quad string.
    Address,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Which combinations of present fields a command accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Every field must be present.
    AllRequired,
    /// Any non-empty subset.
    AtLeastOne,
    /// Any subset, including missing args.
    Optional,
}

#[derive(Debug)]
pub struct CommandSchema {
    pub fields: &'static [FieldSpec],
    pub presence: Presence,
}

const fn int(name: &'static str, min: i64, max: i64) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Int { min, max } }
}

const fn text(name: &'static str, max_len: usize) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Text { max_len } }
}

const fn address(name: &'static str) -> FieldSpec {
    FieldSpec { name, kind: FieldKind::Address }
}

pub static SET_CONFIG: CommandSchema = CommandSchema {
    fields: &[
        FieldSpec { name: "agc_enabled", kind: FieldKind::Flag },
        int("emissivity", 1, 100),
        int("gain_mode", 0, GAIN_AUTO as i64),
    ],
    presence: Presence::AtLeastOne,
};

/// Static bounds only; `r2`/`c2` are pushed past `r1`/`c1` afterwards.
pub static SET_SPOTMETER: CommandSchema = CommandSchema {
    fields: &[
        int("r1", 0, FRAME_HEIGHT as i64 - 2),
        int("c1", 0, FRAME_WIDTH as i64 - 2),
        int("r2", 0, FRAME_HEIGHT as i64 - 1),
        int("c2", 0, FRAME_WIDTH as i64 - 1),
    ],
    presence: Presence::AllRequired,
};

pub static SET_TIME: CommandSchema = CommandSchema {
    fields: &[
        int("sec", 0, u8::MAX as i64),
        int("min", 0, u8::MAX as i64),
        int("hour", 0, u8::MAX as i64),
        int("dow", 0, u8::MAX as i64),
        int("day", 0, u8::MAX as i64),
        int("mon", 0, u8::MAX as i64),
        int("year", 0, u8::MAX as i64),
    ],
    presence: Presence::AllRequired,
};

pub static SET_WIFI: CommandSchema = CommandSchema {
    fields: &[
        text("ap_ssid", SSID_MAX_LEN),
        text("sta_ssid", SSID_MAX_LEN),
        text("ap_pw", PW_MAX_LEN),
        text("sta_pw", PW_MAX_LEN),
        int("flags", 0, u8::MAX as i64),
        address("ap_ip_addr"),
        address("sta_ip_addr"),
        address("sta_netmask"),
    ],
    presence: Presence::AtLeastOne,
};

pub static STREAM_ON: CommandSchema = CommandSchema {
    fields: &[
        int("delay_msec", 0, u32::MAX as i64),
        int("num_frames", 0, u32::MAX as i64),
    ],
    presence: Presence::Optional,
};

// ───────────────────────────────────────────────────────────────
// Generic extraction
// ───────────────────────────────────────────────────────────────

/// A field value after type checking and clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Flag(bool),
    Int(i64),
    Text(&'a str),
    Address([u8; 4]),
}

/// Fields extracted against one schema. Text values borrow from the
/// request tree.
#[derive(Debug)]
pub struct Fields<'a> {
    schema: &'static CommandSchema,
    values: [Option<FieldValue<'a>>; MAX_FIELDS],
}

impl<'a> Fields<'a> {
    pub fn get(&self, name: &str) -> Option<FieldValue<'a>> {
        let idx = self.schema.fields.iter().position(|f| f.name == name)?;
        self.values[idx]
    }

    /// Number of fields the request supplied.
    pub fn present(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            FieldValue::Flag(b) => Some(b),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            FieldValue::Int(i) => Some(i),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&'a str> {
        match self.get(name)? {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn address(&self, name: &str) -> Option<[u8; 4]> {
        match self.get(name)? {
            FieldValue::Address(a) => Some(a),
            _ => None,
        }
    }

    /// Integer that the presence policy already guaranteed.
    fn required_int(&self, name: &'static str) -> Result<i64, ValidationError> {
        self.int(name).ok_or(ValidationError::MissingField(name))
    }
}

/// Walk `schema` over `args`. The first invalid field aborts extraction;
/// the presence policy is checked once every field has been read.
///
/// An `args` node that is not an object carries no fields.
pub fn extract_fields<'a>(
    args: Option<&'a Value>,
    schema: &'static CommandSchema,
) -> Result<Fields<'a>, ValidationError> {
    let mut fields = Fields { schema, values: [None; MAX_FIELDS] };

    let Some(args) = args else {
        return match schema.presence {
            Presence::Optional => Ok(fields),
            Presence::AllRequired | Presence::AtLeastOne => Err(ValidationError::MissingArgs),
        };
    };

    if let Some(obj) = args.as_object() {
        for (slot, spec) in fields.values.iter_mut().zip(schema.fields) {
            if let Some(node) = obj.get(spec.name) {
                *slot = Some(read_field(spec, node)?);
            }
        }
    }

    match schema.presence {
        Presence::AllRequired => {
            if let Some(missing) = schema
                .fields
                .iter()
                .zip(&fields.values)
                .find_map(|(spec, v)| v.is_none().then_some(spec.name))
            {
                return Err(ValidationError::MissingField(missing));
            }
        }
        Presence::AtLeastOne => {
            if fields.present() == 0 {
                return Err(ValidationError::NoFields);
            }
        }
        Presence::Optional => {}
    }

    Ok(fields)
}

fn read_field<'a>(spec: &FieldSpec, node: &'a Value) -> Result<FieldValue<'a>, ValidationError> {
    let wrong_type = ValidationError::WrongType(spec.name);
    match spec.kind {
        FieldKind::Flag => match node {
            Value::Bool(b) => Ok(FieldValue::Flag(*b)),
            Value::Number(_) => Ok(FieldValue::Flag(as_int(node).is_some_and(|i| i > 0))),
            _ => Err(wrong_type),
        },
        FieldKind::Int { min, max } => {
            let i = as_int(node).ok_or(wrong_type)?;
            Ok(FieldValue::Int(i.clamp(min, max)))
        }
        FieldKind::Text { max_len } => {
            let s = node.as_str().ok_or(wrong_type)?;
            if s.len() > max_len {
                return Err(ValidationError::TooLong(spec.name));
            }
            Ok(FieldValue::Text(s))
        }
        FieldKind::Address => {
            let s = node.as_str().ok_or(wrong_type)?;
            parse_ip(s)
                .map(FieldValue::Address)
                .map_err(|e| ValidationError::BadAddress(spec.name, e))
        }
    }
}

/// Saturating integer view of a JSON number.
fn as_int(node: &Value) -> Option<i64> {
    if let Some(i) = node.as_i64() {
        return Some(i);
    }
    if node.is_u64() {
        return Some(i64::MAX);
    }
    // `as` saturates and truncates toward zero.
    node.as_f64().map(|f| f as i64)
}

// ───────────────────────────────────────────────────────────────
// Per-command validators
// ───────────────────────────────────────────────────────────────

/// `set_config`: merge the supplied fields over `current`.
pub fn validate_set_config(
    current: &CameraConfig,
    args: Option<&Value>,
) -> Result<CameraConfig, ValidationError> {
    let fields = extract_fields(args, &SET_CONFIG)?;
    let mut next = *current;
    if let Some(agc) = fields.flag("agc_enabled") {
        next.agc_enabled = agc;
    }
    if let Some(e) = fields.int("emissivity") {
        next.emissivity = e as u8;
    }
    if let Some(g) = fields.int("gain_mode") {
        next.gain_mode = g as u8;
    }
    Ok(next)
}

/// `set_spotmeter`: all four corners, clamped into the frame with the
/// far corner kept strictly beyond the near one.
pub fn validate_set_spotmeter(args: Option<&Value>) -> Result<SpotmeterRegion, ValidationError> {
    let fields = extract_fields(args, &SET_SPOTMETER)?;
    let r1 = fields.required_int("r1")?;
    let c1 = fields.required_int("c1")?;
    let r2 = fields.required_int("r2")?.max(r1 + 1);
    let c2 = fields.required_int("c2")?.max(c1 + 1);
    Ok(SpotmeterRegion {
        r1: r1 as u16,
        c1: c1 as u16,
        r2: r2 as u16,
        c2: c2 as u16,
    })
}

/// `set_time`: all seven fields, values taken as given.
pub fn validate_set_time(args: Option<&Value>) -> Result<Timestamp, ValidationError> {
    let fields = extract_fields(args, &SET_TIME)?;
    let field = |name| fields.required_int(name).map(|v| v as u8);
    Ok(Timestamp {
        sec: field("sec")?,
        min: field("min")?,
        hour: field("hour")?,
        dow: field("dow")?,
        day: field("day")?,
        mon: field("mon")?,
        year: field("year")?,
        millis: 0,
    })
}

/// `set_wifi`: merge the supplied fields over `current`. The current
/// address is never taken from the request.
pub fn validate_set_wifi(
    current: &WifiSettings,
    args: Option<&Value>,
) -> Result<WifiSettings, ValidationError> {
    let fields = extract_fields(args, &SET_WIFI)?;
    let mut next = current.clone();

    if let Some(s) = fields.text("ap_ssid") {
        next.ap_ssid = s.try_into().map_err(|()| ValidationError::TooLong("ap_ssid"))?;
    }
    if let Some(s) = fields.text("sta_ssid") {
        next.sta_ssid = s.try_into().map_err(|()| ValidationError::TooLong("sta_ssid"))?;
    }
    if let Some(s) = fields.text("ap_pw") {
        next.ap_pw = s.try_into().map_err(|()| ValidationError::TooLong("ap_pw"))?;
    }
    if let Some(s) = fields.text("sta_pw") {
        next.sta_pw = s.try_into().map_err(|()| ValidationError::TooLong("sta_pw"))?;
    }
    if let Some(flags) = fields.int("flags") {
        next.flags = flags as u8;
    }
    if let Some(a) = fields.address("ap_ip_addr") {
        next.ap_ip_addr = a;
    }
    if let Some(a) = fields.address("sta_ip_addr") {
        next.sta_ip_addr = a;
    }
    if let Some(a) = fields.address("sta_netmask") {
        next.sta_netmask = a;
    }
    Ok(next)
}

/// `stream_on`: never fails. Missing args select the legacy fastest
/// stream (no delay, unlimited frames). Each field is read on its own, so
/// a malformed field falls back to 0 without discarding the other.
pub fn validate_stream_on(args: Option<&Value>) -> StreamRequest {
    let obj = args.and_then(Value::as_object);
    let mut values = [0u32; 2];

    for (value, spec) in values.iter_mut().zip(STREAM_ON.fields) {
        let Some(node) = obj.and_then(|o| o.get(spec.name)) else {
            continue;
        };
        match read_field(spec, node) {
            Ok(FieldValue::Int(i)) => *value = i as u32,
            Ok(_) => {}
            Err(e) => warn!("args: stream_on {}, using 0", e),
        }
    }

    StreamRequest { delay_ms: values[0], num_frames: values[1] }
}
