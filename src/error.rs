//! Unified error types for the tCam command layer.
//!
//! A single `Error` enum that every stage of request handling and response
//! building converts into. All variants are `Copy` so they can be passed
//! back through the command service and logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level command-layer error
// ---------------------------------------------------------------------------

/// Every fallible operation in the command layer funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The request text could not be turned into a command.
    Parse(ParseError),
    /// A command's arguments were structurally invalid.
    Validation(ValidationError),
    /// The scratch region could not supply an encode buffer.
    Allocation { requested: usize },
    /// The base64 primitive reported an error.
    Encode(EncodeError),
    /// Serialized text would exceed the output buffer.
    Overflow { capacity: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Validation(e) => write!(f, "validation: {e}"),
            Self::Allocation { requested } => {
                write!(f, "allocation: could not allocate {requested} bytes")
            }
            Self::Encode(e) => write!(f, "encode: {e}"),
            Self::Overflow { capacity } => {
                write!(f, "overflow: response exceeds {capacity} byte buffer")
            }
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The request is not well-formed JSON.
    Malformed,
    /// No `"cmd"` key, or its value is not a string.
    MissingCommand,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed request"),
            Self::MissingCommand => write!(f, "missing or non-text cmd field"),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Structural argument failures. Range problems never show up here: they
/// are clamped by the validators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The command requires an `args` object and none was supplied.
    MissingArgs,
    /// An all-or-nothing command is missing one of its fields.
    MissingField(&'static str),
    /// A merge command was given no recognised fields.
    NoFields,
    /// A field is present but has the wrong JSON type.
    WrongType(&'static str),
    /// A text field exceeds its maximum length.
    TooLong(&'static str),
    /// An address field is not a valid dotted quad.
    BadAddress(&'static str, AddressError),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArgs => write!(f, "args missing"),
            Self::MissingField(name) => write!(f, "required field {name} missing"),
            Self::NoFields => write!(f, "no recognised fields"),
            Self::WrongType(name) => write!(f, "field {name} has the wrong type"),
            Self::TooLong(name) => write!(f, "field {name} too long"),
            Self::BadAddress(name, e) => write!(f, "field {name}: {e}"),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

// ---------------------------------------------------------------------------
// Address errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// More than three `.` separators.
    TooManySeparators,
    /// Fewer than three `.` separators.
    TooFewSeparators,
    /// A character other than a digit or `.`.
    InvalidCharacter,
    /// Two adjacent separators, or a leading/trailing separator.
    EmptySegment,
    /// An octet value above 255.
    OctetOverflow,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManySeparators => write!(f, "too many separators"),
            Self::TooFewSeparators => write!(f, "too few separators"),
            Self::InvalidCharacter => write!(f, "illegal character"),
            Self::EmptySegment => write!(f, "empty octet"),
            Self::OctetOverflow => write!(f, "octet above 255"),
        }
    }
}

// ---------------------------------------------------------------------------
// Encode errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The output slice is too small; `required` bytes are needed.
    BufferTooSmall { required: usize },
    /// The input is too large to encode on this platform.
    InputTooLarge,
    /// The primitive failed for another reason.
    Failed,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall { required } => {
                write!(f, "output buffer too small ({required} bytes required)")
            }
            Self::InputTooLarge => write!(f, "input too large"),
            Self::Failed => write!(f, "base64 primitive failed"),
        }
    }
}

impl From<EncodeError> for Error {
    fn from(e: EncodeError) -> Self {
        Self::Encode(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Command-layer `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
