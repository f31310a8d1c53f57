//! Error types
//!
//! [`EncodeError`] covers everything a handler can reject while turning a
//! value into bytes. [`Error`] is the session-level error returned by
//! [`Mouse`](crate::mouse::Mouse).

use rivalcfg_transport::TransportError;
use thiserror::Error;

use crate::profile::LoadError;
use crate::settings::SettingsError;

/// Errors raised while encoding a value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    // Syntax errors
    #[error("Invalid color: \"{0}\"")]
    InvalidColor(String),

    #[error("Invalid gradient: {0}")]
    InvalidGradientSyntax(String),

    #[error("Gradient has no color stops")]
    EmptyGradient,

    #[error("Malformed parameter string: {0}")]
    MalformedParameterString(String),

    // Semantic errors
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Invalid choice \"{value}\" (allowed: {allowed})")]
    InvalidChoice { value: String, allowed: String },

    #[error("Selected preset index {selected} is out of range for {count} presets")]
    PresetOutOfRange { selected: usize, count: usize },

    #[error("Too many presets: {count} given, device supports at most {max}")]
    TooManyPresets { count: usize, max: usize },

    #[error("At least one preset is required")]
    EmptyPresetList,

    #[error("Unsupported CPI value: {0}")]
    UnsupportedCpiValue(String),

    #[error("Separate X and Y CPI values are not supported by this device ({x}:{y})")]
    AsymmetricCpiNotAllowed { x: String, y: String },

    #[error("Unknown button or action: {0}")]
    UnknownButtonTarget(String),

    #[error("Layout \"{layout}\" maps \"{alias}\" to \"{target}\", which is not in the base layout")]
    BadLayoutAlias {
        layout: String,
        alias: String,
        target: String,
    },

    #[error("Expected {expected} colors, got {actual}")]
    ColorCountMismatch { expected: usize, actual: usize },

    #[error("Expected {expected} color stops, got {actual}")]
    StopCountMismatch { expected: usize, actual: usize },

    #[error("Too many color stops: {count} given, device supports at most {max}")]
    TooManyStops { count: usize, max: usize },

    #[error("Color stop positions must not decrease ({previous}% followed by {position}%)")]
    UnorderedStops { previous: u8, position: u8 },

    #[error("Duration {duration} ms is out of bounds ({min}-{max} ms)")]
    DurationOutOfBounds { duration: u32, min: u32, max: u32 },

    #[error("Color stops at {from}% and {to}% leave a zero-length transition")]
    ZeroDurationSlice { from: u8, to: u8 },

    // Profile-authoring errors
    #[error("Input range has {input} values but output range has {output}")]
    RangeLengthMismatch { input: usize, output: usize },

    #[error("Choice table does not match input range: {0}")]
    RangeChoiceMismatch(String),

    #[error("Field width of {0} bytes is not supported (1-8)")]
    InvalidFieldWidth(usize),

    #[error("Value {value:#X} does not fit in {width} byte(s)")]
    ValueTooWide { value: u64, width: usize },
}

/// Primary error type for device sessions
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Setting \"{setting}\": {source}")]
    Encode {
        setting: String,
        #[source]
        source: EncodeError,
    },

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Setting \"{0}\" has no default value")]
    NoDefault(String),

    #[error("Device does not support: {0}")]
    NotSupported(String),

    #[error("Device is closed")]
    DeviceClosed,

    #[error("No supported device found")]
    DeviceNotFound,

    #[error("Profile error: {0}")]
    Profile(#[from] LoadError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl Error {
    /// Attach the setting name to an encoding failure
    pub fn encode(setting: &str, source: EncodeError) -> Self {
        Self::Encode {
            setting: setting.to_string(),
            source,
        }
    }
}

/// Convenience type alias for Results using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
