//! Human-facing setting values
//!
//! Everything a handler accepts arrives as a [`SettingValue`]: CLI strings
//! become [`SettingValue::Text`], API callers may pass numbers, lists or
//! maps directly, and the settings cache round-trips them through JSON.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EncodeError;

/// A value given for a setting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<SettingValue>),
    Map(BTreeMap<String, SettingValue>),
}

impl SettingValue {
    /// Borrow the text, if this is a text value
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret as a number. Text is parsed after trimming.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret as an integer. Floats must be integral.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Split into items: lists as-is, text on commas, anything else as one item
    ///
    /// Blank text has no items; an empty item between commas is an error.
    pub fn items(&self) -> Result<Vec<SettingValue>, EncodeError> {
        match self {
            Self::List(items) => Ok(items.clone()),
            Self::Text(s) if s.trim().is_empty() => Ok(Vec::new()),
            Self::Text(s) => s
                .split(',')
                .map(str::trim)
                .map(|item| {
                    if item.is_empty() {
                        Err(EncodeError::InvalidValue(format!("empty item in \"{s}\"")))
                    } else {
                        Ok(Self::Text(item.to_string()))
                    }
                })
                .collect(),
            other => Ok(vec![other.clone()]),
        }
    }

    /// Look up a key in a map value (keys compared case-insensitively)
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        match self {
            Self::Map(map) => map
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for SettingValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for SettingValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<u32> for SettingValue {
    fn from(i: u32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for SettingValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<(u8, u8, u8)> for SettingValue {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::List(vec![
            Self::Int(i64::from(r)),
            Self::Int(i64::from(g)),
            Self::Int(i64::from(b)),
        ])
    }
}

impl<T: Into<SettingValue>> From<Vec<T>> for SettingValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}
