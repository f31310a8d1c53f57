//! Plain color handlers
//!
//! ```text
//! rgbcolor           red                 → FF 00 00
//! multi_rgbcolor     red, blue           → FF 00 00 00 00 FF
//! onestr_rgbcolor    "red blue"          → FF 00 00 00 00 FF
//! reactive_rgbcolor  off                 → 00 00 00 00
//!                    red                 → 01 FF 00 00
//! ```

use serde::{Deserialize, Serialize};

use crate::color::{parse_color, parse_color_value, Rgb};
use crate::error::EncodeError;
use crate::value::SettingValue;

/// Encode one color as `[r, g, b]`
pub fn encode_rgbcolor(value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
    Ok(parse_color_value(value)?.to_bytes().to_vec())
}

const REACTIVE_OFF: [&str; 3] = ["off", "disable", "none"];

/// Encode `[enabled, r, g, b]`
pub fn encode_reactive_rgbcolor(value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
    if let Some(text) = value.as_text() {
        let text = text.trim();
        if REACTIVE_OFF.iter().any(|off| off.eq_ignore_ascii_case(text)) {
            return Ok(vec![0x00, 0x00, 0x00, 0x00]);
        }
    }
    let mut packet = vec![0x01];
    packet.extend(parse_color_value(value)?.to_bytes());
    Ok(packet)
}

/// Parameters of `multi_rgbcolor` and `onestr_rgbcolor`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiColorParams {
    pub color_count: usize,
}

impl MultiColorParams {
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.color_count == 0 {
            return Err(EncodeError::InvalidValue("color_count must be at least 1".into()));
        }
        Ok(())
    }

    fn pack(&self, colors: Vec<Rgb>) -> Result<Vec<u8>, EncodeError> {
        let colors = match colors.len() {
            1 => vec![colors[0]; self.color_count],
            n if n == self.color_count => colors,
            actual => {
                return Err(EncodeError::ColorCountMismatch {
                    expected: self.color_count,
                    actual,
                })
            }
        };
        Ok(colors.iter().flat_map(|c| c.to_bytes()).collect())
    }

    /// Colors from a list, or from comma-separated text
    pub fn encode_multi(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        // A bare [r, g, b] triple is a single color, not three
        let items = match value {
            SettingValue::List(items)
                if items
                    .iter()
                    .all(|i| matches!(i, SettingValue::Text(_) | SettingValue::List(_))) =>
            {
                items.clone()
            }
            SettingValue::List(_) => vec![value.clone()],
            other => other.items()?,
        };
        let colors = items
            .iter()
            .map(parse_color_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.pack(colors)
    }

    /// Colors from one text, separated by commas or whitespace
    pub fn encode_onestr(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        let text = value
            .as_text()
            .ok_or_else(|| EncodeError::InvalidColor(value.to_string()))?;
        let colors = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(parse_color)
            .collect::<Result<Vec<_>, _>>()?;
        self.pack(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgbcolor() {
        assert_eq!(encode_rgbcolor(&"red".into()).unwrap(), vec![0xFF, 0x00, 0x00]);
        assert_eq!(
            encode_rgbcolor(&(0x12, 0x34, 0x56).into()).unwrap(),
            vec![0x12, 0x34, 0x56]
        );
        assert!(matches!(
            encode_rgbcolor(&"notacolor".into()),
            Err(EncodeError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_reactive_rgbcolor() {
        assert_eq!(
            encode_reactive_rgbcolor(&"Off".into()).unwrap(),
            vec![0, 0, 0, 0]
        );
        assert_eq!(
            encode_reactive_rgbcolor(&"none".into()).unwrap(),
            vec![0, 0, 0, 0]
        );
        assert_eq!(
            encode_reactive_rgbcolor(&"#00ff00".into()).unwrap(),
            vec![1, 0x00, 0xFF, 0x00]
        );
    }

    #[test]
    fn test_multi_broadcasts_single_color() {
        let params = MultiColorParams { color_count: 3 };
        assert_eq!(
            params.encode_multi(&"blue".into()).unwrap(),
            vec![0, 0, 0xFF, 0, 0, 0xFF, 0, 0, 0xFF]
        );
        assert_eq!(
            params.encode_multi(&(1, 2, 3).into()).unwrap(),
            vec![1, 2, 3, 1, 2, 3, 1, 2, 3]
        );
    }

    #[test]
    fn test_multi_one_color_per_led() {
        let params = MultiColorParams { color_count: 2 };
        assert_eq!(
            params
                .encode_multi(&SettingValue::from(vec!["red", "lime"]))
                .unwrap(),
            vec![0xFF, 0, 0, 0, 0xFF, 0]
        );
        assert_eq!(
            params.encode_multi(&"red, lime, blue".into()),
            Err(EncodeError::ColorCountMismatch {
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_onestr_separators() {
        let params = MultiColorParams { color_count: 3 };
        let expected = vec![0xFF, 0, 0, 0, 0xFF, 0, 0, 0, 0xFF];
        assert_eq!(params.encode_onestr(&"red lime blue".into()).unwrap(), expected);
        assert_eq!(params.encode_onestr(&"red,lime, blue".into()).unwrap(), expected);
        assert_eq!(
            params.encode_onestr(&"red lime".into()),
            Err(EncodeError::ColorCountMismatch {
                expected: 3,
                actual: 2
            })
        );
    }
}
