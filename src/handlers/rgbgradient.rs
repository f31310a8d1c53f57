//! `rgbgradient` handler
//!
//! Packet layout:
//!
//! ```text
//! header (header_length bytes, zero filled):
//!   [led_id_offsets...]   led id
//!   [duration_offset]     duration, LE over duration_length bytes
//!   [repeat_offset]       1 for a single color, 0 for a gradient
//!   [triggers_offset]     0
//!   [color_count_offset]  number of stops
//! body:
//!   r g b                 first stop color
//!   r g b t               per stop, t = (pos - previous pos) * 255 / 100
//! ```

use serde::{Deserialize, Serialize};

use super::gradient::{Gradient, GradientLimits};
use super::{check_width, checked_le_bytes};
use crate::error::EncodeError;
use crate::value::SettingValue;

fn two() -> usize {
    2
}

fn default_max_colors() -> usize {
    14
}

fn default_duration_max() -> u32 {
    30000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbGradientParams {
    pub led_id: u8,
    pub header_length: usize,
    pub led_id_offsets: Vec<usize>,
    pub duration_offset: usize,
    #[serde(default = "two")]
    pub duration_length: usize,
    pub repeat_offset: usize,
    pub triggers_offset: usize,
    pub color_count_offset: usize,
    #[serde(default = "default_max_colors")]
    pub max_colors: usize,
    #[serde(default)]
    pub duration_min: u32,
    #[serde(default = "default_duration_max")]
    pub duration_max: u32,
}

impl RgbGradientParams {
    fn limits(&self) -> GradientLimits {
        GradientLimits {
            max_stops: self.max_colors,
            min_duration: self.duration_min,
            max_duration: self.duration_max,
        }
    }

    pub fn validate(&self) -> Result<(), EncodeError> {
        let last_duration_byte = self.duration_offset + self.duration_length;
        let fits = self.led_id_offsets.iter().all(|&o| o < self.header_length)
            && last_duration_byte <= self.header_length
            && self.repeat_offset < self.header_length
            && self.triggers_offset < self.header_length
            && self.color_count_offset < self.header_length;
        if !fits {
            return Err(EncodeError::InvalidValue(format!(
                "rgbgradient offsets do not fit in a {} byte header",
                self.header_length
            )));
        }
        check_width(u64::from(self.duration_max), self.duration_length)
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let gradient = Gradient::from_value(value)?;
        gradient.check(&self.limits())?;

        let mut header = vec![0u8; self.header_length];
        for &offset in &self.led_id_offsets {
            header[offset] = self.led_id;
        }
        let duration = checked_le_bytes(u64::from(gradient.duration), self.duration_length)?;
        header[self.duration_offset..self.duration_offset + self.duration_length]
            .copy_from_slice(&duration);
        header[self.repeat_offset] = u8::from(gradient.is_bare_color);
        header[self.triggers_offset] = 0x00;
        header[self.color_count_offset] = gradient.stops.len() as u8;

        let mut packet = header;
        packet.extend(gradient.stops[0].color.to_bytes());

        let mut previous = 0u32;
        for stop in &gradient.stops {
            let position = u32::from(stop.position);
            let time = (position - previous) * 255 / 100;
            packet.extend(stop.color.to_bytes());
            packet.push(time as u8);
            previous = position;
        }
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rival310_logo() -> RgbGradientParams {
        RgbGradientParams {
            led_id: 0x01,
            header_length: 28,
            led_id_offsets: vec![0, 5],
            duration_offset: 6,
            duration_length: 2,
            repeat_offset: 22,
            triggers_offset: 23,
            color_count_offset: 27,
            max_colors: 14,
            duration_min: 0,
            duration_max: 30000,
        }
    }

    #[test]
    fn test_bare_color_sets_repeat() {
        let params = rival310_logo();
        params.validate().unwrap();
        let packet = params.encode(&"red".into()).unwrap();

        assert_eq!(packet.len(), 28 + 3 + 4);
        assert_eq!(packet[0], 0x01);
        assert_eq!(packet[5], 0x01);
        assert_eq!(packet[6..8], [0xE8, 0x03]);
        assert_eq!(packet[22], 0x01);
        assert_eq!(packet[27], 1);
        assert_eq!(packet[28..], [0xFF, 0, 0, 0xFF, 0, 0, 0x00]);
    }

    #[test]
    fn test_gradient_body() {
        let packet = rival310_logo()
            .encode(&"rgbgradient(duration=5000; colors=0%: red, 50%: lime, 100%: blue)".into())
            .unwrap();

        assert_eq!(packet[6..8], [0x88, 0x13]);
        assert_eq!(packet[22], 0x00);
        assert_eq!(packet[27], 3);
        assert_eq!(
            packet[28..],
            [
                0xFF, 0, 0, // first color
                0xFF, 0, 0, 0, // 0%
                0, 0xFF, 0, 127, // 50%
                0, 0, 0xFF, 127, // 100%
            ]
        );
    }

    #[test]
    fn test_limits() {
        let params = rival310_logo();
        assert!(matches!(
            params.encode(&"rgbgradient(colors=50%: red, 10%: blue)".into()),
            Err(EncodeError::UnorderedStops { .. })
        ));
        assert!(matches!(
            params.encode(&"rgbgradient(duration=31000; colors=0%: red)".into()),
            Err(EncodeError::DurationOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_offsets_outside_header() {
        let mut params = rival310_logo();
        params.color_count_offset = 28;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_duration_must_fit_its_field() {
        let mut params = rival310_logo();
        params.duration_length = 1;
        assert_eq!(
            params.validate(),
            Err(EncodeError::ValueTooWide {
                value: 30000,
                width: 1
            })
        );
    }
}
