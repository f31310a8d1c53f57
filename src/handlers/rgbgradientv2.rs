//! `rgbgradientv2` handler
//!
//! Newer devices interpolate colors themselves. Instead of stop positions
//! they take a start color and, per segment, a signed per-channel ramp rate
//! and the segment's length in milliseconds:
//!
//! ```text
//! [led_id] [segment_count] [duration LE16] [r0 g0 b0]
//! segment: [ramp_r] [ramp_g] [ramp_b] [time LE16]     (max_colors slots)
//! ```
//!
//! The gradient always loops: when the last stop is below 100% a copy of
//! the first stop is appended at 100%.

use serde::{Deserialize, Serialize};

use super::gradient::{Gradient, GradientLimits};
use crate::color::GradientStop;
use crate::error::EncodeError;
use crate::value::SettingValue;

const SEGMENT_LENGTH: usize = 5;

fn default_max_colors() -> usize {
    14
}

fn default_min_duration_per_stop() -> u32 {
    33
}

fn default_max_duration() -> u32 {
    30000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbGradientV2Params {
    pub led_id: u8,
    #[serde(default = "default_max_colors")]
    pub max_colors: usize,
    #[serde(default = "default_min_duration_per_stop")]
    pub min_duration_per_stop: u32,
    #[serde(default = "default_max_duration")]
    pub max_duration: u32,
}

/// Per-channel ramp rate: 16ths of a color step per millisecond
fn ramp(from: u8, to: u8, time_ms: u32) -> u8 {
    let delta = f64::from(to) - f64::from(from);
    let rate = (delta / f64::from(time_ms) * 16.0).trunc();
    rate.clamp(f64::from(i8::MIN), f64::from(i8::MAX)) as i8 as u8
}

impl RgbGradientV2Params {
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.max_colors == 0 || self.max_duration > u32::from(u16::MAX) {
            return Err(EncodeError::InvalidValue(format!(
                "rgbgradientv2 needs 1+ colors and a duration that fits 16 bits (max_colors={}, max_duration={})",
                self.max_colors, self.max_duration
            )));
        }
        Ok(())
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let gradient = Gradient::from_value(value)?;
        let stop_count = u32::try_from(gradient.stops.len()).unwrap_or(u32::MAX);
        gradient.check(&GradientLimits {
            max_stops: self.max_colors,
            min_duration: self.min_duration_per_stop.saturating_mul(stop_count),
            max_duration: self.max_duration,
        })?;

        let mut stops = gradient.stops.clone();
        let first = stops[0];
        if stops.last().is_some_and(|last| last.position < 100) {
            stops.push(GradientStop {
                position: 100,
                color: first.color,
            });
        }

        let mut segments = Vec::with_capacity(self.max_colors * SEGMENT_LENGTH);
        for pair in stops.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let time = u32::from(to.position - from.position) * gradient.duration / 100;
            if time == 0 {
                return Err(EncodeError::ZeroDurationSlice {
                    from: from.position,
                    to: to.position,
                });
            }
            segments.push(ramp(from.color.r, to.color.r, time));
            segments.push(ramp(from.color.g, to.color.g, time));
            segments.push(ramp(from.color.b, to.color.b, time));
            segments.extend((time as u16).to_le_bytes());
        }
        let segment_count = segments.len() / SEGMENT_LENGTH;
        segments.resize(self.max_colors.max(segment_count) * SEGMENT_LENGTH, 0x00);

        let mut packet = vec![self.led_id, segment_count as u8];
        packet.extend((gradient.duration as u16).to_le_bytes());
        packet.extend(first.color.to_bytes());
        packet.extend(segments);
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RgbGradientV2Params {
        RgbGradientV2Params {
            led_id: 0x00,
            max_colors: 14,
            min_duration_per_stop: 33,
            max_duration: 30000,
        }
    }

    #[test]
    fn test_closes_loop() {
        let packet = params()
            .encode(&"rgbgradient(duration=1000; colors=0%: red, 50%: blue)".into())
            .unwrap();

        assert_eq!(packet.len(), 7 + 14 * SEGMENT_LENGTH);
        assert_eq!(packet[..7], [0x00, 2, 0xE8, 0x03, 0xFF, 0x00, 0x00]);
        // red → blue over 500 ms
        assert_eq!(packet[7..12], [0xF8, 0x00, 0x08, 0xF4, 0x01]);
        // blue → red over 500 ms
        assert_eq!(packet[12..17], [0x08, 0x00, 0xF8, 0xF4, 0x01]);
        assert!(packet[17..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_ramp_truncates() {
        let packet = params()
            .encode(&"rgbgradient(duration=1000; colors=0%: black, 60%: red)".into())
            .unwrap();
        // 255 / 600 * 16 = 6.8
        assert_eq!(packet[7], 6);
        // -255 / 400 * 16 = -10.2
        assert_eq!(packet[12] as i8, -10);
    }

    #[test]
    fn test_ramp_clamps() {
        let packet = params()
            .encode(&"rgbgradient(duration=100; colors=0%: black, 10%: red)".into())
            .unwrap();
        assert_eq!(packet[7] as i8, i8::MAX);
        assert_eq!(packet[12] as i8, -45);
    }

    #[test]
    fn test_stop_at_100_is_not_duplicated() {
        let packet = params()
            .encode(&"rgbgradient(colors=0%: red, 100%: red)".into())
            .unwrap();
        assert_eq!(packet[1], 1);
        assert_eq!(packet[7..12], [0, 0, 0, 0xE8, 0x03]);
    }

    #[test]
    fn test_zero_duration_slice() {
        assert_eq!(
            params().encode(&"rgbgradient(colors=0%: red, 0%: blue)".into()),
            Err(EncodeError::ZeroDurationSlice { from: 0, to: 0 })
        );
    }

    #[test]
    fn test_duration_scales_with_stops() {
        assert_eq!(
            params().encode(&"rgbgradient(duration=90; colors=0%: red, 30%: lime, 60%: blue)".into()),
            Err(EncodeError::DurationOutOfBounds {
                duration: 90,
                min: 99,
                max: 30000
            })
        );
    }

    #[test]
    fn test_bare_color() {
        let packet = params().encode(&"lime".into()).unwrap();
        assert_eq!(packet[1], 1);
        assert_eq!(packet[4..7], [0x00, 0xFF, 0x00]);
        assert_eq!(packet[7..12], [0, 0, 0, 0xE8, 0x03]);
    }
}
