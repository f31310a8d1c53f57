//! `rival700_rgbgradient` handler
//!
//! ```text
//! [led_id] [r g b p] × max_colors [color_count] [duration LE16] [repeat]
//! ```
//!
//! `p` is the absolute stop position scaled to 0-255. Unused color slots
//! are zero.

use serde::{Deserialize, Serialize};

use super::gradient::{Gradient, GradientLimits};
use crate::error::EncodeError;
use crate::value::SettingValue;

fn default_max_colors() -> usize {
    14
}

fn default_duration_max() -> u32 {
    30000
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rival700GradientParams {
    pub led_id: u8,
    #[serde(default = "default_max_colors")]
    pub max_colors: usize,
    #[serde(default)]
    pub duration_min: u32,
    #[serde(default = "default_duration_max")]
    pub duration_max: u32,
}

impl Rival700GradientParams {
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.max_colors == 0 || self.duration_max > u32::from(u16::MAX) {
            return Err(EncodeError::InvalidValue(
                "rival700_rgbgradient needs 1+ colors and a 16 bit duration".into(),
            ));
        }
        Ok(())
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let gradient = Gradient::from_value(value)?;
        gradient.check(&GradientLimits {
            max_stops: self.max_colors,
            min_duration: self.duration_min,
            max_duration: self.duration_max,
        })?;

        let mut packet = vec![self.led_id];
        let mut slots = vec![0u8; self.max_colors * 4];
        for (slot, stop) in slots.chunks_exact_mut(4).zip(&gradient.stops) {
            let [r, g, b] = stop.color.to_bytes();
            let position = u32::from(stop.position) * 255 / 100;
            slot.copy_from_slice(&[r, g, b, position as u8]);
        }
        packet.extend(slots);
        packet.push(gradient.stops.len() as u8);
        packet.extend((gradient.duration as u16).to_le_bytes());
        packet.push(u8::from(gradient.is_bare_color));
        Ok(packet)
    }
}
