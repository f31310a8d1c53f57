//! Multi-preset sensitivity handlers
//!
//! Mice with DPI presets take every preset in one packet:
//!
//! ```text
//! [count] [selected] [preset 1] [preset 2] ...
//! ```
//!
//! `count` is either the literal preset count or a bit flag per preset
//! (`0xFF >> (8 - count)`), and `selected` is offset by the device's first
//! preset number. Each preset is `dpi_length_byte` bytes, little-endian.

use serde::{Deserialize, Serialize};

use super::checked_le_bytes;
use super::range::{
    check_choice_table, check_outputs_fit, check_range_pair, output_values, quantize_choice,
    quantize_range, ChoiceTable, RangeSpec,
};
use crate::error::EncodeError;
use crate::value::SettingValue;

/// How the preset count byte is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// Literal count
    #[default]
    Number,
    /// One bit per preset
    Flag,
}

/// Ordering of X and Y values in the `_xy` packet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XyMapping {
    /// `x1 y1 x2 y2 ...`
    #[default]
    Interleaved,
    /// `x1 x2 ... y1 y2 ...`
    Grouped,
}

fn one() -> usize {
    1
}

fn one_u8() -> u8 {
    1
}

fn default_max_presets() -> usize {
    5
}

/// Packet layout shared by every preset handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetLayout {
    #[serde(default = "one")]
    pub dpi_length_byte: usize,
    #[serde(default = "one_u8")]
    pub first_preset: u8,
    #[serde(default)]
    pub count_mode: CountMode,
    #[serde(default = "default_max_presets")]
    pub max_preset_count: usize,
}

impl Default for PresetLayout {
    fn default() -> Self {
        Self {
            dpi_length_byte: 1,
            first_preset: 1,
            count_mode: CountMode::Number,
            max_preset_count: default_max_presets(),
        }
    }
}

impl PresetLayout {
    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.count_mode == CountMode::Flag && self.max_preset_count > 8 {
            return Err(EncodeError::InvalidValue(format!(
                "flag count mode holds at most 8 presets, not {}",
                self.max_preset_count
            )));
        }
        if self.dpi_length_byte == 0 || self.dpi_length_byte > 8 {
            return Err(EncodeError::InvalidFieldWidth(self.dpi_length_byte));
        }
        Ok(())
    }

    /// Value of the count byte for `count` presets
    pub fn count_byte(&self, count: usize) -> u8 {
        match self.count_mode {
            CountMode::Number => count as u8,
            CountMode::Flag => (0xFFu16 >> (8 - count.min(8))) as u8,
        }
    }

    /// Check the preset count and selection, then write the two header bytes
    pub(crate) fn header(&self, count: usize, selected: usize) -> Result<Vec<u8>, EncodeError> {
        if count == 0 {
            return Err(EncodeError::EmptyPresetList);
        }
        if count > self.max_preset_count {
            return Err(EncodeError::TooManyPresets {
                count,
                max: self.max_preset_count,
            });
        }
        if selected >= count {
            return Err(EncodeError::PresetOutOfRange { selected, count });
        }
        Ok(vec![
            self.count_byte(count),
            (selected as u8).wrapping_add(self.first_preset),
        ])
    }
}

/// Presets extracted from a setting value
#[derive(Debug, Clone, PartialEq)]
pub struct PresetSelection {
    pub presets: Vec<SettingValue>,
    /// 0-based index of the active preset
    pub selected: usize,
}

impl PresetSelection {
    /// Accepts `"800,1600"`, a list, a single number, or
    /// `{"presets": [...], "selected": i}`
    pub fn from_value(value: &SettingValue) -> Result<Self, EncodeError> {
        if let SettingValue::Map(_) = value {
            let presets = value
                .get("presets")
                .ok_or_else(|| EncodeError::InvalidValue(format!("{value} has no \"presets\"")))?
                .items()?;
            let selected = match value.get("selected") {
                Some(selected) => selected
                    .as_i64()
                    .and_then(|i| usize::try_from(i).ok())
                    .ok_or_else(|| {
                        EncodeError::InvalidValue(format!("invalid preset index \"{selected}\""))
                    })?,
                None => 0,
            };
            return Ok(Self { presets, selected });
        }
        Ok(Self {
            presets: value.items()?,
            selected: 0,
        })
    }
}

fn preset_number(preset: &SettingValue) -> Result<f64, EncodeError> {
    preset
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EncodeError::InvalidValue(format!("\"{preset}\" is not a DPI value")))
}

/// Parse `"N"` or `"X:Y"`
pub(crate) fn preset_xy(preset: &SettingValue) -> Result<(f64, f64), EncodeError> {
    if let Some((x, y)) = preset.as_text().and_then(|t| t.split_once(':')) {
        let x = preset_number(&SettingValue::from(x))?;
        let y = preset_number(&SettingValue::from(y))?;
        return Ok((x, y));
    }
    let n = preset_number(preset)?;
    Ok((n, n))
}

/// Parameters of `multidpi_range`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDpiRangeParams {
    pub input_range: RangeSpec,
    pub output_range: RangeSpec,
    #[serde(flatten)]
    pub layout: PresetLayout,
}

impl MultiDpiRangeParams {
    pub fn validate(&self) -> Result<(), EncodeError> {
        self.layout.validate()?;
        check_range_pair(&self.input_range, &self.output_range)?;
        check_outputs_fit(output_values(&self.output_range)?, self.layout.dpi_length_byte)
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let selection = PresetSelection::from_value(value)?;
        let mut packet = self
            .layout
            .header(selection.presets.len(), selection.selected)?;
        for preset in &selection.presets {
            let output = quantize_range(&self.input_range, &self.output_range, preset_number(preset)?)?;
            packet.extend(checked_le_bytes(output, self.layout.dpi_length_byte)?);
        }
        Ok(packet)
    }
}

/// Parameters of `multidpi_range_choice`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDpiChoiceParams {
    pub input_range: RangeSpec,
    pub choices: ChoiceTable,
    #[serde(flatten)]
    pub layout: PresetLayout,
}

impl MultiDpiChoiceParams {
    pub fn validate(&self) -> Result<(), EncodeError> {
        self.layout.validate()?;
        check_choice_table(&self.input_range, &self.choices)?;
        check_outputs_fit(self.choices.0.values().copied(), self.layout.dpi_length_byte)
    }

    fn quantize(&self, dpi: f64) -> Result<Vec<u8>, EncodeError> {
        let dpi = dpi.clamp(self.input_range.min, self.input_range.max);
        let output = quantize_choice(&self.choices, dpi)?;
        checked_le_bytes(output, self.layout.dpi_length_byte)
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let selection = PresetSelection::from_value(value)?;
        let mut packet = self
            .layout
            .header(selection.presets.len(), selection.selected)?;
        for preset in &selection.presets {
            packet.extend(self.quantize(preset_number(preset)?)?);
        }
        Ok(packet)
    }
}

/// Parameters of `multidpi_range_choice_xy`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDpiChoiceXyParams {
    #[serde(flatten)]
    pub choice: MultiDpiChoiceParams,
    #[serde(default)]
    pub xy_mapping: XyMapping,
}

impl MultiDpiChoiceXyParams {
    pub fn validate(&self) -> Result<(), EncodeError> {
        self.choice.validate()
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let selection = PresetSelection::from_value(value)?;
        let mut packet = self
            .choice
            .layout
            .header(selection.presets.len(), selection.selected)?;

        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for preset in &selection.presets {
            let (x, y) = preset_xy(preset)?;
            xs.push(self.choice.quantize(x)?);
            ys.push(self.choice.quantize(y)?);
        }

        match self.xy_mapping {
            XyMapping::Interleaved => {
                for (x, y) in xs.into_iter().zip(ys) {
                    packet.extend(x);
                    packet.extend(y);
                }
            }
            XyMapping::Grouped => {
                packet.extend(xs.into_iter().flatten());
                packet.extend(ys.into_iter().flatten());
            }
        }
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn choice_table() -> MultiDpiChoiceParams {
        MultiDpiChoiceParams {
            input_range: RangeSpec::new(200.0, 800.0, 200.0),
            choices: ChoiceTable::from([(200, 0x01), (400, 0x04), (600, 0x06), (800, 0x08)]),
            layout: PresetLayout::default(),
        }
    }

    #[test]
    fn test_two_presets_number_mode() {
        let params = choice_table();
        params.validate().unwrap();
        assert_eq!(
            params.encode(&"200,400".into()).unwrap(),
            vec![0x02, 0x01, 0x01, 0x04]
        );
    }

    #[test]
    fn test_count_byte_modes() {
        let number = PresetLayout::default();
        let flag = PresetLayout {
            count_mode: CountMode::Flag,
            ..PresetLayout::default()
        };
        assert_eq!(number.count_byte(3), 3);
        assert_eq!(flag.count_byte(3), 0b0000_0111);
        assert_eq!(flag.count_byte(1), 0b0000_0001);
        assert_eq!(flag.count_byte(8), 0xFF);
    }

    #[test]
    fn test_selected_preset_from_map() {
        let params = choice_table();
        let value = SettingValue::Map(BTreeMap::from([
            ("presets".to_string(), SettingValue::from(vec![200, 600, 800])),
            ("selected".to_string(), SettingValue::from(2)),
        ]));
        assert_eq!(
            params.encode(&value).unwrap(),
            vec![0x03, 0x03, 0x01, 0x06, 0x08]
        );
    }

    #[test]
    fn test_preset_errors() {
        let params = choice_table();
        assert_eq!(params.encode(&"".into()), Err(EncodeError::EmptyPresetList));
        assert_eq!(
            params.encode(&"200,200,200,200,200,200".into()),
            Err(EncodeError::TooManyPresets { count: 6, max: 5 })
        );

        let value = SettingValue::Map(BTreeMap::from([
            ("presets".to_string(), SettingValue::from("200, 400")),
            ("selected".to_string(), SettingValue::from(2)),
        ]));
        assert_eq!(
            params.encode(&value),
            Err(EncodeError::PresetOutOfRange { selected: 2, count: 2 })
        );
    }

    #[test]
    fn test_multidpi_range_two_bytes() {
        let params = MultiDpiRangeParams {
            input_range: RangeSpec::new(100.0, 8500.0, 100.0),
            output_range: RangeSpec::new(0.0, 84.0, 1.0),
            layout: PresetLayout {
                dpi_length_byte: 2,
                first_preset: 0,
                count_mode: CountMode::Flag,
                max_preset_count: 5,
            },
        };
        params.validate().unwrap();
        assert_eq!(
            params.encode(&SettingValue::from(vec![800, 1600])).unwrap(),
            vec![0b11, 0x00, 7, 0, 15, 0]
        );
    }

    #[test]
    fn test_single_number_is_one_preset() {
        let params = choice_table();
        assert_eq!(params.encode(&600.into()).unwrap(), vec![1, 1, 0x06]);
    }

    #[test]
    fn test_xy_presets() {
        let mut params = MultiDpiChoiceXyParams {
            choice: choice_table(),
            xy_mapping: XyMapping::Interleaved,
        };
        let value = SettingValue::from("200:400, 800");
        assert_eq!(
            params.encode(&value).unwrap(),
            vec![2, 1, 0x01, 0x04, 0x08, 0x08]
        );

        params.xy_mapping = XyMapping::Grouped;
        assert_eq!(
            params.encode(&value).unwrap(),
            vec![2, 1, 0x01, 0x08, 0x04, 0x08]
        );
    }

    #[test]
    fn test_flag_mode_limit() {
        let layout = PresetLayout {
            count_mode: CountMode::Flag,
            max_preset_count: 9,
            ..PresetLayout::default()
        };
        assert!(layout.validate().is_err());
    }
}
