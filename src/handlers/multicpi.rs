//! `multicpi_range` handler
//!
//! Like the multi-DPI handlers, but values are looked up exactly in a CPI
//! table instead of being quantized. In `xy` mode every preset is an
//! `(x, y)` pair and repeated pairs are sent once.

use serde::{Deserialize, Serialize};

use super::checked_le_bytes;
use super::multidpi::{preset_xy, PresetLayout, PresetSelection};
use super::range::{check_outputs_fit, ChoiceTable};
use crate::error::EncodeError;
use crate::value::SettingValue;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CpiMode {
    /// One code per preset, X and Y must match
    #[default]
    Single,
    /// An X code and a Y code per preset
    Xy,
}

/// Extra information produced alongside the packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpiMetadata {
    /// Number of presets actually written
    pub cpi_count: usize,
}

/// Parameters of `multicpi_range`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiCpiParams {
    pub cpi_table: ChoiceTable,
    #[serde(default)]
    pub cpi_mode: CpiMode,
    #[serde(flatten)]
    pub layout: PresetLayout,
}

impl MultiCpiParams {
    pub fn validate(&self) -> Result<(), EncodeError> {
        self.layout.validate()?;
        if self.cpi_table.0.is_empty() {
            return Err(EncodeError::InvalidValue("cpi_table is empty".into()));
        }
        check_outputs_fit(self.cpi_table.0.values().copied(), self.layout.dpi_length_byte)
    }

    fn code(&self, cpi: f64) -> Result<Vec<u8>, EncodeError> {
        let unsupported = || EncodeError::UnsupportedCpiValue(cpi.to_string());
        if cpi.fract() != 0.0 {
            return Err(unsupported());
        }
        let code = self.cpi_table.0.get(&(cpi as i64)).ok_or_else(unsupported)?;
        checked_le_bytes(*code, self.layout.dpi_length_byte)
    }

    pub fn encode(&self, value: &SettingValue) -> Result<(Vec<u8>, CpiMetadata), EncodeError> {
        self.validate()?;
        let selection = PresetSelection::from_value(value)?;
        let pairs = selection
            .presets
            .iter()
            .map(preset_xy)
            .collect::<Result<Vec<_>, _>>()?;

        if self.cpi_mode == CpiMode::Single {
            if let Some(&(x, y)) = pairs.iter().find(|(x, y)| x != y) {
                return Err(EncodeError::AsymmetricCpiNotAllowed {
                    x: x.to_string(),
                    y: y.to_string(),
                });
            }
        }

        // Look everything up before touching the header so an unknown value
        // is reported as such rather than as a count error
        let mut coded = Vec::with_capacity(pairs.len());
        for &(x, y) in &pairs {
            coded.push((self.code(x)?, self.code(y)?));
        }

        match self.cpi_mode {
            CpiMode::Single => {
                let mut packet = self.layout.header(coded.len(), selection.selected)?;
                for (x, _) in &coded {
                    packet.extend(x);
                }
                Ok((packet, CpiMetadata { cpi_count: coded.len() }))
            }
            CpiMode::Xy => {
                let mut unique: Vec<(f64, f64)> = Vec::new();
                let mut unique_codes = Vec::new();
                let mut selected = selection.selected;
                for (i, (pair, codes)) in pairs.iter().zip(coded).enumerate() {
                    let position = match unique.iter().position(|p| p == pair) {
                        Some(position) => position,
                        None => {
                            unique.push(*pair);
                            unique_codes.push(codes);
                            unique.len() - 1
                        }
                    };
                    if i == selection.selected {
                        selected = position;
                    }
                }
                if !pairs.is_empty() && selection.selected >= pairs.len() {
                    return Err(EncodeError::PresetOutOfRange {
                        selected: selection.selected,
                        count: pairs.len(),
                    });
                }

                let mut packet = self.layout.header(unique_codes.len(), selected)?;
                for (x, y) in &unique_codes {
                    packet.extend(x);
                    packet.extend(y);
                }
                Ok((
                    packet,
                    CpiMetadata {
                        cpi_count: unique_codes.len(),
                    },
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(cpi_mode: CpiMode) -> MultiCpiParams {
        MultiCpiParams {
            cpi_table: ChoiceTable::from([(400, 0x08), (800, 0x10), (1600, 0x20), (3200, 0x40)]),
            cpi_mode,
            layout: PresetLayout::default(),
        }
    }

    #[test]
    fn test_single_mode() {
        let (packet, meta) = params(CpiMode::Single)
            .encode(&"800, 1600, 800".into())
            .unwrap();
        assert_eq!(packet, vec![3, 1, 0x10, 0x20, 0x10]);
        assert_eq!(meta.cpi_count, 3);
    }

    #[test]
    fn test_single_mode_rejects_asymmetric() {
        assert_eq!(
            params(CpiMode::Single).encode(&"800:1600".into()),
            Err(EncodeError::AsymmetricCpiNotAllowed {
                x: "800".into(),
                y: "1600".into()
            })
        );
        // Reported even when one side is not in the table
        assert_eq!(
            params(CpiMode::Single).encode(&"800:900".into()),
            Err(EncodeError::AsymmetricCpiNotAllowed {
                x: "800".into(),
                y: "900".into()
            })
        );
    }

    #[test]
    fn test_xy_mode_dedups_pairs() {
        let (packet, meta) = params(CpiMode::Xy)
            .encode(&"800, 400:800, 800, 1600".into())
            .unwrap();
        assert_eq!(
            packet,
            vec![3, 1, 0x10, 0x10, 0x08, 0x10, 0x20, 0x20]
        );
        assert_eq!(meta.cpi_count, 3);
    }

    #[test]
    fn test_xy_mode_selected_follows_dedup() {
        let mut value = std::collections::BTreeMap::new();
        value.insert("presets".to_string(), SettingValue::from("800, 800, 1600"));
        value.insert("selected".to_string(), SettingValue::from(2));
        let (packet, _) = params(CpiMode::Xy)
            .encode(&SettingValue::Map(value))
            .unwrap();
        assert_eq!(packet[..2], [2, 2]);
    }

    #[test]
    fn test_unknown_cpi() {
        assert_eq!(
            params(CpiMode::Single).encode(&"900".into()),
            Err(EncodeError::UnsupportedCpiValue("900".into()))
        );
        assert_eq!(
            params(CpiMode::Single).encode(&"800.5".into()),
            Err(EncodeError::UnsupportedCpiValue("800.5".into()))
        );
    }

    #[test]
    fn test_encoding_is_repeatable() {
        let params = params(CpiMode::Xy);
        let value = SettingValue::from("400, 400, 3200");
        assert_eq!(params.encode(&value), params.encode(&value));
    }
}
