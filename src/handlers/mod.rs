//! Value handlers
//!
//! A handler turns a [`SettingValue`] into the payload bytes of one
//! command. [`SettingKind`] names the handler and carries its parameters; in
//! profile JSON it appears as `value_type` next to the handler's own keys:
//!
//! ```json
//! {
//!   "value_type": "range",
//!   "input_range": [200, 7200, 100],
//!   "output_range": [4, 167, 2.33]
//! }
//! ```
//!
//! Encoding is pure: the same value and parameters always give the same
//! bytes.

pub mod buttons;
pub mod choice;
pub mod gradient;
pub mod multicpi;
pub mod multidpi;
pub mod range;
pub mod reactive;
pub mod rgbcolor;
pub mod rgbgradient;
pub mod rgbgradientv2;
pub mod rival700;

use serde::{Deserialize, Serialize};

use crate::error::EncodeError;
use crate::value::SettingValue;

pub use buttons::{ButtonCodes, ButtonSpec, ButtonsParams};
pub use choice::{ChoiceOption, ChoiceParams};
pub use multicpi::{CpiMetadata, CpiMode, MultiCpiParams};
pub use multidpi::{
    CountMode, MultiDpiChoiceParams, MultiDpiChoiceXyParams, MultiDpiRangeParams, PresetLayout,
    XyMapping,
};
pub use range::{ChoiceTable, RangeChoiceParams, RangeParams, RangeSpec};
pub use reactive::{ReactiveParams, TriggerParams};
pub use rgbcolor::MultiColorParams;
pub use rgbgradient::RgbGradientParams;
pub use rgbgradientv2::RgbGradientV2Params;
pub use rival700::Rival700GradientParams;

/// Write `value` little-endian over `length` bytes
///
/// Bytes beyond the 8th are zero. Callers that take the width from a
/// profile go through [`check_width`] first.
pub(crate) fn le_bytes(value: u64, length: usize) -> Vec<u8> {
    let mut bytes = value.to_le_bytes().to_vec();
    bytes.resize(length, 0x00);
    bytes
}

/// Check that `width` is 1-8 bytes and that `value` fits in it
pub(crate) fn check_width(value: u64, width: usize) -> Result<(), EncodeError> {
    if !(1..=8).contains(&width) {
        return Err(EncodeError::InvalidFieldWidth(width));
    }
    if width < 8 && value >> (width * 8) != 0 {
        return Err(EncodeError::ValueTooWide { value, width });
    }
    Ok(())
}

/// [`le_bytes`] for a profile-declared width
pub(crate) fn checked_le_bytes(value: u64, width: usize) -> Result<Vec<u8>, EncodeError> {
    check_width(value, width)?;
    Ok(le_bytes(value, width))
}

/// Handler selection plus the handler's parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "value_type", rename_all = "snake_case")]
pub enum SettingKind {
    /// Command without a payload
    None,
    Choice(ChoiceParams),
    Range(RangeParams),
    RangeChoice(RangeChoiceParams),
    MultidpiRange(MultiDpiRangeParams),
    MultidpiRangeChoice(MultiDpiChoiceParams),
    MultidpiRangeChoiceXy(MultiDpiChoiceXyParams),
    MulticpiRange(MultiCpiParams),
    Rgbcolor,
    MultiRgbcolor(MultiColorParams),
    OnestrRgbcolor(MultiColorParams),
    ReactiveRgbcolor,
    Reactive(ReactiveParams),
    Trigger(TriggerParams),
    Rgbgradient(RgbGradientParams),
    Rgbgradientv2(RgbGradientV2Params),
    Rival700Rgbgradient(Rival700GradientParams),
    Buttons(ButtonsParams),
}

/// Output of [`SettingKind::encode_with_metadata`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub payload: Vec<u8>,
    /// Only set by `multicpi_range`
    pub cpi: Option<CpiMetadata>,
}

impl SettingKind {
    /// Every `value_type` tag, in declaration order
    pub const TYPE_NAMES: &'static [&'static str] = &[
        "none",
        "choice",
        "range",
        "range_choice",
        "multidpi_range",
        "multidpi_range_choice",
        "multidpi_range_choice_xy",
        "multicpi_range",
        "rgbcolor",
        "multi_rgbcolor",
        "onestr_rgbcolor",
        "reactive_rgbcolor",
        "reactive",
        "trigger",
        "rgbgradient",
        "rgbgradientv2",
        "rival700_rgbgradient",
        "buttons",
    ];

    /// The `value_type` tag of this kind
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Choice(_) => "choice",
            Self::Range(_) => "range",
            Self::RangeChoice(_) => "range_choice",
            Self::MultidpiRange(_) => "multidpi_range",
            Self::MultidpiRangeChoice(_) => "multidpi_range_choice",
            Self::MultidpiRangeChoiceXy(_) => "multidpi_range_choice_xy",
            Self::MulticpiRange(_) => "multicpi_range",
            Self::Rgbcolor => "rgbcolor",
            Self::MultiRgbcolor(_) => "multi_rgbcolor",
            Self::OnestrRgbcolor(_) => "onestr_rgbcolor",
            Self::ReactiveRgbcolor => "reactive_rgbcolor",
            Self::Reactive(_) => "reactive",
            Self::Trigger(_) => "trigger",
            Self::Rgbgradient(_) => "rgbgradient",
            Self::Rgbgradientv2(_) => "rgbgradientv2",
            Self::Rival700Rgbgradient(_) => "rival700_rgbgradient",
            Self::Buttons(_) => "buttons",
        }
    }

    /// Whether this handler takes a value at all
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Check the parameters themselves (profile authoring errors)
    pub fn validate(&self) -> Result<(), EncodeError> {
        match self {
            Self::None | Self::Rgbcolor | Self::ReactiveRgbcolor => Ok(()),
            Self::Choice(p) => p.validate(),
            Self::Range(p) => p.validate(),
            Self::RangeChoice(p) => p.validate(),
            Self::MultidpiRange(p) => p.validate(),
            Self::MultidpiRangeChoice(p) => p.validate(),
            Self::MultidpiRangeChoiceXy(p) => p.validate(),
            Self::MulticpiRange(p) => p.validate(),
            Self::MultiRgbcolor(p) | Self::OnestrRgbcolor(p) => p.validate(),
            Self::Reactive(p) => p.validate(),
            Self::Trigger(p) => p.validate(),
            Self::Rgbgradient(p) => p.validate(),
            Self::Rgbgradientv2(p) => p.validate(),
            Self::Rival700Rgbgradient(p) => p.validate(),
            Self::Buttons(p) => p.validate(),
        }
    }

    /// Encode a value into payload bytes
    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.encode_with_metadata(value).map(|encoded| encoded.payload)
    }

    /// Encode a value, keeping any metadata the handler reports
    pub fn encode_with_metadata(&self, value: &SettingValue) -> Result<Encoded, EncodeError> {
        let payload = match self {
            Self::None => Vec::new(),
            Self::Choice(p) => p.encode(value)?,
            Self::Range(p) => p.encode(value)?,
            Self::RangeChoice(p) => p.encode(value)?,
            Self::MultidpiRange(p) => p.encode(value)?,
            Self::MultidpiRangeChoice(p) => p.encode(value)?,
            Self::MultidpiRangeChoiceXy(p) => p.encode(value)?,
            Self::MulticpiRange(p) => {
                let (payload, cpi) = p.encode(value)?;
                return Ok(Encoded {
                    payload,
                    cpi: Some(cpi),
                });
            }
            Self::Rgbcolor => rgbcolor::encode_rgbcolor(value)?,
            Self::MultiRgbcolor(p) => p.encode_multi(value)?,
            Self::OnestrRgbcolor(p) => p.encode_onestr(value)?,
            Self::ReactiveRgbcolor => rgbcolor::encode_reactive_rgbcolor(value)?,
            Self::Reactive(p) => p.encode(value)?,
            Self::Trigger(p) => p.encode(value)?,
            Self::Rgbgradient(p) => p.encode(value)?,
            Self::Rgbgradientv2(p) => p.encode(value)?,
            Self::Rival700Rgbgradient(p) => p.encode(value)?,
            Self::Buttons(p) => p.encode(value)?,
        };
        Ok(Encoded { payload, cpi: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_le_bytes() {
        assert_eq!(le_bytes(0x1234, 1), vec![0x34]);
        assert_eq!(le_bytes(0x1234, 2), vec![0x34, 0x12]);
        assert_eq!(le_bytes(0x01, 3), vec![0x01, 0x00, 0x00]);
        assert_eq!(le_bytes(7, 10).len(), 10);
    }

    #[test]
    fn test_check_width() {
        assert_eq!(check_width(0xFF, 1), Ok(()));
        assert_eq!(check_width(u64::MAX, 8), Ok(()));
        assert_eq!(
            check_width(0x12C, 1),
            Err(EncodeError::ValueTooWide {
                value: 0x12C,
                width: 1
            })
        );
        assert_eq!(check_width(1, 0), Err(EncodeError::InvalidFieldWidth(0)));
        assert_eq!(check_width(1, 9), Err(EncodeError::InvalidFieldWidth(9)));
        assert_eq!(checked_le_bytes(0x1FF, 2), Ok(vec![0xFF, 0x01]));
    }

    #[test]
    fn test_deserialize_by_value_type() {
        let kind: SettingKind = serde_json::from_str(
            r#"{"value_type": "range", "input_range": [200, 7200, 100], "output_range": [4, 167, 2.33]}"#,
        )
        .unwrap();
        assert_eq!(kind.type_name(), "range");
        assert_eq!(kind.encode(&800.into()).unwrap(), vec![0x11]);

        let kind: SettingKind = serde_json::from_str(r#"{"value_type": "rgbcolor"}"#).unwrap();
        assert_eq!(kind, SettingKind::Rgbcolor);
    }

    #[test]
    fn test_flattened_params() {
        let kind: SettingKind = serde_json::from_str(
            r#"{
                "value_type": "multidpi_range_choice_xy",
                "input_range": [200, 400, 200],
                "choices": {"200": 1, "400": 4},
                "count_mode": "flag",
                "xy_mapping": "grouped"
            }"#,
        )
        .unwrap();
        kind.validate().unwrap();
        assert_eq!(
            kind.encode(&"200:400".into()).unwrap(),
            vec![0b1, 0x01, 0x01, 0x04]
        );
    }

    #[test]
    fn test_type_names_roundtrip() {
        let kinds = [
            SettingKind::None,
            SettingKind::Rgbcolor,
            SettingKind::ReactiveRgbcolor,
            SettingKind::MultiRgbcolor(MultiColorParams { color_count: 2 }),
        ];
        for kind in kinds {
            assert!(SettingKind::TYPE_NAMES.contains(&kind.type_name()));
            let json = serde_json::to_value(&kind).unwrap();
            assert_eq!(json["value_type"], kind.type_name());
        }
    }

    #[test]
    fn test_none_has_empty_payload() {
        assert!(SettingKind::None.encode(&"".into()).unwrap().is_empty());
        assert!(!SettingKind::None.takes_value());
    }

    #[test]
    fn test_multicpi_metadata() {
        let kind = SettingKind::MulticpiRange(MultiCpiParams {
            cpi_table: ChoiceTable::from([(800, 0x10), (1600, 0x20)]),
            cpi_mode: CpiMode::Xy,
            layout: PresetLayout::default(),
        });
        let encoded = kind.encode_with_metadata(&"800, 800, 1600".into()).unwrap();
        assert_eq!(encoded.cpi, Some(CpiMetadata { cpi_count: 2 }));
    }
}
