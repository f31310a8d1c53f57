//! `range` and `range_choice` handlers
//!
//! Both map a number from a human-facing input range onto a device value.
//! `range` pairs the input sequence element-by-element with an output
//! sequence; `range_choice` looks the nearest input up in an explicit table.
//!
//! ```text
//! input_range  = [200, 7200, 100]   → 200, 300, 400, ..., 7200
//! output_range = [4, 167, 2.33]     → 4, 6, 8, ..., 167
//! 800 → index 6 → 0x11
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{check_width, checked_le_bytes};
use crate::error::EncodeError;
use crate::value::SettingValue;

/// A `[min, max, step]` triple
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct RangeSpec {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl From<[f64; 3]> for RangeSpec {
    fn from([min, max, step]: [f64; 3]) -> Self {
        Self { min, max, step }
    }
}

impl From<RangeSpec> for [f64; 3] {
    fn from(r: RangeSpec) -> Self {
        [r.min, r.max, r.step]
    }
}

impl RangeSpec {
    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// Generate the integer sequence described by this range
    ///
    /// The position is accumulated as a float and each element truncated,
    /// so fractional steps such as `2.33` produce an uneven integer series.
    pub fn values(&self) -> Vec<i64> {
        if self.step <= 0.0 || !self.step.is_finite() {
            return vec![self.min.trunc() as i64];
        }

        let mut values = Vec::new();
        let mut position = self.min;
        loop {
            let value = position.trunc();
            if value > self.max {
                break;
            }
            values.push(value as i64);
            position += self.step;
        }
        values
    }

    /// Index of the input step nearest to `value`
    ///
    /// The value is clamped into the range first. A remainder of exactly
    /// half a step rounds up.
    pub fn nearest_index(&self, value: f64, len: usize) -> usize {
        let value = value.clamp(self.min, self.max);
        let offset = value - self.min;
        let mut index = (offset / self.step).floor();
        if offset - index * self.step >= self.step / 2.0 {
            index += 1.0;
        }
        (index.max(0.0) as usize).min(len.saturating_sub(1))
    }

    fn check(&self, what: &str) -> Result<(), EncodeError> {
        if self.step > 0.0 && self.step.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(EncodeError::InvalidValue(format!(
                "{what} [{}, {}, {}] is not an increasing range",
                self.min, self.max, self.step
            )))
        }
    }
}

fn number(value: &SettingValue) -> Result<f64, EncodeError> {
    value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EncodeError::InvalidValue(format!("\"{value}\" is not a number")))
}

/// Check that input and output ranges pair up element by element
pub(crate) fn check_range_pair(input: &RangeSpec, output: &RangeSpec) -> Result<(), EncodeError> {
    input.check("input_range")?;
    output.check("output_range")?;
    let (input_len, output_len) = (input.values().len(), output.values().len());
    if input_len != output_len {
        return Err(EncodeError::RangeLengthMismatch {
            input: input_len,
            output: output_len,
        });
    }
    Ok(())
}

/// Check that every device value fits in a `width`-byte field
pub(crate) fn check_outputs_fit(
    outputs: impl IntoIterator<Item = u64>,
    width: usize,
) -> Result<(), EncodeError> {
    check_width(0, width)?;
    outputs
        .into_iter()
        .try_for_each(|value| check_width(value, width))
}

/// Device values of an output range, which must not be negative
pub(crate) fn output_values(output: &RangeSpec) -> Result<Vec<u64>, EncodeError> {
    output
        .values()
        .into_iter()
        .map(|raw| {
            u64::try_from(raw)
                .map_err(|_| EncodeError::InvalidValue(format!("output value {raw} is negative")))
        })
        .collect()
}

/// Map `value` through an input/output range pair
pub(crate) fn quantize_range(
    input: &RangeSpec,
    output: &RangeSpec,
    value: f64,
) -> Result<u64, EncodeError> {
    let outputs = output.values();
    let index = input.nearest_index(value, outputs.len());
    let raw = outputs
        .get(index)
        .copied()
        .ok_or_else(|| EncodeError::InvalidValue("output range is empty".into()))?;
    u64::try_from(raw)
        .map_err(|_| EncodeError::InvalidValue(format!("output value {raw} is negative")))
}

/// Input value to device value table
///
/// JSON object keys are strings, so the table is read as `{"125": 4}` and
/// converted once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, u64>",
    into = "BTreeMap<String, u64>"
)]
pub struct ChoiceTable(pub BTreeMap<i64, u64>);

impl TryFrom<BTreeMap<String, u64>> for ChoiceTable {
    type Error = String;

    fn try_from(raw: BTreeMap<String, u64>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .map(|(key, value)| {
                key.trim()
                    .parse::<i64>()
                    .map(|key| (key, value))
                    .map_err(|_| format!("choice key \"{key}\" is not an integer"))
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

impl From<ChoiceTable> for BTreeMap<String, u64> {
    fn from(table: ChoiceTable) -> Self {
        table
            .0
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

impl<const N: usize> From<[(i64, u64); N]> for ChoiceTable {
    fn from(entries: [(i64, u64); N]) -> Self {
        Self(BTreeMap::from(entries))
    }
}

/// Check that a choice table covers exactly the generated input range
pub(crate) fn check_choice_table(
    input: &RangeSpec,
    choices: &ChoiceTable,
) -> Result<(), EncodeError> {
    let choices = &choices.0;
    input.check("input_range")?;
    let inputs = input.values();

    if inputs.len() != choices.len() {
        return Err(EncodeError::RangeChoiceMismatch(format!(
            "{} choices for {} input values",
            choices.len(),
            inputs.len()
        )));
    }
    let table_min = choices.keys().next().copied();
    let table_max = choices.keys().next_back().copied();
    if table_min != inputs.first().copied() || table_max != inputs.last().copied() {
        return Err(EncodeError::RangeChoiceMismatch(format!(
            "table spans {:?}..{:?}, input range spans {:?}..{:?}",
            table_min,
            table_max,
            inputs.first(),
            inputs.last()
        )));
    }
    Ok(())
}

/// Pick the table entry whose key is nearest to `value` (ties go to the
/// larger key)
pub(crate) fn quantize_choice(choices: &ChoiceTable, value: f64) -> Result<u64, EncodeError> {
    let mut best: Option<(f64, u64)> = None;
    for (&key, &output) in &choices.0 {
        let distance = (key as f64 - value).abs();
        // Keys ascend, so `<=` lets the larger key win a tie
        if best.map_or(true, |(d, _)| distance <= d) {
            best = Some((distance, output));
        }
    }
    best.map(|(_, output)| output)
        .ok_or_else(|| EncodeError::InvalidValue("choice table is empty".into()))
}

fn default_length() -> usize {
    1
}

/// Parameters of the `range` handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeParams {
    pub input_range: RangeSpec,
    pub output_range: RangeSpec,
    #[serde(default = "default_length")]
    pub range_length_byte: usize,
}

impl RangeParams {
    pub fn validate(&self) -> Result<(), EncodeError> {
        check_range_pair(&self.input_range, &self.output_range)?;
        check_outputs_fit(output_values(&self.output_range)?, self.range_length_byte)
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let output = quantize_range(&self.input_range, &self.output_range, number(value)?)?;
        checked_le_bytes(output, self.range_length_byte)
    }
}

/// Parameters of the `range_choice` handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeChoiceParams {
    pub input_range: RangeSpec,
    pub choices: ChoiceTable,
    #[serde(default = "default_length")]
    pub range_length_byte: usize,
}

impl RangeChoiceParams {
    pub fn validate(&self) -> Result<(), EncodeError> {
        check_choice_table(&self.input_range, &self.choices)?;
        check_outputs_fit(self.choices.0.values().copied(), self.range_length_byte)
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let value = number(value)?.clamp(self.input_range.min, self.input_range.max);
        let output = quantize_choice(&self.choices, value)?;
        checked_le_bytes(output, self.range_length_byte)
    }
}
