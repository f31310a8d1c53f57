//! `reactive` and `trigger` handlers
//!
//! Two-color effects: one color when a button is pressed, one when it is
//! released.
//!
//! ```text
//! reactive:  [led_id] r1 g1 b1 r2 g2 b2 [duration LE16]
//! trigger:   [led_id] [mask] r1 g1 b1 r2 g2 b2 [duration LE16]
//!
//! red                                         → red, red, 1000 ms
//! reactive(colors=red, blue; duration=2000)
//! trigger(colors=red, blue; buttons=1, 3)     → mask 0b101
//! ```

use serde::{Deserialize, Serialize};

use crate::color::{is_color, parse_color, parse_color_value, Rgb};
use crate::error::EncodeError;
use crate::params::{is_param_expr, parse_params, ParamParser, ParamValue};
use crate::value::SettingValue;

const STOP_COUNT: usize = 2;
const DEFAULT_DURATION: u32 = 1000;

fn default_duration_min() -> u32 {
    1000
}

fn default_duration_max() -> u32 {
    9990
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TwoColorEffect {
    colors: [Rgb; STOP_COUNT],
    duration: u32,
    buttons: Option<Vec<i64>>,
}

fn two_colors(colors: Vec<Rgb>) -> Result<[Rgb; STOP_COUNT], EncodeError> {
    match colors.as_slice() {
        [only] => Ok([*only, *only]),
        [first, second] => Ok([*first, *second]),
        other => Err(EncodeError::StopCountMismatch {
            expected: STOP_COUNT,
            actual: other.len(),
        }),
    }
}

fn parse_effect(value: &SettingValue, name: &str) -> Result<TwoColorEffect, EncodeError> {
    let allowed: &[&str] = if name == "trigger" {
        &["colors", "duration", "buttons"]
    } else {
        &["colors", "duration"]
    };

    match value {
        SettingValue::Text(text) if is_param_expr(text) => {
            let expr = parse_params(
                text,
                &[
                    ("colors", ParamParser::ColorList),
                    ("duration", ParamParser::Integer),
                    ("buttons", ParamParser::IntegerList),
                ],
            )?;
            if expr.name != name {
                return Err(EncodeError::MalformedParameterString(format!(
                    "expected {name}(...), got {}(...)",
                    expr.name
                )));
            }
            if let Some(key) = expr.unknown_keys(allowed).first() {
                return Err(EncodeError::MalformedParameterString(format!(
                    "unknown parameter \"{key}\""
                )));
            }

            let colors = match expr.get("colors") {
                Some(ParamValue::Colors(colors)) => colors.clone(),
                _ => Vec::new(),
            };
            let duration = match expr.get("duration") {
                Some(ParamValue::Integer(ms)) => duration_from(*ms)?,
                _ => DEFAULT_DURATION,
            };
            let buttons = match expr.get("buttons") {
                Some(ParamValue::IntegerList(buttons)) => Some(buttons.clone()),
                _ => None,
            };
            Ok(TwoColorEffect {
                colors: two_colors(colors)?,
                duration,
                buttons,
            })
        }
        SettingValue::Text(text) => {
            let colors = text
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(parse_color)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(TwoColorEffect {
                colors: two_colors(colors)?,
                duration: DEFAULT_DURATION,
                buttons: None,
            })
        }
        SettingValue::Map(_) => {
            let colors = match value.get("colors") {
                Some(SettingValue::Text(text)) if is_color(text) => vec![parse_color(text)?],
                Some(SettingValue::List(items))
                    if items.iter().all(|i| i.as_i64().is_some()) =>
                {
                    vec![parse_color_value(&SettingValue::List(items.clone()))?]
                }
                Some(colors) => colors
                    .items()?
                    .iter()
                    .map(parse_color_value)
                    .collect::<Result<Vec<_>, _>>()?,
                None => Vec::new(),
            };
            let duration = match value.get("duration") {
                Some(ms) => duration_from(ms.as_i64().ok_or_else(|| {
                    EncodeError::InvalidValue(format!("duration \"{ms}\" is not an integer"))
                })?)?,
                None => DEFAULT_DURATION,
            };
            let buttons = match value.get("buttons") {
                Some(buttons) if name == "trigger" => Some(
                    buttons
                        .items()?
                        .iter()
                        .map(|b| {
                            b.as_i64().ok_or_else(|| {
                                EncodeError::InvalidValue(format!("\"{b}\" is not a button number"))
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                _ => None,
            };
            Ok(TwoColorEffect {
                colors: two_colors(colors)?,
                duration,
                buttons,
            })
        }
        SettingValue::List(_) => Ok(TwoColorEffect {
            colors: two_colors(vec![parse_color_value(value)?])?,
            duration: DEFAULT_DURATION,
            buttons: None,
        }),
        other => Err(EncodeError::InvalidColor(other.to_string())),
    }
}

fn duration_from(ms: i64) -> Result<u32, EncodeError> {
    u32::try_from(ms).map_err(|_| EncodeError::InvalidValue(format!("invalid duration {ms}")))
}

fn check_duration(duration: u32, min: u32, max: u32) -> Result<(), EncodeError> {
    if duration < min || duration > max {
        return Err(EncodeError::DurationOutOfBounds { duration, min, max });
    }
    Ok(())
}

fn push_effect(packet: &mut Vec<u8>, effect: &TwoColorEffect) {
    for color in effect.colors {
        packet.extend(color.to_bytes());
    }
    packet.extend((effect.duration as u16).to_le_bytes());
}

fn check_bounds(min: u32, max: u32) -> Result<(), EncodeError> {
    if min > max || max > u32::from(u16::MAX) {
        return Err(EncodeError::InvalidValue(format!(
            "duration bounds {min}-{max} do not fit a 16 bit duration"
        )));
    }
    Ok(())
}

/// Parameters of the `reactive` handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactiveParams {
    #[serde(default)]
    pub led_id: Option<u8>,
    #[serde(default = "default_duration_min")]
    pub duration_min: u32,
    #[serde(default = "default_duration_max")]
    pub duration_max: u32,
}

impl ReactiveParams {
    pub fn validate(&self) -> Result<(), EncodeError> {
        check_bounds(self.duration_min, self.duration_max)
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let effect = parse_effect(value, "reactive")?;
        check_duration(effect.duration, self.duration_min, self.duration_max)?;

        let mut packet: Vec<u8> = self.led_id.into_iter().collect();
        push_effect(&mut packet, &effect);
        Ok(packet)
    }
}

/// Parameters of the `trigger` handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerParams {
    #[serde(default)]
    pub led_id: Option<u8>,
    #[serde(default)]
    pub default_trigger_mask: u8,
    #[serde(default = "default_duration_min")]
    pub duration_min: u32,
    #[serde(default = "default_duration_max")]
    pub duration_max: u32,
}

impl TriggerParams {
    pub fn validate(&self) -> Result<(), EncodeError> {
        check_bounds(self.duration_min, self.duration_max)
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let effect = parse_effect(value, "trigger")?;
        check_duration(effect.duration, self.duration_min, self.duration_max)?;

        let mask = match &effect.buttons {
            Some(buttons) => buttons.iter().try_fold(0u8, |mask, &button| {
                if (1..=8).contains(&button) {
                    Ok(mask | 1 << (button - 1))
                } else {
                    Err(EncodeError::InvalidValue(format!(
                        "trigger button {button} is not in 1-8"
                    )))
                }
            })?,
            None => self.default_trigger_mask,
        };

        let mut packet: Vec<u8> = self.led_id.into_iter().collect();
        packet.push(mask);
        push_effect(&mut packet, &effect);
        Ok(packet)
    }
}
