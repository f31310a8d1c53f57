//! Gradient input shared by the gradient handlers
//!
//! Every gradient handler accepts the same inputs:
//!
//! ```text
//! red                                          → one stop, repeat flag set
//! 0%: red, 50%: blue                           → stops, default duration
//! rgbgradient(duration=2000; colors=0%: red, 50%: blue)
//! {"duration": 2000, "colors": [{"pos": 0, "color": "red"}, ...]}
//! ```
//!
//! Only the packet layout differs between devices.

use crate::color::{is_color, parse_color, parse_color_value, parse_gradient, GradientStop, Rgb};
use crate::error::EncodeError;
use crate::params::{is_param_expr, parse_params, ParamParser, ParamValue};
use crate::value::SettingValue;

/// Duration used when the input does not give one (ms)
pub const DEFAULT_DURATION: u32 = 1000;

/// A gradient ready to be laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gradient {
    pub duration: u32,
    pub stops: Vec<GradientStop>,
    /// Input was a single color rather than a gradient
    pub is_bare_color: bool,
}

/// Device limits applied to a parsed gradient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradientLimits {
    pub max_stops: usize,
    pub min_duration: u32,
    pub max_duration: u32,
}

impl Gradient {
    /// Parse any accepted gradient form
    pub fn from_value(value: &SettingValue) -> Result<Self, EncodeError> {
        match value {
            SettingValue::Text(text) => Self::from_text(text),
            SettingValue::List(_) => Ok(Self::bare(parse_color_value(value)?)),
            SettingValue::Map(_) => Self::from_map(value),
            other => Err(EncodeError::InvalidGradientSyntax(format!(
                "\"{other}\" is neither a color nor a gradient"
            ))),
        }
    }

    fn bare(color: Rgb) -> Self {
        Self {
            duration: DEFAULT_DURATION,
            stops: vec![GradientStop { position: 0, color }],
            is_bare_color: true,
        }
    }

    fn from_text(text: &str) -> Result<Self, EncodeError> {
        if is_color(text) {
            return Ok(Self::bare(parse_color(text)?));
        }
        if !is_param_expr(text) {
            return Ok(Self {
                duration: DEFAULT_DURATION,
                stops: parse_gradient(text)?,
                is_bare_color: false,
            });
        }

        let expr = parse_params(
            text,
            &[
                ("duration", ParamParser::Integer),
                ("colors", ParamParser::Text),
            ],
        )?;
        if expr.name != "rgbgradient" {
            return Err(EncodeError::MalformedParameterString(format!(
                "expected rgbgradient(...), got {}(...)",
                expr.name
            )));
        }
        if let Some(key) = expr.unknown_keys(&["duration", "colors"]).first() {
            return Err(EncodeError::MalformedParameterString(format!(
                "unknown parameter \"{key}\""
            )));
        }

        let duration = match expr.get("duration") {
            Some(ParamValue::Integer(ms)) => duration_from(*ms)?,
            _ => DEFAULT_DURATION,
        };
        // Parsed here rather than by the grammar so an empty list stays an
        // empty-gradient error
        let stops = match expr.get("colors") {
            Some(ParamValue::Text(colors)) => parse_gradient(colors)?,
            _ => return Err(EncodeError::EmptyGradient),
        };
        Ok(Self {
            duration,
            stops,
            is_bare_color: false,
        })
    }

    fn from_map(value: &SettingValue) -> Result<Self, EncodeError> {
        let duration = match value.get("duration") {
            Some(ms) => duration_from(ms.as_i64().ok_or_else(|| {
                EncodeError::InvalidValue(format!("duration \"{ms}\" is not an integer"))
            })?)?,
            None => DEFAULT_DURATION,
        };

        let colors = match value.get("colors") {
            Some(SettingValue::List(colors)) => colors,
            Some(SettingValue::Text(text)) => {
                return Ok(Self {
                    duration,
                    stops: parse_gradient(text)?,
                    is_bare_color: false,
                })
            }
            _ => return Err(EncodeError::EmptyGradient),
        };

        let mut stops = Vec::with_capacity(colors.len());
        for stop in colors {
            let position = stop
                .get("pos")
                .and_then(SettingValue::as_i64)
                .and_then(|p| u8::try_from(p).ok())
                .filter(|p| *p <= 100)
                .ok_or_else(|| {
                    EncodeError::InvalidGradientSyntax(format!("bad stop position in {stop}"))
                })?;
            let color = stop
                .get("color")
                .ok_or_else(|| EncodeError::InvalidGradientSyntax(format!("no color in {stop}")))
                .and_then(parse_color_value)?;
            stops.push(GradientStop { position, color });
        }
        if stops.is_empty() {
            return Err(EncodeError::EmptyGradient);
        }
        Ok(Self {
            duration,
            stops,
            is_bare_color: false,
        })
    }

    /// Check stop count, ordering and duration against device limits
    pub fn check(&self, limits: &GradientLimits) -> Result<(), EncodeError> {
        if self.stops.is_empty() {
            return Err(EncodeError::EmptyGradient);
        }
        if self.stops.len() > limits.max_stops {
            return Err(EncodeError::TooManyStops {
                count: self.stops.len(),
                max: limits.max_stops,
            });
        }
        for pair in self.stops.windows(2) {
            if pair[1].position < pair[0].position {
                return Err(EncodeError::UnorderedStops {
                    previous: pair[0].position,
                    position: pair[1].position,
                });
            }
        }
        if self.duration < limits.min_duration || self.duration > limits.max_duration {
            return Err(EncodeError::DurationOutOfBounds {
                duration: self.duration,
                min: limits.min_duration,
                max: limits.max_duration,
            });
        }
        Ok(())
    }
}

fn duration_from(ms: i64) -> Result<u32, EncodeError> {
    u32::try_from(ms).map_err(|_| EncodeError::InvalidValue(format!("invalid duration {ms}")))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    const LIMITS: GradientLimits = GradientLimits {
        max_stops: 14,
        min_duration: 0,
        max_duration: 30000,
    };

    #[test]
    fn test_bare_color() {
        let gradient = Gradient::from_value(&"red".into()).unwrap();
        assert!(gradient.is_bare_color);
        assert_eq!(gradient.duration, DEFAULT_DURATION);
        assert_eq!(gradient.stops.len(), 1);
        assert_eq!(gradient.stops[0].color, Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_expression() {
        let gradient = Gradient::from_value(
            &"rgbgradient(duration=2000; colors=0%: red, 50%: lime)".into(),
        )
        .unwrap();
        assert!(!gradient.is_bare_color);
        assert_eq!(gradient.duration, 2000);
        assert_eq!(gradient.stops[1].position, 50);
    }

    #[test]
    fn test_bare_gradient_text() {
        let gradient = Gradient::from_value(&"0%: red, 100%: blue".into()).unwrap();
        assert_eq!(gradient.duration, DEFAULT_DURATION);
        assert_eq!(gradient.stops.len(), 2);
    }

    #[test]
    fn test_map_form() {
        let stop = |pos: i64, color: &str| {
            SettingValue::Map(BTreeMap::from([
                ("pos".to_string(), SettingValue::from(pos)),
                ("color".to_string(), SettingValue::from(color)),
            ]))
        };
        let value = SettingValue::Map(BTreeMap::from([
            ("duration".to_string(), SettingValue::from(1500)),
            (
                "colors".to_string(),
                SettingValue::List(vec![stop(0, "red"), stop(60, "#0000ff")]),
            ),
        ]));
        let gradient = Gradient::from_value(&value).unwrap();
        assert_eq!(gradient.duration, 1500);
        assert_eq!(gradient.stops[1].color, Rgb::new(0, 0, 255));
    }

    #[test]
    fn test_expression_errors() {
        assert!(matches!(
            Gradient::from_value(&"rgbgradient(duration=1000)".into()),
            Err(EncodeError::EmptyGradient)
        ));
        assert!(matches!(
            Gradient::from_value(&"rgbgradient(colors=0%: red; speed=2)".into()),
            Err(EncodeError::MalformedParameterString(_))
        ));
        assert!(matches!(
            Gradient::from_value(&"wave(colors=0%: red)".into()),
            Err(EncodeError::MalformedParameterString(_))
        ));
    }

    #[test]
    fn test_stop_ceiling() {
        let stops = |n: usize| {
            (0..n)
                .map(|i| format!("{}%: red", i * 5))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let fourteen = Gradient::from_value(&stops(14).into()).unwrap();
        assert!(fourteen.check(&LIMITS).is_ok());

        let fifteen = Gradient::from_value(&stops(15).into()).unwrap();
        assert_eq!(
            fifteen.check(&LIMITS),
            Err(EncodeError::TooManyStops { count: 15, max: 14 })
        );
    }

    #[test]
    fn test_unordered_and_duration() {
        let gradient = Gradient::from_value(&"50%: red, 10%: blue".into()).unwrap();
        assert_eq!(
            gradient.check(&LIMITS),
            Err(EncodeError::UnorderedStops {
                previous: 50,
                position: 10
            })
        );

        let gradient =
            Gradient::from_value(&"rgbgradient(duration=40000; colors=0%: red)".into()).unwrap();
        assert_eq!(
            gradient.check(&LIMITS),
            Err(EncodeError::DurationOutOfBounds {
                duration: 40000,
                min: 0,
                max: 30000
            })
        );
    }
}
