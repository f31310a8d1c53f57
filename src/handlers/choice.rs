//! `choice` handler
//!
//! A fixed set of named options, each with optional aliases:
//!
//! ```text
//! "steady"  → 0x01
//! "breath"  → 0x03     (alias "breathe")
//! 1000      → 0x01     (numbers match through their text)
//! ```

use serde::{Deserialize, Serialize};

use super::{check_width, checked_le_bytes};
use crate::error::EncodeError;
use crate::value::SettingValue;

/// One accepted option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub value: u64,
}

impl ChoiceOption {
    pub fn new(name: &str, value: u64) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            value,
        }
    }

    pub fn with_aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases = aliases.iter().map(|a| a.to_string()).collect();
        self
    }

    fn matches(&self, input: &str) -> bool {
        self.name.eq_ignore_ascii_case(input)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(input))
    }
}

fn default_length() -> usize {
    1
}

/// Parameters of the `choice` handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceParams {
    pub choices: Vec<ChoiceOption>,
    #[serde(default = "default_length")]
    pub choice_length_byte: usize,
}

impl ChoiceParams {
    pub fn new(choices: Vec<ChoiceOption>) -> Self {
        Self {
            choices,
            choice_length_byte: 1,
        }
    }

    /// Option names, for help text and error messages
    pub fn names(&self) -> Vec<&str> {
        self.choices.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.choices.is_empty() {
            return Err(EncodeError::InvalidValue("choice list is empty".into()));
        }
        for option in &self.choices {
            check_width(option.value, self.choice_length_byte)?;
        }
        for (i, option) in self.choices.iter().enumerate() {
            let clash = self.choices[i + 1..].iter().find(|other| {
                other.matches(&option.name) || option.aliases.iter().any(|a| other.matches(a))
            });
            if let Some(other) = clash {
                return Err(EncodeError::InvalidValue(format!(
                    "choices \"{}\" and \"{}\" share a name",
                    option.name, other.name
                )));
            }
        }
        Ok(())
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        self.validate()?;
        let input = match value {
            SettingValue::Text(s) => s.trim().to_string(),
            SettingValue::Int(_) | SettingValue::Float(_) => value.to_string(),
            other => {
                return Err(EncodeError::InvalidChoice {
                    value: other.to_string(),
                    allowed: self.names().join(", "),
                })
            }
        };

        let option = self
            .choices
            .iter()
            .find(|c| c.matches(&input))
            .ok_or_else(|| EncodeError::InvalidChoice {
                value: input.clone(),
                allowed: self.names().join(", "),
            })?;
        checked_le_bytes(option.value, self.choice_length_byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_effect() -> ChoiceParams {
        ChoiceParams::new(vec![
            ChoiceOption::new("steady", 0x01),
            ChoiceOption::new("breath", 0x03).with_aliases(&["breathe", "breathing"]),
            ChoiceOption::new("off", 0x00),
        ])
    }

    fn polling_rate() -> ChoiceParams {
        ChoiceParams::new(vec![
            ChoiceOption::new("125", 0x04),
            ChoiceOption::new("250", 0x03),
            ChoiceOption::new("500", 0x02),
            ChoiceOption::new("1000", 0x01),
        ])
    }

    #[test]
    fn test_names_and_aliases() {
        let params = light_effect();
        params.validate().unwrap();
        assert_eq!(params.encode(&"steady".into()).unwrap(), vec![0x01]);
        assert_eq!(params.encode(&"Breathe".into()).unwrap(), vec![0x03]);
        assert_eq!(params.encode(&" OFF ".into()).unwrap(), vec![0x00]);
    }

    #[test]
    fn test_numbers_match_text() {
        let params = polling_rate();
        assert_eq!(params.encode(&1000.into()).unwrap(), vec![0x01]);
        assert_eq!(params.encode(&"125".into()).unwrap(), vec![0x04]);
    }

    #[test]
    fn test_invalid_choice_lists_allowed() {
        let err = light_effect().encode(&"rainbow".into()).unwrap_err();
        assert_eq!(
            err,
            EncodeError::InvalidChoice {
                value: "rainbow".into(),
                allowed: "steady, breath, off".into(),
            }
        );
    }

    #[test]
    fn test_wide_choice() {
        let mut params = polling_rate();
        params.choice_length_byte = 2;
        assert_eq!(params.encode(&"500".into()).unwrap(), vec![0x02, 0x00]);
    }

    #[test]
    fn test_value_wider_than_field() {
        let params = ChoiceParams::new(vec![ChoiceOption::new("max", 0x1FF)]);
        let too_wide = EncodeError::ValueTooWide {
            value: 0x1FF,
            width: 1,
        };
        assert_eq!(params.validate(), Err(too_wide.clone()));
        assert_eq!(params.encode(&"max".into()), Err(too_wide));

        let mut params = polling_rate();
        params.choice_length_byte = 0;
        assert_eq!(
            params.encode(&"500".into()),
            Err(EncodeError::InvalidFieldWidth(0))
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let params = ChoiceParams::new(vec![
            ChoiceOption::new("on", 1),
            ChoiceOption::new("enabled", 1).with_aliases(&["ON"]),
        ]);
        assert!(params.validate().is_err());
    }
}
