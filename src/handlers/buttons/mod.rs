//! `buttons` handler
//!
//! Builds the button mapping table: one `field_length` byte field per
//! physical button at the button's offset, zero everywhere else.
//!
//! ```text
//! buttons(button1=button2; button2=button1; button6=dpi; layout=azerty)
//! buttons(button4=PlayPause; button5=a)
//! default
//! ```
//!
//! Each field holds an action class and, for keys, a parameter:
//!
//! ```text
//! disable / off / none     → [disable]
//! button3                  → [id of button3]
//! dpi, scrollup, scrolldown→ [special code]
//! volumeup, mute, ...      → [multimedia, consumer usage]
//! a, f5, enter, ...        → [keyboard, HID usage in the selected layout]
//! ```
//!
//! Buttons not named in the value keep their default mapping.

pub mod layout;

use serde::{Deserialize, Serialize};

use self::layout::{layout, multimedia_code, KeyboardLayout, DEFAULT_LAYOUT};
use crate::error::EncodeError;
use crate::params::{is_param_expr, parse_params, ParamValue};
use crate::value::SettingValue;

const DISABLE_KEYWORDS: [&str; 4] = ["disable", "disabled", "off", "none"];

/// One physical button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonSpec {
    pub name: String,
    /// Value written when another button is mapped to this one
    pub id: u8,
    /// Field position in the table
    pub offset: usize,
    /// Mapping applied when the value does not name this button
    pub default: String,
}

impl ButtonSpec {
    pub fn new(name: &str, id: u8, offset: usize, default: &str) -> Self {
        Self {
            name: name.to_string(),
            id,
            offset,
            default: default.to_string(),
        }
    }
}

/// Action class codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonCodes {
    pub disable: u8,
    pub keyboard: u8,
    pub multimedia: u8,
    pub dpi_switch: u8,
    pub scroll_up: u8,
    pub scroll_down: u8,
}

impl Default for ButtonCodes {
    fn default() -> Self {
        Self {
            disable: 0x00,
            keyboard: 0x51,
            multimedia: 0x61,
            dpi_switch: 0x30,
            scroll_up: 0x31,
            scroll_down: 0x32,
        }
    }
}

fn default_field_length() -> usize {
    2
}

/// Parameters of the `buttons` handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonsParams {
    pub buttons: Vec<ButtonSpec>,
    #[serde(default = "default_field_length")]
    pub field_length: usize,
    /// Defaults to the end of the last field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_length: Option<usize>,
    #[serde(default)]
    pub codes: ButtonCodes,
}

/// What a button does, before it is turned into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Disable,
    Button(u8),
    DpiSwitch,
    ScrollUp,
    ScrollDown,
    Multimedia(u8),
    Key(u8),
}

impl ButtonsParams {
    /// Size of the encoded table
    pub fn table_length(&self) -> usize {
        self.table_length.unwrap_or_else(|| {
            self.buttons
                .iter()
                .map(|b| b.offset + self.field_length)
                .max()
                .unwrap_or(0)
        })
    }

    fn button(&self, name: &str) -> Option<&ButtonSpec> {
        self.buttons
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn validate(&self) -> Result<(), EncodeError> {
        layout::check_layouts()?;
        if self.field_length == 0 {
            return Err(EncodeError::InvalidValue("field_length must be at least 1".into()));
        }
        let table_length = self.table_length();
        for (i, button) in self.buttons.iter().enumerate() {
            if button.offset + self.field_length > table_length {
                return Err(EncodeError::InvalidValue(format!(
                    "{} does not fit in a {table_length} byte table",
                    button.name
                )));
            }
            if self.buttons[..i]
                .iter()
                .any(|b| b.name.eq_ignore_ascii_case(&button.name))
            {
                return Err(EncodeError::InvalidValue(format!(
                    "button {} is declared twice",
                    button.name
                )));
            }
        }
        // Every default must resolve with the default layout
        let qwerty = layout(DEFAULT_LAYOUT)?;
        for button in &self.buttons {
            let action = self.resolve(&button.default, qwerty)?;
            self.field(action)?;
        }
        Ok(())
    }

    fn resolve(&self, action: &str, keys: &KeyboardLayout) -> Result<Action, EncodeError> {
        let action = action.trim();
        let lower = action.to_ascii_lowercase();

        if DISABLE_KEYWORDS.contains(&lower.as_str()) {
            return Ok(Action::Disable);
        }
        if let Some(target) = self.button(action) {
            return Ok(Action::Button(target.id));
        }
        match lower.as_str() {
            "dpi" => return Ok(Action::DpiSwitch),
            "scrollup" => return Ok(Action::ScrollUp),
            "scrolldown" => return Ok(Action::ScrollDown),
            _ => {}
        }
        if let Some(code) = multimedia_code(action) {
            return Ok(Action::Multimedia(code));
        }
        keys.keycode(action)
            .map(Action::Key)
            .ok_or_else(|| EncodeError::UnknownButtonTarget(action.to_string()))
    }

    fn field(&self, action: Action) -> Result<Vec<u8>, EncodeError> {
        let codes = &self.codes;
        let bytes = match action {
            Action::Disable => vec![codes.disable],
            Action::Button(id) => vec![id],
            Action::DpiSwitch => vec![codes.dpi_switch],
            Action::ScrollUp => vec![codes.scroll_up],
            Action::ScrollDown => vec![codes.scroll_down],
            Action::Multimedia(code) => vec![codes.multimedia, code],
            Action::Key(code) => vec![codes.keyboard, code],
        };
        if bytes.len() > self.field_length {
            return Err(EncodeError::InvalidValue(format!(
                "{action:?} needs {} bytes per button, the device has {}",
                bytes.len(),
                self.field_length
            )));
        }
        Ok(bytes)
    }

    /// Split the value into `(button, action)` pairs and a layout name
    fn mapping(&self, value: &SettingValue) -> Result<(Vec<(String, String)>, String), EncodeError> {
        let mut pairs = Vec::new();
        let mut layout_name = DEFAULT_LAYOUT.to_string();

        match value {
            SettingValue::Text(text) if text.trim().eq_ignore_ascii_case("default") => {}
            SettingValue::Text(text) if is_param_expr(text) => {
                let expr = parse_params(text, &[])?;
                if expr.name != "buttons" {
                    return Err(EncodeError::MalformedParameterString(format!(
                        "expected buttons(...), got {}(...)",
                        expr.name
                    )));
                }
                for (key, value) in expr.values {
                    let ParamValue::Text(action) = value else {
                        continue;
                    };
                    if key == "layout" {
                        layout_name = action;
                    } else {
                        pairs.push((key, action));
                    }
                }
            }
            SettingValue::Map(map) => {
                for (key, value) in map {
                    let action = value.to_string();
                    if key.eq_ignore_ascii_case("layout") {
                        layout_name = action;
                    } else {
                        pairs.push((key.to_ascii_lowercase(), action));
                    }
                }
            }
            other => {
                return Err(EncodeError::MalformedParameterString(format!(
                    "expected buttons(...) or \"default\", got \"{other}\""
                )))
            }
        }
        Ok((pairs, layout_name))
    }

    pub fn encode(&self, value: &SettingValue) -> Result<Vec<u8>, EncodeError> {
        let (pairs, layout_name) = self.mapping(value)?;
        let keys = layout(&layout_name)?;

        for (name, _) in &pairs {
            if self.button(name).is_none() {
                return Err(EncodeError::UnknownButtonTarget(format!("button \"{name}\"")));
            }
        }

        let mut table = vec![0u8; self.table_length()];
        for button in &self.buttons {
            let action = pairs
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(&button.name))
                .map_or(button.default.as_str(), |(_, action)| action.as_str());
            let field = self.field(self.resolve(action, keys)?)?;

            let end = button.offset + field.len();
            let slot = table.get_mut(button.offset..end).ok_or_else(|| {
                EncodeError::InvalidValue(format!("{} lies outside the table", button.name))
            })?;
            slot.copy_from_slice(&field);
        }
        Ok(table)
    }
}
