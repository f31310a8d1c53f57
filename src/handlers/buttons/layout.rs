//! Keyboard layouts and the multimedia key table
//!
//! QWERTY is the base table of HID usage codes. Other layouts are a list of
//! overrides `label → qwerty key`: the key printed `a` on an AZERTY board
//! sits where QWERTY has `q`, so it sends the usage of `q`.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::EncodeError;

/// Layout used when a buttons expression does not name one
pub const DEFAULT_LAYOUT: &str = "qwerty";

/// HID keyboard usage codes, QWERTY labels
#[rustfmt::skip]
const QWERTY: &[(&str, u8)] = &[
    ("a", 0x04), ("b", 0x05), ("c", 0x06), ("d", 0x07),
    ("e", 0x08), ("f", 0x09), ("g", 0x0A), ("h", 0x0B),
    ("i", 0x0C), ("j", 0x0D), ("k", 0x0E), ("l", 0x0F),
    ("m", 0x10), ("n", 0x11), ("o", 0x12), ("p", 0x13),
    ("q", 0x14), ("r", 0x15), ("s", 0x16), ("t", 0x17),
    ("u", 0x18), ("v", 0x19), ("w", 0x1A), ("x", 0x1B),
    ("y", 0x1C), ("z", 0x1D),
    ("1", 0x1E), ("2", 0x1F), ("3", 0x20), ("4", 0x21),
    ("5", 0x22), ("6", 0x23), ("7", 0x24), ("8", 0x25),
    ("9", 0x26), ("0", 0x27),
    ("enter", 0x28), ("escape", 0x29), ("backspace", 0x2A),
    ("tab", 0x2B), ("space", 0x2C), ("minus", 0x2D), ("equal", 0x2E),
    ("leftbracket", 0x2F), ("rightbracket", 0x30), ("backslash", 0x31),
    ("semicolon", 0x33), ("quote", 0x34), ("backtick", 0x35),
    ("comma", 0x36), ("dot", 0x37), ("slash", 0x38), ("capslock", 0x39),
    ("f1", 0x3A), ("f2", 0x3B), ("f3", 0x3C), ("f4", 0x3D),
    ("f5", 0x3E), ("f6", 0x3F), ("f7", 0x40), ("f8", 0x41),
    ("f9", 0x42), ("f10", 0x43), ("f11", 0x44), ("f12", 0x45),
    ("printscreen", 0x46), ("scrolllock", 0x47), ("pause", 0x48),
    ("insert", 0x49), ("home", 0x4A), ("pageup", 0x4B),
    ("delete", 0x4C), ("end", 0x4D), ("pagedown", 0x4E),
    ("right", 0x4F), ("left", 0x50), ("down", 0x51), ("up", 0x52),
    ("numlock", 0x53), ("keypad_divide", 0x54), ("keypad_multiply", 0x55),
    ("keypad_minus", 0x56), ("keypad_plus", 0x57), ("keypad_enter", 0x58),
    ("keypad_1", 0x59), ("keypad_2", 0x5A), ("keypad_3", 0x5B),
    ("keypad_4", 0x5C), ("keypad_5", 0x5D), ("keypad_6", 0x5E),
    ("keypad_7", 0x5F), ("keypad_8", 0x60), ("keypad_9", 0x61),
    ("keypad_0", 0x62), ("keypad_dot", 0x63),
    ("nonus_backslash", 0x64), ("menu", 0x65),
    ("f13", 0x68), ("f14", 0x69), ("f15", 0x6A), ("f16", 0x6B),
    ("f17", 0x6C), ("f18", 0x6D), ("f19", 0x6E), ("f20", 0x6F),
    ("f21", 0x70), ("f22", 0x71), ("f23", 0x72), ("f24", 0x73),
    ("leftctrl", 0xE0), ("leftshift", 0xE1), ("leftalt", 0xE2), ("leftsuper", 0xE3),
    ("rightctrl", 0xE4), ("rightshift", 0xE5), ("rightalt", 0xE6), ("rightsuper", 0xE7),
];

/// Alternative spellings accepted for QWERTY keys
const ALIASES: &[(&str, &str)] = &[
    ("esc", "escape"),
    ("return", "enter"),
    ("del", "delete"),
    ("ins", "insert"),
    ("pgup", "pageup"),
    ("pgdn", "pagedown"),
    ("-", "minus"),
    ("=", "equal"),
    ("[", "leftbracket"),
    ("]", "rightbracket"),
    ("\\", "backslash"),
    (";", "semicolon"),
    ("'", "quote"),
    ("`", "backtick"),
    (",", "comma"),
    (".", "dot"),
    ("/", "slash"),
    ("ctrl", "leftctrl"),
    ("shift", "leftshift"),
    ("alt", "leftalt"),
    ("super", "leftsuper"),
    ("altgr", "rightalt"),
];

#[rustfmt::skip]
const AZERTY: &[(&str, &str)] = &[
    ("a", "q"), ("q", "a"), ("z", "w"), ("w", "z"),
    ("m", "semicolon"), ("comma", "m"), ("semicolon", "comma"),
    ("colon", "dot"), ("exclamation", "slash"), ("ugrave", "quote"),
    ("caret", "leftbracket"), ("dollar", "rightbracket"),
    ("asterisk", "backslash"), ("rightparenthesis", "minus"),
    ("superscript_two", "backtick"),
    (",", "m"), (";", "comma"), (":", "dot"), ("!", "slash"),
];

#[rustfmt::skip]
const QWERTZ: &[(&str, &str)] = &[
    ("y", "z"), ("z", "y"),
    ("sharp_s", "minus"), ("acute", "equal"),
    ("udiaeresis", "leftbracket"), ("plus", "rightbracket"),
    ("odiaeresis", "semicolon"), ("adiaeresis", "quote"),
    ("hash", "backslash"), ("minus", "slash"), ("caret", "backtick"),
    ("+", "rightbracket"), ("#", "backslash"), ("-", "slash"),
];

/// Consumer-page usages for media keys
const MULTIMEDIA: &[(&str, u8)] = &[
    ("playpause", 0xCD),
    ("stop", 0xB7),
    ("next", 0xB5),
    ("previous", 0xB6),
    ("mute", 0xE2),
    ("volumeup", 0xE9),
    ("volumedown", 0xEA),
];

const MULTIMEDIA_ALIASES: &[(&str, &str)] = &[
    ("play", "playpause"),
    ("nexttrack", "next"),
    ("prev", "previous"),
    ("previoustrack", "previous"),
    ("volup", "volumeup"),
    ("voldown", "volumedown"),
];

/// A resolved keyboard layout
#[derive(Debug, Clone)]
pub struct KeyboardLayout {
    pub name: &'static str,
    keys: HashMap<String, u8>,
}

impl KeyboardLayout {
    /// HID usage for a key label (case-insensitive)
    pub fn keycode(&self, key: &str) -> Option<u8> {
        self.keys.get(&key.to_ascii_lowercase()).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

fn qwerty_keys() -> HashMap<String, u8> {
    let mut keys: HashMap<String, u8> = QWERTY
        .iter()
        .map(|(name, code)| (name.to_string(), *code))
        .collect();
    for (alias, target) in ALIASES {
        if let Some(code) = keys.get(*target).copied() {
            keys.insert(alias.to_string(), code);
        }
    }
    keys
}

/// Build a layout from QWERTY plus overrides
///
/// Override targets are looked up in the base table only, so swaps like
/// `a ↔ q` do not chain.
pub(crate) fn build_layout(
    name: &'static str,
    overrides: &[(&str, &str)],
) -> Result<KeyboardLayout, EncodeError> {
    let base = qwerty_keys();
    let mut keys = base.clone();
    for (alias, target) in overrides {
        let code = base.get(*target).copied().ok_or_else(|| EncodeError::BadLayoutAlias {
            layout: name.to_string(),
            alias: alias.to_string(),
            target: target.to_string(),
        })?;
        keys.insert(alias.to_string(), code);
    }
    Ok(KeyboardLayout { name, keys })
}

fn build_all() -> Result<Vec<KeyboardLayout>, EncodeError> {
    Ok(vec![
        build_layout("qwerty", &[])?,
        build_layout("azerty", AZERTY)?,
        build_layout("qwertz", QWERTZ)?,
    ])
}

static LAYOUTS: OnceLock<Result<Vec<KeyboardLayout>, EncodeError>> = OnceLock::new();

fn layouts() -> Result<&'static [KeyboardLayout], EncodeError> {
    LAYOUTS
        .get_or_init(build_all)
        .as_ref()
        .map(Vec::as_slice)
        .map_err(Clone::clone)
}

/// Check that every built-in layout resolves
pub fn check_layouts() -> Result<(), EncodeError> {
    layouts().map(|_| ())
}

/// Names of the built-in layouts
pub fn layout_names() -> Vec<&'static str> {
    layouts()
        .map(|all| all.iter().map(|l| l.name).collect())
        .unwrap_or_default()
}

/// Look up a layout by name (case-insensitive)
pub fn layout(name: &str) -> Result<&'static KeyboardLayout, EncodeError> {
    layouts()?
        .iter()
        .find(|l| l.name.eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| EncodeError::UnknownButtonTarget(format!("layout \"{}\"", name.trim())))
}

/// Consumer usage for a media key name (case-insensitive)
pub fn multimedia_code(name: &str) -> Option<u8> {
    let name = name.to_ascii_lowercase();
    let name = MULTIMEDIA_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name.as_str(), |(_, target)| *target);
    MULTIMEDIA
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, code)| *code)
}
