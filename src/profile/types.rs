// Profile data types
// A device profile is the device identity plus an ordered list of settings

use rivalcfg_transport::ReportType;
use serde::{Deserialize, Serialize};

use super::json::LoadError;
use crate::handlers::SettingKind;
use crate::value::SettingValue;

/// One configurable setting of a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingDescriptor {
    /// Key used by [`Mouse::set`](crate::mouse::Mouse::set)
    pub name: String,
    /// Short human label
    #[serde(default)]
    pub label: String,
    /// Help text
    #[serde(default)]
    pub description: String,
    /// Command-line flags, e.g. `["-s", "--sensitivity"]`
    #[serde(default)]
    pub cli: Vec<String>,
    /// Opcode bytes sent before the payload
    pub command: Vec<u8>,
    /// Bytes sent after the payload
    #[serde(default, alias = "command_suffix", skip_serializing_if = "Vec::is_empty")]
    pub suffix: Vec<u8>,
    #[serde(default)]
    pub report_type: ReportType,
    #[serde(default)]
    pub report_id: u8,
    /// Zero-pad the packet to this size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_length: Option<usize>,
    /// Bytes to read back after writing (0 = none)
    #[serde(default)]
    pub readback_length: usize,
    /// Factory value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SettingValue>,
    #[serde(flatten)]
    pub kind: SettingKind,
}

impl SettingDescriptor {
    /// Descriptor with an output report and no suffix, padding or default
    pub fn new(name: &str, command: &[u8], kind: SettingKind) -> Self {
        Self {
            name: name.to_string(),
            label: String::new(),
            description: String::new(),
            cli: Vec::new(),
            command: command.to_vec(),
            suffix: Vec::new(),
            report_type: ReportType::Output,
            report_id: 0,
            packet_length: None,
            readback_length: 0,
            default: None,
            kind,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn cli(mut self, flags: &[&str]) -> Self {
        self.cli = flags.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn suffix(mut self, suffix: &[u8]) -> Self {
        self.suffix = suffix.to_vec();
        self
    }

    pub fn report_type(mut self, report_type: ReportType) -> Self {
        self.report_type = report_type;
        self
    }

    pub fn packet_length(mut self, length: usize) -> Self {
        self.packet_length = Some(length);
        self
    }

    pub fn readback_length(mut self, length: usize) -> Self {
        self.readback_length = length;
        self
    }

    pub fn default_value(mut self, value: impl Into<SettingValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Frame a payload: `command ++ payload ++ suffix`, zero padded
    pub fn frame(&self, payload: &[u8]) -> Vec<u8> {
        let mut packet =
            Vec::with_capacity(self.command.len() + payload.len() + self.suffix.len());
        packet.extend_from_slice(&self.command);
        packet.extend_from_slice(payload);
        packet.extend_from_slice(&self.suffix);
        if let Some(length) = self.packet_length {
            if packet.len() < length {
                packet.resize(length, 0x00);
            }
        }
        packet
    }
}

/// A command that is not a setting (save, queries)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub command: Vec<u8>,
    #[serde(default)]
    pub report_type: ReportType,
    #[serde(default)]
    pub report_id: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packet_length: Option<usize>,
    #[serde(default)]
    pub readback_length: usize,
}

impl CommandSpec {
    pub fn new(command: &[u8]) -> Self {
        Self {
            command: command.to_vec(),
            report_type: ReportType::Output,
            report_id: 0,
            packet_length: None,
            readback_length: 0,
        }
    }

    pub fn report_type(mut self, report_type: ReportType) -> Self {
        self.report_type = report_type;
        self
    }

    pub fn readback_length(mut self, length: usize) -> Self {
        self.readback_length = length;
        self
    }

    /// The command bytes, zero padded
    pub fn frame(&self) -> Vec<u8> {
        let mut packet = self.command.clone();
        if let Some(length) = self.packet_length {
            if packet.len() < length {
                packet.resize(length, 0x00);
            }
        }
        packet
    }
}

fn default_interface() -> i32 {
    0
}

/// Everything needed to find and drive one mouse model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Short identifier (lowercase, no spaces)
    pub name: String,
    /// Product name shown to users
    pub display_name: String,
    pub vendor_id: u16,
    pub product_id: u16,
    /// USB interface the commands go to
    #[serde(default = "default_interface")]
    pub interface_number: i32,
    pub settings: Vec<SettingDescriptor>,
    /// Persist the current settings in the device memory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_command: Option<CommandSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firmware_version: Option<CommandSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_level: Option<CommandSpec>,
}

impl DeviceProfile {
    /// Look up a setting by name (case-insensitive, `-` and `_` equivalent)
    pub fn setting(&self, name: &str) -> Option<&SettingDescriptor> {
        let wanted = normalize_name(name);
        self.settings
            .iter()
            .find(|s| normalize_name(&s.name) == wanted)
    }

    /// `vvvv:pppp` identifier, lowercase hex
    pub fn id_string(&self) -> String {
        format!("{:04x}:{:04x}", self.vendor_id, self.product_id)
    }

    /// Check the profile for authoring errors
    pub fn validate(&self) -> Result<(), LoadError> {
        if self.settings.is_empty() {
            return Err(LoadError::Validation(format!(
                "{}: profile has no settings",
                self.name
            )));
        }

        for (i, setting) in self.settings.iter().enumerate() {
            let context = |reason: String| {
                LoadError::Validation(format!("{}: setting \"{}\": {reason}", self.name, setting.name))
            };

            if self.settings[..i]
                .iter()
                .any(|s| normalize_name(&s.name) == normalize_name(&setting.name))
            {
                return Err(context("declared twice".into()));
            }
            if setting.command.is_empty() {
                return Err(context("empty command".into()));
            }

            setting
                .kind
                .validate()
                .map_err(|e| LoadError::Setting {
                    setting: setting.name.clone(),
                    source: e,
                })?;

            match (&setting.default, setting.kind.takes_value()) {
                (Some(default), true) => {
                    let payload = setting.kind.encode(default).map_err(|e| LoadError::Setting {
                        setting: setting.name.clone(),
                        source: e,
                    })?;
                    if let Some(length) = setting.packet_length {
                        let framed = setting.command.len() + payload.len() + setting.suffix.len();
                        if framed > length {
                            return Err(context(format!(
                                "{framed} byte packet exceeds packet_length {length}"
                            )));
                        }
                    }
                }
                (None, true) => return Err(context("no default value".into())),
                (_, false) => {}
            }
        }
        Ok(())
    }
}

/// Lowercase with `-` folded into `_`
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}
