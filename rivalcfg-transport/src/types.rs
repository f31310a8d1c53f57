//! Common types for transport layer

use std::fmt;

use serde::{Deserialize, Serialize};

/// HID report kind used to carry a command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    /// Output report written on the interrupt/control pipe
    #[default]
    Output,
    /// Feature report (SET_REPORT on the control pipe)
    Feature,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output => write!(f, "output"),
            Self::Feature => write!(f, "feature"),
        }
    }
}

/// Device identification information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportDeviceInfo {
    /// USB Vendor ID
    pub vid: u16,
    /// USB Product ID
    pub pid: u16,
    /// USB interface number the transport is bound to
    pub interface: i32,
    /// Device path or identifier (transport-specific)
    pub device_path: String,
    /// Product name if available
    pub product_name: Option<String>,
}

impl TransportDeviceInfo {
    /// `vvvv:pppp` identifier, lowercase hex
    pub fn id_string(&self) -> String {
        format!("{:04x}:{:04x}", self.vid, self.pid)
    }
}

/// Device found during enumeration that can be opened
#[derive(Debug, Clone)]
pub struct DiscoveredDevice {
    /// Device information
    pub info: TransportDeviceInfo,
}
