//! Device discovery for supported mice

use hidapi::HidApi;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::hid::HidTransport;
use crate::types::{DiscoveredDevice, TransportDeviceInfo};

/// HID device discovery
///
/// Matches attached devices against a list of `(vid, pid, interface)`
/// triples. Mice expose several HID interfaces; only the control interface
/// accepts configuration reports.
pub struct HidDiscovery {
    /// Known VID/PID/interface triples to look for
    known_devices: Vec<(u16, u16, i32)>,
}

impl HidDiscovery {
    /// Create a discovery instance for the given devices
    pub fn new(known_devices: Vec<(u16, u16, i32)>) -> Self {
        Self { known_devices }
    }

    /// Add a VID/PID/interface triple to discover
    pub fn add_device(&mut self, vid: u16, pid: u16, interface: i32) {
        if !self.known_devices.contains(&(vid, pid, interface)) {
            self.known_devices.push((vid, pid, interface));
        }
    }

    /// Check if a device matches our known devices
    fn is_known_device(&self, vid: u16, pid: u16, interface: i32) -> bool {
        self.known_devices.contains(&(vid, pid, interface))
    }

    /// List currently attached known devices
    pub fn list_devices(&self) -> Result<Vec<DiscoveredDevice>, TransportError> {
        let api = HidApi::new()?;
        let mut devices = Vec::new();

        for device_info in api.device_list() {
            let vid = device_info.vendor_id();
            let pid = device_info.product_id();
            let interface = device_info.interface_number();

            if !self.is_known_device(vid, pid, interface) {
                continue;
            }

            let path = device_info.path().to_string_lossy().to_string();
            debug!(
                "Found device: VID={:04X} PID={:04X} interface={} path={}",
                vid, pid, interface, path
            );

            devices.push(DiscoveredDevice {
                info: TransportDeviceInfo {
                    vid,
                    pid,
                    interface,
                    device_path: path,
                    product_name: device_info.product_string().map(|s| s.to_string()),
                },
            });
        }

        info!("Found {} devices", devices.len());
        Ok(devices)
    }

    /// Open a specific device
    pub fn open_device(&self, device: &DiscoveredDevice) -> Result<HidTransport, TransportError> {
        let api = HidApi::new()?;

        let hid_info = api
            .device_list()
            .find(|d| d.path().to_string_lossy() == device.info.device_path)
            .ok_or_else(|| {
                TransportError::DeviceNotFound(format!(
                    "{:04X}:{:04X} at {}",
                    device.info.vid, device.info.pid, device.info.device_path
                ))
            })?;

        let hid_device = hid_info.open_device(&api)?;

        info!(
            "Opened transport for {:04X}:{:04X} (interface {})",
            device.info.vid, device.info.pid, device.info.interface
        );

        Ok(HidTransport::new(hid_device, device.info.clone()))
    }

    /// Open the first attached known device
    pub fn open_first(&self) -> Result<HidTransport, TransportError> {
        let devices = self.list_devices()?;
        let first = devices.first().ok_or_else(|| {
            TransportError::DeviceNotFound("No supported device found".into())
        })?;
        self.open_device(first)
    }
}
