//! Device session
//!
//! A [`Mouse`] owns one transport and one profile. Every setting goes
//! through the same path:
//!
//! ```text
//! name → descriptor → SettingKind::encode → command ++ payload ++ suffix
//!      → zero pad → transport write → optional read back
//! ```

use std::sync::Arc;

use rivalcfg_transport::{BoxedTransport, DiscoveredDevice, HidDiscovery, ReportType, Transport};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::profile::{CommandSpec, DeviceProfile, ProfileRegistry, SettingDescriptor};
use crate::settings::SettingsStore;
use crate::value::SettingValue;

/// Format bytes as space-separated hex for logs
pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Attached devices that have a profile in `registry`
pub fn find_mice(
    discovery: &HidDiscovery,
    registry: &ProfileRegistry,
) -> Result<Vec<(DiscoveredDevice, Arc<DeviceProfile>)>> {
    let devices = discovery.list_devices()?;
    Ok(devices
        .into_iter()
        .filter_map(|device| {
            let profile = registry.find_by_vid_pid(device.info.vid, device.info.pid)?;
            debug!("{} matches {}", device.info.device_path, profile.name);
            Some((device, profile))
        })
        .collect())
}

/// Battery state reported by wireless devices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatus {
    /// Charge in percent
    pub level: u8,
    pub charging: bool,
}

impl BatteryStatus {
    /// Decode a status byte: bit 7 is the charging flag, bits 0-6 the level
    pub fn from_byte(raw: u8) -> Self {
        Self {
            level: (raw & 0x7F).min(100),
            charging: raw & 0x80 != 0,
        }
    }
}

/// An open mouse
pub struct Mouse<T: Transport = BoxedTransport> {
    profile: Arc<DeviceProfile>,
    /// `None` once closed
    transport: Option<T>,
    store: Option<SettingsStore>,
}

impl<T: Transport> Mouse<T> {
    /// Start a session on an opened transport
    ///
    /// The profile is validated first; a profile that fails validation
    /// releases the transport and returns [`Error::Profile`].
    pub fn open(profile: Arc<DeviceProfile>, mut transport: T) -> Result<Self> {
        if let Err(e) = profile.validate() {
            if let Err(close_err) = transport.close() {
                debug!("Error closing {} after a bad profile: {close_err}", profile.name);
            }
            return Err(e.into());
        }

        let info = transport.device_info();
        if (info.vid, info.pid) != (profile.vendor_id, profile.product_id) {
            warn!(
                "Profile {} is for {} but the device is {}",
                profile.name,
                profile.id_string(),
                info.id_string()
            );
        }
        info!(
            "Opened {} ({}) at {}",
            profile.display_name,
            profile.id_string(),
            info.device_path
        );
        Ok(Self {
            profile,
            transport: Some(transport),
            store: None,
        })
    }

    /// Record every successful set in `store`
    pub fn with_settings_store(mut self, store: SettingsStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn settings_store(&self) -> Option<&SettingsStore> {
        self.store.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    fn transport(&mut self) -> Result<&mut T> {
        self.transport.as_mut().ok_or(Error::DeviceClosed)
    }

    fn descriptor(&self, name: &str) -> Result<&SettingDescriptor> {
        self.profile
            .setting(name)
            .ok_or_else(|| Error::UnknownSetting(name.to_string()))
    }

    /// Write one packet, then read `readback_length` bytes if non-zero
    fn transfer(
        &mut self,
        what: &str,
        report_id: u8,
        report_type: ReportType,
        packet: &[u8],
        readback_length: usize,
    ) -> Result<Option<Vec<u8>>> {
        let transport = self.transport()?;
        debug!("{what}: {report_type} report {report_id}: {}", hex(packet));
        transport.write(report_id, report_type, packet)?;

        if readback_length == 0 {
            return Ok(None);
        }
        let response = transport.read(readback_length)?;
        debug!("{what}: read {}", hex(&response));
        Ok(Some(response))
    }

    /// Apply a setting
    ///
    /// Returns the bytes read back when the setting asks for a response.
    ///
    /// Recording the value in the settings store is best effort: once the
    /// device has accepted the packet, a store write failure is logged and
    /// the call still succeeds.
    pub fn set(&mut self, name: &str, value: impl Into<SettingValue>) -> Result<Option<Vec<u8>>> {
        if self.is_closed() {
            return Err(Error::DeviceClosed);
        }
        let value = value.into();
        let descriptor = self.descriptor(name)?.clone();

        let encoded = descriptor
            .kind
            .encode_with_metadata(&value)
            .map_err(|e| Error::encode(&descriptor.name, e))?;
        if let Some(cpi) = encoded.cpi {
            debug!("{}: {} CPI presets", descriptor.name, cpi.cpi_count);
        }

        let packet = descriptor.frame(&encoded.payload);
        let response = self.transfer(
            &descriptor.name,
            descriptor.report_id,
            descriptor.report_type,
            &packet,
            descriptor.readback_length,
        )?;

        let device_id = self.profile.id_string();
        if let Some(store) = self.store.as_mut() {
            if let Err(e) = store.set(&device_id, &descriptor.name, value) {
                warn!("Could not record {}: {e}", descriptor.name);
            }
        }
        Ok(response)
    }

    /// Apply a setting's factory default
    pub fn set_default(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        let descriptor = self.descriptor(name)?;
        let default = descriptor
            .default
            .clone()
            .ok_or_else(|| Error::NoDefault(descriptor.name.clone()))?;
        let name = descriptor.name.clone();
        self.set(&name, default)
    }

    /// Apply every default, in declaration order
    pub fn reset_settings(&mut self) -> Result<()> {
        if self.is_closed() {
            return Err(Error::DeviceClosed);
        }
        info!("Resetting {} to defaults", self.profile.display_name);

        let device_id = self.profile.id_string();
        if let Some(store) = self.store.as_mut() {
            store.clear_device(&device_id)?;
        }

        let defaults: Vec<(String, SettingValue)> = self
            .profile
            .settings
            .iter()
            .filter(|s| s.kind.takes_value())
            .filter_map(|s| Some((s.name.clone(), s.default.clone()?)))
            .collect();
        for (name, value) in defaults {
            self.set(&name, value)?;
        }
        Ok(())
    }

    fn command(&mut self, what: &str, command: Option<CommandSpec>) -> Result<Option<Vec<u8>>> {
        if self.is_closed() {
            return Err(Error::DeviceClosed);
        }
        let command = command.ok_or_else(|| Error::NotSupported(what.to_string()))?;
        self.transfer(
            what,
            command.report_id,
            command.report_type,
            &command.frame(),
            command.readback_length,
        )
    }

    /// Persist the current settings in the device memory
    pub fn save(&mut self) -> Result<()> {
        let command = self.profile.save_command.clone();
        self.command("save", command)?;
        info!("Saved settings to {}", self.profile.display_name);
        Ok(())
    }

    /// Firmware version as dotted decimal, e.g. `1.4`
    pub fn firmware_version(&mut self) -> Result<String> {
        let command = self.profile.firmware_version.clone();
        let response = self
            .command("firmware version", command)?
            .ok_or_else(|| Error::NotSupported("firmware version".into()))?;
        Ok(response
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join("."))
    }

    /// Battery level and charging state
    ///
    /// The status is the last byte of the response.
    pub fn battery_level(&mut self) -> Result<BatteryStatus> {
        let command = self.profile.battery_level.clone();
        let response = self
            .command("battery level", command)?
            .unwrap_or_default();
        response
            .last()
            .map(|&raw| BatteryStatus::from_byte(raw))
            .ok_or_else(|| Error::NotSupported("battery level".into()))
    }

    /// Release the device
    ///
    /// Closing twice is a no-op; any other call after closing fails with
    /// [`Error::DeviceClosed`].
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut transport) = self.transport.take() {
            transport.close()?;
            info!("Closed {}", self.profile.display_name);
        }
        Ok(())
    }
}

impl<T: Transport> Drop for Mouse<T> {
    fn drop(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close() {
                debug!("Error closing {} on drop: {e}", self.profile.display_name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rivalcfg_transport::MockTransport;

    use super::*;
    use crate::profile::builtin;

    fn rival110() -> (Mouse<MockTransport>, rivalcfg_transport::MockHandle) {
        let transport = MockTransport::new(0x1038, 0x1729);
        let handle = transport.handle();
        let mouse = Mouse::open(Arc::new(builtin::rival110()), transport).unwrap();
        (mouse, handle)
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x03, 0x01, 0xA7]), "03 01 A7");
        assert_eq!(hex(&[]), "");
    }

    #[test]
    fn test_battery_byte() {
        assert_eq!(
            BatteryStatus::from_byte(0x80 | 42),
            BatteryStatus {
                level: 42,
                charging: true
            }
        );
        assert_eq!(BatteryStatus::from_byte(0x7F).level, 100);
    }

    #[test]
    fn test_set_frames_packet() {
        let (mut mouse, handle) = rival110();
        assert_eq!(mouse.set("sensitivity1", 800).unwrap(), None);
        assert_eq!(handle.payloads(), vec![vec![0x03, 0x01, 0x11]]);
    }

    #[test]
    fn test_unknown_setting() {
        let (mut mouse, handle) = rival110();
        assert!(matches!(
            mouse.set("turbo", "on"),
            Err(Error::UnknownSetting(_))
        ));
        assert!(handle.writes().is_empty());
    }

    #[test]
    fn test_encode_error_names_setting() {
        let (mut mouse, handle) = rival110();
        match mouse.set("color", "blurple") {
            Err(Error::Encode { setting, .. }) => assert_eq!(setting, "color"),
            other => panic!("unexpected {other:?}"),
        }
        assert!(handle.writes().is_empty());
    }

    #[test]
    fn test_closed_session() {
        let (mut mouse, handle) = rival110();
        mouse.close().unwrap();
        mouse.close().unwrap();
        assert_eq!(handle.close_count(), 1);
        assert!(matches!(mouse.set("color", "red"), Err(Error::DeviceClosed)));
        assert!(matches!(mouse.save(), Err(Error::DeviceClosed)));
        drop(mouse);
        assert_eq!(handle.close_count(), 1);
    }

    #[test]
    fn test_drop_closes() {
        let (mouse, handle) = rival110();
        drop(mouse);
        assert!(handle.is_closed());
        assert_eq!(handle.close_count(), 1);
    }

    #[test]
    fn test_firmware_version() {
        let (mut mouse, handle) = rival110();
        handle.push_read(vec![1, 4]);
        assert_eq!(mouse.firmware_version().unwrap(), "1.4");
        assert_eq!(handle.payloads(), vec![vec![0x10]]);
    }

    #[test]
    fn test_open_rejects_invalid_profile() {
        let mut profile = builtin::rival110();
        profile.settings.clear();
        let transport = MockTransport::new(0x1038, 0x1729);
        let handle = transport.handle();

        assert!(matches!(
            Mouse::open(Arc::new(profile), transport),
            Err(Error::Profile(_))
        ));
        assert_eq!(handle.close_count(), 1);
        assert!(handle.writes().is_empty());
    }

    #[test]
    fn test_queries_on_closed_mouse() {
        let (mut mouse, _handle) = rival110();
        mouse.close().unwrap();
        // rival110 has no battery command, closed still wins
        assert!(matches!(mouse.battery_level(), Err(Error::DeviceClosed)));
        assert!(matches!(mouse.firmware_version(), Err(Error::DeviceClosed)));
        assert!(matches!(mouse.save(), Err(Error::DeviceClosed)));
    }

    #[test]
    fn test_store_failure_does_not_fail_set() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the store expects a directory
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let store = SettingsStore::open(blocker.join("settings.json"));

        let (mouse, handle) = rival110();
        let mut mouse = mouse.with_settings_store(store);
        assert_eq!(mouse.set("sensitivity1", 800).unwrap(), None);
        assert_eq!(handle.payloads(), vec![vec![0x03, 0x01, 0x11]]);
    }

    #[test]
    fn test_battery_not_supported() {
        let (mut mouse, handle) = rival110();
        assert!(matches!(mouse.battery_level(), Err(Error::NotSupported(_))));
        assert!(handle.writes().is_empty());
    }
}
