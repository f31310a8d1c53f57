//! Persisted user settings
//!
//! Remembers the last value applied to each setting of each device, so the
//! CLI can show the current configuration (mice cannot report it back).
//! Stored as JSON, keyed by the `vvvv:pppp` device id:
//!
//! ```json
//! {
//!   "1038:1729": { "sensitivity1": 800, "color": "red" }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::value::SettingValue;

/// Settings file errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

type DeviceSettings = BTreeMap<String, SettingValue>;

/// JSON-backed store of last-applied values
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    devices: BTreeMap<String, DeviceSettings>,
}

impl SettingsStore {
    /// Get the default settings file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rivalcfg")
            .join("settings.json")
    }

    /// Open the store at `path`
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and also treated as empty; it is overwritten on the next save.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let devices = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring corrupt settings file {}: {e}", path.display());
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Cannot read settings file {}: {e}", path.display());
                BTreeMap::new()
            }
        };
        Self { path, devices }
    }

    /// Open the store at [`default_path`](Self::default_path)
    pub fn open_default() -> Self {
        Self::open(Self::default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last value recorded for a setting
    pub fn get(&self, device_id: &str, setting: &str) -> Option<&SettingValue> {
        self.devices.get(device_id)?.get(setting)
    }

    /// Every recorded value of one device, sorted by setting name
    pub fn device(&self, device_id: &str) -> Option<&BTreeMap<String, SettingValue>> {
        self.devices.get(device_id)
    }

    /// Record a value and write the file
    pub fn set(
        &mut self,
        device_id: &str,
        setting: &str,
        value: SettingValue,
    ) -> Result<(), SettingsError> {
        self.devices
            .entry(device_id.to_string())
            .or_default()
            .insert(setting.to_string(), value);
        self.save()
    }

    /// Forget everything recorded for a device and write the file
    pub fn clear_device(&mut self, device_id: &str) -> Result<(), SettingsError> {
        if self.devices.remove(device_id).is_some() {
            self.save()?;
        }
        Ok(())
    }

    /// Write the store to disk, creating the parent directory
    pub fn save(&self) -> Result<(), SettingsError> {
        let io_error = |source| SettingsError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = serde_json::to_string_pretty(&self.devices)?;
        std::fs::write(&self.path, content).map_err(io_error)?;
        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.json"));
        assert!(store.device("1038:1729").is_none());
    }

    #[test]
    fn test_set_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let mut store = SettingsStore::open(&path);
        store.set("1038:1729", "sensitivity1", 800.into()).unwrap();
        store.set("1038:1729", "color", "red".into()).unwrap();
        store.set("1038:1729", "sensitivity1", 1600.into()).unwrap();

        let reopened = SettingsStore::open(&path);
        assert_eq!(
            reopened.get("1038:1729", "sensitivity1"),
            Some(&SettingValue::Int(1600))
        );
        assert_eq!(
            reopened.get("1038:1729", "color"),
            Some(&SettingValue::from("red"))
        );
        assert_eq!(reopened.device("1038:1729").unwrap().len(), 2);
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ definitely not json").unwrap();

        let mut store = SettingsStore::open(&path);
        assert!(store.device("1038:1729").is_none());

        // And is replaced on the next write
        store.set("1038:1729", "color", "blue".into()).unwrap();
        assert!(SettingsStore::open(&path).get("1038:1729", "color").is_some());
    }

    #[test]
    fn test_clear_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = SettingsStore::open(&path);
        store.set("1038:1729", "color", "red".into()).unwrap();
        store.set("1038:1720", "color", "blue".into()).unwrap();
        store.clear_device("1038:1729").unwrap();

        let reopened = SettingsStore::open(&path);
        assert!(reopened.device("1038:1729").is_none());
        assert!(reopened.device("1038:1720").is_some());
    }

    #[test]
    fn test_default_path() {
        let path = SettingsStore::default_path();
        assert!(path.ends_with("rivalcfg/settings.json"));
    }
}
