// Profile registry
// Central registry for looking up device profiles by VID/PID or name

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing::{debug, warn};

use super::builtin;
use super::json::LoadError;
use super::types::{normalize_name, DeviceProfile};

/// Registry for device profiles
pub struct ProfileRegistry {
    /// Profiles in registration order
    profiles: Vec<Arc<DeviceProfile>>,
    /// Index into `profiles` by (VID, PID)
    by_vid_pid: HashMap<(u16, u16), usize>,
}

impl ProfileRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            profiles: Vec::new(),
            by_vid_pid: HashMap::new(),
        }
    }

    /// Create a registry with builtin profiles pre-loaded
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.load_builtins();
        registry
    }

    /// Load all builtin profiles
    pub fn load_builtins(&mut self) {
        for profile in builtin::all() {
            if let Err(e) = self.register(profile) {
                warn!("Skipping builtin profile: {e}");
            }
        }
    }

    /// Validate and register a profile
    ///
    /// A profile with the same VID/PID as an existing one replaces it, so
    /// JSON files can override the builtins.
    pub fn register(&mut self, profile: DeviceProfile) -> Result<(), LoadError> {
        profile.validate()?;

        let key = (profile.vendor_id, profile.product_id);
        let profile = Arc::new(profile);
        match self.by_vid_pid.get(&key) {
            Some(&index) => {
                debug!(
                    "Replacing profile {} with {}",
                    self.profiles[index].name, profile.name
                );
                self.profiles[index] = profile;
            }
            None => {
                self.by_vid_pid.insert(key, self.profiles.len());
                self.profiles.push(profile);
            }
        }
        Ok(())
    }

    /// Find profile by VID/PID
    pub fn find_by_vid_pid(&self, vid: u16, pid: u16) -> Option<Arc<DeviceProfile>> {
        self.by_vid_pid
            .get(&(vid, pid))
            .map(|&index| self.profiles[index].clone())
    }

    /// Find profile by short name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<Arc<DeviceProfile>> {
        let wanted = normalize_name(name);
        self.profiles
            .iter()
            .find(|p| normalize_name(&p.name) == wanted)
            .cloned()
    }

    /// Check if a VID/PID is registered
    pub fn has_vid_pid(&self, vid: u16, pid: u16) -> bool {
        self.by_vid_pid.contains_key(&(vid, pid))
    }

    /// (VID, PID, interface) of every profile, for device discovery
    pub fn all_devices(&self) -> Vec<(u16, u16, i32)> {
        self.profiles
            .iter()
            .map(|p| (p.vendor_id, p.product_id, p.interface_number))
            .collect()
    }

    /// Get all registered profiles, in registration order
    pub fn all_profiles(&self) -> Vec<Arc<DeviceProfile>> {
        self.profiles.clone()
    }

    /// Get the number of registered profiles
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Load a profile from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let profile = DeviceProfile::load_from_file(path)?;
        self.register(profile)
    }

    /// Load all JSON profiles from a directory
    ///
    /// Files that fail to load are logged and skipped. Returns the number
    /// of profiles loaded.
    pub fn load_from_directory<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize, LoadError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(LoadError::Io(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| LoadError::Io(e.to_string()))? {
            let entry = entry.map_err(|e| LoadError::Io(e.to_string()))?;
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                paths.push(path);
            }
        }
        // Deterministic override order
        paths.sort();

        let mut count = 0;
        for path in paths {
            match self.load_from_file(&path) {
                Ok(()) => count += 1,
                Err(e) => warn!("Failed to load profile from {}: {e}", path.display()),
            }
        }

        Ok(count)
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Global profile registry singleton
/// Use `profile_registry()` to access
static REGISTRY: OnceLock<ProfileRegistry> = OnceLock::new();

/// Get the global profile registry
/// Initializes with builtin profiles on first access
pub fn profile_registry() -> &'static ProfileRegistry {
    REGISTRY.get_or_init(ProfileRegistry::with_builtins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::SettingKind;

    #[test]
    fn test_registry_with_builtins() {
        let registry = ProfileRegistry::with_builtins();
        assert_eq!(registry.len(), builtin::all().len());

        let profile = registry.find_by_vid_pid(0x1038, 0x1729).unwrap();
        assert_eq!(profile.display_name, "SteelSeries Rival 110");

        assert!(registry.find_by_vid_pid(0x1038, 0xFFFF).is_none());
        assert!(registry.has_vid_pid(0x1038, 0x1720));
    }

    #[test]
    fn test_find_by_name() {
        let registry = ProfileRegistry::with_builtins();
        assert_eq!(
            registry.find_by_name("Sensei310").unwrap().product_id,
            0x1722
        );
        assert!(registry.find_by_name("rival9000").is_none());
    }

    #[test]
    fn test_register_replaces_same_vid_pid() {
        let mut registry = ProfileRegistry::with_builtins();
        let before = registry.len();

        let mut profile = builtin::rival110();
        profile.display_name = "Custom Rival 110".into();
        registry.register(profile).unwrap();

        assert_eq!(registry.len(), before);
        assert_eq!(
            registry.find_by_vid_pid(0x1038, 0x1729).unwrap().display_name,
            "Custom Rival 110"
        );
    }

    #[test]
    fn test_register_rejects_invalid() {
        let mut registry = ProfileRegistry::new();
        let mut profile = builtin::rival110();
        profile.settings[0].kind = SettingKind::Rgbcolor;
        profile.settings[0].default = None;
        assert!(registry.register(profile).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_load_from_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = builtin::prime().to_json().unwrap();
        std::fs::write(dir.path().join("prime.json"), good).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut registry = ProfileRegistry::new();
        assert_eq!(registry.load_from_directory(dir.path()).unwrap(), 1);
        assert_eq!(registry.find_by_name("prime").unwrap().product_id, 0x182E);
    }

    #[test]
    fn test_load_from_missing_directory() {
        let mut registry = ProfileRegistry::new();
        assert!(matches!(
            registry.load_from_directory("/nonexistent/profiles"),
            Err(LoadError::Io(_))
        ));
    }

    #[test]
    fn test_global_registry() {
        assert!(!profile_registry().is_empty());
    }
}
