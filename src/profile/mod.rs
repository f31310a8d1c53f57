// Device profile module
// Declarative description of each supported mouse: identity and settings

pub mod builtin;
pub mod json;
pub mod registry;
pub mod types;

pub use builtin::STEELSERIES_VID;
pub use json::LoadError;
pub use registry::{profile_registry, ProfileRegistry};
pub use types::{CommandSpec, DeviceProfile, SettingDescriptor};
