// rivalcfg - SteelSeries mouse configuration library
// Value encoding, device profiles and the device session

pub mod color;
pub mod error;
pub mod handlers;
pub mod mouse;
pub mod params;
pub mod profile;
pub mod settings;
pub mod value;

pub use error::{EncodeError, Error, Result};
pub use handlers::SettingKind;
pub use mouse::{BatteryStatus, Mouse};
pub use profile::{profile_registry, DeviceProfile, ProfileRegistry, SettingDescriptor};
pub use settings::SettingsStore;
pub use value::SettingValue;
