//! Transport error types

use thiserror::Error;

/// Errors that can occur during transport operations
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected")]
    Disconnected,

    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    // HID-specific errors
    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            TransportError::HidPermissionDenied(msg)
        } else {
            TransportError::HidError(msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every variant, each with a distinct message
    fn all_variants() -> Vec<TransportError> {
        vec![
            TransportError::DeviceNotFound("1038:1729".into()),
            TransportError::Disconnected,
            TransportError::ShortRead {
                expected: 2,
                actual: 0,
            },
            TransportError::HidError("timeout".into()),
            TransportError::HidPermissionDenied("/dev/hidraw3".into()),
        ]
    }

    #[test]
    fn test_messages() {
        let messages: Vec<String> = all_variants().iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            [
                "Device not found: 1038:1729",
                "Device disconnected",
                "Short read: expected 2 bytes, got 0",
                "HID error: timeout",
                "HID permission denied: /dev/hidraw3",
            ]
        );
        // Exhaustive: a new variant has to be added above
        for error in all_variants() {
            match error {
                TransportError::DeviceNotFound(_)
                | TransportError::Disconnected
                | TransportError::ShortRead { .. }
                | TransportError::HidError(_)
                | TransportError::HidPermissionDenied(_) => {}
            }
        }
    }
}
