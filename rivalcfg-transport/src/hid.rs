//! HID transport implementation for a directly connected USB mouse

use hidapi::HidDevice;
use tracing::debug;

use crate::error::TransportError;
use crate::types::{ReportType, TransportDeviceInfo};
use crate::Transport;

/// Default timeout for read-back requests (ms)
pub const DEFAULT_READ_TIMEOUT_MS: i32 = 200;

/// HID transport bound to the mouse's control interface
///
/// Output reports go through `hid_write`, feature reports through
/// `hid_send_feature_report`. Both are prefixed with the report ID as
/// hidapi expects.
pub struct HidTransport {
    /// `None` once closed
    device: Option<HidDevice>,
    /// Device information
    info: TransportDeviceInfo,
    /// Timeout for reads (ms)
    read_timeout_ms: i32,
}

impl HidTransport {
    /// Create a new transport from an opened HID device
    pub fn new(device: HidDevice, info: TransportDeviceInfo) -> Self {
        Self {
            device: Some(device),
            info,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }

    /// Set timeout for read-back requests
    pub fn set_read_timeout(&mut self, ms: i32) {
        self.read_timeout_ms = ms;
    }

    fn device(&self) -> Result<&HidDevice, TransportError> {
        self.device.as_ref().ok_or(TransportError::Disconnected)
    }
}

/// Prefix the payload with the report ID
fn build_report(report_id: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload.len() + 1);
    buf.push(report_id);
    buf.extend_from_slice(payload);
    buf
}

impl Transport for HidTransport {
    fn write(
        &mut self,
        report_id: u8,
        report_type: ReportType,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let buf = build_report(report_id, payload);
        debug!("Writing {} report: {:02X?}", report_type, buf);

        let device = self.device()?;
        match report_type {
            ReportType::Output => {
                device.write(&buf)?;
            }
            ReportType::Feature => {
                device.send_feature_report(&buf)?;
            }
        }
        Ok(())
    }

    fn read(&mut self, length: usize) -> Result<Vec<u8>, TransportError> {
        let device = self.device()?;
        let mut buf = vec![0u8; length];
        let read = device.read_timeout(&mut buf, self.read_timeout_ms)?;
        if read < length {
            return Err(TransportError::ShortRead {
                expected: length,
                actual: read,
            });
        }
        debug!("Read back: {:02X?}", buf);
        Ok(buf)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if self.device.take().is_some() {
            debug!("Closed HID device {}", self.info.device_path);
        }
        Ok(())
    }
}
