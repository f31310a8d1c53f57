//! Transport abstraction layer for SteelSeries mouse communication
//!
//! This crate provides the raw device I/O used by `rivalcfg`:
//!
//! - HID (hidapi) transport bound to a single USB interface
//! - Enumeration of attached devices by VID/PID/interface
//! - An in-memory mock transport for tests

pub mod error;
pub mod mock;
pub mod types;

mod discovery;
mod hid;

pub use discovery::HidDiscovery;
pub use error::TransportError;
pub use hid::HidTransport;
pub use mock::{MockHandle, MockTransport, RecordedWrite};
pub use types::{DiscoveredDevice, ReportType, TransportDeviceInfo};

/// The core transport trait - all backends implement this
///
/// Calls are blocking. A transport is owned by exactly one session; after
/// [`close`](Transport::close) every other call fails with
/// [`TransportError::Disconnected`].
pub trait Transport: Send {
    /// Write one report
    ///
    /// # Arguments
    /// * `report_id` - HID report ID (0 when the device does not number reports)
    /// * `report_type` - Output or feature report
    /// * `payload` - Report data, without the report ID
    fn write(
        &mut self,
        report_id: u8,
        report_type: ReportType,
        payload: &[u8],
    ) -> Result<(), TransportError>;

    /// Read `length` bytes from the device
    fn read(&mut self, length: usize) -> Result<Vec<u8>, TransportError>;

    /// Get device information
    fn device_info(&self) -> &TransportDeviceInfo;

    /// Release the device. Calling it more than once is a no-op.
    fn close(&mut self) -> Result<(), TransportError>;
}

/// Type alias for a boxed transport
pub type BoxedTransport = Box<dyn Transport>;

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(
        &mut self,
        report_id: u8,
        report_type: ReportType,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        (**self).write(report_id, report_type, payload)
    }

    fn read(&mut self, length: usize) -> Result<Vec<u8>, TransportError> {
        (**self).read(length)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        (**self).device_info()
    }

    fn close(&mut self) -> Result<(), TransportError> {
        (**self).close()
    }
}
