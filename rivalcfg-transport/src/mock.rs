//! In-memory transport for tests
//!
//! Records every write and serves reads from a queue. A [`MockHandle`]
//! stays with the test after the transport itself has been handed to a
//! session, so assertions can be made on what was sent.
//!
//! ```rust,ignore
//! let mock = MockTransport::new(0x1038, 0x1729);
//! let handle = mock.handle();
//! let mut mouse = Mouse::open(profile, mock)?;
//! mouse.set("sensitivity1", 800)?;
//! assert_eq!(handle.writes()[0].payload, vec![0x03, 0x01, 0x11]);
//! ```

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::error::TransportError;
use crate::types::{ReportType, TransportDeviceInfo};
use crate::Transport;

/// A write captured by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub report_id: u8,
    pub report_type: ReportType,
    pub payload: Vec<u8>,
}

#[derive(Debug, Default)]
struct MockState {
    writes: Vec<RecordedWrite>,
    reads: VecDeque<Vec<u8>>,
    /// Fail every write once this many writes have succeeded
    fail_after_writes: Option<usize>,
    close_count: usize,
    closed: bool,
}

/// Shared view of a [`MockTransport`]'s state
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    /// All writes so far, in order
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.state.lock().writes.clone()
    }

    /// Payloads of all writes so far
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .writes
            .iter()
            .map(|w| w.payload.clone())
            .collect()
    }

    /// Queue a response for the next `read`
    pub fn push_read(&self, data: Vec<u8>) {
        self.state.lock().reads.push_back(data);
    }

    /// Make writes fail after `n` successful ones
    pub fn fail_after_writes(&self, n: usize) {
        self.state.lock().fail_after_writes = Some(n);
    }

    /// Number of times the transport actually released the device
    pub fn close_count(&self) -> usize {
        self.state.lock().close_count
    }

    /// Whether the transport has been closed
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

/// Mock transport for testing without hardware
pub struct MockTransport {
    info: TransportDeviceInfo,
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Create a mock for the given VID/PID
    pub fn new(vid: u16, pid: u16) -> Self {
        Self {
            info: TransportDeviceInfo {
                vid,
                pid,
                interface: 0,
                device_path: format!("mock:{vid:04x}:{pid:04x}"),
                product_name: Some("Mock Mouse".to_string()),
            },
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Get a handle for later assertions
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Transport for MockTransport {
    fn write(
        &mut self,
        report_id: u8,
        report_type: ReportType,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(TransportError::Disconnected);
        }
        if let Some(limit) = state.fail_after_writes {
            if state.writes.len() >= limit {
                return Err(TransportError::HidError("injected write failure".into()));
            }
        }
        trace!(?report_type, ?payload, "mock write");
        state.writes.push(RecordedWrite {
            report_id,
            report_type,
            payload: payload.to_vec(),
        });
        Ok(())
    }

    fn read(&mut self, length: usize) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(TransportError::Disconnected);
        }
        let mut data = state.reads.pop_front().ok_or(TransportError::ShortRead {
            expected: length,
            actual: 0,
        })?;
        if data.len() < length {
            return Err(TransportError::ShortRead {
                expected: length,
                actual: data.len(),
            });
        }
        data.truncate(length);
        Ok(data)
    }

    fn device_info(&self) -> &TransportDeviceInfo {
        &self.info
    }

    fn close(&mut self) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if !state.closed {
            state.closed = true;
            state.close_count += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_writes() {
        let mut mock = MockTransport::new(0x1038, 0x1702);
        let handle = mock.handle();

        mock.write(0, ReportType::Output, &[0x05, 0x01]).unwrap();
        mock.write(0, ReportType::Feature, &[0x09]).unwrap();

        let writes = handle.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].payload, vec![0x05, 0x01]);
        assert_eq!(writes[1].report_type, ReportType::Feature);
    }

    #[test]
    fn test_reads_are_queued() {
        let mut mock = MockTransport::new(0x1038, 0x1702);
        let handle = mock.handle();
        handle.push_read(vec![0x01, 0x02, 0x03]);

        assert_eq!(mock.read(2).unwrap(), vec![0x01, 0x02]);
        assert!(matches!(
            mock.read(2),
            Err(TransportError::ShortRead { expected: 2, actual: 0 })
        ));
    }

    #[test]
    fn test_injected_failure() {
        let mut mock = MockTransport::new(0x1038, 0x1702);
        mock.handle().fail_after_writes(1);

        assert!(mock.write(0, ReportType::Output, &[0x01]).is_ok());
        assert!(mock.write(0, ReportType::Output, &[0x02]).is_err());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut mock = MockTransport::new(0x1038, 0x1702);
        let handle = mock.handle();

        mock.close().unwrap();
        mock.close().unwrap();

        assert!(handle.is_closed());
        assert_eq!(handle.close_count(), 1);
        assert!(matches!(
            mock.write(0, ReportType::Output, &[0x01]),
            Err(TransportError::Disconnected)
        ));
    }
}
