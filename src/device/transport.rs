use crate::error::TransportError;
use log::info;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Byte channel to the controller. Callers treat failures as non-fatal.
pub trait Transport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}

/// Serial link over any writer, usually the UART character device.
///
/// Line settings (baud, parity) belong to the platform; this only writes.
#[derive(Debug)]
pub struct SerialTransport<W: Write> {
    inner: W,
}

impl SerialTransport<File> {
    /// Open a serial device node for writing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, TransportError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|source| TransportError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::new(file))
    }
}

impl<W: Write> SerialTransport<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Transport for SerialTransport<W> {
    /// One write call; a partial write is reported, not retried.
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let written = self.inner.write(bytes)?;
        if written != bytes.len() {
            return Err(TransportError::ShortWrite {
                written,
                expected: bytes.len(),
            });
        }
        self.inner.flush()?;
        Ok(())
    }
}

/// Dry-run link: logs each frame in hex
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport {
    sent: usize,
}

impl LogTransport {
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl Transport for LogTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.sent += 1;
        let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02X}")).collect();
        info!("tx[{}]: {}", self.sent, hex.join(" "));
        Ok(())
    }
}

/// In-memory capture; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every frame written so far, oldest first
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Transport for MemoryTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(bytes.to_vec());
        Ok(())
    }
}
