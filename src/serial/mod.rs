//! # Serial Communication Module
//!
//! Handles serial communication with the JP4in1 multiprotocol module.
//!
//! This module handles:
//! - Opening the serial port at 50,000 baud, 8 data bits, even parity,
//!   2 stop bits (the module's fixed USART settings)
//! - Async frame writes
//!
//! The port is exclusively owned by the session for its lifetime; there is
//! no sharing or reconnection logic at this layer.

pub mod port_trait;

use crate::error::{MultiTxError, Result};
use async_trait::async_trait;
use port_trait::SerialPortIO;
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info};

/// Serial baud rate the module firmware listens at (50,000 baud)
pub const MULTI_BAUD_RATE: u32 = 50_000;

/// Serial Port Handler for the multiprotocol module
///
/// Manages the connection to the JP4in1 module via USB serial.
pub struct MultiSerial {
    /// Serial port handle
    port: tokio_serial::SerialStream,
    /// Device path (e.g., /dev/ttyUSB0)
    device_path: String,
}

impl std::fmt::Debug for MultiSerial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiSerial")
            .field("device_path", &self.device_path)
            .finish_non_exhaustive()
    }
}

impl MultiSerial {
    /// Open the serial connection to the module
    ///
    /// Configures the port for the module's fixed 50000 8E2 settings.
    ///
    /// # Arguments
    ///
    /// * `path` - Device path (e.g., "/dev/ttyUSB0" or "COM6")
    ///
    /// # Returns
    ///
    /// * `Result<MultiSerial>` - Connected serial port or error
    ///
    /// # Errors
    ///
    /// Returns `Serial` if the port cannot be opened or configured
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use multitx::serial::MultiSerial;
    ///
    /// fn main() -> anyhow::Result<()> {
    ///     let serial = MultiSerial::open("/dev/ttyUSB0")?;
    ///     println!("module listening on {}", serial.device_path());
    ///     Ok(())
    /// }
    /// ```
    pub fn open(path: &str) -> Result<Self> {
        debug!("Opening serial port {} @ {} 8E2", path, MULTI_BAUD_RATE);

        let port = tokio_serial::new(path, MULTI_BAUD_RATE)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::Even)
            .stop_bits(tokio_serial::StopBits::Two)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| MultiTxError::Serial(format!("Failed to open {}: {}", path, e)))?;

        info!("Opened multiprotocol module at {}", path);
        Ok(Self {
            port,
            device_path: path.to_string(),
        })
    }

    /// Get the device path of the opened serial port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }
}

#[async_trait]
impl SerialPortIO for MultiSerial {
    async fn write_all(&mut self, data: &[u8]) -> std::io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.write_all(data).await
    }

    async fn flush(&mut self) -> std::io::Result<()> {
        use tokio::io::AsyncWriteExt;
        self.port.flush().await
    }
}
