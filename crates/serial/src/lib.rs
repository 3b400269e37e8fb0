//! Serial port transport for the LED bank.
//!
//! This crate provides a [`Transport`] implementation on top of the [`serialport`] crate.

use std::{io::Write, time::Duration};

pub use ledbank_core as core;
use ledbank_core::{Error, Result, Transport};
use serialport::{DataBits, Parity, SerialPort, StopBits};

/// Default device baud rate.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Read and write timeout of the opened port.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(50);

/// The [`serialport`] based device link.
pub struct SerialTransport {
    baud_rate: u32,
    timeout: Duration,
    port: Option<OpenPort>,
}

/// Type holding an open port state. The handle is closed when dropped.
struct OpenPort {
    name: String,
    handle: Box<dyn SerialPort>,
}

impl Default for SerialTransport {
    fn default() -> Self {
        Self::new(DEFAULT_BAUD_RATE)
    }
}

impl SerialTransport {
    /// Creates a closed transport with the given baud rate.
    pub fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            timeout: DEFAULT_TIMEOUT,
            port: None,
        }
    }

    /// Sets the read and write timeout used for the next opened port.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the name of the currently opened port.
    pub fn port_name(&self) -> Option<&str> {
        self.port.as_ref().map(|port| port.name.as_str())
    }

    /// Lists serial ports available in the system.
    pub fn available_ports() -> Result<Vec<String>> {
        let ports = serialport::available_ports().map_err(|err| Error::port_open("*", err))?;
        Ok(ports.into_iter().map(|info| info.port_name).collect())
    }
}

impl Transport for SerialTransport {
    fn open(&mut self, port: &str) -> Result<()> {
        self.close();

        // 8N1 framing.
        let handle = serialport::new(port, self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .timeout(self.timeout)
            .open()
            .map_err(|err| Error::port_open(port, err))?;

        log::info!("Opened serial port {port} at {} baud", self.baud_rate);
        self.port = Some(OpenPort {
            name: port.to_owned(),
            handle,
        });
        Ok(())
    }

    fn close(&mut self) {
        if let Some(port) = self.port.take() {
            log::info!("Closed serial port {}", port.name);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn send_data(&mut self, data: &[u8]) -> Result<()> {
        let port = self.port.as_mut().ok_or(Error::TransportNotOpen)?;
        if data.is_empty() {
            return Err(Error::send_failed("empty payload"));
        }

        port.handle.write_all(data).map_err(Error::send_failed)?;
        port.handle.flush().map_err(Error::send_failed)?;
        log::trace!("Wrote {} bytes to {}", data.len(), port.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_transport() {
        let mut transport = SerialTransport::default();
        assert!(!transport.is_open());
        assert_eq!(transport.port_name(), None);
        assert!(matches!(
            transport.send_data(&[0xDA, 0xAD]),
            Err(Error::TransportNotOpen)
        ));
        // Closing a closed port is a no-op.
        transport.close();
        assert!(!transport.is_open());
    }

    #[test]
    fn test_open_missing_port() {
        let _ = env_logger::try_init();

        let mut transport = SerialTransport::default();
        let err = transport
            .open("/dev/ledbank-no-such-port")
            .unwrap_err();
        assert!(matches!(err, Error::PortOpen { .. }));
        assert!(!transport.is_open());
    }
}
