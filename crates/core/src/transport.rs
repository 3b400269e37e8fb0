//! Device link abstraction.

use crate::Result;

/// The serial link contract used to deliver packets to the device.
///
/// Opening a new port must release the previous handle first, and the handle must be
/// released when the implementation is dropped.
pub trait Transport {
    /// Opens the given port, closing the previously opened one.
    fn open(&mut self, port: &str) -> Result<()>;
    /// Closes the port, does nothing if it is not open.
    fn close(&mut self);
    /// Returns true if the port is open.
    fn is_open(&self) -> bool;
    /// Writes the whole buffer to the device.
    ///
    /// Returns `Ok(())` only if all bytes have been accepted.
    fn send_data(&mut self, data: &[u8]) -> Result<()>;
}

impl<T: ?Sized + Transport> Transport for &mut T {
    fn open(&mut self, port: &str) -> Result<()> {
        T::open(self, port)
    }

    fn close(&mut self) {
        T::close(self);
    }

    fn is_open(&self) -> bool {
        T::is_open(self)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<()> {
        T::send_data(self, data)
    }
}

impl<T: ?Sized + Transport> Transport for Box<T> {
    fn open(&mut self, port: &str) -> Result<()> {
        T::open(self, port)
    }

    fn close(&mut self) {
        T::close(self);
    }

    fn is_open(&self) -> bool {
        T::is_open(self)
    }

    fn send_data(&mut self, data: &[u8]) -> Result<()> {
        T::send_data(self, data)
    }
}
