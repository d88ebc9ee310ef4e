use embedded_hal::blocking::i2c;
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::error::{ChannelError, TransportError};
use crate::{ExpansionError, ExpansionResult};

/// Byte-level access to a bus peer.
///
/// Implemented for every `embedded_hal` blocking I2C bus whose errors can be debug-printed, so
/// platform HALs and [`LinuxI2c`](crate::LinuxI2c) plug in directly.
pub trait Transport {
    fn send(&mut self, address: u8, bytes: &[u8]) -> Result<(), TransportError>;
    fn recv(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), TransportError>;
}

impl<T> Transport for T
where
    T: i2c::Write + i2c::Read,
    <T as i2c::Write>::Error: Debug,
    <T as i2c::Read>::Error: Debug,
{
    fn send(&mut self, address: u8, bytes: &[u8]) -> Result<(), TransportError> {
        i2c::Write::write(self, address, bytes).map_err(|err| TransportError::Send {
            len: bytes.len(),
            message: format!("{:?}", err),
        })
    }

    fn recv(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), TransportError> {
        let len = buffer.len();
        i2c::Read::read(self, address, buffer).map_err(|err| TransportError::Receive {
            len,
            message: format!("{:?}", err),
        })
    }
}

/// Bus connection shared by every channel of one board.
///
/// The transport sits behind a single lock, taken once per transaction, so a request and its
/// response are never interleaved with another channel's traffic. Releasing the board empties the
/// slot; later transactions fail with `ChannelError::Detached`.
#[derive(Debug)]
pub struct SharedBus<T> {
    address: u8,
    transport: Mutex<Option<T>>,
}

impl<T> SharedBus<T> {
    pub fn new(address: u8, transport: T) -> Self {
        Self {
            address,
            transport: Mutex::new(Some(transport)),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Takes the transport out, waiting for any transaction in flight to finish first.
    ///
    /// A poisoned lock does not prevent the release.
    pub fn release(&self) -> ExpansionResult<T> {
        self.transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(ExpansionError::Channel(ChannelError::Detached))
    }

    fn lock(&self) -> ExpansionResult<MutexGuard<'_, Option<T>>> {
        self.transport
            .lock()
            .map_err(|_| ChannelError::BusPoisoned)
            .map_err(ExpansionError::Channel)
    }
}

impl<T: Transport> SharedBus<T> {
    /// Write-only transaction.
    pub fn send(&self, request: &[u8]) -> ExpansionResult<()> {
        let mut guard = self.lock()?;
        let transport = guard
            .as_mut()
            .ok_or(ExpansionError::Channel(ChannelError::Detached))?;

        transport
            .send(self.address, request)
            .map_err(ExpansionError::Transport)
    }

    /// Request followed by its response, both under the same lock acquisition.
    pub fn query(&self, request: &[u8], response: &mut [u8]) -> ExpansionResult<()> {
        let mut guard = self.lock()?;
        let transport = guard
            .as_mut()
            .ok_or(ExpansionError::Channel(ChannelError::Detached))?;

        transport
            .send(self.address, request)
            .map_err(ExpansionError::Transport)?;
        transport
            .recv(self.address, response)
            .map_err(ExpansionError::Transport)
    }
}
