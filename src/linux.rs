//! Bus transport over a Linux i2c-dev character device (`/dev/i2c-N`).
use embedded_hal::blocking::i2c;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd;
use std::convert::AsRef;
use std::fs::File;
use std::os::unix::io::{AsRawFd, FromRawFd};
use std::path::Path;
use thiserror::Error;
use tracing::trace;

/// `I2C_SLAVE` request from `linux/i2c-dev.h`.
const I2C_SLAVE: u16 = 0x0703;

nix::ioctl_write_int_bad!(i2c_select_peer, I2C_SLAVE);

/// Enum representing failures of the i2c-dev transport.
///
/// - Open - The device node could not be opened, usually because of permissions or a missing `i2c-dev` module.
/// - SelectPeer - The kernel refused to address the requested peer.
/// - Transfer - `read(2)` or `write(2)` on the device failed.
/// - ShortTransfer - The kernel moved fewer bytes than requested.
#[derive(Error, Debug)]
pub enum LinuxI2cError {
    #[error("failed to open i2c device")]
    Open(#[source] nix::Error),
    #[error("failed to select peer {address:#04x}")]
    SelectPeer {
        address: u8,
        #[source]
        source: nix::Error,
    },
    #[error("i2c transfer failed")]
    Transfer(#[source] nix::Error),
    #[error("short i2c transfer: expected {expected} byte(s), got {actual}")]
    ShortTransfer { expected: usize, actual: usize },
}

/// Blocking I2C master backed by `/dev/i2c-N`.
///
/// Each transfer is a plain `write(2)` or `read(2)` on the device node. The peer is selected with
/// `I2C_SLAVE` and re-selected only when a transfer targets a different address.
#[derive(Debug)]
pub struct LinuxI2c {
    handle: File,
    peer: Option<u8>,
}

impl LinuxI2c {
    pub fn open<P: AsRef<Path>>(device_path: P) -> Result<Self, LinuxI2cError> {
        let mut open_flags = OFlag::empty();
        open_flags.insert(OFlag::O_RDWR);
        open_flags.insert(OFlag::O_CLOEXEC);

        let fd = open(device_path.as_ref(), open_flags, Mode::empty()).map_err(LinuxI2cError::Open)?;

        // SAFETY: Validity of fd is checked by Nix and nothing else owns it.
        let handle = unsafe { File::from_raw_fd(fd) };

        Ok(Self { handle, peer: None })
    }

    fn select(&mut self, address: u8) -> Result<(), LinuxI2cError> {
        if self.peer == Some(address) {
            return Ok(());
        }

        trace!(address, "selecting i2c peer");
        // SAFETY: The descriptor is owned by `self.handle` and stays open for the call.
        unsafe { i2c_select_peer(self.handle.as_raw_fd(), address.into()) }
            .map_err(|source| LinuxI2cError::SelectPeer { address, source })?;
        self.peer = Some(address);

        Ok(())
    }
}

fn check_len(expected: usize, actual: usize) -> Result<(), LinuxI2cError> {
    if actual == expected {
        Ok(())
    } else {
        Err(LinuxI2cError::ShortTransfer { expected, actual })
    }
}

impl i2c::Write for LinuxI2c {
    type Error = LinuxI2cError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.select(address)?;
        let written = unistd::write(self.handle.as_raw_fd(), bytes).map_err(LinuxI2cError::Transfer)?;
        check_len(bytes.len(), written)
    }
}

impl i2c::Read for LinuxI2c {
    type Error = LinuxI2cError;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.select(address)?;
        let read = unistd::read(self.handle.as_raw_fd(), buffer).map_err(LinuxI2cError::Transfer)?;
        check_len(buffer.len(), read)
    }
}
