//! This crate drives the QWX I/O expansion board: three digital outputs and two RFID card readers
//! behind a single I2C peer.
//!
//! Attaching a board (`Board::attach`) takes over its bus connection and hands one endpoint per
//! channel to an exposure mechanism of your choice (see `Exposure`; `EndpointTable` keeps them in
//! memory). Endpoints are named `<board>/s<n>` for outputs and `<board>/w<n>` for readers.
//! Channels can also be used directly:
//!
//! * `OutputChannel::state` / `OutputChannel::set` query and drive an output. Outputs also implement
//!   the [`embedded_hal`](https://crates.io/crates/embedded-hal) `OutputPin` and `StatefulOutputPin`
//!   traits, so generic drivers can switch them.
//! * `ReaderChannel::last_card` fetches the 24-bit identifier of the last card seen by a reader.
//!
//! All channels of a board share its connection. Each request and its response form one
//! transaction and never interleave with another channel's traffic. Any bus speaking
//! `embedded_hal::blocking::i2c` works as the transport; on Linux, `LinuxI2c` uses `/dev/i2c-N`.

use thiserror::Error;

pub mod board;
pub mod channel_map;
pub mod config;
pub mod driver;
pub mod endpoint;
pub mod exposure;
#[cfg(any(target_os = "linux", target_os = "android"))]
mod linux;

pub use board::error::{AttachError, ChannelError, RegistrationError, TransportError};
pub use board::{
    Board, BoardConfig, CardId, Detached, OutputChannel, OutputState, ReaderChannel, Transport,
    UnregisterFailure,
};
pub use channel_map::{ChannelKind, BOARD_IDENTITY_ADDRESS, OUTPUTS_COUNT, READERS_COUNT};
pub use config::{BoardBinding, ConfigError, DriverConfig};
pub use driver::Driver;
pub use endpoint::Endpoint;
pub use exposure::{EndpointHandle, EndpointTable, Exposure};
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use linux::{LinuxI2c, LinuxI2cError};

/// Main error type for this crate.
///
/// For more details, see `TransportError`, `AttachError`, `RegistrationError` and `ChannelError`.
#[derive(Error, Debug)]
pub enum ExpansionError {
    #[error("bus transaction failed")]
    Transport(#[source] TransportError),
    #[error("failed to attach board")]
    Attach(#[source] AttachError),
    #[error("failed to expose channel")]
    Registration(#[source] RegistrationError),
    #[error("channel unavailable")]
    Channel(#[source] ChannelError),
}

pub type ExpansionResult<T> = Result<T, ExpansionError>;
