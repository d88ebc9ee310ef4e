use thiserror::Error;

/// Enum representing failures of a single bus transfer.
///
/// - Send - Writing the request bytes to the board failed.
/// - Receive - Reading the response back from the board failed.
///
/// `message` carries the debug rendering of the underlying bus error. Transfers are never retried.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("failed to send {len} byte(s) to the board: {message}")]
    Send { len: usize, message: String },
    #[error("failed to receive {len} byte(s) from the board: {message}")]
    Receive { len: usize, message: String },
}

/// Enum representing reasons a bus peer could not be taken over as an expansion board.
#[derive(Error, Debug)]
pub enum AttachError {
    #[error("peer at address {found:#04x} is not an expansion board (expected {expected:#04x})")]
    UnrecognizedAddress { found: u8, expected: u8 },
    #[error("device is not compatible with this driver: {0}")]
    Incompatible(String),
    #[error("no board attached under name {0}")]
    UnknownBoard(String),
}

/// Enum representing refusals of the exposure mechanism.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("endpoint name already taken: {0}")]
    NameTaken(String),
    #[error("cannot register {name}: endpoint limit of {limit} reached")]
    Exhausted { name: String, limit: usize },
    #[error("endpoint is not registered: {0}")]
    NotRegistered(String),
    #[error("endpoint {name} rejected: {reason}")]
    Rejected { name: String, reason: String },
}

/// Enum representing failures of a channel handle itself, independent of bus traffic.
///
/// - Detached - The board owning this channel has been detached or dropped.
/// - BusPoisoned - A thread panicked in the middle of a bus transaction.
/// - ReadOnly - A write was attempted on a reader, which only supports reading.
/// - UnknownEndpoint - No endpoint is registered under the given name.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("board has been detached")]
    Detached,
    #[error("bus lock poisoned")]
    BusPoisoned,
    #[error("reader {index} is read-only")]
    ReadOnly { index: u8 },
    #[error("no endpoint named {0}")]
    UnknownEndpoint(String),
}
