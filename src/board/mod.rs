use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

pub mod error;
mod bus;
mod output;
mod reader;
mod registration;

use crate::channel_map::{self, ChannelKind, BOARD_IDENTITY_ADDRESS, OUTPUTS_COUNT, READERS_COUNT};
use crate::endpoint::Endpoint;
use crate::exposure::Exposure;
use crate::{ExpansionError, ExpansionResult};
use bus::SharedBus;
use error::{AttachError, RegistrationError};
use registration::Registered;

pub use bus::Transport;
pub use error::{ChannelError, TransportError};
pub use output::{OutputChannel, OutputState};
pub use reader::{CardId, ReaderChannel, READER_RESPONSE_LEN};

/// Identity of one board on its bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Prefix of every endpoint name of this board.
    pub name: String,
    /// Bus address the board was found at.
    pub address: u8,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            name: "exp0".to_owned(),
            address: BOARD_IDENTITY_ADDRESS,
        }
    }
}

/// One attached expansion board.
///
/// The board exclusively owns the bus connection and every channel of the unit: `OUTPUTS_COUNT`
/// outputs and `READERS_COUNT` readers. Channel handles given out (to callers or to the exposure
/// mechanism) only refer to the bus, so once the board is detached or dropped they stop working
/// instead of keeping the connection alive.
///
/// A board must be taken down with [`Board::detach`], which withdraws every endpoint before the bus
/// is released. Dropping an attached board cannot reach the exposure mechanism: its endpoints stay
/// registered and fail with `ChannelError::Detached`, and a warning names each of them.
///
/// `H` is the handle type of the exposure mechanism the channels were registered with.
#[derive(Debug)]
#[must_use = "detach the board to unregister its endpoints"]
pub struct Board<T, H> {
    name: String,
    bus: Arc<SharedBus<T>>,
    outputs: Vec<OutputChannel<T>>,
    readers: Vec<ReaderChannel<T>>,
    registrations: Vec<Registered<H>>,
}

/// Result of detaching a board: the released bus plus every endpoint that failed to unregister.
#[derive(Debug)]
pub struct Detached<T> {
    pub transport: T,
    pub failures: Vec<UnregisterFailure>,
}

impl<T> Detached<T> {
    /// True when every endpoint was unregistered.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug)]
pub struct UnregisterFailure {
    pub name: String,
    pub error: RegistrationError,
}

impl<T, H> Board<T, H> {
    /// Takes over `transport` as an expansion board and exposes all of its channels.
    ///
    /// Only a peer configured at `BOARD_IDENTITY_ADDRESS` is accepted. Outputs are registered first,
    /// then readers, each in ascending order. Registration is all or nothing: if the exposure
    /// mechanism refuses any endpoint, everything registered so far is unregistered again and the
    /// refusal is returned.
    pub fn attach<E>(transport: T, config: &BoardConfig, exposure: &mut E) -> ExpansionResult<Self>
    where
        E: Exposure<T, Handle = H>,
    {
        if config.address != BOARD_IDENTITY_ADDRESS {
            return Err(ExpansionError::Attach(AttachError::UnrecognizedAddress {
                found: config.address,
                expected: BOARD_IDENTITY_ADDRESS,
            }));
        }

        let bus = Arc::new(SharedBus::new(config.address, transport));
        let outputs: Vec<_> = (0..OUTPUTS_COUNT as u8)
            .map(|index| OutputChannel::new(&bus, index))
            .collect();
        let readers: Vec<_> = (0..READERS_COUNT as u8)
            .map(|index| ReaderChannel::new(&bus, index))
            .collect();

        let endpoints = outputs
            .iter()
            .map(|channel| {
                (
                    channel_map::endpoint_name(&config.name, ChannelKind::Output, channel.index()),
                    Endpoint::Output(channel.clone()),
                )
            })
            .chain(readers.iter().map(|channel| {
                (
                    channel_map::endpoint_name(&config.name, ChannelKind::Reader, channel.index()),
                    Endpoint::Reader(channel.clone()),
                )
            }));

        let registrations =
            registration::register_all(exposure, endpoints).map_err(ExpansionError::Registration)?;

        info!(
            board = %config.name,
            address = config.address,
            endpoints = registrations.len(),
            "attached expansion board"
        );

        Ok(Self {
            name: config.name.clone(),
            bus,
            outputs,
            readers,
            registrations,
        })
    }

    /// Withdraws every endpoint, then releases the bus connection.
    ///
    /// Every endpoint is attempted even when some fail to unregister; failures are collected in the
    /// returned report. The bus is released only after any transaction in flight has completed.
    pub fn detach<E>(mut self, exposure: &mut E) -> ExpansionResult<Detached<T>>
    where
        E: Exposure<T, Handle = H>,
    {
        let mut failures = Vec::new();

        for Registered { name, handle } in std::mem::take(&mut self.registrations) {
            if let Err(error) = exposure.unregister(handle) {
                warn!(endpoint = %name, error = %error, "failed to unregister endpoint");
                failures.push(UnregisterFailure { name, error });
            }
        }

        let transport = self.bus.release()?;
        info!(board = %self.name, failures = failures.len(), "detached expansion board");

        Ok(Detached {
            transport,
            failures,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> u8 {
        self.bus.address()
    }

    pub fn output(&self, index: usize) -> Option<&OutputChannel<T>> {
        self.outputs.get(index)
    }

    pub fn reader(&self, index: usize) -> Option<&ReaderChannel<T>> {
        self.readers.get(index)
    }

    pub fn outputs(&self) -> &[OutputChannel<T>] {
        &self.outputs
    }

    pub fn readers(&self) -> &[ReaderChannel<T>] {
        &self.readers
    }

    /// Names of the registered endpoints, in registration order.
    pub fn endpoint_names(&self) -> impl Iterator<Item = &str> {
        self.registrations.iter().map(|r| r.name.as_str())
    }
}

impl<T, H> Drop for Board<T, H> {
    fn drop(&mut self) {
        for Registered { name, .. } in &self.registrations {
            warn!(
                board = %self.name,
                endpoint = %name,
                "board dropped without detach, endpoint left registered"
            );
        }
    }
}
