use embedded_hal::digital::v2 as eh;
use std::sync::{Arc, Weak};

use super::bus::{SharedBus, Transport};
use super::error::ChannelError;
use crate::channel_map;
use crate::{ExpansionError, ExpansionResult};

const STATE_BIT: u8 = 0x01;

/// Enum representing the state of a digital output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputState {
    On,
    Off,
}

impl OutputState {
    /// Interprets the least-significant bit of a board response.
    pub fn from_response(byte: u8) -> Self {
        if byte & STATE_BIT == 0 {
            OutputState::Off
        } else {
            OutputState::On
        }
    }

    pub fn is_on(self) -> bool {
        self == OutputState::On
    }
}

impl From<bool> for OutputState {
    fn from(on: bool) -> Self {
        if on {
            OutputState::On
        } else {
            OutputState::Off
        }
    }
}

/// Handle to one digital output of a board.
///
/// The handle holds no cached state: every read goes to the board. It refers to the board's bus
/// without owning it, so it stays valid to hold after the board is gone - operations then fail with
/// `ChannelError::Detached`.
#[derive(Debug)]
pub struct OutputChannel<T> {
    bus: Weak<SharedBus<T>>,
    index: u8,
}

impl<T> Clone for OutputChannel<T> {
    fn clone(&self) -> Self {
        Self {
            bus: Weak::clone(&self.bus),
            index: self.index,
        }
    }
}

impl<T> OutputChannel<T> {
    pub(crate) fn new(bus: &Arc<SharedBus<T>>, index: u8) -> Self {
        debug_assert!(usize::from(index) < channel_map::OUTPUTS_COUNT);
        Self {
            bus: Arc::downgrade(bus),
            index,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    fn bus(&self) -> ExpansionResult<Arc<SharedBus<T>>> {
        self.bus
            .upgrade()
            .ok_or(ExpansionError::Channel(ChannelError::Detached))
    }
}

impl<T: Transport> OutputChannel<T> {
    /// Reads the current state of the output from the board.
    pub fn state(&self) -> ExpansionResult<OutputState> {
        let mut response = [0u8; 1];
        self.bus()?.query(
            &[channel_map::output_query_address(self.index)],
            &mut response,
        )?;

        Ok(OutputState::from_response(response[0]))
    }

    /// Drives the output. The board does not acknowledge, so nothing is read back.
    pub fn set(&self, state: OutputState) -> ExpansionResult<()> {
        self.bus()?
            .send(&channel_map::output_set_command(self.index, state))
    }
}

impl<T: Transport> eh::OutputPin for OutputChannel<T> {
    type Error = ExpansionError;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(OutputState::Off)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(OutputState::On)
    }
}

impl<T: Transport> eh::StatefulOutputPin for OutputChannel<T> {
    fn is_set_high(&self) -> Result<bool, Self::Error> {
        self.state().map(OutputState::is_on)
    }

    fn is_set_low(&self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|v| !v)
    }
}
