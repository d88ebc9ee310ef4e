use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use std::sync::{Arc, Weak};

use super::bus::{SharedBus, Transport};
use super::error::ChannelError;
use crate::channel_map;
use crate::{ExpansionError, ExpansionResult};

/// Length of a reader response. Only the first `CardId::ENCODED_LEN` bytes carry the card; the rest
/// are reserved by the firmware and ignored.
pub const READER_RESPONSE_LEN: usize = 8;

/// Identifier of the last card presented to a reader: 24 bits, sent little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u32);

impl CardId {
    pub const MAX: u32 = 0x00FF_FFFF;
    pub const ENCODED_LEN: usize = 3;

    /// Returns `None` for values that don't fit in 24 bits.
    pub fn new(value: u32) -> Option<Self> {
        if value <= Self::MAX {
            Some(CardId(value))
        } else {
            None
        }
    }

    pub fn from_le_bytes(bytes: [u8; 3]) -> Self {
        CardId(LittleEndian::read_u24(&bytes))
    }

    pub fn to_le_bytes(self) -> [u8; 3] {
        let mut bytes = [0u8; 3];
        LittleEndian::write_u24(&mut bytes, self.0);
        bytes
    }

    /// Decodes a reader response, ignoring the reserved bytes after the identifier.
    pub fn decode(response: &[u8; READER_RESPONSE_LEN]) -> Self {
        CardId(LittleEndian::read_u24(&response[..Self::ENCODED_LEN]))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CardId> for u32 {
    fn from(id: CardId) -> Self {
        id.0
    }
}

/// Handle to one RFID reader of a board.
///
/// Reading is a pure query: latching the last card is done by the board itself.
#[derive(Debug)]
pub struct ReaderChannel<T> {
    bus: Weak<SharedBus<T>>,
    index: u8,
}

impl<T> Clone for ReaderChannel<T> {
    fn clone(&self) -> Self {
        Self {
            bus: Weak::clone(&self.bus),
            index: self.index,
        }
    }
}

impl<T> ReaderChannel<T> {
    pub(crate) fn new(bus: &Arc<SharedBus<T>>, index: u8) -> Self {
        debug_assert!(usize::from(index) < channel_map::READERS_COUNT);
        Self {
            bus: Arc::downgrade(bus),
            index,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }
}

impl<T: Transport> ReaderChannel<T> {
    /// Asks the board for the last card seen by this reader.
    pub fn last_card(&self) -> ExpansionResult<CardId> {
        let bus = self
            .bus
            .upgrade()
            .ok_or(ExpansionError::Channel(ChannelError::Detached))?;

        let mut response = [0u8; READER_RESPONSE_LEN];
        bus.query(
            &[channel_map::reader_query_address(self.index)],
            &mut response,
        )?;

        Ok(CardId::decode(&response))
    }
}
