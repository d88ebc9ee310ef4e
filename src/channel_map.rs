//! Mapping from logical channels of the expansion board to bus addresses and commands.
//!
//! The board firmware lays out each channel kind as a linear block, so every address here is
//! computed from the channel index instead of being looked up. Validity of an index is the
//! caller's responsibility - check it against `ChannelKind::count` first.
use crate::board::OutputState;

/// Number of digital outputs on one board.
pub const OUTPUTS_COUNT: usize = 3;

/// Number of RFID readers on one board.
pub const READERS_COUNT: usize = 2;

/// Bus address a peer must answer at to be recognized as an expansion board.
pub const BOARD_IDENTITY_ADDRESS: u8 = 0x50;

const OUTPUT_QUERY_BASE: u8 = 0x70;
const OUTPUT_CMD_OFF: u8 = 0x70;
const OUTPUT_CMD_ON: u8 = 0x71;
const READER_QUERY_BASE: u8 = 0x10;
const READER_QUERY_STRIDE: u8 = 0x08;

/// Kind of a channel exposed by the board.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ChannelKind {
    Output,
    Reader,
}

impl ChannelKind {
    /// How many channels of this kind one board carries.
    pub fn count(self) -> usize {
        use ChannelKind::*;
        match self {
            Output => OUTPUTS_COUNT,
            Reader => READERS_COUNT,
        }
    }

    /// Letter used in endpoint names (`s` for outputs, `w` for readers).
    pub fn prefix(self) -> char {
        use ChannelKind::*;
        match self {
            Output => 's',
            Reader => 'w',
        }
    }
}

/// Single-byte address that selects the state of output `index` for reading.
///
/// `index` must be below `OUTPUTS_COUNT`; it is only checked in debug builds.
pub fn output_query_address(index: u8) -> u8 {
    debug_assert!(usize::from(index) < ChannelKind::Output.count());
    OUTPUT_QUERY_BASE + index
}

/// Two-byte command driving output `index` to `state`.
///
/// `index` must be below `OUTPUTS_COUNT`; it is only checked in debug builds.
pub fn output_set_command(index: u8, state: OutputState) -> [u8; 2] {
    debug_assert!(usize::from(index) < ChannelKind::Output.count());
    let opcode = match state {
        OutputState::On => OUTPUT_CMD_ON,
        OutputState::Off => OUTPUT_CMD_OFF,
    };

    [opcode, index]
}

/// Single-byte address that selects the last card seen by reader `index`.
///
/// `index` must be below `READERS_COUNT`; it is only checked in debug builds.
pub fn reader_query_address(index: u8) -> u8 {
    debug_assert!(usize::from(index) < ChannelKind::Reader.count());
    READER_QUERY_BASE + READER_QUERY_STRIDE * index
}

/// External name of a channel: `<board>/s<index>` for outputs, `<board>/w<index>` for readers.
///
/// Names are generated from the index only; nothing ever parses them back.
pub fn endpoint_name(board_name: &str, kind: ChannelKind, index: u8) -> String {
    format!("{}/{}{}", board_name, kind.prefix(), index)
}
