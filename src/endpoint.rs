//! What the exposure mechanism receives for each channel, and the text contract callers see.
//!
//! Outputs read as `"0\n"` or `"1\n"` and accept writes whose first byte is `'1'` (on) or anything
//! else (off). Readers read as the decimal card identifier followed by a newline and refuse writes.
use crate::board::{ChannelError, OutputChannel, OutputState, ReaderChannel, Transport};
use crate::channel_map::ChannelKind;
use crate::{ExpansionError, ExpansionResult};

/// A channel as handed over to the exposure mechanism.
#[derive(Debug)]
pub enum Endpoint<T> {
    Output(OutputChannel<T>),
    Reader(ReaderChannel<T>),
}

impl<T> Clone for Endpoint<T> {
    fn clone(&self) -> Self {
        match self {
            Endpoint::Output(channel) => Endpoint::Output(channel.clone()),
            Endpoint::Reader(channel) => Endpoint::Reader(channel.clone()),
        }
    }
}

impl<T> Endpoint<T> {
    pub fn kind(&self) -> ChannelKind {
        match self {
            Endpoint::Output(_) => ChannelKind::Output,
            Endpoint::Reader(_) => ChannelKind::Reader,
        }
    }

    pub fn index(&self) -> u8 {
        match self {
            Endpoint::Output(channel) => channel.index(),
            Endpoint::Reader(channel) => channel.index(),
        }
    }

    /// Only outputs have a write handler.
    pub fn is_writable(&self) -> bool {
        self.kind() == ChannelKind::Output
    }
}

impl<T: Transport> Endpoint<T> {
    /// Performs a live read and renders it.
    pub fn read_text(&self) -> ExpansionResult<String> {
        match self {
            Endpoint::Output(channel) => channel.state().map(render_state),
            Endpoint::Reader(channel) => channel.last_card().map(|card| format!("{}\n", card)),
        }
    }

    /// File-like read: offset 0 reads the channel, anything past it is end of file.
    ///
    /// Copies as much of the rendered text as fits into `buf` and returns the number of bytes copied.
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> ExpansionResult<usize> {
        if offset != 0 {
            return Ok(0);
        }

        let text = self.read_text()?;
        let count = text.len().min(buf.len());
        buf[..count].copy_from_slice(&text.as_bytes()[..count]);

        Ok(count)
    }

    /// Applies a textual write and returns how many input bytes were consumed.
    ///
    /// Empty input leaves the output untouched and touches no bus.
    pub fn write_text(&self, input: &[u8]) -> ExpansionResult<usize> {
        let channel = match self {
            Endpoint::Output(channel) => channel,
            Endpoint::Reader(reader) => {
                return Err(ExpansionError::Channel(ChannelError::ReadOnly {
                    index: reader.index(),
                }))
            }
        };

        match parse_state(input) {
            Some(state) => {
                channel.set(state)?;
                Ok(input.len())
            }
            None => Ok(0),
        }
    }
}

/// Text form of an output state.
pub fn render_state(state: OutputState) -> String {
    match state {
        OutputState::On => "1\n".to_owned(),
        OutputState::Off => "0\n".to_owned(),
    }
}

/// State requested by a textual write, `None` for an empty write.
pub fn parse_state(input: &[u8]) -> Option<OutputState> {
    input.first().map(|&first| OutputState::from(first == b'1'))
}
