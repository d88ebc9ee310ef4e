//! Test doubles shared by the integration tests.
#![allow(dead_code)]

use embedded_hal::blocking::i2c;
use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use qwx_ioe::{Endpoint, Exposure, RegistrationError};

/// One transfer as seen on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusOp {
    Write { address: u8, bytes: Vec<u8> },
    Read { address: u8, len: usize },
}

#[derive(Debug)]
pub struct FakeBusError(pub &'static str);

#[derive(Debug, Default)]
struct FakeState {
    outputs: [bool; 3],
    cards: [[u8; 3]; 2],
    selected: Option<u8>,
    log: Vec<BusOp>,
    fail_writes: bool,
    fail_reads: bool,
    read_gate: Option<ReadGate>,
}

/// Holds the next read until the test lets it through.
#[derive(Debug)]
struct ReadGate {
    entered: Sender<()>,
    release: Receiver<()>,
}

/// Simulates the board firmware behind an I2C bus and records every transfer.
///
/// Clones share state, so a test can keep one clone for inspection after moving the other into a
/// board.
#[derive(Debug, Clone, Default)]
pub struct FakeBoard {
    state: Arc<Mutex<FakeState>>,
}

impl FakeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_output(&self, index: usize, on: bool) {
        self.state.lock().unwrap().outputs[index] = on;
    }

    pub fn output(&self, index: usize) -> bool {
        self.state.lock().unwrap().outputs[index]
    }

    pub fn present_card(&self, reader: usize, bytes: [u8; 3]) {
        self.state.lock().unwrap().cards[reader] = bytes;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    /// Makes the next read block once it reaches the wire.
    ///
    /// The returned receiver fires when that read has started; the read only completes, and only
    /// then shows up in the log, after a message is sent on the returned sender.
    pub fn hold_next_read(&self) -> (Receiver<()>, Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        self.state.lock().unwrap().read_gate = Some(ReadGate {
            entered: entered_tx,
            release: release_rx,
        });
        (entered_rx, release_tx)
    }

    pub fn log(&self) -> Vec<BusOp> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn clear_log(&self) {
        self.state.lock().unwrap().log.clear();
    }
}

impl i2c::Write for FakeBoard {
    type Error = FakeBusError;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        let mut state = self.state.lock().unwrap();
        state.log.push(BusOp::Write {
            address,
            bytes: bytes.to_vec(),
        });
        if state.fail_writes {
            return Err(FakeBusError("nak"));
        }

        match *bytes {
            [0x71, index] => state.outputs[usize::from(index)] = true,
            [0x70, index] => state.outputs[usize::from(index)] = false,
            [register] => state.selected = Some(register),
            _ => {}
        }

        Ok(())
    }
}

impl i2c::Read for FakeBoard {
    type Error = FakeBusError;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        let gate = self.state.lock().unwrap().read_gate.take();
        if let Some(gate) = gate {
            gate.entered.send(()).unwrap();
            gate.release.recv().unwrap();
        }

        let mut state = self.state.lock().unwrap();
        state.log.push(BusOp::Read {
            address,
            len: buffer.len(),
        });
        if state.fail_reads {
            return Err(FakeBusError("timeout"));
        }

        for byte in buffer.iter_mut() {
            *byte = 0xEE;
        }
        match state.selected {
            Some(register @ 0x70..=0x72) => {
                buffer[0] = state.outputs[usize::from(register - 0x70)] as u8;
            }
            Some(register @ (0x10 | 0x18)) => {
                let card = state.cards[usize::from((register - 0x10) / 8)];
                buffer[..3].copy_from_slice(&card);
            }
            _ => {}
        }

        Ok(())
    }
}

/// What a `RecordingExposure` was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExposureEvent {
    Registered(String),
    Unregistered(String),
}

/// Exposure that records calls and refuses the names it is told to.
#[derive(Debug, Default)]
pub struct RecordingExposure {
    pub events: Vec<ExposureEvent>,
    refuse_register: HashSet<String>,
    refuse_unregister: HashSet<String>,
}

impl RecordingExposure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing_registration_of(name: &str) -> Self {
        let mut exposure = Self::default();
        exposure.refuse_register.insert(name.to_owned());
        exposure
    }

    pub fn refuse_unregistration_of(&mut self, name: &str) {
        self.refuse_unregister.insert(name.to_owned());
    }

    pub fn registered(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ExposureEvent::Registered(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn unregistered(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ExposureEvent::Unregistered(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl<T> Exposure<T> for RecordingExposure {
    type Handle = String;

    fn register(&mut self, name: &str, _endpoint: Endpoint<T>) -> Result<String, RegistrationError> {
        if self.refuse_register.contains(name) {
            return Err(RegistrationError::Rejected {
                name: name.to_owned(),
                reason: "refused by test".to_owned(),
            });
        }
        self.events.push(ExposureEvent::Registered(name.to_owned()));
        Ok(name.to_owned())
    }

    fn unregister(&mut self, handle: String) -> Result<(), RegistrationError> {
        if self.refuse_unregister.contains(&handle) {
            return Err(RegistrationError::Rejected {
                name: handle,
                reason: "refused by test".to_owned(),
            });
        }
        self.events.push(ExposureEvent::Unregistered(handle));
        Ok(())
    }
}
