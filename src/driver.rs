//! Process-wide table of attached boards.
//!
//! A `Driver` is created once at startup with the exposure mechanism it publishes channels through,
//! and torn down once with [`Driver::shutdown`]. In between, boards come and go through `probe` and
//! `remove`. Dropping a driver without calling `shutdown` detaches whatever is still attached,
//! discarding the released buses.
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::board::error::{AttachError, RegistrationError};
use crate::board::{Board, BoardConfig, Detached};
use crate::exposure::Exposure;
use crate::{ExpansionError, ExpansionResult};

/// Name the driver identifies itself with.
pub const DRIVER_NAME: &str = "qwx_ioe_driver";

/// Compatible strings of devices this driver binds to.
pub const COMPATIBLE: &[&str] = &["equiser,qwxioe"];

pub struct Driver<T, E: Exposure<T>> {
    exposure: E,
    boards: BTreeMap<String, Board<T, E::Handle>>,
}

impl<T, E: Exposure<T>> Driver<T, E> {
    pub fn new(exposure: E) -> Self {
        info!(driver = DRIVER_NAME, "driver initialized");
        Self {
            exposure,
            boards: BTreeMap::new(),
        }
    }

    /// Binds a newly found device to this driver.
    ///
    /// The device must declare one of the `COMPATIBLE` strings and use a board name not already in
    /// use by this driver.
    pub fn probe(
        &mut self,
        compatible: &str,
        transport: T,
        config: &BoardConfig,
    ) -> ExpansionResult<&Board<T, E::Handle>> {
        if !COMPATIBLE.contains(&compatible) {
            return Err(ExpansionError::Attach(AttachError::Incompatible(
                compatible.to_owned(),
            )));
        }
        if self.boards.contains_key(&config.name) {
            return Err(ExpansionError::Registration(RegistrationError::NameTaken(
                config.name.clone(),
            )));
        }

        let board = Board::attach(transport, config, &mut self.exposure)?;
        info!(board = %config.name, compatible, "probed device");

        Ok(self.boards.entry(config.name.clone()).or_insert(board))
    }

    /// Detaches the board attached under `name`.
    pub fn remove(&mut self, name: &str) -> ExpansionResult<Detached<T>> {
        let board = self
            .boards
            .remove(name)
            .ok_or_else(|| ExpansionError::Attach(AttachError::UnknownBoard(name.to_owned())))?;

        board.detach(&mut self.exposure)
    }

    /// Detaches every board still attached and consumes the driver.
    pub fn shutdown(mut self) -> Vec<ExpansionResult<Detached<T>>> {
        let reports = self.detach_all();
        info!(driver = DRIVER_NAME, boards = reports.len(), "driver shut down");
        reports
    }

    pub fn board(&self, name: &str) -> Option<&Board<T, E::Handle>> {
        self.boards.get(name)
    }

    pub fn boards(&self) -> impl Iterator<Item = &Board<T, E::Handle>> {
        self.boards.values()
    }

    pub fn exposure(&self) -> &E {
        &self.exposure
    }

    pub fn exposure_mut(&mut self) -> &mut E {
        &mut self.exposure
    }

    fn detach_all(&mut self) -> Vec<ExpansionResult<Detached<T>>> {
        let boards = std::mem::take(&mut self.boards);
        let exposure = &mut self.exposure;

        boards
            .into_iter()
            .map(|(name, board)| {
                let report = board.detach(&mut *exposure);
                if let Err(err) = &report {
                    warn!(board = %name, error = %err, "failed to detach board");
                }
                report
            })
            .collect()
    }
}

impl<T, E: Exposure<T>> Drop for Driver<T, E> {
    fn drop(&mut self) {
        if !self.boards.is_empty() {
            self.detach_all();
        }
    }
}
