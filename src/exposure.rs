//! Boundary with whatever makes channels reachable from outside (files, sockets, a CLI...).
use std::collections::BTreeMap;

use crate::board::error::RegistrationError;
use crate::board::{ChannelError, Transport};
use crate::endpoint::Endpoint;
use crate::{ExpansionError, ExpansionResult};

/// Mechanism exposing channels to external callers.
///
/// `register` hands over a named endpoint and returns a handle that `unregister` later takes back.
/// Either call may be refused; the registry rolls back or reports as needed.
pub trait Exposure<T> {
    type Handle;

    fn register(
        &mut self,
        name: &str,
        endpoint: Endpoint<T>,
    ) -> Result<Self::Handle, RegistrationError>;

    fn unregister(&mut self, handle: Self::Handle) -> Result<(), RegistrationError>;
}

/// Handle returned by [`EndpointTable`]; it is the registered name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointHandle(String);

impl EndpointHandle {
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// In-memory exposure keyed by endpoint name.
///
/// Serves reads and writes by name using the text contract of [`Endpoint`].
#[derive(Debug)]
pub struct EndpointTable<T> {
    endpoints: BTreeMap<String, Endpoint<T>>,
    limit: Option<usize>,
}

impl<T> Default for EndpointTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EndpointTable<T> {
    pub fn new() -> Self {
        Self {
            endpoints: BTreeMap::new(),
            limit: None,
        }
    }

    /// Table refusing registrations beyond `limit` endpoints.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            endpoints: BTreeMap::new(),
            limit: Some(limit),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn endpoint(&self, name: &str) -> ExpansionResult<&Endpoint<T>> {
        self.endpoints
            .get(name)
            .ok_or_else(|| ExpansionError::Channel(ChannelError::UnknownEndpoint(name.to_owned())))
    }
}

impl<T: Transport> EndpointTable<T> {
    pub fn read(&self, name: &str) -> ExpansionResult<String> {
        self.endpoint(name)?.read_text()
    }

    pub fn read_at(&self, name: &str, offset: u64, buf: &mut [u8]) -> ExpansionResult<usize> {
        self.endpoint(name)?.read_at(offset, buf)
    }

    pub fn write(&self, name: &str, input: &[u8]) -> ExpansionResult<usize> {
        self.endpoint(name)?.write_text(input)
    }
}

impl<T> Exposure<T> for EndpointTable<T> {
    type Handle = EndpointHandle;

    fn register(
        &mut self,
        name: &str,
        endpoint: Endpoint<T>,
    ) -> Result<Self::Handle, RegistrationError> {
        if self.endpoints.contains_key(name) {
            return Err(RegistrationError::NameTaken(name.to_owned()));
        }
        if let Some(limit) = self.limit {
            if self.endpoints.len() >= limit {
                return Err(RegistrationError::Exhausted {
                    name: name.to_owned(),
                    limit,
                });
            }
        }

        self.endpoints.insert(name.to_owned(), endpoint);
        Ok(EndpointHandle(name.to_owned()))
    }

    fn unregister(&mut self, handle: Self::Handle) -> Result<(), RegistrationError> {
        self.endpoints
            .remove(&handle.0)
            .map(|_| ())
            .ok_or(RegistrationError::NotRegistered(handle.0))
    }
}
