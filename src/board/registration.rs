use tracing::{debug, warn};

use super::error::RegistrationError;
use crate::endpoint::Endpoint;
use crate::exposure::Exposure;

/// An endpoint successfully handed to the exposure mechanism.
#[derive(Debug)]
pub(crate) struct Registered<H> {
    pub name: String,
    pub handle: H,
}

/// Registers endpoints in order, all or nothing.
///
/// On the first refusal the already-registered prefix is unregistered in reverse order and the
/// refusal is returned. Failures during that rollback are logged; they never replace the original
/// error.
pub(crate) fn register_all<T, E, I>(
    exposure: &mut E,
    endpoints: I,
) -> Result<Vec<Registered<E::Handle>>, RegistrationError>
where
    E: Exposure<T>,
    I: IntoIterator<Item = (String, Endpoint<T>)>,
{
    let mut registered = Vec::new();

    for (name, endpoint) in endpoints {
        match exposure.register(&name, endpoint) {
            Ok(handle) => {
                debug!(endpoint = %name, "registered endpoint");
                registered.push(Registered { name, handle });
            }
            Err(err) => {
                warn!(endpoint = %name, error = %err, "registration refused, rolling back");
                roll_back::<T, E>(exposure, registered);
                return Err(err);
            }
        }
    }

    Ok(registered)
}

fn roll_back<T, E>(exposure: &mut E, registered: Vec<Registered<E::Handle>>)
where
    E: Exposure<T>,
{
    for Registered { name, handle } in registered.into_iter().rev() {
        match exposure.unregister(handle) {
            Ok(()) => debug!(endpoint = %name, "rolled back endpoint"),
            Err(err) => warn!(endpoint = %name, error = %err, "failed to roll back endpoint"),
        }
    }
}
