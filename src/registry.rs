//! Process-wide driver-name lookup.
//!
//! Wrapped drivers register here under a name, the same way unwrapped
//! ones can; `open` resolves the name and connects. Registration is
//! write-once per name.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use lazy_static::lazy_static;

use crate::context::Context;
use crate::driver::{Connection, Driver};
use crate::error::InterceptError;

lazy_static! {
    static ref DRIVERS: RwLock<HashMap<String, Arc<dyn Driver>>> = RwLock::new(HashMap::new());
}

/// Register `driver` under `name`.
///
/// # Errors
///
/// Returns [`InterceptError::Registry`] when the name is already taken.
pub fn register(name: impl Into<String>, driver: Arc<dyn Driver>) -> Result<(), InterceptError> {
    let name = name.into();
    let mut map = DRIVERS.write().unwrap_or_else(PoisonError::into_inner);
    if map.contains_key(&name) {
        return Err(InterceptError::Registry(format!(
            "driver {name} is already registered"
        )));
    }
    map.insert(name, driver);
    Ok(())
}

/// The driver registered under `name`, if any.
#[must_use]
pub fn lookup(name: &str) -> Option<Arc<dyn Driver>> {
    DRIVERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// Names of all registered drivers, sorted.
#[must_use]
pub fn drivers() -> Vec<String> {
    let mut names: Vec<String> = DRIVERS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .cloned()
        .collect();
    names.sort();
    names
}

/// Resolve `name` and open a connection to `dsn`.
///
/// # Errors
///
/// Returns [`InterceptError::Registry`] for unknown names, otherwise
/// whatever the driver's `connect` returns.
pub async fn open(
    ctx: &Context,
    name: &str,
    dsn: &str,
) -> Result<Box<dyn Connection>, InterceptError> {
    let driver = lookup(name)
        .ok_or_else(|| InterceptError::Registry(format!("unknown driver {name}")))?;
    driver.connect(ctx, dsn).await
}
