//! Proxy types wrapping the concrete driver surface.
//!
//! Each proxy owns exactly one concrete object and shares the interceptor
//! chain built at wrap time. Data flows application → driver proxy →
//! connection proxy → statement proxy → cursor proxy, with the chain
//! invoked around every delegated call.

mod connection;
mod driver;
mod ledger;
mod rows;
mod statement;
mod transaction;

pub use connection::InterceptConnection;
pub use driver::{InterceptDriver, wrap_driver};
pub use rows::InterceptRows;
pub use statement::InterceptStatement;
pub use transaction::InterceptTransaction;
