//! Transparent interception layer between a database client and a
//! concrete storage-engine driver.
//!
//! Wrap a driver with [`wrap_driver`] and an ordered list of
//! [`Interceptor`]s, and every operation flowing through the resulting
//! proxies — connect, prepare, exec, query, row iteration, transactions,
//! close — runs through the chain's hooks. A before hook may derive a
//! request [`Context`]; the derived context reaches nested calls of the
//! same logical operation, so a value attached when a query starts is
//! visible while its rows are iterated.
//!
//! The layer adds no behavior of its own beyond three services:
//!
//! - ordered interceptor hooks around every delegated call,
//! - wrap-time capability probing ([`Capability`], [`CapabilitySet`]),
//!   so optional driver operations are either mirrored or replaced by a
//!   documented default,
//! - argument normalization ([`default_convert`] or a driver-provided
//!   [`driver::ValueChecker`], statement-level checkers winning over
//!   connection-level ones).
//!
//! It does not pool connections, speak a wire protocol, retry, or touch
//! deadlines; cancellation tokens on the [`Context`] are forwarded to the
//! driver untouched.
//!
//! ```rust
//! use sql_intercept::{Context, ContextKey};
//!
//! const REQUEST_ID: ContextKey = ContextKey::new("app.request-id");
//!
//! let root = Context::new();
//! let scoped = root.with_value(REQUEST_ID, 7_u64);
//! assert_eq!(scoped.value::<u64>(REQUEST_ID).as_deref(), Some(&7));
//! ```

mod chain;
mod context;
mod convert;
mod error;
mod interceptor;
mod probe;
mod proxy;
mod results;
mod types;

pub mod driver;
pub mod prelude;
pub mod registry;

pub use chain::InterceptorChain;
pub use context::{Context, ContextKey};
pub use convert::default_convert;
pub use error::{BoxDynError, InterceptError};
pub use interceptor::{Interceptor, NullInterceptor, Operation};
pub use probe::{Capability, CapabilitySet};
pub use proxy::{
    InterceptConnection, InterceptDriver, InterceptRows, InterceptStatement, InterceptTransaction,
    wrap_driver,
};
pub use results::{ResultSet, Row, build_result_set};
pub use types::{ColumnType, ExecOutcome, NamedValue, Value, positional_args};
