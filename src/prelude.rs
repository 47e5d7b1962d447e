//! Convenient imports for common functionality.

pub use crate::chain::InterceptorChain;
pub use crate::context::{Context, ContextKey};
pub use crate::convert::default_convert;
pub use crate::driver::{Connection, Driver, Rows, Statement, Transaction, ValueChecker};
pub use crate::error::{BoxDynError, InterceptError};
pub use crate::interceptor::{Interceptor, NullInterceptor, Operation};
pub use crate::probe::{Capability, CapabilitySet};
pub use crate::proxy::{
    InterceptConnection, InterceptDriver, InterceptRows, InterceptStatement,
    InterceptTransaction, wrap_driver,
};
pub use crate::registry;
pub use crate::results::{ResultSet, Row, build_result_set};
pub use crate::types::{ColumnType, ExecOutcome, NamedValue, Value, positional_args};
