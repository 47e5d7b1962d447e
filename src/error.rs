use thiserror::Error;

use crate::probe::Capability;

/// Boxed error type used for errors surfaced by wrapped drivers.
pub type BoxDynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type shared by the proxy layer and the driver trait surface.
///
/// The variants keep the three error families distinguishable: errors a
/// concrete driver returned (`Driver`), errors raised by a proxy before the
/// concrete object was ever reached (`Closed`, `Unsupported`), and argument
/// conversion failures (`Conversion`). Nothing in this layer retries; retry
/// policy belongs to callers.
#[derive(Debug, Error)]
pub enum InterceptError {
    /// Error surfaced by the wrapped concrete driver, returned unchanged
    /// unless an interceptor deliberately replaces it.
    #[error(transparent)]
    Driver(#[from] BoxDynError),

    /// Operation invoked on a proxy whose resource was already closed.
    /// The payload names the resource kind (connection, statement, cursor,
    /// transaction).
    #[error("use of closed {0}")]
    Closed(&'static str),

    /// Optional operation invoked on an object that does not implement it.
    #[error("capability not supported: {0}")]
    Unsupported(Capability),

    /// An argument could not be coerced to any representation the driver
    /// accepts.
    #[error("parameter conversion error: {0}")]
    Conversion(String),

    /// Driver-name registration or lookup failure.
    #[error("driver registry error: {0}")]
    Registry(String),
}

impl InterceptError {
    /// Wrap a concrete driver error.
    pub fn driver<E>(err: E) -> Self
    where
        E: Into<BoxDynError>,
    {
        InterceptError::Driver(err.into())
    }

    /// Whether this error originated in the wrapped driver rather than in
    /// the proxy layer.
    #[must_use]
    pub fn is_driver(&self) -> bool {
        matches!(self, InterceptError::Driver(_))
    }

    /// Whether this is a use-after-close lifecycle error.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, InterceptError::Closed(_))
    }

    /// Whether this is an argument conversion error.
    #[must_use]
    pub fn is_conversion(&self) -> bool {
        matches!(self, InterceptError::Conversion(_))
    }
}
