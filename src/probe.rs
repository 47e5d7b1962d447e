//! Capability probing for wrapped driver objects.
//!
//! Instead of repeatedly duck-typing a concrete object on the hot path,
//! each proxy inspects its object exactly once at wrap time and caches the
//! result. The cached record is read-only afterwards, so no locking is
//! needed to consult it.

use std::fmt;
use std::sync::Arc;

use crate::driver::{Connection, Rows, Statement, ValueChecker};
use crate::types::ColumnType;

/// An optional operation a concrete driver object may or may not
/// implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Statement-less execution on the connection
    DirectExec,
    /// Statement-less querying on the connection
    DirectQuery,
    /// Session state reset between uses
    SessionReset,
    /// Multi-statement script execution
    Batch,
    /// Custom per-argument validation/conversion
    ValueCheck,
    /// Column type introspection on cursors
    ColumnTypes,
}

impl Capability {
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::DirectExec => "direct-exec",
            Capability::DirectQuery => "direct-query",
            Capability::SessionReset => "session-reset",
            Capability::Batch => "batch",
            Capability::ValueCheck => "value-check",
            Capability::ColumnTypes => "column-types",
        };
        f.write_str(name)
    }
}

/// Explicit, enumerated set of the optional operations an object supports.
///
/// Driver implementations declare their set via
/// [`Connection::capabilities`] and friends; proxies mirror it verbatim, so
/// callers can test for support the same way against wrapped and unwrapped
/// objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    /// The empty set: no optional operation supported.
    pub const NONE: Self = Self(0);

    /// Return a copy of this set with `cap` added.
    #[must_use]
    pub const fn with(self, cap: Capability) -> Self {
        Self(self.0 | cap.bit())
    }

    /// Whether `cap` is in the set.
    #[must_use]
    pub const fn supports(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// Build a set from a list of capabilities.
    #[must_use]
    pub fn of(caps: &[Capability]) -> Self {
        caps.iter().fold(Self::NONE, |set, cap| set.with(*cap))
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for cap in [
            Capability::DirectExec,
            Capability::DirectQuery,
            Capability::SessionReset,
            Capability::Batch,
            Capability::ValueCheck,
            Capability::ColumnTypes,
        ] {
            if self.supports(cap) {
                if !first {
                    f.write_str(",")?;
                }
                write!(f, "{cap}")?;
                first = false;
            }
        }
        if first {
            f.write_str("none")?;
        }
        Ok(())
    }
}

/// Wrap-time snapshot of a concrete connection's optional surface.
#[derive(Clone)]
pub(crate) struct ConnectionProbe {
    pub caps: CapabilitySet,
    pub checker: Option<Arc<dyn ValueChecker>>,
}

impl ConnectionProbe {
    pub(crate) fn inspect(conn: &dyn Connection) -> Self {
        let mut caps = conn.capabilities();
        let checker = conn.value_checker();
        if checker.is_some() {
            caps = caps.with(Capability::ValueCheck);
        }
        Self { caps, checker }
    }
}

/// Wrap-time snapshot of a concrete statement's optional surface.
#[derive(Clone)]
pub(crate) struct StatementProbe {
    pub caps: CapabilitySet,
    pub checker: Option<Arc<dyn ValueChecker>>,
    pub num_params: Option<usize>,
}

impl StatementProbe {
    pub(crate) fn inspect(stmt: &dyn Statement) -> Self {
        let mut caps = stmt.capabilities();
        let checker = stmt.value_checker();
        if checker.is_some() {
            caps = caps.with(Capability::ValueCheck);
        }
        Self {
            caps,
            checker,
            num_params: stmt.num_params(),
        }
    }
}

/// Wrap-time snapshot of a concrete cursor's optional surface.
#[derive(Clone)]
pub(crate) struct RowsProbe {
    pub caps: CapabilitySet,
    pub column_types: Option<Vec<ColumnType>>,
}

impl RowsProbe {
    pub(crate) fn inspect(rows: &dyn Rows) -> Self {
        let mut caps = rows.capabilities();
        let column_types = rows.column_types();
        if column_types.is_some() {
            caps = caps.with(Capability::ColumnTypes);
        }
        Self { caps, column_types }
    }
}
