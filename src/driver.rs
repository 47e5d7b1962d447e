//! The driver operation surface this crate wraps.
//!
//! A concrete storage-engine driver adapts its native API to these traits;
//! the proxy layer implements the same traits 1:1, so a wrapped driver is a
//! drop-in replacement for an unwrapped one. Optional operations carry
//! default bodies that report [`InterceptError::Unsupported`]; an
//! implementation that provides one must also declare it via
//! `capabilities`, which is how the wrap-time probe discovers support.

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::InterceptError;
use crate::probe::{Capability, CapabilitySet};
use crate::types::{ColumnType, ExecOutcome, NamedValue, Value};

/// A concrete driver: the component that knows how to talk to a specific
/// storage engine.
#[async_trait]
pub trait Driver: Send + Sync + 'static {
    /// Open a connection to the engine identified by `dsn`.
    async fn connect(
        &self,
        ctx: &Context,
        dsn: &str,
    ) -> Result<Box<dyn Connection>, InterceptError>;
}

/// An open connection to a storage engine.
///
/// `exec`, `query`, `reset`, and `exec_batch` are optional; the defaults
/// report the corresponding capability as unsupported.
#[async_trait]
pub trait Connection: Send {
    /// Prepare a statement for later execution.
    async fn prepare(
        &mut self,
        ctx: &Context,
        sql: &str,
    ) -> Result<Box<dyn Statement>, InterceptError>;

    /// Begin a transaction.
    async fn begin(&mut self, ctx: &Context) -> Result<Box<dyn Transaction>, InterceptError>;

    /// Close the connection and release engine resources.
    async fn close(&mut self) -> Result<(), InterceptError>;

    /// Execute a statement directly, without preparing it first. Only
    /// called when `capabilities` reports [`Capability::DirectExec`].
    async fn exec(
        &mut self,
        _ctx: &Context,
        _sql: &str,
        _args: &[NamedValue],
    ) -> Result<ExecOutcome, InterceptError> {
        Err(InterceptError::Unsupported(Capability::DirectExec))
    }

    /// Run a query directly, without preparing it first. Only called when
    /// `capabilities` reports [`Capability::DirectQuery`].
    async fn query(
        &mut self,
        _ctx: &Context,
        _sql: &str,
        _args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, InterceptError> {
        Err(InterceptError::Unsupported(Capability::DirectQuery))
    }

    /// Reset session state before reuse. Only called when `capabilities`
    /// reports [`Capability::SessionReset`].
    async fn reset(&mut self) -> Result<(), InterceptError> {
        Err(InterceptError::Unsupported(Capability::SessionReset))
    }

    /// Execute a multi-statement script. Only called when `capabilities`
    /// reports [`Capability::Batch`].
    async fn exec_batch(&mut self, _ctx: &Context, _script: &str) -> Result<(), InterceptError> {
        Err(InterceptError::Unsupported(Capability::Batch))
    }

    /// The optional operations this connection supports.
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::NONE
    }

    /// Connection-level argument checker, consulted when the statement
    /// does not provide its own.
    fn value_checker(&self) -> Option<Arc<dyn ValueChecker>> {
        None
    }
}

/// A prepared statement.
#[async_trait]
pub trait Statement: Send {
    /// Execute the statement as DML.
    async fn exec(
        &mut self,
        ctx: &Context,
        args: &[NamedValue],
    ) -> Result<ExecOutcome, InterceptError>;

    /// Execute the statement as a query, producing a cursor.
    async fn query(
        &mut self,
        ctx: &Context,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, InterceptError>;

    /// Close the statement.
    async fn close(&mut self) -> Result<(), InterceptError>;

    /// Number of bind parameters, when the engine reports it.
    fn num_params(&self) -> Option<usize> {
        None
    }

    /// The optional operations this statement supports.
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::NONE
    }

    /// Statement-level argument checker. Takes precedence over the
    /// connection-level checker.
    fn value_checker(&self) -> Option<Arc<dyn ValueChecker>> {
        None
    }
}

/// A result cursor produced by a query.
#[async_trait]
pub trait Rows: Send {
    /// Names of the result columns, in result order.
    fn columns(&self) -> &[String];

    /// Advance to the next row. `None` signals exhaustion.
    async fn next(&mut self) -> Result<Option<Vec<Value>>, InterceptError>;

    /// Close the cursor.
    async fn close(&mut self) -> Result<(), InterceptError>;

    /// Column type metadata. Only meaningful when `capabilities` reports
    /// [`Capability::ColumnTypes`].
    fn column_types(&self) -> Option<Vec<ColumnType>> {
        None
    }

    /// The optional operations this cursor supports.
    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::NONE
    }
}

/// An open transaction.
#[async_trait]
pub trait Transaction: Send {
    async fn commit(&mut self) -> Result<(), InterceptError>;
    async fn rollback(&mut self) -> Result<(), InterceptError>;
}

/// Per-argument validation and conversion override.
///
/// When a statement (or, failing that, its connection) provides a checker,
/// the conversion adapter hands every argument to it instead of applying
/// the default widening table. The checker owns conversion completely for
/// that statement; there is no per-argument fallback to the default.
pub trait ValueChecker: Send + Sync {
    /// Validate `arg` and produce the value the driver should receive.
    fn check(&self, arg: &NamedValue) -> Result<Value, InterceptError>;
}
