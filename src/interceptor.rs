//! Interceptor hooks.
//!
//! An interceptor observes and optionally rewrites calls flowing through
//! the proxy layer. Every hook has a no-op default, so a concrete
//! interceptor only overrides the operations it cares about. Hooks come in
//! before/after pairs: the before hook may derive a child [`Context`] that
//! is passed to nested calls and to every after hook of the same logical
//! operation; the after hook receives the outcome mutably and may replace
//! the value or the error before it travels back to the caller.
//!
//! Interceptors are shared across proxies and invoked concurrently across
//! independent operations; any mutable state they carry must be
//! synchronized internally.
//!
//! ```rust
//! use async_trait::async_trait;
//! use sql_intercept::{Context, ContextKey, Interceptor, NamedValue, Operation};
//!
//! const QUERY_TAG: ContextKey = ContextKey::new("demo.query-tag");
//!
//! struct Tagger;
//!
//! #[async_trait]
//! impl Interceptor for Tagger {
//!     fn intercepts(&self, op: Operation) -> bool {
//!         matches!(op, Operation::StmtQuery)
//!     }
//!
//!     async fn before_stmt_query(
//!         &self,
//!         ctx: &Context,
//!         _sql: &str,
//!         _args: &[NamedValue],
//!     ) -> Context {
//!         ctx.with_value(QUERY_TAG, "tagged".to_string())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::context::Context;
use crate::driver::{Connection, Rows, Statement, Transaction};
use crate::error::InterceptError;
use crate::types::{ExecOutcome, NamedValue, Value};

/// An interceptable operation. Most variants carry a before/after hook
/// pair; `RowsColumns` and `ValueCheck` are single-shot hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Connect,
    Prepare,
    Begin,
    ConnExec,
    ConnQuery,
    ConnReset,
    ConnClose,
    StmtExec,
    StmtQuery,
    StmtClose,
    RowsNext,
    RowsClose,
    RowsColumns,
    TxCommit,
    TxRollback,
    ValueCheck,
}

impl Operation {
    /// Every interceptable operation, in declaration order.
    pub const ALL: [Operation; 16] = [
        Operation::Connect,
        Operation::Prepare,
        Operation::Begin,
        Operation::ConnExec,
        Operation::ConnQuery,
        Operation::ConnReset,
        Operation::ConnClose,
        Operation::StmtExec,
        Operation::StmtQuery,
        Operation::StmtClose,
        Operation::RowsNext,
        Operation::RowsClose,
        Operation::RowsColumns,
        Operation::TxCommit,
        Operation::TxRollback,
        Operation::ValueCheck,
    ];

    pub(crate) const COUNT: usize = Operation::ALL.len();
}

/// Hook set invoked by the proxy layer around every delegated call.
///
/// Lifecycle operations whose driver signature carries no per-call context
/// (statement close, connection close/reset, commit, rollback, cursor
/// advance/close) run their hooks against the context captured when the
/// owning proxy was created — for cursors, that is the context derived by
/// the query's before hooks, which is what lets an interceptor correlate a
/// query with its row iteration.
#[async_trait]
pub trait Interceptor: Send + Sync {
    /// Which operations this interceptor participates in. The chain
    /// consults this once at construction time and skips the interceptor
    /// entirely for operations it disclaims; the default claims all of
    /// them. Override to narrow.
    fn intercepts(&self, _op: Operation) -> bool {
        true
    }

    async fn before_connect(&self, ctx: &Context, _dsn: &str) -> Context {
        ctx.clone()
    }
    async fn after_connect(
        &self,
        _ctx: &Context,
        _dsn: &str,
        _outcome: &mut Result<Box<dyn Connection>, InterceptError>,
    ) {
    }

    async fn before_prepare(&self, ctx: &Context, _sql: &str) -> Context {
        ctx.clone()
    }
    async fn after_prepare(
        &self,
        _ctx: &Context,
        _sql: &str,
        _outcome: &mut Result<Box<dyn Statement>, InterceptError>,
    ) {
    }

    async fn before_begin(&self, ctx: &Context) -> Context {
        ctx.clone()
    }
    async fn after_begin(
        &self,
        _ctx: &Context,
        _outcome: &mut Result<Box<dyn Transaction>, InterceptError>,
    ) {
    }

    async fn before_conn_exec(
        &self,
        ctx: &Context,
        _sql: &str,
        _args: &[NamedValue],
    ) -> Context {
        ctx.clone()
    }
    async fn after_conn_exec(
        &self,
        _ctx: &Context,
        _sql: &str,
        _outcome: &mut Result<ExecOutcome, InterceptError>,
    ) {
    }

    async fn before_conn_query(
        &self,
        ctx: &Context,
        _sql: &str,
        _args: &[NamedValue],
    ) -> Context {
        ctx.clone()
    }
    async fn after_conn_query(
        &self,
        _ctx: &Context,
        _sql: &str,
        _outcome: &mut Result<Box<dyn Rows>, InterceptError>,
    ) {
    }

    async fn before_conn_reset(&self, ctx: &Context) -> Context {
        ctx.clone()
    }
    async fn after_conn_reset(&self, _ctx: &Context, _outcome: &mut Result<(), InterceptError>) {}

    async fn before_conn_close(&self, ctx: &Context) -> Context {
        ctx.clone()
    }
    async fn after_conn_close(&self, _ctx: &Context, _outcome: &mut Result<(), InterceptError>) {}

    async fn before_stmt_exec(
        &self,
        ctx: &Context,
        _sql: &str,
        _args: &[NamedValue],
    ) -> Context {
        ctx.clone()
    }
    async fn after_stmt_exec(
        &self,
        _ctx: &Context,
        _sql: &str,
        _outcome: &mut Result<ExecOutcome, InterceptError>,
    ) {
    }

    async fn before_stmt_query(
        &self,
        ctx: &Context,
        _sql: &str,
        _args: &[NamedValue],
    ) -> Context {
        ctx.clone()
    }
    async fn after_stmt_query(
        &self,
        _ctx: &Context,
        _sql: &str,
        _outcome: &mut Result<Box<dyn Rows>, InterceptError>,
    ) {
    }

    async fn before_stmt_close(&self, ctx: &Context, _sql: &str) -> Context {
        ctx.clone()
    }
    async fn after_stmt_close(
        &self,
        _ctx: &Context,
        _sql: &str,
        _outcome: &mut Result<(), InterceptError>,
    ) {
    }

    async fn before_rows_next(&self, ctx: &Context) -> Context {
        ctx.clone()
    }
    async fn after_rows_next(
        &self,
        _ctx: &Context,
        _outcome: &mut Result<Option<Vec<Value>>, InterceptError>,
    ) {
    }

    async fn before_rows_close(&self, ctx: &Context) -> Context {
        ctx.clone()
    }
    async fn after_rows_close(&self, _ctx: &Context, _outcome: &mut Result<(), InterceptError>) {}

    /// Observe a cursor's column names. Fires on every `columns` call,
    /// with the context captured at query time.
    fn on_rows_columns(&self, _ctx: &Context, _columns: &[String]) {}

    async fn before_commit(&self, ctx: &Context) -> Context {
        ctx.clone()
    }
    async fn after_commit(&self, _ctx: &Context, _outcome: &mut Result<(), InterceptError>) {}

    async fn before_rollback(&self, ctx: &Context) -> Context {
        ctx.clone()
    }
    async fn after_rollback(&self, _ctx: &Context, _outcome: &mut Result<(), InterceptError>) {}

    /// Override named-value validation for a single argument. The first
    /// interceptor in the chain returning `Some` wins; when all return
    /// `None`, the resolved driver checker (statement-level, else
    /// connection-level, else the default widening table) runs.
    fn value_check(
        &self,
        _ctx: &Context,
        _arg: &NamedValue,
    ) -> Option<Result<Value, InterceptError>> {
        None
    }
}

/// Interceptor that implements no hooks.
///
/// Use it as a base for delegation-style composition or as a placeholder;
/// chains made only of `NullInterceptor`s degrade to direct delegation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInterceptor;

#[async_trait]
impl Interceptor for NullInterceptor {
    fn intercepts(&self, _op: Operation) -> bool {
        false
    }
}
