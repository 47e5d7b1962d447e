use std::sync::Arc;

use async_trait::async_trait;

use crate::chain::InterceptorChain;
use crate::context::Context;
use crate::convert::{Conversion, convert_args};
use crate::driver::{Connection, Rows, Statement, Transaction, ValueChecker};
use crate::error::InterceptError;
use crate::probe::{Capability, CapabilitySet, ConnectionProbe, StatementProbe};
use crate::proxy::ledger::{Ledger, SharedSlot, shared_slot};
use crate::proxy::rows::InterceptRows;
use crate::proxy::statement::InterceptStatement;
use crate::proxy::transaction::InterceptTransaction;
use crate::types::{ExecOutcome, NamedValue};

/// Connection proxy.
///
/// Owns exactly one concrete connection. Every operation runs through the
/// interceptor chain; statements and cursors produced here are wrapped and
/// tracked so that closing the connection closes them first (cursors, then
/// statements, then the connection itself).
pub struct InterceptConnection {
    inner: Option<Box<dyn Connection>>,
    chain: Arc<InterceptorChain>,
    probe: ConnectionProbe,
    conversion: Conversion,
    ledger: Arc<Ledger>,
    ctx: Context,
}

impl InterceptConnection {
    pub(crate) fn new(conn: Box<dyn Connection>, chain: Arc<InterceptorChain>, ctx: Context) -> Self {
        let probe = ConnectionProbe::inspect(conn.as_ref());
        let conversion = Conversion::resolve(None, probe.checker.clone());
        Self {
            inner: Some(conn),
            chain,
            probe,
            conversion,
            ledger: Arc::new(Ledger::default()),
            ctx,
        }
    }

    fn track_statement(&self, stmt: Box<dyn Statement>) -> SharedSlot<dyn Statement> {
        let slot = shared_slot(stmt);
        self.ledger.track_statement(&slot);
        slot
    }
}

#[async_trait]
impl Connection for InterceptConnection {
    async fn prepare(
        &mut self,
        ctx: &Context,
        sql: &str,
    ) -> Result<Box<dyn Statement>, InterceptError> {
        let ctx = self.chain.before_prepare(ctx, sql).await;
        let mut outcome = match self.inner.as_deref_mut() {
            Some(conn) => conn.prepare(&ctx, sql).await,
            None => Err(InterceptError::Closed("connection")),
        };
        self.chain.after_prepare(&ctx, sql, &mut outcome).await;
        let stmt = outcome?;

        let probe = StatementProbe::inspect(stmt.as_ref());
        let conversion = Conversion::resolve(probe.checker.clone(), self.probe.checker.clone());
        let slot = self.track_statement(stmt);
        Ok(Box::new(InterceptStatement::new(
            slot,
            sql.to_string(),
            Arc::clone(&self.chain),
            probe,
            conversion,
            Arc::clone(&self.ledger),
            ctx,
        )))
    }

    async fn begin(&mut self, ctx: &Context) -> Result<Box<dyn Transaction>, InterceptError> {
        let ctx = self.chain.before_begin(ctx).await;
        let mut outcome = match self.inner.as_deref_mut() {
            Some(conn) => conn.begin(&ctx).await,
            None => Err(InterceptError::Closed("connection")),
        };
        self.chain.after_begin(&ctx, &mut outcome).await;
        let tx = outcome?;
        Ok(Box::new(InterceptTransaction::new(
            tx,
            Arc::clone(&self.chain),
            ctx,
        )))
    }

    /// Close the connection, tearing down any still-open cursors and
    /// statements first. A second close is a no-op success; only the
    /// concrete connection's own close error is surfaced.
    async fn close(&mut self) -> Result<(), InterceptError> {
        let ctx = self.chain.before_conn_close(&self.ctx).await;
        let mut outcome = match self.inner.take() {
            Some(mut conn) => {
                self.ledger.close_children().await;
                conn.close().await
            }
            None => Ok(()),
        };
        self.chain.after_conn_close(&ctx, &mut outcome).await;
        outcome
    }

    async fn exec(
        &mut self,
        ctx: &Context,
        sql: &str,
        args: &[NamedValue],
    ) -> Result<ExecOutcome, InterceptError> {
        let ctx = self.chain.before_conn_exec(ctx, sql, args).await;
        let direct = self.probe.caps.supports(Capability::DirectExec);
        let mut outcome = match convert_args(&self.chain, &self.conversion, &ctx, args) {
            Ok(converted) => match self.inner.as_deref_mut() {
                Some(conn) if direct => conn.exec(&ctx, sql, &converted).await,
                Some(conn) => prepared_exec(conn, &ctx, sql, &converted).await,
                None => Err(InterceptError::Closed("connection")),
            },
            Err(err) => Err(err),
        };
        self.chain.after_conn_exec(&ctx, sql, &mut outcome).await;
        outcome
    }

    async fn query(
        &mut self,
        ctx: &Context,
        sql: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, InterceptError> {
        let ctx = self.chain.before_conn_query(ctx, sql, args).await;
        let direct = self.probe.caps.supports(Capability::DirectQuery);
        let mut fallback_stmt: Option<Box<dyn Statement>> = None;
        let mut outcome = match convert_args(&self.chain, &self.conversion, &ctx, args) {
            Ok(converted) => match self.inner.as_deref_mut() {
                Some(conn) if direct => conn.query(&ctx, sql, &converted).await,
                Some(conn) => prepared_query(conn, &ctx, sql, &converted, &mut fallback_stmt).await,
                None => Err(InterceptError::Closed("connection")),
            },
            Err(err) => Err(err),
        };
        self.chain.after_conn_query(&ctx, sql, &mut outcome).await;
        let rows = outcome?;

        // A fallback statement stays open as long as its cursor does; the
        // cursor proxy closes it when the cursor is closed.
        let owned_stmt = fallback_stmt.map(|stmt| self.track_statement(stmt));
        Ok(Box::new(InterceptRows::new(
            rows,
            Arc::clone(&self.chain),
            ctx,
            &self.ledger,
            owned_stmt,
        )))
    }

    /// Session reset degrades to a no-op when the concrete connection does
    /// not support it.
    async fn reset(&mut self) -> Result<(), InterceptError> {
        let ctx = self.chain.before_conn_reset(&self.ctx).await;
        let supported = self.probe.caps.supports(Capability::SessionReset);
        let mut outcome = match self.inner.as_deref_mut() {
            Some(conn) if supported => conn.reset().await,
            Some(_) => Ok(()),
            None => Err(InterceptError::Closed("connection")),
        };
        self.chain.after_conn_reset(&ctx, &mut outcome).await;
        outcome
    }

    async fn exec_batch(&mut self, ctx: &Context, script: &str) -> Result<(), InterceptError> {
        match self.inner.as_deref_mut() {
            Some(conn) if self.probe.caps.supports(Capability::Batch) => {
                conn.exec_batch(ctx, script).await
            }
            Some(_) => Err(InterceptError::Unsupported(Capability::Batch)),
            None => Err(InterceptError::Closed("connection")),
        }
    }

    fn capabilities(&self) -> CapabilitySet {
        self.probe.caps
    }

    fn value_checker(&self) -> Option<Arc<dyn ValueChecker>> {
        self.probe.checker.clone()
    }
}

/// Default behavior for connections without [`Capability::DirectExec`]:
/// prepare, execute, close.
async fn prepared_exec(
    conn: &mut dyn Connection,
    ctx: &Context,
    sql: &str,
    args: &[NamedValue],
) -> Result<ExecOutcome, InterceptError> {
    tracing::debug!(sql, "no direct exec capability, using a prepared statement");
    let mut stmt = conn.prepare(ctx, sql).await?;
    let result = stmt.exec(ctx, args).await;
    let close_result = stmt.close().await;
    let outcome = result?;
    close_result?;
    Ok(outcome)
}

/// Default behavior for connections without [`Capability::DirectQuery`]:
/// prepare and query, leaving the statement open for the cursor's
/// lifetime. On success the statement is handed back through
/// `fallback_stmt` so the caller can tie it to the cursor proxy.
async fn prepared_query(
    conn: &mut dyn Connection,
    ctx: &Context,
    sql: &str,
    args: &[NamedValue],
    fallback_stmt: &mut Option<Box<dyn Statement>>,
) -> Result<Box<dyn Rows>, InterceptError> {
    tracing::debug!(sql, "no direct query capability, using a prepared statement");
    let mut stmt = conn.prepare(ctx, sql).await?;
    match stmt.query(ctx, args).await {
        Ok(rows) => {
            *fallback_stmt = Some(stmt);
            Ok(rows)
        }
        Err(err) => {
            if let Err(close_err) = stmt.close().await {
                tracing::debug!(error = %close_err, "closing fallback statement after query failure failed");
            }
            Err(err)
        }
    }
}
