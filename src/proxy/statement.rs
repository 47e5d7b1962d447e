use std::sync::Arc;

use async_trait::async_trait;

use crate::chain::InterceptorChain;
use crate::context::Context;
use crate::convert::{Conversion, convert_args};
use crate::driver::{Rows, Statement, ValueChecker};
use crate::error::InterceptError;
use crate::probe::{CapabilitySet, StatementProbe};
use crate::proxy::ledger::{Ledger, SharedSlot};
use crate::proxy::rows::InterceptRows;
use crate::types::{ExecOutcome, NamedValue};

/// Statement proxy.
///
/// Exec and query run before hooks, normalize arguments through the
/// conversion strategy resolved at wrap time, delegate, then run after
/// hooks with the outcome visible. Cursors produced here carry the
/// context derived by the query's before hooks.
pub struct InterceptStatement {
    slot: SharedSlot<dyn Statement>,
    sql: String,
    chain: Arc<InterceptorChain>,
    probe: StatementProbe,
    conversion: Conversion,
    ledger: Arc<Ledger>,
    ctx: Context,
}

impl InterceptStatement {
    pub(crate) fn new(
        slot: SharedSlot<dyn Statement>,
        sql: String,
        chain: Arc<InterceptorChain>,
        probe: StatementProbe,
        conversion: Conversion,
        ledger: Arc<Ledger>,
        ctx: Context,
    ) -> Self {
        Self {
            slot,
            sql,
            chain,
            probe,
            conversion,
            ledger,
            ctx,
        }
    }

    /// The SQL text this statement was prepared from.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

#[async_trait]
impl Statement for InterceptStatement {
    async fn exec(
        &mut self,
        ctx: &Context,
        args: &[NamedValue],
    ) -> Result<ExecOutcome, InterceptError> {
        let ctx = self.chain.before_stmt_exec(ctx, &self.sql, args).await;
        let mut outcome = match convert_args(&self.chain, &self.conversion, &ctx, args) {
            Ok(converted) => {
                let mut guard = self.slot.lock().await;
                match guard.get_mut() {
                    Some(stmt) => stmt.exec(&ctx, &converted).await,
                    None => Err(InterceptError::Closed("statement")),
                }
            }
            Err(err) => Err(err),
        };
        self.chain.after_stmt_exec(&ctx, &self.sql, &mut outcome).await;
        outcome
    }

    async fn query(
        &mut self,
        ctx: &Context,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, InterceptError> {
        let ctx = self.chain.before_stmt_query(ctx, &self.sql, args).await;
        let mut outcome = match convert_args(&self.chain, &self.conversion, &ctx, args) {
            Ok(converted) => {
                let mut guard = self.slot.lock().await;
                match guard.get_mut() {
                    Some(stmt) => stmt.query(&ctx, &converted).await,
                    None => Err(InterceptError::Closed("statement")),
                }
            }
            Err(err) => Err(err),
        };
        self.chain.after_stmt_query(&ctx, &self.sql, &mut outcome).await;
        let rows = outcome?;
        Ok(Box::new(InterceptRows::new(
            rows,
            Arc::clone(&self.chain),
            ctx,
            &self.ledger,
            None,
        )))
    }

    /// Close the statement. Idempotent: a second close (including one
    /// that already happened through the connection's teardown cascade)
    /// returns success without touching the concrete statement again.
    async fn close(&mut self) -> Result<(), InterceptError> {
        let ctx = self.chain.before_stmt_close(&self.ctx, &self.sql).await;
        let mut outcome = {
            let mut guard = self.slot.lock().await;
            match guard.take() {
                Some(mut stmt) => stmt.close().await,
                None => Ok(()),
            }
        };
        self.chain.after_stmt_close(&ctx, &self.sql, &mut outcome).await;
        outcome
    }

    fn num_params(&self) -> Option<usize> {
        self.probe.num_params
    }

    fn capabilities(&self) -> CapabilitySet {
        self.probe.caps
    }

    fn value_checker(&self) -> Option<Arc<dyn ValueChecker>> {
        self.probe.checker.clone()
    }
}
