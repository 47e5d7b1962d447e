use std::sync::Arc;

use async_trait::async_trait;

use crate::chain::InterceptorChain;
use crate::context::Context;
use crate::driver::{Rows, Statement};
use crate::error::InterceptError;
use crate::probe::{CapabilitySet, RowsProbe};
use crate::proxy::ledger::{Ledger, SharedSlot, shared_slot};
use crate::types::{ColumnType, Value};

/// Result cursor proxy.
///
/// Advance and close route through the chain with the context captured at
/// query time, so interceptors can correlate a query with its row
/// iteration. Column names and type metadata are snapshotted at wrap time;
/// the concrete cursor is only touched for `next` and `close`.
pub struct InterceptRows {
    slot: SharedSlot<dyn Rows>,
    column_names: Arc<Vec<String>>,
    probe: RowsProbe,
    chain: Arc<InterceptorChain>,
    ctx: Context,
    owned_stmt: Option<SharedSlot<dyn Statement>>,
}

impl InterceptRows {
    pub(crate) fn new(
        rows: Box<dyn Rows>,
        chain: Arc<InterceptorChain>,
        ctx: Context,
        ledger: &Ledger,
        owned_stmt: Option<SharedSlot<dyn Statement>>,
    ) -> Self {
        let column_names = Arc::new(rows.columns().to_vec());
        let probe = RowsProbe::inspect(rows.as_ref());
        let slot = shared_slot(rows);
        ledger.track_cursor(&slot);
        Self {
            slot,
            column_names,
            probe,
            chain,
            ctx,
            owned_stmt,
        }
    }
}

#[async_trait]
impl Rows for InterceptRows {
    fn columns(&self) -> &[String] {
        self.chain.rows_columns(&self.ctx, &self.column_names);
        &self.column_names
    }

    async fn next(&mut self) -> Result<Option<Vec<Value>>, InterceptError> {
        let ctx = self.chain.before_rows_next(&self.ctx).await;
        let mut outcome = {
            let mut guard = self.slot.lock().await;
            match guard.get_mut() {
                Some(rows) => rows.next().await,
                None => Err(InterceptError::Closed("cursor")),
            }
        };
        self.chain.after_rows_next(&ctx, &mut outcome).await;
        outcome
    }

    /// Close the cursor. Idempotent at the proxy level: the second call
    /// returns success without forwarding to the concrete cursor.
    async fn close(&mut self) -> Result<(), InterceptError> {
        let ctx = self.chain.before_rows_close(&self.ctx).await;
        let mut outcome = {
            let mut guard = self.slot.lock().await;
            match guard.take() {
                Some(mut rows) => rows.close().await,
                None => Ok(()),
            }
        };
        if let Some(stmt_slot) = self.owned_stmt.take() {
            let mut guard = stmt_slot.lock().await;
            if let Some(mut stmt) = guard.take() {
                if let Err(err) = stmt.close().await {
                    tracing::debug!(error = %err, "closing fallback statement after cursor close failed");
                }
            }
        }
        self.chain.after_rows_close(&ctx, &mut outcome).await;
        outcome
    }

    fn column_types(&self) -> Option<Vec<ColumnType>> {
        self.probe.column_types.clone()
    }

    fn capabilities(&self) -> CapabilitySet {
        self.probe.caps
    }
}
