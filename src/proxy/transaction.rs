use std::sync::Arc;

use async_trait::async_trait;

use crate::chain::InterceptorChain;
use crate::context::Context;
use crate::driver::Transaction;
use crate::error::InterceptError;

/// Transaction proxy.
///
/// Commit and rollback hooks run with the context derived when the
/// transaction was begun. Once the transaction has committed or rolled
/// back, further calls fail with a closed-resource error; the concrete
/// transaction is never driven twice.
pub struct InterceptTransaction {
    inner: Option<Box<dyn Transaction>>,
    chain: Arc<InterceptorChain>,
    ctx: Context,
}

impl InterceptTransaction {
    pub(crate) fn new(tx: Box<dyn Transaction>, chain: Arc<InterceptorChain>, ctx: Context) -> Self {
        Self {
            inner: Some(tx),
            chain,
            ctx,
        }
    }
}

#[async_trait]
impl Transaction for InterceptTransaction {
    async fn commit(&mut self) -> Result<(), InterceptError> {
        let ctx = self.chain.before_commit(&self.ctx).await;
        let mut outcome = match self.inner.as_deref_mut() {
            Some(tx) => tx.commit().await,
            None => Err(InterceptError::Closed("transaction")),
        };
        if outcome.is_ok() {
            self.inner = None;
        }
        self.chain.after_commit(&ctx, &mut outcome).await;
        outcome
    }

    async fn rollback(&mut self) -> Result<(), InterceptError> {
        let ctx = self.chain.before_rollback(&self.ctx).await;
        let mut outcome = match self.inner.as_deref_mut() {
            Some(tx) => tx.rollback().await,
            None => Err(InterceptError::Closed("transaction")),
        };
        if outcome.is_ok() {
            self.inner = None;
        }
        self.chain.after_rollback(&ctx, &mut outcome).await;
        outcome
    }
}
