mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sql_intercept::{Context, ContextKey, InterceptError, Interceptor, Operation};
use tokio::runtime::Runtime;

use common::FixtureConfig;

const TX_TAG: ContextKey = ContextKey::new("test.tx-tag");

/// Tags the context at begin and counts how many commit/rollback hooks
/// ran with the tag visible.
#[derive(Default)]
struct TxObserver {
    tagged_commits: AtomicUsize,
    tagged_rollbacks: AtomicUsize,
}

#[async_trait]
impl Interceptor for TxObserver {
    fn intercepts(&self, op: Operation) -> bool {
        matches!(
            op,
            Operation::Begin | Operation::TxCommit | Operation::TxRollback
        )
    }

    async fn before_begin(&self, ctx: &Context) -> Context {
        ctx.with_value(TX_TAG, true)
    }

    async fn after_commit(&self, ctx: &Context, _outcome: &mut Result<(), InterceptError>) {
        if ctx.value::<bool>(TX_TAG).is_some() {
            self.tagged_commits.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn after_rollback(&self, ctx: &Context, _outcome: &mut Result<(), InterceptError>) {
        if ctx.value::<bool>(TX_TAG).is_some() {
            self.tagged_rollbacks.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Commit and rollback hooks run with the context derived at begin, and
/// a finished transaction proxy rejects further calls without driving
/// the concrete transaction twice.
#[test]
fn transactions_commit_once_and_carry_the_begin_context()
-> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let observer = Arc::new(TxObserver::default());
        let (mut conn, log) =
            common::connect_wrapped(FixtureConfig::single_row(), vec![observer.clone()]).await;

        let ctx = Context::new();
        let mut tx = conn.begin(&ctx).await?;
        tx.commit().await?;
        assert_eq!(log.commits.load(Ordering::SeqCst), 1);
        assert_eq!(observer.tagged_commits.load(Ordering::SeqCst), 1);

        let err = tx.commit().await.unwrap_err();
        assert!(err.is_closed());
        assert_eq!(err.to_string(), "use of closed transaction");
        assert_eq!(log.commits.load(Ordering::SeqCst), 1);

        let err = tx.rollback().await.unwrap_err();
        assert!(err.is_closed());
        assert_eq!(log.rollbacks.load(Ordering::SeqCst), 0);

        conn.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn rollback_finishes_the_transaction() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let observer = Arc::new(TxObserver::default());
        let (mut conn, log) =
            common::connect_wrapped(FixtureConfig::single_row(), vec![observer.clone()]).await;

        let mut tx = conn.begin(&Context::new()).await?;
        tx.rollback().await?;
        assert_eq!(log.rollbacks.load(Ordering::SeqCst), 1);
        assert_eq!(observer.tagged_rollbacks.load(Ordering::SeqCst), 1);
        assert!(tx.rollback().await.unwrap_err().is_closed());

        conn.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
