mod common;

use std::sync::Arc;

use sql_intercept::{
    Context, Interceptor, NullInterceptor, Value, build_result_set, positional_args,
};
use tokio::runtime::Runtime;

use common::FixtureConfig;

/// Chains made only of no-op interceptors must be semantically
/// transparent: same rows, same outcomes, same converted arguments as
/// direct delegation, for any chain length.
#[test]
fn null_chains_are_transparent() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;

    for chain_len in [0usize, 1, 4] {
        rt.block_on(async {
            let interceptors: Vec<Arc<dyn Interceptor>> = (0..chain_len)
                .map(|_| Arc::new(NullInterceptor) as Arc<dyn Interceptor>)
                .collect();
            let (mut conn, log) =
                common::connect_wrapped(FixtureConfig::single_row(), interceptors).await;

            let ctx = Context::new();
            let mut stmt = conn
                .prepare(&ctx, "SELECT id, name FROM people WHERE id = ?1")
                .await?;
            let mut rows = stmt
                .query(&ctx, &positional_args([Value::Int32(1)]))
                .await?;
            let set = build_result_set(rows.as_mut()).await?;

            assert_eq!(set.len(), 1);
            assert_eq!(*set.rows[0].get("id").unwrap().as_int().unwrap(), 1);
            assert_eq!(set.rows[0].get("name").unwrap().as_text().unwrap(), "alice");

            // The driver saw the argument in its canonical representation.
            let seen = log.last_args();
            assert_eq!(seen.len(), 1);
            assert_eq!(seen[0].value, Value::Int(1));

            stmt.close().await?;
            conn.close().await?;
            assert_eq!(log.stmt_queries.load(std::sync::atomic::Ordering::SeqCst), 1);
            assert_eq!(log.conn_closes.load(std::sync::atomic::Ordering::SeqCst), 1);

            Ok::<(), Box<dyn std::error::Error>>(())
        })?;
    }

    Ok(())
}

/// Exec through a wrapped statement behaves like direct delegation.
#[test]
fn exec_is_transparent() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let (mut conn, log) =
            common::connect_wrapped(FixtureConfig::single_row(), vec![Arc::new(NullInterceptor)])
                .await;

        let ctx = Context::new();
        let mut stmt = conn.prepare(&ctx, "UPDATE people SET name = ?1").await?;
        let outcome = stmt
            .exec(&ctx, &positional_args([Value::Text("bob".into())]))
            .await?;
        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(log.last_args()[0].value, Value::Text("bob".into()));

        stmt.close().await?;
        conn.close().await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
