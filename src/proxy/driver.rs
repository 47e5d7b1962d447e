use std::sync::Arc;

use async_trait::async_trait;

use crate::chain::InterceptorChain;
use crate::context::Context;
use crate::driver::{Connection, Driver};
use crate::error::InterceptError;
use crate::interceptor::Interceptor;
use crate::proxy::connection::InterceptConnection;

/// Wrap a concrete driver with an ordered list of interceptors.
///
/// The returned driver implements the same [`Driver`] surface as the
/// wrapped one, so it can be registered under a driver name and used
/// anywhere an unwrapped driver could. Chain order is fixed here; it
/// cannot be changed afterwards.
#[must_use]
pub fn wrap_driver(
    driver: Box<dyn Driver>,
    interceptors: Vec<Arc<dyn Interceptor>>,
) -> InterceptDriver {
    InterceptDriver::new(driver, Arc::new(InterceptorChain::new(interceptors)))
}

/// Driver proxy: owns the concrete driver and hands out wrapped
/// connections.
pub struct InterceptDriver {
    inner: Box<dyn Driver>,
    chain: Arc<InterceptorChain>,
}

impl InterceptDriver {
    /// Wrap `driver` with an already-built chain, for callers that share
    /// one chain across several drivers.
    #[must_use]
    pub fn new(driver: Box<dyn Driver>, chain: Arc<InterceptorChain>) -> Self {
        Self {
            inner: driver,
            chain,
        }
    }

    /// The chain shared by every proxy this driver produces.
    #[must_use]
    pub fn chain(&self) -> &Arc<InterceptorChain> {
        &self.chain
    }
}

#[async_trait]
impl Driver for InterceptDriver {
    async fn connect(
        &self,
        ctx: &Context,
        dsn: &str,
    ) -> Result<Box<dyn Connection>, InterceptError> {
        let ctx = self.chain.before_connect(ctx, dsn).await;
        let mut outcome = self.inner.connect(&ctx, dsn).await;
        self.chain.after_connect(&ctx, dsn, &mut outcome).await;
        let conn = outcome?;
        Ok(Box::new(InterceptConnection::new(
            conn,
            Arc::clone(&self.chain),
            ctx,
        )))
    }
}
