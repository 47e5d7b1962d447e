//! Ordered interceptor composition.

use std::sync::Arc;

use crate::context::Context;
use crate::driver::{Connection, Rows, Statement, Transaction};
use crate::error::InterceptError;
use crate::interceptor::{Interceptor, Operation};
use crate::types::{ExecOutcome, NamedValue, Value};

/// An ordered list of interceptors, fixed at construction.
///
/// The per-operation participant lists are computed once here, from
/// [`Interceptor::intercepts`], so dispatching a call does not rebuild the
/// chain: an operation nobody subscribed to costs a single empty-slice
/// check on top of direct delegation. Before hooks run outermost-first and
/// thread the context downward; after hooks run in reverse, so the
/// outermost interceptor observes the final outcome.
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
    active: Vec<Vec<usize>>,
}

macro_rules! hook_pair {
    (
        $op:expr,
        $before:ident ( $($bp:ident : $bty:ty),* ),
        $after:ident ( $($ap:ident : $aty:ty),* ),
        $out:ty
    ) => {
        pub(crate) async fn $before(&self, ctx: &Context $(, $bp: $bty)*) -> Context {
            let mut ctx = ctx.clone();
            for &i in self.hooks($op) {
                ctx = self.interceptors[i].$before(&ctx $(, $bp)*).await;
            }
            ctx
        }

        pub(crate) async fn $after(
            &self,
            ctx: &Context
            $(, $ap: $aty)*,
            outcome: &mut Result<$out, InterceptError>,
        ) {
            for &i in self.hooks($op).iter().rev() {
                self.interceptors[i].$after(ctx $(, $ap)*, outcome).await;
            }
        }
    };
}

impl InterceptorChain {
    /// Build a chain from `interceptors`, in invocation order.
    #[must_use]
    pub fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        let mut active = vec![Vec::new(); Operation::COUNT];
        for op in Operation::ALL {
            active[op as usize] = interceptors
                .iter()
                .enumerate()
                .filter(|(_, interceptor)| interceptor.intercepts(op))
                .map(|(idx, _)| idx)
                .collect();
        }
        Self {
            interceptors,
            active,
        }
    }

    /// Number of interceptors in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Whether the chain holds no interceptors at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Whether any interceptor participates in `op`.
    #[must_use]
    pub fn is_active(&self, op: Operation) -> bool {
        !self.hooks(op).is_empty()
    }

    fn hooks(&self, op: Operation) -> &[usize] {
        &self.active[op as usize]
    }

    hook_pair!(
        Operation::Connect,
        before_connect(dsn: &str),
        after_connect(dsn: &str),
        Box<dyn Connection>
    );
    hook_pair!(
        Operation::Prepare,
        before_prepare(sql: &str),
        after_prepare(sql: &str),
        Box<dyn Statement>
    );
    hook_pair!(
        Operation::Begin,
        before_begin(),
        after_begin(),
        Box<dyn Transaction>
    );
    hook_pair!(
        Operation::ConnExec,
        before_conn_exec(sql: &str, args: &[NamedValue]),
        after_conn_exec(sql: &str),
        ExecOutcome
    );
    hook_pair!(
        Operation::ConnQuery,
        before_conn_query(sql: &str, args: &[NamedValue]),
        after_conn_query(sql: &str),
        Box<dyn Rows>
    );
    hook_pair!(
        Operation::ConnReset,
        before_conn_reset(),
        after_conn_reset(),
        ()
    );
    hook_pair!(
        Operation::ConnClose,
        before_conn_close(),
        after_conn_close(),
        ()
    );
    hook_pair!(
        Operation::StmtExec,
        before_stmt_exec(sql: &str, args: &[NamedValue]),
        after_stmt_exec(sql: &str),
        ExecOutcome
    );
    hook_pair!(
        Operation::StmtQuery,
        before_stmt_query(sql: &str, args: &[NamedValue]),
        after_stmt_query(sql: &str),
        Box<dyn Rows>
    );
    hook_pair!(
        Operation::StmtClose,
        before_stmt_close(sql: &str),
        after_stmt_close(sql: &str),
        ()
    );
    hook_pair!(
        Operation::RowsNext,
        before_rows_next(),
        after_rows_next(),
        Option<Vec<Value>>
    );
    hook_pair!(
        Operation::RowsClose,
        before_rows_close(),
        after_rows_close(),
        ()
    );
    hook_pair!(Operation::TxCommit, before_commit(), after_commit(), ());
    hook_pair!(
        Operation::TxRollback,
        before_rollback(),
        after_rollback(),
        ()
    );

    /// Fire the cursor-columns observation hooks.
    pub(crate) fn rows_columns(&self, ctx: &Context, columns: &[String]) {
        for &i in self.hooks(Operation::RowsColumns) {
            self.interceptors[i].on_rows_columns(ctx, columns);
        }
    }

    /// Run the value-check override hooks. The first `Some` wins.
    pub(crate) fn value_check(
        &self,
        ctx: &Context,
        arg: &NamedValue,
    ) -> Option<Result<Value, InterceptError>> {
        for &i in self.hooks(Operation::ValueCheck) {
            if let Some(result) = self.interceptors[i].value_check(ctx, arg) {
                return Some(result);
            }
        }
        None
    }
}
