//! Shared in-memory fixture driver for the integration tests. Records
//! what the concrete layer observed so tests can assert on it.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use sql_intercept::driver::{Connection, Driver, Rows, Statement, Transaction, ValueChecker};
use sql_intercept::{
    Capability, CapabilitySet, ColumnType, Context, ExecOutcome, InterceptError, Interceptor,
    NamedValue, Value, default_convert, wrap_driver,
};

pub const DSN: &str = "fixture://test";

/// Everything the concrete driver observed, shared with test assertions.
#[derive(Default)]
pub struct DriverLog {
    pub prepares: AtomicUsize,
    pub direct_execs: AtomicUsize,
    pub direct_queries: AtomicUsize,
    pub stmt_execs: AtomicUsize,
    pub stmt_queries: AtomicUsize,
    pub received_args: Mutex<Vec<Vec<NamedValue>>>,
    pub conn_checker_called: AtomicBool,
    pub stmt_checker_called: AtomicBool,
    pub conn_closes: AtomicUsize,
    pub stmt_closes: AtomicUsize,
    pub rows_closes: AtomicUsize,
    pub resets: AtomicUsize,
    pub batches: AtomicUsize,
    pub commits: AtomicUsize,
    pub rollbacks: AtomicUsize,
}

impl DriverLog {
    pub fn last_args(&self) -> Vec<NamedValue> {
        self.received_args
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }

    fn record_args(&self, args: &[NamedValue]) {
        self.received_args.lock().unwrap().push(args.to_vec());
    }
}

/// Fixture knobs: result data plus which optional capabilities the
/// concrete objects advertise.
#[derive(Clone, Default)]
pub struct FixtureConfig {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub conn_checker: bool,
    pub stmt_checker: bool,
    pub direct_exec: bool,
    pub direct_query: bool,
    pub session_reset: bool,
    pub batch: bool,
    pub column_types: bool,
    pub fail_query: Option<String>,
}

impl FixtureConfig {
    pub fn single_row() -> Self {
        Self {
            columns: vec!["id".into(), "name".into()],
            rows: vec![vec![Value::Int(1), Value::Text("alice".into())]],
            ..Self::default()
        }
    }
}

pub struct FixtureDriver {
    config: FixtureConfig,
    log: Arc<DriverLog>,
}

impl FixtureDriver {
    pub fn new(config: FixtureConfig) -> (Self, Arc<DriverLog>) {
        let log = Arc::new(DriverLog::default());
        (
            Self {
                config,
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

#[async_trait]
impl Driver for FixtureDriver {
    async fn connect(
        &self,
        _ctx: &Context,
        _dsn: &str,
    ) -> Result<Box<dyn Connection>, InterceptError> {
        Ok(Box::new(FixtureConnection {
            config: self.config.clone(),
            log: Arc::clone(&self.log),
        }))
    }
}

enum CheckerSite {
    Connection,
    Statement,
}

struct RecordingChecker {
    log: Arc<DriverLog>,
    site: CheckerSite,
}

impl ValueChecker for RecordingChecker {
    fn check(&self, arg: &NamedValue) -> Result<Value, InterceptError> {
        match self.site {
            CheckerSite::Connection => self.log.conn_checker_called.store(true, Ordering::SeqCst),
            CheckerSite::Statement => self.log.stmt_checker_called.store(true, Ordering::SeqCst),
        }
        default_convert(&arg.value)
    }
}

struct FixtureConnection {
    config: FixtureConfig,
    log: Arc<DriverLog>,
}

fn make_rows(config: &FixtureConfig, log: &Arc<DriverLog>) -> Box<dyn Rows> {
    Box::new(FixtureRows {
        columns: config.columns.clone(),
        rows: config.rows.clone().into(),
        column_types: config.column_types,
        log: Arc::clone(log),
    })
}

#[async_trait]
impl Connection for FixtureConnection {
    async fn prepare(
        &mut self,
        _ctx: &Context,
        sql: &str,
    ) -> Result<Box<dyn Statement>, InterceptError> {
        self.log.prepares.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixtureStatement {
            config: self.config.clone(),
            log: Arc::clone(&self.log),
            sql: sql.to_string(),
        }))
    }

    async fn begin(&mut self, _ctx: &Context) -> Result<Box<dyn Transaction>, InterceptError> {
        Ok(Box::new(FixtureTransaction {
            log: Arc::clone(&self.log),
        }))
    }

    async fn close(&mut self) -> Result<(), InterceptError> {
        self.log.conn_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exec(
        &mut self,
        _ctx: &Context,
        _sql: &str,
        args: &[NamedValue],
    ) -> Result<ExecOutcome, InterceptError> {
        self.log.direct_execs.fetch_add(1, Ordering::SeqCst);
        self.log.record_args(args);
        Ok(ExecOutcome {
            rows_affected: 1,
            last_insert_id: Some(1),
        })
    }

    async fn query(
        &mut self,
        _ctx: &Context,
        _sql: &str,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, InterceptError> {
        self.log.direct_queries.fetch_add(1, Ordering::SeqCst);
        self.log.record_args(args);
        Ok(make_rows(&self.config, &self.log))
    }

    async fn reset(&mut self) -> Result<(), InterceptError> {
        self.log.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn exec_batch(&mut self, _ctx: &Context, _script: &str) -> Result<(), InterceptError> {
        self.log.batches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn capabilities(&self) -> CapabilitySet {
        let mut caps = CapabilitySet::NONE;
        if self.config.direct_exec {
            caps = caps.with(Capability::DirectExec);
        }
        if self.config.direct_query {
            caps = caps.with(Capability::DirectQuery);
        }
        if self.config.session_reset {
            caps = caps.with(Capability::SessionReset);
        }
        if self.config.batch {
            caps = caps.with(Capability::Batch);
        }
        caps
    }

    fn value_checker(&self) -> Option<Arc<dyn ValueChecker>> {
        self.config.conn_checker.then(|| {
            Arc::new(RecordingChecker {
                log: Arc::clone(&self.log),
                site: CheckerSite::Connection,
            }) as Arc<dyn ValueChecker>
        })
    }
}

struct FixtureStatement {
    config: FixtureConfig,
    log: Arc<DriverLog>,
    sql: String,
}

#[async_trait]
impl Statement for FixtureStatement {
    async fn exec(
        &mut self,
        _ctx: &Context,
        args: &[NamedValue],
    ) -> Result<ExecOutcome, InterceptError> {
        self.log.stmt_execs.fetch_add(1, Ordering::SeqCst);
        self.log.record_args(args);
        Ok(ExecOutcome {
            rows_affected: 1,
            last_insert_id: None,
        })
    }

    async fn query(
        &mut self,
        _ctx: &Context,
        args: &[NamedValue],
    ) -> Result<Box<dyn Rows>, InterceptError> {
        self.log.stmt_queries.fetch_add(1, Ordering::SeqCst);
        self.log.record_args(args);
        if let Some(msg) = &self.config.fail_query {
            return Err(InterceptError::driver(std::io::Error::other(msg.clone())));
        }
        Ok(make_rows(&self.config, &self.log))
    }

    async fn close(&mut self) -> Result<(), InterceptError> {
        self.log.stmt_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn value_checker(&self) -> Option<Arc<dyn ValueChecker>> {
        self.config.stmt_checker.then(|| {
            Arc::new(RecordingChecker {
                log: Arc::clone(&self.log),
                site: CheckerSite::Statement,
            }) as Arc<dyn ValueChecker>
        })
    }
}

struct FixtureRows {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    column_types: bool,
    log: Arc<DriverLog>,
}

#[async_trait]
impl Rows for FixtureRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next(&mut self) -> Result<Option<Vec<Value>>, InterceptError> {
        Ok(self.rows.pop_front())
    }

    async fn close(&mut self) -> Result<(), InterceptError> {
        self.log.rows_closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn column_types(&self) -> Option<Vec<ColumnType>> {
        self.column_types.then(|| {
            self.columns
                .iter()
                .map(|name| ColumnType {
                    name: name.clone(),
                    type_name: "TEXT".to_string(),
                    nullable: Some(true),
                })
                .collect()
        })
    }

    fn capabilities(&self) -> CapabilitySet {
        if self.column_types {
            CapabilitySet::NONE.with(Capability::ColumnTypes)
        } else {
            CapabilitySet::NONE
        }
    }
}

struct FixtureTransaction {
    log: Arc<DriverLog>,
}

#[async_trait]
impl Transaction for FixtureTransaction {
    async fn commit(&mut self) -> Result<(), InterceptError> {
        self.log.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), InterceptError> {
        self.log.rollbacks.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Wrap a fixture driver and open one connection through it.
pub async fn connect_wrapped(
    config: FixtureConfig,
    interceptors: Vec<Arc<dyn Interceptor>>,
) -> (Box<dyn Connection>, Arc<DriverLog>) {
    let (driver, log) = FixtureDriver::new(config);
    let wrapped = wrap_driver(Box::new(driver), interceptors);
    let conn = wrapped
        .connect(&Context::new(), DSN)
        .await
        .expect("fixture connect never fails");
    (conn, log)
}
