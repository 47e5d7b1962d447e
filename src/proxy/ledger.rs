//! Child resource tracking for the connection close cascade.

use std::sync::{Arc, Mutex, Weak};

use tokio::sync::Mutex as AsyncMutex;

use crate::driver::{Rows, Statement};

/// Holder for a concrete driver object. `None` means closed; taking the
/// inner value out is what makes double-close structurally impossible.
pub(crate) struct Slot<T: ?Sized>(Option<Box<T>>);

impl<T: ?Sized> Slot<T> {
    pub(crate) fn new(inner: Box<T>) -> Self {
        Self(Some(inner))
    }

    pub(crate) fn get_mut(&mut self) -> Option<&mut T> {
        self.0.as_deref_mut()
    }

    pub(crate) fn take(&mut self) -> Option<Box<T>> {
        self.0.take()
    }
}

pub(crate) type SharedSlot<T> = Arc<AsyncMutex<Slot<T>>>;

pub(crate) fn shared_slot<T: ?Sized>(inner: Box<T>) -> SharedSlot<T> {
    Arc::new(AsyncMutex::new(Slot::new(inner)))
}

/// Registry of the statements and cursors a connection proxy has produced
/// and not yet seen closed. Holds weak references only: a child that was
/// dropped (and therefore can never be used again) costs nothing at
/// teardown.
#[derive(Default)]
pub(crate) struct Ledger {
    statements: Mutex<Vec<Weak<AsyncMutex<Slot<dyn Statement>>>>>,
    cursors: Mutex<Vec<Weak<AsyncMutex<Slot<dyn Rows>>>>>,
}

impl Ledger {
    pub(crate) fn track_statement(&self, slot: &SharedSlot<dyn Statement>) {
        self.statements
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(Arc::downgrade(slot));
    }

    pub(crate) fn track_cursor(&self, slot: &SharedSlot<dyn Rows>) {
        self.cursors
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(Arc::downgrade(slot));
    }

    /// Close every still-open child: cursors first, then statements.
    /// Failures here are logged rather than surfaced; the connection's own
    /// close error is the one callers see.
    pub(crate) async fn close_children(&self) {
        let cursors = std::mem::take(
            &mut *self
                .cursors
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        );
        for weak in cursors {
            if let Some(slot) = weak.upgrade() {
                let mut guard = slot.lock().await;
                if let Some(mut rows) = guard.take() {
                    if let Err(err) = rows.close().await {
                        tracing::debug!(error = %err, "cursor close during connection teardown failed");
                    }
                }
            }
        }

        let statements = std::mem::take(
            &mut *self
                .statements
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        );
        for weak in statements {
            if let Some(slot) = weak.upgrade() {
                let mut guard = slot.lock().await;
                if let Some(mut stmt) = guard.take() {
                    if let Err(err) = stmt.close().await {
                        tracing::debug!(error = %err, "statement close during connection teardown failed");
                    }
                }
            }
        }
    }
}
