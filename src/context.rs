use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

/// Key identifying a context value. Keys compare by name, so callers
/// should namespace them (`"myapp.request-id"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextKey(&'static str);

impl ContextKey {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

/// Immutable, append-only key/value association carried alongside every
/// intercepted call.
///
/// Deriving a child context is a copy-with-overlay operation: the parent is
/// never mutated, and the new entry shadows any earlier entry under the
/// same key. Cloning is cheap (an `Arc` bump), so contexts can be threaded
/// through the whole proxy graph freely.
///
/// A context may also carry a [`CancellationToken`]. This layer forwards
/// the token untouched; honoring it is the wrapped driver's job.
///
/// ```rust
/// use sql_intercept::{Context, ContextKey};
///
/// const REQUEST_ID: ContextKey = ContextKey::new("demo.request-id");
///
/// let root = Context::new();
/// let child = root.with_value(REQUEST_ID, 42_u64);
/// assert_eq!(child.value::<u64>(REQUEST_ID).as_deref(), Some(&42));
/// assert!(root.value::<u64>(REQUEST_ID).is_none());
/// ```
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Entry>>,
    cancel: Option<CancellationToken>,
}

struct Entry {
    key: ContextKey,
    value: Arc<dyn Any + Send + Sync>,
    parent: Option<Arc<Entry>>,
}

impl Context {
    /// An empty root context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a child context with `value` stored under `key`. The new
    /// entry shadows any existing entry for the same key; the parent
    /// context is left untouched.
    #[must_use]
    pub fn with_value<T>(&self, key: ContextKey, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            head: Some(Arc::new(Entry {
                key,
                value: Arc::new(value),
                parent: self.head.clone(),
            })),
            cancel: self.cancel.clone(),
        }
    }

    /// Look up the most recently attached value for `key`, downcast to `T`.
    /// Returns `None` when the key is absent or holds a different type.
    #[must_use]
    pub fn value<T>(&self, key: ContextKey) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        let mut current = self.head.as_ref();
        while let Some(entry) = current {
            if entry.key == key {
                return Arc::clone(&entry.value).downcast::<T>().ok();
            }
            current = entry.parent.as_ref();
        }
        None
    }

    /// Whether any value is attached under `key`.
    #[must_use]
    pub fn contains(&self, key: ContextKey) -> bool {
        let mut current = self.head.as_ref();
        while let Some(entry) = current {
            if entry.key == key {
                return true;
            }
            current = entry.parent.as_ref();
        }
        false
    }

    /// Derive a child context carrying `token` for cancellation signaling.
    #[must_use]
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self {
            head: self.head.clone(),
            cancel: Some(token),
        }
    }

    /// The cancellation token attached to this context, if any.
    #[must_use]
    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    /// Whether the attached cancellation token has been triggered. Always
    /// false when no token is attached.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys = Vec::new();
        let mut current = self.head.as_ref();
        while let Some(entry) = current {
            keys.push(entry.key.name());
            current = entry.parent.as_ref();
        }
        f.debug_struct("Context")
            .field("keys", &keys)
            .field("cancellable", &self.cancel.is_some())
            .finish()
    }
}
