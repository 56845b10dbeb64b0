//! Deferred, memoized construction for lazy-output providers.

use crate::core::{Component, TrellisError, TrellisResult, Value};
use once_cell::sync::OnceCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

type Init = Box<dyn Fn() -> TrellisResult<Value> + Send + Sync>;

/// Type-erased single-flight cell behind every [`Lazy`] handle.
///
/// Concurrent first callers block on the cell; the initializer runs at most
/// once and its value is returned to every caller afterwards.
pub struct LazyCell {
    name: String,
    cell: OnceCell<Value>,
    init: Init,
}

impl LazyCell {
    pub(crate) fn new(
        name: impl Into<String>,
        init: impl Fn() -> TrellisResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            cell: OnceCell::new(),
            init: Box::new(init),
        }
    }

    /// A cell that is already initialized, used when a default value stands
    /// in for a lazily consumed provider.
    pub(crate) fn ready(name: impl Into<String>, value: Value) -> Self {
        let name = name.into();
        let err_name = name.clone();
        Self {
            name,
            cell: OnceCell::with_value(value),
            init: Box::new(move || {
                Err(TrellisError::Instantiation {
                    node: err_name.clone(),
                    reason: "ready lazy cell has no initializer".to_string(),
                })
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn force(&self) -> TrellisResult<&Value> {
        self.cell.get_or_try_init(|| {
            tracing::debug!(node = %self.name, "constructing lazy provider");
            (self.init)()
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl fmt::Debug for LazyCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCell")
            .field("name", &self.name)
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// Zero-argument handle to a lazily constructed dependency.
///
/// Declare a factory input as `Lazy<Arc<T>>` and register the supplying
/// provider with [`WireOption::lazy_out`](crate::wire::WireOption::lazy_out).
/// The supplier's factory runs on the first [`Lazy::get`], exactly once, no
/// matter how many clones of the handle exist or which threads call it.
pub struct Lazy<T> {
    cell: Arc<LazyCell>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> Lazy<T> {
    pub(crate) fn from_cell(cell: Arc<LazyCell>) -> Self {
        Self {
            cell,
            _marker: PhantomData,
        }
    }

    /// Construct on first use, then return the memoized value.
    pub fn get(&self) -> TrellisResult<T> {
        let value = self.cell.force()?;
        T::from_value(value).ok_or_else(|| TrellisError::Instantiation {
            node: self.cell.name().to_string(),
            reason: format!("lazy value is not a {}", T::descriptor()),
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.is_initialized()
    }
}

impl<T> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Lazy").field(&self.cell).finish()
    }
}
