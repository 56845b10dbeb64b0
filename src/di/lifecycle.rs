//! Capability traits the bootstrap looks for after resolution.

use crate::config::ApplicationInfo;
use crate::core::TrellisResult;
use std::sync::Arc;

/// Highest priority a provider can declare.
pub const HIGHEST_ORDER: i32 = 0;

/// Lowest priority a provider can declare.
pub const LOWEST_ORDER: i32 = i32::MAX;

/// Priority of a provided value; lower values are retrieved first.
pub trait Ordered {
    fn order(&self) -> i32;
}

impl<T: Ordered + ?Sized> Ordered for Arc<T> {
    fn order(&self) -> i32 {
        (**self).order()
    }
}

/// Invoked once the graph is resolved, before any start listener.
///
/// Implementations should be thread-safe (Send + Sync).
pub trait Initializer: Send + Sync {
    fn initialize(&self, app: &ApplicationInfo) -> TrellisResult<()>;
}

/// Notified when the application has started.
pub trait StartListener: Send + Sync {
    fn on_start(&self);
}

/// Notified when the application is stopping.
pub trait StopListener: Send + Sync {
    fn on_stop(&self);
}
