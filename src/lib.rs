//! Trellis: a dependency-injection object graph resolver
//!
//! Providers (factory functions or ready-made instances) are registered with
//! positional wire options, the graph links every factory input to the
//! provider that satisfies it, and values are constructed on demand in
//! dependency order. Structural descriptors and the option model live in
//! `trellis-core`; this crate adds the typed provider API, resolution and
//! the application lifecycle.

pub use trellis_core::{
    format_start_error, Component, CycleError, Descriptor, ProviderKey, TrellisError,
    TrellisResult, WireOption, WireOptions,
};

/// Descriptors and errors re-exported from trellis-core.
pub mod core {
    pub use trellis_core::core::*;
}

/// Wire options re-exported from trellis-core.
pub mod wire {
    pub use trellis_core::wire::*;
}

/// Resolver configuration.
pub mod config;

/// Providers, dependency kinds and lifecycle traits.
pub mod di;

/// Graph resolution and instantiation.
pub mod resolver;

/// Application bootstrap and logging setup.
pub mod app;

pub use app::Application;
pub use config::{ApplicationInfo, ResolverConfig};
pub use di::{Lazy, Provider};
pub use resolver::DependencyGraph;
