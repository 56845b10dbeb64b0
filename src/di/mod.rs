//! Provider model for the dependency graph
//!
//! Providers are plain functions whose parameter and return types describe
//! their wiring, or values that already exist. Nothing is discovered by
//! reflection: every type that flows through the graph implements
//! [`Component`](crate::core::Component) or [`Dependency`].
//!
//! # Example
//! ```
//! use std::sync::Arc;
//! use trellis::di::{Lazy, Provider};
//! use trellis::resolver::DependencyGraph;
//! use trellis::wire::WireOption;
//!
//! struct Settings { url: String }
//! struct Pool { url: String }
//! struct Repo { pool: Lazy<Arc<Pool>> }
//!
//! fn new_pool(settings: Arc<Settings>) -> Arc<Pool> {
//!     Arc::new(Pool { url: settings.url.clone() })
//! }
//!
//! fn new_repo(pool: Lazy<Arc<Pool>>) -> Arc<Repo> {
//!     Arc::new(Repo { pool })
//! }
//!
//! # fn example() -> trellis::core::TrellisResult<()> {
//! let mut graph = DependencyGraph::new();
//! graph.register(Provider::instance(Arc::new(Settings { url: "db://".into() })), [])?;
//! graph.register(Provider::factory(new_pool), [WireOption::lazy_out()])?;
//! graph.register(Provider::factory(new_repo), [])?;
//! graph.resolve_all()?;
//!
//! let repo = graph.retrieve::<Arc<Repo>>()?.remove(0);
//! assert_eq!(repo.pool.get()?.url, "db://");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod component;
pub mod lazy;
pub mod lifecycle;
pub mod provider;

// Re-export key types
pub use component::{Argument, Dependency};
pub use lazy::Lazy;
pub use lifecycle::{
    Initializer, Ordered, StartListener, StopListener, HIGHEST_ORDER, LOWEST_ORDER,
};
pub use provider::{Factory, Provider};
