//! Lazy providers: deferred, single-flight construction

use super::common::*;
use std::sync::Arc;
use std::thread;
use trellis::core::TrellisError;
use trellis::di::{Lazy, Provider};
use trellis::resolver::DependencyGraph;
use trellis::wire::WireOption;

fn lazy_graph(counter: Arc<Counter>) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    graph.register(Provider::instance(counter), []).unwrap();
    graph
        .register(Provider::factory(new_expensive), [WireOption::lazy_out()])
        .unwrap();
    graph.register(Provider::factory(new_holder), []).unwrap();
    graph
}

#[test]
fn test_lazy_factory_deferred_until_first_use() {
    let counter = Arc::new(Counter::default());
    let mut graph = lazy_graph(counter.clone());

    let holder = graph.retrieve::<Arc<Holder>>().unwrap().remove(0);
    assert_eq!(counter.get(), 0);
    assert!(!holder.expensive.is_initialized());

    let first = holder.expensive.get().unwrap();
    let second = holder.expensive.get().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(counter.get(), 1);
}

#[test]
fn test_lazy_factory_runs_once_across_threads() {
    let counter = Arc::new(Counter::default());
    let mut graph = lazy_graph(counter.clone());
    let holder = graph.retrieve::<Arc<Holder>>().unwrap().remove(0);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let holder = holder.clone();
            thread::spawn(move || holder.expensive.get().unwrap())
        })
        .collect();
    let values: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(counter.get(), 1);
    assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
    assert_eq!(values[0].id, 1);
}

#[test]
fn test_retrieving_lazy_provider_forces_it() {
    let counter = Arc::new(Counter::default());
    let mut graph = lazy_graph(counter.clone());

    let holder = graph.retrieve::<Arc<Holder>>().unwrap().remove(0);
    let direct = graph.retrieve::<Arc<Expensive>>().unwrap().remove(0);
    assert_eq!(counter.get(), 1);
    assert!(Arc::ptr_eq(&direct, &holder.expensive.get().unwrap()));
}

#[test]
fn test_lazy_input_requires_lazy_provider() {
    let mut graph = DependencyGraph::new();
    graph.register(Provider::instance(Arc::new(Counter::default())), []).unwrap();
    graph.register(Provider::factory(new_expensive), []).unwrap();
    graph.register(Provider::factory(new_holder), []).unwrap();

    let err = graph.resolve_all().unwrap_err();
    match err {
        TrellisError::LazyMismatch { provider, .. } => assert!(provider.ends_with("new_expensive")),
        other => panic!("expected lazy mismatch, got {other}"),
    }
}

#[test]
fn test_plain_input_rejects_lazy_provider() {
    let mut graph = DependencyGraph::new();
    graph.register(Provider::instance(Arc::new(Counter::default())), []).unwrap();
    graph
        .register(Provider::factory(new_expensive), [WireOption::lazy_out()])
        .unwrap();
    graph.register(Provider::factory(new_eager_holder), []).unwrap();

    let err = graph.resolve_all().unwrap_err();
    assert!(matches!(err, TrellisError::LazyMismatch { .. }));
}

#[test]
fn test_lazy_input_with_default() {
    let mut graph = DependencyGraph::new();
    graph
        .register(
            Provider::factory(new_holder),
            [WireOption::default_value_in(Arc::new(Expensive { id: 42 }))],
        )
        .unwrap();

    let holder = graph.retrieve::<Arc<Holder>>().unwrap().remove(0);
    assert!(holder.expensive.is_initialized());
    assert_eq!(holder.expensive.get().unwrap().id, 42);
}

#[test]
fn test_lazy_members_forced_for_collections() {
    fn new_lazy_plugin() -> Arc<Plugin> {
        plugin("lazy")
    }

    let mut graph = DependencyGraph::new();
    graph.register(Provider::instance(plugin("eager")), []).unwrap();
    graph
        .register(Provider::factory(new_lazy_plugin), [WireOption::lazy_out()])
        .unwrap();
    graph.register(Provider::factory(new_host), []).unwrap();

    let host = graph.retrieve::<Arc<Host>>().unwrap().remove(0);
    assert_eq!(host.names(), vec!["eager", "lazy"]);
}

struct Registry {
    plugins: Lazy<Vec<Arc<Plugin>>>,
}

fn new_registry(plugins: Lazy<Vec<Arc<Plugin>>>) -> Arc<Registry> {
    Arc::new(Registry { plugins })
}

#[test]
fn test_lazy_collection_input_rejected() {
    fn new_lazy_plugin() -> Arc<Plugin> {
        plugin("lazy")
    }

    let mut graph = DependencyGraph::new();
    graph
        .register(Provider::factory(new_lazy_plugin), [WireOption::lazy_out()])
        .unwrap();
    graph.register(Provider::factory(new_registry), []).unwrap();

    let err = graph.resolve_all().unwrap_err();
    match err {
        TrellisError::LazyMismatch { provider, .. } => assert!(provider.ends_with("new_registry")),
        other => panic!("expected lazy mismatch, got {other}"),
    }
}

struct Left {
    right: Lazy<Arc<Right>>,
}

struct Right;

fn new_left(right: Lazy<Arc<Right>>) -> Arc<Left> {
    Arc::new(Left { right })
}

fn new_right(_left: Arc<Left>) -> Arc<Right> {
    Arc::new(Right)
}

#[test]
fn test_lazy_edge_does_not_break_cycle() {
    let mut graph = DependencyGraph::new();
    graph.register(Provider::factory(new_left), []).unwrap();
    graph
        .register(Provider::factory(new_right), [WireOption::lazy_out()])
        .unwrap();

    let err = graph.resolve_all().unwrap_err();
    assert!(matches!(err, TrellisError::Cycle(_)));
    assert!(!trellis::format_start_error(&err).contains("Lazy"));
}
