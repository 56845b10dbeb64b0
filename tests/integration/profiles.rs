//! Profile gating of providers

use super::common::*;
use std::sync::Arc;
use trellis::core::TrellisError;
use trellis::di::Provider;
use trellis::resolver::DependencyGraph;
use trellis::wire::WireOption;

fn gated_databases(graph: &mut DependencyGraph) {
    graph
        .register(
            Provider::instance(Arc::new(Database { url: "db://dev".into() })),
            [WireOption::active_out(["dev", "test"])],
        )
        .unwrap();
    graph
        .register(
            Provider::instance(Arc::new(Database { url: "db://prod".into() })),
            [WireOption::active_out(["prod"])],
        )
        .unwrap();
    graph.register(Provider::factory(new_repository), []).unwrap();
}

#[test]
fn test_profile_selects_candidate() {
    let mut dev = DependencyGraph::with_profile("dev");
    gated_databases(&mut dev);
    let repos = dev.retrieve::<Arc<Repository>>().unwrap();
    assert_eq!(repos[0].db.url, "db://dev");

    let mut prod = DependencyGraph::with_profile("prod");
    gated_databases(&mut prod);
    let repos = prod.retrieve::<Arc<Repository>>().unwrap();
    assert_eq!(repos[0].db.url, "db://prod");
}

#[test]
fn test_no_active_candidate_is_unmet() {
    let mut graph = DependencyGraph::with_profile("staging");
    gated_databases(&mut graph);
    let err = graph.resolve_all().unwrap_err();
    assert!(matches!(err, TrellisError::UnmetDependency { .. }));

    let mut graph = DependencyGraph::new();
    gated_databases(&mut graph);
    assert!(graph.resolve_all().is_err());
}

#[test]
fn test_inactive_candidate_falls_back_to_default() {
    let mut graph = DependencyGraph::with_profile("dev");
    graph
        .register(
            Provider::instance(settings("db://prod")),
            [WireOption::active_out(["prod"])],
        )
        .unwrap();
    graph
        .register(
            Provider::factory(new_database),
            [WireOption::default_value_in(settings("db://local"))],
        )
        .unwrap();

    let dbs = graph.retrieve::<Arc<Database>>().unwrap();
    assert_eq!(dbs[0].url, "db://local");
}

#[test]
fn test_collection_skips_inactive_members() {
    let mut graph = DependencyGraph::with_profile("dev");
    graph.register(Provider::instance(plugin("a")), []).unwrap();
    graph
        .register(Provider::instance(plugin("b")), [WireOption::active_out(["prod"])])
        .unwrap();
    graph
        .register(Provider::instance(plugin("c")), [WireOption::active_out(["dev"])])
        .unwrap();
    graph.register(Provider::factory(new_host), []).unwrap();

    let host = graph.retrieve::<Arc<Host>>().unwrap().remove(0);
    assert_eq!(host.names(), vec!["a", "c"]);

    let retrieved = graph.retrieve::<Arc<Plugin>>().unwrap();
    let names: Vec<_> = retrieved.iter().map(|p| p.name).collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn test_collection_with_only_inactive_members_is_empty() {
    let mut graph = DependencyGraph::with_profile("dev");
    graph
        .register(Provider::instance(plugin("b")), [WireOption::active_out(["prod"])])
        .unwrap();
    graph.register(Provider::factory(new_host), []).unwrap();

    let host = graph.retrieve::<Arc<Host>>().unwrap().remove(0);
    assert!(host.plugins.is_empty());
}

#[test]
fn test_inactive_factory_never_resolved() {
    // its missing dependency would otherwise fail the pass
    let mut graph = DependencyGraph::with_profile("dev");
    graph
        .register(Provider::factory(new_database), [WireOption::active_out(["prod"])])
        .unwrap();
    graph.resolve_all().unwrap();
    assert!(graph.retrieve::<Arc<Database>>().unwrap().is_empty());
}

#[test]
fn test_inactive_primary_is_unmet() {
    let mut graph = DependencyGraph::with_profile("dev");
    graph
        .register(Provider::instance(Arc::new(Database { url: "db://fallback".into() })), [])
        .unwrap();
    graph
        .register(
            Provider::instance(Arc::new(Database { url: "db://primary".into() })),
            [WireOption::primary_out().active(["prod"])],
        )
        .unwrap();
    graph.register(Provider::factory(new_repository), []).unwrap();

    let err = graph.resolve_all().unwrap_err();
    assert!(matches!(err, TrellisError::UnmetDependency { .. }));
}

#[test]
fn test_primary_per_profile() {
    for (profile, url) in [("dev", "db://dev"), ("prod", "db://prod")] {
        let mut graph = DependencyGraph::with_profile(profile);
        graph
            .register(Provider::instance(Arc::new(Database { url: "db://any".into() })), [])
            .unwrap();
        for gated in ["dev", "prod"] {
            graph
                .register(
                    Provider::instance(Arc::new(Database { url: format!("db://{gated}") })),
                    [WireOption::primary_out().active([gated])],
                )
                .unwrap();
        }
        graph.register(Provider::factory(new_repository), []).unwrap();

        let repos = graph.retrieve::<Arc<Repository>>().unwrap();
        assert_eq!(repos[0].db.url, url);
    }
}

#[test]
fn test_profile_cannot_change_after_resolution() {
    let mut graph = DependencyGraph::with_profile("prod");
    gated_databases(&mut graph);
    graph.resolve_all().unwrap();

    let err = graph.set_profile(Some("dev".to_string())).unwrap_err();
    assert!(matches!(err, TrellisError::Config(_)));

    let repos = graph.retrieve::<Arc<Repository>>().unwrap();
    assert_eq!(repos[0].db.url, "db://prod");
}

#[test]
fn test_profile_set_before_resolution() {
    let mut graph = DependencyGraph::with_profile("prod");
    gated_databases(&mut graph);
    graph.set_profile(Some("dev".to_string())).unwrap();

    let repos = graph.retrieve::<Arc<Repository>>().unwrap();
    assert_eq!(repos[0].db.url, "db://dev");
}
