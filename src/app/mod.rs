//! Application bootstrap: resolve the graph, then run lifecycle hooks.

pub mod logging;

use crate::config::{ApplicationInfo, ResolverConfig};
use crate::core::{format_start_error, Component, TrellisResult};
use crate::di::{Initializer, Provider, StartListener, StopListener};
use crate::resolver::{DependencyGraph, NodeId};
use crate::wire::WireOption;
use std::sync::Arc;
use tracing::{error, info};

/// A configured dependency graph plus its start/stop lifecycle.
///
/// `ApplicationInfo` is registered as an instance, so factories may take
/// `Arc<ApplicationInfo>` like any other dependency.
pub struct Application {
    info: ApplicationInfo,
    graph: DependencyGraph,
    started: bool,
}

impl Application {
    pub fn new(config: ResolverConfig) -> TrellisResult<Self> {
        let info = config.info();
        let mut graph = DependencyGraph::new();
        graph.set_profile(config.profile)?;
        graph.register(Provider::instance(Arc::new(info.clone())), [])?;

        Ok(Self {
            info,
            graph,
            started: false,
        })
    }

    pub fn info(&self) -> &ApplicationInfo {
        &self.info
    }

    pub fn register<O, I>(&mut self, provider: Provider<O>, options: I) -> TrellisResult<NodeId>
    where
        O: Component,
        I: IntoIterator<Item = WireOption>,
    {
        self.graph.register(provider, options)
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut DependencyGraph {
        &mut self.graph
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Resolve the graph, then run initializers and start listeners in
    /// priority order. Nothing is started if resolution fails.
    pub fn start(&mut self) -> TrellisResult<()> {
        if self.started {
            return Ok(());
        }
        info!(application = %self.info.name, "starting application");

        self.graph.resolve_all()?;

        for initializer in self.graph.retrieve::<Arc<dyn Initializer>>()? {
            initializer.initialize(&self.info)?;
        }
        for listener in self.graph.retrieve::<Arc<dyn StartListener>>()? {
            listener.on_start();
        }

        self.started = true;
        info!(application = %self.info.name, "application started");
        Ok(())
    }

    /// Notify stop listeners in priority order. A no-op unless started.
    pub fn stop(&mut self) -> TrellisResult<()> {
        if !self.started {
            return Ok(());
        }

        for listener in self.graph.retrieve::<Arc<dyn StopListener>>()? {
            listener.on_stop();
        }

        self.started = false;
        info!(application = %self.info.name, "application stopped");
        Ok(())
    }

    /// [`start`](Self::start), reporting any failure on stderr.
    pub fn run(&mut self) -> TrellisResult<()> {
        self.start().map_err(|err| {
            error!(application = %self.info.name, error = %err, "application start failed");
            eprintln!("{}", format_start_error(&err));
            err
        })
    }
}
