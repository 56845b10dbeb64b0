//! Dependency graph: provider table, resolution and instantiation

use crate::core::{
    Component, Descriptor, InputKind, ProviderKey, Signature, TrellisError, TrellisResult, Value,
};
use crate::di::component::Argument;
use crate::di::lazy::LazyCell;
use crate::di::provider::{Capability, Invoker, OrderFn, Origin, Provider};
use crate::resolver::cycle::check_cycle;
use crate::wire::{DefaultValue, WireOption, WireOptions};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Stable identity of a node: its position in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Resolution state of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Unresolved,
    Resolving,
    Resolved,
}

enum NodeKind {
    Factory {
        signature: Signature,
        invoker: Invoker,
    },
    Instance {
        descriptor: Descriptor,
    },
    /// Synthetic: every active candidate for a collection input.
    Aggregate {
        descriptor: Descriptor,
    },
    /// Synthetic: a default value standing in for a missing provider.
    Default {
        descriptor: Descriptor,
    },
}

struct GraphNode {
    id: NodeId,
    name: String,
    kind: NodeKind,
    options: WireOptions,
    capabilities: Vec<Capability>,
    order: Option<OrderFn>,
    resolution: Resolution,
    instantiated: bool,
    lazy: bool,
    value: Option<Value>,
    dependencies: Vec<NodeId>,
}

impl GraphNode {
    fn output(&self) -> Descriptor {
        match &self.kind {
            NodeKind::Factory { signature, .. } => signature.output,
            NodeKind::Instance { descriptor }
            | NodeKind::Aggregate { descriptor }
            | NodeKind::Default { descriptor } => *descriptor,
        }
    }

    fn is_factory(&self) -> bool {
        matches!(self.kind, NodeKind::Factory { .. })
    }

    fn is_aggregate(&self) -> bool {
        matches!(self.kind, NodeKind::Aggregate { .. })
    }

    /// Registered by a caller, as opposed to synthesized during resolution.
    fn is_registered(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Factory { .. } | NodeKind::Instance { .. }
        )
    }

    fn capability(&self, contract: &Descriptor) -> Option<&Capability> {
        self.capabilities.iter().find(|c| &c.contract == contract)
    }

    fn synthetic(id: NodeId, name: String, kind: NodeKind) -> Self {
        Self {
            id,
            name,
            kind,
            options: WireOptions::default(),
            capabilities: Vec::new(),
            order: None,
            resolution: Resolution::Resolved,
            instantiated: false,
            lazy: false,
            value: None,
            dependencies: Vec::new(),
        }
    }
}

/// Snapshot of one node, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeState {
    pub id: NodeId,
    pub name: String,
    pub output: Descriptor,
    pub resolution: Resolution,
    pub instantiated: bool,
    pub lazy: bool,
    pub aggregate: bool,
    pub dependencies: Vec<NodeId>,
}

/// Registry of providers and the graph linking them.
///
/// Providers are registered in any order, then [`resolve_all`] links every
/// factory's inputs to the providers that satisfy them, and [`retrieve`]
/// instantiates whatever a caller asks for.
///
/// [`resolve_all`]: DependencyGraph::resolve_all
/// [`retrieve`]: DependencyGraph::retrieve
pub struct DependencyGraph {
    providers: HashMap<ProviderKey, Vec<NodeId>>,
    nodes: Vec<GraphNode>,
    /// Caller-registered nodes occupy `nodes[..registered]`; synthetic
    /// nodes created by a pass always follow them.
    registered: usize,
    profile: Option<String>,
    resolved: bool,
}

impl DependencyGraph {
    /// Create an empty graph with no active profile
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            nodes: Vec::new(),
            registered: 0,
            profile: None,
            resolved: false,
        }
    }

    /// Create an empty graph whose profile-gated providers follow `profile`
    pub fn with_profile(profile: impl Into<String>) -> Self {
        let mut graph = Self::new();
        graph.profile = Some(profile.into());
        graph
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Switch the active profile. Refused once the graph is resolved, since
    /// existing edges were selected under the previous profile.
    pub fn set_profile(&mut self, profile: Option<String>) -> TrellisResult<()> {
        if self.resolved && profile != self.profile {
            return Err(TrellisError::Config(format!(
                "cannot switch profile to {} after the graph is resolved",
                profile.as_deref().unwrap_or("<none>")
            )));
        }
        self.profile = profile;
        Ok(())
    }

    /// Register a provider with its positional options.
    ///
    /// Options are validated here; a malformed list is a configuration error
    /// naming the provider. Registering twice under one key keeps both
    /// candidates. All registration happens before resolution; a resolved
    /// graph refuses new providers.
    pub fn register<O, I>(&mut self, provider: Provider<O>, options: I) -> TrellisResult<NodeId>
    where
        O: Component,
        I: IntoIterator<Item = WireOption>,
    {
        if self.resolved {
            return Err(TrellisError::configuration(
                provider.name(),
                "the graph is already resolved, register providers before resolution",
            ));
        }

        let options: Vec<WireOption> = options.into_iter().collect();
        let (name, origin, capabilities, order) = provider.into_parts();
        let id = NodeId::new(self.nodes.len());

        let node = match origin {
            Origin::Factory { signature, invoker } => {
                let signature = signature?;
                let options =
                    WireOptions::for_factory(&signature.name, signature.arity(), options)?;
                GraphNode {
                    id,
                    name: signature.name.clone(),
                    lazy: options.is_lazy(),
                    kind: NodeKind::Factory { signature, invoker },
                    options,
                    capabilities,
                    order,
                    resolution: Resolution::Unresolved,
                    instantiated: false,
                    value: None,
                    dependencies: Vec::new(),
                }
            }
            Origin::Instance { descriptor, value } => {
                let options =
                    WireOptions::for_instance(&name, descriptor.is_primitive(), options)?;
                GraphNode {
                    id,
                    name,
                    kind: NodeKind::Instance { descriptor },
                    options,
                    capabilities,
                    order,
                    resolution: Resolution::Resolved,
                    instantiated: true,
                    lazy: false,
                    value: Some(value),
                    dependencies: Vec::new(),
                }
            }
        };

        let key = ProviderKey::new(&node.output(), node.options.qualifier());
        debug!(provider = %node.name, key = %key, "registered provider");

        self.providers.entry(key).or_default().push(id);
        self.nodes.push(node);
        self.registered += 1;
        Ok(id)
    }

    /// Resolve every factory-backed node in registration order.
    ///
    /// The first structural error aborts the pass and discards its partial
    /// edges, so the graph can be fixed and resolved again. Providers inactive
    /// for the current profile are skipped; they can never be selected or
    /// retrieved.
    pub fn resolve_all(&mut self) -> TrellisResult<()> {
        let pending: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.is_factory() && n.resolution != Resolution::Resolved)
            .filter(|n| self.is_active(n))
            .map(|n| n.id)
            .collect();

        for id in pending {
            let mut chain = Vec::new();
            if let Err(err) = self.resolve_node(id, &mut chain) {
                self.discard_pass();
                return Err(err);
            }
        }

        self.resolved = true;
        info!(
            nodes = self.nodes.len(),
            keys = self.providers.len(),
            profile = self.profile.as_deref().unwrap_or(""),
            "dependency graph resolved"
        );
        Ok(())
    }

    fn discard_pass(&mut self) {
        self.nodes.truncate(self.registered);
        for node in self.nodes.iter_mut().filter(|n| n.is_factory()) {
            node.resolution = Resolution::Unresolved;
            node.dependencies.clear();
        }
        debug!(nodes = self.nodes.len(), "discarded failed resolution pass");
    }

    fn resolve_node(&mut self, id: NodeId, chain: &mut Vec<NodeId>) -> TrellisResult<()> {
        let node = &mut self.nodes[id.0];
        if node.resolution == Resolution::Resolved {
            return Ok(());
        }

        let (name, inputs) = match &node.kind {
            NodeKind::Factory { signature, .. } => {
                (signature.name.clone(), signature.inputs.clone())
            }
            _ => {
                node.resolution = Resolution::Resolved;
                return Ok(());
            }
        };

        if inputs.is_empty() {
            node.resolution = Resolution::Resolved;
            trace!(node = %name, "resolved leaf node");
            return Ok(());
        }

        node.resolution = Resolution::Resolving;
        node.dependencies.clear();
        chain.push(id);

        for (position, input) in inputs.iter().enumerate() {
            let option = self.nodes[id.0].options.input(position).cloned();
            let edge =
                self.resolve_input(&name, input.descriptor, input.kind, option.as_ref(), chain)?;
            self.nodes[id.0].dependencies.push(edge);
        }

        chain.pop();
        self.nodes[id.0].resolution = Resolution::Resolved;
        debug!(node = %name, dependencies = inputs.len(), "resolved node");
        Ok(())
    }

    /// Find the edge satisfying one input of `dependent`.
    fn resolve_input(
        &mut self,
        dependent: &str,
        expected: Descriptor,
        kind: InputKind,
        option: Option<&WireOption>,
        chain: &mut Vec<NodeId>,
    ) -> TrellisResult<NodeId> {
        let key = ProviderKey::new(&expected, option.and_then(WireOption::qualifier));
        let registered = self.providers.get(&key).cloned().unwrap_or_default();

        if kind == InputKind::Collection {
            if registered.is_empty() {
                return self.default_edge(dependent, key, expected, kind, option);
            }

            let members: Vec<NodeId> = registered
                .into_iter()
                .filter(|&c| self.is_active(&self.nodes[c.0]))
                .collect();
            for &member in &members {
                self.resolve_child(member, chain)?;
            }

            let id = NodeId::new(self.nodes.len());
            let mut aggregate = GraphNode::synthetic(
                id,
                format!("collection of {}", key),
                NodeKind::Aggregate {
                    descriptor: expected,
                },
            );
            trace!(dependent, key = %key, members = members.len(), "aggregated collection");
            aggregate.dependencies = members;
            self.nodes.push(aggregate);
            return Ok(id);
        }

        if kind == InputKind::Lazy && expected.is_collection() {
            return Err(TrellisError::LazyMismatch {
                provider: dependent.to_string(),
                reason: format!("Lazy cannot wrap the collection input {}", expected),
            });
        }

        let candidates: Vec<NodeId> = registered
            .into_iter()
            .filter(|&c| !self.nodes[c.0].output().is_collection())
            .collect();
        let active: Vec<NodeId> = candidates
            .iter()
            .copied()
            .filter(|&c| self.is_active(&self.nodes[c.0]))
            .collect();
        let active_primaries: Vec<NodeId> = active
            .iter()
            .copied()
            .filter(|&c| self.nodes[c.0].options.is_primary())
            .collect();
        // an inactive primary makes the key absent, its siblings do not stand in
        let inactive_primary = candidates.iter().any(|&c| {
            let node = &self.nodes[c.0];
            node.options.is_primary() && !self.is_active(node)
        });

        let selected = match (active_primaries.as_slice(), active.as_slice()) {
            ([primary], _) => *primary,
            ([], _) if inactive_primary => {
                return self.default_edge(dependent, key, expected, kind, option)
            }
            ([], []) => return self.default_edge(dependent, key, expected, kind, option),
            ([], [only]) => *only,
            _ => {
                return Err(TrellisError::AmbiguousDependency {
                    key,
                    dependent: dependent.to_string(),
                })
            }
        };

        let supplier = &self.nodes[selected.0];
        match (kind, supplier.lazy) {
            (InputKind::Lazy, false) => {
                return Err(TrellisError::LazyMismatch {
                    provider: supplier.name.clone(),
                    reason: format!(
                        "{} takes it through Lazy, register it with a lazy out option",
                        dependent
                    ),
                })
            }
            (InputKind::Plain, true) => {
                return Err(TrellisError::LazyMismatch {
                    provider: supplier.name.clone(),
                    reason: format!(
                        "registered lazy, so {} has to take it through Lazy",
                        dependent
                    ),
                })
            }
            _ => {}
        }

        trace!(dependent, key = %key, selected = %supplier.name, "selected candidate");
        self.resolve_child(selected, chain)?;
        Ok(selected)
    }

    fn resolve_child(&mut self, candidate: NodeId, chain: &mut Vec<NodeId>) -> TrellisResult<()> {
        if self.nodes[candidate.0].resolution == Resolution::Resolved {
            return Ok(());
        }
        check_cycle(chain, candidate, |id| self.nodes[id.0].name.clone())?;
        self.resolve_node(candidate, chain)
    }

    /// Satisfy a missing input from its positional default, if any.
    fn default_edge(
        &mut self,
        dependent: &str,
        key: ProviderKey,
        expected: Descriptor,
        kind: InputKind,
        option: Option<&WireOption>,
    ) -> TrellisResult<NodeId> {
        let default: Option<&DefaultValue> = option
            .filter(|opt| !opt.is_required())
            .and_then(WireOption::default);

        let Some(default) = default else {
            return Err(TrellisError::UnmetDependency {
                key,
                dependent: dependent.to_string(),
            });
        };

        if !default.descriptor.matches(&expected) {
            return Err(TrellisError::DefaultValueMismatch {
                default: default.descriptor,
                expected,
                dependent: dependent.to_string(),
            });
        }

        warn!(dependent, key = %key, "no provider found, using default value");

        let name = key.to_string();
        let value = if kind == InputKind::Lazy {
            Arc::new(LazyCell::ready(name.clone(), Arc::clone(&default.value))) as Value
        } else {
            Arc::clone(&default.value)
        };

        let id = NodeId::new(self.nodes.len());
        let mut node = GraphNode::synthetic(
            id,
            name,
            NodeKind::Default {
                descriptor: default.descriptor,
            },
        );
        node.lazy = kind == InputKind::Lazy;
        node.instantiated = true;
        node.value = Some(value);
        self.nodes.push(node);
        Ok(id)
    }

    /// Instantiate a node after all of its dependencies.
    fn instantiate(&mut self, id: NodeId) -> TrellisResult<()> {
        let node = &self.nodes[id.0];
        if node.instantiated {
            return Ok(());
        }
        if node.resolution != Resolution::Resolved {
            return Err(TrellisError::Instantiation {
                node: node.name.clone(),
                reason: "node has not been resolved".to_string(),
            });
        }

        let dependencies = node.dependencies.clone();
        for &dependency in &dependencies {
            self.instantiate(dependency)?;
        }

        let node = &self.nodes[id.0];
        let factory = match &node.kind {
            NodeKind::Factory { signature, invoker } => {
                Some((signature.inputs.clone(), Arc::clone(invoker)))
            }
            _ => None,
        };
        let Some((inputs, invoker)) = factory else {
            self.nodes[id.0].instantiated = true;
            return Ok(());
        };

        let arguments = dependencies
            .iter()
            .zip(&inputs)
            .map(|(&dependency, input)| self.argument_for(dependency, input.kind))
            .collect::<TrellisResult<Vec<_>>>()?;

        let name = node.name.clone();
        let value = if node.lazy {
            let node_name = name.clone();
            let cell = LazyCell::new(name.clone(), move || {
                invoker(&arguments).ok_or_else(|| mismatched_arguments(&node_name))
            });
            Arc::new(cell) as Value
        } else {
            invoker(&arguments).ok_or_else(|| mismatched_arguments(&name))?
        };

        let node = &mut self.nodes[id.0];
        debug!(node = %node.name, lazy = node.lazy, "instantiated node");
        node.value = Some(value);
        node.instantiated = true;
        Ok(())
    }

    fn argument_for(&self, edge: NodeId, kind: InputKind) -> TrellisResult<Argument> {
        let node = &self.nodes[edge.0];
        if node.is_aggregate() {
            let values = node
                .dependencies
                .iter()
                .map(|&member| self.plain_value(member))
                .collect::<TrellisResult<Vec<_>>>()?;
            return Ok(Argument::Many(values));
        }

        match kind {
            InputKind::Lazy => self.stored_value(edge).map(Argument::Single),
            InputKind::Plain | InputKind::Collection => self.plain_value(edge).map(Argument::Single),
        }
    }

    fn stored_value(&self, id: NodeId) -> TrellisResult<Value> {
        let node = &self.nodes[id.0];
        node.value
            .as_ref()
            .map(Arc::clone)
            .ok_or_else(|| TrellisError::Instantiation {
                node: node.name.clone(),
                reason: "node has not been instantiated".to_string(),
            })
    }

    /// The node's value, constructing it first if it sits behind a lazy cell.
    fn plain_value(&self, id: NodeId) -> TrellisResult<Value> {
        let value = self.stored_value(id)?;
        let node = &self.nodes[id.0];
        if !node.lazy {
            return Ok(value);
        }

        let cell = value
            .downcast::<LazyCell>()
            .map_err(|_| TrellisError::Instantiation {
                node: node.name.clone(),
                reason: "lazy node does not hold a lazy cell".to_string(),
            })?;
        let value = cell.force()?;
        Ok(Arc::clone(value))
    }

    /// Instantiate every active registered node.
    pub fn instantiate_all(&mut self) -> TrellisResult<()> {
        if !self.resolved {
            self.resolve_all()?;
        }
        let ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.is_registered() && self.is_active(n))
            .map(|n| n.id)
            .collect();
        for id in ids {
            self.instantiate(id)?;
        }
        Ok(())
    }

    /// Every active value matching `T`, priority-ordered.
    ///
    /// A node matches when its output is `T`, or when it was registered with
    /// a capability for `T` through [`Provider::exposes`]. Results carrying a
    /// priority come first, ascending, ties in registration order; the rest
    /// follow in registration order. Resolves the graph first if needed.
    pub fn retrieve<T: Component>(&mut self) -> TrellisResult<Vec<T>> {
        if !self.resolved {
            self.resolve_all()?;
        }

        let contract = T::descriptor();
        let matches: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|n| n.is_registered() && self.is_active(n))
            .filter(|n| n.output() == contract || n.capability(&contract).is_some())
            .map(|n| n.id)
            .collect();

        let mut prioritized: Vec<(i32, T)> = Vec::new();
        let mut rest: Vec<T> = Vec::new();

        for id in matches {
            self.instantiate(id)?;
            let value = self.plain_value(id)?;
            let node = &self.nodes[id.0];

            let cast = if node.output() == contract {
                Some(Arc::clone(&value))
            } else {
                node.capability(&contract).and_then(|c| (c.cast)(&value))
            };
            let item = cast
                .as_ref()
                .and_then(T::from_value)
                .ok_or_else(|| TrellisError::Instantiation {
                    node: node.name.clone(),
                    reason: format!("value cannot be retrieved as {}", contract),
                })?;

            match node.order.as_ref().and_then(|order| order(&value)) {
                Some(priority) => prioritized.push((priority, item)),
                None => rest.push(item),
            }
        }

        prioritized.sort_by_key(|(priority, _)| *priority);
        debug!(
            contract = %contract,
            prioritized = prioritized.len(),
            unordered = rest.len(),
            "retrieved instances"
        );

        Ok(prioritized
            .into_iter()
            .map(|(_, item)| item)
            .chain(rest)
            .collect())
    }

    fn is_active(&self, node: &GraphNode) -> bool {
        node.options.allows_profile(self.profile.as_deref())
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Number of nodes, including synthetic collection and default nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn state(&self, id: NodeId) -> Option<NodeState> {
        self.nodes.get(id.0).map(|node| NodeState {
            id: node.id,
            name: node.name.clone(),
            output: node.output(),
            resolution: node.resolution,
            instantiated: node.instantiated,
            lazy: node.lazy,
            aggregate: node.is_aggregate(),
            dependencies: node.dependencies.clone(),
        })
    }

    /// Snapshots of every registered (non-synthetic) node, in registration order
    pub fn registered_states(&self) -> Vec<NodeState> {
        self.nodes
            .iter()
            .filter(|n| n.is_registered())
            .filter_map(|n| self.state(n.id))
            .collect()
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}

fn mismatched_arguments(node: &str) -> TrellisError {
    TrellisError::Instantiation {
        node: node.to_string(),
        reason: "resolved arguments do not match the factory signature".to_string(),
    }
}
