//! Cycle detection against the active resolution chain.

use crate::core::CycleError;
use crate::resolver::dependency_graph::NodeId;

/// Fail if `candidate` already appears in `chain`.
///
/// `chain` holds the nodes currently being resolved, outermost first. The
/// reported cycle is the whole chain followed by the repeated node.
pub fn check_cycle<F>(chain: &[NodeId], candidate: NodeId, name_of: F) -> Result<(), CycleError>
where
    F: Fn(NodeId) -> String,
{
    if !chain.contains(&candidate) {
        return Ok(());
    }

    let chain = chain
        .iter()
        .copied()
        .chain(std::iter::once(candidate))
        .map(name_of)
        .collect();
    Err(CycleError { chain })
}
