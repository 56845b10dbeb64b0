use crate::core::descriptor::Descriptor;
use crate::core::key::ProviderKey;
use thiserror::Error;

pub type TrellisResult<T> = Result<T, TrellisError>;

#[derive(Error, Debug)]
pub enum TrellisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A provider was registered with malformed options or an unusable shape.
    #[error("invalid provider {provider}: {reason}")]
    Configuration { provider: String, reason: String },

    /// A provider could not be turned into a descriptor or signature.
    #[error("descriptor error: {0}")]
    Descriptor(String),

    #[error("no dependency of {key} found for {dependent}")]
    UnmetDependency { key: ProviderKey, dependent: String },

    #[error("more than one dependencies of {key} found for {dependent}")]
    AmbiguousDependency { key: ProviderKey, dependent: String },

    #[error("the default value {default}\n\tis not match {expected}\n\tin {dependent}")]
    DefaultValueMismatch {
        default: Descriptor,
        expected: Descriptor,
        dependent: String,
    },

    #[error(transparent)]
    Cycle(#[from] CycleError),

    /// A lazy provider was consumed eagerly, or a `Lazy` input hit an eager provider.
    #[error("lazy wiring error for {provider}: {reason}")]
    LazyMismatch { provider: String, reason: String },

    /// An erased value did not have the type its node promised.
    #[error("failed to instantiate {node}: {reason}")]
    Instantiation { node: String, reason: String },
}

impl TrellisError {
    pub fn configuration(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        TrellisError::Configuration {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// True for the structural wiring defects detected by a resolution pass.
    pub fn is_wiring_defect(&self) -> bool {
        matches!(
            self,
            TrellisError::UnmetDependency { .. }
                | TrellisError::AmbiguousDependency { .. }
                | TrellisError::DefaultValueMismatch { .. }
                | TrellisError::Cycle(_)
                | TrellisError::LazyMismatch { .. }
        )
    }
}

/// A node was reached again through its own dependency chain.
///
/// `chain` lists node names from the outermost dependent down to the
/// recurrence, so the first and last entries name the same node.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cycle dependencies found: \n\t{}", format_chain(.chain))]
pub struct CycleError {
    pub chain: Vec<String>,
}

fn format_chain(chain: &[String]) -> String {
    chain.join("\n\tdepends on ")
}

/// Render a startup failure the way the bootstrap reports it before halting.
pub fn format_start_error(error: &TrellisError) -> String {
    let mut output = String::new();
    output.push_str("**********************************\n");
    output.push_str("*    application start failed    *\n");
    output.push_str("**********************************\n\n");
    output.push_str(&error.to_string());

    if let Some(hint) = hint_for(error) {
        output.push_str("\n\nhint: ");
        output.push_str(hint);
    }

    output
}

fn hint_for(error: &TrellisError) -> Option<&'static str> {
    match error {
        TrellisError::UnmetDependency { .. } => Some(
            "register a provider for the dependency, check its qualifier and active profiles, \
             or attach a default value to the input",
        ),
        TrellisError::AmbiguousDependency { .. } => {
            Some("qualify the input with a name or mark exactly one candidate as primary")
        }
        TrellisError::Cycle(_) => Some(
            "remove one of the edges in the chain, or move the shared state into a separate \
             provider that the nodes in the cycle all depend on",
        ),
        TrellisError::LazyMismatch { .. } => {
            Some("lazy-output providers must be consumed through `Lazy<T>` inputs")
        }
        _ => None,
    }
}
