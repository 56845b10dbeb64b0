pub mod descriptor;
pub mod error;
pub mod key;

pub use descriptor::{Component, Descriptor, Input, InputKind, Signature, Value};
pub use error::{format_start_error, CycleError, TrellisError, TrellisResult};
pub use key::ProviderKey;
