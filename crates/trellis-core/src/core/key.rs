//! Provider table keys.

use crate::core::descriptor::Descriptor;
use std::any::TypeId;
use std::fmt;

/// Lookup key into the provider table.
///
/// Collection-ness is deliberately absent: a `Vec<Arc<T>>` instance is filed
/// under the same key as the `Arc<T>` providers it can be aggregated with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderKey {
    type_id: TypeId,
    name: &'static str,
    qualifier: Option<String>,
    is_pointer: bool,
}

impl ProviderKey {
    pub fn new(descriptor: &Descriptor, qualifier: Option<&str>) -> Self {
        Self {
            type_id: descriptor.type_id(),
            name: descriptor.name(),
            qualifier: qualifier
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_string),
            is_pointer: descriptor.is_pointer(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn is_pointer(&self) -> bool {
        self.is_pointer
    }
}

impl fmt::Display for ProviderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pointer {
            write!(f, "*")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(qualifier) = &self.qualifier {
            write!(f, "({})", qualifier)?;
        }
        Ok(())
    }
}
