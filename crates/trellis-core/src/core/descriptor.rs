//! Structural descriptors for provided values and factory signatures.
//!
//! Rust has no runtime reflection, so every type that can flow through the
//! graph describes itself through [`Component`]. `Arc<T>` is the pointer
//! form, `Vec<_>` the collection form, and a fixed set of by-value
//! primitives covers configuration scalars.

use crate::core::error::{TrellisError, TrellisResult};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Type-erased value produced by a node.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Canonical description of a value's semantic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Descriptor {
    type_id: TypeId,
    name: &'static str,
    is_pointer: bool,
    is_collection: bool,
    is_primitive: bool,
}

impl Descriptor {
    /// Descriptor of `Arc<T>`.
    pub fn pointer<T: ?Sized + 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            is_pointer: true,
            is_collection: false,
            is_primitive: false,
        }
    }

    /// Descriptor of a by-value primitive such as `String` or `u16`.
    pub fn primitive<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            is_pointer: false,
            is_collection: false,
            is_primitive: true,
        }
    }

    /// The same element type, as a collection.
    pub fn collection(self) -> Self {
        Self {
            is_collection: true,
            ..self
        }
    }

    /// The element type of a collection descriptor.
    pub fn element(self) -> Self {
        Self {
            is_collection: false,
            ..self
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_pointer(&self) -> bool {
        self.is_pointer
    }

    pub fn is_collection(&self) -> bool {
        self.is_collection
    }

    pub fn is_primitive(&self) -> bool {
        self.is_primitive
    }

    /// Structural match used for default-value compatibility.
    ///
    /// Identity, pointer-ness and collection-ness all have to agree.
    pub fn matches(&self, other: &Descriptor) -> bool {
        self.type_id == other.type_id
            && self.is_pointer == other.is_pointer
            && self.is_collection == other.is_collection
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_pointer {
            write!(f, "*")?;
        }
        if self.is_collection {
            write!(f, "[]")?;
        }
        write!(f, "{}", self.name)
    }
}

/// A value that a provider can produce and a dependent can receive.
pub trait Component: Clone + Send + Sync + 'static {
    fn descriptor() -> Descriptor;

    fn into_value(self) -> Value {
        Arc::new(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.downcast_ref::<Self>().cloned()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Component for Arc<T> {
    fn descriptor() -> Descriptor {
        Descriptor::pointer::<T>()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Component for Vec<Arc<T>> {
    fn descriptor() -> Descriptor {
        Descriptor::pointer::<T>().collection()
    }
}

macro_rules! primitive_component {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Component for $ty {
                fn descriptor() -> Descriptor {
                    Descriptor::primitive::<$ty>()
                }
            }

            impl Component for Vec<$ty> {
                fn descriptor() -> Descriptor {
                    Descriptor::primitive::<$ty>().collection()
                }
            }
        )*
    };
}

primitive_component!(
    String, bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
);

/// How a factory input is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// One selected candidate.
    Plain,
    /// Every profile-active candidate, aggregated.
    Collection,
    /// One selected candidate behind a deferred handle.
    Lazy,
}

/// One positional input of a factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input {
    pub descriptor: Descriptor,
    pub kind: InputKind,
}

impl Input {
    pub fn new(descriptor: Descriptor, kind: InputKind) -> Self {
        Self { descriptor, kind }
    }
}

/// Ordered inputs plus the single output of a factory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub inputs: Vec<Input>,
    pub output: Descriptor,
}

impl Signature {
    /// Build a signature, rejecting factories without a stable identity.
    pub fn new(name: &str, inputs: Vec<Input>, output: Descriptor) -> TrellisResult<Self> {
        Ok(Self {
            name: function_name(name)?,
            inputs,
            output,
        })
    }

    pub fn arity(&self) -> usize {
        self.inputs.len()
    }
}

/// Validate a factory's type name as a stable identity.
///
/// Closures have no name that survives into error reports, so they are
/// refused here; callers can register them under an explicit name instead.
pub fn function_name(type_name: &str) -> TrellisResult<String> {
    let name = type_name.trim();
    if name.is_empty() {
        return Err(TrellisError::Descriptor(
            "factory has no identity name".to_string(),
        ));
    }
    if name.contains("{{closure}}") {
        return Err(TrellisError::Descriptor(format!(
            "cannot parse closure function {}, register it with an explicit name",
            name
        )));
    }
    Ok(name.to_string())
}
