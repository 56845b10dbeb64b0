//! How factory inputs describe themselves and receive resolved values.

use crate::core::{Component, Descriptor, InputKind, Value};
use crate::di::lazy::{Lazy, LazyCell};
use std::sync::Arc;

/// A resolved value handed to a factory input.
#[derive(Debug, Clone)]
pub enum Argument {
    /// The value of the selected node, or the node's lazy cell.
    Single(Value),
    /// Values of every aggregated member, in registration order.
    Many(Vec<Value>),
}

/// A type usable as a factory input.
///
/// Implemented for `Arc<T>` and the by-value primitives (plain inputs),
/// `Vec<_>` of those (collection inputs) and [`Lazy<T>`] (deferred inputs).
pub trait Dependency: Sized + 'static {
    fn descriptor() -> Descriptor;

    fn kind() -> InputKind;

    fn extract(argument: &Argument) -> Option<Self>;
}

fn extract_single<T: Component>(argument: &Argument) -> Option<T> {
    match argument {
        Argument::Single(value) => T::from_value(value),
        Argument::Many(_) => None,
    }
}

/// Flatten aggregated members: each is either one element or a whole
/// collection registered as an instance.
fn extract_many<E>(argument: &Argument) -> Option<Vec<E>>
where
    E: Component,
    Vec<E>: Component,
{
    let values = match argument {
        Argument::Many(values) => values.as_slice(),
        Argument::Single(value) => std::slice::from_ref(value),
    };

    let mut items = Vec::with_capacity(values.len());
    for value in values {
        if let Some(item) = E::from_value(value) {
            items.push(item);
        } else {
            items.extend(<Vec<E>>::from_value(value)?);
        }
    }
    Some(items)
}

impl<T: ?Sized + Send + Sync + 'static> Dependency for Arc<T> {
    fn descriptor() -> Descriptor {
        <Arc<T> as Component>::descriptor()
    }

    fn kind() -> InputKind {
        InputKind::Plain
    }

    fn extract(argument: &Argument) -> Option<Self> {
        extract_single(argument)
    }
}

impl<T: ?Sized + Send + Sync + 'static> Dependency for Vec<Arc<T>> {
    fn descriptor() -> Descriptor {
        <Vec<Arc<T>> as Component>::descriptor()
    }

    fn kind() -> InputKind {
        InputKind::Collection
    }

    fn extract(argument: &Argument) -> Option<Self> {
        extract_many::<Arc<T>>(argument)
    }
}

impl<T: Component> Dependency for Lazy<T> {
    fn descriptor() -> Descriptor {
        T::descriptor()
    }

    fn kind() -> InputKind {
        InputKind::Lazy
    }

    fn extract(argument: &Argument) -> Option<Self> {
        match argument {
            Argument::Single(value) => Arc::clone(value)
                .downcast::<LazyCell>()
                .ok()
                .map(Lazy::from_cell),
            Argument::Many(_) => None,
        }
    }
}

macro_rules! primitive_dependency {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Dependency for $ty {
                fn descriptor() -> Descriptor {
                    <$ty as Component>::descriptor()
                }

                fn kind() -> InputKind {
                    InputKind::Plain
                }

                fn extract(argument: &Argument) -> Option<Self> {
                    extract_single(argument)
                }
            }

            impl Dependency for Vec<$ty> {
                fn descriptor() -> Descriptor {
                    <Vec<$ty> as Component>::descriptor()
                }

                fn kind() -> InputKind {
                    InputKind::Collection
                }

                fn extract(argument: &Argument) -> Option<Self> {
                    extract_many::<$ty>(argument)
                }
            }
        )*
    };
}

primitive_dependency!(
    String, bool, char, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
);
