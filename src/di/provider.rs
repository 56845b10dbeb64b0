//! Providers: factories and pre-built instances awaiting registration.

use crate::core::{Component, Descriptor, Input, Signature, TrellisResult, Value};
use crate::di::component::{Argument, Dependency};
use crate::di::lifecycle::Ordered;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased factory call: positional arguments in, one value out.
pub(crate) type Invoker = Arc<dyn Fn(&[Argument]) -> Option<Value> + Send + Sync>;

/// Type-erased contract cast.
pub(crate) type Cast = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Type-erased ordering accessor.
pub(crate) type OrderFn = Arc<dyn Fn(&Value) -> Option<i32> + Send + Sync>;

/// A function that can construct a node from its resolved inputs.
///
/// Implemented for every `Fn(A1, .., An) -> O` with up to eight inputs where
/// each `Ai` is a [`Dependency`] and `O` is a [`Component`].
pub trait Factory<Args>: Send + Sync + 'static {
    type Output: Component;

    fn inputs() -> Vec<Input>;

    fn invoke(&self, arguments: &[Argument]) -> Option<Self::Output>;
}

macro_rules! impl_factory {
    ($($arg:ident),*) => {
        impl<Func, Out, $($arg,)*> Factory<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Out + Send + Sync + 'static,
            Out: Component,
            $($arg: Dependency,)*
        {
            type Output = Out;

            fn inputs() -> Vec<Input> {
                vec![$(Input::new(<$arg as Dependency>::descriptor(), <$arg as Dependency>::kind())),*]
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn invoke(&self, arguments: &[Argument]) -> Option<Out> {
                let mut iter = arguments.iter();
                $(let $arg = <$arg as Dependency>::extract(iter.next()?)?;)*
                Some((self)($($arg),*))
            }
        }
    };
}

impl_factory!();
impl_factory!(A1);
impl_factory!(A1, A2);
impl_factory!(A1, A2, A3);
impl_factory!(A1, A2, A3, A4);
impl_factory!(A1, A2, A3, A4, A5);
impl_factory!(A1, A2, A3, A4, A5, A6);
impl_factory!(A1, A2, A3, A4, A5, A6, A7);
impl_factory!(A1, A2, A3, A4, A5, A6, A7, A8);

/// Where a node's value comes from.
pub(crate) enum Origin {
    Factory {
        signature: TrellisResult<Signature>,
        invoker: Invoker,
    },
    Instance {
        descriptor: Descriptor,
        value: Value,
    },
}

/// Registration-time answer to "can this node stand in for contract `C`?".
#[derive(Clone)]
pub(crate) struct Capability {
    pub contract: Descriptor,
    pub cast: Cast,
}

/// A factory or pre-built instance producing `O`, plus its capabilities.
///
/// ```
/// use std::sync::Arc;
/// use trellis::di::Provider;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// fn new_english() -> Arc<English> {
///     Arc::new(English)
/// }
///
/// let provider = Provider::factory(new_english)
///     .exposes(|english| english as Arc<dyn Greeter>)
///     .with_order(10);
/// assert!(provider.name().ends_with("new_english"));
/// ```
pub struct Provider<O> {
    name: String,
    origin: Origin,
    capabilities: Vec<Capability>,
    order: Option<OrderFn>,
    _output: PhantomData<fn() -> O>,
}

impl<O: Component> Provider<O> {
    /// Provider backed by a named function.
    ///
    /// The function's path is its identity in error reports. Closures have no
    /// such identity and are refused at registration; use
    /// [`Provider::factory_named`] for them.
    pub fn factory<F, Args>(factory: F) -> Self
    where
        F: Factory<Args, Output = O>,
    {
        let name = std::any::type_name::<F>();
        let signature = Signature::new(name, F::inputs(), O::descriptor());
        Self::from_factory(name.to_string(), signature, factory)
    }

    /// Provider backed by any callable, identified by `name`.
    pub fn factory_named<F, Args>(name: impl Into<String>, factory: F) -> Self
    where
        F: Factory<Args, Output = O>,
    {
        let name = name.into();
        let signature = Signature::new(&name, F::inputs(), O::descriptor());
        Self::from_factory(name, signature, factory)
    }

    fn from_factory<F, Args>(name: String, signature: TrellisResult<Signature>, factory: F) -> Self
    where
        F: Factory<Args, Output = O>,
    {
        let invoker: Invoker =
            Arc::new(move |arguments| factory.invoke(arguments).map(Component::into_value));
        Self {
            name,
            origin: Origin::Factory { signature, invoker },
            capabilities: Vec::new(),
            order: None,
            _output: PhantomData,
        }
    }

    /// Provider for an already constructed value.
    pub fn instance(value: O) -> Self {
        let descriptor = O::descriptor();
        Self {
            name: descriptor.name().to_string(),
            origin: Origin::Instance {
                descriptor,
                value: value.into_value(),
            },
            capabilities: Vec::new(),
            order: None,
            _output: PhantomData,
        }
    }

    /// Declare that the provided value also satisfies contract `C`.
    ///
    /// Retrieval for `Arc<C>` matches this provider and receives `cast(value)`.
    pub fn exposes<C>(mut self, cast: fn(O) -> Arc<C>) -> Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.capabilities.push(Capability {
            contract: <Arc<C> as Component>::descriptor(),
            cast: Arc::new(move |value| O::from_value(value).map(|v| cast(v).into_value())),
        });
        self
    }

    /// Order retrieval results by the value's own [`Ordered::order`].
    pub fn ordered(mut self) -> Self
    where
        O: Ordered,
    {
        self.order = Some(Arc::new(|value| O::from_value(value).map(|v| v.order())));
        self
    }

    /// Order retrieval results by a fixed priority; lower comes first.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = Some(Arc::new(move |_| Some(order)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_parts(self) -> (String, Origin, Vec<Capability>, Option<OrderFn>) {
        (self.name, self.origin, self.capabilities, self.order)
    }
}

impl<O> fmt::Debug for Provider<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.origin {
            Origin::Factory { .. } => "factory",
            Origin::Instance { .. } => "instance",
        };
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("kind", &kind)
            .field("capabilities", &self.capabilities.len())
            .field("ordered", &self.order.is_some())
            .finish()
    }
}
