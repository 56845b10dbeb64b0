//! Core types for Trellis.
//!
//! Descriptors, provider keys, wire options and the error taxonomy shared by
//! the resolver crate and anything that registers providers with it.

pub mod core;
pub mod wire;

pub use self::core::{
    format_start_error, Component, CycleError, Descriptor, ProviderKey, TrellisError,
    TrellisResult,
};
pub use self::wire::{WireOption, WireOptions};
