//! Per-provider wiring metadata.
//!
//! Options are positional: the n-th input option applies to the n-th factory
//! input, and the single output option, if any, comes last and describes the
//! provided value itself.
//!
//! ```
//! use trellis_core::wire::WireOption;
//!
//! let input = WireOption::name_in("primary-db").default_value(5432u16);
//! assert!(input.is_input());
//! assert!(!input.is_required());
//!
//! let output = WireOption::name_out("cache").primary().active(["prod"]);
//! assert!(output.is_output());
//! assert!(output.validate().is_ok());
//! ```

use crate::core::descriptor::{Component, Descriptor, Value};

/// Which side of a provider an option describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

/// A value substituted for a missing dependency.
#[derive(Debug, Clone)]
pub struct DefaultValue {
    pub descriptor: Descriptor,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct WireOption {
    direction: Direction,
    name: Option<String>,
    required: bool,
    primary: bool,
    lazy: bool,
    default: Option<DefaultValue>,
    profiles: Vec<String>,
}

impl WireOption {
    fn with_direction(direction: Direction) -> Self {
        Self {
            direction,
            name: None,
            required: true,
            primary: false,
            lazy: false,
            default: None,
            profiles: Vec::new(),
        }
    }

    /// Unqualified input option, useful as a positional placeholder.
    pub fn input() -> Self {
        Self::with_direction(Direction::In)
    }

    /// Unqualified output option.
    pub fn output() -> Self {
        Self::with_direction(Direction::Out)
    }

    pub fn name_in(name: impl Into<String>) -> Self {
        Self::input().name(name)
    }

    pub fn name_out(name: impl Into<String>) -> Self {
        Self::output().name(name)
    }

    /// Input option used when no provider is registered for the input.
    pub fn default_value_in<T: Component>(value: T) -> Self {
        Self::input().default_value(value)
    }

    pub fn primary_out() -> Self {
        Self::output().primary()
    }

    /// Output option gating the provider on the given profiles.
    pub fn active_out<I, S>(profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::output().active(profiles)
    }

    /// Output option deferring construction until first use of a `Lazy` handle.
    pub fn lazy_out() -> Self {
        let mut opt = Self::output();
        opt.lazy = true;
        opt
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        self.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    /// Attach a default; implies the input is no longer required.
    pub fn default_value<T: Component>(mut self, value: T) -> Self {
        self.default = Some(DefaultValue {
            descriptor: T::descriptor(),
            value: value.into_value(),
        });
        self.required = false;
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn active<I, S>(mut self, profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.profiles = profiles.into_iter().map(Into::into).collect();
        self
    }

    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_input(&self) -> bool {
        self.direction == Direction::In
    }

    pub fn is_output(&self) -> bool {
        self.direction == Direction::Out
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    pub fn default(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn profiles(&self) -> &[String] {
        &self.profiles
    }

    /// True when the option does not restrict profiles or lists `profile`.
    pub fn allows_profile(&self, profile: Option<&str>) -> bool {
        if self.profiles.is_empty() {
            return true;
        }
        match profile {
            Some(profile) => self.profiles.iter().any(|p| p == profile),
            None => false,
        }
    }

    /// Per-direction self-consistency.
    pub fn validate(&self) -> Result<(), String> {
        match self.direction {
            Direction::Out => {
                if !self.required {
                    return Err(
                        "required option of wire out parameter cannot be false".to_string()
                    );
                }
                if self.default.is_some() {
                    return Err("default option of wire out parameter cannot exist".to_string());
                }
            }
            Direction::In => {
                if self.primary {
                    return Err("primary option of wire in parameter cannot exist".to_string());
                }
                if !self.profiles.is_empty() {
                    return Err("active option of wire in parameter cannot exist".to_string());
                }
                if self.lazy {
                    return Err("lazy option of wire in parameter cannot exist".to_string());
                }
            }
        }
        Ok(())
    }
}
