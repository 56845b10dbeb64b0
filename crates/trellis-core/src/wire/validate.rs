//! Validation of a provider's option list against its shape.

use crate::core::error::{TrellisError, TrellisResult};
use crate::wire::option::WireOption;

/// A provider's options split into positional inputs and the output option.
#[derive(Debug, Clone, Default)]
pub struct WireOptions {
    inputs: Vec<WireOption>,
    output: Option<WireOption>,
}

impl WireOptions {
    /// Validate and split the options attached to a factory.
    ///
    /// At most one output option is allowed and it must be the last one;
    /// input options may not outnumber the factory's inputs.
    pub fn for_factory(
        provider: &str,
        input_arity: usize,
        options: Vec<WireOption>,
    ) -> TrellisResult<Self> {
        let last = options.len().saturating_sub(1);
        let mut inputs = Vec::new();
        let mut output = None;

        for (i, opt) in options.into_iter().enumerate() {
            opt.validate()
                .map_err(|reason| TrellisError::configuration(provider, reason))?;

            if opt.is_output() {
                if i < last {
                    return Err(TrellisError::configuration(
                        provider,
                        "wire out option can only be the last option",
                    ));
                }
                output = Some(opt);
            } else {
                inputs.push(opt);
            }
        }

        if inputs.len() > input_arity {
            return Err(TrellisError::configuration(
                provider,
                format!(
                    "wire in options ({}) are more than the in parameters ({})",
                    inputs.len(),
                    input_arity
                ),
            ));
        }

        Ok(Self { inputs, output })
    }

    /// Validate the options attached to a pre-built instance.
    ///
    /// Instances take a single output option at most; primitives must be
    /// qualified through it.
    pub fn for_instance(
        provider: &str,
        is_primitive: bool,
        options: Vec<WireOption>,
    ) -> TrellisResult<Self> {
        if options.len() > 1 {
            return Err(TrellisError::configuration(
                provider,
                "only one wire out option can be passed to an instance",
            ));
        }

        let output = options.into_iter().next();
        if let Some(opt) = &output {
            if !opt.is_output() {
                return Err(TrellisError::configuration(
                    provider,
                    "only one wire out option can be passed to an instance",
                ));
            }
            opt.validate()
                .map_err(|reason| TrellisError::configuration(provider, reason))?;
            if opt.is_lazy() {
                return Err(TrellisError::configuration(
                    provider,
                    "an instance is already constructed and cannot be lazy",
                ));
            }
        }

        let qualified = output.as_ref().and_then(WireOption::qualifier).is_some();
        if is_primitive && !qualified {
            return Err(TrellisError::configuration(
                provider,
                "primitive type should be provided with a named wire out option",
            ));
        }

        Ok(Self {
            inputs: Vec::new(),
            output,
        })
    }

    /// Option for the input at `position`, if one was supplied.
    pub fn input(&self, position: usize) -> Option<&WireOption> {
        self.inputs.get(position)
    }

    pub fn inputs(&self) -> &[WireOption] {
        &self.inputs
    }

    pub fn output(&self) -> Option<&WireOption> {
        self.output.as_ref()
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.output.as_ref().and_then(WireOption::qualifier)
    }

    pub fn is_primary(&self) -> bool {
        self.output.as_ref().is_some_and(WireOption::is_primary)
    }

    pub fn is_lazy(&self) -> bool {
        self.output.as_ref().is_some_and(WireOption::is_lazy)
    }

    pub fn allows_profile(&self, profile: Option<&str>) -> bool {
        self.output
            .as_ref()
            .map_or(true, |opt| opt.allows_profile(profile))
    }
}
