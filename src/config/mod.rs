use crate::core::{TrellisError, TrellisResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Active profile; providers gated on other profiles are ignored.
    /// When unset, only ungated providers are active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Name reported to initializers through [`ApplicationInfo`]
    #[serde(default = "default_application_name")]
    pub application_name: String,
}

fn default_application_name() -> String {
    "trellis-app".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            profile: None,
            application_name: default_application_name(),
        }
    }
}

impl ResolverConfig {
    pub fn from_yaml_str(content: &str) -> TrellisResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| TrellisError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Load config from a YAML file
    pub fn load(path: impl AsRef<Path>) -> TrellisResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn info(&self) -> ApplicationInfo {
        ApplicationInfo {
            name: self.application_name.clone(),
            profile: self.profile.clone(),
        }
    }
}

/// What an application knows about itself once configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationInfo {
    pub name: String,
    pub profile: Option<String>,
}
