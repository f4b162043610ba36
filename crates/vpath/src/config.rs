// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file parsing and data types for .vpath.yaml files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Branch;

#[cfg(test)]
#[path = "./config_test.rs"]
mod config_test;

/// API version for configuration files.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "vpath/v0")]
    V0,
}

/// Helper for two-stage deserialization to determine API version first.
#[derive(Deserialize)]
struct ApiVersionMapping {
    #[serde(default)]
    api: ApiVersion,
}

/// Contents of a single .vpath.yaml file.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    /// API version identifier.
    pub api: ApiVersion,

    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// In-tree inheritance control.
    /// When false (default), discovery stops at this file.
    /// When true, .vpath.yaml files in parent directories are loaded too.
    #[serde(default)]
    pub inherit: bool,

    /// Out-of-tree files loaded before this one.
    /// Absolute, home-relative (~/) or relative to this file's directory.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,

    /// URI scheme stripped from symbolic paths (`vpath` when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    /// Fail resolution when no candidate exists instead of falling back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,

    /// Keywords referenced by bare-name placeholders.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub keywords: BTreeMap<String, String>,

    /// Nested parameter overrides, linearized into dotted keys when applied.
    #[serde(
        default,
        deserialize_with = "deserialize_parameters",
        skip_serializing_if = "Branch::is_empty"
    )]
    pub parameters: Branch,

    /// Path to the file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl ConfigFile {
    /// Parse a configuration from a YAML string.
    pub fn from_yaml<S: Into<String>>(yaml: S) -> crate::Result<Self> {
        let yaml = yaml.into();

        // Stage 1: Parse to get API version
        let value: serde_yaml::Value =
            serde_yaml::from_str(&yaml).map_err(|e| crate::Error::InvalidYaml {
                error: e,
                yaml_content: yaml.clone(),
            })?;

        let with_version: ApiVersionMapping =
            serde_yaml::from_value(value.clone()).map_err(|e| crate::Error::InvalidYaml {
                error: e,
                yaml_content: yaml.clone(),
            })?;

        // Stage 2: Deserialize based on version
        let config: Self = match with_version.api {
            ApiVersion::V0 => {
                serde_yaml::from_value(value).map_err(|e| crate::Error::InvalidYaml {
                    error: e,
                    yaml_content: yaml,
                })?
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a file path.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| crate::Error::ReadFailed {
            path: path.to_path_buf(),
            error: e,
        })?;

        let mut config = Self::from_yaml(yaml)?;
        config.source_path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Check the parts of a configuration serde cannot express.
    pub fn validate(&self) -> crate::Result<()> {
        if self.parameters.as_value().is_some() {
            return Err(crate::Error::ValidationFailed(
                "parameters must be a mapping of keys to values".to_string(),
            ));
        }

        if let Some(scheme) = &self.scheme {
            if scheme.is_empty() || scheme.contains(['/', ':']) {
                return Err(crate::Error::ValidationFailed(format!(
                    "invalid scheme {scheme:?}: expected a bare name such as 'vpath'"
                )));
            }
        }

        Ok(())
    }

    /// The parameters as dotted `(key, value)` pairs.
    pub fn linearized_parameters(&self) -> Vec<(String, String)> {
        self.parameters.linearize()
    }

    /// Resolve the includes of this file to canonical paths.
    pub fn resolve_includes(&self) -> crate::Result<Vec<PathBuf>> {
        let base_dir = self.source_path.as_deref().and_then(Path::parent);
        self.includes
            .iter()
            .map(|include| resolve_include_path(include, base_dir))
            .collect()
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> crate::Result<String> {
        serde_yaml::to_string(self).map_err(|e| crate::Error::InvalidYaml {
            error: e,
            yaml_content: String::new(),
        })
    }
}

/// An empty `parameters:` entry is an empty mapping.
fn deserialize_parameters<'de, D>(deserializer: D) -> Result<Branch, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Branch>::deserialize(deserializer)?.unwrap_or_default())
}

/// Resolve an include path to an absolute canonical path.
fn resolve_include_path(include: &str, base_dir: Option<&Path>) -> crate::Result<PathBuf> {
    let path = if let Some(rest) = include.strip_prefix('~') {
        let home = dirs::home_dir().ok_or_else(|| {
            crate::Error::ValidationFailed("Cannot resolve ~ without HOME".to_string())
        })?;
        home.join(rest.trim_start_matches('/'))
    } else if Path::new(include).is_absolute() {
        PathBuf::from(include)
    } else {
        let base = base_dir.ok_or_else(|| {
            crate::Error::ValidationFailed(format!(
                "Cannot resolve relative include '{include}' without base directory"
            ))
        })?;
        base.join(include)
    };

    dunce::canonicalize(&path).map_err(|e| crate::Error::ConfigNotFound { path, error: e })
}
