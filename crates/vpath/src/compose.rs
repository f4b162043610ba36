// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Composition logic for merging multiple configuration files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::ConfigFile;
use crate::branch;

#[cfg(test)]
#[path = "./compose_test.rs"]
mod compose_test;

/// Configuration merged from multiple files.
#[derive(Debug, Clone, Default)]
pub struct ComposedConfig {
    /// Merged keywords (later files win).
    pub keywords: BTreeMap<String, String>,

    /// Merged parameters as dotted keys (later files win).
    pub parameters: BTreeMap<String, String>,

    /// URI scheme (last file that sets it wins).
    pub scheme: Option<String>,

    /// Strict resolution (last file that sets it wins).
    pub strict: Option<bool>,

    /// Source files that contributed to this composition.
    pub source_files: Vec<PathBuf>,
}

impl ComposedConfig {
    /// Create a new empty composition.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the composition sets anything.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
            && self.parameters.is_empty()
            && self.scheme.is_none()
            && self.strict.is_none()
    }

    /// Get the number of source files.
    pub fn source_count(&self) -> usize {
        self.source_files.len()
    }

    /// Layer one file on top of the composition.
    ///
    /// A key replaces every earlier key it conflicts with: its own prefixes
    /// and the keys beneath it.
    pub fn merge(&mut self, config: &ConfigFile) {
        self.keywords.extend(
            config
                .keywords
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );

        for (key, value) in config.linearized_parameters() {
            if key.is_empty() {
                continue;
            }
            let prefixes = branch::key_prefixes(&key);
            self.parameters.retain(|existing, _| {
                !branch::is_under(existing, &key) && !prefixes.contains(&existing.as_str())
            });
            self.parameters.insert(key, value);
        }

        if config.scheme.is_some() {
            self.scheme = config.scheme.clone();
        }
        if config.strict.is_some() {
            self.strict = config.strict;
        }

        if let Some(path) = &config.source_path {
            self.source_files.push(path.clone());
        }
    }
}

/// Compose multiple files into a single configuration.
///
/// Files are processed in order, with later files layering on top of earlier
/// ones.
pub fn compose_configs(configs: &[ConfigFile]) -> ComposedConfig {
    let mut composed = ComposedConfig::default();
    for config in configs {
        composed.merge(config);
    }
    composed
}
