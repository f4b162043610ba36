// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for vpath operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience Result type with vpath Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during vpath operations.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Parameter or keyword lookup failed
    #[error("Unknown parameter or keyword: {0}")]
    #[diagnostic(
        code(vpath::unknown_key),
        help("Define the key with --set or in a .vpath.yaml parameters section")
    )]
    UnknownKey(String),

    /// Namespace component lookup failed
    #[error("Unknown component {component:?} in {path:?}")]
    #[diagnostic(
        code(vpath::unknown_component),
        help("{}", component_message(available))
    )]
    UnknownComponent {
        path: String,
        component: String,
        available: Vec<String>,
    },

    /// Placeholder expansion did not terminate
    #[error("Cyclic reference while formatting {key:?}: {}", chain.join(" -> "))]
    #[diagnostic(
        code(vpath::cyclic_reference),
        help("Break the cycle so that every reference eventually ends in a literal value")
    )]
    CyclicReference { key: String, chain: Vec<String> },

    /// Placeholder names a transform that does not exist
    #[error("Unknown transform '{transform}' in placeholder {placeholder:?}")]
    #[diagnostic(
        code(vpath::unknown_transform),
        help("Available transforms are h, t, r, e, l, u and U")
    )]
    UnknownTransform { transform: char, placeholder: String },

    /// Component already registered under the same parent
    #[error("Component {name:?} already exists under {parent:?}")]
    #[diagnostic(
        code(vpath::duplicate_component),
        help("Use set_reach to change the reach of an existing component")
    )]
    DuplicateComponent { parent: String, name: String },

    /// Placeholder syntax error
    #[error("Malformed placeholder in {template:?}: {reason}")]
    #[diagnostic(code(vpath::malformed_placeholder))]
    MalformedPlaceholder { template: String, reason: String },

    /// A key would be both a value and a branch
    #[error("Parameter {key:?} conflicts with existing parameter {existing:?}")]
    #[diagnostic(
        code(vpath::key_conflict),
        help("A key cannot hold a value and contain sub-keys at the same time")
    )]
    KeyConflict { key: String, existing: String },

    /// Strict resolution found no existing candidate
    #[error("No candidate exists for {path:?}")]
    #[diagnostic(
        code(vpath::no_candidate_found),
        help("Tried, in order:\n{}", candidates.join("\n"))
    )]
    NoCandidateFound {
        path: String,
        candidates: Vec<String>,
    },

    /// Symbolic path cannot be walked
    #[error("Invalid symbolic path: {0:?}")]
    #[diagnostic(code(vpath::invalid_path))]
    InvalidPath(String),

    /// Invalid YAML in configuration file
    #[error("Invalid configuration file: {error}")]
    #[diagnostic(
        code(vpath::invalid_yaml),
        help("Check YAML syntax and ensure 'api: vpath/v0' is present")
    )]
    InvalidYaml {
        #[source]
        error: serde_yaml::Error,
        yaml_content: String,
    },

    /// Failed to read file
    #[error("Failed to read file: {path:?}")]
    #[diagnostic(code(vpath::read_failed))]
    ReadFailed {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// Explicitly requested configuration file is missing
    #[error("Configuration file not found: {path:?}")]
    #[diagnostic(
        code(vpath::config_not_found),
        help("Check that the configuration path is correct and the file exists")
    )]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// A configuration file includes itself, directly or not
    #[error("Circular include detected: {0:?}")]
    #[diagnostic(
        code(vpath::circular_include),
        help("Remove the circular reference in your includes")
    )]
    CircularInclude(PathBuf),

    /// Configuration content is well-formed YAML but unusable
    #[error("Validation failed: {0}")]
    #[diagnostic(code(vpath::validation_failed))]
    ValidationFailed(String),

    /// IO error passthrough
    #[error(transparent)]
    #[diagnostic(code(vpath::io_error))]
    Io(#[from] std::io::Error),
}

fn component_message(available: &[String]) -> String {
    if available.is_empty() {
        "This component has no children".to_string()
    } else {
        format!("Known components here: {}", available.join(", "))
    }
}
