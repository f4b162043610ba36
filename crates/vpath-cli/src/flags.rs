// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Flags shared by the commands that load a context.

use std::path::{Path, PathBuf};

use clap::Args;
use miette::Result;
use vpath::{Branch, ConfigFile, Context, DiscoveryOptions};

#[cfg(test)]
#[path = "./flags_test.rs"]
mod flags_test;

/// Name of the per-user configuration file under the user config directory.
const USER_CONFIG: &str = "config.yaml";

#[derive(Debug, Clone, Args)]
pub struct ContextFlags {
    /// Start discovery from PATH
    #[clap(short = 'f', long, default_value = ".")]
    pub file: PathBuf,

    /// Additional configuration file, loaded before in-tree files
    #[clap(short = 'c', long = "config", env = "VPATH_CONFIG", value_delimiter = ':')]
    pub config_files: Vec<PathBuf>,

    /// Override a parameter (dotted key)
    #[clap(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub parameters: Vec<(String, String)>,

    /// Define a keyword
    #[clap(
        short = 'k',
        long = "keyword",
        value_name = "NAME=VALUE",
        value_parser = parse_assignment
    )]
    pub keywords: Vec<(String, String)>,

    /// Vendor root, available as the `root` keyword
    #[clap(long, env = "VPATH_ROOT")]
    pub root: Option<PathBuf>,

    /// Working directory, available as the `cwd` keyword
    #[clap(long, env = "VPATH_CWD")]
    pub cwd: Option<PathBuf>,

    /// Enable in-tree discovery
    #[clap(long, env = "VPATH_INHERIT")]
    pub inherit: bool,

    /// Disable in-tree discovery
    #[clap(short = 'n', long, env = "VPATH_NO_INHERIT")]
    pub no_inherit: bool,

    /// Fail when no candidate location exists
    #[clap(long, env = "VPATH_STRICT")]
    pub strict: bool,

    /// Ignore the per-user configuration file
    #[clap(long)]
    pub no_user_config: bool,
}

/// A context together with the files it was configured from.
pub struct Loaded {
    pub context: Context,
    pub configs: Vec<ConfigFile>,
}

impl ContextFlags {
    /// Discover configuration, layer the command line on top and build an
    /// initialized context.
    pub fn load(&self) -> Result<Loaded> {
        let options = DiscoveryOptions {
            no_inherit: self.no_inherit,
            force_inherit: self.inherit,
            user_config: self.user_config(),
            config_files: self.config_files.clone(),
        };

        let configs = vpath::discover_configs(&self.file, &options)?;
        let mut composed = vpath::compose_configs(&configs);
        composed.merge(&self.overrides());
        tracing::debug!(
            files = composed.source_count(),
            parameters = composed.parameters.len(),
            "composed configuration"
        );

        let mut context = Context::new(self.root_dir(), self.cwd_dir())?;
        context.apply(&composed)?;
        Ok(Loaded { context, configs })
    }

    /// The command line as one more configuration layer.
    fn overrides(&self) -> ConfigFile {
        ConfigFile {
            keywords: self.keywords.iter().cloned().collect(),
            parameters: Branch::unlinearize(
                self.parameters
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.as_str())),
            ),
            strict: self.strict.then_some(true),
            ..Default::default()
        }
    }

    fn user_config(&self) -> Option<PathBuf> {
        if self.no_user_config {
            return None;
        }
        dirs::config_dir().map(|dir| dir.join("vpath").join(USER_CONFIG))
    }

    /// The explicit root, else the directory above the one holding the
    /// executable.
    fn root_dir(&self) -> PathBuf {
        self.root
            .clone()
            .or_else(|| {
                let exe = std::env::current_exe().ok()?;
                exe.parent()?.parent().map(Path::to_path_buf)
            })
            .unwrap_or_else(|| self.cwd_dir())
    }

    /// The explicit working directory, else the discovery start.
    fn cwd_dir(&self) -> PathBuf {
        self.cwd.clone().unwrap_or_else(|| {
            dunce::canonicalize(&self.file).unwrap_or_else(|_| self.file.clone())
        })
    }
}

/// Parse `name=value`.
pub fn parse_assignment(text: &str) -> std::result::Result<(String, String), String> {
    match text.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got {text:?}")),
    }
}

/// Add the scheme to a bare symbolic path.
pub fn qualify(context: &Context, path: &str) -> String {
    if path.contains("://") || Path::new(path).is_absolute() {
        path.to_string()
    } else {
        format!("{}://{}", context.settings().scheme, path)
    }
}
