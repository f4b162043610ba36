// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Discovery algorithm for finding and loading .vpath.yaml files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[cfg(test)]
#[path = "./discovery_test.rs"]
mod discovery_test;

use crate::{ConfigFile, VPATH_FILENAME, VPATH_LOCAL_FILENAME};

/// Options for discovery behavior.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Disable in-tree inheritance (from --no-inherit or VPATH_NO_INHERIT).
    pub no_inherit: bool,

    /// Enable in-tree inheritance (from --inherit or VPATH_INHERIT).
    pub force_inherit: bool,

    /// Per-user configuration, loaded first when it exists.
    pub user_config: Option<PathBuf>,

    /// Files named on the command line (from --config or VPATH_CONFIG).
    /// Each one must exist.
    pub config_files: Vec<PathBuf>,
}

/// Discover all applicable configuration files.
///
/// Returns files in composition order (later files override earlier ones):
/// the user configuration, explicit files, in-tree files from the outermost
/// parent down to `start_path`, then the local override. Includes are loaded
/// just before the file that names them. Finding nothing is not an error.
pub fn discover_configs<P: AsRef<Path>>(
    start_path: P,
    options: &DiscoveryOptions,
) -> crate::Result<Vec<ConfigFile>> {
    let mut configs = Vec::new();

    // Step 1: Per-user configuration
    if let Some(user_config) = options.user_config.as_deref().filter(|p| p.is_file()) {
        configs.push(ConfigFile::load(user_config)?);
    }

    // Step 2: Explicit files
    for path in &options.config_files {
        let canonical =
            dunce::canonicalize(path).map_err(|e| crate::Error::ConfigNotFound {
                path: path.clone(),
                error: e,
            })?;
        configs.push(ConfigFile::load(canonical)?);
    }

    // Step 3: In-tree files
    let start = resolve_start_path(start_path.as_ref());
    configs.extend(discover_in_tree(&start, options)?);

    // Step 4: Includes, recursively
    let mut loaded = HashSet::new();
    let mut all_configs = resolve_all_includes(configs, &mut loaded, &mut Vec::new())?;

    // Step 5: Local override
    let local_path = start.join(VPATH_LOCAL_FILENAME);
    if local_path.is_file() {
        all_configs.push(ConfigFile::load(&local_path)?);
    }

    tracing::debug!(
        start = %start.display(),
        count = all_configs.len(),
        "discovered configuration files"
    );
    Ok(all_configs)
}

/// Resolve starting path, preferring $PWD to preserve symlinks.
fn resolve_start_path(start_path: &Path) -> PathBuf {
    if start_path.is_absolute() {
        start_path.to_owned()
    } else {
        match std::env::var("PWD").ok() {
            Some(pwd) => PathBuf::from(pwd).join(start_path),
            None => std::env::current_dir()
                .unwrap_or_default()
                .join(start_path),
        }
    }
}

/// Discover files in the directory tree (walking up parents).
fn discover_in_tree(start: &Path, options: &DiscoveryOptions) -> crate::Result<Vec<ConfigFile>> {
    let mut configs = Vec::new();
    let mut current = start.to_path_buf();

    // Always try to load the starting point's file
    let start_config_path = current.join(VPATH_FILENAME);
    if start_config_path.is_file() {
        let config = ConfigFile::load(&start_config_path)?;
        let should_inherit = if options.force_inherit {
            true // --inherit overrides the file
        } else if options.no_inherit {
            false // --no-inherit overrides the file
        } else {
            config.inherit
        };
        configs.push(config);

        if !should_inherit {
            return Ok(configs);
        }
    } else if options.no_inherit {
        return Ok(configs);
    }

    // Walk up directory tree
    while current.pop() {
        let config_path = current.join(VPATH_FILENAME);
        if config_path.is_file() {
            let config = ConfigFile::load(&config_path)?;
            let inherit = config.inherit;
            configs.insert(0, config); // Parents go first

            if !inherit {
                break;
            }
        }
    }

    Ok(configs)
}

/// Recursively resolve the includes of every file.
///
/// `stack` holds the chain of files whose includes are being expanded; a
/// path already on it is a cycle. `loaded` holds every file already placed in
/// the result; reaching one again is skipped.
fn resolve_all_includes(
    configs: Vec<ConfigFile>,
    loaded: &mut HashSet<PathBuf>,
    stack: &mut Vec<PathBuf>,
) -> crate::Result<Vec<ConfigFile>> {
    let mut result = Vec::new();

    for config in configs {
        let path = config
            .source_path
            .as_deref()
            .and_then(|p| dunce::canonicalize(p).ok());

        if let Some(path) = &path {
            if stack.contains(path) {
                return Err(crate::Error::CircularInclude(path.clone()));
            }
            if loaded.contains(path) {
                tracing::debug!(path = %path.display(), "skipping already loaded file");
                continue;
            }
            stack.push(path.clone());
        }

        // Includes come before the file that names them
        for include in config.resolve_includes()? {
            if stack.contains(&include) {
                return Err(crate::Error::CircularInclude(include));
            }
            if loaded.contains(&include) {
                continue;
            }

            let included = ConfigFile::load(&include)?;
            result.extend(resolve_all_includes(vec![included], loaded, stack)?);
        }

        if let Some(path) = path {
            stack.pop();
            loaded.insert(path);
        }
        result.push(config);
    }

    Ok(result)
}
