// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! The resolution context: parameters, namespace tree and settings in one
//! place.

use std::fmt;
use std::path::Path;

use crate::branch::{self, Branch};
use crate::namespace::PATH_SEPARATOR;
use crate::reach::REACH_SEPARATOR;
use crate::{ComposedConfig, FsProbe, Namespace, Parameters, Probe, Reach, Result};

#[cfg(test)]
#[path = "./context_test.rs"]
mod context_test;

/// Scheme stripped from symbolic paths unless configured otherwise.
pub const DEFAULT_SCHEME: &str = "vpath";

/// Branch of the parameters describing the namespace tree.
pub const PROTOCOL_PREFIX: &str = "protocol";

const NAMESPACE_PREFIX: &str = "namespace.prefix";

/// Built-in parameters, formatted lazily against the `root` and `cwd`
/// keywords.
pub const DEFAULT_PARAMETERS: &[(&str, &str)] = &[
    ("root.hoa", "(:root:)"),
    ("root.application", "(:cwd:h:)"),
    ("root.data", "(:%root.application:h:)/Data"),
    ("protocol.Application", "(:%root.application:)/"),
    ("protocol.Application/Public", "Public/"),
    ("protocol.Data", "(:%root.data:)/"),
    ("protocol.Data/Etc", "Etc/"),
    ("protocol.Data/Etc/Configuration", "Configuration/"),
    ("protocol.Data/Etc/Locale", "Locale/"),
    ("protocol.Data/Library", "Library/Hoathis/;Library/Hoa/"),
    ("protocol.Data/Lost+found", "Lost+found/"),
    ("protocol.Data/Temporary", "Temporary/"),
    ("protocol.Data/Variable", "Variable/"),
    ("protocol.Data/Variable/Cache", "Cache/"),
    ("protocol.Data/Variable/Database", "Database/"),
    ("protocol.Data/Variable/Log", "Log/"),
    ("protocol.Data/Variable/Private", "Private/"),
    ("protocol.Data/Variable/Run", "Run/"),
    ("protocol.Data/Variable/Test", "Test/"),
    (
        "protocol.Library",
        "(:%protocol.Data:)Library/Hoathis/;(:%protocol.Data:)Library/Hoa/;\
         (:%root.hoa:)/Hoathis/;(:%root.hoa:)/Hoa/",
    ),
    (
        "namespace.prefix.*",
        "(:%protocol.Data:)Library/;(:%root.hoa:)/",
    ),
    ("namespace.prefix.Application", "(:%root.application:h:)/"),
];

/// Replacements applied when `root.data` does not exist: libraries are only
/// looked up in the vendor tree.
pub const VENDOR_ONLY_PARAMETERS: &[(&str, &str)] = &[
    ("protocol.Library", "(:%root.hoa:)/Hoathis/;(:%root.hoa:)/Hoa/"),
    ("namespace.prefix.*", "(:%root.hoa:)/"),
];

/// Version of this library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub pre: &'static str,
}

impl Version {
    pub fn current() -> Self {
        Self {
            major: env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or_default(),
            minor: env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or_default(),
            patch: env!("CARGO_PKG_VERSION_PATCH").parse().unwrap_or_default(),
            pre: env!("CARGO_PKG_VERSION_PRE"),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        Ok(())
    }
}

/// Platform facts fixed for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constants {
    /// Separator between path components.
    pub directory_separator: char,
    /// Separator between entries of a path list such as `PATH`.
    pub path_list_separator: char,
    pub line_ending: &'static str,
    pub is_windows: bool,
    pub pointer_width: u32,
    pub version: Version,
}

impl Constants {
    pub fn current() -> Self {
        Self {
            directory_separator: std::path::MAIN_SEPARATOR,
            path_list_separator: if cfg!(windows) { ';' } else { ':' },
            line_ending: "\r\n",
            is_windows: cfg!(windows),
            pointer_width: usize::BITS,
            version: Version::current(),
        }
    }
}

impl Default for Constants {
    fn default() -> Self {
        Self::current()
    }
}

/// Behavior switches of a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Symbolic paths are written `<scheme>://Component/...`.
    pub scheme: String,
    /// Fail instead of falling back to the first candidate.
    pub strict: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scheme: DEFAULT_SCHEME.to_string(),
            strict: false,
        }
    }
}

/// Parameters and the namespace tree built from them.
///
/// ```no_run
/// let mut context = vpath::Context::new("/opt/vendor", "/srv/app/bin")?;
/// context.initialize(Vec::<(String, String)>::new())?;
/// let cache = context.resolve("vpath://Data/Variable/Cache")?;
/// # Ok::<(), vpath::Error>(())
/// ```
#[derive(Debug)]
pub struct Context<P: Probe = FsProbe> {
    constants: Constants,
    parameters: Parameters,
    namespace: Namespace,
    settings: Settings,
    probe: P,
}

impl Context<FsProbe> {
    /// Create a context checking candidates against the local filesystem.
    pub fn new<R: AsRef<Path>, C: AsRef<Path>>(root: R, cwd: C) -> Result<Self> {
        Self::with_probe(root, cwd, FsProbe)
    }
}

impl<P: Probe> Context<P> {
    /// Create a context with the built-in defaults and the `root` and `cwd`
    /// keywords. The namespace tree stays empty until [`Self::initialize`].
    pub fn with_probe<R: AsRef<Path>, C: AsRef<Path>>(root: R, cwd: C, probe: P) -> Result<Self> {
        let mut parameters = Parameters::with_defaults(DEFAULT_PARAMETERS.iter().copied())?;
        parameters.set_keyword("root", root.as_ref().display().to_string());
        parameters.set_keyword("cwd", cwd.as_ref().display().to_string());

        Ok(Self {
            constants: Constants::current(),
            parameters,
            namespace: Namespace::new(),
            settings: Settings::default(),
            probe,
        })
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Start again from the defaults, apply `overrides` and rebuild the
    /// namespace tree from the `protocol` branch.
    ///
    /// When the formatted `root.data` does not exist, `protocol.Library` and
    /// `namespace.prefix.*` switch to their vendor-only values. This is not an
    /// unconditional overwrite: a key named in `overrides` keeps the caller's
    /// value and only defaults are replaced.
    pub fn initialize<I, K, V>(&mut self, overrides: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let overrides: Vec<(String, String)> = overrides
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        let mut parameters = self.parameters.clone();
        parameters.reset_parameters();
        parameters.set_parameters(overrides.iter().cloned())?;

        let root_data = parameters.get_formatted_parameter("root.data")?;
        if !self.probe.exists(Path::new(&root_data)) {
            tracing::debug!(%root_data, "data root is missing, using vendor libraries only");
            parameters.set_parameters(
                VENDOR_ONLY_PARAMETERS
                    .iter()
                    .copied()
                    .filter(|(key, _)| !overrides.iter().any(|(set, _)| set.as_str() == *key)),
            )?;
        }

        let namespace = build_namespace(&parameters, self.settings.strict)?;
        tracing::debug!(
            components = namespace.walk().len(),
            overrides = overrides.len(),
            "initialized"
        );
        self.parameters = parameters;
        self.namespace = namespace;
        Ok(())
    }

    /// Apply a composed configuration: keywords, settings, then
    /// [`Self::initialize`] with its parameters.
    pub fn apply(&mut self, config: &ComposedConfig) -> Result<()> {
        for (name, value) in &config.keywords {
            self.parameters.set_keyword(name.as_str(), value.as_str());
        }
        if let Some(scheme) = &config.scheme {
            self.set_scheme(scheme.as_str());
        }
        if let Some(strict) = config.strict {
            self.set_strict(strict);
        }
        self.initialize(
            config
                .parameters
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        )
    }

    pub fn set_scheme<S: Into<String>>(&mut self, scheme: S) {
        self.settings.scheme = scheme.into();
    }

    pub fn set_strict(&mut self, strict: bool) {
        self.settings.strict = strict;
        self.namespace.set_strict(strict);
    }

    /// Record a keyword and forget every cached resolution.
    pub fn set_keyword<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.parameters.set_keyword(name, value);
        self.namespace.clear_cache();
    }

    /// Set parameters and forget every cached resolution.
    ///
    /// Reach templates pick the new values up on the next resolution; the
    /// shape of the tree only changes on [`Self::initialize`].
    pub fn set_parameters<I, K, V>(&mut self, map: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters.set_parameters(map)?;
        self.namespace.clear_cache();
        Ok(())
    }

    /// Replace the reach of the component at `path`, with or without the
    /// scheme.
    pub fn set_protocol(&mut self, path: &str, reach: &str) -> Result<()> {
        let path = self.strip_scheme(path).unwrap_or(path).to_string();
        self.namespace.set_reach(&path, Reach::parse(reach))
    }

    /// The symbolic path of `uri`, or `None` when it does not use the
    /// configured scheme.
    pub fn strip_scheme<'a>(&self, uri: &'a str) -> Option<&'a str> {
        uri.strip_prefix(self.settings.scheme.as_str())?
            .strip_prefix("://")
    }

    /// Resolve a symbolic URI to a physical path. Anything not using the
    /// scheme is returned unchanged.
    pub fn resolve(&mut self, uri: &str) -> Result<String> {
        match self.strip_scheme(uri) {
            Some(path) => self.namespace.resolve(path, &self.parameters, &self.probe),
            None => Ok(uri.to_string()),
        }
    }

    /// Every existing physical path of a symbolic URI.
    pub fn resolve_all(&self, uri: &str) -> Result<Vec<String>> {
        match self.strip_scheme(uri) {
            Some(path) => self.namespace.resolve_all(path, &self.parameters, &self.probe),
            None => Ok(vec![uri.to_string()]),
        }
    }

    /// Every candidate of a symbolic URI, existing or not.
    pub fn candidates(&self, uri: &str) -> Result<Vec<String>> {
        match self.strip_scheme(uri) {
            Some(path) => self.namespace.candidates(path, &self.parameters),
            None => Ok(vec![uri.to_string()]),
        }
    }

    /// Formatted lookup roots for the code namespace `name`, falling back
    /// to `namespace.prefix.*`.
    pub fn namespace_prefix(&self, name: &str) -> Result<Vec<String>> {
        let specific = format!("{NAMESPACE_PREFIX}.{}", branch::join_key(&[name]));
        let key = if self.parameters.contains(&specific) {
            specific
        } else {
            format!("{NAMESPACE_PREFIX}.*")
        };

        let formatted = self.parameters.get_formatted_parameter(&key)?;
        Ok(formatted
            .split(REACH_SEPARATOR)
            .filter(|prefix| !prefix.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Build a namespace tree from the `protocol` branch of `parameters`.
///
/// Keys are component paths; nested branches join their segments with `/`.
/// Parents are registered before their children and missing ancestors get
/// an empty reach.
pub fn build_namespace(parameters: &Parameters, strict: bool) -> Result<Namespace> {
    let mut entries = Vec::new();
    collect_protocol(&parameters.raw_branche(PROTOCOL_PREFIX), "", &mut entries);

    let mut entries: Vec<(Vec<String>, String)> = entries
        .into_iter()
        .map(|(path, reach)| {
            let segments: Vec<String> = path
                .split(PATH_SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect();
            (segments, reach)
        })
        .filter(|(segments, _)| !segments.is_empty())
        .collect();
    entries.sort_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));

    let mut namespace = Namespace::new();
    namespace.set_strict(strict);
    for (segments, reach) in entries {
        let Some((name, parents)) = segments.split_last() else {
            continue;
        };

        for depth in 0..parents.len() {
            let ancestor = parents[..=depth].join("/");
            if namespace.component(&ancestor).is_err() {
                let parent = parents[..depth].join("/");
                namespace.add_component(&parent, parents[depth].as_str(), Reach::default())?;
            }
        }
        namespace.add_component(&parents.join("/"), name.as_str(), Reach::parse(&reach))?;
    }
    Ok(namespace)
}

fn collect_protocol(branch: &Branch, path: &str, out: &mut Vec<(String, String)>) {
    match branch {
        Branch::Value(reach) => out.push((path.to_string(), reach.clone())),
        Branch::Node(children) => {
            for (segment, child) in children {
                let child_path = if path.is_empty() {
                    segment.clone()
                } else {
                    format!("{path}{PATH_SEPARATOR}{segment}")
                };
                collect_protocol(child, &child_path, out);
            }
        }
    }
}
