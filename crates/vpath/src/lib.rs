// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! vpath - Virtual Namespace and Parameter Resolution
//!
//! This crate resolves symbolic resource paths such as
//! `vpath://Data/Variable/Cache` to physical locations, choosing among
//! several fallback directories, and formats configuration values that
//! reference each other through placeholder expressions.
//!
//! # Overview
//!
//! A [`Context`] owns a [`Parameters`] store and a [`Namespace`] tree. The
//! store is populated with built-in defaults plus caller overrides, then its
//! `protocol` branch describes the components of the tree. Each component
//! carries a [`Reach`]: an ordered list of path templates, tried in order
//! until one exists on disk.
//!
//! # Example
//!
//! ```yaml
//! # .vpath.yaml
//! api: vpath/v0
//! description: "Project layout"
//!
//! keywords:
//!   site: /srv/site
//!
//! parameters:
//!   root:
//!     data: "(:site:)/Data"
//!   protocol:
//!     Data/Library: "Library/Local/;Library/Vendor/"
//! ```
//!
//! Values may reference keywords (`(:site:)`), other parameters
//! (`(:%root.data:)`) and apply transforms (`(:%root.data:h:)` is the
//! parent directory of `root.data`).

pub mod branch;
pub mod compose;
pub mod config;
pub mod context;
pub mod discovery;
pub mod error;
pub mod namespace;
pub mod parameter;
pub mod placeholder;
pub mod probe;
pub mod reach;

pub use branch::Branch;
pub use compose::{ComposedConfig, compose_configs};
pub use config::{ApiVersion, ConfigFile};
pub use context::{Constants, Context, DEFAULT_SCHEME, Settings, Version};
pub use discovery::{DiscoveryOptions, discover_configs};
pub use error::{Error, Result};
pub use namespace::{Component, Namespace};
pub use parameter::{MAX_EXPANSION_DEPTH, Parameters};
pub use placeholder::Transform;
pub use probe::{FsProbe, Probe};
pub use reach::{Reach, ReachEntry};

/// Well-known filename for configuration files.
pub const VPATH_FILENAME: &str = ".vpath.yaml";

/// Well-known filename for local overrides.
pub const VPATH_LOCAL_FILENAME: &str = ".vpath.local.yaml";
