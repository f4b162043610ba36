// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Existence checks used to pick among candidate locations.

use std::path::Path;

/// Answers whether a candidate location exists.
pub trait Probe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl Probe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

impl<F> Probe for F
where
    F: Fn(&Path) -> bool,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}
