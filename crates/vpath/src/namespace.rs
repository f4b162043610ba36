// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Namespace tree: symbolic component paths mapped onto fallback locations.
//!
//! Resolving `Data/Variable/Cache` walks `Data`, then `Variable`, then
//! `Cache` from the root. Each traversed component contributes its reach to
//! the candidate locations; the first candidate that exists wins.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use indexmap::IndexMap;

use crate::{Error, Parameters, Probe, Reach, Result};

#[cfg(test)]
#[path = "./namespace_test.rs"]
mod namespace_test;

/// Separator between the components of a symbolic path.
pub const PATH_SEPARATOR: char = '/';

/// A named node of the namespace tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    name: String,
    reach: Reach,
    children: IndexMap<String, Component>,
}

impl Component {
    pub fn new<N: Into<String>>(name: N, reach: Reach) -> Self {
        Self {
            name: name.into(),
            reach,
            children: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reach(&self) -> &Reach {
        &self.reach
    }

    pub fn child(&self, name: &str) -> Option<&Component> {
        self.children.get(name)
    }

    /// Children in registration order.
    pub fn children(&self) -> impl Iterator<Item = &Component> {
        self.children.values()
    }

    fn child_names(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }
}

/// Tree of components plus the resolution cache.
#[derive(Debug, Clone)]
pub struct Namespace {
    root: Component,
    cache: HashMap<String, String>,
    strict: bool,
}

impl Default for Namespace {
    fn default() -> Self {
        Self::new()
    }
}

impl Namespace {
    /// Create a tree holding only the root.
    pub fn new() -> Self {
        Self {
            root: Component::new("", Reach::default()),
            cache: HashMap::new(),
            strict: false,
        }
    }

    pub fn root(&self) -> &Component {
        &self.root
    }

    /// In strict mode a path with no existing candidate fails with
    /// [`Error::NoCandidateFound`] instead of falling back to its first
    /// candidate.
    pub fn set_strict(&mut self, strict: bool) {
        if self.strict != strict {
            self.strict = strict;
            self.clear_cache();
        }
    }

    /// Find a component by symbolic path. The empty path is the root.
    pub fn component(&self, path: &str) -> Result<&Component> {
        let mut node = &self.root;
        for segment in segments(path) {
            node = match node.children.get(segment) {
                Some(child) => child,
                None => return Err(unknown_component(path, segment, node)),
            };
        }
        Ok(node)
    }

    fn component_mut(&mut self, path: &str) -> Result<&mut Component> {
        let mut node = &mut self.root;
        for segment in segments(path) {
            if !node.children.contains_key(segment) {
                return Err(unknown_component(path, segment, node));
            }
            node = node
                .children
                .get_mut(segment)
                .ok_or_else(|| Error::InvalidPath(path.to_string()))?;
        }
        Ok(node)
    }

    /// Attach a new component under `parent_path`.
    pub fn add_component<N: Into<String>>(
        &mut self,
        parent_path: &str,
        name: N,
        reach: Reach,
    ) -> Result<()> {
        let name = name.into();
        if name.is_empty() || name.contains(PATH_SEPARATOR) {
            return Err(Error::InvalidPath(name));
        }

        let parent = self.component_mut(parent_path)?;
        if parent.children.contains_key(&name) {
            return Err(Error::DuplicateComponent {
                parent: normalize(parent_path),
                name,
            });
        }

        tracing::debug!(parent = %normalize(parent_path), %name, %reach, "adding component");
        parent
            .children
            .insert(name.clone(), Component::new(name, reach));
        self.clear_cache();
        Ok(())
    }

    /// Replace the reach of an existing component.
    pub fn set_reach(&mut self, path: &str, reach: Reach) -> Result<()> {
        if segments(path).next().is_none() {
            return Err(Error::InvalidPath(path.to_string()));
        }

        let component = self.component_mut(path)?;
        tracing::debug!(
            path = %normalize(path),
            from = %component.reach,
            to = %reach,
            "setting reach"
        );
        component.reach = reach;
        self.clear_cache();
        Ok(())
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of cached resolutions.
    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Every candidate location for `path`, in preference order, duplicates
    /// removed.
    ///
    /// The first segment must name a child of the root. Segments left over
    /// once no child matches are appended to each candidate as-is.
    pub fn candidates(&self, path: &str, parameters: &Parameters) -> Result<Vec<String>> {
        let segments: Vec<&str> = segments(path).collect();
        if segments.is_empty() {
            return Err(Error::InvalidPath(path.to_string()));
        }

        let mut accumulator = None;
        let mut tail = None;
        let mut node = &self.root;
        for (index, segment) in segments.iter().enumerate() {
            match node.children.get(*segment) {
                Some(child) => {
                    accumulator = child.reach.extend(accumulator, parameters)?;
                    node = child;
                }
                None if index == 0 => return Err(unknown_component(path, segment, node)),
                None => {
                    tail = Some(segments[index..].join("/"));
                    break;
                }
            }
        }

        // No reach along the way leaves the empty location
        let mut accumulated = accumulator.unwrap_or_else(|| vec![String::new()]);
        if let Some(tail) = tail {
            accumulated = append_tail(accumulated, &tail);
        }

        let mut seen = HashSet::new();
        let candidates: Vec<String> = accumulated
            .into_iter()
            .filter(|candidate| seen.insert(candidate.clone()))
            .collect();
        Ok(candidates)
    }

    /// Resolve `path` to the first candidate that exists.
    ///
    /// When none exists, the first candidate is returned (or, in strict
    /// mode, [`Error::NoCandidateFound`]). The answer is cached until the
    /// tree changes.
    pub fn resolve<P: Probe + ?Sized>(
        &mut self,
        path: &str,
        parameters: &Parameters,
        probe: &P,
    ) -> Result<String> {
        let key = normalize(path);
        if let Some(cached) = self.cache.get(&key) {
            tracing::trace!(path = %key, resolved = %cached, "cache hit");
            return Ok(cached.clone());
        }

        let candidates = self.candidates(&key, parameters)?;
        let found = candidates
            .iter()
            .find(|candidate| probe.exists(Path::new(candidate.as_str())))
            .cloned();

        let resolved = match found {
            Some(resolved) => resolved,
            None if self.strict => {
                return Err(Error::NoCandidateFound {
                    path: key,
                    candidates,
                });
            }
            None => {
                let first = candidates.into_iter().next().unwrap_or_default();
                tracing::warn!(
                    path = %key,
                    fallback = %first,
                    "no candidate exists, using the first one"
                );
                first
            }
        };

        tracing::debug!(path = %key, %resolved, "resolved");
        self.cache.insert(key, resolved.clone());
        Ok(resolved)
    }

    /// Every candidate of `path` that exists, in preference order. Not cached.
    pub fn resolve_all<P: Probe + ?Sized>(
        &self,
        path: &str,
        parameters: &Parameters,
        probe: &P,
    ) -> Result<Vec<String>> {
        Ok(self
            .candidates(path, parameters)?
            .into_iter()
            .filter(|candidate| probe.exists(Path::new(candidate)))
            .collect())
    }

    /// Depth-first, pre-order walk yielding `(path, component)` pairs. The
    /// root is not included.
    pub fn walk(&self) -> Vec<(String, &Component)> {
        let mut out = Vec::new();
        let mut stack: Vec<(String, &Component)> = self
            .root
            .children
            .values()
            .rev()
            .map(|child| (child.name.clone(), child))
            .collect();

        while let Some((path, component)) = stack.pop() {
            stack.extend(
                component
                    .children
                    .values()
                    .rev()
                    .map(|child| (format!("{path}{PATH_SEPARATOR}{}", child.name), child)),
            );
            out.push((path, component));
        }
        out
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(PATH_SEPARATOR).filter(|segment| !segment.is_empty())
}

fn normalize(path: &str) -> String {
    segments(path).collect::<Vec<_>>().join("/")
}

fn append_tail(candidates: Vec<String>, tail: &str) -> Vec<String> {
    candidates
        .into_iter()
        .map(|candidate| {
            if candidate.is_empty() || candidate.ends_with(PATH_SEPARATOR) {
                format!("{candidate}{tail}")
            } else {
                format!("{candidate}{PATH_SEPARATOR}{tail}")
            }
        })
        .collect()
}

fn unknown_component(path: &str, segment: &str, parent: &Component) -> Error {
    Error::UnknownComponent {
        path: normalize(path),
        component: segment.to_string(),
        available: parent.child_names(),
    }
}
