// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Nested parameter branches and the dotted-key encoding used to flatten them.
//!
//! A dotted key joins the segments of a path through a branch with `.`; a
//! literal dot inside a segment is escaped as `\.`.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::Serialize;

#[cfg(test)]
#[path = "./branch_test.rs"]
mod branch_test;

/// Separator between the segments of a dotted key.
pub const KEY_SEPARATOR: char = '.';

/// A value or a nested mapping of values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Branch {
    Value(String),
    Node(BTreeMap<String, Branch>),
}

impl Default for Branch {
    fn default() -> Self {
        Self::Node(BTreeMap::new())
    }
}

impl Branch {
    /// Create an empty node.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            Self::Node(_) => None,
        }
    }

    pub fn as_node(&self) -> Option<&BTreeMap<String, Branch>> {
        match self {
            Self::Value(_) => None,
            Self::Node(children) => Some(children),
        }
    }

    /// Child of a node by segment name.
    pub fn get(&self, segment: &str) -> Option<&Branch> {
        self.as_node().and_then(|children| children.get(segment))
    }

    /// True for a node without children.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Node(children) if children.is_empty())
    }

    /// Flatten into `(dotted key, value)` pairs relative to this branch.
    ///
    /// A bare value produces a single pair with an empty key.
    pub fn linearize(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.linearize_into(&mut Vec::new(), &mut out);
        out
    }

    /// Flatten with every key placed under `prefix`.
    pub fn linearize_under(&self, prefix: &str) -> Vec<(String, String)> {
        self.linearize()
            .into_iter()
            .map(|(key, value)| (prefixed_key(prefix, &key), value))
            .collect()
    }

    fn linearize_into(&self, path: &mut Vec<String>, out: &mut Vec<(String, String)>) {
        match self {
            Self::Value(value) => out.push((join_key(path), value.clone())),
            Self::Node(children) => {
                for (segment, child) in children {
                    path.push(segment.clone());
                    child.linearize_into(path, out);
                    path.pop();
                }
            }
        }
    }

    /// Rebuild a nested branch from dotted keys.
    ///
    /// When a key is both a value and the prefix of another key, the pair
    /// that comes later wins.
    pub fn unlinearize<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut root = Self::new();
        for (key, value) in pairs {
            root.insert(&split_key(key.as_ref()), value.into());
        }
        root
    }

    fn insert(&mut self, segments: &[String], value: String) {
        let Some((first, rest)) = segments.split_first() else {
            *self = Self::Value(value);
            return;
        };

        if !matches!(self, Self::Node(_)) {
            *self = Self::new();
        }
        if let Self::Node(children) = self {
            children
                .entry(first.clone())
                .or_default()
                .insert(rest, value);
        }
    }
}

impl From<&str> for Branch {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for Branch {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl<K: Into<String>> FromIterator<(K, Branch)> for Branch {
    fn from_iter<I: IntoIterator<Item = (K, Branch)>>(iter: I) -> Self {
        Self::Node(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de> Deserialize<'de> for Branch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(BranchVisitor)
    }
}

/// Scalars of any type become string values, mappings become nodes.
struct BranchVisitor;

impl<'de> Visitor<'de> for BranchVisitor {
    type Value = Branch;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a scalar value or a mapping of parameters")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Branch, E> {
        Ok(Branch::Value(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Branch, E> {
        Ok(Branch::Value(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Branch, E> {
        Ok(Branch::Value(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Branch, E> {
        Ok(Branch::Value(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Branch, E> {
        Ok(Branch::Value(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Branch, E> {
        Ok(Branch::Value(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Branch, E> {
        Ok(Branch::Value(String::new()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Branch, A::Error> {
        let mut children = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, Branch>()? {
            children.insert(key, value);
        }
        Ok(Branch::Node(children))
    }
}

/// Split a dotted key on unescaped dots, unescaping `\.` in each segment.
pub fn split_key(key: &str) -> Vec<String> {
    if key.is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&KEY_SEPARATOR) => {
                current.push(KEY_SEPARATOR);
                chars.next();
            }
            KEY_SEPARATOR => segments.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    segments.push(current);
    segments
}

/// Join segments into a dotted key, escaping dots inside segments.
pub fn join_key<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| segment.as_ref().replace(KEY_SEPARATOR, "\\."))
        .collect::<Vec<_>>()
        .join(".")
}

/// Every proper prefix of a dotted key that ends on a segment boundary.
///
/// `a.b.c` yields `a` and `a.b`.
pub fn key_prefixes(key: &str) -> Vec<&str> {
    let mut prefixes = Vec::new();
    let mut previous = None;
    for (index, c) in key.char_indices() {
        if c == KEY_SEPARATOR && previous != Some('\\') {
            prefixes.push(&key[..index]);
        }
        previous = Some(c);
    }
    prefixes
}

/// Whether `key` is `prefix` itself or lies beneath it.
pub fn is_under(key: &str, prefix: &str) -> bool {
    prefix.is_empty() || relative_key(key, prefix).is_some()
}

/// The part of `key` below `prefix`, or `None` when `key` is not beneath it.
/// `prefix` itself maps to the empty key.
pub fn relative_key<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(key);
    }
    let rest = key.strip_prefix(prefix)?;
    if rest.is_empty() {
        return Some(rest);
    }
    // `a\.b` is a single segment, not `b` beneath `a\`
    if prefix.ends_with('\\') {
        return None;
    }
    rest.strip_prefix(KEY_SEPARATOR)
}

fn prefixed_key(prefix: &str, key: &str) -> String {
    match (prefix.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}{KEY_SEPARATOR}{key}"),
    }
}
