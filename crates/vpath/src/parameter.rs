// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Hierarchical parameter store with placeholder formatting.

use std::collections::BTreeMap;

use crate::branch::{self, Branch};
use crate::placeholder::{self, Reference, Token};
use crate::{Error, Result};

#[cfg(test)]
#[path = "./parameter_test.rs"]
mod parameter_test;

/// Maximum number of nested parameter references followed while formatting.
pub const MAX_EXPANSION_DEPTH: usize = 32;

/// Dotted-key parameters plus keywords.
///
/// Parameters are stored linearized (`root.data`, `protocol.Data/Etc`, ...).
/// A key is never both a value and the prefix of another key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    defaults: BTreeMap<String, String>,
    parameters: BTreeMap<String, String>,
    keywords: BTreeMap<String, String>,
}

impl Parameters {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `defaults`, which [`Self::reset_parameters`]
    /// returns to.
    pub fn with_defaults<I, K, V>(defaults: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut store = Self::new();
        store.set_parameters(defaults)?;
        store.defaults = store.parameters.clone();
        Ok(store)
    }

    /// Record a keyword, replacing any previous value.
    pub fn set_keyword<N: Into<String>, V: Into<String>>(&mut self, name: N, value: V) {
        self.keywords.insert(name.into(), value.into());
    }

    pub fn get_keyword(&self, name: &str) -> Option<&str> {
        self.keywords.get(name).map(String::as_str)
    }

    pub fn keywords(&self) -> impl Iterator<Item = (&str, &str)> {
        self.keywords.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn reset_keywords(&mut self) {
        self.keywords.clear();
    }

    pub fn set_parameter<K: Into<String>, V: Into<String>>(
        &mut self,
        key: K,
        value: V,
    ) -> Result<()> {
        self.set_parameters([(key, value)])
    }

    /// Set or overwrite every key of `map`. Keys absent from `map` are kept.
    ///
    /// Either every assignment is applied or, on a [`Error::KeyConflict`],
    /// none is.
    pub fn set_parameters<I, K, V>(&mut self, map: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut updated = self.parameters.clone();
        for (key, value) in map {
            let key = key.into();
            check_conflicts(&updated, &key)?;
            updated.insert(key, value.into());
        }

        self.parameters = updated;
        Ok(())
    }

    /// Raw, unformatted value of `key`.
    pub fn get_parameter(&self, key: &str) -> Result<&str> {
        self.parameters
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownKey(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    /// Every raw parameter in key order.
    pub fn parameters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.parameters.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Drop every override and go back to the construction defaults.
    pub fn reset_parameters(&mut self) {
        self.parameters = self.defaults.clone();
    }

    /// Value of `key` with every placeholder expanded.
    pub fn get_formatted_parameter(&self, key: &str) -> Result<String> {
        let raw = self.get_parameter(key)?;
        self.expand_parameter(key, raw, &mut Vec::new())
    }

    /// Expand every placeholder of an arbitrary template.
    pub fn format(&self, template: &str) -> Result<String> {
        self.expand(template, &mut Vec::new())
    }

    /// Keys under `prefix`, prefix stripped, values left unformatted.
    pub fn raw_branche(&self, prefix: &str) -> Branch {
        Branch::unlinearize(self.branche_pairs(prefix).map(|(key, value)| (key, value.as_str())))
    }

    /// Keys under `prefix`, prefix stripped, rebuilt into a nested branch
    /// with every value formatted.
    pub fn unlinearize_branche(&self, prefix: &str) -> Result<Branch> {
        let pairs = self
            .branche_pairs(prefix)
            .map(|(key, raw)| -> Result<(&str, String)> {
                let full_key = self.full_key(prefix, key);
                Ok((key, self.expand_parameter(&full_key, raw, &mut Vec::new())?))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Branch::unlinearize(pairs))
    }

    /// Linearize `branch` under `prefix` and apply it like
    /// [`Self::set_parameters`].
    pub fn set_branche(&mut self, prefix: &str, branch: &Branch) -> Result<()> {
        self.set_parameters(branch.linearize_under(prefix))
    }

    fn branche_pairs<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a String)> {
        self.parameters.iter().filter_map(move |(key, value)| {
            branch::relative_key(key, prefix)
                .filter(|relative| !relative.is_empty())
                .map(|relative| (relative, value))
        })
    }

    fn full_key(&self, prefix: &str, relative: &str) -> String {
        if prefix.is_empty() {
            relative.to_string()
        } else {
            format!("{prefix}{}{relative}", branch::KEY_SEPARATOR)
        }
    }

    fn expand(&self, template: &str, chain: &mut Vec<String>) -> Result<String> {
        let mut out = String::with_capacity(template.len());
        for token in placeholder::tokenize(template)? {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Placeholder(placeholder) => {
                    let value = self.lookup(placeholder.reference, chain)?;
                    out.push_str(&placeholder.apply(value));
                }
            }
        }
        Ok(out)
    }

    fn lookup(&self, reference: Reference<'_>, chain: &mut Vec<String>) -> Result<String> {
        let name = reference.name();
        let parameter = self.parameters.get(name);
        let keyword = self.keywords.get(name);

        match (reference, parameter, keyword) {
            (Reference::Parameter(_), Some(raw), _) | (Reference::Keyword(_), Some(raw), None) => {
                self.expand_parameter(name, raw, chain)
            }
            (_, _, Some(value)) => Ok(value.clone()),
            (_, None, None) => Err(Error::UnknownKey(name.to_string())),
        }
    }

    fn expand_parameter(&self, key: &str, raw: &str, chain: &mut Vec<String>) -> Result<String> {
        if chain.iter().any(|seen| seen == key) || chain.len() >= MAX_EXPANSION_DEPTH {
            let mut cycle = chain.clone();
            cycle.push(key.to_string());
            return Err(Error::CyclicReference {
                key: chain.first().map_or(key, String::as_str).to_string(),
                chain: cycle,
            });
        }

        chain.push(key.to_string());
        let value = self.expand(raw, chain);
        chain.pop();
        value
    }
}

fn check_conflicts(parameters: &BTreeMap<String, String>, key: &str) -> Result<()> {
    if let Some(existing) = branch::key_prefixes(key)
        .into_iter()
        .find(|prefix| parameters.contains_key(*prefix))
    {
        return Err(Error::KeyConflict {
            key: key.to_string(),
            existing: existing.to_string(),
        });
    }

    let nested = format!("{key}{}", branch::KEY_SEPARATOR);
    if let Some(existing) = parameters
        .range(nested.clone()..)
        .map(|(existing, _)| existing)
        .take_while(|existing| existing.starts_with(&nested))
        .next()
    {
        return Err(Error::KeyConflict {
            key: key.to_string(),
            existing: existing.clone(),
        });
    }

    Ok(())
}
