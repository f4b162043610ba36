// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Reach lists: the ordered physical path templates of a component.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::Parameters;

#[cfg(test)]
#[path = "./reach_test.rs"]
mod reach_test;

/// Separator between alternatives in the textual form of a reach.
pub const REACH_SEPARATOR: char = ';';

/// Marks an alternative that discards the prefix accumulated from ancestors.
pub const RESET_MARKER: char = '\r';

/// One alternative of a reach list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReachEntry {
    /// Appended to every candidate built from the ancestors.
    Relative(String),
    /// Replaces the candidates built from the ancestors.
    Reset(String),
}

impl ReachEntry {
    /// Parse a single alternative. Text after the last reset marker is kept.
    pub fn parse(text: &str) -> Self {
        match text.rfind(RESET_MARKER) {
            Some(index) => Self::Reset(text[index + RESET_MARKER.len_utf8()..].to_string()),
            None => Self::Relative(text.to_string()),
        }
    }

    pub fn template(&self) -> &str {
        match self {
            Self::Relative(template) | Self::Reset(template) => template,
        }
    }

    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset(_))
    }
}

impl fmt::Display for ReachEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relative(template) => f.write_str(template),
            Self::Reset(template) => write!(f, "{RESET_MARKER}{template}"),
        }
    }
}

/// Ordered fallback alternatives of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reach {
    entries: Vec<ReachEntry>,
}

impl Reach {
    pub fn new(entries: Vec<ReachEntry>) -> Self {
        Self { entries }
    }

    /// Split the `;` separated textual form.
    pub fn parse(text: &str) -> Self {
        Self::new(text.split(REACH_SEPARATOR).map(ReachEntry::parse).collect())
    }

    pub fn entries(&self) -> &[ReachEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Format every template against `parameters`.
    pub fn format(&self, parameters: &Parameters) -> crate::Result<Vec<ReachEntry>> {
        self.entries
            .iter()
            .map(|entry| -> crate::Result<ReachEntry> {
                let formatted = parameters.format(entry.template())?;
                Ok(match entry {
                    ReachEntry::Relative(_) => ReachEntry::Relative(formatted),
                    ReachEntry::Reset(_) => ReachEntry::Reset(formatted),
                })
            })
            .collect()
    }

    /// Combine the candidates accumulated from the ancestors with this reach.
    ///
    /// `None` means no ancestor contributed yet: the alternatives themselves
    /// become the candidates. Otherwise every alternative is combined with
    /// every accumulated candidate, alternatives varying slowest. An empty
    /// reach leaves the accumulator untouched.
    pub fn extend(
        &self,
        accumulator: Option<Vec<String>>,
        parameters: &Parameters,
    ) -> crate::Result<Option<Vec<String>>> {
        if self.is_empty() {
            return Ok(accumulator);
        }

        let alternatives = self.format(parameters)?;
        let Some(accumulated) = accumulator else {
            return Ok(Some(
                alternatives
                    .into_iter()
                    .map(|entry| entry.template().to_string())
                    .collect(),
            ));
        };

        let mut candidates = Vec::with_capacity(accumulated.len() * alternatives.len());
        for alternative in &alternatives {
            for prefix in &accumulated {
                candidates.push(match alternative {
                    ReachEntry::Relative(template) => format!("{prefix}{template}"),
                    ReachEntry::Reset(template) => template.clone(),
                });
            }
        }
        Ok(Some(candidates))
    }
}

impl FromStr for Reach {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Reach {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<Vec<ReachEntry>> for Reach {
    fn from(entries: Vec<ReachEntry>) -> Self {
        Self::new(entries)
    }
}

impl fmt::Display for Reach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, entry) in self.entries.iter().enumerate() {
            if index > 0 {
                write!(f, "{REACH_SEPARATOR}")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}
