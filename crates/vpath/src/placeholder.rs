// Copyright (c) Contributors to the vpath project.
// SPDX-License-Identifier: Apache-2.0

//! Placeholder grammar for parameter values.
//!
//! A template is literal text interleaved with placeholders of the form
//! `(:<reference>:)` or `(:<reference>:<transforms>:)`. The reference is a
//! keyword name, or `%` followed by a parameter key. Transforms are single
//! letters applied left to right to the referenced value.

use crate::Error;

#[cfg(test)]
#[path = "./placeholder_test.rs"]
mod placeholder_test;

/// Opening delimiter of a placeholder.
pub const OPEN: &str = "(:";

/// Closing delimiter of a placeholder.
pub const CLOSE: &str = ":)";

/// Piece of a tokenized template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Literal(&'a str),
    Placeholder(Placeholder<'a>),
}

/// What a placeholder refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a> {
    /// `name`: a keyword, falling back to a parameter of that name.
    Keyword(&'a str),
    /// `%key`: a parameter, falling back to a keyword of that name.
    Parameter(&'a str),
}

impl<'a> Reference<'a> {
    pub fn name(&self) -> &'a str {
        match *self {
            Self::Keyword(name) | Self::Parameter(name) => name,
        }
    }
}

/// A parsed `(: ... :)` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Full placeholder text including delimiters.
    pub source: &'a str,
    pub reference: Reference<'a>,
    pub transforms: Vec<Transform>,
}

impl Placeholder<'_> {
    /// Apply every transform in order to a resolved value.
    pub fn apply(&self, value: String) -> String {
        self.transforms
            .iter()
            .fold(value, |value, transform| transform.apply(&value))
    }
}

/// Post-processing applied to a resolved placeholder value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// `h`: parent directory (drop the last path segment).
    Head,
    /// `t`: last path segment.
    Tail,
    /// `r`: drop the extension of the last path segment.
    Root,
    /// `e`: extension of the last path segment.
    Extension,
    /// `l`: lowercase.
    Lower,
    /// `u`: uppercase.
    Upper,
    /// `U`: uppercase the first character.
    UpperFirst,
}

impl Transform {
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'h' => Some(Self::Head),
            't' => Some(Self::Tail),
            'r' => Some(Self::Root),
            'e' => Some(Self::Extension),
            'l' => Some(Self::Lower),
            'u' => Some(Self::Upper),
            'U' => Some(Self::UpperFirst),
            _ => None,
        }
    }

    pub fn apply(&self, value: &str) -> String {
        match self {
            Self::Head => head(value),
            Self::Tail => tail(value).to_string(),
            Self::Root => {
                let (stem, _) = split_extension(value);
                stem.to_string()
            }
            Self::Extension => split_extension(value).1.unwrap_or_default().to_string(),
            Self::Lower => value.to_lowercase(),
            Self::Upper => value.to_uppercase(),
            Self::UpperFirst => {
                let mut chars = value.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }
}

/// Split a template into literal text and placeholders.
///
/// Placeholders are matched non-greedily: each one ends at the first `:)`
/// following its `(:`.
pub fn tokenize(template: &str) -> crate::Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        if start > 0 {
            tokens.push(Token::Literal(&rest[..start]));
        }

        let body = &rest[start + OPEN.len()..];
        let end = body.find(CLOSE).ok_or_else(|| Error::MalformedPlaceholder {
            template: template.to_string(),
            reason: format!("unterminated placeholder starting at {:?}", &rest[start..]),
        })?;

        let source = &rest[start..start + OPEN.len() + end + CLOSE.len()];
        tokens.push(Token::Placeholder(parse_placeholder(
            template,
            source,
            &body[..end],
        )?));
        rest = &body[end + CLOSE.len()..];
    }

    if !rest.is_empty() {
        tokens.push(Token::Literal(rest));
    }

    Ok(tokens)
}

fn parse_placeholder<'a>(
    template: &str,
    source: &'a str,
    expression: &'a str,
) -> crate::Result<Placeholder<'a>> {
    let (name, letters) = match expression.split_once(':') {
        Some((name, letters)) => (name, letters),
        None => (expression, ""),
    };

    let reference = match name.strip_prefix('%') {
        Some(key) => Reference::Parameter(key),
        None => Reference::Keyword(name),
    };
    if reference.name().is_empty() {
        return Err(Error::MalformedPlaceholder {
            template: template.to_string(),
            reason: format!("empty reference in {source:?}"),
        });
    }

    let transforms = letters
        .chars()
        .map(|letter| {
            Transform::from_letter(letter).ok_or_else(|| Error::UnknownTransform {
                transform: letter,
                placeholder: source.to_string(),
            })
        })
        .collect::<crate::Result<Vec<_>>>()?;

    Ok(Placeholder {
        source,
        reference,
        transforms,
    })
}

/// Parent directory of a `/` separated path, following `dirname` rules.
fn head(value: &str) -> String {
    let trimmed = value.trim_end_matches('/');
    if trimmed.is_empty() {
        return if value.starts_with('/') { "/" } else { "." }.to_string();
    }

    match trimmed.rfind('/') {
        None => ".".to_string(),
        Some(index) => {
            let parent = trimmed[..index].trim_end_matches('/');
            if parent.is_empty() {
                "/".to_string()
            } else {
                parent.to_string()
            }
        }
    }
}

fn tail(value: &str) -> &str {
    let trimmed = value.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(index) => &trimmed[index + 1..],
        None => trimmed,
    }
}

/// Split off the extension of the last segment. A leading dot (hidden file)
/// is not an extension.
fn split_extension(value: &str) -> (&str, Option<&str>) {
    let segment_start = value.rfind('/').map_or(0, |index| index + 1);
    match value[segment_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let dot = segment_start + dot;
            (&value[..dot], Some(&value[dot + 1..]))
        }
        _ => (value, None),
    }
}
