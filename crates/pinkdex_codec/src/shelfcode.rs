//! Shelfcode registry and the grammar compiled from it.
//!
//! A shelfcode is either *atomic* (a fixed token such as `P` or `C/P`) or a
//! *double code*: a prefix followed by a free-form qualifier, as in `D400`
//! where `D` is the code and `400` the qualifier. Which codes exist is not
//! known to this crate; it is supplied by a [`ShelfcodeRegistry`] and
//! compiled into a [`ShelfcodeGrammar`] that every parse call receives
//! explicitly.

use crate::error::{CodecError, CodecResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Source of the set of valid shelfcodes.
///
/// Implementations may be backed by a database table, a config file, or a
/// fixed list. Order is irrelevant; the grammar imposes its own matching
/// order.
pub trait ShelfcodeRegistry {
    /// Codes that stand alone (`P`, `C/P`, ...).
    fn atomic_codes(&self) -> Vec<String>;

    /// Codes that are followed by a qualifier (`D` in `D400`).
    fn double_codes(&self) -> Vec<String>;
}

/// An in-memory registry, deserializable from JSON.
///
/// ```json
/// { "atomic": ["P", "H", "C/P"], "double": ["D"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticRegistry {
    /// Atomic shelfcodes.
    #[serde(default)]
    pub atomic: Vec<String>,
    /// Double-code prefixes.
    #[serde(default)]
    pub double: Vec<String>,
}

impl StaticRegistry {
    /// Creates a registry from the two code sets.
    pub fn new<A, D>(atomic: A, double: D) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            atomic: atomic.into_iter().map(Into::into).collect(),
            double: double.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for StaticRegistry {
    fn default() -> Self {
        Self::new(
            [
                "P", "PA", "PB", "H", "HA", "HB", "L", "LA", "C", "C/P", "C/H", "C/L", "S", "R",
                "VL",
            ],
            ["D", "DP"],
        )
    }
}

impl ShelfcodeRegistry for StaticRegistry {
    fn atomic_codes(&self) -> Vec<String> {
        self.atomic.clone()
    }

    fn double_codes(&self) -> Vec<String> {
        self.double.clone()
    }
}

/// Result of classifying a shelfcode token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Whether the token carried the `@` series-visibility marker.
    pub series_visible: bool,
    /// The shelfcode proper (the double-code prefix for double codes).
    pub shelfcode: String,
    /// The free-form qualifier of a double code.
    pub qualifier: Option<String>,
}

/// Compiled shelfcode matcher.
///
/// A token that is exactly a double-code prefix is taken bare. Otherwise
/// double-code prefixes are tried with a qualifier, longest first, so a
/// short prefix never swallows the head of a longer one: with `D` and `DP`
/// registered, `DP` is bare `DP` and `DP12` is `DP` qualified by `12`.
/// Atomic codes are tried last.
#[derive(Debug, Clone)]
pub struct ShelfcodeGrammar {
    matcher: Regex,
    atomic: Vec<String>,
    double: Vec<String>,
}

impl ShelfcodeGrammar {
    /// Compiles a grammar from a registry.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrammar` if the registry is empty or contains an
    /// empty code.
    pub fn from_registry(registry: &dyn ShelfcodeRegistry) -> CodecResult<Self> {
        let atomic = longest_first(registry.atomic_codes())?;
        let double = longest_first(registry.double_codes())?;

        if atomic.is_empty() && double.is_empty() {
            return Err(CodecError::invalid_grammar("registry has no shelfcodes"));
        }

        let alternation = |codes: &[String]| {
            codes
                .iter()
                .map(|c| regex::escape(c))
                .collect::<Vec<_>>()
                .join("|")
        };
        let mut branches = Vec::new();
        if !double.is_empty() {
            branches.push(format!("(?P<bare>{})", alternation(&double)));
            branches.push(format!("(?P<double>{})(?P<qualifier>.+)", alternation(&double)));
        }
        if !atomic.is_empty() {
            branches.push(format!("(?P<atomic>{})", alternation(&atomic)));
        }
        let pattern = format!("^(?P<visible>@)?(?:{})$", branches.join("|"));
        let matcher = Regex::new(&pattern).map_err(|e| CodecError::invalid_grammar(e.to_string()))?;

        Ok(Self {
            matcher,
            atomic,
            double,
        })
    }

    /// Classifies a token of the form `["@"] SHELFCODE [QUALIFIER]`.
    ///
    /// The token must already be stripped of any `:COUNT` suffix.
    ///
    /// # Errors
    ///
    /// Returns `InvalidShelfcode` if the token matches no registered code.
    pub fn classify(&self, token: &str) -> CodecResult<Classified> {
        let caps = self
            .matcher
            .captures(token)
            .ok_or_else(|| CodecError::invalid_shelfcode(token))?;

        let series_visible = caps.name("visible").is_some();
        let (shelfcode, qualifier) =
            if let (Some(code), Some(qual)) = (caps.name("double"), caps.name("qualifier")) {
                (code.as_str(), Some(qual.as_str().to_string()))
            } else if let Some(code) = caps.name("atomic").or_else(|| caps.name("bare")) {
                (code.as_str(), None)
            } else {
                return Err(CodecError::invalid_shelfcode(token));
            };

        Ok(Classified {
            series_visible,
            shelfcode: shelfcode.to_string(),
            qualifier,
        })
    }

    /// Returns true if `code` is a registered double-code prefix.
    #[must_use]
    pub fn is_double(&self, code: &str) -> bool {
        self.double.iter().any(|c| c == code)
    }

    /// Returns true if `code` is registered in either set.
    #[must_use]
    pub fn is_known(&self, code: &str) -> bool {
        self.is_double(code) || self.atomic.iter().any(|c| c == code)
    }

    /// Atomic codes in matching order.
    #[must_use]
    pub fn atomic_codes(&self) -> &[String] {
        &self.atomic
    }

    /// Double-code prefixes in matching order.
    #[must_use]
    pub fn double_codes(&self) -> &[String] {
        &self.double
    }
}

fn longest_first(codes: Vec<String>) -> CodecResult<Vec<String>> {
    let mut codes: Vec<String> = codes
        .into_iter()
        .map(|c| c.trim().to_uppercase())
        .collect();
    if codes.iter().any(String::is_empty) {
        return Err(CodecError::invalid_grammar("empty shelfcode in registry"));
    }
    let mut seen = HashSet::new();
    codes.retain(|c| seen.insert(c.clone()));
    // stable sort keeps registry order among equal lengths
    codes.sort_by(|a, b| b.len().cmp(&a.len()));
    Ok(codes)
}
