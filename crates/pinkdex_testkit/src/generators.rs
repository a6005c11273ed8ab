//! Property-based test generators using proptest.
//!
//! Provides strategies for generating catalog data that is valid under
//! the [`sample_grammar`](crate::fixtures::sample_grammar): elements never
//! contain separators, never start with a sort-by marker, and carry no
//! surrounding whitespace.

use pinkdex_codec::{DexLine, Edition, Editions};
use proptest::prelude::*;

/// Atomic codes of the sample registry.
const ATOMIC: &[&str] = &[
    "P", "PA", "PB", "H", "HA", "HB", "L", "LA", "C", "C/P", "C/H", "C/L", "S", "R", "VL",
];

/// Double-code prefixes of the sample registry.
const DOUBLE: &[&str] = &["D", "DP"];

/// Strategy for one name-like list element, optionally with a sort-by half.
pub fn element_strategy() -> impl Strategy<Value = String> {
    let name = || prop::string::string_regex("[A-Z][A-Z .,']{0,10}[A-Z]").expect("Invalid regex");
    (name(), prop::option::weighted(0.2, name())).prop_map(|(display, sortby)| match sortby {
        Some(sortby) => format!("{display}={sortby}"),
        None => display,
    })
}

/// Strategy for a series element, optionally numbered and series-visible.
pub fn series_strategy() -> impl Strategy<Value = String> {
    (
        any::<bool>(),
        prop::string::string_regex("[A-Z][A-Z ]{0,10}[A-Z]").expect("Invalid regex"),
        prop::option::of(1u32..200),
    )
        .prop_map(|(visible, name, index)| {
            let marker = if visible { "@" } else { "" };
            match index {
                Some(index) => format!("{marker}{name} #{index}"),
                None => format!("{marker}{name}"),
            }
        })
}

/// Strategy for one edition with the given count range.
pub fn edition_strategy(counts: std::ops::RangeInclusive<i64>) -> impl Strategy<Value = Edition> {
    let atomic = (prop::sample::select(ATOMIC), counts.clone())
        .prop_map(|(code, count)| Edition::new(code, count));
    let double = (
        prop::sample::select(DOUBLE),
        prop::string::string_regex("[0-9]{1,3}").expect("Invalid regex"),
        counts,
    )
        .prop_map(|(code, qualifier, count)| Edition {
            qualifier: Some(qualifier),
            ..Edition::new(code, count)
        });
    (prop_oneof![4 => atomic, 1 => double], any::<bool>()).prop_map(|(edition, visible)| {
        Edition {
            series_visible: visible,
            ..edition
        }
    })
}

/// Strategy for an edition set with counts in `-3..=5`.
pub fn editions_strategy() -> impl Strategy<Value = Editions> {
    prop::collection::vec(edition_strategy(-3..=5), 0..5).prop_map(Editions::from_iter)
}

/// Strategy for an edition set holding only positive counts.
pub fn holdings_strategy() -> impl Strategy<Value = Editions> {
    prop::collection::vec(edition_strategy(1..=5), 1..5).prop_map(Editions::from_iter)
}

/// Strategy for a line with the given codes strategy.
pub fn line_with_codes(
    codes: impl Strategy<Value = Editions>,
) -> impl Strategy<Value = DexLine> {
    (
        prop::collection::vec(element_strategy(), 1..4),
        prop::collection::vec(element_strategy(), 1..3),
        prop::collection::vec(series_strategy(), 0..3),
        codes,
    )
        .prop_map(|(authors, titles, series, codes)| DexLine::new(authors, titles, series, codes))
}

/// Strategy for an arbitrary valid line.
pub fn line_strategy() -> impl Strategy<Value = DexLine> {
    line_with_codes(editions_strategy())
}

/// Strategy for strings the sort key normalizer is idempotent on: words
/// joined by separator runs, with an optional trailing number.
pub fn sortable_text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z]{1,8}([ ,:/-]{1,2}[A-Za-z]{1,8}){0,3}( [0-9]{1,6})?")
        .expect("Invalid regex")
}

/// One step of a random mutation sequence against a collection.
#[derive(Debug, Clone)]
pub enum DexOperation {
    /// Add a line (merging if its key exists).
    Add(DexLine),
    /// Remove the line with this key.
    Remove(DexLine),
}

/// Strategy for mutation sequences over a small key space, so adds merge
/// and removes hit.
pub fn dex_operations_strategy(len: usize) -> impl Strategy<Value = Vec<DexOperation>> {
    let author = prop::sample::select(&["A", "B", "C"][..]);
    let title = prop::sample::select(&["X", "Y"][..]);
    let line = (author, title, prop::collection::vec(series_strategy(), 0..2), editions_strategy())
        .prop_map(|(author, title, series, codes)| {
            DexLine::new(vec![author.to_string()], vec![title.to_string()], series, codes)
        })
        .boxed();
    let op = prop_oneof![
        3 => line.clone().prop_map(DexOperation::Add),
        1 => line.prop_map(DexOperation::Remove),
    ];
    prop::collection::vec(op, 0..len)
}

/// Configuration for property-based tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
