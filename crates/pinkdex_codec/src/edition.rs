//! Per-shelfcode copy counts.
//!
//! An [`Edition`] records how many copies of a title sit under one
//! shelfcode. [`Editions`] is the keyed multiset of those records carried by
//! every catalog line, with closed arithmetic used to reconcile holdings:
//!
//! ```text
//! C/P:2,L,@D400:2
//! ```

use crate::error::{CodecError, CodecResult};
use crate::shelfcode::ShelfcodeGrammar;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Largest copy count accepted from catalog text, in either direction.
///
/// Keeping parsed counts within `i32` leaves the `i64` arithmetic below
/// far from overflow however many lines are merged.
pub const MAX_COUNT: i64 = i32::MAX as i64;

/// One shelfcode's inventory record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edition {
    /// The shelfcode (the prefix, for double codes).
    pub shelfcode: String,
    /// Free-form qualifier following a double code.
    pub qualifier: Option<String>,
    /// Number of copies. Negative only as a pending delta.
    pub count: i64,
    /// Whether series information belongs on the spine.
    pub series_visible: bool,
}

impl Edition {
    /// Creates an edition with no qualifier and no series visibility.
    pub fn new(shelfcode: impl Into<String>, count: i64) -> Self {
        Self {
            shelfcode: shelfcode.into(),
            qualifier: None,
            count,
            series_visible: false,
        }
    }

    /// Parses an edition token `["@"] SHELFCODE [QUALIFIER] [":" COUNT]`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCount` for a non-integer count suffix or one beyond
    /// [`MAX_COUNT`], and `InvalidShelfcode` if the code is not in the
    /// grammar.
    pub fn parse(token: &str, grammar: &ShelfcodeGrammar) -> CodecResult<Self> {
        let token = token.trim().to_uppercase();

        let (code, count) = match token.rsplit_once(':') {
            Some((code, count)) => {
                let count = count
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|n| n.unsigned_abs() <= MAX_COUNT.unsigned_abs())
                    .ok_or_else(|| CodecError::invalid_count(token.as_str()))?;
                (code.trim(), count)
            }
            None => (token.as_str(), 1),
        };

        let classified = grammar.classify(code)?;
        Ok(Self {
            shelfcode: classified.shelfcode,
            qualifier: classified.qualifier,
            count,
            series_visible: classified.series_visible,
        })
    }

    /// Returns the copy count.
    #[must_use]
    pub const fn to_int(&self) -> i64 {
        self.count
    }

    /// Returns the same edition with the count negated.
    ///
    /// Saturates: `i64::MIN` negates to `i64::MAX`.
    #[must_use]
    pub fn negated(&self) -> Self {
        Self {
            count: self.count.saturating_neg(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.series_visible {
            f.write_str("@")?;
        }
        f.write_str(&self.shelfcode)?;
        if let Some(qualifier) = &self.qualifier {
            f.write_str(qualifier)?;
        }
        if self.count != 1 {
            write!(f, ":{}", self.count)?;
        }
        Ok(())
    }
}

/// Copy counts for one title, keyed by shelfcode.
///
/// Double codes are keyed by their prefix, so `D400` and `D300` combine
/// into a single `D` entry under arithmetic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Editions {
    entries: BTreeMap<String, Edition>,
}

impl Editions {
    /// Creates an empty set of editions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list of edition tokens.
    ///
    /// Input is uppercased and trimmed; an empty string yields an empty
    /// set. A later token for the same shelfcode replaces an earlier one.
    ///
    /// # Errors
    ///
    /// Propagates the first [`Edition::parse`] failure.
    pub fn parse(s: &str, grammar: &ShelfcodeGrammar) -> CodecResult<Self> {
        let s = s.trim().to_uppercase();
        let mut editions = Self::new();
        if s.is_empty() {
            return Ok(editions);
        }
        for token in s.split(',') {
            editions.insert(Edition::parse(token, grammar)?);
        }
        Ok(editions)
    }

    /// Builds editions from bare `(shelfcode, count)` pairs.
    ///
    /// Lossy: qualifiers and series visibility cannot be expressed.
    pub fn parse_counts<I, K>(counts: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<String>,
    {
        let mut editions = Self::new();
        for (code, count) in counts {
            editions.insert(Edition::new(code, count));
        }
        editions
    }

    /// Inserts an edition, replacing any with the same shelfcode.
    pub fn insert(&mut self, edition: Edition) -> Option<Edition> {
        self.entries.insert(edition.shelfcode.clone(), edition)
    }

    /// Removes the edition for a shelfcode.
    pub fn remove(&mut self, shelfcode: &str) -> Option<Edition> {
        self.entries.remove(shelfcode)
    }

    /// Looks up the edition for a shelfcode.
    #[must_use]
    pub fn get(&self, shelfcode: &str) -> Option<&Edition> {
        self.entries.get(shelfcode)
    }

    /// Returns true if an edition exists for the shelfcode.
    #[must_use]
    pub fn contains(&self, shelfcode: &str) -> bool {
        self.entries.contains_key(shelfcode)
    }

    /// Number of shelfcodes with an entry, whatever their counts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates editions in shelfcode order.
    pub fn iter(&self) -> impl Iterator<Item = &Edition> {
        self.entries.values()
    }

    /// Iterates the shelfcodes present, in order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Keeps only the editions matching the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&Edition) -> bool) {
        self.entries.retain(|_, e| keep(e));
    }

    /// Signed sum of all counts, saturating at the `i64` bounds.
    #[must_use]
    pub fn total(&self) -> i64 {
        self.entries
            .values()
            .fold(0_i64, |sum, e| sum.saturating_add(e.count))
    }

    /// True if the sum of absolute counts is positive.
    ///
    /// This is not the same as the map being non-empty: a set whose only
    /// entries have count zero is empty here.
    #[must_use]
    pub fn is_nonempty(&self) -> bool {
        // a sum of absolute values is positive iff some term is nonzero
        self.entries.values().any(|e| e.count != 0)
    }

    /// True if any edition has a positive count.
    #[must_use]
    pub fn has_additions(&self) -> bool {
        self.entries.values().any(|e| e.count > 0)
    }

    /// True if any edition has a negative count.
    #[must_use]
    pub fn has_removals(&self) -> bool {
        self.entries.values().any(|e| e.count < 0)
    }

    fn combine(&self, other: &Self, sign: i64) -> Self {
        let mut result = self.clone();
        for (code, edition) in &other.entries {
            let delta = edition.count.saturating_mul(sign);
            match result.entries.get_mut(code) {
                Some(existing) => {
                    existing.count = existing.count.saturating_add(delta);
                    if existing.qualifier.is_none() {
                        existing.qualifier.clone_from(&edition.qualifier);
                    }
                }
                None => {
                    result.entries.insert(
                        code.clone(),
                        Edition {
                            count: delta,
                            ..edition.clone()
                        },
                    );
                }
            }
        }
        result.entries.retain(|_, e| e.count > 0);
        result
    }
}

impl Add for &Editions {
    type Output = Editions;

    /// Sums counts per shelfcode, dropping entries at or below zero.
    ///
    /// Counts saturate rather than wrap.
    fn add(self, other: &Editions) -> Editions {
        self.combine(other, 1)
    }
}

impl Sub for &Editions {
    type Output = Editions;

    /// Subtracts counts per shelfcode, dropping entries at or below zero.
    fn sub(self, other: &Editions) -> Editions {
        self.combine(other, -1)
    }
}

impl Neg for &Editions {
    type Output = Editions;

    fn neg(self) -> Editions {
        Editions {
            entries: self
                .entries
                .iter()
                .map(|(code, e)| (code.clone(), e.negated()))
                .collect(),
        }
    }
}

impl fmt::Display for Editions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, edition) in self.entries.values().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{edition}")?;
        }
        Ok(())
    }
}

impl FromIterator<Edition> for Editions {
    fn from_iter<I: IntoIterator<Item = Edition>>(iter: I) -> Self {
        let mut editions = Self::new();
        for edition in iter {
            editions.insert(edition);
        }
        editions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shelfcode::StaticRegistry;

    fn grammar() -> ShelfcodeGrammar {
        ShelfcodeGrammar::from_registry(&StaticRegistry::new(
            ["C/P", "L", "P", "PA", "H"],
            ["D"],
        ))
        .unwrap()
    }

    #[test]
    fn parse_visible_double_code() {
        let e = Edition::parse("@D400", &grammar()).unwrap();
        assert_eq!(e.count, 1);
        assert_eq!(e.shelfcode, "D");
        assert!(e.series_visible);
        assert_eq!(e.qualifier.as_deref(), Some("400"));
        assert_eq!(e.to_string(), "@D400");
    }

    #[test]
    fn parse_count_suffix() {
        let e = Edition::parse("c/p:3", &grammar()).unwrap();
        assert_eq!(e.shelfcode, "C/P");
        assert_eq!(e.to_int(), 3);
        assert_eq!(e.to_string(), "C/P:3");
    }

    #[test]
    fn parse_negative_count() {
        let e = Edition::parse("P:-1", &grammar()).unwrap();
        assert_eq!(e.count, -1);
        assert_eq!(e.to_string(), "P:-1");
    }

    #[test]
    fn parse_bad_count() {
        let err = Edition::parse("P:x", &grammar()).unwrap_err();
        assert!(matches!(err, CodecError::InvalidCount { .. }));
    }

    #[test]
    fn parse_unknown_shelfcode() {
        let err = Edition::parse("FOOBAR", &grammar()).unwrap_err();
        assert_eq!(err, CodecError::invalid_shelfcode("FOOBAR"));
    }

    #[test]
    fn parse_matches_parse_counts() {
        let parsed = Editions::parse("C/P:2,L", &grammar()).unwrap();
        let counted = Editions::parse_counts([("C/P", 2), ("L", 1)]);
        assert_eq!(parsed.to_string(), counted.to_string());
        assert_eq!(parsed.to_string(), "C/P:2,L");
    }

    #[test]
    fn parse_empty() {
        let e = Editions::parse("  ", &grammar()).unwrap();
        assert!(!e.is_nonempty());
        assert_eq!(e.to_string(), "");
    }

    #[test]
    fn format_is_sorted() {
        let e = Editions::parse("P,L:2,C/P", &grammar()).unwrap();
        assert_eq!(e.to_string(), "C/P,L:2,P");
    }

    #[test]
    fn add_combines_double_codes() {
        let g = grammar();
        let a = Editions::parse("C/P:2,L,D400:2", &g).unwrap();
        let b = Editions::parse("L,D300,PA:2", &g).unwrap();
        let sum = &a + &b;

        assert_eq!(sum.get("L").unwrap().count, 2);
        assert_eq!(sum.get("D").unwrap().count, 3);
        assert_eq!(sum.get("D").unwrap().qualifier.as_deref(), Some("400"));
        assert_eq!(sum.total(), 9);
    }

    #[test]
    fn add_does_not_mutate() {
        let g = grammar();
        let a = Editions::parse("P", &g).unwrap();
        let b = Editions::parse("P", &g).unwrap();
        let _ = &a + &b;
        assert_eq!(a.total(), 1);
    }

    #[test]
    fn sub_drops_exhausted_entries() {
        let g = grammar();
        let a = Editions::parse("P:2,H", &g).unwrap();
        let b = Editions::parse("H,L", &g).unwrap();
        let diff = &a - &b;
        assert_eq!(diff.to_string(), "P:2");
    }

    #[test]
    fn neg_keeps_entries() {
        let g = grammar();
        let a = Editions::parse("P:2,H", &g).unwrap();
        assert_eq!((-&a).to_string(), "H:-1,P:-2");
        assert_eq!((-&a).total(), -3);
    }

    #[test]
    fn full_cancellation() {
        let g = grammar();
        let x = Editions::parse("P:2,H,D7", &g).unwrap();
        assert!(!(&x + &(-&x)).is_nonempty());
    }

    #[test]
    fn is_nonempty_uses_absolute_sum() {
        let mut zeroed = Editions::new();
        zeroed.insert(Edition::new("P", 0));
        zeroed.insert(Edition::new("H", 0));
        assert_eq!(zeroed.iter().count(), 2);
        assert!(!zeroed.is_nonempty());

        let mut mixed = Editions::new();
        mixed.insert(Edition::new("P", 1));
        mixed.insert(Edition::new("H", -1));
        assert_eq!(mixed.total(), 0);
        assert!(mixed.is_nonempty());
        assert!(mixed.has_additions());
        assert!(mixed.has_removals());
    }

    #[test]
    fn parse_rejects_counts_beyond_bound() {
        let g = grammar();
        let max = Edition::parse(&format!("P:{MAX_COUNT}"), &g).unwrap();
        assert_eq!(max.count, MAX_COUNT);
        let min = Edition::parse(&format!("P:-{MAX_COUNT}"), &g).unwrap();
        assert_eq!(min.count, -MAX_COUNT);

        for token in ["P:2147483648", "P:-2147483648", "P:9223372036854775807"] {
            let err = Edition::parse(token, &g).unwrap_err();
            assert!(matches!(err, CodecError::InvalidCount { .. }), "{token}");
        }
    }

    #[test]
    fn arithmetic_saturates_near_i64_bounds() {
        let huge = Editions::parse_counts([("P", i64::MAX), ("H", i64::MAX)]);
        let one = Editions::parse_counts([("P", 1)]);

        let sum = &huge + &one;
        assert_eq!(sum.get("P").unwrap().count, i64::MAX);
        assert_eq!(sum.total(), i64::MAX);
        assert!(sum.is_nonempty());

        let lowest = Editions::parse_counts([("P", i64::MIN)]);
        assert_eq!((-&lowest).get("P").unwrap().count, i64::MAX);
        assert_eq!((&one - &lowest).get("P").unwrap().count, i64::MAX);
        assert_eq!((-&huge).total(), i64::MIN);
    }
}
