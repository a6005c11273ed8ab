//! Catalog lines.
//!
//! A catalog line describes one title and every copy of it:
//!
//! ```text
//! AUTHORS<TITLES<SERIES<CODES
//! ```
//!
//! `AUTHORS`, `TITLES` and `SERIES` are `|`-separated lists whose elements
//! may be `DISPLAY=SORTBY` pairs. A series element may lead with `@` to
//! mark it visible on the spine and may end with an index such as ` #3`.
//! `CODES` is an [`Editions`] list.

use crate::edition::{Edition, Editions};
use crate::error::{CodecError, CodecResult};
use crate::shelfcode::ShelfcodeGrammar;
use crate::sortkey::{sanitize, sortby_text};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

/// Separates the four fields of a line.
pub const FIELD_SEPARATOR: char = '<';
/// Separates the elements of a list field.
pub const LIST_SEPARATOR: char = '|';
/// Marks a series as visible on the spine.
pub const SERIES_VISIBLE_MARKER: char = '@';

static SERIES_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" #?[-.,0-9]+B?$").unwrap());

/// Identity of a catalog line: its authors and titles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineKey {
    /// Ordered authors.
    pub authors: Vec<String>,
    /// Ordered titles.
    pub titles: Vec<String>,
}

/// Catalog ordering key: placeauthor, placetitle, authortext, placetitle,
/// titletext.
///
/// `placetitle` appears twice; output order depends on it.
pub type SortKey = (String, String, String, String, String);

/// Physical shelf ordering key.
///
/// Only meaningful for comparison; never displayed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShelfKey(pub Vec<String>);

impl ShelfKey {
    /// Key components in comparison order.
    #[must_use]
    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

/// One catalog entry.
///
/// Equality, hashing and ordering consider only the [`LineKey`]; series
/// and codes are payload that may change while the line keeps its
/// identity.
#[derive(Debug, Clone, Default)]
pub struct DexLine {
    authors: Vec<String>,
    titles: Vec<String>,
    series: Vec<String>,
    codes: Editions,
}

impl DexLine {
    /// Creates a line from its parts.
    pub fn new(
        authors: Vec<String>,
        titles: Vec<String>,
        series: Vec<String>,
        codes: Editions,
    ) -> Self {
        Self {
            authors,
            titles,
            series,
            codes,
        }
    }

    /// Parses one catalog line.
    ///
    /// A trailing newline and surrounding whitespace are ignored.
    ///
    /// # Errors
    ///
    /// Returns `MalformedLine` unless there are exactly four fields and
    /// every list element has at most one `=`; propagates edition errors.
    pub fn parse(line: &str, grammar: &ShelfcodeGrammar) -> CodecResult<Self> {
        let line = line.trim();
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        let [authors, titles, series, codes] = fields.as_slice() else {
            return Err(CodecError::malformed_line(format!(
                "expected 4 fields, found {}: {line:?}",
                fields.len()
            )));
        };

        Ok(Self {
            authors: split_list(authors)?,
            titles: split_list(titles)?,
            series: split_list(series)?,
            codes: Editions::parse(codes, grammar)?,
        })
    }

    /// Ordered authors.
    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Ordered titles.
    #[must_use]
    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    /// Ordered series designators.
    #[must_use]
    pub fn series(&self) -> &[String] {
        &self.series
    }

    /// Copy counts.
    #[must_use]
    pub fn codes(&self) -> &Editions {
        &self.codes
    }

    /// Mutable copy counts.
    pub fn codes_mut(&mut self) -> &mut Editions {
        &mut self.codes
    }

    /// Replaces the series list.
    pub fn set_series(&mut self, series: Vec<String>) {
        self.series = series;
    }

    /// Replaces the copy counts.
    pub fn set_codes(&mut self, codes: Editions) {
        self.codes = codes;
    }

    /// The line's identity.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            authors: self.authors.clone(),
            titles: self.titles.clone(),
        }
    }

    /// Copy with every count negated.
    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            codes: -&self.codes,
            ..self.clone()
        }
    }

    /// Sanitized first author, preferring its sort-by half.
    #[must_use]
    pub fn placeauthor(&self) -> String {
        self.authors
            .first()
            .map(|a| sanitize(sortby_text(a)))
            .unwrap_or_default()
    }

    /// Sanitized first title, preferring its sort-by half.
    #[must_use]
    pub fn placetitle(&self) -> String {
        self.titles
            .first()
            .map(|t| sanitize(sortby_text(t)))
            .unwrap_or_default()
    }

    /// The authors field as written.
    #[must_use]
    pub fn authortext(&self) -> String {
        join_list(&self.authors)
    }

    /// The titles field as written.
    #[must_use]
    pub fn titletext(&self) -> String {
        join_list(&self.titles)
    }

    /// Catalog ordering key.
    #[must_use]
    pub fn sortkey(&self) -> SortKey {
        let placetitle = self.placetitle();
        (
            self.placeauthor(),
            placetitle.clone(),
            self.authortext(),
            placetitle,
            self.titletext(),
        )
    }

    /// Physical shelf ordering key for the copies under `shelfcode`.
    ///
    /// `shelfcode` is an edition token such as `@D7`. A double code leads
    /// with its qualifier. Series name and index are included when the
    /// token, the line's edition, or the series itself is marked visible.
    ///
    /// # Errors
    ///
    /// Propagates the failure to parse `shelfcode`.
    pub fn shelfkey(&self, shelfcode: &str, grammar: &ShelfcodeGrammar) -> CodecResult<ShelfKey> {
        let wanted = Edition::parse(shelfcode, grammar)?;
        Ok(self.shelfkey_for(&wanted))
    }

    /// [`Self::shelfkey`] for an already-parsed edition.
    #[must_use]
    pub fn shelfkey_for(&self, wanted: &Edition) -> ShelfKey {
        let held = self.codes.get(&wanted.shelfcode);
        let qualifier = held
            .and_then(|e| e.qualifier.as_ref())
            .or(wanted.qualifier.as_ref());

        let mut key = Vec::with_capacity(5);
        if let Some(qualifier) = qualifier {
            key.push(qualifier.clone());
        }
        key.push(self.placeauthor());

        if let Some(series) = self.series.first() {
            let (marked, name) = match series.strip_prefix(SERIES_VISIBLE_MARKER) {
                Some(rest) => (true, rest),
                None => (false, series.as_str()),
            };
            let visible = marked || wanted.series_visible || held.is_some_and(|e| e.series_visible);
            if visible {
                key.push(sanitize(name));
                if let Some(index) = SERIES_INDEX.find(name) {
                    key.push(sanitize(index.as_str()));
                }
            }
        }

        key.push(self.placetitle());
        ShelfKey(key)
    }
}

fn split_list(field: &str) -> CodecResult<Vec<String>> {
    if field.is_empty() {
        return Ok(Vec::new());
    }
    field
        .split(LIST_SEPARATOR)
        .map(|element| {
            let element = element.trim();
            if element.matches('=').count() > 1 {
                return Err(CodecError::malformed_line(format!(
                    "more than one '=' in {element:?}"
                )));
            }
            Ok(element.to_string())
        })
        .collect()
}

fn join_list(list: &[String]) -> String {
    list.join(&LIST_SEPARATOR.to_string())
}

impl fmt::Display for DexLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}",
            join_list(&self.authors),
            join_list(&self.titles),
            join_list(&self.series),
            self.codes,
            sep = FIELD_SEPARATOR,
        )
    }
}

impl PartialEq for DexLine {
    fn eq(&self, other: &Self) -> bool {
        self.authors == other.authors && self.titles == other.titles
    }
}

impl Eq for DexLine {}

impl Hash for DexLine {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.authors.hash(state);
        self.titles.hash(state);
    }
}

impl PartialOrd for DexLine {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DexLine {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.authors, &self.titles).cmp(&(&other.authors, &other.titles))
    }
}
