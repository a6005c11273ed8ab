//! Field-aware catalog search patterns.
//!
//! A pattern is split on `<` or `` ` `` into up to four fragments aimed at
//! the author, title, series and shelfcode fields:
//!
//! - `EA` (no separator) searches authors, titles and series together
//! - `<C` searches titles only
//! - `ASIMOV<<FOUNDATION` requires an author and a series match
//! - `<<<P,H` requires a `P` or `H` edition
//!
//! The first three fragments are case-insensitive regular expressions
//! matched anywhere in a value. The shelfcode fragment is a comma-separated
//! list compared by equality.

use crate::error::{CoreError, CoreResult};
use pinkdex_codec::DexLine;
use regex::{Regex, RegexBuilder};

/// A compiled search pattern.
#[derive(Debug, Clone)]
pub enum GrepPattern {
    /// One fragment matched against authors, titles and series.
    Anywhere(Regex),
    /// Per-field fragments; absent fields match everything.
    Fields {
        /// Author fragment.
        authors: Option<Regex>,
        /// Title fragment.
        titles: Option<Regex>,
        /// Series fragment.
        series: Option<Regex>,
        /// Accepted shelfcodes.
        codes: Option<Vec<String>>,
    },
}

impl GrepPattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` for more than four fragments or a fragment
    /// that is not a valid regular expression.
    pub fn parse(pattern: &str) -> CoreResult<Self> {
        let fragments: Vec<&str> = pattern.split(['<', '`']).collect();
        if fragments.len() > 4 {
            return Err(CoreError::invalid_pattern(
                pattern,
                format!("expected at most 4 fields, found {}", fragments.len()),
            ));
        }

        if let [only] = fragments.as_slice() {
            return Ok(Self::Anywhere(compile(pattern, only)?));
        }

        let fragment = |i: usize| fragments.get(i).copied().filter(|f| !f.is_empty());
        let regex = |i: usize| fragment(i).map(|f| compile(pattern, f)).transpose();

        Ok(Self::Fields {
            authors: regex(0)?,
            titles: regex(1)?,
            series: regex(2)?,
            codes: fragment(3).map(|f| {
                f.split(',')
                    .map(|code| code.trim().to_uppercase())
                    .filter(|code| !code.is_empty())
                    .collect()
            }),
        })
    }

    /// Tests a line against the pattern.
    #[must_use]
    pub fn matches(&self, line: &DexLine) -> bool {
        match self {
            Self::Anywhere(re) => {
                any_match(re, line.authors())
                    || any_match(re, line.titles())
                    || any_match(re, line.series())
            }
            Self::Fields {
                authors,
                titles,
                series,
                codes,
            } => {
                field_matches(authors.as_ref(), line.authors())
                    && field_matches(titles.as_ref(), line.titles())
                    && field_matches(series.as_ref(), line.series())
                    && codes.as_ref().map_or(true, |wanted| has_code(line, wanted))
            }
        }
    }

    /// Shelfcodes the pattern is restricted to, if any.
    #[must_use]
    pub fn codes(&self) -> Option<&[String]> {
        match self {
            Self::Fields {
                codes: Some(codes), ..
            } => Some(codes),
            _ => None,
        }
    }
}

fn compile(pattern: &str, fragment: &str) -> CoreResult<Regex> {
    RegexBuilder::new(fragment)
        .case_insensitive(true)
        .build()
        .map_err(|e| CoreError::invalid_pattern(pattern, e.to_string()))
}

fn any_match(re: &Regex, values: &[String]) -> bool {
    values.iter().any(|v| re.is_match(v))
}

fn field_matches(re: Option<&Regex>, values: &[String]) -> bool {
    re.map_or(true, |re| any_match(re, values))
}

fn has_code(line: &DexLine, wanted: &[String]) -> bool {
    line.codes().iter().any(|edition| {
        let mut token = edition.shelfcode.clone();
        if let Some(qualifier) = &edition.qualifier {
            token.push_str(qualifier);
        }
        wanted
            .iter()
            .any(|code| *code == edition.shelfcode || *code == token)
    })
}
