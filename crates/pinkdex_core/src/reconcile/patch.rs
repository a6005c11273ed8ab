//! Positional field patches between two versions of a line.

use super::diff::diff;
use crate::error::{CoreError, CoreResult};
use pinkdex_codec::{DexLine, Editions};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use tracing::debug;

/// A list-valued field of a catalog line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The authors list.
    Authors,
    /// The titles list.
    Titles,
    /// The series list.
    Series,
}

impl Field {
    /// Every list field, in line order.
    pub const ALL: [Field; 3] = [Field::Authors, Field::Titles, Field::Series];

    /// Field name as used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Field::Authors => "authors",
            Field::Titles => "titles",
            Field::Series => "series",
        }
    }

    fn of(self, line: &DexLine) -> &[String] {
        match self {
            Field::Authors => line.authors(),
            Field::Titles => line.titles(),
            Field::Series => line.series(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One positional change to a field's value list.
///
/// Positions refer to the list as it stands when the op is applied, after
/// every earlier op in the same script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOp {
    /// Drop the values at these positions.
    Delete {
        /// Positions to drop.
        positions: Range<usize>,
    },
    /// Shift every value at or after `from` by `offset` positions.
    Renumber {
        /// First position to shift.
        from: usize,
        /// Signed shift.
        offset: isize,
    },
    /// Place values at consecutive positions starting at `position`.
    Insert {
        /// First position to fill.
        position: usize,
        /// Values to place.
        values: Vec<String>,
    },
}

/// The changes turning one version of a line into another.
///
/// List fields carry positional edit scripts. Codes are replaced
/// wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePatch {
    /// Edit script for the authors list.
    pub authors: Vec<FieldOp>,
    /// Edit script for the titles list.
    pub titles: Vec<FieldOp>,
    /// Edit script for the series list.
    pub series: Vec<FieldOp>,
    /// The new codes.
    pub codes: Editions,
}

impl LinePatch {
    /// Edit script for one field.
    #[must_use]
    pub fn ops(&self, field: Field) -> &[FieldOp] {
        match field {
            Field::Authors => &self.authors,
            Field::Titles => &self.titles,
            Field::Series => &self.series,
        }
    }

    /// Returns true if no list field changes.
    #[must_use]
    pub fn is_codes_only(&self) -> bool {
        Field::ALL.iter().all(|&f| self.ops(f).is_empty())
    }

    /// Replays the patch against `old`, producing the new line.
    ///
    /// Each list is loaded into a position-keyed store (after sort-by
    /// unfolding), the field's ops run in order, and the surviving values
    /// are read back by ascending position.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` if an op shifts or inserts a value
    /// onto an occupied position, or shifts one below zero.
    pub fn apply(&self, old: &DexLine) -> CoreResult<DexLine> {
        let [authors, titles, series] =
            Field::ALL.map(|field| replay(field, field.of(old), self.ops(field)));
        Ok(DexLine::new(authors?, titles?, series?, self.codes.clone()))
    }
}

/// Computes the patch turning `old` into `new`.
///
/// The stored line and the returned patch are both in unfolded form: a
/// leading lone sort-by marker in any list is merged into its neighbour
/// before diffing (see [`unfold_sortby_pair`]).
#[must_use]
pub fn replace(old: &DexLine, new: &DexLine) -> LinePatch {
    let [authors, titles, series] =
        Field::ALL.map(|field| field_ops(field.of(old), field.of(new)));
    let patch = LinePatch {
        authors,
        titles,
        series,
        codes: new.codes().clone(),
    };
    debug!(
        authors = patch.authors.len(),
        titles = patch.titles.len(),
        series = patch.series.len(),
        "line patch computed"
    );
    patch
}

/// Merges a leading lone sort-by marker into the element after it.
///
/// Legacy rows sometimes store `["=SORTBY", "DISPLAY"]` as two elements;
/// this returns `["DISPLAY=SORTBY", ...]`. An empty list and a list
/// holding only a marker come back unchanged, as does any list whose first
/// element is not a marker.
///
/// ```
/// use pinkdex_core::reconcile::unfold_sortby_pair;
///
/// let list = ["=SORTBY".to_string(), "DISPLAY".to_string()];
/// assert_eq!(unfold_sortby_pair(&list), ["DISPLAY=SORTBY"]);
/// ```
#[must_use]
pub fn unfold_sortby_pair(list: &[String]) -> Vec<String> {
    match list {
        [marker, anchor, rest @ ..] if marker.starts_with('=') => {
            let mut unfolded = Vec::with_capacity(rest.len() + 1);
            unfolded.push(format!("{anchor}{marker}"));
            unfolded.extend_from_slice(rest);
            unfolded
        }
        _ => list.to_vec(),
    }
}

fn field_ops(old: &[String], new: &[String]) -> Vec<FieldOp> {
    let old = unfold_sortby_pair(old);
    let new = unfold_sortby_pair(new);

    let mut ops = Vec::new();
    let mut offset: isize = 0;
    for op in diff(&old, &new) {
        let start = shift(op.a.start, offset);
        let end = shift(op.a.end, offset);
        if !op.a.is_empty() {
            ops.push(FieldOp::Delete {
                positions: start..end,
            });
        }

        let delta = signed(op.b.len()) - signed(op.a.len());
        if delta != 0 && op.a.end < old.len() {
            ops.push(FieldOp::Renumber {
                from: end,
                offset: delta,
            });
        }

        if !op.b.is_empty() {
            ops.push(FieldOp::Insert {
                position: op.b.start,
                values: new[op.b.clone()].to_vec(),
            });
        }
        offset += delta;
    }
    ops
}

fn replay(field: Field, old: &[String], ops: &[FieldOp]) -> CoreResult<Vec<String>> {
    let mut store: BTreeMap<usize, String> =
        unfold_sortby_pair(old).into_iter().enumerate().collect();

    for op in ops {
        match op {
            FieldOp::Delete { positions } => {
                for position in positions.clone() {
                    store.remove(&position);
                }
            }
            FieldOp::Renumber { from, offset } => {
                let moved = store.split_off(from);
                for (position, value) in moved {
                    let target = position.checked_add_signed(*offset).ok_or_else(|| {
                        CoreError::invariant_violation(format!(
                            "{field}: renumber moves position {position} below zero"
                        ))
                    })?;
                    place(field, &mut store, target, value)?;
                }
            }
            FieldOp::Insert { position, values } => {
                for (i, value) in values.iter().enumerate() {
                    place(field, &mut store, position + i, value.clone())?;
                }
            }
        }
    }
    Ok(store.into_values().collect())
}

fn place(
    field: Field,
    store: &mut BTreeMap<usize, String>,
    position: usize,
    value: String,
) -> CoreResult<()> {
    if let Some(existing) = store.insert(position, value) {
        return Err(CoreError::invariant_violation(format!(
            "{field}: position {position} already holds {existing:?}"
        )));
    }
    Ok(())
}

fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

fn shift(position: usize, offset: isize) -> usize {
    position.saturating_add_signed(offset)
}
