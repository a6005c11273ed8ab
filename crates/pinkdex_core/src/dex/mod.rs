//! The indexed catalog collection.
//!
//! A [`Dex`] owns its lines in an arena of slots. The primary map, the
//! ordered line list, and the four secondary indices all hold [`LineId`]
//! handles into that arena:
//!
//! | index   | keyed by                          |
//! |---------|-----------------------------------|
//! | authors | each author as written            |
//! | titles  | each title as written             |
//! | series  | each series, sanitized            |
//! | codes   | each shelfcode held               |
//!
//! Every stored line is filed under every value of every field and nowhere
//! else. [`Dex::check_consistency`] verifies this.
//!
//! # Thread Safety
//!
//! `Dex` performs no synchronization. Callers sharing one across threads
//! must serialize mutations themselves.

mod grep;
mod index;

pub use grep::GrepPattern;
pub use index::{FieldIndex, LineId};

use crate::config::DexConfig;
use crate::error::{CoreError, CoreResult};
use indexmap::IndexSet;
use pinkdex_codec::{
    sanitize, DexLine, Edition, LineKey, ShelfKey, ShelfcodeGrammar, SortKey,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What [`Dex::add`] did with a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The key was new and the line was stored.
    Inserted(LineId),
    /// The key existed; the line's codes were merged into the entry.
    Merged(LineId),
    /// The key existed and the merge left no copies, so the entry was
    /// removed.
    Removed,
    /// The key was new but the line held no copies; nothing was stored.
    Dropped,
}

/// Indexed collection of catalog lines.
#[derive(Debug, Clone)]
pub struct Dex {
    config: DexConfig,
    slots: Vec<Option<DexLine>>,
    free: Vec<LineId>,
    entries: HashMap<LineKey, LineId>,
    order: IndexSet<LineId>,
    authors: FieldIndex,
    titles: FieldIndex,
    series: FieldIndex,
    codes: FieldIndex,
}

impl Default for Dex {
    fn default() -> Self {
        Self::new(DexConfig::default())
    }
}

impl Dex {
    /// Creates an empty collection.
    #[must_use]
    pub fn new(config: DexConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            free: Vec::new(),
            entries: HashMap::new(),
            order: IndexSet::new(),
            authors: FieldIndex::new("authors"),
            titles: FieldIndex::new("titles"),
            series: FieldIndex::new("series"),
            codes: FieldIndex::new("codes"),
        }
    }

    /// Creates a collection holding the given lines.
    ///
    /// # Errors
    ///
    /// Propagates the first [`Dex::add`] failure.
    pub fn from_lines<I>(lines: I, config: DexConfig) -> CoreResult<Self>
    where
        I: IntoIterator<Item = DexLine>,
    {
        let mut dex = Self::new(config);
        dex.merge(lines)?;
        Ok(dex)
    }

    /// The collection's configuration.
    #[must_use]
    pub fn config(&self) -> &DexConfig {
        &self.config
    }

    /// Number of lines held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if no lines are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Looks up a line by key.
    #[must_use]
    pub fn get(&self, key: &LineKey) -> Option<&DexLine> {
        self.entries.get(key).map(|&id| self.line(id))
    }

    /// Looks up a line by handle.
    #[must_use]
    pub fn get_by_id(&self, id: LineId) -> Option<&DexLine> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    /// Returns true if a line with this key is held.
    #[must_use]
    pub fn contains(&self, key: &LineKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates lines in current order.
    pub fn iter(&self) -> impl Iterator<Item = &DexLine> {
        self.order.iter().map(|&id| self.line(id))
    }

    /// Lines filed under an author.
    pub fn by_author(&self, author: &str) -> impl Iterator<Item = &DexLine> {
        self.resolve(self.authors.lookup(author))
    }

    /// Lines filed under a title.
    pub fn by_title(&self, title: &str) -> impl Iterator<Item = &DexLine> {
        self.resolve(self.titles.lookup(title))
    }

    /// Lines filed under a series. The series is sanitized before lookup.
    pub fn by_series(&self, series: &str) -> impl Iterator<Item = &DexLine> {
        self.resolve(self.series.lookup(&sanitize(series)))
    }

    /// Lines holding copies under a shelfcode.
    pub fn by_code(&self, shelfcode: &str) -> impl Iterator<Item = &DexLine> {
        self.resolve(self.codes.lookup(shelfcode))
    }

    /// Adds a line under the collection's configured zerok mode.
    ///
    /// A new key is stored (after dropping editions with count below one,
    /// unless zerok). An existing key has the line's codes merged into it;
    /// the stored line object is kept.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` when merging into an existing entry a
    /// line whose codes both add and remove copies. The collection is left
    /// unchanged.
    pub fn add(&mut self, line: DexLine) -> CoreResult<AddOutcome> {
        let zerok = self.config.zerok;
        self.insert(line, zerok)
    }

    /// Adds a line as a pending delta, retaining zero and negative counts.
    ///
    /// # Errors
    ///
    /// As for [`Dex::add`].
    pub fn add_delta(&mut self, line: DexLine) -> CoreResult<AddOutcome> {
        self.insert(line, true)
    }

    /// Adds every line in turn.
    ///
    /// # Errors
    ///
    /// Stops at the first [`Dex::add`] failure; earlier lines stay added.
    pub fn merge<I>(&mut self, lines: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = DexLine>,
    {
        for line in lines {
            self.add(line)?;
        }
        Ok(())
    }

    /// Removes the line with the same key, returning it.
    pub fn remove(&mut self, line: &DexLine) -> Option<DexLine> {
        let id = self.entries.get(&line.key()).copied()?;
        Some(self.remove_id(id))
    }

    /// Computes what would remain after removing `other`'s holdings.
    ///
    /// # Errors
    ///
    /// As for [`Dex::add`].
    pub fn sub(&self, other: &Dex) -> CoreResult<Dex> {
        let mut result = self.clone();
        for line in other.iter() {
            result.add(line.negate())?;
        }
        Ok(result)
    }

    /// Stably sorts the line order and every index bucket by sort key.
    pub fn sort(&mut self) {
        let keys: HashMap<LineId, SortKey> = self
            .order
            .iter()
            .map(|&id| (id, self.line(id).sortkey()))
            .collect();
        let key = |id: LineId| keys.get(&id).cloned();

        self.order.sort_by_cached_key(|&id| key(id));
        for index in [
            &mut self.authors,
            &mut self.titles,
            &mut self.series,
            &mut self.codes,
        ] {
            index.sort_buckets(key);
        }
    }

    /// Sorts, then iterates lines in sort order.
    pub fn sorted(&mut self) -> impl Iterator<Item = &DexLine> {
        self.sort();
        self.iter()
    }

    /// Lines matching a search pattern, in current order.
    ///
    /// See [`GrepPattern`] for the pattern language.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPattern` if the pattern does not compile.
    pub fn grep(&self, pattern: &str) -> CoreResult<Vec<&DexLine>> {
        let pattern = GrepPattern::parse(pattern)?;

        let hits = match pattern.codes() {
            // narrow to the code buckets, then restore collection order
            Some(codes) => {
                let mut candidates: BTreeSet<usize> = BTreeSet::new();
                let position: HashMap<LineId, usize> =
                    self.order.iter().enumerate().map(|(i, &id)| (id, i)).collect();
                for edition_code in self.codes.values() {
                    if codes.iter().any(|c| c.starts_with(edition_code)) {
                        for id in self.codes.lookup(edition_code) {
                            candidates.extend(position.get(&id));
                        }
                    }
                }
                candidates
                    .into_iter()
                    .map(|i| self.line(self.order[i]))
                    .filter(|line| pattern.matches(line))
                    .collect()
            }
            None => self.iter().filter(|line| pattern.matches(line)).collect(),
        };
        Ok(hits)
    }

    /// Lines holding copies under `shelfcode`, in physical shelf order.
    ///
    /// When `shelfcode` carries a double-code qualifier, only copies with
    /// that qualifier are shelved.
    ///
    /// # Errors
    ///
    /// Propagates the failure to parse `shelfcode`.
    pub fn shelved(
        &self,
        shelfcode: &str,
        grammar: &ShelfcodeGrammar,
    ) -> CoreResult<Vec<&DexLine>> {
        let wanted = Edition::parse(shelfcode, grammar)?;
        let mut lines: Vec<(ShelfKey, &DexLine)> = self
            .by_code(&wanted.shelfcode)
            .filter(|line| match &wanted.qualifier {
                Some(q) => line
                    .codes()
                    .get(&wanted.shelfcode)
                    .is_some_and(|held| held.qualifier.as_ref() == Some(q)),
                None => true,
            })
            .map(|line| (line.shelfkey_for(&wanted), line))
            .collect();
        lines.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(lines.into_iter().map(|(_, line)| line).collect())
    }

    /// Signed copy totals per shelfcode across all lines.
    #[must_use]
    pub fn stats(&self) -> BTreeMap<String, i64> {
        let mut totals = BTreeMap::new();
        for line in self.iter() {
            for edition in line.codes().iter() {
                let total = totals.entry(edition.shelfcode.clone()).or_insert(0_i64);
                *total = total.saturating_add(edition.count);
            }
        }
        totals
    }

    /// Sorts and writes the collection to `path`, one line per entry.
    ///
    /// Uses write-then-rename for crash safety:
    /// 1. Write to a temporary sibling file
    /// 2. Sync the temporary file to disk
    /// 3. Rename it over `path`
    /// 4. Fsync the directory so the rename is durable
    ///
    /// `progress` receives the running line count every
    /// [`DexConfig::progress_interval`] lines.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if any step fails; `path` is then untouched.
    pub fn save(&mut self, path: &Path, mut progress: impl FnMut(usize)) -> CoreResult<()> {
        self.sort();

        let temp_path = temp_sibling(path);
        let interval = self.config.progress_interval;
        let written = {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            let mut written = 0usize;
            for line in self.iter() {
                writeln!(writer, "{line}")?;
                written += 1;
                if interval > 0 && written % interval == 0 {
                    progress(written);
                }
            }
            let file = writer.into_inner().map_err(|e| e.into_error())?;
            file.sync_all()?;
            written
        };

        fs::rename(&temp_path, path)?;
        sync_parent(path)?;

        info!(path = %path.display(), lines = written, "catalog saved");
        Ok(())
    }

    /// Verifies that the primary map, the order list and every index agree.
    ///
    /// # Errors
    ///
    /// Returns `InvariantViolation` describing the first disagreement.
    pub fn check_consistency(&self) -> CoreResult<()> {
        if self.entries.len() != self.order.len() {
            return Err(CoreError::invariant_violation(format!(
                "{} entries but {} ordered lines",
                self.entries.len(),
                self.order.len()
            )));
        }
        for &id in &self.order {
            let line = self.get_by_id(id).ok_or_else(|| {
                CoreError::invariant_violation(format!("ordered handle {id} has no line"))
            })?;
            if self.entries.get(&line.key()) != Some(&id) {
                return Err(CoreError::invariant_violation(format!(
                    "line {id} missing from primary map"
                )));
            }
        }

        let mut expected = Dex::new(self.config.clone());
        for &id in &self.order {
            expected.index_line(id, self.line(id));
        }
        for (actual, wanted) in [
            (&self.authors, &expected.authors),
            (&self.titles, &expected.titles),
            (&self.series, &expected.series),
            (&self.codes, &expected.codes),
        ] {
            let mut have: Vec<(&str, LineId)> = actual.pairs().collect();
            let mut want: Vec<(&str, LineId)> = wanted.pairs().collect();
            have.sort_unstable();
            want.sort_unstable();
            if have != want {
                return Err(CoreError::invariant_violation(format!(
                    "{} index out of sync",
                    actual.name()
                )));
            }
        }
        Ok(())
    }

    fn insert(&mut self, mut line: DexLine, zerok: bool) -> CoreResult<AddOutcome> {
        if let Some(&id) = self.entries.get(&line.key()) {
            return self.merge_into(id, &line, zerok);
        }

        if !zerok {
            line.codes_mut().retain(|e| e.count >= 1);
            if !line.codes().is_nonempty() {
                debug!(line = %line, "dropping line with no copies");
                return Ok(AddOutcome::Dropped);
            }
        }

        let key = line.key();
        let id = self.allocate();
        self.index_line(id, &line);
        debug!(%id, line = %line, "inserted");
        self.slots[id.slot()] = Some(line);
        self.entries.insert(key, id);
        self.order.insert(id);
        Ok(AddOutcome::Inserted(id))
    }

    fn merge_into(&mut self, id: LineId, incoming: &DexLine, zerok: bool) -> CoreResult<AddOutcome> {
        let delta = incoming.codes();
        if delta.has_additions() && delta.has_removals() {
            return Err(CoreError::invariant_violation(format!(
                "ambiguous merge into {}: delta {delta} both adds and removes copies",
                incoming.key().titles.join("|"),
            )));
        }

        let Some(existing) = self.slots[id.slot()].as_mut() else {
            return Err(CoreError::invariant_violation(format!(
                "primary map points at empty slot {id}"
            )));
        };
        let before: BTreeSet<String> = existing.codes().codes().map(str::to_string).collect();
        let merged = existing.codes() + delta;
        existing.set_codes(merged);
        let after: BTreeSet<String> = existing.codes().codes().map(str::to_string).collect();
        let emptied = !existing.codes().is_nonempty();
        debug!(%id, delta = %delta, "merged");

        for code in before.difference(&after) {
            self.codes.remove(code, id);
        }
        for code in after.difference(&before) {
            self.codes.insert(code.clone(), id);
        }

        if !zerok && emptied {
            self.remove_id(id);
            return Ok(AddOutcome::Removed);
        }
        Ok(AddOutcome::Merged(id))
    }

    fn remove_id(&mut self, id: LineId) -> DexLine {
        let line = self.slots[id.slot()]
            .take()
            .unwrap_or_default();
        self.entries.remove(&line.key());
        self.order.shift_remove(&id);
        self.unindex_line(id, &line);
        self.free.push(id);
        debug!(%id, line = %line, "removed");
        line
    }

    fn allocate(&mut self) -> LineId {
        self.free.pop().unwrap_or_else(|| {
            let id = LineId::new(u32::try_from(self.slots.len()).unwrap_or(u32::MAX));
            self.slots.push(None);
            id
        })
    }

    fn index_line(&mut self, id: LineId, line: &DexLine) {
        for author in line.authors() {
            self.authors.insert(author.clone(), id);
        }
        for title in line.titles() {
            self.titles.insert(title.clone(), id);
        }
        for series in line.series() {
            self.series.insert(sanitize(series), id);
        }
        for code in line.codes().codes() {
            self.codes.insert(code.to_string(), id);
        }
    }

    fn unindex_line(&mut self, id: LineId, line: &DexLine) {
        for author in line.authors() {
            self.authors.remove(author, id);
        }
        for title in line.titles() {
            self.titles.remove(title, id);
        }
        for series in line.series() {
            self.series.remove(&sanitize(series), id);
        }
        for code in line.codes().codes() {
            self.codes.remove(code, id);
        }
    }

    fn line(&self, id: LineId) -> &DexLine {
        // handles in order/entries/indices always point at occupied slots
        self.slots[id.slot()]
            .as_ref()
            .unwrap_or_else(|| unreachable!("dangling line handle {id}"))
    }

    fn resolve<'a>(
        &'a self,
        ids: impl Iterator<Item = LineId> + 'a,
    ) -> impl Iterator<Item = &'a DexLine> + 'a {
        ids.map(move |id| self.line(id))
    }
}

impl Extend<DexLine> for Dex {
    /// Adds every line, skipping any that fail.
    fn extend<I: IntoIterator<Item = DexLine>>(&mut self, lines: I) {
        for line in lines {
            if let Err(e) = self.add(line) {
                tracing::warn!(error = %e, "line not added");
            }
        }
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Syncs the directory holding `path` so a rename into it is durable.
///
/// Windows NTFS journaling covers metadata durability, so this is a no-op
/// there.
#[cfg(unix)]
fn sync_parent(path: &Path) -> CoreResult<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> CoreResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinkdex_codec::{Editions, StaticRegistry};
    use tempfile::tempdir;

    fn grammar() -> ShelfcodeGrammar {
        ShelfcodeGrammar::from_registry(&StaticRegistry::default()).unwrap()
    }

    fn line(s: &str) -> DexLine {
        DexLine::parse(s, &grammar()).unwrap()
    }

    fn dex(lines: &[&str]) -> Dex {
        Dex::from_lines(lines.iter().map(|s| line(s)), DexConfig::default()).unwrap()
    }

    fn formatted<'a>(lines: impl IntoIterator<Item = &'a DexLine>) -> Vec<String> {
        lines.into_iter().map(ToString::to_string).collect()
    }

    #[test]
    fn add_twice_merges_counts() {
        let mut d = Dex::default();
        assert!(matches!(d.add(line("F<G<H<P")).unwrap(), AddOutcome::Inserted(_)));
        assert!(matches!(d.add(line("F<G<H<P")).unwrap(), AddOutcome::Merged(_)));
        let key = line("F<G<<").key();
        assert_eq!(d.get(&key).unwrap().codes().total(), 2);

        d.add(line("F<G<H<P:-1")).unwrap();
        assert_eq!(d.get(&key).unwrap().codes().total(), 1);
        assert_eq!(d.len(), 1);
        d.check_consistency().unwrap();
    }

    #[test]
    fn merge_keeps_existing_payload() {
        let mut d = dex(&["F<G<SERIES ONE<P"]);
        d.add(line("F<G<SERIES TWO<H")).unwrap();
        let stored = d.get(&line("F<G<<").key()).unwrap();
        assert_eq!(stored.to_string(), "F<G<SERIES ONE<H,P");
        assert_eq!(d.by_code("H").count(), 1);
        d.check_consistency().unwrap();
    }

    #[test]
    fn merge_to_empty_removes_entry() {
        let mut d = dex(&["F<G<H<P"]);
        let outcome = d.add(line("F<G<H<P:-1")).unwrap();
        assert_eq!(outcome, AddOutcome::Removed);
        assert!(d.is_empty());
        assert_eq!(d.by_author("F").count(), 0);
        assert_eq!(d.by_code("P").count(), 0);
        d.check_consistency().unwrap();
    }

    #[test]
    fn new_line_drops_nonpositive_codes() {
        let mut d = Dex::default();
        d.add(line("F<G<<P:2,H:-1")).unwrap();
        assert_eq!(d.iter().next().unwrap().to_string(), "F<G<<P:2");
        assert_eq!(d.add(line("X<Y<<P:-1")).unwrap(), AddOutcome::Dropped);
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn zerok_retains_deltas() {
        let mut d = Dex::new(DexConfig::new().zerok(true));
        d.add(line("X<Y<<P:-1")).unwrap();
        assert_eq!(d.iter().next().unwrap().to_string(), "X<Y<<P:-1");

        d.add(line("X<Y<<P")).unwrap();
        // merged to zero; zerok keeps the entry with no codes
        assert_eq!(d.len(), 1);
        assert!(!d.iter().next().unwrap().codes().is_nonempty());
        d.check_consistency().unwrap();
    }

    #[test]
    fn add_delta_forces_zerok() {
        let mut d = Dex::default();
        d.add_delta(line("X<Y<<P:-2")).unwrap();
        assert_eq!(d.stats().get("P"), Some(&-2));
    }

    #[test]
    fn ambiguous_merge_refused() {
        let mut d = dex(&["F<G<<P:2,H"]);
        let err = d.add(line("F<G<<P:-1,L")).unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation { .. }));
        assert_eq!(d.iter().next().unwrap().to_string(), "F<G<<H,P:2");
        d.check_consistency().unwrap();
    }

    #[test]
    fn codes_index_follows_merge() {
        let mut d = dex(&["F<G<<P,H"]);
        d.add(line("F<G<<P:-1")).unwrap();
        assert_eq!(d.by_code("P").count(), 0);
        assert_eq!(d.by_code("H").count(), 1);
        d.add(line("F<G<<L")).unwrap();
        assert_eq!(d.by_code("L").count(), 1);
        d.check_consistency().unwrap();
    }

    #[test]
    fn sorted_orders_by_sortkey() {
        let mut d = dex(&["D<E<<P", "A<B<<P"]);
        assert_eq!(formatted(d.sorted()), ["A<B<<P", "D<E<<P"]);
    }

    #[test]
    fn sort_uses_sortby_and_numbers() {
        let mut d = dex(&[
            "X<BOOK 10<<P",
            "X<BOOK 2<<P",
            "MCCAFFREY=MACCAFFREY<DRAGONFLIGHT<<P",
            "LEIBER<SWORDS<<P",
        ]);
        assert_eq!(
            formatted(d.sorted()),
            [
                "LEIBER<SWORDS<<P",
                "MCCAFFREY=MACCAFFREY<DRAGONFLIGHT<<P",
                "X<BOOK 2<<P",
                "X<BOOK 10<<P",
            ]
        );
    }

    #[test]
    fn sort_orders_index_buckets() {
        let mut d = dex(&["Z<B<<P", "A<B<<P"]);
        assert_eq!(formatted(d.by_title("B")), ["Z<B<<P", "A<B<<P"]);
        d.sort();
        assert_eq!(formatted(d.by_title("B")), ["A<B<<P", "Z<B<<P"]);
    }

    #[test]
    fn remove_clears_every_index() {
        let mut d = dex(&["A|B<T<SAGA #1<P,H", "A<U<<P"]);
        let target = line("A|B<T<<");
        let removed = d.remove(&target).unwrap();
        assert_eq!(removed.to_string(), "A|B<T<SAGA #1<H,P");

        assert!(!d.contains(&target.key()));
        assert_eq!(formatted(d.by_author("A")), ["A<U<<P"]);
        assert_eq!(d.by_author("B").count(), 0);
        assert_eq!(d.by_title("T").count(), 0);
        assert_eq!(d.by_series("SAGA #1").count(), 0);
        assert_eq!(d.by_code("H").count(), 0);
        assert_eq!(d.by_code("P").count(), 1);
        d.check_consistency().unwrap();
    }

    #[test]
    fn remove_missing() {
        let mut d = dex(&["A<B<<P"]);
        assert!(d.remove(&line("X<Y<<")).is_none());
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn removals_from_one_large_shelf_keep_order() {
        let mut d = Dex::default();
        for i in 0..2_000 {
            d.add(line(&format!("AUTHOR {i:04}<TITLE<<P"))).unwrap();
        }
        for i in (0..2_000).step_by(2) {
            assert!(d.remove(&line(&format!("AUTHOR {i:04}<TITLE<<"))).is_some());
        }

        assert_eq!(d.len(), 1_000);
        assert_eq!(d.by_code("P").count(), 1_000);
        let first: Vec<String> = d.iter().take(2).map(|l| l.authors()[0].clone()).collect();
        assert_eq!(first, ["AUTHOR 0001", "AUTHOR 0003"]);
        d.check_consistency().unwrap();
    }

    #[test]
    fn stats_saturate() {
        let mut d = Dex::default();
        for author in ["A", "B"] {
            let mut l = line(&format!("{author}<T<<P"));
            l.set_codes(Editions::parse_counts([("P", i64::MAX)]));
            d.add(l).unwrap();
        }
        assert_eq!(d.stats()["P"], i64::MAX);
    }

    #[test]
    fn slots_are_reused() {
        let mut d = dex(&["A<B<<P"]);
        let AddOutcome::Inserted(first) = d.add(line("C<D<<P")).unwrap() else {
            panic!("expected insert");
        };
        d.remove(&line("C<D<<"));
        let AddOutcome::Inserted(second) = d.add(line("E<F<<P")).unwrap() else {
            panic!("expected insert");
        };
        assert_eq!(first, second);
        d.check_consistency().unwrap();
    }

    #[test]
    fn series_index_is_sanitized() {
        let d = dex(&["A<B<@Saga, The<P"]);
        assert_eq!(d.by_series("SAGA").count(), 1);
        assert_eq!(d.by_series("saga, the").count(), 1);
    }

    #[test]
    fn grep_unqualified() {
        let d = dex(&["C<EA<<P", "C<EB<<P"]);
        assert_eq!(formatted(d.grep("EA").unwrap()), ["C<EA<<P"]);
    }

    #[test]
    fn grep_title_anchored() {
        let d = dex(&["C<EA<<P", "X<CAT<<P"]);
        assert_eq!(formatted(d.grep("<C").unwrap()), ["X<CAT<<P"]);
    }

    #[test]
    fn grep_by_code_keeps_order() {
        let d = dex(&["B<B<<H", "A<A<<P", "C<C<<P,H", "E<E<<D7"]);
        assert_eq!(
            formatted(d.grep("<<<P").unwrap()),
            ["A<A<<P", "C<C<<H,P"]
        );
        assert_eq!(formatted(d.grep("<<<D7").unwrap()), ["E<E<<D7"]);
        assert_eq!(formatted(d.grep("C<<<H").unwrap()), ["C<C<<H,P"]);
    }

    #[test]
    fn sub_removes_other_holdings() {
        let mine = dex(&["A<B<<P:2", "C<D<<H"]);
        let theirs = dex(&["A<B<<P", "C<D<<H", "E<F<<L"]);
        let mut rest = mine.sub(&theirs).unwrap();
        assert_eq!(formatted(rest.sorted()), ["A<B<<P"]);
        // self untouched
        assert_eq!(mine.len(), 2);
        rest.check_consistency().unwrap();
    }

    #[test]
    fn stats_are_signed_totals() {
        let mut d = dex(&["A<B<<P:2,H", "C<D<<P"]);
        d.add_delta(line("E<F<<H:-3")).unwrap();
        let stats = d.stats();
        assert_eq!(stats.get("P"), Some(&3));
        assert_eq!(stats.get("H"), Some(&-2));
    }

    #[test]
    fn shelved_in_physical_order() {
        let g = grammar();
        let d = dex(&[
            "ZELAZNY<LORD OF LIGHT<<P",
            "ASIMOV<FOUNDATION<@FOUNDATION #2<P",
            "ASIMOV<PRELUDE<@FOUNDATION #10<P",
            "BRIN<STARTIDE<<H",
        ]);
        let shelf = d.shelved("P", &g).unwrap();
        assert_eq!(
            formatted(shelf),
            [
                "ASIMOV<FOUNDATION<@FOUNDATION #2<P",
                "ASIMOV<PRELUDE<@FOUNDATION #10<P",
                "ZELAZNY<LORD OF LIGHT<<P",
            ]
        );
    }

    #[test]
    fn shelved_double_code_filters_qualifier() {
        let g = grammar();
        let d = dex(&["A<X<<D7", "B<Y<<D8", "C<Z<<D7"]);
        assert_eq!(formatted(d.shelved("D7", &g).unwrap()), ["A<X<<D7", "C<Z<<D7"]);
        assert_eq!(d.shelved("D", &g).unwrap().len(), 3);
    }

    #[test]
    fn save_writes_sorted_atomically() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("pinkdex");
        fs::write(&path, "old contents\n").unwrap();

        let mut d = Dex::new(DexConfig::new().progress_interval(2));
        d.merge(["D<E<<P", "A<B<<P", "B<C<<H", "C<D<<L", "E<F<<P"].map(line))
            .unwrap();

        let mut ticks = Vec::new();
        d.save(&path, |n| ticks.push(n)).unwrap();

        assert_eq!(ticks, [2, 4]);
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "A<B<<P\nB<C<<H\nC<D<<L\nD<E<<P\nE<F<<P\n"
        );
        assert!(!temp_sibling(&path).exists());
    }

    #[test]
    fn save_failure_leaves_target() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("missing-dir").join("pinkdex");
        let mut d = dex(&["A<B<<P"]);
        assert!(matches!(d.save(&path, |_| {}), Err(CoreError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn extend_skips_failures() {
        let mut d = dex(&["F<G<<P:2"]);
        d.extend([line("F<G<<P:-1,H"), line("X<Y<<P")]);
        assert_eq!(d.len(), 2);
        assert_eq!(d.stats().get("P"), Some(&3));
    }
}
