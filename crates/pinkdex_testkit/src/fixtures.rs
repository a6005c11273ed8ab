//! Test fixtures and catalog helpers.
//!
//! Provides a small realistic catalog and temporary catalog files with
//! automatic cleanup.

use pinkdex_codec::{DexLine, ShelfcodeGrammar, StaticRegistry};
use pinkdex_core::{CatalogFile, Dex, DexConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A handful of catalog lines touching every field, in no particular order.
pub const SAMPLE_CATALOG: &[&str] = &[
    "ZELAZNY, ROGER<LORD OF LIGHT<<P",
    "ASIMOV, ISAAC<FOUNDATION<@FOUNDATION #1<P:2,H",
    "ASIMOV, ISAAC<FOUNDATION AND EMPIRE<@FOUNDATION #2<P",
    "GAIMAN, NEIL|PRATCHETT, TERRY<GOOD OMENS<<PA",
    "MCCAFFREY, ANNE=MACCAFFREY, ANNE<DRAGONFLIGHT<PERN #1<L",
    "CLARKE, ARTHUR C.<2001: A SPACE ODYSSEY<<P,D7",
    "LEIBER, FRITZ<SWORDS AND DEVILTRY<FAFHRD #1<D7,C/P",
];

/// The default shelfcode registry.
pub fn sample_registry() -> StaticRegistry {
    StaticRegistry::default()
}

/// The grammar compiled from [`sample_registry`].
pub fn sample_grammar() -> ShelfcodeGrammar {
    ShelfcodeGrammar::from_registry(&sample_registry()).expect("default registry compiles")
}

/// Parses one line with the sample grammar.
pub fn parse_line(s: &str) -> DexLine {
    DexLine::parse(s, &sample_grammar()).unwrap_or_else(|e| panic!("bad fixture {s:?}: {e}"))
}

/// Builds a collection from lines parsed with the sample grammar.
pub fn dex_of(lines: &[&str]) -> Dex {
    Dex::from_lines(lines.iter().map(|s| parse_line(s)), DexConfig::default())
        .expect("fixture lines merge")
}

/// The [`SAMPLE_CATALOG`] as a collection.
pub fn sample_dex() -> Dex {
    dex_of(SAMPLE_CATALOG)
}

/// A catalog file in a temporary directory.
pub struct TempCatalog {
    /// Catalog path.
    path: PathBuf,
    /// The temporary directory (kept alive to prevent cleanup).
    dir: TempDir,
}

impl TempCatalog {
    /// Creates a catalog file holding the given lines.
    pub fn with_lines(lines: &[&str]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        let path = dir.path().join("pinkdex");
        let mut text = lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        fs::write(&path, text).expect("Failed to write catalog");
        Self { path, dir }
    }

    /// Creates a catalog file holding [`SAMPLE_CATALOG`].
    pub fn sample() -> Self {
        Self::with_lines(SAMPLE_CATALOG)
    }

    /// Catalog path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the catalog.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Opens the catalog, taking its lock.
    pub fn open(&self) -> CatalogFile {
        CatalogFile::open(&self.path).expect("Failed to open catalog")
    }

    /// Current catalog text.
    pub fn contents(&self) -> String {
        fs::read_to_string(&self.path).expect("Failed to read catalog")
    }

    /// Writes the sample registry as JSON next to the catalog.
    pub fn write_registry(&self) -> PathBuf {
        let path = self.dir.path().join("shelfcodes.json");
        let json = serde_json::to_string_pretty(&sample_registry())
            .expect("Failed to serialize registry");
        fs::write(&path, json).expect("Failed to write registry");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_catalog_parses() {
        let dex = sample_dex();
        assert_eq!(dex.len(), SAMPLE_CATALOG.len());
        dex.check_consistency().unwrap();
    }

    #[test]
    fn temp_catalog_loads() {
        let catalog = TempCatalog::sample();
        let (dex, errors) = catalog
            .open()
            .load(&sample_grammar(), DexConfig::default())
            .unwrap();
        assert!(errors.is_empty());
        assert_eq!(dex.len(), SAMPLE_CATALOG.len());
    }

    #[test]
    fn registry_round_trips_through_json() {
        let catalog = TempCatalog::with_lines(&[]);
        let path = catalog.write_registry();
        let text = fs::read_to_string(path).unwrap();
        let registry: StaticRegistry = serde_json::from_str(&text).unwrap();
        assert_eq!(registry, sample_registry());
        assert!(catalog.contents().is_empty());
    }
}
