//! Sort command implementation.

use pinkdex_codec::ShelfcodeGrammar;
use pinkdex_core::{CatalogFile, DexConfig};
use std::path::Path;
use tracing::info;

/// Loads, sorts and atomically rewrites the catalog.
///
/// Refuses to save over rejected lines unless `force` is set, since they
/// would be lost. Returns the number of entries written.
pub fn sort(
    path: &Path,
    grammar: &ShelfcodeGrammar,
    force: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let catalog = CatalogFile::open(path)?;
    let (mut dex, errors) = catalog.load(grammar, DexConfig::default())?;

    if !errors.is_empty() && !force {
        return Err(format!(
            "{} line(s) rejected; fix them or pass --force to drop them",
            errors.len()
        )
        .into());
    }

    catalog.save(&mut dex, |written| info!(written, "saving"))?;
    Ok(dex.len())
}

/// Runs the sort command.
pub fn run(
    path: &Path,
    grammar: &ShelfcodeGrammar,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let written = sort(path, grammar, force)?;
    println!("Sorted {written} entries in {:?}", path);
    Ok(())
}
