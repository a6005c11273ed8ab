//! Verify command implementation.

use pinkdex_codec::ShelfcodeGrammar;
use pinkdex_core::{CatalogFile, DexConfig};
use std::path::Path;

/// Verification result.
#[derive(Debug)]
pub struct VerifyResult {
    /// Number of distinct entries loaded.
    pub entries: usize,
    /// Number of rejected lines.
    pub rejected: usize,
    /// One message per problem found.
    pub errors: Vec<String>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.rejected == 0 && self.errors.is_empty()
    }
}

/// Loads the catalog under its lock and checks every line and index.
pub fn verify(
    path: &Path,
    grammar: &ShelfcodeGrammar,
) -> Result<VerifyResult, Box<dyn std::error::Error>> {
    let catalog = CatalogFile::open(path)?;
    let (dex, line_errors) = catalog.load(grammar, DexConfig::default())?;

    let mut errors: Vec<String> = line_errors.iter().map(ToString::to_string).collect();
    if let Err(e) = dex.check_consistency() {
        errors.push(e.to_string());
    }

    Ok(VerifyResult {
        entries: dex.len(),
        rejected: line_errors.len(),
        errors,
    })
}

/// Runs the verify command.
pub fn run(path: &Path, grammar: &ShelfcodeGrammar) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying catalog at {:?}", path);
    println!();

    let result = verify(path, grammar)?;
    println!("  Entries:  {}", result.entries);
    println!("  Rejected: {}", result.rejected);
    for error in &result.errors {
        println!("    - {error}");
    }

    println!();
    if result.is_ok() {
        println!("✓ Catalog verification passed");
        Ok(())
    } else {
        println!("✗ Catalog verification failed");
        Err("Verification failed".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinkdex_testkit::{sample_grammar, TempCatalog};

    #[test]
    fn clean_catalog_passes() {
        let catalog = TempCatalog::sample();
        let result = verify(catalog.path(), &sample_grammar()).unwrap();
        assert!(result.is_ok());
        assert_eq!(result.entries, pinkdex_testkit::SAMPLE_CATALOG.len());
    }

    #[test]
    fn bad_lines_are_listed() {
        let catalog = TempCatalog::with_lines(&["A<B<<P", "A<B", "C<D<<ZZ"]);
        let result = verify(catalog.path(), &sample_grammar()).unwrap();
        assert!(!result.is_ok());
        assert_eq!(result.rejected, 2);
        assert!(result.errors[0].starts_with("line 2:"));
        assert!(result.errors[1].starts_with("line 3:"));
        assert!(run(catalog.path(), &sample_grammar()).is_err());
    }
}
