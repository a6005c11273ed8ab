//! CLI command implementations.

pub mod grep;
pub mod shelve;
pub mod sort;
pub mod stats;
pub mod subtract;
pub mod verify;

use pinkdex_codec::{ShelfcodeGrammar, StaticRegistry};
use pinkdex_core::{read_catalog, CoreError, CoreResult, Dex, DexConfig};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::warn;

/// Compiles the shelfcode grammar from a JSON registry file, or from the
/// built-in registry when none is given.
pub fn load_grammar(registry: Option<&Path>) -> CoreResult<ShelfcodeGrammar> {
    let registry = match registry {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| {
                CoreError::invalid_registry(format!("{}: {e}", path.display()))
            })?;
            serde_json::from_str::<StaticRegistry>(&text).map_err(|e| {
                CoreError::invalid_registry(format!("{}: {e}", path.display()))
            })?
        }
        None => StaticRegistry::default(),
    };
    Ok(ShelfcodeGrammar::from_registry(&registry)?)
}

/// Loads a catalog for reading without taking its lock.
///
/// Rejected lines are logged and skipped.
pub fn read_only(path: &Path, grammar: &ShelfcodeGrammar) -> CoreResult<Dex> {
    let reader = BufReader::new(File::open(path)?);
    let (dex, errors) = read_catalog(reader, grammar, DexConfig::default())?;
    if !errors.is_empty() {
        warn!(
            path = %path.display(),
            rejected = errors.len(),
            "skipped unreadable lines; run `pinkdex verify` for details"
        );
    }
    Ok(dex)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinkdex_testkit::TempCatalog;

    #[test]
    fn default_grammar() {
        let grammar = load_grammar(None).unwrap();
        assert!(grammar.is_known("C/P"));
    }

    #[test]
    fn grammar_from_file() {
        let catalog = TempCatalog::with_lines(&[]);
        let path = catalog.dir().join("codes.json");
        fs::write(&path, r#"{"atomic": ["X"], "double": ["Q"]}"#).unwrap();

        let grammar = load_grammar(Some(&path)).unwrap();
        assert!(grammar.is_known("X"));
        assert!(!grammar.is_known("P"));
    }

    #[test]
    fn bad_registry_file() {
        let catalog = TempCatalog::with_lines(&[]);
        let path = catalog.dir().join("codes.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            load_grammar(Some(&path)),
            Err(CoreError::InvalidRegistry { .. })
        ));
        assert!(matches!(
            load_grammar(Some(&catalog.dir().join("missing.json"))),
            Err(CoreError::InvalidRegistry { .. })
        ));
    }

    #[test]
    fn read_only_skips_bad_lines() {
        let catalog = TempCatalog::with_lines(&["A<B<<P", "garbage"]);
        let dex = read_only(catalog.path(), &load_grammar(None).unwrap()).unwrap();
        assert_eq!(dex.len(), 1);
    }
}
