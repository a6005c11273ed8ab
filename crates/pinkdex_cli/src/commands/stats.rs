//! Stats command implementation.

use super::read_only;
use pinkdex_codec::ShelfcodeGrammar;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Catalog statistics.
#[derive(Debug, Serialize)]
pub struct StatsResult {
    /// Catalog path.
    pub path: String,
    /// Number of distinct titles.
    pub entries: usize,
    /// Signed copy total across all shelfcodes.
    pub copies: i64,
    /// Signed copy totals per shelfcode.
    pub shelfcodes: BTreeMap<String, i64>,
}

/// Computes catalog statistics.
pub fn stats(
    path: &Path,
    grammar: &ShelfcodeGrammar,
) -> Result<StatsResult, Box<dyn std::error::Error>> {
    let dex = read_only(path, grammar)?;
    let shelfcodes = dex.stats();
    Ok(StatsResult {
        path: path.display().to_string(),
        entries: dex.len(),
        copies: shelfcodes.values().fold(0, |sum, n| sum.saturating_add(*n)),
        shelfcodes,
    })
}

/// Runs the stats command.
pub fn run(
    path: &Path,
    grammar: &ShelfcodeGrammar,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = stats(path, grammar)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn print_text_output(result: &StatsResult) {
    println!("Catalog: {}", result.path);
    println!();
    println!("  Entries: {}", result.entries);
    println!("  Copies:  {}", result.copies);
    println!();
    for (code, total) in &result.shelfcodes {
        println!("  {code:<6} {total:>6}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinkdex_testkit::{sample_grammar, TempCatalog};

    #[test]
    fn totals_per_code() {
        let catalog = TempCatalog::sample();
        let result = stats(catalog.path(), &sample_grammar()).unwrap();

        assert_eq!(result.entries, 7);
        assert_eq!(result.shelfcodes["P"], 5);
        assert_eq!(result.shelfcodes["D"], 2);
        assert_eq!(result.copies, 11);
    }

    #[test]
    fn json_shape() {
        let catalog = TempCatalog::with_lines(&["A<B<<P:2,H"]);
        let result = stats(catalog.path(), &sample_grammar()).unwrap();
        let json: serde_json::Value = serde_json::to_value(&result).unwrap();

        assert_eq!(json["entries"], 1);
        assert_eq!(json["copies"], 3);
        assert_eq!(json["shelfcodes"]["P"], 2);
    }
}
