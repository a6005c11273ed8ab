//! Grep command implementation.

use super::read_only;
use pinkdex_codec::ShelfcodeGrammar;
use std::path::Path;

/// Matching lines, formatted, in sort order.
pub fn grep(
    path: &Path,
    grammar: &ShelfcodeGrammar,
    pattern: &str,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut dex = read_only(path, grammar)?;
    dex.sort();
    let hits = dex.grep(pattern)?;
    Ok(hits.into_iter().map(ToString::to_string).collect())
}

/// Runs the grep command.
pub fn run(
    path: &Path,
    grammar: &ShelfcodeGrammar,
    pattern: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in grep(path, grammar, pattern)? {
        println!("{line}");
    }
    Ok(())
}
