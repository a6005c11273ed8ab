//! Shelve command implementation.

use super::read_only;
use pinkdex_codec::ShelfcodeGrammar;
use std::path::Path;

/// Lines on one shelf, formatted, in physical order.
pub fn shelve(
    path: &Path,
    grammar: &ShelfcodeGrammar,
    shelfcode: &str,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let dex = read_only(path, grammar)?;
    let shelf = dex.shelved(shelfcode, grammar)?;
    Ok(shelf.into_iter().map(ToString::to_string).collect())
}

/// Runs the shelve command.
pub fn run(
    path: &Path,
    grammar: &ShelfcodeGrammar,
    shelfcode: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in shelve(path, grammar, shelfcode)? {
        println!("{line}");
    }
    Ok(())
}
