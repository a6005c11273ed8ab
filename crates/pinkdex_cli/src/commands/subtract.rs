//! Subtract command implementation.

use super::read_only;
use pinkdex_codec::ShelfcodeGrammar;
use std::path::Path;

/// What would remain of `path` after removing `other`'s holdings,
/// formatted, in sort order.
pub fn subtract(
    path: &Path,
    other: &Path,
    grammar: &ShelfcodeGrammar,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mine = read_only(path, grammar)?;
    let theirs = read_only(other, grammar)?;
    let mut remaining = mine.sub(&theirs)?;
    Ok(remaining.sorted().map(ToString::to_string).collect())
}

/// Runs the subtract command.
pub fn run(
    path: &Path,
    other: &Path,
    grammar: &ShelfcodeGrammar,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in subtract(path, other, grammar)? {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinkdex_testkit::{sample_grammar, TempCatalog};

    #[test]
    fn removes_other_holdings() {
        let mine = TempCatalog::with_lines(&["A<B<<P:2", "C<D<<H", "E<F<<L"]);
        let theirs = TempCatalog::with_lines(&["A<B<<P", "C<D<<H", "X<Y<<P"]);
        let remaining = subtract(mine.path(), theirs.path(), &sample_grammar()).unwrap();
        assert_eq!(remaining, ["A<B<<P", "E<F<<L"]);
    }
}
