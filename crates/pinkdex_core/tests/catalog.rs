//! End-to-end catalog tests: load, query, edit, save, reload.

use pinkdex_codec::{DexLine, Editions, ShelfcodeGrammar, StaticRegistry};
use pinkdex_core::reconcile::replace;
use pinkdex_core::{CatalogFile, CoreError, Dex, DexConfig};
use std::fs;
use tempfile::tempdir;

fn grammar() -> ShelfcodeGrammar {
    ShelfcodeGrammar::from_registry(&StaticRegistry::default()).unwrap()
}

fn formatted<'a>(lines: impl IntoIterator<Item = &'a DexLine>) -> Vec<String> {
    lines.into_iter().map(ToString::to_string).collect()
}

const CATALOG: &str = "\
ZELAZNY, ROGER<LORD OF LIGHT<<P
ASIMOV, ISAAC<FOUNDATION AND EMPIRE<@FOUNDATION #2<P
ASIMOV, ISAAC<FOUNDATION<@FOUNDATION #1<P:2,H

GAIMAN, NEIL|PRATCHETT, TERRY<GOOD OMENS<<PA
BROKEN LINE WITHOUT FIELDS
MCCAFFREY, ANNE=MACCAFFREY, ANNE<DRAGONFLIGHT<PERN #1<L
SOMEONE<SOMETHING<<NOSUCHCODE
";

#[test]
fn load_edit_save_reload() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("pinkdex");
    fs::write(&path, CATALOG).unwrap();
    let grammar = grammar();

    let catalog = CatalogFile::open(&path).unwrap();
    let (mut dex, errors) = catalog.load(&grammar, DexConfig::default()).unwrap();

    let rejected: Vec<usize> = errors.iter().map(|e| e.line_number).collect();
    assert_eq!(rejected, [6, 8]);
    assert_eq!(dex.len(), 5);
    dex.check_consistency().unwrap();

    // a copy leaves, another arrives
    dex.add(DexLine::parse("ZELAZNY, ROGER<LORD OF LIGHT<<P:-1", &grammar).unwrap())
        .unwrap();
    dex.add(DexLine::parse("BRIN, DAVID<STARTIDE RISING<UPLIFT #2<H", &grammar).unwrap())
        .unwrap();

    catalog.save(&mut dex, |_| {}).unwrap();
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "\
ASIMOV, ISAAC<FOUNDATION<@FOUNDATION #1<H,P:2
ASIMOV, ISAAC<FOUNDATION AND EMPIRE<@FOUNDATION #2<P
BRIN, DAVID<STARTIDE RISING<UPLIFT #2<H
GAIMAN, NEIL|PRATCHETT, TERRY<GOOD OMENS<<PA
MCCAFFREY, ANNE=MACCAFFREY, ANNE<DRAGONFLIGHT<PERN #1<L
"
    );
    drop(catalog);

    let (reloaded, errors) = CatalogFile::open(&path)
        .unwrap()
        .load(&grammar, DexConfig::default())
        .unwrap();
    assert!(errors.is_empty());
    assert_eq!(reloaded.stats(), dex.stats());
}

#[test]
fn locked_catalog_refuses_second_writer() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("pinkdex");
    let _held = CatalogFile::open(&path).unwrap();
    assert!(matches!(
        CatalogFile::open(&path),
        Err(CoreError::CatalogLocked)
    ));
}

#[test]
fn subtracting_a_shipment() {
    let grammar = grammar();
    let parse = |lines: &[&str]| {
        Dex::from_lines(
            lines.iter().map(|s| DexLine::parse(s, &grammar).unwrap()),
            DexConfig::default(),
        )
        .unwrap()
    };
    let holdings = parse(&["A<B<<P:3,H", "C<D<<L", "E<F<<P"]);
    let shipment = parse(&["A<B<<P", "C<D<<L"]);

    let mut remaining = holdings.sub(&shipment).unwrap();
    assert_eq!(formatted(remaining.sorted()), ["A<B<<H,P:2", "E<F<<P"]);
    remaining.check_consistency().unwrap();
}

#[test]
fn shelf_listing_and_search() {
    let grammar = grammar();
    let dex = Dex::from_lines(
        CATALOG
            .lines()
            .filter_map(|s| DexLine::parse(s, &grammar).ok()),
        DexConfig::default(),
    )
    .unwrap();

    assert_eq!(
        formatted(dex.shelved("P", &grammar).unwrap()),
        [
            "ASIMOV, ISAAC<FOUNDATION<@FOUNDATION #1<H,P:2",
            "ASIMOV, ISAAC<FOUNDATION AND EMPIRE<@FOUNDATION #2<P",
            "ZELAZNY, ROGER<LORD OF LIGHT<<P",
        ]
    );
    assert_eq!(
        formatted(dex.grep("asimov<<found<h").unwrap()),
        ["ASIMOV, ISAAC<FOUNDATION<@FOUNDATION #1<H,P:2"]
    );
    assert_eq!(dex.grep("pratchett").unwrap().len(), 1);
}

#[test]
fn editing_a_line_produces_a_replayable_patch() {
    let grammar = grammar();
    let old = DexLine::parse("GAIMAN, NEIL|PRATCHETT, TERRY<GOOD OMENS<<PA", &grammar).unwrap();
    let new = DexLine::parse(
        "PRATCHETT, TERRY|GAIMAN, NEIL<GOOD OMENS|NICE AND ACCURATE PROPHECIES<<PA,H",
        &grammar,
    )
    .unwrap();

    let patch = replace(&old, &new);
    assert!(!patch.is_codes_only());
    assert_eq!(patch.codes, Editions::parse("PA,H", &grammar).unwrap());
    assert_eq!(patch.apply(&old).unwrap().to_string(), new.to_string());
}
