//! # Pinkdex Codec
//!
//! Text codec for the pinkdex, the catalog of a library's physical book
//! collection.
//!
//! This crate provides:
//! - [`Edition`] / [`Editions`]: per-shelfcode copy counts with closed
//!   arithmetic for reconciling additions and removals
//! - [`DexLine`]: one catalog entry, parsed from and formatted to the
//!   four-field line format
//! - [`sanitize`]: the normalization behind catalog order and shelf order
//! - [`ShelfcodeGrammar`]: the matcher for edition tokens, compiled from a
//!   [`ShelfcodeRegistry`]
//!
//! ## Line Format
//!
//! ```text
//! AUTHORS<TITLES<SERIES<CODES
//! ```
//!
//! Parsing followed by formatting reproduces the input, modulo case in the
//! codes field and surrounding whitespace.
//!
//! ## Usage
//!
//! ```
//! use pinkdex_codec::{DexLine, ShelfcodeGrammar, StaticRegistry};
//!
//! let grammar = ShelfcodeGrammar::from_registry(&StaticRegistry::default()).unwrap();
//! let line = DexLine::parse("HERBERT, FRANK<DUNE<<P:2,H", &grammar).unwrap();
//!
//! assert_eq!(line.codes().total(), 3);
//! assert_eq!(line.to_string(), "HERBERT, FRANK<DUNE<<H,P:2");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod edition;
mod error;
mod line;
mod shelfcode;
mod sortkey;

pub use edition::{Edition, Editions, MAX_COUNT};
pub use error::{CodecError, CodecResult};
pub use line::{
    DexLine, LineKey, ShelfKey, SortKey, FIELD_SEPARATOR, LIST_SEPARATOR, SERIES_VISIBLE_MARKER,
};
pub use shelfcode::{Classified, ShelfcodeGrammar, ShelfcodeRegistry, StaticRegistry};
pub use sortkey::{sanitize, sortby_text, split_sortby, NUMBER_WIDTH};
