//! # Pinkdex Core
//!
//! Catalog engine for the pinkdex.
//!
//! This crate provides:
//! - [`Dex`]: the indexed collection of catalog lines, with merge
//!   semantics for additions and removals
//! - [`GrepPattern`]: field-aware search
//! - [`reconcile`]: minimal positional patches between line versions
//! - [`CatalogFile`]: locked loading and atomic saving of catalog files
//!
//! ## Usage
//!
//! ```
//! use pinkdex_codec::{DexLine, ShelfcodeGrammar, StaticRegistry};
//! use pinkdex_core::{Dex, DexConfig};
//!
//! let grammar = ShelfcodeGrammar::from_registry(&StaticRegistry::default()).unwrap();
//! let mut dex = Dex::new(DexConfig::default());
//! dex.add(DexLine::parse("HERBERT, FRANK<DUNE<<P", &grammar).unwrap()).unwrap();
//! dex.add(DexLine::parse("HERBERT, FRANK<DUNE<<P", &grammar).unwrap()).unwrap();
//!
//! assert_eq!(dex.len(), 1);
//! assert_eq!(dex.stats()["P"], 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod config;
mod dex;
mod error;
pub mod reconcile;

pub use catalog::{read_catalog, CatalogFile, LineError};
pub use config::{DexConfig, DEFAULT_PROGRESS_INTERVAL};
pub use dex::{AddOutcome, Dex, FieldIndex, GrepPattern, LineId};
pub use error::{CoreError, CoreResult};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
