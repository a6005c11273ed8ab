//! # Pinkdex Testkit
//!
//! Test utilities for the pinkdex.
//!
//! This crate provides:
//! - Fixtures: a sample registry and catalog, temporary catalog files
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```
//! use pinkdex_testkit::prelude::*;
//!
//! let dex = sample_dex();
//! assert_eq!(dex.len(), SAMPLE_CATALOG.len());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
