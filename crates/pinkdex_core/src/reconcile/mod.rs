//! Reconciliation of edited lines against stored ones.
//!
//! When a line is edited, the store holding it is updated positionally
//! rather than rewritten: [`diff`] finds the minimal opcodes between the
//! old and new value lists, and [`replace`] turns those into a
//! [`LinePatch`] of delete, renumber and insert steps per field.
//! [`LinePatch::apply`] replays a patch against the old line and must
//! reproduce the new one.
//!
//! ```
//! use pinkdex_codec::{DexLine, ShelfcodeGrammar, StaticRegistry};
//! use pinkdex_core::reconcile::replace;
//!
//! let grammar = ShelfcodeGrammar::from_registry(&StaticRegistry::default()).unwrap();
//! let old = DexLine::parse("A|B|C<T<<P", &grammar).unwrap();
//! let new = DexLine::parse("A|C<T<<P,H", &grammar).unwrap();
//!
//! let patch = replace(&old, &new);
//! assert_eq!(patch.apply(&old).unwrap().to_string(), new.to_string());
//! ```

mod diff;
mod patch;

pub use diff::{diff, OpTag, Opcode};
pub use patch::{replace, unfold_sortby_pair, Field, FieldOp, LinePatch};
