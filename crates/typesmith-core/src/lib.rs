//! # typesmith-core
//!
//! Reconstructs source-level C type declarations from the type graph in a
//! binary's DWARF debug information, producing a synthetic header that
//! mirrors the compiled memory layout (field byte offsets, aggregate sizes).
//!
//! The pipeline:
//! - [`dwarf`] decodes the binary into per-unit entry arenas (the only
//!   byte-level layer)
//! - [`unit`] indexes one unit's type graph (offset and name lookups)
//! - [`declare`] synthesizes declarator text for arbitrarily nested type
//!   shapes
//! - [`emit`] prints declarations dependency-first, deduplicated, breaking
//!   cycles with forward declarations
//! - [`explain`] drives emission across a unit's name index, isolating
//!   per-root failures as diagnostic comments
//!
//! Partial output is the expected success mode: real debug info routinely
//! contains constructs (bit-fields, compiler-synthetic types) this tool does
//! not model, and those surface as `/* skipped ... */` comments rather than
//! failures of the run.

pub mod declare;
pub mod dwarf;
pub mod emit;
pub mod entry;
pub mod error;
pub mod explain;
pub mod unit;

pub use declare::declare;
pub use dwarf::load_units;
pub use emit::{EmitState, Emitter, Progress};
pub use entry::{CompilationUnit, Entry, EntryId, EntryKind, GlobalOffset};
pub use error::{Result, TypesmithError};
pub use explain::{explain, explain_filtered};
pub use unit::UnitIndex;

/// Cap on type-chain recursion in both synthesis and emission.
///
/// Debug info can legally nest pointer/array/qualifier chains far deeper
/// than any real C source would; past this depth the walk fails with
/// [`TypesmithError::DepthExceeded`] instead of exhausting the call stack.
pub const MAX_DEPTH: usize = 64;
