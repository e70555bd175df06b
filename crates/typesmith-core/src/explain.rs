//! The driver: iterates a unit's name index and emits every candidate.
//!
//! Failures are isolated per root: a recoverable error becomes a diagnostic
//! comment in the output stream and the loop moves on. Only I/O and decode
//! errors stop the run.

use std::io::Write;

use tracing::debug;

use crate::emit::{EmitState, Emitter};
use crate::entry::EntryId;
use crate::error::Result;
use crate::unit::UnitIndex;

/// Emit declarations for every indexed name, in insertion order.
///
/// Equivalent to [`explain_filtered`] with a filter that keeps every
/// candidate.
pub fn explain<W: Write>(unit: &UnitIndex, state: &mut EmitState, out: &mut W) -> Result<()>
{
    explain_filtered(unit, state, out, |_, candidates, _| candidates.to_vec())
}

/// Emit declarations for every indexed name, letting `filter` prune,
/// reorder or dedup the candidate set per name.
///
/// The filter sees the name, its candidates and a read-only view of the
/// emission state, and returns the candidates to actually emit.
pub fn explain_filtered<W, F>(unit: &UnitIndex, state: &mut EmitState, out: &mut W, mut filter: F) -> Result<()>
where
    W: Write,
    F: FnMut(&str, &[EntryId], &EmitState) -> Vec<EntryId>,
{
    for name in unit.names() {
        let selected = filter(name, unit.candidates(name), state);
        for id in selected {
            if let Err(err) = Emitter::new(unit, state, out).track(Some(id)) {
                if !err.is_recoverable() {
                    return Err(err);
                }
                debug!(name = %name, error = %err, "skipping candidate");
                writeln!(
                    out,
                    "/* skipped {} '{}' at {}: {} */",
                    unit.entry(id).kind,
                    name,
                    unit.src_location(id),
                    err
                )?;
            }
        }
    }
    Ok(())
}
