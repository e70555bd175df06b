//! Dependency-ordered declaration emission.
//!
//! [`Emitter::track`] walks a root entry's dependency graph and prints every
//! declaration it needs, dependencies first, each full definition at most
//! once. Cycles through aggregates are broken by forward declarations: a
//! pointer dependency is satisfied once its pointee is at least declared,
//! which is what lets self-referential and mutually-referential structs
//! terminate.
//!
//! [`EmitState`] is the only shared mutable structure. It is caller-owned
//! and explicitly threaded, so dedup can span every compilation unit of a
//! binary when the caller wants it to.

use std::collections::HashMap;
use std::io::Write;

use crate::declare::declare;
use crate::entry::{EntryId, EntryKind, GlobalOffset};
use crate::error::{Result, TypesmithError};
use crate::unit::UnitIndex;
use crate::MAX_DEPTH;

/// How far an entry's emission has progressed.
///
/// Monotonic: `Declared` may become `Defined`, never the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress
{
    /// Only a forward declaration has been printed.
    Declared,
    /// The full definition has been printed (or the entry needs none).
    Defined,
}

/// Dedup and cycle-breaking state for one or more emission passes.
#[derive(Debug, Default)]
pub struct EmitState
{
    entries: HashMap<GlobalOffset, Progress>,
    tags: HashMap<String, GlobalOffset>,
}

impl EmitState
{
    pub fn new() -> Self
    {
        EmitState::default()
    }

    /// Progress of an entry, by its cross-unit identity.
    pub fn progress(&self, at: GlobalOffset) -> Option<Progress>
    {
        self.entries.get(&at).copied()
    }

    /// Whether a tag name has already been claimed by a full definition.
    pub fn tag_defined(&self, tag: &str) -> bool
    {
        self.tags.contains_key(tag)
    }

    fn tag_holder(&self, tag: &str) -> Option<GlobalOffset>
    {
        self.tags.get(tag).copied()
    }

    /// A tag name, once claimed, is never redefined by a different entry
    /// instance. Multiple units describing the same type thus collide here,
    /// not in the output.
    fn claim_tag(&mut self, tag: String, at: GlobalOffset)
    {
        self.tags.entry(tag).or_insert(at);
    }

    fn mark_defined(&mut self, at: GlobalOffset)
    {
        self.entries.insert(at, Progress::Defined);
    }

    /// Never downgrades an entry that is already fully defined.
    fn mark_declared(&mut self, at: GlobalOffset)
    {
        if self.progress(at) != Some(Progress::Defined) {
            self.entries.insert(at, Progress::Declared);
        }
    }
}

/// What one `track_at` call did to the entry, deciding its final state.
enum Outcome
{
    Defined,
    DeclaredOnly,
    Untouched,
}

/// Walks one root's dependency graph, writing declarations to `out`.
pub struct Emitter<'a, W: Write>
{
    unit: &'a UnitIndex,
    state: &'a mut EmitState,
    out: &'a mut W,
}

impl<'a, W: Write> Emitter<'a, W>
{
    pub fn new(unit: &'a UnitIndex, state: &'a mut EmitState, out: &'a mut W) -> Self
    {
        Emitter { unit, state, out }
    }

    /// Print every declaration `entry` depends on, then its own.
    ///
    /// Recoverable failures abort only this root; the state mutations made
    /// for dependencies that did emit are kept, so their definitions are not
    /// repeated by later roots.
    pub fn track(&mut self, entry: Option<EntryId>) -> Result<()>
    {
        self.track_at(entry, 0, false)
    }

    fn track_at(&mut self, entry: Option<EntryId>, depth: usize, allow_incomplete: bool) -> Result<()>
    {
        if depth >= MAX_DEPTH {
            return Err(TypesmithError::DepthExceeded(MAX_DEPTH));
        }
        let Some(id) = entry else {
            return Ok(());
        };

        let unit = self.unit;
        let at = unit.global_offset(id);
        match self.state.progress(at) {
            Some(Progress::Defined) => return Ok(()),
            Some(Progress::Declared) if allow_incomplete => return Ok(()),
            _ => {}
        }

        let entry = unit.entry(id);
        let outcome = match &entry.kind {
            // Base types need no declaration of their own.
            EntryKind::Base => Outcome::Defined,

            EntryKind::Subprogram | EntryKind::Subroutine => {
                self.track_at(unit.type_of(id), depth + 1, false)?;
                for &child in &entry.children {
                    if unit.entry(child).kind != EntryKind::FormalParameter {
                        continue;
                    }
                    self.track_at(unit.type_of(child), depth + 1, false)
                        .map_err(|err| err.context("formal-parameter"))?;
                }
                Outcome::Defined
            }

            // A pointer is satisfied by a forward declaration of its
            // pointee; this is the cycle breaker.
            EntryKind::Pointer => {
                self.track_at(unit.type_of(id), depth + 1, true)
                    .map_err(|err| err.context("pointer"))?;
                Outcome::Defined
            }

            EntryKind::Const | EntryKind::Volatile | EntryKind::Restrict | EntryKind::Atomic => {
                self.track_at(unit.type_of(id), depth + 1, allow_incomplete)?;
                Outcome::Defined
            }

            EntryKind::Reference => {
                self.track_at(unit.type_of(id), depth + 1, false)
                    .map_err(|err| err.context("reference"))?;
                Outcome::Defined
            }
            EntryKind::RvalueReference => {
                self.track_at(unit.type_of(id), depth + 1, false)
                    .map_err(|err| err.context("rvalue"))?;
                Outcome::Defined
            }

            EntryKind::Typedef => {
                let aliased = unit.type_of(id);
                self.track_at(aliased, depth + 1, false)
                    .map_err(|err| err.context("typedef"))?;
                let name = unit.given_name(id)?.map(str::to_owned);
                let decl = declare(unit, aliased, name.as_deref())?;
                writeln!(self.out)?;
                writeln!(self.out, "/* @ {} */", unit.src_location(id))?;
                writeln!(self.out, "typedef {decl};")?;
                Outcome::Defined
            }

            EntryKind::Struct | EntryKind::Class | EntryKind::Union => {
                self.track_aggregate(id, depth, allow_incomplete)?
            }

            EntryKind::Array => {
                self.track_at(unit.type_of(id), depth + 1, false)?;
                Outcome::Defined
            }

            EntryKind::Enum => self.track_enum(id)?,

            other => return Err(TypesmithError::IncompatibleEntry(other.to_string())),
        };

        match outcome {
            Outcome::Defined => self.state.mark_defined(at),
            Outcome::DeclaredOnly => self.state.mark_declared(at),
            Outcome::Untouched => {}
        }
        Ok(())
    }

    fn track_aggregate(&mut self, id: EntryId, depth: usize, allow_incomplete: bool) -> Result<Outcome>
    {
        let unit = self.unit;

        if allow_incomplete {
            let decl = declare(unit, Some(id), None)?;
            writeln!(self.out, "{decl};")?;
            return Ok(Outcome::DeclaredOnly);
        }

        let entry = unit.entry(id);
        if entry.declaration {
            // Declaration-only entries carry no layout; whoever needs the
            // tag by value will find a defining entry elsewhere.
            return Ok(Outcome::Untouched);
        }

        let tag = unit.tag_name(id)?;
        if self.state.tag_holder(&tag).is_some() {
            return Ok(Outcome::Untouched);
        }
        let size = entry
            .byte_size
            .ok_or_else(|| TypesmithError::MissingByteSize(tag.clone()))?;

        let at = unit.global_offset(id);
        self.state.claim_tag(tag, at);
        // Defined before member recursion, so a member referencing this
        // aggregate (directly or through a pointer) short-circuits.
        self.state.mark_defined(at);

        let mut members = Vec::new();
        for &child in &entry.children {
            let member = unit.entry(child);
            if member.kind != EntryKind::Member {
                continue;
            }
            let Some(location) = member.member_offset else {
                continue;
            };
            let mtype = unit.type_of(child);
            let mname = match unit.given_name(child) {
                Ok(name) => name.map(str::to_owned),
                Err(err) => return Err(err.context(member_context(unit, mtype, None))),
            };
            if let Err(err) = self.track_at(mtype, depth + 1, false) {
                return Err(err.context(member_context(unit, mtype, mname.as_deref())));
            }
            let decl = declare(unit, mtype, mname.as_deref())?;
            members.push(format!("\t{decl};\t/* +0x{location:x} */"));
        }

        writeln!(self.out)?;
        writeln!(self.out, "/* @ {} */", unit.src_location(id))?;
        let head = declare(unit, Some(id), None)?;
        writeln!(self.out, "{head} {{\t/* size=0x{size:x} */")?;
        if members.is_empty() {
            if size > 0 {
                writeln!(self.out, "\tchar dummy[0x{size:x}];")?;
            }
        } else {
            for line in &members {
                writeln!(self.out, "{line}")?;
            }
        }
        writeln!(self.out, "}};")?;
        Ok(Outcome::Defined)
    }

    fn track_enum(&mut self, id: EntryId) -> Result<Outcome>
    {
        let unit = self.unit;
        let entry = unit.entry(id);

        let tag = unit.tag_name(id)?;
        if self.state.tag_holder(&tag).is_some() {
            return Ok(Outcome::Untouched);
        }
        self.state.claim_tag(tag, unit.global_offset(id));

        let mut enumerators = Vec::new();
        for &child in &entry.children {
            let enumerator = unit.entry(child);
            if enumerator.kind != EntryKind::Enumerator {
                continue;
            }
            let name = unit
                .given_name(child)?
                .ok_or_else(|| TypesmithError::MissingName(enumerator.kind.to_string()))?;
            match enumerator.const_value {
                Some(value) => enumerators.push(format!("\t{name} = {value}")),
                None => enumerators.push(format!("\t{name}")),
            }
        }

        let head = declare(unit, Some(id), None)?;
        writeln!(self.out, "{head} {{")?;
        if !enumerators.is_empty() {
            writeln!(self.out, "{}", enumerators.join(",\n"))?;
        }
        writeln!(self.out, "}};")?;
        Ok(Outcome::Defined)
    }
}

fn member_context(unit: &UnitIndex, mtype: Option<EntryId>, name: Option<&str>) -> String
{
    let kind = match mtype {
        Some(id) => unit.entry(id).kind.to_string(),
        None => "void".to_string(),
    };
    format!("failed to track a member {kind} {}", name.unwrap_or("??"))
}
