//! Per-unit type-graph indexing.
//!
//! [`UnitIndex`] wraps one decoded [`CompilationUnit`] with the two lookup
//! structures the rest of the core needs: an offset→entry resolution table
//! over every entry, and a name→entries index (first-seen order) over the
//! named-type category only. Units whose declared source language is not in
//! the supported C family get an empty index, so they contribute nothing to
//! the output without being an error.

use std::collections::HashMap;

use gimli::{constants, DwLang};
use tracing::warn;

use crate::entry::{CompilationUnit, Entry, EntryId, GlobalOffset};
use crate::error::{Result, TypesmithError};

/// Source languages whose units are indexed.
///
/// Everything else (C++, Rust, Fortran, ...) is skipped wholesale; this tool
/// reconstructs C declarations and would only mangle other type systems.
pub const SUPPORTED_LANGUAGES: &[DwLang] = &[
    constants::DW_LANG_C,
    constants::DW_LANG_C89,
    constants::DW_LANG_C99,
    constants::DW_LANG_C11,
    constants::DW_LANG_C17,
];

/// Whether a name can appear as-is in a reconstructed C header.
///
/// ASCII letters, digits, underscore and space only. Base-type names like
/// `unsigned int` are why space is allowed.
pub fn is_valid_identifier(name: &str) -> bool
{
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ' ')
}

/// Offset and name indices over one compilation unit's type graph.
pub struct UnitIndex
{
    unit: CompilationUnit,
    by_offset: HashMap<u64, EntryId>,
    names: Vec<String>,
    by_name: HashMap<String, Vec<EntryId>>,
}

impl UnitIndex
{
    /// Build the indices for one unit.
    ///
    /// A single pre-order pass over the entry tree: every entry lands in the
    /// offset table; named-category entries with a valid explicit name land
    /// in the name index. An invalid explicit name skips only that entry's
    /// naming (logged, traversal continues). Unsupported-language units
    /// yield an empty index.
    pub fn new(unit: CompilationUnit) -> Self
    {
        let mut index = UnitIndex {
            unit,
            by_offset: HashMap::new(),
            names: Vec::new(),
            by_name: HashMap::new(),
        };

        let supported = index
            .unit
            .language
            .is_some_and(|lang| SUPPORTED_LANGUAGES.contains(&lang));
        if !supported {
            return index;
        }

        let Some(root) = index.unit.root() else {
            return index;
        };

        // Explicit work stack; entry trees can nest arbitrarily deep.
        let mut work = vec![root];
        while let Some(id) = work.pop() {
            let entry = &index.unit.entries[id.0];
            index.by_offset.insert(entry.offset, id);

            if entry.kind.is_named_type() {
                match &entry.name {
                    Some(name) if is_valid_identifier(name) => {
                        let slot = index.by_name.entry(name.clone()).or_insert_with(|| {
                            index.names.push(name.clone());
                            Vec::new()
                        });
                        if !slot.contains(&id) {
                            slot.push(id);
                        }
                    }
                    Some(name) => {
                        warn!(unit = %index.unit.path, name = %name, kind = %entry.kind,
                              "skipping invalid explicit name");
                    }
                    None => {}
                }
            }

            for &child in entry.children.iter().rev() {
                work.push(child);
            }
        }

        index
    }

    /// Full path of the unit's main source file.
    pub fn path(&self) -> &str
    {
        &self.unit.path
    }

    /// Whether the unit contributed anything to the indices.
    pub fn is_empty(&self) -> bool
    {
        self.by_offset.is_empty()
    }

    pub fn entry(&self, id: EntryId) -> &Entry
    {
        &self.unit.entries[id.0]
    }

    /// Resolve a unit-local offset to its entry.
    pub fn resolve(&self, offset: u64) -> Option<EntryId>
    {
        self.by_offset.get(&offset).copied()
    }

    /// Follow an entry's type reference.
    ///
    /// Absent or dangling references come back as `None`, which the
    /// synthesizer renders as `void`.
    pub fn type_of(&self, id: EntryId) -> Option<EntryId>
    {
        self.entry(id).type_ref.and_then(|offset| self.resolve(offset))
    }

    /// Indexed names, in the order they were first seen.
    pub fn names(&self) -> impl Iterator<Item = &str>
    {
        self.names.iter().map(String::as_str)
    }

    /// Every indexed entry carrying the given name.
    pub fn candidates(&self, name: &str) -> &[EntryId]
    {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cross-unit identity of an entry.
    pub fn global_offset(&self, id: EntryId) -> GlobalOffset
    {
        GlobalOffset(self.unit.base_offset + self.entry(id).offset)
    }

    /// Render an entry's declared source location as `file:line`.
    ///
    /// Falls back to `_nowhere{n}_` for an unmapped file index and
    /// `_nowhere_` when no file attribute exists at all.
    pub fn src_location(&self, id: EntryId) -> String
    {
        let entry = self.entry(id);
        let file = match entry.decl_file {
            Some(index) => self
                .unit
                .files
                .get(&index)
                .cloned()
                .unwrap_or_else(|| format!("_nowhere{index}_")),
            None => "_nowhere_".to_string(),
        };
        match entry.decl_line {
            Some(line) => format!("{file}:{line}"),
            None => file,
        }
    }

    /// The entry's validated explicit name, if any.
    ///
    /// An explicit name that fails identifier validation is a naming
    /// failure, never silently replaced by a synthetic name.
    pub fn given_name(&self, id: EntryId) -> Result<Option<&str>>
    {
        match &self.entry(id).name {
            Some(name) if is_valid_identifier(name) => Ok(Some(name)),
            Some(name) => Err(TypesmithError::InvalidIdentifier(name.clone())),
            None => Ok(None),
        }
    }

    /// The entry's tag name, synthesizing a deterministic `anon_*` name for
    /// truly anonymous aggregates, enums and typedefs.
    pub fn tag_name(&self, id: EntryId) -> Result<String>
    {
        if let Some(name) = self.given_name(id)? {
            return Ok(name.to_string());
        }
        let entry = self.entry(id);
        let stem = entry
            .kind
            .stem()
            .ok_or_else(|| TypesmithError::MissingName(entry.kind.to_string()))?;
        Ok(format!("anon_{stem}_{:x}_{:x}", self.unit.base_offset, entry.offset))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_identifier_validation()
    {
        assert!(is_valid_identifier("foo_bar9"));
        assert!(is_valid_identifier("unsigned int"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("std::vector<int>"));
        assert!(!is_valid_identifier("operator+"));
    }
}
