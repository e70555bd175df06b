//! Shared helpers for building synthetic compilation units in tests.

#![allow(dead_code)]

use typesmith_core::entry::{CompilationUnit, Entry, EntryId, EntryKind};
use typesmith_core::unit::{UnitIndex, SUPPORTED_LANGUAGES};

/// Builds a hand-crafted compilation unit, entry by entry.
///
/// The root mimics a real decode: a `DW_TAG_compile_unit` entry at offset 0
/// that everything else hangs off. Offsets are chosen by the test.
pub struct UnitBuilder
{
    unit: CompilationUnit,
}

impl UnitBuilder
{
    pub fn new() -> Self
    {
        let mut unit = CompilationUnit {
            base_offset: 0x100,
            language: Some(SUPPORTED_LANGUAGES[2]), // C99
            path: "/src/test.c".to_string(),
            ..CompilationUnit::default()
        };
        unit.entries
            .push(Entry::new(EntryKind::Unsupported("DW_TAG_compile_unit".to_string()), 0));
        UnitBuilder { unit }
    }

    pub fn without_language(mut self) -> Self
    {
        self.unit.language = None;
        self
    }

    /// Add an entry as a direct child of the unit root.
    pub fn add(&mut self, kind: EntryKind, offset: u64) -> EntryId
    {
        self.add_child(EntryId(0), kind, offset)
    }

    pub fn add_child(&mut self, parent: EntryId, kind: EntryKind, offset: u64) -> EntryId
    {
        let id = EntryId(self.unit.entries.len());
        self.unit.entries.push(Entry::new(kind, offset));
        self.unit.entries[parent.0].children.push(id);
        id
    }

    pub fn entry_mut(&mut self, id: EntryId) -> &mut Entry
    {
        &mut self.unit.entries[id.0]
    }

    /// A named base type (e.g. `int`) at the given offset.
    pub fn base(&mut self, offset: u64, name: &str) -> EntryId
    {
        let id = self.add(EntryKind::Base, offset);
        self.entry_mut(id).name = Some(name.to_string());
        id
    }

    /// A pointer at `offset` to the entry at `pointee_offset`.
    pub fn pointer(&mut self, offset: u64, pointee_offset: u64) -> EntryId
    {
        let id = self.add(EntryKind::Pointer, offset);
        self.entry_mut(id).type_ref = Some(pointee_offset);
        id
    }

    /// A named struct with a byte size; members are added by the test.
    pub fn structure(&mut self, offset: u64, name: Option<&str>, size: u64) -> EntryId
    {
        let id = self.add(EntryKind::Struct, offset);
        self.entry_mut(id).name = name.map(str::to_string);
        self.entry_mut(id).byte_size = Some(size);
        id
    }

    /// A member of `parent` with a storage offset and a type reference.
    pub fn member(&mut self, parent: EntryId, offset: u64, name: &str, type_offset: u64, location: u64) -> EntryId
    {
        let id = self.add_child(parent, EntryKind::Member, offset);
        self.entry_mut(id).name = Some(name.to_string());
        self.entry_mut(id).type_ref = Some(type_offset);
        self.entry_mut(id).member_offset = Some(location);
        id
    }

    pub fn build(self) -> UnitIndex
    {
        UnitIndex::new(self.unit)
    }
}

/// Render one root through a fresh emitter pass into a string.
pub fn emit_to_string(unit: &UnitIndex, state: &mut typesmith_core::EmitState, root: EntryId) -> String
{
    let mut out = Vec::new();
    typesmith_core::Emitter::new(unit, state, &mut out)
        .track(Some(root))
        .expect("emission failed");
    String::from_utf8(out).expect("emitter wrote invalid UTF-8")
}
