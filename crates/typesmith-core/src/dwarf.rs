//! Debug-info provider: decodes a binary's DWARF into [`CompilationUnit`]s.
//!
//! This is the only byte-level layer. `object` parses the container and
//! hands over the `.debug_*` sections; `gimli` decodes them. Everything past
//! this module works on the fully materialized, randomly addressable entry
//! arenas it produces.

use std::collections::HashMap;
use std::sync::Arc;

use gimli::{constants, AttributeValue, Dwarf, EndianArcSlice, Reader, RunTimeEndian, SectionId, Unit};
use object::{Object, ObjectSection};
use tracing::debug;

use crate::entry::{CompilationUnit, Entry, EntryId, EntryKind};
use crate::error::Result;

type DwarfReader = EndianArcSlice<RunTimeEndian>;

/// Decode every compilation unit of the given binary image.
///
/// Units of any source language are decoded; the language gate lives in the
/// indexer, which yields an empty index for non-C-family units.
pub fn load_units(data: &[u8]) -> Result<Vec<CompilationUnit>>
{
    let file = object::File::parse(data)?;
    let endian = if file.is_little_endian() {
        RunTimeEndian::Little
    } else {
        RunTimeEndian::Big
    };

    let load_section = |id: SectionId| -> std::result::Result<DwarfReader, gimli::Error> {
        let bytes = file
            .section_by_name(id.name())
            .and_then(|section| section.uncompressed_data().ok())
            .map(|data| Arc::<[u8]>::from(data.as_ref()))
            .unwrap_or_else(|| Arc::from(&[][..]));
        Ok(EndianArcSlice::new(bytes, endian))
    };
    let dwarf = Dwarf::load(load_section)?;

    let mut units = Vec::new();
    let mut headers = dwarf.units();
    while let Some(header) = headers.next()? {
        let unit = dwarf.unit(header)?;
        let decoded = decode_unit(&dwarf, &unit)?;
        debug!(path = %decoded.path, entries = decoded.entries.len(), "decoded unit");
        units.push(decoded);
    }
    Ok(units)
}

fn decode_unit(dwarf: &Dwarf<DwarfReader>, unit: &Unit<DwarfReader>) -> Result<CompilationUnit>
{
    let base_offset = unit
        .header
        .offset()
        .as_debug_info_offset()
        .map(|offset| offset.0 as u64)
        .unwrap_or(0);

    let mut decoded = CompilationUnit {
        base_offset,
        language: None,
        path: unit_path(unit),
        files: file_table(dwarf, unit)?,
        entries: Vec::new(),
    };

    // One DFS pass rebuilding the tree as an arena. The cursor reports
    // depth deltas; the parent stack mirrors them.
    let mut stack: Vec<EntryId> = Vec::new();
    let mut depth: isize = 0;
    let mut cursor = unit.entries();
    while let Some((delta, die)) = cursor.next_dfs()? {
        depth += delta;
        if depth < 0 {
            break;
        }
        stack.truncate(depth as usize);

        if decoded.entries.is_empty() {
            if let Some(AttributeValue::Language(language)) = die.attr_value(constants::DW_AT_language)? {
                decoded.language = Some(language);
            }
        }

        let id = EntryId(decoded.entries.len());
        let entry = decode_entry(dwarf, unit, die)?;
        if let Some(&parent) = stack.last() {
            decoded.entries[parent.0].children.push(id);
        }
        decoded.entries.push(entry);
        stack.push(id);
    }

    Ok(decoded)
}

fn decode_entry(
    dwarf: &Dwarf<DwarfReader>,
    unit: &Unit<DwarfReader>,
    die: &gimli::DebuggingInformationEntry<'_, '_, DwarfReader>,
) -> Result<Entry>
{
    let mut entry = Entry::new(map_tag(die.tag()), die.offset().0 as u64);

    if let Some(value) = die.attr_value(constants::DW_AT_name)? {
        entry.name = attr_to_string(dwarf, unit, value);
    }
    if let Some(AttributeValue::UnitRef(offset)) = die.attr_value(constants::DW_AT_type)? {
        entry.type_ref = Some(offset.0 as u64);
    }
    entry.decl_file = udata_attr(die, constants::DW_AT_decl_file)?;
    entry.decl_line = udata_attr(die, constants::DW_AT_decl_line)?;
    entry.byte_size = udata_attr(die, constants::DW_AT_byte_size)?;
    entry.declaration = matches!(
        die.attr_value(constants::DW_AT_declaration)?,
        Some(AttributeValue::Flag(true))
    );
    if let Some(attr) = die.attr(constants::DW_AT_const_value)? {
        entry.const_value = attr
            .sdata_value()
            .or_else(|| attr.udata_value().map(|value| value as i64));
    }
    entry.member_offset = udata_attr(die, constants::DW_AT_data_member_location)?;

    // Clang emits DW_AT_count; GCC prefers DW_AT_upper_bound.
    entry.count = udata_attr(die, constants::DW_AT_count)?;
    if entry.count.is_none() {
        entry.count = udata_attr(die, constants::DW_AT_upper_bound)?.map(|upper| upper + 1);
    }

    Ok(entry)
}

fn map_tag(tag: gimli::DwTag) -> EntryKind
{
    match tag {
        constants::DW_TAG_base_type => EntryKind::Base,
        constants::DW_TAG_pointer_type => EntryKind::Pointer,
        constants::DW_TAG_reference_type => EntryKind::Reference,
        constants::DW_TAG_rvalue_reference_type => EntryKind::RvalueReference,
        constants::DW_TAG_const_type => EntryKind::Const,
        constants::DW_TAG_volatile_type => EntryKind::Volatile,
        constants::DW_TAG_restrict_type => EntryKind::Restrict,
        constants::DW_TAG_atomic_type => EntryKind::Atomic,
        constants::DW_TAG_array_type => EntryKind::Array,
        constants::DW_TAG_subroutine_type => EntryKind::Subroutine,
        constants::DW_TAG_subprogram => EntryKind::Subprogram,
        constants::DW_TAG_formal_parameter => EntryKind::FormalParameter,
        constants::DW_TAG_structure_type => EntryKind::Struct,
        constants::DW_TAG_class_type => EntryKind::Class,
        constants::DW_TAG_union_type => EntryKind::Union,
        constants::DW_TAG_enumeration_type => EntryKind::Enum,
        constants::DW_TAG_enumerator => EntryKind::Enumerator,
        constants::DW_TAG_typedef => EntryKind::Typedef,
        constants::DW_TAG_member => EntryKind::Member,
        constants::DW_TAG_subrange_type => EntryKind::Subrange,
        other => EntryKind::Unsupported(other.to_string()),
    }
}

fn udata_attr(
    die: &gimli::DebuggingInformationEntry<'_, '_, DwarfReader>,
    name: gimli::DwAt,
) -> Result<Option<u64>>
{
    Ok(die.attr(name)?.and_then(|attr| attr.udata_value()))
}

fn unit_path(unit: &Unit<DwarfReader>) -> String
{
    let name = reader_string(unit.name.as_ref());
    let comp_dir = reader_string(unit.comp_dir.as_ref());
    match (comp_dir, name) {
        (Some(dir), Some(name)) if !name.starts_with('/') => format!("{dir}/{name}"),
        (_, Some(name)) => name,
        (Some(dir), None) => dir,
        (None, None) => String::new(),
    }
}

/// Map raw `DW_AT_decl_file` values to file names.
///
/// DWARF 5 file indices are 0-based; earlier versions start at 1.
fn file_table(dwarf: &Dwarf<DwarfReader>, unit: &Unit<DwarfReader>) -> Result<HashMap<u64, String>>
{
    let mut files = HashMap::new();
    if let Some(program) = &unit.line_program {
        let header = program.header();
        let base: u64 = if header.version() >= 5 { 0 } else { 1 };
        for (index, file) in header.file_names().iter().enumerate() {
            if let Some(name) = attr_to_string(dwarf, unit, file.path_name()) {
                files.insert(base + index as u64, name);
            }
        }
    }
    Ok(files)
}

fn attr_to_string(dwarf: &Dwarf<DwarfReader>, unit: &Unit<DwarfReader>, value: AttributeValue<DwarfReader>) -> Option<String>
{
    let reader = dwarf.attr_string(unit, value).ok()?;
    reader_string(Some(&reader))
}

fn reader_string(reader: Option<&DwarfReader>) -> Option<String>
{
    reader.and_then(|r| r.to_string_lossy().ok().map(|s| s.into_owned()))
}
