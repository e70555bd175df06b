//! Decoded debug-info entries and compilation units.
//!
//! These are the plain-data shapes the core algorithms operate on. The
//! provider ([`crate::dwarf`]) fills them in from the binary; nothing in the
//! core mutates them afterwards.

use std::collections::HashMap;
use std::fmt;

/// Index of an [`Entry`] inside its compilation unit's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub usize);

/// Identity of an entry across compilation units.
///
/// Computed as the unit's section base offset plus the entry's unit-local
/// offset, so dedup state can span every unit in a binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalOffset(pub u64);

/// The closed set of entry kinds the reconstructor models.
///
/// `Unsupported` carries the raw DWARF tag name so diagnostics can say what
/// was actually encountered. Every operation over kinds matches exhaustively;
/// there is no runtime "unrecognized kind" path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind
{
    Base,
    Pointer,
    Reference,
    RvalueReference,
    Const,
    Volatile,
    Restrict,
    Atomic,
    Array,
    Subroutine,
    Subprogram,
    FormalParameter,
    Struct,
    Class,
    Union,
    Enum,
    Enumerator,
    Typedef,
    Member,
    Subrange,
    Unsupported(String),
}

impl EntryKind
{
    /// Whether entries of this kind belong in the name index.
    pub fn is_named_type(&self) -> bool
    {
        matches!(
            self,
            EntryKind::Array
                | EntryKind::Struct
                | EntryKind::Class
                | EntryKind::Union
                | EntryKind::Enum
                | EntryKind::Typedef
                | EntryKind::Subprogram
        )
    }

    /// The keyword a qualifier contributes to a declarator.
    ///
    /// `restrict` contributes nothing visible but still recurses.
    pub fn qualifier_keyword(&self) -> Option<&'static str>
    {
        match self {
            EntryKind::Const => Some("const"),
            EntryKind::Volatile => Some("volatile"),
            EntryKind::Atomic => Some("_Atomic"),
            _ => None,
        }
    }

    /// The display prefix for a tagged-type declarator.
    ///
    /// Classes render as structs with an explanatory comment; typedefs take
    /// no prefix at all.
    pub fn decl_stem(&self) -> Option<&'static str>
    {
        match self {
            EntryKind::Struct => Some("struct"),
            EntryKind::Class => Some("/*<class>*/struct"),
            EntryKind::Union => Some("union"),
            EntryKind::Enum => Some("enum"),
            _ => None,
        }
    }

    /// The plain word used when synthesizing a name for an anonymous entry.
    pub fn stem(&self) -> Option<&'static str>
    {
        match self {
            EntryKind::Struct | EntryKind::Class => Some("struct"),
            EntryKind::Union => Some("union"),
            EntryKind::Enum => Some("enum"),
            EntryKind::Typedef => Some("typedef"),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        let word = match self {
            EntryKind::Base => "base type",
            EntryKind::Pointer => "pointer type",
            EntryKind::Reference => "reference type",
            EntryKind::RvalueReference => "rvalue reference type",
            EntryKind::Const => "const qualifier",
            EntryKind::Volatile => "volatile qualifier",
            EntryKind::Restrict => "restrict qualifier",
            EntryKind::Atomic => "atomic qualifier",
            EntryKind::Array => "array type",
            EntryKind::Subroutine => "subroutine type",
            EntryKind::Subprogram => "subprogram",
            EntryKind::FormalParameter => "formal parameter",
            EntryKind::Struct => "structure type",
            EntryKind::Class => "class type",
            EntryKind::Union => "union type",
            EntryKind::Enum => "enumeration type",
            EntryKind::Enumerator => "enumerator",
            EntryKind::Typedef => "typedef",
            EntryKind::Member => "member",
            EntryKind::Subrange => "subrange type",
            EntryKind::Unsupported(tag) => return f.write_str(tag),
        };
        f.write_str(word)
    }
}

/// One decoded node of the debug-info tree.
///
/// Offsets (`offset`, `type_ref`) are unit-local; an absent `type_ref` means
/// `void`. Children are ordered as they appear in the debug info.
#[derive(Debug, Clone)]
pub struct Entry
{
    pub kind: EntryKind,
    pub offset: u64,
    pub name: Option<String>,
    pub type_ref: Option<u64>,
    pub decl_file: Option<u64>,
    pub decl_line: Option<u64>,
    pub byte_size: Option<u64>,
    pub declaration: bool,
    pub const_value: Option<i64>,
    pub member_offset: Option<u64>,
    pub count: Option<u64>,
    pub children: Vec<EntryId>,
}

impl Entry
{
    /// A bare entry of the given kind at the given unit-local offset.
    pub fn new(kind: EntryKind, offset: u64) -> Self
    {
        Entry {
            kind,
            offset,
            name: None,
            type_ref: None,
            decl_file: None,
            decl_line: None,
            byte_size: None,
            declaration: false,
            const_value: None,
            member_offset: None,
            count: None,
            children: Vec::new(),
        }
    }
}

/// One compilation unit as handed over by the debug-info provider.
///
/// The entry arena is rooted at index 0 (when non-empty); `files` maps raw
/// `DW_AT_decl_file` values to file names.
#[derive(Debug, Clone, Default)]
pub struct CompilationUnit
{
    pub base_offset: u64,
    pub language: Option<gimli::DwLang>,
    pub path: String,
    pub files: HashMap<u64, String>,
    pub entries: Vec<Entry>,
}

impl CompilationUnit
{
    /// The root entry, if the unit decoded to anything at all.
    pub fn root(&self) -> Option<EntryId>
    {
        if self.entries.is_empty() { None } else { Some(EntryId(0)) }
    }
}
