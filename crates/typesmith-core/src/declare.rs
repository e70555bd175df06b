//! Declarator synthesis.
//!
//! [`declare`] is the pure half of the reconstructor: it turns a type entry
//! plus an optional identifier into declarator text, threading the
//! identifier right-to-left through the recursive C declarator grammar
//! (`*x`, `x[4]`, `(*fp)(void)`). It never touches emission state; the
//! emitter composes it with the printed output.

use crate::entry::EntryKind;
use crate::error::{Result, TypesmithError};
use crate::unit::UnitIndex;
use crate::{EntryId, MAX_DEPTH};

/// Render the declarator for `entry` with `ident` as the declared name.
///
/// `None` for `entry` means `void`; `None` for `ident` renders an abstract
/// declarator (as used for parameter lists and tag-only declarations).
///
/// Pure: no output, no state transitions. Fails with a recoverable error on
/// invalid names, kinds outside the modeled C grammar, or nesting past the
/// depth cap.
pub fn declare(unit: &UnitIndex, entry: Option<EntryId>, ident: Option<&str>) -> Result<String>
{
    declare_at(unit, entry, ident, 0)
}

fn declare_at(unit: &UnitIndex, entry: Option<EntryId>, ident: Option<&str>, depth: usize) -> Result<String>
{
    if depth >= MAX_DEPTH {
        return Err(TypesmithError::DepthExceeded(MAX_DEPTH));
    }

    let Some(id) = entry else {
        return Ok(match ident {
            Some(name) => format!("void {name}"),
            None => "void".to_string(),
        });
    };

    let entry = unit.entry(id);
    match &entry.kind {
        EntryKind::Base => {
            let name = unit
                .given_name(id)?
                .ok_or_else(|| TypesmithError::MissingName(entry.kind.to_string()))?;
            Ok(match ident {
                Some(decl) => format!("{name} {decl}"),
                None => name.to_string(),
            })
        }

        EntryKind::Pointer => {
            let inner = format!("*{}", ident.unwrap_or(""));
            declare_at(unit, unit.type_of(id), Some(&inner), depth + 1)
        }

        // References are not modeled further; the marker keeps the C
        // rendition honest about what the original type was.
        EntryKind::Reference => {
            let inner = format!("/*<&>*/{}", ident.unwrap_or(""));
            declare_at(unit, unit.type_of(id), Some(&inner), depth + 1)
        }
        EntryKind::RvalueReference => {
            let inner = format!("/*<&&>*/{}", ident.unwrap_or(""));
            declare_at(unit, unit.type_of(id), Some(&inner), depth + 1)
        }

        EntryKind::Subroutine => {
            let mut params = Vec::new();
            for &child in &entry.children {
                if unit.entry(child).kind != EntryKind::FormalParameter {
                    continue;
                }
                params.push(declare_at(unit, unit.type_of(child), None, depth + 1)?);
            }
            if params.is_empty() {
                params.push(declare_at(unit, None, None, depth + 1)?);
            }
            let ret = declare_at(unit, unit.type_of(id), None, depth + 1)?;
            Ok(format!("{ret} ({})({})", ident.unwrap_or(""), params.join(", ")))
        }

        EntryKind::Array => {
            let mut dims = String::new();
            for &child in &entry.children {
                let subrange = unit.entry(child);
                if subrange.kind != EntryKind::Subrange {
                    continue;
                }
                match subrange.count {
                    Some(count) => dims.push_str(&format!("[{count}]")),
                    None => dims.push_str("[]"),
                }
            }
            if dims.is_empty() {
                dims.push_str("[]");
            }
            let element = declare_at(unit, unit.type_of(id), None, depth + 1)?;
            Ok(format!("{element} {}{dims}", ident.unwrap_or("")))
        }

        EntryKind::Const | EntryKind::Volatile | EntryKind::Restrict | EntryKind::Atomic => {
            let rest = declare_at(unit, unit.type_of(id), ident, depth + 1)?;
            Ok(match entry.kind.qualifier_keyword() {
                Some(keyword) => format!("{keyword} {rest}"),
                None => rest,
            })
        }

        EntryKind::Struct | EntryKind::Class | EntryKind::Union | EntryKind::Enum | EntryKind::Typedef => {
            let name = unit.tag_name(id)?;
            let mut text = String::new();
            if let Some(stem) = entry.kind.decl_stem() {
                text.push_str(stem);
                text.push(' ');
            }
            text.push_str(&name);
            if let Some(decl) = ident {
                text.push(' ');
                text.push_str(decl);
            }
            Ok(text)
        }

        other => Err(TypesmithError::NoDeclarationRule(other.to_string())),
    }
}
