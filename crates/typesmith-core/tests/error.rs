//! Tests for error handling

use typesmith_core::{TypesmithError, MAX_DEPTH};

#[test]
fn test_invalid_identifier_display()
{
    let error = TypesmithError::InvalidIdentifier("std::vector<int>".to_string());
    let message = format!("{}", error);
    assert!(message.contains("invalid C identifier"));
    assert!(message.contains("std::vector<int>"));
}

#[test]
fn test_incompatible_entry_display()
{
    let error = TypesmithError::IncompatibleEntry("DW_TAG_variable".to_string());
    let message = format!("{}", error);
    assert!(message.contains("incompatible"));
    assert!(message.contains("DW_TAG_variable"));
}

#[test]
fn test_depth_exceeded_display()
{
    let error = TypesmithError::DepthExceeded(MAX_DEPTH);
    let message = format!("{}", error);
    assert!(message.contains(&MAX_DEPTH.to_string()));
}

#[test]
fn test_context_chain_display()
{
    let error = TypesmithError::InvalidIdentifier("x!".to_string())
        .context("pointer")
        .context("typedef");
    assert_eq!(format!("{}", error), "typedef -> pointer -> invalid C identifier 'x!'");
}

#[test]
fn test_recoverable_classification()
{
    assert!(TypesmithError::InvalidIdentifier(String::new()).is_recoverable());
    assert!(TypesmithError::MissingName("enumerator".to_string()).is_recoverable());
    assert!(TypesmithError::NoDeclarationRule("member".to_string()).is_recoverable());
    assert!(TypesmithError::IncompatibleEntry("DW_TAG_namespace".to_string()).is_recoverable());
    assert!(TypesmithError::MissingByteSize("S".to_string()).is_recoverable());
    assert!(TypesmithError::DepthExceeded(MAX_DEPTH).is_recoverable());

    let io = TypesmithError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe"));
    assert!(!io.is_recoverable());
}

#[test]
fn test_context_preserves_recoverability()
{
    let recoverable = TypesmithError::IncompatibleEntry("DW_TAG_variable".to_string()).context("formal-parameter");
    assert!(recoverable.is_recoverable());

    let fatal = TypesmithError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")).context("pointer");
    assert!(!fatal.is_recoverable());
}
