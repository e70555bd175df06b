//! # Error Types
//!
//! General error handling for declaration reconstruction.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! The important distinction for callers is [`TypesmithError::is_recoverable`]:
//! real debug information routinely contains constructs this tool does not
//! model (bit-fields, compiler-synthetic types, and so on), and those must
//! only abort the declaration currently being emitted, never the whole run.

use thiserror::Error;

/// Main error type for reconstruction operations
///
/// ## Error Categories
///
/// 1. **Naming failures**: InvalidIdentifier, MissingName — an explicit name
///    fails C identifier validation, or an entry needs a name and cannot get
///    one (synthetic names apply only to truly anonymous aggregates, enums
///    and typedefs, never as a replacement for an invalid explicit name).
/// 2. **Structural failures**: NoDeclarationRule, IncompatibleEntry,
///    MissingByteSize — an entry kind has no modeled declaration or tracking
///    rule, or a full aggregate definition lacks the size needed to render
///    its layout.
/// 3. **Resource failures**: DepthExceeded — a pointer/array/qualifier chain
///    nested past the enforced recursion cap.
/// 4. **Context chains**: Tracking — a failure inside a dependency, wrapped
///    with the edge that led there (`pointer -> ...`, `typedef -> ...`).
/// 5. **External errors**: Object, Dwarf, Io — container parsing, DWARF
///    decoding and output-stream failures. These are never recoverable.
#[derive(Error, Debug)]
pub enum TypesmithError
{
    /// An explicit name is not a valid C identifier
    ///
    /// Names are restricted to ASCII letters, digits, underscore and space.
    /// Anything else (C++ template arguments, compiler-internal markers)
    /// cannot appear in a reconstructed C header.
    #[error("invalid C identifier '{0}'")]
    InvalidIdentifier(String),

    /// An entry needs a name but has none and none can be synthesized
    ///
    /// Synthetic `anon_*` names exist only for aggregates, enums and
    /// typedefs. An anonymous base type or enumerator has no naming rule.
    #[error("no name for {0}")]
    MissingName(String),

    /// No declarator-synthesis rule exists for this entry kind
    ///
    /// Raised by the declaration synthesizer when asked to render a kind
    /// outside the modeled C type grammar (for example a subprogram used
    /// where a type is expected).
    #[error("cannot generate declaration for {0}")]
    NoDeclarationRule(String),

    /// No dependency-tracking rule exists for this entry kind
    ///
    /// Raised by the emitter when a root or dependency resolves to a kind
    /// it does not model (variables, namespaces, compiler-synthetic tags).
    #[error("incompatible entry: {0}")]
    IncompatibleEntry(String),

    /// A full aggregate definition carries no `DW_AT_byte_size`
    ///
    /// Without a size the layout comments and the padding fallback for
    /// memberless aggregates cannot be rendered.
    #[error("aggregate '{0}' has no byte size")]
    MissingByteSize(String),

    /// A type chain nested deeper than the enforced recursion cap
    ///
    /// Deeply nested pointer/array/qualifier chains are possible in real
    /// debug info; the cap keeps them from exhausting the call stack.
    #[error("type nesting exceeds maximum depth {0}")]
    DepthExceeded(usize),

    /// A failure inside a dependency, annotated with the edge leading to it
    #[error("{context} -> {source}")]
    Tracking
    {
        /// The dependency edge being followed when the failure occurred
        context: String,
        /// The underlying failure
        source: Box<TypesmithError>,
    },

    /// Binary container parsing error
    #[error("object parsing error: {0}")]
    Object(#[from] object::Error),

    /// DWARF decoding error
    #[error("DWARF decoding error: {0}")]
    Dwarf(#[from] gimli::Error),

    /// I/O error on the output stream or while reading the binary
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TypesmithError
{
    /// Wrap this error with the dependency edge that led to it.
    pub fn context(self, context: impl Into<String>) -> Self
    {
        TypesmithError::Tracking {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether this failure may be caught at a per-entry boundary.
    ///
    /// Recoverable failures abort only the declaration currently being
    /// emitted; the driver reports them as a diagnostic comment and moves on
    /// to the next root. Container, DWARF and I/O errors always propagate.
    pub fn is_recoverable(&self) -> bool
    {
        match self {
            TypesmithError::InvalidIdentifier(_)
            | TypesmithError::MissingName(_)
            | TypesmithError::NoDeclarationRule(_)
            | TypesmithError::IncompatibleEntry(_)
            | TypesmithError::MissingByteSize(_)
            | TypesmithError::DepthExceeded(_) => true,
            TypesmithError::Tracking { source, .. } => source.is_recoverable(),
            TypesmithError::Object(_) | TypesmithError::Dwarf(_) | TypesmithError::Io(_) => false,
        }
    }
}

/// Convenience type alias for `Result<T, TypesmithError>`
pub type Result<T> = std::result::Result<T, TypesmithError>;
