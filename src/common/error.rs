use miette::Diagnostic;
use thiserror::Error;

/// Which side of a join a column reference belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum JoinSide {
    Left,
    Right,
}

/// Errors raised while loading, planning, or evaluating a frame.
///
/// Every variant is fatal to the operation that raised it.
#[derive(Debug, Error, Diagnostic)]
pub enum FrameError {
    /// A source line or record could not be turned into a row.
    #[error("Parse error on line {line}: {message}")]
    #[diagnostic(
        code(skiff::parse),
        help("check the delimiter and the number of fields per line")
    )]
    Parse { line: u64, message: String },

    #[error("Column not found: {0}")]
    #[diagnostic(code(skiff::unknown_column))]
    UnknownColumn(String),

    #[error("Division by zero")]
    #[diagnostic(code(skiff::division_by_zero))]
    DivisionByZero,

    #[error("Join column '{column}' not found on the {side} side")]
    #[diagnostic(code(skiff::join_key))]
    JoinKeyMismatch { column: String, side: JoinSide },

    #[error("Type mismatch: {0}")]
    #[diagnostic(code(skiff::type_mismatch))]
    TypeMismatch(String),

    #[error("Duplicate column: {0}")]
    #[diagnostic(
        code(skiff::duplicate_column),
        help("drop or rename one of the columns before joining")
    )]
    DuplicateColumn(String),

    #[error("IO Error: {0}")]
    #[diagnostic(code(skiff::io))]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(skiff::json))]
    Json(#[from] serde_json::Error),
}

impl FrameError {
    pub(crate) fn parse(line: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = FrameError> = std::result::Result<T, E>;
