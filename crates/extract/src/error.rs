use thiserror::Error;

/// Why a response or a relation contributed nothing to the output.
///
/// None of these are fatal: callers count them, log them and move on to the
/// next item in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("no mapping marker found in response")]
    FormatNotRecognized,

    #[error("literal parse failed at byte {offset}: {message}")]
    LiteralParseFailure { offset: usize, message: String },

    #[error("malformed literal matched no fallback heuristic")]
    HeuristicMismatch,

    #[error("mapping rejected: {0}")]
    ShapeViolation(&'static str),

    #[error("mention '{0}' has no canonical identifier")]
    UnresolvedEntity(String),
}

impl ExtractError {
    /// Short stable label, used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FormatNotRecognized => "format_not_recognized",
            Self::LiteralParseFailure { .. } => "literal_parse_failure",
            Self::HeuristicMismatch => "heuristic_mismatch",
            Self::ShapeViolation(_) => "shape_violation",
            Self::UnresolvedEntity(_) => "unresolved_entity",
        }
    }
}
