use chess_core::{LineError, LineId, OpeningId};

#[derive(Debug, thiserror::Error)]
pub enum RepertoireError {
    #[error("Opening not found: {0}")]
    OpeningNotFound(OpeningId),

    #[error("Line not found: {0}")]
    LineNotFound(LineId),

    #[error("Cannot delete the last line of an opening")]
    LastLineDeletionRefused,

    #[error("Line has no positions")]
    EmptyLine,

    #[error("No line reaches position {0}")]
    PositionNotFound(String),

    #[error("Position index {0} is out of range")]
    PositionIndexOutOfRange(usize),

    #[error("No note at position {0}")]
    NoteNotFound(String),

    #[error(transparent)]
    Line(#[from] LineError),

    #[error(transparent)]
    Import(#[from] ImportFormatError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Rejected import; the message names the offending element.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid file format: {0}")]
pub struct ImportFormatError(pub String);
