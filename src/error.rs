use thiserror::Error;

use crate::content::{QuestionId, SectorId};

/// Outcomes of session transitions that leave the session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("question {0} is locked")]
    RejectedLocked(QuestionId),
    #[error("no available questions in sector {0}")]
    NoAvailableQuestions(SectorId),
    #[error("sector {0} has no question {1}")]
    UnknownQuestion(SectorId, usize),
    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),
}

/// Interpreter-level failures, rendered as transcript lines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("unknown sector: {0}")]
    UnknownSector(String),
}

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read content file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse content file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sector {0} has no questions")]
    EmptySector(SectorId),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("window error: {0}")]
    Window(#[from] minifb::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
