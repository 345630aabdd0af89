use crate::core::grid::GridError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScanError {
    // The message is a stable part of the construction contract; callers
    // match on it verbatim.
    #[error("Scan start/end has incorrect shape")]
    IncorrectShape,

    #[error("A position scan requires at least one position")]
    EmptyPositions,

    #[error(transparent)]
    Grid(#[from] GridError),
}
