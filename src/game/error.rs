use thiserror::Error;

/// Errors raised by the game simulation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    #[error("invalid game configuration: {0}")]
    InvalidConfig(String),

    #[error("no free cell left for food ({cells} cells occupied)")]
    BoardFull { cells: usize },

    #[error("malformed action: {0}")]
    InvalidAction(String),
}
