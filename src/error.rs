use std::error::Error;
use std::fmt::{Display, Formatter};

/// Possible errors raised when configuring or running the clustering stage.
#[derive(Debug, Clone)]
pub enum ClueError {
    /// A configuration parameter failed validation. Raised when the
    /// configuration is built and fatal to the run.
    InvalidParameter(String),
    /// The event supplied zero hits across all configured collections.
    /// Surfaced per event; the caller decides whether to skip or abort.
    EmptyInput,
    /// A configured input collection was absent from the event.
    MissingCollection(String),
    /// A hit carried a NaN or infinite coordinate or energy.
    NonFiniteCoordinate(String),
}

impl Error for ClueError {}

impl Display for ClueError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            ClueError::InvalidParameter(msg) => format!("Invalid parameter: {msg}"),
            ClueError::EmptyInput => {
                String::from("The event contains no hits in any configured collection")
            }
            ClueError::MissingCollection(name) => {
                format!("Collection not found in event: {name}")
            }
            ClueError::NonFiniteCoordinate(msg) => format!("Non finite coordinate: {msg}"),
        };
        write!(f, "{message}")
    }
}
