use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::de;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while loading, parsing or writing a config.
///
/// A lookup that finds nothing is not an error, see [`crate::Property`].
#[derive(Debug, Error)]
pub enum Error {
    /// The file could not be opened.
    #[error("{}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was opened, but querying its size, reading or writing failed.
    #[error("{}: {source}", .path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The text does not follow the grammar. Parsing stopped at `line`.
    #[error("ini syntax error, line {line}: '{msg}'")]
    Syntax { line: u32, msg: String },

    /// Invalid glob pattern.
    #[error("{pattern}: {msg}")]
    Pattern { pattern: String, msg: String },

    /// A stored value or name cannot be written back as ini text.
    #[error("cannot write as ini text: {0}")]
    Unrepresentable(String),

    /// Raised from a serde `Deserialize` implementation.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    pub(crate) fn syntax(line: u32, msg: impl Into<String>) -> Error {
        let msg = msg.into();
        error!("ini syntax error, line {}: '{}'", line, msg);
        Error::Syntax { line, msg }
    }

    /// Line number for syntax errors.
    pub fn line(&self) -> Option<u32> {
        match *self {
            Error::Syntax { line, .. } => Some(line),
            _ => None,
        }
    }
}

impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}
