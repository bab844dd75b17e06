//! Error types for Lua configuration loading

use crate::Path;
use std::fmt::Display;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a Lua configuration
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The script produced a value that has no event representation
    #[error("Invalid stream at {path}: {message}")]
    InvalidStream { path: Path, message: String },

    /// Lua failed to compile or run the script
    #[error("Lua error: {0}")]
    Lua(#[from] mlua::Error),

    /// The event stream did not match the requested type
    #[error("Deserialization error at {path}: {message}")]
    Deserialize { path: Path, message: String },

    /// Two polymorphic types declare the same tag name
    #[error("Tag `{name}` is declared by both `{first}` and `{second}`")]
    DuplicateTag {
        name: String,
        first: String,
        second: String,
    },

    /// Type is not an externally tagged enum
    #[error("Type `{0}` is not a polymorphic enum")]
    NotPolymorphic(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Deserialization message that has not been located yet
    #[error("{0}")]
    Message(String),
}

impl serde::de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

/// Walker failure before the current path is attached
#[derive(Debug)]
pub(crate) enum Fault {
    Invalid(String),
    Lua(mlua::Error),
}

impl Fault {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Fault::Invalid(message.into())
    }

    pub(crate) fn at(self, path: &Path) -> Error {
        match self {
            Fault::Invalid(message) => Error::InvalidStream {
                path: path.clone(),
                message,
            },
            Fault::Lua(err) => Error::Lua(err),
        }
    }
}

impl From<mlua::Error> for Fault {
    fn from(err: mlua::Error) -> Self {
        Fault::Lua(err)
    }
}
