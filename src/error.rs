use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for code generation.
///
/// Every variant aborts the current generation run; there is no partial success.
#[derive(Error, Debug)]
pub enum Error {
    /// Bad input: a missing spec file or a malformed command-line argument
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Spec or descriptor text that is neither valid JSON nor valid YAML
    #[error("Failed to parse {name}: {message}")]
    Parse { name: String, message: String },

    /// Missing direction marker, no qualifying interface, broken template
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Unresolvable topic placeholder or unmatched/ambiguous channel parameter
    #[error("Binding error: {0}")]
    Binding(String),

    /// Two specs in one run declare the same type name with different schemas
    #[error("Type '{name}' is declared by '{first}' and again by '{second}' with a different schema")]
    TypeConflict {
        name: String,
        first: String,
        second: String,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(name: impl Into<String>, message: impl ToString) -> Self {
        Error::Parse {
            name: name.into(),
            message: message.to_string(),
        }
    }
}
