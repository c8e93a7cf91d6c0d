use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum BuildError {
    // Contract errors: the configuration record itself is malformed
    InvalidConfig(String),

    // Lookup errors: the configuration names a component nobody registered
    UnknownComponent(String),

    // Registration errors: a second registration under an existing name
    DuplicateComponent(String),

    // The name is registered but explicitly marked as not selectable yet
    Unsupported(String),

    // Errors raised by the target constructor for the forwarded parameters
    InvalidParameter(String),

    // Computation errors inside a built component
    ShapeMismatch(String),

    // File operations (config snapshots)
    IoError(std::io::Error),
    SerializationError(Box<bincode::ErrorKind>),
    JsonError(serde_json::Error),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuildError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            BuildError::UnknownComponent(name) => {
                write!(f, "unrecognized component type: {}", name)
            }
            BuildError::DuplicateComponent(name) => {
                write!(f, "component type {} is already registered", name)
            }
            BuildError::Unsupported(name) => {
                write!(f, "component type {} is reserved but not supported yet", name)
            }
            BuildError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            BuildError::ShapeMismatch(msg) => write!(f, "Shape mismatch: {}", msg),
            BuildError::IoError(err) => write!(f, "I/O error: {}", err),
            BuildError::SerializationError(err) => write!(f, "Serialization error: {}", err),
            BuildError::JsonError(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for BuildError {
    fn from(err: std::io::Error) -> BuildError {
        BuildError::IoError(err)
    }
}

impl From<Box<bincode::ErrorKind>> for BuildError {
    fn from(err: Box<bincode::ErrorKind>) -> BuildError {
        BuildError::SerializationError(err)
    }
}

impl From<serde_json::Error> for BuildError {
    fn from(err: serde_json::Error) -> BuildError {
        BuildError::JsonError(err)
    }
}

impl Error for BuildError {}

pub type Result<T> = std::result::Result<T, BuildError>;
