//! Error types and result definitions.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::data::types::SUPPORTED_TYPES;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building schemas, resolving paths, reading or
/// writing documents and converting between document nodes and values.
#[derive(Debug, Error)]
pub enum Error {
    /// A value member resolved to no value on the default instance.
    #[error("you must define a default value on `{member}`")]
    MissingDefault { member: String },

    /// The type can't be classified into one of the supported shapes.
    #[error("{type_name} is not a type supported by dyaml. Supported types are: {}", SUPPORTED_TYPES.join(", "))]
    Unsupported { type_name: String },

    /// The namespace already has a store registered.
    #[error("the namespace `{0}` is already registered")]
    DuplicateNamespace(String),

    /// A child was added below a node that holds a value.
    #[error("node `{name}` contains a value and isn't allowed to have children")]
    LeafChild { name: String },

    /// The document path references a parameter without a replacement.
    #[error("no value for the path parameter `{0}` exists")]
    UnresolvedParameter(String),

    /// The resolved document path contains characters outside the allowed set.
    #[error("invalid file path defined for config: {0}")]
    InvalidPath(String),

    /// Reading, writing or copying a document failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document text could not be parsed or emitted.
    #[error("malformed document: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A config references a store namespace that was never registered.
    #[error("store `{0}` was used before it was registered")]
    UnknownStore(String),

    /// The store configuration is unusable.
    #[error("invalid store configuration: {0}")]
    InvalidStore(String),

    /// Synchronising a remote store failed.
    #[error("syncing store `{namespace}` failed: {message}")]
    Sync { namespace: String, message: String },

    /// Nothing exists at the requested dotted path.
    #[error("the node `{path}` is missing")]
    MissingNode { path: String },

    /// The node exists but has the wrong shape or scalar type.
    #[error("expected {expected}, found {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// An enumeration value matched none of the declared variants.
    #[error("invalid enum value `{value}` for {type_name}. Supported values are: {}", variants.join(", "))]
    InvalidVariant {
        value: String,
        type_name: String,
        variants: Vec<String>,
    },

    /// A map in the document used a key that isn't a string.
    #[error("maps must be keyed by strings, found key {0}")]
    NonStringKey(String),

    /// A nested failure, annotated with the path it happened at.
    #[error("`{path}`: {source}")]
    Member {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// Injection never creates documents.
    #[error("cannot inject into {}: the document does not exist", path.display())]
    MissingDocument { path: PathBuf },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub(crate) fn at(self, path: &str) -> Self {
        Error::Member {
            path: path.to_string(),
            source: Box::new(self),
        }
    }

    /// Whether the root cause is an absent node rather than a malformed one.
    pub fn is_missing_node(&self) -> bool {
        match self {
            Error::MissingNode { .. } => true,
            Error::Member { source, .. } => source.is_missing_node(),
            _ => false,
        }
    }
}
