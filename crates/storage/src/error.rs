/// All errors that can be returned by a StratusStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No execution stored under the given id.
    #[error("execution not found: {execution_id}")]
    ExecutionNotFound { execution_id: String },

    /// Config keys are `scope.key` pairs; both halves must be non-empty.
    #[error("invalid config key: {scope}.{key}")]
    InvalidKey { scope: String, key: String },

    /// A record on disk could not be encoded or decoded.
    #[error("corrupt record {path}: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A backend-specific storage error (filesystem, permissions, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Backend(e.to_string())
    }
}
