use thiserror::Error;

/// Cache failures. Callers on the read-through path log these and fall back
/// to the database, so none of them reaches an HTTP response.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The backend rejected or failed a single get, set or delete.
    #[error("cache operation failed: {0}")]
    Operation(String),

    /// The redis pool could not be built or a connection could not be checked out.
    #[error("cache backend unreachable: {0}")]
    Connection(String),
}
