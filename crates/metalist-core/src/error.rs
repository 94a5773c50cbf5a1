use thiserror::Error;

/// Options rejected at the generator boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("generate called before any options were supplied")]
    MissingOptions,
    #[error("page size must be positive")]
    InvalidPageSize,
    #[error("page numbers start at 1")]
    InvalidPageNo,
    #[error("{keys} primary keys supplied for {rows} rows")]
    PrimaryKeyMismatch { keys: usize, rows: usize },
}
