use thiserror::Error as ThisError;

/// Errors the core indexing algorithm itself can raise.
///
/// This is deliberately small: the core does no I/O, so there is nothing to
/// wrap here beyond the two failure modes the algorithm can actually hit.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("hash table is full after {checked_buckets} probes (table_size = {table_size})")]
    TableFull {
        table_size: usize,
        checked_buckets: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
