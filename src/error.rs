use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while setting a cache up.
///
/// Cache operations themselves never fail: a missing or expired key is reported as [`None`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to spawn the sweeper thread: {0}")]
    SpawnSweeper(#[source] std::io::Error),

    #[error("invalid expiration {value:?}: {source}")]
    InvalidExpiration {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
}
