use crate::cache::Expiration;
use std::time::Duration;

/// Construction-time settings of a [`crate::Cache`].
///
/// The default configuration keeps entries forever and runs no sweeper.
///
/// ```rust
/// use plain_ttl_cache::{Config, Expiration};
/// use std::time::Duration;
///
/// let config = Config::new()
///     .with_default_ttl(Duration::from_secs(300))
///     .with_cleanup_interval(Duration::from_secs(30))
///     .with_lifespan(Duration::from_secs(3_600));
///
/// assert_eq!(config.default_ttl, Expiration::After(Duration::from_secs(300)));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct Config {
    /// TTL applied to entries set with [`Expiration::Default`]. A default of
    /// [`Expiration::Default`] means [`Expiration::Never`].
    pub default_ttl: Expiration,
    /// Time between two sweeps of expired entries. Zero disables the sweeper, expired entries
    /// are then only hidden on read and removed by explicit deletes.
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub cleanup_interval: Duration,
    /// Time after which the sweeper purges the whole cache and stops. Only honoured while a
    /// sweeper runs.
    #[cfg_attr(feature = "serde", serde(with = "humantime_serde"))]
    pub lifespan: Option<Duration>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_ttl(mut self, default_ttl: impl Into<Expiration>) -> Self {
        self.default_ttl = default_ttl.into();
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// A zero lifespan disables the purge.
    pub fn with_lifespan(mut self, lifespan: Duration) -> Self {
        self.lifespan = (!lifespan.is_zero()).then_some(lifespan);
        self
    }

    pub(crate) fn sweeps(&self) -> bool {
        !self.cleanup_interval.is_zero()
    }
}
