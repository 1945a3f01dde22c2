use crate::error::Error;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Time-to-live requested for an entry.
///
/// A zero [`Duration`] converts into [`Expiration::Default`], so `Duration::ZERO` and
/// `Expiration::Default` can be used interchangeably when calling [`crate::Cache::set`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(try_from = "String", into = "String")
)]
pub enum Expiration {
    /// Use the default TTL the cache was configured with.
    #[default]
    Default,
    /// The entry never expires. It is only removed by a delete or a purge.
    Never,
    /// The entry expires once the duration has elapsed.
    After(Duration),
}

impl Expiration {
    /// Resolves `self` against the cache default into a concrete TTL. `None` means the entry
    /// never expires.
    pub(crate) fn resolve(self, default_ttl: Expiration) -> Option<Duration> {
        match self {
            Expiration::Default => match default_ttl.as_default_ttl() {
                Expiration::After(ttl) => Some(ttl),
                Expiration::Default | Expiration::Never => None,
            },
            Expiration::After(ttl) if ttl.is_zero() => Expiration::Default.resolve(default_ttl),
            Expiration::Never => None,
            Expiration::After(ttl) => Some(ttl),
        }
    }

    /// A default TTL of [`Expiration::Default`] would refer to itself, it means "never". A zero
    /// duration is the same request as [`Expiration::Default`].
    pub(crate) fn as_default_ttl(self) -> Expiration {
        match self {
            Expiration::Default => Expiration::Never,
            Expiration::After(ttl) if ttl.is_zero() => Expiration::Never,
            other => other,
        }
    }
}

impl From<Duration> for Expiration {
    fn from(ttl: Duration) -> Self {
        if ttl.is_zero() {
            Expiration::Default
        } else {
            Expiration::After(ttl)
        }
    }
}

impl From<Option<Duration>> for Expiration {
    fn from(ttl: Option<Duration>) -> Self {
        ttl.map_or(Expiration::Never, Expiration::from)
    }
}

impl FromStr for Expiration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "default" => Ok(Expiration::Default),
            "never" => Ok(Expiration::Never),
            other => humantime::parse_duration(other)
                .map(Expiration::from)
                .map_err(|source| Error::InvalidExpiration {
                    value: s.to_owned(),
                    source,
                }),
        }
    }
}

impl TryFrom<String> for Expiration {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Expiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiration::Default => f.write_str("default"),
            Expiration::Never => f.write_str("never"),
            Expiration::After(ttl) => write!(f, "{}", humantime::format_duration(*ttl)),
        }
    }
}

impl From<Expiration> for String {
    fn from(expiration: Expiration) -> Self {
        expiration.to_string()
    }
}
