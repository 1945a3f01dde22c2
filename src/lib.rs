//! A thread-safe, in-memory key/value cache with per-entry time-to-live.
//!
//! Entries expire after their TTL. Expired entries are hidden from reads immediately and removed
//! by a background sweeper thread. Optionally the sweeper purges the whole cache once a fixed
//! lifespan has elapsed.
//!
//! # Features
//!
//! - Thread-safe by default - a single reader/writer lock guards the entries
//! - Per-entry TTL, a configurable default TTL, or no expiry at all
//! - Lazy expiry on read plus eager expiry by a background sweeper
//! - Optional whole-cache purge after a lifespan
//! - Injectable clock for deterministic tests
//! - No unsafe code
//!
//! # Examples
//!
//! Basic usage with the default TTL and a sweeper running every second:
//!
//! ```rust
//! use plain_ttl_cache::{Cache, Expiration};
//! use std::time::Duration;
//!
//! let cache = Cache::new(Duration::from_secs(300), Duration::from_secs(1)).unwrap();
//!
//! // expires after the default TTL of five minutes
//! cache.set("session", "abc", Expiration::Default);
//! // never expires
//! cache.set("config", "xyz", Expiration::Never);
//! // expires after one minute
//! cache.set("token", "123", Duration::from_secs(60));
//!
//! assert_eq!(cache.get("session"), Some("abc"));
//! assert!(cache.delete("token"));
//! assert_eq!(cache.get("token"), None);
//! ```
//!
//! Purging everything after a lifespan:
//!
//! ```rust
//! use plain_ttl_cache::{Cache, Config, Expiration};
//! use std::time::Duration;
//!
//! let config = Config::new()
//!     .with_cleanup_interval(Duration::from_millis(1))
//!     .with_lifespan(Duration::from_millis(10));
//! let cache = Cache::with_config(config).unwrap();
//!
//! cache.set("key", 1, Expiration::Never);
//! std::thread::sleep(Duration::from_millis(100));
//!
//! assert_eq!(cache.get("key"), None);
//! ```
//!
//! Thread-safe usage across multiple threads:
//!
//! ```rust
//! use plain_ttl_cache::{Cache, Expiration};
//! use std::sync::Arc;
//! use std::thread;
//! use std::time::Duration;
//!
//! let cache = Arc::new(Cache::new(Expiration::Never, Duration::ZERO).unwrap());
//! cache.set("key1", "value1", Expiration::Never);
//!
//! let cache_in_arc = Arc::clone(&cache);
//! let handle = thread::spawn(move || {
//!     cache_in_arc.set("key2", "value2", Expiration::Never);
//! });
//!
//! handle.join().unwrap();
//!
//! assert_eq!(cache.get("key1"), Some("value1"));
//! assert_eq!(cache.get("key2"), Some("value2"));
//! ```

#![forbid(unsafe_code)]
pub mod cache;
mod config;
mod error;

pub use cache::Cache;
pub use cache::clock::{Clock, ManualClock, SystemClock};
pub use cache::stats::Stats;
pub use cache::{Builder, EvictionListener, Expiration, RemovalCause};
pub use config::Config;
pub use error::{Error, Result};
