//! Thread-safe, in-process key-value cache
//!
//! # Features
//! - Single reader/writer lock over the whole keyspace, scoped guards only
//! - Typed values (i64, f64, UTF-8 string, opaque bytes)
//! - Lazy TTL expiration driven by an injectable clock
//! - Atomic counters (int and float families) and string append
//! - Optional background sweeper for reclaiming expired entries
//!
//! # Example
//! ```
//! use memkv::{KvEngine, KvValue, Ttl};
//!
//! let engine = KvEngine::new();
//! engine.set("greeting", KvValue::from("hello "), Ttl::Never);
//! assert_eq!(engine.append("greeting", "world").unwrap(), 11);
//! assert_eq!(engine.get("greeting").unwrap(), KvValue::from("hello world"));
//!
//! assert_eq!(engine.incr_by("hits", 5).unwrap(), 5);
//! assert_eq!(engine.incr_by("hits", -2).unwrap(), 3);
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod sweeper;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CacheConfig;
pub use engine::{Entry, KvEngine};
pub use error::{KvError, Result};
pub use sweeper::Sweeper;
pub use types::{KvValue, Ttl};
