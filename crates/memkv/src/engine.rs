//! KV storage engine
//!
//! One `RwLock` guards the whole keyspace. Reads (`get`, `exists`, `ttl`) take
//! it shared; every mutation takes it exclusive and runs its whole
//! read-modify-write inside that one guard. Guards are scoped, so every exit
//! path releases the lock exactly once.
//!
//! Expiration is lazy: an expired entry stays in the map and is reported as
//! `KeyExpired` until it is deleted, overwritten, or purged.

use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::{KvError, Result};
use crate::sweeper::Sweeper;
use crate::types::{KvValue, Ttl};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Entry in the KV store with metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// The stored value
    pub value: KvValue,
    /// Optional expiration time, `None` never expires
    pub expires_at: Option<Instant>,
}

impl Entry {
    /// Create a new entry expiring `ttl` after `now`
    pub fn new(value: KvValue, now: Instant, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.and_then(|d| deadline(now, d)),
        }
    }

    /// An entry is live only while its expiration is strictly in the future
    #[inline]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.map(|exp| now >= exp).unwrap_or(false)
    }
}

/// `now + ttl`, or `None` (never expires) when that is past what `Instant` can hold
fn deadline(now: Instant, ttl: Duration) -> Option<Instant> {
    now.checked_add(ttl)
}

fn type_mismatch(key: &str, expected: &'static str, actual: &KvValue) -> KvError {
    KvError::TypeMismatch {
        key: key.to_string(),
        expected,
        actual: actual.type_name(),
    }
}

/// Look up a live entry, distinguishing absent from expired
fn live_entry<'a>(
    data: &'a HashMap<String, Entry>,
    key: &str,
    now: Instant,
) -> Result<&'a Entry> {
    match data.get(key) {
        None => Err(KvError::KeyNotFound(key.to_string())),
        Some(entry) if entry.is_expired(now) => Err(KvError::KeyExpired(key.to_string())),
        Some(entry) => Ok(entry),
    }
}

fn live_entry_mut<'a>(
    data: &'a mut HashMap<String, Entry>,
    key: &str,
    now: Instant,
) -> Result<&'a mut Entry> {
    match data.get_mut(key) {
        None => Err(KvError::KeyNotFound(key.to_string())),
        Some(entry) if entry.is_expired(now) => Err(KvError::KeyExpired(key.to_string())),
        Some(entry) => Ok(entry),
    }
}

/// Thread-safe KV engine
///
/// Owned object: share it with `Arc<KvEngine>`. Independent engines never
/// share state.
pub struct KvEngine {
    data: RwLock<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
}

impl KvEngine {
    /// Create a new KV engine with the system clock and default config
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new KV engine reading time from `clock`
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        debug!(
            default_ttl_ms = ?config.default_ttl_ms,
            sweep_interval_ms = ?config.sweep_interval_ms,
            "Creating KV engine"
        );
        Self {
            data: RwLock::new(HashMap::new()),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Spawn the background sweeper if `sweep_interval_ms` is configured
    pub fn start_sweeper(self: &Arc<Self>) -> std::io::Result<Option<Sweeper>> {
        match self.config.sweep_interval() {
            Some(interval) => Sweeper::spawn(self, interval).map(Some),
            None => Ok(None),
        }
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Result<KvValue> {
        let guard = self.data.read();
        let now = self.clock.now();
        live_entry(&guard, key, now).map(|entry| entry.value.clone())
    }

    /// Set a value, overwriting whatever the key held before
    pub fn set(&self, key: &str, value: KvValue, ttl: Ttl) {
        let ttl = ttl.resolve(self.config.default_ttl());
        let mut guard = self.data.write();
        let now = self.clock.now();
        guard.insert(key.to_string(), Entry::new(value, now, ttl));
    }

    /// Check if key exists (and not expired)
    pub fn exists(&self, key: &str) -> bool {
        let guard = self.data.read();
        let now = self.clock.now();
        guard.get(key).map(|e| !e.is_expired(now)).unwrap_or(false)
    }

    /// Delete a key, returns true only if a live entry was removed
    ///
    /// An expired entry is still removed, but reports false.
    pub fn delete(&self, key: &str) -> bool {
        let mut guard = self.data.write();
        let now = self.clock.now();
        guard
            .remove(key)
            .map(|entry| !entry.is_expired(now))
            .unwrap_or(false)
    }

    /// Reset the TTL of a live key to `ttl` from now
    pub fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let mut guard = self.data.write();
        let now = self.clock.now();
        let entry = live_entry_mut(&mut guard, key, now)?;
        entry.expires_at = deadline(now, ttl);
        Ok(())
    }

    /// Set an absolute expiration on a live key
    ///
    /// A past instant is accepted; the entry then reads as expired.
    pub fn expire_at(&self, key: &str, at: Instant) -> Result<()> {
        let mut guard = self.data.write();
        let now = self.clock.now();
        let entry = live_entry_mut(&mut guard, key, now)?;
        entry.expires_at = Some(at);
        Ok(())
    }

    /// Remove the expiration of a live key
    pub fn persist(&self, key: &str) -> Result<()> {
        let mut guard = self.data.write();
        let now = self.clock.now();
        let entry = live_entry_mut(&mut guard, key, now)?;
        entry.expires_at = None;
        Ok(())
    }

    /// Remaining time to live of a live key, `None` if it never expires
    pub fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let guard = self.data.read();
        let now = self.clock.now();
        let entry = live_entry(&guard, key, now)?;
        Ok(entry.expires_at.map(|exp| exp.saturating_duration_since(now)))
    }

    /// Atomic increment for Int values
    ///
    /// An absent or expired key is recreated as `Int(delta)` with no TTL.
    /// Arithmetic wraps on overflow.
    pub fn incr_by(&self, key: &str, delta: i64) -> Result<i64> {
        let mut guard = self.data.write();
        let now = self.clock.now();

        match guard.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => match &mut entry.value {
                KvValue::Int(n) => {
                    *n = n.wrapping_add(delta);
                    Ok(*n)
                }
                other => Err(type_mismatch(key, "int", other)),
            },
            _ => {
                guard.insert(key.to_string(), Entry::new(KvValue::Int(delta), now, None));
                Ok(delta)
            }
        }
    }

    pub fn incr(&self, key: &str) -> Result<i64> {
        self.incr_by(key, 1)
    }

    /// Atomic decrement (convenience wrapper)
    pub fn decr_by(&self, key: &str, delta: i64) -> Result<i64> {
        self.incr_by(key, delta.wrapping_neg())
    }

    pub fn decr(&self, key: &str) -> Result<i64> {
        self.decr_by(key, 1)
    }

    /// Atomic increment for Float values
    ///
    /// Int entries are not promoted; the two numeric families never mix.
    pub fn incr_by_float(&self, key: &str, delta: f64) -> Result<f64> {
        let mut guard = self.data.write();
        let now = self.clock.now();

        match guard.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => match &mut entry.value {
                KvValue::Float(f) => {
                    *f += delta;
                    Ok(*f)
                }
                other => Err(type_mismatch(key, "float", other)),
            },
            _ => {
                guard.insert(key.to_string(), Entry::new(KvValue::Float(delta), now, None));
                Ok(delta)
            }
        }
    }

    pub fn decr_by_float(&self, key: &str, delta: f64) -> Result<f64> {
        self.incr_by_float(key, -delta)
    }

    /// Append to a String value, returns the resulting length in bytes
    ///
    /// Unlike the counters, an expired key is an error here and is left
    /// untouched; only a never-present key is created.
    pub fn append(&self, key: &str, text: &str) -> Result<i64> {
        let mut guard = self.data.write();
        let now = self.clock.now();

        match guard.get_mut(key) {
            None => {
                guard.insert(
                    key.to_string(),
                    Entry::new(KvValue::String(text.to_string()), now, None),
                );
                Ok(text.len() as i64)
            }
            Some(entry) if entry.is_expired(now) => Err(KvError::KeyExpired(key.to_string())),
            Some(entry) => match &mut entry.value {
                KvValue::String(s) => {
                    s.push_str(text);
                    Ok(s.len() as i64)
                }
                other => Err(type_mismatch(key, "string", other)),
            },
        }
    }

    /// Get entry count (including expired - for stats)
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Remove all expired entries, returns count removed
    pub fn purge_expired(&self) -> usize {
        let mut guard = self.data.write();
        let now = self.clock.now();
        let before = guard.len();
        guard.retain(|_, entry| !entry.is_expired(now));
        let removed = before - guard.len();
        trace!(removed, remaining = guard.len(), "Purged expired entries");
        removed
    }
}

impl Default for KvEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KvEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvEngine")
            .field("len", &self.len())
            .field("clock", &self.clock)
            .field("config", &self.config)
            .finish()
    }
}
