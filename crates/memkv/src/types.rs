//! KV store data types
//!
//! Values are a closed set of variants; every mutating operation matches on
//! the active variant and reports a `TypeMismatch` for the rest.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Value types supported by the KV store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KvValue {
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Opaque binary payload
    Bytes(Vec<u8>),
}

impl KvValue {
    /// Name of the active variant, as reported in type mismatch errors
    pub fn type_name(&self) -> &'static str {
        match self {
            KvValue::Int(_) => "int",
            KvValue::Float(_) => "float",
            KvValue::String(_) => "string",
            KvValue::Bytes(_) => "bytes",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            KvValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            KvValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            KvValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            KvValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl From<i64> for KvValue {
    fn from(n: i64) -> Self {
        KvValue::Int(n)
    }
}

impl From<f64> for KvValue {
    fn from(f: f64) -> Self {
        KvValue::Float(f)
    }
}

impl From<String> for KvValue {
    fn from(s: String) -> Self {
        KvValue::String(s)
    }
}

impl From<&str> for KvValue {
    fn from(s: &str) -> Self {
        KvValue::String(s.to_string())
    }
}

impl From<Vec<u8>> for KvValue {
    fn from(b: Vec<u8>) -> Self {
        KvValue::Bytes(b)
    }
}

/// Expiration requested by a `set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// The entry lives until deleted or overwritten
    Never,
    /// Use the engine's configured default (falls back to `Never`)
    #[default]
    Default,
    /// Expire this long after the write
    After(Duration),
}

impl Ttl {
    /// Resolve against the configured default TTL
    pub(crate) fn resolve(self, default_ttl: Option<Duration>) -> Option<Duration> {
        match self {
            Ttl::Never => None,
            Ttl::Default => default_ttl,
            Ttl::After(d) => Some(d),
        }
    }
}

impl From<Duration> for Ttl {
    fn from(d: Duration) -> Self {
        Ttl::After(d)
    }
}
