use crate::MemoizeError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// How a wrapper serializes concurrent callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Concurrency {
    /// The body runs at most once per key even with many threads calling. Callers of a key
    /// that is being produced wait for it; the wrapper lock is not held while a body runs,
    /// so other keys and other wrappers, including mutually recursive ones, stay available.
    #[default]
    Exclusive,
    /// Racing callers with the same key may each run the body;
    /// the first stored outcome wins and is what every caller gets back.
    Relaxed,
}

impl FromStr for Concurrency {
    type Err = MemoizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exclusive" => Ok(Concurrency::Exclusive),
            "relaxed" => Ok(Concurrency::Relaxed),
            _ => Err(MemoizeError::InvalidConcurrency(s.to_string())),
        }
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concurrency::Exclusive => write!(f, "exclusive"),
            Concurrency::Relaxed => write!(f, "relaxed"),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Concurrency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Concurrency::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemoizeOptions {
    /// Shown in log lines; defaults to the type name of the wrapped callable.
    pub name: Option<String>,
    pub concurrency: Concurrency,
    /// Initial capacity of the outcome cache.
    pub capacity: usize,
}

impl MemoizeOptions {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}
