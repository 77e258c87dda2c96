//! Query string parameters
//!
//! Every simulation parameter is a non-negative integer with a default. Parse
//! failures surface as [`QueryError`] and become 400 responses.

use thiserror::Error;

/// Errors produced while reading integer query parameters
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid {0}")]
    Invalid(&'static str),

    #[error("{name} exceeds maximum of {max}")]
    TooLarge { name: &'static str, max: u64 },
}

/// Decoded `key=value` pairs of a request URI
#[derive(Debug, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn parse(query: Option<&str>) -> Self {
        let pairs = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self { pairs }
    }

    /// First value for `name`, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Read `name` as an unsigned integer, `default` when absent
    pub fn u64_or(&self, name: &'static str, default: u64) -> Result<u64, QueryError> {
        match self.get(name) {
            None => Ok(default),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| QueryError::Invalid(name)),
        }
    }

    /// Like [`Self::u64_or`], rejecting values above `max`
    pub fn bounded_u64_or(
        &self,
        name: &'static str,
        default: u64,
        max: u64,
    ) -> Result<u64, QueryError> {
        let value = self.u64_or(name, default)?;
        if value > max {
            return Err(QueryError::TooLarge { name, max });
        }
        Ok(value)
    }
}
