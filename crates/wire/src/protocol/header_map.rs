//! Ordered, multi-value header storage.
//!
//! Names are stored in their canonical MIME form (`content-length` becomes
//! `Content-Length`) so lookups are case-insensitive, and the map is kept sorted
//! by name so serialization is deterministic. Repeated names accumulate values
//! in insertion order, which keeps headers such as `Set-Cookie` intact.

use std::collections::BTreeMap;
use std::fmt;

use bytes::{BufMut, BytesMut};
use http::HeaderName;

use crate::ensure;
use crate::protocol::HeaderError;

/// A mapping from canonical header name to one or more values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: BTreeMap<String, Vec<String>>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from `(name, value)` pairs, appending repeated names.
    pub fn try_from_pairs<I, K, V>(pairs: I) -> Result<Self, HeaderError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = Self::new();
        for (name, value) in pairs {
            map.append(name.as_ref(), value.as_ref())?;
        }
        Ok(map)
    }

    /// Returns the first value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    /// Returns every value recorded for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries.get(&canonical_name(name)).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&canonical_name(name))
    }

    /// Replaces all values of `name` with `value`.
    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let (name, value) = validate(name, value)?;
        self.entries.insert(name, vec![value]);
        Ok(())
    }

    /// Adds `value` to the values already recorded for `name`.
    pub fn append(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let (name, value) = validate(name, value)?;
        self.entries.entry(name).or_default().push(value);
        Ok(())
    }

    /// Removes `name` and returns its values, if it was present.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.entries.remove(&canonical_name(name))
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of `Name: Value` lines the map serializes to.
    pub fn values_len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates `(name, value)` pairs sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(name, values)| values.iter().map(move |value| (name.as_str(), value.as_str())))
    }

    /// Writes every header as `Name: Value\r\n`, without the terminating blank line.
    pub fn encode(&self, dst: &mut BytesMut) {
        dst.reserve(self.encoded_len());
        for (name, value) in self.iter() {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            dst.put_slice(value.as_bytes());
            dst.put_slice(b"\r\n");
        }
    }

    /// Exact number of bytes [`HeaderMap::encode`] writes.
    pub fn encoded_len(&self) -> usize {
        self.iter().map(|(name, value)| name.len() + 2 + value.len() + 2).sum()
    }
}

impl fmt::Display for HeaderMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.iter() {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

fn validate(name: &str, value: &str) -> Result<(String, String), HeaderError> {
    let name = name.trim();
    ensure!(!name.is_empty() && HeaderName::from_bytes(name.as_bytes()).is_ok(), HeaderError::InvalidName { name: name.to_string() });

    let canonical = canonical_name(name);
    let value = value.trim();
    ensure!(!value.bytes().any(|b| b == b'\r' || b == b'\n'), HeaderError::InvalidValue { name: canonical });

    Ok((canonical, value.to_string()))
}

/// Returns the canonical MIME form of a header name: the first letter and every
/// letter following a hyphen upper-cased, everything else lower-cased.
///
/// ```
/// use micro_wire::protocol::canonical_name;
///
/// assert_eq!(canonical_name("content-length"), "Content-Length");
/// assert_eq!(canonical_name("X-FORWARDED-FOR"), "X-Forwarded-For");
/// ```
pub fn canonical_name(name: &str) -> String {
    let mut upper = true;
    name.trim()
        .chars()
        .map(|c| {
            let mapped = if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() };
            upper = c == '-';
            mapped
        })
        .collect()
}
