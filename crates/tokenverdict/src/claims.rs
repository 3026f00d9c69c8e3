//! Claim values and the decoded claims mapping
//!
//! Claims arrive as attacker-controlled JSON. Every value is converted into a
//! [`ClaimValue`] once at decode time and read back through typed extractors
//! that report the shape they found instead of coercing it.

use crate::error::{Error, Result};
use miniserde::json::{Number, Value};
use std::collections::BTreeMap;

/// Issuer
pub const ISS: &str = "iss";
/// Expiration time, seconds since the Unix epoch
pub const EXP: &str = "exp";
/// Identifier of the user the token was issued to
pub const USER_ID: &str = "user_id";
/// Granted scopes
pub const SCOPE: &str = "scope";
/// Identifier of the client the token was issued to
pub const CID: &str = "cid";
/// Audience
pub const AUD: &str = "aud";
/// Revocation fingerprint
pub const REVOCATION_SIGNATURE: &str = "rev_sig";

static ABSENT: ClaimValue = ClaimValue::Absent;

/// Dynamic shape of a single claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimValue {
    /// The claim is not in the payload
    Absent,
    /// The claim is present with an explicit JSON `null`
    Null,
    String(String),
    /// Integral number that fits in an `i64`
    Integer(i64),
    /// Array whose elements are all strings
    StringList(Vec<String>),
    /// Anything else: booleans, floats, objects, mixed arrays, oversized integers
    Other,
}

impl ClaimValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ClaimValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ClaimValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            ClaimValue::StringList(items) => Some(items),
            _ => None,
        }
    }

    /// A single string or a list of strings, normalized to a list
    pub fn as_one_or_many(&self) -> Option<Vec<&str>> {
        match self {
            ClaimValue::String(s) => Some(vec![s.as_str()]),
            ClaimValue::StringList(items) => Some(items.iter().map(String::as_str).collect()),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, ClaimValue::Absent)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ClaimValue::Null)
    }
}

impl From<&Value> for ClaimValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => ClaimValue::Null,
            Value::String(s) => ClaimValue::String(s.clone()),
            Value::Number(Number::I64(n)) => ClaimValue::Integer(*n),
            Value::Number(Number::U64(n)) => {
                i64::try_from(*n).map_or(ClaimValue::Other, ClaimValue::Integer)
            }
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map_or(ClaimValue::Other, ClaimValue::StringList),
            _ => ClaimValue::Other,
        }
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::String(value.to_string())
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Integer(value)
    }
}

impl From<Vec<&str>> for ClaimValue {
    fn from(value: Vec<&str>) -> Self {
        ClaimValue::StringList(value.into_iter().map(String::from).collect())
    }
}

/// Outcome of reading one claim with an expected shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimRead<T> {
    Found(T),
    Absent,
    Null,
    Malformed,
}

/// Decoded claims, keyed by claim name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims {
    values: BTreeMap<String, ClaimValue>,
}

impl Claims {
    /// Parse a JSON payload that must be an object
    pub fn from_json(payload: &str) -> Result<Self> {
        let value: Value = miniserde::json::from_str(payload)
            .map_err(|e| Error::FormatInvalidJson(format!("Failed to parse claims: {e}")))?;

        match value {
            Value::Object(object) => Ok(object
                .iter()
                .map(|(name, value)| (name.clone(), ClaimValue::from(value)))
                .collect()),
            _ => Err(Error::FormatInvalidJson(
                "Claims payload is not a JSON object".into(),
            )),
        }
    }

    /// Claim by name, [`ClaimValue::Absent`] when missing
    pub fn get(&self, name: &str) -> &ClaimValue {
        self.values.get(name).unwrap_or(&ABSENT)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClaimValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Read a claim, classifying absent and null before applying `extract`
    pub fn read<'a, T>(
        &'a self,
        name: &str,
        extract: impl FnOnce(&'a ClaimValue) -> Option<T>,
    ) -> ClaimRead<T> {
        match self.get(name) {
            ClaimValue::Absent => ClaimRead::Absent,
            ClaimValue::Null => ClaimRead::Null,
            value => extract(value).map_or(ClaimRead::Malformed, ClaimRead::Found),
        }
    }

    pub fn string(&self, name: &str) -> ClaimRead<&str> {
        self.read(name, ClaimValue::as_str)
    }

    pub fn integer(&self, name: &str) -> ClaimRead<i64> {
        self.read(name, ClaimValue::as_i64)
    }

    pub fn string_list(&self, name: &str) -> ClaimRead<&[String]> {
        self.read(name, ClaimValue::as_string_list)
    }
}

impl FromIterator<(String, ClaimValue)> for Claims {
    fn from_iter<I: IntoIterator<Item = (String, ClaimValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, ClaimValue)> for Claims {
    fn from_iter<I: IntoIterator<Item = (&'a str, ClaimValue)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}
