//! Parameter codec for queued command lines.
//!
//! A queue line looks like `./gc --instance le450_25c --nb_colors 29 ...`.
//! Every token starting with `--` is a key and the token right after it is
//! its value. Values made only of decimal digits become integers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Prefix that marks a token as a flag.
pub const FLAG_PREFIX: &str = "--";

/// A single coerced value, either from a queue line or a result artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(u64),
    Text(String),
}

impl ParamValue {
    /// Apply the digit-coercion rule to a raw token.
    ///
    /// A token made solely of ASCII digits becomes [`ParamValue::Int`];
    /// anything else (including the empty token and digit strings too large
    /// for a `u64`) stays text.
    pub fn coerce(token: &str) -> Self {
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(value) = token.parse::<u64>() {
                return Self::Int(value);
            }
        }
        Self::Text(token.to_string())
    }

    /// Integer view of the value, if it was coerced to one.
    pub fn as_int(&self) -> Option<u64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{}", value),
            Self::Text(value) => write!(f, "{}", value),
        }
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::coerce(value)
    }
}

/// Flag → value map that keeps first-insertion order.
///
/// Order matters because unknown flags are written back in the order they
/// were read when a follow-up job is recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamMap {
    entries: Vec<(String, ParamValue)>,
}

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. A replaced key keeps its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove a key and return its value.
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Tokenize a queue line into its flag/value pairs.
///
/// Tokens outside a flag/value pair (the program path, stray words) are
/// skipped. A flag with no following token means the line was cut short and
/// is rejected instead of silently dropped.
pub fn parse_command_line(line: &str) -> Result<ParamMap, CoreError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let mut params = ParamMap::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if token.starts_with(FLAG_PREFIX) {
            let value = tokens.get(i + 1).ok_or_else(|| CoreError::MissingValue {
                flag: token.to_string(),
            })?;
            params.insert(token, ParamValue::coerce(value));
            i += 2;
        } else {
            i += 1;
        }
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_digits() {
        assert_eq!(ParamValue::coerce("29"), ParamValue::Int(29));
        assert_eq!(ParamValue::coerce("007"), ParamValue::Int(7));
        assert_eq!(ParamValue::coerce("le450_25c"), ParamValue::Text("le450_25c".into()));
        assert_eq!(ParamValue::coerce("-3"), ParamValue::Text("-3".into()));
        assert_eq!(ParamValue::coerce("1.5"), ParamValue::Text("1.5".into()));
        assert_eq!(ParamValue::coerce(""), ParamValue::Text(String::new()));
    }

    #[test]
    fn test_coerce_overflow_stays_text() {
        let huge = "99999999999999999999999";
        assert_eq!(ParamValue::coerce(huge), ParamValue::Text(huge.into()));
    }

    #[test]
    fn test_parse_command_line() {
        let params = parse_command_line(
            "./gc --instance le450_25c --nb_colors 29 --use_target true --rand_seed 5\n",
        )
        .unwrap();

        assert_eq!(params.len(), 4);
        assert_eq!(params.get("--instance"), Some(&ParamValue::Text("le450_25c".into())));
        assert_eq!(params.get("--nb_colors"), Some(&ParamValue::Int(29)));
        assert_eq!(params.get("--use_target"), Some(&ParamValue::Text("true".into())));
        assert_eq!(params.get("--rand_seed"), Some(&ParamValue::Int(5)));
        assert!(params.get("./gc").is_none());
    }

    #[test]
    fn test_parse_skips_stray_tokens() {
        let params = parse_command_line("./gc stray --seed 1 other --name x").unwrap();
        let keys: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["--seed", "--name"]);
    }

    #[test]
    fn test_parse_trailing_flag_is_error() {
        let err = parse_command_line("./gc --instance foo --nb_colors").unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingValue {
                flag: "--nb_colors".into()
            }
        );
    }

    #[test]
    fn test_duplicate_flag_keeps_position() {
        let params = parse_command_line("--a 1 --b 2 --a 3").unwrap();
        let pairs: Vec<(&str, String)> = params.iter().map(|(k, v)| (k, v.to_string())).collect();
        assert_eq!(pairs, vec![("--a", "3".to_string()), ("--b", "2".to_string())]);
    }

    #[test]
    fn test_empty_line() {
        assert!(parse_command_line("   ").unwrap().is_empty());
    }
}
