// Feature values and feature sets
//
// A FeatureSet is the only artifact the core hands back to its caller. Each
// key maps to a number, a count, a flag, or an explicit "unavailable" marker
// that serializes as JSON null.

mod sanitize;

pub use sanitize::{round_to, sanitize, Sanitizer};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{log_feature_error, FeatureError};

/// Result of a single scalar feature computation
pub type FeatureResult = Result<f64, FeatureError>;

/// A single feature value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Flag(bool),
    Count(u64),
    Number(f64),
    Unavailable,
}

impl FeatureValue {
    pub fn is_available(&self) -> bool {
        !matches!(self, FeatureValue::Unavailable)
    }

    /// Numeric view of the value; counts widen, flags and unavailable give None
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FeatureValue::Number(v) => Some(v),
            FeatureValue::Count(n) => Some(n as f64),
            FeatureValue::Flag(_) | FeatureValue::Unavailable => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            FeatureValue::Flag(b) => Some(b),
            _ => None,
        }
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Flag(value)
    }
}

impl From<Option<f64>> for FeatureValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(FeatureValue::Unavailable, FeatureValue::Number)
    }
}

/// Mapping from feature name to value
///
/// Keys iterate in sorted order so serialized reports are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<FeatureValue>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn insert_unavailable(&mut self, key: &str) {
        self.values.insert(key.to_string(), FeatureValue::Unavailable);
    }

    /// Record a computed feature, turning an error into "unavailable"
    pub fn insert_result(&mut self, key: &str, result: FeatureResult) {
        let value = match result {
            Ok(v) => FeatureValue::Number(v),
            Err(err) => {
                log_feature_error(&err, key);
                FeatureValue::Unavailable
            }
        };
        self.values.insert(key.to_string(), value);
    }

    /// Mark every key unavailable because a shared prerequisite failed
    pub fn insert_all_unavailable(&mut self, keys: &[&str], err: &FeatureError) {
        for key in keys {
            log_feature_error(err, key);
            self.insert_unavailable(key);
        }
    }

    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Key union; values from `other` win on collision
    pub fn merge(&mut self, other: FeatureSet) {
        self.values.extend(other.values);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FeatureValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn available_count(&self) -> usize {
        self.values.values().filter(|v| v.is_available()).count()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut FeatureValue> {
        self.values.values_mut()
    }
}

impl FromIterator<(String, FeatureValue)> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = (String, FeatureValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_result_maps_errors_to_unavailable() {
        let mut set = FeatureSet::new();
        set.insert_result("cpp", Ok(12.5));
        set.insert_result("ppe", Err(FeatureError::insufficient("voiced frames", 3, 1)));

        assert_eq!(set.get("cpp"), Some(&FeatureValue::Number(12.5)));
        assert_eq!(set.get("ppe"), Some(&FeatureValue::Unavailable));
        assert_eq!(set.available_count(), 1);
    }

    #[test]
    fn test_merge_is_key_union() {
        let mut a = FeatureSet::new();
        a.insert("f0_mean", 120.0);
        let mut b = FeatureSet::new();
        b.insert("festination", false);
        a.merge(b);

        assert_eq!(a.len(), 2);
        assert!(a.contains_key("f0_mean"));
        assert_eq!(a.get("festination").and_then(|v| v.as_bool()), Some(false));
    }

    #[test]
    fn test_serializes_to_flat_json() {
        let mut set = FeatureSet::new();
        set.insert("onset_count", FeatureValue::Count(6));
        set.insert("festination", true);
        set.insert("vsa", FeatureValue::Unavailable);
        set.insert("cpp", 3.25);

        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "cpp": 3.25,
                "festination": true,
                "onset_count": 6,
                "vsa": null
            })
        );

        let parsed: FeatureSet = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, set);
    }
}
