//! Layered hint store
//!
//! Fit parameters are looked up by an ordered chain of key names: the first
//! name present anywhere in the store wins. Layers pushed later override
//! earlier ones for the same name.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{FitError, Result};

/// A single configuration value
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum HintValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl From<bool> for HintValue {
    fn from(v: bool) -> Self {
        HintValue::Bool(v)
    }
}

impl From<i64> for HintValue {
    fn from(v: i64) -> Self {
        HintValue::Int(v)
    }
}

impl From<i32> for HintValue {
    fn from(v: i32) -> Self {
        HintValue::Int(v as i64)
    }
}

impl From<usize> for HintValue {
    fn from(v: usize) -> Self {
        HintValue::Int(v as i64)
    }
}

impl From<f64> for HintValue {
    fn from(v: f64) -> Self {
        HintValue::Float(v)
    }
}

impl From<&str> for HintValue {
    fn from(v: &str) -> Self {
        HintValue::Str(v.to_string())
    }
}

/// Typed extraction of a hint value
pub trait FromHint: Sized {
    fn from_hint(name: &str, value: &HintValue) -> Result<Self>;
}

fn type_error(name: &str, expected: &'static str) -> FitError {
    FitError::HintType {
        name: name.to_string(),
        expected,
    }
}

impl FromHint for i64 {
    fn from_hint(name: &str, value: &HintValue) -> Result<Self> {
        match *value {
            HintValue::Int(v) => Ok(v),
            // JSON producers frequently write integers as floats
            HintValue::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
            _ => Err(type_error(name, "integer")),
        }
    }
}

impl FromHint for usize {
    fn from_hint(name: &str, value: &HintValue) -> Result<Self> {
        let v = i64::from_hint(name, value)?;
        usize::try_from(v).map_err(|_| type_error(name, "non-negative integer"))
    }
}

impl FromHint for f64 {
    fn from_hint(name: &str, value: &HintValue) -> Result<Self> {
        match *value {
            HintValue::Float(v) => Ok(v),
            HintValue::Int(v) => Ok(v as f64),
            _ => Err(type_error(name, "number")),
        }
    }
}

impl FromHint for bool {
    fn from_hint(name: &str, value: &HintValue) -> Result<Self> {
        match *value {
            HintValue::Bool(v) => Ok(v),
            _ => Err(type_error(name, "boolean")),
        }
    }
}

impl FromHint for String {
    fn from_hint(name: &str, value: &HintValue) -> Result<Self> {
        match value {
            HintValue::Str(v) => Ok(v.clone()),
            _ => Err(type_error(name, "string")),
        }
    }
}

/// Ordered stack of hint layers
#[derive(Debug, Clone, Default)]
pub struct HintStore {
    layers: Vec<HashMap<String, HintValue>>,
}

impl HintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a layer that overrides all existing layers
    pub fn push_layer(&mut self, layer: HashMap<String, HintValue>) {
        self.layers.push(layer);
    }

    /// Push a layer parsed from a JSON object
    ///
    /// ```
    /// use zpkfit_core::hints::HintStore;
    /// let mut hints = HintStore::new();
    /// hints.push_json_layer(r#"{"rational_fit_order": 8}"#).unwrap();
    /// let order: Option<usize> = hints.resolve(&["rational_fit_order"]).unwrap();
    /// assert_eq!(order, Some(8));
    /// ```
    pub fn push_json_layer(&mut self, json: &str) -> Result<()> {
        let layer: HashMap<String, HintValue> = serde_json::from_str(json)?;
        self.push_layer(layer);
        Ok(())
    }

    /// Set a value in the top layer, creating it if needed
    pub fn set(&mut self, name: &str, value: impl Into<HintValue>) -> &mut Self {
        if self.layers.is_empty() {
            self.layers.push(HashMap::new());
        }
        if let Some(top) = self.layers.last_mut() {
            top.insert(name.to_string(), value.into());
        }
        self
    }

    /// Look up the first name of the chain that is present
    ///
    /// Names are tried in order; for each name the layers are searched from
    /// the most recent to the oldest.
    pub fn get<'a>(&'a self, names: &[&str]) -> Option<(&'a str, &'a HintValue)> {
        names.iter().find_map(|name| {
            self.layers
                .iter()
                .rev()
                .find_map(|layer| layer.get_key_value(*name))
                .map(|(k, v)| (k.as_str(), v))
        })
    }

    /// Typed lookup over a name chain; `Ok(None)` when no name is present
    pub fn resolve<T: FromHint>(&self, names: &[&str]) -> Result<Option<T>> {
        match self.get(names) {
            Some((name, value)) => T::from_hint(name, value).map(Some),
            None => Ok(None),
        }
    }

    /// Typed lookup with a default for absent names
    pub fn resolve_or<T: FromHint>(&self, names: &[&str], default: T) -> Result<T> {
        Ok(self.resolve(names)?.unwrap_or(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_name_wins() {
        let mut hints = HintStore::new();
        hints.set("order_initial", 4usize).set("rational_fit_order", 8usize);

        let order: Option<usize> = hints
            .resolve(&["rational_AAA_fit_order", "rational_fit_order", "order_initial"])
            .unwrap();
        assert_eq!(order, Some(8));
    }

    #[test]
    fn test_absent_chain_is_none() {
        let hints = HintStore::new();
        let order: Option<usize> = hints.resolve(&["a", "b"]).unwrap();
        assert_eq!(order, None);
        assert_eq!(hints.resolve_or(&["a"], 20usize).unwrap(), 20);
    }

    #[test]
    fn test_later_layer_overrides() {
        let mut hints = HintStore::new();
        hints.push_json_layer(r#"{"order_max": 10, "order_min": 2}"#).unwrap();
        hints.push_json_layer(r#"{"order_max": 12}"#).unwrap();

        assert_eq!(hints.resolve::<usize>(&["order_max"]).unwrap(), Some(12));
        assert_eq!(hints.resolve::<usize>(&["order_min"]).unwrap(), Some(2));
    }

    #[test]
    fn test_name_order_beats_layer_order() {
        let mut hints = HintStore::new();
        hints.push_json_layer(r#"{"specific": 3}"#).unwrap();
        hints.push_json_layer(r#"{"generic": 9}"#).unwrap();

        assert_eq!(hints.resolve::<i64>(&["specific", "generic"]).unwrap(), Some(3));
    }

    #[test]
    fn test_integral_float_accepted() {
        let mut hints = HintStore::new();
        hints.push_json_layer(r#"{"order": 6.0, "bad": 6.5}"#).unwrap();

        assert_eq!(hints.resolve::<usize>(&["order"]).unwrap(), Some(6));
        assert!(matches!(
            hints.resolve::<usize>(&["bad"]),
            Err(FitError::HintType { .. })
        ));
    }

    #[test]
    fn test_negative_rejected_for_usize() {
        let mut hints = HintStore::new();
        hints.set("order", -1i64);
        assert!(hints.resolve::<usize>(&["order"]).is_err());
        assert_eq!(hints.resolve::<i64>(&["order"]).unwrap(), Some(-1));
    }

    #[test]
    fn test_invalid_json_layer() {
        let mut hints = HintStore::new();
        assert!(matches!(
            hints.push_json_layer("[1, 2]"),
            Err(FitError::HintLayer(_))
        ));
    }
}
