//! Shared data types.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Free-form metadata attached to a memory (file path, symbol name, ...).
pub type Context = BTreeMap<String, ContextValue>;

/// A single metadata value.
///
/// The set of shapes is closed and mirrors JSON, so any context object
/// written by another tool loads without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<ContextValue>),
    Map(BTreeMap<String, ContextValue>),
}

impl ContextValue {
    /// Borrow the string payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for ContextValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b),
            Self::Number(n) => write!(f, "{}", n),
            Self::String(s) => write!(f, "{}", s),
            Self::Null => write!(f, "null"),
            Self::Array(_) | Self::Map(_) => match serde_json::to_string(self) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "{{..}}"),
            },
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// Non-finite floats have no JSON form and become `0`.
impl From<f64> for ContextValue {
    fn from(value: f64) -> Self {
        Self::Number(serde_json::Number::from_f64(value).unwrap_or_else(|| serde_json::Number::from(0i64)))
    }
}

impl From<Vec<ContextValue>> for ContextValue {
    fn from(value: Vec<ContextValue>) -> Self {
        Self::Array(value)
    }
}

impl From<BTreeMap<String, ContextValue>> for ContextValue {
    fn from(value: BTreeMap<String, ContextValue>) -> Self {
        Self::Map(value)
    }
}

/// Deserialize a context map, treating `null` as empty.
pub(crate) fn null_as_empty_context<'de, D>(deserializer: D) -> Result<Context, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Context>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_roundtrip() {
        let mut nested = BTreeMap::new();
        nested.insert("line".to_string(), ContextValue::from(42i64));

        let mut context = Context::new();
        context.insert("file".into(), "app/Models/User.php".into());
        context.insert("dirty".into(), true.into());
        context.insert("score".into(), 0.5.into());
        context.insert("location".into(), nested.into());

        let json = serde_json::to_string(&context).unwrap();
        assert_eq!(
            json,
            r#"{"dirty":true,"file":"app/Models/User.php","location":{"line":42},"score":0.5}"#
        );

        let parsed: Context = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, context);
    }

    #[test]
    fn test_null_and_array_values() {
        let json = r#"{"files":["a.php",{"line":3}],"symbol":null}"#;
        let parsed: Context = serde_json::from_str(json).unwrap();

        assert_eq!(parsed["symbol"], ContextValue::Null);
        assert_eq!(
            parsed["files"],
            ContextValue::from(vec![
                ContextValue::from("a.php"),
                ContextValue::from(BTreeMap::from([("line".to_string(), ContextValue::from(3i64))])),
            ])
        );
        assert_eq!(serde_json::to_string(&parsed).unwrap(), json);
    }

    #[test]
    fn test_display() {
        assert_eq!(ContextValue::from("x").to_string(), "x");
        assert_eq!(ContextValue::from(7i64).to_string(), "7");
        assert_eq!(ContextValue::Null.to_string(), "null");
        assert_eq!(ContextValue::from(vec![ContextValue::from(1i64), ContextValue::from("a")]).to_string(), r#"[1,"a"]"#);
        assert_eq!(ContextValue::from(f64::NAN), ContextValue::from(0i64));
    }
}
