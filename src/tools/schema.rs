//! Parameter schemas and argument validation.
//!
//! Every invocation passes through [`validate`] before a handler runs, so
//! handlers only ever see arguments that match their declared schema.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::error::ActionError;

/// Semantic type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
}

impl ParamType {
    fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
        }
    }
}

/// A validated argument value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Text(String),
    Number(f64),
}

impl ArgValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ArgValue::Text(s) => Some(s),
            ArgValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ArgValue::Number(n) => Some(*n),
            ArgValue::Text(_) => None,
        }
    }

    fn to_json(&self) -> Value {
        match self {
            ArgValue::Text(s) => json!(s),
            ArgValue::Number(n) => json!(n),
        }
    }
}

/// One entry of an action's ordered parameter schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
    pub description: String,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ArgValue>,
    /// Inclusive numeric bounds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
}

impl ParamSpec {
    /// A required parameter
    pub fn required(name: impl Into<String>, kind: ParamType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: true,
            default: None,
            range: None,
        }
    }

    /// An optional parameter with no default
    pub fn optional(name: impl Into<String>, kind: ParamType, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    /// Set the value used when the argument is omitted
    pub fn with_default(mut self, value: ArgValue) -> Self {
        self.required = false;
        self.default = Some(value);
        self
    }

    /// Restrict a number to `[min, max]`
    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }

    /// JSON Schema fragment for this parameter
    pub fn json_schema(&self) -> Value {
        let mut prop = json!({
            "type": self.kind.as_str(),
            "description": self.description,
        });
        if let Some(ref default) = self.default {
            prop["default"] = default.to_json();
        }
        if let Some((min, max)) = self.range {
            prop["minimum"] = json!(min);
            prop["maximum"] = json!(max);
        }
        prop
    }
}

/// JSON Schema object for an ordered parameter list
pub fn object_schema(params: &[ParamSpec]) -> Value {
    let mut properties = Map::new();
    for p in params {
        properties.insert(p.name.clone(), p.json_schema());
    }

    let required: Vec<&str> = params
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Arguments that passed validation, in schema order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: Vec<(String, ArgValue)>,
}

impl Arguments {
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ArgValue::as_text)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ArgValue::as_number)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Validate raw invocation arguments against a schema.
///
/// A `null` argument counts as omitted; a `null` argument set is a type
/// mismatch. Unknown keys are ignored.
pub fn validate(action: &str, params: &[ParamSpec], raw: &Value) -> Result<Arguments, ActionError> {
    let object = match raw {
        Value::Object(map) => map,
        other => {
            return Err(ActionError::TypeMismatch {
                action: action.to_string(),
                argument: "<arguments>".to_string(),
                reason: format!("must be an object, got {}", json_kind(other)),
            })
        }
    };

    for key in object.keys() {
        if !params.iter().any(|p| &p.name == key) {
            debug!("Ignoring unknown argument '{}' for action {}", key, action);
        }
    }

    let mut values = Vec::with_capacity(params.len());
    for spec in params {
        match object.get(&spec.name).filter(|v| !v.is_null()) {
            Some(value) => {
                let coerced = coerce(action, spec, value)?;
                values.push((spec.name.clone(), coerced));
            }
            None if spec.required => {
                return Err(ActionError::MissingRequiredArgument {
                    action: action.to_string(),
                    argument: spec.name.clone(),
                });
            }
            None => {
                if let Some(ref default) = spec.default {
                    values.push((spec.name.clone(), default.clone()));
                }
            }
        }
    }

    Ok(Arguments { values })
}

fn coerce(action: &str, spec: &ParamSpec, value: &Value) -> Result<ArgValue, ActionError> {
    let mismatch = |reason: String| ActionError::TypeMismatch {
        action: action.to_string(),
        argument: spec.name.clone(),
        reason,
    };

    match spec.kind {
        ParamType::String => text_value(value)
            .map(ArgValue::Text)
            .ok_or_else(|| mismatch(format!("expected string, got {}", json_kind(value)))),
        ParamType::Number => {
            let n = number_value(value)
                .ok_or_else(|| mismatch(format!("expected number, got {}", json_kind(value))))?;

            if let Some((min, max)) = spec.range {
                if n < min || n > max {
                    return Err(mismatch(format!("must be between {min} and {max}, got {n}")));
                }
            }
            Ok(ArgValue::Number(n))
        }
    }
}

/// Text form of a string-typed value: strings, numbers and booleans.
pub(crate) fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Finite number from a JSON number or a numeric string.
pub(crate) fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("title", ParamType::String, "Title"),
            ParamSpec::optional("note", ParamType::String, "Note"),
            ParamSpec::optional("score", ParamType::Number, "Score")
                .with_default(ArgValue::Number(0.5))
                .with_range(0.0, 1.0),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let args = validate("t", &schema(), &json!({"title": "x"})).unwrap();
        assert_eq!(args.text("title"), Some("x"));
        assert_eq!(args.number("score"), Some(0.5));
        assert!(args.get("note").is_none());
    }

    #[test]
    fn test_null_treated_as_omitted() {
        let args = validate("t", &schema(), &json!({"title": "x", "note": null})).unwrap();
        assert!(args.get("note").is_none());

        let err = validate("t", &schema(), &json!({"title": null})).unwrap_err();
        assert_eq!(err.kind(), "missing_required_argument");
    }

    #[test]
    fn test_numeric_string_coerced() {
        let args = validate("t", &schema(), &json!({"title": 42, "score": "0.25"})).unwrap();
        assert_eq!(args.text("title"), Some("42"));
        assert_eq!(args.number("score"), Some(0.25));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = validate("t", &schema(), &json!({"title": "x", "score": 1.5})).unwrap_err();
        assert!(matches!(err, ActionError::TypeMismatch { ref argument, .. } if argument == "score"));
    }

    #[test]
    fn test_wrong_types_rejected() {
        let err = validate("t", &schema(), &json!({"title": ["a"]})).unwrap_err();
        assert_eq!(err.kind(), "type_mismatch");

        let err = validate("t", &schema(), &json!({"title": "x", "score": "high"})).unwrap_err();
        assert_eq!(err.kind(), "type_mismatch");

        let err = validate("t", &schema(), &json!("not an object")).unwrap_err();
        assert_eq!(err.kind(), "type_mismatch");
    }

    #[test]
    fn test_null_argument_set_is_type_mismatch() {
        let err = validate("t", &schema(), &Value::Null).unwrap_err();
        assert!(matches!(err, ActionError::TypeMismatch { ref argument, .. } if argument == "<arguments>"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let args = validate("t", &schema(), &json!({"title": "x", "extra": true})).unwrap();
        assert!(args.get("extra").is_none());
    }

    #[test]
    fn test_object_schema() {
        let value = object_schema(&schema());
        assert_eq!(value["required"], json!(["title"]));
        assert_eq!(value["properties"]["score"]["maximum"], json!(1.0));
        assert_eq!(value["properties"]["score"]["default"], json!(0.5));
    }
}
