use super::{value_to_string, Converter};
use crate::data_store::DataObject;
use crate::error::ConversionError;
use serde_json::{Number, Value};

/// Raw string passthrough
#[derive(Debug, Clone, Copy, Default)]
pub struct TextConverter;

impl Converter for TextConverter {
    fn from_dom(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::String(raw.to_string()))
    }

    fn to_dom(&self, name: &str, data: &DataObject) -> Option<String> {
        data.get(name).and_then(value_to_string)
    }
}

/// Integer or decimal number; empty values are rejected
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberConverter;

impl Converter for NumberConverter {
    fn from_dom(&self, raw: &str) -> Result<Value, ConversionError> {
        let raw = raw.trim();
        if let Ok(integer) = raw.parse::<i64>() {
            return Ok(Value::from(integer));
        }
        raw.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| ConversionError::invalid("number", raw))
    }

    fn to_dom(&self, name: &str, data: &DataObject) -> Option<String> {
        match data.get(name)? {
            Value::String(s) if s.is_empty() => None,
            value => value_to_string(value),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanConverter;

impl Converter for BooleanConverter {
    fn from_dom(&self, raw: &str) -> Result<Value, ConversionError> {
        match raw.trim() {
            "true" | "1" => Ok(Value::Bool(true)),
            "false" | "0" | "" => Ok(Value::Bool(false)),
            other => Err(ConversionError::invalid("boolean", other)),
        }
    }

    fn to_dom(&self, name: &str, data: &DataObject) -> Option<String> {
        data.get(name).and_then(value_to_string)
    }
}

/// Structured value serialized as JSON; an empty string stays empty
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonConverter;

impl Converter for JsonConverter {
    fn from_dom(&self, raw: &str) -> Result<Value, ConversionError> {
        if raw.trim().is_empty() {
            return Ok(Value::String(String::new()));
        }
        serde_json::from_str(raw).map_err(|_| ConversionError::invalid("json", raw))
    }

    fn to_dom(&self, name: &str, data: &DataObject) -> Option<String> {
        match data.get(name)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            value => Some(value.to_string()),
        }
    }
}

/// Whitespace-separated class list, normalized to single spaces
#[derive(Debug, Clone, Copy, Default)]
pub struct CssClassesConverter;

impl Converter for CssClassesConverter {
    fn from_dom(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::String(normalize_classes(raw)))
    }

    fn to_dom(&self, name: &str, data: &DataObject) -> Option<String> {
        let classes = match data.get(name)? {
            Value::String(s) => normalize_classes(s),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" "),
            _ => return None,
        };
        (!classes.is_empty()).then_some(classes)
    }
}

fn normalize_classes(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// CSS length stored without its `px` unit
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleDimensionConverter;

impl Converter for StyleDimensionConverter {
    fn from_dom(&self, raw: &str) -> Result<Value, ConversionError> {
        let raw = raw.trim();
        Ok(Value::String(raw.strip_suffix("px").unwrap_or(raw).to_string()))
    }

    fn to_dom(&self, name: &str, data: &DataObject) -> Option<String> {
        let value = match data.get(name)? {
            Value::String(s) if s.trim().is_empty() => return None,
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        if value.parse::<f64>().is_ok() {
            Some(format!("{}px", value))
        } else {
            Some(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field(value: Value) -> DataObject {
        let mut data = DataObject::new();
        data.insert("f".into(), value);
        data
    }

    #[test]
    fn test_text_passthrough() {
        assert_eq!(TextConverter.from_dom(" a "), Ok(json!(" a ")));
        assert_eq!(TextConverter.to_dom("f", &field(json!(3))).as_deref(), Some("3"));
        assert_eq!(TextConverter.to_dom("f", &field(Value::Null)), None);
        assert_eq!(TextConverter.to_dom("missing", &field(json!("x"))), None);
    }

    #[test]
    fn test_number_keeps_integers_exact() {
        assert_eq!(NumberConverter.from_dom("5"), Ok(json!(5)));
        assert_eq!(NumberConverter.from_dom("2.5"), Ok(json!(2.5)));
        assert!(NumberConverter.from_dom("").is_err());
        assert!(NumberConverter.from_dom("ten").is_err());
        assert_eq!(NumberConverter.to_dom("f", &field(json!(5))).as_deref(), Some("5"));
        assert_eq!(NumberConverter.to_dom("f", &field(json!(""))), None);
    }

    #[test]
    fn test_boolean() {
        assert_eq!(BooleanConverter.from_dom("1"), Ok(json!(true)));
        assert_eq!(BooleanConverter.from_dom("false"), Ok(json!(false)));
        assert!(BooleanConverter.from_dom("maybe").is_err());
        assert_eq!(BooleanConverter.to_dom("f", &field(json!(true))).as_deref(), Some("true"));
    }

    #[test]
    fn test_json() {
        let value = JsonConverter.from_dom(r#"{"padding":{"top":"10"}}"#).unwrap();
        assert_eq!(value["padding"]["top"], json!("10"));
        assert_eq!(
            JsonConverter.to_dom("f", &field(value)).as_deref(),
            Some(r#"{"padding":{"top":"10"}}"#)
        );
        assert!(JsonConverter.from_dom("{oops").is_err());
        assert_eq!(JsonConverter.from_dom(""), Ok(json!("")));
    }

    #[test]
    fn test_css_classes() {
        assert_eq!(CssClassesConverter.from_dom("  a   b "), Ok(json!("a b")));
        assert_eq!(
            CssClassesConverter.to_dom("f", &field(json!(["x", "y"]))).as_deref(),
            Some("x y")
        );
        assert_eq!(CssClassesConverter.to_dom("f", &field(json!(""))), None);
    }

    #[test]
    fn test_style_dimension() {
        assert_eq!(StyleDimensionConverter.from_dom("250px"), Ok(json!("250")));
        assert_eq!(StyleDimensionConverter.from_dom("50%"), Ok(json!("50%")));
        assert_eq!(StyleDimensionConverter.to_dom("f", &field(json!("250"))).as_deref(), Some("250px"));
        assert_eq!(StyleDimensionConverter.to_dom("f", &field(json!("auto"))).as_deref(), Some("auto"));
        assert_eq!(StyleDimensionConverter.to_dom("f", &field(json!(""))), None);
    }
}
