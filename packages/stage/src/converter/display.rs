use super::Converter;
use crate::data_store::DataObject;
use crate::error::ConversionError;
use serde_json::Value;

/// Visibility flag stored as the `display` style property
///
/// Only a hidden node writes anything (`none`); a visible node omits the
/// property entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayConverter;

impl Converter for DisplayConverter {
    fn from_dom(&self, raw: &str) -> Result<Value, ConversionError> {
        Ok(Value::Bool(raw.trim() != "none"))
    }

    fn to_dom(&self, name: &str, data: &DataObject) -> Option<String> {
        match data.get(name) {
            Some(Value::Bool(false)) => Some("none".to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> DataObject {
        let mut data = DataObject::new();
        data.insert("display".into(), value);
        data
    }

    #[test]
    fn test_from_dom() {
        assert_eq!(DisplayConverter.from_dom("none"), Ok(json!(false)));
        assert_eq!(DisplayConverter.from_dom("flex"), Ok(json!(true)));
        assert_eq!(DisplayConverter.from_dom(""), Ok(json!(true)));
    }

    #[test]
    fn test_to_dom_only_writes_hidden() {
        assert_eq!(DisplayConverter.to_dom("display", &data(json!(false))).as_deref(), Some("none"));
        assert_eq!(DisplayConverter.to_dom("display", &data(json!(true))), None);
        assert_eq!(DisplayConverter.to_dom("display", &DataObject::new()), None);
    }
}
