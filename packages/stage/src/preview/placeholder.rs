use crate::data_store::DataObject;
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Height below which an empty container shows its placeholder
pub const PLACEHOLDER_MIN_HEIGHT: f64 = 130.0;

static LEADING_FLOAT: OnceLock<Regex> = OnceLock::new();

/// Parse the numeric prefix of a CSS-ish value (`"20px"` is 20)
pub fn parse_leading_float(raw: &str) -> Option<f64> {
    let pattern = LEADING_FLOAT.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("leading float regex")
    });
    pattern.find(raw)?.as_str().trim().parse().ok()
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_float(s),
        _ => None,
    }
}

fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

/// Whether a container is tall enough to show its placeholder
///
/// Height is `min_height` (130 when unset) plus top and bottom padding
/// from `margins_and_padding`, which may be an object or a JSON string.
/// Unparsable padding counts as zero; an unparsable minimum height hides
/// the placeholder.
pub fn compute_placeholder_visible(data: &DataObject) -> bool {
    let min_height = match data.get("min_height") {
        value if is_unset(value) => PLACEHOLDER_MIN_HEIGHT,
        Some(value) => match numeric(value) {
            Some(height) => height,
            None => return false,
        },
        None => PLACEHOLDER_MIN_HEIGHT,
    };

    let spacing = match data.get("margins_and_padding") {
        Some(Value::String(raw)) => serde_json::from_str(raw).unwrap_or(Value::Null),
        Some(value) => value.clone(),
        None => Value::Null,
    };
    let padding = |side: &str| {
        spacing
            .get("padding")
            .and_then(|padding| padding.get(side))
            .and_then(numeric)
            .unwrap_or(0.0)
    };

    min_height + padding("top") + padding("bottom") >= PLACEHOLDER_MIN_HEIGHT
}
