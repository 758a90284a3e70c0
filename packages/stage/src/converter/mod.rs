//! Field converters between markup strings and store values
//!
//! `from_dom` interprets a raw attribute, style or text value. `to_dom`
//! renders one field of a data snapshot back into markup, or omits it by
//! returning `None`. Converters are looked up by name from a
//! [`ConverterPool`], so new ones can be registered without touching the
//! content types that use them.

mod display;
mod image;
mod scalar;

pub use display::DisplayConverter;
pub use image::ImageConverter;
pub use scalar::{
    BooleanConverter, CssClassesConverter, JsonConverter, NumberConverter,
    StyleDimensionConverter, TextConverter,
};

use crate::asset::AssetResolver;
use crate::data_store::DataObject;
use crate::error::ConversionError;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::rc::Rc;

pub trait Converter: Debug {
    fn from_dom(&self, raw: &str) -> Result<Value, ConversionError>;

    fn to_dom(&self, name: &str, data: &DataObject) -> Option<String>;
}

/// Named converters available to content type definitions
#[derive(Debug, Default, Clone)]
pub struct ConverterPool {
    converters: HashMap<String, Rc<dyn Converter>>,
}

impl ConverterPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pool with the built-in converters registered
    pub fn with_defaults(assets: Rc<dyn AssetResolver>) -> Self {
        let mut pool = Self::new();
        pool.register("text", Rc::new(TextConverter));
        pool.register("display", Rc::new(DisplayConverter));
        pool.register("number", Rc::new(NumberConverter));
        pool.register("boolean", Rc::new(BooleanConverter));
        pool.register("json", Rc::new(JsonConverter));
        pool.register("css_classes", Rc::new(CssClassesConverter));
        pool.register("style_dimension", Rc::new(StyleDimensionConverter));
        pool.register("image", Rc::new(ImageConverter::new(assets)));
        pool
    }

    /// Register a converter, replacing any with the same name
    pub fn register(&mut self, name: impl Into<String>, converter: Rc<dyn Converter>) {
        self.converters.insert(name.into(), converter);
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Converter>> {
        self.converters.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.converters.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.converters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Render a plain value the way most converters write it
pub(crate) fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MediaUrlResolver;

    #[test]
    fn test_default_pool() {
        let pool = ConverterPool::with_defaults(Rc::new(MediaUrlResolver::default()));
        assert_eq!(
            pool.names(),
            vec![
                "boolean",
                "css_classes",
                "display",
                "image",
                "json",
                "number",
                "style_dimension",
                "text"
            ]
        );
        assert!(pool.get("missing").is_none());
    }

    #[test]
    fn test_register_overrides() {
        let mut pool = ConverterPool::new();
        pool.register("text", Rc::new(NumberConverter));
        assert!(pool.get("text").is_some_and(|c| c.from_dom("abc").is_err()));
    }
}
