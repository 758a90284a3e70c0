//! Content type definitions
//!
//! A definition names a content type's fields, where each field lives in
//! the stored markup, and the element template the markup is built from.
//! Definitions are plain data and deserialize from JSON.

use crate::data_store::DataObject;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentTypeConfig {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub is_hideable: bool,
    /// Appearance written when no field binds `data-appearance`
    #[serde(default = "default_appearance")]
    pub appearance: String,
    /// Content types this one may contain; empty allows any
    #[serde(default)]
    pub allowed_children: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
    /// Fields that never count towards "configured" when removing
    #[serde(default)]
    pub fields_to_ignore_on_remove: Vec<String>,
    pub template: ElementTemplate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(default = "default_field_value")]
    pub default: Value,
    #[serde(default = "default_converter")]
    pub converter: String,
    /// Where the field is stored; `None` keeps it out of the markup
    #[serde(default)]
    pub binding: Option<FieldBinding>,
}

/// Location of a field's value inside the markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldBinding {
    Attribute { element: String, attribute: String },
    Style { element: String, property: String },
    Text { element: String },
    Html { element: String },
}

/// Element written for a content type, marked with `data-element`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementTemplate {
    pub name: String,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<ElementTemplate>,
    /// Nested content types are written inside this element
    #[serde(default)]
    pub child_slot: bool,
}

fn default_appearance() -> String {
    "default".to_string()
}

fn default_field_value() -> Value {
    Value::String(String::new())
}

fn default_converter() -> String {
    "text".to_string()
}

fn default_tag() -> String {
    "div".to_string()
}

impl ContentTypeConfig {
    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Snapshot of every field's default value
    pub fn defaults(&self) -> DataObject {
        self.fields
            .iter()
            .map(|field| (field.name.clone(), field.default.clone()))
            .collect()
    }

    /// Whether nodes of this type hold an ordered child collection
    pub fn is_collection(&self) -> bool {
        self.template.elements().any(|element| element.child_slot)
    }

    pub fn allows_child(&self, child: &str) -> bool {
        self.is_collection()
            && (self.allowed_children.is_empty() || self.allowed_children.iter().any(|c| c == child))
    }

    pub fn template_element(&self, name: &str) -> Option<&ElementTemplate> {
        self.template.elements().find(|element| element.name == name)
    }
}

impl FieldBinding {
    /// Name of the template element the value lives in
    pub fn element(&self) -> &str {
        match self {
            FieldBinding::Attribute { element, .. }
            | FieldBinding::Style { element, .. }
            | FieldBinding::Text { element }
            | FieldBinding::Html { element } => element,
        }
    }
}

impl ElementTemplate {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            child_slot: false,
        }
    }

    /// This element and all template descendants, depth first
    pub fn elements(&self) -> impl Iterator<Item = &ElementTemplate> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ContentTypeConfig = serde_json::from_value(json!({
            "name": "banner",
            "label": "Banner",
            "fields": [
                { "name": "title", "binding": { "type": "text", "element": "title" } },
                { "name": "hidden", "default": false, "converter": "boolean" }
            ],
            "template": {
                "name": "main",
                "children": [ { "name": "title", "tag": "h3" } ]
            }
        }))
        .unwrap();

        assert_eq!(config.appearance, "default");
        assert!(!config.is_collection());
        assert_eq!(config.field("title").unwrap().converter, "text");
        assert_eq!(config.field("title").unwrap().default, json!(""));
        assert_eq!(config.field("hidden").unwrap().binding, None);
        assert_eq!(config.template_element("title").unwrap().tag, "h3");
        assert_eq!(config.defaults().len(), 2);
    }

    #[test]
    fn test_allowed_children() {
        let mut config: ContentTypeConfig = serde_json::from_value(json!({
            "name": "group",
            "label": "Group",
            "template": { "name": "main", "child_slot": true }
        }))
        .unwrap();

        assert!(config.allows_child("anything"));
        config.allowed_children = vec!["column".into()];
        assert!(config.allows_child("column"));
        assert!(!config.allows_child("row"));
    }

    #[test]
    fn test_template_elements_depth_first() {
        let mut root = ElementTemplate::new("main", "figure");
        let mut link = ElementTemplate::new("link", "a");
        link.children.push(ElementTemplate::new("desktop_image", "img"));
        root.children.push(link);
        root.children.push(ElementTemplate::new("caption", "figcaption"));

        let names: Vec<&str> = root.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["main", "link", "desktop_image", "caption"]);
    }
}
