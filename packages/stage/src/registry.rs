//! Content type registry
//!
//! Definitions are validated once on registration and paired with the
//! converters their fields name, so reading and writing markup never has to
//! look converters up again.

use crate::asset::AssetResolver;
use crate::config::{ContentTypeConfig, FieldBinding};
use crate::converter::{Converter, ConverterPool, TextConverter};
use crate::error::RegistryError;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::debug;

/// Definitions shipped with the crate
pub const BUILTIN_CONTENT_TYPES: &str = include_str!("content_types.json");

/// Content type every stage is rooted at
pub const ROOT_CONTENT_TYPE: &str = "root-container";

/// A validated content type with its resolved field converters
#[derive(Debug)]
pub struct ContentTypeDefinition {
    pub config: ContentTypeConfig,
    converters: HashMap<String, Rc<dyn Converter>>,
}

impl ContentTypeDefinition {
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Converter for a field; unknown fields are treated as text
    pub fn converter(&self, field: &str) -> Rc<dyn Converter> {
        self.converters
            .get(field)
            .cloned()
            .unwrap_or_else(|| Rc::new(TextConverter))
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    definitions: HashMap<String, Rc<ContentTypeDefinition>>,
    converters: ConverterPool,
}

impl Registry {
    pub fn new(converters: ConverterPool) -> Self {
        Self {
            definitions: HashMap::new(),
            converters,
        }
    }

    /// Registry holding the built-in converters and content types
    pub fn builtin(assets: Rc<dyn AssetResolver>) -> Result<Self, RegistryError> {
        let mut registry = Self::new(ConverterPool::with_defaults(assets));
        registry.register_json(BUILTIN_CONTENT_TYPES)?;
        Ok(registry)
    }

    pub fn converters(&self) -> &ConverterPool {
        &self.converters
    }

    /// Converters registered later only apply to definitions registered
    /// after them
    pub fn converters_mut(&mut self) -> &mut ConverterPool {
        &mut self.converters
    }

    /// Register a definition, replacing any with the same name
    pub fn register(&mut self, config: ContentTypeConfig) -> Result<(), RegistryError> {
        validate(&config)?;

        let mut converters = HashMap::new();
        for field in &config.fields {
            let converter = self.converters.get(&field.converter).ok_or_else(|| {
                RegistryError::UnknownConverter {
                    content_type: config.name.clone(),
                    field: field.name.clone(),
                    converter: field.converter.clone(),
                }
            })?;
            converters.insert(field.name.clone(), converter);
        }

        debug!(content_type = %config.name, fields = config.fields.len(), "registered content type");
        self.definitions.insert(
            config.name.clone(),
            Rc::new(ContentTypeDefinition { config, converters }),
        );
        Ok(())
    }

    /// Register a JSON array of definitions; returns how many were added
    ///
    /// Nothing is registered unless every definition is valid.
    pub fn register_json(&mut self, json: &str) -> Result<usize, RegistryError> {
        let configs: Vec<ContentTypeConfig> = serde_json::from_str(json)?;
        let mut staged = Registry {
            definitions: self.definitions.clone(),
            converters: self.converters.clone(),
        };
        for config in &configs {
            staged.register(config.clone())?;
        }
        self.definitions = staged.definitions;
        Ok(configs.len())
    }

    pub fn get(&self, name: &str) -> Option<Rc<ContentTypeDefinition>> {
        self.definitions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.definitions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn definitions(&self) -> impl Iterator<Item = &Rc<ContentTypeDefinition>> {
        self.definitions.values()
    }
}

fn validate(config: &ContentTypeConfig) -> Result<(), RegistryError> {
    let invalid = |reason: String| RegistryError::invalid(config.name.clone(), reason);

    if config.name.trim().is_empty() {
        return Err(invalid("name must not be empty".to_string()));
    }

    let mut element_names = HashSet::new();
    for element in config.template.elements() {
        if !element_names.insert(element.name.as_str()) {
            return Err(invalid(format!("template element '{}' is declared twice", element.name)));
        }
    }

    let slots = config.template.elements().filter(|e| e.child_slot).count();
    if slots > 1 {
        return Err(invalid("template declares more than one child slot".to_string()));
    }
    if slots == 0 && !config.allowed_children.is_empty() {
        return Err(invalid("allowed_children requires a child slot".to_string()));
    }

    let mut field_names = HashSet::new();
    for field in &config.fields {
        if !field_names.insert(field.name.as_str()) {
            return Err(invalid(format!("field '{}' is declared twice", field.name)));
        }
        let Some(binding) = &field.binding else {
            continue;
        };
        if !element_names.contains(binding.element()) {
            return Err(invalid(format!(
                "field '{}' is bound to unknown element '{}'",
                field.name,
                binding.element()
            )));
        }
        if matches!(binding, FieldBinding::Text { .. } | FieldBinding::Html { .. }) {
            let target = config.template_element(binding.element());
            if target.is_some_and(|t| t.child_slot || !t.children.is_empty()) {
                return Err(invalid(format!(
                    "field '{}' replaces the content of element '{}', which has children",
                    field.name,
                    binding.element()
                )));
            }
        }
    }

    for name in &config.fields_to_ignore_on_remove {
        if !field_names.contains(name.as_str()) {
            return Err(invalid(format!("fields_to_ignore_on_remove names unknown field '{}'", name)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MediaUrlResolver;
    use serde_json::json;

    fn registry() -> Registry {
        Registry::builtin(Rc::new(MediaUrlResolver::default())).unwrap()
    }

    #[test]
    fn test_builtin_content_types() {
        let registry = registry();
        assert_eq!(
            registry.names(),
            vec![
                "column",
                "column-group",
                "divider",
                "heading",
                "html",
                "image",
                "products",
                "root-container",
                "row",
                "text"
            ]
        );
        let row = registry.get("row").unwrap();
        assert!(row.config.is_collection());
        assert!(row.config.allows_child("column-group"));
        assert!(!row.config.allows_child("column"));
        assert!(!registry.get("heading").unwrap().config.is_collection());
    }

    #[test]
    fn test_unknown_converter_is_rejected() {
        let mut registry = registry();
        let result = registry.register_json(
            &json!([{
                "name": "custom",
                "label": "Custom",
                "fields": [{ "name": "x", "converter": "nope" }],
                "template": { "name": "main" }
            }])
            .to_string(),
        );
        assert!(matches!(result, Err(RegistryError::UnknownConverter { .. })));
        assert!(!registry.contains("custom"));
    }

    #[test]
    fn test_invalid_binding_is_rejected() {
        let mut registry = registry();
        let config: ContentTypeConfig = serde_json::from_value(json!({
            "name": "custom",
            "label": "Custom",
            "fields": [{ "name": "x", "binding": { "type": "text", "element": "missing" } }],
            "template": { "name": "main" }
        }))
        .unwrap();
        assert!(matches!(
            registry.register(config),
            Err(RegistryError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn test_register_json_is_all_or_nothing() {
        let mut registry = registry();
        let result = registry.register_json(
            &json!([
                { "name": "good", "label": "Good", "template": { "name": "main" } },
                { "name": "", "label": "Bad", "template": { "name": "main" } }
            ])
            .to_string(),
        );
        assert!(result.is_err());
        assert!(!registry.contains("good"));
    }
}
