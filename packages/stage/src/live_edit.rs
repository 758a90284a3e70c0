//! Inline text editing of a single field

use crate::error::StageError;
use crate::preview::Preview;
use crate::stage::Stage;
use pagebuilder_markup::{parse, Node};
use tracing::trace;

/// Plain text of an HTML snippet; unparsable input is returned as is
pub fn strip_html(html: &str) -> String {
    match parse(html) {
        Ok(fragment) => fragment
            .nodes
            .iter()
            .map(|node| match node {
                Node::Element(element) => element.text_content(),
                Node::Text { value } => value.clone(),
                Node::Comment { .. } => String::new(),
            })
            .collect(),
        Err(_) => html.to_string(),
    }
}

/// An inline edit session for one field, started on focus
///
/// Each keystroke writes the field's plain text back through the preview,
/// but only once it differs from the text the field held when focused.
#[derive(Debug, Clone)]
pub struct LiveEdit {
    field: String,
    focused_value: String,
}

impl LiveEdit {
    pub fn focus(field: impl Into<String>, current_html: &str) -> Self {
        Self {
            field: field.into(),
            focused_value: strip_html(current_html),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns whether the store changed
    pub fn key_up(&self, preview: &Preview, stage: &Stage, html: &str) -> Result<bool, StageError> {
        let text = strip_html(html);
        if text == self.focused_value {
            return Ok(false);
        }
        trace!(field = %self.field, "live edit changed field");
        preview.update_data(stage, self.field.as_str(), text)
    }

    /// Whether the editable region should show its placeholder
    pub fn is_placeholder(html: &str) -> bool {
        strip_html(html).trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::MediaUrlResolver;
    use crate::data_store::DataObject;
    use crate::registry::Registry;
    use serde_json::json;
    use std::rc::Rc;

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<b>Big</b> news"), "Big news");
        assert_eq!(strip_html("a &amp; b"), "a & b");
        assert_eq!(strip_html("<div"), "<div");
        assert_eq!(strip_html("a<!-- note -->b"), "ab");
    }

    #[test]
    fn test_key_up_only_writes_changes() {
        let registry = Registry::builtin(Rc::new(MediaUrlResolver::default())).unwrap();
        let mut stage = Stage::new("live", Rc::new(registry)).unwrap();
        let mut data = DataObject::new();
        data.insert("heading_text".into(), json!("Hello"));
        let heading = stage.create("heading", data).unwrap();
        let preview = Preview::new(&stage, &heading).unwrap();

        let edit = LiveEdit::focus("heading_text", "Hello");
        assert!(!edit.key_up(&preview, &stage, "<span>Hello</span>").unwrap());
        assert!(edit.key_up(&preview, &stage, "Hello <b>world</b>").unwrap());
        assert_eq!(
            stage.data_store(&heading).unwrap().get_field("heading_text"),
            Some(json!("Hello world"))
        );
        assert!(LiveEdit::is_placeholder("<br>"));
    }
}
