use crate::serializer::{serialize_element, serialize_nodes, SerializeOptions};
use serde::{Deserialize, Serialize};

/// Marker attribute naming the content type a wrapper element stores
pub const CONTENT_TYPE_ATTR: &str = "data-content-type";
/// Marker attribute naming the appearance a wrapper element was written with
pub const APPEARANCE_ATTR: &str = "data-appearance";
/// Marker attribute naming a template element inside a content type
pub const ELEMENT_ATTR: &str = "data-element";

/// Elements that never have children or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Parsed markup: a sequence of sibling nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub nodes: Vec<Node>,
}

/// A node in the markup tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Element(Element),
    Text { value: String },
    /// Comment body, kept verbatim
    Comment { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Element node with ordered attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Fragment {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Top-level elements, skipping text
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(Node::as_element)
    }

    /// Nearest content-type wrappers in document order
    pub fn content_types(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        for node in &self.nodes {
            if let Node::Element(element) = node {
                if element.content_type().is_some() {
                    found.push(element);
                } else {
                    element.collect_content_types(&mut found);
                }
            }
        }
        found
    }

    pub fn to_html(&self) -> String {
        serialize_nodes(&self.nodes, &SerializeOptions::compact())
    }
}

impl Node {
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    pub fn comment(value: impl Into<String>) -> Self {
        Node::Comment {
            value: value.into(),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text { .. } | Node::Comment { .. } => None,
        }
    }

    fn push_text_content(&self, out: &mut String) {
        match self {
            Node::Element(element) => {
                for child in &element.children {
                    child.push_text_content(out);
                }
            }
            Node::Text { value } => out.push_str(value),
            Node::Comment { .. } => {}
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(pos).value)
    }

    pub fn push_child(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.attr(CONTENT_TYPE_ATTR)
    }

    pub fn appearance(&self) -> Option<&str> {
        self.attr(APPEARANCE_ATTR)
    }

    pub fn element_name(&self) -> Option<&str> {
        self.attr(ELEMENT_ATTR)
    }

    /// Concatenated text of all descendants
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.push_text_content(&mut out);
        }
        out
    }

    /// Serialized children, without this element's own tags
    pub fn inner_html(&self) -> String {
        serialize_nodes(&self.children, &SerializeOptions::compact())
    }

    pub fn to_html(&self) -> String {
        serialize_element(self, &SerializeOptions::compact())
    }

    /// `style` attribute split into ordered `(property, value)` pairs
    pub fn style_declarations(&self) -> Vec<(String, String)> {
        self.attr("style")
            .map(parse_style_declarations)
            .unwrap_or_default()
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.style_declarations()
            .into_iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value)
    }

    /// Find the template element marked `data-element="name"`
    ///
    /// The search includes this element and its descendants but never
    /// crosses into a nested content type, whose marked elements belong to
    /// that content type.
    pub fn find_marked(&self, name: &str) -> Option<&Element> {
        if self.element_name() == Some(name) {
            return Some(self);
        }
        self.child_elements()
            .filter(|child| child.content_type().is_none())
            .find_map(|child| child.find_marked(name))
    }

    /// Nearest nested content-type wrappers in document order
    pub fn content_type_children(&self) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_content_types(&mut found);
        found
    }

    fn collect_content_types<'a>(&'a self, found: &mut Vec<&'a Element>) {
        for child in self.child_elements() {
            if child.content_type().is_some() {
                found.push(child);
            } else {
                child.collect_content_types(found);
            }
        }
    }
}

/// Parse a CSS declaration list (`a: b; c: d`)
///
/// Property names are lower-cased; declarations without a colon are
/// dropped.
pub fn parse_style_declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            let property = property.trim();
            if property.is_empty() {
                return None;
            }
            Some((property.to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect()
}

/// Render `(property, value)` pairs back into a `style` attribute value
pub fn format_style_declarations<'a>(
    declarations: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    declarations
        .into_iter()
        .map(|(property, value)| format!("{}: {};", property, value))
        .collect::<Vec<_>>()
        .join(" ")
}
