//! Markup serializer
//!
//! Compact output reproduces the tree exactly. Pretty output only adds line
//! breaks around content-type wrappers (elements carrying
//! `data-content-type`), which never sit inside a field's text or HTML, so
//! reading pretty output yields the same field values as compact output.

use crate::dom::{is_void_element, Element, Fragment, Node};
use crate::escape::{escape_attr, escape_text};

/// Options for markup serialization
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Break lines around content-type wrappers
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl SerializeOptions {
    pub fn compact() -> Self {
        Self {
            pretty: false,
            indent: String::new(),
        }
    }

    pub fn pretty() -> Self {
        Self::default()
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "    ".to_string(),
        }
    }
}

struct Context<'a> {
    options: &'a SerializeOptions,
    depth: usize,
    buffer: String,
}

impl<'a> Context<'a> {
    fn new(options: &'a SerializeOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_break(&mut self) {
        if !self.options.pretty {
            return;
        }
        if !self.buffer.is_empty() {
            self.buffer.push('\n');
        }
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Serialize a parsed fragment
pub fn serialize(fragment: &Fragment, options: &SerializeOptions) -> String {
    serialize_nodes(&fragment.nodes, options)
}

pub fn serialize_nodes(nodes: &[Node], options: &SerializeOptions) -> String {
    let mut ctx = Context::new(options);
    write_children(nodes, &mut ctx);
    ctx.get_output()
}

pub fn serialize_element(element: &Element, options: &SerializeOptions) -> String {
    let mut ctx = Context::new(options);
    write_element(element, &mut ctx);
    ctx.get_output()
}

fn is_structural(node: &Node) -> bool {
    matches!(node, Node::Element(element) if element.content_type().is_some())
}

fn is_blank(node: &Node) -> bool {
    matches!(node, Node::Text { value } if value.trim().is_empty())
}

/// Write sibling nodes; returns whether any of them was broken onto its own line
fn write_children(nodes: &[Node], ctx: &mut Context) -> bool {
    let structural = ctx.options.pretty && nodes.iter().any(is_structural);

    for node in nodes {
        if structural && is_blank(node) {
            continue;
        }
        if structural && is_structural(node) {
            ctx.add_break();
        }
        match node {
            Node::Element(element) => write_element(element, ctx),
            Node::Text { value } => ctx.add(&escape_text(value)),
            Node::Comment { value } => {
                ctx.add("<!--");
                ctx.add(value);
                ctx.add("-->");
            }
        }
    }

    structural
}

fn write_element(element: &Element, ctx: &mut Context) {
    ctx.add("<");
    ctx.add(&element.tag);
    for attribute in &element.attributes {
        ctx.add(" ");
        ctx.add(&attribute.name);
        ctx.add("=\"");
        ctx.add(&escape_attr(&attribute.value));
        ctx.add("\"");
    }
    ctx.add(">");

    if is_void_element(&element.tag) {
        return;
    }

    ctx.indent();
    let broke = write_children(&element.children, ctx);
    ctx.dedent();
    if broke {
        ctx.add_break();
    }

    ctx.add("</");
    ctx.add(&element.tag);
    ctx.add(">");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_compact_output() {
        let element = Element::new("a")
            .with_attr("href", "/x?a=1&b=2")
            .with_attr("title", r#"say "hi""#)
            .with_child(Node::text("1 < 2"));
        assert_eq!(
            element.to_html(),
            r#"<a href="/x?a=1&amp;b=2" title="say &quot;hi&quot;">1 &lt; 2</a>"#
        );
    }

    #[test]
    fn test_void_elements_have_no_closing_tag() {
        let element = Element::new("img").with_attr("src", "a.png");
        assert_eq!(element.to_html(), r#"<img src="a.png">"#);
    }

    #[test]
    fn test_pretty_breaks_only_around_content_types() {
        let source = r#"<div data-content-type="row"><div data-content-type="text"><p>Hello <b>x</b></p></div></div>"#;
        let fragment = parse(source).unwrap();
        let pretty = serialize(&fragment, &SerializeOptions::pretty());

        assert_eq!(
            pretty,
            "<div data-content-type=\"row\">\n    <div data-content-type=\"text\"><p>Hello <b>x</b></p></div>\n</div>"
        );

        // Re-parsing and re-printing is stable
        let reparsed = parse(&pretty).unwrap();
        assert_eq!(serialize(&reparsed, &SerializeOptions::pretty()), pretty);
    }
}
