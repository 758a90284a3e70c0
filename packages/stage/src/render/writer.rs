use crate::config::{ElementTemplate, FieldBinding};
use crate::error::StageError;
use crate::id_generator::NodeId;
use crate::stage::Stage;
use pagebuilder_markup::{
    format_style_declarations, parse, serialize, serialize_element, Element, Fragment, Node,
    SerializeOptions, APPEARANCE_ATTR, CONTENT_TYPE_ATTR, ELEMENT_ATTR,
};
use std::collections::HashMap;
use tracing::{instrument, warn};

/// Rendered fields destined for one template element
#[derive(Default)]
struct Parts {
    attributes: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    content: Option<Content>,
}

enum Content {
    Text(String),
    Html(String),
}

/// Markup for one node and its subtree
pub fn write(stage: &Stage, node: &NodeId, options: &SerializeOptions) -> Result<String, StageError> {
    Ok(serialize_element(&write_element(stage, node)?, options))
}

/// Markup for everything attached to the stage root
#[instrument(skip_all, fields(stage = stage.id()))]
pub fn write_stage(stage: &Stage, options: &SerializeOptions) -> Result<String, StageError> {
    let nodes = stage
        .children(stage.root())?
        .iter()
        .map(|child| write_element(stage, child).map(Node::from))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(serialize(&Fragment::new(nodes), options))
}

/// Element tree for one node and its subtree
pub fn write_element(stage: &Stage, node: &NodeId) -> Result<Element, StageError> {
    let content_type = stage.node(node)?;
    let definition = content_type.definition();
    let config = &definition.config;
    let data = content_type.data_store().get();

    let mut parts: HashMap<&str, Parts> = HashMap::new();
    for field in &config.fields {
        let Some(binding) = &field.binding else {
            continue;
        };
        let Some(value) = definition.converter(&field.name).to_dom(&field.name, &data) else {
            continue;
        };
        let part = parts.entry(binding.element()).or_default();
        match binding {
            FieldBinding::Attribute { attribute, .. } => part.attributes.push((attribute.clone(), value)),
            FieldBinding::Style { property, .. } => {
                if !value.trim().is_empty() {
                    part.styles.push((property.clone(), value));
                }
            }
            FieldBinding::Text { .. } => part.content = Some(Content::Text(value)),
            FieldBinding::Html { .. } => part.content = Some(Content::Html(value)),
        }
    }

    let mut children = Vec::new();
    for child in content_type.children() {
        children.push(Node::from(write_element(stage, child)?));
    }

    let markers = vec![
        (CONTENT_TYPE_ATTR, config.name.as_str()),
        (APPEARANCE_ATTR, config.appearance.as_str()),
    ];
    Ok(build(&config.template, &markers, &mut parts, &mut Some(children)))
}

fn build(
    template: &ElementTemplate,
    markers: &[(&str, &str)],
    parts: &mut HashMap<&str, Parts>,
    children: &mut Option<Vec<Node>>,
) -> Element {
    let mut element = Element::new(template.tag.as_str());
    for (name, value) in markers {
        element.set_attr(*name, *value);
    }
    element.set_attr(ELEMENT_ATTR, template.name.as_str());
    for (name, value) in &template.attributes {
        element.set_attr(name.as_str(), value.as_str());
    }

    if let Some(part) = parts.remove(template.name.as_str()) {
        for (name, value) in part.attributes {
            element.set_attr(name, value);
        }
        if !part.styles.is_empty() {
            let style = format_style_declarations(
                part.styles.iter().map(|(p, v)| (p.as_str(), v.as_str())),
            );
            element.set_attr("style", style);
        }
        match part.content {
            Some(Content::Text(text)) if !text.is_empty() => element.push_child(Node::text(text)),
            Some(Content::Html(html)) if !html.is_empty() => element.children.extend(html_nodes(&html)),
            _ => {}
        }
    }

    for child in &template.children {
        element.push_child(build(child, &[], parts, children));
    }
    if template.child_slot {
        if let Some(children) = children.take() {
            element.children.extend(children);
        }
    }
    element
}

fn html_nodes(html: &str) -> Vec<Node> {
    match parse(html) {
        Ok(fragment) => fragment.nodes,
        Err(err) => {
            warn!(error = %err, "field HTML is malformed, writing it as text");
            vec![Node::text(html)]
        }
    }
}
