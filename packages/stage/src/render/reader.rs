use crate::config::FieldBinding;
use crate::data_store::DataObject;
use crate::error::StageError;
use crate::id_generator::NodeId;
use crate::registry::ContentTypeDefinition;
use crate::stage::Stage;
use pagebuilder_markup::{parse, Element};
use tracing::{debug, info, instrument, warn};

/// Field values stored in a content-type wrapper element
///
/// Starts from the type's defaults; a field whose element or attribute is
/// missing, or whose converter rejects the raw value, keeps its default.
pub fn read_data(element: &Element, definition: &ContentTypeDefinition) -> DataObject {
    let config = &definition.config;
    let mut data = config.defaults();

    for field in &config.fields {
        let Some(binding) = &field.binding else {
            continue;
        };
        let Some(raw) = read_field(element, binding) else {
            debug!(content_type = %config.name, field = %field.name, "no stored value");
            continue;
        };

        match definition.converter(&field.name).from_dom(&raw) {
            Ok(value) => {
                data.insert(field.name.clone(), value);
            }
            Err(err) => {
                warn!(content_type = %config.name, field = %field.name, error = %err, "keeping default for unreadable field");
            }
        }
    }

    data
}

/// Raw stored value for one binding, before conversion
pub fn read_field(element: &Element, binding: &FieldBinding) -> Option<String> {
    let target = element.find_marked(binding.element())?;
    match binding {
        FieldBinding::Attribute { attribute, .. } => target.attr(attribute).map(str::to_string),
        FieldBinding::Style { property, .. } => target.style(property),
        FieldBinding::Text { .. } => Some(target.text_content()),
        FieldBinding::Html { .. } => Some(target.inner_html()),
    }
}

/// Build a detached subtree from a content-type wrapper element
///
/// Returns `None` for elements that are not wrappers or name a content type
/// the registry does not know.
pub fn read_element(stage: &mut Stage, element: &Element) -> Result<Option<NodeId>, StageError> {
    let Some(name) = element.content_type() else {
        return Ok(None);
    };
    let Some(definition) = stage.registry().get(name) else {
        warn!(content_type = name, "skipping unknown content type");
        return Ok(None);
    };

    let data = read_data(element, &definition);
    let id = stage.create(name, data)?;

    let nested = element.content_type_children();
    if definition.config.is_collection() {
        let mut children = Vec::new();
        for child in nested {
            let child_name = child.content_type().unwrap_or_default();
            if !definition.config.allows_child(child_name) {
                warn!(parent = name, child = child_name, "skipping disallowed child");
                continue;
            }
            if let Some(child_id) = read_element(stage, child)? {
                children.push(child_id);
            }
        }
        stage.set_children(&id, children)?;
    } else if !nested.is_empty() {
        warn!(content_type = name, count = nested.len(), "ignoring content types nested in a leaf");
    }

    Ok(Some(id))
}

/// Parse markup into detached top-level nodes
#[instrument(skip_all, fields(bytes = markup.len()))]
pub fn read(stage: &mut Stage, markup: &str) -> Result<Vec<NodeId>, StageError> {
    let fragment = parse(markup)?;
    let mut nodes = Vec::new();
    for element in fragment.content_types() {
        if let Some(id) = read_element(stage, element)? {
            nodes.push(id);
        }
    }
    info!(nodes = nodes.len(), "read content types");
    Ok(nodes)
}

/// Replace `parent`'s children with the content types in `markup`
///
/// Former children are destroyed. Nothing changes if the markup does not
/// parse.
pub fn read_into(stage: &mut Stage, parent: &NodeId, markup: &str) -> Result<Vec<NodeId>, StageError> {
    let config = stage.node(parent)?.config().clone();

    let mut accepted = Vec::new();
    for node in read(stage, markup)? {
        let child_name = stage.node(&node)?.name().to_string();
        if config.allows_child(&child_name) {
            accepted.push(node);
        } else {
            warn!(parent = %config.name, child = %child_name, "skipping disallowed child");
            stage.discard(&node);
        }
    }

    let displaced = match stage.set_children(parent, accepted.clone()) {
        Ok(displaced) => displaced,
        Err(err) => {
            for node in &accepted {
                stage.discard(node);
            }
            return Err(err);
        }
    };
    for old in &displaced {
        stage.discard(old);
    }
    Ok(accepted)
}

/// Load a page into the stage root, replacing what was there
pub fn load(stage: &mut Stage, markup: &str) -> Result<Vec<NodeId>, StageError> {
    let root = stage.root().clone();
    read_into(stage, &root, markup)
}
