use crate::collection::Collection;
use crate::config::ContentTypeConfig;
use crate::data_store::DataStore;
use crate::id_generator::NodeId;
use crate::registry::ContentTypeDefinition;
use std::rc::Rc;

/// A node of the content tree
///
/// Containers (types whose template has a child slot) carry a
/// [`Collection`]; leaves do not.
#[derive(Debug)]
pub struct ContentType {
    pub(crate) id: NodeId,
    pub(crate) definition: Rc<ContentTypeDefinition>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) data_store: DataStore,
    pub(crate) collection: Option<Collection>,
}

impl ContentType {
    pub(crate) fn new(id: NodeId, definition: Rc<ContentTypeDefinition>, data_store: DataStore) -> Self {
        let collection = definition.config.is_collection().then(Collection::new);
        Self {
            id,
            definition,
            parent: None,
            data_store,
            collection,
        }
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn config(&self) -> &ContentTypeConfig {
        &self.definition.config
    }

    pub fn definition(&self) -> &Rc<ContentTypeDefinition> {
        &self.definition
    }

    pub fn parent(&self) -> Option<&NodeId> {
        self.parent.as_ref()
    }

    pub fn data_store(&self) -> &DataStore {
        &self.data_store
    }

    pub fn collection(&self) -> Option<&Collection> {
        self.collection.as_ref()
    }

    pub fn is_collection(&self) -> bool {
        self.collection.is_some()
    }

    /// Children in order; empty for leaves
    pub fn children(&self) -> &[NodeId] {
        self.collection.as_ref().map(Collection::children).unwrap_or(&[])
    }

    pub(crate) fn destroy(&self) {
        self.data_store.destroy();
        if let Some(collection) = &self.collection {
            collection.destroy();
        }
    }
}
