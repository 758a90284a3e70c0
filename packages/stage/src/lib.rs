//! # PageBuilder Stage
//!
//! The editable content tree behind a page: content type nodes with
//! observable data stores, ordered child collections, the stage event bus,
//! per-node preview state and the round trip to stored markup.
//!
//! ```no_run
//! use pagebuilder_stage::{render, MediaUrlResolver, Registry, Stage};
//! use std::rc::Rc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::builtin(Rc::new(MediaUrlResolver::default()))?;
//! let mut stage = Stage::new("cms-page", Rc::new(registry))?;
//! render::load(&mut stage, r#"<div data-content-type="text" data-element="main"><p>Hi</p></div>"#)?;
//! let markup = render::write_stage(&stage, &Default::default())?;
//! println!("{}", markup);
//! # Ok(())
//! # }
//! ```

pub mod asset;
pub mod collection;
pub mod config;
pub mod content_type;
pub mod converter;
pub mod data_store;
pub mod error;
pub mod events;
pub mod id_generator;
pub mod live_edit;
mod observable;
pub mod preview;
pub mod registry;
pub mod render;
pub mod stage;

pub use asset::{AssetResolver, MediaUrlResolver, DEFAULT_MEDIA_URL};
pub use collection::Collection;
pub use config::{ContentTypeConfig, ElementTemplate, FieldBinding, FieldConfig};
pub use content_type::ContentType;
pub use converter::{Converter, ConverterPool};
pub use data_store::{into_data_object, DataObject, DataStore};
pub use error::{ConversionError, RegistryError, StageError};
pub use events::{EventBus, EventKind, EventScope, StageEvent};
pub use id_generator::{IdGenerator, NodeId};
pub use live_edit::LiveEdit;
pub use observable::Subscription;
pub use preview::{
    duplicate, OptionAction, OptionEntry, OptionOutcome, PendingRemoval, Preview, PreviewState,
    RemoveOutcome,
};
pub use registry::{ContentTypeDefinition, Registry, ROOT_CONTENT_TYPE};
pub use stage::{MoveRequest, Stage};
