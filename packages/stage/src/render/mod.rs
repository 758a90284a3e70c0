//! Reading and writing content trees as stored markup
//!
//! Each node is written as a copy of its content type's element template.
//! The wrapper element carries `data-content-type` and `data-appearance`,
//! every template element carries `data-element`, and each bound field is
//! rendered by its converter into an attribute, a style declaration, text
//! or inner HTML. Nested content types go inside the template's child slot.
//! Reading walks the same template backwards. A field whose value cannot
//! be converted falls back to its default, and an unknown content type is
//! skipped; neither aborts the rest of the read.

mod reader;
mod writer;

pub use reader::{load, read, read_data, read_element, read_field, read_into};
pub use writer::{write, write_element, write_stage};
