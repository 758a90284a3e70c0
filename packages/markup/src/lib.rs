//! # PageBuilder Markup
//!
//! Parser and serializer for the markup a page is stored as.
//!
//! Content types are persisted as ordinary HTML whose wrapper elements carry
//! marker attributes:
//!
//! ```text
//! <div data-content-type="heading" data-appearance="default" data-element="main">
//!     <h2 data-element="heading_text">Hello</h2>
//! </div>
//! ```
//!
//! This crate knows nothing about content types beyond those markers. It
//! turns text into a [`Fragment`] tree, answers the queries a reader needs
//! ([`Element::find_marked`], [`Element::content_type_children`],
//! [`Element::style_declarations`]), and writes trees back out.

pub mod dom;
pub mod error;
pub mod escape;
pub mod lexer;
pub mod parser;
pub mod serializer;

pub use dom::{
    format_style_declarations, parse_style_declarations, Attribute, Element, Fragment, Node,
    APPEARANCE_ATTR, CONTENT_TYPE_ATTR, ELEMENT_ATTR,
};
pub use error::{ParseError, ParseResult};
pub use lexer::{tokenize, Token};
pub use parser::{parse, Parser};
pub use serializer::{serialize, serialize_element, SerializeOptions};

#[cfg(feature = "pretty-errors")]
pub use error::format_error;
