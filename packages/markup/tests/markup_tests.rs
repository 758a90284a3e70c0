//! Parsing and serializing stored page markup

use pagebuilder_markup::{parse, serialize, ParseError, SerializeOptions};
use pretty_assertions::assert_eq;

const PAGE: &str = r#"<div data-content-type="row" data-appearance="contained" data-element="main"><div data-enable-parallax="0" data-element="inner" style="min-height: 250px; padding-top: 20px;"><div data-content-type="heading" data-appearance="default" data-element="main"><h2 data-element="heading_text">Welcome</h2></div><div data-content-type="products" data-appearance="grid" data-element="main">{{widget type="Magento\CatalogWidget\Block\Product\ProductsList" products_count="5" conditions_encoded="^[`1`:^[`type`:`Combine`]^]"}}</div></div></div>"#;

#[test]
fn test_page_content_types_in_document_order() {
    let fragment = parse(PAGE).unwrap();
    let roots = fragment.content_types();
    assert_eq!(roots.len(), 1);

    let row = roots[0];
    assert_eq!(row.content_type(), Some("row"));
    assert_eq!(row.appearance(), Some("contained"));

    let children: Vec<_> = row
        .content_type_children()
        .into_iter()
        .filter_map(|child| child.content_type())
        .collect();
    assert_eq!(children, vec!["heading", "products"]);
}

#[test]
fn test_marked_elements_and_styles() {
    let fragment = parse(PAGE).unwrap();
    let row = fragment.content_types()[0];
    let inner = row.find_marked("inner").unwrap();

    assert_eq!(inner.style("min-height").as_deref(), Some("250px"));
    assert_eq!(inner.style("padding-top").as_deref(), Some("20px"));
    assert_eq!(inner.attr("data-enable-parallax"), Some("0"));
}

#[test]
fn test_widget_directive_passes_through_verbatim() {
    let fragment = parse(PAGE).unwrap();
    let products = fragment.content_types()[0].content_type_children()[1];
    let html = products.inner_html();

    assert!(html.starts_with(r#"{{widget type="Magento\CatalogWidget\Block\Product\ProductsList""#));
    assert!(html.contains("conditions_encoded=\"^[`1`:^[`type`:`Combine`]^]\""));
}

#[test]
fn test_compact_serialization_is_identity_for_canonical_markup() {
    let fragment = parse(PAGE).unwrap();
    assert_eq!(serialize(&fragment, &SerializeOptions::compact()), PAGE);
}

#[test]
fn test_pretty_serialization_parses_to_same_fields() {
    let fragment = parse(PAGE).unwrap();
    let pretty = serialize(&fragment, &SerializeOptions::pretty());
    assert!(pretty.contains('\n'));

    let reparsed = parse(&pretty).unwrap();
    let heading = reparsed.content_types()[0].content_type_children()[0];
    assert_eq!(heading.find_marked("heading_text").unwrap().text_content(), "Welcome");
}

#[test]
fn test_malformed_start_tag_reports_position() {
    let err = parse(r#"<div class="a" ="b"></div>"#).unwrap_err();
    let span = err.span().expect("syntax errors carry a span");
    assert_eq!(span.start, 15);
    assert!(matches!(err, ParseError::InvalidSyntax { .. }));
}
