use crate::dom::{is_void_element, Element, Fragment, Node};
use crate::error::{ParseError, ParseResult};
use crate::escape::decode_entities;
use crate::lexer::{tokenize, SpannedToken, Token};
use tracing::trace;

/// Lenient markup parser
///
/// Stored page markup is frequently hand-edited or produced by other tools,
/// so structural slips are repaired instead of rejected: a close tag with no
/// matching open element is ignored, a close tag for an outer element
/// implicitly closes everything opened inside it, and elements still open at
/// the end of input are closed there. Only malformed start tags are errors.
pub struct Parser<'src> {
    tokens: Vec<SpannedToken<'src>>,
    pos: usize,
}

/// Element whose children are still being collected
struct OpenElement {
    element: Element,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> ParseResult<Self> {
        Ok(Self {
            tokens: tokenize(source)?,
            pos: 0,
        })
    }

    /// Parse the whole input into a fragment
    pub fn parse_fragment(&mut self) -> ParseResult<Fragment> {
        let mut roots: Vec<Node> = Vec::new();
        let mut stack: Vec<OpenElement> = Vec::new();

        while let Some(spanned) = self.advance() {
            match spanned.token {
                Token::TagStart(name) => {
                    let (element, self_closed) = self.parse_start_tag(name)?;
                    if self_closed || is_void_element(&element.tag) {
                        append(&mut roots, &mut stack, Node::Element(element));
                    } else {
                        stack.push(OpenElement { element });
                    }
                }
                Token::TagClose(name) => {
                    let tag = name.to_ascii_lowercase();
                    match stack.iter().rposition(|open| open.element.tag == tag) {
                        Some(index) => {
                            while stack.len() > index {
                                close_top(&mut roots, &mut stack);
                            }
                        }
                        None => trace!(tag = %tag, "ignoring unmatched close tag"),
                    }
                }
                Token::Text(text) => {
                    append_text(&mut roots, &mut stack, &decode_entities(text));
                }
                Token::Comment(body) => {
                    append(&mut roots, &mut stack, Node::comment(body));
                }
                other => {
                    return Err(ParseError::unexpected_token(
                        spanned.span,
                        "text or tag",
                        format!("{:?}", other),
                    ));
                }
            }
        }

        while !stack.is_empty() {
            close_top(&mut roots, &mut stack);
        }

        Ok(Fragment::new(roots))
    }

    /// Parse attributes up to `>` or `/>`; the tag name is already consumed
    fn parse_start_tag(&mut self, name: &str) -> ParseResult<(Element, bool)> {
        let mut element = Element::new(name.to_ascii_lowercase());

        loop {
            let spanned = self
                .advance()
                .ok_or_else(|| ParseError::unexpected_eof(format!("'>' to close <{}>", name)))?;

            match spanned.token {
                Token::TagEnd => return Ok((element, false)),
                Token::SelfClose => return Ok((element, true)),
                Token::Name(attr_name) => {
                    let attr_name = attr_name.to_ascii_lowercase();
                    let value = if self.check_eq() {
                        self.advance();
                        self.parse_attribute_value(&attr_name)?
                    } else {
                        String::new()
                    };
                    element.set_attr(attr_name, value);
                }
                other => {
                    return Err(ParseError::invalid_syntax(
                        spanned.span,
                        format!("expected attribute name in <{}>, found {:?}", name, other),
                    ));
                }
            }
        }
    }

    fn parse_attribute_value(&mut self, attr_name: &str) -> ParseResult<String> {
        let spanned = self.advance().ok_or_else(|| {
            ParseError::unexpected_eof(format!("value for attribute '{}'", attr_name))
        })?;

        match spanned.token {
            Token::Quoted(value) | Token::Name(value) => Ok(decode_entities(value).into_owned()),
            other => Err(ParseError::unexpected_token(
                spanned.span,
                format!("value for attribute '{}'", attr_name),
                format!("{:?}", other),
            )),
        }
    }

    fn check_eq(&self) -> bool {
        matches!(self.tokens.get(self.pos).map(|t| &t.token), Some(Token::Eq))
    }

    fn advance(&mut self) -> Option<SpannedToken<'src>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }
}

fn append(roots: &mut Vec<Node>, stack: &mut [OpenElement], node: Node) {
    match stack.last_mut() {
        Some(open) => open.element.children.push(node),
        None => roots.push(node),
    }
}

/// Append text, merging with a directly preceding text node
fn append_text(roots: &mut Vec<Node>, stack: &mut [OpenElement], text: &str) {
    let siblings = match stack.last_mut() {
        Some(open) => &mut open.element.children,
        None => roots,
    };
    if let Some(Node::Text { value }) = siblings.last_mut() {
        value.push_str(text);
        return;
    }
    siblings.push(Node::text(text));
}

fn close_top(roots: &mut Vec<Node>, stack: &mut Vec<OpenElement>) {
    if let Some(open) = stack.pop() {
        append(roots, stack, Node::Element(open.element));
    }
}

/// Parse markup into a fragment
pub fn parse(source: &str) -> ParseResult<Fragment> {
    Parser::new(source)?.parse_fragment()
}
