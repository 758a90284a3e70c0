//! Two-mode lexer for stored page markup using logos
//!
//! Content between tags and the inside of a start tag have different token
//! sets, so the lexer morphs between [`ContentToken`] and [`TagToken`] as it
//! crosses a `<name` ... `>` boundary. Both modes share one source position,
//! which keeps every span absolute.

use crate::error::{ParseError, ParseResult};
use logos::{Lexer, Logos};

/// Tokens recognised between tags
#[derive(Logos, Debug, Clone, PartialEq)]
enum ContentToken<'src> {
    #[regex(r"<[a-zA-Z][a-zA-Z0-9_:-]*", |lex| &lex.slice()[1..])]
    TagOpen(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9_:-]*[ \t\r\n]*>", close_tag_name)]
    TagClose(&'src str),

    #[token("<!--", comment_body)]
    Comment(&'src str),

    // Doctype and other declarations are dropped
    #[regex(r"<![a-zA-Z\[][^>]*>")]
    Declaration,

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Tokens recognised inside a start tag
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
enum TagToken<'src> {
    #[regex(r"[a-zA-Z0-9_:@.-]+", |lex| lex.slice())]
    Name(&'src str),

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#, unquote)]
    #[regex(r"'[^']*'", unquote)]
    Quoted(&'src str),

    #[token(">")]
    End,

    #[token("/>")]
    SelfClose,
}

fn close_tag_name<'src>(lex: &mut Lexer<'src, ContentToken<'src>>) -> &'src str {
    lex.slice()[2..].trim_end_matches('>').trim_end()
}

/// Consume through the first `-->`, or to the end of input if there is none
fn comment_body<'src>(lex: &mut Lexer<'src, ContentToken<'src>>) -> &'src str {
    let rest = lex.remainder();
    match rest.find("-->") {
        Some(end) => {
            lex.bump(end + 3);
            &rest[..end]
        }
        None => {
            lex.bump(rest.len());
            rest
        }
    }
}

fn unquote<'src>(lex: &mut Lexer<'src, TagToken<'src>>) -> &'src str {
    let s = lex.slice();
    &s[1..s.len() - 1]
}

/// Unified token stream consumed by the parser
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    /// `<tag` (name only)
    TagStart(&'src str),
    /// Attribute name or unquoted attribute value
    Name(&'src str),
    Eq,
    /// Quoted attribute value with the quotes stripped (entities still encoded)
    Quoted(&'src str),
    /// `>` closing a start tag
    TagEnd,
    /// `/>` closing a self-closing start tag
    SelfClose,
    /// `</tag>`
    TagClose(&'src str),
    /// Body of `<!-- ... -->`
    Comment(&'src str),
    /// Raw text between tags (entities still encoded)
    Text(&'src str),
}

/// Span information for a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl From<std::ops::Range<usize>> for TokenSpan {
    fn from(range: std::ops::Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}

/// A token with its span
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken<'src> {
    pub token: Token<'src>,
    pub span: TokenSpan,
}

impl<'src> SpannedToken<'src> {
    fn new(token: Token<'src>, span: std::ops::Range<usize>) -> Self {
        Self {
            token,
            span: span.into(),
        }
    }
}

/// Lex markup into a flat token stream
///
/// A `<` that does not start a tag is kept as text. Running out of input
/// inside a start tag, or meeting a character that cannot appear there, is
/// an error.
pub fn tokenize(source: &str) -> ParseResult<Vec<SpannedToken<'_>>> {
    let mut tokens = Vec::new();
    let mut content = ContentToken::lexer(source);

    while let Some(result) = content.next() {
        let span = content.span();
        match result {
            Ok(ContentToken::TagOpen(name)) => {
                tokens.push(SpannedToken::new(Token::TagStart(name), span));

                let mut tag = content.morph::<TagToken>();
                let mut terminated = false;
                while let Some(result) = tag.next() {
                    let span = tag.span();
                    let token = match result {
                        Ok(TagToken::Name(value)) => Token::Name(value),
                        Ok(TagToken::Eq) => Token::Eq,
                        Ok(TagToken::Quoted(value)) => Token::Quoted(value),
                        Ok(TagToken::End) => Token::TagEnd,
                        Ok(TagToken::SelfClose) => Token::SelfClose,
                        Err(()) => {
                            return Err(ParseError::invalid_syntax(
                                span.into(),
                                format!("unexpected {:?} inside <{}>", tag.slice(), name),
                            ));
                        }
                    };
                    let closes = matches!(token, Token::TagEnd | Token::SelfClose);
                    tokens.push(SpannedToken::new(token, span));
                    if closes {
                        terminated = true;
                        break;
                    }
                }

                if !terminated {
                    return Err(ParseError::unexpected_eof(format!("'>' to close <{}>", name)));
                }
                content = tag.morph();
            }
            Ok(ContentToken::TagClose(name)) => {
                tokens.push(SpannedToken::new(Token::TagClose(name), span));
            }
            Ok(ContentToken::Comment(body)) => {
                tokens.push(SpannedToken::new(Token::Comment(body), span));
            }
            Ok(ContentToken::Declaration) => {}
            Ok(ContentToken::Text(text)) => {
                tokens.push(SpannedToken::new(Token::Text(text), span));
            }
            Err(()) => {
                tokens.push(SpannedToken::new(Token::Text(content.slice()), span));
            }
        }
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<Token<'_>> {
        tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.token)
            .collect()
    }

    #[test]
    fn test_lex_element_with_attributes() {
        let tokens = kinds(r#"<div data-content-type="row" class='a b'>hi</div>"#);
        assert_eq!(
            tokens,
            vec![
                Token::TagStart("div"),
                Token::Name("data-content-type"),
                Token::Eq,
                Token::Quoted("row"),
                Token::Name("class"),
                Token::Eq,
                Token::Quoted("a b"),
                Token::TagEnd,
                Token::Text("hi"),
                Token::TagClose("div"),
            ]
        );
    }

    #[test]
    fn test_lex_self_closing_and_unquoted() {
        let tokens = kinds("<img width=100 hidden/>");
        assert_eq!(
            tokens,
            vec![
                Token::TagStart("img"),
                Token::Name("width"),
                Token::Eq,
                Token::Name("100"),
                Token::Name("hidden"),
                Token::SelfClose,
            ]
        );
    }

    #[test]
    fn test_stray_angle_is_text() {
        let text: String = kinds("a < b")
            .into_iter()
            .map(|token| match token {
                Token::Text(text) => text,
                other => panic!("expected text, found {:?}", other),
            })
            .collect();
        assert_eq!(text, "a < b");
    }

    #[test]
    fn test_declarations_are_dropped() {
        let tokens = kinds("<!DOCTYPE html><p></p>");
        assert_eq!(tokens[0], Token::TagStart("p"));
    }

    #[test]
    fn test_comment_runs_to_first_terminator() {
        assert_eq!(
            kinds("<!-- a > b -->x<!---->"),
            vec![Token::Comment(" a > b "), Token::Text("x"), Token::Comment("")]
        );
        assert_eq!(kinds("a<!-- open"), vec![Token::Text("a"), Token::Comment(" open")]);
    }

    #[test]
    fn test_eof_inside_tag() {
        let err = tokenize("<div class=\"x\"").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_spans_are_absolute() {
        let tokens = tokenize("ab<p>").unwrap();
        assert_eq!(tokens[1].span, TokenSpan { start: 2, end: 4 });
        assert_eq!(tokens[2].span, TokenSpan { start: 4, end: 5 });
    }
}
