//! CartoCSS parsing.
//!
//! The extractor only needs rule blocks and their evaluated declarations, so the
//! grammar sits behind the [`StyleParser`] trait. [`CartoParser`] is the default
//! implementation, built on the `cssparser` tokenizer.
//!
//! # Supported syntax
//!
//! - Rule blocks with arbitrary selectors, nested blocks are flattened with
//!   their selector path (`#layer { [zoom > 3] { ... } }`)
//! - Declarations `name: value;` where the value is a number, dimension,
//!   percentage, quoted string, keyword, hex or named color, function call,
//!   or a comma/space separated list of those
//! - Top-level variables: `@frames: 10;` followed by `-torque-frame-count: @frames;`
//! - `/* ... */` comments
//!
//! Blocks and function calls nest at most [`MAX_NESTING`] levels deep.
//!
//! Errors never abort parsing. Each one is recorded in [`ParsedStyle::errors`]
//! and the offending declaration is dropped.

use std::collections::HashMap;
use std::fmt;

use cssparser::{BasicParseErrorKind, ParseError, ParseErrorKind, Parser, ParserInput, Token};

use super::value::{Literal, Rgba};

/// Selector of the block holding map-level properties.
pub const MAP_SELECTOR: &str = "Map";

/// Deepest nesting of rule blocks, and of function calls inside a value.
/// Anything deeper is recorded as an error and skipped.
pub const MAX_NESTING: usize = 64;

/// A single `name: value` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub value: Literal,
    /// 1-based line of the declaration in the source text.
    pub line: u32,
}

/// A rule block with its full selector path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleBlock {
    /// Selectors from the outermost block inwards.
    pub selector: Vec<String>,
    /// Declarations in source order.
    pub declarations: Vec<Declaration>,
}

impl RuleBlock {
    /// Returns `true` for a top-level `Map { ... }` block.
    pub fn is_map(&self) -> bool {
        self.selector.len() == 1 && self.selector[0] == MAP_SELECTOR
    }
}

/// A recoverable problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

impl fmt::Display for StyleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Output of a parse: every rule block plus the errors met along the way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedStyle {
    pub rules: Vec<RuleBlock>,
    pub errors: Vec<StyleParseError>,
}

impl ParsedStyle {
    /// Iterates over the top-level `Map` blocks, in source order.
    pub fn map_blocks(&self) -> impl Iterator<Item = &RuleBlock> {
        self.rules.iter().filter(|r| r.is_map())
    }
}

/// A style grammar.
///
/// Implement this to plug a different style language into the extractor
/// without touching its validation logic.
pub trait StyleParser: Send + Sync {
    /// Parses style text into rule blocks.
    fn parse(&self, text: &str) -> ParsedStyle;
}

/// CartoCSS parser backed by `cssparser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CartoParser;

impl CartoParser {
    pub fn new() -> Self {
        Self
    }
}

impl StyleParser for CartoParser {
    fn parse(&self, text: &str) -> ParsedStyle {
        let mut input = ParserInput::new(text);
        let mut parser = Parser::new(&mut input);
        let mut state = ParseState::default();
        parse_body(&mut parser, &[], &mut state);
        ParsedStyle {
            rules: state.rules,
            errors: state.errors,
        }
    }
}

#[derive(Default)]
struct ParseState {
    rules: Vec<RuleBlock>,
    errors: Vec<StyleParseError>,
    variables: HashMap<String, Literal>,
}

impl ParseState {
    fn error(&mut self, line: u32, column: u32, message: impl Into<String>) {
        self.errors.push(StyleParseError {
            line,
            column,
            message: message.into(),
        });
    }
}

/// Scans a block body (or the whole sheet when `path` is empty).
///
/// Statements are split on `;` and `{...}` at this nesting level. Declaration
/// text is then parsed on its own, which keeps a bad value from derailing the
/// rest of the block.
fn parse_body<'i, 't>(input: &mut Parser<'i, 't>, path: &[String], state: &mut ParseState) {
    let mut block = RuleBlock {
        selector: path.to_vec(),
        declarations: Vec::new(),
    };
    let mut start = input.state();

    loop {
        let before = input.position();
        let token = match input.next() {
            Ok(token) => token.clone(),
            Err(_) => {
                let rest = input.slice_from(start.position());
                if !strip_comments(rest).trim().is_empty() {
                    let loc = start.source_location();
                    declaration(rest, loc.line + 1, loc.column, path, &mut block, state);
                }
                break;
            }
        };

        match token {
            Token::Semicolon => {
                let text = input.slice(start.position()..before);
                let loc = start.source_location();
                declaration(text, loc.line + 1, loc.column, path, &mut block, state);
                start = input.state();
            }
            Token::CurlyBracketBlock if path.len() >= MAX_NESTING => {
                let loc = start.source_location();
                state.error(
                    loc.line + 1,
                    loc.column,
                    format!("rule blocks nested deeper than {} levels", MAX_NESTING),
                );
                // Skips the block body without descending into it.
                let skipped: Result<(), ParseError<'i, ()>> =
                    input.parse_nested_block(|_| Ok(()));
                let _ = skipped;
                start = input.state();
            }
            Token::CurlyBracketBlock => {
                let selector = normalize_selector(input.slice(start.position()..before));
                let mut child = path.to_vec();
                child.push(selector);
                let nested: Result<(), ParseError<'i, ()>> = input.parse_nested_block(|inner| {
                    parse_body(inner, &child, state);
                    Ok(())
                });
                // The closure never fails; an unterminated block just ends at EOF.
                let _ = nested;
                start = input.state();
            }
            Token::CloseCurlyBracket => {
                let loc = input.current_source_location();
                state.error(loc.line + 1, loc.column, "unexpected '}'");
                start = input.state();
            }
            _ => {}
        }
    }

    if !path.is_empty() {
        state.rules.push(block);
    }
}

/// Handles the text of one statement ending in `;`.
fn declaration(
    text: &str,
    line: u32,
    column: u32,
    path: &[String],
    block: &mut RuleBlock,
    state: &mut ParseState,
) {
    let (line, column) = locate(text, line, column);
    let mut input = ParserInput::new(text);
    let mut parser = Parser::new(&mut input);

    let head = match parser.next() {
        Ok(token) => token.clone(),
        Err(_) => return,
    };
    let (name, is_variable) = match head {
        Token::Ident(name) => (name.to_string(), false),
        Token::AtKeyword(name) => (name.to_string(), true),
        other => {
            state.error(line, column, format!("expected a property name, found {:?}", other));
            return;
        }
    };
    if parser.expect_colon().is_err() {
        state.error(line, column, format!("expected ':' after '{}'", name));
        return;
    }

    let value = match parse_value(&mut parser, &state.variables) {
        Ok(value) => value,
        Err(message) => {
            state.error(line, column, format!("invalid value for '{}': {}", name, message));
            return;
        }
    };

    if is_variable {
        state.variables.insert(name, value);
    } else if path.is_empty() {
        state.error(
            line,
            column,
            format!("property '{}' declared outside of a rule", name),
        );
    } else {
        block.declarations.push(Declaration { name, value, line });
    }
}

/// Parses a full declaration value, collapsing several terms into a list.
fn parse_value<'i, 't>(
    input: &mut Parser<'i, 't>,
    variables: &HashMap<String, Literal>,
) -> Result<Literal, String> {
    let mut terms = parse_terms(input, variables, 0).map_err(describe)?;
    match terms.len() {
        0 => Err("empty value".to_string()),
        1 => Ok(terms.remove(0)),
        _ => Ok(Literal::List(terms)),
    }
}

fn parse_terms<'i, 't>(
    input: &mut Parser<'i, 't>,
    variables: &HashMap<String, Literal>,
    depth: usize,
) -> Result<Vec<Literal>, ParseError<'i, String>> {
    let mut terms = Vec::new();
    while !input.is_exhausted() {
        input.skip_whitespace();
        let start = input.position();
        let token = input.next()?.clone();
        let term = match token {
            Token::Comma => continue,
            Token::Number {
                value, int_value, ..
            } => {
                let text = input.slice_from(start).trim();
                Literal::Number(exact_number(Some(text), int_value, value))
            }
            Token::Dimension {
                value,
                int_value,
                ref unit,
                ..
            } => {
                let text = input.slice_from(start).trim();
                Literal::Number(exact_number(text.strip_suffix(&**unit), int_value, value))
            }
            Token::Percentage {
                unit_value,
                int_value,
                ..
            } => {
                let text = input.slice_from(start).trim();
                Literal::Number(exact_number(
                    text.strip_suffix('%'),
                    int_value,
                    unit_value * 100.0,
                ))
            }
            Token::QuotedString(s) => Literal::String(s.to_string()),
            Token::Ident(s) => match Rgba::named(&s) {
                Some(color) => Literal::Color(color),
                None => Literal::Keyword(s.to_string()),
            },
            Token::Hash(s) | Token::IDHash(s) => match Rgba::from_hex(&s) {
                Some(color) => Literal::Color(color),
                None => return Err(input.new_custom_error(format!("invalid color '#{}'", s))),
            },
            Token::AtKeyword(name) => match variables.get(&*name) {
                Some(value) => value.clone(),
                None => {
                    return Err(input.new_custom_error(format!("undefined variable '@{}'", name)))
                }
            },
            Token::Function(name) if depth >= MAX_NESTING => {
                return Err(input.new_custom_error(format!(
                    "function '{}' nested deeper than {} levels",
                    name, MAX_NESTING
                )))
            }
            Token::Function(name) => {
                let args =
                    input.parse_nested_block(|args| parse_terms(args, variables, depth + 1))?;
                Literal::Call {
                    name: name.to_string(),
                    args,
                }
            }
            other => return Err(input.new_unexpected_token_error(other)),
        };
        terms.push(term);
    }
    Ok(terms)
}

/// Reads a numeric token back from its source text, which keeps full `f64`
/// precision. The tokenizer's own value is only `f32`.
fn exact_number(text: Option<&str>, int_value: Option<i32>, value: f32) -> f64 {
    text.and_then(|t| t.parse::<f64>().ok())
        .or_else(|| int_value.map(f64::from))
        .unwrap_or(value as f64)
}

fn describe(error: ParseError<'_, String>) -> String {
    match error.kind {
        ParseErrorKind::Custom(message) => message,
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            format!("unexpected token {:?}", token)
        }
        ParseErrorKind::Basic(BasicParseErrorKind::EndOfInput) => {
            "unexpected end of value".to_string()
        }
        ParseErrorKind::Basic(_) => "malformed value".to_string(),
    }
}

/// Moves a statement's start location past leading whitespace and comments.
fn locate(text: &str, line: u32, column: u32) -> (u32, u32) {
    let mut offset = 0;
    loop {
        let rest = &text[offset..];
        let trimmed = rest.trim_start();
        offset += rest.len() - trimmed.len();
        match trimmed.strip_prefix("/*").and_then(|c| c.find("*/")) {
            Some(end) => offset += end + 4,
            None => break,
        }
    }
    let skipped = &text[..offset];
    match skipped.rfind('\n') {
        Some(nl) => (
            line + skipped.matches('\n').count() as u32,
            skipped[nl + 1..].chars().count() as u32 + 1,
        ),
        None => (line, column + skipped.chars().count() as u32),
    }
}

/// Removes `/* */` comments and collapses whitespace in a selector.
fn normalize_selector(raw: &str) -> String {
    strip_comments(raw)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn strip_comments(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(open) = rest.find("/*") {
        out.push_str(&rest[..open]);
        match rest[open + 2..].find("*/") {
            Some(close) => rest = &rest[open + 2 + close + 2..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}
