//! ICU MessageFormat parser with source spans.
//!
//! Follows the apostrophe rules of ICU's `DOUBLE_OPTIONAL` mode: `''` is a
//! literal apostrophe anywhere, and a single `'` opens a quoted run only when
//! followed by `{`, `}`, `<`, `>`, or `#` inside a plural. A quoted run ends at
//! the next lone `'`; an unterminated run extends to the end of input.
//!
//! Every node records the byte range it was parsed from, so callers can splice
//! the original text instead of re-serializing the whole message.

use std::ops::Range;

/// One node of a parsed message.
#[derive(Debug, Clone, PartialEq)]
pub enum IcuNode {
    /// Literal text with quoting already resolved.
    Literal { value: String, span: Range<usize> },
    /// `{name}`
    Argument { name: String, span: Range<usize> },
    /// `{name, number}` or `{name, date, short}` and friends.
    Formatted {
        name: String,
        kind: String,
        style: Option<String>,
        span: Range<usize>,
    },
    /// `#` inside a plural option.
    Pound { span: Range<usize> },
    /// `{name, select, key {..} other {..}}`
    Select {
        name: String,
        name_span: Range<usize>,
        options: Vec<IcuOption>,
        span: Range<usize>,
    },
    /// `{name, plural, ...}` or `{name, selectordinal, ...}`
    Plural {
        name: String,
        name_span: Range<usize>,
        ordinal: bool,
        offset: Option<String>,
        options: Vec<IcuOption>,
        span: Range<usize>,
    },
}

/// `key {message}` inside a select or plural.
#[derive(Debug, Clone, PartialEq)]
pub struct IcuOption {
    pub key: String,
    pub value: Vec<IcuNode>,
    pub span: Range<usize>,
}

impl IcuNode {
    pub fn span(&self) -> &Range<usize> {
        match self {
            IcuNode::Literal { span, .. }
            | IcuNode::Argument { span, .. }
            | IcuNode::Formatted { span, .. }
            | IcuNode::Pound { span }
            | IcuNode::Select { span, .. }
            | IcuNode::Plural { span, .. } => span,
        }
    }
}

/// Syntax error with the byte offset where parsing stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IcuParseError {
    pub message: String,
    pub offset: usize,
}

impl std::fmt::Display for IcuParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for IcuParseError {}

/// Parse a complete ICU message.
pub fn parse(message: &str) -> Result<Vec<IcuNode>, IcuParseError> {
    let mut parser = IcuParser {
        src: message,
        pos: 0,
    };
    parser.parse_message(0, ParentArg::None)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParentArg {
    None,
    Select,
    Plural,
}

struct IcuParser<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> IcuParser<'s> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.src[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn error(&self, message: impl Into<String>) -> IcuParseError {
        IcuParseError {
            message: message.into(),
            offset: self.pos,
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), IcuParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', found end of message", expected))),
        }
    }

    fn parse_message(
        &mut self,
        nesting: usize,
        parent: ParentArg,
    ) -> Result<Vec<IcuNode>, IcuParseError> {
        let mut nodes = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '{' => nodes.push(self.parse_argument(nesting)?),
                '}' if nesting > 0 => break,
                '#' if parent == ParentArg::Plural => {
                    let start = self.pos;
                    self.bump();
                    nodes.push(IcuNode::Pound {
                        span: start..self.pos,
                    });
                }
                _ => nodes.push(self.parse_literal(nesting, parent)),
            }
        }
        Ok(nodes)
    }

    fn parse_literal(&mut self, nesting: usize, parent: ParentArg) -> IcuNode {
        let start = self.pos;
        let mut value = String::new();
        loop {
            if let Some(quoted) = self.try_parse_quote(parent) {
                value.push_str(&quoted);
                continue;
            }
            match self.peek() {
                None | Some('{') => break,
                Some('}') if nesting > 0 => break,
                Some('#') if parent == ParentArg::Plural => break,
                Some(c) => {
                    value.push(c);
                    self.bump();
                }
            }
        }
        IcuNode::Literal {
            value,
            span: start..self.pos,
        }
    }

    fn try_parse_quote(&mut self, parent: ParentArg) -> Option<String> {
        if self.peek() != Some('\'') {
            return None;
        }
        match self.peek_nth(1) {
            Some('\'') => {
                self.bump();
                self.bump();
                return Some("'".to_string());
            }
            Some('{' | '}' | '<' | '>') => {}
            Some('#') if parent == ParentArg::Plural => {}
            _ => return None,
        }

        // Opening apostrophe, then the special character it quotes.
        self.bump();
        let mut quoted = String::new();
        if let Some(c) = self.bump() {
            quoted.push(c);
        }
        while let Some(c) = self.peek() {
            if c == '\'' {
                if self.peek_nth(1) == Some('\'') {
                    quoted.push('\'');
                    self.bump();
                    self.bump();
                } else {
                    self.bump();
                    break;
                }
            } else {
                quoted.push(c);
                self.bump();
            }
        }
        Some(quoted)
    }

    fn parse_argument(&mut self, nesting: usize) -> Result<IcuNode, IcuParseError> {
        let start = self.pos;
        self.bump();
        self.skip_whitespace();

        let name_start = self.pos;
        let name = self.take_while(|c| !c.is_whitespace() && !matches!(c, '{' | '}' | ',' | '\''));
        if name.is_empty() {
            return Err(self.error("expected argument name"));
        }
        let name_span = name_start..self.pos;

        self.skip_whitespace();
        match self.peek() {
            Some('}') => {
                self.bump();
                return Ok(IcuNode::Argument {
                    name,
                    span: start..self.pos,
                });
            }
            Some(',') => {
                self.bump();
            }
            Some(c) => return Err(self.error(format!("unexpected '{}' in argument", c))),
            None => return Err(self.error("unclosed argument")),
        }

        self.skip_whitespace();
        let kind = self.take_while(|c| c.is_alphanumeric() || c == '_');
        match kind.as_str() {
            "" => Err(self.error("expected argument type")),
            "select" => {
                self.expect(',')?;
                let options = self.parse_options(nesting, ParentArg::Select)?;
                self.expect('}')?;
                Ok(IcuNode::Select {
                    name,
                    name_span,
                    options,
                    span: start..self.pos,
                })
            }
            "plural" | "selectordinal" => {
                self.expect(',')?;
                self.skip_whitespace();
                let offset = if self.src[self.pos..].starts_with("offset:") {
                    self.pos += "offset:".len();
                    self.skip_whitespace();
                    let value = self.take_while(|c| c.is_ascii_digit() || c == '-');
                    if value.is_empty() {
                        return Err(self.error("expected plural offset"));
                    }
                    Some(value)
                } else {
                    None
                };
                let options = self.parse_options(nesting, ParentArg::Plural)?;
                self.expect('}')?;
                Ok(IcuNode::Plural {
                    name,
                    name_span,
                    ordinal: kind == "selectordinal",
                    offset,
                    options,
                    span: start..self.pos,
                })
            }
            _ => {
                self.skip_whitespace();
                let style = match self.peek() {
                    Some(',') => {
                        self.bump();
                        Some(self.parse_style().trim().to_string())
                    }
                    _ => None,
                };
                self.expect('}')?;
                Ok(IcuNode::Formatted {
                    name,
                    kind,
                    style,
                    span: start..self.pos,
                })
            }
        }
    }

    fn parse_options(
        &mut self,
        nesting: usize,
        parent: ParentArg,
    ) -> Result<Vec<IcuOption>, IcuParseError> {
        let mut options: Vec<IcuOption> = Vec::new();
        loop {
            self.skip_whitespace();
            if matches!(self.peek(), None | Some('}')) {
                break;
            }

            let option_start = self.pos;
            let key = self.take_while(|c| !c.is_whitespace() && c != '{' && c != '}');
            if key.is_empty() {
                return Err(self.error("expected option selector"));
            }
            self.skip_whitespace();
            if self.peek() != Some('{') {
                return Err(self.error(format!("expected '{{' after selector '{}'", key)));
            }
            self.bump();
            let value = self.parse_message(nesting + 1, parent)?;
            if self.peek() != Some('}') {
                return Err(self.error(format!("unclosed option '{}'", key)));
            }
            self.bump();

            if options.iter().any(|option| option.key == key) {
                return Err(IcuParseError {
                    message: format!("duplicate selector '{}'", key),
                    offset: option_start,
                });
            }
            options.push(IcuOption {
                key,
                value,
                span: option_start..self.pos,
            });
        }

        if !options.iter().any(|option| option.key == "other") {
            return Err(self.error("missing 'other' option"));
        }
        Ok(options)
    }

    /// Raw style text up to the argument's closing brace, skipping nested braces and quotes.
    fn parse_style(&mut self) -> String {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '\'' => {
                    self.bump();
                    while let Some(inner) = self.bump() {
                        if inner == '\'' {
                            break;
                        }
                    }
                }
                '{' => {
                    depth += 1;
                    self.bump();
                }
                '}' if depth == 0 => break,
                '}' => {
                    depth -= 1;
                    self.bump();
                }
                _ => {
                    self.bump();
                }
            }
        }
        self.src[start..self.pos].to_string()
    }
}

/// Render parsed nodes to text.
///
/// `value_of` supplies argument values; select arguments pick the matching
/// option (falling back to `other`), plurals always render `other`, and
/// arguments without a value are written back in `{name}` form.
pub fn render(nodes: &[IcuNode], value_of: &dyn Fn(&str) -> Option<String>) -> String {
    let mut out = String::new();
    render_into(nodes, value_of, &mut out);
    out
}

fn render_into(nodes: &[IcuNode], value_of: &dyn Fn(&str) -> Option<String>, out: &mut String) {
    for node in nodes {
        match node {
            IcuNode::Literal { value, .. } => out.push_str(value),
            IcuNode::Pound { .. } => out.push('#'),
            IcuNode::Argument { name, .. } => match value_of(name) {
                Some(value) => out.push_str(&value),
                None => out.push_str(&format!("{{{}}}", name)),
            },
            IcuNode::Formatted {
                name, kind, style, ..
            } => match (value_of(name), style) {
                (Some(value), _) => out.push_str(&value),
                (None, Some(style)) => out.push_str(&format!("{{{}, {}, {}}}", name, kind, style)),
                (None, None) => out.push_str(&format!("{{{}, {}}}", name, kind)),
            },
            IcuNode::Select { name, options, .. } => {
                let selected = value_of(name);
                let option = selected
                    .as_deref()
                    .and_then(|key| options.iter().find(|option| option.key == key))
                    .or_else(|| options.iter().find(|option| option.key == "other"));
                if let Some(option) = option {
                    render_into(&option.value, value_of, out);
                }
            }
            IcuNode::Plural { options, .. } => {
                if let Some(option) = options.iter().find(|option| option.key == "other") {
                    render_into(&option.value, value_of, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_values(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_parse_literal_and_argument() {
        let nodes = parse("Hello {name}!").unwrap();
        assert_eq!(nodes.len(), 3);
        let IcuNode::Literal { value, span } = &nodes[0] else {
            panic!("expected a literal, got {:?}", nodes[0]);
        };
        assert_eq!((value.as_str(), span.clone()), ("Hello ", 0..6));
        let IcuNode::Argument { name, span } = &nodes[1] else {
            panic!("expected an argument, got {:?}", nodes[1]);
        };
        assert_eq!((name.as_str(), span.clone()), ("name", 6..12));
    }

    #[test]
    fn test_parse_select_spans() {
        let src = "A {g, select, male {He} other {They}} B";
        let nodes = parse(src).unwrap();
        let IcuNode::Select {
            name,
            name_span,
            options,
            span,
        } = &nodes[1]
        else {
            panic!("expected select, got {:?}", nodes[1]);
        };
        assert_eq!(name, "g");
        assert_eq!(&src[name_span.clone()], "g");
        assert_eq!(&src[span.clone()], "{g, select, male {He} other {They}}");
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].key, "other");
    }

    #[test]
    fn test_parse_plural_with_pound_and_offset() {
        let nodes = parse("{n, plural, offset:1 =0 {none} one {# item} other {# items}}").unwrap();
        let IcuNode::Plural {
            offset, options, ..
        } = &nodes[0]
        else {
            panic!("expected plural");
        };
        assert_eq!(offset.as_deref(), Some("1"));
        assert_eq!(options.len(), 3);
        assert!(matches!(options[1].value[0], IcuNode::Pound { .. }));
    }

    #[test]
    fn test_pound_is_literal_outside_plural() {
        let nodes = parse("## {g, select, other {#1}}").unwrap();
        assert_eq!(render(&nodes, &no_values), "## #1");
    }

    #[test]
    fn test_apostrophe_rules() {
        assert_eq!(render(&parse("it''s").unwrap(), &no_values), "it's");
        assert_eq!(render(&parse("it's").unwrap(), &no_values), "it's");
        assert_eq!(render(&parse("'{name}'").unwrap(), &no_values), "{name}");
        assert_eq!(render(&parse("a '{' b").unwrap(), &no_values), "a { b");
        assert_eq!(render(&parse("'{'''").unwrap(), &no_values), "{'");
        assert_eq!(render(&parse("'{unterminated").unwrap(), &no_values), "{unterminated");
    }

    #[test]
    fn test_formatted_argument() {
        let nodes = parse("Total: {amount, number, ::currency/USD}").unwrap();
        let IcuNode::Formatted { kind, style, .. } = &nodes[1] else {
            panic!("expected a formatted argument, got {:?}", nodes[1]);
        };
        assert_eq!(kind, "number");
        assert_eq!(style.as_deref(), Some("::currency/USD"));
    }

    #[test]
    fn test_render_select_with_value() {
        let nodes = parse("{g, select, male {He} other {They}} left").unwrap();
        let male = |name: &str| (name == "g").then(|| "male".to_string());
        assert_eq!(render(&nodes, &male), "He left");
        assert_eq!(render(&nodes, &no_values), "They left");
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("{").is_err());
        assert!(parse("{name").is_err());
        assert!(parse("{, select, other {x}}").is_err());
        assert!(parse("{g, select, male {He}}").is_err());
        assert!(parse("{g, select, other {a} other {b}}").is_err());
        assert!(parse("{g, select, other {unclosed}").is_err());
    }

    #[test]
    fn test_unbalanced_closing_brace_is_literal_at_top_level() {
        assert_eq!(render(&parse("a } b").unwrap(), &no_values), "a } b");
    }
}
