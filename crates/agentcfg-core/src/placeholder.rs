//! Placeholder scanner
//!
//! Recognises the two placeholder grammars inside scalar strings:
//!
//! ```text
//! ${env:NAME}            environment variable, required
//! ${env:NAME:default}    environment variable, default used verbatim when unset
//! ${ref:a.b.c}           dotted path into the loaded configuration tree
//! ```
//!
//! A string is parsed into a [`Template`]: literal text interleaved with
//! structured [`Placeholder`]s. The parser is a small recursive-descent
//! scanner so every syntax error carries the byte offset of the offending
//! placeholder.

use std::fmt;

use crate::path::FieldPath;

/// Which source a placeholder draws its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    Env,
    Ref,
}

impl fmt::Display for PlaceholderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderKind::Env => write!(f, "env"),
            PlaceholderKind::Ref => write!(f, "ref"),
        }
    }
}

/// A parsed `${kind:target}` expression
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    /// Variable name for `env`, dotted path for `ref`
    pub target: String,
    /// Only ever set for `env`; `Some("")` is an explicit empty default
    pub default: Option<String>,
}

impl Placeholder {
    pub fn env(name: impl Into<String>, default: Option<String>) -> Self {
        Self {
            kind: PlaceholderKind::Env,
            target: name.into(),
            default,
        }
    }

    pub fn reference(path: impl Into<String>) -> Self {
        Self {
            kind: PlaceholderKind::Ref,
            target: path.into(),
            default: None,
        }
    }

    /// The target as a tree path, for `ref` placeholders.
    pub fn reference_path(&self) -> Option<FieldPath> {
        match self.kind {
            PlaceholderKind::Ref => FieldPath::parse(&self.target),
            PlaceholderKind::Env => None,
        }
    }

    pub fn is_ref(&self) -> bool {
        self.kind == PlaceholderKind::Ref
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.default {
            Some(default) => write!(f, "${{{}:{}:{}}}", self.kind, self.target, default),
            None => write!(f, "${{{}:{}}}", self.kind, self.target),
        }
    }
}

/// A piece of a scanned string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// A scanned string: literal text and placeholders in source order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template {
    segments: Vec<Segment>,
}

/// A malformed placeholder expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// Byte offset of the problem within the scanned string
    pub offset: usize,
    pub reason: String,
}

impl Template {
    /// Scan a string for placeholders.
    pub fn parse(text: &str) -> Result<Self, SyntaxError> {
        Parser::new(text).parse_template()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    /// True if at least one placeholder is present.
    pub fn has_placeholders(&self) -> bool {
        self.placeholders().next().is_some()
    }

    /// True if at least one `ref` placeholder is present.
    pub fn has_references(&self) -> bool {
        self.placeholders().any(Placeholder::is_ref)
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &Placeholder> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(p) => Some(p),
            Segment::Literal(_) => None,
        })
    }

    /// The placeholder, when the whole string is exactly one placeholder.
    ///
    /// Such strings substitute the raw value and keep its type.
    pub fn as_single(&self) -> Option<&Placeholder> {
        match self.segments.as_slice() {
            [Segment::Placeholder(p)] => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => write!(f, "{text}")?,
                Segment::Placeholder(p) => write!(f, "{p}")?,
            }
        }
        Ok(())
    }
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(offset: usize, reason: impl Into<String>) -> SyntaxError {
        SyntaxError {
            offset,
            reason: reason.into(),
        }
    }

    fn take_until(&mut self, stop: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if stop(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn parse_template(mut self) -> Result<Template, SyntaxError> {
        let mut segments = Vec::new();
        let mut literal = String::new();

        while let Some(c) = self.peek() {
            if self.rest().starts_with("${") {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(self.parse_placeholder()?));
            } else {
                literal.push(c);
                self.pos += c.len_utf8();
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Template { segments })
    }

    fn parse_placeholder(&mut self) -> Result<Placeholder, SyntaxError> {
        let start = self.pos;
        self.pos += 2; // "${"

        let kind_offset = self.pos;
        let kind = self.take_until(|c| c == ':' || c == '}');
        match self.peek() {
            None => return Err(Self::error(start, "unterminated placeholder")),
            Some('}') if kind.is_empty() => return Err(Self::error(start, "empty placeholder")),
            Some('}') => {
                return Err(Self::error(
                    start,
                    format!("missing ':' after placeholder kind '{kind}'"),
                ));
            }
            _ => {}
        }
        let kind = match kind {
            "env" => PlaceholderKind::Env,
            "ref" => PlaceholderKind::Ref,
            other => {
                return Err(Self::error(
                    kind_offset,
                    format!("unknown placeholder kind '{other}' (expected env or ref)"),
                ));
            }
        };
        self.bump(); // ':'

        let target_offset = self.pos;
        let target = self.take_until(|c| c == ':' || c == '}');
        if self.peek().is_none() {
            return Err(Self::error(start, "unterminated placeholder"));
        }
        if target.is_empty() {
            return Err(Self::error(target_offset, format!("empty {kind} target")));
        }
        if let Some(bad) = target.chars().find(|c| matches!(c, '$' | '{') || c.is_whitespace()) {
            return Err(Self::error(
                target_offset,
                format!("invalid character {bad:?} in {kind} target '{target}'"),
            ));
        }

        match kind {
            PlaceholderKind::Env => {
                let default = if self.peek() == Some(':') {
                    self.bump();
                    Some(self.parse_default(start)?)
                } else {
                    None
                };
                self.bump(); // '}'
                Ok(Placeholder::env(target, default))
            }
            PlaceholderKind::Ref => {
                if self.peek() == Some(':') {
                    return Err(Self::error(
                        self.pos,
                        "ref placeholders do not take a default",
                    ));
                }
                if FieldPath::parse(target).is_none() {
                    return Err(Self::error(
                        target_offset,
                        format!("malformed reference path '{target}'"),
                    ));
                }
                self.bump(); // '}'
                Ok(Placeholder::reference(target))
            }
        }
    }

    /// Default text runs to the closing brace that balances the opening
    /// `${`; inner braces must pair up.
    fn parse_default(&mut self, start: usize) -> Result<String, SyntaxError> {
        let from = self.pos;
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return Err(Self::error(start, "unterminated placeholder")),
                Some('}') if depth == 0 => break,
                Some('}') => depth -= 1,
                Some('{') => depth += 1,
                Some(_) => {}
            }
            self.bump();
        }
        Ok(self.src[from..self.pos].to_string())
    }
}
