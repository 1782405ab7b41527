use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use crate::dom::Element;
use crate::{REVEAL_ATTRIBUTE, RevealError};

/// One simple selector inside a compound selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    /// `*`
    Universal,
    /// `section` (stored lowercased)
    Tag(String),
    /// `#hero`
    Id(String),
    /// `.card`
    Class(String),
    /// `[data-reveal]` or `[data-reveal="fade"]`
    Attribute { name: String, value: Option<String> },
}

impl SimpleSelector {
    fn matches(&self, element: &Element) -> bool {
        match self {
            Self::Universal => true,
            Self::Tag(tag) => element.tag_name() == tag.as_str(),
            Self::Id(id) => element.id().as_deref() == Some(id.as_str()),
            Self::Class(class) => element.has_class(class),
            Self::Attribute { name, value: None } => element.has_attribute(name),
            Self::Attribute {
                name,
                value: Some(value),
            } => element.attribute(name).as_deref() == Some(value.as_str()),
        }
    }
}

/// A sequence of simple selectors that must all match the same element (`section.card[data-reveal]`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundSelector {
    parts: Vec<SimpleSelector>,
}

impl CompoundSelector {
    pub fn parts(&self) -> &[SimpleSelector] {
        &self.parts
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.parts.iter().all(|part| part.matches(element))
    }
}

/// A parsed selector list.
///
/// Only the subset needed to flag elements is supported: type, universal, id, class and
/// attribute presence/equality selectors, combined into compounds and separated by commas.
/// Combinators and pseudo-classes are rejected at parse time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<CompoundSelector>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, RevealError> {
        let mut parser = Parser { src: input, pos: 0 };
        parser
            .selector_list()
            .map(|alternatives| Self { alternatives })
            .map_err(|reason| RevealError::InvalidSelector {
                selector: input.to_string(),
                reason,
            })
    }

    /// The reveal marker selector, `[data-reveal]`.
    pub fn reveal() -> Self {
        Self {
            alternatives: vec![CompoundSelector {
                parts: vec![SimpleSelector::Attribute {
                    name: REVEAL_ATTRIBUTE.to_string(),
                    value: None,
                }],
            }],
        }
    }

    pub fn alternatives(&self) -> &[CompoundSelector] {
        &self.alternatives
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(element))
    }
}

impl FromStr for Selector {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Universal => f.write_str("*"),
            Self::Tag(tag) => f.write_str(tag),
            Self::Id(id) => write!(f, "#{id}"),
            Self::Class(class) => write!(f, ".{class}"),
            Self::Attribute { name, value: None } => write!(f, "[{name}]"),
            Self::Attribute {
                name,
                value: Some(value),
            } => write!(f, "[{name}=\"{value}\"]"),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, alt) in self.alternatives.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            for part in &alt.parts {
                write!(f, "{part}")?;
            }
        }
        Ok(())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn ident(&mut self) -> Result<String, &'static str> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        if self.pos == start {
            return Err("expected an identifier");
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn selector_list(&mut self) -> Result<Vec<CompoundSelector>, &'static str> {
        let mut out = Vec::new();
        loop {
            self.skip_ws();
            out.push(self.compound()?);
            self.skip_ws();
            match self.bump() {
                None => return Ok(out),
                Some(',') => {}
                Some(_) => return Err("combinators are not supported"),
            }
        }
    }

    fn compound(&mut self) -> Result<CompoundSelector, &'static str> {
        let mut parts = Vec::new();
        match self.peek() {
            Some('*') => {
                self.bump();
                parts.push(SimpleSelector::Universal);
            }
            Some(c) if is_ident_char(c) => {
                parts.push(SimpleSelector::Tag(self.ident()?.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    parts.push(SimpleSelector::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    parts.push(SimpleSelector::Class(self.ident()?));
                }
                Some('[') => {
                    self.bump();
                    parts.push(self.attribute()?);
                }
                Some(':') => return Err("pseudo-classes are not supported"),
                _ => break,
            }
        }

        if parts.is_empty() {
            return Err("expected a selector");
        }
        Ok(CompoundSelector { parts })
    }

    fn attribute(&mut self) -> Result<SimpleSelector, &'static str> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let value = match self.bump() {
            Some(']') => None,
            Some('=') => {
                self.skip_ws();
                let value = match self.peek() {
                    Some(quote @ ('"' | '\'')) => {
                        self.bump();
                        let start = self.pos;
                        loop {
                            match self.bump() {
                                Some(c) if c == quote => break,
                                Some(_) => {}
                                None => return Err("unterminated string"),
                            }
                        }
                        // The closing quote is one byte wide.
                        self.src[start..self.pos - 1].to_string()
                    }
                    _ => self.ident()?,
                };
                self.skip_ws();
                if self.bump() != Some(']') {
                    return Err("expected `]`");
                }
                Some(value)
            }
            None => return Err("unterminated attribute selector"),
            Some(_) => return Err("unsupported attribute operator"),
        };
        Ok(SimpleSelector::Attribute { name, value })
    }
}
