//! CSS selector subset for the in-memory document.
//!
//! Supported: type and universal selectors, `.class`, `#id`, attribute
//! selectors (`[a]`, `[a=v]`, `[a*=v]`, `[a^=v]`, `[a$=v]`, `[a~=v]`),
//! compound selectors, descendant and child combinators, and selector
//! groups. Anything else (pseudo-classes, sibling combinators) is rejected
//! so that a typo never turns into a silent miss.

use std::iter::Peekable;
use std::str::Chars;

use super::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
    Suffix(String),
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
}

impl AttrSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => value == v,
            // Empty operands never match for substring operators.
            AttrOp::Contains(v) => !v.is_empty() && value.contains(v.as_str()),
            AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
            AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
            AttrOp::Word(v) => value.split_whitespace().any(|w| w == v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && !self.universal
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
    }

    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag_name(node) else {
            return false;
        };
        if let Some(ref want) = self.tag {
            if want != tag {
                return false;
            }
        }
        if let Some(ref id) = self.id {
            if doc.get_attribute(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| doc.has_class_name(node, c)) {
            return false;
        }
        self.attrs
            .iter()
            .all(|a| a.matches(doc.get_attribute(node, &a.name)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// Compounds joined by combinators, `parts[i] combinators[i] parts[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
    combinators: Vec<Combinator>,
}

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let last = self.parts.len() - 1;
        self.parts[last].matches(doc, node) && self.matches_ancestors(doc, node, last)
    }

    /// `node` matched `parts[idx]`; check the parts to its left.
    fn matches_ancestors(&self, doc: &Document, node: NodeId, idx: usize) -> bool {
        if idx == 0 {
            return true;
        }
        let part = &self.parts[idx - 1];
        match self.combinators[idx - 1] {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|p| part.matches(doc, p) && self.matches_ancestors(doc, p, idx - 1)),
            Combinator::Descendant => {
                let mut current = doc.parent(node);
                while let Some(p) = current {
                    if part.matches(doc, p) && self.matches_ancestors(doc, p, idx - 1) {
                        return true;
                    }
                    current = doc.parent(p);
                }
                false
            }
        }
    }
}

/// A parsed selector group (`a, b, c`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

impl SelectorList {
    /// Parse a selector group.
    pub fn parse(input: &str) -> Result<Self, String> {
        let selectors = split_group(input)?
            .into_iter()
            .map(parse_complex)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { selectors })
    }

    /// Whether `node` matches any selector of the group.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.selectors.iter().any(|s| s.matches(doc, node))
    }
}

/// Split on top-level commas, leaving commas inside `[...]` and quotes alone.
fn split_group(input: &str) -> Result<Vec<&str>, String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() {
        return Err("unterminated string".to_string());
    }
    parts.push(&input[start..]);

    if parts.iter().any(|p| p.trim().is_empty()) {
        return Err("empty selector in group".to_string());
    }
    Ok(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) -> bool {
    let mut skipped = false;
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
        skipped = true;
    }
    skipped
}

fn parse_ident(chars: &mut Peekable<Chars<'_>>) -> Result<String, String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    if ident.is_empty() {
        return Err(match chars.peek() {
            Some(c) => format!("expected identifier, found '{}'", c),
            None => "expected identifier".to_string(),
        });
    }
    Ok(ident)
}

fn parse_complex(input: &str) -> Result<Complex, String> {
    let mut chars = input.trim().chars().peekable();
    let mut parts = Vec::new();
    let mut combinators = Vec::new();

    loop {
        parts.push(parse_compound(&mut chars)?);

        let saw_whitespace = skip_whitespace(&mut chars);
        match chars.peek() {
            None => break,
            Some('>') => {
                chars.next();
                skip_whitespace(&mut chars);
                combinators.push(Combinator::Child);
            }
            Some('+' | '~') => return Err("sibling combinators are not supported".to_string()),
            Some(_) if saw_whitespace => combinators.push(Combinator::Descendant),
            Some(c) => return Err(format!("unexpected '{}'", c)),
        }
    }

    Ok(Complex { parts, combinators })
}

fn parse_compound(chars: &mut Peekable<Chars<'_>>) -> Result<Compound, String> {
    let mut compound = Compound::default();

    match chars.peek() {
        Some('*') => {
            chars.next();
            compound.universal = true;
        }
        Some(&c) if is_ident_char(c) => {
            compound.tag = Some(parse_ident(chars)?.to_ascii_lowercase());
        }
        _ => {}
    }

    while let Some(&c) = chars.peek() {
        match c {
            '.' => {
                chars.next();
                compound.classes.push(parse_ident(chars)?);
            }
            '#' => {
                chars.next();
                compound.id = Some(parse_ident(chars)?);
            }
            '[' => {
                chars.next();
                compound.attrs.push(parse_attribute(chars)?);
            }
            ':' => return Err("pseudo-classes are not supported".to_string()),
            _ => break,
        }
    }

    if compound.is_empty() {
        return Err(match chars.peek() {
            Some(c) => format!("expected selector, found '{}'", c),
            None => "expected selector".to_string(),
        });
    }
    Ok(compound)
}

fn parse_attribute(chars: &mut Peekable<Chars<'_>>) -> Result<AttrSelector, String> {
    skip_whitespace(chars);
    let name = parse_ident(chars)?.to_ascii_lowercase();
    skip_whitespace(chars);

    let op_char = match chars.next() {
        Some(']') => {
            return Ok(AttrSelector {
                name,
                op: AttrOp::Exists,
            })
        }
        Some('=') => '=',
        Some(c @ ('*' | '^' | '$' | '~')) => {
            if chars.next() != Some('=') {
                return Err(format!("expected '=' after '{}'", c));
            }
            c
        }
        Some(c) => return Err(format!("unexpected '{}' in attribute selector", c)),
        None => return Err("unterminated attribute selector".to_string()),
    };

    skip_whitespace(chars);
    let value = match chars.peek() {
        Some(&q @ ('"' | '\'')) => {
            chars.next();
            let mut value = String::new();
            loop {
                match chars.next() {
                    Some(c) if c == q => break,
                    Some(c) => value.push(c),
                    None => return Err("unterminated string".to_string()),
                }
            }
            value
        }
        _ => parse_ident(chars)?,
    };
    skip_whitespace(chars);
    if chars.next() != Some(']') {
        return Err("unterminated attribute selector".to_string());
    }

    let op = match op_char {
        '=' => AttrOp::Equals(value),
        '*' => AttrOp::Contains(value),
        '^' => AttrOp::Prefix(value),
        '$' => AttrOp::Suffix(value),
        _ => AttrOp::Word(value),
    };
    Ok(AttrSelector { name, op })
}
