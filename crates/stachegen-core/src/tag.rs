//! Parsed template tree
//!
//! A template parses into a `Vec<Tag>`. Trees are plain values: they compare
//! by deep structural equality, which the partial resolver relies on to merge
//! identical partials into one generated unit.

use std::slice;

/// A node in a parsed template
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Verbatim output text
    Literal(String),
    /// Start of an output line; receives the running indent at render time
    IndentPoint,
    /// Escaped interpolation: `{{path}}`
    Variable(String),
    /// Unescaped interpolation: `{{&path}}` or `{{{path}}}`
    RawVariable(String),
    /// `{{#path}}...{{/path}}`
    Section {
        /// Data path
        name: String,
        /// Rendered once per truthy element
        body: Vec<Tag>,
    },
    /// `{{^path}}...{{/path}}`
    InvertedSection {
        /// Data path
        name: String,
        /// Rendered when the path is falsy or an empty list
        body: Vec<Tag>,
    },
    /// `{{>name}}`
    Partial {
        /// Partial name
        name: String,
        /// Whitespace prepended to every line the partial produces
        indent: String,
    },
    /// `{{$name}}...{{/name}}`
    Block {
        /// Block name
        name: String,
        /// Indent handed to an override of this block
        indent: String,
        /// Whether `indent` was taken from the line after the tag, in which
        /// case it stacks on the running indent
        relative_indent: bool,
        /// Default content
        body: Vec<Tag>,
    },
    /// `{{<name}}...{{/name}}`
    Parent {
        /// Name of the partial being extended
        name: String,
        /// Whitespace prepended to every line the parent produces
        indent: String,
        /// Block overrides; anything else is ignored
        body: Vec<Tag>,
    },
}

impl Tag {
    /// Short name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            Tag::Literal(_) => "literal",
            Tag::IndentPoint => "indent point",
            Tag::Variable(_) => "variable",
            Tag::RawVariable(_) => "raw variable",
            Tag::Section { .. } => "section",
            Tag::InvertedSection { .. } => "inverted section",
            Tag::Partial { .. } => "partial",
            Tag::Block { .. } => "block",
            Tag::Parent { .. } => "parent",
        }
    }

    /// Path or name; empty for literals and indent points
    pub fn name(&self) -> &str {
        match self {
            Tag::Literal(_) | Tag::IndentPoint => "",
            Tag::Variable(name)
            | Tag::RawVariable(name)
            | Tag::Section { name, .. }
            | Tag::InvertedSection { name, .. }
            | Tag::Partial { name, .. }
            | Tag::Block { name, .. }
            | Tag::Parent { name, .. } => name,
        }
    }

    /// Children; empty for leaf variants
    pub fn body(&self) -> &[Tag] {
        match self {
            Tag::Section { body, .. }
            | Tag::InvertedSection { body, .. }
            | Tag::Block { body, .. }
            | Tag::Parent { body, .. } => body,
            _ => &[],
        }
    }

    /// Whether this tag pulls in another template
    pub fn is_reference(&self) -> bool {
        matches!(self, Tag::Partial { .. } | Tag::Parent { .. })
    }
}

/// Iterate over `tags` and all their descendants in pre-order
pub fn walk(tags: &[Tag]) -> Walk<'_> {
    Walk {
        stack: vec![tags.iter()],
    }
}

/// Pre-order iterator returned by [`walk`]
pub struct Walk<'a> {
    stack: Vec<slice::Iter<'a, Tag>>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Tag;

    fn next(&mut self) -> Option<&'a Tag> {
        loop {
            let iter = self.stack.last_mut()?;
            match iter.next() {
                Some(tag) => {
                    let body = tag.body();
                    if !body.is_empty() {
                        self.stack.push(body.iter());
                    }
                    return Some(tag);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}
