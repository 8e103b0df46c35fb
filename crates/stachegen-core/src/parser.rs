//! Structural template parser
//!
//! Walks the source one line at a time, applies the standalone-line rules and
//! assembles the tag tree with an explicit stack of open scopes.

use crate::error::{ParseError, ParseErrorKind};
use crate::lexer::{self, Delimiters, Sigil};
use crate::tag::Tag;

/// Parse template source into a tag tree
///
/// # Arguments
/// * `source` - Template text
///
/// # Returns
/// The top-level tags, or the first error with its 1-based line number
pub fn parse(source: &str) -> Result<Vec<Tag>, ParseError> {
    Parser::new().run(source)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeKind {
    Section,
    Inverted,
    Block,
    Parent,
}

/// An open `#`, `^`, `$` or `<` element waiting for its close tag
#[derive(Debug)]
struct Scope {
    kind: ScopeKind,
    name: String,
    indent: String,
    relative_indent: bool,
    line: usize,
    // For parents: the open/close pair was standalone
    standalone: bool,
    body: Vec<Tag>,
}

impl Scope {
    fn into_tag(self) -> Tag {
        let Scope {
            kind,
            name,
            indent,
            relative_indent,
            body,
            ..
        } = self;
        match kind {
            ScopeKind::Section => Tag::Section { name, body },
            ScopeKind::Inverted => Tag::InvertedSection { name, body },
            ScopeKind::Block => Tag::Block {
                name,
                indent,
                relative_indent,
                body,
            },
            ScopeKind::Parent => Tag::Parent { name, indent, body },
        }
    }
}

/// Internal parser state
struct Parser {
    delims: Delimiters,
    root: Vec<Tag>,
    stack: Vec<Scope>,
    line: usize,
}

impl Parser {
    fn new() -> Self {
        Self {
            delims: Delimiters::default(),
            root: Vec::new(),
            stack: Vec::new(),
            line: 1,
        }
    }

    fn run(mut self, source: &str) -> Result<Vec<Tag>, ParseError> {
        let mut rest = source;
        while !rest.is_empty() {
            rest = self.parse_line(rest)?;
            self.line += 1;
        }
        if let Some(scope) = self.stack.last() {
            return Err(ParseErrorKind::Unclosed {
                name: scope.name.clone(),
            }
            .at(scope.line));
        }
        Ok(self.root)
    }

    /// Consume one logical line of `rest` and return what follows it.
    ///
    /// A multi-line comment makes the logical line span several source lines.
    fn parse_line<'s>(&mut self, rest: &'s str) -> Result<&'s str, ParseError> {
        let s = self.dedent(rest);
        let mut eol = lexer::line_end(s);
        let mut next = lexer::find_from(&s[..eol], 0, &self.delims.open);
        if next.is_none() {
            self.push(Tag::IndentPoint);
        }

        let mut prev_end = 0;
        while let Some(start) = next {
            let cut = lexer::cut_tag(s, start, &self.delims).map_err(|e| e.at(self.line))?;
            let newlines = s[start..cut.end].matches('\n').count();
            if newlines > 0 {
                self.line += newlines;
                eol = cut.end + lexer::line_end(&s[cut.end..]);
            }
            let key = cut.key;
            let sigil = cut.sigil;

            if !matches!(sigil, Some(Sigil::Comment | Sigil::SetDelimiters)) {
                if key.is_empty() {
                    return Err(ParseErrorKind::EmptyTag.at(self.line));
                }
                if let Some(gap) = key.find(char::is_whitespace) {
                    return Err(ParseErrorKind::ExtraWords {
                        word: key[..gap].to_string(),
                    }
                    .at(self.line));
                }
            }

            let leading = &s[prev_end..start];
            let mut trailing = &s[cut.end..eol];
            let in_parent = self.top_kind() == Some(ScopeKind::Parent);
            let is_parameter = sigil == Some(Sigil::Block) && !in_parent;
            let is_argument = sigil == Some(Sigil::Block) && in_parent;
            let pair = sigil == Some(Sigil::Parent) || is_parameter;
            if pair {
                let close_end = lexer::element_end(key, s, cut.end, &self.delims).map_err(|e| e.at(self.line))?;
                trailing = &s[close_end..close_end + lexer::line_end(&s[close_end..])];
            }
            let standalone = prev_end == 0
                && !matches!(sigil, None | Some(Sigil::Raw))
                && lexer::is_blank(leading)
                && lexer::is_blank(trailing);

            let mut ignore_rest = standalone && !pair;
            let mut indent = "";
            let mut relative_indent = false;
            if (is_argument || is_parameter && standalone) && lexer::is_blank(&s[cut.end..eol]) {
                indent = lexer::line_indentation(self.dedent(&s[eol..]));
                relative_indent = true;
                ignore_rest = true;
            } else if standalone {
                indent = leading;
            }

            if !standalone {
                if prev_end == 0 && !(start == 0 && sigil == Some(Sigil::Close) && self.closing_argument()) {
                    self.push(Tag::IndentPoint);
                }
                self.push_literal(leading);
            }

            match sigil {
                Some(Sigil::Section) => self.open(ScopeKind::Section, key, "", false, false),
                Some(Sigil::Inverted) => self.open(ScopeKind::Inverted, key, "", false, false),
                Some(Sigil::Comment) => {}
                Some(Sigil::Partial) => self.push(Tag::Partial {
                    name: key.to_string(),
                    indent: indent.to_string(),
                }),
                Some(Sigil::Block) => {
                    self.open(ScopeKind::Block, key, indent, relative_indent, false);
                    if !ignore_rest {
                        self.push(Tag::IndentPoint);
                    }
                }
                Some(Sigil::Parent) => self.open(ScopeKind::Parent, key, indent, false, standalone),
                Some(Sigil::Close) => {
                    if let Some(parent_standalone) = self.close(key)? {
                        ignore_rest = parent_standalone;
                    }
                }
                Some(Sigil::SetDelimiters) => {
                    self.delims = lexer::split_set_delimiters(key).map_err(|e| e.at(self.line))?;
                }
                Some(Sigil::Raw) => self.push(Tag::RawVariable(key.to_string())),
                None => self.push(Tag::Variable(key.to_string())),
            }

            if ignore_rest {
                prev_end = eol;
                break;
            }
            prev_end = cut.end;
            next = lexer::find_from(&s[..eol], cut.end, &self.delims.open);
        }

        self.push_literal(&s[prev_end..eol]);
        Ok(&s[eol..])
    }

    /// Strip the indents of enclosing blocks from the start of `line`
    fn dedent<'s>(&self, line: &'s str) -> &'s str {
        let mut line = line;
        for scope in self.stack.iter().filter(|s| s.kind == ScopeKind::Block) {
            match line.strip_prefix(scope.indent.as_str()) {
                Some(rest) => line = rest,
                None => break,
            }
        }
        line
    }

    fn top_kind(&self) -> Option<ScopeKind> {
        self.stack.last().map(|s| s.kind)
    }

    // The innermost scope is a block passed directly to a parent.
    fn closing_argument(&self) -> bool {
        let n = self.stack.len();
        n >= 2 && self.stack[n - 1].kind == ScopeKind::Block && self.stack[n - 2].kind == ScopeKind::Parent
    }

    fn current(&mut self) -> &mut Vec<Tag> {
        match self.stack.last_mut() {
            Some(scope) => &mut scope.body,
            None => &mut self.root,
        }
    }

    fn push(&mut self, tag: Tag) {
        self.current().push(tag);
    }

    fn push_literal(&mut self, text: &str) {
        if !text.is_empty() {
            self.push(Tag::Literal(text.to_string()));
        }
    }

    fn open(&mut self, kind: ScopeKind, name: &str, indent: &str, relative_indent: bool, standalone: bool) {
        self.stack.push(Scope {
            kind,
            name: name.to_string(),
            indent: indent.to_string(),
            relative_indent,
            line: self.line,
            standalone,
            body: Vec::new(),
        });
    }

    /// Close the innermost scope.
    ///
    /// Returns the standalone flag when the closed scope is a parent.
    fn close(&mut self, name: &str) -> Result<Option<bool>, ParseError> {
        let written = format!("{}/{}{}", self.delims.open, name, self.delims.close);
        let Some(scope) = self.stack.last() else {
            return Err(ParseErrorKind::CloseWithoutOpen { tag: written }.at(self.line));
        };
        if scope.name != name {
            return Err(ParseErrorKind::MismatchedClose {
                tag: written,
                expected: scope.name.clone(),
                opened_on: scope.line,
            }
            .at(self.line));
        }
        let Some(scope) = self.stack.pop() else {
            return Ok(None);
        };
        let parent_standalone = (scope.kind == ScopeKind::Parent).then_some(scope.standalone);
        let tag = scope.into_tag();
        self.push(tag);
        Ok(parent_standalone)
    }
}
