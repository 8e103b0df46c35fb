//! Code generation
//!
//! One tree walk drives every target. A [`Backend`] only knows how to spell
//! each construct in its language; the walk decides what to emit, in which
//! unit, with which indentation and which block table in scope.
//!
//! Units: the top-level template renders with no running indent and no block
//! table. Every deduplicated partial renders with both. Block override bodies
//! always receive a running indent and see the block table of the unit that
//! defines them.

mod go;
mod js;

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::resolver::ResolvedTemplate;
use crate::tag::Tag;

pub use go::DEFAULT_RUNTIME_IMPORT;

/// Output language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Go source using the `mustache` runtime package
    Go,
    /// A JavaScript module with a default-exported render function
    JavaScript,
}

impl Target {
    /// Short name used on the command line
    pub fn as_str(self) -> &'static str {
        match self {
            Target::Go => "go",
            Target::JavaScript => "js",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go" => Ok(Target::Go),
            "js" | "javascript" => Ok(Target::JavaScript),
            other => Err(CompileError::UnsupportedTarget(other.to_string())),
        }
    }
}

/// Generates source code for a resolved template
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    target: Target,
    go_package: String,
    runtime_import: String,
}

impl CodeGenerator {
    /// Create a generator with default settings
    pub fn new(target: Target) -> Self {
        Self {
            target,
            go_package: "main".to_string(),
            runtime_import: DEFAULT_RUNTIME_IMPORT.to_string(),
        }
    }

    /// Package clause for Go output
    pub fn with_go_package(mut self, package: impl Into<String>) -> Self {
        self.go_package = package.into();
        self
    }

    /// Import path of the Go runtime support package
    pub fn with_runtime_import(mut self, path: impl Into<String>) -> Self {
        self.runtime_import = path.into();
        self
    }

    /// Target language
    pub fn target(&self) -> Target {
        self.target
    }

    /// Generate source text
    ///
    /// # Arguments
    /// * `resolved` - Template and partials from [`resolve_partials`](crate::resolve_partials)
    /// * `unit_name` - Name of the template; Go output derives function names from it
    ///
    /// # Returns
    /// Generated source, identical across runs for identical input
    pub fn generate(&self, resolved: &ResolvedTemplate, unit_name: &str) -> CompileResult<String> {
        if unit_name.trim().is_empty() {
            return Err(CompileError::InvalidUnitName(unit_name.to_string()));
        }
        debug!(
            target = %self.target,
            unit = unit_name,
            partials = resolved.partials().len(),
            "generating code"
        );
        match self.target {
            Target::Go => {
                let backend = go::GoBackend::new(&self.go_package, &self.runtime_import, unit_name);
                emit(backend, resolved)
            }
            Target::JavaScript => emit(js::JsBackend::new(), resolved),
        }
    }
}

/// Generate source text with default settings
pub fn generate(target: Target, resolved: &ResolvedTemplate, unit_name: &str) -> CompileResult<String> {
    CodeGenerator::new(target).generate(resolved, unit_name)
}

/// Indentation argument passed to a partial, parent or block override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Indent<'a> {
    /// The running indent of the current unit
    Running,
    /// A fixed string
    Literal(&'a str),
    /// The running indent followed by a fixed string
    RunningPlus(&'a str),
}

impl<'a> Indent<'a> {
    fn increase(running: bool, literal: &'a str) -> Self {
        match (running, literal.is_empty()) {
            (false, _) => Indent::Literal(literal),
            (true, true) => Indent::Running,
            (true, false) => Indent::RunningPlus(literal),
        }
    }
}

/// A call into a parent's unit together with the overrides built for it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParentCall<'a> {
    pub unit: usize,
    pub indent: Indent<'a>,
    /// Merge the enclosing block table over the new overrides
    pub inherit_blocks: bool,
}

/// How one target spells each construct
pub(crate) trait Backend {
    fn begin_template(&mut self);
    fn end_template(&mut self);
    fn begin_partial(&mut self, unit: usize);
    fn end_partial(&mut self);

    fn literal(&mut self, text: &str);
    fn indent_point(&mut self);
    fn variable(&mut self, path: &str, escape: bool);
    fn section_open(&mut self, path: &str);
    fn section_close(&mut self);
    fn inverted_open(&mut self, path: &str);
    fn inverted_close(&mut self);
    fn partial_call(&mut self, unit: usize, indent: Indent<'_>);
    fn block_open(&mut self, name: &str, indent: Indent<'_>);
    fn block_close(&mut self);
    fn parent_open(&mut self, call: &ParentCall<'_>);
    fn override_open(&mut self, name: &str);
    fn override_close(&mut self);
    fn parent_close(&mut self, call: &ParentCall<'_>);

    fn finish(self) -> String;
}

/// What the unit being emitted has in scope
#[derive(Debug, Clone, Copy)]
struct Scope {
    indent: bool,
    blocks: bool,
}

impl Scope {
    const TEMPLATE: Scope = Scope {
        indent: false,
        blocks: false,
    };
    const PARTIAL: Scope = Scope {
        indent: true,
        blocks: true,
    };
}

fn emit<B: Backend>(mut backend: B, resolved: &ResolvedTemplate) -> CompileResult<String> {
    let mut walker = Walker {
        backend: &mut backend,
        resolved,
    };
    walker.backend.begin_template();
    walker.tags(resolved.tags(), Scope::TEMPLATE)?;
    walker.backend.end_template();
    for (unit, tags) in resolved.partials().iter().enumerate() {
        walker.backend.begin_partial(unit);
        walker.tags(tags, Scope::PARTIAL)?;
        walker.backend.end_partial();
    }
    Ok(backend.finish())
}

struct Walker<'w, B> {
    backend: &'w mut B,
    resolved: &'w ResolvedTemplate,
}

impl<B: Backend> Walker<'_, B> {
    fn tags(&mut self, tags: &[Tag], scope: Scope) -> CompileResult<()> {
        let mut rest = tags;
        while let Some((tag, tail)) = rest.split_first() {
            if !scope.indent && matches!(tag, Tag::Literal(_)) {
                rest = self.coalesced_literal(rest);
                continue;
            }
            self.tag(tag, scope)?;
            rest = tail;
        }
        Ok(())
    }

    // Without a running indent, indent points are no-ops and a run of
    // literals can be written at once.
    fn coalesced_literal<'t>(&mut self, tags: &'t [Tag]) -> &'t [Tag] {
        let mut text = String::new();
        let mut taken = 0;
        for tag in tags {
            match tag {
                Tag::Literal(s) => text.push_str(s),
                Tag::IndentPoint => {}
                _ => break,
            }
            taken += 1;
        }
        self.backend.literal(&text);
        &tags[taken..]
    }

    fn tag(&mut self, tag: &Tag, scope: Scope) -> CompileResult<()> {
        match tag {
            Tag::Literal(text) => self.backend.literal(text),
            Tag::IndentPoint => {
                if scope.indent {
                    self.backend.indent_point();
                }
            }
            Tag::Variable(path) => self.backend.variable(path, true),
            Tag::RawVariable(path) => self.backend.variable(path, false),
            Tag::Section { name, body } => {
                self.backend.section_open(name);
                self.tags(body, scope)?;
                self.backend.section_close();
            }
            Tag::InvertedSection { name, body } => {
                self.backend.inverted_open(name);
                self.tags(body, scope)?;
                self.backend.inverted_close();
            }
            Tag::Partial { name, indent } => {
                let unit = self.resolved.require_unit(name)?;
                self.backend
                    .partial_call(unit, Indent::increase(scope.indent, indent));
            }
            Tag::Block {
                name,
                indent,
                relative_indent,
                body,
            } => {
                if scope.blocks {
                    let indent = Indent::increase(*relative_indent && scope.indent, indent);
                    self.backend.block_open(name, indent);
                    self.tags(body, scope)?;
                    self.backend.block_close();
                } else {
                    self.tags(body, scope)?;
                }
            }
            Tag::Parent { name, indent, body } => {
                let call = ParentCall {
                    unit: self.resolved.require_unit(name)?,
                    indent: Indent::increase(scope.indent, indent),
                    inherit_blocks: scope.blocks,
                };
                self.backend.parent_open(&call);
                for child in body {
                    if let Tag::Block { name, body, .. } = child {
                        self.backend.override_open(name);
                        self.tags(body, Scope { indent: true, ..scope })?;
                        self.backend.override_close();
                    }
                }
                self.backend.parent_close(&call);
            }
        }
        Ok(())
    }
}
