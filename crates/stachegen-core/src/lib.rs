//! Mustache template compiler
//!
//! Compiles mustache templates, including partials and parent/block
//! inheritance, into Go or JavaScript source that renders the template when
//! run.
//!
//! The pipeline has three steps:
//!
//! 1. [`parse`] turns template source into a [`Tag`] tree, applying the
//!    standalone-line whitespace rules.
//! 2. [`resolve_partials`] loads every referenced partial through a
//!    [`PartialLoader`] and merges structurally identical partial trees.
//! 3. [`generate`] (or a configured [`CodeGenerator`]) emits one function per
//!    template and unique partial.
//!
//! [`compile`] runs all three.
//!
//! ```
//! use stachegen_core::{compile, MapLoader, Target};
//!
//! let mut loader = MapLoader::new().with_partial("item", "<li>{{name}}</li>\n");
//! let js = compile(Target::JavaScript, "{{#items}}{{>item}}{{/items}}", &mut loader, "list").unwrap();
//! assert!(js.contains("export default function"));
//! ```

#![warn(missing_docs)]

pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod tag;

pub use codegen::{generate, CodeGenerator, Target, DEFAULT_RUNTIME_IMPORT};
pub use error::{CompileError, CompileResult, ParseError, ParseErrorKind};
pub use lexer::Delimiters;
pub use parser::parse;
pub use resolver::{resolve_partials, MapLoader, PartialLoader, ResolvedTemplate};
pub use tag::{walk, Tag};

/// Parse `source`, resolve its partials and generate code with default settings
///
/// # Arguments
/// * `target` - Output language
/// * `source` - Template text
/// * `loader` - Partial source provider
/// * `unit_name` - Name of the template
pub fn compile<L>(target: Target, source: &str, loader: &mut L, unit_name: &str) -> CompileResult<String>
where
    L: PartialLoader + ?Sized,
{
    compile_with(&CodeGenerator::new(target), source, loader, unit_name)
}

/// Like [`compile`], with a configured generator
pub fn compile_with<L>(
    generator: &CodeGenerator,
    source: &str,
    loader: &mut L,
    unit_name: &str,
) -> CompileResult<String>
where
    L: PartialLoader + ?Sized,
{
    let tags = parse(source)?;
    let resolved = resolve_partials(tags, loader)?;
    generator.generate(&resolved, unit_name)
}
