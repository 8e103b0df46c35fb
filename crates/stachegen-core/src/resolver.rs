//! Partial resolution
//!
//! Loads and parses every partial a template references, directly or through
//! other partials, and merges structurally identical partial trees so that
//! each distinct tree becomes exactly one generated unit.

use std::collections::HashMap;
use std::io;

use tracing::debug;

use crate::error::{CompileError, CompileResult};
use crate::parser::parse;
use crate::tag::{walk, Tag};

/// Supplies partial template source by name
///
/// A partial that does not exist must load as empty text. Any error aborts
/// the compilation.
pub trait PartialLoader {
    /// Load the source of the partial called `name`
    fn load(&mut self, name: &str) -> io::Result<String>;
}

impl<F> PartialLoader for F
where
    F: FnMut(&str) -> io::Result<String>,
{
    fn load(&mut self, name: &str) -> io::Result<String> {
        self(name)
    }
}

/// In-memory partial loader
#[derive(Debug, Clone, Default)]
pub struct MapLoader {
    partials: HashMap<String, String>,
}

impl MapLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a partial, replacing any earlier source for the same name
    pub fn with_partial(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    /// Register a partial
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.partials.insert(name.into(), source.into());
    }
}

impl PartialLoader for MapLoader {
    fn load(&mut self, name: &str) -> io::Result<String> {
        Ok(self.partials.get(name).cloned().unwrap_or_default())
    }
}

impl<K, V> FromIterator<(K, V)> for MapLoader
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut loader = MapLoader::new();
        for (name, source) in iter {
            loader.insert(name, source);
        }
        loader
    }
}

/// A template together with every partial it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    tags: Vec<Tag>,
    partials: Vec<Vec<Tag>>,
    units: HashMap<String, usize>,
}

impl ResolvedTemplate {
    /// Top-level tags
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Distinct partial trees, indexed by unit number
    pub fn partials(&self) -> &[Vec<Tag>] {
        &self.partials
    }

    /// Unit number that renders the partial called `name`
    pub fn unit_for(&self, name: &str) -> Option<usize> {
        self.units.get(name).copied()
    }

    /// Like [`unit_for`](Self::unit_for), as an error for code generation
    pub(crate) fn require_unit(&self, name: &str) -> CompileResult<usize> {
        self.unit_for(name).ok_or_else(|| CompileError::UnresolvedPartial {
            name: name.to_string(),
        })
    }
}

/// Resolve every partial referenced from `tags`
///
/// # Arguments
/// * `tags` - Parsed top-level template
/// * `loader` - Partial source provider
///
/// # Returns
/// The template with its deduplicated partials, or the first load or parse
/// failure
pub fn resolve_partials<L>(tags: Vec<Tag>, loader: &mut L) -> CompileResult<ResolvedTemplate>
where
    L: PartialLoader + ?Sized,
{
    let mut resolver = Resolver {
        loader,
        partials: Vec::new(),
        units: HashMap::new(),
    };
    resolver.gather(&tags)?;
    debug!(
        partials = resolver.units.len(),
        units = resolver.partials.len(),
        "resolved partials"
    );
    Ok(ResolvedTemplate {
        tags,
        partials: resolver.partials,
        units: resolver.units,
    })
}

struct Resolver<'l, L: ?Sized> {
    loader: &'l mut L,
    partials: Vec<Vec<Tag>>,
    units: HashMap<String, usize>,
}

impl<L: PartialLoader + ?Sized> Resolver<'_, L> {
    fn gather(&mut self, tags: &[Tag]) -> CompileResult<()> {
        for tag in walk(tags).filter(|t| t.is_reference()) {
            let name = tag.name();
            if self.units.contains_key(name) {
                continue;
            }
            let source = self.loader.load(name).map_err(|source| CompileError::Load {
                name: name.to_string(),
                source,
            })?;
            let tree = parse(&source).map_err(|source| CompileError::Partial {
                name: name.to_string(),
                source,
            })?;

            let unit = match self.partials.iter().position(|p| *p == tree) {
                Some(unit) => unit,
                None => {
                    self.partials.push(tree.clone());
                    self.partials.len() - 1
                }
            };
            debug!(partial = name, unit, "loaded partial");
            // Registered before descending so recursive partials terminate.
            self.units.insert(name.to_string(), unit);
            self.gather(&tree)?;
        }
        Ok(())
    }
}
