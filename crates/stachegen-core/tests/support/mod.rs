//! Reference renderer used by the integration tests
//!
//! Walks a resolved tree with the same state the generated code threads
//! through: a context stack, a running indent and a block override table.
//! Data is a `serde_json::Value`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use stachegen_core::{parse, resolve_partials, MapLoader, ResolvedTemplate, Tag};

/// Parse, resolve and render `template`
pub fn render(template: &str, partials: &[(&str, &str)], data: &Value) -> String {
    let mut loader: MapLoader = partials.iter().copied().collect();
    let tags = parse(template).expect("template parses");
    let resolved = resolve_partials(tags, &mut loader).expect("partials resolve");
    render_resolved(&resolved, data)
}

/// Render an already resolved template
pub fn render_resolved(resolved: &ResolvedTemplate, data: &Value) -> String {
    let mut out = String::new();
    let mut stack = vec![data.clone()];
    let top = Unit {
        indent: None,
        blocks: None,
    };
    Renderer { resolved }.tags(resolved.tags(), &top, &mut stack, &mut out);
    out
}

#[derive(Clone)]
struct Override<'t> {
    body: &'t [Tag],
    blocks: Option<Rc<Blocks<'t>>>,
}

type Blocks<'t> = HashMap<String, Override<'t>>;

struct Unit<'t> {
    indent: Option<String>,
    blocks: Option<Rc<Blocks<'t>>>,
}

impl Unit<'_> {
    fn increase(&self, indent: &str) -> String {
        format!("{}{}", self.indent.as_deref().unwrap_or_default(), indent)
    }
}

struct Renderer<'t> {
    resolved: &'t ResolvedTemplate,
}

impl<'t> Renderer<'t> {
    fn tags(&self, tags: &'t [Tag], unit: &Unit<'t>, stack: &mut Vec<Value>, out: &mut String) {
        for tag in tags {
            self.tag(tag, unit, stack, out);
        }
    }

    fn tag(&self, tag: &'t Tag, unit: &Unit<'t>, stack: &mut Vec<Value>, out: &mut String) {
        match tag {
            Tag::Literal(text) => out.push_str(text),
            Tag::IndentPoint => {
                if let Some(indent) = &unit.indent {
                    out.push_str(indent);
                }
            }
            Tag::Variable(path) => out.push_str(&escape(&display(lookup(stack, path)))),
            Tag::RawVariable(path) => out.push_str(&display(lookup(stack, path))),
            Tag::Section { name, body } => {
                let value = lookup(stack, name);
                if is_falsy(&value) {
                    return;
                }
                let items = match value {
                    Some(Value::Array(items)) => items,
                    Some(value) => vec![value],
                    None => Vec::new(),
                };
                for item in items {
                    stack.push(item);
                    self.tags(body, unit, stack, out);
                    stack.pop();
                }
            }
            Tag::InvertedSection { name, body } => {
                if is_falsy(&lookup(stack, name)) {
                    self.tags(body, unit, stack, out);
                }
            }
            Tag::Partial { name, indent } => {
                let inner = Unit {
                    indent: Some(unit.increase(indent)),
                    blocks: Some(Rc::new(Blocks::new())),
                };
                self.tags(self.partial(name), &inner, stack, out);
            }
            Tag::Block {
                name,
                indent,
                relative_indent,
                body,
            } => match unit.blocks.as_ref().and_then(|blocks| blocks.get(name)) {
                Some(over) => {
                    let indent = if *relative_indent && unit.indent.is_some() {
                        unit.increase(indent)
                    } else {
                        indent.clone()
                    };
                    let inner = Unit {
                        indent: Some(indent),
                        blocks: over.blocks.clone(),
                    };
                    self.tags(over.body, &inner, stack, out);
                }
                None => self.tags(body, unit, stack, out),
            },
            Tag::Parent { name, indent, body } => {
                let mut table = Blocks::new();
                for child in body {
                    if let Tag::Block { name, body, .. } = child {
                        table.insert(
                            name.clone(),
                            Override {
                                body,
                                blocks: unit.blocks.clone(),
                            },
                        );
                    }
                }
                if let Some(outer) = &unit.blocks {
                    for (name, over) in outer.iter() {
                        table.insert(name.clone(), over.clone());
                    }
                }
                let inner = Unit {
                    indent: Some(unit.increase(indent)),
                    blocks: Some(Rc::new(table)),
                };
                self.tags(self.partial(name), &inner, stack, out);
            }
        }
    }

    fn partial(&self, name: &str) -> &'t [Tag] {
        let unit = self.resolved.unit_for(name).expect("partial was resolved");
        &self.resolved.partials()[unit]
    }
}

fn lookup(stack: &[Value], path: &str) -> Option<Value> {
    if path == "." {
        return stack.last().cloned();
    }
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut value = stack
        .iter()
        .rev()
        .find_map(|frame| frame.as_object()?.get(first))?
        .clone();
    for segment in segments {
        value = value.as_object()?.get(segment)?.clone();
    }
    Some(value)
}

fn is_falsy(value: &Option<Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

fn display(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

/// Entity-escape the five markup metacharacters
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
