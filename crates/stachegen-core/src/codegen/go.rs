//! Go backend
//!
//! Each unit is a function writing into a `*bytes.Buffer`. Context values are
//! `reflect.Value`s; lookups, truthiness and iteration go through the runtime
//! package imported as `m`.

use std::fmt::Write as _;

use super::{Backend, Indent, ParentCall};

/// Import path of the Go runtime support package
pub const DEFAULT_RUNTIME_IMPORT: &str = "github.com/kagisearch/mustache-codegen/go/mustache";

const BLOCK_FUNC: &str = "func(*bytes.Buffer, string, []reflect.Value)";

pub(crate) struct GoBackend {
    out: String,
    depth: usize,
    // Exported render function
    entry: String,
    // Partial functions are `{prefix}_p{unit}`
    prefix: String,
}

impl GoBackend {
    pub(crate) fn new(package: &str, runtime_import: &str, unit_name: &str) -> Self {
        let ident = identifier(unit_name);
        let mut backend = Self {
            out: String::new(),
            depth: 0,
            entry: exported(&ident),
            prefix: format!("_{}", ident),
        };
        backend.header(package, runtime_import);
        backend
    }

    fn header(&mut self, package: &str, runtime_import: &str) {
        self.line("// Code generated by stachegen. DO NOT EDIT.");
        self.line("");
        self.line(&format!("package {}", package));
        self.line("");
        self.line("import (");
        self.line("\t\"bytes\"");
        self.line("\t\"html\"");
        self.line("\t\"reflect\"");
        self.line("");
        self.line(&format!("\tm {}", quote(runtime_import)));
        self.line(")");
        self.line("");
        self.line("// Ignore unused imports.");
        self.line("var (");
        self.line("\t_ = html.EscapeString");
        self.line("\t_ = reflect.ValueOf");
        self.line("\t_ = m.Lookup");
        self.line(")");
        self.line("");
    }

    fn line(&mut self, text: &str) {
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push('\t');
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.depth += 1;
    }

    fn close(&mut self, text: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    fn function(&self, unit: usize) -> String {
        format!("{}_p{}", self.prefix, unit)
    }

    fn lookup(path: &str) -> String {
        format!("m.Lookup(stack, {})", quote(path))
    }
}

fn indent_arg(indent: Indent<'_>) -> String {
    match indent {
        Indent::Running => "indent".to_string(),
        Indent::Literal(s) => quote(s),
        Indent::RunningPlus(s) => format!("indent+{}", quote(s)),
    }
}

impl Backend for GoBackend {
    fn begin_template(&mut self) {
        let signature = format!("func {}(buf *bytes.Buffer, data any) {{", self.entry);
        self.open(&signature);
        self.line("stack := []reflect.Value{reflect.ValueOf(data)}");
        self.line("_ = stack");
    }

    fn end_template(&mut self) {
        self.close("}");
    }

    fn begin_partial(&mut self, unit: usize) {
        self.line("");
        let signature = format!(
            "func {}(buf *bytes.Buffer, indent string, stack []reflect.Value, blocks map[string]{}) {{",
            self.function(unit),
            BLOCK_FUNC
        );
        self.open(&signature);
    }

    fn end_partial(&mut self) {
        self.close("}");
    }

    fn literal(&mut self, text: &str) {
        self.line(&format!("buf.WriteString({})", quote(text)));
    }

    fn indent_point(&mut self) {
        self.line("buf.WriteString(indent)");
    }

    fn variable(&mut self, path: &str, escape: bool) {
        let value = format!("m.ToString({})", Self::lookup(path));
        if escape {
            self.line(&format!("buf.WriteString(html.EscapeString({}))", value));
        } else {
            self.line(&format!("buf.WriteString({})", value));
        }
    }

    fn section_open(&mut self, path: &str) {
        self.open(&format!("for e := range m.ForEach({}) {{", Self::lookup(path)));
        self.line("stack = append(stack, e)");
    }

    fn section_close(&mut self) {
        self.line("clear(stack[len(stack)-1:])");
        self.line("stack = stack[:len(stack)-1]");
        self.close("}");
    }

    fn inverted_open(&mut self, path: &str) {
        self.open(&format!("if m.IsFalsyOrEmptyList({}) {{", Self::lookup(path)));
    }

    fn inverted_close(&mut self) {
        self.close("}");
    }

    fn partial_call(&mut self, unit: usize, indent: Indent<'_>) {
        let call = format!("{}(buf, {}, stack, nil)", self.function(unit), indent_arg(indent));
        self.line(&call);
    }

    fn block_open(&mut self, name: &str, indent: Indent<'_>) {
        self.open(&format!("if b, ok := blocks[{}]; ok {{", quote(name)));
        self.line(&format!("b(buf, {}, stack)", indent_arg(indent)));
        self.close("} else {");
        self.depth += 1;
    }

    fn block_close(&mut self) {
        self.close("}");
    }

    fn parent_open(&mut self, _call: &ParentCall<'_>) {
        self.open("{");
        self.line(&format!("partialBlocks := make(map[string]{})", BLOCK_FUNC));
        self.line("_ = partialBlocks");
    }

    fn override_open(&mut self, name: &str) {
        self.open(&format!(
            "partialBlocks[{}] = func(buf *bytes.Buffer, indent string, stack []reflect.Value) {{",
            quote(name)
        ));
    }

    fn override_close(&mut self) {
        self.close("}");
    }

    fn parent_close(&mut self, call: &ParentCall<'_>) {
        if call.inherit_blocks {
            self.open("for k, v := range blocks {");
            self.line("partialBlocks[k] = v");
            self.close("}");
        }
        let invoke = format!(
            "{}(buf, {}, stack, partialBlocks)",
            self.function(call.unit),
            indent_arg(call.indent)
        );
        self.line(&invoke);
        self.close("}");
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Quote `s` as a Go interpreted string literal
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{b}' => out.push_str("\\v"),
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' || c == '\u{feff}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Turn an arbitrary unit name into Go identifier characters
///
/// Only ASCII letters, digits and `_` survive; everything else becomes `_`.
/// The result may start with a digit, so callers prefix it.
fn identifier(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Exported entry function name for a sanitised unit name
///
/// A name that would not start with a letter gets a `T` prefix, so `404`
/// becomes `T404` and `_` becomes `T_`.
fn exported(ident: &str) -> String {
    let name = upper_camel(ident);
    if name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        name
    } else {
        format!("T{}", name)
    }
}

/// `lower_snake` to `UpperCamel`
fn upper_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize = true;
    for c in s.chars() {
        if capitalize {
            out.extend(c.to_uppercase());
            capitalize = false;
        } else if c == '_' {
            capitalize = true;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote("a\"b\\c\n\t"), "\"a\\\"b\\\\c\\n\\t\"");
        assert_eq!(quote("\u{1}é"), "\"\\u0001é\"");
    }

    #[test]
    fn test_identifier() {
        assert_eq!(identifier("user_card"), "user_card");
        assert_eq!(identifier("user-card.v2"), "user_card_v2");
        assert_eq!(identifier("404"), "404");
        assert_eq!(identifier("x²"), "x_");
        assert_eq!(identifier("Ⅻ"), "_");
        // Devanagari letter plus a combining vowel sign
        assert_eq!(identifier("कि"), "__");
        assert_eq!(identifier("héllo"), "h_llo");
        assert_eq!(identifier("-"), "_");
    }

    #[test]
    fn test_exported() {
        assert_eq!(exported("user_card"), "UserCard");
        assert_eq!(exported("x_"), "X");
        assert_eq!(exported("404"), "T404");
        assert_eq!(exported("_"), "T_");
        assert_eq!(exported("__"), "T_");
        assert_eq!(exported("_private"), "T_private");
    }

    fn is_go_identifier(s: &str) -> bool {
        s.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    #[test]
    fn test_unit_names_give_valid_go_identifiers() {
        for name in ["x²", "कि", "-", "_", "404", "my page", "ünïcode", "a.b-c", "日本"] {
            let backend = GoBackend::new("main", DEFAULT_RUNTIME_IMPORT, name);
            assert!(is_go_identifier(&backend.entry), "{:?} -> {:?}", name, backend.entry);
            assert!(backend.entry.starts_with(|c: char| c.is_ascii_uppercase()), "{:?}", name);
            assert_ne!(backend.entry, "_");
            assert!(is_go_identifier(&backend.function(0)), "{:?}", name);
        }
    }

    #[test]
    fn test_upper_camel() {
        assert_eq!(upper_camel("user_card"), "UserCard");
        assert_eq!(upper_camel("stdin"), "Stdin");
        assert_eq!(upper_camel("a__b"), "A_b");
    }

    #[test]
    fn test_indent_arg() {
        assert_eq!(indent_arg(Indent::Running), "indent");
        assert_eq!(indent_arg(Indent::Literal("  ")), "\"  \"");
        assert_eq!(indent_arg(Indent::RunningPlus("\t")), "indent+\"\\t\"");
    }
}
