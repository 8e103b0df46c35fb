//! JavaScript backend
//!
//! Output is an ES module. Generated code uses short local names:
//! `x` output string, `s` context stack, `n` running indent, `b` block table,
//! `c` section value, `g` section body, `e` section element, `bb` override.

use std::fmt::Write as _;

use super::{Backend, Indent, ParentCall};

/// Helpers every generated module starts with
pub(crate) const PRELUDE: &str = include_str!("../../assets/prelude.js");

pub(crate) struct JsBackend {
    out: String,
    // One entry per open parent call: no override written yet
    first_override: Vec<bool>,
}

impl JsBackend {
    pub(crate) fn new() -> Self {
        Self {
            out: String::from(PRELUDE),
            first_override: Vec::new(),
        }
    }

    fn write_path(&mut self, path: &str) {
        if path == "." {
            self.out.push_str("s.at(-1)");
            return;
        }
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let _ = write!(self.out, "look(s,{})", quote(first));
        for segment in segments {
            if is_identifier(segment) {
                let _ = write!(self.out, "?.{}", segment);
            } else {
                let _ = write!(self.out, "?.[{}]", quote(segment));
            }
        }
    }

    fn write_indent(&mut self, indent: Indent<'_>) {
        match indent {
            Indent::Running => self.out.push('n'),
            Indent::Literal(s) => self.out.push_str(&quote(s)),
            Indent::RunningPlus(s) => {
                self.out.push_str("n+");
                self.out.push_str(&quote(s));
            }
        }
    }
}

impl Backend for JsBackend {
    fn begin_template(&mut self) {
        self.out.push_str("export default function(data){let s=[data],x=''");
    }

    fn end_template(&mut self) {
        self.out.push_str(";return x}\n");
    }

    fn begin_partial(&mut self, unit: usize) {
        let _ = write!(self.out, "function p{}(s,b,n){{let x=''", unit);
    }

    fn end_partial(&mut self) {
        self.out.push_str(";return x}\n");
    }

    fn literal(&mut self, text: &str) {
        self.out.push_str(";x+=");
        self.out.push_str(&quote(text));
    }

    fn indent_point(&mut self) {
        self.out.push_str(";x+=n");
    }

    fn variable(&mut self, path: &str, escape: bool) {
        if escape {
            self.out.push_str(";x+=esc(");
            self.write_path(path);
            self.out.push_str("??'')");
        } else {
            self.out.push_str(";x+=");
            self.write_path(path);
            self.out.push_str("??''");
        }
    }

    fn section_open(&mut self, path: &str) {
        self.out.push_str(";{let c=");
        self.write_path(path);
        self.out.push_str(";if(!f(c)){let g=(e)=>{s.push(e)");
    }

    fn section_close(&mut self) {
        self.out.push_str(";s.pop()};arr(c)?c.forEach((e)=>g(e)):g(c)}}");
    }

    fn inverted_open(&mut self, path: &str) {
        self.out.push_str(";if(f(");
        self.write_path(path);
        self.out.push_str(")){");
    }

    fn inverted_close(&mut self) {
        self.out.push('}');
    }

    fn partial_call(&mut self, unit: usize, indent: Indent<'_>) {
        let _ = write!(self.out, ";x+=p{}(s,{{}},", unit);
        self.write_indent(indent);
        self.out.push(')');
    }

    fn block_open(&mut self, name: &str, indent: Indent<'_>) {
        let _ = write!(self.out, ";{{const bb=blk(b,{});if(bb!==undefined)x+=bb(s,", quote(name));
        self.write_indent(indent);
        self.out.push_str(");else{");
    }

    fn block_close(&mut self) {
        self.out.push_str("}}");
    }

    fn parent_open(&mut self, call: &ParentCall<'_>) {
        let _ = write!(self.out, ";x+=p{}(s,{{", call.unit);
        self.first_override.push(true);
    }

    fn override_open(&mut self, name: &str) {
        if let Some(first) = self.first_override.last_mut() {
            if !*first {
                self.out.push(',');
            }
            *first = false;
        }
        let _ = write!(self.out, "{}:(s,n)=>{{let x=''", quote(name));
    }

    fn override_close(&mut self) {
        self.out.push_str(";return x}");
    }

    fn parent_close(&mut self, call: &ParentCall<'_>) {
        let first = self.first_override.pop().unwrap_or(true);
        if call.inherit_blocks {
            if !first {
                self.out.push(',');
            }
            self.out.push_str("...b");
        }
        self.out.push_str("},");
        self.write_indent(call.indent);
        self.out.push(')');
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Quote `s` as a single-quoted JavaScript string literal
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Whether `s` can follow `?.` as a property name
pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
