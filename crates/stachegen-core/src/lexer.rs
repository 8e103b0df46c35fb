//! Tag cutting
//!
//! Pulls one delimiter-bounded tag at a time out of template source. The
//! structural parser decides what the tag means for the tree; this module only
//! knows about delimiters, sigils and tag boundaries.

use crate::error::ParseErrorKind;

/// Default open delimiter
pub const DEFAULT_OPEN: &str = "{{";
/// Default close delimiter
pub const DEFAULT_CLOSE: &str = "}}";

/// The active open/close delimiter pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    /// Open delimiter
    pub open: String,
    /// Close delimiter
    pub close: String,
}

impl Delimiters {
    /// Create a delimiter pair
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// Whether these are `{{` and `}}`
    pub fn is_default(&self) -> bool {
        self.open == DEFAULT_OPEN && self.close == DEFAULT_CLOSE
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new(DEFAULT_OPEN, DEFAULT_CLOSE)
    }
}

/// Tag type marker following the open delimiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sigil {
    /// `#`
    Section,
    /// `^`
    Inverted,
    /// `!`
    Comment,
    /// `>`
    Partial,
    /// `$`
    Block,
    /// `<`
    Parent,
    /// `/`
    Close,
    /// `=`
    SetDelimiters,
    /// `&` or triple braces
    Raw,
}

impl Sigil {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'#' => Some(Sigil::Section),
            b'^' => Some(Sigil::Inverted),
            b'!' => Some(Sigil::Comment),
            b'>' => Some(Sigil::Partial),
            b'$' => Some(Sigil::Block),
            b'<' => Some(Sigil::Parent),
            b'/' => Some(Sigil::Close),
            b'&' => Some(Sigil::Raw),
            _ => None,
        }
    }

    /// Whether this sigil opens a scope that a `/` tag closes
    pub fn opens_scope(self) -> bool {
        matches!(
            self,
            Sigil::Section | Sigil::Inverted | Sigil::Block | Sigil::Parent
        )
    }
}

/// One tag cut out of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cut<'s> {
    /// `None` for a plain escaped interpolation
    pub sigil: Option<Sigil>,
    /// Trimmed tag content after the sigil
    pub key: &'s str,
    /// Offset just past the close delimiter
    pub end: usize,
}

/// Cut the tag whose open delimiter starts at `start`
///
/// # Arguments
/// * `s` - Template source
/// * `start` - Offset of the open delimiter
/// * `delims` - Delimiters in effect
pub fn cut_tag<'s>(s: &'s str, start: usize, delims: &Delimiters) -> Result<Cut<'s>, ParseErrorKind> {
    let bytes = s.as_bytes();
    let close = delims.close.as_bytes();
    let inner_start = start + delims.open.len();
    let is_comment = bytes.get(inner_start) == Some(&b'!');

    let mut inner_end = inner_start;
    let mut tag_end = None;
    while inner_end + close.len() <= bytes.len() {
        if bytes[inner_end] == b'\n' && !is_comment {
            return Err(ParseErrorKind::UnclosedTag);
        }
        if bytes[inner_end..].starts_with(close) {
            tag_end = Some(inner_end + close.len());
            break;
        }
        inner_end += 1;
    }
    let Some(tag_end) = tag_end else {
        return Err(if is_comment {
            ParseErrorKind::UnclosedComment
        } else {
            ParseErrorKind::UnclosedTag
        });
    };

    if delims.is_default() && bytes.get(inner_start) == Some(&b'{') && bytes.get(tag_end) == Some(&b'}') {
        return Ok(Cut {
            sigil: Some(Sigil::Raw),
            key: s[inner_start + 1..inner_end].trim(),
            end: tag_end + 1,
        });
    }

    let inner = &s[inner_start..inner_end];
    if let Some(rest) = inner.strip_prefix('=') {
        let Some(rest) = rest.strip_suffix('=') else {
            return Err(ParseErrorKind::MissingDelimiterEquals {
                tag: s[start..tag_end].to_string(),
                close: delims.close.clone(),
            });
        };
        return Ok(Cut {
            sigil: Some(Sigil::SetDelimiters),
            key: rest.trim(),
            end: tag_end,
        });
    }

    let sigil = match inner.as_bytes() {
        [first, _, ..] => Sigil::from_byte(*first),
        _ => None,
    };
    let key = if sigil.is_some() { &inner[1..] } else { inner };
    Ok(Cut {
        sigil,
        key: key.trim(),
        end: tag_end,
    })
}

/// Split the content of a `{{=open close=}}` tag into a delimiter pair
pub fn split_set_delimiters(key: &str) -> Result<Delimiters, ParseErrorKind> {
    let Some(gap) = key.find(char::is_whitespace) else {
        return Err(ParseErrorKind::MissingEndDelimiter);
    };
    if gap == 0 {
        return Err(ParseErrorKind::EmptyDelimiters);
    }
    let after = &key[gap..];
    let Some(close_start) = after.find(|c: char| !c.is_whitespace()) else {
        return Err(ParseErrorKind::MissingEndDelimiter);
    };
    let close = &after[close_start..];
    if close.contains(char::is_whitespace) {
        return Err(ParseErrorKind::TooManyDelimiters);
    }
    Ok(Delimiters::new(&key[..gap], close))
}

/// Find the offset just past the close tag matching an element named `name`
///
/// Scanning starts at `from`, right after the opening tag. Nested elements of
/// the same name are skipped and set-delimiter tags are honored.
pub fn element_end(name: &str, s: &str, from: usize, delims: &Delimiters) -> Result<usize, ParseErrorKind> {
    let unclosed = || ParseErrorKind::Unclosed {
        name: name.to_string(),
    };
    let mut delims = delims.clone();
    let mut depth = 1usize;
    let mut pos = from;
    while depth > 0 {
        let start = find_from(s, pos, &delims.open).ok_or_else(unclosed)?;
        let cut = cut_tag(s, start, &delims).map_err(|_| unclosed())?;
        match cut.sigil {
            Some(sigil) if sigil.opens_scope() && cut.key == name => depth += 1,
            Some(Sigil::Close) if cut.key == name => depth -= 1,
            Some(Sigil::SetDelimiters) => delims = split_set_delimiters(cut.key)?,
            _ => {}
        }
        pos = cut.end;
    }
    Ok(pos)
}

/// Like `str::find`, starting at byte offset `from`
pub fn find_from(s: &str, from: usize, pat: &str) -> Option<usize> {
    s.get(from..)?.find(pat).map(|i| from + i)
}

/// Offset just past the next `\n`, or the end of `s`
pub fn line_end(s: &str) -> usize {
    s.find('\n').map_or(s.len(), |i| i + 1)
}

/// Whether `s` holds nothing but whitespace
pub fn is_blank(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

/// Leading run of horizontal whitespace (space separators and tabs)
pub fn line_indentation(s: &str) -> &str {
    let end = s
        .find(|c: char| c != '\t' && !is_space_separator(c))
        .unwrap_or(s.len());
    &s[..end]
}

// Unicode general category Zs
fn is_space_separator(c: char) -> bool {
    matches!(
        c,
        '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}
