//! Error types for template parsing and compilation

use std::io;

use thiserror::Error;

/// What went wrong while reading template source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A tag is missing its close delimiter on the same line
    #[error("unclosed tag")]
    UnclosedTag,

    /// A comment runs to the end of the input
    #[error("unclosed comment")]
    UnclosedComment,

    /// A set-delimiter tag without the trailing `=`
    #[error("{tag} does not end with ={close}")]
    MissingDelimiterEquals {
        /// The offending tag as written
        tag: String,
        /// Close delimiter in effect
        close: String,
    },

    /// A set-delimiter tag with nothing in it
    #[error("set delimiter tag empty")]
    EmptyDelimiters,

    /// A set-delimiter tag with only one delimiter
    #[error("set delimiter tag missing an end delimiter")]
    MissingEndDelimiter,

    /// A set-delimiter tag with three or more delimiters
    #[error("set delimiter tag has more than two delimiters")]
    TooManyDelimiters,

    /// A tag that requires a name has none
    #[error("empty tag")]
    EmptyTag,

    /// A tag name contains whitespace
    #[error("extra words in {word} tag")]
    ExtraWords {
        /// First word of the tag
        word: String,
    },

    /// A close tag with no open scope
    #[error("{tag} without opening")]
    CloseWithoutOpen {
        /// The close tag as written with the active delimiters
        tag: String,
    },

    /// A close tag whose name differs from the innermost open scope
    #[error("mismatched {tag} (last opened {expected} on line {opened_on})")]
    MismatchedClose {
        /// The close tag as written with the active delimiters
        tag: String,
        /// Name of the innermost open scope
        expected: String,
        /// Line that opened the innermost scope
        opened_on: usize,
    },

    /// A scope that is never closed
    #[error("unclosed {name}")]
    Unclosed {
        /// Name of the scope
        name: String,
    },
}

impl ParseErrorKind {
    /// Attach the 1-based source line the error was found on
    pub fn at(self, line: usize) -> ParseError {
        ParseError { line, kind: self }
    }
}

/// A parse failure with its source line
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}: {kind}")]
pub struct ParseError {
    /// 1-based line number
    pub line: usize,
    /// Failure detail
    pub kind: ParseErrorKind,
}

impl ParseError {
    /// Line the error was reported on
    pub fn line(&self) -> usize {
        self.line
    }

    /// Failure detail
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

/// Errors that abort a compilation
#[derive(Debug, Error)]
pub enum CompileError {
    /// The top-level template failed to parse
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The partial loader failed for a reason other than a missing partial
    #[error("loading partial {name}: {source}")]
    Load {
        /// Partial name
        name: String,
        /// Underlying loader failure
        #[source]
        source: io::Error,
    },

    /// A partial's source failed to parse
    #[error("partial {name}: {source}")]
    Partial {
        /// Partial name
        name: String,
        /// Parse failure inside the partial
        #[source]
        source: ParseError,
    },

    /// A partial reference that the resolver never registered
    #[error("internal error: unresolved partial {name}")]
    UnresolvedPartial {
        /// Partial name
        name: String,
    },

    /// The unit name cannot be turned into an identifier
    #[error("invalid unit name {0:?}")]
    InvalidUnitName(String),

    /// Unknown code generation target
    #[error("unknown target language {0:?} (expected go or js)")]
    UnsupportedTarget(String),
}

/// Result alias for compilation
pub type CompileResult<T> = Result<T, CompileError>;
