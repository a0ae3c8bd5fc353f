//! Error types for the table runtime.
//!
//! Each stage of the engine reports failure through its own enum:
//!
//! - [`LoadError`] — a compiled grammar table could not be deserialized,
//! - [`InputError`] — the character source could not be opened or read,
//! - [`ParseError`] — the LALR loop found no action for the current
//!   state/lookahead pair, or an internal stack invariant was violated.
//!
//! [`EngineError`] aggregates all of them with `#[from]` conversions so
//! callers driving a whole session can propagate with `?` against a single
//! error surface.

use std::path::PathBuf;
use thiserror::Error;

/// A compiled grammar table was missing, truncated, or malformed.
///
/// A failed load leaves no usable table behind; the error pinpoints the
/// first offending record.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The table does not start with the `GTB1` magic bytes.
    #[error("not a grammar table (bad magic)")]
    BadMagic,

    /// The table ended in the middle of a record.
    #[error("grammar table truncated at byte {offset}")]
    Truncated { offset: usize },

    /// Unused bytes followed the last section.
    #[error("{count} unexpected trailing bytes after grammar table")]
    TrailingBytes { count: usize },

    /// A symbol record carried an unknown type code.
    #[error("unknown symbol type code {code}")]
    BadSymbolType { code: u8 },

    /// An LALR action record carried an unknown action kind code.
    #[error("unknown action kind code {code}")]
    BadActionKind { code: u8 },

    /// A symbol name was not valid UTF-8.
    #[error("symbol {index} has a non-UTF-8 name")]
    BadSymbolName { index: usize },

    /// A cross-reference pointed outside its table.
    #[error("{what} index {index} out of range (len {len})")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// The symbol table lacks a reserved symbol the engine depends on.
    #[error("grammar table defines no {what} symbol")]
    MissingSymbol { what: &'static str },

    /// The table file could not be read.
    #[error("cannot read grammar table: {0}")]
    Io(#[from] std::io::Error),
}

/// The character source backing a parse session failed.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input file could not be opened; the session is unusable.
    #[error("cannot open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading ahead from the source failed mid-scan.
    #[error("input read error: {0}")]
    Read(#[from] std::io::Error),

    /// A parse was requested before any source was bound to the session.
    #[error("no input source is open")]
    NoSource,
}

/// The LALR loop halted.
///
/// [`ParseError::Unexpected`] is the ordinary syntax-error case and carries
/// everything a caller needs for a diagnostic: the failing state, the
/// offending token, and the sorted set of terminals that would have been
/// valid there. The remaining variants indicate a grammar table that is
/// internally inconsistent despite passing load validation.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No action exists for the (state, lookahead) pair.
    #[error(
        "unexpected {name} {lexeme:?} at line {line}, column {column} \
         in state {state}; expected one of {expected:?}"
    )]
    Unexpected {
        state: u16,
        symbol: u16,
        name: String,
        lexeme: String,
        line: usize,
        column: usize,
        expected: Vec<String>,
    },

    /// A reduction exposed a state with no goto for the rule's nonterminal.
    #[error("no goto for nonterminal {nonterminal} in state {state}")]
    MissingGoto { state: u16, nonterminal: u16 },

    /// A reduction asked for more elements than the stack holds.
    #[error("parse stack underflow while reducing rule {rule}")]
    StackUnderflow { rule: u16 },

    /// An accept action fired with nothing on the stack.
    #[error("accept with no parse result on the stack")]
    EmptyAccept,
}

/// Single error surface for callers that drive load, open, and parse
/// through one `Result` chain.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Grammar table deserialization failed.
    #[error("load error: {0}")]
    Load(#[from] LoadError),

    /// The character source failed.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// The parse halted on a syntax error or table inconsistency.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_error_trait_obj(e: &dyn std::error::Error) -> &dyn std::error::Error {
        e
    }

    #[test]
    fn load_error_maps_to_engine_error() {
        let err: EngineError = LoadError::BadMagic.into();
        assert!(matches!(err, EngineError::Load(_)));
        assert!(err.to_string().contains("bad magic"));
        let _ = _assert_error_trait_obj(&err);
    }

    #[test]
    fn input_error_maps_to_engine_error() {
        let err: EngineError = InputError::NoSource.into();
        assert!(matches!(err, EngineError::Input(_)));
        assert!(err.to_string().contains("no input source"));
    }

    #[test]
    fn parse_error_display_lists_expectations() {
        let err = ParseError::Unexpected {
            state: 7,
            symbol: 1,
            name: "Error".into(),
            lexeme: "@".into(),
            line: 3,
            column: 14,
            expected: vec!["+".into(), "EOF".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3, column 14"));
        assert!(msg.contains("state 7"));
        assert!(msg.contains("\"@\""));
        assert!(msg.contains("+"));
    }

    // Compile-time trait bounds sanity check.
    fn _assert_send_sync_static<T: Send + Sync + 'static>() {}
    #[test]
    fn engine_error_is_send_sync_static() {
        _assert_send_sync_static::<EngineError>();
    }
}
