//! Table-driven lexing and LALR parsing runtime.
//!
//! This crate replays grammar tables produced by an external compiler: a
//! character-set DFA drives the tokenizer and an LALR action table drives a
//! shift-reduce parser. The runtime itself knows nothing about any
//! particular language; everything language-specific lives in the table.
//!
//! A session is three pieces:
//!
//! - [`GrammarTable`] — the compiled grammar, loaded once, validated in
//!   full, and shared read-only (wrap it in an `Arc` to reuse it across
//!   parsers and threads);
//! - [`Parser`] — one parse in progress: the character stream, the parse
//!   stack, and the flat reduction-tree arena;
//! - a [`TokenFilter`] — the policy deciding which scanned tokens reach the
//!   action table ([`DefaultFilter`] drops whitespace and comments,
//!   [`CommentStoreFilter`] additionally archives the comments).
//!
//! After a successful parse, [`Parser::root`] yields a [`ParseNode`] cursor
//! over the reduction tree; cursors transparently collapse single-child
//! rule chains so callers only ever see meaningful nodes.
//!
//! ```no_run
//! use goldrt::{GrammarTable, Parser};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), goldrt::EngineError> {
//! let table = Arc::new(GrammarTable::from_path("lang.gtb")?);
//! let mut parser = Parser::new(table);
//! parser.open("input.txt")?;
//! parser.parse()?;
//! println!("{}", parser.root().name());
//! # Ok(())
//! # }
//! ```

mod error;
mod filter;
mod parser;
mod scanner;
mod stream;
mod table;
#[cfg(test)]
mod test_grammar_data;
mod token;
mod tree;

pub use crate::error::{EngineError, InputError, LoadError, ParseError};
pub use crate::filter::{CommentStoreFilter, DefaultFilter, StoredComment, TokenFilter};
pub use crate::parser::{ParseOutcome, Parser, StackElement};
pub use crate::scanner::scan;
pub use crate::stream::CharStream;
pub use crate::table::{
    ActionKind, CharSet, DfaEdge, DfaState, GrammarTable, LalrAction, LalrState, Rule,
    Symbol, SymbolType,
};
pub use crate::token::Token;
pub use crate::tree::ParseNode;
