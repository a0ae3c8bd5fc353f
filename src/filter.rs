//! Lexical filtering between the scanner and the action table.
//!
//! Every scanned token passes through exactly one [`TokenFilter`] before it
//! can reach the LALR table. The filter may reclassify the token in place
//! and decides whether it is admitted at all; whitespace and comments are
//! normally consumed here. Policies compose at the parser boundary instead
//! of specializing the whole engine: swap the filter, keep the loop.
//!
//! Comment tokens arrive whole — the parser extends a line comment to the
//! end of its source line and swallows a block comment up to its closing
//! marker before the filter sees it.

use crate::table::SymbolType;
use crate::token::Token;
use smartstring::alias::String;

/// The single lexical-filtering extension point.
pub trait TokenFilter {
    /// Returns `true` when `token` should reach the action table.
    ///
    /// The token is mutable so a policy may also reclassify it (change its
    /// symbol, normalize its lexeme) before the table lookup.
    fn admit(&mut self, token: &mut Token) -> bool;
}

fn structural(kind: SymbolType) -> bool {
    matches!(
        kind,
        SymbolType::Nonterminal
            | SymbolType::Terminal
            | SymbolType::EndOfInput
            | SymbolType::Error
    )
}

/// Default policy: drop whitespace and all comment tokens silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFilter;

impl TokenFilter for DefaultFilter {
    fn admit(&mut self, token: &mut Token) -> bool {
        structural(token.kind)
    }
}

/// A comment skipped by [`CommentStoreFilter`], with the line of its first
/// byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredComment {
    pub line: usize,
    pub text: String,
    /// True for block comments, which may span lines.
    pub multi: bool,
}

/// Comment-preserving policy: admits the same tokens as [`DefaultFilter`]
/// but archives every skipped comment for tooling that must recover them.
#[derive(Debug, Clone, Default)]
pub struct CommentStoreFilter {
    comments: Vec<StoredComment>,
}

impl CommentStoreFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Comments skipped so far, in source order.
    pub fn comments(&self) -> &[StoredComment] {
        &self.comments
    }

    /// Drains the archive, leaving it empty for the next session.
    pub fn take_comments(&mut self) -> Vec<StoredComment> {
        std::mem::take(&mut self.comments)
    }
}

impl TokenFilter for CommentStoreFilter {
    fn admit(&mut self, token: &mut Token) -> bool {
        match token.kind {
            SymbolType::CommentLine | SymbolType::CommentStart => {
                self.comments.push(StoredComment {
                    line: token.line,
                    text: token.lexeme.clone(),
                    multi: token.kind == SymbolType::CommentStart,
                });
                false
            }
            // A stray comment terminator is dropped like any other
            // comment token.
            SymbolType::CommentEnd => false,
            kind => structural(kind),
        }
    }
}
