//! Read-only cursors over the reduction-tree arena.
//!
//! A [`ParseNode`] is a copy-cheap view of one arena entry: two borrows
//! and no allocation. All tree walking goes through the stored
//! `(child_start, child_count)` ranges; the arena itself is never touched.
//!
//! Construction collapses chains: a node produced by a rule with exactly
//! one child is transparently replaced by that child, recursively, so
//! callers never see degenerate single-symbol layers. Out-of-range child
//! access yields an *empty* cursor whose query methods all return
//! zero/empty values, which keeps tree-walking code branch-free.

use crate::parser::StackElement;
use crate::table::{GrammarTable, SymbolType};

/// A cursor over one reduction-tree node (or nothing).
#[derive(Clone, Copy)]
pub struct ParseNode<'a> {
    table: &'a GrammarTable,
    arena: &'a [StackElement],
    se: Option<&'a StackElement>,
}

impl<'a> ParseNode<'a> {
    /// Cursor over `arena[index]`, chain-collapsed.
    pub(crate) fn at(
        table: &'a GrammarTable,
        arena: &'a [StackElement],
        index: usize,
    ) -> Self {
        Self::over(table, arena, &arena[index])
    }

    /// Cursor over an element that may not itself live in the arena yet
    /// (a pending stack entry), chain-collapsed.
    pub(crate) fn over(
        table: &'a GrammarTable,
        arena: &'a [StackElement],
        mut se: &'a StackElement,
    ) -> Self {
        while se.child_count == 1 {
            se = &arena[se.child_start];
        }
        Self {
            table,
            arena,
            se: Some(se),
        }
    }

    /// The empty cursor.
    pub(crate) fn empty(table: &'a GrammarTable, arena: &'a [StackElement]) -> Self {
        Self {
            table,
            arena,
            se: None,
        }
    }

    /// True for the null-equivalent cursor.
    pub fn is_empty(&self) -> bool {
        self.se.is_none()
    }

    /// Lexeme of this node's token; `""` for reduced or empty nodes.
    pub fn text(&self) -> &'a str {
        self.se.map(|se| se.token.lexeme.as_str()).unwrap_or("")
    }

    /// Grammar name of this node's symbol; `""` when empty.
    pub fn name(&self) -> &'a str {
        self.se
            .map(|se| self.table.symbol_name(se.symbol))
            .unwrap_or("")
    }

    /// Symbol index; `0` when empty.
    pub fn symbol(&self) -> u16 {
        self.se.map(|se| se.symbol).unwrap_or(0)
    }

    /// Symbol kind; the empty cursor reports [`SymbolType::Error`].
    pub fn symbol_type(&self) -> SymbolType {
        self.se.map(|se| se.kind).unwrap_or(SymbolType::Error)
    }

    /// 1-based source line; `0` when empty.
    pub fn line(&self) -> usize {
        self.se.map(|se| se.token.line).unwrap_or(0)
    }

    /// 1-based source column; `0` when empty.
    pub fn column(&self) -> usize {
        self.se.map(|se| se.token.column).unwrap_or(0)
    }

    /// Number of children (never 1: chains are collapsed away).
    pub fn child_count(&self) -> usize {
        self.se.map(|se| se.child_count).unwrap_or(0)
    }

    /// Cursor positioned at child `index`, or the empty cursor when
    /// `index` is out of range or this node is childless.
    pub fn child(&self, index: usize) -> ParseNode<'a> {
        match self.se {
            Some(se) if index < se.child_count => {
                ParseNode::at(self.table, self.arena, se.child_start + index)
            }
            _ => ParseNode::empty(self.table, self.arena),
        }
    }

    pub fn is_terminal(&self, symbol: u16) -> bool {
        !self.is_empty()
            && self.symbol_type() == SymbolType::Terminal
            && self.symbol() == symbol
    }

    pub fn is_nonterminal(&self, symbol: u16) -> bool {
        !self.is_empty()
            && self.symbol_type() == SymbolType::Nonterminal
            && self.symbol() == symbol
    }
}

impl std::fmt::Debug for ParseNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseNode")
            .field("symbol", &self.symbol())
            .field("name", &self.name())
            .field("kind", &self.symbol_type())
            .field("text", &self.text())
            .field("children", &self.child_count())
            .finish()
    }
}

/// Renders the concatenated terminal text under this node.
impl std::fmt::Display for ParseNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.child_count() == 0 {
            f.write_str(self.text())
        } else {
            for i in 0..self.child_count() {
                self.child(i).fmt(f)?;
            }
            Ok(())
        }
    }
}
