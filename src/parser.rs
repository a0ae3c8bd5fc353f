//! The LALR shift-reduce engine.
//!
//! A [`Parser`] owns one parse session: a character stream, a parse stack,
//! and the append-only reduction-tree arena. The grammar table is shared
//! read-only behind an [`Arc`]; any number of parser instances may replay
//! the same table concurrently.
//!
//! The main loop ([`Parser::parse`] / [`Parser::parse_until`]) pulls tokens
//! from the scanner through the session's [`TokenFilter`], looks up the
//! action for (current state, lookahead), and shifts, reduces, accepts, or
//! halts with a [`ParseError`] carrying the failing state, the offending
//! token, and the set of terminals that would have been valid. The loop is
//! re-entrant: `parse_until` returns at a chosen reduction point with the
//! stream, stack, and buffered lookahead intact, so successive fragments of
//! one input can be parsed without re-creating the engine.
//!
//! # Reduction tree
//!
//! The parse tree is one flat `Vec<StackElement>` addressed by
//! `(child_start, child_count)` ranges. Elements migrate from the stack
//! into the arena when the rule covering them reduces, so a parent's child
//! range always lies strictly before the parent's own arena position;
//! there are no node allocations and no cyclic references by construction.

use crate::error::{EngineError, InputError, ParseError};
use crate::filter::{DefaultFilter, TokenFilter};
use crate::scanner::scan;
use crate::stream::CharStream;
use crate::table::{ActionKind, GrammarTable, SymbolType};
use crate::token::Token;
use crate::tree::ParseNode;
use smartstring::alias::String;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

/// A parse-stack entry, doubling as a reduction-tree node once it migrates
/// into the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackElement {
    /// Symbol index of this entry.
    pub symbol: u16,
    /// Kind of `symbol`, resolved when the entry was created.
    pub kind: SymbolType,
    /// The shifted token, or a synthesized position-only token for reduced
    /// entries.
    pub token: Token,
    /// LALR state this entry was pushed with.
    pub state: u16,
    /// The rule that produced this entry, for reduced entries.
    pub rule: Option<u16>,
    /// Start of this entry's children in the arena.
    pub child_start: usize,
    /// Number of children in the arena.
    pub child_count: usize,
}

/// How a (re-entrant) run of the main loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The start symbol was accepted; `root` indexes the arena entry
    /// holding the completed reduction tree.
    Accepted { root: usize },
    /// A reduction of the requested nonterminal completed; the session is
    /// left open for re-entry. Inspect the fragment through
    /// [`Parser::fragment_root`].
    Reduced { nonterminal: u16 },
}

/// One parse session over a shared grammar table.
pub struct Parser<F: TokenFilter = DefaultFilter> {
    table: Arc<GrammarTable>,
    filter: F,
    stream: Option<CharStream>,
    state: u16,
    stack: Vec<StackElement>,
    arena: Vec<StackElement>,
    lookahead: Option<Token>,
    root: Option<usize>,
}

impl Parser<DefaultFilter> {
    /// Creates a session with the default filter policy (whitespace and
    /// comments are dropped before the action table).
    pub fn new(table: Arc<GrammarTable>) -> Self {
        Self::with_filter(table, DefaultFilter)
    }
}

impl<F: TokenFilter> Parser<F> {
    /// Creates a session with an explicit filter policy.
    pub fn with_filter(table: Arc<GrammarTable>, filter: F) -> Self {
        let state = table.init_lalr();
        Self {
            table,
            filter,
            stream: None,
            state,
            stack: Vec::new(),
            arena: Vec::new(),
            lookahead: None,
            root: None,
        }
    }

    /// Binds a file source and fully resets the session.
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<(), InputError> {
        self.stream = Some(CharStream::open(path)?);
        self.reset_session();
        Ok(())
    }

    /// Binds an in-memory source and fully resets the session.
    pub fn open_bytes(&mut self, bytes: &[u8]) {
        self.stream = Some(CharStream::from_bytes(bytes));
        self.reset_session();
    }

    /// Releases the input source; parse state is kept for inspection.
    pub fn close(&mut self) {
        self.stream = None;
    }

    /// Clears all parse state, including any buffered lookahead. The
    /// stream, if open, keeps its position.
    pub fn reset(&mut self) {
        self.reset_session();
    }

    /// Clears the stack and arena for the next fragment while keeping the
    /// stream and the buffered lookahead, so parsing can resume where a
    /// previous [`ParseOutcome::Reduced`] left off.
    pub fn reinit(&mut self) {
        self.stack.clear();
        self.arena.clear();
        self.root = None;
        self.state = self.table.init_lalr();
    }

    fn reset_session(&mut self) {
        self.reinit();
        self.lookahead = None;
    }

    /// Runs the main loop until the start symbol is accepted.
    pub fn parse(&mut self) -> Result<ParseOutcome, EngineError> {
        self.run(None)
    }

    /// Runs the main loop until acceptance or until a reduction of the
    /// nonterminal `stop`, whichever comes first. On [`ParseOutcome::Reduced`]
    /// the stream, stack, and lookahead stay intact for re-entry.
    pub fn parse_until(&mut self, stop: Option<u16>) -> Result<ParseOutcome, EngineError> {
        self.run(stop)
    }

    fn run(&mut self, stop: Option<u16>) -> Result<ParseOutcome, EngineError> {
        if self.stream.is_none() {
            return Err(InputError::NoSource.into());
        }
        loop {
            let token = match self.lookahead.take() {
                Some(t) => t,
                None => self.next_admitted()?,
            };
            let action = self.table.action(self.state, token.id).copied();
            match action {
                Some(a) if a.kind == ActionKind::Shift => {
                    log::trace!("shift {:?} -> state {}", token.lexeme, a.target);
                    self.stack.push(StackElement {
                        symbol: token.id,
                        kind: token.kind,
                        state: a.target,
                        rule: None,
                        child_start: 0,
                        child_count: 0,
                        token,
                    });
                    self.state = a.target;
                }
                Some(a) if a.kind == ActionKind::Reduce => {
                    // The lookahead is not consumed by a reduce.
                    self.lookahead = Some(token);
                    let lhs = self.reduce(a.target)?;
                    if stop == Some(lhs) {
                        return Ok(ParseOutcome::Reduced { nonterminal: lhs });
                    }
                }
                Some(a) if a.kind == ActionKind::Accept => {
                    self.lookahead = Some(token);
                    let Some(root) = self.stack.pop() else {
                        return Err(ParseError::EmptyAccept.into());
                    };
                    self.arena.push(root);
                    let root = self.arena.len() - 1;
                    self.root = Some(root);
                    log::trace!("accept: reduction tree root at arena[{root}]");
                    return Ok(ParseOutcome::Accepted { root });
                }
                // No action, or a goto keyed on a terminal: a syntax
                // error. The stack and arena are untouched and the
                // offending token stays buffered.
                _ => {
                    let err = self.syntax_error(&token);
                    self.lookahead = Some(token);
                    return Err(err.into());
                }
            }
        }
    }

    /// Scans tokens until the filter admits one. Comment tokens are
    /// assembled into whole comments before the filter sees them.
    fn next_admitted(&mut self) -> Result<Token, EngineError> {
        loop {
            let Some(stream) = self.stream.as_mut() else {
                return Err(InputError::NoSource.into());
            };
            let mut token = scan(&self.table, stream)?;
            match token.kind {
                SymbolType::CommentLine => extend_line_comment(stream, &mut token)?,
                SymbolType::CommentStart => {
                    extend_block_comment(&self.table, stream, &mut token)?
                }
                _ => {}
            }
            if self.filter.admit(&mut token) {
                return Ok(token);
            }
            log::trace!("filtered: {:?} {:?}", token.kind, token.lexeme);
        }
    }

    /// Pops the rule body off the stack into the arena and pushes the
    /// left-hand nonterminal with the goto the exposed state dictates.
    fn reduce(&mut self, rule_idx: u16) -> Result<u16, ParseError> {
        let (lhs, arity) = self.table.rule_parts(rule_idx);
        if self.stack.len() < arity {
            return Err(ParseError::StackUnderflow { rule: rule_idx });
        }
        if log::log_enabled!(log::Level::Trace) {
            log::trace!("reduce {}", self.table.format_rule(rule_idx));
        }

        let child_start = self.arena.len();
        let children = self.stack.split_off(self.stack.len() - arity);
        // The reduced entry reports the position of its leftmost child;
        // an empty production sits at the lookahead's position.
        let (line, column) = children
            .first()
            .map(|e| (e.token.line, e.token.column))
            .or_else(|| self.lookahead.as_ref().map(|t| (t.line, t.column)))
            .unwrap_or((0, 0));
        self.arena.extend(children);

        let exposed = self
            .stack
            .last()
            .map(|e| e.state)
            .unwrap_or_else(|| self.table.init_lalr());
        let target = match self.table.action(exposed, lhs) {
            Some(a) if a.kind == ActionKind::Goto => a.target,
            _ => {
                return Err(ParseError::MissingGoto {
                    state: exposed,
                    nonterminal: lhs,
                })
            }
        };

        self.stack.push(StackElement {
            symbol: lhs,
            kind: self.table.symbol_kind(lhs),
            token: Token::new(lhs, self.table.symbol_kind(lhs), String::new(), line, column),
            state: target,
            rule: Some(rule_idx),
            child_start,
            child_count: arity,
        });
        self.state = target;
        Ok(lhs)
    }

    fn syntax_error(&self, token: &Token) -> ParseError {
        if log::log_enabled!(log::Level::Debug) {
            log::debug!("parse stack:\n{}", self.dump_stack());
            log::debug!("reduction tree:\n{}", self.dump_tree());
        }
        ParseError::Unexpected {
            state: self.state,
            symbol: token.id,
            name: self.table.symbol_name(token.id).to_owned(),
            lexeme: token.lexeme.to_string(),
            line: token.line,
            column: token.column,
            expected: self.table.expected_terminals(self.state),
        }
    }

    /// View over the completed parse's root; empty if no parse has been
    /// accepted in this session.
    pub fn root(&self) -> ParseNode<'_> {
        match self.root {
            Some(idx) => ParseNode::at(&self.table, &self.arena, idx),
            None => ParseNode::empty(&self.table, &self.arena),
        }
    }

    /// View over the most recent reduction (the top of the parse stack);
    /// the natural entry point after [`ParseOutcome::Reduced`].
    pub fn fragment_root(&self) -> ParseNode<'_> {
        match self.stack.last() {
            Some(e) => ParseNode::over(&self.table, &self.arena, e),
            None => ParseNode::empty(&self.table, &self.arena),
        }
    }

    /// View over an arbitrary arena entry; empty for an out-of-range
    /// index.
    pub fn node(&self, index: usize) -> ParseNode<'_> {
        if index < self.arena.len() {
            ParseNode::at(&self.table, &self.arena, index)
        } else {
            ParseNode::empty(&self.table, &self.arena)
        }
    }

    /// Raw arena entry access.
    pub fn get_entry(&self, index: usize) -> Option<&StackElement> {
        self.arena.get(index)
    }

    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Lexeme of the buffered lookahead, if any.
    pub fn lexeme(&self) -> &str {
        self.lookahead
            .as_ref()
            .map(|t| t.lexeme.as_str())
            .unwrap_or("")
    }

    /// Terminal names with a valid action in the current state.
    pub fn expected_terminals(&self) -> Vec<std::string::String> {
        self.table.expected_terminals(self.state)
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut F {
        &mut self.filter
    }

    /// Renders the parse stack, bottom to top, one entry per line.
    pub fn dump_stack(&self) -> std::string::String {
        let mut out = std::string::String::new();
        for (i, e) in self.stack.iter().enumerate() {
            let _ = writeln!(
                out,
                "[{i}] state {} {} {:?}",
                e.state,
                self.table.symbol_name(e.symbol),
                e.token.lexeme
            );
        }
        let _ = writeln!(out, "    state {} (current)", self.state);
        out
    }

    /// Renders the reduction tree: the accepted root if the parse is
    /// complete, otherwise every pending subtree on the stack.
    pub fn dump_tree(&self) -> std::string::String {
        let mut out = std::string::String::new();
        match self.root {
            Some(root) => self.write_entry(&mut out, &self.arena[root], 0),
            None => {
                for e in &self.stack {
                    self.write_entry(&mut out, e, 0);
                }
            }
        }
        out
    }

    fn write_entry(&self, out: &mut std::string::String, e: &StackElement, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = match e.rule {
            Some(rule) => writeln!(
                out,
                "{indent}<{}> ({})",
                self.table.symbol_name(e.symbol),
                self.table.format_rule(rule)
            ),
            None => writeln!(
                out,
                "{indent}{} {:?} ({}:{})",
                self.table.symbol_name(e.symbol),
                e.token.lexeme,
                e.token.line,
                e.token.column
            ),
        };
        for child in &self.arena[e.child_start..e.child_start + e.child_count] {
            self.write_entry(out, child, depth + 1);
        }
    }
}

fn extend_line_comment(
    stream: &mut CharStream,
    token: &mut Token,
) -> Result<(), InputError> {
    while let Some(b) = stream.peek()? {
        if b == b'\n' {
            break;
        }
        stream.advance()?;
        token.push_byte(b);
    }
    Ok(())
}

/// Swallows everything up to and including the closing comment marker (or
/// end of input) into the opening token's lexeme. Interior bytes that match
/// no lexeme arrive as single-byte error tokens and are absorbed like any
/// other.
fn extend_block_comment(
    table: &GrammarTable,
    stream: &mut CharStream,
    token: &mut Token,
) -> Result<(), InputError> {
    loop {
        let inner = scan(table, stream)?;
        match inner.kind {
            SymbolType::CommentEnd => {
                token.lexeme.push_str(&inner.lexeme);
                return Ok(());
            }
            SymbolType::EndOfInput => return Ok(()),
            _ => token.lexeme.push_str(&inner.lexeme),
        }
    }
}
