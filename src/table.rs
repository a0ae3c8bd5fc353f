//! Compiled grammar tables.
//!
//! A [`GrammarTable`] is the deserialized output of the external grammar
//! compiler: character sets, the tokenizer DFA, the symbol and rule tables,
//! and the LALR action table, plus the four scalars that seed a parse
//! (initial DFA state, initial LALR state, start symbol, case sensitivity).
//!
//! Tables are loaded once via [`GrammarTable::from_path`] or
//! [`GrammarTable::from_bytes`], validated in full, and never mutated
//! afterwards. A loaded table is `Send + Sync`; share it behind an
//! [`Arc`](std::sync::Arc) across as many parser sessions as needed.
//!
//! # Binary layout (`GTB1`, little-endian)
//!
//! ```text
//! magic          b"GTB1"
//! init_dfa       u16
//! init_lalr      u16
//! start_symbol   u16
//! case_sensitive u8 (0|1)
//! charsets       u16 count, per set:   u16 len, raw member bytes
//! symbols        u16 count, per sym:   u8 type, u16 name-len, UTF-8 name
//! rules          u16 count, per rule:  u16 lhs, u16 body-len, u16 body...
//! dfa states     u16 count, per state: u8 accept, u16 accept-symbol,
//!                                      u16 edge-count, (u16 charset,
//!                                      u16 target)...
//! lalr states    u16 count, per state: u16 action-count, (u16 symbol,
//!                                      u8 kind, u16 target)...
//! ```

use crate::error::LoadError;
use smartstring::alias::String;
use std::path::Path;

const MAGIC: &[u8; 4] = b"GTB1";

/// Lexical/grammatical category of a [`Symbol`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SymbolType {
    Nonterminal = 0,
    Terminal = 1,
    Whitespace = 2,
    EndOfInput = 3,
    CommentStart = 4,
    CommentEnd = 5,
    CommentLine = 6,
    Error = 7,
}

impl SymbolType {
    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Nonterminal,
            1 => Self::Terminal,
            2 => Self::Whitespace,
            3 => Self::EndOfInput,
            4 => Self::CommentStart,
            5 => Self::CommentEnd,
            6 => Self::CommentLine,
            7 => Self::Error,
            _ => return None,
        })
    }
}

/// One entry of the grammar's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Position in the symbol table; everything else refers to symbols by
    /// this index.
    pub index: u16,
    pub kind: SymbolType,
    pub name: String,
}

/// A production: `lhs ::= body...` with every element a symbol index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub lhs: u16,
    pub body: Vec<u16>,
}

/// Byte-set membership table, 256 bits.
#[derive(Debug, Clone, Default)]
pub struct CharSet {
    bits: [u64; 4],
}

impl CharSet {
    fn insert(&mut self, b: u8) {
        self.bits[(b >> 6) as usize] |= 1u64 << (b & 63);
    }

    /// Tests membership of a single byte.
    pub fn contains(&self, b: u8) -> bool {
        self.bits[(b >> 6) as usize] & (1u64 << (b & 63)) != 0
    }
}

/// One outgoing transition of a DFA state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfaEdge {
    pub charset: u16,
    pub target: u16,
}

/// A tokenizer DFA state: optional accept symbol plus ordered edges.
#[derive(Debug, Clone)]
pub struct DfaState {
    pub accept: Option<u16>,
    pub edges: Vec<DfaEdge>,
}

/// What the parser does when an action matches the lookahead.
///
/// `Error` is represented by the absence of an action for a symbol, not by
/// a kind code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ActionKind {
    Shift = 1,
    Reduce = 2,
    Goto = 3,
    Accept = 4,
}

impl ActionKind {
    fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::Shift,
            2 => Self::Reduce,
            3 => Self::Goto,
            4 => Self::Accept,
            _ => return None,
        })
    }
}

/// One (symbol, action, target) entry of an LALR state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LalrAction {
    pub symbol: u16,
    pub kind: ActionKind,
    pub target: u16,
}

/// An LALR state: ordered action list, searched by lookahead symbol.
#[derive(Debug, Clone)]
pub struct LalrState {
    pub actions: Vec<LalrAction>,
}

impl LalrState {
    fn find(&self, symbol: u16) -> Option<&LalrAction> {
        self.actions.iter().find(|a| a.symbol == symbol)
    }
}

/// An immutable, fully validated compiled grammar.
#[derive(Debug, Clone)]
pub struct GrammarTable {
    init_dfa: u16,
    init_lalr: u16,
    start_symbol: u16,
    case_sensitive: bool,
    charsets: Vec<CharSet>,
    symbols: Vec<Symbol>,
    rules: Vec<Rule>,
    dfa_states: Vec<DfaState>,
    lalr_states: Vec<LalrState>,
    eof_symbol: u16,
    error_symbol: u16,
}

/// Little-endian record reader over the raw table bytes.
struct TableReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> TableReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], LoadError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(LoadError::Truncated { offset: self.pos })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, LoadError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, LoadError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}

impl GrammarTable {
    /// Reads and validates a compiled grammar table from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Deserializes and validates a compiled grammar table.
    ///
    /// Any truncation, unknown code, or out-of-range cross-reference fails
    /// the whole load; no partially populated table is ever returned.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, LoadError> {
        let mut r = TableReader::new(bytes);
        if r.take(4)? != MAGIC {
            return Err(LoadError::BadMagic);
        }

        let init_dfa = r.u16()?;
        let init_lalr = r.u16()?;
        let start_symbol = r.u16()?;
        let case_sensitive = r.u8()? != 0;

        let charset_count = r.u16()? as usize;
        let mut charsets = Vec::with_capacity(charset_count);
        for _ in 0..charset_count {
            let len = r.u16()? as usize;
            let mut set = CharSet::default();
            for &b in r.take(len)? {
                set.insert(b);
            }
            charsets.push(set);
        }

        let symbol_count = r.u16()? as usize;
        let mut symbols = Vec::with_capacity(symbol_count);
        for index in 0..symbol_count {
            let code = r.u8()?;
            let kind =
                SymbolType::from_code(code).ok_or(LoadError::BadSymbolType { code })?;
            let name_len = r.u16()? as usize;
            let name = std::str::from_utf8(r.take(name_len)?)
                .map_err(|_| LoadError::BadSymbolName { index })?;
            let index = index as u16;
            symbols.push(Symbol {
                index,
                kind,
                name: name.into(),
            });
        }

        let rule_count = r.u16()? as usize;
        let mut rules = Vec::with_capacity(rule_count);
        for _ in 0..rule_count {
            let lhs = r.u16()?;
            let body_len = r.u16()? as usize;
            let mut body = Vec::with_capacity(body_len);
            for _ in 0..body_len {
                body.push(r.u16()?);
            }
            rules.push(Rule { lhs, body });
        }

        let dfa_count = r.u16()? as usize;
        let mut dfa_states = Vec::with_capacity(dfa_count);
        for _ in 0..dfa_count {
            let accept = r.u8()? != 0;
            let accept_symbol = r.u16()?;
            let edge_count = r.u16()? as usize;
            let mut edges = Vec::with_capacity(edge_count);
            for _ in 0..edge_count {
                edges.push(DfaEdge {
                    charset: r.u16()?,
                    target: r.u16()?,
                });
            }
            dfa_states.push(DfaState {
                accept: accept.then_some(accept_symbol),
                edges,
            });
        }

        let lalr_count = r.u16()? as usize;
        let mut lalr_states = Vec::with_capacity(lalr_count);
        for _ in 0..lalr_count {
            let action_count = r.u16()? as usize;
            let mut actions = Vec::with_capacity(action_count);
            for _ in 0..action_count {
                let symbol = r.u16()?;
                let code = r.u8()?;
                let kind =
                    ActionKind::from_code(code).ok_or(LoadError::BadActionKind { code })?;
                actions.push(LalrAction {
                    symbol,
                    kind,
                    target: r.u16()?,
                });
            }
            lalr_states.push(LalrState { actions });
        }

        if r.remaining() != 0 {
            return Err(LoadError::TrailingBytes {
                count: r.remaining(),
            });
        }

        let table = Self {
            init_dfa,
            init_lalr,
            start_symbol,
            case_sensitive,
            charsets,
            symbols,
            rules,
            dfa_states,
            lalr_states,
            eof_symbol: 0,
            error_symbol: 0,
        };
        table.validated()
    }

    /// Cross-checks every index in the table and resolves the reserved
    /// end-of-input and error symbols.
    fn validated(mut self) -> Result<Self, LoadError> {
        fn check(what: &'static str, index: usize, len: usize) -> Result<(), LoadError> {
            if index < len {
                Ok(())
            } else {
                Err(LoadError::IndexOutOfRange { what, index, len })
            }
        }

        let n_sym = self.symbols.len();
        let n_cs = self.charsets.len();
        let n_dfa = self.dfa_states.len();
        let n_lalr = self.lalr_states.len();
        let n_rule = self.rules.len();

        check("initial DFA state", self.init_dfa as usize, n_dfa)?;
        check("initial LALR state", self.init_lalr as usize, n_lalr)?;
        check("start symbol", self.start_symbol as usize, n_sym)?;

        for rule in &self.rules {
            check("rule nonterminal", rule.lhs as usize, n_sym)?;
            for &sym in &rule.body {
                check("rule body symbol", sym as usize, n_sym)?;
            }
        }
        for state in &self.dfa_states {
            if let Some(sym) = state.accept {
                check("DFA accept symbol", sym as usize, n_sym)?;
            }
            for edge in &state.edges {
                check("DFA edge charset", edge.charset as usize, n_cs)?;
                check("DFA edge target", edge.target as usize, n_dfa)?;
            }
        }
        for state in &self.lalr_states {
            for action in &state.actions {
                check("action symbol", action.symbol as usize, n_sym)?;
                match action.kind {
                    ActionKind::Shift | ActionKind::Goto => {
                        check("action target state", action.target as usize, n_lalr)?
                    }
                    ActionKind::Reduce => {
                        check("action target rule", action.target as usize, n_rule)?
                    }
                    ActionKind::Accept => {}
                }
            }
        }

        self.eof_symbol = self
            .find_symbol(SymbolType::EndOfInput)
            .ok_or(LoadError::MissingSymbol {
                what: "end-of-input",
            })?;
        self.error_symbol = self
            .find_symbol(SymbolType::Error)
            .ok_or(LoadError::MissingSymbol { what: "error" })?;

        log::debug!(
            "loaded grammar table: {} charsets, {} symbols, {} rules, {} DFA states, {} LALR states",
            self.charsets.len(),
            self.symbols.len(),
            self.rules.len(),
            self.dfa_states.len(),
            self.lalr_states.len(),
        );
        Ok(self)
    }

    fn find_symbol(&self, kind: SymbolType) -> Option<u16> {
        self.symbols.iter().find(|s| s.kind == kind).map(|s| s.index)
    }

    pub fn init_dfa(&self) -> u16 {
        self.init_dfa
    }

    pub fn init_lalr(&self) -> u16 {
        self.init_lalr
    }

    pub fn start_symbol(&self) -> u16 {
        self.start_symbol
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Reserved symbol emitted at end of input.
    pub fn eof_symbol(&self) -> u16 {
        self.eof_symbol
    }

    /// Reserved symbol emitted for unmatchable bytes.
    pub fn error_symbol(&self) -> u16 {
        self.error_symbol
    }

    pub fn symbol(&self, index: u16) -> Option<&Symbol> {
        self.symbols.get(index as usize)
    }

    pub fn rule(&self, index: u16) -> Option<&Rule> {
        self.rules.get(index as usize)
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn dfa_state_count(&self) -> usize {
        self.dfa_states.len()
    }

    pub fn lalr_state_count(&self) -> usize {
        self.lalr_states.len()
    }

    /// Name of a symbol, or `""` for an out-of-range index.
    pub fn symbol_name(&self, index: u16) -> &str {
        self.symbol(index).map(|s| s.name.as_str()).unwrap_or("")
    }

    /// Kind of a symbol; out-of-range indices report [`SymbolType::Error`].
    pub fn symbol_kind(&self, index: u16) -> SymbolType {
        self.symbol(index).map(|s| s.kind).unwrap_or(SymbolType::Error)
    }

    /// Renders a rule as `Lhs ::= body...` for diagnostics.
    pub fn format_rule(&self, index: u16) -> std::string::String {
        let Some(rule) = self.rule(index) else {
            return std::string::String::new();
        };
        let mut out = std::string::String::new();
        out.push_str(self.symbol_name(rule.lhs));
        out.push_str(" ::=");
        if rule.body.is_empty() {
            out.push_str(" <empty>");
        }
        for &sym in &rule.body {
            out.push(' ');
            out.push_str(self.symbol_name(sym));
        }
        out
    }

    /// `(lhs, body length)` of a rule. Reduce targets are range-checked at
    /// load, so validated tables never index out of bounds here.
    pub(crate) fn rule_parts(&self, index: u16) -> (u16, usize) {
        let rule = &self.rules[index as usize];
        (rule.lhs, rule.body.len())
    }

    /// Follows the edge out of `state` whose character set admits `b`.
    ///
    /// Case-insensitive tables also test the ASCII-case-swapped byte, so
    /// charsets compiled with one case match both.
    pub(crate) fn dfa_step(&self, state: u16, b: u8) -> Option<u16> {
        let st = &self.dfa_states[state as usize];
        for edge in &st.edges {
            let set = &self.charsets[edge.charset as usize];
            if set.contains(b) {
                return Some(edge.target);
            }
            if !self.case_sensitive {
                let swapped = if b.is_ascii_lowercase() {
                    b.to_ascii_uppercase()
                } else if b.is_ascii_uppercase() {
                    b.to_ascii_lowercase()
                } else {
                    b
                };
                if swapped != b && set.contains(swapped) {
                    return Some(edge.target);
                }
            }
        }
        None
    }

    /// Accept symbol of a DFA state, if it is accepting.
    pub(crate) fn dfa_accept(&self, state: u16) -> Option<u16> {
        self.dfa_states[state as usize].accept
    }

    /// Action for a (state, symbol) pair; `None` is a parse error.
    pub(crate) fn action(&self, state: u16, symbol: u16) -> Option<&LalrAction> {
        self.lalr_states[state as usize].find(symbol)
    }

    /// Names of the terminals (and end-of-input) that have an action in
    /// `state`, sorted and deduplicated — the "expected" set for error
    /// reporting.
    pub fn expected_terminals(&self, state: u16) -> Vec<std::string::String> {
        let Some(st) = self.lalr_states.get(state as usize) else {
            return Vec::new();
        };
        let mut names: Vec<std::string::String> = st
            .actions
            .iter()
            .filter(|a| a.kind != ActionKind::Goto)
            .filter(|a| {
                matches!(
                    self.symbol_kind(a.symbol),
                    SymbolType::Terminal | SymbolType::EndOfInput
                )
            })
            .map(|a| self.symbol_name(a.symbol).to_owned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
