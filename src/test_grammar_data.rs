//! Hand-built grammar tables for the test suite.
//!
//! The external grammar compiler is not part of this crate, so the tests
//! assemble small tables directly and serialize them through
//! [`TableBuilder`], which mirrors the `GTB1` layout byte for byte. Tests
//! that need a malformed table start from a builder and patch it.

use crate::table::SymbolType;

/// Symbol indices shared by the fixture grammars.
pub const EOF: u16 = 0;
pub const WHITESPACE: u16 = 2;
pub const PLUS: u16 = 3;
pub const NUM: u16 = 4;
pub const SUM: u16 = 5;
pub const COMMENT_LINE: u16 = 6;
pub const COMMENT_START: u16 = 7;
pub const COMMENT_END: u16 = 8;

/// Serializes a grammar table in the `GTB1` binary layout.
///
/// Fields hold raw codes (symbol types, action kinds) so tests can write
/// invalid values on purpose.
pub struct TableBuilder {
    pub init_dfa: u16,
    pub init_lalr: u16,
    pub start_symbol: u16,
    pub case_sensitive: bool,
    /// Member bytes per character set.
    pub charsets: Vec<Vec<u8>>,
    /// (type code, name) per symbol.
    pub symbols: Vec<(u8, &'static str)>,
    /// (lhs, body) per rule.
    pub rules: Vec<(u16, Vec<u16>)>,
    /// (accept symbol, edges as (charset, target)) per DFA state.
    pub dfa: Vec<(Option<u16>, Vec<(u16, u16)>)>,
    /// Actions as (symbol, kind code, target) per LALR state.
    pub lalr: Vec<Vec<(u16, u8, u16)>>,
}

impl TableBuilder {
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"GTB1");
        push_u16(&mut out, self.init_dfa);
        push_u16(&mut out, self.init_lalr);
        push_u16(&mut out, self.start_symbol);
        out.push(self.case_sensitive as u8);

        push_u16(&mut out, self.charsets.len() as u16);
        for set in &self.charsets {
            push_u16(&mut out, set.len() as u16);
            out.extend_from_slice(set);
        }

        push_u16(&mut out, self.symbols.len() as u16);
        for (code, name) in &self.symbols {
            out.push(*code);
            push_u16(&mut out, name.len() as u16);
            out.extend_from_slice(name.as_bytes());
        }

        push_u16(&mut out, self.rules.len() as u16);
        for (lhs, body) in &self.rules {
            push_u16(&mut out, *lhs);
            push_u16(&mut out, body.len() as u16);
            for &sym in body {
                push_u16(&mut out, sym);
            }
        }

        push_u16(&mut out, self.dfa.len() as u16);
        for (accept, edges) in &self.dfa {
            out.push(accept.is_some() as u8);
            push_u16(&mut out, accept.unwrap_or(0));
            push_u16(&mut out, edges.len() as u16);
            for &(charset, target) in edges {
                push_u16(&mut out, charset);
                push_u16(&mut out, target);
            }
        }

        push_u16(&mut out, self.lalr.len() as u16);
        for actions in &self.lalr {
            push_u16(&mut out, actions.len() as u16);
            for &(symbol, kind, target) in actions {
                push_u16(&mut out, symbol);
                out.push(kind);
                push_u16(&mut out, target);
            }
        }

        out
    }
}

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_le_bytes());
}

const SHIFT: u8 = 1;
const REDUCE: u8 = 2;
const GOTO: u8 = 3;
const ACCEPT: u8 = 4;

/// `Sum ::= Sum '+' Num | Num` over digit strings, with whitespace.
///
/// Rules: 0 = `Sum ::= Sum + Num`, 1 = `Sum ::= Num`.
pub fn sum_builder() -> TableBuilder {
    TableBuilder {
        init_dfa: 0,
        init_lalr: 0,
        start_symbol: SUM,
        case_sensitive: true,
        charsets: vec![
            b"0123456789".to_vec(),
            b"+".to_vec(),
            b" \t\r\n".to_vec(),
        ],
        symbols: vec![
            (SymbolType::EndOfInput as u8, "EOF"),
            (SymbolType::Error as u8, "Error"),
            (SymbolType::Whitespace as u8, "Whitespace"),
            (SymbolType::Terminal as u8, "+"),
            (SymbolType::Terminal as u8, "Num"),
            (SymbolType::Nonterminal as u8, "Sum"),
        ],
        rules: vec![(SUM, vec![SUM, PLUS, NUM]), (SUM, vec![NUM])],
        dfa: vec![
            (None, vec![(0, 1), (1, 2), (2, 3)]),
            (Some(NUM), vec![(0, 1)]),
            (Some(PLUS), vec![]),
            (Some(WHITESPACE), vec![(2, 3)]),
        ],
        lalr: vec![
            vec![(NUM, SHIFT, 1), (SUM, GOTO, 2)],
            vec![(PLUS, REDUCE, 1), (EOF, REDUCE, 1)],
            vec![(PLUS, SHIFT, 3), (EOF, ACCEPT, 0)],
            vec![(NUM, SHIFT, 4)],
            vec![(PLUS, REDUCE, 0), (EOF, REDUCE, 0)],
        ],
    }
}

pub fn sum_table_bytes() -> Vec<u8> {
    sum_builder().build()
}

/// Scanner-only fixture: terminal `A` matches `a`, terminal `AB` matches
/// `ab`, and an `ab` followed by `c` walks one state further without ever
/// reaching another accept. Symbols: 2 = A, 3 = AB.
pub fn lexer_builder() -> TableBuilder {
    TableBuilder {
        init_dfa: 0,
        init_lalr: 0,
        start_symbol: 0,
        case_sensitive: true,
        charsets: vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()],
        symbols: vec![
            (SymbolType::EndOfInput as u8, "EOF"),
            (SymbolType::Error as u8, "Error"),
            (SymbolType::Terminal as u8, "A"),
            (SymbolType::Terminal as u8, "AB"),
        ],
        rules: vec![],
        dfa: vec![
            (None, vec![(0, 1)]),
            (Some(2), vec![(1, 2)]),
            (Some(3), vec![(2, 3)]),
            (None, vec![]),
        ],
        lalr: vec![vec![]],
    }
}

pub fn lexer_table_bytes() -> Vec<u8> {
    lexer_builder().build()
}

/// The sum grammar extended with `//` line comments and `/* */` block
/// comments.
pub fn comment_builder() -> TableBuilder {
    let mut b = sum_builder();
    b.symbols.extend([
        (SymbolType::CommentLine as u8, "CommentLine"),
        (SymbolType::CommentStart as u8, "CommentStart"),
        (SymbolType::CommentEnd as u8, "CommentEnd"),
    ]);
    b.charsets.extend([b"/".to_vec(), b"*".to_vec()]);
    b.dfa = vec![
        (None, vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 7)]),
        (Some(NUM), vec![(0, 1)]),
        (Some(PLUS), vec![]),
        (Some(WHITESPACE), vec![(2, 3)]),
        (None, vec![(3, 5), (4, 6)]),
        (Some(COMMENT_LINE), vec![]),
        (Some(COMMENT_START), vec![]),
        (None, vec![(3, 8)]),
        (Some(COMMENT_END), vec![]),
    ];
    b
}

pub fn comment_table_bytes() -> Vec<u8> {
    comment_builder().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::GrammarTable;

    #[test]
    fn all_fixture_tables_load() {
        GrammarTable::from_bytes(&sum_table_bytes()).unwrap();
        GrammarTable::from_bytes(&lexer_table_bytes()).unwrap();
        GrammarTable::from_bytes(&comment_table_bytes()).unwrap();
    }
}
