//! DFA tokenizer.
//!
//! [`scan`] produces exactly one token per call by replaying the grammar
//! table's DFA over the character stream with the longest-match-with-
//! backtrack policy: it explores forward through [`CharStream::peek_at`]
//! without consuming, remembers the most recent accepting state, and only
//! commits ([`CharStream::advance`]) the bytes of the winning match. The
//! stream therefore always lands immediately after the emitted lexeme.
//!
//! This is the hot path of a parse; it allocates nothing beyond the
//! returned lexeme.

use crate::error::InputError;
use crate::stream::CharStream;
use crate::table::GrammarTable;
use crate::token::Token;
use smartstring::alias::String;

/// Scans the next token from `stream`.
///
/// - If any accepting DFA state was entered, the longest such match wins
///   and the stream is left just past it (maximal munch).
/// - If no accepting state was ever entered and at least one byte remains,
///   a single-byte token of the table's reserved error symbol is emitted,
///   guaranteeing forward progress.
/// - At end of input with nothing pending, the reserved end-of-input
///   symbol is emitted with an empty lexeme.
pub fn scan(table: &GrammarTable, stream: &mut CharStream) -> Result<Token, InputError> {
    let line = stream.line();
    let column = stream.column();

    let mut state = table.init_dfa();
    let mut looked = 0usize;
    let mut best: Option<(u16, usize)> = None;

    while let Some(b) = stream.peek_at(looked)? {
        let Some(next) = table.dfa_step(state, b) else {
            break;
        };
        state = next;
        looked += 1;
        if let Some(symbol) = table.dfa_accept(state) {
            best = Some((symbol, looked));
        }
    }

    if let Some((symbol, len)) = best {
        let mut token = Token::new(symbol, table.symbol_kind(symbol), String::new(), line, column);
        for _ in 0..len {
            if let Some(b) = stream.advance()? {
                token.push_byte(b);
            }
        }
        log::trace!(
            "scan: {:?} {:?} at {}:{}",
            table.symbol_name(symbol),
            token.lexeme,
            line,
            column
        );
        return Ok(token);
    }

    match stream.advance()? {
        Some(b) => {
            log::trace!(
                "scan: no DFA edge for byte 0x{} at {}:{}, emitting error token",
                hex::encode([b]),
                line,
                column
            );
            let mut token = Token::new(
                table.error_symbol(),
                table.symbol_kind(table.error_symbol()),
                String::new(),
                line,
                column,
            );
            token.push_byte(b);
            Ok(token)
        }
        None => {
            log::trace!("scan: end of input at {}:{}", line, column);
            Ok(Token::new(
                table.eof_symbol(),
                table.symbol_kind(table.eof_symbol()),
                String::new(),
                line,
                column,
            ))
        }
    }
}
