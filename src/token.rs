//! Lexical tokens.

use crate::table::SymbolType;
use smartstring::alias::String;

/// One scanned token: terminal symbol id, lexeme text, and the 1-based
/// source position of its first byte.
///
/// Tokens are produced once per [`scan`](crate::scanner::scan) call and
/// copied by value through the filter into the parse stack. Bytes outside
/// ASCII are widened to the corresponding `char`, so a lexeme is always
/// valid UTF-8 and round-trips any single-byte input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Index of the matched symbol in the grammar's symbol table.
    pub id: u16,
    /// Kind of the matched symbol, resolved at scan time.
    pub kind: SymbolType,
    /// The literal matched text.
    pub lexeme: String,
    /// 1-based line of the first matched byte.
    pub line: usize,
    /// 1-based column of the first matched byte.
    pub column: usize,
}

impl Token {
    pub fn new(
        id: u16,
        kind: SymbolType,
        lexeme: String,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            id,
            kind,
            lexeme,
            line,
            column,
        }
    }

    /// Appends one input byte to the lexeme.
    pub(crate) fn push_byte(&mut self, b: u8) {
        self.lexeme.push(b as char);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_byte_round_trips_non_ascii() {
        let mut t = Token::new(0, SymbolType::Terminal, String::new(), 1, 1);
        t.push_byte(b'a');
        t.push_byte(0xE9);
        assert_eq!(t.lexeme.chars().count(), 2);
        assert_eq!(t.lexeme.chars().nth(1), Some('\u{e9}'));
    }

    #[test]
    fn token_is_cloneable_and_comparable() {
        let t1 = Token::new(4, SymbolType::Terminal, "12".into(), 3, 7);
        let t2 = t1.clone();
        assert_eq!(t1, t2);
        assert_eq!(t2.line, 3);
        assert_eq!(t2.column, 7);
    }
}
