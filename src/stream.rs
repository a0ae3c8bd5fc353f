//! Buffered, read-ahead character source for one parse session.
//!
//! [`CharStream`] satisfies the minimal contract the scanner needs: peek at
//! the current byte (and arbitrarily far ahead of it) without consuming,
//! materialize lookahead on demand, and consume one byte at a time while
//! tracking 1-based line/column. A stream is bound to exactly one session
//! and is released by dropping it or re-opening the parser.

use crate::error::InputError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const READ_CHUNK: usize = 1024;

/// A byte source with unlimited buffered lookahead.
///
/// Line feed advances the line counter and resets the column; carriage
/// return is consumed but never counted, so `\r\n` input reports the same
/// positions as `\n` input.
pub struct CharStream {
    reader: Option<Box<dyn Read>>,
    buf: Vec<u8>,
    pos: usize,
    line: usize,
    column: usize,
}

impl CharStream {
    /// Binds a file source; reads ahead in 1 KiB chunks as the scanner
    /// explores.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| InputError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(Box::new(file)))
    }

    /// Binds an in-memory source; the whole buffer is materialized up
    /// front.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            reader: None,
            buf: bytes.to_vec(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn from_reader(reader: Box<dyn Read>) -> Self {
        Self {
            reader: Some(reader),
            buf: Vec::new(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    /// Materializes up to `n` bytes ahead of the cursor and returns how
    /// many are actually available, so a forward scan of `n` symbols never
    /// truncates silently.
    pub fn ensure_available(&mut self, n: usize) -> Result<usize, InputError> {
        while self.buf.len() - self.pos < n {
            let Some(reader) = self.reader.as_mut() else {
                break;
            };
            let mut chunk = [0u8; READ_CHUNK];
            match reader.read(&mut chunk) {
                Ok(0) => {
                    self.reader = None;
                }
                Ok(k) => self.buf.extend_from_slice(&chunk[..k]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => return Err(InputError::Read(e)),
            }
        }
        Ok(n.min(self.buf.len() - self.pos))
    }

    /// Current byte without consuming it; `None` at end of input.
    pub fn peek(&mut self) -> Result<Option<u8>, InputError> {
        self.peek_at(0)
    }

    /// Byte `k` positions ahead of the cursor without consuming anything.
    pub fn peek_at(&mut self, k: usize) -> Result<Option<u8>, InputError> {
        self.ensure_available(k + 1)?;
        Ok(self.buf.get(self.pos + k).copied())
    }

    /// Consumes and returns the current byte, updating line/column.
    pub fn advance(&mut self) -> Result<Option<u8>, InputError> {
        self.ensure_available(1)?;
        let Some(&b) = self.buf.get(self.pos) else {
            return Ok(None);
        };
        self.pos += 1;
        match b {
            b'\n' => {
                self.line += 1;
                self.column = 1;
            }
            b'\r' => {}
            _ => self.column += 1,
        }
        Ok(Some(b))
    }

    /// 1-based line of the cursor.
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column of the cursor.
    pub fn column(&self) -> usize {
        self.column
    }
}

impl std::fmt::Debug for CharStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CharStream")
            .field("pos", &self.pos)
            .field("buffered", &(self.buf.len() - self.pos))
            .field("line", &self.line)
            .field("column", &self.column)
            .field("live_reader", &self.reader.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peek_does_not_consume() {
        let mut s = CharStream::from_bytes(b"ab");
        assert_eq!(s.peek().unwrap(), Some(b'a'));
        assert_eq!(s.peek().unwrap(), Some(b'a'));
        assert_eq!(s.advance().unwrap(), Some(b'a'));
        assert_eq!(s.peek().unwrap(), Some(b'b'));
    }

    #[test]
    fn peek_at_looks_ahead_without_moving() {
        let mut s = CharStream::from_bytes(b"abc");
        assert_eq!(s.peek_at(2).unwrap(), Some(b'c'));
        assert_eq!(s.peek_at(3).unwrap(), None);
        assert_eq!(s.line(), 1);
        assert_eq!(s.column(), 1);
    }

    #[test]
    fn line_feed_updates_line_and_resets_column() {
        let mut s = CharStream::from_bytes(b"a\nbc");
        s.advance().unwrap();
        assert_eq!((s.line(), s.column()), (1, 2));
        s.advance().unwrap();
        assert_eq!((s.line(), s.column()), (2, 1));
        s.advance().unwrap();
        assert_eq!((s.line(), s.column()), (2, 2));
    }

    #[test]
    fn carriage_return_is_not_counted() {
        let mut s = CharStream::from_bytes(b"a\r\nb");
        s.advance().unwrap();
        s.advance().unwrap(); // '\r'
        assert_eq!((s.line(), s.column()), (1, 2));
        s.advance().unwrap(); // '\n'
        assert_eq!((s.line(), s.column()), (2, 1));
    }

    #[test]
    fn ensure_available_reports_shortfall_at_eof() {
        let mut s = CharStream::from_bytes(b"xy");
        assert_eq!(s.ensure_available(10).unwrap(), 2);
        s.advance().unwrap();
        assert_eq!(s.ensure_available(10).unwrap(), 1);
    }

    #[test]
    fn advance_past_eof_returns_none() {
        let mut s = CharStream::from_bytes(b"");
        assert_eq!(s.advance().unwrap(), None);
        assert_eq!(s.peek().unwrap(), None);
    }

    #[test]
    fn open_reads_across_chunk_boundaries() {
        let path = std::env::temp_dir().join(format!(
            "goldrt-stream-test-{}.txt",
            std::process::id()
        ));
        let content: Vec<u8> = (0..3000).map(|i| b'a' + (i % 26) as u8).collect();
        std::fs::write(&path, &content).unwrap();

        let mut s = CharStream::open(&path).unwrap();
        assert_eq!(s.peek_at(2999).unwrap(), Some(content[2999]));
        let mut read = Vec::new();
        while let Some(b) = s.advance().unwrap() {
            read.push(b);
        }
        assert_eq!(read, content);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn open_missing_file_is_an_open_error() {
        let err = CharStream::open("/nonexistent/goldrt-no-such-file").unwrap_err();
        assert!(matches!(err, InputError::Open { .. }));
    }
}
