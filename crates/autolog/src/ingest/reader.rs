//! Reader — splits a chunked byte stream back into lines.

use bytes::{Buf, BytesMut};

use crate::parser::MAX_LINE_SIZE;

/// One line recovered from the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitLine {
    Text(String),
    /// A line longer than the limit; its bytes were dropped unread.
    TooLarge(usize),
}

/// Accumulates raw chunks and yields complete lines.
///
/// Bytes are held until a `\n` arrives, so a line (or a multi-byte
/// character) straddling a chunk boundary is decoded in one piece.
/// Invalid UTF-8 is replaced, never rejected.
///
/// At most `max_line_bytes` plus one chunk is ever buffered: once a line
/// outgrows the limit the rest of it is discarded up to the next newline
/// and reported once as [`SplitLine::TooLarge`].
#[derive(Debug)]
pub struct LineSplitter {
    pending: BytesMut,
    /// Prefix of `pending` already known to hold no newline
    scanned: usize,
    /// Length so far of an oversized line being skipped
    discarding: Option<usize>,
    max_line_bytes: usize,
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new(MAX_LINE_SIZE)
    }
}

impl LineSplitter {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            pending: BytesMut::new(),
            scanned: 0,
            discarding: None,
            max_line_bytes,
        }
    }

    /// Feed one chunk, returning every line it completed.
    pub fn push(&mut self, mut chunk: &[u8]) -> Vec<SplitLine> {
        let mut lines = Vec::new();

        if let Some(dropped) = self.discarding {
            match chunk.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    lines.push(SplitLine::TooLarge(dropped + pos));
                    self.discarding = None;
                    chunk = &chunk[pos + 1..];
                }
                None => {
                    self.discarding = Some(dropped + chunk.len());
                    return lines;
                }
            }
        }

        self.pending.extend_from_slice(chunk);
        while let Some(rel) = self.pending[self.scanned..].iter().position(|&b| b == b'\n') {
            let line = self.pending.split_to(self.scanned + rel);
            self.pending.advance(1);
            self.scanned = 0;
            lines.push(self.complete(&line));
        }
        self.scanned = self.pending.len();

        if self.pending.len() > self.max_line_bytes {
            self.discarding = Some(self.pending.len());
            self.pending.clear();
            self.scanned = 0;
        }
        lines
    }

    /// Flush the final unterminated line, if any.
    pub fn finish(&mut self) -> Option<SplitLine> {
        if let Some(dropped) = self.discarding.take() {
            return Some(SplitLine::TooLarge(dropped));
        }
        if self.pending.is_empty() {
            return None;
        }
        let rest = self.pending.split();
        self.scanned = 0;
        Some(self.complete(&rest))
    }

    fn complete(&self, raw: &[u8]) -> SplitLine {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.len() > self.max_line_bytes {
            SplitLine::TooLarge(raw.len())
        } else {
            SplitLine::Text(String::from_utf8_lossy(raw).into_owned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SplitLine {
        SplitLine::Text(s.to_string())
    }

    #[test]
    fn test_lines_across_chunks() {
        let mut splitter = LineSplitter::default();
        assert!(splitter.push(b"ts {\"a\":").is_empty());
        assert_eq!(splitter.push(b"1}\nts2 {}\nts3"), vec![text("ts {\"a\":1}"), text("ts2 {}")]);
        assert_eq!(splitter.finish(), Some(text("ts3")));
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let data = "ts {\"activity_name\":\"Café\"}\n".as_bytes();
        // Split inside the two-byte 'é'
        let cut = data.iter().position(|&b| b == 0xC3).unwrap() + 1;

        let mut splitter = LineSplitter::default();
        assert!(splitter.push(&data[..cut]).is_empty());
        let lines = splitter.push(&data[cut..]);
        assert_eq!(lines, vec![text("ts {\"activity_name\":\"Café\"}")]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut splitter = LineSplitter::default();
        let lines = splitter.push(b"ts {\"x\":\"\xFF\"}\n");
        assert_eq!(lines, vec![text("ts {\"x\":\"\u{FFFD}\"}")]);
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let mut splitter = LineSplitter::default();
        let lines = splitter.push(b"a b\r\n\nc d\n");
        assert_eq!(lines, vec![text("a b"), text(""), text("c d")]);
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_oversized_line_is_dropped_and_reported_once() {
        let mut splitter = LineSplitter::new(16);
        let mut lines = splitter.push(b"ok {}\n");
        lines.extend(splitter.push(&[b'x'; 10]));
        lines.extend(splitter.push(&[b'x'; 10]));
        lines.extend(splitter.push(&[b'x'; 10]));
        lines.extend(splitter.push(b"xx\nnext {}\n"));

        assert_eq!(lines, vec![text("ok {}"), SplitLine::TooLarge(32), text("next {}")]);
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_oversized_line_within_one_chunk() {
        let mut splitter = LineSplitter::new(4);
        let lines = splitter.push(b"abcdefgh\nab\n");
        assert_eq!(lines, vec![SplitLine::TooLarge(8), text("ab")]);
    }

    #[test]
    fn test_newline_free_input_stays_bounded() {
        let max = 64 * 1024;
        let chunk = [b'a'; 8192];
        let mut splitter = LineSplitter::new(max);

        for _ in 0..256 {
            assert!(splitter.push(&chunk).is_empty());
            assert!(splitter.pending.len() <= max + chunk.len());
        }
        assert_eq!(splitter.finish(), Some(SplitLine::TooLarge(256 * chunk.len())));
    }
}
