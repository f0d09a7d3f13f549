// cursor.rs - byte cursor over a seekable source with replay bookmarks
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};

/// A saved position in the source, used to replay a loop body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    offset: u64,
    line: usize,
}

impl Mark {
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn line(&self) -> usize {
        self.line
    }
}

/// Reads the circuit description one byte at a time and keeps track of the
/// current line for diagnostics.
#[derive(Debug)]
pub struct SourceCursor<R> {
    inner: BufReader<R>,
    offset: u64,
    line: usize,
}

impl<R: Read + Seek> SourceCursor<R> {
    pub fn new(source: R) -> Self {
        Self {
            inner: BufReader::new(source),
            offset: 0,
            line: 1,
        }
    }

    /// Next byte of the stream, `None` at end of stream.
    pub fn next_byte(&mut self) -> io::Result<Option<u8>> {
        let byte = match self.inner.fill_buf()?.first() {
            Some(&b) => b,
            None => return Ok(None),
        };
        self.inner.consume(1);
        self.offset += 1;
        if byte == b'\n' {
            self.line += 1;
        }
        Ok(Some(byte))
    }

    /// Next byte that is not ASCII whitespace.
    pub fn next_non_space(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.next_byte()? {
                Some(b) if b.is_ascii_whitespace() => continue,
                other => return Ok(other),
            }
        }
    }

    /// Consumes bytes up to and including `target`. Returns `false` if the
    /// stream ended first.
    pub fn skip_past(&mut self, target: u8) -> io::Result<bool> {
        while let Some(b) = self.next_byte()? {
            if b == target {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn mark(&self) -> Mark {
        Mark {
            offset: self.offset,
            line: self.line,
        }
    }

    pub fn seek_to_mark(&mut self, mark: &Mark) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(mark.offset))?;
        self.offset = mark.offset;
        self.line = mark.line;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn cursor(text: &str) -> SourceCursor<Cursor<Vec<u8>>> {
        SourceCursor::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn tracks_lines_and_offsets() {
        let mut c = cursor("a\nb");
        assert_eq!(c.next_byte().unwrap(), Some(b'a'));
        assert_eq!(c.next_byte().unwrap(), Some(b'\n'));
        assert_eq!(c.line(), 2);
        assert_eq!(c.offset(), 2);
        assert_eq!(c.next_byte().unwrap(), Some(b'b'));
        assert_eq!(c.next_byte().unwrap(), None);
    }

    #[test]
    fn seek_to_mark_replays_bytes() {
        let mut c = cursor("{\n h q[0]; }");
        assert!(c.skip_past(b'{').unwrap());
        let mark = c.mark();
        assert_eq!(c.next_non_space().unwrap(), Some(b'h'));
        assert!(c.skip_past(b'}').unwrap());
        c.seek_to_mark(&mark).unwrap();
        assert_eq!(c.line(), 1);
        assert_eq!(c.next_non_space().unwrap(), Some(b'h'));
        assert_eq!(c.line(), 2);
    }

    #[test]
    fn skip_past_reports_missing_target() {
        let mut c = cursor("no semicolon here");
        assert!(!c.skip_past(b';').unwrap());
    }
}
