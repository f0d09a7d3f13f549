// interpreter/range.rs - `[start:end]` and `[start:step:end]` loop ranges
use super::number::parse_number;
use crate::cursor::SourceCursor;
use crate::error::{EofContext, LoopBoundsFault, SimError, SimResult};
use std::io::{Read, Seek};

/// Inclusive loop range as written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopRange {
    pub start: i64,
    pub step: i64,
    pub end: i64,
}

impl LoopRange {
    pub fn new(start: i64, step: i64, end: i64) -> Self {
        Self { start, step, end }
    }

    /// Number of times the body runs: `start, start + step, ...` up to and
    /// including `end`.
    ///
    /// `end` exactly one step short of `start` is an empty loop: `[0:-1]`,
    /// `[5:4]` and `[0:-2:2]` all run zero times instead of being rejected.
    /// Any range further against the sign of `step` is a direction error.
    pub fn iterations(&self) -> Result<u64, LoopBoundsFault> {
        if self.step == 0 {
            return Err(LoopBoundsFault::ZeroStep);
        }

        let span = self
            .end
            .checked_sub(self.start)
            .ok_or(LoopBoundsFault::Overflow)?;
        // MIN % -1 and MIN / -1 are the only overflowing cases
        if span.checked_rem(self.step).ok_or(LoopBoundsFault::Overflow)? != 0 {
            return Err(LoopBoundsFault::NotInteger);
        }

        let count = span
            .checked_div(self.step)
            .and_then(|n| n.checked_add(1))
            .ok_or(LoopBoundsFault::Overflow)?;
        u64::try_from(count).map_err(|_| LoopBoundsFault::Direction)
    }
}

/// Reads the bracketed range following a `for` and returns it with its
/// iteration count.
pub fn read_loop_range<R: Read + Seek>(cursor: &mut SourceCursor<R>) -> SimResult<(LoopRange, u64)> {
    if !cursor.skip_past(b'[')? {
        return Err(SimError::UnexpectedEof {
            line: cursor.line(),
            context: EofContext::LoopRange,
        });
    }

    let (start, _) = parse_number(cursor, b':', None)?;
    let (second, terminator) = parse_number(cursor, b']', Some(b':'))?;
    let range = if terminator == b':' {
        let (end, _) = parse_number(cursor, b']', None)?;
        LoopRange::new(start, second, end)
    } else {
        LoopRange::new(start, 1, second)
    };

    let iterations = range.iterations().map_err(|fault| SimError::InvalidLoopBounds {
        line: cursor.line(),
        fault,
    })?;
    Ok((range, iterations))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn eval(text: &str) -> SimResult<u64> {
        let mut c = SourceCursor::new(Cursor::new(text.as_bytes().to_vec()));
        read_loop_range(&mut c).map(|(_, n)| n)
    }

    fn fault(text: &str) -> Option<LoopBoundsFault> {
        match eval(text) {
            Err(SimError::InvalidLoopBounds { fault, .. }) => Some(fault),
            _ => None,
        }
    }

    #[test]
    fn counts_inclusive_ranges() {
        assert_eq!(eval("i in [0:2] {").unwrap(), 3);
        assert_eq!(eval("[4:-1:0]").unwrap(), 5);
        assert_eq!(eval("[0:2:4]").unwrap(), 3);
        assert_eq!(eval("[ 7 : 7 ]").unwrap(), 1);
        assert_eq!(eval("[-3:3:3]").unwrap(), 3);
    }

    #[test]
    fn one_step_short_is_empty() {
        assert_eq!(eval("[0:-1]").unwrap(), 0);
        assert_eq!(eval("[5:4]").unwrap(), 0);
        assert_eq!(eval("[0:-2:2]").unwrap(), 0);
    }

    #[test]
    fn rejects_bad_bounds() {
        assert_eq!(fault("[0:0:5]"), Some(LoopBoundsFault::ZeroStep));
        assert_eq!(fault("[0:2:5]"), Some(LoopBoundsFault::NotInteger));
        assert_eq!(fault("[0:-2]"), Some(LoopBoundsFault::Direction));
        assert_eq!(fault("[0:-1:3]"), Some(LoopBoundsFault::Direction));
        assert_eq!(fault("[0:-4:2]"), Some(LoopBoundsFault::Direction));
        assert_eq!(fault("[5:3]"), Some(LoopBoundsFault::Direction));
        assert_eq!(
            fault("[-9223372036854775808:9223372036854775807]"),
            Some(LoopBoundsFault::Overflow)
        );
        assert_eq!(
            fault("[9223372036854775807:-9223372036854775808]"),
            Some(LoopBoundsFault::Overflow)
        );
        assert_eq!(
            fault("[0:-1:-9223372036854775808]"),
            Some(LoopBoundsFault::Overflow)
        );
    }

    #[test]
    fn missing_bracket_is_fatal() {
        assert!(matches!(
            eval("i in 0:2 {"),
            Err(SimError::UnexpectedEof { context: EofContext::LoopRange, .. })
        ));
    }
}
