// interpreter/number.rs - integer literals and bracketed qubit indices
use crate::cursor::SourceCursor;
use crate::error::{EofContext, NumberFault, SimError, SimResult};
use std::io::{Read, Seek};

/// Capacity of the number buffer; at most `NUM_MAX_LEN - 1` characters are kept.
pub const NUM_MAX_LEN: usize = 25;

/// Reads a signed integer terminated by `end` (or `alt_end`, when given).
///
/// Returns the value together with the terminator that stopped it. Leading
/// whitespace is skipped and whitespace directly before the terminator is
/// tolerated; anything else that is not a digit or `-` is an error.
pub fn parse_number<R: Read + Seek>(
    cursor: &mut SourceCursor<R>,
    end: u8,
    alt_end: Option<u8>,
) -> SimResult<(i64, u8)> {
    let is_end = |b: u8| b == end || Some(b) == alt_end;
    let eof = |cursor: &SourceCursor<R>| SimError::UnexpectedEof {
        line: cursor.line(),
        context: EofContext::Number,
    };

    let mut digits = String::with_capacity(NUM_MAX_LEN);
    let mut c = cursor.next_non_space()?.ok_or_else(|| eof(cursor))?;

    let terminator = loop {
        if is_end(c) {
            break c;
        }
        if c.is_ascii_digit() || c == b'-' {
            if digits.len() + 1 >= NUM_MAX_LEN {
                return Err(SimError::MalformedNumber {
                    line: cursor.line(),
                    fault: NumberFault::TooManyDigits,
                });
            }
            digits.push(char::from(c));
        } else if c.is_ascii_whitespace() {
            let next = cursor.next_non_space()?.ok_or_else(|| eof(cursor))?;
            if is_end(next) {
                break next;
            }
            return Err(SimError::MalformedNumber {
                line: cursor.line(),
                fault: NumberFault::NonDigit(char::from(next)),
            });
        } else {
            return Err(SimError::MalformedNumber {
                line: cursor.line(),
                fault: NumberFault::NonDigit(char::from(c)),
            });
        }
        c = cursor.next_byte()?.ok_or_else(|| eof(cursor))?;
    };

    let value = digits.parse::<i64>().map_err(|_| SimError::MalformedNumber {
        line: cursor.line(),
        fault: NumberFault::NotANumber,
    })?;
    Ok((value, terminator))
}

/// Scans forward to the next `[` and reads the index up to `]`.
pub fn read_qubit_index<R: Read + Seek>(cursor: &mut SourceCursor<R>) -> SimResult<u32> {
    if !cursor.skip_past(b'[')? {
        return Err(SimError::UnexpectedEof {
            line: cursor.line(),
            context: EofContext::QubitIndex,
        });
    }

    let (value, _) = parse_number(cursor, b']', None)?;
    u32::try_from(value).map_err(|_| SimError::InvalidQubitIndex {
        line: cursor.line(),
        value,
    })
}
