// error.rs - fatal conditions of the interpreter and sampler
use std::fmt;
use thiserror::Error;

/// Where the stream ran dry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EofContext {
    Number,
    QubitIndex,
    LoopRange,
    LoopStart,
    UnfinishedLoop,
    Command,
    AfterCommand,
    Semicolon,
}

impl fmt::Display for EofContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EofContext::Number => "when converting a number",
            EofContext::QubitIndex => "(expected a qubit index)",
            EofContext::LoopRange => "(expected a number of loop iterations)",
            EofContext::LoopStart => "at the start of a loop",
            EofContext::UnfinishedLoop => "(there is an unfinished loop)",
            EofContext::Command => "when loading a command",
            EofContext::AfterCommand => "immediately after a command",
            EofContext::Semicolon => "(expected ';' to end the current line)",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumberFault {
    NonDigit(char),
    TooManyDigits,
    NotANumber,
}

impl fmt::Display for NumberFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberFault::NonDigit(c) => write!(
                f,
                "a non-digit character '{}' encountered while parsing a number",
                c.escape_default()
            ),
            NumberFault::TooManyDigits => f.write_str("too many digits"),
            NumberFault::NotANumber => f.write_str("not a valid number"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopBoundsFault {
    ZeroStep,
    Overflow,
    NotInteger,
    Direction,
}

impl fmt::Display for LoopBoundsFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            LoopBoundsFault::ZeroStep => "step must be non-zero",
            LoopBoundsFault::Overflow => "overflow detected",
            LoopBoundsFault::NotInteger => "not an integer",
            LoopBoundsFault::Direction => "the range runs against the sign of the step",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("line {line}: invalid format - reached an unexpected end of file {context}")]
    UnexpectedEof { line: usize, context: EofContext },

    #[error("line {line}: invalid format - not a valid number ({fault})")]
    MalformedNumber { line: usize, fault: NumberFault },

    #[error("line {line}: invalid format - {value} is not a valid qubit identifier")]
    InvalidQubitIndex { line: usize, value: i64 },

    #[error("line {line}: qubit index {index} is out of range for a register of {count} qubits")]
    QubitOutOfRange { line: usize, index: u32, count: u32 },

    #[error("line {line}: invalid command '{command}'")]
    InvalidCommand { line: usize, command: String },

    #[error("line {line}: invalid command (command too long)")]
    CommandTooLong { line: usize },

    #[error("line {line}: invalid command, expected a one-line comment")]
    InvalidComment { line: usize },

    #[error("line {line}: invalid loop syntax - reached an unexpected end of a loop")]
    UnmatchedLoopEnd { line: usize },

    #[error("line {line}: invalid loop syntax - nested loops are not supported")]
    NestedLoop { line: usize },

    #[error("line {line}: invalid number of loop iterations - {fault}")]
    InvalidLoopBounds { line: usize, fault: LoopBoundsFault },

    #[error("line {line}: circuit not initialized")]
    NotInitialized { line: usize },

    #[error("line {line}: qubit register already declared")]
    RegisterRedeclared { line: usize },

    #[error("unsupported measurement operation - must measure all qubits and their order must remain the same")]
    UnsupportedMeasurement,

    #[error("{failed} of {total} files failed the syntax check")]
    CheckFailed { failed: usize, total: usize },

    #[error("circuit backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// Source line the error points at, when it came from the interpreter.
    pub fn line(&self) -> Option<usize> {
        match self {
            SimError::UnexpectedEof { line, .. }
            | SimError::MalformedNumber { line, .. }
            | SimError::InvalidQubitIndex { line, .. }
            | SimError::QubitOutOfRange { line, .. }
            | SimError::InvalidCommand { line, .. }
            | SimError::CommandTooLong { line }
            | SimError::InvalidComment { line }
            | SimError::UnmatchedLoopEnd { line }
            | SimError::NestedLoop { line }
            | SimError::InvalidLoopBounds { line, .. }
            | SimError::NotInitialized { line }
            | SimError::RegisterRedeclared { line } => Some(*line),
            SimError::UnsupportedMeasurement
            | SimError::CheckFailed { .. }
            | SimError::Backend(_)
            | SimError::Io(_) => None,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
