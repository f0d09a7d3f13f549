// lexer.rs - command word classification
use logos::Logos;

/// Longest accepted command word plus one (`OPENQASM` fits with room to spare).
pub const CMD_MAX_LEN: usize = 10;

#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Command {
    // Declarations
    #[token("OPENQASM")]
    OpenQasm,
    #[token("include")]
    Include,
    #[token("creg")]
    Creg,
    #[token("qreg")]
    Qreg,

    // Loops
    #[token("for")]
    For,
    #[token("}")]
    LoopEnd,

    #[token("measure")]
    Measure,

    // Single-qubit gates
    #[token("x", ignore(ascii_case))]
    X,
    #[token("y", ignore(ascii_case))]
    Y,
    #[token("z", ignore(ascii_case))]
    Z,
    #[token("h", ignore(ascii_case))]
    H,
    #[token("s", ignore(ascii_case))]
    S,
    #[token("t", ignore(ascii_case))]
    T,

    // Multi-qubit gates
    #[token("cx", ignore(ascii_case))]
    Cx,
    #[token("cz", ignore(ascii_case))]
    Cz,
    #[token("ccx", ignore(ascii_case))]
    Ccx,
    #[token("cswap", ignore(ascii_case))]
    CSwap,
}

impl Command {
    /// Commands accepted before a qubit register exists.
    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            Command::OpenQasm | Command::Include | Command::Creg | Command::Qreg
        )
    }

    /// Number of qubit operands taken by a gate command, `None` otherwise.
    pub fn gate_arity(self) -> Option<usize> {
        match self {
            Command::X | Command::Y | Command::Z | Command::H | Command::S | Command::T => Some(1),
            Command::Cx | Command::Cz => Some(2),
            Command::Ccx | Command::CSwap => Some(3),
            _ => None,
        }
    }
}

/// Classifies a whole command word. Partial matches (`hx`, `cxx`) are rejected.
pub fn classify(word: &str) -> Option<Command> {
    let mut lex = Command::lexer(word);
    match lex.next() {
        Some(Ok(cmd)) if lex.span().end == word.len() => Some(cmd),
        _ => None,
    }
}
