// interpreter/mod.rs - single-pass command interpreter
//
// Reads a circuit description straight from the stream and forwards every
// decoded operation to a `QuantumCircuit`. There is no AST: loops are unrolled
// by rewinding the cursor to a bookmark at the start of the body.
pub mod number;
pub mod range;
pub mod state;

pub use number::{parse_number, read_qubit_index, NUM_MAX_LEN};
pub use range::{read_loop_range, LoopRange};
pub use state::{CircuitStats, LoopContext, ParserState, Phase};

use crate::circuit::{Gate, QuantumCircuit};
use crate::cursor::SourceCursor;
use crate::error::{EofContext, SimError, SimResult};
use crate::lexer::{classify, Command, CMD_MAX_LEN};
use std::io::{Read, Seek};

pub struct Interpreter<'c, R, C: ?Sized> {
    cursor: SourceCursor<R>,
    circuit: &'c mut C,
    state: ParserState,
}

impl<'c, R: Read + Seek, C: QuantumCircuit + ?Sized> Interpreter<'c, R, C> {
    pub fn new(source: R, circuit: &'c mut C) -> Self {
        Self {
            cursor: SourceCursor::new(source),
            circuit,
            state: ParserState::new(),
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    /// Interprets the whole description and hands back the final state.
    pub fn run(mut self) -> SimResult<ParserState> {
        while self.step()? {}

        if self.state.active_loop().is_some() {
            return Err(self.eof(EofContext::UnfinishedLoop));
        }
        Ok(self.state)
    }

    /// Executes one command. Returns `false` at end of stream.
    pub fn step(&mut self) -> SimResult<bool> {
        let first = match self.cursor.next_non_space()? {
            Some(b) => b,
            None => return Ok(false),
        };

        if first == b'/' {
            return self.skip_comment();
        }

        let line = self.cursor.line();
        let (word, at_eof) = self.read_command(first)?;
        let command = classify(&word);

        if !command.is_some_and(Command::is_declaration) && !self.state.is_initialized() {
            return Err(SimError::NotInitialized { line });
        }
        let command = command.ok_or(SimError::InvalidCommand { line, command: word })?;
        if at_eof && command != Command::LoopEnd {
            return Err(self.eof(EofContext::AfterCommand));
        }

        match command {
            Command::OpenQasm | Command::Include | Command::Creg => {}
            Command::Qreg => self.declare_register()?,
            Command::For => {
                self.open_loop(line)?;
                return Ok(true);
            }
            Command::LoopEnd => {
                self.close_loop(line)?;
                return Ok(true);
            }
            Command::Measure => self.measure()?,
            gate => self.apply_gate(gate)?,
        }

        self.finish_line()?;
        Ok(true)
    }

    fn eof(&self, context: EofContext) -> SimError {
        SimError::UnexpectedEof {
            line: self.cursor.line(),
            context,
        }
    }

    /// `//` runs to the end of the line; a lone `/` is an error.
    fn skip_comment(&mut self) -> SimResult<bool> {
        match self.cursor.next_byte()? {
            Some(b'/') => {
                self.cursor.skip_past(b'\n')?;
                Ok(true)
            }
            _ => Err(SimError::InvalidComment {
                line: self.cursor.line(),
            }),
        }
    }

    /// Collects a whitespace-delimited command word starting with `first`.
    /// The flag tells whether the stream ended right after the word.
    fn read_command(&mut self, first: u8) -> SimResult<(String, bool)> {
        let mut word = vec![first];
        loop {
            match self.cursor.next_byte()? {
                Some(b) if b.is_ascii_whitespace() => break,
                Some(b) => {
                    if word.len() + 1 >= CMD_MAX_LEN {
                        return Err(SimError::CommandTooLong {
                            line: self.cursor.line(),
                        });
                    }
                    word.push(b);
                }
                None => return Ok((String::from_utf8_lossy(&word).into_owned(), true)),
            }
        }
        Ok((String::from_utf8_lossy(&word).into_owned(), false))
    }

    /// Discards the rest of the command up to and including `;`.
    fn finish_line(&mut self) -> SimResult<()> {
        if self.cursor.skip_past(b';')? {
            Ok(())
        } else {
            Err(self.eof(EofContext::Semicolon))
        }
    }

    fn declare_register(&mut self) -> SimResult<()> {
        let line = self.cursor.line();
        if self.state.is_initialized() {
            return Err(SimError::RegisterRedeclared { line });
        }
        let n = read_qubit_index(&mut self.cursor)?;
        self.circuit.set_num_qubits(n)?;
        self.state.declare(n, line)
    }

    fn read_qubit(&mut self) -> SimResult<u32> {
        let index = read_qubit_index(&mut self.cursor)?;
        self.state.check_qubit(index, self.cursor.line())
    }

    fn measure(&mut self) -> SimResult<()> {
        let qubit = self.read_qubit()?;
        let cbit = read_qubit_index(&mut self.cursor)?;
        self.state.record_measure(qubit, cbit);
        Ok(())
    }

    fn apply_gate(&mut self, command: Command) -> SimResult<()> {
        let gate = match command {
            Command::X => Gate::X(self.read_qubit()?),
            Command::Y => Gate::Y(self.read_qubit()?),
            Command::Z => Gate::Z(self.read_qubit()?),
            Command::H => Gate::H(self.read_qubit()?),
            Command::S => Gate::S(self.read_qubit()?),
            Command::T => Gate::T(self.read_qubit()?),
            Command::Cx => {
                let control = self.read_qubit()?;
                let target = self.read_qubit()?;
                Gate::Cx { control, target }
            }
            Command::Cz => {
                let control = self.read_qubit()?;
                let target = self.read_qubit()?;
                Gate::Cz { control, target }
            }
            Command::Ccx => {
                let control1 = self.read_qubit()?;
                let control2 = self.read_qubit()?;
                let target = self.read_qubit()?;
                Gate::Ccx { control1, control2, target }
            }
            Command::CSwap => {
                let control = self.read_qubit()?;
                let target1 = self.read_qubit()?;
                let target2 = self.read_qubit()?;
                Gate::CSwap { control, target1, target2 }
            }
            other => unreachable!("{:?} is not a gate command", other),
        };

        self.circuit.apply_gate(gate)?;
        self.state.record_gate();
        Ok(())
    }

    fn open_loop(&mut self, line: usize) -> SimResult<()> {
        if self.state.active_loop().is_some() {
            return Err(SimError::NestedLoop { line });
        }

        let (_, iterations) = read_loop_range(&mut self.cursor)?;
        if iterations == 0 {
            return self.skip_loop_body();
        }

        if !self.cursor.skip_past(b'{')? {
            return Err(self.eof(EofContext::LoopStart));
        }
        let body = self.cursor.mark();
        self.state.enter_loop(iterations, body);
        Ok(())
    }

    /// Skips an empty loop up to its closing `}`. A `}` inside a `//`
    /// comment does not end the loop.
    fn skip_loop_body(&mut self) -> SimResult<()> {
        let mut prev_slash = false;
        loop {
            match self.cursor.next_byte()? {
                None => return Err(self.eof(EofContext::UnfinishedLoop)),
                Some(b'}') => return Ok(()),
                Some(b'/') if prev_slash => {
                    self.cursor.skip_past(b'\n')?;
                    prev_slash = false;
                }
                Some(b) => prev_slash = b == b'/',
            }
        }
    }

    fn close_loop(&mut self, line: usize) -> SimResult<()> {
        if let Some(body) = self.state.close_iteration(line)? {
            self.cursor.seek_to_mark(&body)?;
        }
        Ok(())
    }
}

/// Interprets `source` against `circuit` in one call.
pub fn interpret<R, C>(source: R, circuit: &mut C) -> SimResult<ParserState>
where
    R: Read + Seek,
    C: QuantumCircuit + ?Sized,
{
    Interpreter::new(source, circuit).run()
}
