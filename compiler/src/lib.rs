// compiler/src/lib.rs
pub mod circuit;
pub mod cursor;
pub mod error;
pub mod histogram;
pub mod interpreter;
pub mod lexer;
pub mod sampler;
pub mod simulator;

pub use circuit::{DryRun, Gate, QuantumCircuit};
pub use error::{SimError, SimResult};
pub use histogram::MeasurementHistogram;
pub use interpreter::{interpret, CircuitStats, Interpreter, ParserState};
pub use sampler::{measure_all, ReportFormat, Sampler};
pub use simulator::StateVector;

use std::io::{Read, Seek, Write};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options for a full interpret-then-sample run.
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Sample the final state when the description measures it.
    pub measure: bool,
    pub samples: u64,
    pub format: ReportFormat,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            measure: false,
            samples: sampler::DEFAULT_SAMPLES,
            format: ReportFormat::Text,
        }
    }
}

/// Interprets `source` on `circuit` and, if requested and the description
/// measures every qubit in order, writes the sampled report to `output`.
///
/// A measurement pattern other than `measure q[i] -> c[i]` for every qubit is
/// rejected before any sample is drawn.
pub fn run<R, C, W>(source: R, circuit: &mut C, output: &mut W, options: &RunOptions) -> SimResult<ParserState>
where
    R: Read + Seek,
    C: QuantumCircuit + ?Sized,
    W: Write,
{
    run_with(source, circuit, output, options, &Sampler::new(options.samples))
}

/// Like [`run`], with a caller-configured [`Sampler`].
pub fn run_with<R, C, W>(
    source: R,
    circuit: &mut C,
    output: &mut W,
    options: &RunOptions,
    sampler: &Sampler,
) -> SimResult<ParserState>
where
    R: Read + Seek,
    C: QuantumCircuit + ?Sized,
    W: Write,
{
    let state = interpret(source, circuit)?;

    if options.measure && state.is_measure() {
        state.ensure_full_measurement()?;
        let qubits = state.qubit_count().unwrap_or(0);
        sampler.run(circuit, qubits, output, options.format)?;
    }
    Ok(state)
}
