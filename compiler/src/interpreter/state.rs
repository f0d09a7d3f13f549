// interpreter/state.rs - state threaded through the command interpreter
use crate::cursor::Mark;
use crate::error::{SimError, SimResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No `qreg` seen yet.
    AwaitingDeclaration,
    Ready,
    InLoop,
}

/// An active `for` loop: how many more times the body runs and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopContext {
    pub remaining: u64,
    pub body: Mark,
}

/// Counters collected while interpreting a description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CircuitStats {
    pub qubits: u32,
    pub gates: usize,
    pub measurements: usize,
    pub loop_iterations: u64,
}

impl CircuitStats {
    pub fn total_operations(&self) -> usize {
        self.gates + self.measurements
    }
}

#[derive(Debug, Default)]
pub struct ParserState {
    qubit_count: Option<u32>,
    /// Classical bit each measured qubit is written into. Sparse, so a wide
    /// register costs nothing until its qubits are measured.
    measure_targets: BTreeMap<u32, u32>,
    is_measure: bool,
    active_loop: Option<LoopContext>,
    stats: CircuitStats,
}

impl ParserState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match (self.qubit_count, self.active_loop) {
            (None, _) => Phase::AwaitingDeclaration,
            (Some(_), None) => Phase::Ready,
            (Some(_), Some(_)) => Phase::InLoop,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.qubit_count.is_some()
    }

    pub fn qubit_count(&self) -> Option<u32> {
        self.qubit_count
    }

    /// Records the register width. A second declaration is rejected.
    pub fn declare(&mut self, n: u32, line: usize) -> SimResult<()> {
        if self.qubit_count.is_some() {
            return Err(SimError::RegisterRedeclared { line });
        }
        self.qubit_count = Some(n);
        self.stats.qubits = n;
        Ok(())
    }

    /// Fails unless `index` addresses a declared qubit.
    pub fn check_qubit(&self, index: u32, line: usize) -> SimResult<u32> {
        match self.qubit_count {
            Some(count) if index < count => Ok(index),
            Some(count) => Err(SimError::QubitOutOfRange { line, index, count }),
            None => Err(SimError::NotInitialized { line }),
        }
    }

    pub fn record_measure(&mut self, qubit: u32, cbit: u32) {
        self.is_measure = true;
        self.measure_targets.insert(qubit, cbit);
        self.stats.measurements += 1;
    }

    pub fn record_gate(&mut self) {
        self.stats.gates += 1;
    }

    pub fn is_measure(&self) -> bool {
        self.is_measure
    }

    /// Classical bit `qubit` was last measured into.
    pub fn measure_target(&self, qubit: u32) -> Option<u32> {
        self.measure_targets.get(&qubit).copied()
    }

    /// True when every qubit `i` is measured into classical bit `i`.
    pub fn is_full_ordered_measurement(&self) -> bool {
        let count = self.qubit_count.unwrap_or(0);
        self.measure_targets.len() == count as usize
            && self.measure_targets.iter().all(|(qubit, cbit)| qubit == cbit)
    }

    /// Rejects any measurement pattern other than the identity mapping.
    pub fn ensure_full_measurement(&self) -> SimResult<()> {
        if self.is_full_ordered_measurement() {
            Ok(())
        } else {
            Err(SimError::UnsupportedMeasurement)
        }
    }

    pub fn active_loop(&self) -> Option<&LoopContext> {
        self.active_loop.as_ref()
    }

    pub fn enter_loop(&mut self, remaining: u64, body: Mark) {
        self.active_loop = Some(LoopContext { remaining, body });
        self.stats.loop_iterations += 1;
    }

    /// Closes one pass over the loop body. Returns the bookmark to rewind to
    /// when another pass is due, `None` once the loop is finished.
    pub fn close_iteration(&mut self, line: usize) -> SimResult<Option<Mark>> {
        let ctx = self
            .active_loop
            .as_mut()
            .ok_or(SimError::UnmatchedLoopEnd { line })?;
        ctx.remaining -= 1;
        if ctx.remaining == 0 {
            self.active_loop = None;
            Ok(None)
        } else {
            self.stats.loop_iterations += 1;
            Ok(Some(ctx.body))
        }
    }

    pub fn stats(&self) -> CircuitStats {
        self.stats
    }
}
