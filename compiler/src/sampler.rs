// sampler.rs - repeated end-of-circuit measurement
use crate::circuit::QuantumCircuit;
use crate::error::SimResult;
use crate::histogram::{MeasurementHistogram, OutcomeCount};
use indicatif::ProgressBar;
use serde::Serialize;
use std::io::Write;

pub const DEFAULT_SAMPLES: u64 = 1024;

/// Upper bound on the initial bucket array; the table grows on demand anyway.
const MAX_INITIAL_BUCKETS: usize = 1 << 20;

/// Report layout for sampled results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Serialize)]
pub struct SampleReport {
    pub samples: u64,
    pub results: Vec<OutcomeCount>,
}

/// Initial bucket count for a register of `qubits` qubits: `qubits²`.
pub fn initial_buckets(qubits: u32) -> usize {
    (qubits as usize)
        .saturating_mul(qubits as usize)
        .clamp(1, MAX_INITIAL_BUCKETS)
}

pub struct Sampler {
    samples: u64,
    progress: ProgressBar,
}

impl Sampler {
    pub fn new(samples: u64) -> Self {
        Self {
            samples,
            progress: ProgressBar::hidden(),
        }
    }

    /// Ticks `progress` once per sample.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        progress.set_length(self.samples);
        self.progress = progress;
        self
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Draws every sample sequentially and tallies the outcomes.
    pub fn sample<C: QuantumCircuit + ?Sized>(&self, circuit: &mut C, qubits: u32) -> MeasurementHistogram {
        let mut table = MeasurementHistogram::new(initial_buckets(qubits));
        for _ in 0..self.samples {
            let outcome = circuit.measure();
            table.lookup_or_insert(&outcome);
            self.progress.inc(1);
        }
        self.progress.finish_and_clear();
        table
    }

    /// Samples, writes the report in `format` and releases the table.
    pub fn run<C, W>(&self, circuit: &mut C, qubits: u32, output: &mut W, format: ReportFormat) -> SimResult<()>
    where
        C: QuantumCircuit + ?Sized,
        W: Write,
    {
        let table = self.sample(circuit, qubits);
        match format {
            ReportFormat::Text => table.print_all(output)?,
            ReportFormat::Json => {
                let report = SampleReport {
                    samples: self.samples,
                    results: table.outcomes(),
                };
                serde_json::to_writer_pretty(&mut *output, &report).map_err(std::io::Error::from)?;
                writeln!(output)?;
            }
        }
        output.flush()?;
        Ok(())
    }
}

/// Measures the whole register `samples` times and prints the tally.
pub fn measure_all<C, W>(samples: u64, output: &mut W, circuit: &mut C, qubits: u32) -> SimResult<()>
where
    C: QuantumCircuit + ?Sized,
    W: Write,
{
    Sampler::new(samples).run(circuit, qubits, output, ReportFormat::Text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::Gate;

    /// Cycles through a fixed list of outcomes.
    struct Scripted {
        outcomes: Vec<&'static str>,
        next: usize,
    }

    impl QuantumCircuit for Scripted {
        fn set_num_qubits(&mut self, _n: u32) -> SimResult<()> {
            Ok(())
        }

        fn apply_gate(&mut self, _gate: Gate) -> SimResult<()> {
            Ok(())
        }

        fn measure(&mut self) -> String {
            let outcome = self.outcomes[self.next % self.outcomes.len()];
            self.next += 1;
            outcome.to_string()
        }
    }

    #[test]
    fn bucket_heuristic_is_square_of_width() {
        assert_eq!(initial_buckets(0), 1);
        assert_eq!(initial_buckets(5), 25);
        assert_eq!(initial_buckets(u32::MAX), MAX_INITIAL_BUCKETS);
    }

    #[test]
    fn counts_sum_to_samples() {
        let mut circuit = Scripted { outcomes: vec!["001", "110", "001"], next: 0 };
        let table = Sampler::new(300).sample(&mut circuit, 3);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("001"), Some(200));
        assert_eq!(table.get("110"), Some(100));
        assert_eq!(table.total(), 300);
    }

    #[test]
    fn text_report() {
        let mut circuit = Scripted { outcomes: vec!["01"], next: 0 };
        let mut out = Vec::new();
        measure_all(4, &mut out, &mut circuit, 2).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Sampled results:\n    '10'    4\n");
    }

    #[test]
    fn json_report() {
        let mut circuit = Scripted { outcomes: vec!["011"], next: 0 };
        let mut out = Vec::new();
        Sampler::new(3)
            .run(&mut circuit, 3, &mut out, ReportFormat::Json)
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["samples"], 3);
        assert_eq!(value["results"][0]["outcome"], "110");
        assert_eq!(value["results"][0]["count"], 3);
    }

    #[test]
    fn zero_samples_prints_header_only() {
        let mut circuit = Scripted { outcomes: vec!["0"], next: 0 };
        let mut out = Vec::new();
        measure_all(0, &mut out, &mut circuit, 1).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Sampled results:\n");
        assert_eq!(circuit.next, 0);
    }
}
