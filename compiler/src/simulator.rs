// compiler/src/simulator.rs - dense state-vector backend
use crate::circuit::{Gate, QuantumCircuit};
use crate::error::{SimError, SimResult};
use num_complex::Complex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4};

/// Largest register the dense backend will allocate (2^26 amplitudes, 1 GiB).
pub const MAX_QUBITS: u32 = 26;

pub struct StateVector {
    state: Vec<Complex<f64>>,
    num_qubits: u32,
    rng: StdRng,
    /// Cumulative outcome probabilities, rebuilt lazily after a gate.
    cdf: Option<Vec<f64>>,
}

impl StateVector {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Backend with reproducible sampling.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            state: vec![Complex::new(1.0, 0.0)],
            num_qubits: 0,
            rng,
            cdf: None,
        }
    }

    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[Complex<f64>] {
        &self.state
    }

    /// Probability of observing basis state `index` (qubit 0 is bit 0).
    pub fn probability(&self, index: usize) -> f64 {
        self.state.get(index).map_or(0.0, |a| a.norm_sqr())
    }

    fn check(&self, qubits: &[u32]) -> SimResult<()> {
        for (i, &q) in qubits.iter().enumerate() {
            if q >= self.num_qubits {
                return Err(SimError::Backend(format!(
                    "qubit {} does not exist in a {}-qubit state",
                    q, self.num_qubits
                )));
            }
            if qubits[..i].contains(&q) {
                return Err(SimError::Backend(format!("qubit {} used twice in one gate", q)));
            }
        }
        Ok(())
    }

    // --- Math Kernels ---

    /// Applies the 2x2 matrix `[[m00, m01], [m10, m11]]` to `target`.
    fn apply_single(&mut self, target: u32, m: [[Complex<f64>; 2]; 2]) {
        let bit = 1usize << target;
        for i in 0..self.state.len() {
            if i & bit == 0 {
                let j = i | bit;
                let a = self.state[i];
                let b = self.state[j];
                self.state[i] = m[0][0] * a + m[0][1] * b;
                self.state[j] = m[1][0] * a + m[1][1] * b;
            }
        }
    }

    fn apply_phase(&mut self, mask: usize, phase: Complex<f64>) {
        for (i, amp) in self.state.iter_mut().enumerate() {
            if i & mask == mask {
                *amp *= phase;
            }
        }
    }

    /// Flips `target` on every basis state where all `controls` bits are set.
    fn apply_controlled_x(&mut self, controls: usize, target: u32) {
        let bit = 1usize << target;
        for i in 0..self.state.len() {
            if i & controls == controls && i & bit == 0 {
                self.state.swap(i, i | bit);
            }
        }
    }

    fn apply_cswap(&mut self, control: u32, a: u32, b: u32) {
        let c = 1usize << control;
        let (ba, bb) = (1usize << a, 1usize << b);
        for i in 0..self.state.len() {
            // visit each |..1..0..> / |..0..1..> pair once
            if i & c != 0 && i & ba != 0 && i & bb == 0 {
                self.state.swap(i, (i & !ba) | bb);
            }
        }
    }

    fn cdf(&mut self) -> &[f64] {
        let state = &self.state;
        self.cdf.get_or_insert_with(|| {
            let mut acc = 0.0;
            state
                .iter()
                .map(|a| {
                    acc += a.norm_sqr();
                    acc
                })
                .collect()
        })
    }
}

impl Default for StateVector {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantumCircuit for StateVector {
    fn set_num_qubits(&mut self, n: u32) -> SimResult<()> {
        if n > MAX_QUBITS {
            return Err(SimError::Backend(format!(
                "{} qubits requested, the state-vector backend supports at most {}",
                n, MAX_QUBITS
            )));
        }
        self.state = vec![Complex::new(0.0, 0.0); 1usize << n];
        self.state[0] = Complex::new(1.0, 0.0);
        self.num_qubits = n;
        self.cdf = None;
        Ok(())
    }

    fn apply_gate(&mut self, gate: Gate) -> SimResult<()> {
        self.check(&gate.qubits())?;
        self.cdf = None;

        let zero = Complex::new(0.0, 0.0);
        let one = Complex::new(1.0, 0.0);
        let i = Complex::new(0.0, 1.0);
        match gate {
            Gate::X(q) => self.apply_controlled_x(0, q),
            Gate::Y(q) => self.apply_single(q, [[zero, -i], [i, zero]]),
            Gate::Z(q) => self.apply_phase(1 << q, -one),
            Gate::H(q) => {
                let h = Complex::new(FRAC_1_SQRT_2, 0.0);
                self.apply_single(q, [[h, h], [h, -h]]);
            }
            Gate::S(q) => self.apply_phase(1 << q, i),
            Gate::T(q) => self.apply_phase(1 << q, Complex::from_polar(1.0, FRAC_PI_4)),
            Gate::Cx { control, target } => self.apply_controlled_x(1 << control, target),
            Gate::Cz { control, target } => self.apply_phase((1 << control) | (1 << target), -one),
            Gate::Ccx { control1, control2, target } => {
                self.apply_controlled_x((1 << control1) | (1 << control2), target)
            }
            Gate::CSwap { control, target1, target2 } => self.apply_cswap(control, target1, target2),
        }
        Ok(())
    }

    /// Samples the full register without collapsing it, so repeated calls
    /// draw independent outcomes from the same final state.
    fn measure(&mut self) -> String {
        let n = self.num_qubits;
        let r: f64 = self.rng.gen();
        let cdf = self.cdf();
        let total = cdf.last().copied().unwrap_or(1.0);
        let index = cdf
            .partition_point(|&p| p <= r * total)
            .min(cdf.len().saturating_sub(1));

        (0..n)
            .map(|q| if index & (1 << q) != 0 { '1' } else { '0' })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn bell_pair_amplitudes() {
        let mut sv = StateVector::with_seed(7);
        sv.set_num_qubits(2).unwrap();
        sv.apply_gate(Gate::H(0)).unwrap();
        sv.apply_gate(Gate::Cx { control: 0, target: 1 }).unwrap();
        assert!(approx(sv.probability(0b00), 0.5));
        assert!(approx(sv.probability(0b11), 0.5));
        assert!(approx(sv.probability(0b01), 0.0));
        for _ in 0..50 {
            let outcome = sv.measure();
            assert!(outcome == "00" || outcome == "11", "unexpected {outcome}");
        }
    }

    #[test]
    fn outcome_lists_qubit_zero_first() {
        let mut sv = StateVector::with_seed(1);
        sv.set_num_qubits(3).unwrap();
        sv.apply_gate(Gate::X(0)).unwrap();
        assert_eq!(sv.measure(), "100");
    }

    #[test]
    fn toffoli_and_fredkin() {
        let mut sv = StateVector::with_seed(1);
        sv.set_num_qubits(3).unwrap();
        sv.apply_gate(Gate::X(0)).unwrap();
        sv.apply_gate(Gate::X(1)).unwrap();
        sv.apply_gate(Gate::Ccx { control1: 0, control2: 1, target: 2 }).unwrap();
        assert_eq!(sv.measure(), "111");
        sv.apply_gate(Gate::X(2)).unwrap();
        // control 0 set: swap qubits 1 and 2
        sv.apply_gate(Gate::CSwap { control: 0, target1: 1, target2: 2 }).unwrap();
        assert_eq!(sv.measure(), "101");
    }

    #[test]
    fn phase_gates_compose() {
        let mut sv = StateVector::with_seed(3);
        sv.set_num_qubits(1).unwrap();
        sv.apply_gate(Gate::H(0)).unwrap();
        for _ in 0..2 {
            sv.apply_gate(Gate::T(0)).unwrap();
        }
        sv.apply_gate(Gate::S(0)).unwrap();
        sv.apply_gate(Gate::Z(0)).unwrap();
        // T T S Z Z S S = S^4 = I, so the second H returns to |0>
        sv.apply_gate(Gate::Z(0)).unwrap();
        sv.apply_gate(Gate::S(0)).unwrap();
        sv.apply_gate(Gate::S(0)).unwrap();
        sv.apply_gate(Gate::H(0)).unwrap();
        assert!(approx(sv.probability(0), 1.0));
    }

    #[test]
    fn y_gate_flips_with_phase() {
        let mut sv = StateVector::with_seed(3);
        sv.set_num_qubits(1).unwrap();
        sv.apply_gate(Gate::Y(0)).unwrap();
        assert!(approx(sv.amplitudes()[1].im, 1.0));
        assert_eq!(sv.measure(), "1");
    }

    #[test]
    fn rejects_oversized_registers_and_bad_operands() {
        let mut sv = StateVector::with_seed(0);
        assert!(sv.set_num_qubits(MAX_QUBITS + 1).is_err());
        sv.set_num_qubits(2).unwrap();
        assert!(sv.apply_gate(Gate::X(2)).is_err());
        assert!(sv.apply_gate(Gate::Cx { control: 1, target: 1 }).is_err());
    }
}
