//! # Statevector Ansätze
//!
//! $$
//! |\psi(\theta)\rangle = \prod_{r} \Big[ \bigotimes_k R_y(\theta_{r,k}) \prod_{i<j} CZ_{ij} \Big]
//! \bigotimes_k R_y(\theta_{0,k}) |0\rangle^{\otimes n},\qquad
//! |\psi(\gamma,\beta)\rangle = \prod_{l} e^{-i\beta_l \sum_k X_k} e^{-i\gamma_l \hat H} |+\rangle^{\otimes n}
//! $$
//!
//! Exact simulation of the two parameterized circuits used by the heuristic solvers.
//! Amplitude `i` is basis state `i`, bit `k` of `i` being qubit (asset) `k`.

use std::sync::Arc;

use argmin::core::CostFunction;
use num_complex::Complex64;

/// Circuit family and its shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ansatz {
  /// `reps` blocks of full CZ entanglement followed by an RY layer, after an initial RY layer.
  HardwareEfficient { num_qubits: usize, reps: usize },
  /// `reps` alternating cost-phase and transverse-field mixer layers.
  Alternating { num_qubits: usize, reps: usize },
}

impl Ansatz {
  pub fn num_qubits(&self) -> usize {
    match *self {
      Ansatz::HardwareEfficient { num_qubits, .. } | Ansatz::Alternating { num_qubits, .. } => {
        num_qubits
      }
    }
  }

  pub fn num_params(&self) -> usize {
    match *self {
      Ansatz::HardwareEfficient { num_qubits, reps } => num_qubits * (reps + 1),
      Ansatz::Alternating { reps, .. } => 2 * reps,
    }
  }
}

/// Energy expectation of an ansatz over a fixed diagonal Hamiltonian.
#[derive(Clone, Debug)]
pub struct AnsatzCost {
  ansatz: Ansatz,
  energies: Arc<[f64]>,
  /// Energies scaled into `[-1, 1]` for the phase separator.
  phases: Arc<[f64]>,
}

impl AnsatzCost {
  /// `energies` must hold one value per basis state.
  pub fn new(ansatz: Ansatz, energies: Vec<f64>) -> Self {
    debug_assert_eq!(energies.len(), 1 << ansatz.num_qubits());
    let scale = energies.iter().fold(0.0_f64, |m, e| m.max(e.abs()));
    let scale = if scale > 0.0 { scale } else { 1.0 };
    let phases: Arc<[f64]> = energies.iter().map(|e| e / scale).collect();

    Self {
      ansatz,
      energies: energies.into(),
      phases,
    }
  }

  pub fn ansatz(&self) -> Ansatz {
    self.ansatz
  }

  pub fn num_params(&self) -> usize {
    self.ansatz.num_params()
  }

  pub fn energies(&self) -> &[f64] {
    &self.energies
  }

  /// Born probabilities of every basis state.
  pub fn probabilities(&self, params: &[f64]) -> Vec<f64> {
    match self.ansatz {
      Ansatz::HardwareEfficient { num_qubits, reps } => {
        hardware_efficient_state(num_qubits, reps, params)
          .into_iter()
          .map(|a| a * a)
          .collect()
      }
      Ansatz::Alternating { num_qubits, reps } => {
        alternating_state(num_qubits, reps, &self.phases, params)
          .into_iter()
          .map(|a| a.norm_sqr())
          .collect()
      }
    }
  }

  /// `⟨ψ|H|ψ⟩` in unscaled energy units.
  pub fn expectation(&self, params: &[f64]) -> f64 {
    self
      .probabilities(params)
      .iter()
      .zip(self.energies.iter())
      .map(|(p, e)| p * e)
      .sum()
  }
}

impl CostFunction for AnsatzCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
    Ok(self.expectation(x))
  }
}

/// Real amplitudes of the RY + CZ circuit. Missing parameters are read as zero.
fn hardware_efficient_state(n: usize, reps: usize, theta: &[f64]) -> Vec<f64> {
  let mut state = vec![0.0; 1 << n];
  state[0] = 1.0;
  let angle = |i: usize| theta.get(i).copied().unwrap_or(0.0);

  for q in 0..n {
    apply_ry(&mut state, q, angle(q));
  }
  for r in 1..=reps {
    for i in 0..n {
      for j in (i + 1)..n {
        apply_cz(&mut state, i, j);
      }
    }
    for q in 0..n {
      apply_ry(&mut state, q, angle(r * n + q));
    }
  }

  state
}

fn apply_ry(state: &mut [f64], qubit: usize, theta: f64) {
  let (s, c) = (theta / 2.0).sin_cos();
  let mask = 1 << qubit;
  for i in 0..state.len() {
    if i & mask == 0 {
      let j = i | mask;
      let (a0, a1) = (state[i], state[j]);
      state[i] = c * a0 - s * a1;
      state[j] = s * a0 + c * a1;
    }
  }
}

fn apply_cz(state: &mut [f64], a: usize, b: usize) {
  let mask = (1 << a) | (1 << b);
  for (i, amp) in state.iter_mut().enumerate() {
    if i & mask == mask {
      *amp = -*amp;
    }
  }
}

/// Complex amplitudes of the alternating-operator circuit; params are `[γ_1..γ_p, β_1..β_p]`.
fn alternating_state(n: usize, reps: usize, phases: &[f64], params: &[f64]) -> Vec<Complex64> {
  let dim = 1 << n;
  let amp = 1.0 / (dim as f64).sqrt();
  let mut state = vec![Complex64::new(amp, 0.0); dim];
  let param = |i: usize| params.get(i).copied().unwrap_or(0.0);

  for layer in 0..reps {
    let gamma = param(layer);
    let beta = param(reps + layer);

    for (a, h) in state.iter_mut().zip(phases) {
      *a *= Complex64::from_polar(1.0, -gamma * h);
    }
    for q in 0..n {
      apply_rx(&mut state, q, 2.0 * beta);
    }
  }

  state
}

fn apply_rx(state: &mut [Complex64], qubit: usize, theta: f64) {
  let (s, c) = (theta / 2.0).sin_cos();
  let mi_s = Complex64::new(0.0, -s);
  let mask = 1 << qubit;
  for i in 0..state.len() {
    if i & mask == 0 {
      let j = i | mask;
      let (a0, a1) = (state[i], state[j]);
      state[i] = a0 * c + a1 * mi_s;
      state[j] = a0 * mi_s + a1 * c;
    }
  }
}
