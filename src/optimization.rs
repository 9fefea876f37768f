//! # Optimization
//!
//! $$
//! \min_{x \in \{0,1\}^n} q\,x^\top \Sigma x - \mu^\top x \quad \text{s.t.}\quad \sum_k x_k = B
//! $$
//!
//! Budget-constrained mean-variance asset selection and its interchangeable solvers.

pub mod engine;
pub mod objective;
pub mod optimizer;
pub mod selection;
pub mod solvers;
pub mod statevector;

pub use engine::SelectionEngine;
pub use engine::SelectionEngineConfig;
pub use objective::QuadraticProgram;
pub use objective::build_objective;
pub use optimizer::AnnealingOptimizer;
pub use optimizer::AnsatzOptimizer;
pub use optimizer::NelderMeadOptimizer;
pub use optimizer::OptimizerStrategy;
pub use selection::Selection;
pub use solvers::AlternatingLayerConfig;
pub use solvers::AlternatingLayerSolver;
pub use solvers::ExactSolver;
pub use solvers::Solver;
pub use solvers::SolverBackend;
pub use solvers::SolverResult;
pub use solvers::VariationalConfig;
pub use solvers::VariationalSolver;
