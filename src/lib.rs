//! TAP Solver Library
//!
//! Heuristic solvers for the Travelling Analyst Problem (TAP): pick and order
//! a subset of candidate queries to maximize total interest while keeping the
//! total execution time and the travel distance along the path within budget.
//!
//! # Features
//!
//! - Greedy construction (ratio insertion, weighted cheapest insertion) with 2-opt repair
//! - Interest-ordered baseline
//! - Permutation-encoded Genetic Algorithm with prefix decoding
//! - Reference data loading, comparison tables and benchmarking
//!
//! # Example
//!
//! ```no_run
//! use tap_solver::instance::TapInstance;
//! use tap_solver::heuristics::construction::{ConstructionHeuristic, GreedyOrchestrator};
//! use tap_solver::heuristics::genetic::{GAConfig, GeneticAlgorithm};
//!
//! let instance = TapInstance::from_file("tap_1_20.dat", 25.0, 35.0).unwrap();
//!
//! let greedy = GreedyOrchestrator::new().construct(&instance);
//! println!("Greedy interest: {:.2}", greedy.interest);
//!
//! let config = GAConfig { seed: Some(42), ..Default::default() };
//! let ga = GeneticAlgorithm::new(&instance, config).run();
//! println!("GA interest: {:.2}", ga.interest);
//! ```

pub mod benchmark;
pub mod error;
pub mod evaluation;
pub mod heuristics;
pub mod instance;
pub mod route;
pub mod solution;

pub use error::{Result, TapError};
pub use heuristics::construction::greedy_solve;
pub use heuristics::genetic::{genetic_solve, genetic_solve_with_rng};
pub use instance::TapInstance;
pub use solution::Solution;
