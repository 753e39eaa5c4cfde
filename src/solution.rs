//! Solution representation for the TAP.
//!
//! A solution is a path of distinct query indices with its derived metrics,
//! all computed through the instance's own aggregation functions.

use crate::instance::TapInstance;
use serde::{Deserialize, Serialize};

/// Represents a solution to the TAP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Ordered query indices
    pub path: Vec<usize>,
    /// Total interest collected
    pub interest: f64,
    /// Total execution time
    pub time: f64,
    /// Total travel distance
    pub distance: f64,
    /// Whether both budgets hold
    pub feasible: bool,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            path: Vec::new(),
            interest: 0.0,
            time: 0.0,
            distance: 0.0,
            feasible: true,
            algorithm: String::new(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Create a solution from a path
    pub fn from_path(instance: &TapInstance, path: Vec<usize>, algorithm: &str) -> Self {
        let mut solution = Solution {
            path,
            algorithm: algorithm.to_string(),
            ..Solution::new()
        };
        solution.validate(instance);
        solution
    }

    /// Recompute the derived metrics
    pub fn validate(&mut self, instance: &TapInstance) {
        self.interest = instance.solution_interest(&self.path);
        self.time = instance.solution_time(&self.path);
        self.distance = instance.solution_distance(&self.path);
        self.feasible = instance.is_valid_solution(&self.path);
    }

    /// Check that every index is in range and appears once
    pub fn is_elementary(&self, instance: &TapInstance) -> bool {
        let mut seen = vec![false; instance.size];
        for &q in &self.path {
            if q >= instance.size || seen[q] {
                return false;
            }
            seen[q] = true;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Interest: {:.2}", self.interest)?;
        writeln!(f, "  Time: {:.2}", self.time)?;
        writeln!(f, "  Distance: {:.2}", self.distance)?;
        writeln!(f, "  Feasible: {}", self.feasible)?;
        writeln!(f, "  Computation time: {:.4}s", self.computation_time)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        writeln!(f, "  Path: {:?}", self.path)
    }
}
