//! Module for parsing and representing TAP instances.
//!
//! An instance is a set of candidate queries, each with an interest and an
//! execution time, a (possibly asymmetric) distance matrix between queries,
//! and two budgets: total execution time and total travel distance.

use crate::error::{Result, TapError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Represents a complete TAP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TapInstance {
    /// Name of the instance (file name when loaded from disk)
    pub name: String,
    /// Number of queries
    pub size: usize,
    /// Interest of each query
    pub interest: Vec<f64>,
    /// Execution time of each query
    pub time: Vec<f64>,
    /// Distance matrix, `dist[i][j]` is the cost of moving from query i to query j
    pub dist: Vec<Vec<f64>>,
    /// Time budget
    pub epsilon_t: f64,
    /// Distance budget
    pub epsilon_d: f64,
}

impl TapInstance {
    /// Build an instance from raw data, checking that every array has the same size.
    pub fn new(
        name: impl Into<String>,
        interest: Vec<f64>,
        time: Vec<f64>,
        dist: Vec<Vec<f64>>,
        epsilon_t: f64,
        epsilon_d: f64,
    ) -> Result<Self> {
        let size = interest.len();
        if time.len() != size {
            return Err(TapError::invalid_instance(format!(
                "{} interest values but {} time values",
                size,
                time.len()
            )));
        }
        if dist.len() != size {
            return Err(TapError::invalid_instance(format!(
                "distance matrix has {} rows, expected {}",
                dist.len(),
                size
            )));
        }
        if let Some((row, r)) = dist.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(TapError::invalid_instance(format!(
                "distance row {} has {} columns, expected {}",
                row,
                r.len(),
                size
            )));
        }

        Ok(TapInstance {
            name: name.into(),
            size,
            interest,
            time,
            dist,
            epsilon_t,
            epsilon_d,
        })
    }

    /// Load an instance from a `.dat` file.
    ///
    /// The file holds whitespace-separated numbers: the number of queries N,
    /// then N interests, N execution times and the N×N distance matrix row by row.
    pub fn from_file<P: AsRef<Path>>(path: P, epsilon_t: f64, epsilon_d: f64) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(name, &text, epsilon_t, epsilon_d)
    }

    /// Parse the `.dat` format from a string. Tokens after the matrix are ignored.
    pub fn parse(name: impl Into<String>, text: &str, epsilon_t: f64, epsilon_d: f64) -> Result<Self> {
        let name = name.into();
        let mut tokens = text.split_whitespace();

        let size: usize = match tokens.next() {
            Some(tok) => tok
                .parse()
                .map_err(|_| TapError::parse(&name, format!("invalid query count '{}'", tok)))?,
            None => return Err(TapError::parse(&name, "empty instance file")),
        };

        let mut next_value = |what: &str, i: usize| -> Result<f64> {
            let tok = tokens
                .next()
                .ok_or_else(|| TapError::parse(&name, format!("missing {} #{}", what, i)))?;
            tok.parse()
                .map_err(|_| TapError::parse(&name, format!("invalid {} #{}: '{}'", what, i, tok)))
        };

        let interest = (0..size)
            .map(|i| next_value("interest", i))
            .collect::<Result<Vec<_>>>()?;
        let time = (0..size)
            .map(|i| next_value("time", i))
            .collect::<Result<Vec<_>>>()?;
        let mut dist = Vec::with_capacity(size);
        for i in 0..size {
            let row = (0..size)
                .map(|j| next_value("distance", i * size + j))
                .collect::<Result<Vec<_>>>()?;
            dist.push(row);
        }

        Self::new(name, interest, time, dist, epsilon_t, epsilon_d)
    }

    /// Get the distance from query i to query j
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.dist[i][j]
    }

    /// Budget check on cumulative time and distance
    #[inline]
    pub fn is_feasible(&self, time: f64, distance: f64) -> bool {
        time <= self.epsilon_t && distance <= self.epsilon_d
    }

    /// Total execution time of the queries in a path
    pub fn solution_time(&self, path: &[usize]) -> f64 {
        self.sequence_time(path.iter().copied())
    }

    /// Total travel distance along a path (no return leg)
    pub fn solution_distance(&self, path: &[usize]) -> f64 {
        self.sequence_distance(path.iter().copied())
    }

    /// Execution time summed left to right over any sequence of queries.
    /// Every time total in the crate goes through here so equal paths give
    /// bit-identical sums.
    pub fn sequence_time<I: IntoIterator<Item = usize>>(&self, queries: I) -> f64 {
        queries.into_iter().fold(0.0, |total, q| total + self.time[q])
    }

    /// Travel distance summed left to right over any sequence of queries
    pub fn sequence_distance<I: IntoIterator<Item = usize>>(&self, queries: I) -> f64 {
        let mut total = 0.0;
        let mut prev: Option<usize> = None;
        for q in queries {
            if let Some(p) = prev {
                total += self.distance(p, q);
            }
            prev = Some(q);
        }
        total
    }

    /// Total interest collected by a path
    pub fn solution_interest(&self, path: &[usize]) -> f64 {
        path.iter().map(|&q| self.interest[q]).sum()
    }

    /// Check that a path respects both budgets
    pub fn is_valid_solution(&self, path: &[usize]) -> bool {
        self.is_feasible(self.solution_time(path), self.solution_distance(path))
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let mut distances = Vec::with_capacity(self.size * self.size.saturating_sub(1));
        for i in 0..self.size {
            for j in 0..self.size {
                if i != j {
                    distances.push(self.distance(i, j));
                }
            }
        }
        let avg_distance = if distances.is_empty() {
            0.0
        } else {
            distances.iter().sum::<f64>() / distances.len() as f64
        };
        let max_distance = distances.iter().cloned().fold(0.0, f64::max);

        InstanceStatistics {
            name: self.name.clone(),
            size: self.size,
            epsilon_t: self.epsilon_t,
            epsilon_d: self.epsilon_d,
            total_interest: self.interest.iter().sum(),
            total_time: self.time.iter().sum(),
            avg_distance,
            max_distance,
            individually_feasible: self.time.iter().filter(|&&t| t <= self.epsilon_t).count(),
        }
    }
}

/// Statistics about a TAP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub size: usize,
    pub epsilon_t: f64,
    pub epsilon_d: f64,
    pub total_interest: f64,
    pub total_time: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
    /// Queries whose own execution time fits the time budget
    pub individually_feasible: usize,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Queries: {} ({} fit the time budget alone)", self.size, self.individually_feasible)?;
        writeln!(f, "  Epsilon T: {}", self.epsilon_t)?;
        writeln!(f, "  Epsilon D: {}", self.epsilon_d)?;
        writeln!(f, "  Total interest: {:.2}", self.total_interest)?;
        writeln!(f, "  Total time: {:.2}", self.total_time)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}
