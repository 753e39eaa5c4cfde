//! Heuristics module for the TAP.
//!
//! This module exports the greedy constructors, the 2-opt improvement and
//! the genetic algorithm.

pub mod construction;
pub mod genetic;
pub mod insertion;
pub mod local_search;

pub use construction::*;
pub use genetic::*;
pub use insertion::*;
pub use local_search::*;
