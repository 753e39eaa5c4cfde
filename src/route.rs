//! Path builder used by the constructive heuristics.
//!
//! A [`Route`] is a feasible, duplicate-free path bound to its instance,
//! together with its cumulative time and distance. Edits consume the route
//! and hand back the edited one, so every construction stage is a plain
//! function from route to route.

use crate::heuristics::insertion::insertion_distance_delta;
use crate::instance::TapInstance;

/// Relative band around a budget inside which incremental totals are not
/// trusted and the exact totals of the edited path are recomputed
const ROUNDING_BAND: f64 = 1e-9;

/// `Some(fits)` when `value` is clearly on one side of `budget`
fn clearly_within(value: f64, budget: f64) -> Option<bool> {
    let band = ROUNDING_BAND * budget.abs().max(1.0);
    if value > budget + band {
        Some(false)
    } else if value < budget - band {
        Some(true)
    } else {
        None
    }
}

#[derive(Debug, Clone)]
pub struct Route<'a> {
    instance: &'a TapInstance,
    nodes: Vec<usize>,
    visited: Vec<bool>,
    time: f64,
    distance: f64,
}

impl<'a> Route<'a> {
    pub fn empty(instance: &'a TapInstance) -> Self {
        Route {
            instance,
            nodes: Vec::new(),
            visited: vec![false; instance.size],
            time: 0.0,
            distance: 0.0,
        }
    }

    pub fn instance(&self) -> &'a TapInstance {
        self.instance
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn interest(&self) -> f64 {
        self.instance.solution_interest(&self.nodes)
    }

    pub fn contains(&self, query: usize) -> bool {
        self.visited[query]
    }

    /// Queries not on the route, in ascending index order
    pub fn unvisited(&self) -> impl Iterator<Item = usize> + '_ {
        self.visited
            .iter()
            .enumerate()
            .filter(|(_, &v)| !v)
            .map(|(q, _)| q)
    }

    /// Marginal distance of inserting `query` before position `pos`
    pub fn insertion_delta(&self, query: usize, pos: usize) -> f64 {
        insertion_distance_delta(self.instance, &self.nodes, query, pos)
    }

    /// Queries of the route with `query` inserted before `pos`
    fn nodes_with(&self, query: usize, pos: usize) -> impl Iterator<Item = usize> + '_ {
        self.nodes[..pos]
            .iter()
            .copied()
            .chain(std::iter::once(query))
            .chain(self.nodes[pos..].iter().copied())
    }

    /// Exact `(time, distance)` of the route with `query` inserted before `pos`,
    /// equal to what [`TapInstance::solution_time`] and
    /// [`TapInstance::solution_distance`] return for that path.
    pub fn totals_with(&self, query: usize, pos: usize) -> (f64, f64) {
        (
            self.instance.sequence_time(self.nodes_with(query, pos)),
            self.instance.sequence_distance(self.nodes_with(query, pos)),
        )
    }

    /// Whether inserting `query` at `pos` keeps both budgets.
    ///
    /// The incremental totals decide when they are clearly inside or outside
    /// a budget; near a budget the edited path is summed exactly.
    pub fn can_insert(&self, query: usize, pos: usize) -> bool {
        if self.visited[query] {
            return false;
        }
        let inst = self.instance;
        let time = self.time + inst.time[query];
        let distance = self.distance + self.insertion_delta(query, pos);
        match (
            clearly_within(time, inst.epsilon_t),
            clearly_within(distance, inst.epsilon_d),
        ) {
            (Some(false), _) | (_, Some(false)) => false,
            (Some(true), Some(true)) => true,
            _ => {
                let (time, distance) = self.totals_with(query, pos);
                inst.is_feasible(time, distance)
            }
        }
    }

    pub fn can_append(&self, query: usize) -> bool {
        self.can_insert(query, self.nodes.len())
    }

    /// Insert `query` before position `pos`. Callers check feasibility first.
    /// The stored totals are recomputed over the new path.
    #[must_use]
    pub fn with_inserted(mut self, query: usize, pos: usize) -> Self {
        debug_assert!(!self.visited[query], "query {} already on the route", query);
        let (time, distance) = self.totals_with(query, pos);
        self.time = time;
        self.distance = distance;
        self.nodes.insert(pos, query);
        self.visited[query] = true;
        self
    }

    #[must_use]
    pub fn with_appended(self, query: usize) -> Self {
        let pos = self.nodes.len();
        self.with_inserted(query, pos)
    }

    /// Two-edge delta of reversing `nodes[lo..=hi]`, i.e. replacing the edges
    /// `(lo-1, lo)` and `(hi, hi+1)` by `(lo-1, hi)` and `(lo, hi+1)`.
    ///
    /// Requires `1 <= lo <= hi < len - 1`.
    pub fn reversal_delta(&self, lo: usize, hi: usize) -> f64 {
        let inst = self.instance;
        let a = self.nodes[lo - 1];
        let b = self.nodes[lo];
        let c = self.nodes[hi];
        let d = self.nodes[hi + 1];
        inst.distance(a, c) + inst.distance(b, d) - inst.distance(a, b) - inst.distance(c, d)
    }

    /// Reverse `nodes[lo..=hi]` if the result is shorter and still within the
    /// distance budget. Returns the route unchanged in `Err` otherwise.
    pub fn try_reversed(self, lo: usize, hi: usize) -> Result<Self, Self> {
        let mut nodes = self.nodes.clone();
        nodes[lo..=hi].reverse();
        let distance = self.instance.solution_distance(&nodes);
        let time = self.instance.solution_time(&nodes);
        if distance < self.distance && self.instance.is_feasible(time, distance) {
            Ok(Route {
                nodes,
                time,
                distance,
                ..self
            })
        } else {
            Err(self)
        }
    }

    pub fn into_path(self) -> Vec<usize> {
        self.nodes
    }
}
