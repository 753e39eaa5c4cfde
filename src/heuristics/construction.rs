//! Greedy construction heuristics for the TAP.
//!
//! Every heuristic grows a [`Route`] that stays within both budgets at each
//! step, so the path it returns is always feasible.

use crate::heuristics::insertion::{best_insertion, cheapest_position};
use crate::heuristics::local_search::{LocalSearch, TwoOptSearch};
use crate::instance::TapInstance;
use crate::route::Route;
use crate::solution::Solution;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;

/// Added to FastGreedy's insertion cost so zero-cost candidates stay finite
pub const COST_EPSILON: f64 = 1e-9;

pub trait ConstructionHeuristic {
    fn construct(&self, instance: &TapInstance) -> Solution;
    fn name(&self) -> &str;
}

/// Index with the best `interest / time` ratio among `candidates`.
/// Strict comparison: the first maximum wins. Undefined ratios (0/0) are skipped.
fn best_ratio_seed(instance: &TapInstance, candidates: impl Iterator<Item = usize>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for q in candidates {
        let ratio = instance.interest[q] / instance.time[q];
        if ratio.is_nan() {
            continue;
        }
        if best.map_or(true, |(_, r)| ratio > r) {
            best = Some((q, ratio));
        }
    }
    best.map(|(q, _)| q)
}

fn finish(instance: &TapInstance, path: Vec<usize>, name: &str, start: std::time::Instant) -> Solution {
    let mut solution = Solution::from_path(instance, path, name);
    solution.computation_time = start.elapsed().as_secs_f64();
    solution
}

/// Interest-ordered baseline
///
/// Walks the queries by decreasing interest and appends each one that still
/// fits both budgets.
pub struct InterestGreedy;

impl InterestGreedy {
    pub fn new() -> Self {
        InterestGreedy
    }

    pub fn build<'a>(&self, instance: &'a TapInstance) -> Route<'a> {
        let mut order: Vec<usize> = (0..instance.size).collect();
        order.sort_by_key(|&q| Reverse(OrderedFloat(instance.interest[q])));

        order.into_iter().fold(Route::empty(instance), |route, q| {
            if route.can_append(q) {
                route.with_appended(q)
            } else {
                route
            }
        })
    }
}

impl Default for InterestGreedy {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for InterestGreedy {
    fn construct(&self, instance: &TapInstance) -> Solution {
        let start = std::time::Instant::now();
        let path = self.build(instance).into_path();
        finish(instance, path, self.name(), start)
    }

    fn name(&self) -> &str {
        "InterestGreedy"
    }
}

/// Cost-ratio insertion heuristic
///
/// Seeds with the best interest/time query that fits the time budget, then
/// repeatedly commits the best `interest / (Δtime + Δdistance)` insertion
/// over all queries and positions, untangles with 2-opt and finally appends
/// whatever still fits in index order.
pub struct FastGreedy {
    pub local_search: TwoOptSearch,
}

impl FastGreedy {
    pub fn new() -> Self {
        FastGreedy {
            local_search: TwoOptSearch::new(),
        }
    }

    pub fn seed(&self, instance: &TapInstance) -> Option<usize> {
        best_ratio_seed(
            instance,
            (0..instance.size).filter(|&q| instance.time[q] <= instance.epsilon_t),
        )
    }

    pub fn insert_greedily<'a>(&self, mut route: Route<'a>) -> Route<'a> {
        let instance = route.instance();
        while let Some(ins) = best_insertion(&route, |q, dt, dd| {
            instance.interest[q] / (dt + dd + COST_EPSILON)
        }) {
            route = route.with_inserted(ins.query, ins.position);
        }
        route
    }

    pub fn append_tail<'a>(&self, route: Route<'a>) -> Route<'a> {
        let remaining: Vec<usize> = route.unvisited().collect();
        remaining.into_iter().fold(route, |route, q| {
            if route.can_append(q) {
                route.with_appended(q)
            } else {
                route
            }
        })
    }

    pub fn build<'a>(&self, instance: &'a TapInstance) -> Route<'a> {
        let Some(seed) = self.seed(instance) else {
            log::debug!("{}: no query fits the time budget", self.name());
            return Route::empty(instance);
        };

        let route = Route::empty(instance).with_appended(seed);
        let route = self.insert_greedily(route);
        let inserted = route.len();
        let route = self.local_search.improve(route);
        let route = self.append_tail(route);

        log::debug!(
            "{}: seed {}, {} inserted, {} after tail append",
            self.name(),
            seed,
            inserted,
            route.len()
        );
        route
    }
}

impl Default for FastGreedy {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for FastGreedy {
    fn construct(&self, instance: &TapInstance) -> Solution {
        let start = std::time::Instant::now();
        let path = self.build(instance).into_path();
        finish(instance, path, self.name(), start)
    }

    fn name(&self) -> &str {
        "FastGreedy"
    }
}

/// Normalized-cost insertion heuristic with a baseline fallback
///
/// Time and distance deltas are weighted by the inverse of their budgets so
/// both constraints are consumed on the same scale. The result is compared
/// with the [`InterestGreedy`] baseline and the better of the two is kept.
pub struct EnhancedGreedy {
    pub local_search: TwoOptSearch,
    pub baseline: InterestGreedy,
}

impl EnhancedGreedy {
    pub fn new() -> Self {
        EnhancedGreedy {
            local_search: TwoOptSearch::sweeping(),
            baseline: InterestGreedy::new(),
        }
    }

    /// Budget weights `(wT, wD)`
    pub fn weights(instance: &TapInstance) -> (f64, f64) {
        (
            1.0 / instance.epsilon_t.max(COST_EPSILON),
            1.0 / instance.epsilon_d.max(COST_EPSILON),
        )
    }

    /// Best interest/time ratio over all queries, including those that do not
    /// fit the time budget on their own.
    pub fn seed(&self, instance: &TapInstance) -> Option<usize> {
        best_ratio_seed(instance, 0..instance.size)
    }

    pub fn insert_greedily<'a>(&self, mut route: Route<'a>) -> Route<'a> {
        let instance = route.instance();
        let (wt, wd) = Self::weights(instance);
        while let Some(ins) = best_insertion(&route, |q, dt, dd| {
            instance.interest[q] / (dt * wt + dd * wd).max(COST_EPSILON)
        }) {
            route = route.with_inserted(ins.query, ins.position);
        }
        route
    }

    /// One pass over the leftovers by decreasing interest, each at its
    /// cheapest feasible position.
    pub fn insert_leftovers<'a>(&self, route: Route<'a>) -> Route<'a> {
        let instance = route.instance();
        let mut leftovers: Vec<usize> = route.unvisited().collect();
        leftovers.sort_by_key(|&q| Reverse(OrderedFloat(instance.interest[q])));

        leftovers.into_iter().fold(route, |route, q| match cheapest_position(&route, q) {
            Some((pos, _)) => route.with_inserted(q, pos),
            None => route,
        })
    }

    /// Constructive phase alone, without the baseline fallback
    pub fn build<'a>(&self, instance: &'a TapInstance) -> Route<'a> {
        let Some(seed) = self.seed(instance) else {
            return Route::empty(instance);
        };
        let empty = Route::empty(instance);
        if !empty.can_append(seed) {
            log::debug!(
                "{}: seed {} exceeds the time budget on its own, construction yields nothing",
                self.name(),
                seed
            );
            return empty;
        }

        let route = empty.with_appended(seed);
        let route = self.insert_greedily(route);
        let route = self.insert_leftovers(route);
        self.local_search.improve(route)
    }
}

impl Default for EnhancedGreedy {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for EnhancedGreedy {
    fn construct(&self, instance: &TapInstance) -> Solution {
        let start = std::time::Instant::now();

        let built = self.build(instance);
        let fallback = self.baseline.build(instance);
        let (built_score, fallback_score) = (built.interest(), fallback.interest());

        let path = if fallback_score > built_score {
            log::debug!(
                "{}: baseline {:.2} beats construction {:.2}",
                self.name(),
                fallback_score,
                built_score
            );
            fallback.into_path()
        } else {
            built.into_path()
        };

        finish(instance, path, self.name(), start)
    }

    fn name(&self) -> &str {
        "EnhancedGreedy"
    }
}

/// Runs [`FastGreedy`] and [`EnhancedGreedy`] and keeps the higher interest.
/// FastGreedy wins ties.
pub struct GreedyOrchestrator {
    pub fast: FastGreedy,
    pub enhanced: EnhancedGreedy,
}

impl GreedyOrchestrator {
    pub fn new() -> Self {
        GreedyOrchestrator {
            fast: FastGreedy::new(),
            enhanced: EnhancedGreedy::new(),
        }
    }

    /// Pick between two already computed solutions
    pub fn select(fast: Solution, enhanced: Solution) -> Solution {
        if enhanced.interest > fast.interest {
            enhanced
        } else {
            fast
        }
    }
}

impl Default for GreedyOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for GreedyOrchestrator {
    fn construct(&self, instance: &TapInstance) -> Solution {
        let start = std::time::Instant::now();
        let fast = self.fast.construct(instance);
        let enhanced = self.enhanced.construct(instance);

        log::info!(
            "{}: FastGreedy {:.2}, EnhancedGreedy {:.2}",
            instance.name,
            fast.interest,
            enhanced.interest
        );

        let mut best = Self::select(fast, enhanced);
        best.computation_time = start.elapsed().as_secs_f64();
        best
    }

    fn name(&self) -> &str {
        "Greedy"
    }
}

/// Greedy entry point: best of FastGreedy and EnhancedGreedy
pub fn greedy_solve(instance: &TapInstance) -> Vec<usize> {
    GreedyOrchestrator::new().construct(instance).path
}
