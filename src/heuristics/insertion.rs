//! Insertion primitives shared by the greedy constructors.

use crate::instance::TapInstance;
use crate::route::Route;

/// A candidate insertion found by a scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insertion {
    pub query: usize,
    pub position: usize,
    pub time_delta: f64,
    pub distance_delta: f64,
    pub score: f64,
}

/// Marginal distance of inserting `query` before position `pos` of `path`
/// (`pos == path.len()` appends). Existing queries keep their order.
pub fn insertion_distance_delta(instance: &TapInstance, path: &[usize], query: usize, pos: usize) -> f64 {
    if path.is_empty() {
        return 0.0;
    }
    if pos == 0 {
        return instance.distance(query, path[0]);
    }
    if pos == path.len() {
        return instance.distance(path[path.len() - 1], query);
    }
    let a = path[pos - 1];
    let b = path[pos];
    instance.distance(a, query) + instance.distance(query, b) - instance.distance(a, b)
}

/// Scan every unvisited query at every position and return the feasible
/// insertion with the highest score.
///
/// `score` receives `(query, time_delta, distance_delta)`. Queries are scanned
/// in ascending order and positions front to back; the first candidate wins
/// ties. NaN scores are never selected.
pub fn best_insertion<F>(route: &Route<'_>, score: F) -> Option<Insertion>
where
    F: Fn(usize, f64, f64) -> f64,
{
    let instance = route.instance();
    let mut best: Option<Insertion> = None;

    for query in route.unvisited() {
        let time_delta = instance.time[query];
        for pos in 0..=route.len() {
            if !route.can_insert(query, pos) {
                continue;
            }
            let distance_delta = route.insertion_delta(query, pos);
            let s = score(query, time_delta, distance_delta);
            if s.is_nan() {
                continue;
            }
            if best.map_or(true, |b| s > b.score) {
                best = Some(Insertion {
                    query,
                    position: pos,
                    time_delta,
                    distance_delta,
                    score: s,
                });
            }
        }
    }

    best
}

/// Feasible position of `query` with the smallest distance delta
pub fn cheapest_position(route: &Route<'_>, query: usize) -> Option<(usize, f64)> {
    if route.contains(query) {
        return None;
    }
    let mut best: Option<(usize, f64)> = None;
    for pos in 0..=route.len() {
        if !route.can_insert(query, pos) {
            continue;
        }
        let delta = route.insertion_delta(query, pos);
        if best.map_or(true, |(_, d)| delta < d) {
            best = Some((pos, delta));
        }
    }
    best
}
