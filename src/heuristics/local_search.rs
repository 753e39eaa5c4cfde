//! Local search improvement for partial TAP paths.
//!
//! Reordering never changes the set of visited queries, so only the travel
//! distance can improve; time and interest are order-independent.

use crate::route::Route;

/// Minimum two-edge gain for a reversal to be considered
pub const TWO_OPT_THRESHOLD: f64 = -1e-6;

/// Trait for local search improvement methods
pub trait LocalSearch {
    /// Return the improved route. Never increases the route's distance.
    fn improve<'a>(&self, route: Route<'a>) -> Route<'a>;
    fn name(&self) -> &str;
}

/// 2-Opt Local Search under the distance budget
///
/// For each pair of edges `(i, i+1)` and `(k, k+1)` the segment `[i+1, k]`
/// is reversed when the two-edge delta is below [`TWO_OPT_THRESHOLD`], the
/// recomputed distance is shorter and the distance budget still holds.
pub struct TwoOptSearch {
    /// Restart the scan from the first pair after every accepted move
    pub restart_on_improvement: bool,
    /// Routes shorter than this are left untouched
    pub min_len: usize,
}

impl TwoOptSearch {
    /// First-improvement search restarting from the top after each move
    pub fn new() -> Self {
        TwoOptSearch {
            restart_on_improvement: true,
            min_len: 0,
        }
    }

    /// Full sweeps until a sweep accepts nothing; skips routes under 4 queries
    pub fn sweeping() -> Self {
        TwoOptSearch {
            restart_on_improvement: false,
            min_len: 4,
        }
    }

    /// One pass over all edge pairs. Returns the route and whether it changed.
    fn sweep<'a>(&self, mut route: Route<'a>) -> (Route<'a>, bool) {
        let m = route.len();
        let mut changed = false;
        if m < 3 {
            return (route, false);
        }

        for i in 0..m - 2 {
            for k in i + 1..=m - 2 {
                if route.reversal_delta(i + 1, k) >= TWO_OPT_THRESHOLD {
                    continue;
                }
                match route.try_reversed(i + 1, k) {
                    Ok(next) => {
                        route = next;
                        changed = true;
                        if self.restart_on_improvement {
                            return (route, true);
                        }
                    }
                    Err(same) => route = same,
                }
            }
        }

        (route, changed)
    }
}

impl Default for TwoOptSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSearch for TwoOptSearch {
    fn improve<'a>(&self, mut route: Route<'a>) -> Route<'a> {
        if route.len() < self.min_len {
            return route;
        }

        let start = route.distance();
        let mut moves = 0usize;
        loop {
            let (next, changed) = self.sweep(route);
            route = next;
            if !changed {
                break;
            }
            moves += 1;
        }

        log::debug!(
            "{}: {} improving pass(es), distance {:.3} -> {:.3}",
            self.name(),
            moves,
            start,
            route.distance()
        );
        route
    }

    fn name(&self) -> &str {
        if self.restart_on_improvement {
            "2-Opt-FI"
        } else {
            "2-Opt-Sweep"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::TapInstance;

    /// Six points on a line at x = 0..5, symmetric distances
    fn line(epsilon_d: f64) -> TapInstance {
        let n = 6;
        let dist = (0..n)
            .map(|i| (0..n).map(|j| (i as f64 - j as f64).abs()).collect())
            .collect();
        TapInstance::new("line", vec![1.0; n], vec![1.0; n], dist, 100.0, epsilon_d).unwrap()
    }

    fn route_of<'a>(inst: &'a TapInstance, nodes: &[usize]) -> Route<'a> {
        nodes.iter().fold(Route::empty(inst), |r, &q| r.with_appended(q))
    }

    #[test]
    fn test_two_opt_untangles() {
        let inst = line(100.0);
        let route = route_of(&inst, &[0, 3, 2, 1, 4, 5]);
        let before = route.distance();

        let improved = TwoOptSearch::new().improve(route);
        assert_eq!(improved.nodes(), &[0, 1, 2, 3, 4, 5]);
        assert!(improved.distance() < before);
        assert!((improved.distance() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_opt_monotone_and_time_preserving() {
        let inst = line(100.0);
        for nodes in [
            vec![5, 0, 4, 1, 3, 2],
            vec![2, 4, 0, 5, 1],
            vec![1, 0],
            vec![3, 1, 5],
        ] {
            for search in [TwoOptSearch::new(), TwoOptSearch::sweeping()] {
                let route = route_of(&inst, &nodes);
                let (d0, t0) = (route.distance(), route.time());
                let mut before: Vec<usize> = route.nodes().to_vec();

                let improved = search.improve(route);
                assert!(improved.distance() <= d0 + 1e-12);
                assert_eq!(improved.time(), t0);

                let mut after = improved.nodes().to_vec();
                before.sort_unstable();
                after.sort_unstable();
                assert_eq!(before, after);
            }
        }
    }

    #[test]
    fn test_sweeping_skips_short_routes() {
        let inst = line(100.0);
        let route = route_of(&inst, &[2, 0, 1]);
        let improved = TwoOptSearch::sweeping().improve(route);
        assert_eq!(improved.nodes(), &[2, 0, 1]);
    }

    #[test]
    fn test_two_opt_on_asymmetric_matrix_terminates() {
        let dist = vec![
            vec![0.0, 1.0, 9.0, 2.0, 7.0],
            vec![4.0, 0.0, 1.0, 8.0, 3.0],
            vec![2.0, 6.0, 0.0, 1.0, 9.0],
            vec![5.0, 2.0, 7.0, 0.0, 1.0],
            vec![1.0, 9.0, 3.0, 4.0, 0.0],
        ];
        let inst = TapInstance::new("asym", vec![1.0; 5], vec![1.0; 5], dist, 10.0, 100.0).unwrap();
        let route = route_of(&inst, &[0, 2, 4, 1, 3]);
        let before = route.distance();
        let improved = TwoOptSearch::new().improve(route);
        assert!(improved.distance() <= before);
        assert!((improved.distance() - inst.solution_distance(improved.nodes())).abs() < 1e-9);
    }
}
