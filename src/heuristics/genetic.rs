//! Genetic Algorithm for the TAP.
//!
//! Individuals are permutations of all queries. A permutation is decoded into
//! a path by taking its longest prefix that fits both budgets, and its
//! fitness is the interest of that prefix. The search uses tournament
//! selection, order crossover (OX), swap mutation and full generational
//! replacement, keeping the best permutation ever seen on the side.

use crate::instance::TapInstance;
use crate::solution::Solution;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Fitness of a permutation whose decoded path is empty or invalid
pub const INVALID_FITNESS: f64 = -1e9;

/// Decode a permutation into its longest feasible prefix.
///
/// Decoding stops at the first query that would break either budget; later
/// genes are dropped even if they would fit.
pub fn decode(instance: &TapInstance, genes: &[usize]) -> Vec<usize> {
    let mut path = Vec::with_capacity(genes.len());
    let mut time = 0.0;
    let mut distance = 0.0;

    for &q in genes {
        let travel = path.last().map_or(0.0, |&last| instance.distance(last, q));
        if !instance.is_feasible(time + instance.time[q], distance + travel) {
            break;
        }
        path.push(q);
        time += instance.time[q];
        distance += travel;
    }

    path
}

/// Interest of the decoded path, or [`INVALID_FITNESS`]
pub fn evaluate(instance: &TapInstance, genes: &[usize]) -> f64 {
    let path = decode(instance, genes);
    if path.is_empty() || !instance.is_valid_solution(&path) {
        return INVALID_FITNESS;
    }
    instance.solution_interest(&path)
}

/// Order Crossover (OX) with fixed cut points `a <= b`.
///
/// The child keeps `first[a..=b]` in place; the other positions, starting at
/// `(b + 1) % n` and wrapping around, receive the genes of `second` read from
/// `(b + 1) % n` onwards, skipping genes already in the child.
pub fn order_crossover(first: &[usize], second: &[usize], a: usize, b: usize) -> Vec<usize> {
    let n = first.len();
    debug_assert!(a <= b && b < n);

    let mut child = first.to_vec();
    let mut used = vec![false; n];
    for &g in &first[a..=b] {
        used[g] = true;
    }

    let mut pos = (b + 1) % n;
    for i in 0..n {
        let g = second[(b + 1 + i) % n];
        if !used[g] {
            child[pos] = g;
            used[g] = true;
            pos = (pos + 1) % n;
        }
    }

    child
}

/// Swap two uniformly drawn positions (possibly the same one)
pub fn swap_mutation<R: Rng + ?Sized>(genes: &mut [usize], rng: &mut R) {
    let n = genes.len();
    if n == 0 {
        return;
    }
    let i = rng.gen_range(0..n);
    let j = rng.gen_range(0..n);
    genes.swap(i, j);
}

/// Individual in the genetic algorithm population
#[derive(Debug, Clone)]
pub struct Chromosome {
    /// Permutation of all query indices
    pub genes: Vec<usize>,
    /// Interest of the decoded prefix, higher is better
    pub fitness: f64,
}

impl Chromosome {
    pub fn new(genes: Vec<usize>, instance: &TapInstance) -> Self {
        let fitness = evaluate(instance, &genes);
        Chromosome { genes, fitness }
    }

    pub fn decode(&self, instance: &TapInstance) -> Vec<usize> {
        decode(instance, &self.genes)
    }
}

/// Genetic Algorithm configuration
#[derive(Debug, Clone)]
pub struct GAConfig {
    /// Population size
    pub population_size: usize,
    /// Number of generations, always run in full
    pub generations: usize,
    /// Probability that a mating pair is recombined
    pub crossover_prob: f64,
    /// Probability that a child gets one swap
    pub mutation_prob: f64,
    /// Tournament size for selection
    pub tournament_size: usize,
    /// Random seed, `None` draws one from OS entropy
    pub seed: Option<u64>,
}

impl Default for GAConfig {
    fn default() -> Self {
        GAConfig {
            population_size: 1000,
            generations: 200,
            crossover_prob: 0.8,
            mutation_prob: 0.2,
            tournament_size: 10,
            seed: None,
        }
    }
}

/// Genetic Algorithm implementation
pub struct GeneticAlgorithm<'a> {
    instance: &'a TapInstance,
    config: GAConfig,
}

impl<'a> GeneticAlgorithm<'a> {
    pub fn new(instance: &'a TapInstance, config: GAConfig) -> Self {
        GeneticAlgorithm { instance, config }
    }

    pub fn config(&self) -> &GAConfig {
        &self.config
    }

    /// Run with a generator seeded from the configuration
    pub fn run(&self) -> Solution {
        let mut rng = match self.config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        self.run_with_rng(&mut rng)
    }

    /// Run with a caller-supplied generator
    pub fn run_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Solution {
        let start = std::time::Instant::now();
        let n = self.instance.size;

        if n == 0 || self.config.population_size == 0 {
            let mut solution = Solution::from_path(self.instance, Vec::new(), "GeneticAlgorithm");
            solution.iterations = Some(0);
            return solution;
        }

        let mut population = self.initialize_population(rng);
        let mut best = self.fittest(&population).clone();

        for generation in 0..self.config.generations {
            population = self.next_generation(&population, rng);

            let champion = self.fittest(&population);
            if champion.fitness > best.fitness {
                best = champion.clone();
                log::debug!("[GA] gen {} new best fitness {:.2}", generation + 1, best.fitness);
            }
        }

        let path = best.decode(self.instance);
        let mut solution = Solution::from_path(self.instance, path, "GeneticAlgorithm");
        solution.computation_time = start.elapsed().as_secs_f64();
        solution.iterations = Some(self.config.generations);

        log::info!(
            "[GA] {}: {} generations, best interest {:.2} ({} queries) in {:.2}s",
            self.instance.name,
            self.config.generations,
            solution.interest,
            solution.len(),
            solution.computation_time
        );
        solution
    }

    /// Independent random shuffles of the identity permutation
    fn initialize_population<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Chromosome> {
        let identity: Vec<usize> = (0..self.instance.size).collect();
        (0..self.config.population_size)
            .map(|_| {
                let mut genes = identity.clone();
                genes.shuffle(rng);
                Chromosome::new(genes, self.instance)
            })
            .collect()
    }

    /// First individual with the highest fitness
    fn fittest<'p>(&self, population: &'p [Chromosome]) -> &'p Chromosome {
        let mut best = &population[0];
        for c in &population[1..] {
            if c.fitness > best.fitness {
                best = c;
            }
        }
        best
    }

    /// Tournament selection, draws with replacement
    fn tournament_select<'p, R: Rng + ?Sized>(&self, population: &'p [Chromosome], rng: &mut R) -> &'p Chromosome {
        let mut best_idx = rng.gen_range(0..population.len());

        for _ in 1..self.config.tournament_size {
            let idx = rng.gen_range(0..population.len());
            if population[idx].fitness > population[best_idx].fitness {
                best_idx = idx;
            }
        }

        &population[best_idx]
    }

    /// Recombine two parents into two children
    fn crossover<R: Rng + ?Sized>(&self, first: &[usize], second: &[usize], rng: &mut R) -> (Vec<usize>, Vec<usize>) {
        if rng.gen::<f64>() >= self.config.crossover_prob {
            return (first.to_vec(), second.to_vec());
        }

        let n = first.len();
        let mut a = rng.gen_range(0..n);
        let mut b = rng.gen_range(0..n);
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }

        (
            order_crossover(first, second, a, b),
            order_crossover(second, first, a, b),
        )
    }

    fn mutate<R: Rng + ?Sized>(&self, genes: &mut [usize], rng: &mut R) {
        if rng.gen::<f64>() < self.config.mutation_prob {
            swap_mutation(genes, rng);
        }
    }

    /// Build a full replacement population
    fn next_generation<R: Rng + ?Sized>(&self, population: &[Chromosome], rng: &mut R) -> Vec<Chromosome> {
        let size = self.config.population_size;
        let mut offspring = Vec::with_capacity(size);

        while offspring.len() < size {
            let first = self.tournament_select(population, rng);
            let second = self.tournament_select(population, rng);

            let (mut child1, mut child2) = self.crossover(&first.genes, &second.genes, rng);
            self.mutate(&mut child1, rng);
            self.mutate(&mut child2, rng);

            offspring.push(Chromosome::new(child1, self.instance));
            if offspring.len() < size {
                offspring.push(Chromosome::new(child2, self.instance));
            }
        }

        offspring
    }
}

/// Genetic entry point with the default configuration and an entropy-seeded generator
pub fn genetic_solve(instance: &TapInstance) -> Vec<usize> {
    GeneticAlgorithm::new(instance, GAConfig::default()).run().path
}

/// Genetic entry point with the default configuration and a caller-supplied generator
pub fn genetic_solve_with_rng<R: Rng + ?Sized>(instance: &TapInstance, rng: &mut R) -> Vec<usize> {
    GeneticAlgorithm::new(instance, GAConfig::default())
        .run_with_rng(rng)
        .path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(genes: &[usize], n: usize) -> bool {
        let mut sorted = genes.to_vec();
        sorted.sort_unstable();
        sorted == (0..n).collect::<Vec<_>>()
    }

    fn small_config(seed: u64) -> GAConfig {
        GAConfig {
            population_size: 60,
            generations: 30,
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Three queries where only pairs fit the time budget and 0-1 is too far apart
    fn pairs_only() -> TapInstance {
        TapInstance::new(
            "pairs",
            vec![5.0, 7.0, 4.0],
            vec![2.0, 2.0, 2.0],
            vec![
                vec![0.0, 50.0, 1.0],
                vec![50.0, 0.0, 1.0],
                vec![1.0, 1.0, 0.0],
            ],
            4.0,
            10.0,
        )
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = GAConfig::default();
        assert_eq!(config.population_size, 1000);
        assert_eq!(config.generations, 200);
        assert_eq!(config.crossover_prob, 0.8);
        assert_eq!(config.mutation_prob, 0.2);
        assert_eq!(config.tournament_size, 10);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_decode_truncates_at_first_violation() {
        let inst = pairs_only();
        // 1 fits, 0 breaks the distance budget, 2 would fit but is dropped
        assert_eq!(decode(&inst, &[1, 0, 2]), vec![1]);
        assert_eq!(decode(&inst, &[1, 2, 0]), vec![1, 2]);
        assert_eq!(decode(&inst, &[]), Vec::<usize>::new());
    }

    #[test]
    fn test_evaluate_sentinel_on_empty_decode() {
        let mut inst = pairs_only();
        inst.epsilon_t = 1.0;
        assert_eq!(evaluate(&inst, &[0, 1, 2]), INVALID_FITNESS);
        assert_eq!(evaluate(&pairs_only(), &[2, 1, 0]), 11.0);
    }

    #[test]
    fn test_order_crossover_example() {
        let p1 = [0, 1, 2, 3, 4, 5, 6, 7];
        let p2 = [7, 6, 5, 4, 3, 2, 1, 0];
        let child = order_crossover(&p1, &p2, 2, 4);

        assert_eq!(&child[2..=4], &[2, 3, 4]);
        // p2 read from position 5: 2 (kept) 1 0 7 6 5 4 (kept) 3 (kept)
        assert_eq!(child, vec![6, 5, 2, 3, 4, 1, 0, 7]);
    }

    #[test]
    fn test_order_crossover_full_segment_copies_parent() {
        let p1 = [3, 1, 0, 2];
        let p2 = [0, 1, 2, 3];
        assert_eq!(order_crossover(&p1, &p2, 0, 3), p1.to_vec());
    }

    #[test]
    fn test_order_crossover_keeps_permutations() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for n in 1..12 {
            for _ in 0..50 {
                let mut p1: Vec<usize> = (0..n).collect();
                let mut p2 = p1.clone();
                p1.shuffle(&mut rng);
                p2.shuffle(&mut rng);
                let mut a = rng.gen_range(0..n);
                let mut b = rng.gen_range(0..n);
                if a > b {
                    std::mem::swap(&mut a, &mut b);
                }
                assert!(is_permutation(&order_crossover(&p1, &p2, a, b), n));
                assert!(is_permutation(&order_crossover(&p2, &p1, a, b), n));
            }
        }
    }

    #[test]
    fn test_swap_mutation_keeps_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut genes: Vec<usize> = (0..10).collect();
        for _ in 0..100 {
            swap_mutation(&mut genes, &mut rng);
        }
        assert!(is_permutation(&genes, 10));

        let mut empty: Vec<usize> = Vec::new();
        swap_mutation(&mut empty, &mut rng);
    }

    #[test]
    fn test_single_query_instance() {
        let inst = TapInstance::new("one", vec![10.0], vec![5.0], vec![vec![0.0]], 5.0, 100.0).unwrap();
        let solution = GeneticAlgorithm::new(&inst, small_config(1)).run();
        assert_eq!(solution.path, vec![0]);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(genetic_solve_with_rng(&inst, &mut rng), vec![0]);
    }

    #[test]
    fn test_zero_time_budget_gives_empty_path() {
        let inst = TapInstance::new(
            "zero",
            vec![3.0, 4.0],
            vec![1.0, 2.0],
            vec![vec![0.0, 1.0], vec![1.0, 0.0]],
            0.0,
            10.0,
        )
        .unwrap();
        let solution = GeneticAlgorithm::new(&inst, small_config(5)).run();
        assert!(solution.path.is_empty());
        assert!(solution.feasible);
    }

    #[test]
    fn test_empty_instance() {
        let inst = TapInstance::new("empty", vec![], vec![], vec![], 1.0, 1.0).unwrap();
        assert!(genetic_solve(&inst).is_empty());
    }

    #[test]
    fn test_finds_best_pair() {
        let inst = pairs_only();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let path = genetic_solve_with_rng(&inst, &mut rng);

        assert!(inst.is_valid_solution(&path));
        assert_eq!(inst.solution_interest(&path), 11.0);
        let mut sorted = path.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2]);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let points: Vec<f64> = (0..12).map(|i| (i * 7 % 12) as f64).collect();
        let dist = points
            .iter()
            .map(|a| points.iter().map(|b| (a - b).abs()).collect())
            .collect();
        let inst = TapInstance::new(
            "repro",
            (0..12).map(|i| (i % 5 + 1) as f64).collect(),
            vec![1.0; 12],
            dist,
            6.0,
            15.0,
        )
        .unwrap();

        let first = GeneticAlgorithm::new(&inst, small_config(99)).run();
        let second = GeneticAlgorithm::new(&inst, small_config(99)).run();
        assert_eq!(first.path, second.path);
        assert!(first.feasible);
        assert!(first.is_elementary(&inst));
        assert_eq!(first.iterations, Some(30));
    }

    #[test]
    fn test_odd_population_size() {
        let inst = pairs_only();
        let config = GAConfig {
            population_size: 7,
            generations: 5,
            seed: Some(11),
            ..Default::default()
        };
        let ga = GeneticAlgorithm::new(&inst, config);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let population = ga.initialize_population(&mut rng);
        let next = ga.next_generation(&population, &mut rng);
        assert_eq!(next.len(), 7);
        assert!(next.iter().all(|c| is_permutation(&c.genes, 3)));
    }
}
