//! Benchmarking and experimentation module for the TAP.
//!
//! Runs the greedy constructors and seeded Genetic Algorithm runs over a set
//! of instance specs, collects one [`AlgorithmResult`] per run and aggregates
//! them per algorithm.

use crate::error::Result;
use crate::evaluation::InstanceSpec;
use crate::heuristics::construction::*;
use crate::heuristics::genetic::{GAConfig, GeneticAlgorithm};
use crate::instance::TapInstance;
use crate::solution::Solution;

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Number of queries in the instance
    pub size: usize,
    pub epsilon_time: f64,
    pub epsilon_distance: f64,
    /// Total interest of the returned path
    pub interest: f64,
    /// Execution time consumed by the path
    pub path_time: f64,
    /// Travel distance of the path
    pub path_distance: f64,
    /// Number of queries in the path
    pub path_len: usize,
    /// Both budgets hold and no query repeats
    pub feasible: bool,
    /// Computation time in seconds
    pub time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
    /// Seed of a stochastic run
    pub seed: Option<u64>,
}

/// Aggregated statistics for an algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub algorithm: String,
    /// Number of recorded runs
    pub num_runs: usize,
    /// Number of feasible runs
    pub num_feasible: usize,
    pub avg_interest: f64,
    /// Sample standard deviation, 0 for a single run
    pub std_interest: f64,
    pub best_interest: f64,
    pub worst_interest: f64,
    pub avg_time: f64,
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Directory holding the `.dat` files named by the specs
    pub instance_dir: PathBuf,
    /// Number of seeded GA runs per instance
    pub ga_runs: usize,
    /// Seed of the first GA run, later runs use `seed + k`
    pub seed: u64,
    /// Run the Genetic Algorithm at all
    pub run_genetic: bool,
    /// GA hyperparameters, the seed field is overridden per run
    pub ga_config: GAConfig,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
    /// Output directory
    pub output_dir: PathBuf,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            instance_dir: PathBuf::from("instances"),
            ga_runs: 5,
            seed: 0,
            run_genetic: true,
            ga_config: GAConfig::default(),
            show_progress: true,
            output_dir: PathBuf::from("results"),
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run every greedy constructor on an instance
    pub fn run_construction_heuristics(&mut self, instance: &TapInstance) {
        let heuristics: Vec<Box<dyn ConstructionHeuristic>> = vec![
            Box::new(GreedyOrchestrator::new()),
            Box::new(FastGreedy::new()),
            Box::new(EnhancedGreedy::new()),
            Box::new(InterestGreedy::new()),
        ];

        for heuristic in heuristics {
            let mut solution = heuristic.construct(instance);
            solution.algorithm = heuristic.name().to_string();
            self.record_result(instance, &solution, None);
        }
    }

    /// Run `ga_runs` seeded GA runs on an instance
    pub fn run_genetic(&mut self, instance: &TapInstance) {
        for k in 0..self.config.ga_runs {
            let seed = self.config.seed + k as u64;
            let config = GAConfig {
                seed: Some(seed),
                ..self.config.ga_config.clone()
            };
            let solution = GeneticAlgorithm::new(instance, config).run();
            self.record_result(instance, &solution, Some(seed));
        }
    }

    /// Run the configured algorithms on an instance
    pub fn run_instance(&mut self, instance: &TapInstance) {
        log::info!(
            "Running benchmark on instance: {} (N={}, eps_t={}, eps_d={})",
            instance.name,
            instance.size,
            instance.epsilon_t,
            instance.epsilon_d
        );

        self.run_construction_heuristics(instance);
        if self.config.run_genetic {
            self.run_genetic(instance);
        }
    }

    /// Load the instance a spec names and benchmark it
    pub fn run_spec(&mut self, spec: &InstanceSpec) -> Result<()> {
        let path = self.config.instance_dir.join(&spec.filename);
        let instance = TapInstance::from_file(&path, spec.epsilon_time, spec.epsilon_distance)?;
        self.run_instance(&instance);
        Ok(())
    }

    /// Benchmark every spec in order. Failing instances are logged and skipped;
    /// returns the number of instances that ran.
    pub fn run_all(&mut self, specs: &[InstanceSpec]) -> usize {
        let pb = if self.config.show_progress {
            ProgressBar::new(specs.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        pb.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );

        let mut done = 0;
        for spec in specs {
            pb.set_message(spec.filename.clone());
            match self.run_spec(spec) {
                Ok(()) => done += 1,
                Err(e) => log::error!("Skipping {}: {}", spec.filename, e),
            }
            pb.inc(1);
        }
        pb.finish_with_message(format!("{}/{} instances", done, specs.len()));

        done
    }

    /// Record a result, re-checking the path against the instance
    fn record_result(&mut self, instance: &TapInstance, solution: &Solution, seed: Option<u64>) {
        let elementary = solution.is_elementary(instance);
        let feasible = elementary && instance.is_valid_solution(&solution.path);
        if !feasible {
            log::error!(
                "{} returned an invalid path on {}: {:?}",
                solution.algorithm,
                instance.name,
                solution.path
            );
        }

        self.results.push(AlgorithmResult {
            algorithm: solution.algorithm.clone(),
            instance: instance.name.clone(),
            size: instance.size,
            epsilon_time: instance.epsilon_t,
            epsilon_distance: instance.epsilon_d,
            interest: solution.interest,
            path_time: solution.time,
            path_distance: solution.distance,
            path_len: solution.len(),
            feasible,
            time: solution.computation_time,
            iterations: solution.iterations,
            seed,
        });
    }

    /// Compute statistics for each algorithm, best average interest first
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut stats_map: HashMap<&str, Vec<&AlgorithmResult>> = HashMap::new();
        for result in &self.results {
            stats_map.entry(result.algorithm.as_str()).or_default().push(result);
        }

        let mut statistics: Vec<AlgorithmStatistics> = stats_map
            .into_iter()
            .map(|(algo, results)| {
                let interests: Vec<f64> = results.iter().map(|r| r.interest).collect();
                let times: Vec<f64> = results.iter().map(|r| r.time).collect();

                let std_interest = if interests.len() > 1 {
                    interests.iter().std_dev()
                } else {
                    0.0
                };

                AlgorithmStatistics {
                    algorithm: algo.to_string(),
                    num_runs: results.len(),
                    num_feasible: results.iter().filter(|r| r.feasible).count(),
                    avg_interest: interests.iter().mean(),
                    std_interest,
                    best_interest: interests.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
                    worst_interest: interests.iter().cloned().fold(f64::INFINITY, f64::min),
                    avg_time: times.iter().mean(),
                    total_time: times.iter().sum(),
                }
            })
            .collect();

        statistics.sort_by(|a, b| {
            b.avg_interest
                .total_cmp(&a.avg_interest)
                .then_with(|| a.algorithm.cmp(&b.algorithm))
        });
        statistics
    }

    /// Best interest per instance for one algorithm, over all its runs
    pub fn best_scores(&self, algorithm: &str) -> HashMap<String, f64> {
        let mut best: HashMap<String, f64> = HashMap::new();
        for result in self.results.iter().filter(|r| r.algorithm == algorithm) {
            let entry = best.entry(result.instance.clone()).or_insert(result.interest);
            if result.interest > *entry {
                *entry = result.interest;
            }
        }
        best
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("         TAP Benchmark Report\n");
        report.push_str("========================================\n\n");

        report.push_str("Algorithm Performance Summary:\n");
        report.push_str(&"-".repeat(80));
        report.push('\n');
        report.push_str(&format!(
            "{:<20} {:>10} {:>12} {:>10} {:>12} {:>10}\n",
            "Algorithm", "Feasible", "Avg Interest", "Std", "Best", "Avg Time"
        ));
        report.push_str(&"-".repeat(80));
        report.push('\n');

        for stat in self.compute_statistics() {
            report.push_str(&format!(
                "{:<20} {:>10} {:>12.2} {:>10.2} {:>12.2} {:>10.4}\n",
                stat.algorithm,
                format!("{}/{}", stat.num_feasible, stat.num_runs),
                stat.avg_interest,
                stat.std_interest,
                stat.best_interest,
                stat.avg_time
            ));
        }

        report.push_str(&"-".repeat(80));
        report.push('\n');

        report.push_str("\nBest Solutions per Instance:\n");

        let mut instance_best: HashMap<&str, &AlgorithmResult> = HashMap::new();
        for result in self.results.iter().filter(|r| r.feasible) {
            let entry = instance_best.entry(result.instance.as_str()).or_insert(result);
            if result.interest > entry.interest {
                *entry = result;
            }
        }

        let mut names: Vec<&&str> = instance_best.keys().collect();
        names.sort();
        for name in names {
            let best = instance_best[*name];
            report.push_str(&format!("  {}: {:.2} ({})\n", name, best.interest, best.algorithm));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "4\n\
                         5 7 4 6\n\
                         2 2 2 3\n\
                         0 3 1 4\n\
                         3 0 2 1\n\
                         1 2 0 5\n\
                         4 1 5 0\n";

    fn test_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tap_bench_{}_{}", tag, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("small.dat"), SMALL).unwrap();
        dir
    }

    fn config(dir: PathBuf) -> BenchmarkConfig {
        BenchmarkConfig {
            instance_dir: dir,
            ga_runs: 2,
            seed: 7,
            ga_config: GAConfig {
                population_size: 30,
                generations: 10,
                ..Default::default()
            },
            show_progress: false,
            ..Default::default()
        }
    }

    fn spec(filename: &str) -> InstanceSpec {
        InstanceSpec {
            filename: filename.to_string(),
            epsilon_time: 6.0,
            epsilon_distance: 4.0,
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.ga_runs, 5);
        assert!(config.run_genetic);
        assert_eq!(config.ga_config.population_size, 1000);
        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert_eq!(config.output_dir.join("results.csv"), Path::new("results").join("results.csv"));
    }

    #[test]
    fn test_run_all_records_every_algorithm() {
        let dir = test_dir("all");
        let mut bench = Benchmark::new(config(dir.clone()));

        let done = bench.run_all(&[spec("small.dat"), spec("missing.dat")]);
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(done, 1);
        // four greedy constructors plus two GA runs
        assert_eq!(bench.results().len(), 6);
        assert!(bench.results().iter().all(|r| r.feasible));

        let seeds: Vec<u64> = bench.results().iter().filter_map(|r| r.seed).collect();
        assert_eq!(seeds, vec![7, 8]);

        let greedy = bench.best_scores("Greedy");
        let baseline = bench.best_scores("InterestGreedy");
        assert!(greedy["small.dat"] >= baseline["small.dat"]);
        assert_eq!(bench.best_scores("GeneticAlgorithm").len(), 1);
    }

    #[test]
    fn test_run_spec_missing_file() {
        let mut bench = Benchmark::new(config(PathBuf::from("/definitely/not/here")));
        assert!(bench.run_spec(&spec("small.dat")).is_err());
        assert!(bench.results().is_empty());
    }

    #[test]
    fn test_statistics_and_exports() {
        let dir = test_dir("stats");
        let mut bench = Benchmark::new(BenchmarkConfig {
            run_genetic: false,
            ..config(dir.clone())
        });
        bench.run_spec(&spec("small.dat")).unwrap();

        let stats = bench.compute_statistics();
        assert_eq!(stats.len(), 4);
        for stat in &stats {
            assert_eq!(stat.num_runs, 1);
            assert_eq!(stat.std_interest, 0.0);
            assert_eq!(stat.best_interest, stat.avg_interest);
        }
        for pair in stats.windows(2) {
            assert!(pair[0].avg_interest >= pair[1].avg_interest);
        }

        let results_csv = dir.join("results.csv");
        let stats_csv = dir.join("stats.csv");
        bench.export_to_csv(&results_csv).unwrap();
        bench.export_statistics_csv(&stats_csv).unwrap();
        let results_text = std::fs::read_to_string(&results_csv).unwrap();
        let stats_text = std::fs::read_to_string(&stats_csv).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(results_text.lines().count(), 5);
        assert!(results_text.starts_with("algorithm,instance,"));
        assert_eq!(stats_text.lines().count(), 5);

        let report = bench.generate_report();
        assert!(report.contains("TAP Benchmark Report"));
        assert!(report.contains("small.dat"));
    }

    #[test]
    fn test_statistics_over_ga_runs() {
        let dir = test_dir("ga");
        let mut bench = Benchmark::new(config(dir.clone()));
        let inst = TapInstance::from_file(dir.join("small.dat"), 6.0, 4.0).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        bench.run_genetic(&inst);
        let stats = bench.compute_statistics();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].algorithm, "GeneticAlgorithm");
        assert_eq!(stats[0].num_runs, 2);
        assert!(stats[0].best_interest >= stats[0].worst_interest);
    }
}
