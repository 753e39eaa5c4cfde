//! TAP Solver - Command Line Interface
//!
//! Greedy and genetic solvers for the Travelling Analyst Problem.

use clap::{Parser, Subcommand, ValueEnum};
use tap_solver::benchmark::{Benchmark, BenchmarkConfig};
use tap_solver::error::Result;
use tap_solver::evaluation::{
    comparison_rows, format_comparison_table, load_baseline_values, load_instance_specs,
    load_optimal_values,
};
use tap_solver::heuristics::construction::*;
use tap_solver::heuristics::genetic::{GAConfig, GeneticAlgorithm};
use tap_solver::instance::TapInstance;
use tap_solver::solution::Solution;

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "tap-solver")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "Greedy and genetic solvers for the Travelling Analyst Problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single instance
    Solve {
        /// Path to the `.dat` instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Time budget
        #[arg(long)]
        epsilon_time: f64,

        /// Distance budget
        #[arg(long)]
        epsilon_distance: f64,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value = "greedy")]
        algorithm: Algorithm,

        /// Random seed for the genetic algorithm (entropy when omitted)
        #[arg(short, long)]
        seed: Option<u64>,

        /// GA population size
        #[arg(long, default_value = "1000")]
        population: usize,

        /// GA generations
        #[arg(long, default_value = "200")]
        generations: usize,

        /// Write the solution as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run every algorithm over the instances listed in a specs file
    Benchmark {
        /// Directory containing instance files
        #[arg(short, long)]
        dir: PathBuf,

        /// Instance specs (`instance;epsilon_time;epsilon_distance`), defaults to DIR/baselines.txt
        #[arg(long)]
        specs: Option<PathBuf>,

        /// Baseline values (`instance;value`)
        #[arg(long)]
        baseline: Option<PathBuf>,

        /// Optimal values (`instance;value[*]`)
        #[arg(long)]
        optimal: Option<PathBuf>,

        /// Number of seeded GA runs per instance
        #[arg(long, default_value = "5")]
        ga_runs: usize,

        /// Seed of the first GA run
        #[arg(short, long, default_value = "0")]
        seed: u64,

        /// Skip the genetic algorithm
        #[arg(long)]
        no_genetic: bool,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Time budget
        #[arg(long)]
        epsilon_time: f64,

        /// Distance budget
        #[arg(long)]
        epsilon_distance: f64,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Best of FastGreedy and EnhancedGreedy
    Greedy,
    /// Ratio insertion with 2-opt repair
    Fast,
    /// Weighted cheapest insertion with baseline fallback
    Enhanced,
    /// Queries by decreasing interest
    Baseline,
    /// Genetic Algorithm
    Genetic,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve {
            instance,
            epsilon_time,
            epsilon_distance,
            algorithm,
            seed,
            population,
            generations,
            output,
            verbose,
        } => {
            let config = GAConfig {
                population_size: population,
                generations,
                seed,
                ..Default::default()
            };
            solve_instance(&instance, epsilon_time, epsilon_distance, algorithm, config, output, verbose)
        }

        Commands::Benchmark {
            dir,
            specs,
            baseline,
            optimal,
            ga_runs,
            seed,
            no_genetic,
            output,
        } => {
            let config = BenchmarkConfig {
                instance_dir: dir.clone(),
                ga_runs,
                seed,
                run_genetic: !no_genetic,
                output_dir: output,
                ..Default::default()
            };
            let specs = specs.unwrap_or_else(|| dir.join("baselines.txt"));
            run_benchmark(config, &specs, baseline, optimal)
        }

        Commands::Analyze {
            instance,
            epsilon_time,
            epsilon_distance,
        } => analyze_instance(&instance, epsilon_time, epsilon_distance),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn solve_instance(
    path: &Path,
    epsilon_time: f64,
    epsilon_distance: f64,
    algorithm: Algorithm,
    ga_config: GAConfig,
    output: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    println!("Loading instance from {:?}...", path);
    let instance = TapInstance::from_file(path, epsilon_time, epsilon_distance)?;

    if verbose {
        println!("{}", instance.statistics());
    }

    println!("Running {:?}...", algorithm);
    let solution: Solution = match algorithm {
        Algorithm::Greedy => GreedyOrchestrator::new().construct(&instance),
        Algorithm::Fast => FastGreedy::new().construct(&instance),
        Algorithm::Enhanced => EnhancedGreedy::new().construct(&instance),
        Algorithm::Baseline => InterestGreedy::new().construct(&instance),
        Algorithm::Genetic => GeneticAlgorithm::new(&instance, ga_config).run(),
    };

    println!("\n{}", solution);

    if let Some(out) = output {
        let json = serde_json::to_string_pretty(&solution)?;
        std::fs::write(&out, json)?;
        println!("Solution written to {:?}", out);
    }

    Ok(())
}

fn run_benchmark(
    config: BenchmarkConfig,
    specs_path: &Path,
    baseline: Option<PathBuf>,
    optimal: Option<PathBuf>,
) -> Result<()> {
    let specs = load_instance_specs(specs_path)?;
    println!("Found {} instance specs in {:?}", specs.len(), specs_path);

    if specs.is_empty() {
        eprintln!("No instances found!");
        return Ok(());
    }

    let output = config.output_dir.clone();
    std::fs::create_dir_all(&output)?;

    let run_genetic = config.run_genetic;
    let mut benchmark = Benchmark::new(config);
    let done = benchmark.run_all(&specs);
    println!("Benchmarked {}/{} instances", done, specs.len());

    let results_path = output.join("results.csv");
    benchmark.export_to_csv(&results_path)?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark.export_statistics_csv(&stats_path)?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report)?;
    println!("Report saved to {:?}", report_path);

    if let (Some(baseline), Some(optimal)) = (baseline, optimal) {
        let baseline = load_baseline_values(baseline)?;
        let optimal = load_optimal_values(optimal)?;

        let mut algorithms = vec!["Greedy"];
        if run_genetic {
            algorithms.push("GeneticAlgorithm");
        }
        for algorithm in algorithms {
            let rows = comparison_rows(&benchmark.best_scores(algorithm), &baseline, &optimal);
            println!("\n{}", format_comparison_table(&rows, algorithm));
        }
    }

    Ok(())
}

fn analyze_instance(path: &Path, epsilon_time: f64, epsilon_distance: f64) -> Result<()> {
    let instance = TapInstance::from_file(path, epsilon_time, epsilon_distance)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    let heuristics: Vec<Box<dyn ConstructionHeuristic>> = vec![
        Box::new(InterestGreedy::new()),
        Box::new(FastGreedy::new()),
        Box::new(EnhancedGreedy::new()),
    ];

    println!("Quick Solution Estimates:");
    for heuristic in heuristics {
        let sol = heuristic.construct(&instance);
        println!(
            "  {}: interest {:.2}, {} queries, time {:.2}/{}, distance {:.2}/{}",
            heuristic.name(),
            sol.interest,
            sol.len(),
            sol.time,
            instance.epsilon_t,
            sol.distance,
            instance.epsilon_d
        );
    }

    Ok(())
}
