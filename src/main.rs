use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use turnpike::lut;
use turnpike::{SearchMode, SolverConfig, SolverResult, TurnpikeSolver};

#[derive(Parser, Debug)]
#[command(name = "turnpike")]
#[command(about = "Turnpike Reconstructor - points on a line from their pairwise distances", long_about = None)]
struct Args {
    /// Pairwise distances, separated by commas or whitespace
    #[arg(index = 1, num_args = 0..)]
    distances: Vec<String>,

    /// Stop after the first reconstruction
    #[arg(short = 'f', long = "first")]
    first: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Use multi-processing
    #[arg(long = "mp")]
    multi_processing: bool,

    /// Show a progress bar while searching in parallel
    #[arg(long = "progress", requires = "multi_processing")]
    progress: bool,

    /// Run the built-in instances (or only the named one) instead of the given distances
    #[arg(long = "demo", value_name = "NAME", num_args = 0..=1, default_missing_value = "all")]
    demo: Option<String>,

    /// Output file
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("Turnpike Reconstructor");
    println!("Start time: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));

    let config = SolverConfig {
        mode: if args.first { SearchMode::First } else { SearchMode::All },
        multi_processing: args.multi_processing,
        progress: args.progress,
    };
    let solver = TurnpikeSolver::new(config);

    let runs: Vec<(String, Vec<u64>)> = if let Some(name) = &args.demo {
        let selected: Vec<&lut::Instance> = if name == "all" {
            lut::instances().iter().collect()
        } else {
            match lut::get_instance(name) {
                Some(instance) => vec![instance],
                None => bail!(
                    "unknown instance {:?} (known: {})",
                    name,
                    lut::instances().iter().map(|i| i.name).collect::<Vec<_>>().join(", ")
                ),
            }
        };
        selected
            .into_iter()
            .map(|instance| (instance.name.to_string(), instance.distances.clone()))
            .collect()
    } else {
        let distances = parse_distances(&args.distances)?;
        if distances.is_empty() {
            bail!("no distances given (pass them as arguments or use --demo)");
        }
        vec![("input".to_string(), distances)]
    };

    let option_str = generate_option_string(&args);
    let mut output = match &args.output_file {
        Some(path) => Some(
            File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        ),
        None => None,
    };

    for (name, distances) in &runs {
        println!("Reconstructing {} from {} distances", name, distances.len());

        let start_time = Instant::now();
        let result = solver.solve(distances)?;
        let elapsed = start_time.elapsed();

        if result.is_empty() {
            println!("No solution found");
        }
        for placement in &result.solutions {
            println!("Points: {}", placement);
        }
        println!("Elapsed time: {:.6} seconds", elapsed.as_secs_f64());
        println!("States searched: {}", result.states_examined);

        if let Some(file) = output.as_mut() {
            generate_output(file, name, distances, &result, elapsed.as_secs_f64(), &option_str)?;
        }
    }

    if let Some(path) = &args.output_file {
        println!("Results written to {}", path.display());
    }
    Ok(())
}

fn parse_distances(tokens: &[String]) -> Result<Vec<u64>> {
    tokens
        .iter()
        .flat_map(|token| token.split(|c: char| c == ',' || c.is_whitespace()))
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u64>()
                .with_context(|| format!("invalid distance {:?}", part))
        })
        .collect()
}

fn generate_option_string(args: &Args) -> String {
    let mut options = Vec::new();

    if args.first {
        options.push("first");
    }

    if args.multi_processing {
        options.push("mp");
    }

    if args.verbose {
        options.push("v");
    }

    if options.is_empty() {
        "std".to_string()
    } else {
        options.join("_")
    }
}

fn generate_output(
    file: &mut File,
    name: &str,
    distances: &[u64],
    result: &SolverResult,
    elapsed_time: f64,
    options_str: &str,
) -> Result<()> {
    let mut sorted = distances.to_vec();
    sorted.sort_unstable();

    writeln!(file, "instance={}", name)?;
    writeln!(file, "distances={}", join(&sorted))?;
    writeln!(file, "solutions={}", result.solutions.len())?;
    for placement in &result.solutions {
        writeln!(file, "points={}", join(placement.positions()))?;
    }
    writeln!(file, "states={}", result.states_examined)?;
    writeln!(file, "seconds={}", elapsed_time)?;
    writeln!(file, "time={:.3} s", elapsed_time)?;
    writeln!(file, "options={}", options_str)?;
    writeln!(file)?;
    Ok(())
}

fn join(values: &[u64]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
