//! CLI entrypoint for the chainalloc harness.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use chainalloc_harness::grind;
use chainalloc_harness::report::CorrectnessReport;
use chainalloc_harness::scenarios;

/// Correctness and timing harness for the chainalloc arena.
#[derive(Debug, Parser)]
#[command(name = "chainalloc-harness")]
#[command(about = "Correctness and timing harness for the chainalloc arena")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the six correctness scenarios.
    Correctness {
        /// Optional output path for the JSON report.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Run the six timing workloads and report average latency.
    Grind {
        /// Iterations per workload.
        #[arg(long, default_value_t = grind::ITERATIONS)]
        iterations: usize,
    },
}

fn main() -> ExitCode {
    match Cli::parse().command {
        Command::Correctness { report } => run_correctness(report),
        Command::Grind { iterations } => run_grind(iterations),
    }
}

fn run_correctness(path: Option<PathBuf>) -> ExitCode {
    let report = CorrectnessReport::new("correctness", scenarios::run_all());
    print!("{}", report.render_text());

    if let Some(path) = path {
        if let Err(err) = report.write_json(&path) {
            eprintln!("failed to write report to {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
        println!("\nreport written to {}", path.display());
    }

    if report.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_grind(iterations: usize) -> ExitCode {
    let report = grind::run_all(iterations);
    println!("{} iterations per workload", report.iterations);
    for workload in &report.workloads {
        println!("{:<22} {:>10.3} us/iter", workload.name, workload.average_micros);
    }
    if report.leaking {
        println!("memory leak detected!");
        ExitCode::FAILURE
    } else {
        println!("no memory leak detected");
        ExitCode::SUCCESS
    }
}
