use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

/// DAG-based program-synthesis solver for the Abstraction and Reasoning Corpus.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Solve {
    /// Path to a task or challenges-file JSON document.
    #[arg(long, required = true)]
    input: PathBuf,
    /// Where to write the answer envelope; defaults to stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Search depth ceiling.
    #[arg(long, default_value_t = 20)]
    max_depth: u16,
    /// Maximum answers per test input (at most 3).
    #[arg(long, default_value_t = 3)]
    max_answers: usize,
    /// Wall-clock budget per test input, in seconds.
    #[arg(long, default_value_t = 60.0)]
    time_limit: f64,
    /// Log level: off, error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    log_level: log::LevelFilter,
}

fn main() {
    let args = Solve::parse();
    arc_solver::init(args.log_level);

    let config = arc_solver::SolveConfig {
        max_depth: args.max_depth,
        max_answers: args.max_answers.min(3),
        time_limit_seconds: args.time_limit,
        enable_logging: true,
        ..Default::default()
    };

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{} failed to open {}: {e}", "error:".red().bold(), args.input.display());
            std::process::exit(1);
        }
    };

    let tasks = match arc_solver::task::Task::from_reader(BufReader::new(file)) {
        Ok(tasks) => tasks,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            std::process::exit(1);
        }
    };

    let mut envelopes = Vec::with_capacity(tasks.len());
    for task in &tasks {
        match arc_solver::solve(task, config, &[]) {
            Ok(answers) => envelopes.push(arc_solver::task::answer_to_json(&answers)),
            Err(e) => {
                eprintln!("{} {e}", "error:".red().bold());
                std::process::exit(1);
            }
        }
    }

    let body = serde_json::to_string_pretty(&envelopes).expect("answer envelopes are always serializable");
    match args.output {
        Some(path) => {
            let mut out = File::create(&path).unwrap_or_else(|e| {
                eprintln!("{} failed to create {}: {e}", "error:".red().bold(), path.display());
                std::process::exit(1);
            });
            out.write_all(body.as_bytes()).expect("write answer envelope");
        }
        None => println!("{body}"),
    }
}
