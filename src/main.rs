use std::time::Duration;

use clap::Parser;
use roll_cutter::backend::MicroLpBackend;
use roll_cutter::render;
use roll_cutter::solver::{Formulation, Solver};
use roll_cutter::types::{ProblemData, SolutionResult};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "roll_cutter",
    about = "1D cutting stock: compares the Kantorovich and Gilmore-Gomory formulations"
)]
struct Cli {
    /// JSON instance file (default: built-in sample with raw width 10)
    #[arg(long)]
    data: Option<String>,

    /// Formulation to solve: direct, pattern, or both
    #[arg(long, default_value = "both", value_parser = parse_formulations)]
    formulation: FormulationChoice,

    /// Variable domain: integer, relaxed, or both
    #[arg(long, default_value = "both", value_parser = parse_mode)]
    mode: ModeChoice,

    /// Print how many rolls are cut with each pattern
    #[arg(long)]
    usage: bool,

    /// Show ASCII layout of each used pattern (implies --usage)
    #[arg(long)]
    layout: bool,

    /// Seconds to wait for each solve before giving up (0 waits forever)
    #[arg(long, default_value_t = 30)]
    time_limit: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy)]
enum FormulationChoice {
    Direct,
    Pattern,
    Both,
}

impl FormulationChoice {
    fn formulations(self) -> &'static [Formulation] {
        match self {
            FormulationChoice::Direct => &[Formulation::Direct],
            FormulationChoice::Pattern => &[Formulation::Pattern],
            FormulationChoice::Both => &[Formulation::Direct, Formulation::Pattern],
        }
    }
}

#[derive(Clone, Copy)]
enum ModeChoice {
    Integer,
    Relaxed,
    Both,
}

impl ModeChoice {
    /// The `integral` flags to run, integer first.
    fn integral_flags(self) -> &'static [bool] {
        match self {
            ModeChoice::Integer => &[true],
            ModeChoice::Relaxed => &[false],
            ModeChoice::Both => &[true, false],
        }
    }
}

fn parse_formulations(s: &str) -> Result<FormulationChoice, String> {
    match s {
        "direct" => Ok(FormulationChoice::Direct),
        "pattern" => Ok(FormulationChoice::Pattern),
        "both" => Ok(FormulationChoice::Both),
        _ => Err(format!(
            "invalid formulation '{}', expected: direct, pattern, or both",
            s
        )),
    }
}

fn parse_mode(s: &str) -> Result<ModeChoice, String> {
    match s {
        "integer" => Ok(ModeChoice::Integer),
        "relaxed" => Ok(ModeChoice::Relaxed),
        "both" => Ok(ModeChoice::Both),
        _ => Err(format!(
            "invalid mode '{}', expected: integer, relaxed, or both",
            s
        )),
    }
}

fn load_data(path: Option<&str>) -> Result<ProblemData, String> {
    let Some(path) = path else {
        return Ok(ProblemData::sample());
    };
    let text =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read '{}': {}", path, e))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid instance '{}': {}", path, e))
}

fn print_usage(data: &ProblemData, result: &SolutionResult, layout: bool) {
    for (pattern, count) in &result.pattern_usage {
        println!(
            "  {} x {} (width {}/{})",
            pattern,
            count,
            pattern.width(data.order_types()),
            data.raw_width()
        );
        if layout {
            for line in render::render_roll(data.raw_width(), data.order_types(), pattern).lines() {
                println!("    {}", line);
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(level)
        .init();

    let data = load_data(cli.data.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let backend = if cli.time_limit == 0 {
        MicroLpBackend::new()
    } else {
        MicroLpBackend::with_time_limit(Duration::from_secs(cli.time_limit))
    };
    let solver = Solver::new(&data, backend);

    let mut failed = false;
    for &integral in cli.mode.integral_flags() {
        for &formulation in cli.formulation.formulations() {
            let suffix = if integral { "" } else { ", relaxation" };
            let result = match solver.solve(formulation, integral) {
                Ok(result) => result,
                Err(e) => {
                    println!(
                        "Objective value, {}{}: not solved ({})",
                        formulation.label(),
                        suffix,
                        e
                    );
                    failed = true;
                    continue;
                }
            };

            println!(
                "Objective value, {}{}: {}",
                formulation.label(),
                suffix,
                result.objective
            );
            if cli.usage || cli.layout {
                if formulation == Formulation::Direct && !integral {
                    println!("  (relaxed roll contents are truncated counts, not a cutting plan)");
                }
                print_usage(&data, &result, cli.layout);
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
