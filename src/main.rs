//! platoon - run the platoon speed-correction simulation.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context as _};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use platoon::{Config, ModelKind, RunReport, Simulation, Trace, MODELS};

#[derive(Debug, Parser)]
#[command(name = "platoon", version, about)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bandit engine. Prompts with a menu when omitted.
    #[arg(short, long, value_enum)]
    model: Option<ModelKind>,

    /// Replay a recorded JSON trace instead of stepping a live fleet.
    #[arg(short, long)]
    trace: Option<PathBuf>,

    /// Override `mab.seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Override `simulation.num_simulation_runs`.
    #[arg(long)]
    runs: Option<usize>,

    /// -v for per-tick debug output, -vv for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn,platoon=info",
        1 => "info,platoon=debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(seed) = cli.seed {
        config.mab.seed = seed;
    }
    if let Some(runs) = cli.runs {
        config.simulation.num_simulation_runs = runs;
    }

    let model = match cli.model {
        Some(m) => m,
        None => choose_model(&mut io::stdin().lock(), &mut io::stdout())?,
    };
    let sim = Simulation::new(config, model)?;

    let reports = match &cli.trace {
        Some(path) => {
            let trace = Trace::load(path)
                .with_context(|| format!("loading trace {}", path.display()))?;
            sim.run_trace(&trace)?
        }
        None => sim.run_live()?,
    };
    print_summary(model, &reports);
    Ok(())
}

/// Numbered menu over [`MODELS`]; re-prompts until a valid entry is read.
fn choose_model(input: &mut impl BufRead, out: &mut impl Write) -> anyhow::Result<ModelKind> {
    loop {
        writeln!(out, "Select a bandit model:")?;
        for (i, m) in MODELS.iter().enumerate() {
            writeln!(out, "  {}) {}", i + 1, m)?;
        }
        write!(out, "> ")?;
        out.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("no model selected (input closed)");
        }
        let answer = line.trim();
        let picked = answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| MODELS.get(i).copied())
            .or_else(|| ModelKind::from_name(answer));
        match picked {
            Some(m) => return Ok(m),
            None => writeln!(out, "unknown choice {answer:?}")?,
        }
    }
}

fn print_summary(model: ModelKind, reports: &[RunReport]) {
    println!("model: {model}");
    for r in reports {
        let gaps: Vec<String> = r.final_gaps.iter().map(|g| format!("{g:.2}")).collect();
        println!(
            "run {:>3}  ticks {:>5}  penalty {:>12.3}  regret {:>10.3}  mean |dev| {:>7.3}  pulls {:?}  gaps [{}]",
            r.run,
            r.ticks,
            r.total_penalty,
            r.total_regret,
            r.final_mean_abs_deviation,
            r.arm_pulls,
            gaps.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_accepts_number_or_name_and_retries() {
        let mut input = io::Cursor::new("9\nbogus\n2\n");
        let mut out = Vec::new();
        let m = choose_model(&mut input, &mut out).unwrap();
        assert_eq!(m, ModelKind::LinearThompsonSampling);
        let shown = String::from_utf8(out).unwrap();
        assert_eq!(shown.matches("Select a bandit model").count(), 3);

        let mut input = io::Cursor::new("LinearUCB\n");
        assert_eq!(
            choose_model(&mut input, &mut Vec::new()).unwrap(),
            ModelKind::LinearUcb
        );
    }

    #[test]
    fn menu_fails_on_closed_input() {
        let mut input = io::Cursor::new("");
        assert!(choose_model(&mut input, &mut Vec::new()).is_err());
    }
}
