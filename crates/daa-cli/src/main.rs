//! Batch alerting over a recorded state sequence.
//!
//! Walks a state-sequence file one timestep at a time, computes the alert
//! level against every traffic aircraft, and emits a `Time, Alerting` CSV
//! row for each timestep with a non-zero alert.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use daa_core::{Daidalus, SequenceWalker};

/// Compute alert levels for a recorded encounter
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Nominal-A preset: unbuffered well-clear volume, 1.5 deg/s turn rate
    #[arg(long)]
    noma: bool,

    /// Nominal-B preset: buffered well-clear volume, 3.0 deg/s turn rate
    #[arg(long)]
    nomb: bool,

    /// Configuration file (key = value, unit-tagged)
    #[arg(long)]
    conf: Option<PathBuf>,

    /// Write CSV output to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// State-sequence input file
    input: PathBuf,
}

fn run(args: &Args) -> Result<()> {
    let mut daa = Daidalus::new();

    if args.noma {
        daa.set_nominal_a();
    } else if args.nomb {
        daa.set_nominal_b();
    }

    if let Some(conf) = &args.conf {
        daa.load_parameters_from_file(conf)
            .with_context(|| format!("cannot load configuration file {}", conf.display()))?;
        eprintln!("Loading configuration file {}", conf.display());
    }

    let mut walker = SequenceWalker::from_file(&args.input)
        .with_context(|| format!("cannot read input file {}", args.input.display()))?;
    if walker.at_end() {
        bail!("input file {} contains no states", args.input.display());
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create output file {}", path.display()))?;
            eprintln!("Output file: {}", path.display());
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    };

    writeln!(out, "Time, Alerting")?;
    while !walker.at_end() {
        walker.read_state(&mut daa);
        let mut alerting = -1;
        for i in 1..=daa.last_traffic_index().max(0) {
            alerting = alerting.max(daa.alerting(i as usize));
        }
        if alerting > 0 {
            writeln!(out, "{},{}", daa.current_time(), alerting)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    eprintln!("Processing file {}", args.input.display());
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
