// src/bin/qsim.rs - command line front end
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use qasm_sampler::{
    interpret, run_with, CircuitStats, DryRun, ReportFormat, RunOptions, Sampler, SimError,
    StateVector, VERSION,
};
use std::fs::{self, File};
use std::io::{self, BufWriter, Cursor, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "qsim")]
#[command(author = "QCLang Team")]
#[command(version)]
#[command(about = "Interpret QASM circuit descriptions and sample their final state", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Disable colored output")]
    no_color: bool,

    #[arg(short, long, global = true, help = "Verbose output")]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a circuit and optionally sample its measurements
    Run {
        /// Input QASM file (default: standard input)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Perform the measurements found in the circuit, optionally writing
        /// the results to the given file (default: standard output)
        #[arg(short, long, num_args = 0..=1, default_missing_value = "-", value_name = "OUTPUT")]
        measure: Option<PathBuf>,

        /// Number of samples used for measurement
        #[arg(short = 'n', long = "nsamples", default_value_t = qasm_sampler::sampler::DEFAULT_SAMPLES)]
        samples: u64,

        /// Seed for reproducible sampling
        #[arg(long)]
        seed: Option<u64>,

        /// Report format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Print the simulation runtime
        #[arg(short, long)]
        info: bool,
    },

    /// Validate circuit descriptions without simulating them
    #[command(arg_required_else_help = true)]
    Check {
        /// Input QASM files
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },

    /// Show version info
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let result = match cli.command {
        Commands::Run { file, measure, samples, seed, format, info } => {
            run_circuit(file.as_deref(), measure.as_deref(), samples, seed, format, info, cli.verbose)
        }
        Commands::Check { input } => check_files(&input, cli.verbose),
        Commands::Version => {
            show_version(cli.verbose);
            Ok(())
        }
    };

    if let Err(e) = result {
        if !io::stderr().is_terminal() {
            colored::control::set_override(false);
        }
        eprintln!("{}{}", "ERROR: ".red().bold(), e);
        process::exit(1);
    }
}

/// Loads the whole input so loop bodies can be replayed by seeking.
fn read_source(file: Option<&Path>) -> Result<Cursor<Vec<u8>>, SimError> {
    let bytes = match file {
        Some(path) => fs::read(path).map_err(|e| {
            SimError::Io(io::Error::new(e.kind(), format!("invalid input file '{}': {}", path.display(), e)))
        })?,
        None => {
            let mut buf = Vec::new();
            io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };
    Ok(Cursor::new(bytes))
}

/// Rejects a report path that cannot be created, without creating it.
fn validate_output(target: Option<&Path>) -> Result<(), SimError> {
    let path = match target {
        Some(path) if path != Path::new("-") => path,
        _ => return Ok(()),
    };
    let invalid = |reason: &str| {
        SimError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("invalid output file '{}': {}", path.display(), reason),
        ))
    };

    if path.is_dir() {
        return Err(invalid("is a directory"));
    }
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.is_dir() => Err(invalid("no such directory")),
        _ => Ok(()),
    }
}

fn open_output(target: Option<&Path>) -> Result<Box<dyn Write>, SimError> {
    match target {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path).map_err(|e| {
                SimError::Io(io::Error::new(e.kind(), format!("invalid output file '{}': {}", path.display(), e)))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(io::stdout().lock())),
    }
}

fn run_circuit(
    file: Option<&Path>,
    measure: Option<&Path>,
    samples: u64,
    seed: Option<u64>,
    format: OutputFormat,
    info: bool,
    verbose: bool,
) -> Result<(), SimError> {
    validate_output(measure)?;
    let source = read_source(file)?;
    let mut circuit = match seed {
        Some(seed) => StateVector::with_seed(seed),
        None => StateVector::new(),
    };

    let options = RunOptions {
        measure: measure.is_some(),
        samples,
        format: format.into(),
    };
    let sampler = Sampler::new(samples).with_progress(sampling_progress(verbose));

    if verbose {
        let name = file.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
        eprintln!("{} Running: {}", "🚀".green(), name);
    }

    let start_time = Instant::now();
    // the report file is created only once interpretation succeeded
    let mut output: Option<Box<dyn Write>> = None;
    let mut sink = LazyOutput { target: measure, output: &mut output };
    let state = run_with(source, &mut circuit, &mut sink, &options, &sampler)?;
    let elapsed = start_time.elapsed();

    if let Some(out) = output.as_mut() {
        out.flush()?;
    }

    if verbose {
        print_stats(&state.stats(), elapsed);
        if measure.is_some() && !state.is_measure() {
            eprintln!("{} No measurement found in the circuit, nothing sampled", "⚠".yellow());
        }
    }
    if info {
        println!("Time={:.3}s", elapsed.as_secs_f64());
    }
    Ok(())
}

/// Opens the report destination on first write.
struct LazyOutput<'a, 'p> {
    target: Option<&'p Path>,
    output: &'a mut Option<Box<dyn Write>>,
}

impl LazyOutput<'_, '_> {
    fn get(&mut self) -> io::Result<&mut Box<dyn Write>> {
        if self.output.is_none() {
            let out = open_output(self.target).map_err(|e| match e {
                SimError::Io(io) => io,
                other => io::Error::new(io::ErrorKind::Other, other.to_string()),
            })?;
            *self.output = Some(out);
        }
        match self.output.as_mut() {
            Some(out) => Ok(out),
            None => Err(io::Error::new(io::ErrorKind::Other, "report output unavailable")),
        }
    }
}

impl Write for LazyOutput<'_, '_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.get()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.output.as_mut() {
            Some(out) => out.flush(),
            None => Ok(()),
        }
    }
}

fn sampling_progress(verbose: bool) -> ProgressBar {
    if !verbose {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} samples") {
        pb.set_style(style.progress_chars("█▓▒░"));
    }
    pb
}

fn print_stats(stats: &CircuitStats, elapsed: Duration) {
    let border = "─".repeat(40);
    eprintln!("{}", border.dimmed());
    eprintln!("{} Statistics:", "📈".cyan());
    eprintln!("{}", border.dimmed());
    eprintln!("  {:15} : {}", "Qubits".blue(), stats.qubits);
    eprintln!("  {:15} : {}", "Gates applied".blue(), stats.gates);
    eprintln!("  {:15} : {}", "Measurements".blue(), stats.measurements);
    eprintln!("  {:15} : {}", "Loop passes".blue(), stats.loop_iterations);
    eprintln!("  {:15} : {}", "Operations".blue(), stats.total_operations());
    eprintln!("  {:15} : {:.2} ms", "Time".blue(), elapsed.as_secs_f64() * 1000.0);
    eprintln!("{}", border.dimmed());
}

fn check_files(inputs: &[PathBuf], verbose: bool) -> Result<(), SimError> {
    println!("{} Syntax Checking", "🔍".yellow());

    let mut failed = 0;
    for input_path in inputs {
        println!("\n{} {}", "📄".blue(), input_path.display());

        let source = match read_source(Some(input_path)) {
            Ok(source) => source,
            Err(e) => {
                println!("  {} {}", "✗".red(), e);
                failed += 1;
                continue;
            }
        };

        let mut circuit = DryRun::new();
        match interpret(source, &mut circuit) {
            Ok(state) => {
                let stats = state.stats();
                println!("  {} Syntax OK", "✓".green());
                println!(
                    "  {} Qubits: {}, Gates: {}, Measurements: {}",
                    "⚛".blue(),
                    stats.qubits,
                    stats.gates,
                    stats.measurements
                );
                if verbose {
                    println!("  {} Loop passes: {}", "🔁".blue(), stats.loop_iterations);
                    if state.is_measure() && !state.is_full_ordered_measurement() {
                        println!("  {} Measurement pattern cannot be sampled", "⚠".yellow());
                    }
                }
            }
            Err(e) => {
                println!("  {} {}", "✗".red(), e);
                failed += 1;
            }
        }
    }

    println!("\n{}", "─".repeat(50).dimmed());
    println!("Checked {} files, {} failed", inputs.len(), failed);

    if failed > 0 {
        return Err(SimError::CheckFailed {
            failed,
            total: inputs.len(),
        });
    }
    println!("{} All files are valid", "✓".green());
    Ok(())
}

fn show_version(verbose: bool) {
    println!("qsim {}", VERSION);
    if verbose {
        println!("{} Backend: {}", "🎯".blue(), "dense state vector");
        println!("{} Max qubits: {}", "⚛".blue(), qasm_sampler::simulator::MAX_QUBITS);
        println!("{} License: {}", "⚖️".blue(), "MIT/Apache-2.0");
    }
}
