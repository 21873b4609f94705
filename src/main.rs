use anagrams::{AnagramError, AnagramJob, JobConfig, Session};
use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::{debug, error, info, trace};
use tracing_subscriber::EnvFilter;

/// Group the words of a text corpus into anagram classes and count each form
#[derive(Parser, Debug)]
#[command(name = "anagrams", version)]
#[command(about = "Find anagram groups and word frequencies in a text corpus", long_about = None)]
struct Cli {
    /// Minimum word length N (an integer >= 1)
    #[arg(value_name = "N", allow_hyphen_values = true)]
    min_len: String,

    /// Input file, directory or glob pattern
    input: String,

    /// Output directory; must not exist unless --overwrite is given
    output: PathBuf,

    /// Number of result partitions (and part files)
    #[arg(short, long)]
    partitions: Option<usize>,

    /// Worker threads (default: one per logical CPU)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Replace an existing output directory
    #[arg(long)]
    overwrite: bool,

    /// Write run metrics as JSON to this path
    #[arg(long, value_name = "PATH")]
    metrics: Option<PathBuf>,

    /// Enable verbose output (-v for debug, -vv for trace, -vvv adds thread ids)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2) // module targets for -vv and above
        .with_thread_ids(verbose >= 3)
        .with_line_number(verbose >= 3)
        .init();

    debug!("anagrams started with verbosity level: {verbose}");
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

fn config_from(cli: &Cli) -> Result<JobConfig, AnagramError> {
    let min_len = JobConfig::parse_min_len(&cli.min_len)?;
    Ok(JobConfig::new(min_len, cli.input.as_str(), cli.output.as_path())?
        .with_partitions(cli.partitions)?
        .with_overwrite(cli.overwrite))
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    // validated before any session or pipeline work
    let config = config_from(cli)?;
    let job = AnagramJob::new(config);

    let mut builder = Session::builder();
    if let Some(t) = cli.threads {
        builder = builder.threads(t);
    }
    if let Some(p) = cli.partitions {
        builder = builder.partitions(p);
    }

    let summary = Session::scope(builder, |session| {
        install_signal_handlers(&session.cancellation_flag())?;
        let mut sink = job.text_sink();
        Ok(job.run(session, &mut sink)?)
    })?;

    summary.metrics.log();
    if let Some(path) = &cli.metrics {
        summary.metrics.save_to_file(path)?;
        info!(path = %path.display(), "metrics written");
    }
    println!(
        "{} anagram groups written to {} ({} part files)",
        summary.records_written,
        job.config().output.display(),
        summary.partitions
    );
    Ok(())
}

/// SIGINT and SIGTERM set `cancelled`; a second signal exits immediately.
fn install_signal_handlers(cancelled: &Arc<AtomicBool>) -> std::io::Result<()> {
    let status = i32::from(AnagramError::Cancelled.exit_code());
    for sig in [SIGINT, SIGTERM] {
        // fires only once the flag is already set
        signal_hook::flag::register_conditional_shutdown(sig, status, Arc::clone(cancelled))?;
        signal_hook::flag::register(sig, Arc::clone(cancelled))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {e:#}");
            let code = match e.downcast_ref::<AnagramError>() {
                Some(err) => {
                    eprintln!("Error: {err}");
                    err.exit_code()
                }
                None => {
                    eprintln!("Error: {e:#}");
                    1
                }
            };
            if cli.verbose >= 1 {
                eprintln!("\nError chain:");
                for (i, cause) in e.chain().enumerate() {
                    eprintln!("  {i}: {cause}");
                }
            }
            ExitCode::from(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn first_signal_only_sets_the_flag() -> anyhow::Result<()> {
        let cancelled = Arc::new(AtomicBool::new(false));
        install_signal_handlers(&cancelled)?;
        signal_hook::low_level::raise(SIGTERM)?;
        assert!(cancelled.load(Ordering::SeqCst));
        Ok(())
    }
}
