use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod export;
mod log;
mod render;
mod timeline;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "jobtrace")]
#[command(about = "Iteration timeline analyzer for distributed simulation logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a self-contained HTML impulse plot of every job's iterations.
    Report {
        /// Log file, or directory of per-process logs (pe=*.txt).
        #[arg(long)]
        log: PathBuf,

        #[arg(short = 'o', long)]
        out: PathBuf,

        /// Application names, indexed by job id.
        #[arg(long, num_args = 1..)]
        legends: Vec<String>,
    },
    /// Export per-iteration rows and per-job summary statistics as CSV.
    Export {
        /// Log file, or directory of per-process logs (pe=*.txt).
        #[arg(long)]
        log: PathBuf,

        /// Output path prefix for the two CSV files.
        #[arg(long)]
        prefix: String,

        /// Application names, indexed by job id.
        #[arg(long, num_args = 1..)]
        legends: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Report { log, out, legends } => {
            let result = reconstruct_corpus(&log)?;
            let names = export::job_names(result.timelines.keys().copied(), &legends);

            let data = render::report_data(&result.timelines, &names);
            let html = render::render_html_report(&data)?;
            std::fs::write(&out, html)?;
            println!("Wrote {}", out.display());
        }
        Commands::Export {
            log,
            prefix,
            legends,
        } => {
            let result = reconstruct_corpus(&log)?;
            let names = export::job_names(result.timelines.keys().copied(), &legends);

            let raw_path = format!("{prefix}_iteration_raw_data.csv");
            let mut raw = std::fs::File::create(&raw_path)?;
            export::write_raw_csv(&result.timelines, &names, &mut raw)?;

            let summary_path = format!("{prefix}_iteration_summary.csv");
            let mut summary = std::fs::File::create(&summary_path)?;
            export::write_summary_csv(&result.timelines, &names, &mut summary)?;

            println!("Wrote {}", raw_path);
            println!("Wrote {}", summary_path);
        }
    }

    Ok(())
}

/// Parse the corpus and reconstruct all job timelines, reporting per-job
/// failures on stderr. A job whose records violate the suspension ordering
/// cannot be reconstructed, but the rest of the run still can.
fn reconstruct_corpus(log: &std::path::Path) -> Result<timeline::Reconstruction> {
    let corpus = log::parse_corpus(log)?;
    let result = timeline::reconstruct(&corpus);

    for failure in &result.failures {
        eprintln!("WARN: job {} not reconstructed: {}", failure.job(), failure);
    }
    if let Some(end) = result.simulation_end() {
        println!("Simulation end = {end}");
    }

    Ok(result)
}
