use anyhow::{Context, Result};
use cc_convert::convert::{self, FsProbe, OutputFormat};
use cc_convert::rdf::TABLES;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "cc-convert")]
#[command(about = "Convert Charity Commission data dump to CSV or RDF")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert the export files in a directory
    Convert(ConvertArgs),
    /// Print the tables read by the RDF conversion as JSON
    Tables,
}

#[derive(Args)]
struct ConvertArgs {
    /// Output format
    #[arg(value_enum)]
    output: OutputFormat,

    /// Directory containing the .bcp export files
    source_dir: PathBuf,

    /// Directory to write converted files to (created if missing)
    target_dir: PathBuf,
}

fn run_convert(args: ConvertArgs) -> Result<()> {
    fs::create_dir_all(&args.target_dir)
        .with_context(|| format!("Failed to create target directory: {:?}", args.target_dir))?;

    let start = Instant::now();
    let stats = convert::convert(args.output, &args.source_dir, &args.target_dir, &FsProbe)?;
    let duration = start.elapsed();
    info!(duration_secs = duration.as_secs_f64(), "Conversion complete");

    stats.print_summary(duration.as_secs_f64());
    Ok(())
}

fn run_tables() -> Result<()> {
    let json = serde_json::to_string_pretty(TABLES).context("Failed to serialize table catalogue")?;
    println!("{}", json);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Convert(args) => run_convert(args),
        Commands::Tables => run_tables(),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
