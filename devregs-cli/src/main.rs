use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

use devregs::{DevregsAnalyzer, Report};

/// devregs - clean up a device register description
#[derive(Parser)]
#[command(name = "devregs")]
#[command(version)]
#[command(about = "dedupe registers, fields and field sets in a devregs file", long_about = None)]
struct Cli {
    /// path to the register description file
    input: PathBuf,

    /// only print line and table counts
    #[arg(short, long)]
    summary: bool,

    /// output JSON representation of the report
    #[arg(short = 'j', long, conflicts_with = "summary")]
    json: bool,

    /// suppress diagnostics (only show errors)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// verbose logging to console (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(cli.verbose, cli.quiet);

    info!("input: {}", cli.input.display());

    debug!("load input file: {}", cli.input.display());
    let analyzer = DevregsAnalyzer::from_file(&cli.input)?;

    let analysis = analyzer.extract_analysis();
    if analysis.registers.is_empty() {
        warn!("no registers found in {}", cli.input.display());
    }

    let report = Report::from_analysis(&analysis);

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{}", json);
    } else {
        println!("{}: {} lines", cli.input.display(), analyzer.line_count());
        if cli.summary {
            print!("{}", report.summary());
        } else {
            print!("{}", report);
        }
    }

    Ok(())
}

fn init_logger(verbose: u8, quiet: bool) {
    // diagnostics are warnings, keep them visible unless asked otherwise
    let log_level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}
