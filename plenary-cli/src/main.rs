use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use plenary_minutes::{
    config_banner, run_pipeline, ConfigOverrides, PipelineConfig, PipelineSummary,
};

#[derive(Parser)]
#[command(name = "plenary-minutes")]
#[command(about = "Normalize plenary minutes XML from every electoral period into one CSV table")]
struct Args {
    /// Root directory of the downloaded XML files
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output table path (default: data/plenary-minutes.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Write a JSON report of every file that failed extraction
    #[arg(long)]
    failures: Option<PathBuf>,

    /// Write the run summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Number of extraction threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Field delimiter of the output table
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Exit with an error instead of writing a header-only table
    #[arg(long)]
    fail_on_empty: bool,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Show available config options and exit
    #[arg(long)]
    show_configs: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("🏛️  Plenary Minutes Normalizer");

    if args.show_configs {
        show_help();
        return Ok(());
    }

    let (config, source) = PipelineConfig::load_with_source(args.config.as_deref());
    println!("{}", config_banner(source, args.config.as_deref()));

    let overrides = ConfigOverrides {
        input: args.input.clone(),
        output: args.output.clone(),
        failures: args.failures.clone(),
        workers: args.workers,
        delimiter: args.delimiter,
        fail_on_empty: args.fail_on_empty,
    };
    let config = overrides.apply(config);

    println!("📄 Processing: {}", config.input_dir.display());

    match run_pipeline(&config, args.profile) {
        Ok(summary) => {
            print_summary(&summary);
            if let Some(path) = &args.summary {
                save_summary(&summary, path)?;
            }
        }
        Err(e) => {
            eprintln!("❌ Processing failed: {e:#}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_summary(summary: &PipelineSummary) {
    println!("✅ Successfully normalized plenary minutes");
    println!("📊 Run metrics:");
    println!("   - Files processed: {}", summary.processed);
    println!("   - Records written: {}", summary.succeeded);
    println!("   - Legacy schema: {}", summary.legacy_records);
    println!("   - Modern schema: {}", summary.modern_records);
    println!("   - Words in transcripts: {}", summary.total_words);
    if summary.failed > 0 {
        println!("⚠️  {} files could not be extracted", summary.failed);
    }

    if !summary.records_per_period.is_empty() {
        println!("📋 Records per electoral period:");
        for (period, count) in &summary.records_per_period {
            println!("   - {:>2}: {}", period, count);
        }
    }
    println!("💾 Table: {}", summary.output_path.display());
}

fn save_summary(summary: &PipelineSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    println!("💾 Summary saved to: {}", path.display());
    Ok(())
}

fn show_help() {
    println!("\n📋 Available Configuration Options:");
    println!("  --config <path>         Load custom config file");
    println!("  --input <dir>           Root of the downloaded XML tree (default: data)");
    println!("  --output <path>         Output table path (default: data/plenary-minutes.csv)");
    println!("  --failures <path>       JSON report of files that failed extraction");
    println!("  --summary <path>        JSON summary of the run");
    println!("  --workers <n>           Number of extraction threads (default: 1)");
    println!("  --delimiter <char>      Field delimiter of the output table (default: ,)");
    println!("  --fail-on-empty         Fail when no records were extracted");
    println!("  --profile               Print timings for each pipeline step");

    println!("\n📄 Config file keys (YAML):");
    println!("  input_dir, output_path, failure_report, delimiter,");
    println!("  workers, progress_interval, fail_on_empty");

    println!("\n📄 Output Columns:");
    println!("  date, datetime, title, period, type, text, period_number");
}
