//! Command implementations for the RAN log extractor CLI
//!
//! Dispatches each subcommand to its processor and prints a completion
//! summary naming the written table.

pub mod shared;

use self::shared::{build_resolver, load_configuration, setup_logging};
use crate::cli::args::{AllArgs, Args, Commands, ProbeArgs, RanArgs};
use crate::config::ExtractorConfig;
use crate::constants::WATCH_DEBOUNCE_MS;
use crate::models::{ExtractionStats, ProbeStats};
use crate::processor::{
    CaptureStats, RanExtractor, RanWatcher, extract_delay_log, extract_throughput_log, run_all,
};
use crate::timezone::TimezoneResolver;

use anyhow::Context;
use colored::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::task;
use tracing::{debug, info};

/// Main command runner
pub async fn run(args: Args) -> anyhow::Result<()> {
    setup_logging(&args.global)?;
    debug!("Command line arguments: {:?}", args);
    execute(args).await
}

/// Run a parsed command with logging already in place
pub async fn execute(args: Args) -> anyhow::Result<()> {
    let config = load_configuration(&args.global).context("Failed to load configuration")?;

    match args.command {
        Some(Commands::Ran(ran)) => {
            let resolver = build_resolver().await?;
            run_ran(ran, config, resolver).await
        }
        Some(Commands::Delay(probe)) => run_delay(probe).await,
        Some(Commands::Throughput(probe)) => run_throughput(probe).await,
        Some(Commands::All(all)) => {
            let resolver = build_resolver().await?;
            run_capture(all, config, resolver).await
        }
        None => Ok(()),
    }
}

async fn run_ran(
    args: RanArgs,
    config: ExtractorConfig,
    resolver: Arc<dyn TimezoneResolver + Send + Sync>,
) -> anyhow::Result<()> {
    let extractor = RanExtractor::new(args.input, args.output, resolver).with_config(config);

    if args.watch {
        info!("Watching {}", extractor.input_path().display());
        return RanWatcher::new(extractor, Duration::from_millis(WATCH_DEBOUNCE_MS))
            .run()
            .await
            .context("Watch mode stopped");
    }

    let input = extractor.input_path().to_path_buf();
    let stats = task::spawn_blocking(move || extractor.process())
        .await?
        .with_context(|| format!("Failed to extract {}", input.display()))?;

    report_ran(&stats);
    Ok(())
}

async fn run_delay(args: ProbeArgs) -> anyhow::Result<()> {
    let stats = task::spawn_blocking(move || extract_delay_log(&args.input, &args.output))
        .await?
        .context("Failed to extract delay log")?;
    report_probe("delay", &stats);
    Ok(())
}

async fn run_throughput(args: ProbeArgs) -> anyhow::Result<()> {
    let stats = task::spawn_blocking(move || extract_throughput_log(&args.input, &args.output))
        .await?
        .context("Failed to extract throughput log")?;
    report_probe("throughput", &stats);
    Ok(())
}

async fn run_capture(
    args: AllArgs,
    config: ExtractorConfig,
    resolver: Arc<dyn TimezoneResolver + Send + Sync>,
) -> anyhow::Result<()> {
    let template = RanExtractor::new(Default::default(), Default::default(), resolver)
        .with_config(config);
    let stats = run_all(&args.dir, template)
        .await
        .with_context(|| format!("Failed to process {}", args.dir.display()))?;
    report_capture(&stats);
    Ok(())
}

fn report_ran(stats: &ExtractionStats) {
    println!(
        "{} {}",
        "Extraction complete:".bright_green().bold(),
        stats.output_path.display()
    );
    println!(
        "  {} {} readings from {} lines in {} ms",
        "Wrote".bright_cyan(),
        stats.readings_emitted.to_string().bright_white().bold(),
        stats.lines_read,
        stats.processing_time_ms
    );
    let skipped = stats.structural_anomalies + stats.malformed_fields + stats.neighbors_dropped;
    if skipped > 0 {
        println!(
            "  {} {} short lines, {} malformed fields, {} extra neighbour reports",
            "Flagged".bright_yellow(),
            stats.structural_anomalies,
            stats.malformed_fields,
            stats.neighbors_dropped
        );
    }
}

fn report_probe(kind: &str, stats: &ProbeStats) {
    println!(
        "{} {}",
        format!("{} extraction complete:", capitalize(kind))
            .bright_green()
            .bold(),
        stats.output_path.display()
    );
    println!(
        "  {} {} samples",
        "Wrote".bright_cyan(),
        stats.records_written.to_string().bright_white().bold()
    );
}

fn report_capture(stats: &CaptureStats) {
    match &stats.ran {
        Some(ran) => report_ran(ran),
        None => println!("{}", "No RAN log found".bright_yellow()),
    }
    match &stats.delay {
        Some(delay) => report_probe("delay", delay),
        None => println!("{}", "No delay log found".bright_yellow()),
    }
    match &stats.throughput {
        Some(throughput) => report_probe("throughput", throughput),
        None => println!("{}", "No throughput log found".bright_yellow()),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timezone::UtcResolver;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    const GGA: &str = " $GPGGA,224745.00,3858.3020,N,09514.1180,W,1,08,0.9,123.4,M,-26.9,M,,*47";

    #[tokio::test]
    async fn test_run_ran_writes_table() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("lte_log.txt");
        let output = dir.path().join("lte_data.txt");
        fs::write(&input, format!("{}\n", GGA)).unwrap();

        let args = RanArgs {
            input,
            output: output.clone(),
            watch: false,
        };
        run_ran(args, ExtractorConfig::default(), Arc::new(UtcResolver))
            .await
            .unwrap();

        let content = fs::read_to_string(output).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_missing_input_reports_path() {
        let dir = TempDir::new().unwrap();
        let args = RanArgs {
            input: dir.path().join("absent.txt"),
            output: dir.path().join("out.txt"),
            watch: false,
        };
        let err = run_ran(args, ExtractorConfig::default(), Arc::new(UtcResolver))
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("absent.txt"));
    }

    #[tokio::test]
    async fn test_execute_rejects_bad_config() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.toml");
        fs::write(&config, "[output]\nabsent_placeholder = \"\"\n").unwrap();

        let args = Args::try_parse_from([
            "ran-extractor",
            "--config",
            config.to_str().unwrap(),
            "delay",
            "in.txt",
            "out.txt",
        ])
        .unwrap();
        let err = execute(args).await.unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to load configuration"));
    }

    #[tokio::test]
    async fn test_execute_delay() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("nping_log.txt");
        let output = dir.path().join("nping_data.txt");
        fs::write(&input, "Date and Time: 2025/Sep/04 22:47:45\nMax rtt: 12.5ms\n").unwrap();

        let args = Args::try_parse_from([
            "ran-extractor",
            "delay",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
        ])
        .unwrap();
        execute(args).await.unwrap();

        let content = fs::read_to_string(output).unwrap();
        assert_eq!(content.lines().nth(1), Some("2025/Sep/04,22:47:45,12.5,0,0"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("delay"), "Delay");
        assert_eq!(capitalize(""), "");
    }
}
