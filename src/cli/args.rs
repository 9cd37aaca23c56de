//! Command-line argument definitions for the RAN log extractor
//!
//! Defines the CLI surface using the clap derive API. Global flags control
//! logging and configuration; each subcommand names one extraction.

use crate::constants::file_names;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Flatten drive-test diagnostic logs into fixed-width tables
///
/// Reads the interleaved GPS and LTE modem log written during a drive test
/// and emits one comma-separated row per measurement sample. Companion delay
/// and throughput probe logs can be flattened as well.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ran-extractor",
    version,
    about = "Flatten GPS/LTE modem diagnostic logs into measurement tables"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Flags shared by every subcommand
#[derive(Debug, Clone, ClapArgs)]
pub struct GlobalArgs {
    /// Configuration file with the line layout and output options
    ///
    /// Defaults to ran-extractor/config.toml under the user configuration
    /// directory when that file exists.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: debug, -vv: trace)"
    )]
    pub verbose: u8,

    /// Only show warnings and errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress output except warnings and errors"
    )]
    pub quiet: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Extract the RAN measurement table from a diagnostic log
    Ran(RanArgs),
    /// Extract round-trip delays from an nping log
    Delay(ProbeArgs),
    /// Extract upload and download rates from an iperf3 log
    Throughput(ProbeArgs),
    /// Run every extractor over a capture directory
    All(AllArgs),
}

#[derive(Debug, Clone, ClapArgs)]
pub struct RanArgs {
    /// Diagnostic log to read
    #[arg(value_name = "INPUT", default_value = file_names::RAN_LOG)]
    pub input: PathBuf,

    /// Table to write
    #[arg(value_name = "OUTPUT", default_value = file_names::RAN_TABLE)]
    pub output: PathBuf,

    /// Keep running and re-extract whenever the input changes
    #[arg(short = 'w', long = "watch")]
    pub watch: bool,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct ProbeArgs {
    /// Probe log to read
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Table to write
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct AllArgs {
    /// Directory holding lte_log.txt, nping_log.txt and iperf3_log.txt
    #[arg(short = 'd', long = "dir", value_name = "PATH", default_value = ".")]
    pub dir: PathBuf,
}

impl GlobalArgs {
    /// Log level for the crate's own targets
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ran_defaults() {
        let args = Args::try_parse_from(["ran-extractor", "ran"]).unwrap();
        match args.command {
            Some(Commands::Ran(ran)) => {
                assert_eq!(ran.input, PathBuf::from("lte_log.txt"));
                assert_eq!(ran.output, PathBuf::from("lte_data.txt"));
                assert!(!ran.watch);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "ran-extractor",
            "delay",
            "nping_log.txt",
            "nping_data.txt",
            "-vv",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert_eq!(args.global.get_log_level(), "trace");
        assert_eq!(args.global.config_file, Some(PathBuf::from("custom.toml")));
    }

    #[test]
    fn test_log_levels() {
        let parse = |flags: &[&str]| {
            let mut argv = vec!["ran-extractor"];
            argv.extend_from_slice(flags);
            argv.push("all");
            Args::try_parse_from(argv).unwrap().global.get_log_level()
        };
        assert_eq!(parse(&[]), "info");
        assert_eq!(parse(&["-v"]), "debug");
        assert_eq!(parse(&["-q"]), "warn");
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["ran-extractor", "-q", "-v", "all"]).is_err());
    }

    #[test]
    fn test_probe_paths_required() {
        assert!(Args::try_parse_from(["ran-extractor", "throughput"]).is_err());
    }
}
