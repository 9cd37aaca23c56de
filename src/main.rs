use clap::Parser;
use ran_extractor::cli::{
    args::{Args, Commands},
    commands,
};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Ctrl-C is the normal way to leave watch mode
    let watching = matches!(&args.command, Some(Commands::Ran(ran)) if ran.watch);

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let shutdown_signal = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install CTRL+C signal handler");
        };

        tokio::select! {
            result = commands::run(args) => result,
            _ = shutdown_signal => {
                if watching {
                    eprintln!("\nReceived CTRL+C, stopping watch");
                    Ok(())
                } else {
                    Err(anyhow::anyhow!("Extraction interrupted by user"))
                }
            }
        }
    });

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("RAN Extractor - drive-test diagnostic log flattener");
    println!("===================================================");
    println!();
    println!("Turn interleaved GPS and LTE modem diagnostic logs into one");
    println!("fixed-width comma-separated row per measurement sample.");
    println!();
    println!("USAGE:");
    println!("    ran-extractor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    ran         Extract the RAN measurement table (main command)");
    println!("    delay       Extract round-trip delays from an nping log");
    println!("    throughput  Extract upload/download rates from an iperf3 log");
    println!("    all         Run every extractor over a capture directory");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    --config <FILE>  Line layout and output options (TOML)");
    println!("    -v, --verbose    Increase logging verbosity");
    println!("    -q, --quiet      Only show warnings and errors");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Extract lte_log.txt into lte_data.txt:");
    println!("    ran-extractor ran");
    println!();
    println!("    # Re-extract whenever the log grows:");
    println!("    ran-extractor ran /data/run1/lte_log.txt /data/run1/lte_data.txt --watch");
    println!();
    println!("    # Process a whole capture directory:");
    println!("    ran-extractor all --dir /data/run1");
    println!();
    println!("For detailed help on any command, use:");
    println!("    ran-extractor <COMMAND> --help");
}
