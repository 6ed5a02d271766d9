use anyhow::Result;
use clap::{Parser, Subcommand};
use funcscan::commands::{self, classify::ClassifyArgs, config::ConfigArgs, scan::ScanArgs};
use funcscan::logging::{init_logging, parse_level, LoggingConfig};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "funcscan",
    version,
    about = "Inventory Azure Function Apps by runtime stack, version and hosting model"
)]
struct Cli {
    /// Log level for diagnostics on stderr
    #[arg(
        long,
        global = true,
        env = "FUNCSCAN_LOG_LEVEL",
        default_value = "warn",
        value_parser = parse_level
    )]
    log_level: Level,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan subscriptions through Azure Resource Manager
    Scan(ScanArgs),
    /// Classify apps from a saved JSON snapshot
    Classify(ClassifyArgs),
    /// Manage configuration and the stored access token
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(LoggingConfig::new(cli.log_level, cli.log_json));

    match cli.command {
        Command::Scan(args) => commands::scan::run(args)?,
        Command::Classify(args) => commands::classify::run(args)?,
        Command::Config(args) => commands::config::run(args)?,
    };

    Ok(())
}
