//! Config management commands
//!
//! Usage: funcscan config show|init|set-token [TOKEN]|clear-token

use std::io::{self, BufRead};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use console::style;

use crate::config::{
    config_file_path, credentials_file_path, delete_credentials, load_config,
    load_credentials, save_config, save_credentials, FuncscanConfig,
};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration and whether a token is stored
    Show,
    /// Write a default config file if none exists
    Init,
    /// Store an ARM access token (read from stdin when omitted)
    SetToken {
        /// Bearer token for https://management.azure.com
        token: Option<String>,
    },
    /// Delete the stored access token
    ClearToken,
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Show => run_show(),
        ConfigCommand::Init => run_init(),
        ConfigCommand::SetToken { token } => run_set_token(token),
        ConfigCommand::ClearToken => run_clear_token(),
    }
}

fn run_show() -> Result<()> {
    let path = config_file_path()?;
    let config = load_config()?;

    println!("{}", style("funcscan configuration").cyan().bold());
    println!();
    let origin = if path.exists() { "" } else { " (not created, defaults shown)" };
    println!("  {} {}{}", style("Config file:").dim(), path.display(), origin);
    println!();
    for line in serde_yaml::to_string(&config)
        .context("failed to serialize config")?
        .lines()
    {
        println!("  {}", line);
    }
    println!();

    let token_state = match load_credentials()? {
        Some(_) => style("stored").green(),
        None => style("not stored").yellow(),
    };
    println!(
        "  {} {} ({})",
        style("Access token:").dim(),
        token_state,
        credentials_file_path()?.display()
    );
    Ok(())
}

fn run_init() -> Result<()> {
    let path = config_file_path()?;
    if path.exists() {
        println!(
            "{} Config already exists at {}",
            style("•").dim(),
            path.display()
        );
        return Ok(());
    }

    let written = save_config(&FuncscanConfig::default())?;
    println!("{} Wrote {}", style("✓").green(), written.display());
    Ok(())
}

fn run_set_token(token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => {
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .context("failed to read token from stdin")?;
            line
        }
    };

    let token = token.trim();
    if token.is_empty() {
        bail!("access token is empty");
    }

    save_credentials(token)?;
    println!(
        "{} Token saved to {}",
        style("✓").green(),
        credentials_file_path()?.display()
    );
    Ok(())
}

fn run_clear_token() -> Result<()> {
    if delete_credentials()? {
        println!("{} Stored token removed", style("✓").green());
    } else {
        println!("{} No stored token", style("•").dim());
    }
    Ok(())
}
