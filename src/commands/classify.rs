//! Classify command - run the classification pipeline on a saved snapshot
//!
//! Usage: funcscan classify --input snapshot.json [--subscription ID]...
//!        [--resource-group RG]... [--runtime STACK] [--json] [--summary-only]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use super::report;
use crate::fetch::{fetch_all, ScanScope, SnapshotSource};
use crate::runtime::{parse_runtime_stack, RuntimeStack};

#[derive(Args)]
pub struct ClassifyArgs {
    /// JSON array of Function App records
    #[arg(long, short = 'i', value_name = "FILE")]
    pub input: PathBuf,

    /// Only classify apps in these subscriptions (repeatable)
    #[arg(long = "subscription", short = 's', value_name = "ID")]
    pub subscriptions: Vec<String>,

    /// Only classify apps in these resource groups (repeatable)
    #[arg(long = "resource-group", short = 'g', value_name = "RG")]
    pub resource_groups: Vec<String>,

    /// Only report apps on this runtime stack
    #[arg(long, value_parser = parse_runtime_stack)]
    pub runtime: Option<RuntimeStack>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Skip per-app lines in human output
    #[arg(long)]
    pub summary_only: bool,
}

pub fn run(args: ClassifyArgs) -> Result<()> {
    let snapshot = SnapshotSource::open(&args.input)
        .with_context(|| format!("failed to load snapshot {}", args.input.display()))?;

    let subscriptions = if args.subscriptions.is_empty() {
        snapshot.subscriptions()
    } else {
        args.subscriptions
    };
    let scope = ScanScope {
        subscriptions,
        resource_groups: args.resource_groups,
    };

    // Reading from memory needs no parallelism.
    let outcome = fetch_all(&snapshot, &scope, 1)?;

    report(
        &snapshot.label(),
        &outcome,
        args.runtime,
        args.json,
        args.summary_only,
    )
}
