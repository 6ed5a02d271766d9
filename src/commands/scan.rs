//! Scan command - inventory Function Apps across subscriptions
//!
//! Usage: funcscan scan [--subscription ID]... [--resource-group RG]...
//!        [--strategy graph|resource-group] [--workers N] [--runtime STACK]
//!        [--access-token T] [--json] [--summary-only]

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use super::{report, spinner};
use crate::azure::ArmClient;
use crate::config::{load_config, resolve_access_token};
use crate::fetch::{
    fetch_all, FunctionAppSource, ResourceGraphSource, ResourceGroupSource, ScanScope, Strategy,
};
use crate::runtime::{parse_runtime_stack, RuntimeStack};

#[derive(Args)]
pub struct ScanArgs {
    /// Subscription to scan (repeatable; defaults to config, then all enabled subscriptions)
    #[arg(long = "subscription", short = 's', value_name = "ID")]
    pub subscriptions: Vec<String>,

    /// Only scan these resource groups (repeatable)
    #[arg(long = "resource-group", short = 'g', value_name = "RG")]
    pub resource_groups: Vec<String>,

    /// Discovery strategy (defaults to config)
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Concurrent subscription workers (0 = number of CPUs)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Only report apps on this runtime stack
    #[arg(long, value_parser = parse_runtime_stack)]
    pub runtime: Option<RuntimeStack>,

    /// ARM bearer token
    #[arg(long, env = "AZURE_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Skip per-app lines in human output
    #[arg(long)]
    pub summary_only: bool,
}

pub fn run(args: ScanArgs) -> Result<()> {
    let config = load_config().context("failed to load funcscan config")?;
    let token = resolve_access_token(args.access_token.as_deref())?;
    let client = ArmClient::new(config.client_settings(token))
        .context("failed to create ARM client")?;

    let subscriptions = if !args.subscriptions.is_empty() {
        args.subscriptions
    } else if !config.subscriptions.is_empty() {
        config.subscriptions.clone()
    } else {
        let pb = spinner("Listing subscriptions...", args.json);
        let listed = client.list_subscriptions();
        pb.finish_and_clear();
        listed
            .context("failed to list subscriptions")?
            .into_iter()
            .map(|s| s.subscription_id)
            .collect()
    };

    let strategy = args.strategy.unwrap_or(config.default_strategy);
    let workers = args.workers.unwrap_or(config.max_workers);
    let source: Box<dyn FunctionAppSource> = match strategy {
        Strategy::Graph => Box::new(ResourceGraphSource::new(client)),
        Strategy::ResourceGroup => Box::new(ResourceGroupSource::new(client)),
    };

    let scope = scan_scope(subscriptions, args.resource_groups)?;
    let subscription_count = scope.per_subscription().len();

    let pb = spinner(
        &format!("Scanning {} subscription(s)...", subscription_count),
        args.json,
    );
    let outcome = fetch_all(source.as_ref(), &scope, workers);
    pb.finish_and_clear();
    let outcome = outcome?;

    info!(
        apps = outcome.records.len(),
        failed_subscriptions = outcome.failures.len(),
        "scan finished"
    );

    report(source.name(), &outcome, args.runtime, args.json, args.summary_only)?;

    if outcome.records.is_empty() && outcome.failures.len() == subscription_count {
        bail!("every subscription failed to scan");
    }
    Ok(())
}

/// Scope for the scan; blank and duplicate subscription ids do not count.
fn scan_scope(subscriptions: Vec<String>, resource_groups: Vec<String>) -> Result<ScanScope> {
    let scope = ScanScope {
        subscriptions,
        resource_groups,
    };
    if scope.per_subscription().is_empty() {
        bail!("no subscriptions to scan. Pass --subscription or add subscriptions to the config file");
    }
    Ok(scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_subscriptions_are_rejected_up_front() {
        let err = scan_scope(vec!["".to_string(), "   ".to_string()], Vec::new()).unwrap_err();
        assert!(err.to_string().contains("no subscriptions to scan"));
        assert!(scan_scope(Vec::new(), Vec::new()).is_err());
    }

    #[test]
    fn test_scan_scope_keeps_resource_groups() {
        let scope = scan_scope(
            vec![" sub-a ".to_string(), "SUB-A".to_string()],
            vec!["rg-1".to_string()],
        )
        .unwrap();
        let per_subscription = scope.per_subscription();
        assert_eq!(per_subscription.len(), 1);
        assert_eq!(per_subscription[0].subscription_id, "sub-a");
        assert_eq!(per_subscription[0].resource_groups, vec!["rg-1".to_string()]);
    }
}
