//! Terminal and JSON rendering of scan results.

use std::collections::BTreeMap;

use anyhow::Result;
use console::style;
use serde::Serialize;

use crate::fetch::SubscriptionFailure;
use crate::inventory::{Inventory, InventorySummary};
use crate::report::AppReport;
use crate::runtime::RuntimeStack;

/// Single JSON document printed by `--json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDocument<'a> {
    pub generated_at: String,
    pub source: &'a str,
    pub apps: &'a [AppReport],
    pub summary: InventorySummary,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    pub failures: &'a [SubscriptionFailure],
}

impl<'a> ScanDocument<'a> {
    pub fn new(source: &'a str, inventory: &'a Inventory, failures: &'a [SubscriptionFailure]) -> Self {
        Self {
            generated_at: chrono::Utc::now().to_rfc3339(),
            source,
            apps: inventory.entries(),
            summary: inventory.summary(),
            failures,
        }
    }
}

pub fn print_json(document: &ScanDocument<'_>) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(document)?);
    Ok(())
}

/// Print per-app lines (unless `summary_only`) followed by the summary.
pub fn print_inventory(inventory: &Inventory, summary_only: bool) {
    if !summary_only {
        print_apps(inventory.entries());
    }
    print_summary(&inventory.summary());
}

fn print_apps(apps: &[AppReport]) {
    println!();
    println!("{}", style("Function Apps").cyan().bold());
    println!("{}", style("-".repeat(40)).dim());

    if apps.is_empty() {
        println!("  {}", style("No Function Apps found.").dim());
        return;
    }

    let mut by_group: BTreeMap<(&str, &str), Vec<&AppReport>> = BTreeMap::new();
    for app in apps {
        by_group
            .entry((app.subscription_id.as_str(), app.resource_group.as_str()))
            .or_default()
            .push(app);
    }

    for ((subscription, group), apps) in by_group {
        println!();
        println!(
            "  {} {}",
            style(group).bold(),
            style(format!("({})", subscription)).dim()
        );
        for app in apps {
            let version = if app.version_detected() {
                style(app.runtime_version.clone()).green()
            } else {
                style(app.runtime_version.clone()).yellow()
            };
            println!(
                "    {:<32} {:<16} {}",
                app.name,
                stack_label(app.runtime_stack),
                version
            );
            if app.runtime_stack.is_dotnet() {
                println!(
                    "      {} {}",
                    style("Hosting:").dim(),
                    app.hosting_model
                );
            } else if app.extension_bundle.is_estimate() {
                println!(
                    "      {} {}",
                    style("Bundle:").dim(),
                    app.extension_bundle
                );
            }
        }
    }
}

fn stack_label(stack: RuntimeStack) -> String {
    match stack {
        RuntimeStack::Unknown => style(stack.as_str()).red().to_string(),
        _ => stack.as_str().to_string(),
    }
}

pub fn print_summary(summary: &InventorySummary) {
    println!();
    println!("{}", style("Summary").cyan().bold());
    println!("{}", style("-".repeat(40)).dim());
    println!("  {} {}", style("Total apps:").dim(), summary.total);

    if summary.total == 0 {
        println!();
        return;
    }

    println!("  {}", style("By runtime:").dim());
    for (stack, count) in &summary.by_runtime {
        println!("    {:<18} {}", stack.as_str(), count);
    }

    println!("  {}", style("By Functions host version:").dim());
    for (version, count) in &summary.by_extension_version {
        println!("    {:<18} {}", version, count);
    }

    let rate = summary.detection_success_rate * 100.0;
    let rate_styled = if rate >= 90.0 {
        style(format!("{:.1}%", rate)).green()
    } else if rate >= 50.0 {
        style(format!("{:.1}%", rate)).yellow()
    } else {
        style(format!("{:.1}%", rate)).red()
    };
    println!(
        "  {} {} ({} of {})",
        style("Version detected:").dim(),
        rate_styled,
        summary.versions_detected,
        summary.total
    );
    println!(
        "  {}",
        style("Extension bundle values are estimates; host.json is not visible to the resource API.")
            .dim()
    );
    println!();
}

pub fn print_failures(failures: &[SubscriptionFailure]) {
    if failures.is_empty() {
        return;
    }
    eprintln!();
    eprintln!(
        "{}",
        style(format!("{} subscription(s) could not be scanned:", failures.len()))
            .yellow()
            .bold()
    );
    for failure in failures {
        eprintln!("  {} {}", style(&failure.subscription_id).bold(), failure.error);
    }
}
