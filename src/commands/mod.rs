pub mod classify;
pub mod config;
pub mod scan;

use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};

use crate::fetch::FetchOutcome;
use crate::inventory::Inventory;
use crate::output::{self, ScanDocument};
use crate::runtime::RuntimeStack;

/// Spinner on stderr, hidden when stderr is not a terminal or output is JSON.
pub(crate) fn spinner(message: &str, json: bool) -> ProgressBar {
    if json || !console::Term::stderr().is_term() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Shared by `scan` and `classify` once records are in hand.
pub(crate) fn report(
    source: &str,
    outcome: &FetchOutcome,
    runtime: Option<RuntimeStack>,
    json: bool,
    summary_only: bool,
) -> Result<()> {
    let mut inventory = Inventory::from_records(&outcome.records);
    if let Some(stack) = runtime {
        inventory = inventory.filter_runtime(stack);
    }

    if json {
        output::print_json(&ScanDocument::new(source, &inventory, &outcome.failures))?;
    } else {
        output::print_inventory(&inventory, summary_only);
    }
    output::print_failures(&outcome.failures);
    Ok(())
}
