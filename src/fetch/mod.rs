//! Function App discovery.
//!
//! A [`FunctionAppSource`] turns a subscription scope into raw
//! [`FunctionAppRecord`]s. Strategies differ only in transport:
//!
//! - [`graph::ResourceGraphSource`] bulk-queries Azure Resource Graph
//! - [`resource_group::ResourceGroupSource`] walks resource groups via ARM
//! - [`snapshot::SnapshotSource`] reads a previously captured JSON file
//!
//! [`fetch_all`] fans out one task per subscription on a bounded pool.

pub mod graph;
pub mod resource_group;
pub mod site;
pub mod snapshot;

use std::fmt;

use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::FetchError;
use crate::record::FunctionAppRecord;

pub use graph::ResourceGraphSource;
pub use resource_group::ResourceGroupSource;
pub use snapshot::SnapshotSource;

/// Discovery transport selected on the command line or in config.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Bulk Resource Graph query, app settings fetched per app
    #[default]
    Graph,
    /// Enumerate resource groups and sites through ARM
    ResourceGroup,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Graph => f.write_str("graph"),
            Strategy::ResourceGroup => f.write_str("resource-group"),
        }
    }
}

/// What to scan within one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionScope {
    pub subscription_id: String,
    /// Empty means every resource group.
    pub resource_groups: Vec<String>,
}

impl SubscriptionScope {
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_groups: Vec::new(),
        }
    }

    pub fn includes_resource_group(&self, resource_group: &str) -> bool {
        self.resource_groups.is_empty()
            || self
                .resource_groups
                .iter()
                .any(|rg| rg.eq_ignore_ascii_case(resource_group))
    }
}

/// Subscriptions and resource groups requested for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanScope {
    pub subscriptions: Vec<String>,
    pub resource_groups: Vec<String>,
}

impl ScanScope {
    pub fn per_subscription(&self) -> Vec<SubscriptionScope> {
        let mut seen: Vec<&str> = Vec::new();
        let mut scopes = Vec::new();
        for subscription in &self.subscriptions {
            let trimmed = subscription.trim();
            if trimmed.is_empty() || seen.iter().any(|s| s.eq_ignore_ascii_case(trimmed)) {
                continue;
            }
            seen.push(trimmed);
            scopes.push(SubscriptionScope {
                subscription_id: trimmed.to_string(),
                resource_groups: self.resource_groups.clone(),
            });
        }
        scopes
    }
}

pub trait FunctionAppSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch every Function App in the scope.
    ///
    /// Apps whose configuration cannot be read are left out rather than
    /// failing the whole subscription.
    fn fetch_function_apps(
        &self,
        scope: &SubscriptionScope,
    ) -> Result<Vec<FunctionAppRecord>, FetchError>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFailure {
    pub subscription_id: String,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Records in subscription order, then discovery order.
    pub records: Vec<FunctionAppRecord>,
    pub failures: Vec<SubscriptionFailure>,
}

/// Fetch all subscriptions in `scope` concurrently.
///
/// `workers` bounds the pool size; `0` uses the available parallelism.
pub fn fetch_all(
    source: &dyn FunctionAppSource,
    scope: &ScanScope,
    workers: usize,
) -> Result<FetchOutcome> {
    let scopes = scope.per_subscription();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("funcscan-fetch-{}", i))
        .build()
        .context("failed to build fetch worker pool")?;

    info!(
        strategy = source.name(),
        subscriptions = scopes.len(),
        workers = pool.current_num_threads(),
        "fetching function apps"
    );

    let results: Vec<(String, Result<Vec<FunctionAppRecord>, FetchError>)> = pool.install(|| {
        scopes
            .par_iter()
            .map(|s| (s.subscription_id.clone(), source.fetch_function_apps(s)))
            .collect()
    });

    let mut outcome = FetchOutcome::default();
    for (subscription_id, result) in results {
        match result {
            Ok(records) => {
                info!(subscription = %subscription_id, apps = records.len(), "subscription scanned");
                outcome.records.extend(records);
            }
            Err(err) => {
                warn!(subscription = %subscription_id, error = %err, "subscription scan failed");
                outcome.failures.push(SubscriptionFailure {
                    subscription_id,
                    error: err.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}

/// Sites whose `kind` marks them as Function Apps.
pub(crate) fn is_function_app_kind(kind: &str) -> bool {
    kind.to_ascii_lowercase().contains("functionapp")
}
