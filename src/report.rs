//! Per-app classification pipeline and its output record.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bundle::{estimate_bundle, BundleEstimate};
use crate::classifier::{classify_with_source, RuntimeSource};
use crate::record::FunctionAppRecord;
use crate::runtime::{HostingModel, RuntimeStack};
use crate::signals::AppSignals;
use crate::version::{is_detected, resolve_version};

/// Classification result for one Function App.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppReport {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
    pub location: String,
    pub kind: String,

    pub runtime_stack: RuntimeStack,
    pub runtime_source: RuntimeSource,
    pub runtime_version: String,
    pub hosting_model: HostingModel,
    pub extension_bundle: BundleEstimate,

    // Raw values kept for diagnostics
    pub net_framework_version: Option<String>,
    pub linux_fx_version: Option<String>,
    pub functions_extension_version: Option<String>,
    pub functions_worker_runtime: Option<String>,
}

impl AppReport {
    pub fn version_detected(&self) -> bool {
        is_detected(&self.runtime_version)
    }
}

/// Run classification, version resolution and bundle estimation on a record.
pub fn classify_record(record: &FunctionAppRecord) -> AppReport {
    let signals = AppSignals::from_record(record);
    let classification = classify_with_source(&signals);
    let stack = classification.stack;
    let runtime_version = resolve_version(&signals, stack);
    let extension_version = signals.extension_version();
    let extension_bundle = estimate_bundle(stack, extension_version);

    debug!(
        app = %record.name,
        resource_group = %record.resource_group,
        stack = %stack,
        source = %classification.source,
        version = %runtime_version,
        "classified function app"
    );

    AppReport {
        subscription_id: record.subscription_id.clone(),
        resource_group: record.resource_group.clone(),
        name: record.name.clone(),
        location: record.location.clone(),
        kind: record.kind.clone(),
        runtime_stack: stack,
        runtime_source: classification.source,
        runtime_version,
        hosting_model: stack.hosting_model(),
        extension_bundle,
        net_framework_version: record.net_framework_version.clone(),
        linux_fx_version: record.linux_fx_version.clone(),
        functions_extension_version: extension_version.map(str::to_string),
        functions_worker_runtime: signals.worker_runtime().map(str::to_string),
    }
}
