//! Append-only collection of app reports and its summary statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::FunctionAppRecord;
use crate::report::{classify_record, AppReport};
use crate::runtime::{HostingModel, RuntimeStack};

/// Group label for apps without a `FUNCTIONS_EXTENSION_VERSION` setting.
pub const EXTENSION_VERSION_NOT_SET: &str = "not set";

/// Reports in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Inventory {
    entries: Vec<AppReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub total: usize,
    pub by_runtime: BTreeMap<RuntimeStack, usize>,
    pub by_extension_version: BTreeMap<String, usize>,
    pub by_hosting_model: BTreeMap<HostingModel, usize>,
    pub versions_detected: usize,
    /// Share of apps whose version is not `N/A`, in `0.0..=1.0`.
    pub detection_success_rate: f64,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every record, keeping input order.
    pub fn from_records(records: &[FunctionAppRecord]) -> Self {
        records.iter().map(classify_record).collect()
    }

    pub fn push(&mut self, report: AppReport) {
        self.entries.push(report);
    }

    pub fn entries(&self) -> &[AppReport] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// New inventory holding only apps on the given stack.
    pub fn filter_runtime(&self, stack: RuntimeStack) -> Inventory {
        self.entries
            .iter()
            .filter(|report| report.runtime_stack == stack)
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> InventorySummary {
        let mut by_runtime = BTreeMap::new();
        let mut by_extension_version = BTreeMap::new();
        let mut by_hosting_model = BTreeMap::new();
        let mut versions_detected = 0;

        for report in &self.entries {
            *by_runtime.entry(report.runtime_stack).or_insert(0) += 1;
            *by_hosting_model.entry(report.hosting_model).or_insert(0) += 1;

            let extension_version = report
                .functions_extension_version
                .clone()
                .unwrap_or_else(|| EXTENSION_VERSION_NOT_SET.to_string());
            *by_extension_version.entry(extension_version).or_insert(0) += 1;

            if report.version_detected() {
                versions_detected += 1;
            }
        }

        let total = self.entries.len();
        let detection_success_rate = if total == 0 {
            0.0
        } else {
            versions_detected as f64 / total as f64
        };

        InventorySummary {
            total,
            by_runtime,
            by_extension_version,
            by_hosting_model,
            versions_detected,
            detection_success_rate,
        }
    }
}

impl Extend<AppReport> for Inventory {
    fn extend<I: IntoIterator<Item = AppReport>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl FromIterator<AppReport> for Inventory {
    fn from_iter<I: IntoIterator<Item = AppReport>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Inventory {
        Inventory::from_records(&[
            FunctionAppRecord::new("s", "rg", "py")
                .with_kind("functionapp,linux")
                .with_linux_fx_version("PYTHON|3.11")
                .with_setting("FUNCTIONS_EXTENSION_VERSION", "~4"),
            FunctionAppRecord::new("s", "rg", "node")
                .with_setting("FUNCTIONS_WORKER_RUNTIME", "node")
                .with_setting("FUNCTIONS_EXTENSION_VERSION", "~4"),
            FunctionAppRecord::new("s", "rg", "net").with_net_framework_version("v4.0"),
            FunctionAppRecord::new("s", "rg", "mystery").with_kind("functionapp"),
        ])
    }

    #[test]
    fn test_preserves_discovery_order() {
        let inventory = sample();
        let names: Vec<_> = inventory.entries().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["py", "node", "net", "mystery"]);
    }

    #[test]
    fn test_summary_counts() {
        let summary = sample().summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.by_runtime.get(&RuntimeStack::Python), Some(&1));
        assert_eq!(summary.by_runtime.get(&RuntimeStack::Node), Some(&1));
        assert_eq!(summary.by_runtime.get(&RuntimeStack::Dotnet), Some(&1));
        assert_eq!(summary.by_runtime.get(&RuntimeStack::Unknown), Some(&1));
        assert_eq!(summary.by_extension_version.get("~4"), Some(&2));
        assert_eq!(
            summary.by_extension_version.get(EXTENSION_VERSION_NOT_SET),
            Some(&2)
        );
        assert_eq!(summary.by_hosting_model.get(&HostingModel::InProcess), Some(&1));
    }

    #[test]
    fn test_success_rate_counts_placeholders_as_detected() {
        // node resolves to a "not specified" placeholder, only the unknown app is N/A
        let summary = sample().summary();
        assert_eq!(summary.versions_detected, 3);
        assert!((summary.detection_success_rate - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_inventory() {
        let summary = Inventory::new().summary();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.detection_success_rate, 0.0);
        assert!(summary.by_runtime.is_empty());
    }

    #[test]
    fn test_filter_runtime() {
        let inventory = sample();
        let python = inventory.filter_runtime(RuntimeStack::Python);
        assert_eq!(python.len(), 1);
        assert_eq!(python.entries()[0].name, "py");
        assert_eq!(inventory.len(), 4);
    }

    #[test]
    fn test_push_appends_without_touching_earlier_entries() {
        let mut inventory = sample();
        let before = inventory.entries().to_vec();

        inventory.push(classify_record(
            &FunctionAppRecord::new("s", "rg", "pushed").with_setting("FUNCTIONS_WORKER_RUNTIME", "java"),
        ));

        assert_eq!(inventory.len(), before.len() + 1);
        assert_eq!(&inventory.entries()[..before.len()], before.as_slice());
        let last = &inventory.entries()[before.len()];
        assert_eq!(last.name, "pushed");
        assert_eq!(last.runtime_stack, RuntimeStack::Java);
        assert_eq!(inventory.summary().by_runtime.get(&RuntimeStack::Java), Some(&1));
    }

    #[test]
    fn test_extend_appends() {
        let mut inventory = sample();
        let extra = classify_record(&FunctionAppRecord::new("s", "rg", "late"));
        inventory.extend(std::iter::once(extra));
        assert_eq!(inventory.entries().last().map(|r| r.name.as_str()), Some("late"));
    }
}
