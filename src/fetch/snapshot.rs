//! Offline discovery from a JSON snapshot of Function App records.

use std::fs;
use std::path::{Path, PathBuf};

use super::{FunctionAppSource, SubscriptionScope};
use crate::error::FetchError;
use crate::record::FunctionAppRecord;

/// Records loaded from a JSON array on disk.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    path: PathBuf,
    records: Vec<FunctionAppRecord>,
}

impl SnapshotSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FetchError> {
        let path = path.as_ref().to_path_buf();
        let contents = fs::read_to_string(&path).map_err(|source| FetchError::SnapshotRead {
            path: path.clone(),
            source,
        })?;
        let records: Vec<FunctionAppRecord> =
            serde_json::from_str(&contents).map_err(|source| FetchError::SnapshotFormat {
                path: path.clone(),
                source,
            })?;

        Ok(Self { path, records })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Label used as the `source` of a scan document.
    pub fn label(&self) -> String {
        format!("{}:{}", FunctionAppSource::name(self), self.path.display())
    }

    pub fn records(&self) -> &[FunctionAppRecord] {
        &self.records
    }

    /// Distinct subscription ids in first-seen order.
    pub fn subscriptions(&self) -> Vec<String> {
        let mut subscriptions: Vec<String> = Vec::new();
        for record in &self.records {
            if !subscriptions
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&record.subscription_id))
            {
                subscriptions.push(record.subscription_id.clone());
            }
        }
        subscriptions
    }
}

impl FunctionAppSource for SnapshotSource {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn fetch_function_apps(
        &self,
        scope: &SubscriptionScope,
    ) -> Result<Vec<FunctionAppRecord>, FetchError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.subscription_id.eq_ignore_ascii_case(&scope.subscription_id))
            .filter(|r| scope.includes_resource_group(&r.resource_group))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_and_filter() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("apps.json");
        fs::write(
            &path,
            r#"[
                {"subscriptionId":"s1","resourceGroup":"rg-a","name":"one"},
                {"subscriptionId":"s2","resourceGroup":"rg-b","name":"two"},
                {"subscriptionId":"S1","resourceGroup":"rg-b","name":"three"}
            ]"#,
        )
        .unwrap();

        let source = SnapshotSource::open(&path).unwrap();
        assert_eq!(source.path(), path.as_path());
        assert_eq!(source.label(), format!("snapshot:{}", path.display()));
        assert_eq!(source.records().len(), 3);
        assert_eq!(source.subscriptions(), vec!["s1".to_string(), "s2".to_string()]);

        let mut scope = SubscriptionScope::new("s1");
        let names: Vec<_> = source
            .fetch_function_apps(&scope)
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["one", "three"]);

        scope.resource_groups = vec!["RG-B".to_string()];
        let apps = source.fetch_function_apps(&scope).unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].name, "three");
    }

    #[test]
    fn test_missing_file() {
        let err = SnapshotSource::open("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, FetchError::SnapshotRead { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = SnapshotSource::open(&path).unwrap_err();
        assert!(matches!(err, FetchError::SnapshotFormat { .. }));
    }
}
