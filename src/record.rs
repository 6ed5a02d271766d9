//! Raw Function App records as returned by a resource source.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One Function App as discovered in a subscription.
///
/// Field values are passed through exactly as the resource API reported
/// them. Interpretation happens in [`crate::signals`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionAppRecord {
    pub subscription_id: String,
    pub resource_group: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_framework_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux_fx_version: Option<String>,
    #[serde(default)]
    pub app_settings: BTreeMap<String, String>,
}

impl FunctionAppRecord {
    pub fn new(
        subscription_id: impl Into<String>,
        resource_group: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            resource_group: resource_group.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_net_framework_version(mut self, version: impl Into<String>) -> Self {
        self.net_framework_version = Some(version.into());
        self
    }

    pub fn with_linux_fx_version(mut self, version: impl Into<String>) -> Self {
        self.linux_fx_version = Some(version.into());
        self
    }

    pub fn with_setting(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.app_settings.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{"subscriptionId":"sub","resourceGroup":"rg","name":"app"}"#;
        let record: FunctionAppRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "app");
        assert!(record.kind.is_empty());
        assert!(record.app_settings.is_empty());
        assert!(record.linux_fx_version.is_none());
    }

    #[test]
    fn test_builder() {
        let record = FunctionAppRecord::new("sub", "rg", "app")
            .with_kind("functionapp,linux")
            .with_linux_fx_version("PYTHON|3.11")
            .with_setting("FUNCTIONS_WORKER_RUNTIME", "python");
        assert_eq!(record.kind, "functionapp,linux");
        assert_eq!(
            record.app_settings.get("FUNCTIONS_WORKER_RUNTIME").map(String::as_str),
            Some("python")
        );
    }
}
