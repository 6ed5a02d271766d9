//! Per-site ARM calls shared by the Azure discovery strategies.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::azure::{segment, ArmClient, SITES_API_VERSION};
use crate::error::FetchError;

/// `Microsoft.Web/sites` resource as returned by the list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteResource {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub properties: SiteProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProperties {
    pub site_config: Option<SiteConfig>,
}

impl SiteConfig {
    pub fn is_empty(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().map_or(true, |s| s.trim().is_empty());
        blank(&self.net_framework_version) && blank(&self.linux_fx_version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub net_framework_version: Option<String>,
    pub linux_fx_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigResource {
    #[serde(default)]
    properties: SiteConfig,
}

#[derive(Debug, Deserialize)]
struct AppSettingsResource {
    #[serde(default)]
    properties: BTreeMap<String, Value>,
}

fn site_path(subscription_id: &str, resource_group: &str, name: &str) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/sites/{}",
        segment(subscription_id),
        segment(resource_group),
        segment(name)
    )
}

/// GET `.../sites/{name}/config/web`.
pub fn fetch_site_config(
    client: &ArmClient,
    subscription_id: &str,
    resource_group: &str,
    name: &str,
) -> Result<SiteConfig, FetchError> {
    let path = format!("{}/config/web", site_path(subscription_id, resource_group, name));
    let url = client.url(&path, SITES_API_VERSION)?;
    let config: ConfigResource = client.get_json(&url)?;
    Ok(config.properties)
}

/// POST `.../sites/{name}/config/appsettings/list`.
pub fn fetch_app_settings(
    client: &ArmClient,
    subscription_id: &str,
    resource_group: &str,
    name: &str,
) -> Result<BTreeMap<String, String>, FetchError> {
    let path = format!(
        "{}/config/appsettings/list",
        site_path(subscription_id, resource_group, name)
    );
    let url = client.url(&path, SITES_API_VERSION)?;
    let settings: AppSettingsResource = client.post_empty(&url)?;
    Ok(settings_to_strings(settings.properties))
}

/// App setting values are strings in practice; anything else is rendered
/// as JSON and nulls are dropped.
fn settings_to_strings(raw: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    raw.into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key, s)),
            other => Some((key, other.to_string())),
        })
        .collect()
}

/// Resource group segment of an ARM resource id.
pub fn resource_group_from_id(id: &str) -> Option<&str> {
    let mut parts = id.split('/');
    while let Some(part) = parts.next() {
        if part.eq_ignore_ascii_case("resourceGroups") {
            return parts.next().filter(|rg| !rg.is_empty());
        }
    }
    None
}
