//! Bulk discovery through Azure Resource Graph.
//!
//! One paged query returns every Function App in the subscription. The
//! graph does not carry app settings, so those are still read per app.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::site::{fetch_app_settings, fetch_site_config, resource_group_from_id};
use super::{FunctionAppSource, SubscriptionScope};
use crate::azure::{ArmClient, PageGuard, RESOURCE_GRAPH_API_VERSION};
use crate::error::FetchError;
use crate::record::FunctionAppRecord;

const PAGE_SIZE: u32 = 1000;

const BASE_QUERY: &str = "resources \
| where type =~ 'microsoft.web/sites' and kind contains 'functionapp'";

const PROJECTION: &str =
    "| project id, name, resourceGroup, subscriptionId, location, kind, properties | order by name asc";

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    subscriptions: [&'a str; 1],
    query: &'a str,
    options: QueryOptions<'a>,
}

#[derive(Debug, Serialize)]
struct QueryOptions<'a> {
    #[serde(rename = "resultFormat")]
    result_format: &'static str,
    #[serde(rename = "$top")]
    top: u32,
    #[serde(rename = "$skipToken", skip_serializing_if = "Option::is_none")]
    skip_token: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    data: Vec<GraphRow>,
    #[serde(rename = "$skipToken")]
    skip_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphRow {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    resource_group: String,
    #[serde(default)]
    subscription_id: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    kind: String,
    #[serde(default)]
    properties: Value,
}

impl GraphRow {
    fn net_framework_version(&self) -> Option<String> {
        self.properties
            .pointer("/siteConfig/netFrameworkVersion")
            .and_then(Value::as_str)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
    }

    /// `siteConfig.linuxFxVersion`, falling back to the `LinuxFxVersion`
    /// entry of `siteProperties.properties`.
    fn linux_fx_version(&self) -> Option<String> {
        if let Some(fx) = self
            .properties
            .pointer("/siteConfig/linuxFxVersion")
            .and_then(Value::as_str)
            .filter(|v| !v.trim().is_empty())
        {
            return Some(fx.to_string());
        }

        self.properties
            .pointer("/siteProperties/properties")
            .and_then(Value::as_array)?
            .iter()
            .find(|entry| {
                entry
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|n| n.eq_ignore_ascii_case("LinuxFxVersion"))
            })
            .and_then(|entry| entry.get("value"))
            .and_then(Value::as_str)
            .filter(|v| !v.trim().is_empty())
            .map(str::to_string)
    }
}

pub struct ResourceGraphSource {
    client: ArmClient,
}

impl ResourceGraphSource {
    pub fn new(client: ArmClient) -> Self {
        Self { client }
    }

    fn query_rows(&self, scope: &SubscriptionScope) -> Result<Vec<GraphRow>, FetchError> {
        let url = self.client.url(
            "/providers/Microsoft.ResourceGraph/resources",
            RESOURCE_GRAPH_API_VERSION,
        )?;
        let query = build_query(&scope.resource_groups);

        let mut rows = Vec::new();
        let mut guard = PageGuard::new(url.as_str());
        let mut skip_token: Option<String> = None;
        loop {
            let request = QueryRequest {
                subscriptions: [scope.subscription_id.as_str()],
                query: &query,
                options: QueryOptions {
                    result_format: "objectArray",
                    top: PAGE_SIZE,
                    skip_token: skip_token.as_deref(),
                },
            };
            let response: QueryResponse = self.client.post_json(&url, &request)?;
            rows.extend(response.data);

            match response.skip_token.filter(|t| !t.is_empty()) {
                Some(token) => {
                    guard.follow(&token)?;
                    skip_token = Some(token);
                }
                None => break,
            }
        }

        Ok(rows)
    }

    fn load_record(&self, row: GraphRow) -> Result<FunctionAppRecord, FetchError> {
        let mut net_framework_version = row.net_framework_version();
        let mut linux_fx_version = row.linux_fx_version();

        if net_framework_version.is_none() && linux_fx_version.is_none() {
            let config =
                fetch_site_config(&self.client, &row.subscription_id, &row.resource_group, &row.name)?;
            net_framework_version = config.net_framework_version;
            linux_fx_version = config.linux_fx_version;
        }

        let app_settings =
            fetch_app_settings(&self.client, &row.subscription_id, &row.resource_group, &row.name)?;

        Ok(FunctionAppRecord {
            subscription_id: row.subscription_id,
            resource_group: row.resource_group,
            name: row.name,
            location: row.location,
            kind: row.kind,
            net_framework_version,
            linux_fx_version,
            app_settings,
        })
    }
}

impl FunctionAppSource for ResourceGraphSource {
    fn name(&self) -> &'static str {
        "graph"
    }

    fn fetch_function_apps(
        &self,
        scope: &SubscriptionScope,
    ) -> Result<Vec<FunctionAppRecord>, FetchError> {
        let mut rows = self.query_rows(scope)?;
        debug!(subscription = %scope.subscription_id, rows = rows.len(), "resource graph query complete");

        for row in &mut rows {
            if row.subscription_id.is_empty() {
                row.subscription_id = scope.subscription_id.clone();
            }
            if row.resource_group.is_empty() {
                if let Some(group) = resource_group_from_id(&row.id) {
                    row.resource_group = group.to_string();
                }
            }
        }

        let records = rows
            .into_par_iter()
            .filter_map(|row| {
                let name = row.name.clone();
                let group = row.resource_group.clone();
                match self.load_record(row) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        warn!(app = %name, resource_group = %group, error = %err, "skipping app, configuration unavailable");
                        None
                    }
                }
            })
            .collect();

        Ok(records)
    }
}

fn build_query(resource_groups: &[String]) -> String {
    if resource_groups.is_empty() {
        return format!("{} {}", BASE_QUERY, PROJECTION);
    }

    let groups = resource_groups
        .iter()
        .map(|rg| format!("'{}'", rg.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} | where resourceGroup in~ ({}) {}",
        BASE_QUERY, groups, PROJECTION
    )
}
