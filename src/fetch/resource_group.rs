//! Per-resource-group discovery through plain ARM calls.
//!
//! Slower than the Resource Graph path but works with permissions that
//! Resource Graph does not honour, and reads the site config directly.

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, warn};

use super::site::{fetch_app_settings, fetch_site_config, SiteResource};
use super::{is_function_app_kind, FunctionAppSource, SubscriptionScope};
use crate::azure::{segment, ArmClient, RESOURCE_GROUPS_API_VERSION, SITES_API_VERSION};
use crate::error::FetchError;
use crate::record::FunctionAppRecord;

#[derive(Debug, Deserialize)]
struct ResourceGroup {
    name: String,
}

pub struct ResourceGroupSource {
    client: ArmClient,
}

impl ResourceGroupSource {
    pub fn new(client: ArmClient) -> Self {
        Self { client }
    }

    fn resource_groups(&self, scope: &SubscriptionScope) -> Result<Vec<String>, FetchError> {
        if !scope.resource_groups.is_empty() {
            return Ok(scope.resource_groups.clone());
        }

        let path = format!(
            "/subscriptions/{}/resourcegroups",
            segment(&scope.subscription_id)
        );
        let url = self.client.url(&path, RESOURCE_GROUPS_API_VERSION)?;
        let groups: Vec<ResourceGroup> = self.client.get_paged(&url)?;
        Ok(groups.into_iter().map(|g| g.name).collect())
    }

    fn function_apps_in_group(
        &self,
        subscription_id: &str,
        resource_group: &str,
    ) -> Result<Vec<SiteResource>, FetchError> {
        let path = format!(
            "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Web/sites",
            segment(subscription_id),
            segment(resource_group)
        );
        let url = self.client.url(&path, SITES_API_VERSION)?;
        let sites: Vec<SiteResource> = self.client.get_paged(&url)?;
        Ok(sites
            .into_iter()
            .filter(|site| is_function_app_kind(&site.kind))
            .collect())
    }

    fn load_record(
        &self,
        subscription_id: &str,
        resource_group: &str,
        site: SiteResource,
    ) -> Result<FunctionAppRecord, FetchError> {
        // The list response rarely carries siteConfig; fall back to config/web.
        let config = match site.properties.site_config.clone() {
            Some(config) if !config.is_empty() => config,
            _ => fetch_site_config(&self.client, subscription_id, resource_group, &site.name)?,
        };
        let app_settings =
            fetch_app_settings(&self.client, subscription_id, resource_group, &site.name)?;

        Ok(FunctionAppRecord {
            subscription_id: subscription_id.to_string(),
            resource_group: resource_group.to_string(),
            name: site.name,
            location: site.location,
            kind: site.kind,
            net_framework_version: config.net_framework_version,
            linux_fx_version: config.linux_fx_version,
            app_settings,
        })
    }
}

impl FunctionAppSource for ResourceGroupSource {
    fn name(&self) -> &'static str {
        "resource-group"
    }

    fn fetch_function_apps(
        &self,
        scope: &SubscriptionScope,
    ) -> Result<Vec<FunctionAppRecord>, FetchError> {
        let subscription_id = scope.subscription_id.as_str();
        let groups = self.resource_groups(scope)?;
        debug!(subscription = %subscription_id, groups = groups.len(), "listing sites per resource group");

        let mut sites: Vec<(String, SiteResource)> = Vec::new();
        for group in groups {
            match self.function_apps_in_group(subscription_id, &group) {
                Ok(found) => sites.extend(found.into_iter().map(|site| (group.clone(), site))),
                Err(err @ FetchError::Unauthorized { .. }) => return Err(err),
                Err(err) => {
                    warn!(subscription = %subscription_id, resource_group = %group, error = %err, "skipping resource group");
                }
            }
        }

        let records = sites
            .into_par_iter()
            .filter_map(|(group, site)| {
                let name = site.name.clone();
                match self.load_record(subscription_id, &group, site) {
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
