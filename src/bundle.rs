//! Extension bundle estimation.
//!
//! The real bundle configuration lives in `host.json` inside the deployed
//! package, which the resource API does not expose. Everything here is a
//! guess derived from the runtime stack and the Functions host version,
//! and is always labelled as such.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::runtime::RuntimeStack;

pub const EXTENSION_BUNDLE_ID: &str = "Microsoft.Azure.Functions.ExtensionBundle";
pub const NOT_APPLICABLE: &str = "not applicable";
pub const UNKNOWN: &str = "unknown";

const RANGE_HOST_V4: &str = "[2.*, 4.0.0)";
const RANGE_HOST_V3: &str = "[1.*, 3.0.0)";
const RANGE_DEFAULT: &str = "[1.*, 2.0.0)";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum BundleEstimate {
    /// Compiled .NET apps reference extensions directly.
    NotApplicable,
    #[serde(rename_all = "camelCase")]
    Estimated {
        bundle_id: String,
        version_range: String,
    },
    /// Stack unknown, no basis for a guess.
    Unknown,
}

impl BundleEstimate {
    pub fn bundle_id(&self) -> &str {
        match self {
            BundleEstimate::NotApplicable => NOT_APPLICABLE,
            BundleEstimate::Estimated { bundle_id, .. } => bundle_id,
            BundleEstimate::Unknown => UNKNOWN,
        }
    }

    pub fn version_range(&self) -> &str {
        match self {
            BundleEstimate::NotApplicable => NOT_APPLICABLE,
            BundleEstimate::Estimated { version_range, .. } => version_range,
            BundleEstimate::Unknown => UNKNOWN,
        }
    }

    pub fn as_pair(&self) -> (&str, &str) {
        (self.bundle_id(), self.version_range())
    }

    pub fn is_estimate(&self) -> bool {
        matches!(self, BundleEstimate::Estimated { .. })
    }
}

impl fmt::Display for BundleEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleEstimate::NotApplicable => f.write_str(NOT_APPLICABLE),
            BundleEstimate::Estimated {
                bundle_id,
                version_range,
            } => write!(f, "{} {} (estimated)", bundle_id, version_range),
            BundleEstimate::Unknown => f.write_str(UNKNOWN),
        }
    }
}

pub fn estimate_bundle(stack: RuntimeStack, functions_extension_version: Option<&str>) -> BundleEstimate {
    if stack.is_dotnet() {
        return BundleEstimate::NotApplicable;
    }
    if stack == RuntimeStack::Unknown {
        return BundleEstimate::Unknown;
    }

    let host_version = functions_extension_version.map(str::trim).unwrap_or_default();
    let version_range = if host_version.starts_with("~4") {
        RANGE_HOST_V4
    } else if host_version.starts_with("~3") {
        RANGE_HOST_V3
    } else {
        RANGE_DEFAULT
    };

    BundleEstimate::Estimated {
        bundle_id: EXTENSION_BUNDLE_ID.to_string(),
        version_range: version_range.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotnet_is_never_applicable() {
        for host in [Some("~4"), Some("~3"), Some("~2"), None] {
            for stack in [RuntimeStack::Dotnet, RuntimeStack::DotnetIsolated] {
                let estimate = estimate_bundle(stack, host);
                assert_eq!(estimate.as_pair(), (NOT_APPLICABLE, NOT_APPLICABLE));
                assert!(!estimate.is_estimate());
            }
        }
    }

    #[test]
    fn test_host_version_ranges() {
        let estimate = estimate_bundle(RuntimeStack::Python, Some("~4"));
        assert_eq!(estimate.as_pair(), (EXTENSION_BUNDLE_ID, RANGE_HOST_V4));

        let estimate = estimate_bundle(RuntimeStack::Node, Some("~3"));
        assert_eq!(estimate.version_range(), RANGE_HOST_V3);

        let estimate = estimate_bundle(RuntimeStack::Java, Some("~2"));
        assert_eq!(estimate.version_range(), RANGE_DEFAULT);

        let estimate = estimate_bundle(RuntimeStack::Powershell, None);
        assert_eq!(estimate.version_range(), RANGE_DEFAULT);
        assert!(estimate.is_estimate());
    }

    #[test]
    fn test_unknown_stack() {
        let estimate = estimate_bundle(RuntimeStack::Unknown, Some("~4"));
        assert_eq!(estimate, BundleEstimate::Unknown);
    }

    #[test]
    fn test_display_labels_estimate() {
        let estimate = estimate_bundle(RuntimeStack::Python, Some("~4"));
        assert!(estimate.to_string().ends_with("(estimated)"));
    }

    #[test]
    fn test_serialized_shape() {
        let estimate = estimate_bundle(RuntimeStack::Node, Some("~4"));
        let json = serde_json::to_value(&estimate).unwrap();
        assert_eq!(json["status"], "estimated");
        assert_eq!(json["bundleId"], EXTENSION_BUNDLE_ID);
        assert_eq!(json["versionRange"], RANGE_HOST_V4);
    }
}
