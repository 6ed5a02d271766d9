//! Runtime version resolution.
//!
//! Each stack has its own ordered list of version sources. The first one
//! that yields a value wins; when none do, a descriptive placeholder is
//! returned. The result is always a displayable string.

use crate::runtime::RuntimeStack;
use crate::settings;
use crate::signals::{AppSignals, FxRuntime};

/// Returned when nothing at all is known about the runtime version.
pub const NOT_AVAILABLE: &str = "N/A";

pub const PYTHON_NOT_SPECIFIED: &str = "Python (version not specified)";
pub const NODE_NOT_SPECIFIED: &str = "Node.js (version not specified)";
pub const DOTNET_NOT_SPECIFIED: &str = ".NET (version not specified)";
pub const JAVA_NOT_SPECIFIED: &str = "Java (version not specified)";
pub const POWERSHELL_NOT_SPECIFIED: &str = "PowerShell (version not specified)";

const DOTNET_V4_ISOLATED_DEFAULT: &str = ".NET 8.0 (Isolated, Functions v4 default)";
const DOTNET_V4_IN_PROCESS_DEFAULT: &str = ".NET 6.0 (In-Process, Functions v4 default)";

pub fn resolve_version(signals: &AppSignals<'_>, stack: RuntimeStack) -> String {
    // Authoritative when set: returned exactly as stored, padding included.
    if let Some(version) = signals
        .settings
        .get(settings::FUNCTIONS_WORKER_RUNTIME_VERSION)
        .filter(|v| !v.is_empty())
    {
        return version.to_string();
    }

    match stack {
        RuntimeStack::Python => resolve_python(signals),
        RuntimeStack::Node => resolve_node(signals),
        RuntimeStack::Dotnet | RuntimeStack::DotnetIsolated => resolve_dotnet(signals, stack),
        RuntimeStack::Java => resolve_java(signals),
        RuntimeStack::Powershell => resolve_powershell(signals),
        RuntimeStack::Unknown => NOT_AVAILABLE.to_string(),
    }
}

/// Whether a resolved display string carries any version information.
pub fn is_detected(display: &str) -> bool {
    display != NOT_AVAILABLE
}

fn resolve_python(signals: &AppSignals<'_>) -> String {
    if let Some(version) = signals.settings.non_empty(settings::PYTHON_VERSION) {
        return version.to_string();
    }
    if let Some(version) = signals.fx_version(FxRuntime::Python) {
        return version.to_string();
    }
    if let Some(path) = signals.settings.non_empty(settings::PYTHONPATH) {
        return format!("Python (PYTHONPATH: {})", path);
    }
    PYTHON_NOT_SPECIFIED.to_string()
}

fn resolve_node(signals: &AppSignals<'_>) -> String {
    if let Some(version) = signals
        .settings
        .non_empty(settings::WEBSITE_NODE_DEFAULT_VERSION)
    {
        // "~18" pins a major version; report just the number
        let version = version.strip_prefix('~').unwrap_or(version);
        if !version.is_empty() {
            return version.to_string();
        }
    }
    if let Some(version) = signals.fx_version(FxRuntime::Node) {
        return version.to_string();
    }
    if let Some(version) = signals.settings.non_empty(settings::NODE_VERSION) {
        return version.to_string();
    }
    NODE_NOT_SPECIFIED.to_string()
}

fn resolve_dotnet(signals: &AppSignals<'_>, stack: RuntimeStack) -> String {
    let isolated = stack == RuntimeStack::DotnetIsolated;

    if let Some(framework) = signals.net_framework {
        let model = if isolated { "Isolated" } else { "In-Process" };
        return format!("{} ({})", framework.as_str(), model);
    }
    if let Some(version) = signals.settings.non_empty(settings::DOTNET_VERSION) {
        return version.to_string();
    }
    if let Some(version) = signals.fx_version(FxRuntime::Dotnet) {
        return if isolated {
            format!("{} (Isolated)", version)
        } else {
            version.to_string()
        };
    }
    if signals.extension_version().is_some_and(|v| v.starts_with("~4")) {
        let default = if isolated {
            DOTNET_V4_ISOLATED_DEFAULT
        } else {
            DOTNET_V4_IN_PROCESS_DEFAULT
        };
        return default.to_string();
    }
    DOTNET_NOT_SPECIFIED.to_string()
}

fn resolve_java(signals: &AppSignals<'_>) -> String {
    signals
        .settings
        .non_empty(settings::JAVA_VERSION)
        .or_else(|| signals.fx_version(FxRuntime::Java))
        .map(str::to_string)
        .unwrap_or_else(|| JAVA_NOT_SPECIFIED.to_string())
}

fn resolve_powershell(signals: &AppSignals<'_>) -> String {
    signals
        .settings
        .non_empty(settings::POWERSHELL_VERSION)
        .or_else(|| signals.fx_version(FxRuntime::Powershell))
        .map(str::to_string)
        .unwrap_or_else(|| POWERSHELL_NOT_SPECIFIED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FunctionAppRecord;

    fn resolve(record: &FunctionAppRecord, stack: RuntimeStack) -> String {
        resolve_version(&AppSignals::from_record(record), stack)
    }

    fn record() -> FunctionAppRecord {
        FunctionAppRecord::new("sub", "rg", "app").with_kind("functionapp,linux")
    }

    #[test]
    fn test_worker_runtime_version_short_circuits() {
        let r = record()
            .with_setting("FUNCTIONS_WORKER_RUNTIME_VERSION", "3.9")
            .with_setting("PYTHON_VERSION", "3.11")
            .with_linux_fx_version("PYTHON|3.10");
        for stack in RuntimeStack::ALL {
            assert_eq!(resolve(&r, stack), "3.9");
        }
    }

    #[test]
    fn test_worker_runtime_version_is_returned_verbatim() {
        for raw in [" 3.9 ", "3.9\n", "   "] {
            let r = record()
                .with_linux_fx_version("PYTHON|3.11")
                .with_setting("FUNCTIONS_WORKER_RUNTIME_VERSION", raw);
            assert_eq!(resolve(&r, RuntimeStack::Python), raw);
        }

        let r = record()
            .with_linux_fx_version("PYTHON|3.11")
            .with_setting("FUNCTIONS_WORKER_RUNTIME_VERSION", "");
        assert_eq!(resolve(&r, RuntimeStack::Python), "3.11");
    }

    #[test]
    fn test_python_chain() {
        let r = record()
            .with_setting("PYTHON_VERSION", "3.11")
            .with_linux_fx_version("PYTHON|3.10");
        assert_eq!(resolve(&r, RuntimeStack::Python), "3.11");

        let r = record().with_linux_fx_version("PYTHON|3.10");
        assert_eq!(resolve(&r, RuntimeStack::Python), "3.10");

        let r = record().with_setting("PYTHONPATH", "/home/site/wwwroot");
        assert_eq!(
            resolve(&r, RuntimeStack::Python),
            "Python (PYTHONPATH: /home/site/wwwroot)"
        );

        assert_eq!(resolve(&record(), RuntimeStack::Python), PYTHON_NOT_SPECIFIED);
    }

    #[test]
    fn test_python_malformed_fx_falls_through() {
        let r = record().with_linux_fx_version("PYTHON-3.10");
        assert_eq!(resolve(&r, RuntimeStack::Python), PYTHON_NOT_SPECIFIED);
    }

    #[test]
    fn test_node_chain() {
        let r = record().with_setting("WEBSITE_NODE_DEFAULT_VERSION", "~18");
        assert_eq!(resolve(&r, RuntimeStack::Node), "18");

        let r = record()
            .with_linux_fx_version("NODE|20")
            .with_setting("NODE_VERSION", "16");
        assert_eq!(resolve(&r, RuntimeStack::Node), "20");

        let r = record().with_setting("NODE_VERSION", "~16");
        assert_eq!(resolve(&r, RuntimeStack::Node), "~16");

        assert_eq!(resolve(&record(), RuntimeStack::Node), NODE_NOT_SPECIFIED);
    }

    #[test]
    fn test_tilde_only_node_default_falls_through() {
        let r = record()
            .with_setting("WEBSITE_NODE_DEFAULT_VERSION", "~")
            .with_setting("NODE_VERSION", "18");
        assert_eq!(resolve(&r, RuntimeStack::Node), "18");
    }

    #[test]
    fn test_dotnet_framework_suffix() {
        let r = record().with_net_framework_version("v6.0");
        assert_eq!(resolve(&r, RuntimeStack::DotnetIsolated), "v6.0 (Isolated)");
        assert_eq!(resolve(&r, RuntimeStack::Dotnet), "v6.0 (In-Process)");
    }

    #[test]
    fn test_dotnet_version_setting() {
        let r = record()
            .with_setting("DOTNET_VERSION", "8.0")
            .with_linux_fx_version("DOTNET|6.0");
        assert_eq!(resolve(&r, RuntimeStack::DotnetIsolated), "8.0");
    }

    #[test]
    fn test_dotnet_linux_fx() {
        let r = record().with_linux_fx_version("DOTNET-ISOLATED|8.0");
        assert_eq!(resolve(&r, RuntimeStack::DotnetIsolated), "8.0 (Isolated)");
        assert_eq!(resolve(&r, RuntimeStack::Dotnet), "8.0");
    }

    #[test]
    fn test_dotnet_v4_defaults() {
        let r = record().with_setting("FUNCTIONS_EXTENSION_VERSION", "~4");
        assert_eq!(
            resolve(&r, RuntimeStack::DotnetIsolated),
            DOTNET_V4_ISOLATED_DEFAULT
        );
        assert_eq!(resolve(&r, RuntimeStack::Dotnet), DOTNET_V4_IN_PROCESS_DEFAULT);

        let r = record().with_setting("FUNCTIONS_EXTENSION_VERSION", "~3");
        assert_eq!(resolve(&r, RuntimeStack::Dotnet), DOTNET_NOT_SPECIFIED);
    }

    #[test]
    fn test_java_and_powershell_chains() {
        let r = record().with_linux_fx_version("JAVA|11-java11");
        assert_eq!(resolve(&r, RuntimeStack::Java), "11-java11");
        let r = r.with_setting("JAVA_VERSION", "17");
        assert_eq!(resolve(&r, RuntimeStack::Java), "17");
        assert_eq!(resolve(&record(), RuntimeStack::Java), JAVA_NOT_SPECIFIED);

        let r = record().with_linux_fx_version("PowerShell|7.4");
        assert_eq!(resolve(&r, RuntimeStack::Powershell), "7.4");
        let r = r.with_setting("POWERSHELL_VERSION", "7.2");
        assert_eq!(resolve(&r, RuntimeStack::Powershell), "7.2");
        assert_eq!(
            resolve(&record(), RuntimeStack::Powershell),
            POWERSHELL_NOT_SPECIFIED
        );
    }

    #[test]
    fn test_unknown_is_not_available() {
        let r = record().with_setting("PYTHON_VERSION", "3.11");
        assert_eq!(resolve(&r, RuntimeStack::Unknown), NOT_AVAILABLE);
        assert!(!is_detected(NOT_AVAILABLE));
        assert!(is_detected(JAVA_NOT_SPECIFIED));
    }
}
