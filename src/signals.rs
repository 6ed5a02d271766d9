//! Parsing boundary between raw resource records and the classifier.
//!
//! The resource API exposes runtime identity through free-text tags
//! (`kind`), pipe-delimited strings (`linuxFxVersion`) and loosely typed
//! app settings. All substring and regex matching on those values lives in
//! this module; everything downstream works on the typed views below.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::record::FunctionAppRecord;
use crate::runtime::RuntimeStack;
use crate::settings;

/// Operating system the app is hosted on, derived from `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPlatform {
    Windows,
    Linux,
}

/// Parsed view of the comma-separated `kind` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppKind {
    pub platform: HostPlatform,
    /// A kind token explicitly naming the in-process .NET model.
    pub in_process_marker: bool,
}

impl AppKind {
    pub fn parse(kind: &str) -> Self {
        let lowered = kind.to_ascii_lowercase();
        let platform = if lowered.contains("linux") {
            HostPlatform::Linux
        } else {
            HostPlatform::Windows
        };
        let in_process_marker = lowered
            .split(',')
            .map(str::trim)
            .any(|token| token.contains("inprocess") || token.contains("in-process"));

        Self {
            platform,
            in_process_marker,
        }
    }

    pub fn is_linux(&self) -> bool {
        self.platform == HostPlatform::Linux
    }
}

/// Runtime tokens that can carry a version inside `linuxFxVersion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxRuntime {
    Python,
    Node,
    Dotnet,
    Java,
    Powershell,
}

impl FxRuntime {
    const ORDERED: [FxRuntime; 5] = [
        FxRuntime::Python,
        FxRuntime::Node,
        FxRuntime::Dotnet,
        FxRuntime::Java,
        FxRuntime::Powershell,
    ];

    fn needle(self) -> &'static str {
        match self {
            FxRuntime::Python => "python",
            FxRuntime::Node => "node",
            FxRuntime::Dotnet => "dotnet",
            FxRuntime::Java => "java",
            FxRuntime::Powershell => "powershell",
        }
    }

    /// Linux .NET apps always run on the isolated worker.
    fn stack(self) -> RuntimeStack {
        match self {
            FxRuntime::Python => RuntimeStack::Python,
            FxRuntime::Node => RuntimeStack::Node,
            FxRuntime::Dotnet => RuntimeStack::DotnetIsolated,
            FxRuntime::Java => RuntimeStack::Java,
            FxRuntime::Powershell => RuntimeStack::Powershell,
        }
    }

    fn pattern(self) -> &'static Regex {
        static PATTERNS: OnceLock<[Regex; 5]> = OnceLock::new();
        let patterns = PATTERNS.get_or_init(|| {
            [
                r"(?i)PYTHON\|(.+)",
                r"(?i)NODE\|(.+)",
                r"(?i)DOTNET(?:-ISOLATED)?\|(.+)",
                r"(?i)JAVA\|(.+)",
                r"(?i)POWERSHELL\|(.+)",
            ]
            .map(|p| Regex::new(p).expect("static linuxFxVersion pattern is valid"))
        });

        match self {
            FxRuntime::Python => &patterns[0],
            FxRuntime::Node => &patterns[1],
            FxRuntime::Dotnet => &patterns[2],
            FxRuntime::Java => &patterns[3],
            FxRuntime::Powershell => &patterns[4],
        }
    }
}

/// Parsed `linuxFxVersion` (`RUNTIME|VERSION`).
///
/// Strings that do not follow the pipe format are kept; they simply yield
/// no version for any runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinuxFxVersion<'a> {
    raw: &'a str,
    stack_hint: Option<RuntimeStack>,
}

impl<'a> LinuxFxVersion<'a> {
    pub fn parse(raw: &'a str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let lowered = raw.to_ascii_lowercase();
        let stack_hint = FxRuntime::ORDERED
            .iter()
            .find(|runtime| lowered.contains(runtime.needle()))
            .map(|runtime| runtime.stack());

        Some(Self { raw, stack_hint })
    }

    /// Stack implied by the runtime token, first match in the order
    /// python, node, dotnet, java, powershell.
    pub fn stack_hint(&self) -> Option<RuntimeStack> {
        self.stack_hint
    }

    /// Version following `RUNTIME|` for the given runtime token.
    pub fn version_for(&self, runtime: FxRuntime) -> Option<&'a str> {
        runtime
            .pattern()
            .captures(self.raw)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|v| !v.is_empty())
    }
}

/// Parsed `netFrameworkVersion` site property (e.g. `v6.0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetFrameworkVersion<'a>(&'a str);

impl<'a> NetFrameworkVersion<'a> {
    pub fn parse(raw: &'a str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &'a str {
        self.0
    }

    /// `v6`, `v7` and `v8` are the framework versions the isolated worker
    /// was introduced with. This is a heuristic, not a guarantee.
    pub fn is_isolated_candidate(&self) -> bool {
        let lowered = self.0.to_ascii_lowercase();
        ["v6", "v7", "v8"].iter().any(|p| lowered.starts_with(p))
    }
}

/// Read-only view of an app's settings.
///
/// Azure treats setting names case-insensitively, so lookups fall back to
/// a case-insensitive match when the exact name is missing.
#[derive(Debug, Clone, Copy)]
pub struct AppSettings<'a>(&'a BTreeMap<String, String>);

impl<'a> AppSettings<'a> {
    pub fn new(map: &'a BTreeMap<String, String>) -> Self {
        Self(map)
    }

    pub fn get(&self, name: &str) -> Option<&'a str> {
        if let Some(value) = self.0.get(name) {
            return Some(value.as_str());
        }
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Setting value, treating blank values as absent.
    pub fn non_empty(&self, name: &str) -> Option<&'a str> {
        self.get(name).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

/// Typed runtime signals of one record.
#[derive(Debug, Clone, Copy)]
pub struct AppSignals<'a> {
    pub kind: AppKind,
    pub linux_fx: Option<LinuxFxVersion<'a>>,
    pub net_framework: Option<NetFrameworkVersion<'a>>,
    pub settings: AppSettings<'a>,
}

impl<'a> AppSignals<'a> {
    pub fn from_record(record: &'a FunctionAppRecord) -> Self {
        Self {
            kind: AppKind::parse(&record.kind),
            linux_fx: record
                .linux_fx_version
                .as_deref()
                .and_then(LinuxFxVersion::parse),
            net_framework: record
                .net_framework_version
                .as_deref()
                .and_then(NetFrameworkVersion::parse),
            settings: AppSettings::new(&record.app_settings),
        }
    }

    pub fn worker_runtime(&self) -> Option<&'a str> {
        self.settings.non_empty(settings::FUNCTIONS_WORKER_RUNTIME)
    }

    pub fn extension_version(&self) -> Option<&'a str> {
        self.settings.non_empty(settings::FUNCTIONS_EXTENSION_VERSION)
    }

    pub fn fx_version(&self, runtime: FxRuntime) -> Option<&'a str> {
        self.linux_fx.and_then(|fx| fx.version_for(runtime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_platform() {
        assert_eq!(AppKind::parse("functionapp").platform, HostPlatform::Windows);
        assert_eq!(
            AppKind::parse("functionapp,linux").platform,
            HostPlatform::Linux
        );
        assert!(AppKind::parse("FunctionApp,Linux,Container").is_linux());
    }

    #[test]
    fn test_kind_in_process_marker() {
        assert!(!AppKind::parse("functionapp").in_process_marker);
        assert!(AppKind::parse("functionapp,inprocess").in_process_marker);
        assert!(AppKind::parse("functionapp, In-Process").in_process_marker);
    }

    #[test]
    fn test_linux_fx_stack_hint_order() {
        let fx = LinuxFxVersion::parse("PYTHON|3.11").unwrap();
        assert_eq!(fx.stack_hint(), Some(RuntimeStack::Python));

        let fx = LinuxFxVersion::parse("DOTNET-ISOLATED|8.0").unwrap();
        assert_eq!(fx.stack_hint(), Some(RuntimeStack::DotnetIsolated));

        let fx = LinuxFxVersion::parse("Node|20").unwrap();
        assert_eq!(fx.stack_hint(), Some(RuntimeStack::Node));

        let fx = LinuxFxVersion::parse("DOCKER|myregistry/image:latest").unwrap();
        assert_eq!(fx.stack_hint(), None);
    }

    #[test]
    fn test_linux_fx_blank_is_absent() {
        assert!(LinuxFxVersion::parse("").is_none());
        assert!(LinuxFxVersion::parse("   ").is_none());
    }

    #[test]
    fn test_linux_fx_version_extraction() {
        let fx = LinuxFxVersion::parse("python|3.10").unwrap();
        assert_eq!(fx.version_for(FxRuntime::Python), Some("3.10"));
        assert_eq!(fx.version_for(FxRuntime::Node), None);

        let fx = LinuxFxVersion::parse("JAVA|11-java11").unwrap();
        assert_eq!(fx.version_for(FxRuntime::Java), Some("11-java11"));

        let fx = LinuxFxVersion::parse("DOTNET-ISOLATED|8.0").unwrap();
        assert_eq!(fx.version_for(FxRuntime::Dotnet), Some("8.0"));
    }

    #[test]
    fn test_linux_fx_malformed_yields_no_version() {
        let fx = LinuxFxVersion::parse("PYTHON3.11").unwrap();
        assert_eq!(fx.stack_hint(), Some(RuntimeStack::Python));
        assert_eq!(fx.version_for(FxRuntime::Python), None);

        let fx = LinuxFxVersion::parse("PYTHON|").unwrap();
        assert_eq!(fx.version_for(FxRuntime::Python), None);
    }

    #[test]
    fn test_net_framework_isolated_candidate() {
        assert!(NetFrameworkVersion::parse("v6.0").unwrap().is_isolated_candidate());
        assert!(NetFrameworkVersion::parse("V8.0").unwrap().is_isolated_candidate());
        assert!(!NetFrameworkVersion::parse("v4.0").unwrap().is_isolated_candidate());
        assert!(NetFrameworkVersion::parse(" ").is_none());
    }

    #[test]
    fn test_settings_case_insensitive_lookup() {
        let mut map = BTreeMap::new();
        map.insert("functions_worker_runtime".to_string(), "node".to_string());
        map.insert("PYTHON_VERSION".to_string(), "  ".to_string());
        let settings = AppSettings::new(&map);

        assert_eq!(settings.get("FUNCTIONS_WORKER_RUNTIME"), Some("node"));
        assert!(settings.contains("PYTHON_VERSION"));
        assert_eq!(settings.non_empty("PYTHON_VERSION"), None);
        assert_eq!(settings.get("NODE_VERSION"), None);
    }
}
