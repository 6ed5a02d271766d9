//! Runtime stack and hosting model identifiers.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Canonical runtime stack of a Function App.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeStack {
    Dotnet,
    DotnetIsolated,
    Python,
    Node,
    Java,
    Powershell,
    Unknown,
}

impl RuntimeStack {
    pub const ALL: [RuntimeStack; 7] = [
        RuntimeStack::Dotnet,
        RuntimeStack::DotnetIsolated,
        RuntimeStack::Python,
        RuntimeStack::Node,
        RuntimeStack::Java,
        RuntimeStack::Powershell,
        RuntimeStack::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RuntimeStack::Dotnet => "dotnet",
            RuntimeStack::DotnetIsolated => "dotnet-isolated",
            RuntimeStack::Python => "python",
            RuntimeStack::Node => "node",
            RuntimeStack::Java => "java",
            RuntimeStack::Powershell => "powershell",
            RuntimeStack::Unknown => "unknown",
        }
    }

    pub fn is_dotnet(self) -> bool {
        matches!(self, RuntimeStack::Dotnet | RuntimeStack::DotnetIsolated)
    }

    /// Map a `FUNCTIONS_WORKER_RUNTIME` literal onto a stack.
    ///
    /// Literals outside the known set (e.g. `custom`) map to `Unknown`.
    pub fn from_worker_runtime(value: &str) -> RuntimeStack {
        value.parse().unwrap_or(RuntimeStack::Unknown)
    }

    pub fn hosting_model(self) -> HostingModel {
        match self {
            RuntimeStack::Dotnet => HostingModel::InProcess,
            RuntimeStack::DotnetIsolated => HostingModel::Isolated,
            _ => HostingModel::NotApplicable,
        }
    }
}

impl fmt::Display for RuntimeStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeStack {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dotnet" => Ok(RuntimeStack::Dotnet),
            "dotnet-isolated" => Ok(RuntimeStack::DotnetIsolated),
            "python" => Ok(RuntimeStack::Python),
            "node" => Ok(RuntimeStack::Node),
            "java" => Ok(RuntimeStack::Java),
            "powershell" => Ok(RuntimeStack::Powershell),
            "unknown" => Ok(RuntimeStack::Unknown),
            other => Err(format!(
                "unknown runtime stack '{}', expected one of: dotnet, dotnet-isolated, python, node, java, powershell, unknown",
                other
            )),
        }
    }
}

/// Clap value parser for `--runtime`.
pub fn parse_runtime_stack(value: &str) -> Result<RuntimeStack, String> {
    value.parse()
}

/// Whether a .NET app runs in the host process or in its own worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostingModel {
    InProcess,
    Isolated,
    NotApplicable,
}

impl HostingModel {
    pub fn as_str(self) -> &'static str {
        match self {
            HostingModel::InProcess => "in-process",
            HostingModel::Isolated => "isolated",
            HostingModel::NotApplicable => "not-applicable",
        }
    }
}

impl fmt::Display for HostingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_runtime_literals() {
        assert_eq!(RuntimeStack::from_worker_runtime("PYTHON"), RuntimeStack::Python);
        assert_eq!(
            RuntimeStack::from_worker_runtime("dotnet-isolated"),
            RuntimeStack::DotnetIsolated
        );
        assert_eq!(RuntimeStack::from_worker_runtime("custom"), RuntimeStack::Unknown);
    }

    #[test]
    fn test_display_matches_serde_names() {
        for stack in RuntimeStack::ALL {
            let json = serde_json::to_string(&stack).unwrap();
            assert_eq!(json, format!("\"{}\"", stack));
        }
    }

    #[test]
    fn test_hosting_model() {
        assert_eq!(RuntimeStack::Dotnet.hosting_model(), HostingModel::InProcess);
        assert_eq!(RuntimeStack::DotnetIsolated.hosting_model(), HostingModel::Isolated);
        assert_eq!(RuntimeStack::Node.hosting_model(), HostingModel::NotApplicable);
    }

    #[test]
    fn test_parse_runtime_stack_rejects_garbage() {
        let err = parse_runtime_stack("cobol").unwrap_err();
        assert!(err.contains("cobol"));
    }
}
