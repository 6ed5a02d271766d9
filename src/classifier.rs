//! Runtime stack classification.
//!
//! Rules are evaluated in a fixed priority order and the first one that
//! applies wins:
//!
//! 1. `FUNCTIONS_WORKER_RUNTIME` app setting
//! 2. `linuxFxVersion` runtime token (Linux apps only)
//! 3. `netFrameworkVersion` site property
//! 4. otherwise `unknown`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::runtime::RuntimeStack;
use crate::signals::AppSignals;

/// Which signal decided the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeSource {
    WorkerRuntimeSetting,
    LinuxFxVersion,
    NetFrameworkVersion,
    None,
}

impl fmt::Display for RuntimeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RuntimeSource::WorkerRuntimeSetting => "FUNCTIONS_WORKER_RUNTIME",
            RuntimeSource::LinuxFxVersion => "linuxFxVersion",
            RuntimeSource::NetFrameworkVersion => "netFrameworkVersion",
            RuntimeSource::None => "none",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub stack: RuntimeStack,
    pub source: RuntimeSource,
}

pub fn classify(signals: &AppSignals<'_>) -> RuntimeStack {
    classify_with_source(signals).stack
}

pub fn classify_with_source(signals: &AppSignals<'_>) -> Classification {
    if let Some(worker_runtime) = signals.worker_runtime() {
        let mut stack = RuntimeStack::from_worker_runtime(worker_runtime);
        if stack == RuntimeStack::Dotnet && has_isolated_evidence(signals) {
            stack = RuntimeStack::DotnetIsolated;
        }
        return Classification {
            stack,
            source: RuntimeSource::WorkerRuntimeSetting,
        };
    }

    if signals.kind.is_linux() {
        if let Some(fx) = signals.linux_fx {
            return Classification {
                stack: fx.stack_hint().unwrap_or(RuntimeStack::Unknown),
                source: RuntimeSource::LinuxFxVersion,
            };
        }
    }

    if let Some(framework) = signals.net_framework {
        let stack = if framework.is_isolated_candidate() {
            RuntimeStack::DotnetIsolated
        } else {
            RuntimeStack::Dotnet
        };
        return Classification {
            stack,
            source: RuntimeSource::NetFrameworkVersion,
        };
    }

    Classification {
        stack: RuntimeStack::Unknown,
        source: RuntimeSource::None,
    }
}

/// A `dotnet` worker runtime is treated as isolated when the extension
/// version says so, or when the framework version is v6+ and the kind
/// carries no explicit in-process marker.
fn has_isolated_evidence(signals: &AppSignals<'_>) -> bool {
    let extension_says_isolated = signals
        .extension_version()
        .is_some_and(|v| v.to_ascii_lowercase().contains("isolated"));

    let framework_suggests_isolated = signals
        .net_framework
        .is_some_and(|f| f.is_isolated_candidate())
        && !signals.kind.in_process_marker;

    extension_says_isolated || framework_suggests_isolated
}
