//! Well-known Function App application setting names.

pub const FUNCTIONS_WORKER_RUNTIME: &str = "FUNCTIONS_WORKER_RUNTIME";
pub const FUNCTIONS_WORKER_RUNTIME_VERSION: &str = "FUNCTIONS_WORKER_RUNTIME_VERSION";
pub const FUNCTIONS_EXTENSION_VERSION: &str = "FUNCTIONS_EXTENSION_VERSION";

pub const PYTHON_VERSION: &str = "PYTHON_VERSION";
pub const PYTHONPATH: &str = "PYTHONPATH";
pub const WEBSITE_NODE_DEFAULT_VERSION: &str = "WEBSITE_NODE_DEFAULT_VERSION";
pub const NODE_VERSION: &str = "NODE_VERSION";
pub const DOTNET_VERSION: &str = "DOTNET_VERSION";
pub const JAVA_VERSION: &str = "JAVA_VERSION";
pub const POWERSHELL_VERSION: &str = "POWERSHELL_VERSION";
