//! Azure Function App runtime inventory.
//!
//! Records come from a [`fetch::FunctionAppSource`], are turned into
//! [`signals::AppSignals`] once, and then classified, versioned and
//! bundle-estimated into an [`report::AppReport`]. Reports accumulate in an
//! [`inventory::Inventory`] which produces the summary statistics.

pub mod azure;
pub mod bundle;
pub mod classifier;
pub mod commands;
pub mod config;
pub mod error;
pub mod fetch;
pub mod inventory;
pub mod logging;
pub mod output;
pub mod record;
pub mod report;
pub mod runtime;
pub mod settings;
pub mod signals;
pub mod version;

pub use bundle::{estimate_bundle, BundleEstimate};
pub use classifier::classify;
pub use error::FetchError;
pub use inventory::{Inventory, InventorySummary};
pub use record::FunctionAppRecord;
pub use report::{classify_record, AppReport};
pub use runtime::{HostingModel, RuntimeStack};
pub use signals::AppSignals;
pub use version::resolve_version;
