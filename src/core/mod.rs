mod failure;
mod plugin;
mod report;
mod result;

pub use failure::{FailedFile, FailureKind, FileFailure};
pub use plugin::PluginReference;
pub use report::{
    ManufacturerGroup, PluginUsage, ProjectEntry, ProjectPlugin, Report, ReportSummary,
};
pub use result::ScanResult;
