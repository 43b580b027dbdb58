use serde::{Deserialize, Serialize};

use crate::core::FailedFile;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginUsage {
    pub name: String,
    pub count: u64,
    pub manufacturer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManufacturerGroup {
    pub label: String,
    pub plugins: Vec<PluginUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPlugin {
    pub name: String,
    pub manufacturer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub plugins: Vec<ProjectPlugin>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub files_found: u64,
    pub files_parsed: u64,
    pub files_failed: u64,
    pub unique_plugins: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub schema_version: String,
    pub tool_version: String,
    pub generated_at: String,
    pub root: String,
    pub summary: ReportSummary,
    pub plugins: Vec<PluginUsage>,
    pub manufacturers: Vec<ManufacturerGroup>,
    pub projects: Vec<ProjectEntry>,
    pub failed_files: Vec<FailedFile>,
}
