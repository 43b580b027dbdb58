use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::core::{FailedFile, FileFailure};

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub usage_counts: HashMap<String, u64>,
    pub manufacturer_of: HashMap<String, String>,
    pub project_plugins: BTreeMap<String, Vec<String>>,
    pub failed_files: Vec<FailedFile>,
    pub files_found: u64,
    pub files_parsed: u64,
}

impl ScanResult {
    // usage_counts に現れる名前は必ず manufacturer_of にも現れる（最初の分類が勝つ）。
    pub fn record_reference(&mut self, project: &str, name: &str, manufacturer: &str) {
        *self.usage_counts.entry(name.to_string()).or_insert(0) += 1;
        self.manufacturer_of
            .entry(name.to_string())
            .or_insert_with(|| manufacturer.to_string());
        self.project_plugins
            .entry(project.to_string())
            .or_default()
            .push(name.to_string());
    }

    pub fn record_failure(&mut self, path: &Path, failure: FileFailure) {
        self.failed_files.push(FailedFile {
            path: path.display().to_string(),
            kind: failure.kind,
            reason: failure.reason,
        });
    }

    pub fn unique_plugins(&self) -> usize {
        self.usage_counts.len()
    }
}
