use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::classify::Classifier;
use crate::core::{
    ManufacturerGroup, PluginUsage, ProjectEntry, ProjectPlugin, Report, ReportSummary, ScanResult,
};
use crate::scan::Progress;

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub show_progress: bool,
}

#[derive(Clone)]
pub struct Engine {
    opts: EngineOptions,
    classifier: Classifier,
}

#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub root: PathBuf,
    pub exclude: Vec<String>,
    pub follow_links: bool,
}

impl Engine {
    pub fn new(opts: EngineOptions, classifier: Classifier) -> Self {
        Self { opts, classifier }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn audit(&self, req: &AuditRequest) -> Result<Report> {
        use std::io::IsTerminal;
        let progress_enabled = self.opts.show_progress && std::io::stderr().is_terminal();

        let mut pb: Option<indicatif::ProgressBar> = None;
        let result = {
            let mut progress = |p: Progress<'_>| match p {
                Progress::Listing => {
                    if progress_enabled {
                        let spinner = indicatif::ProgressBar::new_spinner();
                        spinner.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                        spinner.set_message(".als ファイルを列挙中...");
                        spinner.enable_steady_tick(Duration::from_millis(120));
                        pb = Some(spinner);
                    }
                }
                Progress::Found { total } => {
                    if let Some(spinner) = pb.take() {
                        spinner.finish_and_clear();
                    }
                    if progress_enabled && total > 0 {
                        let bar = indicatif::ProgressBar::new(total as u64);
                        bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
                        pb = Some(bar);
                    }
                }
                Progress::File { name, .. } => {
                    if let Some(bar) = pb.as_ref() {
                        bar.set_message(name.to_string());
                        bar.inc(1);
                    }
                }
            };
            crate::scan::scan(
                &req.root,
                &req.exclude,
                req.follow_links,
                &self.classifier,
                &mut progress,
            )
        };
        if let Some(bar) = pb {
            bar.finish_and_clear();
        }

        Ok(self.report_from_result(&req.root, result?))
    }

    // レポート向けの並び順はここで確定させ、描画側は並べ替えをしない。
    fn report_from_result(&self, root: &Path, result: ScanResult) -> Report {
        let mut plugins: Vec<PluginUsage> = result
            .usage_counts
            .iter()
            .map(|(name, count)| PluginUsage {
                name: name.clone(),
                count: *count,
                manufacturer: result
                    .manufacturer_of
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| crate::classify::UNKNOWN_MANUFACTURER.to_string()),
            })
            .collect();
        // 使用回数の降順、同数は名前の昇順（バイト順で決定的）。
        plugins.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));

        // ラベルの昇順。"Unknown" も他のラベルと同じ規則で並ぶ。
        let mut groups: BTreeMap<String, Vec<PluginUsage>> = BTreeMap::new();
        for plugin in &plugins {
            groups
                .entry(plugin.manufacturer.clone())
                .or_default()
                .push(plugin.clone());
        }
        let manufacturers = groups
            .into_iter()
            .map(|(label, plugins)| ManufacturerGroup { label, plugins })
            .collect();

        let projects = result
            .project_plugins
            .iter()
            .map(|(name, names)| {
                let mut seen: HashSet<&str> = HashSet::new();
                let plugins = names
                    .iter()
                    .filter(|n| seen.insert(n.as_str()))
                    .map(|n| ProjectPlugin {
                        name: n.clone(),
                        manufacturer: result
                            .manufacturer_of
                            .get(n)
                            .cloned()
                            .unwrap_or_else(|| {
                                crate::classify::UNKNOWN_MANUFACTURER.to_string()
                            }),
                    })
                    .collect();
                ProjectEntry {
                    name: name.clone(),
                    plugins,
                }
            })
            .collect();

        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());

        Report {
            schema_version: "1.0".to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at,
            root: root.display().to_string(),
            summary: ReportSummary {
                files_found: result.files_found,
                files_parsed: result.files_parsed,
                files_failed: result.failed_files.len() as u64,
                unique_plugins: result.unique_plugins() as u64,
            },
            plugins,
            manufacturers,
            projects,
            failed_files: result.failed_files,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::new(
            EngineOptions {
                show_progress: false,
            },
            Classifier::default(),
        )
    }

    #[test]
    fn usage_ties_break_on_ascending_name() {
        let mut result = ScanResult::default();
        for project in ["p1.als", "p2.als", "p3.als"] {
            result.record_reference(project, "A", "Unknown");
            result.record_reference(project, "B", "Unknown");
        }
        result.record_reference("p1.als", "C", "Unknown");
        result.files_found = 3;
        result.files_parsed = 3;

        let report = engine().report_from_result(Path::new("/tmp/x"), result);
        let names: Vec<&str> = report.plugins.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(report.plugins[0].count, 3);
        assert_eq!(report.plugins[2].count, 1);
    }

    #[test]
    fn manufacturers_sort_ascending_with_unknown_unspecial() {
        let mut result = ScanResult::default();
        result.record_reference("p.als", "a.dll", "Zebra Audio");
        result.record_reference("p.als", "b.dll", "Unknown");
        result.record_reference("p.als", "c.dll", "Acme DSP");

        let report = engine().report_from_result(Path::new("/tmp/x"), result);
        let labels: Vec<&str> = report
            .manufacturers
            .iter()
            .map(|g| g.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Acme DSP", "Unknown", "Zebra Audio"]);
    }

    #[test]
    fn manufacturer_group_plugins_sort_by_descending_count() {
        let mut result = ScanResult::default();
        result.record_reference("p1.als", "x.dll", "Acme DSP");
        result.record_reference("p2.als", "x.dll", "Acme DSP");
        result.record_reference("p1.als", "a.dll", "Acme DSP");

        let report = engine().report_from_result(Path::new("/tmp/x"), result);
        let group = &report.manufacturers[0];
        assert_eq!(group.label, "Acme DSP");
        assert_eq!(group.plugins[0].name, "x.dll");
        assert_eq!(group.plugins[0].count, 2);
        assert_eq!(group.plugins[1].name, "a.dll");
    }

    #[test]
    fn project_breakdown_collapses_duplicates_in_first_seen_order() {
        let mut result = ScanResult::default();
        result.record_reference("p.als", "Zeta", "Unknown");
        result.record_reference("p.als", "Alpha", "Unknown");
        result.record_reference("p.als", "Zeta", "Unknown");

        let report = engine().report_from_result(Path::new("/tmp/x"), result);
        let names: Vec<&str> = report.projects[0]
            .plugins
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn projects_sort_ascending_by_identifier() {
        let mut result = ScanResult::default();
        result.record_reference("b.als", "X", "Unknown");
        result.record_reference("a.als", "X", "Unknown");

        let report = engine().report_from_result(Path::new("/tmp/x"), result);
        let names: Vec<&str> = report.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a.als", "b.als"]);
    }

    #[test]
    fn summary_counts_cover_found_parsed_failed() {
        let mut result = ScanResult::default();
        result.files_found = 3;
        result.files_parsed = 2;
        result.record_failure(
            Path::new("/tmp/x/bad.als"),
            crate::core::FileFailure::format("gzip として展開できません"),
        );

        let report = engine().report_from_result(Path::new("/tmp/x"), result);
        assert_eq!(report.summary.files_found, 3);
        assert_eq!(report.summary.files_parsed, 2);
        assert_eq!(report.summary.files_failed, 1);
        assert_eq!(report.summary.unique_plugins, 0);
    }
}
