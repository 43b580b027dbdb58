use std::fmt::Write as _;

use crate::core::Report;

// レポート本文は成果物として共有される前提で、元ツールと同じ英語のプレーンテキスト。
// 並び順は core::Report 側で確定済みで、ここでは整形だけを行う。
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "ABLETON VST AUDIT REPORT");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out, "Generated: {}", report.generated_at);
    let _ = writeln!(out, "Tool: alsaudit {}", report.tool_version);
    let _ = writeln!(out, "Root: {}", report.root);
    let _ = writeln!(out, "Projects found: {}", report.summary.files_found);
    let _ = writeln!(out, "Projects parsed: {}", report.summary.files_parsed);
    let _ = writeln!(out, "Projects failed: {}", report.summary.files_failed);
    let _ = writeln!(out, "Unique plugins: {}", report.summary.unique_plugins);

    if report.plugins.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "No plugins found in the scanned projects.");
    } else {
        let _ = writeln!(out);
        let _ = writeln!(out, "USAGE SUMMARY (by frequency)");
        let _ = writeln!(out, "{}", "-".repeat(40));
        for plugin in &report.plugins {
            let _ = writeln!(
                out,
                "{:>3}x  {:<35} [{}]",
                plugin.count, plugin.name, plugin.manufacturer
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "BY MANUFACTURER");
        let _ = writeln!(out, "{}", "-".repeat(30));
        for group in &report.manufacturers {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}:", group.label);
            for plugin in &group.plugins {
                let _ = writeln!(out, "  - {} ({}x)", plugin.name, plugin.count);
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "PROJECT BREAKDOWN");
        let _ = writeln!(out, "{}", "-".repeat(30));
        for project in &report.projects {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}:", project.name);
            for plugin in &project.plugins {
                let _ = writeln!(out, "  - {} [{}]", plugin.name, plugin.manufacturer);
            }
        }
    }

    if !report.failed_files.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "FAILED FILES");
        let _ = writeln!(out, "{}", "-".repeat(30));
        for failed in &report.failed_files {
            let _ = writeln!(out, "{}: {}: {}", failed.path, failed.kind, failed.reason);
        }
    }

    out
}
