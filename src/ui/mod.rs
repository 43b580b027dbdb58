use anyhow::Error;
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

use crate::classify::UNKNOWN_MANUFACTURER;
use crate::core::Report;

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub stdin_is_tty: bool,
    pub stdout_is_tty: bool,
    pub stderr_is_tty: bool,
    pub max_table_rows: usize,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "エラー:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "原因:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "次に:");
    let _ = writeln!(
        stderr,
        "  - 詳細を見るには `--verbose` を付けて再実行してください"
    );
    let _ = writeln!(
        stderr,
        "  - 利用可能なコマンド/オプションは `alsaudit --help` を参照してください"
    );
}

// レポートをファイルへ保存したときの、コンソール向けの要約表示。
pub fn print_scan_summary(report: &Report, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }

    let mut out = io::stdout().lock();
    let _ = writeln!(
        out,
        "概要: 検出={}  解析={}  失敗={}  ユニークプラグイン={}",
        report.summary.files_found,
        report.summary.files_parsed,
        report.summary.files_failed,
        report.summary.unique_plugins
    );

    let total = report.plugins.len();
    let rows = cfg.max_table_rows.min(total);

    if total == 0 {
        let _ = writeln!(out, "プラグインは見つかりませんでした。");
    } else {
        let _ = writeln!(out);
        if total > rows {
            let _ = writeln!(out, "使用回数の上位（{rows}件表示 / 全{total}件）:");
        } else {
            let _ = writeln!(out, "使用回数の上位（{rows}件表示）:");
        }
        print_usage_table(&mut out, report, rows, cfg.color);
    }

    if !report.failed_files.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "失敗したファイル:");
        for failed in &report.failed_files {
            let _ = writeln!(out, "- {} [{}]", failed.path, failed.kind);
            if cfg.verbose {
                let _ = writeln!(out, "  - 理由: {}", failed.reason);
            }
        }
    }
}

fn print_usage_table(out: &mut dyn Write, report: &Report, rows: usize, color: bool) {
    let label_count = "回数";
    let label_name = "プラグイン";
    let label_manufacturer = "メーカー";

    let count_w = report
        .plugins
        .iter()
        .take(rows)
        .map(|p| visible_width_ansi(&p.count.to_string()))
        .max()
        .unwrap_or(0)
        .max(visible_width_ansi(label_count));
    let name_w = report
        .plugins
        .iter()
        .take(rows)
        .map(|p| visible_width_ansi(&p.name))
        .max()
        .unwrap_or(0)
        .max(visible_width_ansi(label_name));
    let manufacturer_w = visible_width_ansi(label_manufacturer).max(4);

    let _ = writeln!(
        out,
        "{}  {}  {}",
        pad_start_display(label_count, count_w),
        pad_end_display(label_name, name_w),
        label_manufacturer
    );
    let _ = writeln!(
        out,
        "{}  {}  {}",
        "-".repeat(count_w),
        "-".repeat(name_w),
        "-".repeat(manufacturer_w)
    );

    for plugin in report.plugins.iter().take(rows) {
        let count = pad_start_display(&plugin.count.to_string(), count_w);
        let name = pad_end_display(&plugin.name, name_w);
        let _ = writeln!(
            out,
            "{count}  {name}  {}",
            format_manufacturer(&plugin.manufacturer, color)
        );
    }
}

fn format_manufacturer(label: &str, color: bool) -> String {
    if !color {
        return label.to_string();
    }
    if label == UNKNOWN_MANUFACTURER {
        format!("\x1b[90m{label}\x1b[0m")
    } else {
        format!("\x1b[36m{label}\x1b[0m")
    }
}

fn pad_end_display(s: &str, width: usize) -> String {
    let w = visible_width_ansi(s);
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}

fn pad_start_display(s: &str, width: usize) -> String {
    let w = visible_width_ansi(s);
    if w >= width {
        return s.to_string();
    }
    format!("{}{}", " ".repeat(width - w), s)
}

fn visible_width_ansi(s: &str) -> usize {
    let mut width: usize = 0;
    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\x1b' {
            if chars.peek() == Some(&'[') {
                let _ = chars.next();
                for ch2 in chars.by_ref() {
                    if ch2 == 'm' {
                        break;
                    }
                }
                continue;
            }
        }
        width = width.saturating_add(UnicodeWidthChar::width(ch).unwrap_or(0));
    }
    width
}
