use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::archive;
use crate::classify::Classifier;
use crate::core::{FileFailure, ScanResult};
use crate::extract;

pub const PROJECT_EXTENSION: &str = "als";

#[derive(Debug, Clone)]
pub enum Progress<'a> {
    Listing,
    Found { total: usize },
    File {
        index: usize,
        total: usize,
        name: &'a str,
    },
}

pub fn validate_excludes(excludes: &[String]) -> Result<()> {
    let _ = build_exclude_set(excludes)?;
    Ok(())
}

fn build_exclude_set(excludes: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in excludes {
        builder.add(Glob::new(pat).with_context(|| format!("exclude glob が不正です: {pat}"))?);
    }
    Ok(builder.build()?)
}

fn is_project_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PROJECT_EXTENSION))
}

pub fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

// ルート直下から .als を列挙して 1 ファイルずつ 展開 → 抽出 → 分類 → 集計する。
// 個々のファイルの失敗は failed_files に記録して続行し、ルートが読めない場合のみ失敗する。
pub fn scan(
    root: &Path,
    excludes: &[String],
    follow_links: bool,
    classifier: &Classifier,
    progress: &mut dyn FnMut(Progress),
) -> Result<ScanResult> {
    let meta = std::fs::metadata(root)
        .with_context(|| format!("スキャン対象を読み取れません: {}", root.display()))?;
    if !meta.is_dir() {
        anyhow::bail!("スキャン対象がディレクトリではありません: {}", root.display());
    }

    let exclude_set = build_exclude_set(excludes)?;
    let mut result = ScanResult::default();

    progress(Progress::Listing);

    let mut files: Vec<PathBuf> = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(follow_links)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !exclude_set.is_match(e.path()));
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_project_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Err(err) => {
                // 読めないサブツリーは失敗として可視化し、走査は継続する。
                let path = err
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                result.record_failure(&path, FileFailure::io(err.to_string()));
            }
        }
    }

    let total = files.len();
    result.files_found = total as u64;
    progress(Progress::Found { total });

    for (index, path) in files.iter().enumerate() {
        let project = file_display_name(path);
        progress(Progress::File {
            index: index + 1,
            total,
            name: &project,
        });

        let references = archive::read_project(path)
            .and_then(|content| extract::plugin_references(&content));
        match references {
            Ok(references) => {
                result.files_parsed += 1;
                for reference in references {
                    let manufacturer =
                        classifier.classify(&reference.name, reference.path.as_deref());
                    result.record_reference(&project, &reference.name, &manufacturer);
                }
            }
            Err(failure) => result.record_failure(path, failure),
        }
    }

    Ok(result)
}
