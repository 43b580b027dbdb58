use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    // TOML では値をテーブルより先に並べる必要がある。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    pub ui: UiConfig,
    pub scan: ScanConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct UiConfig {
    pub color: bool,
    pub max_table_rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanConfig {
    pub exclude: Vec<String>,
    pub follow_links: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RulesConfig {
    pub path: Vec<Rule>,
    pub name: Vec<Rule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub pattern: String,
    pub label: String,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            ui: UiConfig {
                color: true,
                max_table_rows: 20,
            },
            scan: ScanConfig {
                exclude: vec![],
                follow_links: false,
            },
            rules: RulesConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    ui: Option<RawUiConfig>,
    scan: Option<RawScanConfig>,
    rules: Option<RawRulesConfig>,
}

#[derive(Debug, Deserialize)]
struct RawUiConfig {
    color: Option<bool>,
    max_table_rows: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RawScanConfig {
    exclude: Option<Vec<String>>,
    follow_links: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawRulesConfig {
    path: Option<Vec<Rule>>,
    name: Option<Vec<Rule>>,
}

pub fn effective_home_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home));
    }
    std::env::var_os("USERPROFILE")
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("環境変数 HOME が設定されていません"))
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/alsaudit/config.toml")
}

pub fn load(config_path: Option<&Path>, home_dir: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| default_config_path(home_dir));

    if path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("設定ファイルの読み取りに失敗しました: {}", path.display()))?;
        let raw: RawConfig =
            toml::from_str(&s).context("設定ファイル(TOML)の解析に失敗しました")?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(ui) = raw.ui {
        if let Some(color) = ui.color {
            cfg.ui.color = color;
        }
        if let Some(max_table_rows) = ui.max_table_rows {
            cfg.ui.max_table_rows = max_table_rows;
        }
    }

    if let Some(scan) = raw.scan {
        if let Some(exclude) = scan.exclude {
            cfg.scan.exclude = exclude;
        }
        if let Some(follow_links) = scan.follow_links {
            cfg.scan.follow_links = follow_links;
        }
    }

    if let Some(rules) = raw.rules {
        if let Some(path) = rules.path {
            cfg.rules.path = path;
        }
        if let Some(name) = rules.name {
            cfg.rules.name = name;
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("ALSAUDIT_UI_COLOR") {
        cfg.ui.color = parse_bool(&v).with_context(|| "ALSAUDIT_UI_COLOR")?;
    }
    if let Ok(v) = std::env::var("ALSAUDIT_UI_MAX_TABLE_ROWS") {
        cfg.ui.max_table_rows = v
            .trim()
            .parse::<usize>()
            .with_context(|| "ALSAUDIT_UI_MAX_TABLE_ROWS")?;
    }
    if let Ok(v) = std::env::var("ALSAUDIT_SCAN_EXCLUDE") {
        let parts: Vec<String> = v
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();
        if !parts.is_empty() {
            cfg.scan.exclude = parts;
        }
    }
    if let Ok(v) = std::env::var("ALSAUDIT_SCAN_FOLLOW_LINKS") {
        cfg.scan.follow_links = parse_bool(&v).with_context(|| "ALSAUDIT_SCAN_FOLLOW_LINKS")?;
    }

    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "真偽値が不正です: {s}（true|false|1|0|yes|no|on|off を指定してください）"
        )),
    }
}
