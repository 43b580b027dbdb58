use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::atomic::{AtomicU64, Ordering};

fn alsaudit_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_alsaudit"));
    cmd.env("HOME", home);
    cmd.env_remove("ALSAUDIT_CONFIG");
    cmd.env_remove("ALSAUDIT_UI_COLOR");
    cmd.env_remove("ALSAUDIT_UI_MAX_TABLE_ROWS");
    cmd.env_remove("ALSAUDIT_SCAN_EXCLUDE");
    cmd.env_remove("ALSAUDIT_SCAN_FOLLOW_LINKS");
    cmd
}

fn run(home: &Path, args: &[&str]) -> Output {
    alsaudit_cmd(home).args(args).output().expect("run alsaudit")
}

fn make_temp_dir(tag: &str) -> PathBuf {
    static SEQ: AtomicU64 = AtomicU64::new(0);

    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!(
        "alsaudit-scan-{tag}-{}-{seq}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create dir");
    dir
}

fn write_project(path: &Path, xml: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("mkdirs");
    }
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(xml).expect("gzip write");
    let bytes = encoder.finish().expect("gzip finish");
    std::fs::write(path, bytes).expect("write");
}

const TWO_PLUGINS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<Ableton MajorVersion="5">
  <LiveSet>
    <VstPluginInfo Id="0">
      <FileName Value="" />
      <Path Value="C:\VST\Spitfire Audio\LABS (64 Bit).dll" />
      <PlugName Value="LABS" />
    </VstPluginInfo>
    <Vst3PluginInfo Id="1">
      <Name Value="Unknown Widget" />
    </Vst3PluginInfo>
  </LiveSet>
</Ableton>"#;

const ONE_PLUGIN: &[u8] = br#"<Ableton>
  <LiveSet>
    <VstPluginInfo Id="0">
      <Path Value="C:\VST\Spitfire Audio\LABS (64 Bit).dll" />
    </VstPluginInfo>
  </LiveSet>
</Ableton>"#;

#[test]
fn text_report_classifies_by_path_and_falls_back_to_unknown() {
    let home = make_temp_dir("home");
    let root = make_temp_dir("root");
    write_project(&root.join("a.als"), TWO_PLUGINS);
    write_project(&root.join("b.als"), ONE_PLUGIN);

    let out = run(&home, &["scan", root.to_str().expect("utf8 path")]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("ABLETON VST AUDIT REPORT"), "stdout={stdout}");
    assert!(stdout.contains("Projects found: 2"), "stdout={stdout}");
    assert!(stdout.contains("Projects parsed: 2"), "stdout={stdout}");
    assert!(stdout.contains("Unique plugins: 2"), "stdout={stdout}");

    // パスの Spitfire Audio が先に一致し、dll 名がプラグイン名になる。
    assert!(
        stdout.contains("  2x  LABS (64 Bit).dll"),
        "stdout={stdout}"
    );
    assert!(stdout.contains("[Spitfire Audio]"), "stdout={stdout}");
    assert!(
        stdout.contains("Unknown Widget") && stdout.contains("[Unknown]"),
        "stdout={stdout}"
    );

    assert!(stdout.contains("BY MANUFACTURER"), "stdout={stdout}");
    assert!(stdout.contains("Spitfire Audio:"), "stdout={stdout}");
    assert!(stdout.contains("Unknown:"), "stdout={stdout}");

    assert!(stdout.contains("PROJECT BREAKDOWN"), "stdout={stdout}");
    assert!(stdout.contains("a.als:"), "stdout={stdout}");
    assert!(stdout.contains("b.als:"), "stdout={stdout}");

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn corrupted_project_is_reported_but_does_not_fail_the_scan() {
    let home = make_temp_dir("home");
    let root = make_temp_dir("root");
    write_project(&root.join("good.als"), ONE_PLUGIN);
    std::fs::write(root.join("broken.als"), b"this is not gzip").expect("write");

    let out = run(&home, &["scan", root.to_str().expect("utf8 path")]);
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Projects found: 2"), "stdout={stdout}");
    assert!(stdout.contains("Projects parsed: 1"), "stdout={stdout}");
    assert!(stdout.contains("Projects failed: 1"), "stdout={stdout}");
    assert!(stdout.contains("FAILED FILES"), "stdout={stdout}");
    assert!(stdout.contains("broken.als"), "stdout={stdout}");
    assert!(stdout.contains("format:"), "stdout={stdout}");

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn json_report_is_machine_readable_and_sorted() {
    let home = make_temp_dir("home");
    let root = make_temp_dir("root");
    write_project(&root.join("a.als"), TWO_PLUGINS);
    write_project(&root.join("b.als"), ONE_PLUGIN);

    let out = run(
        &home,
        &["--json", "scan", root.to_str().expect("utf8 path")],
    );
    assert_eq!(out.status.code(), Some(0));

    let report: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("parse json report");
    assert_eq!(report["schema_version"], "1.0");
    assert_eq!(report["summary"]["files_found"], 2);
    assert_eq!(report["summary"]["files_parsed"], 2);
    assert_eq!(report["summary"]["unique_plugins"], 2);

    let plugins = report["plugins"].as_array().expect("plugins array");
    assert_eq!(plugins.len(), 2);
    assert_eq!(plugins[0]["name"], "LABS (64 Bit).dll");
    assert_eq!(plugins[0]["count"], 2);
    assert_eq!(plugins[0]["manufacturer"], "Spitfire Audio");
    assert_eq!(plugins[1]["manufacturer"], "Unknown");

    let projects = report["projects"].as_array().expect("projects array");
    assert_eq!(projects[0]["name"], "a.als");
    assert_eq!(projects[1]["name"], "b.als");

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn output_flag_writes_report_file_and_prints_summary() {
    let home = make_temp_dir("home");
    let root = make_temp_dir("root");
    write_project(&root.join("a.als"), ONE_PLUGIN);
    let report_path = root.join("report.txt");

    let out = run(
        &home,
        &[
            "scan",
            root.to_str().expect("utf8 path"),
            "--output",
            report_path.to_str().expect("utf8 path"),
        ],
    );
    assert_eq!(out.status.code(), Some(0));

    let text = std::fs::read_to_string(&report_path).expect("read report");
    assert!(text.contains("ABLETON VST AUDIT REPORT"), "text={text}");
    assert!(text.contains("LABS (64 Bit).dll"), "text={text}");

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("レポートを保存しました"), "stdout={stdout}");
    assert!(stdout.contains("概要:"), "stdout={stdout}");

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn json_with_output_writes_json_payload_to_the_file() {
    let home = make_temp_dir("home");
    let root = make_temp_dir("root");
    write_project(&root.join("a.als"), ONE_PLUGIN);
    let report_path = root.join("report.json");

    let out = run(
        &home,
        &[
            "--json",
            "scan",
            root.to_str().expect("utf8 path"),
            "--output",
            report_path.to_str().expect("utf8 path"),
        ],
    );
    assert_eq!(out.status.code(), Some(0));

    let bytes = std::fs::read(&report_path).expect("read report");
    let report: serde_json::Value = serde_json::from_slice(&bytes).expect("parse json report");
    assert_eq!(report["schema_version"], "1.0");
    assert_eq!(report["summary"]["files_found"], 1);
    assert_eq!(report["plugins"][0]["name"], "LABS (64 Bit).dll");

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("レポートを保存しました"), "stdout={stdout}");

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn quiet_suppresses_console_summary_but_still_writes_the_file() {
    let home = make_temp_dir("home");
    let root = make_temp_dir("root");
    write_project(&root.join("a.als"), ONE_PLUGIN);
    let report_path = root.join("report.txt");

    let out = run(
        &home,
        &[
            "--quiet",
            "scan",
            root.to_str().expect("utf8 path"),
            "--output",
            report_path.to_str().expect("utf8 path"),
        ],
    );
    assert_eq!(out.status.code(), Some(0));
    assert!(report_path.exists());
    assert!(out.stdout.is_empty(), "stdout should be empty in quiet mode");

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn exclude_option_skips_matching_directories() {
    let home = make_temp_dir("home");
    let root = make_temp_dir("root");
    write_project(&root.join("keep.als"), ONE_PLUGIN);
    write_project(&root.join("Backup/skip.als"), ONE_PLUGIN);

    let out = run(
        &home,
        &[
            "scan",
            root.to_str().expect("utf8 path"),
            "--exclude",
            "**/Backup",
        ],
    );
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Projects found: 1"), "stdout={stdout}");
    assert!(stdout.contains("keep.als:"), "stdout={stdout}");
    assert!(!stdout.contains("skip.als"), "stdout={stdout}");

    let _ = std::fs::remove_dir_all(&home);
    let _ = std::fs::remove_dir_all(&root);
}
