use std::io;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::classify::Classifier;
use crate::engine::{AuditRequest, Engine, EngineOptions};
use crate::ui::UiConfig;

#[derive(Debug, Parser)]
#[command(
    name = "alsaudit",
    version,
    about = "Ableton Live プロジェクト（.als）を走査し、使用プラグインをメーカー別に集計する"
)]
pub struct Cli {
    #[arg(long, global = true)]
    pub json: bool,
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
    #[arg(long, global = true)]
    pub verbose: bool,
    #[arg(long, global = true)]
    pub quiet: bool,
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Scan(ScanArgs),
    Ui(UiArgs),
    Completion(CompletionArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    pub directory: PathBuf,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[arg(long)]
    pub exclude: Vec<String>,
    #[arg(long)]
    pub follow_links: bool,
}

#[derive(Debug, Args)]
pub struct UiArgs {}

#[derive(Debug, Args)]
pub struct CompletionArgs {
    pub shell: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub show: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let stdin_is_tty = io::stdin().is_terminal();
    let stdout_is_tty = io::stdout().is_terminal();
    let stderr_is_tty = io::stderr().is_terminal();

    let home_dir = crate::config::effective_home_dir()?;

    let env_config_path = std::env::var_os("ALSAUDIT_CONFIG").map(PathBuf::from);
    let cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        &home_dir,
    )
    .map_err(crate::exit::invalid_args_err)?;

    let color = stdout_is_tty && cfg.ui.color && !cli.no_color;

    let ui_cfg = UiConfig {
        color,
        stdin_is_tty,
        stdout_is_tty,
        stderr_is_tty,
        max_table_rows: cfg.ui.max_table_rows,
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    let is_ui_mode = matches!(&cli.command, Commands::Ui(_));
    let engine = Engine::new(
        EngineOptions {
            show_progress: ui_cfg.stderr_is_tty && !cli.quiet && !cli.json && !is_ui_mode,
        },
        Classifier::new(&cfg.rules.path, &cfg.rules.name),
    );

    match cli.command {
        Commands::Scan(args) => {
            let mut exclude = cfg.scan.exclude.clone();
            exclude.extend(args.exclude);
            exclude.sort();
            exclude.dedup();
            crate::scan::validate_excludes(&exclude).map_err(crate::exit::invalid_args_err)?;

            let report = engine.audit(&AuditRequest {
                root: args.directory,
                exclude,
                follow_links: args.follow_links || cfg.scan.follow_links,
            })?;

            match (cli.json, args.output) {
                (true, Some(output)) => {
                    let mut buf = serde_json::to_vec_pretty(&report)?;
                    buf.push(b'\n');
                    std::fs::write(&output, buf).with_context(|| {
                        format!("レポートを書き込めません: {}", output.display())
                    })?;
                    if !ui_cfg.quiet {
                        println!("レポートを保存しました: {}", output.display());
                    }
                }
                (true, None) => write_json(&report)?,
                (false, Some(output)) => {
                    let text = crate::report::render_text(&report);
                    std::fs::write(&output, text).with_context(|| {
                        format!("レポートを書き込めません: {}", output.display())
                    })?;
                    if !ui_cfg.quiet {
                        println!("レポートを保存しました: {}", output.display());
                    }
                    crate::ui::print_scan_summary(&report, &ui_cfg);
                }
                (false, None) => write_text(&crate::report::render_text(&report))?,
            }
        }
        Commands::Ui(_args) => {
            if cli.json {
                return Err(crate::exit::invalid_args("ui は --json と併用できません"));
            }
            if !(ui_cfg.stdin_is_tty && ui_cfg.stdout_is_tty) {
                return Err(crate::exit::invalid_args(
                    "ui は TTY が必要です（stdin + stdout）",
                ));
            }
            crate::tui::run(
                engine,
                ui_cfg.color,
                cfg.scan.exclude.clone(),
                cfg.scan.follow_links,
            )?;
        }
        Commands::Completion(_args) => {
            let shell = parse_shell(&_args.shell)?;
            let mut cmd = Cli::command();
            let mut out = std::io::stdout().lock();
            clap_complete::generate(shell, &mut cmd, "alsaudit", &mut out);
        }
        Commands::Config(_args) => {
            if _args.show {
                if cli.json {
                    let stdout = std::io::stdout();
                    serde_json::to_writer_pretty(stdout.lock(), &cfg)?;
                } else {
                    println!("{}", toml::to_string_pretty(&cfg)?);
                }
            } else if !ui_cfg.quiet {
                eprintln!("config: `alsaudit config --show` を使用してください");
            }
        }
    }

    Ok(())
}

fn write_json(report: &crate::core::Report) -> Result<()> {
    use std::io::Write;

    let buf = serde_json::to_vec_pretty(report)?;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(&buf) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => return Ok(()),
        Err(err) => return Err(err.into()),
    }
    match stdout.write_all(b"\n") {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn write_text(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(text.as_bytes()) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_args(format!(
            "未対応のシェルです: {other}（bash|zsh|fish を指定してください）"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_shell_accepts_known_shells_case_insensitively() {
        assert!(matches!(
            parse_shell("bash").expect("bash"),
            clap_complete::Shell::Bash
        ));
        assert!(matches!(
            parse_shell(" Zsh ").expect("zsh"),
            clap_complete::Shell::Zsh
        ));
        assert!(matches!(
            parse_shell("FISH").expect("fish"),
            clap_complete::Shell::Fish
        ));
    }

    #[test]
    fn parse_shell_rejects_unknown_shells_as_invalid_args() {
        let err = parse_shell("powershell").unwrap_err();
        assert_eq!(crate::exit::exit_code(&err), 2);
    }
}
