use std::io;
use std::panic;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use time::OffsetDateTime;

use crate::core::Report;
use crate::engine::{AuditRequest, Engine};

pub fn run(engine: Engine, color: bool, exclude: Vec<String>, follow_links: bool) -> Result<()> {
    enable_raw_mode().context("raw mode の有効化")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("代替画面への切り替え")?;

    let mut tui = Tui {
        terminal: Terminal::new(CrosstermBackend::new(stdout)).context("ターミナルの初期化")?,
    };
    tui.terminal.clear().ok();

    let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        run_app(&mut tui.terminal, engine, color, exclude, follow_links)
    }));

    let _ = tui.terminal.show_cursor();
    let _ = disable_raw_mode();
    let mut stdout = io::stdout();
    let _ = execute!(stdout, LeaveAlternateScreen);

    match res {
        Ok(res) => res,
        Err(_) => Err(anyhow::anyhow!(
            "TUI 内部で panic が発生しました（端末状態は復旧済みのはずです）"
        )),
    }
}

struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Home,
    Running,
    Results,
    SaveReport,
    Error,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tab {
    Usage = 0,
    Manufacturers = 1,
    Projects = 2,
    Failures = 3,
}

impl Tab {
    fn next(self) -> Self {
        match self {
            Tab::Usage => Tab::Manufacturers,
            Tab::Manufacturers => Tab::Projects,
            Tab::Projects => Tab::Failures,
            Tab::Failures => Tab::Usage,
        }
    }

    fn prev(self) -> Self {
        match self {
            Tab::Usage => Tab::Failures,
            Tab::Manufacturers => Tab::Usage,
            Tab::Projects => Tab::Manufacturers,
            Tab::Failures => Tab::Projects,
        }
    }
}

struct PendingScan {
    rx: mpsc::Receiver<Result<Report>>,
    started_at: Instant,
}

struct App {
    color: bool,
    exclude: Vec<String>,
    follow_links: bool,

    root_input: String,
    root_edit_mode: bool,

    save_input: String,
    save_notice: Option<String>,

    screen: Screen,
    help_return_to: Screen,
    error_return_to: Screen,
    tab: Tab,

    filter: String,
    filter_mode: bool,

    report: Option<Report>,
    error: Option<String>,
    pending: Option<PendingScan>,

    usage_state: ListState,
    manufacturer_state: ListState,
    project_state: ListState,
    failure_state: ListState,

    tick: u64,
}

impl App {
    fn new(color: bool, exclude: Vec<String>, follow_links: bool) -> Self {
        let mut usage_state = ListState::default();
        usage_state.select(Some(0));
        let mut manufacturer_state = ListState::default();
        manufacturer_state.select(Some(0));
        let mut project_state = ListState::default();
        project_state.select(Some(0));
        let mut failure_state = ListState::default();
        failure_state.select(Some(0));

        Self {
            color,
            exclude,
            follow_links,
            root_input: ".".to_string(),
            root_edit_mode: false,
            save_input: String::new(),
            save_notice: None,
            screen: Screen::Home,
            help_return_to: Screen::Home,
            error_return_to: Screen::Home,
            tab: Tab::Usage,
            filter: String::new(),
            filter_mode: false,
            report: None,
            error: None,
            pending: None,
            usage_state,
            manufacturer_state,
            project_state,
            failure_state,
            tick: 0,
        }
    }

    fn active_state(&mut self) -> &mut ListState {
        match self.tab {
            Tab::Usage => &mut self.usage_state,
            Tab::Manufacturers => &mut self.manufacturer_state,
            Tab::Projects => &mut self.project_state,
            Tab::Failures => &mut self.failure_state,
        }
    }

    fn reset_result_states(&mut self) {
        self.usage_state.select(Some(0));
        self.manufacturer_state.select(Some(0));
        self.project_state.select(Some(0));
        self.failure_state.select(Some(0));
    }

    fn move_list_selection(state: &mut ListState, len: usize, delta: i32) {
        if len == 0 {
            state.select(None);
            return;
        }
        let selected = state.selected().unwrap_or(0) as i32;
        let next = (selected + delta).clamp(0, (len as i32).saturating_sub(1));
        state.select(Some(next as usize));
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: Engine,
    color: bool,
    exclude: Vec<String>,
    follow_links: bool,
) -> Result<()> {
    let mut app = App::new(color, exclude, follow_links);

    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| draw(f, &mut app)).context("画面描画")?;

        if let Some(pending) = app.pending.take() {
            match pending.rx.try_recv() {
                Ok(res) => match res {
                    Ok(report) => {
                        app.report = Some(report);
                        app.error = None;
                        app.tab = Tab::Usage;
                        app.filter.clear();
                        app.reset_result_states();
                        app.screen = Screen::Results;
                    }
                    Err(err) => {
                        open_error_return_to(&mut app, err.to_string(), Screen::Home);
                    }
                },
                Err(mpsc::TryRecvError::Empty) => {
                    if pending.started_at.elapsed() > Duration::from_secs(600) {
                        open_error_return_to(
                            &mut app,
                            "スキャンの完了待ちがタイムアウトしました。".to_string(),
                            Screen::Home,
                        );
                    } else {
                        app.pending = Some(pending);
                    }
                }
                Err(mpsc::TryRecvError::Disconnected) => {
                    open_error_return_to(
                        &mut app,
                        "スキャンタスクとの接続が切れました。".to_string(),
                        Screen::Home,
                    );
                }
            }
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout).context("イベント待ち")? {
            match event::read().context("イベント読み取り")? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        if handle_key(&mut app, &engine, key) {
                            break;
                        }
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.tick = app.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }

    Ok(())
}

fn open_help(app: &mut App) {
    app.help_return_to = app.screen;
    app.screen = Screen::Help;
}

fn open_error_return_to(app: &mut App, msg: impl Into<String>, return_to: Screen) {
    app.error = Some(msg.into());
    app.error_return_to = match return_to {
        Screen::Running | Screen::Error => Screen::Home,
        other => other,
    };
    app.screen = Screen::Error;
}

fn start_scan(app: &mut App, engine: Engine) {
    let root = app.root_input.trim().to_string();
    if root.is_empty() {
        open_error_return_to(
            app,
            "スキャン対象のディレクトリを入力してください。",
            Screen::Home,
        );
        return;
    }

    let req = AuditRequest {
        root: PathBuf::from(root),
        exclude: app.exclude.clone(),
        follow_links: app.follow_links,
    };
    let (tx, rx) = mpsc::channel::<Result<Report>>();
    thread::spawn(move || {
        let _ = tx.send(engine.audit(&req));
    });
    app.pending = Some(PendingScan {
        rx,
        started_at: Instant::now(),
    });
    app.screen = Screen::Running;
    app.error = None;
    app.save_notice = None;
}

fn default_report_file_name() -> String {
    let format = time::macros::format_description!("[year][month][day]-[hour][minute][second]");
    let stamp = OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_else(|_| "report".to_string());
    format!("alsaudit-report-{stamp}.txt")
}

fn save_report(app: &mut App) {
    let Some(report) = app.report.as_ref() else {
        open_error_return_to(app, "保存できるレポートがありません。", Screen::Home);
        return;
    };
    let name = app.save_input.trim().to_string();
    if name.is_empty() {
        open_error_return_to(
            app,
            "保存先のファイル名を入力してください。",
            Screen::SaveReport,
        );
        return;
    }

    let text = crate::report::render_text(report);
    match std::fs::write(&name, text) {
        Ok(()) => {
            app.save_notice = Some(format!("レポートを保存しました: {name}"));
            app.screen = Screen::Results;
        }
        Err(err) => {
            open_error_return_to(
                app,
                format!("レポートを書き込めません: {name}: {err}"),
                Screen::SaveReport,
            );
        }
    }
}

fn filter_matches(filter: &str, hay: &str) -> bool {
    let filter = filter.trim().to_lowercase();
    if filter.is_empty() {
        return true;
    }
    hay.to_lowercase().contains(&filter)
}

// 結果タブごとの表示行。選択はこの行ベクタに対して動く。
fn usage_lines(report: &Report, filter: &str) -> Vec<String> {
    report
        .plugins
        .iter()
        .map(|p| format!("{:>3}x  {}  [{}]", p.count, p.name, p.manufacturer))
        .filter(|line| filter_matches(filter, line))
        .collect()
}

fn manufacturer_lines(report: &Report, filter: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for group in &report.manufacturers {
        if !filter_matches(filter, &group.label)
            && !group
                .plugins
                .iter()
                .any(|p| filter_matches(filter, &p.name))
        {
            continue;
        }
        lines.push(format!("{}:", group.label));
        for plugin in &group.plugins {
            lines.push(format!("  - {} ({}x)", plugin.name, plugin.count));
        }
    }
    lines
}

fn project_lines(report: &Report, filter: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for project in &report.projects {
        if !filter_matches(filter, &project.name)
            && !project
                .plugins
                .iter()
                .any(|p| filter_matches(filter, &p.name))
        {
            continue;
        }
        lines.push(format!("{}:", project.name));
        for plugin in &project.plugins {
            lines.push(format!("  - {} [{}]", plugin.name, plugin.manufacturer));
        }
    }
    lines
}

fn failure_lines(report: &Report, filter: &str) -> Vec<String> {
    report
        .failed_files
        .iter()
        .map(|f| format!("{} [{}] {}", f.path, f.kind, f.reason))
        .filter(|line| filter_matches(filter, line))
        .collect()
}

fn active_lines(app: &App) -> Vec<String> {
    let Some(report) = app.report.as_ref() else {
        return Vec::new();
    };
    match app.tab {
        Tab::Usage => usage_lines(report, &app.filter),
        Tab::Manufacturers => manufacturer_lines(report, &app.filter),
        Tab::Projects => project_lines(report, &app.filter),
        Tab::Failures => failure_lines(report, &app.filter),
    }
}

fn handle_key(app: &mut App, engine: &Engine, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if !app.filter_mode
        && app.screen == Screen::Results
        && key.code == KeyCode::Char('/')
        && !key.modifiers.contains(KeyModifiers::CONTROL)
        && !key.modifiers.contains(KeyModifiers::ALT)
    {
        app.filter_mode = true;
        return false;
    }

    if app.filter_mode {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                app.filter_mode = false;
                app.filter = app.filter.trim().to_string();
                app.reset_result_states();
            }
            KeyCode::Backspace => {
                app.filter.pop();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.filter.clear();
            }
            KeyCode::Char(c) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.filter.push(c);
                }
            }
            _ => {}
        }
        return false;
    }

    match app.screen {
        Screen::Help => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                app.screen = app.help_return_to;
            }
            _ => {}
        },
        Screen::Home => {
            if app.root_edit_mode {
                match key.code {
                    KeyCode::Enter | KeyCode::Esc => {
                        app.root_edit_mode = false;
                        app.root_input = app.root_input.trim().to_string();
                    }
                    KeyCode::Backspace => {
                        app.root_input.pop();
                    }
                    KeyCode::Char(c) => {
                        if !key.modifiers.contains(KeyModifiers::CONTROL)
                            && !key.modifiers.contains(KeyModifiers::ALT)
                        {
                            app.root_input.push(c);
                        }
                    }
                    _ => {}
                }
                return false;
            }
            match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('?') => open_help(app),
                KeyCode::Char('e') => app.root_edit_mode = true,
                KeyCode::Char('l') => app.follow_links = !app.follow_links,
                KeyCode::Enter | KeyCode::Char('r') => start_scan(app, engine.clone()),
                _ => {}
            }
        }
        Screen::Running => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => open_help(app),
            KeyCode::Esc => {
                // 受信側を手放すだけで、ワーカーの結果は破棄される。
                app.pending = None;
                app.screen = Screen::Home;
            }
            _ => {}
        },
        Screen::Results => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('?') => open_help(app),
            KeyCode::Char('b') | KeyCode::Esc => {
                app.screen = Screen::Home;
            }
            KeyCode::Tab => {
                app.tab = app.tab.next();
            }
            KeyCode::BackTab => {
                app.tab = app.tab.prev();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let len = active_lines(app).len();
                App::move_list_selection(app.active_state(), len, -1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = active_lines(app).len();
                App::move_list_selection(app.active_state(), len, 1);
            }
            KeyCode::Char('r') => start_scan(app, engine.clone()),
            KeyCode::Char('s') => {
                app.save_input = default_report_file_name();
                app.screen = Screen::SaveReport;
            }
            _ => {}
        },
        Screen::SaveReport => match key.code {
            KeyCode::Esc => {
                app.screen = Screen::Results;
            }
            KeyCode::Enter => save_report(app),
            KeyCode::Backspace => {
                app.save_input.pop();
            }
            KeyCode::Char(c) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    app.save_input.push(c);
                }
            }
            _ => {}
        },
        Screen::Error => match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('b') => {
                app.screen = app.error_return_to;
                app.error = None;
            }
            KeyCode::Char('?') => open_help(app),
            _ => {}
        },
    }

    false
}

fn draw(f: &mut ratatui::Frame, app: &mut App) {
    let size = f.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(size);

    draw_header(f, chunks[0], app);
    draw_footer(f, chunks[2], app);

    match app.screen {
        Screen::Home => draw_home(f, chunks[1], app),
        Screen::Running => draw_running(f, chunks[1], app),
        Screen::Results => draw_results(f, chunks[1], app),
        Screen::SaveReport => draw_save_report(f, chunks[1], app),
        Screen::Error => draw_error(f, chunks[1], app),
        Screen::Help => draw_help(f, chunks[1], app),
    }
}

fn draw_header(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let title = match app.screen {
        Screen::Home => "alsaudit — ホーム",
        Screen::Running => "alsaudit — スキャン中",
        Screen::Results => "alsaudit — 結果",
        Screen::SaveReport => "alsaudit — レポート保存",
        Screen::Error => "alsaudit — エラー",
        Screen::Help => "alsaudit — ヘルプ",
    };
    let right = format!("v{}", env!("CARGO_PKG_VERSION"));

    let line = Line::from(vec![
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(right, Style::default().fg(Color::DarkGray)),
    ]);

    let w = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(w, area);
}

fn draw_footer(f: &mut ratatui::Frame, area: Rect, app: &App) {
    if app.filter_mode {
        let filter = truncate_chars(app.filter.trim(), 60);
        let line1 = Line::from(vec![
            Span::styled("フィルタ: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                if filter.is_empty() {
                    "（空）"
                } else {
                    filter.as_str()
                },
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        let line2 = Line::from("Backspace 削除 | Ctrl-U クリア | Enter/Esc 終了 | Ctrl-C 強制終了");
        let w = Paragraph::new(Text::from(vec![line1, line2]))
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: true });
        f.render_widget(w, area);
        return;
    }

    let (line1, line2) = match app.screen {
        Screen::Home => {
            if app.root_edit_mode {
                (
                    "文字 編集 | Backspace 削除 | Enter/Esc 編集完了",
                    "Ctrl-C 強制終了",
                )
            } else {
                (
                    "Enter/r スキャン | e パス編集 | l リンク追従切替",
                    "q 終了 | ? ヘルプ | Ctrl-C 強制終了",
                )
            }
        }
        Screen::Running => (
            "Esc 中止 | （スキャン中）",
            "q 終了 | Ctrl-C 強制終了 | ? ヘルプ",
        ),
        Screen::Results => (
            "Tab タブ | ↑↓/j/k 移動 | / フィルタ | s 保存 | r 再スキャン | b/Esc 戻る",
            "q 終了 | Ctrl-C 強制終了 | ? ヘルプ",
        ),
        Screen::SaveReport => (
            "Enter 保存 | Backspace 削除 | Esc キャンセル",
            "Ctrl-C 強制終了",
        ),
        Screen::Error => (
            "Enter/Esc/b 戻る",
            "q 終了 | Ctrl-C 強制終了 | ? ヘルプ",
        ),
        Screen::Help => ("Esc/q/? 閉じる", "Ctrl-C 強制終了"),
    };

    let w = Paragraph::new(Text::from(vec![Line::from(line1), Line::from(line2)]))
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    f.render_widget(w, area);
}

fn draw_home(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let input_title = if app.root_edit_mode {
        "スキャン対象（編集中）"
    } else {
        "スキャン対象"
    };
    let input_style = if app.root_edit_mode {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let input = Paragraph::new(Line::from(Span::styled(
        app.root_input.as_str(),
        input_style,
    )))
    .block(Block::default().borders(Borders::ALL).title(input_title));
    f.render_widget(input, chunks[0]);

    let mut lines = vec![
        Line::from(Span::styled(
            "Ableton Live プロジェクト（.als）の走査",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("指定ディレクトリを再帰的に走査し、各プロジェクトが参照する"),
        Line::from("プラグインをメーカー別に集計します。読み取り専用です。"),
        Line::from(""),
        Line::from(format!(
            "シンボリックリンク追従: {}",
            if app.follow_links { "あり" } else { "なし" }
        )),
    ];
    if app.exclude.is_empty() {
        lines.push(Line::from("除外パターン: （なし）"));
    } else {
        lines.push(Line::from(format!(
            "除外パターン: {}",
            app.exclude.join(", ")
        )));
    }
    if let Some(notice) = app.save_notice.as_deref() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            notice,
            Style::default().fg(Color::Green),
        )));
    }

    let w = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title("概要"))
        .wrap(Wrap { trim: false });
    f.render_widget(w, chunks[1]);
}

fn draw_running(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let spinner = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let idx = (app.tick as usize) % spinner.len();
    let s = spinner[idx];

    let w = Paragraph::new(Line::from(vec![
        Span::styled(s, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::raw(format!(".als ファイルをスキャン中: {}", app.root_input)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(w, centered_rect(60, 20, area));
}

fn draw_results(f: &mut ratatui::Frame, area: Rect, app: &mut App) {
    let Some(report) = app.report.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(area);

    let summary = Line::from(format!(
        "対象: {}  検出: {}  解析: {}  失敗: {}  ユニークプラグイン: {}",
        report.root,
        report.summary.files_found,
        report.summary.files_parsed,
        report.summary.files_failed,
        report.summary.unique_plugins
    ));
    let w = Paragraph::new(summary).block(Block::default().borders(Borders::ALL).title("概要"));
    f.render_widget(w, chunks[0]);

    let failures_title = if report.failed_files.is_empty() {
        "失敗".to_string()
    } else {
        format!("失敗 ({})", report.failed_files.len())
    };
    let tab_titles = vec![
        "使用回数".to_string(),
        "メーカー別".to_string(),
        "プロジェクト別".to_string(),
        failures_title,
    ];
    let selected = app.tab as usize;
    let tabs = Tabs::new(tab_titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title("結果"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(tabs, chunks[1]);

    let lines = active_lines(app);
    let color = app.color;
    let title = if app.filter.trim().is_empty() {
        "一覧".to_string()
    } else {
        format!("一覧（絞り込み: {}）", app.filter)
    };
    let state = app.active_state();
    App::move_list_selection(state, lines.len(), 0);

    let items: Vec<ListItem> = if lines.is_empty() {
        vec![ListItem::new(Line::from("表示する項目がありません。"))]
    } else {
        lines
            .iter()
            .map(|line| {
                let style = if color && line.ends_with(':') {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(Span::styled(line.clone(), style)))
            })
            .collect()
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, chunks[2], state);
}

fn draw_save_report(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let text = Text::from(vec![
        Line::from("保存先のファイル名:"),
        Line::from(""),
        Line::from(Span::styled(
            app.save_input.as_str(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter で保存、Esc でキャンセルします。",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    let w = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("レポート保存"))
        .wrap(Wrap { trim: false });
    f.render_widget(w, centered_rect(70, 40, area));
}

fn draw_error(f: &mut ratatui::Frame, area: Rect, app: &App) {
    let msg = app
        .error
        .as_deref()
        .unwrap_or("不明なエラーです。")
        .to_string();
    let w = Paragraph::new(msg)
        .block(Block::default().borders(Borders::ALL).title("エラー"))
        .wrap(Wrap { trim: false });
    f.render_widget(w, area);
}

fn draw_help(f: &mut ratatui::Frame, area: Rect, _app: &App) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            "alsaudit UI",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("ホーム:"),
        Line::from("  Enter / r : スキャンを開始"),
        Line::from("  e         : スキャン対象パスを編集"),
        Line::from("  l         : シンボリックリンク追従の切替"),
        Line::from("  q         : 終了"),
        Line::from("  Ctrl-C    : 強制終了（どの画面でも）"),
        Line::from(""),
        Line::from("結果:"),
        Line::from("  Tab / Shift-Tab : タブ切替（使用回数/メーカー別/プロジェクト別/失敗）"),
        Line::from("  ↑↓ / j/k        : 一覧を移動"),
        Line::from("  /               : フィルタ（一覧を絞り込み）"),
        Line::from("  s               : レポートをテキストファイルへ保存"),
        Line::from("  r               : 再スキャン"),
        Line::from("  b / Esc         : ホームへ戻る"),
        Line::from(""),
        Line::from("フィルタ入力:"),
        Line::from("  Enter/Esc: 入力終了  Backspace: 削除  Ctrl-U: クリア"),
        Line::from(""),
        Line::from(Span::styled(
            "メモ:",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("  スキャンは読み取り専用です。プロジェクトファイルは変更しません。"),
        Line::from("  壊れた .als は「失敗」タブに記録され、他のファイルの集計は継続します。"),
    ]);

    let w = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("ヘルプ"))
        .wrap(Wrap { trim: false });
    f.render_widget(w, centered_rect(70, 70, area));
}

fn truncate_chars(input: &str, max_chars: usize) -> String {
    let mut s = String::new();
    for (i, ch) in input.chars().enumerate() {
        if i >= max_chars {
            s.push('…');
            break;
        }
        s.push(ch);
    }
    s
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
