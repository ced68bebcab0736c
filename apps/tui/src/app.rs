//! Core TUI application state and event loop.

use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use noahaid_core::{Session, TokioScheduler};
use noahaid_shared::{config_dir, load_config};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use crate::screens::ScreenId;
use crate::screens::chat::ChatScreen;
use crate::screens::topics::TopicsScreen;
use crate::widgets::status_bar;

/// Application state.
pub(crate) struct App {
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Available screens.
    pub screens: Vec<ScreenId>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Name shown in the tab bar.
    pub assistant_name: String,
    pub chat: ChatScreen,
    pub topics: TopicsScreen,
}

impl App {
    pub(crate) fn new(session: Session, assistant_name: String) -> Self {
        let topics = TopicsScreen::new(session.knowledge_base());
        Self {
            active_tab: 0,
            screens: vec![ScreenId::Chat, ScreenId::Topics],
            should_quit: false,
            status: "Ready — describe what happened, press ? for help".to_string(),
            show_help: false,
            chat: ChatScreen::new(session, assistant_name.clone()),
            assistant_name,
            topics,
        }
    }

    fn current_screen(&self) -> ScreenId {
        self.screens[self.active_tab]
    }

    fn is_editing(&self) -> bool {
        self.current_screen() == ScreenId::Chat && self.chat.is_editing()
    }
}

/// Route logs to `~/.noahaid/noahaid-tui.log` when `RUST_LOG` is set;
/// the terminal itself is owned by the UI.
pub(crate) fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let Ok(filter) = EnvFilter::try_from_default_env() else {
        return;
    };
    let Ok(dir) = config_dir() else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("noahaid-tui.log"))
    else {
        return;
    };

    let _ = fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
}

/// Entry point — sets up runtime and terminal, runs event loop, restores terminal.
pub(crate) fn run() -> Result<()> {
    let config = load_config()?;

    // Reply timers run here while the event loop stays synchronous.
    let runtime = tokio::runtime::Runtime::new()?;
    let scheduler = TokioScheduler::new(runtime.handle().clone());
    let session = Session::from_config(&config, None, Arc::new(scheduler))?;
    tracing::info!(topics = session.knowledge_base().len(), "launching TUI");

    let mut app = App::new(session, config.display.assistant_name.clone());

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        // Poll with a short timeout so replies and the typing indicator show promptly
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c')
            if modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.should_quit = true;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        KeyCode::Esc => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') if !app.is_editing() => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') if !app.is_editing() => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Tab if !app.is_editing() => {
            app.active_tab = (app.active_tab + 1) % app.screens.len();
            app.status = format!("{}", app.screens[app.active_tab]);
            return;
        }
        KeyCode::BackTab if !app.is_editing() => {
            app.active_tab = if app.active_tab == 0 {
                app.screens.len() - 1
            } else {
                app.active_tab - 1
            };
            app.status = format!("{}", app.screens[app.active_tab]);
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    match app.current_screen() {
        ScreenId::Chat => {
            if let Some(status) = app.chat.handle_key(code, modifiers) {
                app.status = status;
            }
        }
        ScreenId::Topics => app.topics.handle_key(code, modifiers),
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    // Tab bar
    let tab_titles: Vec<Line> = app
        .screens
        .iter()
        .map(|s| Line::from(format!("{s}")))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" 🩺 {} ", app.assistant_name)),
        )
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    // Content area — delegate to screen
    match app.current_screen() {
        ScreenId::Chat => app.chat.draw(f, chunks[1]),
        ScreenId::Topics => app.topics.draw(f, chunks[1]),
    }

    // Status bar
    let bar = status_bar(&app.status);
    f.render_widget(bar, chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 60, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  Tab/S-Tab    Next/previous screen (input empty)"),
        Line::from("  ?            Toggle this help (input empty)"),
        Line::from("  q            Quit (input empty)"),
        Line::from("  Esc / Ctrl-C Quit"),
        Line::from(""),
        Line::from("Chat:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Enter        Send"),
        Line::from("  Shift+Enter  New line"),
        Line::from(""),
        Line::from("Topics:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓ or j/k   Navigate list"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help — press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
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
