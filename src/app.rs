use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use fuzzy_matcher::skim::SkimMatcherV2;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap,
};
use ratatui::{Frame, Terminal};

use crate::clipboard::{self, Passthrough};
use crate::config::ThemeName;
use crate::export;
use crate::favorites::{self, FavoriteKey, FavoritesIndex, RecordRef};
use crate::matrix::{MatrixAnimator, MatrixSettings};
use crate::model::{Catalog, CommandRecord, Platform, Tab};
use crate::search::{self, Facet, QUERY_PLACEHOLDER};
use crate::simulation;

const DETAILS_PLACEHOLDER: &str = "Select a command to view details...";
const FAVORITE_MARKER: &str = "★";

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

#[derive(Debug, Clone)]
pub struct Settings {
    pub start_tab: Tab,
    pub theme: ThemeName,
    pub animation_enabled: bool,
    pub tick_rate: Duration,
    pub matrix: MatrixSettings,
    pub default_output_file: String,
    pub cwd: PathBuf,
}

pub fn run_tui(catalog: Catalog, favorites: FavoritesIndex, settings: Settings) -> Result<()> {
    let animator = MatrixAnimator::new(settings.matrix);
    let mut terminal = init_terminal()?;
    let mut app = AppState::new(catalog, favorites, settings, animator);

    match run_loop(&mut terminal, &mut app) {
        Ok(()) => restore_terminal(&mut terminal),
        Err(err) => {
            let _ = restore_terminal(&mut terminal);
            Err(err)
        }
    }
}

fn init_terminal() -> Result<TuiTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("failed to create terminal")
}

fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")
}

fn run_loop(terminal: &mut TuiTerminal, app: &mut AppState) -> Result<()> {
    let mut last_tick = Instant::now();
    loop {
        if last_tick.elapsed() >= app.tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        terminal.draw(|frame| draw_ui(frame, app))?;

        let timeout = app.tick_rate.saturating_sub(last_tick.elapsed());
        if !event::poll(timeout)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let UiAction::Quit = app.on_key(key) {
            break;
        }

        if let Some(text) = app.clipboard_request.take() {
            if let Err(err) = clipboard::copy(terminal.backend_mut(), &text, app.passthrough) {
                let message = format!("{err:#}");
                tracing::warn!(error = %message, "clipboard copy failed");
                app.set_status(StatusKind::Error, format!("Copy failed: {message}"));
            }
        }
    }

    let favorites: Vec<FavoriteKey> = app.favorites.keys().collect();
    tracing::info!(count = app.favorites.len(), favorites = ?favorites, "shutting down");
    Ok(())
}

fn draw_ui(frame: &mut Frame, app: &AppState) {
    let bottom_height = if app.show_help { 13 } else { 1 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(bottom_height),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_tabs(frame, app, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[2]);
    draw_commands_panel(frame, app, body[0]);
    draw_details_panel(frame, app, body[1]);

    draw_search_bar(frame, app, chunks[3]);
    draw_status_bar(frame, app, chunks[4]);
    if app.show_help {
        draw_help_panel(frame, app, chunks[5]);
    } else {
        draw_hint_bar(frame, app, chunks[5]);
    }

    if matches!(app.mode, Mode::Browse) {
        let x = chunks[3].x.saturating_add(8 + app.query_cursor as u16);
        let y = chunks[3].y;
        frame.set_cursor_position((x, y));
    }

    match &app.mode {
        Mode::Browse => {}
        Mode::SavePrompt(prompt) => draw_save_popup(frame, app, prompt),
        Mode::Confirm(confirm) => draw_confirm_popup(frame, app, confirm),
        Mode::Error(message) => draw_error_popup(frame, app, message),
    }
}

fn draw_header(frame: &mut Frame, app: &AppState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(24)])
        .split(area);

    let title = vec![
        Line::from(Span::styled(
            "RE_start",
            Style::default()
                .fg(app.palette.text)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Terminal Commands Explorer",
            Style::default().fg(app.palette.accent),
        )),
    ];
    frame.render_widget(Paragraph::new(title), columns[0]);

    if app.animation_enabled {
        draw_matrix(frame, app, columns[1]);
    }
}

fn draw_matrix(frame: &mut Frame, app: &AppState, area: Rect) {
    let width = area.width as usize;
    let style = Style::default().fg(app.palette.text);
    let snapshot = app.animator.snapshot();
    let skip = snapshot.len().saturating_sub(area.height as usize);
    let lines: Vec<Line<'_>> = snapshot[skip..]
        .iter()
        .map(|row| Line::from(Span::styled(row.chars().take(width).collect::<String>(), style)))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_tabs(frame: &mut Frame, app: &AppState, area: Rect) {
    let tabs = Tabs::new(Tab::ALL.iter().map(|tab| tab.title()))
        .select(app.tab.position())
        .style(Style::default().fg(app.palette.muted))
        .highlight_style(
            Style::default()
                .fg(app.palette.text)
                .bg(app.palette.highlight)
                .add_modifier(Modifier::BOLD),
        )
        .divider("|");
    frame.render_widget(tabs, area);
}

fn draw_commands_panel(frame: &mut Frame, app: &AppState, area: Rect) {
    let title = format!(
        "Commands ({}/{})",
        app.filtered.len(),
        app.active_len()
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.palette.border));

    let rows = app.display_rows();
    if rows.is_empty() {
        let message = if app.tab == Tab::Favorites && app.favorites.is_empty() {
            "No favorites yet (Ctrl+F in a platform tab)"
        } else {
            "No matching commands"
        };
        let mut lines = vec![Line::from(message)];
        if let Some(suggestion) = &app.suggestion {
            lines.push(Line::from(Span::styled(
                format!("closest: {suggestion}"),
                Style::default().fg(app.palette.muted),
            )));
        }
        let empty = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem<'_>> = rows
        .iter()
        .map(|row| {
            let mut spans = vec![Span::styled(
                row.name.to_string(),
                Style::default().fg(app.palette.text),
            )];
            if row.favorite {
                spans.push(Span::styled(
                    format!(" {FAVORITE_MARKER}"),
                    Style::default().fg(app.palette.accent),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(app.selected);

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(app.palette.highlight)
                .fg(app.palette.text)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_details_panel(frame: &mut Frame, app: &AppState, area: Rect) {
    let details = Paragraph::new(app.details.as_str())
        .style(Style::default().fg(app.palette.text))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Details")
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(app.palette.border)),
        );
    frame.render_widget(details, area);
}

fn draw_search_bar(frame: &mut Frame, app: &AppState, area: Rect) {
    let query = if app.query.is_empty() {
        Span::styled(QUERY_PLACEHOLDER, Style::default().fg(app.palette.muted))
    } else {
        Span::styled(app.query.clone(), Style::default().fg(Color::White))
    };
    let line = Line::from(vec![
        Span::styled("Search: ", Style::default().fg(Color::White)),
        query,
        Span::styled(
            format!("   Category: {}", app.facet.label()),
            Style::default().fg(app.palette.accent),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_status_bar(frame: &mut Frame, app: &AppState, area: Rect) {
    let Some(status) = &app.status else {
        return;
    };
    let color = match status.kind {
        StatusKind::Info => app.palette.text,
        StatusKind::Error => Color::LightRed,
    };
    frame.render_widget(
        Paragraph::new(status.text.as_str()).style(Style::default().fg(color)),
        area,
    );
}

fn draw_hint_bar(frame: &mut Frame, app: &AppState, area: Rect) {
    let text = if app.show_help {
        "  Press ? or Esc to close help"
    } else {
        "  ? for help"
    };
    let hint = Paragraph::new(text)
        .style(Style::default().fg(app.palette.muted))
        .alignment(Alignment::Left);
    frame.render_widget(hint, area);
}

fn draw_help_panel(frame: &mut Frame, app: &AppState, area: Rect) {
    let rows = vec![
        Line::from("  Tab/Shift+Tab  Switch platform tab"),
        Line::from("  Up/Down        Select command"),
        Line::from("  PgUp/PgDn      Move selection faster"),
        Line::from("  Ctrl+N/Ctrl+P  Next/previous category"),
        Line::from("  Enter          Run simulation"),
        Line::from("  Ctrl+F         Add/remove favorite"),
        Line::from("  Ctrl+S         Save details to file"),
        Line::from("  Ctrl+Y         Copy command name to clipboard"),
        Line::from("  Left/Right     Move cursor in search input"),
        Line::from("  Backspace/Del  Edit search input"),
        Line::from("  ?              Toggle this help"),
        Line::from("  Esc            Clear search / quit"),
    ];
    let content = Paragraph::new(rows).alignment(Alignment::Left).block(
        Block::default()
            .borders(Borders::NONE)
            .style(Style::default().fg(app.palette.muted)),
    );
    frame.render_widget(content, area);
}

fn draw_save_popup(frame: &mut Frame, app: &AppState, prompt: &SavePromptState) {
    let area = centered_rect(70, 30, frame.area());
    let body = popup_body(frame, app, area, "Save Output");

    frame.render_widget(Paragraph::new("Save details to file:"), body[0]);
    frame.render_widget(
        Paragraph::new("Enter = save, Esc = cancel (.txt is added when no extension)"),
        body[1],
    );
    frame.render_widget(
        Paragraph::new(format!("directory: {}", app.cwd.display())),
        body[2],
    );
    frame.render_widget(Paragraph::new(format!("> {}", prompt.input)), body[3]);

    let x = body[3]
        .x
        .saturating_add(2 + prompt.input.chars().count() as u16);
    frame.set_cursor_position((x, body[3].y));
}

fn draw_confirm_popup(frame: &mut Frame, app: &AppState, confirm: &ConfirmState) {
    let area = centered_rect(70, 30, frame.area());
    let (title, question, detail) = match &confirm.action {
        ConfirmAction::Overwrite(path) => (
            "Overwrite",
            "File already exists. Overwrite?",
            format!("file: {}", path.display()),
        ),
        ConfirmAction::Quit => (
            "Exit",
            "Are you sure you want to terminate the session?",
            format!("favorites: {} (not saved)", app.favorites.len()),
        ),
    };
    let body = popup_body(frame, app, area, title);

    frame.render_widget(Paragraph::new(question), body[0]);
    frame.render_widget(Paragraph::new("answer: y/n (Enter = no)"), body[1]);
    frame.render_widget(Paragraph::new(detail), body[2]);
    frame.render_widget(Paragraph::new(format!("> {}", confirm.input)), body[3]);

    let x = body[3]
        .x
        .saturating_add(2 + confirm.input.chars().count() as u16);
    frame.set_cursor_position((x, body[3].y));
}

fn draw_error_popup(frame: &mut Frame, app: &AppState, message: &str) {
    let area = centered_rect(60, 30, frame.area());
    frame.render_widget(Clear, area);
    let content = Paragraph::new(vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::LightRed),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to continue",
            Style::default().fg(app.palette.muted),
        )),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Error")
            .border_style(Style::default().fg(Color::LightRed))
            .style(Style::default().bg(Color::Black)),
    );
    frame.render_widget(content, area);
}

fn popup_body(frame: &mut Frame, app: &AppState, area: Rect, title: &str) -> Vec<Rect> {
    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .title(title.to_string())
            .border_style(Style::default().fg(app.palette.border))
            .style(Style::default().bg(Color::Black)),
        area,
    );

    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .margin(1)
        .split(area)
        .to_vec()
}

fn centered_rect(percent_x: u16, percent_y: u16, rect: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(rect);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[derive(Clone, Copy)]
struct Palette {
    text: Color,
    accent: Color,
    highlight: Color,
    muted: Color,
    border: Color,
}

impl Palette {
    fn for_theme(theme: ThemeName) -> Self {
        match theme {
            ThemeName::Cyberpunk => Self {
                text: Color::Rgb(0, 255, 0),
                accent: Color::Rgb(255, 0, 255),
                highlight: Color::Rgb(0, 85, 0),
                muted: Color::Rgb(0, 140, 140),
                border: Color::Rgb(0, 255, 255),
            },
            ThemeName::Matrix => Self {
                text: Color::Rgb(0, 255, 0),
                accent: Color::Rgb(0, 200, 0),
                highlight: Color::Rgb(0, 80, 0),
                muted: Color::Rgb(0, 120, 0),
                border: Color::Rgb(0, 100, 0),
            },
            ThemeName::Neon => Self {
                text: Color::Rgb(0, 200, 255),
                accent: Color::Rgb(190, 0, 255),
                highlight: Color::Rgb(45, 0, 95),
                muted: Color::Rgb(110, 90, 160),
                border: Color::Rgb(140, 60, 255),
            },
        }
    }
}

enum UiAction {
    None,
    Quit,
}

enum Mode {
    Browse,
    SavePrompt(SavePromptState),
    Confirm(ConfirmState),
    Error(String),
}

struct SavePromptState {
    input: String,
}

enum ConfirmAction {
    Overwrite(PathBuf),
    Quit,
}

struct ConfirmState {
    action: ConfirmAction,
    input: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum StatusKind {
    Info,
    Error,
}

struct Status {
    kind: StatusKind,
    text: String,
}

#[derive(Debug, PartialEq, Eq)]
struct DisplayRow<'a> {
    name: &'a str,
    favorite: bool,
}

struct AppState {
    catalog: Catalog,
    favorites: FavoritesIndex,
    tab: Tab,
    query: String,
    query_cursor: usize,
    facet: Facet,
    filtered: Vec<RecordRef>,
    suggestion: Option<String>,
    selected: Option<usize>,
    details: String,
    status: Option<Status>,
    mode: Mode,
    show_help: bool,
    matcher: SkimMatcherV2,
    animator: MatrixAnimator,
    animation_enabled: bool,
    tick_rate: Duration,
    palette: Palette,
    default_output_file: String,
    cwd: PathBuf,
    clipboard_request: Option<String>,
    passthrough: Passthrough,
}

impl AppState {
    fn new(
        catalog: Catalog,
        favorites: FavoritesIndex,
        settings: Settings,
        animator: MatrixAnimator,
    ) -> Self {
        let mut app = Self {
            catalog,
            favorites,
            tab: settings.start_tab,
            query: String::new(),
            query_cursor: 0,
            facet: Facet::All,
            filtered: Vec::new(),
            suggestion: None,
            selected: None,
            details: DETAILS_PLACEHOLDER.to_string(),
            status: None,
            mode: Mode::Browse,
            show_help: false,
            matcher: SkimMatcherV2::default(),
            animator,
            animation_enabled: settings.animation_enabled,
            tick_rate: settings.tick_rate,
            palette: Palette::for_theme(settings.theme),
            default_output_file: settings.default_output_file,
            cwd: settings.cwd,
            clipboard_request: None,
            passthrough: Passthrough::detect(),
        };

        app.refresh_filtered();
        app.set_status(
            StatusKind::Info,
            format!("Loaded {} commands", app.catalog.len()),
        );
        app
    }

    fn on_tick(&mut self) {
        if self.animation_enabled {
            self.animator.tick();
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> UiAction {
        if self.show_help {
            match key.code {
                KeyCode::Esc | KeyCode::Char('?') => {
                    self.show_help = false;
                    return UiAction::None;
                }
                _ => {
                    // Auto-close help and continue handling the key normally.
                    self.show_help = false;
                }
            }
        }

        match self.mode {
            Mode::Browse => self.on_browse_key(key),
            Mode::SavePrompt(_) => self.on_save_prompt_key(key),
            Mode::Confirm(_) => self.on_confirm_key(key),
            Mode::Error(_) => {
                self.mode = Mode::Browse;
                UiAction::None
            }
        }
    }

    fn on_browse_key(&mut self, key: KeyEvent) -> UiAction {
        if matches!(key.code, KeyCode::Char('?')) {
            self.show_help = true;
            return UiAction::None;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                if self.query.is_empty() {
                    self.ask(ConfirmAction::Quit);
                    UiAction::None
                } else {
                    self.query.clear();
                    self.query_cursor = 0;
                    self.refresh_filtered();
                    UiAction::None
                }
            }
            KeyCode::Char('c') if ctrl => UiAction::Quit,
            KeyCode::Char('f') if ctrl => {
                self.toggle_favorite();
                UiAction::None
            }
            KeyCode::Char('s') if ctrl => {
                self.open_save_prompt();
                UiAction::None
            }
            KeyCode::Char('y') if ctrl => {
                self.copy_selected();
                UiAction::None
            }
            KeyCode::Char('n') if ctrl => {
                self.set_facet(self.facet.next());
                UiAction::None
            }
            KeyCode::Char('p') if ctrl => {
                self.set_facet(self.facet.previous());
                UiAction::None
            }
            KeyCode::Char('j') if ctrl => {
                self.move_selection(1);
                UiAction::None
            }
            KeyCode::Char('k') if ctrl => {
                self.move_selection(-1);
                UiAction::None
            }
            KeyCode::Tab => {
                self.switch_tab(self.tab.next());
                UiAction::None
            }
            KeyCode::BackTab => {
                self.switch_tab(self.tab.previous());
                UiAction::None
            }
            KeyCode::Enter => {
                self.run_simulation();
                UiAction::None
            }
            KeyCode::Up => {
                self.move_selection(-1);
                UiAction::None
            }
            KeyCode::Down => {
                self.move_selection(1);
                UiAction::None
            }
            KeyCode::PageUp => {
                self.move_selection(-10);
                UiAction::None
            }
            KeyCode::PageDown => {
                self.move_selection(10);
                UiAction::None
            }
            KeyCode::Left => {
                if self.query_cursor > 0 {
                    self.query_cursor -= 1;
                }
                UiAction::None
            }
            KeyCode::Right => {
                let len = self.query.chars().count();
                if self.query_cursor < len {
                    self.query_cursor += 1;
                }
                UiAction::None
            }
            KeyCode::Home => {
                self.query_cursor = 0;
                UiAction::None
            }
            KeyCode::End => {
                self.query_cursor = self.query.chars().count();
                UiAction::None
            }
            KeyCode::Backspace => {
                if self.query_cursor > 0 && remove_char_at(&mut self.query, self.query_cursor - 1) {
                    self.query_cursor -= 1;
                    self.refresh_filtered();
                }
                UiAction::None
            }
            KeyCode::Delete => {
                if remove_char_at(&mut self.query, self.query_cursor) {
                    self.refresh_filtered();
                }
                UiAction::None
            }
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                insert_char_at(&mut self.query, self.query_cursor, ch);
                self.query_cursor += 1;
                self.refresh_filtered();
                UiAction::None
            }
            _ => UiAction::None,
        }
    }

    fn on_save_prompt_key(&mut self, key: KeyEvent) -> UiAction {
        let mut prompt = match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::SavePrompt(prompt) => prompt,
            other => {
                self.mode = other;
                return UiAction::None;
            }
        };

        match key.code {
            KeyCode::Esc => {
                self.set_status(StatusKind::Info, "Save canceled");
            }
            KeyCode::Backspace => {
                prompt.input.pop();
                self.mode = Mode::SavePrompt(prompt);
            }
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                prompt.input.push(ch);
                self.mode = Mode::SavePrompt(prompt);
            }
            KeyCode::Enter => {
                let Some(path) = export::resolve_target(&prompt.input, &self.cwd) else {
                    self.set_status(StatusKind::Error, "Enter a file name, not a directory");
                    self.mode = Mode::SavePrompt(prompt);
                    return UiAction::None;
                };
                if path.exists() {
                    self.ask(ConfirmAction::Overwrite(path));
                } else {
                    self.save_details(path);
                }
            }
            _ => {
                self.mode = Mode::SavePrompt(prompt);
            }
        }
        UiAction::None
    }

    fn on_confirm_key(&mut self, key: KeyEvent) -> UiAction {
        let mut confirm = match std::mem::replace(&mut self.mode, Mode::Browse) {
            Mode::Confirm(confirm) => confirm,
            other => {
                self.mode = other;
                return UiAction::None;
            }
        };

        let answer = match key.code {
            KeyCode::Esc => Some(false),
            KeyCode::Enter => match parse_flag_input(&confirm.input, false) {
                Some(answer) => Some(answer),
                None => {
                    self.set_status(StatusKind::Error, "Please enter y or n");
                    confirm.input.clear();
                    None
                }
            },
            KeyCode::Backspace => {
                confirm.input.pop();
                None
            }
            KeyCode::Char(ch)
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT =>
            {
                let answer = parse_flag_input(&ch.to_string(), false);
                if answer.is_none() {
                    confirm.input.push(ch);
                }
                answer
            }
            _ => None,
        };

        match (answer, confirm.action) {
            (Some(true), ConfirmAction::Overwrite(path)) => self.save_details(path),
            (Some(true), ConfirmAction::Quit) => return UiAction::Quit,
            (Some(false), ConfirmAction::Overwrite(_)) => {
                self.set_status(StatusKind::Info, "Save canceled")
            }
            (Some(false), ConfirmAction::Quit) => {}
            (None, action) => {
                self.mode = Mode::Confirm(ConfirmState {
                    action,
                    input: confirm.input,
                })
            }
        }
        UiAction::None
    }

    fn ask(&mut self, action: ConfirmAction) {
        self.mode = Mode::Confirm(ConfirmState {
            action,
            input: String::new(),
        });
    }

    fn copy_selected(&mut self) {
        let Some(name) = self
            .selected_entry()
            .and_then(|reference| reference.resolve(&self.catalog))
            .map(|record| record.name.clone())
        else {
            return;
        };

        tracing::debug!(command = %name, "copying to clipboard");
        self.set_status(
            StatusKind::Info,
            format!("Command '{name}' copied to clipboard"),
        );
        self.clipboard_request = Some(name);
    }

    fn open_save_prompt(&mut self) {
        self.mode = Mode::SavePrompt(SavePromptState {
            input: self.default_output_file.clone(),
        });
    }

    fn save_details(&mut self, path: PathBuf) {
        match export::save_text(&path, &self.details) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "saved details");
                self.set_status(
                    StatusKind::Info,
                    format!("Output saved successfully: {}", path.display()),
                );
            }
            Err(err) => {
                let message = format!("{err:#}");
                tracing::warn!(path = %path.display(), error = %message, "save failed");
                self.mode = Mode::Error(format!("Failed to save file: {message}"));
            }
        }
    }

    fn switch_tab(&mut self, tab: Tab) {
        tracing::debug!(tab = tab.title().trim(), "switching tab");
        self.tab = tab;
        self.refresh_filtered();
        self.details = DETAILS_PLACEHOLDER.to_string();
    }

    fn set_facet(&mut self, facet: Facet) {
        self.facet = facet;
        self.refresh_filtered();
    }

    fn toggle_favorite(&mut self) {
        if self.tab == Tab::Favorites {
            self.set_status(
                StatusKind::Info,
                "Favorites are changed from a platform tab",
            );
            return;
        }
        let Some(reference) = self.selected_entry() else {
            self.set_status(StatusKind::Info, "No command selected");
            return;
        };
        let Some(name) = reference
            .resolve(&self.catalog)
            .map(|record| record.name.clone())
        else {
            return;
        };

        let is_favorite = self.favorites.toggle(reference);
        let key = favorites::encode(reference).ok();
        if is_favorite {
            tracing::info!(command = %name, key = ?key, "added favorite");
            self.set_status(StatusKind::Info, format!("Added {name} to favorites"));
        } else {
            tracing::info!(command = %name, key = ?key, "removed favorite");
            self.set_status(StatusKind::Info, format!("Removed {name} from favorites"));
        }
        self.show_details();
    }

    fn run_simulation(&mut self) {
        let Some(reference) = self.selected_entry() else {
            self.set_status(StatusKind::Info, "No command selected");
            return;
        };
        let Some(record) = reference.resolve(&self.catalog) else {
            return;
        };

        tracing::info!(command = %record.name, platform = %reference.platform, "simulating");
        self.details = simulation::transcript(reference.platform, record);
        let status = format!("Simulated {}", record.name);
        self.set_status(StatusKind::Info, status);
    }

    fn set_status<S: Into<String>>(&mut self, kind: StatusKind, text: S) {
        self.status = Some(Status {
            kind,
            text: text.into(),
        });
    }

    /// Recomputes the visible rows. The selection points into the old rows, so it is dropped.
    fn refresh_filtered(&mut self) {
        let sequence = search::active_sequence(self.tab, &self.catalog, &self.favorites);
        let filtered = search::apply(&sequence, &self.query, self.facet);
        let suggestion = if filtered.is_empty() {
            search::closest_name(&self.matcher, &sequence, &self.query).map(str::to_string)
        } else {
            None
        };
        let filtered = filtered.iter().map(|entry| entry.source).collect();

        self.filtered = filtered;
        self.suggestion = suggestion;
        self.selected = None;
    }

    fn active_len(&self) -> usize {
        match self.tab {
            Tab::Platform(platform) => self.catalog.records_for(platform).len(),
            Tab::Favorites => self.favorites.resolved_view(&self.catalog).count(),
        }
    }

    fn move_selection(&mut self, step: isize) {
        if self.filtered.is_empty() {
            self.selected = None;
            return;
        }

        let len = self.filtered.len() as isize;
        let next = match self.selected {
            Some(current) => (current as isize + step).rem_euclid(len),
            None if step > 0 => 0,
            None => len - 1,
        };
        self.selected = Some(next as usize);
        self.show_details();
    }

    fn selected_entry(&self) -> Option<RecordRef> {
        self.selected
            .and_then(|index| self.filtered.get(index).copied())
    }

    fn show_details(&mut self) {
        let Some(reference) = self.selected_entry() else {
            return;
        };
        let Some(record) = reference.resolve(&self.catalog) else {
            return;
        };
        self.details = format_details(
            reference.platform,
            record,
            self.favorites.contains(reference),
        );
    }

    fn display_rows(&self) -> Vec<DisplayRow<'_>> {
        self.filtered
            .iter()
            .filter_map(|reference| {
                reference.resolve(&self.catalog).map(|record| DisplayRow {
                    name: record.name.as_str(),
                    favorite: self.favorites.contains(*reference),
                })
            })
            .collect()
    }
}

fn format_details(platform: Platform, record: &CommandRecord, is_favorite: bool) -> String {
    let mut details = format!(
        "Command: {}\nOS: {}\nCategory: {}\n\n",
        record.name,
        platform.label(),
        record.category
    );
    details.push_str(&format!("Description:\n{}\n\n", record.description));
    details.push_str(&format!("Examples:\n{}\n\n", record.examples));
    details.push_str(&format!("Dependencies:\n{}\n\n", record.dependencies));
    if is_favorite {
        details.push_str("[★] This command is in your favorites\nPress Ctrl+F to remove it");
    } else {
        details.push_str("[☆] Press Ctrl+F to add this command to favorites");
    }
    details
}

fn parse_flag_input(input: &str, default: bool) -> Option<bool> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(default);
    }

    match trimmed.to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}

fn insert_char_at(value: &mut String, char_index: usize, ch: char) {
    let byte_index = byte_index_for_char(value, char_index);
    value.insert(byte_index, ch);
}

fn remove_char_at(value: &mut String, char_index: usize) -> bool {
    let start = byte_index_for_char(value, char_index);
    if start >= value.len() {
        return false;
    }
    let end = byte_index_for_char(value, char_index + 1);
    value.replace_range(start..end, "");
    true
}

fn byte_index_for_char(value: &str, char_index: usize) -> usize {
    if char_index == 0 {
        return 0;
    }
    value
        .char_indices()
        .nth(char_index)
        .map(|(index, _)| index)
        .unwrap_or(value.len())
}
