use std::{
    env, io,
    path::{Path, PathBuf},
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::LevelFilter;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use slugline::{
    paragraph::ParagraphType,
    render::{self, RenderResult},
    screenplay::Screenplay,
    theme::Theme,
};

const STATUS_TIMEOUT: Duration = Duration::from_secs(4);
const TICK_RATE: Duration = Duration::from_millis(250);
const SHORTCUTS: [&str; 4] = ["Esc:Menu", "^Z:Undo", "^S:Save", "^Q:Quit"];
const LOG_FILE_ENV: &str = "SLUGLINE_LOG";
const LOG_LEVEL_ENV: &str = "SLUGLINE_LOG_LEVEL";

fn main() -> Result<()> {
    run()
}

fn run() -> Result<()> {
    init_logging()?;

    let screenplay = match env::args_os().nth(1) {
        Some(path) => Screenplay::open(PathBuf::from(path)),
        None => Screenplay::new(),
    };
    let mut app = App::new(screenplay);

    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to initialize terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().ok();

    let res = run_app(&mut terminal, &mut app).context("application error");

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    res
}

/// Logs to the file named by `SLUGLINE_LOG`. Without it nothing is logged,
/// since the terminal belongs to the editor.
fn init_logging() -> Result<()> {
    let Some(path) = env::var_os(LOG_FILE_ENV) else {
        return Ok(());
    };
    let level = env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(LevelFilter::Debug);
    let file = fern::log_file(&path)
        .with_context(|| format!("failed to open log file {}", Path::new(&path).display()))?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            out.finish(format_args!(
                "{}.{:03} {:<5} {}: {}",
                timestamp.as_secs(),
                timestamp.subsec_millis(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(file)
        .apply()
        .context("failed to install logger")?;
    log::info!("slugline {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let mut last_tick = Instant::now();
    let mut needs_redraw = true;

    while !app.should_quit() {
        if needs_redraw {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed to draw frame")?;
            needs_redraw = false;
        }

        let timeout = TICK_RATE
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout).context("event poll failed")? {
            let evt = event::read().context("failed to read event")?;
            app.handle_event(evt)?;
            needs_redraw = true;
        }

        if last_tick.elapsed() >= TICK_RATE {
            let had_message_before = app.has_status_message();
            app.on_tick();
            last_tick = Instant::now();
            if had_message_before && !app.has_status_message() {
                needs_redraw = true;
            }
        }
    }

    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum MenuAction {
    Save,
    SaveAs,
    Undo,
    Redo,
    RebuildNames,
    Quit,
}

#[derive(Clone, Copy)]
struct MenuItem {
    label: &'static str,
    action: Option<MenuAction>,
    shortcut: char,
}

impl MenuItem {
    fn new(label: &'static str, action: MenuAction, shortcut: char, enabled: bool) -> Self {
        Self {
            label,
            action: enabled.then_some(action),
            shortcut,
        }
    }

    fn is_enabled(&self) -> bool {
        self.action.is_some()
    }
}

enum MenuEntry {
    Separator,
    Item(MenuItem),
}

struct MenuState {
    entries: Vec<MenuEntry>,
    selected_index: usize,
}

impl MenuState {
    fn new(entries: Vec<MenuEntry>) -> Self {
        let selected_index = entries
            .iter()
            .position(|entry| matches!(entry, MenuEntry::Item(item) if item.is_enabled()))
            .unwrap_or(0);
        Self {
            entries,
            selected_index,
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if self.entries.is_empty() {
            return;
        }

        let len = self.entries.len() as i32;
        let mut idx = self.selected_index as i32;

        for _ in 0..len {
            idx = (idx + delta).rem_euclid(len);
            if matches!(self.entries[idx as usize], MenuEntry::Item(_)) {
                self.selected_index = idx as usize;
                break;
            }
        }
    }

    fn current_action(&self) -> Option<MenuAction> {
        match self.entries.get(self.selected_index) {
            Some(MenuEntry::Item(item)) => item.action,
            _ => None,
        }
    }

    /// Selects the item bound to `key`. Returns whether any item matched.
    fn shortcut_action(&mut self, key: char) -> (bool, Option<MenuAction>) {
        let key = key.to_ascii_lowercase();
        for (idx, entry) in self.entries.iter().enumerate() {
            if let MenuEntry::Item(item) = entry
                && item.shortcut == key
            {
                self.selected_index = idx;
                return (true, item.action);
            }
        }
        (false, None)
    }
}

fn menu_entries(screenplay: &Screenplay) -> Vec<MenuEntry> {
    vec![
        MenuEntry::Item(MenuItem::new("Save", MenuAction::Save, 's', true)),
        MenuEntry::Item(MenuItem::new("Save as…", MenuAction::SaveAs, 'a', true)),
        MenuEntry::Separator,
        MenuEntry::Item(MenuItem::new(
            "Undo",
            MenuAction::Undo,
            'u',
            screenplay.can_undo(),
        )),
        MenuEntry::Item(MenuItem::new(
            "Redo",
            MenuAction::Redo,
            'r',
            screenplay.can_redo(),
        )),
        MenuEntry::Item(MenuItem::new(
            "Rebuild name index",
            MenuAction::RebuildNames,
            'n',
            true,
        )),
        MenuEntry::Separator,
        MenuEntry::Item(MenuItem::new("Quit", MenuAction::Quit, 'q', true)),
    ]
}

struct StatusMessage {
    text: String,
    is_error: bool,
    shown_at: Instant,
}

#[derive(Clone, Debug)]
struct ScrollbarGeometry {
    knob_start: usize,
    knob_size: usize,
}

struct App {
    screenplay: Screenplay,
    theme: Theme,
    scroll_top: usize,
    should_quit: bool,
    dirty: bool,
    status_message: Option<StatusMessage>,
    menu: Option<MenuState>,
    /// Path being typed for "Save as".
    prompt: Option<String>,
    last_viewport_height: usize,
    last_total_lines: usize,
}

impl App {
    fn new(screenplay: Screenplay) -> Self {
        let greeting = match screenplay.path() {
            Some(path) if path.exists() => format!("Opened {}", path.display()),
            Some(path) => format!("New screenplay {}", path.display()),
            None => "New screenplay".to_string(),
        };
        Self {
            screenplay,
            theme: Theme::default(),
            scroll_top: 0,
            should_quit: false,
            dirty: false,
            status_message: Some(StatusMessage {
                text: greeting,
                is_error: false,
                shown_at: Instant::now(),
            }),
            menu: None,
            prompt: None,
            last_viewport_height: 0,
            last_total_lines: 0,
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn has_status_message(&self) -> bool {
        self.status_message.is_some()
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        if area.height == 0 || area.width == 0 {
            return;
        }

        let view_width = self.screenplay.required_width();
        if (area.width as usize) < view_width || area.height < 2 {
            self.draw_too_small(frame, area, view_width);
            return;
        }

        let vertical = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);
        let editor_area = vertical[0];
        let status_area = vertical[1];

        let view_x = editor_area.x + (editor_area.width - view_width as u16) / 2;
        let text_area = Rect::new(
            view_x,
            editor_area.y,
            view_width as u16 - 1,
            editor_area.height,
        );
        let scrollbar_area = Rect::new(
            view_x + view_width as u16 - 1,
            editor_area.y,
            1,
            editor_area.height,
        );

        frame.render_widget(
            Block::default().style(self.theme.page),
            editor_area,
        );

        let render = render::render_screenplay(&self.screenplay, &self.theme);
        let viewport_height = text_area.height as usize;
        self.adjust_scroll(&render, viewport_height);
        self.last_viewport_height = viewport_height;
        self.last_total_lines = render.total_lines;

        let paragraph = Paragraph::new(Text::from(render.lines))
            .block(Block::default().borders(Borders::NONE))
            .scroll((self.scroll_top as u16, 0));
        frame.render_widget(paragraph, text_area);

        self.draw_scrollbar(frame, scrollbar_area);

        if self.menu.is_none()
            && self.prompt.is_none()
            && let Some(cursor) = render.cursor
            && cursor.line >= self.scroll_top
            && cursor.line < self.scroll_top + viewport_height
        {
            let cursor_y = text_area.y + (cursor.line - self.scroll_top) as u16;
            let cursor_x = text_area.x + cursor.column.min(text_area.width - 1);
            frame.set_cursor_position(Position::new(cursor_x, cursor_y));
        }

        let status_line = self.status_line(status_area.width as usize);
        let status_widget = Paragraph::new(status_line)
            .block(Block::default().borders(Borders::NONE))
            .style(self.theme.status);
        frame.render_widget(status_widget, status_area);

        if let Some(input) = &self.prompt {
            let label = "Save as: ";
            let width = render::visible_width(label) + render::visible_width(input);
            let cursor_x = status_area.x + (width as u16).min(status_area.width - 1);
            frame.set_cursor_position(Position::new(cursor_x, status_area.y));
        }

        if self.menu.is_some() {
            self.render_menu(frame, area);
        }
    }

    fn draw_too_small(&self, frame: &mut Frame, area: Rect, view_width: usize) {
        let notice = format!("Terminal too small: need at least {view_width} x 2");
        let widget = Paragraph::new(notice)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(self.theme.status_error);
        frame.render_widget(widget, area);
    }

    fn draw_scrollbar(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }

        let geometry = self.scrollbar_geometry();
        for row in 0..self.last_viewport_height.min(area.height as usize) {
            let y = area.y + row as u16;
            let on_knob = geometry
                .as_ref()
                .is_some_and(|geometry| {
                    row >= geometry.knob_start && row < geometry.knob_start + geometry.knob_size
                });
            let span = if on_knob {
                Span::styled(" ", self.theme.scroll_knob)
            } else {
                Span::styled("│", self.theme.scroll_track)
            };
            frame.render_widget(Paragraph::new(Line::from(span)), Rect::new(area.x, y, 1, 1));
        }
    }

    fn render_menu(&self, frame: &mut Frame, area: Rect) {
        let Some(menu) = &self.menu else {
            return;
        };

        if area.width < 3 || area.height < 3 {
            return;
        }

        let max_label_width = menu
            .entries
            .iter()
            .map(|entry| match entry {
                MenuEntry::Item(item) => item.label.chars().count(),
                MenuEntry::Separator => 0,
            })
            .max()
            .unwrap_or(0);
        // Label, two spaces and the shortcut key.
        let content_width = (max_label_width + 3) as u16;
        let width = (content_width + 4).min(area.width).max(10.min(area.width));
        let height = (menu.entries.len() as u16 + 2).min(area.height);

        let popup_area = Rect::new(
            area.x + (area.width.saturating_sub(width)) / 2,
            area.y + (area.height.saturating_sub(height)) / 2,
            width,
            height,
        );

        frame.render_widget(Clear, popup_area);

        let separator_width = popup_area.width.saturating_sub(4).max(4) as usize;
        let popup_style = self.theme.menu;

        let items: Vec<ListItem> = menu
            .entries
            .iter()
            .map(|entry| match entry {
                MenuEntry::Separator => ListItem::new(Line::from(Span::styled(
                    "─".repeat(separator_width),
                    self.theme.menu_disabled,
                ))),
                MenuEntry::Item(item) => {
                    let content = format!(
                        "{label:<label_width$}  {shortcut}",
                        label = item.label,
                        label_width = max_label_width,
                        shortcut = item.shortcut,
                    );
                    let style = if item.is_enabled() {
                        Style::default()
                    } else {
                        self.theme.menu_disabled
                    };
                    ListItem::new(Line::from(Span::styled(content, style)))
                }
            })
            .collect();

        let mut state = ListState::default();
        state.select(Some(menu.selected_index));

        let list = List::new(items)
            .highlight_style(self.theme.menu_selected)
            .style(popup_style)
            .block(
                Block::default()
                    .title("Menu")
                    .borders(Borders::ALL)
                    .style(popup_style)
                    .border_style(self.theme.menu_disabled),
            );

        frame.render_stateful_widget(list, popup_area, &mut state);
    }

    fn status_line(&mut self, terminal_width: usize) -> Line<'static> {
        self.prune_status_message();

        if let Some(input) = &self.prompt {
            return Line::from(vec![
                Span::raw("Save as: "),
                Span::styled(input.clone(), self.theme.status_file),
            ]);
        }

        let position = self.cursor_position_text();
        if let Some(message) = &self.status_message {
            let style = if message.is_error {
                self.theme.status_error
            } else {
                Style::default()
            };
            return Line::from(vec![
                Span::raw(format!("{position} ")),
                Span::styled(message.text.clone(), style),
            ]);
        }

        let filename = self
            .screenplay
            .path()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "[No Name]".to_string());
        let marker = if self.dirty { "*" } else { "" };
        let paragraph_type = self.screenplay.cursor_paragraph().paragraph_type();

        let mut line = Line::from(vec![
            Span::raw(format!("{position} ")),
            Span::styled(format!("{filename}{marker}"), self.theme.status_file),
            Span::raw(" "),
            Span::styled(paragraph_type.label(), self.theme.status_type),
            Span::raw(format!(", {} scenes", self.scene_count())),
        ]);
        let left_width = render::line_width(&line);

        // Leading shortcuts are the first to go when the line gets narrow.
        let shortcuts = (0..SHORTCUTS.len())
            .map(|skip| SHORTCUTS[skip..].join(" "))
            .find(|shown| left_width + 1 + shown.chars().count() <= terminal_width);
        if let Some(shortcuts) = shortcuts {
            let padding = terminal_width - left_width - shortcuts.chars().count();
            line.spans.push(Span::raw(" ".repeat(padding)));
            line.spans.push(Span::raw(shortcuts));
        }
        line
    }

    fn prune_status_message(&mut self) {
        if let Some(message) = &self.status_message
            && message.shown_at.elapsed() > STATUS_TIMEOUT
        {
            self.status_message = None;
        }
    }

    fn adjust_scroll(&mut self, render: &RenderResult, viewport_height: usize) {
        let viewport = viewport_height.max(1);
        let max_scroll = render.total_lines.saturating_sub(viewport);
        if let Some(cursor) = render.cursor {
            self.scroll_top = scroll_top_for_cursor(self.scroll_top, cursor.line, viewport);
        }
        self.scroll_top = self.scroll_top.min(max_scroll);
    }

    fn scrollbar_geometry(&self) -> Option<ScrollbarGeometry> {
        if self.last_viewport_height == 0 || self.last_total_lines <= self.last_viewport_height {
            return None;
        }

        let knob_size = ((self.last_viewport_height * self.last_viewport_height)
            / self.last_total_lines)
            .clamp(1, self.last_viewport_height);
        let max_scroll = self
            .last_total_lines
            .saturating_sub(self.last_viewport_height);
        let knob_travel = self.last_viewport_height.saturating_sub(knob_size);
        let knob_start = if max_scroll == 0 || knob_travel == 0 {
            0
        } else {
            (self.scroll_top.min(max_scroll) * knob_travel) / max_scroll
        };

        Some(ScrollbarGeometry {
            knob_start,
            knob_size,
        })
    }

    fn open_menu(&mut self) {
        self.menu = Some(MenuState::new(menu_entries(&self.screenplay)));
    }

    fn close_menu(&mut self) {
        self.menu = None;
    }

    fn handle_menu_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.close_menu(),
            KeyCode::Up => {
                if let Some(menu) = self.menu.as_mut() {
                    menu.move_selection(-1);
                }
            }
            KeyCode::Down | KeyCode::Tab => {
                if let Some(menu) = self.menu.as_mut() {
                    menu.move_selection(1);
                }
            }
            KeyCode::Enter => {
                if let Some(action) = self.menu.as_ref().and_then(MenuState::current_action) {
                    self.close_menu();
                    self.execute_menu_action(action);
                }
            }
            KeyCode::Char(key) => {
                let action = match self.menu.as_mut() {
                    Some(menu) => menu.shortcut_action(key),
                    None => (false, None),
                };
                if let (true, Some(action)) = action {
                    self.close_menu();
                    self.execute_menu_action(action);
                }
            }
            _ => {}
        }
    }

    fn execute_menu_action(&mut self, action: MenuAction) {
        log::debug!("menu action {action:?}");
        match action {
            MenuAction::Save => self.save(),
            MenuAction::SaveAs => self.open_prompt(),
            MenuAction::Undo => self.undo(),
            MenuAction::Redo => self.redo(),
            MenuAction::RebuildNames => {
                self.screenplay.rebuild_autocomplete_index();
                let count = self.screenplay.names().len();
                self.set_status(format!("{count} names indexed"));
            }
            MenuAction::Quit => self.should_quit = true,
        }
    }

    fn open_prompt(&mut self) {
        let current = self
            .screenplay
            .path()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        self.prompt = Some(current);
    }

    fn handle_prompt_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let Some(input) = self.prompt.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Enter => {
                if input.trim().is_empty() {
                    self.set_error("No file name given");
                    return;
                }
                let path = PathBuf::from(input.trim());
                if self.save_to(&path) {
                    self.prompt = None;
                }
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => input.push(ch),
            _ => {}
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event
        else {
            return Ok(());
        };

        if self.prompt.is_some() {
            self.handle_prompt_key(code, modifiers);
            return Ok(());
        }

        if self.menu.is_some() {
            self.handle_menu_key(code);
            return Ok(());
        }

        let previous_paragraph = self.screenplay.cursor().paragraph;
        let was_on_name =
            self.screenplay.cursor_paragraph().paragraph_type() == ParagraphType::Name;

        match (code, modifiers) {
            (KeyCode::Char('q'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            (KeyCode::Char('s'), m) if m.contains(KeyModifiers::CONTROL) => self.save(),
            (KeyCode::Char('z'), m) if m.contains(KeyModifiers::CONTROL) => self.undo(),
            (KeyCode::Char('y'), m) if m.contains(KeyModifiers::CONTROL) => self.redo(),
            (KeyCode::Esc, _) => self.open_menu(),
            (KeyCode::Enter, _) => {
                self.screenplay.enter();
                self.mark_dirty();
            }
            (KeyCode::Backspace, _) => {
                if self.screenplay.delete_backward() {
                    self.mark_dirty();
                }
            }
            (KeyCode::Delete, _) => {
                if self.screenplay.delete_forward() {
                    self.mark_dirty();
                }
            }
            (KeyCode::Tab, _) => self.change_type(Screenplay::convert_by_tab),
            (KeyCode::Left, m) if m.contains(KeyModifiers::SHIFT) => {
                self.change_type(Screenplay::convert_to_previous_type);
            }
            (KeyCode::Right, m) if m.contains(KeyModifiers::SHIFT) => {
                self.change_type(Screenplay::convert_to_next_type);
            }
            (KeyCode::Left, _) => {
                self.screenplay.move_left();
            }
            (KeyCode::Right, _) => {
                self.screenplay.move_right();
            }
            (KeyCode::Up, _) => {
                self.screenplay.move_up();
            }
            (KeyCode::Down, _) => {
                self.screenplay.move_down();
            }
            (KeyCode::Home, _) => {
                self.screenplay.move_to_line_start();
            }
            (KeyCode::End, _) => {
                self.screenplay.move_to_line_end();
            }
            (KeyCode::PageUp, _) => {
                if self.screenplay.move_to_previous_scene() {
                    self.scroll_top = self.screenplay.cursor_line_column().0;
                }
            }
            (KeyCode::PageDown, _) => {
                if self.screenplay.move_to_next_scene() {
                    self.scroll_top = self.screenplay.cursor_line_column().0;
                }
            }
            (KeyCode::Char('_'), m) if !m.contains(KeyModifiers::CONTROL) => {
                if self.screenplay.cursor_paragraph().paragraph_type() == ParagraphType::Name {
                    if self.screenplay.autocomplete_name() {
                        self.mark_dirty();
                    }
                } else {
                    self.screenplay.type_text("_");
                    self.mark_dirty();
                }
            }
            (KeyCode::Char(ch), m)
                if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let mut buffer = [0; 4];
                self.screenplay.type_text(ch.encode_utf8(&mut buffer));
                self.mark_dirty();
            }
            _ => {}
        }

        let left_name = self.screenplay.cursor().paragraph != previous_paragraph
            || self.screenplay.cursor_paragraph().paragraph_type() != ParagraphType::Name;
        if was_on_name && left_name {
            self.screenplay.rebuild_autocomplete_index();
        }
        Ok(())
    }

    fn on_tick(&mut self) {
        self.prune_status_message();
    }

    fn change_type(&mut self, convert: fn(&mut Screenplay)) {
        let before = self.screenplay.cursor_paragraph().paragraph_type();
        convert(&mut self.screenplay);
        let after = self.screenplay.cursor_paragraph().paragraph_type();
        if before != after {
            self.mark_dirty();
        }
    }

    fn undo(&mut self) {
        if self.screenplay.undo() {
            self.mark_dirty();
        } else {
            self.set_status("Nothing to undo");
        }
    }

    fn redo(&mut self) {
        if self.screenplay.redo() {
            self.mark_dirty();
        } else {
            self.set_status("Nothing to redo");
        }
    }

    fn save(&mut self) {
        match self.screenplay.path().map(Path::to_path_buf) {
            Some(path) => {
                self.save_to(&path);
            }
            None => self.open_prompt(),
        }
    }

    fn save_to(&mut self, path: &Path) -> bool {
        let result = self
            .screenplay
            .save(path)
            .with_context(|| format!("failed to save {}", path.display()));
        match result {
            Ok(()) => {
                self.dirty = false;
                self.set_status(format!("Saved {}", path.display()));
                true
            }
            Err(err) => {
                log::error!("{err:#}");
                self.set_error(format!("{err:#}"));
                false
            }
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn scene_count(&self) -> usize {
        self.screenplay
            .paragraphs()
            .iter()
            .filter(|paragraph| paragraph.paragraph_type() == ParagraphType::Scene)
            .count()
    }

    fn cursor_position_text(&self) -> String {
        let (line, column) = self.screenplay.cursor_line_column();
        format!("{}:{}", line + 1, column + 1)
    }
}

/// Keeps the cursor line visible with one line of margin where the viewport allows.
fn scroll_top_for_cursor(scroll_top: usize, cursor_line: usize, viewport: usize) -> usize {
    let mut scroll = scroll_top;
    if viewport == 0 {
        return scroll;
    }

    let margin = if viewport >= 3 { 1 } else { 0 };
    let top_limit = scroll.saturating_add(margin);
    let bottom_offset = viewport.saturating_sub(1).saturating_sub(margin);
    let bottom_limit = scroll.saturating_add(bottom_offset);
    if cursor_line < top_limit {
        scroll = cursor_line.saturating_sub(margin);
    } else if cursor_line > bottom_limit {
        scroll = cursor_line.saturating_sub(bottom_offset);
    }
    scroll
}
