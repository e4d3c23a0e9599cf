use std::{
    cmp, io, thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::{spawn, sync::mpsc};
use tracing::{error, info, warn};
use transit_memory_core::{
    catalog::{self, CatalogEntry},
    AppConfig, Game, GuessResult, LineLoader, LineStats, LoadError, SaveManager, SavedGame,
};

use crate::theme::Theme;

const TICK_RATE: Duration = Duration::from_millis(250);
/// How long guess feedback stays visible.
const FEEDBACK_DURATION: Duration = Duration::from_millis(500);
const PROGRESS_BAR_WIDTH: usize = 12;

const INTRO: &str = "Name as many stations as you can from memory. \
Pick one or more lines below and start typing station names. \
Alternate spellings such as \"Centralen\" are accepted.";

enum AppEvent {
    Input(Event),
    Tick,
    LinesLoaded {
        result: Result<Vec<transit_memory_core::Line>, LoadError>,
        restore: Option<Vec<String>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Setup,
    Loading,
    Play,
}

#[derive(Debug, Clone)]
struct Feedback {
    result: GuessResult,
    message: String,
    expires_at: Instant,
}

struct SetupState {
    cursor: usize,
    selected: Vec<bool>,
    available: Vec<bool>,
}

impl SetupState {
    fn new(available: &[&'static CatalogEntry]) -> Self {
        let mut setup = Self {
            cursor: 0,
            selected: vec![false; catalog::CATALOG.len()],
            available: Vec::new(),
        };
        setup.set_available(available);
        setup
    }

    // Entries that lost their data are deselected.
    fn set_available(&mut self, available: &[&'static CatalogEntry]) {
        self.available = catalog::CATALOG
            .iter()
            .map(|entry| available.iter().any(|found| found.key == entry.key))
            .collect();
        for (selected, available) in self.selected.iter_mut().zip(&self.available) {
            *selected &= *available;
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = catalog::CATALOG.len() as isize;
        if len == 0 {
            return;
        }
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
    }

    fn toggle(&mut self) -> bool {
        if !self.available[self.cursor] {
            return false;
        }
        self.selected[self.cursor] = !self.selected[self.cursor];
        true
    }

    fn selection(&self) -> Vec<String> {
        catalog::CATALOG
            .iter()
            .zip(&self.selected)
            .filter(|(_, selected)| **selected)
            .map(|(entry, _)| entry.key.to_string())
            .collect()
    }
}

/// Terminal frontend: feeds key presses into the game and renders its state.
pub struct App {
    config: AppConfig,
    loader: LineLoader,
    save_manager: SaveManager,
    game: Game,
    screen: Screen,
    setup: SetupState,
    selected_lines: Vec<String>,
    input: String,
    feedback: Option<Feedback>,
    last_found: Option<String>,
    has_seen_intro: bool,
    confirm_reset: bool,
    status: String,
    should_quit: bool,
    theme: Theme,
    event_tx: Option<mpsc::Sender<AppEvent>>,
}

impl App {
    pub fn new(config: AppConfig, loader: LineLoader, save_manager: SaveManager) -> Self {
        let available = catalog::available(&config.data_root);
        if available.is_empty() {
            warn!(data_root = %config.data_root.display(), "No line data found");
        }
        Self {
            setup: SetupState::new(&available),
            config,
            loader,
            save_manager,
            game: Game::new(),
            screen: Screen::Setup,
            selected_lines: Vec::new(),
            input: String::new(),
            feedback: None,
            last_found: None,
            has_seen_intro: false,
            confirm_reset: false,
            status: "Ready".to_string(),
            should_quit: false,
            theme: Theme::default(),
            event_tx: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        self.restore_saved_game();

        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            match event_rx.recv().await {
                Some(event) => self.process_app_event(event),
                None => break,
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn restore_saved_game(&mut self) {
        match self.save_manager.load() {
            Ok(Some(saved)) => {
                self.has_seen_intro = saved.has_seen_intro;
                if saved.started && !saved.selected_lines.is_empty() {
                    info!(lines = ?saved.selected_lines, "Resuming saved game");
                    self.status = "Resuming saved game".to_string();
                    self.start_loading(saved.selected_lines, Some(saved.completed_guesses));
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(?err, "Discarding unreadable save");
                self.status = format!("Could not read save: {err}");
                if let Err(err) = self.save_manager.clear() {
                    error!(?err, "Failed to remove unreadable save");
                }
            }
        }
    }

    fn start_loading(&mut self, selection: Vec<String>, restore: Option<Vec<String>>) {
        let specs = catalog::resolve(&selection);
        if specs.is_empty() {
            self.status = "No playable lines selected".to_string();
            self.screen = Screen::Setup;
            return;
        }
        let Some(sender) = self.event_tx.clone() else {
            return;
        };

        self.selected_lines = selection;
        self.screen = Screen::Loading;
        let loader = self.loader.clone();
        spawn(async move {
            let result = loader.load_all(&specs).await;
            let _ = sender.send(AppEvent::LinesLoaded { result, restore }).await;
        });
    }

    fn process_app_event(&mut self, event: AppEvent) {
        self.expire_feedback(Instant::now());
        match event {
            AppEvent::Input(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                self.handle_key(key)
            }
            AppEvent::Input(_) => {}
            AppEvent::Tick => {}
            AppEvent::LinesLoaded { result, restore } => self.handle_lines_loaded(result, restore),
        }
    }

    fn expire_feedback(&mut self, now: Instant) {
        if self
            .feedback
            .as_ref()
            .is_some_and(|feedback| now >= feedback.expires_at)
        {
            self.feedback = None;
        }
    }

    fn rescan_data(&mut self) {
        self.loader.refresh(self.config.data_root.clone());
        let available = catalog::available(&self.config.data_root);
        self.setup.set_available(&available);
        info!(available = available.len(), "Line data rescanned");
        self.status = format!("{} line groups available", available.len());
    }

    fn handle_lines_loaded(
        &mut self,
        result: Result<Vec<transit_memory_core::Line>, LoadError>,
        restore: Option<Vec<String>>,
    ) {
        match result {
            Ok(lines) => {
                self.game.set_lines(lines);
                if let Some(guesses) = restore {
                    self.game.set_completed_guesses(&guesses);
                }
                let progress = self.game.progress();
                self.status = format!(
                    "{} of {} stations found",
                    progress.completed_guesses, progress.total_stations
                );
                self.input.clear();
                self.last_found = None;
                self.screen = Screen::Play;
                self.persist();
            }
            Err(err) => {
                error!(?err, "Loading lines failed");
                self.status = format!("Could not load lines: {err}");
                self.screen = Screen::Setup;
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.screen {
            Screen::Setup => self.handle_setup_key(key),
            Screen::Loading => {
                if key.code == KeyCode::Esc {
                    self.should_quit = true;
                }
            }
            Screen::Play if self.confirm_reset => self.handle_confirm_key(key),
            Screen::Play => self.handle_play_key(key),
        }
    }

    fn handle_setup_key(&mut self, key: KeyEvent) {
        if !self.has_seen_intro {
            self.has_seen_intro = true;
            return;
        }
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.setup.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.setup.move_cursor(1),
            KeyCode::Char('r') => self.rescan_data(),
            KeyCode::Char(' ') => {
                if !self.setup.toggle() {
                    self.status = "No station data installed for that line".to_string();
                }
            }
            KeyCode::Enter => {
                let selection = self.setup.selection();
                if selection.is_empty() {
                    self.status = "Select at least one line".to_string();
                } else {
                    info!(lines = ?selection, "Starting new game");
                    self.start_loading(selection, None);
                }
            }
            _ => {}
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.game.reset();
                self.last_found = None;
                self.feedback = None;
                self.status = "All guesses cleared".to_string();
                self.persist();
            }
            _ => self.status = "Reset cancelled".to_string(),
        }
        self.confirm_reset = false;
    }

    fn handle_play_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') if ctrl => self.confirm_reset = true,
            KeyCode::Char('n') if ctrl => self.abandon_game(),
            KeyCode::Enter => self.submit_guess(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(ch) if !ctrl => self.input.push(ch),
            _ => {}
        }
    }

    fn submit_guess(&mut self) {
        let raw = self.input.trim().to_string();
        if raw.is_empty() {
            return;
        }

        let result = self.game.make_guess(&raw);
        let message = match result {
            GuessResult::Success => {
                let station = self.game.station(&raw).unwrap_or(&raw).to_string();
                self.input.clear();
                self.persist();
                let message = format!("Found {station}");
                self.last_found = Some(station);
                if self.game.is_complete() {
                    info!("Every station found");
                    self.status = "Every station found!".to_string();
                }
                message
            }
            GuessResult::Duplicate => format!("{raw} is already found"),
            GuessResult::Invalid => format!("No station called {raw}"),
        };
        self.feedback = Some(Feedback {
            result,
            message,
            expires_at: Instant::now() + FEEDBACK_DURATION,
        });
    }

    fn abandon_game(&mut self) {
        info!("Game abandoned");
        self.game.clear();
        self.selected_lines.clear();
        self.input.clear();
        self.feedback = None;
        self.last_found = None;
        self.screen = Screen::Setup;
        self.status = "Choose lines for a new game".to_string();
        let saved = SavedGame {
            has_seen_intro: self.has_seen_intro,
            ..SavedGame::default()
        };
        if let Err(err) = self.save_manager.store(&saved) {
            error!(?err, "Failed to clear saved game");
        }
    }

    fn persist(&self) {
        let saved = SavedGame::from_game(&self.game, &self.selected_lines, self.has_seen_intro);
        if let Err(err) = self.save_manager.store(&saved) {
            error!(?err, "Failed to save game");
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(5), Constraint::Length(3)])
            .split(frame.size());

        match self.screen {
            Screen::Setup => self.draw_setup(frame, chunks[0]),
            Screen::Loading => {
                let paragraph = Paragraph::new("Loading lines…")
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL).title("Transit memory"));
                frame.render_widget(paragraph, chunks[0]);
            }
            Screen::Play => self.draw_play(frame, chunks[0]),
        }
        self.render_status(frame, chunks[1]);

        if self.confirm_reset {
            self.render_confirm(frame);
        }
    }

    fn draw_setup(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Transit memory · choose lines");

        if !self.has_seen_intro {
            let paragraph = Paragraph::new(vec![
                Line::from(INTRO),
                Line::from(""),
                Line::from(Span::styled(
                    "Press any key to continue",
                    Style::default().fg(self.theme.muted),
                )),
            ])
            .block(block)
            .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = catalog::CATALOG
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let checkbox = if self.setup.selected[index] { "[x]" } else { "[ ]" };
                let mut style = Style::default().fg(self.theme.line_color(entry.color));
                if !self.setup.available[index] {
                    style = Style::default().fg(self.theme.muted);
                }
                if index == self.setup.cursor {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                let mut spans = vec![
                    Span::raw(format!("{checkbox} ")),
                    Span::styled(entry.name, style),
                    Span::styled(
                        format!("  {} stations", entry.stations),
                        Style::default().fg(self.theme.muted),
                    ),
                ];
                if !self.setup.available[index] {
                    spans.push(Span::styled(
                        "  (no data)",
                        Style::default().fg(self.theme.muted),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        frame.render_widget(List::new(items).block(block), area);
    }

    fn draw_play(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3)])
            .split(area);
        self.render_input(frame, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(rows[1]);
        self.render_line_stats(frame, columns[0]);
        self.render_recent(frame, columns[1]);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let border = self
            .feedback
            .as_ref()
            .map(|feedback| self.theme.feedback(feedback.result))
            .unwrap_or(self.theme.accent);
        let title = match self.feedback.as_ref() {
            Some(feedback) => format!("Guess · {}", feedback.message),
            None => "Guess a station".to_string(),
        };
        let paragraph = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(self.theme.accent)),
            Span::raw(self.input.as_str()),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border))
                .title(title),
        );
        frame.render_widget(paragraph, area);

        if !self.confirm_reset {
            let cursor_x = (area.x + 3 + self.input.chars().count() as u16)
                .min(area.x + area.width.saturating_sub(2));
            frame.set_cursor(cursor_x, area.y + 1);
        }
    }

    fn render_line_stats(&self, frame: &mut Frame, area: Rect) {
        let name_width = self
            .game
            .lines()
            .iter()
            .map(|line| line.name().chars().count())
            .max()
            .unwrap_or(0);

        let mut items: Vec<ListItem> = self
            .game
            .all_line_stats()
            .into_iter()
            .zip(self.game.lines())
            .map(|(progress, line)| {
                let color = self.theme.line_color(line.color());
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:<name_width$}  ", progress.line_name),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(progress_bar(&progress.stats), Style::default().fg(color)),
                    Span::raw(format!(
                        " {}/{}",
                        progress.stats.completed_guesses, progress.stats.total_stations
                    )),
                ]))
            })
            .collect();

        let total = self.game.progress();
        items.push(ListItem::new(Line::from("")));
        items.push(ListItem::new(Line::from(Span::styled(
            format!(
                "{:<name_width$}  {} {}/{}",
                "Total",
                progress_bar(&total),
                total.completed_guesses,
                total.total_stations
            ),
            Style::default().add_modifier(Modifier::BOLD),
        ))));

        let block = Block::default().borders(Borders::ALL).title("Lines");
        frame.render_widget(List::new(items).block(block), area);
    }

    fn render_recent(&self, frame: &mut Frame, area: Rect) {
        let guesses = self.game.completed_guesses();
        let mut lines: Vec<Line> = guesses
            .iter()
            .rev()
            .take(self.config.recent_guesses)
            .map(|station| Line::from(station.as_str()))
            .collect();

        if let Some(station) = self.last_found.as_deref() {
            if let Some(position) = self.game.station_coordinates(station) {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("{station}: {:.4}, {:.4}", position.lat, position.lon),
                    Style::default().fg(self.theme.muted),
                )));
            }
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Recent"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let help = match self.screen {
            Screen::Setup => "↑/↓ move  Space toggle  r rescan  Enter start  Esc quit",
            Screen::Loading => "Esc quit",
            Screen::Play => "Enter guess  Ctrl-R reset  Ctrl-N new game  Esc quit",
        };
        let paragraph = Paragraph::new(Line::from(vec![
            Span::raw(self.status.as_str()),
            Span::styled(format!("  ·  {help}"), Style::default().fg(self.theme.muted)),
        ]))
        .block(Block::default().borders(Borders::ALL).title("Status"));
        frame.render_widget(paragraph, area);
    }

    fn render_confirm(&self, frame: &mut Frame) {
        let frame_area = frame.size();
        let width = cmp::min(56_u16, frame_area.width.saturating_sub(4));
        let height = 5_u16.min(frame_area.height);
        let x = frame_area.x + (frame_area.width.saturating_sub(width)) / 2;
        let y = frame_area.y + (frame_area.height.saturating_sub(height)) / 2;
        let area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, area);
        let paragraph = Paragraph::new(vec![
            Line::from("Start over? This clears every station found so far."),
            Line::from(vec![
                Span::styled("y", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" reset  "),
                Span::styled("any other key", Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" cancel"),
            ]),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.danger))
                .title("Reset"),
        )
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn progress_bar(stats: &LineStats) -> String {
    let filled = (stats.ratio() * PROGRESS_BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(PROGRESS_BAR_WIDTH);
    format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(PROGRESS_BAR_WIDTH - filled)
    )
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::Path};
    use tempfile::tempdir;
    use transit_memory_core::loader::line_path;

    fn test_app(root: &Path) -> App {
        let config = AppConfig {
            data_root: root.join("geojson"),
            save_path: root.join("progress.json"),
            recent_guesses: 10,
        };
        let loader = LineLoader::new(config.data_root.clone());
        let save_manager = SaveManager::new(config.save_path.clone());
        let mut app = App::new(config, loader, save_manager);
        app.has_seen_intro = true;
        app
    }

    fn green_line() -> transit_memory_core::Line {
        let spec = catalog::resolve(&["tunnelbanan"]).remove(1);
        transit_memory_core::Line::builder(spec)
            .stations(["Alvik", "Odenplan", "T-Centralen"])
            .build()
    }

    fn playing_app(root: &Path) -> App {
        let mut app = test_app(root);
        app.selected_lines = vec![catalog::METRO_KEY.to_string()];
        app.handle_lines_loaded(Ok(vec![green_line()]), None);
        app
    }

    fn stored(app: &App) -> SavedGame {
        app.save_manager
            .load()
            .expect("save is readable")
            .expect("save exists")
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn write_tvarbanan(data_root: &Path) -> anyhow::Result<()> {
        let spec = catalog::resolve(&["tvarbanan"]).remove(0);
        let path = line_path(data_root, &spec);
        fs::create_dir_all(path.parent().expect("line path has a parent"))?;
        fs::write(
            path,
            r#"{ "type": "FeatureCollection", "features": [
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [17.96, 59.34] }, "properties": { "name": "Alvik" } },
                { "type": "Feature", "geometry": { "type": "Point", "coordinates": [18.00, 59.31] }, "properties": { "name": "Liljeholmen" } }
            ] }"#,
        )?;
        Ok(())
    }

    #[test]
    fn loaded_lines_filter_restored_guesses_and_are_saved() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let mut app = test_app(temp.path());
        app.selected_lines = vec![catalog::METRO_KEY.to_string()];

        app.handle_lines_loaded(
            Ok(vec![green_line()]),
            Some(vec!["Alvik".to_string(), "Slussen".to_string()]),
        );

        assert_eq!(app.screen, Screen::Play);
        assert_eq!(app.game.completed_guesses(), vec!["Alvik"]);
        let saved = stored(&app);
        assert!(saved.started);
        assert_eq!(saved.selected_lines, vec![catalog::METRO_KEY]);
        assert_eq!(saved.completed_guesses, vec!["Alvik"]);
        Ok(())
    }

    #[test]
    fn successful_guess_is_saved() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let mut app = playing_app(temp.path());

        app.input = "odenplan".to_string();
        app.submit_guess();

        assert!(app.input.is_empty());
        assert_eq!(
            app.feedback.as_ref().map(|feedback| feedback.result),
            Some(GuessResult::Success)
        );
        assert_eq!(stored(&app).completed_guesses, vec!["Odenplan"]);

        app.input = "Slussen".to_string();
        app.submit_guess();
        assert_eq!(app.input, "Slussen");
        assert_eq!(stored(&app).completed_guesses, vec!["Odenplan"]);
        Ok(())
    }

    #[test]
    fn confirmed_reset_clears_saved_guesses() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let mut app = playing_app(temp.path());
        app.input = "Alvik".to_string();
        app.submit_guess();

        app.handle_key(KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL));
        assert!(app.confirm_reset);
        app.handle_key(key(KeyCode::Char('y')));

        assert!(!app.confirm_reset);
        let saved = stored(&app);
        assert!(saved.started);
        assert!(saved.completed_guesses.is_empty());
        assert_eq!(app.game.lines().len(), 1);
        Ok(())
    }

    #[test]
    fn cancelled_reset_keeps_guesses() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let mut app = playing_app(temp.path());
        app.input = "Alvik".to_string();
        app.submit_guess();

        app.confirm_reset = true;
        app.handle_key(key(KeyCode::Char('n')));

        assert_eq!(stored(&app).completed_guesses, vec!["Alvik"]);
        assert_eq!(app.game.completed_guesses(), vec!["Alvik"]);
        Ok(())
    }

    #[test]
    fn new_game_saves_an_unstarted_game() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let mut app = playing_app(temp.path());
        app.input = "Alvik".to_string();
        app.submit_guess();

        app.abandon_game();

        assert_eq!(app.screen, Screen::Setup);
        let saved = stored(&app);
        assert!(!saved.started);
        assert!(saved.has_seen_intro);
        assert!(saved.selected_lines.is_empty());
        assert!(saved.completed_guesses.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn saved_game_is_resumed_on_launch() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let mut app = test_app(temp.path());
        write_tvarbanan(&app.config.data_root)?;
        app.save_manager.store(&SavedGame {
            started: true,
            selected_lines: vec!["tvarbanan".to_string()],
            completed_guesses: vec!["Liljeholmen".to_string(), "Slussen".to_string()],
            has_seen_intro: true,
            ..SavedGame::default()
        })?;

        let (event_tx, mut event_rx) = mpsc::channel(4);
        app.event_tx = Some(event_tx);
        app.has_seen_intro = false;
        app.restore_saved_game();
        assert_eq!(app.screen, Screen::Loading);
        assert!(app.has_seen_intro);

        let event = event_rx.recv().await.expect("lines are loaded");
        app.process_app_event(event);

        assert_eq!(app.screen, Screen::Play);
        assert_eq!(app.game.completed_guesses(), vec!["Liljeholmen"]);
        assert_eq!(stored(&app).completed_guesses, vec!["Liljeholmen"]);
        Ok(())
    }

    #[test]
    fn unstarted_save_stays_on_setup() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let mut app = test_app(temp.path());
        app.save_manager.store(&SavedGame {
            has_seen_intro: true,
            ..SavedGame::default()
        })?;
        let (event_tx, _event_rx) = mpsc::channel(4);
        app.event_tx = Some(event_tx);

        app.restore_saved_game();

        assert_eq!(app.screen, Screen::Setup);
        assert!(app.game.lines().is_empty());
        Ok(())
    }

    #[test]
    fn unreadable_save_is_discarded() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let mut app = test_app(temp.path());
        fs::write(&app.config.save_path, "{ not json")?;

        app.restore_saved_game();

        assert_eq!(app.screen, Screen::Setup);
        assert!(app.status.starts_with("Could not read save"));
        assert!(app.save_manager.load()?.is_none());
        Ok(())
    }

    #[test]
    fn feedback_expires_with_wall_clock_time() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let mut app = playing_app(temp.path());
        app.input = "Slussen".to_string();
        app.submit_guess();
        let shown_at = Instant::now();

        app.expire_feedback(shown_at);
        assert!(app.feedback.is_some());

        app.expire_feedback(shown_at + FEEDBACK_DURATION);
        assert!(app.feedback.is_none());

        // Typing keeps producing input events; they expire feedback too.
        app.input = "Slussen".to_string();
        app.submit_guess();
        if let Some(feedback) = app.feedback.as_mut() {
            feedback.expires_at = Instant::now();
        }
        app.process_app_event(AppEvent::Input(Event::Key(key(KeyCode::Char('a')))));
        assert!(app.feedback.is_none());
        assert_eq!(app.input, "Slussena");
        Ok(())
    }

    #[test]
    fn rescan_picks_up_new_line_data() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let mut app = test_app(temp.path());
        let tvarbanan = catalog::CATALOG
            .iter()
            .position(|entry| entry.key == "tvarbanan")
            .expect("tvarbanan is listed");
        assert!(!app.setup.available[tvarbanan]);

        write_tvarbanan(&app.config.data_root)?;
        app.handle_key(key(KeyCode::Char('r')));

        assert!(app.setup.available[tvarbanan]);
        assert_eq!(app.setup.available.iter().filter(|found| **found).count(), 1);
        Ok(())
    }

    #[test]
    fn progress_bar_scales_with_ratio() {
        let half = LineStats {
            completed_guesses: 2,
            total_stations: 4,
        };
        assert_eq!(progress_bar(&half), format!("{}{}", "█".repeat(6), "░".repeat(6)));

        let empty_line = LineStats::default();
        assert_eq!(progress_bar(&empty_line), "█".repeat(PROGRESS_BAR_WIDTH));
    }

    #[test]
    fn setup_only_toggles_available_entries() {
        let available: Vec<&'static CatalogEntry> = catalog::CATALOG.iter().skip(1).collect();
        let mut setup = SetupState::new(&available);

        assert!(!setup.toggle());
        assert!(setup.selection().is_empty());

        setup.move_cursor(1);
        assert!(setup.toggle());
        assert_eq!(setup.selection(), vec![catalog::CATALOG[1].key.to_string()]);

        setup.move_cursor(-2);
        assert_eq!(setup.cursor, catalog::CATALOG.len() - 1);
    }
}
