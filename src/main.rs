mod app;
mod audio;
mod config;
mod engine;
mod event;
mod session;
mod store;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use app::{App, AppScreen, ConfirmAction, EditMode};
use audio::{CommandSpeaker, SilentSpeaker, Speaker};
use config::Config;
use event::{AppEvent, EventHandler};
use session::deck::{SentenceDeck, SentenceSource, read_batch};
use store::json_store::JsonStore;
use store::schema::DeckData;
use ui::components::confetti_layer::ConfettiLayer;
use ui::components::dictation_area::DictationArea;
use ui::components::progress_bar::ProgressBar;
use ui::components::sentence_list::SentenceList;
use ui::layout::{AppLayout, centered_rect, pack_hint_lines, wrapped_line_count};
use ui::line_input::{InputResult, LineInput};
use ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "dictr",
    version,
    about = "Terminal dictation trainer: listen, then fill in the blanks"
)]
struct Cli {
    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(short, long, help = "Disable speech and keypress sounds")]
    mute: bool,

    #[arg(
        short,
        long,
        value_name = "JSON|PATH",
        help = "Append sentences from a JSON array of strings (inline or file) before starting"
    )]
    import: Option<String>,

    #[arg(short, long, help = "Print the sentence list and exit")]
    list: bool,

    #[arg(long, value_name = "PATH", help = "Write a backup of the sentence list and exit")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Replace the sentence list with a backup and exit")]
    restore: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();
    tracing::info!("starting dictr v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "config unreadable, using defaults");
        Config::default()
    });
    if !Config::config_path().exists() {
        // Leave an editable file with every setting spelled out
        if let Err(err) = config.save() {
            tracing::warn!(error = %err, "could not write default config");
        }
    }
    let themes = Theme::available_themes();
    if let Some(name) = cli.theme {
        config.theme = name;
    }
    config.validate(&themes);

    let store = match JsonStore::new() {
        Ok(store) => Some(store),
        Err(err) => {
            tracing::warn!(error = %err, "data directory unavailable, changes will not be saved");
            None
        }
    };

    if let Some(path) = cli.restore {
        let store = store.context("no data directory to restore into")?;
        let data = store
            .import_deck(&path)
            .with_context(|| format!("restoring {}", path.display()))?;
        println!("Restored {} sentences from {}", data.sentences.len(), path.display());
        return Ok(());
    }

    let mut deck = SentenceDeck::from_data(load_deck_data(store.as_ref()));

    if let Some(path) = cli.export {
        let store = store.context("no data directory to export from")?;
        store.export_deck(&deck.to_data(), &path)?;
        println!("Exported {} sentences to {}", deck.len(), path.display());
        return Ok(());
    }

    let mut status = None;
    if let Some(input) = cli.import {
        let batch = read_batch(&input)?;
        let count = deck.import(batch);
        if let Some(ref store) = store {
            store.save_deck(&deck.to_data())?;
        }
        tracing::info!(count, "sentences imported from command line");
        status = Some(format!("Imported {count} sentences"));
    }

    if cli.list {
        for (i, sentence) in deck.sentences().iter().enumerate() {
            let star = if deck.is_favorite(sentence) { '*' } else { ' ' };
            println!("{star}{:>3}. {sentence}", i + 1);
        }
        return Ok(());
    }

    let theme: &'static Theme =
        Box::leak(Box::new(Theme::load(&config.theme).unwrap_or_default()));
    let speaker: Box<dyn Speaker> = if cli.mute || !config.speech_enabled {
        Box::new(SilentSpeaker::default())
    } else {
        Box::new(CommandSpeaker::from_config(&config))
    };

    let mut app = App::new(config, theme, deck, store, speaker);
    app.status = status;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(250));
    app.attach_events(events.sender());
    let size = terminal.size()?;
    app.resize(size.width);
    app.load_sentence();

    let result = run_app(&mut terminal, &mut app, &events);
    app.quit();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = ?err, "exiting after error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file under the data directory; stdout belongs to the terminal UI.
fn init_logging() {
    let dir = JsonStore::default_dir();
    let file = fs::create_dir_all(&dir).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("dictr.log"))
    });
    let Ok(file) = file else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}

fn load_deck_data(store: Option<&JsonStore>) -> DeckData {
    let Some(store) = store else {
        return DeckData::default();
    };
    match store.load_deck() {
        Some(data) => data,
        None => {
            tracing::warn!(
                dir = %store.base_dir().display(),
                "saved sentences unreadable or outdated, starting from the defaults"
            );
            DeckData::default()
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => {}
            AppEvent::Resize(w, _) => app.resize(w),
            AppEvent::Frame(id) => app.on_frame(id),
            AppEvent::BurstExpired(id) => app.on_burst_expired(id),
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return;
    }

    match app.screen {
        AppScreen::Practice => handle_practice_key(app, key),
        AppScreen::Sentences => handle_sentences_key(app, key),
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('r') => app.replay(),
            KeyCode::Char('f') => app.toggle_favorite(),
            KeyCode::Char('l') => app.toggle_sidebar(),
            KeyCode::Char('e') => app.go_to_sentences(),
            KeyCode::Char('o') => app.config.show_original = !app.config.show_original,
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Esc => app.quit(),
        KeyCode::Tab => app.skip(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Up if app.show_sidebar => app.sidebar_up(),
        KeyCode::Down if app.show_sidebar => app.sidebar_down(),
        KeyCode::Enter if app.show_sidebar => app.select_sentence(app.sidebar_selected),
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::ALT) => app.type_char(ch),
        _ => {}
    }
}

fn handle_sentences_key(app: &mut App, key: KeyEvent) {
    match app.edit_mode {
        EditMode::Browse => return handle_browse_key(app, key),
        EditMode::Confirm(_) => return handle_confirm_key(app, key),
        _ => {}
    }

    let result = match &mut app.edit_mode {
        EditMode::Adding(input)
        | EditMode::Importing(input)
        | EditMode::Editing { input, .. } => input.handle(key),
        _ => return,
    };

    match result {
        InputResult::Submit => app.submit_edit(),
        InputResult::Cancel => app.cancel_edit(),
        InputResult::Continue => {}
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_edit(),
        _ => {}
    }
}

fn handle_browse_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_practice(),
        KeyCode::Up | KeyCode::Char('k') => app.list_up(),
        KeyCode::Down | KeyCode::Char('j') => app.list_down(),
        KeyCode::Enter | KeyCode::Char('p') => app.practice_selected(),
        KeyCode::Char('a') => app.begin_add(),
        KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Char('i') => app.begin_import(),
        KeyCode::Char('f') => app.toggle_list_favorite(),
        KeyCode::Char('d') | KeyCode::Delete => {
            app.begin_confirm(ConfirmAction::Delete(app.list_selected))
        }
        KeyCode::Char('D') => app.begin_confirm(ConfirmAction::DeleteAll),
        KeyCode::Char('x') => app.begin_confirm(ConfirmAction::DeleteAllExceptFavorites),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Practice => render_practice(frame, app),
        AppScreen::Sentences => render_sentences(frame, app),
    }

    if app.confetti.is_bursting() {
        frame.render_widget(ConfettiLayer::new(app.confetti.pieces()), area);
    }
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let mut hints = vec!["[Ctrl+R] Replay", "[Tab] Skip", "[Ctrl+F] Favorite"];
    if app.show_sidebar {
        hints.push("[↑↓ Enter] Choose");
    }
    hints.extend(["[Ctrl+L] List", "[Ctrl+O] Original", "[Ctrl+E] Edit sentences", "[Esc] Quit"]);
    let hint_lines = pack_hint_lines(&hints, area.width as usize);

    let layout = AppLayout::new(area, app.show_sidebar, hint_lines.len() as u16 + 1);
    render_header(frame, app, layout.header);

    if app.deck.is_empty() {
        let empty = Paragraph::new(vec![
            Line::default(),
            Line::from(Span::styled(
                "No sentences to practice.",
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Press Ctrl+E to add or import some.",
                Style::default().fg(colors.text_pending()),
            )),
        ])
        .alignment(ratatui::layout::Alignment::Center)
        .block(Block::bordered().border_style(Style::default().fg(colors.border())));
        frame.render_widget(empty, layout.main);
    } else {
        let original_height = if app.config.show_original {
            let width = layout.main.width.saturating_sub(2) as usize;
            wrapped_line_count(app.dictation.sentence(), width) as u16 + 2
        } else {
            0
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(4),
                Constraint::Length(3),
                Constraint::Length(original_height),
            ])
            .split(layout.main);

        frame.render_widget(DictationArea::new(&app.dictation, app.theme), rows[0]);

        let filled = app.dictation.filled_ratio();
        let typed = ProgressBar::new("Typed", filled, format!("{:.0}%", filled * 100.0), app.theme);
        frame.render_widget(typed, rows[1]);

        if app.config.show_original {
            let original = Paragraph::new(app.dictation.sentence())
                .style(Style::default().fg(colors.fg()))
                .wrap(Wrap { trim: false })
                .block(
                    Block::bordered()
                        .title(" Original sentence ")
                        .border_style(Style::default().fg(colors.border())),
                );
            frame.render_widget(original, rows[2]);
        }
    }

    if let Some(sidebar) = layout.sidebar {
        let list = SentenceList::new(&app.deck, app.sidebar_selected, app.theme);
        frame.render_widget(list, sidebar);
    }

    render_footer(frame, app, &hint_lines, layout.footer);
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;

    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(10), Constraint::Length(28)])
        .split(area);

    let mut spans = vec![Span::styled(
        " dictr ",
        Style::default()
            .fg(colors.header_fg())
            .bg(colors.header_bg())
            .add_modifier(Modifier::BOLD),
    )];
    if app.deck.current_is_favorite() {
        spans.push(Span::styled(" ★ favorite", Style::default().fg(colors.favorite())));
    }
    if app.completed_count > 0 {
        spans.push(Span::styled(
            format!("  completed: {}", app.completed_count),
            Style::default().fg(colors.success()),
        ));
    }

    let title = Paragraph::new(vec![Line::default(), Line::from(spans)]);
    frame.render_widget(title, parts[0]);

    let progress = ProgressBar::new(
        "Progress",
        app.deck.progress(),
        app.deck.progress_text(),
        app.theme,
    );
    frame.render_widget(progress, parts[1]);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, hint_lines: &[String], area: Rect) {
    let colors = &app.theme.colors;
    let mut lines: Vec<Line> = Vec::new();

    match &app.status {
        Some(status) => lines.push(Line::from(Span::styled(
            format!(" {status}"),
            Style::default().fg(colors.accent()),
        ))),
        None => lines.push(Line::default()),
    }
    lines.extend(hint_lines.iter().map(|hint| {
        Line::from(Span::styled(hint.clone(), Style::default().fg(colors.text_pending())))
    }));

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_sentences(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let hints = [
        "[↑↓] Move",
        "[Enter] Practice",
        "[a] Add",
        "[e] Edit",
        "[f] Favorite",
        "[d] Delete",
        "[x] Keep favorites only",
        "[D] Delete all",
        "[i] Import JSON",
        "[Esc] Back",
    ];
    let hint_lines = pack_hint_lines(&hints, area.width as usize);
    let layout = AppLayout::new(area, false, hint_lines.len() as u16 + 1);

    let header = Paragraph::new(vec![
        Line::default(),
        Line::from(vec![
            Span::styled(
                " Sentences ",
                Style::default()
                    .fg(colors.header_fg())
                    .bg(colors.header_bg())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  {} total, {} favorites",
                    app.deck.len(),
                    app.deck.favorites().len()
                ),
                Style::default().fg(colors.text_pending()),
            ),
        ]),
    ]);
    frame.render_widget(header, layout.header);

    let browsing = matches!(app.edit_mode, EditMode::Browse);
    let list = SentenceList::new(&app.deck, app.list_selected, app.theme)
        .title(" All sentences ")
        .focused(browsing);
    frame.render_widget(list, layout.main);

    render_footer(frame, app, &hint_lines, layout.footer);

    match &app.edit_mode {
        EditMode::Browse => {}
        EditMode::Confirm(action) => render_confirm(frame, app, *action),
        EditMode::Adding(input) => render_line_prompt(frame, app, " Add sentence ", input),
        EditMode::Editing { index, input } => {
            let title = format!(" Edit sentence {} ", index + 1);
            render_line_prompt(frame, app, &title, input);
        }
        EditMode::Importing(input) => {
            render_line_prompt(frame, app, " Import: JSON array or file path ", input)
        }
    }
}

fn render_confirm(frame: &mut ratatui::Frame, app: &App, action: ConfirmAction) {
    let colors = &app.theme.colors;
    let popup = centered_rect(50, 20, frame.area());
    frame.render_widget(Clear, popup);

    let block = Block::bordered()
        .title(" Confirm ")
        .border_style(Style::default().fg(colors.error()))
        .style(Style::default().bg(colors.bg()));
    let text = Paragraph::new(vec![
        Line::default(),
        Line::from(Span::styled(action.prompt(), Style::default().fg(colors.fg()))),
    ])
    .alignment(ratatui::layout::Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(block);
    frame.render_widget(text, popup);
}

fn render_line_prompt(frame: &mut ratatui::Frame, app: &App, title: &str, input: &LineInput) {
    let colors = &app.theme.colors;
    let popup = centered_rect(70, 20, frame.area());
    frame.render_widget(Clear, popup);

    let block = Block::bordered()
        .title(title.to_string())
        .border_style(Style::default().fg(colors.border_focused()))
        .style(Style::default().bg(colors.bg()));
    let inner = block.inner(popup);
    block.render(popup, frame.buffer_mut());

    let (before, at, after) = input.render_parts();
    let cursor_style = Style::default()
        .fg(colors.text_cursor_fg())
        .bg(colors.text_cursor_bg());
    let line = Line::from(vec![
        Span::styled(before, Style::default().fg(colors.fg())),
        Span::styled(at.map(String::from).unwrap_or_else(|| " ".to_string()), cursor_style),
        Span::styled(after, Style::default().fg(colors.fg())),
    ]);
    let help = Line::from(Span::styled(
        "[Enter] Save  [Esc] Cancel",
        Style::default().fg(colors.text_pending()),
    ));

    Paragraph::new(vec![Line::default(), line, Line::default(), help])
        .wrap(Wrap { trim: false })
        .render(inner, frame.buffer_mut());
}
