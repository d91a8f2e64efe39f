use std::time::Duration;

use anyhow::Result;
use chesstv_types::{
    game::{Colour, LastMove, STARTING_FEN},
    ui::{format_game_result, format_player_name, Player, UiState},
};
use crossterm::{
    event::{self, Event as CEvent, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{info, warn};

use crate::{
    board::{self, Cell, Highlight},
    session::{Launcher, TvSession},
};

const INPUT_POLL: Duration = Duration::from_millis(100);
const SCREEN_WIDTH: u16 = 50;
const PROJECT_URL: &str = "https://github.com/t-r-o";

const LIGHT_SQUARE: Color = Color::Rgb(240, 217, 181);
const DARK_SQUARE: Color = Color::Rgb(181, 136, 99);
const LIGHT_MOVED: Color = Color::Rgb(205, 210, 106);
const DARK_MOVED: Color = Color::Rgb(170, 162, 58);
const CHECKED: Color = Color::Rgb(214, 64, 64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    About,
    Tv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    About,
    WatchTv,
    Github,
}

impl MenuItem {
    pub const ALL: [MenuItem; 3] = [MenuItem::About, MenuItem::WatchTv, MenuItem::Github];

    fn label(self) -> &'static str {
        match self {
            MenuItem::About => "About",
            MenuItem::WatchTv => "Watch TV",
            MenuItem::Github => "Github",
        }
    }
}

/// What the event loop must do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Nothing,
    Quit,
    StartTv,
    StopTv,
    Open(String),
}

/// Screen navigation. Esc leaves the TV or About screen for the menu and
/// quits only from the menu.
pub struct App {
    screen: Screen,
    selected: usize,
    site_url: String,
}

impl App {
    pub fn new(site_url: &str) -> Self {
        Self {
            screen: Screen::Menu,
            selected: 0,
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn game_url(&self, id: &str) -> String {
        format!("{}/{id}", self.site_url)
    }

    pub fn handle_key(&mut self, code: KeyCode, game_id: Option<&str>) -> Command {
        let items = MenuItem::ALL.len();
        match (self.screen, code) {
            (_, KeyCode::Char('q')) | (Screen::Menu, KeyCode::Esc) => Command::Quit,
            (Screen::Tv, KeyCode::Esc) => {
                self.screen = Screen::Menu;
                Command::StopTv
            }
            (Screen::About, KeyCode::Esc) => {
                self.screen = Screen::Menu;
                Command::Nothing
            }
            (Screen::Menu, KeyCode::Up | KeyCode::Char('k')) => {
                self.selected = (self.selected + items - 1) % items;
                Command::Nothing
            }
            (Screen::Menu, KeyCode::Down | KeyCode::Char('j')) => {
                self.selected = (self.selected + 1) % items;
                Command::Nothing
            }
            (Screen::Menu, KeyCode::Enter) => match MenuItem::ALL[self.selected] {
                MenuItem::About => {
                    self.screen = Screen::About;
                    Command::Nothing
                }
                MenuItem::WatchTv => {
                    self.screen = Screen::Tv;
                    Command::StartTv
                }
                MenuItem::Github => Command::Open(PROJECT_URL.to_string()),
            },
            (Screen::Tv, KeyCode::Char('l' | 'L')) => {
                game_id.map_or(Command::Nothing, |id| Command::Open(self.game_url(id)))
            }
            _ => Command::Nothing,
        }
    }
}

pub fn run(launcher: Launcher, site_url: &str, fullscreen: bool) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    if fullscreen {
        execute!(stdout, EnterAlternateScreen)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;
    terminal.clear()?;

    let mut app = App::new(site_url);
    let mut session = None;
    let res = run_loop(&mut terminal, &mut app, &launcher, &mut session);
    if let Some(session) = session.take() {
        session.stop();
    }

    terminal.show_cursor()?;
    disable_raw_mode()?;
    if fullscreen {
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    }
    res
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    launcher: &Launcher,
    session: &mut Option<TvSession>,
) -> Result<()> {
    loop {
        let state = session.as_ref().and_then(TvSession::snapshot);
        let failure = session.as_ref().and_then(TvSession::failure);
        terminal.draw(|f| draw(f, app, state.as_ref(), failure.as_deref()))?;

        if !event::poll(INPUT_POLL)? {
            continue;
        }
        let CEvent::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match app.handle_key(key.code, state.as_ref().map(|state| state.id.as_str())) {
            Command::Nothing => {}
            Command::Quit => {
                info!("Quit requested");
                return Ok(());
            }
            Command::StartTv => {
                if let Some(stale) = session.replace(launcher.start()) {
                    stale.stop();
                }
            }
            Command::StopTv => {
                if let Some(session) = session.take() {
                    session.stop();
                }
            }
            Command::Open(url) => open_in_browser(&url),
        }
    }
}

fn open_in_browser(url: &str) {
    match open::that(url) {
        Ok(()) => info!("Opened {url}"),
        Err(err) => warn!("Could not open {url}: {err}"),
    }
}

fn draw(f: &mut Frame, app: &App, state: Option<&UiState>, failure: Option<&str>) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SCREEN_WIDTH), Constraint::Min(0)])
        .split(f.size());
    let area = columns[0];
    match app.screen() {
        Screen::Menu => draw_menu(f, area, app.selected),
        Screen::About => draw_about(f, area),
        Screen::Tv => draw_tv(f, area, state, failure),
    }
}

fn accent() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

fn draw_menu(f: &mut Frame, area: Rect, selected: usize) {
    let mut lines = vec![
        Line::from(Span::styled("Chess TV", accent())),
        Line::default(),
    ];
    for (index, item) in MenuItem::ALL.iter().enumerate() {
        lines.push(if index == selected {
            Line::from(vec![
                Span::styled("❯ ", Style::default().fg(Color::Magenta)),
                Span::styled(item.label(), accent()),
            ])
        } else {
            Line::from(format!("  {}", item.label()))
        });
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "↑/↓ choose  enter select  esc quit",
        Style::default().fg(Color::DarkGray),
    )));
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        Rect {
            height: area.height.min(10),
            ..area
        },
    );
}

fn draw_about(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "About Chess TV",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from("- Shows high-rated ongoing games from Lichess"),
        Line::from("- Press ESC to go back"),
        Line::from("- Press L to show the current game in Lichess"),
        Line::from("- See Github for more details"),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL)),
        Rect {
            height: area.height.min(8),
            ..area
        },
    );
}

fn draw_tv(f: &mut Frame, area: Rect, state: Option<&UiState>, failure: Option<&str>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(10),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let banner = match (failure, state) {
        (Some(err), _) => format!("Playback stopped: {err}"),
        (None, Some(state)) => state
            .result
            .as_ref()
            .map(format_game_result)
            .unwrap_or_default(),
        (None, None) => "Loading next game...".to_string(),
    };
    match state {
        Some(state) => {
            f.render_widget(player_panel(state, Colour::Black), rows[0]);
            f.render_widget(
                board_widget(&state.fen, state.last_move.as_ref(), state.id.clone()),
                rows[1],
            );
            f.render_widget(player_panel(state, Colour::White), rows[2]);
        }
        None => f.render_widget(board_widget(STARTING_FEN, None, "Chess TV".into()), rows[1]),
    }
    f.render_widget(
        Paragraph::new(Span::styled(
            banner,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL)),
        rows[3],
    );
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("esc", Style::default().fg(Color::Yellow)),
            Span::raw(" menu  "),
            Span::styled("l", Style::default().fg(Color::Yellow)),
            Span::raw(" open on lichess"),
        ])),
        rows[4],
    );
}

fn player_panel(state: &UiState, colour: Colour) -> Paragraph<'static> {
    let player = state.player(colour);
    let to_move = state.result.is_none() && state.mover == colour;
    Paragraph::new(player_line(player, to_move))
        .block(Block::default().borders(Borders::ALL).title(colour.to_string()))
}

fn player_line(player: &Player, to_move: bool) -> Line<'static> {
    let mut spans = vec![Span::raw(if to_move { "▶ " } else { "  " })];
    if let Some(title) = &player.title {
        spans.push(Span::styled(
            format!("{title} "),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::raw(format_player_name(
        &player.name,
        player.title.is_some(),
    )));
    spans.push(Span::styled(
        format!(" ({})", player.rating),
        Style::default().fg(Color::DarkGray),
    ));
    let clock_style = if to_move {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    spans.push(Span::styled(
        format!("  {}", format_clock(player.seconds_remaining)),
        clock_style,
    ));
    Line::from(spans)
}

pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn board_widget(fen: &str, last_move: Option<&LastMove>, title: String) -> Paragraph<'static> {
    let lines = match board::cells(fen, last_move) {
        Ok(rows) => rows
            .iter()
            .map(|row| Line::from(row.iter().map(square_span).collect::<Vec<_>>()))
            .collect(),
        Err(err) => {
            warn!("Cannot draw board: {err}");
            vec![Line::from(err.to_string())]
        }
    };
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title))
}

fn square_span(cell: &Cell) -> Span<'static> {
    let background = match (cell.highlight, cell.light) {
        (Highlight::Check, _) => CHECKED,
        (Highlight::LastMove, true) => LIGHT_MOVED,
        (Highlight::LastMove, false) => DARK_MOVED,
        (Highlight::None, true) => LIGHT_SQUARE,
        (Highlight::None, false) => DARK_SQUARE,
    };
    Span::styled(
        format!(" {} ", cell.glyph),
        Style::default().fg(Color::Black).bg(background),
    )
}
