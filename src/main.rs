use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use std::{io::stdout, time::Duration};

use graytris::{
    board::{Cell, BOARD_HEIGHT, BOARD_WIDTH},
    clock::{Clock, SystemClock},
    config::{Args, Difficulty},
    game::{Command, Game, GameEvent, GameState},
    piece::{Piece, Rgb, GRAY_COLOR, MAX_SHAPE_SIDE},
};

// ============================================================================
// Visual Constants
// ============================================================================

const CELL_WIDTH: u16 = 2;
const BLOCK_CHAR: &str = "██";
const EMPTY_CHAR: &str = "  ";
const FRAME_BUDGET: Duration = Duration::from_millis(16);

fn rgb(color: Rgb) -> Color {
    Color::Rgb(color.0, color.1, color.2)
}

fn cell_style(cell: Cell) -> Option<Style> {
    match cell {
        Cell::Empty => None,
        Cell::Filled(kind) => Some(Style::default().fg(rgb(kind.color()))),
        Cell::Gray => Some(Style::default().fg(rgb(GRAY_COLOR))),
    }
}

// ============================================================================
// Front End State
// ============================================================================

/// What the UI tracks on top of the session: the menu choice and whether
/// the game-over overlay is up.
struct Ui {
    selected: Difficulty,
    show_game_over: bool,
}

impl Ui {
    fn observe(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::GameOver => self.show_game_over = true,
                GameEvent::GameStarted(_) => self.show_game_over = false,
                _ => {}
            }
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render(frame: &mut Frame, game: &Game, ui: &Ui) {
    let area = frame.size();
    render_game(frame, game, area);

    match game.state() {
        GameState::Ready => render_ready(frame, ui, area),
        GameState::GameOver if ui.show_game_over => render_game_over(frame, game, ui, area),
        _ => {}
    }
}

fn render_game(frame: &mut Frame, game: &Game, area: Rect) {
    let grid_display_width = (BOARD_WIDTH as u16 * CELL_WIDTH) + 2;
    let grid_display_height = BOARD_HEIGHT as u16 + 2;
    let side_width = (MAX_SHAPE_SIDE as u16 * CELL_WIDTH) + 6;
    let total_width = grid_display_width + side_width * 2 + 2;
    let total_height = grid_display_height + 3;

    let main_area = centered_rect(total_width, total_height, area);

    let vertical = Layout::vertical([
        Constraint::Length(grid_display_height),
        Constraint::Fill(1),
    ])
    .split(main_area);
    let game_row = vertical[0];

    // Layout: [Hold][Grid][Next + Info]
    let horizontal = Layout::horizontal([
        Constraint::Length(side_width),
        Constraint::Length(grid_display_width),
        Constraint::Length(side_width),
    ])
    .split(game_row);

    let right = Layout::vertical([Constraint::Length(6), Constraint::Fill(1)]).split(horizontal[2]);

    render_preview(frame, " Hold ", game.held(), horizontal[0]);
    render_grid(frame, game, horizontal[1]);
    render_preview(frame, " Next ", game.next(), right[0]);
    render_info(frame, game, right[1]);

    let controls_area = Rect {
        x: area.x,
        y: game_row.y + game_row.height,
        width: area.width,
        height: 2,
    };

    if controls_area.y + 1 < area.height {
        let controls = Paragraph::new(vec![Line::from(
            "←→: Move | ↓: Drop | ↑: Rotate | Space: Hard drop | C: Hold | Q/ESC: Quit",
        )])
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(controls, controls_area);
    }
}

fn render_grid(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Graytris ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines: Vec<Line> = game
        .render_grid()
        .iter()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|&cell| match cell_style(cell) {
                    Some(style) => Span::styled(BLOCK_CHAR, style),
                    None => Span::raw(EMPTY_CHAR),
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_preview(frame: &mut Frame, title: &str, piece: Option<Piece>, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(piece) = piece else {
        return;
    };

    let style = Style::default().fg(rgb(piece.kind.color()));
    let shape = piece.shape;
    let mut lines: Vec<Line> = Vec::new();

    for r in 0..shape.height() {
        let mut spans: Vec<Span> = vec![Span::raw(" ")];
        for c in 0..shape.width() {
            if shape.is_filled(r, c) {
                spans.push(Span::styled(BLOCK_CHAR, style));
            } else {
                spans.push(Span::raw(EMPTY_CHAR));
            }
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn render_info(frame: &mut Frame, game: &Game, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Info ")
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled("Score", Style::default().fg(Color::Yellow))),
        Line::from(format!("{}", game.score())),
        Line::from(Span::styled("Lines", Style::default().fg(Color::Cyan))),
        Line::from(format!("{}", game.lines_cleared())),
        Line::from(Span::styled("Level", Style::default().fg(Color::Green))),
        Line::from(format!("{}", game.level())),
        Line::from(Span::styled("Mode", Style::default().fg(Color::Magenta))),
        Line::from(game.difficulty().name()),
    ];

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn difficulty_menu(selected: Difficulty) -> Line<'static> {
    let spans: Vec<Span> = Difficulty::ALL
        .iter()
        .enumerate()
        .map(|(i, &difficulty)| {
            let label = format!(" {}:{} ", i + 1, difficulty.name());
            if difficulty == selected {
                Span::styled(label, Style::default().add_modifier(Modifier::REVERSED))
            } else {
                Span::raw(label)
            }
        })
        .collect();
    Line::from(spans)
}

fn render_ready(frame: &mut Frame, ui: &Ui, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GRAYTRIS", Style::default().fg(Color::Cyan))),
        Line::from(""),
        difficulty_menu(ui.selected),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to start",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_popup(frame, " Ready ", text, 30, 9, area);
}

fn render_game_over(frame: &mut Frame, game: &Game, ui: &Ui, area: Rect) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("GAME OVER", Style::default().fg(Color::Red))),
        Line::from(""),
        Line::from(format!("Score: {}", game.score())),
        Line::from(format!("Lines: {}", game.lines_cleared())),
        Line::from(format!("Level: {}", game.level())),
        Line::from(""),
        difficulty_menu(ui.selected),
        Line::from(Span::styled(
            "Enter: restart | ESC: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_popup(frame, " Game Over ", text, 30, 12, area);
}

fn render_popup(frame: &mut Frame, title: &str, text: Vec<Line>, width: u16, height: u16, area: Rect) {
    let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_alignment(Alignment::Center)
            .style(Style::default().bg(Color::Black)),
    );

    let popup_area = centered_rect(width, height, area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let horizontal = Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Length(width.min(area.width)),
        Constraint::Fill(1),
    ])
    .split(area);

    let vertical = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(area.height)),
        Constraint::Fill(1),
    ])
    .split(horizontal[1]);

    vertical[1]
}

// ============================================================================
// Input
// ============================================================================

fn command_for_key(code: KeyCode) -> Option<Command> {
    match code {
        KeyCode::Left => Some(Command::MoveLeft),
        KeyCode::Right => Some(Command::MoveRight),
        KeyCode::Down => Some(Command::SoftDrop),
        KeyCode::Up => Some(Command::Rotate),
        KeyCode::Char(' ') => Some(Command::HardDrop),
        KeyCode::Char('c') | KeyCode::Char('C') => Some(Command::Hold),
        _ => None,
    }
}

// ============================================================================
// Main Loop
// ============================================================================

fn run<B: Backend>(terminal: &mut Terminal<B>, game: &mut Game, ui: &mut Ui) -> anyhow::Result<()> {
    let clock = SystemClock::new();

    loop {
        terminal.draw(|frame| render(frame, game, ui))?;

        if event::poll(FRAME_BUDGET)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => break,
                        KeyCode::Char('1') => ui.selected = Difficulty::Easy,
                        KeyCode::Char('2') => ui.selected = Difficulty::Normal,
                        KeyCode::Char('3') => ui.selected = Difficulty::Hard,
                        // Starting mid-game would throw the current run away
                        KeyCode::Enter if game.state() != GameState::Running => {
                            game.apply(Command::Start(ui.selected), clock.now());
                        }
                        code => {
                            if let Some(command) = command_for_key(code) {
                                game.apply(command, clock.now());
                            }
                        }
                    }
                }
            }
        }

        game.tick(clock.now());
        ui.observe(game.take_events());
    }

    game.dispose();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut game = match args.seed {
        Some(seed) => Game::seeded(seed),
        None => Game::new(),
    };
    let mut ui = Ui {
        selected: args.difficulty,
        show_game_over: false,
    };

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut game, &mut ui);

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}
