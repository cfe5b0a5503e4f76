use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::board::{Board, Cell, Row};
use crate::clock::GameClock;
use crate::config::{Difficulty, LEVEL_SPEEDUP, LINES_PER_LEVEL, LINE_REWARDS};
use crate::piece::{Piece, PieceProvider, RandomPieceProvider};

// ============================================================================
// Types
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameState {
    Ready,
    Running,
    GameOver,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameEvent {
    GameStarted(Difficulty),
    PieceLocked,
    LinesCleared(u32),
    LevelUp(u32),
    GrayRowAdded,
    PieceHeld,
    GameOver,
}

/// Discrete inputs produced by the input layer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    Hold,
    Start(Difficulty),
}

/// Wall kick offsets tried in order when rotating: in place, left, right, up.
const ROTATION_KICKS: [(i16, i16); 4] = [(0, 0), (-1, 0), (1, 0), (0, -1)];

// ============================================================================
// Scoring & Progression
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct Scoring {
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub drop_interval: Duration,
    difficulty: Difficulty,
}

impl Scoring {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            score: 0,
            lines: 0,
            level: 1,
            drop_interval: difficulty.initial_drop_interval(),
            difficulty,
        }
    }

    /// Credits one lock's worth of cleared lines. Returns the new level when
    /// this clear levels up; at most one level is gained per call.
    pub fn on_lines_cleared(&mut self, lines: u32) -> Option<u32> {
        if lines == 0 {
            return None;
        }
        let reward_index = (lines as usize).min(LINE_REWARDS.len() - 1);
        self.score += LINE_REWARDS[reward_index];
        self.lines += lines;

        if self.difficulty.has_progression() && self.lines >= self.level * LINES_PER_LEVEL {
            self.level += 1;
            self.drop_interval = self.drop_interval.mul_f64(LEVEL_SPEEDUP);
            return Some(self.level);
        }
        None
    }
}

// ============================================================================
// Game
// ============================================================================

pub struct Game {
    board: Board,
    current: Option<Piece>,
    next: Option<Piece>,
    held: Option<Piece>,
    can_hold: bool,
    scoring: Scoring,
    state: GameState,
    difficulty: Difficulty,
    clock: GameClock,
    piece_provider: Box<dyn PieceProvider>,
    hole_rng: StdRng,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new() -> Self {
        Self::with_provider(Box::new(RandomPieceProvider::new()))
    }

    /// Deterministic pieces and gray-row holes.
    pub fn seeded(seed: u64) -> Self {
        let mut game = Self::with_provider(Box::new(RandomPieceProvider::seeded(seed)));
        game.hole_rng = StdRng::seed_from_u64(seed.wrapping_add(1));
        game
    }

    pub fn with_provider(provider: Box<dyn PieceProvider>) -> Self {
        Self {
            board: Board::new(),
            current: None,
            next: None,
            held: None,
            can_hold: true,
            scoring: Scoring::new(Difficulty::default()),
            state: GameState::Ready,
            difficulty: Difficulty::default(),
            clock: GameClock::new(),
            piece_provider: provider,
            hole_rng: StdRng::from_entropy(),
            events: Vec::new(),
        }
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Resets everything and enters `Running` with timers armed at `now`.
    /// Valid from any state, so it doubles as restart.
    pub fn start(&mut self, difficulty: Difficulty, now: Duration) {
        self.board = Board::new();
        self.held = None;
        self.can_hold = true;
        self.difficulty = difficulty;
        self.scoring = Scoring::new(difficulty);
        self.events.clear();
        self.state = GameState::Running;
        self.clock
            .start(now, self.scoring.drop_interval, difficulty.gray_row_period());
        self.events.push(GameEvent::GameStarted(difficulty));

        self.next = Some(self.piece_provider.next_piece());
        self.spawn_next_piece();
    }

    /// Tears down both timers and returns to `Ready`.
    pub fn dispose(&mut self) {
        self.clock.stop();
        self.state = GameState::Ready;
    }

    /// Advances the timers to `now` and applies whatever fired.
    pub fn tick(&mut self, now: Duration) {
        if self.state != GameState::Running {
            return;
        }

        let fired = self.clock.poll(now);
        if fired.drop {
            self.soft_drop();
        }
        for _ in 0..fired.gray_rows {
            if self.state != GameState::Running {
                break;
            }
            self.board.inject_gray_row(&mut self.hole_rng);
            self.events.push(GameEvent::GrayRowAdded);
        }
    }

    pub fn apply(&mut self, command: Command, now: Duration) {
        if let Command::Start(difficulty) = command {
            self.start(difficulty, now);
            return;
        }
        if self.state != GameState::Running {
            return;
        }
        match command {
            Command::MoveLeft => {
                self.move_piece(-1);
            }
            Command::MoveRight => {
                self.move_piece(1);
            }
            Command::SoftDrop => {
                self.soft_drop();
            }
            Command::Rotate => {
                self.rotate_piece();
            }
            Command::HardDrop => self.hard_drop(),
            Command::Hold => {
                self.hold_piece();
            }
            Command::Start(_) => {}
        }
    }

    // ------------------------------------------------------------------------
    // Piece Controller
    // ------------------------------------------------------------------------

    /// Shifts the falling piece one column. Returns false if blocked.
    pub fn move_piece(&mut self, dir: i16) -> bool {
        let Some(piece) = self.active_piece() else {
            return false;
        };
        if self.board.collides_at(&piece, dir, 0) {
            return false;
        }
        self.current = Some(piece.moved(dir, 0));
        true
    }

    /// Moves the piece down one row, locking it when it can't fall.
    /// Returns true if the piece moved.
    pub fn soft_drop(&mut self) -> bool {
        let Some(piece) = self.active_piece() else {
            return false;
        };
        if self.board.collides_at(&piece, 0, 1) {
            self.lock_and_spawn(piece);
            false
        } else {
            self.current = Some(piece.moved(0, 1));
            true
        }
    }

    pub fn hard_drop(&mut self) {
        let Some(mut piece) = self.active_piece() else {
            return;
        };
        // Overshoot to the first colliding row, then back off one. A piece
        // already buried by a gray row locks one row above where it sits.
        while !self.board.collides(&piece) {
            piece = piece.moved(0, 1);
        }
        self.lock_and_spawn(piece.moved(0, -1));
    }

    /// Rotates clockwise, trying each wall kick in turn. Returns false when
    /// every kick collides.
    pub fn rotate_piece(&mut self) -> bool {
        let Some(piece) = self.active_piece() else {
            return false;
        };
        let rotated = piece.rotated();
        for (dx, dy) in ROTATION_KICKS {
            if !self.board.collides_at(&rotated, dx, dy) {
                self.current = Some(rotated.moved(dx, dy));
                return true;
            }
        }
        false
    }

    /// Stashes the falling piece, or swaps it with the stashed one. Allowed
    /// once per spawned piece. Returns false when it was not allowed.
    pub fn hold_piece(&mut self) -> bool {
        if !self.can_hold {
            return false;
        }
        let Some(mut piece) = self.active_piece() else {
            return false;
        };

        match self.held.as_mut() {
            None => {
                self.held = Some(piece);
                self.spawn_next_piece();
            }
            Some(held) => {
                std::mem::swap(held, &mut piece);
                self.current = Some(piece.respawned());
            }
        }
        self.can_hold = false;
        self.events.push(GameEvent::PieceHeld);
        true
    }

    fn active_piece(&self) -> Option<Piece> {
        if self.state != GameState::Running {
            return None;
        }
        self.current
    }

    fn lock_and_spawn(&mut self, piece: Piece) {
        self.board.merge(&piece);
        self.events.push(GameEvent::PieceLocked);

        let lines = self.board.clear_full_rows();
        if lines > 0 {
            self.events.push(GameEvent::LinesCleared(lines));
            if let Some(level) = self.scoring.on_lines_cleared(lines) {
                self.clock.set_drop_interval(self.scoring.drop_interval);
                self.events.push(GameEvent::LevelUp(level));
            }
        }

        self.spawn_next_piece();
    }

    fn spawn_next_piece(&mut self) {
        let piece = match self.next.take() {
            Some(piece) => piece,
            None => self.piece_provider.next_piece(),
        };
        self.next = Some(self.piece_provider.next_piece());
        self.current = Some(piece);
        self.can_hold = true;

        if self.board.collides(&piece) {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.state = GameState::GameOver;
        self.clock.stop();
        self.events.push(GameEvent::GameOver);
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for setting up positions.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn current(&self) -> Option<Piece> {
        self.current
    }

    pub fn next(&self) -> Option<Piece> {
        self.next
    }

    pub fn held(&self) -> Option<Piece> {
        self.held
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_game_over(&self) -> bool {
        self.state == GameState::GameOver
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn can_hold(&self) -> bool {
        self.can_hold
    }

    pub fn score(&self) -> u32 {
        self.scoring.score
    }

    pub fn lines_cleared(&self) -> u32 {
        self.scoring.lines
    }

    pub fn level(&self) -> u32 {
        self.scoring.level
    }

    pub fn drop_interval(&self) -> Duration {
        self.scoring.drop_interval
    }

    pub fn timers_running(&self) -> bool {
        self.clock.is_running()
    }

    /// The board with the falling piece drawn on top of it.
    pub fn render_grid(&self) -> Vec<Row> {
        let mut visual_grid = self.board.rows().to_vec();

        if let Some(piece) = self.current {
            for block in piece.blocks() {
                if block.x < 0 || block.y < 0 {
                    continue;
                }
                if let Some(cell) = visual_grid
                    .get_mut(block.y as usize)
                    .and_then(|row| row.get_mut(block.x as usize))
                {
                    *cell = Cell::Filled(piece.kind);
                }
            }
        }

        visual_grid
    }

    /// Takes and clears all pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

pub mod test_helpers {
    use super::*;
    use crate::board::BOARD_WIDTH;
    use crate::piece::{PieceKind, SequencePieceProvider};

    /// A game already running at time zero, fed `kinds` in order.
    pub fn running_game(kinds: Vec<PieceKind>, difficulty: Difficulty) -> Game {
        let mut game = Game::with_provider(Box::new(SequencePieceProvider::new(kinds)));
        game.start(difficulty, Duration::ZERO);
        game.take_events();
        game
    }

    /// Replaces the falling piece, e.g. to set up a rotation against walls.
    pub fn place_current(game: &mut Game, piece: Piece) {
        game.current = Some(piece);
    }

    pub fn fill_row(board: &mut Board, y: usize) {
        for x in 0..BOARD_WIDTH {
            board.set(x, y, Cell::Filled(PieceKind::T));
        }
    }

    pub fn fill_row_with_gap(board: &mut Board, y: usize, gap_x: usize) {
        for x in 0..BOARD_WIDTH {
            if x != gap_x {
                board.set(x, y, Cell::Filled(PieceKind::T));
            }
        }
    }
}
