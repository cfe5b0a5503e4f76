use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;

// ============================================================================
// Configuration
// ============================================================================

pub const SPAWN_X: i16 = 3;
pub const SPAWN_Y: i16 = 0;

// Timing (in milliseconds)
const EASY_DROP_MS: u64 = 1000;
const NORMAL_DROP_MS: u64 = 700;
const HARD_DROP_MS: u64 = 500;
pub const GRAY_ROW_PERIOD_MS: u64 = 30_000;

// Progression (hard difficulty only)
pub const LINES_PER_LEVEL: u32 = 20;
pub const LEVEL_SPEEDUP: f64 = 0.9;

// Scoring, indexed by lines cleared in one lock
pub const LINE_REWARDS: [u32; 5] = [0, 20, 40, 80, 120];

// ============================================================================
// Difficulty
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Difficulty {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn initial_drop_interval(&self) -> Duration {
        Duration::from_millis(match self {
            Difficulty::Easy => EASY_DROP_MS,
            Difficulty::Normal => NORMAL_DROP_MS,
            Difficulty::Hard => HARD_DROP_MS,
        })
    }

    /// Only hard mode levels up and speeds up as lines are cleared.
    pub fn has_progression(&self) -> bool {
        *self == Difficulty::Hard
    }

    /// Period of the gray row timer, `None` when the difficulty has no gray rows.
    pub fn gray_row_period(&self) -> Option<Duration> {
        match self {
            Difficulty::Hard => Some(Duration::from_millis(GRAY_ROW_PERIOD_MS)),
            Difficulty::Easy | Difficulty::Normal => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
#[error("unknown difficulty {input:?} (expected easy, normal or hard)")]
pub struct ParseDifficultyError {
    input: String,
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError {
                input: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// Command Line
// ============================================================================

/// Terminal falling-block puzzle.
#[derive(Debug, Parser)]
#[command(name = "graytris", version)]
pub struct Args {
    /// Difficulty preselected on the start screen (easy, normal, hard)
    #[arg(short, long, default_value_t = Difficulty::Easy)]
    pub difficulty: Difficulty,

    /// Seed for the piece and gray-row generator
    #[arg(short, long)]
    pub seed: Option<u64>,
}
