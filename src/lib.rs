pub mod board;
pub mod clock;
pub mod config;
pub mod game;
pub mod piece;
