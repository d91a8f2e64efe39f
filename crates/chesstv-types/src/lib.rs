//! Shared domain types for the Chess TV project.

pub mod config;
pub mod events;
pub mod game;
pub mod result;
pub mod ui;

mod errors;

pub use errors::{ChessTvError, Result};
