//! Picking one game to watch out of a TV batch.

use chesstv_types::{game::is_terminated_status, ChessTvError, Result};
use tracing::debug;

use crate::{
    convert::LichessGame,
    pgn::{parse_clock, parse_pgn},
};

/// Games with increment, or where either side started below the full clock
/// (berserk), cannot be replayed against the declared total time.
pub fn is_valid_game(game: &LichessGame) -> bool {
    if game.clock.increment != 0 {
        return false;
    }
    let Ok(record) = parse_pgn(&game.pgn) else {
        return false;
    };
    let opening_clocks: Vec<Option<u32>> = record
        .plies
        .iter()
        .take(2)
        .map(|ply| ply.comment.as_deref().and_then(|c| parse_clock(c).ok()))
        .collect();
    let total = game.clock.total_time;
    matches!(opening_clocks.as_slice(), [Some(white), Some(black)] if *white == total && *black == total)
}

/// Share of both clocks already consumed, from the last two clock comments.
pub fn time_used_percent(game: &LichessGame) -> Result<u32> {
    let record = parse_pgn(&game.pgn)?;
    let comments: Vec<&str> = record.comments().collect();
    let total = game.clock.total_time;
    let used = |comment: Option<&&str>| -> Result<u32> {
        match comment {
            Some(comment) => Ok(total.saturating_sub(parse_clock(comment)?)),
            None => Ok(0),
        }
    };
    let last = used(comments.last())?;
    let second_to_last = used(comments.len().checked_sub(2).and_then(|i| comments.get(i)))?;
    if total == 0 {
        return Ok(0);
    }
    Ok((u64::from(last + second_to_last) * 100 / (u64::from(total) * 2)) as u32)
}

/// Prefer a game that has already ended, otherwise the one furthest into its clocks.
pub fn choose_game(games: Vec<LichessGame>) -> Result<LichessGame> {
    let mut chosen: Option<LichessGame> = None;
    for candidate in games {
        chosen = Some(match chosen {
            None => candidate,
            Some(current) if is_terminated_status(&current.status) => current,
            Some(_) if is_terminated_status(&candidate.status) => candidate,
            Some(current) => {
                let candidate_used = time_used_percent(&candidate)?;
                let current_used = time_used_percent(&current)?;
                debug!(
                    "Comparing {} ({}%) with {} ({}%)",
                    candidate.id, candidate_used, current.id, current_used
                );
                if candidate_used > current_used {
                    candidate
                } else {
                    current
                }
            }
        });
    }
    chosen.ok_or_else(|| {
        ChessTvError::Selection("can't find a game that fits the selection criteria".into())
    })
}
