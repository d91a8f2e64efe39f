//! Board model for the TV screen, derived from a FEN and the last move.

use anyhow::{anyhow, Result};
use chesstv_types::game::LastMove;
use shakmaty::{fen::Fen, CastlingMode, Chess, Color, File, Piece, Position, Rank, Role, Square};

/// Shown on the square a piece just left.
pub const ORIGIN_MARK: char = '·';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Highlight {
    None,
    LastMove,
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub light: bool,
    pub highlight: Highlight,
}

/// Rows from rank 8 down to rank 1, files a to h.
pub fn cells(fen: &str, last_move: Option<&LastMove>) -> Result<Vec<Vec<Cell>>> {
    let position: Chess = fen
        .parse::<Fen>()
        .map_err(|err| anyhow!("invalid FEN {fen:?}: {err}"))?
        .into_position(CastlingMode::Standard)
        .map_err(|err| anyhow!("impossible position {fen:?}: {err}"))?;
    let (from, to) = match last_move {
        Some(last) => (Some(square(&last.from)?), Some(square(&last.to)?)),
        None => (None, None),
    };
    let checked_king = position
        .is_check()
        .then(|| position.board().king_of(position.turn()))
        .flatten();

    let rows = (0..8u32)
        .rev()
        .map(|rank| {
            (0..8u32)
                .map(|file| {
                    let sq = Square::from_coords(File::new(file), Rank::new(rank));
                    let highlight = if Some(sq) == checked_king {
                        Highlight::Check
                    } else if Some(sq) == from || Some(sq) == to {
                        Highlight::LastMove
                    } else {
                        Highlight::None
                    };
                    let glyph = match position.board().piece_at(sq) {
                        Some(piece) => glyph(piece),
                        None if Some(sq) == from => ORIGIN_MARK,
                        None => ' ',
                    };
                    Cell {
                        glyph,
                        light: (rank + file) % 2 == 1,
                        highlight,
                    }
                })
                .collect()
        })
        .collect();
    Ok(rows)
}

fn square(name: &str) -> Result<Square> {
    name.parse::<Square>()
        .map_err(|err| anyhow!("invalid square {name:?}: {err}"))
}

fn glyph(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::King) => '♔',
        (Color::White, Role::Queen) => '♕',
        (Color::White, Role::Rook) => '♖',
        (Color::White, Role::Bishop) => '♗',
        (Color::White, Role::Knight) => '♘',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::King) => '♚',
        (Color::Black, Role::Queen) => '♛',
        (Color::Black, Role::Rook) => '♜',
        (Color::Black, Role::Bishop) => '♝',
        (Color::Black, Role::Knight) => '♞',
        (Color::Black, Role::Pawn) => '♟',
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chesstv_types::game::STARTING_FEN;

    #[test]
    fn starting_position_layout() {
        let rows = cells(STARTING_FEN, None).expect("cells");
        assert_eq!(rows.len(), 8);
        let back_rank: String = rows[0].iter().map(|cell| cell.glyph).collect();
        assert_eq!(back_rank, "♜♞♝♛♚♝♞♜");
        let home_rank: String = rows[7].iter().map(|cell| cell.glyph).collect();
        assert_eq!(home_rank, "♖♘♗♕♔♗♘♖");
        // a1 is dark, h1 is light
        assert!(!rows[7][0].light);
        assert!(rows[7][7].light);
        assert!(rows
            .iter()
            .flatten()
            .all(|cell| cell.highlight == Highlight::None));
    }

    #[test]
    fn last_move_marks_origin_and_destination() {
        let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
        let rows = cells(fen, Some(&LastMove::new("e2", "e4"))).expect("cells");
        let e2 = rows[6][4];
        let e4 = rows[4][4];
        assert_eq!(e2.glyph, ORIGIN_MARK);
        assert_eq!(e2.highlight, Highlight::LastMove);
        assert_eq!(e4.glyph, '♙');
        assert_eq!(e4.highlight, Highlight::LastMove);
    }

    #[test]
    fn checked_king_is_flagged() {
        let fen = "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4";
        let rows = cells(fen, Some(&LastMove::new("h5", "f7"))).expect("cells");
        assert_eq!(rows[0][4].glyph, '♚');
        assert_eq!(rows[0][4].highlight, Highlight::Check);
        assert_eq!(rows[1][5].highlight, Highlight::LastMove);
        assert_eq!(rows[3][7].glyph, ORIGIN_MARK);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(cells("not a fen", None).is_err());
        assert!(cells(STARTING_FEN, Some(&LastMove::new("z9", "e4"))).is_err());
    }
}
