//! Lichess wire envelopes and their conversion into replayable [`Game`]s.

use chesstv_types::{
    game::{Game, GameMove, LastMove, PlayerInfo},
    ChessTvError, Result,
};
use serde::Deserialize;
use shakmaty::{
    fen::Fen, san::SanPlus, uci::UciMove, CastlingMode, Chess, EnPassantMode, Move, Position,
};

use crate::pgn::{parse_clock, parse_pgn};

const ANONYMOUS: &str = "Anonymous";

/// One game as returned by the Lichess TV and export endpoints with
/// `pgnInJson=true&clocks=true`.
#[derive(Debug, Clone, Deserialize)]
pub struct LichessGame {
    pub id: String,
    pub pgn: String,
    pub status: String,
    pub clock: LichessClock,
    pub players: LichessPlayers,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LichessClock {
    pub initial: u32,
    pub increment: u32,
    #[serde(rename = "totalTime")]
    pub total_time: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LichessPlayers {
    pub white: LichessPlayer,
    pub black: LichessPlayer,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LichessPlayer {
    pub user: Option<LichessUser>,
    #[serde(default)]
    pub rating: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LichessUser {
    pub name: String,
    pub title: Option<String>,
}

impl LichessPlayer {
    fn info(&self) -> PlayerInfo {
        match &self.user {
            Some(user) => PlayerInfo {
                name: user.name.clone(),
                rating: self.rating,
                title: user.title.clone(),
            },
            None => PlayerInfo {
                name: ANONYMOUS.to_string(),
                rating: self.rating,
                title: None,
            },
        }
    }
}

/// Decode a newline-delimited JSON body; blank lines are ignored.
pub fn decode_envelopes(body: &str) -> Result<Vec<LichessGame>> {
    body.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(ChessTvError::from))
        .collect()
}

/// Replay the PGN of an envelope into per-ply positions and clocks.
pub fn convert(envelope: &LichessGame) -> Result<Game> {
    let record = parse_pgn(&envelope.pgn)?;
    let mut position = match record.headers.get("FEN") {
        Some(fen) => position_from_fen(fen)?,
        None => Chess::default(),
    };

    let mut moves = Vec::with_capacity(record.plies.len());
    for ply in &record.plies {
        let comment = ply.comment.as_deref().ok_or_else(|| {
            ChessTvError::Clock(format!("no clock comment after {}", ply.san))
        })?;
        let seconds_remaining = parse_clock(comment)?;
        let mv = resolve_san(&position, &ply.san)?;
        let last_move = last_move(&mv, &ply.san)?;
        position = position
            .play(mv)
            .map_err(|err| ChessTvError::Pgn(format!("cannot play {}: {err}", ply.san)))?;

        moves.push(GameMove {
            fen: Fen::from_position(&position, EnPassantMode::Legal).to_string(),
            seconds_remaining,
            last_move,
        });
    }

    Ok(Game {
        id: envelope.id.clone(),
        total_time: envelope.clock.initial,
        status: envelope.status.clone(),
        moves,
        white: envelope.players.white.info(),
        black: envelope.players.black.info(),
        pgn_header: record.headers,
    })
}

pub(crate) fn position_from_fen(fen: &str) -> Result<Chess> {
    fen.parse::<Fen>()
        .map_err(|err| ChessTvError::Pgn(format!("invalid FEN {fen:?}: {err}")))?
        .into_position(CastlingMode::Standard)
        .map_err(|err| ChessTvError::Pgn(format!("impossible position {fen:?}: {err}")))
}

/// The unique legal move on `position` described by a SAN token.
pub(crate) fn resolve_san(position: &Chess, san: &str) -> Result<Move> {
    let token = san.trim_end_matches(['!', '?']);
    let parsed = token
        .parse::<SanPlus>()
        .map_err(|err| ChessTvError::Pgn(format!("unreadable move {san:?}: {err}")))?;
    parsed
        .san
        .to_move(position)
        .map_err(|err| ChessTvError::Pgn(format!("cannot play {san:?}: {err}")))
}

/// Origin and destination squares, with castling as the king's two-square step.
fn last_move(mv: &Move, san: &str) -> Result<LastMove> {
    match mv.to_uci(CastlingMode::Standard) {
        UciMove::Normal { from, to, .. } => Ok(LastMove::new(from.to_string(), to.to_string())),
        _ => Err(ChessTvError::Pgn(format!("{san:?} is not a board move"))),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use shakmaty::Role;

    pub(crate) fn envelope(id: &str, status: &str, pgn: &str) -> LichessGame {
        LichessGame {
            id: id.into(),
            pgn: pgn.into(),
            status: status.into(),
            clock: LichessClock {
                initial: 180,
                increment: 0,
                total_time: 180,
            },
            players: LichessPlayers {
                white: LichessPlayer {
                    user: Some(LichessUser {
                        name: "JohnnyAnto".into(),
                        title: Some("CM".into()),
                    }),
                    rating: 2523,
                },
                black: LichessPlayer {
                    user: None,
                    rating: 1500,
                },
            },
        }
    }

    #[test]
    fn convert_replays_positions_and_clocks() {
        let pgn = "[Event \"Rated Blitz game\"]\n[Result \"1-0\"]\n\n1. e4 { [%clk 0:03:00] } 1... e5 { [%clk 0:03:00] } 2. Nf3 { [%clk 0:02:58] } 2... Nc6 { [%clk 0:02:55] } 3. Bb5 { [%clk 0:02:50] } 3... Nf6 { [%clk 0:02:51] } 4. O-O { [%clk 0:02:49] } 1-0\n";
        let game = convert(&envelope("abc", "resign", pgn)).expect("convert");

        assert_eq!(game.id, "abc");
        assert_eq!(game.total_time, 180);
        assert_eq!(game.moves.len(), 7);
        assert_eq!(game.moves[0].last_move, LastMove::new("e2", "e4"));
        assert!(game.moves[0]
            .fen
            .starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq"));
        assert!(game.moves[1].fen.ends_with(" 0 2"));
        assert_eq!(game.moves[2].seconds_remaining, 178);
        assert!(game.moves[2].fen.ends_with(" 1 2"));
        assert_eq!(game.moves[6].last_move, LastMove::new("e1", "g1"));
        assert!(game.moves[6].fen.starts_with("r1bqkb1r/pppp1ppp/2n2n2/1B2p3/4P3/5N2/PPPP1PPP/RNBQ1RK1 b kq"));
        assert_eq!(game.white.title.as_deref(), Some("CM"));
        assert_eq!(game.black.name, ANONYMOUS);
        assert_eq!(game.pgn_header.get("Result").map(String::as_str), Some("1-0"));
    }

    #[test]
    fn convert_requires_clock_on_every_ply() {
        let pgn = "[Result \"*\"]\n\n1. e4 { [%clk 0:03:00] } 1... e5 *";
        assert!(matches!(
            convert(&envelope("abc", "started", pgn)),
            Err(ChessTvError::Clock(_))
        ));
    }

    #[test]
    fn convert_rejects_illegal_moves() {
        let pgn = "[Result \"*\"]\n\n1. e5 { [%clk 0:03:00] } *";
        assert!(matches!(
            convert(&envelope("abc", "started", pgn)),
            Err(ChessTvError::Pgn(_))
        ));
    }

    #[test]
    fn san_disambiguation_and_promotion() {
        let position = position_from_fen("4k3/P7/8/8/8/8/4K3/R6R w - - 0 1").expect("fen");
        let promo = resolve_san(&position, "a8=Q+").expect("promotion");
        assert_eq!(promo.promotion(), Some(Role::Queen));
        let rook = resolve_san(&position, "Rad1").expect("rook move");
        assert_eq!(rook.from().map(|sq| sq.to_string()).as_deref(), Some("a1"));
        assert!(matches!(resolve_san(&position, "Rd1"), Err(ChessTvError::Pgn(_))));
        assert!(matches!(resolve_san(&position, "Zz9"), Err(ChessTvError::Pgn(_))));

        let position = position_from_fen("r3k3/8/8/8/8/8/8/4K3 b q - 0 1").expect("fen");
        let long_castle = resolve_san(&position, "O-O-O").expect("castle");
        assert_eq!(
            last_move(&long_castle, "O-O-O").expect("squares"),
            LastMove::new("e8", "c8")
        );
    }

    #[test]
    fn fen_header_sets_starting_position_and_counters() {
        let pgn = "[FEN \"4k3/8/8/8/8/8/4P3/4K3 w - - 7 40\"]\n[Result \"*\"]\n\n40. e4 { [%clk 0:01:00] } 40... Kd7 { [%clk 0:01:00] } *";
        let game = convert(&envelope("fen", "started", pgn)).expect("convert");
        assert_eq!(game.moves[0].fen, "4k3/8/8/8/4P3/8/8/4K3 b - - 0 40");
        assert_eq!(game.moves[1].fen, "8/3k4/8/8/4P3/8/8/4K3 w - - 1 41");
        assert!(matches!(
            convert(&envelope("fen", "started", "[FEN \"garbage\"]\n\n*")),
            Err(ChessTvError::Pgn(_))
        ));
    }

    #[test]
    fn decode_skips_blank_lines() {
        let body = r#"{"id":"a","pgn":"","status":"started","clock":{"initial":180,"increment":0,"totalTime":180},"players":{"white":{"user":{"name":"w"},"rating":2000},"black":{"user":{"name":"b","title":"GM"},"rating":2100}}}

"#;
        let games = decode_envelopes(body).expect("decode");
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].clock.total_time, 180);
        assert!(decode_envelopes("{not json}\n").is_err());
    }
}
