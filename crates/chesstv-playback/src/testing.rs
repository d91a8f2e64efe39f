use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chesstv_source::GameSource;
use chesstv_types::{
    game::{Game, GameMove, LastMove, PlayerInfo},
    ChessTvError, Result,
};

/// Source answering from queues of canned games, recording every request.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    inner: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    next_games: VecDeque<Game>,
    refreshes: HashMap<String, VecDeque<Game>>,
    calls: Vec<Option<String>>,
}

impl ScriptedSource {
    pub fn new(next_games: Vec<Game>) -> Self {
        let source = Self::default();
        source.inner.lock().unwrap().next_games = next_games.into();
        source
    }

    pub fn add_refresh(&self, game: Game) {
        self.inner
            .lock()
            .unwrap()
            .refreshes
            .entry(game.id.clone())
            .or_default()
            .push_back(game);
    }

    pub fn calls(&self) -> Vec<Option<String>> {
        self.inner.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl GameSource for ScriptedSource {
    async fn fetch(&self, id: Option<&str>) -> Result<Game> {
        let mut script = self.inner.lock().unwrap();
        script.calls.push(id.map(str::to_string));
        let game = match id {
            None => script.next_games.pop_front(),
            Some(id) => script.refreshes.get_mut(id).and_then(VecDeque::pop_front),
        };
        game.ok_or_else(|| ChessTvError::Source(format!("no scripted game for {id:?}")))
    }
}

fn ply(fen: &str, from: &str, to: &str, seconds_remaining: u32) -> GameMove {
    GameMove {
        fen: fen.into(),
        seconds_remaining,
        last_move: LastMove::new(from, to),
    }
}

fn player(name: &str, rating: u32, title: Option<&str>) -> PlayerInfo {
    PlayerInfo {
        name: name.into(),
        rating,
        title: title.map(str::to_string),
    }
}

const FEN_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
const FEN_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2";
const FEN_NF3: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq - 1 2";
const FEN_NC6: &str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
const FEN_BB5: &str = "r1bqkbnr/pppp1ppp/2n5/1B2p3/4P3/5N2/PPPP1PPP/RNBQK2R b KQkq - 3 3";
const FEN_ND4: &str = "r1bqkbnr/pppp1ppp/8/1B2p3/3nP3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

/// Finished game lost on time by white.
pub fn game1() -> Game {
    Game {
        id: "game1".into(),
        total_time: 180,
        status: "timeout".into(),
        moves: vec![
            ply(FEN_E4, "e2", "e4", 180),
            ply(FEN_E5, "e7", "e5", 180),
            ply(FEN_NF3, "g1", "f3", 178),
            ply(FEN_NC6, "b8", "c6", 175),
        ],
        white: player("g1w", 2500, None),
        black: player("g1b", 2600, Some("FM")),
        pgn_header: BTreeMap::from([("Result".to_string(), "0-1".to_string())]),
    }
}

/// Live game, five plies in.
pub fn game2() -> Game {
    Game {
        id: "game2".into(),
        total_time: 180,
        status: "started".into(),
        moves: vec![
            ply(FEN_E4, "e2", "e4", 180),
            ply(FEN_E5, "e7", "e5", 177),
            ply(FEN_NF3, "g1", "f3", 179),
            ply(FEN_NC6, "b8", "c6", 173),
            ply(FEN_BB5, "f1", "b5", 170),
        ],
        white: player("g2w", 2500, Some("NM")),
        black: player("g2b", 2800, Some("GM")),
        pgn_header: BTreeMap::new(),
    }
}

/// `game2` refreshed after one more ply and a resignation.
pub fn game2_continued() -> Game {
    let mut game = game2();
    game.status = "resign".into();
    game.moves.push(ply(FEN_ND4, "c6", "d4", 168));
    game.pgn_header.insert("Result".into(), "1-0".into());
    game
}
