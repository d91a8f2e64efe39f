//! Minimal PGN reader: tag pairs plus the mainline SAN moves and the comment
//! that follows each of them. Variations and NAGs are skipped.

use std::{collections::BTreeMap, sync::OnceLock};

use chesstv_types::{ChessTvError, Result};
use regex::Regex;

const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnPly {
    pub san: String,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PgnRecord {
    pub headers: BTreeMap<String, String>,
    pub plies: Vec<PgnPly>,
}

impl PgnRecord {
    /// Comments in mainline order, skipping plies that carry none.
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.plies.iter().filter_map(|ply| ply.comment.as_deref())
    }
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"^\[([A-Za-z0-9_]+)\s+"(.*)"\]$"#).unwrap_or_else(|e| {
            panic!("invalid PGN tag pattern: {e}");
        })
    })
}

fn clock_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\[%clk (\d+):(\d{2}):(\d{2})(?:\.\d+)?\]").unwrap_or_else(|e| {
            panic!("invalid clock pattern: {e}");
        })
    })
}

/// Seconds remaining from a `[%clk H:MM:SS]` annotation inside a move comment.
pub fn parse_clock(comment: &str) -> Result<u32> {
    let captures = clock_pattern()
        .captures(comment)
        .ok_or_else(|| ChessTvError::Clock(comment.trim().to_string()))?;
    let field = |index: usize| -> Result<u32> {
        captures[index]
            .parse::<u32>()
            .map_err(|_| ChessTvError::Clock(comment.trim().to_string()))
    };
    let (hours, minutes, seconds) = (field(1)?, field(2)?, field(3)?);
    hours
        .checked_mul(3600)
        .and_then(|total| total.checked_add(minutes * 60 + seconds))
        .ok_or_else(|| ChessTvError::Clock(comment.trim().to_string()))
}

pub fn parse_pgn(text: &str) -> Result<PgnRecord> {
    let mut record = PgnRecord::default();
    let mut movetext = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if movetext.is_empty() && trimmed.starts_with('[') {
            let captures = tag_pattern()
                .captures(trimmed)
                .ok_or_else(|| ChessTvError::Pgn(format!("malformed tag pair: {trimmed}")))?;
            record.headers.insert(
                captures[1].to_string(),
                captures[2].replace("\\\"", "\""),
            );
        } else if !trimmed.is_empty() {
            movetext.push_str(trimmed);
            movetext.push('\n');
        }
    }

    read_movetext(&movetext, &mut record.plies)?;
    if record.headers.is_empty() && record.plies.is_empty() {
        return Err(ChessTvError::Pgn("empty PGN".into()));
    }
    Ok(record)
}

fn read_movetext(movetext: &str, plies: &mut Vec<PgnPly>) -> Result<()> {
    let mut chars = movetext.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            '{' => {
                chars.next();
                let comment: String = chars.by_ref().take_while(|&c| c != '}').collect();
                if let Some(last) = plies.last_mut() {
                    if last.comment.is_none() {
                        last.comment = Some(comment.trim().to_string());
                    }
                }
            }
            ';' => {
                chars.by_ref().take_while(|&c| c != '\n').for_each(drop);
            }
            '(' => {
                chars.next();
                let mut depth = 1usize;
                for c in chars.by_ref() {
                    match c {
                        '(' => depth += 1,
                        ')' => depth -= 1,
                        _ => {}
                    }
                    if depth == 0 {
                        break;
                    }
                }
                if depth != 0 {
                    return Err(ChessTvError::Pgn("unterminated variation".into()));
                }
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            _ => {
                let mut token = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '{' | '(' | ';') {
                        break;
                    }
                    token.push(c);
                    chars.next();
                }
                if let Some(san) = san_from_token(&token) {
                    plies.push(PgnPly {
                        san: san.to_string(),
                        comment: None,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Strip a leading move number (`12.` / `12...`) and drop result markers and NAGs.
fn san_from_token(token: &str) -> Option<&str> {
    if RESULT_TOKENS.contains(&token) || token.starts_with('$') {
        return None;
    }
    let without_number = token.trim_start_matches(|c: char| c.is_ascii_digit());
    let san = if without_number.len() != token.len() && without_number.starts_with('.') {
        without_number.trim_start_matches('.')
    } else {
        token
    };
    (!san.is_empty()).then_some(san)
}
