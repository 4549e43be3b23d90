//! Move legality adapter.
//!
//! The rest of the workspace only sees FEN strings and move tokens; board
//! state lives inside the [`RulesEngine`] implementation.

use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move};

use regex::Regex;
use std::sync::LazyLock;

// Long algebraic with optional piece letter, dash or capture sign: `Ng1-f3`, `e7xd8=Q`.
static LONG_ALGEBRAIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[KQRBNP]?([a-h][1-8])[-x]?([a-h][1-8])=?([qrbnQRBN])?$").unwrap()
});

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RulesError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("illegal or unrecognised move `{token}`")]
    IllegalMove { token: String },
}

/// Result of playing one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    pub fen: String,
    /// Canonical SAN, including check/mate suffix.
    pub notation: String,
    pub from: String,
    pub to: String,
}

pub trait RulesEngine {
    /// Play `token` on the position described by `fen`.
    ///
    /// Tokens are matched loosely: annotation glyphs are ignored, check marks
    /// are optional, `0-0` is read as castling and coordinate moves like
    /// `g1f3` are accepted.
    fn apply_move(&self, fen: &str, token: &str) -> Result<AppliedMove, RulesError>;

    /// Parse a FEN and return it in canonical form.
    fn normalize_fen(&self, fen: &str) -> Result<String, RulesError>;
}

/// [`RulesEngine`] backed by `shakmaty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShakmatyRules;

impl ShakmatyRules {
    pub fn new() -> Self {
        Self
    }

    fn parse_position(fen: &str) -> Result<Chess, RulesError> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|_| RulesError::InvalidFen(fen.to_string()))?;
        parsed
            .into_position(CastlingMode::Standard)
            .map_err(|_| RulesError::InvalidFen(fen.to_string()))
    }

    fn resolve(pos: &Chess, token: &str) -> Option<Move> {
        let cleaned = clean_token(token);
        if cleaned.is_empty() {
            return None;
        }

        if let Ok(san) = cleaned.parse::<San>() {
            if let Ok(mv) = san.to_move(pos) {
                return Some(mv);
            }
        }

        if let Ok(uci) = to_uci_text(&cleaned).parse::<UciMove>() {
            if let Ok(mv) = uci.to_move(pos) {
                return Some(mv);
            }
        }

        None
    }
}

impl RulesEngine for ShakmatyRules {
    fn apply_move(&self, fen: &str, token: &str) -> Result<AppliedMove, RulesError> {
        let mut pos = Self::parse_position(fen)?;
        let mv = Self::resolve(&pos, token).ok_or_else(|| RulesError::IllegalMove {
            token: token.to_string(),
        })?;

        // King-to-destination squares for castling, like the UI highlights.
        let (from, to) = match mv.to_uci(CastlingMode::Standard) {
            UciMove::Normal { from, to, .. } => (from.to_string(), to.to_string()),
            _ => (
                mv.from().map(|sq| sq.to_string()).unwrap_or_default(),
                mv.to().to_string(),
            ),
        };

        let notation = SanPlus::from_move_and_play_unchecked(&mut pos, mv).to_string();

        Ok(AppliedMove {
            fen: fen_of(&pos),
            notation,
            from,
            to,
        })
    }

    fn normalize_fen(&self, fen: &str) -> Result<String, RulesError> {
        Self::parse_position(fen).map(|pos| fen_of(&pos))
    }
}

/// En passant squares are always written after a double push, matching the
/// FEN keys of previously exported collections.
fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Always).to_string()
}

/// Coordinate form of a long-algebraic token, or the token lowercased.
fn to_uci_text(token: &str) -> String {
    match LONG_ALGEBRAIC_RE.captures(token) {
        Some(caps) => {
            let promotion = caps.get(3).map_or(String::new(), |m| m.as_str().to_ascii_lowercase());
            format!("{}{}{}", &caps[1], &caps[2], promotion)
        }
        None => token.to_ascii_lowercase(),
    }
}

/// Strip annotation glyphs and check marks, and normalise zero-castling.
fn clean_token(token: &str) -> String {
    let trimmed = token
        .trim()
        .trim_end_matches(|c: char| matches!(c, '!' | '?' | '+' | '#'))
        .trim_end_matches("e.p.")
        .trim();

    match trimmed {
        "0-0" => "O-O".to_string(),
        "0-0-0" => "O-O-O".to_string(),
        other => other.to_string(),
    }
}
