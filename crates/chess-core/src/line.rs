//! Line builder: turns a move-token sequence into a [`Line`] of positions.

use tracing::debug;

use crate::model::{Line, Position, STANDARD_START_FEN};
use crate::pgn;
use crate::rules::RulesEngine;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LineError {
    #[error("no valid moves found")]
    Empty,

    #[error("invalid starting position: {0}")]
    InvalidStartingPosition(String),
}

/// Build a line from move tokens, starting at `starting_fen` (or the
/// standard initial position).
///
/// Tokens the rules engine rejects are skipped, so stray annotations in
/// pasted PGN do not abort the import. Fails only when no move at all was
/// recognised.
pub fn build_line<R, S>(
    engine: &R,
    name: &str,
    tokens: &[S],
    starting_fen: Option<&str>,
) -> Result<Line, LineError>
where
    R: RulesEngine + ?Sized,
    S: AsRef<str>,
{
    let start = starting_fen.unwrap_or(STANDARD_START_FEN);
    let start = engine
        .normalize_fen(start)
        .map_err(|_| LineError::InvalidStartingPosition(start.to_string()))?;

    let mut positions = vec![Position::starting(&start)];
    let mut current = start;

    for token in tokens {
        let token = token.as_ref();
        match engine.apply_move(&current, token) {
            Ok(applied) => {
                positions.push(Position {
                    fen: applied.fen.clone(),
                    move_notation: applied.notation,
                    from_square: Some(applied.from),
                    to_square: Some(applied.to),
                    move_index: positions.len(),
                    noteworthy: false,
                });
                current = applied.fen;
            }
            Err(e) => {
                debug!(token, error = %e, "Skipping move token");
            }
        }
    }

    if positions.len() == 1 {
        return Err(LineError::Empty);
    }

    Ok(Line::new(name, positions))
}

/// Build a line from raw PGN text. A `[FEN "..."]` header sets the start.
pub fn line_from_pgn<R>(engine: &R, name: &str, pgn_text: &str) -> Result<Line, LineError>
where
    R: RulesEngine + ?Sized,
{
    let tokens = pgn::extract_tokens(pgn_text);
    let start = pgn::starting_fen(pgn_text);
    build_line(engine, name, &tokens, start.as_deref())
}
