//! PGN text cleanup: lightweight regex-based tokenizer.
//!
//! Produces loose move tokens for the line builder. Legality is not checked
//! here; anything that is not a move is dropped later by the rules engine.

use regex::Regex;
use std::sync::LazyLock;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^}]*\}|;[^\n]*").unwrap());
// Innermost variation only; applied until nothing changes to unwind nesting.
static VARIATION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^()]*\)").unwrap());
static MOVE_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\s*\.+").unwrap());
static NAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\d+").unwrap());

const RESULTS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Split PGN movetext into move tokens, dropping headers, comments,
/// variations, move numbers, NAGs and the game result.
pub fn extract_tokens(pgn: &str) -> Vec<String> {
    let no_headers = HEADER_RE.replace_all(pgn, " ");
    let mut text = COMMENT_RE.replace_all(&no_headers, " ").into_owned();

    loop {
        let stripped = VARIATION_RE.replace_all(&text, " ").into_owned();
        if stripped == text {
            break;
        }
        text = stripped;
    }

    let text = MOVE_NUMBER_RE.replace_all(&text, " ");
    let text = NAG_RE.replace_all(&text, " ");

    text.split_whitespace()
        .filter(|token| !RESULTS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Extract a string value from a PGN header.
pub fn extract_header(pgn: &str, header_name: &str) -> Option<String> {
    let pattern = format!(r#"\[{}\s+"([^"]*)"\]"#, regex::escape(header_name));
    let re = Regex::new(&pattern).ok()?;
    let value = re.captures(pgn)?.get(1)?.as_str().trim().to_string();
    if value.is_empty() { None } else { Some(value) }
}

/// Custom starting position from the `FEN` header, if any.
pub fn starting_fen(pgn: &str) -> Option<String> {
    extract_header(pgn, "FEN")
}
