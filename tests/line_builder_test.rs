//! Integration tests: building lines from move tokens and PGN text.

mod common;

use chess_core::{build_line, line_from_pgn, LineError, ShakmatyRules, STARTING_POSITION};
use common::RUY_LOPEZ;

#[test]
fn test_ruy_lopez_positions() {
    let line = build_line(&ShakmatyRules::new(), "Ruy Lopez", RUY_LOPEZ, None).unwrap();

    assert_eq!(line.positions.len(), 10);
    assert_eq!(line.positions[0].move_notation, STARTING_POSITION);
    assert_eq!(line.moves(), RUY_LOPEZ.to_vec());
    for pair in line.positions.windows(2) {
        assert_ne!(pair[0].fen, pair[1].fen);
    }
    for (i, pos) in line.positions.iter().enumerate() {
        assert_eq!(pos.move_index, i);
    }

    let castle = &line.positions[9];
    assert_eq!(castle.from_square.as_deref(), Some("e1"));
    assert_eq!(castle.to_square.as_deref(), Some("g1"));
}

#[test]
fn test_pgn_with_headers_comments_and_variations() {
    let pgn = r#"[Event "Casual"]
[White "A"]
[Black "B"]

1. e4 {King's pawn} e5 2. Nf3 (2. f4 exf4) Nc6 3. Bb5 $1 a6 1-0"#;
    let line = line_from_pgn(&ShakmatyRules::new(), "Main", pgn).unwrap();
    assert_eq!(line.moves(), vec!["e4", "e5", "Nf3", "Nc6", "Bb5", "a6"]);
}

#[test]
fn test_illegal_tokens_are_skipped() {
    let tokens = ["e4", "Ke7??", "e5", "zz", "Nf3"];
    let line = build_line(&ShakmatyRules::new(), "Messy", &tokens, None).unwrap();
    assert_eq!(line.moves(), vec!["e4", "e5", "Nf3"]);
}

#[test]
fn test_no_valid_moves() {
    let err = build_line(&ShakmatyRules::new(), "Nothing", &["Qh5", "xx"], None).unwrap_err();
    assert_eq!(err, LineError::Empty);
    assert_eq!(err.to_string(), "no valid moves found");
}

#[test]
fn test_long_algebraic_line() {
    let tokens = ["e2-e4", "e7-e5", "Ng1-f3", "Nb8-c6", "Bf1-b5"];
    let line = build_line(&ShakmatyRules::new(), "Long", &tokens, None).unwrap();
    assert_eq!(line.moves(), vec!["e4", "e5", "Nf3", "Nc6", "Bb5"]);
    assert_eq!(line.positions[3].from_square.as_deref(), Some("g1"));
    assert_eq!(line.positions[3].to_square.as_deref(), Some("f3"));
}
