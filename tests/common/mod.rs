#![allow(dead_code)]

use chess_core::{build_line, Line, Opening, OpeningId, ShakmatyRules};
use repertoire::{MemoryStore, NoteInputs, OpeningRepository};

pub const RUY_LOPEZ: &[&str] = &["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Ba4", "Nf6", "O-O"];

/// Build a line from SAN moves off the standard start.
pub fn line(name: &str, moves: &[&str]) -> Line {
    build_line(&ShakmatyRules::new(), name, moves, None)
        .unwrap_or_else(|e| panic!("bad test line {name}: {e}"))
}

/// Repository over an in-memory store holding one opening with `lines`.
pub fn repo_with_lines(lines: &[(&str, &[&str])]) -> (OpeningRepository<MemoryStore>, OpeningId) {
    let mut repo = OpeningRepository::load(MemoryStore::new()).unwrap();
    let (first, rest) = lines.split_first().expect("at least one line");
    let opening = repo
        .create_opening("Test Opening", true, line(first.0, first.1), NoteInputs::new())
        .unwrap();
    for (name, moves) in rest {
        repo.add_line(&opening.id, line(name, moves), NoteInputs::new())
            .unwrap();
    }
    (repo, opening.id)
}

pub fn opening<'a>(repo: &'a OpeningRepository<MemoryStore>, id: &OpeningId) -> &'a Opening {
    repo.opening(id).unwrap()
}

/// FEN reached after `ply` moves of line `index`.
pub fn fen_at(opening: &Opening, index: usize, ply: usize) -> String {
    opening.lines[index].positions[ply].fen.clone()
}
