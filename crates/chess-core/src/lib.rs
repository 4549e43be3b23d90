//! Opening repertoire core: lines, notes and the merged move tree.
//!
//! Lines are built from move tokens through a [`rules::RulesEngine`], stored
//! in an [`model::Opening`] together with FEN-keyed notes, and merged on
//! demand into a prefix tree by [`opening_tree::build_tree`].

pub mod line;
pub mod model;
pub mod notes;
pub mod opening_tree;
pub mod pgn;
pub mod rules;

pub use line::{build_line, line_from_pgn, LineError};
pub use model::{
    Line, LineId, Note, NoteId, NoteMap, Opening, OpeningId, Position, STANDARD_START_FEN,
    STARTING_POSITION,
};
pub use opening_tree::{build_tree, LineRef, MoveTreeNode};
pub use rules::{AppliedMove, RulesEngine, RulesError, ShakmatyRules};
