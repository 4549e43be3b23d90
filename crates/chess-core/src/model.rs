//! Repertoire data model: positions, lines, notes and openings.
//!
//! Field names serialize in the camelCase shape of the exported JSON
//! collection (`isWhite`, `referencedBy`, `move`).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Move notation carried by the root position of every line.
pub const STARTING_POSITION: &str = "Starting Position";

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Fresh random (v4 UUID) identifier.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Identifier of an opening. Imported collections may carry non-UUID ids.
    OpeningId
);
string_id!(
    /// Identifier of a line within an opening.
    LineId
);
string_id!(NoteId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub fen: String,
    #[serde(rename = "move")]
    pub move_notation: String,
    #[serde(rename = "from", default, skip_serializing_if = "Option::is_none")]
    pub from_square: Option<String>,
    #[serde(rename = "to", default, skip_serializing_if = "Option::is_none")]
    pub to_square: Option<String>,
    /// Array position, rebuilt on load and never written out.
    #[serde(rename = "moveIndex", default, skip_serializing)]
    pub move_index: usize,
    #[serde(default)]
    pub noteworthy: bool,
}

impl Position {
    /// Root position of a line.
    pub fn starting(fen: &str) -> Self {
        Self {
            fen: fen.to_string(),
            move_notation: STARTING_POSITION.to_string(),
            from_square: None,
            to_square: None,
            move_index: 0,
            noteworthy: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub name: String,
    #[serde(default)]
    pub summary: String,
    pub positions: Vec<Position>,
}

impl Line {
    pub fn new(name: impl Into<String>, positions: Vec<Position>) -> Self {
        Self {
            id: LineId::generate(),
            name: name.into(),
            summary: String::new(),
            positions,
        }
    }

    /// Number of moves, not counting the starting position.
    pub fn move_count(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }

    /// SAN of every move after the starting position.
    pub fn moves(&self) -> Vec<&str> {
        self.positions
            .iter()
            .skip(1)
            .map(|p| p.move_notation.as_str())
            .collect()
    }

    pub fn contains_fen(&self, fen: &str) -> bool {
        self.positions.iter().any(|p| p.fen == fen)
    }

    /// Rewrite `move_index` from array order. Used after loading data whose
    /// positions carry no index.
    pub fn renumber(&mut self) {
        for (i, pos) in self.positions.iter_mut().enumerate() {
            pos.move_index = i;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(default = "NoteId::generate")]
    pub id: NoteId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub referenced_by: BTreeSet<LineId>,
}

impl Note {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: NoteId::generate(),
            content: content.into(),
            referenced_by: BTreeSet::new(),
        }
    }

    pub fn is_orphan(&self) -> bool {
        self.referenced_by.is_empty()
    }
}

/// Notes keyed by FEN.
pub type NoteMap = BTreeMap<String, Note>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opening {
    pub id: OpeningId,
    pub name: String,
    #[serde(default = "default_is_white")]
    pub is_white: bool,
    #[serde(default)]
    pub notes: NoteMap,
    pub lines: Vec<Line>,
}

fn default_is_white() -> bool {
    true
}

impl Opening {
    pub fn line(&self, id: &LineId) -> Option<&Line> {
        self.lines.iter().find(|l| &l.id == id)
    }

    pub fn line_mut(&mut self, id: &LineId) -> Option<&mut Line> {
        self.lines.iter_mut().find(|l| &l.id == id)
    }

    pub fn line_index(&self, id: &LineId) -> Option<usize> {
        self.lines.iter().position(|l| &l.id == id)
    }
}
