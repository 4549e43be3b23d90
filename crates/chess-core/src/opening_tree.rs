//! Move tree for an opening: all lines merged into one prefix tree.
//!
//! The tree is a read projection rebuilt from scratch on every call; nothing
//! here writes back to the [`Opening`].

use indexmap::{IndexMap, IndexSet};
use serde_json::Value as JsonValue;

use crate::model::{LineId, Opening, STANDARD_START_FEN};

/// Move key of the synthetic root.
pub const ROOT_MOVE: &str = "start";

/// A line passing through a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineRef {
    pub id: LineId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTreeNode {
    pub mv: String,
    pub fen: String,
    /// Ply; equals the position index within every line through this node.
    pub depth: usize,
    /// Keyed by SAN, in first-insertion order.
    pub children: IndexMap<String, MoveTreeNode>,
    pub lines: IndexSet<LineRef>,
    /// Set on the node where a line first splits off on its own.
    pub is_first_unique_move: bool,
    pub noteworthy: bool,
    pub notes: String,
    branches_below: bool,
}

impl MoveTreeNode {
    fn new(mv: &str, fen: &str, depth: usize) -> Self {
        Self {
            mv: mv.to_string(),
            fen: fen.to_string(),
            depth,
            children: IndexMap::new(),
            lines: IndexSet::new(),
            is_first_unique_move: false,
            noteworthy: false,
            notes: String::new(),
            branches_below: false,
        }
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Move label with its move number, `"1. e4"` or `"1... e5"`.
    pub fn label(&self) -> String {
        if self.is_root() {
            return self.mv.clone();
        }
        let number = self.depth.div_ceil(2);
        let dots = if self.depth % 2 == 0 { "..." } else { "." };
        format!("{number}{dots} {}", self.mv)
    }

    /// Line names joined for display at a divergence point.
    pub fn line_names(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.name.as_str()).collect()
    }

    /// Follow `moves` from this node.
    pub fn find<S: AsRef<str>>(&self, moves: &[S]) -> Option<&MoveTreeNode> {
        let mut node = self;
        for mv in moves {
            node = node.children.get(mv.as_ref())?;
        }
        Some(node)
    }

    /// Every root-to-leaf move sequence, children visited in order.
    pub fn leaf_paths(&self) -> Vec<Vec<String>> {
        let mut out = Vec::new();
        let mut path = Vec::new();
        collect_paths(self, &mut path, &mut out);
        out
    }

    /// Number of nodes below and including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.values().map(MoveTreeNode::node_count).sum::<usize>()
    }

    /// JSON form with children as an ordered array.
    pub fn to_json(&self) -> JsonValue {
        let children: Vec<JsonValue> = self.children.values().map(MoveTreeNode::to_json).collect();
        let lines: Vec<JsonValue> = self
            .lines
            .iter()
            .map(|l| serde_json::json!({ "id": l.id, "name": l.name }))
            .collect();

        serde_json::json!({
            "move": self.mv,
            "fen": self.fen,
            "depth": self.depth,
            "notes": self.notes,
            "noteworthy": self.noteworthy,
            "isFirstUniqueMove": self.is_first_unique_move,
            "lines": lines,
            "children": children,
        })
    }
}

fn collect_paths(node: &MoveTreeNode, path: &mut Vec<String>, out: &mut Vec<Vec<String>>) {
    if node.is_leaf() {
        if !path.is_empty() {
            out.push(path.clone());
        }
        return;
    }
    for (mv, child) in &node.children {
        path.push(mv.clone());
        collect_paths(child, path, out);
        path.pop();
    }
}

/// Merge all lines of `opening` into a move tree.
pub fn build_tree(opening: &Opening) -> MoveTreeNode {
    let root_fen = opening
        .lines
        .first()
        .and_then(|l| l.positions.first())
        .map(|p| p.fen.as_str())
        .unwrap_or(STANDARD_START_FEN);
    let mut root = MoveTreeNode::new(ROOT_MOVE, root_fen, 0);

    for line in &opening.lines {
        let line_ref = LineRef {
            id: line.id.clone(),
            name: line.name.clone(),
        };

        let mut current = &mut root;
        for (index, pos) in line.positions.iter().enumerate().skip(1) {
            current = current
                .children
                .entry(pos.move_notation.clone())
                .or_insert_with(|| {
                    let mut node = MoveTreeNode::new(&pos.move_notation, &pos.fen, index);
                    node.notes = opening.note_content(&pos.fen).to_string();
                    node
                });
            current.lines.insert(line_ref.clone());
            current.noteworthy |= pos.noteworthy;
        }
    }

    mark_branches(&mut root);
    mark_first_unique_moves(&mut root, opening.lines.len());
    root
}

/// Bottom-up: record whether any node in each subtree has several children.
fn mark_branches(node: &mut MoveTreeNode) -> bool {
    let mut below = node.children.len() > 1;
    for child in node.children.values_mut() {
        below |= mark_branches(child);
    }
    node.branches_below = below;
    below
}

/// Top-down: flag children of branch points that belong to a strict subset
/// of lines and never split again.
fn mark_first_unique_moves(node: &mut MoveTreeNode, total_lines: usize) {
    let is_branch = node.children.len() > 1;
    for child in node.children.values_mut() {
        if is_branch && child.lines.len() < total_lines && !child.branches_below {
            child.is_first_unique_move = true;
        }
        mark_first_unique_moves(child, total_lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::build_line;
    use crate::model::{Line, OpeningId};
    use crate::rules::ShakmatyRules;

    fn line(name: &str, moves: &[&str]) -> Line {
        build_line(&ShakmatyRules::new(), name, moves, None).unwrap()
    }

    fn opening(lines: Vec<Line>) -> Opening {
        Opening {
            id: OpeningId::from("o"),
            name: "Test".into(),
            is_white: true,
            notes: Default::default(),
            lines,
        }
    }

    #[test]
    fn test_identical_lines_collapse() {
        let o = opening(vec![line("A", &["e4", "e5"]), line("B", &["e4", "e5"])]);
        let tree = build_tree(&o);
        assert_eq!(tree.node_count(), 3);
        let e5 = tree.find(&["e4", "e5"]).unwrap();
        assert_eq!(e5.lines.len(), 2);
        assert!(!e5.is_first_unique_move);
        assert!(!tree.find(&["e4"]).unwrap().is_first_unique_move);
    }

    #[test]
    fn test_prefix_line_is_not_unique() {
        let o = opening(vec![line("Short", &["d4"]), line("Long", &["d4", "d5", "c4"])]);
        let tree = build_tree(&o);
        let d4 = tree.find(&["d4"]).unwrap();
        assert_eq!(d4.lines.len(), 2);
        assert!(!d4.is_first_unique_move);
        assert!(tree.find(&["d4", "d5"]).unwrap().lines.len() == 1);
        assert!(!tree.find(&["d4", "d5"]).unwrap().is_first_unique_move);
    }

    #[test]
    fn test_branching_subtree_is_not_unique() {
        let o = opening(vec![
            line("A", &["e4", "e5", "Nf3"]),
            line("B", &["e4", "e5", "f4"]),
            line("C", &["d4"]),
        ]);
        let tree = build_tree(&o);
        // e4 carries two of three lines but branches again below.
        assert!(!tree.find(&["e4"]).unwrap().is_first_unique_move);
        assert!(tree.find(&["d4"]).unwrap().is_first_unique_move);
        assert!(tree.find(&["e4", "e5", "Nf3"]).unwrap().is_first_unique_move);
        assert!(tree.find(&["e4", "e5", "f4"]).unwrap().is_first_unique_move);
    }

    #[test]
    fn test_noteworthy_is_or_merged() {
        let a = line("A", &["e4", "e5"]);
        let mut b = line("B", &["e4", "c5"]);
        b.positions[1].noteworthy = true;
        let tree = build_tree(&opening(vec![a, b]));
        assert!(tree.find(&["e4"]).unwrap().noteworthy);
        assert!(!tree.find(&["e4", "e5"]).unwrap().noteworthy);
    }

    #[test]
    fn test_labels() {
        let tree = build_tree(&opening(vec![line("A", &["e4", "e5"])]));
        assert_eq!(tree.label(), "start");
        assert_eq!(tree.find(&["e4"]).unwrap().label(), "1. e4");
        assert_eq!(tree.find(&["e4", "e5"]).unwrap().label(), "1... e5");
    }

    #[test]
    fn test_to_json_children_array() {
        let tree = build_tree(&opening(vec![line("A", &["e4"]), line("B", &["d4"])]));
        let json = tree.to_json();
        assert_eq!(json["move"], "start");
        assert_eq!(json["children"][0]["move"], "e4");
        assert_eq!(json["children"][1]["move"], "d4");
        assert_eq!(json["children"][1]["lines"][0]["name"], "B");
        assert_eq!(json["children"][1]["isFirstUniqueMove"], true);
    }
}
