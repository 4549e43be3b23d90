//! Per-opening note store with line reference counting.
//!
//! A note lives as long as at least one line of its opening passes through
//! its FEN. Line edits go through [`Opening::release_line`] /
//! [`Opening::reattach_line_to_notes`] / [`Opening::purge_orphan_notes`] so
//! a note shared with a sibling line is never dropped early.

use crate::model::{Line, LineId, Note, Opening};

impl Opening {
    /// Set the note at `fen`, creating it if needed, and record `line_id`
    /// as a reference.
    pub fn attach_note(&mut self, fen: &str, content: &str, line_id: &LineId) {
        let note = self
            .notes
            .entry(fen.to_string())
            .or_insert_with(|| Note::new(""));
        note.content = content.to_string();
        note.referenced_by.insert(line_id.clone());
    }

    /// Remove `line_id` from every note without purging.
    pub fn release_line(&mut self, line_id: &LineId) {
        for note in self.notes.values_mut() {
            note.referenced_by.remove(line_id);
        }
    }

    /// Drop notes no line references any more. Returns how many were dropped.
    pub fn purge_orphan_notes(&mut self) -> usize {
        let before = self.notes.len();
        self.notes.retain(|_, note| !note.is_orphan());
        before - self.notes.len()
    }

    /// Remove `line_id` from every note and purge notes left unreferenced.
    pub fn detach_line_from_notes(&mut self, line_id: &LineId) -> usize {
        self.release_line(line_id);
        self.purge_orphan_notes()
    }

    /// Reference `line` from every existing note on one of its positions.
    /// Never creates notes.
    pub fn reattach_line_to_notes(&mut self, line: &Line) {
        for pos in &line.positions {
            if let Some(note) = self.notes.get_mut(&pos.fen) {
                note.referenced_by.insert(line.id.clone());
            }
        }
    }

    /// Rebuild every note's reference set from the current lines and drop
    /// notes on positions no line visits.
    pub fn recount_note_references(&mut self) -> usize {
        for (fen, note) in self.notes.iter_mut() {
            note.referenced_by = self
                .lines
                .iter()
                .filter(|l| l.contains_fen(fen))
                .map(|l| l.id.clone())
                .collect();
        }
        self.purge_orphan_notes()
    }

    pub fn note_for(&self, fen: &str) -> Option<&Note> {
        self.notes.get(fen)
    }

    /// Note text at `fen`, empty when there is none.
    pub fn note_content(&self, fen: &str) -> &str {
        self.notes.get(fen).map(|n| n.content.as_str()).unwrap_or("")
    }

    /// Lines whose positions include `fen`, in opening order.
    pub fn lines_through(&self, fen: &str) -> Vec<&Line> {
        self.lines.iter().filter(|l| l.contains_fen(fen)).collect()
    }
}
