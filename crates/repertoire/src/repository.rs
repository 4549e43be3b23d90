//! Opening repository: the single in-memory cache of all openings.
//!
//! Every mutation works on a copy of the target opening, builds the complete
//! next collection, saves it, and only then replaces the cache. A failed
//! check or save leaves both cache and storage as they were.

use std::collections::BTreeMap;

use tracing::{info, warn};

use chess_core::{
    build_tree, Line, LineId, MoveTreeNode, Note, NoteMap, Opening, OpeningId, Position,
};

use crate::error::RepertoireError;
use crate::store::Storage;
use crate::transfer;

/// Note supplied with a new line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInput {
    pub content: String,
    /// Edited by the caller; overrides an existing note's content.
    pub modified: bool,
}

impl NoteInput {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            modified: false,
        }
    }

    pub fn modified(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            modified: true,
        }
    }
}

/// Incoming notes keyed by FEN.
pub type NoteInputs = BTreeMap<String, NoteInput>;

/// Replacement data for a line. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct LineUpdate {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub positions: Option<Vec<Position>>,
}

pub struct OpeningRepository<S: Storage> {
    store: S,
    openings: Vec<Opening>,
}

impl<S: Storage> OpeningRepository<S> {
    /// Load the whole collection from `store`.
    pub fn load(store: S) -> Result<Self, RepertoireError> {
        let openings = store.load_all()?;
        info!("Loaded {} openings", openings.len());
        Ok(Self { store, openings })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn openings(&self) -> &[Opening] {
        &self.openings
    }

    pub fn opening(&self, id: &OpeningId) -> Result<&Opening, RepertoireError> {
        self.openings
            .iter()
            .find(|o| &o.id == id)
            .ok_or_else(|| RepertoireError::OpeningNotFound(id.clone()))
    }

    pub fn line(&self, opening_id: &OpeningId, line_id: &LineId) -> Result<&Line, RepertoireError> {
        self.opening(opening_id)?
            .line(line_id)
            .ok_or_else(|| RepertoireError::LineNotFound(line_id.clone()))
    }

    /// Merged move tree of an opening, built fresh.
    pub fn tree(&self, id: &OpeningId) -> Result<MoveTreeNode, RepertoireError> {
        Ok(build_tree(self.opening(id)?))
    }

    pub fn create_opening(
        &mut self,
        name: &str,
        is_white: bool,
        seed_line: Line,
        seed_notes: NoteInputs,
    ) -> Result<Opening, RepertoireError> {
        if seed_line.positions.is_empty() {
            return Err(RepertoireError::EmptyLine);
        }

        let mut opening = Opening {
            id: OpeningId::generate(),
            name: name.to_string(),
            is_white,
            notes: NoteMap::new(),
            lines: vec![seed_line.clone()],
        };
        merge_line_notes(&mut opening, &seed_line, seed_notes);

        let mut next = self.openings.clone();
        next.push(opening.clone());
        self.commit(next)?;

        info!(opening = %opening.id, name, "Created opening");
        Ok(opening)
    }

    pub fn add_line(
        &mut self,
        opening_id: &OpeningId,
        line: Line,
        notes: NoteInputs,
    ) -> Result<Opening, RepertoireError> {
        let opening = self.modify(opening_id, |opening| {
            if line.positions.is_empty() {
                return Err(RepertoireError::EmptyLine);
            }

            let mut line = line;
            if opening.line(&line.id).is_some() {
                line.id = LineId::generate();
            }
            opening.lines.push(line.clone());
            merge_line_notes(opening, &line, notes);
            Ok(())
        })?;

        info!(opening = %opening_id, lines = opening.lines.len(), "Added line");
        Ok(opening)
    }

    /// Replace a line's data and migrate its note references: notes on
    /// positions the line no longer reaches lose it (and are dropped when
    /// nothing else uses them), existing notes on new positions gain it.
    pub fn update_line(
        &mut self,
        opening_id: &OpeningId,
        line_id: &LineId,
        update: LineUpdate,
    ) -> Result<Opening, RepertoireError> {
        let opening = self.modify(opening_id, |opening| {
            let index = opening
                .line_index(line_id)
                .ok_or_else(|| RepertoireError::LineNotFound(line_id.clone()))?;
            if matches!(&update.positions, Some(p) if p.is_empty()) {
                return Err(RepertoireError::EmptyLine);
            }

            opening.release_line(line_id);

            let line = &mut opening.lines[index];
            if let Some(name) = update.name {
                line.name = name;
            }
            if let Some(summary) = update.summary {
                line.summary = summary;
            }
            if let Some(positions) = update.positions {
                line.positions = positions;
                line.renumber();
            }
            let line = line.clone();

            opening.reattach_line_to_notes(&line);
            let purged = opening.purge_orphan_notes();
            if purged > 0 {
                info!(line = %line_id, purged, "Dropped notes no longer on any line");
            }
            Ok(())
        })?;

        info!(opening = %opening_id, line = %line_id, "Updated line");
        Ok(opening)
    }

    /// Remove a line. The last line of an opening cannot be removed.
    pub fn delete_line(
        &mut self,
        opening_id: &OpeningId,
        line_id: &LineId,
    ) -> Result<Opening, RepertoireError> {
        let opening = self.modify(opening_id, |opening| {
            let index = opening
                .line_index(line_id)
                .ok_or_else(|| RepertoireError::LineNotFound(line_id.clone()))?;
            if opening.lines.len() <= 1 {
                warn!(opening = %opening.id, "Refusing to delete last line");
                return Err(RepertoireError::LastLineDeletionRefused);
            }

            opening.detach_line_from_notes(line_id);
            opening.lines.remove(index);
            Ok(())
        })?;

        info!(opening = %opening_id, line = %line_id, "Deleted line");
        Ok(opening)
    }

    pub fn delete_opening(&mut self, id: &OpeningId) -> Result<(), RepertoireError> {
        let index = self.index_of(id)?;
        let mut next = self.openings.clone();
        next.remove(index);
        self.commit(next)?;

        info!(opening = %id, "Deleted opening");
        Ok(())
    }

    /// Replace the whole note map. References are recomputed from the lines
    /// and notes on positions no line reaches are dropped.
    pub fn update_notes(
        &mut self,
        opening_id: &OpeningId,
        notes: NoteMap,
    ) -> Result<Opening, RepertoireError> {
        self.modify(opening_id, |opening| {
            opening.notes = notes;
            let dropped = opening.recount_note_references();
            if dropped > 0 {
                warn!(opening = %opening.id, dropped, "Dropped notes on positions no line reaches");
            }
            Ok(())
        })
    }

    /// Write the note at `fen`, creating it if needed. It is referenced by
    /// every line through that position.
    pub fn add_note(
        &mut self,
        opening_id: &OpeningId,
        fen: &str,
        content: &str,
    ) -> Result<Opening, RepertoireError> {
        self.modify(opening_id, |opening| {
            let lines: Vec<LineId> = opening.lines_through(fen).iter().map(|l| l.id.clone()).collect();
            if lines.is_empty() {
                return Err(RepertoireError::PositionNotFound(fen.to_string()));
            }

            let note = opening
                .notes
                .entry(fen.to_string())
                .or_insert_with(|| Note::new(""));
            note.content = content.to_string();
            note.referenced_by = lines.into_iter().collect();
            Ok(())
        })
    }

    /// Change the text of an existing note.
    pub fn update_note(
        &mut self,
        opening_id: &OpeningId,
        fen: &str,
        content: &str,
    ) -> Result<Opening, RepertoireError> {
        self.modify(opening_id, |opening| {
            let note = opening
                .notes
                .get_mut(fen)
                .ok_or_else(|| RepertoireError::NoteNotFound(fen.to_string()))?;
            note.content = content.to_string();
            Ok(())
        })
    }

    pub fn remove_note(
        &mut self,
        opening_id: &OpeningId,
        fen: &str,
    ) -> Result<Opening, RepertoireError> {
        self.modify(opening_id, |opening| {
            opening
                .notes
                .remove(fen)
                .map(|_| ())
                .ok_or_else(|| RepertoireError::NoteNotFound(fen.to_string()))
        })
    }

    /// Flag or unflag the position at `index` of a line.
    pub fn set_noteworthy(
        &mut self,
        opening_id: &OpeningId,
        line_id: &LineId,
        index: usize,
        noteworthy: bool,
    ) -> Result<Opening, RepertoireError> {
        self.modify(opening_id, |opening| {
            let line = opening
                .line_mut(line_id)
                .ok_or_else(|| RepertoireError::LineNotFound(line_id.clone()))?;
            let pos = line
                .positions
                .get_mut(index)
                .ok_or(RepertoireError::PositionIndexOutOfRange(index))?;
            pos.noteworthy = noteworthy;
            Ok(())
        })
    }

    /// Replace the whole collection with an imported one. Nothing changes
    /// unless the entire input validates and saves.
    pub fn import_json(&mut self, text: &str) -> Result<usize, RepertoireError> {
        let next = transfer::parse_import(text)?;
        let count = next.len();
        self.commit(next)?;

        info!("Imported {} openings", count);
        Ok(count)
    }

    pub fn export_json(&self) -> Result<String, RepertoireError> {
        transfer::export_json(&self.openings).map_err(|e| RepertoireError::Store(e.into()))
    }

    fn index_of(&self, id: &OpeningId) -> Result<usize, RepertoireError> {
        self.openings
            .iter()
            .position(|o| &o.id == id)
            .ok_or_else(|| RepertoireError::OpeningNotFound(id.clone()))
    }

    /// Apply `f` to a copy of one opening and commit the result.
    fn modify<F>(&mut self, id: &OpeningId, f: F) -> Result<Opening, RepertoireError>
    where
        F: FnOnce(&mut Opening) -> Result<(), RepertoireError>,
    {
        let index = self.index_of(id)?;
        let mut opening = self.openings[index].clone();
        f(&mut opening)?;

        let mut next = self.openings.clone();
        next[index] = opening.clone();
        self.commit(next)?;
        Ok(opening)
    }

    fn commit(&mut self, next: Vec<Opening>) -> Result<(), RepertoireError> {
        self.store.save_all(&next)?;
        self.openings = next;
        Ok(())
    }
}

/// Fold a new line's notes into its opening. Inputs on positions the line
/// does not reach are ignored; existing notes keep their text unless the
/// input is marked modified.
fn merge_line_notes(opening: &mut Opening, line: &Line, notes: NoteInputs) {
    for (fen, input) in notes {
        if !line.contains_fen(&fen) {
            warn!(line = %line.id, fen = %fen, "Ignoring note for a position outside the line");
            continue;
        }
        match opening.notes.get_mut(&fen) {
            Some(existing) => {
                if input.modified {
                    existing.content = input.content;
                }
                existing.referenced_by.insert(line.id.clone());
            }
            None => opening.attach_note(&fen, &input.content, &line.id),
        }
    }
    opening.reattach_line_to_notes(line);
}
