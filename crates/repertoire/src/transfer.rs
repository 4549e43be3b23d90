//! Import and export of the whole collection as JSON.

use chrono::NaiveDate;
use serde_json::{Map, Value as JsonValue};

use chess_core::Opening;

use crate::error::ImportFormatError;

/// Parse and validate an exported collection.
///
/// Validation covers the whole input before anything is returned, so a bad
/// element anywhere rejects the import as a unit. Missing `notes` default to
/// an empty map and note references are recounted from the lines.
pub fn parse_import(text: &str) -> Result<Vec<Opening>, ImportFormatError> {
    let mut value: JsonValue = serde_json::from_str(text)
        .map_err(|e| ImportFormatError(format!("not valid JSON: {e}")))?;

    let openings = value
        .as_array_mut()
        .ok_or_else(|| ImportFormatError("expected an array".into()))?;

    for (i, opening) in openings.iter_mut().enumerate() {
        validate_opening(opening, i)?;
    }

    let mut openings: Vec<Opening> = serde_json::from_value(value)
        .map_err(|e| ImportFormatError(format!("unexpected field type: {e}")))?;

    for opening in &mut openings {
        for line in &mut opening.lines {
            line.renumber();
        }
        opening.recount_note_references();
    }

    Ok(openings)
}

fn validate_opening(opening: &mut JsonValue, i: usize) -> Result<(), ImportFormatError> {
    let ctx = format!("opening {i}");
    let obj = opening
        .as_object_mut()
        .ok_or_else(|| ImportFormatError(format!("{ctx} is not an object")))?;

    require_str(obj, "id", &ctx)?;
    require_str(obj, "name", &ctx)?;
    drop_nulls(obj, &["isWhite", "notes"]);

    let notes = obj
        .entry("notes")
        .or_insert_with(|| JsonValue::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| ImportFormatError(format!("{ctx}: `notes` must be an object")))?;
    notes.retain(|_, note| !note.is_null());
    for (fen, note) in notes.iter_mut() {
        let note = note
            .as_object_mut()
            .ok_or_else(|| ImportFormatError(format!("{ctx}, note at {fen} is not an object")))?;
        drop_nulls(note, &["id", "content", "referencedBy"]);
    }

    let lines = require_array(obj, "lines", &ctx)?;
    if lines.is_empty() {
        return Err(ImportFormatError(format!("{ctx} has no lines")));
    }

    for (j, line) in lines.iter_mut().enumerate() {
        let ctx = format!("{ctx}, line {j}");
        let obj = line
            .as_object_mut()
            .ok_or_else(|| ImportFormatError(format!("{ctx} is not an object")))?;

        require_str(obj, "id", &ctx)?;
        require_str(obj, "name", &ctx)?;
        drop_nulls(obj, &["summary"]);
        let positions = require_array(obj, "positions", &ctx)?;
        if positions.is_empty() {
            return Err(ImportFormatError(format!("{ctx} has no positions")));
        }

        for (k, position) in positions.iter_mut().enumerate() {
            let ctx = format!("{ctx}, position {k}");
            let obj = position
                .as_object_mut()
                .ok_or_else(|| ImportFormatError(format!("{ctx} is not an object")))?;
            require_str(obj, "fen", &ctx)?;
            require_str(obj, "move", &ctx)?;
            drop_nulls(obj, &["from", "to", "moveIndex", "noteworthy"]);
        }
    }

    Ok(())
}

/// Optional fields given as `null` fall back to their defaults.
fn drop_nulls(obj: &mut Map<String, JsonValue>, fields: &[&str]) {
    for field in fields {
        if obj.get(*field).is_some_and(JsonValue::is_null) {
            obj.remove(*field);
        }
    }
}

fn require_str(obj: &Map<String, JsonValue>, field: &str, ctx: &str) -> Result<(), ImportFormatError> {
    match obj.get(field) {
        Some(JsonValue::String(s)) if !s.is_empty() => Ok(()),
        _ => Err(ImportFormatError(format!("{ctx}: missing required field `{field}`"))),
    }
}

fn require_array<'a>(
    obj: &'a mut Map<String, JsonValue>,
    field: &str,
    ctx: &str,
) -> Result<&'a mut Vec<JsonValue>, ImportFormatError> {
    obj.get_mut(field)
        .and_then(JsonValue::as_array_mut)
        .ok_or_else(|| ImportFormatError(format!("{ctx}: `{field}` must be an array")))
}

/// Pretty-printed JSON of the whole collection.
pub fn export_json(openings: &[Opening]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(openings)
}

/// File name for an export taken on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("chess-openings-{}.json", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::LineId;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";

    fn collection(notes: JsonValue) -> JsonValue {
        serde_json::json!([{
            "id": "o1",
            "name": "King's Pawn",
            "notes": notes,
            "lines": [{
                "id": "l1",
                "name": "Main",
                "positions": [
                    { "fen": START, "move": "Starting Position" },
                    { "fen": AFTER_E4, "move": "e4", "from": "e2", "to": "e4" }
                ]
            }]
        }])
    }

    #[test]
    fn test_import_defaults_and_recounts() {
        let notes = serde_json::json!({
            AFTER_E4: { "id": "n1", "content": "Best by test", "referencedBy": [] },
            "8/8/8/8/8/8/8/8 w - - 0 1": { "id": "n2", "content": "stale", "referencedBy": ["l1"] }
        });
        let openings = parse_import(&collection(notes).to_string()).unwrap();

        let opening = &openings[0];
        assert!(opening.is_white);
        assert_eq!(opening.lines[0].summary, "");
        assert_eq!(opening.lines[0].positions[1].move_index, 1);
        assert_eq!(opening.notes.len(), 1);
        assert!(opening.notes[AFTER_E4].referenced_by.contains(&LineId::from("l1")));
    }

    #[test]
    fn test_import_null_notes() {
        let openings = parse_import(&collection(JsonValue::Null).to_string()).unwrap();
        assert!(openings[0].notes.is_empty());
    }

    #[test]
    fn test_import_note_without_id() {
        let notes = serde_json::json!({ AFTER_E4: { "content": "x" } });
        let openings = parse_import(&collection(notes).to_string()).unwrap();
        let note = &openings[0].notes[AFTER_E4];
        assert_eq!(note.content, "x");
        assert!(!note.id.as_str().is_empty());
        assert!(note.referenced_by.contains(&LineId::from("l1")));
    }

    #[test]
    fn test_import_note_without_content() {
        let notes = serde_json::json!({
            AFTER_E4: { "id": "n1", "content": null },
            START: null
        });
        let openings = parse_import(&collection(notes).to_string()).unwrap();
        assert_eq!(openings[0].notes.len(), 1);
        assert_eq!(openings[0].notes[AFTER_E4].content, "");
    }

    #[test]
    fn test_import_null_optional_fields() {
        let mut value = collection(serde_json::json!({}));
        value[0]["isWhite"] = JsonValue::Null;
        value[0]["lines"][0]["summary"] = JsonValue::Null;
        value[0]["lines"][0]["positions"][1]["noteworthy"] = JsonValue::Null;
        value[0]["lines"][0]["positions"][1]["from"] = JsonValue::Null;

        let openings = parse_import(&value.to_string()).unwrap();
        let line = &openings[0].lines[0];
        assert!(openings[0].is_white);
        assert_eq!(line.summary, "");
        assert!(!line.positions[1].noteworthy);
        assert_eq!(line.positions[1].from_square, None);
    }

    #[test]
    fn test_import_rejects_bad_shapes() {
        assert_eq!(
            parse_import("{}").unwrap_err(),
            ImportFormatError("expected an array".into())
        );
        assert!(parse_import("not json").is_err());

        let mut value = collection(serde_json::json!({}));
        value[0]["lines"][0]["positions"][1]
            .as_object_mut()
            .unwrap()
            .remove("move");
        let err = parse_import(&value.to_string()).unwrap_err();
        assert!(err.0.contains("position 1"), "{err}");
        assert!(err.0.contains("`move`"), "{err}");

        let mut value = collection(serde_json::json!({}));
        value[0]["id"] = JsonValue::String(String::new());
        assert!(parse_import(&value.to_string()).is_err());
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(export_file_name(date), "chess-openings-2024-03-09.json");
    }
}
