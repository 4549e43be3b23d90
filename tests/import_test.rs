//! Integration tests: import, export and the JSON file store.

mod common;

use common::{opening, repo_with_lines};
use repertoire::{JsonFileStore, OpeningRepository, RepertoireError, Storage};
use tempfile::TempDir;

#[test]
fn test_import_missing_lines_leaves_store_untouched() {
    let (mut repo, _) = repo_with_lines(&[("A", &["e4"])]);
    let before = repo.store().openings().to_vec();
    let saves = repo.store().save_count();

    let bad = serde_json::json!([
        { "id": "x", "name": "No lines" }
    ]);
    let err = repo.import_json(&bad.to_string()).unwrap_err();

    assert!(matches!(err, RepertoireError::Import(_)));
    assert!(err.to_string().starts_with("Invalid file format"));
    assert_eq!(repo.openings(), before.as_slice());
    assert_eq!(repo.store().openings(), before.as_slice());
    assert_eq!(repo.store().save_count(), saves);
}

#[test]
fn test_export_then_import_replaces_collection() {
    let (mut source, id) = repo_with_lines(&[("A", &["e4", "e5"]), ("B", &["d4"])]);
    let fen = common::fen_at(opening(&source, &id), 0, 2);
    source.add_note(&id, &fen, "Open game").unwrap();
    let exported = source.export_json().unwrap();

    let (mut target, _) = repo_with_lines(&[("Other", &["c4"])]);
    assert_eq!(target.import_json(&exported).unwrap(), 1);
    assert_eq!(target.openings(), source.openings());
}

#[test]
fn test_file_store_persists_across_loads() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data").join("chessopenings.json");

    let (source, _) = repo_with_lines(&[("A", &["e4", "c5"])]);
    let exported = source.export_json().unwrap();

    let mut repo = OpeningRepository::load(JsonFileStore::new(&path)).unwrap();
    assert!(repo.openings().is_empty());
    repo.import_json(&exported).unwrap();

    let reloaded = JsonFileStore::new(&path).load_all().unwrap();
    assert_eq!(reloaded, source.openings());

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"isWhite\": true"));
    assert!(!text.contains("moveIndex"));
}
