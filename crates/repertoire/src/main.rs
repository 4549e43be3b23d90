//! Command-line front end for the opening repertoire.
//!
//! Usage: repertoire <command> [args]
//!
//! Example:
//!   cargo run --bin repertoire -- create "Italian Game" white italian.pgn

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chess_core::{line_from_pgn, LineId, MoveTreeNode, Opening, OpeningId, ShakmatyRules};
use repertoire::{
    export_file_name, Config, JsonFileStore, NoteInputs, OpeningRepository,
};
use tracing_subscriber::EnvFilter;

type Repository = OpeningRepository<JsonFileStore>;

const USAGE: &str = "Usage: repertoire <command> [args]

Commands:
  list
  show <opening>
  create <name> <white|black> <pgn-file> [line-name]
  add-line <opening> <name> <pgn-file>
  add-lines <opening> <dir>
  delete-line <opening> <line>
  delete <opening>
  tree <opening> [--json]
  note <opening> <fen> <content>
  import <file>
  export [file]

<opening> is an opening id or its name (case-insensitive).";

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    let config = Config::from_env();
    let mut repo = OpeningRepository::load(JsonFileStore::new(&config.data_path))
        .with_context(|| format!("loading {}", config.data_path.display()))?;
    let rules = ShakmatyRules::new();

    match (command.as_str(), &args[1..]) {
        ("list", []) => {
            for opening in repo.openings() {
                let side = if opening.is_white { "white" } else { "black" };
                println!(
                    "{}  {} ({}, {} lines, {} notes)",
                    opening.id,
                    opening.name,
                    side,
                    opening.lines.len(),
                    opening.notes.len()
                );
            }
        }
        ("show", [opening]) => {
            let opening = find_opening(&repo, opening)?;
            println!("{} [{}]", opening.name, opening.id);
            for line in &opening.lines {
                println!("  {}  {} ({} moves)", line.id, line.name, line.move_count());
                println!("    {}", line.moves().join(" "));
                if !line.summary.is_empty() {
                    println!("    {}", line.summary);
                }
            }
        }
        ("create", [name, side, pgn_file, rest @ ..]) if rest.len() <= 1 => {
            let is_white = match side.to_ascii_lowercase().as_str() {
                "white" | "w" => true,
                "black" | "b" => false,
                other => bail!("side must be white or black, got {other}"),
            };
            let line_name = rest.first().map(String::as_str).unwrap_or("Main Line");
            let line = line_from_pgn(&rules, line_name, &read_file(pgn_file)?)?;
            let opening = repo.create_opening(name, is_white, line, NoteInputs::new())?;
            println!("Created {} [{}]", opening.name, opening.id);
        }
        ("add-line", [opening, name, pgn_file]) => {
            let id = find_opening(&repo, opening)?.id.clone();
            let line = line_from_pgn(&rules, name, &read_file(pgn_file)?)?;
            let opening = repo.add_line(&id, line, NoteInputs::new())?;
            println!("{} now has {} lines", opening.name, opening.lines.len());
        }
        ("add-lines", [opening, dir]) => {
            let id = find_opening(&repo, opening)?.id.clone();
            let added = add_lines_from_dir(&mut repo, &rules, &id, dir)?;
            println!("Added {added} lines");
        }
        ("delete-line", [opening, line]) => {
            let id = find_opening(&repo, opening)?.id.clone();
            let opening = repo.delete_line(&id, &LineId::from(line.as_str()))?;
            println!("{} now has {} lines", opening.name, opening.lines.len());
        }
        ("delete", [opening]) => {
            let id = find_opening(&repo, opening)?.id.clone();
            repo.delete_opening(&id)?;
            println!("Deleted {id}");
        }
        ("tree", [opening, flags @ ..]) => {
            let id = find_opening(&repo, opening)?.id.clone();
            let tree = repo.tree(&id)?;
            if flags.iter().any(|f| f == "--json") {
                println!("{}", serde_json::to_string_pretty(&tree.to_json())?);
            } else {
                print_tree(&tree, 0);
            }
        }
        ("note", [opening, fen, content]) => {
            let id = find_opening(&repo, opening)?.id.clone();
            let opening = repo.add_note(&id, fen, content)?;
            let refs = opening.note_for(fen).map_or(0, |n| n.referenced_by.len());
            println!("Saved note on {refs} lines");
        }
        ("import", [file]) => {
            let count = repo.import_json(&read_file(file)?)?;
            println!("Imported {count} openings");
        }
        ("export", rest) if rest.len() <= 1 => {
            let path = match rest.first() {
                Some(file) => PathBuf::from(file),
                None => config
                    .export_dir
                    .join(export_file_name(chrono::Utc::now().date_naive())),
            };
            fs::write(&path, repo.export_json()?)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Exported {} openings to {}", repo.openings().len(), path.display());
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn read_file(path: &str) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {path}"))
}

/// Look an opening up by id, then by case-insensitive name.
fn find_opening<'a>(repo: &'a Repository, key: &str) -> anyhow::Result<&'a Opening> {
    if let Ok(opening) = repo.opening(&OpeningId::from(key)) {
        return Ok(opening);
    }
    let mut matches = repo
        .openings()
        .iter()
        .filter(|o| o.name.eq_ignore_ascii_case(key));
    match (matches.next(), matches.next()) {
        (Some(opening), None) => Ok(opening),
        (Some(_), Some(_)) => bail!("several openings are named {key}; use the id"),
        _ => bail!("no opening matches {key}"),
    }
}

/// Add every `*.pgn` file in `dir` as a line named after the file.
fn add_lines_from_dir(
    repo: &mut Repository,
    rules: &ShakmatyRules,
    id: &OpeningId,
    dir: &str,
) -> anyhow::Result<usize> {
    let pattern = format!("{}/*.pgn", dir);
    let mut pgn_files: Vec<_> = glob::glob(&pattern)?.filter_map(|p| p.ok()).collect();
    pgn_files.sort();

    if pgn_files.is_empty() {
        bail!("no PGN files found in {dir}");
    }

    let mut added = 0;
    for path in &pgn_files {
        let name = line_name(path);
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        match line_from_pgn(rules, &name, &text) {
            Ok(line) => {
                repo.add_line(id, line, NoteInputs::new())?;
                added += 1;
            }
            Err(e) => tracing::warn!("Skipping {}: {}", path.display(), e),
        }
    }
    Ok(added)
}

fn line_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
        .unwrap_or_else(|| "Line".to_string())
}

fn print_tree(node: &MoveTreeNode, indent: usize) {
    if !node.is_root() {
        let mut row = format!("{}{}", "  ".repeat(indent), node.label());
        if node.is_first_unique_move {
            row.push_str(&format!("  <- {}", node.line_names().join(", ")));
        }
        if node.noteworthy {
            row.push_str("  !");
        }
        if !node.notes.is_empty() {
            row.push_str(&format!("  [{}]", node.notes));
        }
        println!("{row}");
    }

    let indent = if node.is_root() { indent } else { indent + 1 };
    for child in node.children.values() {
        print_tree(child, indent);
    }
}
