//! Input file resolution with an interactive fallback.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands (and `SALES_DATA`)
//! - the picker covers "the default file isn't here, choose another CSV"
//!
//! The picker only prompts when stdin is a terminal; scripted runs get the
//! plain "file not found" error instead.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Return `path` if it is a usable CSV, otherwise offer a picker (interactive
/// sessions only).
pub fn resolve_input(path: &Path) -> Result<PathBuf, AppError> {
    match validate_csv_path(path) {
        Ok(path) => Ok(path),
        Err(err) if io::stdin().is_terminal() && !path.exists() => {
            eprintln!("{err}");
            prompt_for_csv_path(&discover_csv_files())
        }
        Err(err) => Err(err),
    }
}

/// Prompt the user to select one of `files`.
///
/// Behavior:
/// - list discovered `*.csv` files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
fn prompt_for_csv_path(files: &[PathBuf]) -> Result<PathBuf, AppError> {
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No .csv files found. Create one with `sales generate` or pass `-f <file.csv>`.",
        ));
    }

    println!("Found {} CSV file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    loop {
        print!("Select a file by number (1-{}) or type a path (q to quit): ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::new(2, "No input received. Pass a CSV with `-f <file.csv>`."));
        }

        match interpret_choice(input.trim(), files) {
            Choice::Quit => return Err(AppError::new(2, "Canceled.")),
            Choice::Path(path) => match validate_csv_path(&path) {
                Ok(path) => {
                    debug!(path = %path.display(), "picked input file");
                    return Ok(path);
                }
                Err(err) => println!("{err}"),
            },
            Choice::OutOfRange(n) => {
                println!("Invalid choice: {n}. Enter a number between 1 and {}.", files.len());
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum Choice {
    Quit,
    Path(PathBuf),
    OutOfRange(usize),
}

fn interpret_choice(input: &str, files: &[PathBuf]) -> Choice {
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    if let Ok(n) = input.parse::<usize>() {
        return match n.checked_sub(1).and_then(|i| files.get(i)) {
            Some(path) => Choice::Path(path.clone()),
            None => Choice::OutOfRange(n),
        };
    }
    Choice::Path(PathBuf::from(input))
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(2, format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_csv_extension(path) {
        return Err(AppError::new(
            2,
            format!("Expected a .csv file (got: {}). Use -f to pass a CSV path.", path.display()),
        ));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory (deterministic order).
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, max_depth, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }
    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files_inner(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_missing_dirs_and_other_extensions() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sales.CSV");
        let txt = dir.path().join("notes.txt");
        fs::write(&csv, "a\n").unwrap();
        fs::write(&txt, "a\n").unwrap();

        assert_eq!(validate_csv_path(&csv).unwrap(), csv);
        assert_eq!(validate_csv_path(&txt).unwrap_err().exit_code(), 2);
        assert!(validate_csv_path(dir.path()).is_err());
        assert!(validate_csv_path(&dir.path().join("nope.csv")).is_err());
    }

    #[test]
    fn discovery_is_sorted_and_skips_build_dirs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("target")).unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("target").join("skip.csv"), "").unwrap();
        fs::write(dir.path().join("data").join("b.csv"), "").unwrap();
        fs::write(dir.path().join("a.csv"), "").unwrap();

        let found = find_csv_files(dir.path(), 2);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, ["a.csv", "data/b.csv"]);
    }

    #[test]
    fn choices_map_to_files() {
        let files = vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")];
        assert_eq!(interpret_choice("2", &files), Choice::Path(PathBuf::from("b.csv")));
        assert_eq!(interpret_choice("0", &files), Choice::OutOfRange(0));
        assert_eq!(interpret_choice("3", &files), Choice::OutOfRange(3));
        assert_eq!(interpret_choice("Q", &files), Choice::Quit);
        assert_eq!(interpret_choice("x/y.csv", &files), Choice::Path(PathBuf::from("x/y.csv")));
    }
}
