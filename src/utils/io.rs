use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{ConfigError, Result};

/// Read a line-delimited secret file. Lines are trimmed and blanks skipped.
/// A missing, unreadable, or empty file is a configuration error — there is
/// nothing to run without at least one key.
pub fn read_secret_lines(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path).map_err(|e| {
        ConfigError::SecretSource(format!("cannot read `{}`: {e}", path.display()))
    })?;
    let lines: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if lines.is_empty() {
        return Err(ConfigError::SecretSource(format!(
            "`{}` contains no entries",
            path.display()
        ))
        .into());
    }
    Ok(lines)
}

/// Read an optional line-delimited file. A missing file yields an empty list.
pub fn read_optional_lines(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(raw) => raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// One-shot yes/no stdin prompt. Anything other than y/yes answers no.
pub fn prompt_yes_no(question: &str) -> io::Result<bool> {
    print!("{question}");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_secret_lines_skips_blanks() {
        let mut file = tempfile_path("keys");
        writeln!(file.1, "0xabc\n\n  0xdef  \n").expect("write");
        let lines = read_secret_lines(&file.0).expect("read");
        assert_eq!(lines, vec!["0xabc".to_string(), "0xdef".to_string()]);
        let _ = std::fs::remove_file(&file.0);
    }

    #[test]
    fn test_read_secret_lines_empty_is_error() {
        let file = tempfile_path("empty");
        drop(file.1);
        assert!(read_secret_lines(&file.0).is_err());
        let _ = std::fs::remove_file(&file.0);
    }

    #[test]
    fn test_read_secret_lines_missing_is_error() {
        assert!(read_secret_lines(Path::new("does/not/exist.txt")).is_err());
    }

    #[test]
    fn test_read_optional_lines_missing_is_empty() {
        assert!(read_optional_lines(Path::new("does/not/exist.txt")).is_empty());
    }

    fn tempfile_path(tag: &str) -> (std::path::PathBuf, fs::File) {
        let path = std::env::temp_dir().join(format!(
            "task_harvester_test_{tag}_{}.txt",
            std::process::id()
        ));
        let file = fs::File::create(&path).expect("create temp file");
        (path, file)
    }
}
