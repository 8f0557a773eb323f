//! load devregs files as lines
use anyhow::{Context, Result};
use std::path::Path;

pub fn load_lines(path: &Path) -> Result<Vec<String>> {
    log::debug!("load file: {}", path.display());

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read file: {}", path.display()))?;

    let lines: Vec<String> = text.lines().map(str::to_string).collect();

    log::debug!("file load success, {} lines", lines.len());
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "REG1 0x10\n:F0:3\r\n\n# end").unwrap();

        let lines = load_lines(file.path()).unwrap();
        assert_eq!(lines, vec!["REG1 0x10", ":F0:3", "", "# end"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_lines(&dir.path().join("missing.txt")).unwrap_err();
        assert!(err.to_string().contains("failed to read file"));
    }
}
