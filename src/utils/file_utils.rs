use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Regular files directly inside `dir`, sorted by path.
///
/// Lexical order is what frame sequences rely on (`frame00001.png` before
/// `frame00002.png`).
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {:?}", dir))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();

    files.sort();

    if files.is_empty() {
        anyhow::bail!("No files found in '{}'", dir.display());
    }

    Ok(files)
}

/// OpenCV takes paths as `&str`.
pub fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .with_context(|| format!("Path is not valid UTF-8: {:?}", path))
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create directory: {:?}", dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_files_sorted_and_skips_dirs() {
        let tmp_dir = std::env::temp_dir().join("toonkit_list_files_test");
        let _ = fs::remove_dir_all(&tmp_dir);
        fs::create_dir_all(tmp_dir.join("nested")).unwrap();
        for name in ["frame00002.png", "frame00000.png", "frame00001.png"] {
            fs::write(tmp_dir.join(name), b"x").unwrap();
        }

        let files = list_files(&tmp_dir).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["frame00000.png", "frame00001.png", "frame00002.png"]);
    }

    #[test]
    fn test_list_files_empty_dir_fails() {
        let tmp_dir = std::env::temp_dir().join("toonkit_list_files_empty");
        let _ = fs::remove_dir_all(&tmp_dir);
        fs::create_dir_all(&tmp_dir).unwrap();
        assert!(list_files(&tmp_dir).is_err());
    }
}
