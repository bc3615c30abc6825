use std::path::PathBuf;

use tempfile::TempDir;

/// Write a fixture into a fresh temp dir, returning the dir handle and
/// the file path. The caller must hold onto `TempDir` to keep it alive.
pub fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Write a newline-separated changed-files list.
pub fn write_changed_list(dir: &TempDir, paths: &[&str]) -> PathBuf {
    let mut content = paths.join("\n");
    content.push('\n');
    write_file(dir, "changed.txt", content.as_bytes())
}
